//! Twitch implicit-grant authentication library.
//!
//! Obtains an access token by intercepting a browser redirect, then drives
//! the dependent Twitch API lookups (user, channel, subscription, follow).

pub mod api;
pub mod auth;
pub mod browser;
pub mod config;
pub mod flow;
pub mod token;
pub mod transport;

pub use api::models::{ApiError, ChannelUser, Following, Subscription, TwitchUser};
pub use api::{ApiRequest, TwitchApiClient};
pub use browser::Browser;
pub use config::{AuthConfig, Endpoints};
pub use flow::{AuthEvent, AuthFlow, FlowState, PendingEndpoint, PendingIntent};
pub use token::TokenStore;
pub use transport::{HttpCompletion, HttpResponse, HttpTransport, ReqwestTransport};

/// Unified error type for the twitch-auth crate.
#[derive(Debug, thiserror::Error)]
pub enum TwitchError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Browser widget could not be found")]
    BrowserNotFound,

    #[error("A Twitch request is already in flight")]
    Busy,

    #[error("Redirect URL did not carry an access token")]
    MissingAccessToken,

    #[error("Invalid header value: {0}")]
    InvalidHeader(#[from] reqwest::header::InvalidHeaderValue),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// OAuth scopes requested when none are configured.
pub const DEFAULT_SCOPES: &[&str] = &["user_read", "user_subscriptions"];
