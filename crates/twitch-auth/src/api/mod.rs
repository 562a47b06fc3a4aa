//! Twitch v5 REST request construction and response parsing.
//!
//! Requests are built here but never sent; sending is delegated to an
//! [`crate::HttpTransport`].

mod request;
pub mod response;

pub mod models;

pub use models::{ApiError, ChannelUser, Following, Subscription, TwitchUser};

use reqwest::Method;
use reqwest::header::HeaderMap;

use crate::{Endpoints, TwitchError};

const ACCEPT_V5: &str = "application/vnd.twitchtv.v5+json";

/// A fully built, unsent API request.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    pub url: String,
    pub headers: HeaderMap,
}

/// Builds authenticated requests for the fixed Twitch endpoints.
#[derive(Debug, Clone)]
pub struct TwitchApiClient {
    pub(super) client_id: String,
    pub(super) endpoints: Endpoints,
}
