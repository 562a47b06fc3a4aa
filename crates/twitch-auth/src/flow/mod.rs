//! Authentication and request state machine.
//!
//! [`AuthFlow`] obtains a token through the browser redirect, then issues the
//! dependent lookups one at a time: user, then channel, then either the
//! subscription or the following check. Every outcome is reported as an
//! [`AuthEvent`] on the listener channel.
//!
//! All entry points run synchronously on the caller's thread. At most one
//! request is in flight; starting another one fails with
//! [`TwitchError::Busy`].


use tokio::sync::mpsc;

use crate::api::response;
use crate::{
    ApiError, ApiRequest, AuthConfig, Browser, ChannelUser, Following, HttpCompletion,
    HttpTransport, Subscription, TokenStore, TwitchApiClient, TwitchError, TwitchUser, auth,
};

/// Which request is in flight.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PendingEndpoint {
    #[default]
    None,
    User,
    Channel,
    Subscription,
    Following,
}

/// Which check a channel lookup is serving.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PendingIntent {
    #[default]
    None,
    CheckSubscription,
    CheckFollowing,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FlowState {
    #[default]
    Idle,
    AwaitingBrowserRedirect,
    AwaitingUserResponse,
    AwaitingChannelResponse {
        intent: PendingIntent,
    },
    AwaitingSubscriptionResponse,
    AwaitingFollowingResponse,
}

impl FlowState {
    pub fn pending_endpoint(&self) -> PendingEndpoint {
        match self {
            Self::Idle | Self::AwaitingBrowserRedirect => PendingEndpoint::None,
            Self::AwaitingUserResponse => PendingEndpoint::User,
            Self::AwaitingChannelResponse { .. } => PendingEndpoint::Channel,
            Self::AwaitingSubscriptionResponse => PendingEndpoint::Subscription,
            Self::AwaitingFollowingResponse => PendingEndpoint::Following,
        }
    }

    pub fn pending_intent(&self) -> PendingIntent {
        match self {
            Self::AwaitingChannelResponse { intent } => *intent,
            _ => PendingIntent::None,
        }
    }
}

/// Notifications emitted by [`AuthFlow`].
#[derive(Debug, Clone, PartialEq)]
pub enum AuthEvent {
    /// An intermediate provider page (login, consent) finished loading.
    AuthenticationPageLoaded,
    /// The redirect page carrying the token finished loading.
    AccessTokenPageLoaded,
    UserAuthenticated {
        success: bool,
    },
    UserSubscribedToChannel {
        success: bool,
        subscription: Subscription,
    },
    UserFollowingChannel {
        success: bool,
        following: Following,
    },
}

pub struct AuthFlow<T: HttpTransport> {
    config: AuthConfig,
    api: TwitchApiClient,
    tokens: TokenStore,
    transport: T,
    events: mpsc::UnboundedSender<AuthEvent>,
    state: FlowState,
    user: TwitchUser,
    channel: ChannelUser,
    subscription: Subscription,
    following: Following,
    last_error: ApiError,
}

impl<T: HttpTransport> AuthFlow<T> {
    pub fn new(
        config: AuthConfig,
        transport: T,
        events: mpsc::UnboundedSender<AuthEvent>,
    ) -> Self {
        let api = TwitchApiClient::new(config.client_id.clone(), config.endpoints.clone());
        Self {
            config,
            api,
            tokens: TokenStore::new(),
            transport,
            events,
            state: FlowState::Idle,
            user: TwitchUser::default(),
            channel: ChannelUser::default(),
            subscription: Subscription::default(),
            following: Following::default(),
            last_error: ApiError::default(),
        }
    }

    /// Start authentication.
    ///
    /// With a stored token the user lookup is issued directly and `browser`
    /// is never touched. Otherwise the browser is sent to the authorization
    /// page and the flow waits for [`Self::handle_url_changed`].
    pub fn authenticate(&mut self, browser: Option<&mut dyn Browser>) -> Result<(), TwitchError> {
        self.ensure_no_request_in_flight()?;

        if !self.tokens.is_empty() {
            tracing::debug!("Access token already present, skipping browser login");
            self.request_user();
            return Ok(());
        }

        let Some(browser) = browser else {
            self.record_error(ApiError::browser_not_found());
            return Err(TwitchError::BrowserNotFound);
        };

        let url = auth::authorization_url(&self.config)?;
        browser.observe_navigation();
        browser.load_url(&url);
        self.state = FlowState::AwaitingBrowserRedirect;
        tracing::info!("Loading Twitch authorization page");
        Ok(())
    }

    /// Feed a browser navigation change into the flow.
    pub fn handle_url_changed(&mut self, url: &str) {
        if self.state != FlowState::AwaitingBrowserRedirect {
            tracing::debug!(url, state = ?self.state, "Ignoring navigation outside of login");
            return;
        }

        if !auth::is_token_redirect(&self.config, url) {
            self.emit(AuthEvent::AuthenticationPageLoaded);
            return;
        }

        self.emit(AuthEvent::AccessTokenPageLoaded);
        match auth::extract_access_token(url) {
            Ok(token) => {
                tracing::info!("Access token received from redirect");
                self.tokens.set(token);
            }
            Err(e) => {
                // The user lookup still goes out; the provider rejects it.
                tracing::warn!(error = %e, "Redirect carried no usable access token");
                self.tokens.clear();
            }
        }
        self.request_user();
    }

    pub fn is_user_subscribed_to_channel(&mut self, channel_name: &str) -> Result<(), TwitchError> {
        self.request_channel(channel_name, PendingIntent::CheckSubscription)
    }

    pub fn is_user_following_channel(&mut self, channel_name: &str) -> Result<(), TwitchError> {
        self.request_channel(channel_name, PendingIntent::CheckFollowing)
    }

    /// Single entry point for every HTTP completion.
    pub fn handle_response(&mut self, completion: HttpCompletion) {
        let state = std::mem::take(&mut self.state);
        let endpoint = state.pending_endpoint();
        let valid = response::is_valid(&completion.response, completion.transport_ok);

        if endpoint == PendingEndpoint::None {
            self.state = state;
            tracing::warn!(
                status = completion.response.status,
                "Response arrived with no request in flight"
            );
            if !valid {
                self.record_error(response::decode_error(&completion.response));
            }
            return;
        }

        if !valid {
            self.record_error(response::decode_error(&completion.response));
            self.notify_failure(endpoint);
            return;
        }

        let body = completion.response.body.as_str();
        match state {
            FlowState::AwaitingUserResponse => self.on_user_response(body),
            FlowState::AwaitingChannelResponse { intent } => self.on_channel_response(intent, body),
            FlowState::AwaitingSubscriptionResponse => self.on_subscription_response(body),
            FlowState::AwaitingFollowingResponse => self.on_following_response(body),
            FlowState::Idle | FlowState::AwaitingBrowserRedirect => {}
        }
    }

    pub fn user(&self) -> &TwitchUser {
        &self.user
    }

    pub fn channel(&self) -> &ChannelUser {
        &self.channel
    }

    pub fn subscription(&self) -> &Subscription {
        &self.subscription
    }

    pub fn following(&self) -> &Following {
        &self.following
    }

    pub fn access_token(&self) -> &str {
        self.tokens.get()
    }

    /// Override the stored token without going through the browser.
    pub fn set_access_token(&mut self, token: impl Into<String>) {
        self.tokens.set(token);
    }

    pub fn clear_access_token(&mut self) {
        self.tokens.clear();
    }

    pub fn last_error(&self) -> &ApiError {
        &self.last_error
    }

    pub fn state(&self) -> FlowState {
        self.state
    }

    pub fn pending_endpoint(&self) -> PendingEndpoint {
        self.state.pending_endpoint()
    }

    pub fn pending_intent(&self) -> PendingIntent {
        self.state.pending_intent()
    }

    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    fn ensure_no_request_in_flight(&self) -> Result<(), TwitchError> {
        let pending = self.pending_endpoint();
        if pending != PendingEndpoint::None {
            tracing::warn!(?pending, "Rejecting request while another is in flight");
            return Err(TwitchError::Busy);
        }
        Ok(())
    }

    fn request_user(&mut self) {
        let request = self.api.user_request(self.tokens.get());
        self.issue(FlowState::AwaitingUserResponse, request);
    }

    fn request_channel(
        &mut self,
        channel_name: &str,
        intent: PendingIntent,
    ) -> Result<(), TwitchError> {
        if self.state != FlowState::Idle {
            tracing::warn!(state = ?self.state, channel_name, "Rejecting channel check while busy");
            return Err(TwitchError::Busy);
        }

        let request = self.api.channel_request(self.tokens.get(), channel_name);
        self.issue(FlowState::AwaitingChannelResponse { intent }, request);
        Ok(())
    }

    fn request_subscription(&mut self) {
        let request =
            self.api
                .subscription_request(self.tokens.get(), &self.user.id, &self.channel.id);
        self.issue(FlowState::AwaitingSubscriptionResponse, request);
    }

    fn request_following(&mut self) {
        let request = self
            .api
            .following_request(self.tokens.get(), &self.user.id, &self.channel.id);
        self.issue(FlowState::AwaitingFollowingResponse, request);
    }

    /// Enter `next` and hand the request to the transport. A request that
    /// could not be built is reported like a failed response.
    fn issue(&mut self, next: FlowState, request: Result<ApiRequest, TwitchError>) {
        match request {
            Ok(request) => {
                tracing::debug!(
                    method = %request.method,
                    url = %request.url,
                    "Sending Twitch request"
                );
                self.state = next;
                self.transport.send(request);
            }
            Err(e) => {
                self.state = FlowState::Idle;
                self.record_error(ApiError::new(400, "Bad Request", e.to_string()));
                self.notify_failure(next.pending_endpoint());
            }
        }
    }

    fn on_user_response(&mut self, body: &str) {
        match response::decode::<TwitchUser>(body) {
            Ok(user) => {
                tracing::info!(user_id = %user.id, login = %user.name, "Twitch user authenticated");
                self.user = user;
                self.emit(AuthEvent::UserAuthenticated { success: true });
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to decode Twitch user");
                self.emit(AuthEvent::UserAuthenticated { success: false });
            }
        }
    }

    fn on_channel_response(&mut self, intent: PendingIntent, body: &str) {
        match response::decode_channel(body) {
            Ok(channel) => {
                self.channel = channel;
                match intent {
                    PendingIntent::CheckSubscription => self.request_subscription(),
                    PendingIntent::CheckFollowing => self.request_following(),
                    PendingIntent::None => {
                        tracing::debug!(channel_id = %self.channel.id, "Channel resolved, no check pending")
                    }
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to decode Twitch channel");
                self.record_error(ApiError::channel_not_found());
                // Reported as a subscription failure for both intents.
                self.emit(AuthEvent::UserSubscribedToChannel {
                    success: false,
                    subscription: self.subscription.clone(),
                });
            }
        }
    }

    fn on_subscription_response(&mut self, body: &str) {
        match response::decode::<Subscription>(body) {
            Ok(subscription) => {
                self.subscription = subscription;
                self.emit(AuthEvent::UserSubscribedToChannel {
                    success: true,
                    subscription: self.subscription.clone(),
                });
            }
            Err(e) => tracing::warn!(error = %e, "Failed to decode Twitch subscription"),
        }
    }

    fn on_following_response(&mut self, body: &str) {
        match response::decode::<Following>(body) {
            Ok(following) => {
                self.following = following;
                self.emit(AuthEvent::UserFollowingChannel {
                    success: true,
                    following: self.following.clone(),
                });
            }
            Err(e) => tracing::warn!(error = %e, "Failed to decode Twitch follow"),
        }
    }

    /// Emit the failure notification that belongs to `endpoint`.
    fn notify_failure(&self, endpoint: PendingEndpoint) {
        match endpoint {
            PendingEndpoint::Following => self.emit(AuthEvent::UserFollowingChannel {
                success: false,
                following: self.following.clone(),
            }),
            PendingEndpoint::Subscription | PendingEndpoint::Channel => {
                self.emit(AuthEvent::UserSubscribedToChannel {
                    success: false,
                    subscription: self.subscription.clone(),
                })
            }
            PendingEndpoint::User => self.emit(AuthEvent::UserAuthenticated { success: false }),
            PendingEndpoint::None => {}
        }
    }

    fn record_error(&mut self, error: ApiError) {
        tracing::error!(
            status = error.status,
            error = %error.error,
            message = %error.message,
            "TwitchAuth: {error}"
        );
        self.last_error = error;
    }

    fn emit(&self, event: AuthEvent) {
        if self.events.send(event).is_err() {
            tracing::debug!("AuthEvent listener dropped");
        }
    }
}
