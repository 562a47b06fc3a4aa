//! Headless Twitch login and channel check.
//!
//! Reads `TWITCH_*` settings from the environment (and `.env`), logs the user
//! in through the implicit-grant redirect, then optionally checks whether the
//! user subscribes to or follows `TWITCH_CHECK_CHANNEL`.

mod terminal;

use anyhow::{Context, bail};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

use twitch_auth::{AuthConfig, AuthEvent, AuthFlow, FlowState, HttpTransport, ReqwestTransport};

use terminal::TerminalBrowser;

/// Follow-up check run once the user is authenticated.
#[derive(Debug, Clone, PartialEq, Eq)]
enum ChannelCheck {
    Subscription(String),
    Following(String),
}

impl ChannelCheck {
    fn from_env() -> anyhow::Result<Option<Self>> {
        let channel = std::env::var("TWITCH_CHECK_CHANNEL").unwrap_or_default();
        let kind = std::env::var("TWITCH_CHECK").unwrap_or_default();
        Self::parse(channel.trim(), kind.trim())
    }

    fn parse(channel: &str, kind: &str) -> anyhow::Result<Option<Self>> {
        if channel.is_empty() {
            return Ok(None);
        }
        match kind.to_ascii_lowercase().as_str() {
            "" | "subscription" | "subscribed" => Ok(Some(Self::Subscription(channel.into()))),
            "following" | "follow" => Ok(Some(Self::Following(channel.into()))),
            other => bail!("TWITCH_CHECK must be 'subscription' or 'following', got '{other}'"),
        }
    }
}

enum Step {
    Continue,
    Done,
}

/// A finished exchange that queued no notification (a subscription or follow
/// body that failed to decode) leaves nothing else to wait for.
fn ended_without_result<T: HttpTransport>(flow: &AuthFlow<T>, events_pending: bool) -> bool {
    flow.state() == FlowState::Idle && !events_pending
}

fn handle_event<T: HttpTransport>(
    flow: &mut AuthFlow<T>,
    event: AuthEvent,
    check: Option<&ChannelCheck>,
) -> anyhow::Result<Step> {
    match event {
        AuthEvent::AuthenticationPageLoaded => {
            tracing::info!("Twitch login page loaded, waiting for the token redirect");
            Ok(Step::Continue)
        }
        AuthEvent::AccessTokenPageLoaded => {
            tracing::info!("Token redirect received");
            Ok(Step::Continue)
        }
        AuthEvent::UserAuthenticated { success: false } => {
            bail!("authentication failed: {}", flow.last_error());
        }
        AuthEvent::UserAuthenticated { success: true } => {
            println!("{}", serde_json::to_string_pretty(flow.user())?);
            match check {
                Some(ChannelCheck::Subscription(channel)) => {
                    flow.is_user_subscribed_to_channel(channel)?;
                    Ok(Step::Continue)
                }
                Some(ChannelCheck::Following(channel)) => {
                    flow.is_user_following_channel(channel)?;
                    Ok(Step::Continue)
                }
                None => Ok(Step::Done),
            }
        }
        AuthEvent::UserSubscribedToChannel {
            success,
            subscription,
        } => {
            if success {
                println!("{}", serde_json::to_string_pretty(&subscription)?);
            } else {
                println!("Not subscribed: {}", flow.last_error());
            }
            Ok(Step::Done)
        }
        AuthEvent::UserFollowingChannel { success, following } => {
            if success {
                println!("{}", serde_json::to_string_pretty(&following)?);
            } else {
                println!("Not following: {}", flow.last_error());
            }
            Ok(Step::Done)
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if let Err(e) = dotenvy::dotenv() {
        if !e.not_found() {
            return Err(e).context("failed to read .env");
        }
    }

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let config = AuthConfig::from_env()?;
    let check = ChannelCheck::from_env()?;

    let (event_tx, mut event_rx) = mpsc::unbounded_channel();
    let (completion_tx, mut completion_rx) = mpsc::unbounded_channel();
    let mut flow = AuthFlow::new(config, ReqwestTransport::new(completion_tx), event_tx);

    if let Ok(token) = std::env::var("TWITCH_ACCESS_TOKEN") {
        if !token.trim().is_empty() {
            flow.set_access_token(token.trim());
        }
    }

    let mut browser = TerminalBrowser::default();
    flow.authenticate(Some(&mut browser))?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let awaiting_redirect =
            browser.is_observing() && flow.state() == FlowState::AwaitingBrowserRedirect;

        tokio::select! {
            Some(completion) = completion_rx.recv() => {
                flow.handle_response(completion);
                if ended_without_result(&flow, !event_rx.is_empty()) {
                    tracing::warn!(last_error = %flow.last_error(), "Twitch check produced no result");
                    println!("No result: the Twitch response could not be decoded");
                    break;
                }
            }
            Some(event) = event_rx.recv() => {
                if let Step::Done = handle_event(&mut flow, event, check.as_ref())? {
                    break;
                }
            }
            line = lines.next_line(), if awaiting_redirect => match line? {
                Some(url) => flow.handle_url_changed(url.trim()),
                None => bail!("stdin closed before the token redirect was pasted"),
            },
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Interrupted, shutting down");
                break;
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use twitch_auth::ApiRequest;

    use super::*;

    #[derive(Default)]
    struct CountingTransport {
        sent: usize,
    }

    impl HttpTransport for CountingTransport {
        fn send(&mut self, _request: ApiRequest) {
            self.sent += 1;
        }
    }

    fn flow() -> AuthFlow<CountingTransport> {
        let (tx, _rx) = mpsc::unbounded_channel();
        AuthFlow::new(AuthConfig::new("cid"), CountingTransport::default(), tx)
    }

    #[test]
    fn test_idle_flow_without_events_has_ended() {
        assert!(ended_without_result(&flow(), false));
        assert!(!ended_without_result(&flow(), true));
    }

    #[test]
    fn test_request_in_flight_has_not_ended() {
        let mut flow = flow();
        flow.set_access_token("abc");
        flow.authenticate(None).unwrap();

        assert_eq!(flow.transport().sent, 1);
        assert!(!ended_without_result(&flow, false));
    }

    #[test]
    fn test_check_defaults_to_subscription() {
        assert_eq!(
            ChannelCheck::parse("streamer", "").unwrap(),
            Some(ChannelCheck::Subscription("streamer".into()))
        );
    }

    #[test]
    fn test_check_following() {
        assert_eq!(
            ChannelCheck::parse("streamer", "Following").unwrap(),
            Some(ChannelCheck::Following("streamer".into()))
        );
    }

    #[test]
    fn test_no_channel_means_no_check() {
        assert_eq!(ChannelCheck::parse("", "following").unwrap(), None);
    }

    #[test]
    fn test_unknown_check_is_rejected() {
        assert!(ChannelCheck::parse("streamer", "raid").is_err());
    }
}
