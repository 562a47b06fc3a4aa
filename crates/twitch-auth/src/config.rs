//! Static configuration supplied to [`crate::AuthFlow`] at construction.

use url::Url;

use crate::{DEFAULT_SCOPES, TwitchError};

/// Provider-specific endpoint constants.
///
/// The subscription and following templates carry `$1` (user id) and `$2`
/// (channel id) placeholders. The channel endpoint gets the channel name
/// appended.
#[derive(Debug, Clone)]
pub struct Endpoints {
    pub authorize: String,
    pub user: String,
    pub channel: String,
    pub subscription: String,
    pub following: String,
    /// Substring identifying the redirect URL that carries the token.
    pub token_redirect_marker: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            authorize: "https://id.twitch.tv/oauth2/authorize".into(),
            user: "https://api.twitch.tv/kraken/user".into(),
            channel: "https://api.twitch.tv/kraken/search/channels?query=".into(),
            subscription: "https://api.twitch.tv/kraken/users/$1/subscriptions/$2".into(),
            following: "https://api.twitch.tv/kraken/users/$1/follows/channels/$2".into(),
            token_redirect_marker: "access_token=".into(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub client_id: String,
    pub scopes: Vec<String>,
    pub force_verify: bool,
    pub redirect_uri: String,
    pub endpoints: Endpoints,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            client_id: String::new(),
            scopes: DEFAULT_SCOPES.iter().map(|s| s.to_string()).collect(),
            force_verify: false,
            redirect_uri: "http://localhost".into(),
            endpoints: Endpoints::default(),
        }
    }
}

impl AuthConfig {
    pub fn new(client_id: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            ..Self::default()
        }
    }

    /// Load configuration from `TWITCH_*` environment variables.
    pub fn from_env() -> Result<Self, TwitchError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup, falling back to
    /// defaults for unset or empty keys.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, TwitchError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let g = |key: &str| -> String { lookup(key).unwrap_or_default().trim().to_string() };
        let defaults = Self::default();

        let scopes = {
            let raw = g("TWITCH_SCOPES");
            if raw.is_empty() {
                defaults.scopes
            } else {
                parse_scopes(&raw)
            }
        };

        let config = Self {
            client_id: g("TWITCH_CLIENT_ID"),
            scopes,
            force_verify: parse_bool(&g("TWITCH_FORCE_VERIFY"), defaults.force_verify),
            redirect_uri: {
                let uri = g("TWITCH_REDIRECT_URI");
                if uri.is_empty() { defaults.redirect_uri } else { uri }
            },
            endpoints: defaults.endpoints,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), TwitchError> {
        if self.client_id.is_empty() {
            return Err(TwitchError::Config("TWITCH_CLIENT_ID must be set".into()));
        }
        Url::parse(&self.redirect_uri)
            .map_err(|e| TwitchError::Config(format!("invalid redirect URI: {e}")))?;
        Ok(())
    }
}

fn parse_scopes(raw: &str) -> Vec<String> {
    raw.split(|c: char| c == ',' || c.is_whitespace())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_bool(s: &str, default: bool) -> bool {
    match s.to_ascii_lowercase().as_str() {
        "" => default,
        "1" | "true" | "yes" => true,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_from_lookup_applies_defaults() {
        let config = AuthConfig::from_lookup(lookup(&[("TWITCH_CLIENT_ID", "cid")])).unwrap();
        assert_eq!(config.client_id, "cid");
        assert_eq!(config.scopes, vec!["user_read", "user_subscriptions"]);
        assert!(!config.force_verify);
        assert_eq!(config.redirect_uri, "http://localhost");
    }

    #[test]
    fn test_from_lookup_parses_overrides() {
        let config = AuthConfig::from_lookup(lookup(&[
            ("TWITCH_CLIENT_ID", "cid"),
            ("TWITCH_SCOPES", "user_read, channel_read  user_subscriptions"),
            ("TWITCH_FORCE_VERIFY", "TRUE"),
            ("TWITCH_REDIRECT_URI", "http://localhost:3000/callback"),
        ]))
        .unwrap();
        assert_eq!(
            config.scopes,
            vec!["user_read", "channel_read", "user_subscriptions"]
        );
        assert!(config.force_verify);
        assert_eq!(config.redirect_uri, "http://localhost:3000/callback");
    }

    #[test]
    fn test_missing_client_id_is_rejected() {
        let err = AuthConfig::from_lookup(lookup(&[])).unwrap_err();
        assert!(matches!(err, TwitchError::Config(_)));
    }

    #[test]
    fn test_bad_redirect_uri_is_rejected() {
        let err = AuthConfig::from_lookup(lookup(&[
            ("TWITCH_CLIENT_ID", "cid"),
            ("TWITCH_REDIRECT_URI", "not a url"),
        ]))
        .unwrap_err();
        assert!(matches!(err, TwitchError::Config(_)));
    }
}
