//! OAuth implicit-grant helpers.
//!
//! Builds the authorization URL the browser is sent to and pulls the access
//! token back out of the redirect URL.

use url::Url;

use crate::{AuthConfig, TwitchError};

/// Generate the implicit-grant authorization URL for the configured scopes.
pub fn authorization_url(config: &AuthConfig) -> Result<String, TwitchError> {
    let scope_str = config.scopes.join(" ");
    let mut url = Url::parse(&config.endpoints.authorize)?;
    url.query_pairs_mut()
        .append_pair("response_type", "token")
        .append_pair("client_id", &config.client_id)
        .append_pair("redirect_uri", &config.redirect_uri)
        .append_pair("scope", &scope_str)
        .append_pair("force_verify", if config.force_verify { "true" } else { "false" });
    Ok(url.to_string())
}

/// Whether `url` is the redirect page carrying the token.
pub fn is_token_redirect(config: &AuthConfig, url: &str) -> bool {
    url.contains(&config.endpoints.token_redirect_marker)
}

/// Extract `access_token` from the redirect URL fragment, falling back to the
/// query string.
pub fn extract_access_token(redirect_url: &str) -> Result<String, TwitchError> {
    let parsed = Url::parse(redirect_url)?;

    let from_pairs = |pairs: &str| {
        url::form_urlencoded::parse(pairs.as_bytes())
            .find(|(key, _)| key == "access_token")
            .map(|(_, value)| value.into_owned())
            .filter(|value| !value.is_empty())
    };

    parsed
        .fragment()
        .and_then(from_pairs)
        .or_else(|| parsed.query().and_then(from_pairs))
        .ok_or(TwitchError::MissingAccessToken)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_authorization_url_generation() {
        let mut config = AuthConfig::new("test_client_id");
        config.scopes = vec!["user_read".into(), "user_subscriptions".into()];
        config.force_verify = true;
        let url = authorization_url(&config).unwrap();

        assert!(url.starts_with("https://id.twitch.tv/oauth2/authorize"));
        assert!(url.contains("client_id=test_client_id"));
        assert!(url.contains("response_type=token"));
        assert!(url.contains("force_verify=true"));
        assert!(url.contains("scope=user_read+user_subscriptions"));
        assert!(url.contains("redirect_uri=http%3A%2F%2Flocalhost"));
    }

    #[test]
    fn test_force_verify_false() {
        let url = authorization_url(&AuthConfig::new("id")).unwrap();
        assert!(url.contains("force_verify=false"));
    }

    #[test]
    fn test_extract_token_from_fragment() {
        let token = extract_access_token(
            "http://localhost/#access_token=0123456789abcdefghijABCDEFGHIJ&scope=user_read&token_type=bearer",
        )
        .unwrap();
        assert_eq!(token, "0123456789abcdefghijABCDEFGHIJ");
    }

    #[test]
    fn test_extract_token_from_query() {
        let token = extract_access_token("http://localhost/?access_token=abc&scope=x").unwrap();
        assert_eq!(token, "abc");
    }

    #[test]
    fn test_extract_token_missing() {
        let err = extract_access_token("http://localhost/#error=access_denied").unwrap_err();
        assert!(matches!(err, TwitchError::MissingAccessToken));

        let err = extract_access_token("http://localhost/#access_token=").unwrap_err();
        assert!(matches!(err, TwitchError::MissingAccessToken));
    }

    #[test]
    fn test_token_redirect_marker() {
        let config = AuthConfig::new("id");
        assert!(is_token_redirect(&config, "http://localhost/#access_token=abc"));
        assert!(!is_token_redirect(
            &config,
            "https://www.twitch.tv/login?client_id=id"
        ));
    }
}
