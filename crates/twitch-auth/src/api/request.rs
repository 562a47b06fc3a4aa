use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue};

use super::*;

impl TwitchApiClient {
    pub fn new(client_id: impl Into<String>, endpoints: Endpoints) -> Self {
        Self {
            client_id: client_id.into(),
            endpoints,
        }
    }

    /// Build auth headers from the given token.
    fn auth_headers(&self, token: &str) -> Result<HeaderMap, TwitchError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(ACCEPT_V5));
        headers.insert("client-id", HeaderValue::from_str(&self.client_id)?);
        headers.insert(AUTHORIZATION, HeaderValue::from_str(&format!("OAuth {token}"))?);
        Ok(headers)
    }

    /// Build a request carrying the client id and token for `endpoint`.
    pub fn build_request(
        &self,
        token: &str,
        endpoint: &str,
        method: Method,
    ) -> Result<ApiRequest, TwitchError> {
        Ok(ApiRequest {
            method,
            url: endpoint.to_string(),
            headers: self.auth_headers(token)?,
        })
    }

    /// GET the authenticated user.
    pub fn user_request(&self, token: &str) -> Result<ApiRequest, TwitchError> {
        self.build_request(token, &self.endpoints.user, Method::GET)
    }

    /// GET the channel search for `channel_name`.
    pub fn channel_request(
        &self,
        token: &str,
        channel_name: &str,
    ) -> Result<ApiRequest, TwitchError> {
        let encoded: String =
            url::form_urlencoded::byte_serialize(channel_name.as_bytes()).collect();
        let endpoint = format!("{}{encoded}", self.endpoints.channel);
        self.build_request(token, &endpoint, Method::GET)
    }

    /// GET whether `user_id` subscribes to `channel_id`.
    pub fn subscription_request(
        &self,
        token: &str,
        user_id: &str,
        channel_id: &str,
    ) -> Result<ApiRequest, TwitchError> {
        let endpoint = fill_template(&self.endpoints.subscription, user_id, channel_id);
        self.build_request(token, &endpoint, Method::GET)
    }

    /// GET whether `user_id` follows `channel_id`.
    pub fn following_request(
        &self,
        token: &str,
        user_id: &str,
        channel_id: &str,
    ) -> Result<ApiRequest, TwitchError> {
        let endpoint = fill_template(&self.endpoints.following, user_id, channel_id);
        self.build_request(token, &endpoint, Method::GET)
    }
}

/// Substitute `$1` and `$2` in an endpoint template.
fn fill_template(template: &str, first: &str, second: &str) -> String {
    template.replace("$1", first).replace("$2", second)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> TwitchApiClient {
        TwitchApiClient::new("cid", Endpoints::default())
    }

    #[test]
    fn test_user_request_headers() {
        let req = client().user_request("abc").unwrap();
        assert_eq!(req.method, Method::GET);
        assert_eq!(req.url, "https://api.twitch.tv/kraken/user");
        assert_eq!(req.headers["client-id"], "cid");
        assert_eq!(req.headers[AUTHORIZATION], "OAuth abc");
        assert_eq!(req.headers[ACCEPT], ACCEPT_V5);
    }

    #[test]
    fn test_channel_name_is_appended_encoded() {
        let req = client().channel_request("abc", "some channel").unwrap();
        assert_eq!(
            req.url,
            "https://api.twitch.tv/kraken/search/channels?query=some+channel"
        );
    }

    #[test]
    fn test_templates_are_filled() {
        let sub = client().subscription_request("abc", "111", "222").unwrap();
        assert_eq!(
            sub.url,
            "https://api.twitch.tv/kraken/users/111/subscriptions/222"
        );

        let follow = client().following_request("abc", "111", "222").unwrap();
        assert_eq!(
            follow.url,
            "https://api.twitch.tv/kraken/users/111/follows/channels/222"
        );
    }

    #[test]
    fn test_invalid_token_is_rejected() {
        let err = client().user_request("bad\ntoken").unwrap_err();
        assert!(matches!(err, TwitchError::InvalidHeader(_)));
    }
}
