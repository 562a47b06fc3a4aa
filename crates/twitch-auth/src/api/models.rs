use std::fmt;

use serde::{Deserialize, Serialize};

/// Authenticated user from GET /kraken/user.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TwitchUser {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub email_verified: bool,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub logo: Option<String>,
    #[serde(default, rename = "type")]
    pub user_type: String,
    #[serde(default)]
    pub partnered: bool,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub updated_at: String,
}

/// Channel resolved from GET /kraken/search/channels.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChannelUser {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub game: Option<String>,
    #[serde(default)]
    pub logo: Option<String>,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub followers: u64,
    #[serde(default)]
    pub views: u64,
    #[serde(default)]
    pub partner: bool,
}

/// Search envelope; the first channel is the match.
#[derive(Debug, Deserialize)]
pub(crate) struct ChannelSearchResponse {
    #[serde(default)]
    pub channels: Vec<serde_json::Value>,
}

/// A user's subscription to a channel.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Subscription {
    #[serde(rename = "_id")]
    pub id: String,
    pub sub_plan: String,
    #[serde(default)]
    pub sub_plan_name: String,
    #[serde(default)]
    pub is_gift: bool,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub channel: Option<ChannelUser>,
}

/// A user's follow relationship to a channel.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Following {
    pub created_at: String,
    #[serde(default)]
    pub notifications: bool,
    #[serde(default)]
    pub channel: Option<ChannelUser>,
}

/// Error body returned by Twitch on failure. Missing fields stay at default.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiError {
    pub status: u16,
    pub error: String,
    pub message: String,
}

impl ApiError {
    pub fn new(status: u16, error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            status,
            error: error.into(),
            message: message.into(),
        }
    }

    pub fn browser_not_found() -> Self {
        Self::new(404, "Browser Widget not found", "Browser widget could not be found")
    }

    pub fn channel_not_found() -> Self {
        Self::new(404, "Not Found", "Channel could not be found")
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({}): {}", self.error, self.status, self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_deserializes_v5_body() {
        let body = r#"{
            "_id": "44322889",
            "bio": "Just a gamer playing games and chatting. :)",
            "created_at": "2013-06-03T19:12:02.580593Z",
            "display_name": "dallas",
            "email": "email-address@provider.com",
            "email_verified": true,
            "logo": "https://static-cdn.jtvnw.net/jtv_user_pictures/dallas-profile_image-1a2c906ee2c35f12-300x300.png",
            "name": "dallas",
            "notifications": { "email": false, "push": true },
            "partnered": false,
            "twitter_connected": false,
            "type": "staff",
            "updated_at": "2016-12-14T01:01:44.704327Z"
        }"#;

        let user: TwitchUser = serde_json::from_str(body).unwrap();
        assert_eq!(user.id, "44322889");
        assert_eq!(user.name, "dallas");
        assert_eq!(user.user_type, "staff");
        assert!(user.email_verified);
    }

    #[test]
    fn test_following_requires_created_at() {
        let result = serde_json::from_str::<Following>(r#"{"notifications": true}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_api_error_is_best_effort() {
        let err: ApiError = serde_json::from_str(r#"{"message": "invalid oauth token"}"#).unwrap();
        assert_eq!(err.status, 0);
        assert_eq!(err.error, "");
        assert_eq!(err.message, "invalid oauth token");
    }

    #[test]
    fn test_api_error_display() {
        assert_eq!(
            ApiError::channel_not_found().to_string(),
            "Not Found(404): Channel could not be found"
        );
    }
}
