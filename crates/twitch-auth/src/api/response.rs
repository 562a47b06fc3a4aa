//! Response validation and typed decoding.

use serde::de::DeserializeOwned;

use super::models::{ApiError, ChannelSearchResponse, ChannelUser};
use crate::{HttpResponse, TwitchError};

/// True only when the transport succeeded and the status is 2xx.
pub fn is_valid(response: &HttpResponse, transport_ok: bool) -> bool {
    transport_ok && (200..300).contains(&response.status)
}

/// Decode a JSON body into a fixed-shape record. Unknown fields are ignored.
pub fn decode<T: DeserializeOwned>(body: &str) -> Result<T, TwitchError> {
    Ok(serde_json::from_str(body)?)
}

/// Unwrap the first channel from a channel-search body and decode it.
pub fn decode_channel(body: &str) -> Result<ChannelUser, TwitchError> {
    let search: ChannelSearchResponse = serde_json::from_str(body)?;
    let first = search
        .channels
        .into_iter()
        .next()
        .ok_or_else(|| {
            <serde_json::Error as serde::de::Error>::custom("channel search returned no channels")
        })?;
    Ok(serde_json::from_value(first)?)
}

/// Best-effort decode of an error body; anything unparseable yields defaults
/// for the missing parts.
pub fn decode_error(response: &HttpResponse) -> ApiError {
    match serde_json::from_str::<ApiError>(&response.body) {
        Ok(err) => err,
        Err(e) => {
            tracing::debug!(error = %e, "Error body is not a Twitch error record");
            ApiError {
                status: response.status,
                ..ApiError::default()
            }
        }
    }
}
