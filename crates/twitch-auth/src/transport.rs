//! HTTP capability used by [`crate::AuthFlow`].
//!
//! Sending is fire-and-forget; the owner of the flow feeds each
//! [`HttpCompletion`] back through [`crate::AuthFlow::handle_response`].

use tokio::sync::mpsc;

use crate::{ApiRequest, TwitchError};

/// Status and body of a finished request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

/// Completion report for one sent request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpCompletion {
    pub transport_ok: bool,
    pub response: HttpResponse,
}

pub trait HttpTransport {
    fn send(&mut self, request: ApiRequest);
}

/// reqwest-backed transport that spawns each request onto the tokio runtime
/// and posts its completion to a channel.
pub struct ReqwestTransport {
    http: reqwest::Client,
    completions: mpsc::UnboundedSender<HttpCompletion>,
}

impl ReqwestTransport {
    pub fn new(completions: mpsc::UnboundedSender<HttpCompletion>) -> Self {
        Self {
            http: reqwest::Client::new(),
            completions,
        }
    }

    async fn execute(
        http: &reqwest::Client,
        request: ApiRequest,
    ) -> Result<HttpResponse, TwitchError> {
        let resp = http
            .request(request.method, &request.url)
            .headers(request.headers)
            .send()
            .await?;

        let status = resp.status().as_u16();
        let body = resp.text().await?;
        Ok(HttpResponse { status, body })
    }
}

impl HttpTransport for ReqwestTransport {
    fn send(&mut self, request: ApiRequest) {
        let http = self.http.clone();
        let completions = self.completions.clone();

        tokio::spawn(async move {
            let url = request.url.clone();
            let completion = match Self::execute(&http, request).await {
                Ok(response) => HttpCompletion {
                    transport_ok: true,
                    response,
                },
                Err(e) => {
                    tracing::warn!(url = %url, error = %e, "Twitch request failed in transport");
                    HttpCompletion {
                        transport_ok: false,
                        response: HttpResponse {
                            status: 0,
                            body: serde_json::json!({
                                "error": "Transport Error",
                                "message": e.to_string(),
                            })
                            .to_string(),
                        },
                    }
                }
            };

            if completions.send(completion).is_err() {
                tracing::debug!(url = %url, "Completion receiver dropped");
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Endpoints, TwitchApiClient};

    #[tokio::test]
    async fn test_unreachable_host_reports_transport_failure() {
        let endpoints = Endpoints {
            user: "http://127.0.0.1:1/kraken/user".into(),
            ..Endpoints::default()
        };
        let request = TwitchApiClient::new("cid", endpoints)
            .user_request("abc")
            .unwrap();

        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut transport = ReqwestTransport::new(tx);
        transport.send(request);

        let completion = rx.recv().await.unwrap();
        assert!(!completion.transport_ok);
        assert_eq!(completion.response.status, 0);
        assert!(completion.response.body.contains("Transport Error"));
    }
}
