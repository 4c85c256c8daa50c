//! Mailer trait and HTTP provider client.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use ureq::Agent;

use crate::error::DeliveryError;

/// Default HTTP timeout in seconds.
const DEFAULT_TIMEOUT: u64 = 30;

/// A rendered email addressed to one recipient.
///
/// Missing fields deserialize as empty and are reported by [`validate`](Self::validate).
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct OutgoingEmail {
    pub to: String,
    pub subject: String,
    pub html: String,
}

impl OutgoingEmail {
    /// Check required fields before contacting the provider.
    pub fn validate(&self) -> Result<(), DeliveryError> {
        let to = self.to.trim();
        if to.is_empty() {
            return Err(DeliveryError::Validation("recipient address is required"));
        }
        if !to.contains('@') || to.contains(char::is_whitespace) {
            return Err(DeliveryError::Validation("recipient address is malformed"));
        }
        if self.subject.trim().is_empty() {
            return Err(DeliveryError::Validation("subject is required"));
        }
        if self.html.trim().is_empty() {
            return Err(DeliveryError::Validation("html is required"));
        }
        Ok(())
    }
}

/// Provider acknowledgement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryReceipt {
    /// Provider-assigned message id.
    pub id: String,
}

/// Sends emails. Implementations block; async callers run them on a
/// blocking thread.
pub trait Mailer: Send + Sync {
    /// Deliver one email.
    ///
    /// # Errors
    ///
    /// Returns [`DeliveryError::Validation`] for incomplete input and an
    /// upstream variant when the provider rejects the message or is unreachable.
    fn send(&self, email: &OutgoingEmail) -> Result<DeliveryReceipt, DeliveryError>;
}

#[derive(Serialize)]
struct SendRequest<'a> {
    from: &'a str,
    to: &'a str,
    subject: &'a str,
    html: &'a str,
}

/// Client for a Resend-compatible `POST /emails` API.
pub struct HttpMailer {
    agent: Agent,
    api_url: String,
    api_key: String,
    from: String,
}

impl HttpMailer {
    /// Create a client for `api_url` (e.g. `https://api.resend.com`).
    pub fn new(api_url: &str, api_key: impl Into<String>, from: impl Into<String>) -> Self {
        let agent = Agent::config_builder()
            .timeout_global(Some(Duration::from_secs(DEFAULT_TIMEOUT)))
            .http_status_as_error(false)
            .build()
            .into();

        Self {
            agent,
            api_url: api_url.trim_end_matches('/').to_owned(),
            api_key: api_key.into(),
            from: from.into(),
        }
    }

    fn emails_url(&self) -> String {
        format!("{}/emails", self.api_url)
    }
}

impl std::fmt::Debug for HttpMailer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpMailer")
            .field("api_url", &self.api_url)
            .field("from", &self.from)
            .finish_non_exhaustive()
    }
}

impl Mailer for HttpMailer {
    fn send(&self, email: &OutgoingEmail) -> Result<DeliveryReceipt, DeliveryError> {
        email.validate()?;

        let request = SendRequest {
            from: &self.from,
            to: email.to.trim(),
            subject: &email.subject,
            html: &email.html,
        };

        tracing::info!(to = %request.to, "Sending test email");

        let response = self
            .agent
            .post(&self.emails_url())
            .header("Authorization", &format!("Bearer {}", self.api_key))
            .header("Accept", "application/json")
            .send_json(&request)?;

        let status = response.status().as_u16();
        let mut body_reader = response.into_body();

        if status >= 400 {
            let error_body = body_reader
                .read_to_string()
                .unwrap_or_else(|_| "(unable to read error body)".to_owned());
            tracing::warn!(status, "Provider rejected email");
            return Err(DeliveryError::HttpResponse {
                status,
                body: error_body,
            });
        }

        let body = body_reader.read_to_string()?;
        let receipt: DeliveryReceipt = serde_json::from_str(&body)?;
        tracing::info!(id = %receipt.id, "Test email accepted");
        Ok(receipt)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn email() -> OutgoingEmail {
        OutgoingEmail {
            to: "someone@example.com".to_owned(),
            subject: "Test".to_owned(),
            html: "<p>Hi</p>".to_owned(),
        }
    }

    /// Run the blocking client off the async test runtime.
    async fn send_blocking(
        mailer: HttpMailer,
        email: OutgoingEmail,
    ) -> Result<DeliveryReceipt, DeliveryError> {
        tokio::task::spawn_blocking(move || mailer.send(&email))
            .await
            .unwrap()
    }

    #[test]
    fn test_validation() {
        let cases = [
            (OutgoingEmail { to: String::new(), ..email() }, "recipient address is required"),
            (OutgoingEmail { to: "nobody".to_owned(), ..email() }, "recipient address is malformed"),
            (OutgoingEmail { subject: " ".to_owned(), ..email() }, "subject is required"),
            (OutgoingEmail { html: String::new(), ..email() }, "html is required"),
        ];
        for (message, expected) in cases {
            let Err(DeliveryError::Validation(reason)) = message.validate() else {
                panic!("expected validation error for {message:?}");
            };
            assert_eq!(reason, expected);
        }
        assert!(email().validate().is_ok());
    }

    #[test]
    fn test_validation_error_is_not_upstream() {
        assert!(!DeliveryError::Validation("x").is_upstream());
        assert!(DeliveryError::HttpResponse { status: 500, body: String::new() }.is_upstream());
    }

    #[tokio::test]
    async fn test_send_success() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/emails"))
            .and(header("authorization", "Bearer key-1"))
            .and(body_partial_json(json!({
                "from": "Blockmail <test@example.com>",
                "to": "someone@example.com",
                "subject": "Test",
                "html": "<p>Hi</p>",
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "msg_123"})))
            .expect(1)
            .mount(&server)
            .await;
        let mailer = HttpMailer::new(
            &format!("{}/", server.uri()),
            "key-1",
            "Blockmail <test@example.com>",
        );

        let receipt = send_blocking(mailer, email()).await.unwrap();

        assert_eq!(receipt, DeliveryReceipt { id: "msg_123".to_owned() });
        let requests = server.received_requests().await.unwrap();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].url.path(), "/emails");
    }

    #[tokio::test]
    async fn test_send_provider_error_carries_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/emails"))
            .respond_with(
                ResponseTemplate::new(422).set_body_json(json!({"message": "invalid from"})),
            )
            .mount(&server)
            .await;
        let mailer = HttpMailer::new(&server.uri(), "key", "a@example.com");

        let err = send_blocking(mailer, email()).await.unwrap_err();

        let DeliveryError::HttpResponse { status, body } = err else {
            panic!("expected HttpResponse, got {err:?}");
        };
        assert_eq!(status, 422);
        assert!(body.contains("invalid from"));
    }

    #[tokio::test]
    async fn test_send_rejects_invalid_without_request() {
        let server = MockServer::start().await;
        let mailer = HttpMailer::new(&server.uri(), "key", "a@example.com");

        let err = send_blocking(mailer, OutgoingEmail { subject: String::new(), ..email() })
            .await
            .unwrap_err();

        assert!(matches!(err, DeliveryError::Validation(_)));
        assert!(server.received_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_send_malformed_receipt() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/emails"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;
        let mailer = HttpMailer::new(&server.uri(), "key", "a@example.com");

        let err = send_blocking(mailer, email()).await.unwrap_err();

        assert!(matches!(err, DeliveryError::Json(_)));
    }

    #[test]
    fn test_debug_hides_api_key() {
        let mailer = HttpMailer::new("https://api.example.com", "secret-key", "a@example.com");

        assert!(!format!("{mailer:?}").contains("secret-key"));
    }
}
