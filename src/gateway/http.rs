//! HTTP implementation of the submission gateway.

use async_trait::async_trait;
use serde::Serialize;
use uuid::Uuid;

use super::SubmissionGateway;
use crate::error::SubmissionError;
use crate::intake::{ClientIntake, DesignerIntake};

/// Talks to the REST layer's create endpoints.
pub struct HttpGateway {
    base_url: String,
    client: reqwest::Client,
}

impl HttpGateway {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }

    fn api_url(&self, path: &str) -> String {
        format!("{}/api/{path}", self.base_url)
    }

    /// POST `body` and pull `<key>.id` out of the response.
    ///
    /// A request that never reached the server is retried once. Anything that
    /// got a response is not, so a create is never issued twice.
    async fn create<T: Serialize + Sync>(
        &self,
        path: &str,
        key: &str,
        body: &T,
    ) -> Result<Uuid, SubmissionError> {
        let url = self.api_url(path);
        let resp = match self.client.post(&url).json(body).send().await {
            Ok(resp) => resp,
            Err(e) if e.is_connect() => {
                tracing::warn!(url = %url, error = %e, "Submission could not connect; retrying once");
                self.client
                    .post(&url)
                    .json(body)
                    .send()
                    .await
                    .map_err(|e| SubmissionError::Network(e.to_string()))?
            }
            Err(e) => return Err(SubmissionError::Network(e.to_string())),
        };

        let status = resp.status();
        let payload: serde_json::Value = resp.json().await.unwrap_or_default();

        if !status.is_success() {
            let message = payload["error"]
                .as_str()
                .unwrap_or("unknown error")
                .to_string();
            return Err(SubmissionError::Server {
                status: status.as_u16(),
                message,
            });
        }

        payload[key]["id"]
            .as_str()
            .and_then(|id| Uuid::parse_str(id).ok())
            .ok_or_else(|| {
                tracing::warn!(url = %url, status = status.as_u16(), "Created record has no id in reply");
                SubmissionError::Unconfirmed {
                    status: status.as_u16(),
                    key: key.to_string(),
                }
            })
    }
}

#[async_trait]
impl SubmissionGateway for HttpGateway {
    async fn submit_client(&self, intake: &ClientIntake) -> Result<Uuid, SubmissionError> {
        self.create("clients", "client", intake).await
    }

    async fn submit_designer(&self, intake: &DesignerIntake) -> Result<Uuid, SubmissionError> {
        self.create("users", "user", intake).await
    }
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use axum::routing::post;
    use axum::{Json, Router};

    use super::*;
    use crate::store::models::ClientType;

    fn intake() -> ClientIntake {
        ClientIntake {
            full_name: "Ada".into(),
            email: "ada@example.com".into(),
            client_type: ClientType::Individual,
            business_name: None,
            looking_for: "Logo".into(),
            project_description: None,
            budget_range: None,
            timeline: None,
            inspiration_images: vec![],
        }
    }

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        let gateway = HttpGateway::new("http://localhost:3000/");
        assert_eq!(gateway.api_url("clients"), "http://localhost:3000/api/clients");
    }

    /// Serve `POST /api/clients` with a fixed reply, return the base URL.
    async fn start_stub(status: StatusCode, reply: serde_json::Value) -> String {
        let app = Router::new().route(
            "/api/clients",
            post(move || {
                let reply = reply.clone();
                async move { (status, Json(reply)) }
            }),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}")
    }

    #[tokio::test]
    async fn created_without_id_is_unconfirmed() {
        let base = start_stub(StatusCode::CREATED, serde_json::json!({})).await;
        let err = HttpGateway::new(base)
            .submit_client(&intake())
            .await
            .unwrap_err();
        assert_eq!(
            err,
            SubmissionError::Unconfirmed {
                status: 201,
                key: "client".into()
            }
        );
    }

    #[tokio::test]
    async fn error_status_carries_server_message() {
        let reply = serde_json::json!({ "error": "Failed to create client" });
        let base = start_stub(StatusCode::INTERNAL_SERVER_ERROR, reply).await;
        let err = HttpGateway::new(base)
            .submit_client(&intake())
            .await
            .unwrap_err();
        assert_eq!(
            err,
            SubmissionError::Server {
                status: 500,
                message: "Failed to create client".into()
            }
        );
    }

    #[tokio::test]
    async fn unreachable_server_is_a_network_error() {
        // Bind then drop to get a port nothing listens on.
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let gateway = HttpGateway::new(format!("http://{addr}"));
        let err = gateway.submit_client(&intake()).await.unwrap_err();
        assert!(matches!(err, SubmissionError::Network(_)), "got {err:?}");
    }
}
