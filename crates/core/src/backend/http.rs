use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::errors::CoreError;
use crate::models::holding::{Holding, HoldingId, HoldingPayload};
use crate::models::session::Session;
use crate::models::settings::Settings;
use crate::models::stats::PortfolioStats;
use super::traits::PortfolioBackend;

/// Client for the portfolio REST API.
///
/// - `GET    /portfolio/`       holdings with current prices
/// - `GET    /portfolio/stats`  portfolio-wide stats
/// - `POST   /portfolio/`       create a holding
/// - `DELETE /portfolio/{id}`   delete a holding
///
/// Every request carries the session's bearer token. Error responses are
/// turned into `CoreError::Api` with the backend's `detail` text, if any.
pub struct HttpBackend {
    client: Client,
    base_url: String,
    session: Session,
}

impl HttpBackend {
    pub fn new(settings: &Settings, session: Session) -> Result<Self, CoreError> {
        settings.validate()?;
        let builder = Client::builder();
        #[cfg(not(target_arch = "wasm32"))]
        let builder = builder.timeout(settings.request_timeout());
        Ok(Self {
            client: builder.build()?,
            base_url: settings.api_base_url.trim().trim_end_matches('/').to_string(),
            session,
        })
    }

    /// Point the client at another server (tests use a local mock).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        debug!("portfolio API request: {} {}", method, path);
        self.client
            .request(method, format!("{}{path}", self.base_url))
            .bearer_auth(self.session.access_token())
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response, CoreError> {
        let response = request.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        let detail = extract_detail(&body);
        warn!(status = status.as_u16(), ?detail, "portfolio API returned an error");
        Err(CoreError::Api {
            status: status.as_u16(),
            detail,
        })
    }

    async fn send_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, CoreError> {
        let body = self.send(request).await?.text().await?;
        Ok(serde_json::from_str(&body)?)
    }
}

#[derive(Deserialize)]
struct ErrorBody {
    detail: Option<Value>,
}

/// Pull a human-readable message out of an error body.
///
/// `detail` is either a plain string or a list of `{ "msg": ... }` entries
/// (request validation failures); the messages of a list are joined.
fn extract_detail(body: &str) -> Option<String> {
    let parsed: ErrorBody = serde_json::from_str(body).ok()?;
    match parsed.detail? {
        Value::String(s) if !s.trim().is_empty() => Some(s),
        Value::Array(items) => {
            let messages: Vec<&str> = items
                .iter()
                .filter_map(|item| item.get("msg").and_then(Value::as_str))
                .collect();
            (!messages.is_empty()).then(|| messages.join("; "))
        }
        Value::Null | Value::String(_) => None,
        other => Some(other.to_string()),
    }
}

#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
impl PortfolioBackend for HttpBackend {
    fn name(&self) -> &str {
        "HTTP"
    }

    async fn list_holdings(&self) -> Result<Vec<Holding>, CoreError> {
        self.send_json(self.request(Method::GET, "/portfolio/")).await
    }

    async fn portfolio_stats(&self) -> Result<PortfolioStats, CoreError> {
        self.send_json(self.request(Method::GET, "/portfolio/stats"))
            .await
    }

    async fn create_holding(&self, payload: &HoldingPayload) -> Result<Holding, CoreError> {
        self.send_json(self.request(Method::POST, "/portfolio/").json(payload))
            .await
    }

    async fn delete_holding(&self, id: &HoldingId) -> Result<(), CoreError> {
        self.send(self.request(Method::DELETE, &format!("/portfolio/{id}")))
            .await?;
        Ok(())
    }
}
