use crate::config::BackendConfig;
use crate::domain::model::SessionContext;
use crate::utils::error::{Result, ZooError};
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const DEFAULT_BACKEND_MESSAGE: &str = "The backend rejected the request";

/// Query parameters in PostgREST form, e.g. `("id", "eq.A101")`.
pub type Query = Vec<(String, String)>;

pub fn eq(column: &str, value: &str) -> (String, String) {
    (column.to_string(), format!("eq.{}", value))
}

pub fn param(name: &str, value: impl ToString) -> (String, String) {
    (name.to_string(), value.to_string())
}

#[derive(Debug, Deserialize)]
struct BackendErrorBody {
    message: Option<String>,
    code: Option<String>,
    details: Option<String>,
    hint: Option<String>,
}

/// Thin client over the backend's relational REST endpoint.
#[derive(Debug, Clone)]
pub struct BackendClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl BackendClient {
    pub fn new(config: &BackendConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;

        Ok(Self {
            client,
            base_url: config.url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
        })
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }

    fn authorize(&self, request: RequestBuilder, ctx: &SessionContext) -> RequestBuilder {
        let bearer = ctx.access_token.as_deref().unwrap_or(&self.api_key);
        request
            .header("apikey", &self.api_key)
            .header("Authorization", format!("Bearer {}", bearer))
            .header("Accept", "application/json")
    }

    /// Filtered read, returns every matching row.
    pub async fn select<T: DeserializeOwned>(
        &self,
        ctx: &SessionContext,
        table: &str,
        query: &Query,
    ) -> Result<Vec<T>> {
        tracing::debug!("📡 GET {} {:?}", table, query);
        let request = self.client.get(self.table_url(table)).query(query);
        let response = self.execute(self.authorize(request, ctx)).await?;
        Ok(response.json().await?)
    }

    /// Partial update of the filtered rows, returning them with `select` applied.
    pub async fn update<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        ctx: &SessionContext,
        table: &str,
        query: &Query,
        body: &B,
    ) -> Result<Vec<T>> {
        tracing::debug!("📡 PATCH {} {:?}", table, query);
        let request = self
            .client
            .patch(self.table_url(table))
            .query(query)
            .header("Prefer", "return=representation")
            .json(body);
        let response = self.execute(self.authorize(request, ctx)).await?;
        Ok(response.json().await?)
    }

    pub async fn update_minimal<B: Serialize + ?Sized>(
        &self,
        ctx: &SessionContext,
        table: &str,
        query: &Query,
        body: &B,
    ) -> Result<()> {
        tracing::debug!("📡 PATCH {} {:?} (minimal)", table, query);
        let request = self
            .client
            .patch(self.table_url(table))
            .query(query)
            .header("Prefer", "return=minimal")
            .json(body);
        self.execute(self.authorize(request, ctx)).await?;
        Ok(())
    }

    pub async fn insert<B: Serialize + ?Sized>(
        &self,
        ctx: &SessionContext,
        table: &str,
        body: &B,
    ) -> Result<()> {
        tracing::debug!("📡 POST {}", table);
        let request = self
            .client
            .post(self.table_url(table))
            .header("Prefer", "return=minimal")
            .json(body);
        self.execute(self.authorize(request, ctx)).await?;
        Ok(())
    }

    pub async fn insert_returning<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        ctx: &SessionContext,
        table: &str,
        query: &Query,
        body: &B,
    ) -> Result<Vec<T>> {
        tracing::debug!("📡 POST {} (representation)", table);
        let request = self
            .client
            .post(self.table_url(table))
            .query(query)
            .header("Prefer", "return=representation")
            .json(body);
        let response = self.execute(self.authorize(request, ctx)).await?;
        Ok(response.json().await?)
    }

    /// 送出請求，非 2xx 回應轉成 ZooError::Backend
    async fn execute(&self, request: RequestBuilder) -> Result<Response> {
        let response = request.send().await?;
        let status = response.status();
        tracing::debug!("📡 backend response status: {}", status);

        if status.is_success() {
            return Ok(response);
        }

        let text = response.text().await.unwrap_or_default();
        Err(backend_error(status.as_u16(), &text))
    }
}

fn backend_error(status: u16, body: &str) -> ZooError {
    let parsed: Option<BackendErrorBody> = serde_json::from_str(body).ok();

    let (code, message) = match parsed {
        Some(err) => {
            if let Some(hint) = &err.hint {
                tracing::debug!("backend hint: {}", hint);
            }
            let message = err
                .message
                .filter(|m| !m.trim().is_empty())
                .or(err.details.filter(|d| !d.trim().is_empty()));
            (err.code, message)
        }
        None => (None, None),
    };

    ZooError::Backend {
        status,
        code,
        message: message.unwrap_or_else(|| DEFAULT_BACKEND_MESSAGE.to_string()),
    }
}
