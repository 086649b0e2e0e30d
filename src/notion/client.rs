//! Database service client: bearer-token authenticated row creation.

use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, Response};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use tokio::sync::OnceCell;

use crate::config::NotionConfig;
use crate::error::SubmissionError;
use crate::notion::properties::DatabaseRow;

/// Destination for extracted rows.
#[async_trait]
pub trait RowSink: Send + Sync {
    /// Sink name for logging.
    fn name(&self) -> &str;

    /// Create one row. Returns the id the service assigned.
    async fn create_row(&self, row: &DatabaseRow) -> Result<String, SubmissionError>;
}

#[derive(Debug, Deserialize)]
struct DatabaseInfo {
    #[serde(default)]
    data_sources: Vec<DataSourceRef>,
}

#[derive(Debug, Deserialize)]
struct DataSourceRef {
    id: String,
}

#[derive(Debug, Deserialize)]
struct CreatedPage {
    id: String,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    #[serde(default)]
    code: Option<String>,
    message: String,
}

/// HTTP client for the database service.
pub struct NotionClient {
    http: reqwest::Client,
    api_url: String,
    api_key: SecretString,
    database_id: String,
    /// Configured up front or filled by the first successful lookup.
    data_source_id: OnceCell<String>,
    version: String,
}

impl NotionClient {
    pub fn new(config: &NotionConfig) -> Self {
        tracing::debug!(
            api_url = %config.api_url,
            database_id = %config.database_id,
            token_len = config.api_key.expose_secret().len(),
            "Database client configured"
        );
        Self {
            http: reqwest::Client::new(),
            api_url: config.api_url.clone(),
            api_key: config.api_key.clone(),
            database_id: config.database_id.clone(),
            data_source_id: OnceCell::new_with(config.data_source_id.clone()),
            version: config.version.clone(),
        }
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.http
            .request(method, format!("{}/{path}", self.api_url))
            .bearer_auth(self.api_key.expose_secret())
            .header("Notion-Version", &self.version)
    }

    /// The data source rows are created under.
    ///
    /// Uses the configured id when present, otherwise the database's first
    /// data source. A successful lookup is reused for the client's lifetime;
    /// a failed one is retried on the next call.
    pub async fn resolve_data_source_id(&self) -> Result<&str, SubmissionError> {
        self.data_source_id
            .get_or_try_init(|| self.lookup_data_source_id())
            .await
            .map(String::as_str)
    }

    async fn lookup_data_source_id(&self) -> Result<String, SubmissionError> {
        let resp = self
            .request(Method::GET, &format!("databases/{}", self.database_id))
            .send()
            .await
            .map_err(|e| SubmissionError::DataSourceLookup(e.to_string()))?;
        let resp = check_status(resp).await.map_err(|e| match e {
            SubmissionError::Rejected { status, body } => {
                SubmissionError::DataSourceLookup(format!("{status}: {body}"))
            }
            other => other,
        })?;

        let info: DatabaseInfo = resp
            .json()
            .await
            .map_err(|e| SubmissionError::InvalidResponse(e.to_string()))?;
        let id = info
            .data_sources
            .into_iter()
            .next()
            .map(|ds| ds.id)
            .ok_or_else(|| {
                SubmissionError::DataSourceLookup(format!(
                    "database {} has no data sources",
                    self.database_id
                ))
            })?;

        tracing::debug!(data_source = %id.chars().take(8).collect::<String>(), "Resolved data source");
        Ok(id)
    }
}

#[async_trait]
impl RowSink for NotionClient {
    fn name(&self) -> &str {
        "notion"
    }

    async fn create_row(&self, row: &DatabaseRow) -> Result<String, SubmissionError> {
        let data_source_id = self.resolve_data_source_id().await?;

        let body = serde_json::json!({
            "parent": { "data_source_id": data_source_id },
            "properties": row.properties,
        });

        let resp = self.request(Method::POST, "pages").json(&body).send().await?;
        let resp = check_status(resp).await?;

        let page: CreatedPage = resp
            .json()
            .await
            .map_err(|e| SubmissionError::InvalidResponse(e.to_string()))?;
        Ok(page.id)
    }
}

/// Turn a non-success response into `Rejected`, keeping the service's message.
async fn check_status(resp: Response) -> Result<Response, SubmissionError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }

    let text = resp.text().await.unwrap_or_default();
    let body = match serde_json::from_str::<ApiError>(&text) {
        Ok(ApiError {
            code: Some(code),
            message,
        }) => format!("{code}: {message}"),
        Ok(ApiError { code: None, message }) => message,
        Err(_) => text,
    };
    Err(SubmissionError::Rejected {
        status: status.as_u16(),
        body,
    })
}
