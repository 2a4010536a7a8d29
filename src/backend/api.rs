//! Remote research API.

use std::future::Future;
use std::time::Duration;

use crate::error::{ClientError, Result};
use crate::protocol::{QueryRequest, QueryResponse};
use crate::validation;

/// Anything that can answer a research query
pub trait ChatApi {
    fn query(&self, request: &QueryRequest) -> impl Future<Output = Result<QueryResponse>> + Send;
}

/// JSON-over-HTTP client for the research backend
#[derive(Debug, Clone)]
pub struct HttpApi {
    client: reqwest::Client,
    base_url: String,
}

impl HttpApi {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let base_url = validation::validate_backend_url(base_url)?;
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn query_url(&self) -> String {
        format!("{}/query", self.base_url)
    }
}

impl ChatApi for HttpApi {
    async fn query(&self, request: &QueryRequest) -> Result<QueryResponse> {
        let response = self
            .client
            .post(self.query_url())
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ClientError::Status {
                code: status.as_u16(),
                body,
            });
        }

        Ok(response.json::<QueryResponse>().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_url() {
        let api = HttpApi::new("http://localhost:8000/", Duration::from_secs(1)).unwrap();
        assert_eq!(api.base_url(), "http://localhost:8000");
        assert_eq!(api.query_url(), "http://localhost:8000/query");
    }

    #[test]
    fn test_rejects_bad_url() {
        assert!(matches!(
            HttpApi::new("localhost", Duration::from_secs(1)),
            Err(ClientError::Validation(_))
        ));
    }
}
