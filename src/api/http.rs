use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Method, RequestBuilder, Response, Url};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, error, info};

use crate::api::models::{
    CatalogSnapshot, FilePayload, HealthStatus, QueryRequest, QueryResponse, SuggestionResult,
    UploadResult,
};
use crate::api::{CatalogService, QueryService, ServiceError};
use crate::config::ServiceConfig;

/// HTTP client for the query and catalog service.
pub struct HttpBackend {
    client: reqwest::Client,
    base_url: Url,
}

// FastAPI-style error envelope
#[derive(Deserialize)]
struct ErrorBody {
    detail: serde_json::Value,
}

impl HttpBackend {
    pub fn new(config: &ServiceConfig) -> Result<Self, ServiceError> {
        let base_url = Url::parse(&config.base_url)
            .map_err(|e| ServiceError::InvalidUrl(format!("{}: {}", config.base_url, e)))?;

        if base_url.cannot_be_a_base() {
            return Err(ServiceError::InvalidUrl(config.base_url.clone()));
        }

        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| ServiceError::Connection(e.to_string()))?;

        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    // Appends percent-encoded path segments to the base URL
    fn endpoint(&self, segments: &[&str]) -> Result<Url, ServiceError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ServiceError::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn request(&self, method: Method, segments: &[&str]) -> Result<RequestBuilder, ServiceError> {
        let url = self.endpoint(segments)?;
        debug!("{} {}", method, url);
        Ok(self.client.request(method, url))
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response, ServiceError> {
        let response = request
            .send()
            .await
            .map_err(|e| ServiceError::Connection(e.to_string()))?;

        if response.status().is_success() {
            return Ok(response);
        }

        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        let message = match serde_json::from_str::<ErrorBody>(&body) {
            Ok(ErrorBody {
                detail: serde_json::Value::String(detail),
            }) => detail,
            Ok(ErrorBody { detail }) => detail.to_string(),
            Err(_) if body.trim().is_empty() => status
                .canonical_reason()
                .unwrap_or("Request failed")
                .to_string(),
            Err(_) => body,
        };

        error!("Service responded with status code: {} - {}", status, message);
        Err(ServiceError::Status {
            status: status.as_u16(),
            message,
        })
    }

    async fn send_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ServiceError> {
        let response = self.send(request).await?;
        let text = response
            .text()
            .await
            .map_err(|e| ServiceError::Decode(format!("Failed to read response body: {}", e)))?;

        serde_json::from_str(&text).map_err(|e| {
            error!("Failed to parse service response: {} - Response was: {}", e, text);
            ServiceError::Decode(e.to_string())
        })
    }

    async fn send_bytes(&self, request: RequestBuilder) -> Result<Vec<u8>, ServiceError> {
        let response = self.send(request).await?;
        let bytes = response
            .bytes()
            .await
            .map_err(|e| ServiceError::Decode(format!("Failed to read response body: {}", e)))?;
        Ok(bytes.to_vec())
    }
}

#[async_trait]
impl QueryService for HttpBackend {
    async fn process_query(&self, request: &QueryRequest) -> Result<QueryResponse, ServiceError> {
        info!("Sending query with provider: {}", request.provider);
        let builder = self.request(Method::POST, &["api", "query"])?.json(request);
        self.send_json(builder).await
    }

    async fn suggest_query(&self) -> Result<SuggestionResult, ServiceError> {
        let builder = self.request(Method::GET, &["api", "generate-random-query"])?;
        self.send_json(builder).await
    }
}

#[async_trait]
impl CatalogService for HttpBackend {
    async fn fetch_catalog(&self) -> Result<CatalogSnapshot, ServiceError> {
        let builder = self.request(Method::GET, &["api", "schema"])?;
        self.send_json(builder).await
    }

    async fn upload_file(&self, file: &FilePayload) -> Result<UploadResult, ServiceError> {
        info!("Uploading {} ({} bytes)", file.file_name, file.bytes.len());
        let part = Part::bytes(file.bytes.clone())
            .file_name(file.file_name.clone())
            .mime_str(&file.content_type)
            .map_err(|e| ServiceError::Decode(format!("Invalid content type: {}", e)))?;
        let form = Form::new().part("file", part);

        let builder = self.request(Method::POST, &["api", "upload"])?.multipart(form);
        self.send_json(builder).await
    }

    async fn remove_table(&self, table_name: &str) -> Result<(), ServiceError> {
        let builder = self.request(Method::DELETE, &["api", "table", table_name])?;
        self.send(builder).await?;
        Ok(())
    }

    async fn export_table(&self, table_name: &str) -> Result<Vec<u8>, ServiceError> {
        let builder = self.request(Method::GET, &["api", "table", table_name, "export"])?;
        self.send_bytes(builder).await
    }

    async fn fetch_sample(&self, file_name: &str) -> Result<Vec<u8>, ServiceError> {
        let builder = self.request(Method::GET, &["sample-data", file_name])?;
        self.send_bytes(builder).await
    }

    async fn health(&self) -> Result<HealthStatus, ServiceError> {
        let builder = self.request(Method::GET, &["api", "health"])?;
        self.send_json(builder).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn backend(base_url: &str) -> HttpBackend {
        HttpBackend::new(&ServiceConfig {
            base_url: base_url.to_string(),
        })
        .unwrap()
    }

    #[test]
    fn endpoint_encodes_table_names() {
        let backend = backend("http://localhost:8000");
        let url = backend
            .endpoint(&["api", "table", "weird name/x", "export"])
            .unwrap();
        assert_eq!(
            url.as_str(),
            "http://localhost:8000/api/table/weird%20name%2Fx/export"
        );
    }

    #[test]
    fn endpoint_keeps_base_path_prefix() {
        let backend = backend("http://localhost:8000/nlq/");
        let url = backend.endpoint(&["api", "schema"]).unwrap();
        assert_eq!(url.as_str(), "http://localhost:8000/nlq/api/schema");
    }

    #[test]
    fn rejects_unusable_base_url() {
        let err = HttpBackend::new(&ServiceConfig {
            base_url: "not a url".to_string(),
        })
        .err()
        .unwrap();
        assert!(matches!(err, ServiceError::InvalidUrl(_)));
    }
}
