//! HTTP clients for the OCR and extraction services.

use std::time::Duration;

use async_trait::async_trait;
use base64::Engine as _;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use docscan_core::error::{ExtractionError, OcrError};
use docscan_core::extraction::{ExtractionProvider, ExtractionRequest, ExtractionResponse};
use docscan_core::models::config::ServiceConfig;
use docscan_core::models::document::{Document, ProcessingOptions};
use docscan_core::ocr::{OcrProvider, RecognizedPage};

/// Shared client settings for both services.
struct ServiceClient {
    client: Client,
    api_key: Option<String>,
}

impl ServiceClient {
    fn new(config: &ServiceConfig) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        let api_key = std::env::var(&config.api_key_env)
            .ok()
            .filter(|key| !key.trim().is_empty());
        if api_key.is_none() {
            debug!("{} is not set, calling services without a token", config.api_key_env);
        }

        Ok(Self { client, api_key })
    }

    fn post(&self, url: &str) -> RequestBuilder {
        let request = self.client.post(url);
        match &self.api_key {
            Some(key) => request.bearer_auth(key),
            None => request,
        }
    }
}

/// Non-success answer from a service.
enum ServiceFailure {
    RateLimited(String),
    Status(String),
}

async fn check_status(response: Response) -> Result<Response, ServiceFailure> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let detail = if body.trim().is_empty() {
        format!("HTTP {}", status)
    } else {
        format!("HTTP {}: {}", status, body.trim())
    };

    if status == StatusCode::TOO_MANY_REQUESTS {
        warn!("Service rate limit hit: {}", detail);
        Err(ServiceFailure::RateLimited(detail))
    } else {
        Err(ServiceFailure::Status(detail))
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct OcrDocumentBody<'a> {
    content: String,
    format: &'static str,
    mime_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<&'a str>,
    options: &'a ProcessingOptions,
}

#[derive(Serialize)]
struct OcrRequestBody<'a> {
    documents: Vec<OcrDocumentBody<'a>>,
}

#[derive(Deserialize)]
struct OcrResponseBody {
    /// Pages per document, in request order.
    results: Vec<Vec<RecognizedPage>>,
}

/// OCR collaborator backed by an HTTP endpoint.
///
/// Documents are sent base64-encoded in one JSON request.
pub struct HttpOcrProvider {
    service: ServiceClient,
    endpoint: String,
}

impl HttpOcrProvider {
    pub fn new(config: &ServiceConfig) -> anyhow::Result<Self> {
        Ok(Self {
            service: ServiceClient::new(config)?,
            endpoint: config.ocr_url.clone(),
        })
    }
}

#[async_trait]
impl OcrProvider for HttpOcrProvider {
    fn name(&self) -> &str {
        &self.endpoint
    }

    async fn process_documents(
        &self,
        documents: &[Document],
    ) -> Result<Vec<Vec<RecognizedPage>>, OcrError> {
        let body = OcrRequestBody {
            documents: documents
                .iter()
                .map(|doc| OcrDocumentBody {
                    content: base64::engine::general_purpose::STANDARD.encode(doc.content()),
                    format: doc.format().as_str(),
                    mime_type: doc.effective_mime_type(),
                    name: doc.name(),
                    options: doc.options(),
                })
                .collect(),
        };

        debug!("POST {} ({} documents)", self.endpoint, documents.len());
        let response = self
            .service
            .post(&self.endpoint)
            .json(&body)
            .send()
            .await
            .map_err(|e| OcrError::Request(e.to_string()))?;

        let response = check_status(response).await.map_err(|failure| match failure {
            ServiceFailure::RateLimited(detail) => OcrError::RateLimited(detail),
            ServiceFailure::Status(detail) => OcrError::Response(detail),
        })?;

        let parsed: OcrResponseBody = response
            .json()
            .await
            .map_err(|e| OcrError::Response(e.to_string()))?;

        Ok(parsed.results)
    }
}

/// Extraction collaborator backed by an HTTP endpoint.
pub struct HttpExtractionProvider {
    service: ServiceClient,
    endpoint: String,
}

impl HttpExtractionProvider {
    pub fn new(config: &ServiceConfig) -> anyhow::Result<Self> {
        Ok(Self {
            service: ServiceClient::new(config)?,
            endpoint: config.extraction_url.clone(),
        })
    }
}

#[async_trait]
impl ExtractionProvider for HttpExtractionProvider {
    fn name(&self) -> &str {
        &self.endpoint
    }

    async fn extract(
        &self,
        request: ExtractionRequest,
    ) -> Result<ExtractionResponse, ExtractionError> {
        debug!("POST {} (schema {})", self.endpoint, request.schema.name);
        let response = self
            .service
            .post(&self.endpoint)
            .json(&request)
            .send()
            .await
            .map_err(|e| ExtractionError::Provider(e.to_string()))?;

        let response = check_status(response).await.map_err(|failure| match failure {
            ServiceFailure::RateLimited(detail) => ExtractionError::RateLimited(detail),
            ServiceFailure::Status(detail) => ExtractionError::Provider(detail),
        })?;

        response
            .json()
            .await
            .map_err(|e| ExtractionError::Provider(format!("unreadable response: {}", e)))
    }
}
