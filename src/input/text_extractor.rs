//! Text extraction from uploaded documents
//!
//! Binary formats go through a [`DocumentExtractor`] backend (the hosted
//! document-analysis service, or `pdf-extract` for local PDF reading).
//! Plain text and markdown are always read locally.

use crate::config::{DocumentServiceCredentials, ExtractionSettings};
use crate::error::{CareerMentorError, Result};
use crate::input::file_detector::FileType;
use log::{debug, info};
use pulldown_cmark::{html, Parser};
use regex::Regex;
use reqwest::header::HeaderMap;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::future::Future;
use std::path::Path;
use std::sync::OnceLock;
use std::time::Duration;
use tokio::fs;

pub trait TextExtractor {
    fn extract(&self, path: &Path) -> impl Future<Output = Result<String>> + Send;
}

/// Converts a binary document into ordered text lines.
pub trait DocumentExtractor {
    fn extract_lines(&self, path: &Path, file_type: FileType) -> impl Future<Output = Result<Vec<String>>> + Send;

    fn supports(&self, file_type: FileType) -> bool;

    fn backend_name(&self) -> &str;
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AnalyzeOperation {
    status: String,
    #[serde(default)]
    analyze_result: Option<AnalyzeResult>,
    #[serde(default)]
    error: Option<ServiceError>,
}

#[derive(Debug, Default, Deserialize)]
struct AnalyzeResult {
    #[serde(default)]
    pages: Vec<AnalyzedPage>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AnalyzedPage {
    #[serde(default)]
    page_number: u32,
    #[serde(default)]
    lines: Vec<AnalyzedLine>,
}

#[derive(Debug, Deserialize)]
struct AnalyzedLine {
    content: String,
}

#[derive(Debug, Deserialize)]
struct ServiceError {
    #[serde(default)]
    code: String,
    #[serde(default)]
    message: String,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ServiceError,
}

/// Lines of every page in page order.
fn collect_lines(result: AnalyzeResult) -> Vec<String> {
    let mut pages = result.pages;
    pages.sort_by_key(|p| p.page_number);
    pages
        .into_iter()
        .flat_map(|page| page.lines.into_iter().map(|line| line.content))
        .collect()
}

/// Error for a rejected analyze submission.
///
/// 400 and 415 mean the service could not read the document itself.
fn submit_error(status: StatusCode, body: &str, path: &Path) -> CareerMentorError {
    let message = serde_json::from_str::<ErrorEnvelope>(body)
        .map(|e| format!("{} {}", e.error.code, e.error.message))
        .unwrap_or_else(|_| body.to_string());

    match status {
        StatusCode::BAD_REQUEST | StatusCode::UNSUPPORTED_MEDIA_TYPE => {
            CareerMentorError::DocumentUnreadable(format!("{}: {}", path.display(), message.trim()))
        }
        _ => CareerMentorError::ExternalService(format!(
            "document analysis returned {}: {}",
            status,
            message.trim()
        )),
    }
}

fn operation_location(headers: &HeaderMap) -> Result<String> {
    headers
        .get("operation-location")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
        .ok_or_else(|| {
            CareerMentorError::ExternalService("document analysis response has no Operation-Location".to_string())
        })
}

/// `None` while the operation is still queued or running.
fn poll_outcome(operation: AnalyzeOperation, path: &Path) -> Option<Result<Vec<String>>> {
    match operation.status.as_str() {
        "succeeded" => Some(Ok(collect_lines(operation.analyze_result.unwrap_or_default()))),
        "failed" => {
            let reason = operation
                .error
                .map(|e| format!("{} {}", e.code, e.message))
                .unwrap_or_else(|| "analysis failed".to_string());
            Some(Err(CareerMentorError::DocumentUnreadable(format!(
                "{}: {}",
                path.display(),
                reason.trim()
            ))))
        }
        _ => None,
    }
}

fn polls_exhausted(max_polls: u32, path: &Path) -> CareerMentorError {
    CareerMentorError::ExternalService(format!(
        "document analysis timed out after {} polls for {}",
        max_polls,
        path.display()
    ))
}

/// Azure Document Intelligence (Form Recognizer) analyze-then-poll client.
pub struct AzureDocumentExtractor {
    client: Client,
    endpoint: String,
    api_key: String,
    settings: ExtractionSettings,
}

impl AzureDocumentExtractor {
    pub fn new(credentials: &DocumentServiceCredentials, settings: &ExtractionSettings) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.request_timeout_secs))
            .build()
            .map_err(|e| CareerMentorError::Configuration(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            endpoint: credentials.endpoint.trim_end_matches('/').to_string(),
            api_key: credentials.api_key.clone(),
            settings: settings.clone(),
        })
    }

    fn analyze_url(&self) -> String {
        format!(
            "{}/formrecognizer/documentModels/{}:analyze?api-version={}",
            self.endpoint, self.settings.model_id, self.settings.api_version
        )
    }

    async fn submit(&self, path: &Path, file_type: FileType) -> Result<String> {
        let bytes = fs::read(path).await?;

        let response = self
            .client
            .post(self.analyze_url())
            .header("Ocp-Apim-Subscription-Key", &self.api_key)
            .header(reqwest::header::CONTENT_TYPE, file_type.content_type())
            .body(bytes)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(submit_error(status, &body, path));
        }

        operation_location(response.headers())
    }

    async fn poll(&self, operation_url: &str, path: &Path) -> Result<Vec<String>> {
        let interval = Duration::from_millis(self.settings.poll_interval_ms);

        for attempt in 1..=self.settings.max_polls {
            tokio::time::sleep(interval).await;

            let operation: AnalyzeOperation = self
                .client
                .get(operation_url)
                .header("Ocp-Apim-Subscription-Key", &self.api_key)
                .send()
                .await?
                .error_for_status()?
                .json()
                .await?;

            debug!("Analyze poll {} for {}: {}", attempt, path.display(), operation.status);

            if let Some(outcome) = poll_outcome(operation, path) {
                return outcome;
            }
        }

        Err(polls_exhausted(self.settings.max_polls, path))
    }
}

impl DocumentExtractor for AzureDocumentExtractor {
    async fn extract_lines(&self, path: &Path, file_type: FileType) -> Result<Vec<String>> {
        info!("Submitting {} to document analysis", path.display());
        let operation_url = self.submit(path, file_type).await?;
        self.poll(&operation_url, path).await
    }

    fn supports(&self, file_type: FileType) -> bool {
        file_type.needs_document_service()
    }

    fn backend_name(&self) -> &str {
        "azure-document-intelligence"
    }
}

/// Run a PDF parser on the blocking pool.
///
/// The parser panics on some malformed files; a panic is reported as an
/// unreadable document instead of unwinding into the caller.
async fn parse_pdf_isolated<F, E>(path: &Path, bytes: Vec<u8>, parse: F) -> Result<String>
where
    F: FnOnce(&[u8]) -> std::result::Result<String, E> + Send + 'static,
    E: std::fmt::Display,
{
    let parsed = tokio::task::spawn_blocking(move || parse(&bytes).map_err(|e| e.to_string()))
        .await
        .map_err(|e| {
            CareerMentorError::DocumentUnreadable(format!("PDF parser crashed on '{}': {}", path.display(), e))
        })?;

    parsed.map_err(|e| {
        CareerMentorError::DocumentUnreadable(format!("Failed to extract text from PDF '{}': {}", path.display(), e))
    })
}

/// Reads PDFs on this machine; DOCX is not supported.
pub struct LocalPdfExtractor;

impl DocumentExtractor for LocalPdfExtractor {
    async fn extract_lines(&self, path: &Path, file_type: FileType) -> Result<Vec<String>> {
        if file_type != FileType::Pdf {
            return Err(CareerMentorError::UnsupportedFormat(format!(
                "{} needs the document analysis service",
                path.display()
            )));
        }

        let bytes = fs::read(path).await?;
        let text = parse_pdf_isolated(path, bytes, |bytes| pdf_extract::extract_text_from_mem(bytes)).await?;

        Ok(text.lines().map(str::to_string).collect())
    }

    fn supports(&self, file_type: FileType) -> bool {
        file_type == FileType::Pdf
    }

    fn backend_name(&self) -> &str {
        "pdf-extract"
    }
}

/// Backend chosen at startup from `--local-extract`.
pub enum ExtractorBackend {
    Azure(AzureDocumentExtractor),
    Local(LocalPdfExtractor),
}

impl DocumentExtractor for ExtractorBackend {
    async fn extract_lines(&self, path: &Path, file_type: FileType) -> Result<Vec<String>> {
        match self {
            ExtractorBackend::Azure(extractor) => extractor.extract_lines(path, file_type).await,
            ExtractorBackend::Local(extractor) => extractor.extract_lines(path, file_type).await,
        }
    }

    fn supports(&self, file_type: FileType) -> bool {
        match self {
            ExtractorBackend::Azure(extractor) => extractor.supports(file_type),
            ExtractorBackend::Local(extractor) => extractor.supports(file_type),
        }
    }

    fn backend_name(&self) -> &str {
        match self {
            ExtractorBackend::Azure(extractor) => extractor.backend_name(),
            ExtractorBackend::Local(extractor) => extractor.backend_name(),
        }
    }
}

pub struct PlainTextExtractor;

impl TextExtractor for PlainTextExtractor {
    async fn extract(&self, path: &Path) -> Result<String> {
        let bytes = fs::read(path).await?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}

pub struct MarkdownExtractor;

impl TextExtractor for MarkdownExtractor {
    async fn extract(&self, path: &Path) -> Result<String> {
        let bytes = fs::read(path).await?;
        Ok(markdown_to_text(&String::from_utf8_lossy(&bytes)))
    }
}

/// Render markdown and strip the markup, one block per line.
pub fn markdown_to_text(markdown: &str) -> String {
    static TAG_RE: OnceLock<Regex> = OnceLock::new();
    let tag_re = TAG_RE.get_or_init(|| Regex::new(r"<[^>]*>").expect("Invalid tag regex"));

    let parser = Parser::new(markdown);
    let mut html_output = String::new();
    html::push_html(&mut html_output, parser);

    let text = html_output
        .replace("<br />", "\n")
        .replace("</p>", "\n")
        .replace("</li>", "\n")
        .replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'");
    let clean_text = tag_re.replace_all(&text, "").replace("&amp;", "&");

    clean_text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}
