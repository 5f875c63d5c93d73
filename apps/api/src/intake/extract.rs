//! Resume text extraction. Plain text is decoded directly, PDFs go through `pdf-extract`,
//! images go to the configured OCR API. Every failure degrades to "no text".

use bytes::Bytes;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("PDF extraction failed: {0}")]
    Pdf(String),

    #[error("OCR request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("OCR service rejected the file: {0}")]
    Rejected(String),

    #[error("OCR is not configured")]
    OcrUnavailable,

    #[error("Unsupported resume format: {0}")]
    Unsupported(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResumeKind {
    Text,
    Pdf,
    Image,
    Unknown,
}

/// An uploaded resume file as received from the multipart form.
#[derive(Debug, Clone)]
pub struct ResumeUpload {
    pub file_name: String,
    pub content_type: Option<String>,
    pub data: Bytes,
}

impl ResumeUpload {
    pub fn kind(&self) -> ResumeKind {
        detect_kind(&self.file_name, self.content_type.as_deref())
    }
}

/// Classifies an upload by MIME type, falling back to the file extension.
pub fn detect_kind(file_name: &str, content_type: Option<&str>) -> ResumeKind {
    let mime = content_type.unwrap_or("").to_ascii_lowercase();
    if mime == "application/pdf" {
        return ResumeKind::Pdf;
    }
    if mime.starts_with("image/") {
        return ResumeKind::Image;
    }
    if mime.starts_with("text/") {
        return ResumeKind::Text;
    }

    let ext = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "pdf" => ResumeKind::Pdf,
        "png" | "jpg" | "jpeg" | "gif" | "bmp" | "tif" | "tiff" | "webp" => ResumeKind::Image,
        "txt" | "md" | "text" => ResumeKind::Text,
        _ => ResumeKind::Unknown,
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct OcrResponse {
    #[serde(default)]
    parsed_results: Vec<OcrParsedResult>,
    #[serde(default)]
    is_errored_on_processing: bool,
    #[serde(default)]
    error_message: Value,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct OcrParsedResult {
    #[serde(default)]
    parsed_text: String,
}

/// Client for an OCR.space-style HTTP API.
#[derive(Clone)]
pub struct OcrClient {
    client: Client,
    url: String,
    api_key: String,
}

impl OcrClient {
    pub fn new(url: String, api_key: String) -> Result<Self, ExtractError> {
        Ok(Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(60))
                .build()?,
            url,
            api_key,
        })
    }

    pub async fn recognize(&self, upload: &ResumeUpload) -> Result<String, ExtractError> {
        let mime = upload
            .content_type
            .clone()
            .unwrap_or_else(|| "application/octet-stream".to_string());
        let part = Part::bytes(upload.data.to_vec())
            .file_name(upload.file_name.clone())
            .mime_str(&mime)?;
        let form = Form::new()
            .text("apikey", self.api_key.clone())
            .part("file", part);

        let response = self
            .client
            .post(&self.url)
            .multipart(form)
            .send()
            .await?
            .error_for_status()?;

        let body: OcrResponse = response.json().await?;
        parse_ocr_response(body)
    }
}

fn parse_ocr_response(body: OcrResponse) -> Result<String, ExtractError> {
    if body.is_errored_on_processing {
        let message = match &body.error_message {
            Value::String(s) => s.clone(),
            Value::Array(items) => items
                .iter()
                .filter_map(Value::as_str)
                .collect::<Vec<_>>()
                .join("; "),
            _ => "unknown OCR error".to_string(),
        };
        return Err(ExtractError::Rejected(message));
    }

    let text = body
        .parsed_results
        .into_iter()
        .map(|r| r.parsed_text)
        .collect::<Vec<_>>()
        .join("\n");
    Ok(text)
}

async fn extract_pdf(data: Bytes) -> Result<String, ExtractError> {
    tokio::task::spawn_blocking(move || pdf_extract::extract_text_from_mem(&data))
        .await
        .map_err(|e| ExtractError::Pdf(e.to_string()))?
        .map_err(|e| ExtractError::Pdf(format!("{e:?}")))
}

async fn try_extract(upload: &ResumeUpload, ocr: Option<&OcrClient>) -> Result<String, ExtractError> {
    match upload.kind() {
        ResumeKind::Text => Ok(String::from_utf8_lossy(&upload.data).into_owned()),
        ResumeKind::Pdf => extract_pdf(upload.data.clone()).await,
        ResumeKind::Image => match ocr {
            Some(client) => client.recognize(upload).await,
            None => Err(ExtractError::OcrUnavailable),
        },
        ResumeKind::Unknown => Err(ExtractError::Unsupported(upload.file_name.clone())),
    }
}

/// Extracts resume text, returning `None` when nothing usable came out.
pub async fn extract_resume_text(upload: &ResumeUpload, ocr: Option<&OcrClient>) -> Option<String> {
    match try_extract(upload, ocr).await {
        Ok(text) if !text.trim().is_empty() => {
            info!(
                "Extracted {} chars from resume {}",
                text.len(),
                upload.file_name
            );
            Some(text)
        }
        Ok(_) => {
            debug!("Resume {} yielded no text", upload.file_name);
            None
        }
        Err(e) => {
            warn!("Could not extract text from {}: {e}", upload.file_name);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn upload(name: &str, content_type: Option<&str>, data: &'static [u8]) -> ResumeUpload {
        ResumeUpload {
            file_name: name.to_string(),
            content_type: content_type.map(str::to_string),
            data: Bytes::from_static(data),
        }
    }

    #[test]
    fn test_detect_kind_prefers_mime() {
        assert_eq!(detect_kind("cv.bin", Some("application/pdf")), ResumeKind::Pdf);
        assert_eq!(detect_kind("cv", Some("image/png")), ResumeKind::Image);
        assert_eq!(detect_kind("cv", Some("text/plain")), ResumeKind::Text);
    }

    #[test]
    fn test_detect_kind_falls_back_to_extension() {
        assert_eq!(detect_kind("CV.PDF", None), ResumeKind::Pdf);
        assert_eq!(
            detect_kind("scan.jpeg", Some("application/octet-stream")),
            ResumeKind::Image
        );
        assert_eq!(detect_kind("resume.txt", None), ResumeKind::Text);
        assert_eq!(detect_kind("resume.docx", None), ResumeKind::Unknown);
        assert_eq!(detect_kind("resume", None), ResumeKind::Unknown);
    }

    #[test]
    fn test_parse_ocr_success_joins_pages() {
        let body: OcrResponse = serde_json::from_str(
            r#"{"ParsedResults": [{"ParsedText": "SQL"}, {"ParsedText": "Excel"}],
                "IsErroredOnProcessing": false}"#,
        )
        .unwrap();
        assert_eq!(parse_ocr_response(body).unwrap(), "SQL\nExcel");
    }

    #[test]
    fn test_parse_ocr_error_message_array() {
        let body: OcrResponse = serde_json::from_str(
            r#"{"IsErroredOnProcessing": true, "ErrorMessage": ["File too big", "Retry"]}"#,
        )
        .unwrap();
        match parse_ocr_response(body) {
            Err(ExtractError::Rejected(msg)) => assert_eq!(msg, "File too big; Retry"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_plain_text_upload() {
        let text = extract_resume_text(&upload("cv.txt", None, b"Python and SQL"), None).await;
        assert_eq!(text.as_deref(), Some("Python and SQL"));
    }

    #[tokio::test]
    async fn test_image_without_ocr_is_none() {
        let text = extract_resume_text(&upload("cv.png", None, b"\x89PNG"), None).await;
        assert!(text.is_none());
    }

    #[tokio::test]
    async fn test_corrupt_pdf_is_none() {
        let text = extract_resume_text(&upload("cv.pdf", None, b"not a pdf"), None).await;
        assert!(text.is_none());
    }

    #[tokio::test]
    async fn test_blank_text_is_none() {
        let text = extract_resume_text(&upload("cv.txt", None, b"   \n"), None).await;
        assert!(text.is_none());
    }
}
