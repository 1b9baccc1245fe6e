//! Document translation: upload, status polling and download of whole files.

use std::fmt;
use std::path::Path;
use std::time::{Duration, Instant};

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, info};

use crate::client::{StatusContext, Translator, check_status, language_fields, parse_json};
use crate::error::{Error, Result};
use crate::http::{ApiRequest, BackoffTimer, POLL_BACKOFF_CAP};
use crate::lang::Formality;
use crate::text::TextGlossary;

/// Identifies an in-progress document translation job.
///
/// The `document_key` is a bearer credential: anyone holding it can download
/// the translated document. It is excluded from `Debug` and `Display` output
/// and must never be logged.
#[derive(Clone, Serialize, Deserialize)]
pub struct DocumentHandle {
    document_id: String,
    document_key: String,
}

impl DocumentHandle {
    pub fn new(document_id: impl Into<String>, document_key: impl Into<String>) -> Self {
        Self {
            document_id: document_id.into(),
            document_key: document_key.into(),
        }
    }

    pub fn document_id(&self) -> &str {
        &self.document_id
    }

    pub fn document_key(&self) -> &str {
        &self.document_key
    }
}

impl fmt::Debug for DocumentHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DocumentHandle")
            .field("document_id", &self.document_id)
            .field("document_key", &"[redacted]")
            .finish()
    }
}

impl fmt::Display for DocumentHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.document_id)
    }
}

/// Lifecycle state of a document translation job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentState {
    Queued,
    Translating,
    Done,
    Error,
}

/// Snapshot of a document translation job's progress.
#[derive(Debug, Clone, Deserialize)]
pub struct DocumentStatus {
    pub document_id: String,
    pub status: DocumentState,
    /// Estimate of remaining translation time, in seconds.
    #[serde(default)]
    pub seconds_remaining: Option<u64>,
    #[serde(default)]
    pub billed_characters: Option<u64>,
    #[serde(default)]
    pub error_message: Option<String>,
}

impl DocumentStatus {
    /// True once the job has reached a terminal state, including failure.
    pub fn is_done(&self) -> bool {
        matches!(self.status, DocumentState::Done | DocumentState::Error)
    }

    /// True while the job is progressing normally or has succeeded.
    pub fn ok(&self) -> bool {
        !matches!(self.status, DocumentState::Error)
    }
}

/// Optional parameters for document translation.
#[derive(Debug, Clone, Default)]
pub struct DocumentOptions {
    pub source_lang: Option<String>,
    pub formality: Option<Formality>,
    pub glossary: Option<TextGlossary>,
    /// Output file extension when it differs from the input, e.g. `pdf` in
    /// and `docx` out.
    pub output_format: Option<String>,
}

impl Translator {
    /// Uploads a document from the filesystem for translation.
    pub async fn upload_document(
        &self,
        input_path: &Path,
        target_lang: &str,
        options: &DocumentOptions,
    ) -> Result<DocumentHandle> {
        let filename = input_path
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(|| {
                Error::Config(format!("invalid input path: {}", input_path.display()))
            })?
            .to_string();
        let content = tokio::fs::read(input_path)
            .await
            .map_err(|e| Error::Io(format!("failed to read {}: {e}", input_path.display())))?;
        self.upload_document_data(Bytes::from(content), &filename, target_lang, options)
            .await
    }

    /// Uploads in-memory document content for translation. `filename` tells
    /// the server the document format.
    pub async fn upload_document_data(
        &self,
        content: Bytes,
        filename: &str,
        target_lang: &str,
        options: &DocumentOptions,
    ) -> Result<DocumentHandle> {
        let mut fields = language_fields(
            options.source_lang.as_deref(),
            target_lang,
            options.formality,
            options.glossary.as_ref(),
        )?;
        if let Some(format) = &options.output_format {
            fields.push(("output_format".to_string(), format.clone()));
        }

        debug!(filename, size = content.len(), "uploading document");
        let request = ApiRequest::post("v2/document")
            .form(fields)
            .file(filename, content);
        let response = self.api_call(request).await?;
        check_status(&response, StatusContext::DEFAULT)?;
        let handle: DocumentHandle = parse_json(&response)?;
        info!(document_id = handle.document_id(), "document uploaded");
        Ok(handle)
    }

    /// Queries the current status of a document translation job.
    pub async fn document_status(&self, handle: &DocumentHandle) -> Result<DocumentStatus> {
        let request = ApiRequest::post(format!("v2/document/{}", handle.document_id()))
            .json(json!({"document_key": handle.document_key()}));
        let response = self.api_call(request).await?;
        check_status(&response, StatusContext::DEFAULT)
            .and_then(|()| parse_json(&response))
            .map_err(|e| Error::with_handle(e, handle.clone()))
    }

    /// Polls until the job reaches a terminal state. Poll intervals grow
    /// from one second up to a one-minute cap.
    pub async fn wait_until_done(&self, handle: &DocumentHandle) -> Result<DocumentStatus> {
        self.wait_with_deadline(handle, None).await
    }

    /// Like [`wait_until_done`](Self::wait_until_done), but gives up once
    /// `deadline` has elapsed. The job itself keeps running server-side and
    /// the handle stays valid for a resumed wait.
    pub async fn wait_until_done_with_deadline(
        &self,
        handle: &DocumentHandle,
        deadline: Duration,
    ) -> Result<DocumentStatus> {
        self.wait_with_deadline(handle, Some(deadline)).await
    }

    async fn wait_with_deadline(
        &self,
        handle: &DocumentHandle,
        deadline: Option<Duration>,
    ) -> Result<DocumentStatus> {
        let started = Instant::now();
        let mut backoff = BackoffTimer::with_cap(Duration::ZERO, POLL_BACKOFF_CAP);
        loop {
            let status = self.document_status(handle).await?;
            if status.is_done() {
                return Ok(status);
            }
            debug!(
                document_id = handle.document_id(),
                state = ?status.status,
                seconds_remaining = status.seconds_remaining,
                "document not finished yet"
            );
            let mut delay = backoff.next_delay();
            if let Some(limit) = deadline {
                // Shorten the last sleep so a final poll lands at the
                // deadline before giving up.
                let remaining = limit.saturating_sub(started.elapsed());
                if remaining.is_zero() {
                    return Err(Error::with_handle(
                        Error::WaitDeadlineExceeded { limit },
                        handle.clone(),
                    ));
                }
                delay = delay.min(remaining);
            }
            tokio::time::sleep(delay).await;
        }
    }

    /// Downloads the translated document to `output_path`. Fails with
    /// [`Error::DocumentNotReady`] if translation has not finished.
    pub async fn download_document(
        &self,
        handle: &DocumentHandle,
        output_path: &Path,
    ) -> Result<()> {
        let content = self.download_document_data(handle).await?;
        tokio::fs::write(output_path, &content)
            .await
            .map_err(|e| Error::Io(format!("failed to write {}: {e}", output_path.display())))
    }

    /// Downloads the translated document into memory.
    pub async fn download_document_data(&self, handle: &DocumentHandle) -> Result<Bytes> {
        let request = ApiRequest::post(format!("v2/document/{}/result", handle.document_id()))
            .json(json!({"document_key": handle.document_key()}));
        let response = self.api_call(request).await?;
        check_status(&response, StatusContext::DOWNLOAD)
            .map_err(|e| Error::with_handle(e, handle.clone()))?;
        Ok(response.body)
    }

    /// Translates a document end to end: upload, wait for completion,
    /// download. Any failure after the upload carries the document handle.
    pub async fn translate_document_file(
        &self,
        input_path: &Path,
        output_path: &Path,
        target_lang: &str,
        options: &DocumentOptions,
    ) -> Result<DocumentStatus> {
        let mut options = options.clone();
        if options.output_format.is_none() {
            options.output_format = derive_output_format(input_path, output_path);
        }
        let handle = self
            .upload_document(input_path, target_lang, &options)
            .await?;
        let status = self.finish_translation(&handle).await?;
        self.download_document(&handle, output_path)
            .await
            .map_err(|e| match e {
                already @ Error::DocumentTranslation { .. } => already,
                other => Error::with_handle(other, handle.clone()),
            })?;
        Ok(status)
    }

    /// In-memory variant of [`translate_document_file`](Self::translate_document_file).
    pub async fn translate_document_data(
        &self,
        content: Bytes,
        filename: &str,
        target_lang: &str,
        options: &DocumentOptions,
    ) -> Result<(DocumentStatus, Bytes)> {
        let handle = self
            .upload_document_data(content, filename, target_lang, options)
            .await?;
        let status = self.finish_translation(&handle).await?;
        let translated = self.download_document_data(&handle).await?;
        Ok((status, translated))
    }

    async fn finish_translation(&self, handle: &DocumentHandle) -> Result<DocumentStatus> {
        let status = self.wait_until_done(handle).await?;
        if !status.ok() {
            let message = status
                .error_message
                .unwrap_or_else(|| "unknown error".to_string());
            return Err(Error::DocumentTranslation {
                message: format!("document translation failed: {message}"),
                handle: handle.clone(),
                source: None,
            });
        }
        Ok(status)
    }
}

/// When input and output extensions differ, the output extension doubles as
/// the requested output format. Same extensions mean no conversion.
fn derive_output_format(input_path: &Path, output_path: &Path) -> Option<String> {
    let extension = |path: &Path| {
        path.extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase)
    };
    match (extension(input_path), extension(output_path)) {
        (Some(input), Some(output)) if input != output => Some(output),
        _ => None,
    }
}
