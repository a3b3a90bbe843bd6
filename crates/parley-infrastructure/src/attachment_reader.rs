//! Attachment Ingestor: turns picked files into validated, base64-encoded
//! attachments.

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use futures::future::join_all;
use parley_core::attachment::{
    self, Attachment, AttachmentRejection, PickedFile, RejectionReason,
};
use std::path::{Path, PathBuf};
use tokio::fs;

/// Outcome of ingesting one batch of files.
#[derive(Debug, Default)]
pub struct IngestReport {
    /// Attachments ready for staging, in pick order.
    pub accepted: Vec<Attachment>,
    /// One entry per file that was turned away.
    pub rejected: Vec<AttachmentRejection>,
}

/// Infers the MIME type from a filename extension using `mime_guess`.
pub fn infer_mime_type(path: &Path) -> String {
    mime_guess::from_path(path)
        .first_or_octet_stream()
        .to_string()
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string_lossy().into_owned())
}

fn unreadable(name: &str, err: std::io::Error) -> AttachmentRejection {
    AttachmentRejection::new(
        name,
        RejectionReason::Unreadable {
            message: err.to_string(),
        },
    )
}

/// Reads files from disk for the attachment staging list.
#[derive(Debug, Clone, Default)]
pub struct AttachmentReader;

impl AttachmentReader {
    pub fn new() -> Self {
        Self
    }

    /// Validates and reads a batch of files.
    ///
    /// Every file is judged on its own: rejected files are reported and the
    /// rest are still read. Reads run concurrently.
    pub async fn ingest<P: AsRef<Path>>(&self, paths: &[P]) -> IngestReport {
        let mut report = IngestReport::default();
        let mut picked = Vec::new();

        for path in paths {
            let path = path.as_ref();
            let name = display_name(path);
            match fs::metadata(path).await {
                Ok(metadata) if metadata.is_file() => picked.push((
                    path.to_path_buf(),
                    PickedFile {
                        name,
                        mime_type: infer_mime_type(path),
                        size: metadata.len(),
                    },
                )),
                Ok(_) => report.rejected.push(AttachmentRejection::new(
                    name,
                    RejectionReason::Unreadable {
                        message: "not a regular file".to_string(),
                    },
                )),
                Err(e) => report.rejected.push(unreadable(&name, e)),
            }
        }

        let mut to_read: Vec<(PathBuf, PickedFile)> = Vec::new();
        for (path, file) in picked {
            match attachment::validate(&file) {
                Ok(()) => to_read.push((path, file)),
                Err(rejection) => report.rejected.push(rejection),
            }
        }

        let reads = to_read.into_iter().map(|(path, file)| Self::read_one(path, file));
        for result in join_all(reads).await {
            match result {
                Ok(attachment) => report.accepted.push(attachment),
                Err(rejection) => report.rejected.push(rejection),
            }
        }

        tracing::info!(
            "[AttachmentReader] Accepted {} file(s), rejected {}",
            report.accepted.len(),
            report.rejected.len()
        );
        report
    }

    async fn read_one(path: PathBuf, file: PickedFile) -> Result<Attachment, AttachmentRejection> {
        let bytes = fs::read(&path)
            .await
            .map_err(|e| unreadable(&file.name, e))?;
        let payload = BASE64_STANDARD.encode(bytes);
        Ok(Attachment::from_base64(&payload, file.mime_type, file.name))
    }
}
