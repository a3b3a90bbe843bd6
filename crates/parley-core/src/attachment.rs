//! Attachment model and the rules deciding which picked files are accepted.
//!
//! Reading bytes off disk is platform work and lives in the infrastructure
//! layer; this module only decides.

use serde::{Deserialize, Serialize};

/// Largest file accepted as an attachment (20 MiB).
pub const MAX_ATTACHMENT_BYTES: u64 = 20 * 1024 * 1024;

/// Mime type sent when an attachment does not carry one.
pub const FALLBACK_MIME_TYPE: &str = "application/octet-stream";

/// Exact mime types accepted besides the `image/*` family.
pub const SUPPORTED_MIME_TYPES: &[&str] = &[
    "image/jpeg",
    "image/png",
    "image/webp",
    "application/pdf",
    "text/plain",
    "audio/mpeg",
    "video/mp4",
];

/// A user-supplied file encoded for inline transmission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attachment {
    /// Base64 payload, optionally prefixed with `data:<mime>;base64,`
    pub data: String,
    pub mime_type: String,
    pub name: String,
}

impl Attachment {
    pub fn new(
        data: impl Into<String>,
        mime_type: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            data: data.into(),
            mime_type: mime_type.into(),
            name: name.into(),
        }
    }

    /// Builds an attachment whose data is a `data:` URI around `base64_payload`.
    pub fn from_base64(
        base64_payload: &str,
        mime_type: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        let mime_type = mime_type.into();
        Self {
            data: format!("data:{mime_type};base64,{base64_payload}"),
            mime_type,
            name: name.into(),
        }
    }
}

/// Metadata of a file the user picked, before its bytes are read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PickedFile {
    pub name: String,
    pub mime_type: String,
    pub size: u64,
}

/// Why a picked file was turned away.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RejectionReason {
    UnsupportedType { mime_type: String },
    TooLarge { size: u64, limit: u64 },
    Unreadable { message: String },
}

/// A per-file rejection, reported to the user without aborting the batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttachmentRejection {
    pub name: String,
    pub reason: RejectionReason,
}

impl AttachmentRejection {
    pub fn new(name: impl Into<String>, reason: RejectionReason) -> Self {
        Self {
            name: name.into(),
            reason,
        }
    }
}

impl std::fmt::Display for AttachmentRejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.reason {
            RejectionReason::UnsupportedType { mime_type } => write!(
                f,
                "The file \"{}\" is not supported ({mime_type}).",
                self.name
            ),
            RejectionReason::TooLarge { limit, .. } => write!(
                f,
                "The file \"{}\" is too large. The maximum is {} MB.",
                self.name,
                limit / (1024 * 1024)
            ),
            RejectionReason::Unreadable { message } => {
                write!(f, "The file \"{}\" could not be read: {message}", self.name)
            }
        }
    }
}

/// Returns true if `mime_type` is on the allow-list.
pub fn is_supported_mime_type(mime_type: &str) -> bool {
    SUPPORTED_MIME_TYPES.contains(&mime_type) || mime_type.starts_with("image/")
}

/// Checks a picked file against the type allow-list and the size limit.
///
/// The type check runs first, so an oversized unsupported file reports its type.
pub fn validate(file: &PickedFile) -> Result<(), AttachmentRejection> {
    if !is_supported_mime_type(&file.mime_type) {
        return Err(AttachmentRejection::new(
            &file.name,
            RejectionReason::UnsupportedType {
                mime_type: file.mime_type.clone(),
            },
        ));
    }

    if file.size > MAX_ATTACHMENT_BYTES {
        return Err(AttachmentRejection::new(
            &file.name,
            RejectionReason::TooLarge {
                size: file.size,
                limit: MAX_ATTACHMENT_BYTES,
            },
        ));
    }

    Ok(())
}

/// Splits a batch into files worth reading and per-file rejections.
pub fn partition(files: Vec<PickedFile>) -> (Vec<PickedFile>, Vec<AttachmentRejection>) {
    let mut accepted = Vec::new();
    let mut rejected = Vec::new();
    for file in files {
        match validate(&file) {
            Ok(()) => accepted.push(file),
            Err(rejection) => {
                tracing::debug!("[Attachment] Rejected {}: {}", file.name, rejection);
                rejected.push(rejection);
            }
        }
    }
    (accepted, rejected)
}

#[cfg(test)]
mod tests {
    use super::*;

    const MIB: u64 = 1024 * 1024;

    fn picked(name: &str, mime_type: &str, size: u64) -> PickedFile {
        PickedFile {
            name: name.to_string(),
            mime_type: mime_type.to_string(),
            size,
        }
    }

    #[test]
    fn test_image_family_is_wildcard() {
        assert!(is_supported_mime_type("image/gif"));
        assert!(is_supported_mime_type("image/svg+xml"));
        assert!(is_supported_mime_type("application/pdf"));
        assert!(!is_supported_mime_type("application/zip"));
        assert!(!is_supported_mime_type("audio/wav"));
    }

    #[test]
    fn test_size_limit_is_inclusive() {
        assert!(validate(&picked("edge.png", "image/png", MAX_ATTACHMENT_BYTES)).is_ok());
        assert!(validate(&picked("over.png", "image/png", MAX_ATTACHMENT_BYTES + 1)).is_err());
    }

    #[test]
    fn test_partition_keeps_valid_files() {
        let (accepted, rejected) = partition(vec![
            picked("oversized.png", "image/png", 25 * MIB),
            picked("valid.png", "image/png", MIB),
        ]);

        assert_eq!(accepted.len(), 1);
        assert_eq!(accepted[0].name, "valid.png");
        assert_eq!(rejected.len(), 1);
        assert_eq!(rejected[0].name, "oversized.png");
        assert!(rejected[0].to_string().contains("oversized.png"));
    }

    #[test]
    fn test_unsupported_type_reported_before_size() {
        let rejection = validate(&picked("big.zip", "application/zip", 30 * MIB)).unwrap_err();
        assert!(matches!(
            rejection.reason,
            RejectionReason::UnsupportedType { .. }
        ));
    }

    #[test]
    fn test_from_base64_builds_data_uri() {
        let attachment = Attachment::from_base64("AAAA", "image/png", "a.png");
        assert_eq!(attachment.data, "data:image/png;base64,AAAA");
    }
}
