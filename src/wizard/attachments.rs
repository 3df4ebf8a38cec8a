//! Validation of file-attachment answers.
//!
//! Attachments travel as `data:image/<type>;base64,<payload>` URLs, the same
//! encoding the browser produces when it reads a picked file.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

/// Maximum number of images one file question accepts.
pub const MAX_ATTACHMENTS: usize = 5;

/// Maximum decoded size of a single image.
pub const MAX_ATTACHMENT_BYTES: usize = 5 * 1024 * 1024;

static DATA_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^data:(?P<mime>[A-Za-z0-9.+-]+/[A-Za-z0-9.+-]+);base64,(?P<payload>[A-Za-z0-9+/]*={0,2})$")
        .unwrap_or_else(|e| panic!("invalid data URL pattern: {e}"))
});

/// Why an incoming file was turned away.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum Rejection {
    /// Not a base64 data URL.
    Malformed { index: usize },
    /// Not an `image/*` type.
    NotAnImage { index: usize, mime: String },
    /// Larger than `MAX_ATTACHMENT_BYTES` once decoded.
    TooLarge { index: usize, bytes: usize },
    /// The question already holds `MAX_ATTACHMENTS` images.
    LimitReached { index: usize },
}

impl std::fmt::Display for Rejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Malformed { index } => write!(f, "file {} could not be read", index + 1),
            Self::NotAnImage { index, mime } => {
                write!(f, "file {} is not an image file ({mime})", index + 1)
            }
            Self::TooLarge { index, bytes } => write!(
                f,
                "file {} is too large ({:.1} MB, max 5MB per image)",
                index + 1,
                *bytes as f64 / (1024.0 * 1024.0)
            ),
            Self::LimitReached { index } => write!(
                f,
                "file {} skipped, at most {MAX_ATTACHMENTS} images are allowed",
                index + 1
            ),
        }
    }
}

/// Result of merging incoming files into an existing list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AttachmentOutcome {
    /// The merged list: existing files followed by the accepted new ones.
    pub files: Vec<String>,
    pub rejected: Vec<Rejection>,
}

/// Byte length a base64 payload decodes to, computed from its length and
/// padding. Only meaningful for a payload `DATA_URL` has already matched.
fn decoded_len(payload: &str) -> usize {
    let padding = payload.bytes().rev().take_while(|b| *b == b'=').count();
    (payload.len() / 4) * 3 - padding.min(2)
}

/// Check a single data URL.
pub fn check(index: usize, data_url: &str) -> Result<(), Rejection> {
    let caps = DATA_URL
        .captures(data_url)
        .ok_or(Rejection::Malformed { index })?;
    let mime = &caps["mime"];
    if !mime.starts_with("image/") {
        return Err(Rejection::NotAnImage {
            index,
            mime: mime.to_string(),
        });
    }
    let payload = &caps["payload"];
    if payload.len() % 4 != 0 {
        return Err(Rejection::Malformed { index });
    }
    let bytes = decoded_len(payload);
    if bytes > MAX_ATTACHMENT_BYTES {
        return Err(Rejection::TooLarge { index, bytes });
    }
    Ok(())
}

/// Append the acceptable files from `incoming` to `existing`.
///
/// Each file is judged on its own; a bad file never blocks the others.
pub fn merge(existing: &[String], incoming: Vec<String>) -> AttachmentOutcome {
    let mut outcome = AttachmentOutcome {
        files: existing.to_vec(),
        rejected: Vec::new(),
    };
    for (index, file) in incoming.into_iter().enumerate() {
        if outcome.files.len() >= MAX_ATTACHMENTS {
            outcome.rejected.push(Rejection::LimitReached { index });
            continue;
        }
        match check(index, &file) {
            Ok(()) => outcome.files.push(file),
            Err(rejection) => outcome.rejected.push(rejection),
        }
    }
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;

    fn png() -> String {
        "data:image/png;base64,iVBORw0KGgo=".to_string()
    }

    #[test]
    fn accepts_image_data_url() {
        assert!(check(0, &png()).is_ok());
    }

    #[test]
    fn rejects_non_image() {
        let err = check(2, "data:application/pdf;base64,JVBERi0=").unwrap_err();
        assert_eq!(
            err,
            Rejection::NotAnImage {
                index: 2,
                mime: "application/pdf".into()
            }
        );
    }

    #[test]
    fn rejects_plain_urls() {
        assert_eq!(
            check(0, "https://example.com/cat.png").unwrap_err(),
            Rejection::Malformed { index: 0 }
        );
    }

    #[test]
    fn rejects_oversized_payload() {
        // just over 5 MiB once decoded
        let payload = "A".repeat((MAX_ATTACHMENT_BYTES / 3 + 1) * 4);
        let url = format!("data:image/jpeg;base64,{payload}");
        assert!(matches!(check(0, &url), Err(Rejection::TooLarge { .. })));
    }

    #[test]
    fn decoded_len_accounts_for_padding() {
        assert_eq!(decoded_len("QUJD"), 3);
        assert_eq!(decoded_len("QUI="), 2);
        assert_eq!(decoded_len("QQ=="), 1);
    }

    #[test]
    fn merge_keeps_good_files_and_reports_bad_ones() {
        let outcome = merge(
            &[],
            vec![png(), "nope".to_string(), png()],
        );
        assert_eq!(outcome.files.len(), 2);
        assert_eq!(outcome.rejected, vec![Rejection::Malformed { index: 1 }]);
    }

    #[test]
    fn merge_caps_total_count() {
        let existing = vec![png(); 4];
        let outcome = merge(&existing, vec![png(), png(), png()]);
        assert_eq!(outcome.files.len(), MAX_ATTACHMENTS);
        assert_eq!(
            outcome.rejected,
            vec![
                Rejection::LimitReached { index: 1 },
                Rejection::LimitReached { index: 2 }
            ]
        );
    }

    #[test]
    fn rejection_messages_are_one_based() {
        let msg = Rejection::Malformed { index: 0 }.to_string();
        assert!(msg.contains("file 1"));
    }
}
