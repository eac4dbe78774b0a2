use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

/// Broad attachment category used by renderers to pick an icon.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AttachmentKind {
    Image,
    Pdf,
    Text,
    Other,
}

impl AttachmentKind {
    pub fn from_file_type(file_type: &str) -> Self {
        match file_type.trim().to_ascii_lowercase().as_str() {
            "image" => Self::Image,
            "pdf" => Self::Pdf,
            "text" => Self::Text,
            _ => Self::Other,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Image => "image",
            Self::Pdf => "pdf",
            Self::Text => "text",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for AttachmentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// File reference carried by the `root` node of a session.
///
/// Only the metadata is modelled here; fetching the bytes is a transport
/// concern.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Attachment {
    #[serde(deserialize_with = "crate::wire::string_or_number")]
    pub id: String,
    pub filename: String,
    #[serde(default, deserialize_with = "crate::wire::lenient_string")]
    pub file_type: Option<String>,
    #[serde(default, deserialize_with = "crate::wire::lenient_size")]
    pub file_size: u64,
}

impl Attachment {
    pub fn kind(&self) -> AttachmentKind {
        self.file_type
            .as_deref()
            .map(AttachmentKind::from_file_type)
            .unwrap_or(AttachmentKind::Other)
    }

    /// Human-readable size, for example `512 B`, `1.5 KB` or `2.0 MB`.
    pub fn display_size(&self) -> String {
        format_file_size(self.file_size)
    }
}

const KIB: u64 = 1024;
const MIB: u64 = 1024 * 1024;

pub fn format_file_size(bytes: u64) -> String {
    if bytes < KIB {
        format!("{bytes} B")
    } else if bytes < MIB {
        format!("{:.1} KB", bytes as f64 / KIB as f64)
    } else {
        format!("{:.1} MB", bytes as f64 / MIB as f64)
    }
}

/// Reads an attachment list, skipping entries without a usable `id` or
/// `filename`. Returns `None` when the value is not a list.
pub(crate) fn read_attachments(value: &Value) -> Option<Vec<Attachment>> {
    let items = value.as_array()?;
    let attachments: Vec<Attachment> = items
        .iter()
        .filter_map(|item| Attachment::deserialize(item).ok())
        .collect();
    if attachments.len() < items.len() {
        debug!(
            skipped = items.len() - attachments.len(),
            "skipping unreadable attachment entries"
        );
    }
    Some(attachments)
}
