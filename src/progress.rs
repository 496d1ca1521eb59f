//! Download-progress events and their display-ready projection.

use serde::{Deserialize, Serialize};

/// Raw progress payload reported by an acquisition function while it fetches
/// model files. The serialized shape is tagged by `status`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum ProgressEvent {
    /// A file download is about to start.
    Initiate { file: String },
    /// A file download advanced; `progress` is a percentage in [0, 100].
    Progress { file: String, progress: f64 },
    /// A file finished downloading.
    Done { file: String },
    /// All files are on hand and the pipeline is being constructed.
    Ready,
}

/// Display-ready progress snapshot for a progress bar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplayProgress {
    /// Whole percent, rounded half-up.
    pub percent: u8,
    /// True when no determinate percentage is available.
    pub is_indeterminate: bool,
    pub file: String,
}

/// Map a raw progress event to its display shape.
///
/// Anything other than a `progress` event (including no event at all) yields
/// an indeterminate zero. Total over its domain, no side effects.
pub fn format_progress(event: Option<&ProgressEvent>) -> DisplayProgress {
    match event {
        Some(ProgressEvent::Progress { file, progress }) => DisplayProgress {
            percent: progress.clamp(0.0, 100.0).round() as u8,
            is_indeterminate: false,
            file: file.clone(),
        },
        _ => DisplayProgress {
            percent: 0,
            is_indeterminate: true,
            file: String::new(),
        },
    }
}
