//! Size budget check.
//!
//! Mail providers truncate oversized messages. Gmail clips anything above
//! 102 KB and hides the rest behind a "View entire message" link.

use serde::Serialize;

/// Gmail's clipping threshold in kilobytes.
pub const GMAIL_CLIP_THRESHOLD_KB: u64 = 102;

/// Provider-specific clipping threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SizeBudget {
    /// Largest size, in whole kilobytes, that is not clipped.
    pub threshold_kb: u64,
}

impl Default for SizeBudget {
    fn default() -> Self {
        Self {
            threshold_kb: GMAIL_CLIP_THRESHOLD_KB,
        }
    }
}

impl SizeBudget {
    /// Budget with a custom threshold.
    pub fn new(threshold_kb: u64) -> Self {
        Self { threshold_kb }
    }

    /// Measure `html` and wrap it in a report.
    ///
    /// Advisory only: the content is never modified.
    pub fn evaluate(self, html: String) -> InlinedEmail {
        let size_kb = size_kb(html.len());
        InlinedEmail {
            clipped: size_kb > self.threshold_kb,
            size_kb,
            html,
        }
    }
}

/// Export result: inlined markup plus its size report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InlinedEmail {
    /// Inlined HTML.
    pub html: String,
    /// UTF-8 byte length in kilobytes, rounded to the nearest whole unit.
    #[serde(rename = "sizeKB")]
    pub size_kb: u64,
    /// Whether the size exceeds the clipping threshold.
    pub clipped: bool,
}

/// Kilobytes for a byte count, rounded half up.
pub fn size_kb(bytes: usize) -> u64 {
    (bytes as u64 + 512) / 1024
}
