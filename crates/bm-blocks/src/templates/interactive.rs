//! Interactive blocks: feedback prompt and quick poll.
//!
//! Options branch on [`Interactivity`]: editor elements, response links, or
//! static display when no export token is available.

use std::fmt::Write;

use html_escape::encode_text;
use serde_json::Value;

use super::{close_row, open_row, option};
use crate::mode::Interactivity;
use crate::model::{Block, FeedbackScale};

/// Emoji rating row.
///
/// Props: `question` ("How would you rate this email?"), `showLabels` (true),
/// `labels` (object mapping scale value to label text).
pub(crate) fn feedback_prompt(block: &Block, ix: Interactivity<'_>, out: &mut String) {
    let props = &block.props;
    let question = props.text_or("question", "How would you rate this email?");
    let show_labels = props.flag_or("showLabels", true);
    let labels = props.object("labels");

    open_row(out, block, "bm-feedback", "", ix);
    let _ = write!(out, r#"<p class="bm-question">{}</p>"#, encode_text(question));
    out.push_str(
        r#"<table role="presentation" align="center" cellpadding="0" cellspacing="0" border="0"><tr>"#,
    );
    for scale in FeedbackScale::ALL {
        let mut inner = scale.emoji().to_owned();
        if show_labels {
            let label = labels
                .and_then(|l| l.get(scale.as_str()))
                .and_then(Value::as_str)
                .filter(|s| !s.trim().is_empty())
                .unwrap_or(scale.default_label());
            let _ = write!(
                inner,
                r#"<br><span class="bm-option-label">{}</span>"#,
                encode_text(label)
            );
        }
        out.push_str(r#"<td align="center">"#);
        option(out, ix, &block.id, scale.as_str(), "bm-feedback-option", &inner);
        out.push_str("</td>");
    }
    out.push_str("</tr></table>");
    close_row(out);
}

/// Single-choice poll with stacked full-width options.
///
/// Props: `question` ("What do you think?"), `options` (array of strings or
/// `{ "id", "label" }` objects; defaults to "Option A" / "Option B").
pub(crate) fn quick_poll(block: &Block, ix: Interactivity<'_>, out: &mut String) {
    let props = &block.props;
    let question = props.text_or("question", "What do you think?");

    open_row(out, block, "bm-poll", "", ix);
    let _ = write!(out, r#"<p class="bm-question">{}</p>"#, encode_text(question));
    out.push_str(
        r#"<table role="presentation" width="100%" cellpadding="0" cellspacing="0" border="0">"#,
    );
    for (id, label) in poll_options(props.list("options")) {
        out.push_str(r#"<tr><td class="bm-poll-cell">"#);
        option(out, ix, &block.id, &id, "bm-poll-option", &encode_text(&label));
        out.push_str("</td></tr>");
    }
    out.push_str("</table>");
    close_row(out);
}

/// Normalize poll options to `(id, label)` pairs.
///
/// Options without an id get their 1-based position; later duplicates of an id
/// are dropped so every link stays distinct.
fn poll_options(raw: Option<&[Value]>) -> Vec<(String, String)> {
    let mut options: Vec<(String, String)> = Vec::new();
    for (index, value) in raw.unwrap_or_default().iter().enumerate() {
        let position = (index + 1).to_string();
        let (id, label) = match value {
            Value::String(label) => (position, label.trim().to_owned()),
            Value::Object(map) => {
                let field = |key: &str| {
                    map.get(key)
                        .and_then(Value::as_str)
                        .map(str::trim)
                        .filter(|s| !s.is_empty())
                        .map(ToOwned::to_owned)
                };
                let id = field("id").unwrap_or(position);
                let label = field("label").unwrap_or_else(|| id.clone());
                (id, label)
            }
            _ => continue,
        };
        if label.is_empty() {
            continue;
        }
        if options.iter().any(|(existing, _)| *existing == id) {
            tracing::debug!(option = %id, "Skipping duplicate poll option id");
            continue;
        }
        options.push((id, label));
    }

    if options.is_empty() {
        return vec![
            ("a".to_owned(), "Option A".to_owned()),
            ("b".to_owned(), "Option B".to_owned()),
        ];
    }
    options
}
