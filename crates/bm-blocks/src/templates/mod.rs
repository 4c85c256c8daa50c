//! Per-block-type templates.
//!
//! Every template writes exactly one `<tr>...</tr>` so blocks can be reordered
//! freely inside the wrapper table.

mod banner;
mod content;
mod interactive;
mod pattern;

use std::fmt::Write;

use html_escape::{encode_double_quoted_attribute, encode_text};

use crate::links::interaction_url;
use crate::mode::Interactivity;
use crate::model::Block;

pub(crate) use banner::announcement_banner;
pub(crate) use content::{button, divider, heading, image, spacer, text};
pub(crate) use interactive::{feedback_prompt, quick_poll};
pub(crate) use pattern::pattern;

/// Open the row and the block cell.
///
/// `attrs` is appended verbatim to the `<td>` and must already be escaped.
fn open_row(out: &mut String, block: &Block, class: &str, attrs: &str, ix: Interactivity<'_>) {
    out.push_str("<tr");
    if ix.is_editor() {
        let _ = write!(
            out,
            r#" data-block-id="{}""#,
            encode_double_quoted_attribute(&block.id)
        );
    }
    let _ = write!(out, r#"><td class="bm-block {class}"{attrs}>"#);
}

fn close_row(out: &mut String) {
    out.push_str("</td></tr>\n");
}

/// Escaped text with newlines turned into `<br>`.
fn multiline(text: &str) -> String {
    text.lines()
        .map(|line| encode_text(line).into_owned())
        .collect::<Vec<_>>()
        .join("<br>")
}

/// Write one selectable option of an interactive block.
///
/// `inner` is trusted markup produced by the caller.
fn option(out: &mut String, ix: Interactivity<'_>, block_id: &str, value: &str, class: &str, inner: &str) {
    match ix {
        Interactivity::Editor => {
            let _ = write!(
                out,
                r#"<span class="bm-option {class}" role="button" data-value="{}">{inner}</span>"#,
                encode_double_quoted_attribute(value)
            );
        }
        Interactivity::Links { api_base, token } => {
            let href = interaction_url(api_base, token, block_id, value);
            let _ = write!(
                out,
                r#"<a class="bm-option {class}" href="{}" target="_blank">{inner}</a>"#,
                encode_double_quoted_attribute(&href)
            );
        }
        Interactivity::Static => {
            let _ = write!(
                out,
                r#"<span class="bm-option {class} bm-option-static">{inner}</span>"#
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::BlockType;

    #[test]
    fn test_multiline_escapes_and_breaks() {
        assert_eq!(multiline("a < b\nc & d"), "a &lt; b<br>c &amp; d");
    }

    #[test]
    fn test_open_row_editor_marks_block_id() {
        let block = Block::new("b\"1", BlockType::Text);
        let mut out = String::new();

        open_row(&mut out, &block, "bm-text", "", Interactivity::Editor);

        assert_eq!(
            out,
            r#"<tr data-block-id="b&quot;1"><td class="bm-block bm-text">"#
        );
    }

    #[test]
    fn test_open_row_email_has_no_editor_attrs() {
        let block = Block::new("b1", BlockType::Text);
        let mut out = String::new();

        open_row(&mut out, &block, "bm-text", "", Interactivity::Static);

        assert_eq!(out, r#"<tr><td class="bm-block bm-text">"#);
    }

    #[test]
    fn test_option_link() {
        let mut out = String::new();
        let ix = Interactivity::Links {
            api_base: "https://api.test",
            token: "t1",
        };

        option(&mut out, ix, "b1", "a", "bm-poll-option", "A");

        assert_eq!(
            out,
            r#"<a class="bm-option bm-poll-option" href="https://api.test/r/t1/b1/a" target="_blank">A</a>"#
        );
    }
}
