//! Document renderer.
//!
//! Dispatches each block to its template and wraps the rows in a fixed-width
//! table layout. Rendering never fails: unknown block types produce no output
//! and the remaining blocks render unchanged.

use std::fmt::Write;

use html_escape::encode_text;

use crate::mode::{Interactivity, RenderContext, RenderMode};
use crate::model::{Block, BlockType, Document};
use crate::style::BASE_STYLESHEET;
use crate::templates;

/// Render a complete HTML document for the given mode.
///
/// In [`RenderMode::Email`] the context's export token is required for
/// response links; without it, interactive blocks degrade to static display.
pub fn render(document: &Document, mode: RenderMode, context: &RenderContext) -> String {
    let ix = Interactivity::resolve(mode, context);

    if mode == RenderMode::Email && context.export_token.is_none() {
        tracing::debug!(document = %document.id, "No export token, interactive blocks render static");
    }
    for id in document.duplicate_block_ids() {
        tracing::warn!(document = %document.id, block = %id, "Duplicate block id");
    }

    let mut out = String::with_capacity(2048 + document.blocks.len() * 768);
    write_head(document, &mut out);

    if mode.is_email_layout()
        && let Some(preheader) = document.preheader.as_deref().filter(|p| !p.trim().is_empty())
    {
        let _ = writeln!(
            out,
            "<div class=\"bm-preheader\">{}</div>",
            encode_text(preheader)
        );
    }

    out.push_str(concat!(
        "<table role=\"presentation\" class=\"bm-outer\" width=\"100%\" cellpadding=\"0\" cellspacing=\"0\" border=\"0\"><tr><td align=\"center\">\n",
        "<table role=\"presentation\" class=\"bm-wrapper\" width=\"600\" cellpadding=\"0\" cellspacing=\"0\" border=\"0\"><tbody>\n",
    ));
    for block in &document.blocks {
        write_block(block, ix, &mut out);
    }
    out.push_str("</tbody></table>\n</td></tr></table>\n</body>\n</html>\n");

    out
}

/// Render a single block row, e.g. for incremental editor updates.
pub fn render_block(block: &Block, mode: RenderMode, context: &RenderContext) -> String {
    let mut out = String::new();
    write_block(block, Interactivity::resolve(mode, context), &mut out);
    out
}

fn write_block(block: &Block, ix: Interactivity<'_>, out: &mut String) {
    let template: fn(&Block, Interactivity<'_>, &mut String) = match block.block_type {
        BlockType::Heading => templates::heading,
        BlockType::Text => templates::text,
        BlockType::Button => templates::button,
        BlockType::Image => templates::image,
        BlockType::Divider => templates::divider,
        BlockType::Spacer => templates::spacer,
        BlockType::AnnouncementBanner => templates::announcement_banner,
        BlockType::FeedbackPrompt => templates::feedback_prompt,
        BlockType::QuickPoll => templates::quick_poll,
        BlockType::Pattern => templates::pattern,
        BlockType::Unknown => {
            tracing::debug!(block = %block.id, "Skipping block of unknown type");
            return;
        }
    };
    template(block, ix, out);
}

fn write_head(document: &Document, out: &mut String) {
    out.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
    out.push_str("<meta charset=\"utf-8\">\n");
    out.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n");
    out.push_str("<meta name=\"x-apple-disable-message-reformatting\">\n");
    let _ = writeln!(out, "<title>{}</title>", encode_text(&document.subject));
    let _ = writeln!(out, "<style>\n{BASE_STYLESHEET}</style>");
    out.push_str("</head>\n<body class=\"bm-body\">\n");
}
