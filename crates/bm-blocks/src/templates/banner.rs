//! Announcement banner block.

use std::fmt::Write;

use html_escape::{encode_double_quoted_attribute, encode_text};

use super::{close_row, multiline, open_row};
use crate::mode::Interactivity;
use crate::model::Block;
use crate::style::{color_or, url_or};

/// Colored call-out with title, optional body and optional call to action.
///
/// Props: `title` ("Big news!"), `body` (""), `background` ("#4f46e5"),
/// `textColor` ("#ffffff"), `ctaLabel` + `ctaUrl` (both needed for the link).
pub(crate) fn announcement_banner(block: &Block, ix: Interactivity<'_>, out: &mut String) {
    let props = &block.props;
    let title = props.text_or("title", "Big news!");
    let background = color_or(props.text("background"), "#4f46e5");
    let text_color = color_or(props.text("textColor"), "#ffffff");

    open_row(out, block, "bm-announcement", "", ix);
    let _ = write!(
        out,
        concat!(
            r#"<table role="presentation" width="100%" cellpadding="0" cellspacing="0" border="0"><tr>"#,
            r#"<td class="bm-banner" bgcolor="{bg}" style="background-color:{bg};color:{fg}">"#,
            r#"<p class="bm-banner-title" style="color:{fg}">{title}</p>"#
        ),
        bg = background,
        fg = text_color,
        title = encode_text(title),
    );

    if let Some(body) = props.text("body") {
        let _ = write!(
            out,
            r#"<p class="bm-banner-body" style="color:{text_color}">{}</p>"#,
            multiline(body)
        );
    }

    if let (Some(label), Some(url)) = (props.text("ctaLabel"), props.text("ctaUrl")) {
        let _ = write!(
            out,
            r#"<a class="bm-banner-cta" href="{}" target="_blank" style="color:{text_color}">{}</a>"#,
            encode_double_quoted_attribute(url_or(Some(url), "#")),
            encode_text(label)
        );
    }

    out.push_str("</td></tr></table>");
    close_row(out);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::BlockType;

    fn render(block: &Block) -> String {
        let mut out = String::new();
        announcement_banner(block, Interactivity::Static, &mut out);
        out
    }

    #[test]
    fn test_banner_defaults() {
        let html = render(&Block::new("a", BlockType::AnnouncementBanner));

        assert!(html.contains("Big news!"));
        assert!(html.contains(r##"bgcolor="#4f46e5""##));
        assert!(!html.contains("bm-banner-body"));
        assert!(!html.contains("bm-banner-cta"));
    }

    #[test]
    fn test_banner_with_cta() {
        let block = Block::new("a", BlockType::AnnouncementBanner)
            .with_prop("title", "Launch")
            .with_prop("body", "We shipped.")
            .with_prop("ctaLabel", "Read more")
            .with_prop("ctaUrl", "https://blog.test/launch")
            .with_prop("textColor", "#000000");
        let html = render(&block);

        assert!(html.contains(">Launch</p>"));
        assert!(html.contains("We shipped."));
        assert!(html.contains(r#"href="https://blog.test/launch""#));
        assert!(html.contains("color:#000000"));
    }

    #[test]
    fn test_banner_cta_needs_url() {
        let block = Block::new("a", BlockType::AnnouncementBanner).with_prop("ctaLabel", "Go");

        assert!(!render(&block).contains("bm-banner-cta"));
    }
}
