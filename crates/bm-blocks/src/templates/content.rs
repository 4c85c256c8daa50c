//! Static content blocks: heading, text, button, image, divider, spacer.

use std::fmt::Write;

use html_escape::{encode_double_quoted_attribute, encode_text};

use super::{close_row, multiline, open_row};
use crate::mode::Interactivity;
use crate::model::Block;
use crate::style::{align_or, color_or, url_or};

/// Heading. Props: `text` ("Your headline"), `level` (1, clamped 1-3), `align` ("left").
pub(crate) fn heading(block: &Block, ix: Interactivity<'_>, out: &mut String) {
    let props = &block.props;
    let text = props.text_or("text", "Your headline");
    let level = props.number_in("level", 1, 1, 3);
    let align = align_or(props.text("align"), "left");

    open_row(
        out,
        block,
        "bm-heading",
        &format!(r#" align="{align}" style="text-align:{align}""#),
        ix,
    );
    let _ = write!(
        out,
        r#"<h{level} class="bm-h{level}">{}</h{level}>"#,
        encode_text(text)
    );
    close_row(out);
}

/// Paragraph text. Props: `text` ("Write something..."), `align` ("left").
pub(crate) fn text(block: &Block, ix: Interactivity<'_>, out: &mut String) {
    let props = &block.props;
    let text = props.text_or("text", "Write something...");
    let align = align_or(props.text("align"), "left");

    open_row(
        out,
        block,
        "bm-text",
        &format!(r#" align="{align}" style="text-align:{align}""#),
        ix,
    );
    let _ = write!(out, r#"<p class="bm-paragraph">{}</p>"#, multiline(text));
    close_row(out);
}

/// Bulletproof table button.
///
/// Props: `label` ("Click here"), `url` ("#"), `background` ("#4f46e5"),
/// `color` ("#ffffff"), `align` ("center").
pub(crate) fn button(block: &Block, ix: Interactivity<'_>, out: &mut String) {
    let props = &block.props;
    let label = props.text_or("label", "Click here");
    let url = url_or(props.text("url"), "#");
    let background = color_or(props.text("background"), "#4f46e5");
    let color = color_or(props.text("color"), "#ffffff");
    let align = align_or(props.text("align"), "center");

    open_row(out, block, "bm-button-row", &format!(r#" align="{align}""#), ix);
    let _ = write!(
        out,
        concat!(
            r#"<table role="presentation" class="bm-button-table" cellpadding="0" cellspacing="0" border="0"><tr>"#,
            r#"<td class="bm-button-cell" bgcolor="{bg}" style="background-color:{bg}">"#,
            r#"<a class="bm-button" href="{href}" target="_blank" style="color:{color}">{label}</a>"#,
            "</td></tr></table>"
        ),
        bg = background,
        href = encode_double_quoted_attribute(url),
        color = color,
        label = encode_text(label),
    );
    close_row(out);
}

/// Image. Props: `src` (required to show anything), `alt` (""), `width` (600, 1-600), `href`.
///
/// Without `src` the alt text is shown so the row keeps its place.
pub(crate) fn image(block: &Block, ix: Interactivity<'_>, out: &mut String) {
    let props = &block.props;
    let alt = props.text_or("alt", "");
    let width = props.number_in("width", 600, 1, 600);

    open_row(out, block, "bm-image-row", r#" align="center""#, ix);
    match props.text("src").filter(|s| s.starts_with("https://") || s.starts_with("http://")) {
        Some(src) => {
            let img = format!(
                r#"<img class="bm-image" src="{}" alt="{}" width="{width}">"#,
                encode_double_quoted_attribute(src),
                encode_double_quoted_attribute(alt)
            );
            match props.text("href").map(|h| url_or(Some(h), "#")) {
                Some(href) => {
                    let _ = write!(
                        out,
                        r#"<a href="{}" target="_blank">{img}</a>"#,
                        encode_double_quoted_attribute(href)
                    );
                }
                None => out.push_str(&img),
            }
        }
        None => {
            let _ = write!(out, r#"<p class="bm-paragraph">{}</p>"#, encode_text(alt));
        }
    }
    close_row(out);
}

/// Horizontal rule. Props: `color` ("#e5e7eb"), `thickness` (1, 1-8).
pub(crate) fn divider(block: &Block, ix: Interactivity<'_>, out: &mut String) {
    let props = &block.props;
    let color = color_or(props.text("color"), "#e5e7eb");
    let thickness = props.number_in("thickness", 1, 1, 8);

    open_row(out, block, "bm-divider", "", ix);
    let _ = write!(
        out,
        concat!(
            r#"<table role="presentation" width="100%" cellpadding="0" cellspacing="0" border="0"><tr>"#,
            r#"<td class="bm-divider-line" style="border-top:{t}px solid {c};font-size:0;line-height:0">&nbsp;</td>"#,
            "</tr></table>"
        ),
        t = thickness,
        c = color,
    );
    close_row(out);
}

/// Vertical space. Props: `height` (24, 0-200).
pub(crate) fn spacer(block: &Block, ix: Interactivity<'_>, out: &mut String) {
    let height = block.props.number_in("height", 24, 0, 200);

    open_row(
        out,
        block,
        "bm-spacer",
        &format!(r#" height="{height}" style="height:{height}px;font-size:0;line-height:0""#),
        ix,
    );
    out.push_str("&nbsp;");
    close_row(out);
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::model::BlockType;

    fn render(f: fn(&Block, Interactivity<'_>, &mut String), block: &Block) -> String {
        let mut out = String::new();
        f(block, Interactivity::Static, &mut out);
        out
    }

    #[test]
    fn test_heading_defaults() {
        let html = render(heading, &Block::new("h", BlockType::Heading));

        assert_eq!(
            html,
            "<tr><td class=\"bm-block bm-heading\" align=\"left\" style=\"text-align:left\"><h1 class=\"bm-h1\">Your headline</h1></td></tr>\n"
        );
    }

    #[test]
    fn test_heading_level_clamped() {
        let block = Block::new("h", BlockType::Heading).with_prop("level", 6);

        assert!(render(heading, &block).contains("<h3 class=\"bm-h3\">"));
    }

    #[test]
    fn test_text_escapes_markup() {
        let block = Block::new("t", BlockType::Text).with_prop("text", "<b>hi</b>\nthere");
        let html = render(text, &block);

        assert!(html.contains("&lt;b&gt;hi&lt;/b&gt;<br>there"));
        assert!(!html.contains("<b>"));
    }

    #[test]
    fn test_button_props() {
        let block = Block::new("b", BlockType::Button)
            .with_prop("label", "Buy")
            .with_prop("url", "https://shop.test/?a=1&b=2")
            .with_prop("background", "#ff0000");
        let html = render(button, &block);

        assert!(html.contains(r##"bgcolor="#ff0000""##));
        assert!(html.contains(r#"href="https://shop.test/?a=1&amp;b=2""#));
        assert!(html.contains(">Buy</a>"));
    }

    #[test]
    fn test_button_rejects_script_url() {
        let block = Block::new("b", BlockType::Button).with_prop("url", "javascript:alert(1)");

        assert!(render(button, &block).contains(r##"href="#""##));
    }

    #[test]
    fn test_image_without_src_shows_alt() {
        let block = Block::new("i", BlockType::Image).with_prop("alt", "Logo");
        let html = render(image, &block);

        assert!(!html.contains("<img"));
        assert!(html.contains("Logo"));
    }

    #[test]
    fn test_image_with_link() {
        let block = Block::new("i", BlockType::Image)
            .with_prop("src", "https://cdn.test/a.png")
            .with_prop("href", "https://site.test")
            .with_prop("width", 300);
        let html = render(image, &block);

        assert!(html.contains(r#"<a href="https://site.test" target="_blank"><img class="bm-image" src="https://cdn.test/a.png" alt="" width="300"></a>"#));
    }

    #[test]
    fn test_spacer_height_clamped() {
        let block = Block::new("s", BlockType::Spacer).with_prop("height", 1000);

        assert!(render(spacer, &block).contains(r#"height="200""#));
    }

    #[test]
    fn test_divider_defaults() {
        let html = render(divider, &Block::new("d", BlockType::Divider));

        assert!(html.contains("border-top:1px solid #e5e7eb"));
    }
}
