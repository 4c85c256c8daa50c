//! Decorative pattern band.

use super::{close_row, open_row};
use crate::mode::Interactivity;
use crate::model::Block;
use crate::style::color_or;

/// Full-width color band. Email clients cannot draw the pattern artwork, so
/// the variant only selects a class for clients that style it.
///
/// Props: `variant` ("dots"; one of dots, waves, stripes, solid),
/// `color` ("#eef2ff"), `height` (16, 4-120).
pub(crate) fn pattern(block: &Block, ix: Interactivity<'_>, out: &mut String) {
    let props = &block.props;
    let variant = match props.text("variant") {
        Some(v @ ("dots" | "waves" | "stripes" | "solid")) => v,
        _ => "dots",
    };
    let color = color_or(props.text("color"), "#eef2ff");
    let height = props.number_in("height", 16, 4, 120);

    open_row(
        out,
        block,
        &format!("bm-pattern bm-pattern-{variant}"),
        &format!(r#" bgcolor="{color}" height="{height}" style="background-color:{color};height:{height}px""#),
        ix,
    );
    out.push_str("&nbsp;");
    close_row(out);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::BlockType;

    #[test]
    fn test_pattern_variant_fallback() {
        let block = Block::new("p", BlockType::Pattern).with_prop("variant", "zigzag");
        let mut out = String::new();
        pattern(&block, Interactivity::Static, &mut out);

        assert!(out.contains("bm-pattern-dots"));
        assert!(out.contains(r#"height="16""#));
    }

    #[test]
    fn test_pattern_color() {
        let block = Block::new("p", BlockType::Pattern)
            .with_prop("variant", "waves")
            .with_prop("color", "#123456");
        let mut out = String::new();
        pattern(&block, Interactivity::Static, &mut out);

        assert!(out.contains("bm-pattern-waves"));
        assert!(out.contains("background-color:#123456"));
    }
}
