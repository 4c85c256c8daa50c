//! Base stylesheet and style value sanitizing.

use std::sync::LazyLock;

use regex::Regex;

/// Stylesheet emitted in the document `<head>`.
///
/// Class rules are folded into inline `style` attributes at export time. The
/// `:hover` and `@media` rules cannot be inlined and survive in a retained
/// `<style>` block for clients that honor it.
pub const BASE_STYLESHEET: &str = "\
body{margin:0;padding:0;background-color:#f3f4f6;}
.bm-outer{background-color:#f3f4f6;}
.bm-wrapper{width:600px;max-width:600px;background-color:#ffffff;font-family:Helvetica,Arial,sans-serif;color:#111827;}
.bm-block{padding:16px 24px;}
.bm-preheader{display:none !important;max-height:0;overflow:hidden;opacity:0;color:transparent;}
h1,h2,h3{margin:0;font-weight:bold;line-height:1.25;}
.bm-h1{font-size:28px;}
.bm-h2{font-size:22px;}
.bm-h3{font-size:18px;}
.bm-paragraph{margin:0;font-size:16px;line-height:1.5;}
.bm-button-cell{border-radius:6px;padding:12px 24px;}
a.bm-button{font-size:16px;font-weight:bold;text-decoration:none;display:inline-block;}
.bm-image{display:block;border:0;height:auto;max-width:100%;}
.bm-spacer{padding:0;}
.bm-banner{padding:24px;border-radius:8px;text-align:center;}
.bm-banner-title{margin:0 0 8px 0;font-size:24px;font-weight:bold;}
.bm-banner-body{margin:0 0 16px 0;font-size:16px;line-height:1.5;}
.bm-banner-cta{font-weight:bold;text-decoration:underline;}
.bm-question{margin:0 0 12px 0;font-size:18px;font-weight:bold;text-align:center;}
.bm-option{display:inline-block;text-decoration:none;color:#111827;}
.bm-feedback-option{font-size:32px;line-height:1.2;padding:8px 12px;text-align:center;}
.bm-option-label{font-size:12px;color:#6b7280;}
.bm-poll-cell{padding:4px 0;}
.bm-poll-option{display:block;padding:12px 16px;border:1px solid #d1d5db;border-radius:6px;font-size:16px;text-align:center;}
.bm-option-static{cursor:default;}
.bm-pattern{padding:0;font-size:0;line-height:0;}
a:hover{opacity:0.85;}
@media only screen and (max-width:620px){.bm-wrapper{width:100% !important;}.bm-block{padding:12px 16px !important;}}
";

static COLOR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:#[0-9a-fA-F]{3,8}|rgba?\(\s*[0-9.%,\s]+\)|[a-zA-Z]{3,20})$").unwrap()
});

/// Accept a CSS color prop only if it is a hex, `rgb()`/`rgba()` or keyword value.
pub(crate) fn color_or<'a>(value: Option<&'a str>, default: &'a str) -> &'a str {
    match value {
        Some(v) if COLOR_RE.is_match(v) => v,
        _ => default,
    }
}

/// Accept a link prop only if it uses a scheme safe in email.
pub(crate) fn url_or<'a>(value: Option<&'a str>, default: &'a str) -> &'a str {
    match value {
        Some(v)
            if v.starts_with("https://")
                || v.starts_with("http://")
                || v.starts_with("mailto:")
                || v.starts_with('#') =>
        {
            v
        }
        _ => default,
    }
}

/// Horizontal alignment keyword.
pub(crate) fn align_or<'a>(value: Option<&'a str>, default: &'a str) -> &'a str {
    match value {
        Some(v @ ("left" | "center" | "right")) => v,
        _ => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_accepts_hex_rgb_keyword() {
        assert_eq!(color_or(Some("#fff"), "#000"), "#fff");
        assert_eq!(color_or(Some("#4F46E5"), "#000"), "#4F46E5");
        assert_eq!(color_or(Some("rgb(1, 2, 3)"), "#000"), "rgb(1, 2, 3)");
        assert_eq!(color_or(Some("tomato"), "#000"), "tomato");
    }

    #[test]
    fn test_color_rejects_injection() {
        assert_eq!(color_or(Some("red;position:fixed"), "#000"), "#000");
        assert_eq!(color_or(Some("url(javascript:x)"), "#000"), "#000");
        assert_eq!(color_or(None, "#000"), "#000");
    }

    #[test]
    fn test_url_schemes() {
        assert_eq!(url_or(Some("https://x.test"), "#"), "https://x.test");
        assert_eq!(url_or(Some("mailto:a@b.test"), "#"), "mailto:a@b.test");
        assert_eq!(url_or(Some("javascript:alert(1)"), "#"), "#");
    }

    #[test]
    fn test_align() {
        assert_eq!(align_or(Some("center"), "left"), "center");
        assert_eq!(align_or(Some("justify"), "left"), "left");
    }

    #[test]
    fn test_stylesheet_has_retained_rules() {
        assert!(BASE_STYLESHEET.contains("@media"));
        assert!(BASE_STYLESHEET.contains("a:hover"));
    }
}
