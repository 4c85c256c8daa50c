//! Lenient HTML tokenizer.
//!
//! Splits markup into tags, `<style>` elements and everything else. Each token
//! keeps its source slice so untouched parts are copied back byte for byte.

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::Regex;

/// Attribute name with an optional double-quoted, single-quoted or bare value.
static ATTR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"([^\s"'>/=]+)(?:\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'=<>`]+)))?"#).unwrap()
});

/// Elements without an end tag.
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

/// Elements whose content is text up to the matching end tag.
const RAW_TEXT_ELEMENTS: &[&str] = &["script", "textarea", "title"];

/// Elements that never receive inline styles.
const NON_VISUAL_ELEMENTS: &[&str] = &[
    "head", "meta", "title", "link", "base", "script", "style", "noscript", "template",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Attribute<'a> {
    /// Lowercased name.
    pub(crate) name: String,
    /// Entity-decoded value, `None` for bare attributes.
    pub(crate) value: Option<Cow<'a, str>>,
    /// Source text of the whole attribute.
    pub(crate) raw: &'a str,
}

impl Attribute<'_> {
    pub(crate) fn value_or_empty(&self) -> &str {
        self.value.as_deref().unwrap_or("")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Token<'a> {
    /// Text, comments, doctype and raw-text element content.
    Raw(&'a str),
    StartTag {
        raw: &'a str,
        /// Tag name as written.
        name_raw: &'a str,
        /// Lowercased tag name.
        name: String,
        attrs: Vec<Attribute<'a>>,
        self_closing: bool,
    },
    EndTag {
        raw: &'a str,
        name: String,
    },
    /// A whole `<style>` element.
    Style {
        raw: &'a str,
        attrs: Vec<Attribute<'a>>,
        css: &'a str,
    },
}

pub(crate) fn is_void(name: &str) -> bool {
    VOID_ELEMENTS.contains(&name)
}

pub(crate) fn is_non_visual(name: &str) -> bool {
    NON_VISUAL_ELEMENTS.contains(&name)
}

/// Split `input` into tokens. Concatenating every token's source slice
/// reproduces the input exactly.
pub(crate) fn tokenize(input: &str) -> Vec<Token<'_>> {
    let lower = input.to_ascii_lowercase();
    let bytes = input.as_bytes();
    let mut tokens = Vec::new();
    let mut pos = 0;
    let mut text_start = 0;

    while let Some(offset) = input[pos..].find('<') {
        let lt = pos + offset;
        let next = bytes.get(lt + 1).copied();

        let Some((end, kind)) = classify(input, &lower, lt, next) else {
            pos = lt + 1;
            continue;
        };

        if text_start < lt {
            tokens.push(Token::Raw(&input[text_start..lt]));
        }

        match kind {
            TagKind::Markup => tokens.push(Token::Raw(&input[lt..end])),
            TagKind::End => tokens.push(Token::EndTag {
                raw: &input[lt..end],
                name: tag_name(&input[lt + 2..end]).to_ascii_lowercase(),
            }),
            TagKind::Start => {
                let raw = &input[lt..end];
                let name_raw = tag_name(&raw[1..]);
                let name = name_raw.to_ascii_lowercase();
                let inner = &raw[1 + name_raw.len()..raw.len() - 1];
                let self_closing = inner.trim_end().ends_with('/');
                let attrs = parse_attributes(inner);

                if name == "style" {
                    let close = find_end_tag(&lower, end, "style");
                    let css = &input[end..close.start];
                    tokens.push(Token::Style {
                        raw: &input[lt..close.end],
                        attrs,
                        css,
                    });
                    pos = close.end;
                    text_start = close.end;
                    continue;
                }

                let raw_text = RAW_TEXT_ELEMENTS.contains(&name.as_str()) && !self_closing;
                tokens.push(Token::StartTag {
                    raw,
                    name_raw,
                    name: name.clone(),
                    attrs,
                    self_closing,
                });
                if raw_text {
                    let close = find_end_tag(&lower, end, &name);
                    if end < close.start {
                        tokens.push(Token::Raw(&input[end..close.start]));
                    }
                    pos = close.start;
                    text_start = close.start;
                    continue;
                }
            }
        }

        pos = end;
        text_start = end;
    }

    if text_start < input.len() {
        tokens.push(Token::Raw(&input[text_start..]));
    }
    tokens
}

enum TagKind {
    Start,
    End,
    /// Comment, doctype or processing instruction.
    Markup,
}

/// Classify the `<` at `lt`. Returns the exclusive end of the construct, or
/// `None` when the `<` is plain text.
fn classify(input: &str, lower: &str, lt: usize, next: Option<u8>) -> Option<(usize, TagKind)> {
    match next? {
        b'!' if input[lt..].starts_with("<!--") => {
            let end = input[lt + 4..].find("-->").map_or(input.len(), |i| lt + 4 + i + 3);
            Some((end, TagKind::Markup))
        }
        b'!' | b'?' => {
            let end = input[lt..].find('>').map_or(input.len(), |i| lt + i + 1);
            Some((end, TagKind::Markup))
        }
        b'/' => {
            let after = *input.as_bytes().get(lt + 2)?;
            if !after.is_ascii_alphabetic() {
                return None;
            }
            let end = lower[lt..].find('>').map(|i| lt + i + 1)?;
            Some((end, TagKind::End))
        }
        b if b.is_ascii_alphabetic() => tag_end(input, lt).map(|end| (end, TagKind::Start)),
        _ => None,
    }
}

/// Exclusive end of the start tag at `lt`, honoring quoted attribute values.
fn tag_end(input: &str, lt: usize) -> Option<usize> {
    let bytes = input.as_bytes();
    let mut quote = None;
    for (i, &b) in bytes.iter().enumerate().skip(lt + 1) {
        match quote {
            Some(q) if b == q => quote = None,
            Some(_) => {}
            None if b == b'"' || b == b'\'' => quote = Some(b),
            None if b == b'>' => return Some(i + 1),
            None => {}
        }
    }
    None
}

/// Leading tag name of `s`.
fn tag_name(s: &str) -> &str {
    let len = s
        .find(|c: char| !(c.is_ascii_alphanumeric() || c == '-' || c == ':'))
        .unwrap_or(s.len());
    &s[..len]
}

struct EndTagSpan {
    start: usize,
    end: usize,
}

/// Locate `</name ...>` at or after `from`. Missing end tags run to the end of input.
fn find_end_tag(lower: &str, from: usize, name: &str) -> EndTagSpan {
    let needle = format!("</{name}");
    let mut search = from;
    while let Some(i) = lower[search..].find(&needle) {
        let start = search + i;
        let after = start + needle.len();
        let boundary = lower
            .as_bytes()
            .get(after)
            .is_none_or(|b| b.is_ascii_whitespace() || *b == b'>' || *b == b'/');
        if boundary {
            let end = lower[after..].find('>').map_or(lower.len(), |j| after + j + 1);
            return EndTagSpan { start, end };
        }
        search = after;
    }
    EndTagSpan {
        start: lower.len(),
        end: lower.len(),
    }
}

fn parse_attributes(inner: &str) -> Vec<Attribute<'_>> {
    ATTR_RE
        .captures_iter(inner)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let name = caps.get(1)?.as_str().to_ascii_lowercase();
            let value = caps
                .get(2)
                .or_else(|| caps.get(3))
                .or_else(|| caps.get(4))
                .map(|m| html_escape::decode_html_entities(m.as_str()));
            Some(Attribute {
                name,
                value,
                raw: whole.as_str(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn source(token: &Token<'_>) -> String {
        match token {
            Token::Raw(raw) | Token::StartTag { raw, .. } | Token::EndTag { raw, .. } | Token::Style { raw, .. } => {
                (*raw).to_owned()
            }
        }
    }

    #[test]
    fn test_tokens_reproduce_input() {
        let input = concat!(
            "<!DOCTYPE html><html><head><!-- <p class=\"x\"> --><title>a < b</title>",
            "<style media=\"screen\">p > a { color: red }</style></head>",
            "<body><p class='c' data-x=\"1 > 0\">1 < 2 & 3</p><br/><script>if (a<b) {}</script></body></html>",
        );
        let rebuilt: String = tokenize(input).iter().map(source).collect();

        assert_eq!(rebuilt, input);
    }

    #[test]
    fn test_start_tag_attributes() {
        let tokens = tokenize(r#"<TD Class="a b" id=main data-x='q&amp;a' hidden>"#);

        let Token::StartTag {
            name,
            name_raw,
            attrs,
            self_closing,
            ..
        } = &tokens[0]
        else {
            panic!("expected start tag, got {tokens:?}");
        };
        assert_eq!(name, "td");
        assert_eq!(*name_raw, "TD");
        assert!(!self_closing);
        let pairs: Vec<_> = attrs
            .iter()
            .map(|a| (a.name.as_str(), a.value.as_deref()))
            .collect();
        assert_eq!(
            pairs,
            vec![
                ("class", Some("a b")),
                ("id", Some("main")),
                ("data-x", Some("q&a")),
                ("hidden", None),
            ]
        );
    }

    #[test]
    fn test_style_element_is_one_token() {
        let tokens = tokenize("<style type=\"text/css\">.a{color:red}</STYLE ><p>");

        assert_eq!(tokens.len(), 2);
        let Token::Style { css, attrs, raw } = &tokens[0] else {
            panic!("expected style token");
        };
        assert_eq!(*css, ".a{color:red}");
        assert_eq!(attrs[0].name, "type");
        assert!(raw.ends_with("</STYLE >"));
    }

    #[test]
    fn test_script_content_is_raw() {
        let tokens = tokenize("<script><p class=\"x\"></script>");

        assert_eq!(tokens[1], Token::Raw("<p class=\"x\">"));
        assert!(matches!(&tokens[2], Token::EndTag { name, .. } if name == "script"));
    }

    #[test]
    fn test_self_closing_detection() {
        let tokens = tokenize("<img src=\"a.png\" /><br>");

        assert!(matches!(&tokens[0], Token::StartTag { self_closing: true, .. }));
        assert!(matches!(&tokens[1], Token::StartTag { self_closing: false, .. }));
    }

    #[test]
    fn test_lone_less_than_is_text() {
        let tokens = tokenize("a < b <3");

        assert_eq!(tokens, vec![Token::Raw("a < b <3")]);
    }

    #[test]
    fn test_unterminated_style_runs_to_end() {
        let tokens = tokenize("<style>.a{color:red}");

        assert!(matches!(&tokens[0], Token::Style { css, .. } if *css == ".a{color:red}"));
    }
}
