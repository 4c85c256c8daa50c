//! Minimal stylesheet and declaration parsing.
//!
//! Only what inlining needs: top-level rules split into prelude and body,
//! at-rules kept as raw text, and declaration lists with `!important`.
//! Malformed input is skipped rather than rejected.

/// A single `property: value` declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration {
    /// Lowercased property name.
    pub property: String,
    /// Value with whitespace collapsed and the `!important` marker removed.
    pub value: String,
    /// Whether the declaration carried `!important`.
    pub important: bool,
}

impl Declaration {
    /// Parse one `property: value [!important]` pair.
    fn parse(input: &str) -> Option<Self> {
        let (property, value) = input.split_once(':')?;
        let property = property.trim().to_ascii_lowercase();
        if property.is_empty() || property.contains(char::is_whitespace) {
            return None;
        }

        let mut value = collapse_whitespace(value);
        let important = strip_important(&mut value);
        if value.is_empty() {
            return None;
        }

        Some(Self {
            property,
            value,
            important,
        })
    }
}

/// Remove a trailing `!important` (any case, optional space after `!`).
fn strip_important(value: &mut String) -> bool {
    let Some(bang) = value.rfind('!') else {
        return false;
    };
    if !value[bang + 1..].trim().eq_ignore_ascii_case("important") {
        return false;
    }
    value.truncate(bang);
    let trimmed = value.trim_end().len();
    value.truncate(trimmed);
    true
}

fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Parse a declaration block (`color:red; margin: 0 !important`).
///
/// Semicolons inside quotes or parentheses do not split declarations.
pub fn parse_declarations(block: &str) -> Vec<Declaration> {
    split_top_level(block, ';')
        .into_iter()
        .filter_map(Declaration::parse)
        .collect()
}

/// Serialize declarations as an inline `style` value.
///
/// Stable under re-parsing: `serialize(parse(serialize(d))) == serialize(d)`.
pub fn serialize_declarations(declarations: &[Declaration]) -> String {
    declarations
        .iter()
        .map(|d| {
            if d.important {
                format!("{}:{} !important", d.property, d.value)
            } else {
                format!("{}:{}", d.property, d.value)
            }
        })
        .collect::<Vec<_>>()
        .join(";")
}

/// Top-level item of a stylesheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum CssItem {
    /// Qualified rule: selector prelude and declaration body.
    Rule { prelude: String, body: String },
    /// Any at-rule, verbatim (`@media ... { ... }`, `@import ...;`).
    AtRule(String),
}

/// Split a stylesheet into rules and at-rules.
pub(crate) fn parse_stylesheet(css: &str) -> Vec<CssItem> {
    let css = strip_comments(css);
    let bytes = css.as_bytes();
    let mut items = Vec::new();
    let mut pos = 0;

    while pos < bytes.len() {
        if bytes[pos].is_ascii_whitespace() {
            pos += 1;
            continue;
        }

        if bytes[pos] == b'@' {
            let end = at_rule_end(&css, pos);
            items.push(CssItem::AtRule(css[pos..end].trim().to_owned()));
            pos = end;
            continue;
        }

        let Some(open) = find_top_level(&css, pos, b'{') else {
            break;
        };
        let close = matching_brace(&css, open).unwrap_or(css.len());
        let prelude = css[pos..open].trim();
        let body = &css[open + 1..close.min(css.len())];
        if !prelude.is_empty() {
            items.push(CssItem::Rule {
                prelude: prelude.to_owned(),
                body: body.trim().to_owned(),
            });
        }
        pos = (close + 1).min(css.len());
    }

    items
}

/// Remove `/* ... */` comments outside strings.
fn strip_comments(css: &str) -> String {
    let mut out = String::with_capacity(css.len());
    let mut chars = css.char_indices().peekable();
    let mut quote: Option<char> = None;

    while let Some((i, c)) = chars.next() {
        if let Some(q) = quote {
            out.push(c);
            if c == '\\' {
                if let Some((_, escaped)) = chars.next() {
                    out.push(escaped);
                }
            } else if c == q {
                quote = None;
            }
            continue;
        }
        match c {
            '"' | '\'' => {
                quote = Some(c);
                out.push(c);
            }
            '/' if css[i..].starts_with("/*") => {
                chars.next();
                match css[i + 2..].find("*/") {
                    Some(end) => {
                        let resume = i + 2 + end + 2;
                        while chars.peek().is_some_and(|(j, _)| *j < resume) {
                            chars.next();
                        }
                    }
                    None => break,
                }
            }
            _ => out.push(c),
        }
    }
    out
}

/// End offset (exclusive) of the at-rule starting at `start`.
fn at_rule_end(css: &str, start: usize) -> usize {
    let bytes = css.as_bytes();
    let mut quote = None;
    let mut i = start;
    while i < bytes.len() {
        let b = bytes[i];
        match quote {
            Some(q) => {
                if b == b'\\' {
                    i += 1;
                } else if b == q {
                    quote = None;
                }
            }
            None => match b {
                b'"' | b'\'' => quote = Some(b),
                b';' => return i + 1,
                b'{' => return matching_brace(css, i).map_or(css.len(), |c| c + 1),
                _ => {}
            },
        }
        i += 1;
    }
    css.len()
}

/// Offset of the first `target` byte at or after `start` that is outside quotes.
fn find_top_level(css: &str, start: usize, target: u8) -> Option<usize> {
    let bytes = css.as_bytes();
    let mut quote = None;
    let mut i = start;
    while i < bytes.len() {
        let b = bytes[i];
        match quote {
            Some(q) => {
                if b == b'\\' {
                    i += 1;
                } else if b == q {
                    quote = None;
                }
            }
            None if b == b'"' || b == b'\'' => quote = Some(b),
            None if b == target => return Some(i),
            None => {}
        }
        i += 1;
    }
    None
}

/// Offset of the `}` matching the `{` at `open`.
fn matching_brace(css: &str, open: usize) -> Option<usize> {
    let bytes = css.as_bytes();
    let mut depth = 0usize;
    let mut quote = None;
    let mut i = open;
    while i < bytes.len() {
        let b = bytes[i];
        match quote {
            Some(q) => {
                if b == b'\\' {
                    i += 1;
                } else if b == q {
                    quote = None;
                }
            }
            None => match b {
                b'"' | b'\'' => quote = Some(b),
                b'{' => depth += 1,
                b'}' => {
                    depth -= 1;
                    if depth == 0 {
                        return Some(i);
                    }
                }
                _ => {}
            },
        }
        i += 1;
    }
    None
}

/// Split on `separator` outside quotes, parentheses and brackets.
pub(crate) fn split_top_level(input: &str, separator: char) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut escaped = false;
    let mut start = 0;

    for (i, c) in input.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        if let Some(q) = quote {
            match c {
                '\\' => escaped = true,
                _ if c == q => quote = None,
                _ => {}
            }
            continue;
        }
        match c {
            '"' | '\'' => quote = Some(c),
            '(' | '[' => depth += 1,
            ')' | ']' => depth = depth.saturating_sub(1),
            _ if c == separator && depth == 0 => {
                parts.push(&input[start..i]);
                start = i + c.len_utf8();
            }
            _ => {}
        }
    }
    parts.push(&input[start..]);
    parts
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn decl(property: &str, value: &str, important: bool) -> Declaration {
        Declaration {
            property: property.to_owned(),
            value: value.to_owned(),
            important,
        }
    }

    #[test]
    fn test_parse_declarations() {
        assert_eq!(
            parse_declarations("Color: Red ; margin:0  auto !important;;bogus;padding:"),
            vec![
                decl("color", "Red", false),
                decl("margin", "0 auto", true),
            ]
        );
    }

    #[test]
    fn test_important_variants() {
        assert_eq!(
            parse_declarations("a:1!important;b:2 ! IMPORTANT"),
            vec![decl("a", "1", true), decl("b", "2", true)]
        );
    }

    #[test]
    fn test_semicolon_inside_url_and_quotes() {
        assert_eq!(
            parse_declarations(r#"background:url("a;b.png");font-family:"x;y",serif"#),
            vec![
                decl("background", r#"url("a;b.png")"#, false),
                decl("font-family", r#""x;y",serif"#, false),
            ]
        );
    }

    #[test]
    fn test_serialize_is_stable() {
        let first = serialize_declarations(&parse_declarations("color : red;margin:0 !important"));
        let second = serialize_declarations(&parse_declarations(&first));

        assert_eq!(first, "color:red;margin:0 !important");
        assert_eq!(first, second);
    }

    #[test]
    fn test_parse_stylesheet_rules_and_at_rules() {
        let items = parse_stylesheet(
            "/* c */ p{color:red} @import url(x.css); @media (max-width:600px){.a{b:c}} .x, .y { margin : 0 }",
        );

        assert_eq!(
            items,
            vec![
                CssItem::Rule {
                    prelude: "p".to_owned(),
                    body: "color:red".to_owned()
                },
                CssItem::AtRule("@import url(x.css);".to_owned()),
                CssItem::AtRule("@media (max-width:600px){.a{b:c}}".to_owned()),
                CssItem::Rule {
                    prelude: ".x, .y".to_owned(),
                    body: "margin : 0".to_owned()
                },
            ]
        );
    }

    #[test]
    fn test_comment_inside_string_kept() {
        let items = parse_stylesheet(r#"p{content:"/* not a comment */"}"#);

        assert_eq!(
            items,
            vec![CssItem::Rule {
                prelude: "p".to_owned(),
                body: r#"content:"/* not a comment */""#.to_owned()
            }]
        );
    }

    #[test]
    fn test_unterminated_rule_takes_rest() {
        let items = parse_stylesheet("p{color:red");

        assert_eq!(
            items,
            vec![CssItem::Rule {
                prelude: "p".to_owned(),
                body: "color:red".to_owned()
            }]
        );
    }

    #[test]
    fn test_split_top_level() {
        assert_eq!(split_top_level("a, b:not(c, d), e", ','), vec!["a", " b:not(c, d)", " e"]);
    }
}
