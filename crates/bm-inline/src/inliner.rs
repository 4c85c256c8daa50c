//! Stylesheet to `style` attribute folding.

use std::collections::HashMap;
use std::fmt::Write;

use html_escape::encode_double_quoted_attribute;

use crate::budget::{InlinedEmail, SizeBudget};
use crate::css::{CssItem, Declaration, parse_declarations, parse_stylesheet, serialize_declarations, split_top_level};
use crate::html::{Attribute, Token, is_non_visual, is_void, tokenize};
use crate::selector::{ElementInfo, Selector, Specificity};

/// Attribute marking a `<style>` block the inliner produced and must not re-read.
const RETAINED_ATTR: &str = "data-bm-retained";

/// Inline all stylesheet rules and check the result against Gmail's budget.
pub fn inline(markup: &str) -> InlinedEmail {
    inline_with_budget(markup, SizeBudget::default())
}

/// Inline all stylesheet rules and check the result against `budget`.
pub fn inline_with_budget(markup: &str, budget: SizeBudget) -> InlinedEmail {
    budget.evaluate(inline_css(markup))
}

/// Inline all stylesheet rules without measuring.
///
/// Running this on its own output returns the output unchanged.
pub fn inline_css(markup: &str) -> String {
    let tokens = tokenize(markup);
    let sheet = collect_stylesheet(&tokens);

    let mut out = String::with_capacity(markup.len() + markup.len() / 2);
    let mut ancestors: Vec<ElementInfo> = Vec::new();
    let mut retained_written = false;
    let mut styled = 0usize;

    for token in &tokens {
        match token {
            Token::Raw(raw) => out.push_str(raw),
            Token::Style { raw, attrs, .. } => {
                if !is_inlinable_style(attrs) {
                    out.push_str(raw);
                } else if !retained_written {
                    retained_written = true;
                    if !sheet.retained.is_empty() {
                        let _ = write!(
                            out,
                            "<style {RETAINED_ATTR}>\n{}\n</style>",
                            sheet.retained.join("\n")
                        );
                    }
                }
            }
            Token::StartTag {
                raw,
                name_raw,
                name,
                attrs,
                self_closing,
            } => {
                let element = element_info(name, attrs);
                let rewritten = if is_non_visual(name) {
                    None
                } else {
                    sheet.style_for(&element, &ancestors, attrs)
                };
                match rewritten {
                    Some(style) => {
                        styled += 1;
                        write_tag(&mut out, name_raw, attrs, &style, *self_closing);
                    }
                    None => out.push_str(raw),
                }
                if !*self_closing && !is_void(name) {
                    ancestors.push(element);
                }
            }
            Token::EndTag { raw, name } => {
                if let Some(open) = ancestors.iter().rposition(|el| el.name == *name) {
                    ancestors.truncate(open);
                }
                out.push_str(raw);
            }
        }
    }

    tracing::debug!(
        rules = sheet.rules.len(),
        retained = sheet.retained.len(),
        styled,
        "Inlined CSS"
    );
    out
}

/// One inlinable selector with its declarations.
struct SheetRule {
    selector: Selector,
    specificity: Specificity,
    order: usize,
    declarations: Vec<Declaration>,
}

#[derive(Default)]
struct Stylesheet {
    rules: Vec<SheetRule>,
    /// Rules kept as CSS text, in source order.
    retained: Vec<String>,
}

/// Cascade level, lowest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Level {
    Sheet,
    Inline,
    SheetImportant,
    InlineImportant,
}

impl Stylesheet {
    /// Resolved `style` value for an element, or `None` when no rule matches.
    fn style_for(
        &self,
        element: &ElementInfo,
        ancestors: &[ElementInfo],
        attrs: &[Attribute<'_>],
    ) -> Option<String> {
        let mut matched: Vec<&SheetRule> = self
            .rules
            .iter()
            .filter(|rule| rule.selector.matches(element, ancestors))
            .collect();
        if matched.is_empty() {
            return None;
        }
        matched.sort_by_key(|rule| (rule.specificity, rule.order));

        // Output is in cascade order: each winner is written after everything it beat.
        let mut winners: HashMap<String, (Level, usize, Declaration)> = HashMap::new();
        let mut seq = 0;
        let mut consider = |decl: &Declaration, level: Level| {
            if let Some((current, _, _)) = winners.get(&decl.property)
                && *current > level
            {
                return;
            }
            seq += 1;
            winners.insert(decl.property.clone(), (level, seq, decl.clone()));
        };

        // Ascending specificity, so later equal-level entries win.
        for rule in &matched {
            for decl in &rule.declarations {
                let level = if decl.important {
                    Level::SheetImportant
                } else {
                    Level::Sheet
                };
                consider(decl, level);
            }
        }

        let existing = attrs
            .iter()
            .find(|a| a.name == "style")
            .map(|a| parse_declarations(a.value_or_empty()))
            .unwrap_or_default();
        for decl in &existing {
            let level = if decl.important {
                Level::InlineImportant
            } else {
                Level::Inline
            };
            consider(decl, level);
        }

        let mut resolved: Vec<(Level, usize, Declaration)> = winners.into_values().collect();
        resolved.sort_by_key(|(level, seq, _)| (*level, *seq));
        let resolved: Vec<Declaration> = resolved.into_iter().map(|(_, _, decl)| decl).collect();
        Some(serialize_declarations(&resolved))
    }
}

fn collect_stylesheet(tokens: &[Token<'_>]) -> Stylesheet {
    let mut sheet = Stylesheet::default();

    for token in tokens {
        let Token::Style { attrs, css, .. } = token else {
            continue;
        };
        if !is_inlinable_style(attrs) {
            continue;
        }

        for item in parse_stylesheet(css) {
            match item {
                CssItem::AtRule(raw) => sheet.retained.push(raw),
                CssItem::Rule { prelude, body } => {
                    let declarations = parse_declarations(&body);
                    if declarations.is_empty() {
                        continue;
                    }
                    let mut unsupported = Vec::new();
                    for part in split_top_level(&prelude, ',') {
                        let part = part.trim();
                        match Selector::parse(part) {
                            Some(selector) => sheet.rules.push(SheetRule {
                                specificity: selector.specificity(),
                                selector,
                                order: sheet.rules.len(),
                                declarations: declarations.clone(),
                            }),
                            None if !part.is_empty() => unsupported.push(part),
                            None => {}
                        }
                    }
                    if !unsupported.is_empty() {
                        sheet.retained.push(format!(
                            "{}{{{}}}",
                            unsupported.join(","),
                            serialize_declarations(&declarations)
                        ));
                    }
                }
            }
        }
    }

    sheet
}

/// Whether a `<style>` element's rules should be folded into the markup.
fn is_inlinable_style(attrs: &[Attribute<'_>]) -> bool {
    if attrs.iter().any(|a| a.name == RETAINED_ATTR) {
        return false;
    }
    attrs
        .iter()
        .find(|a| a.name == "media")
        .is_none_or(|a| matches!(a.value_or_empty().trim().to_ascii_lowercase().as_str(), "" | "all" | "screen"))
}

fn element_info(name: &str, attrs: &[Attribute<'_>]) -> ElementInfo {
    let attr = |key: &str| attrs.iter().find(|a| a.name == key).map(Attribute::value_or_empty);
    ElementInfo {
        name: name.to_owned(),
        id: attr("id").map(str::trim).filter(|id| !id.is_empty()).map(ToOwned::to_owned),
        classes: attr("class")
            .map(|c| c.split_whitespace().map(ToOwned::to_owned).collect())
            .unwrap_or_default(),
    }
}

/// Rebuild a start tag with `style` replacing the first `style` attribute.
fn write_tag(out: &mut String, name_raw: &str, attrs: &[Attribute<'_>], style: &str, self_closing: bool) {
    let style_attr = format!(" style=\"{}\"", encode_double_quoted_attribute(style));
    let mut style_written = false;

    out.push('<');
    out.push_str(name_raw);
    for attr in attrs {
        if attr.name == "style" {
            if !style_written {
                out.push_str(&style_attr);
                style_written = true;
            }
            continue;
        }
        out.push(' ');
        out.push_str(attr.raw);
    }
    if !style_written {
        out.push_str(&style_attr);
    }
    out.push_str(if self_closing { " />" } else { ">" });
}
