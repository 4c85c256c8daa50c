//! Selector parsing, matching and specificity.
//!
//! Supports type, class, id and universal selectors, compounds of those, and
//! the descendant and child combinators. Anything else (pseudo-classes,
//! attribute selectors, sibling combinators) is rejected so the caller can keep
//! the rule in a retained `<style>` block.
//!
//! Matching works on plain [`ElementInfo`] values and does not depend on any
//! DOM library.

use std::cmp::Ordering;

/// CSS specificity as `(ids, classes, types)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct Specificity(pub u32, pub u32, pub u32);

impl Ord for Specificity {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.0, self.1, self.2).cmp(&(other.0, other.1, other.2))
    }
}

impl PartialOrd for Specificity {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Element facts needed for matching.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct ElementInfo {
    /// Lowercased tag name.
    pub(crate) name: String,
    pub(crate) id: Option<String>,
    pub(crate) classes: Vec<String>,
}

/// One compound selector such as `td.cell#main`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
struct Compound {
    /// Lowercased type, `None` for `*` or omitted.
    tag: Option<String>,
    id: Option<String>,
    classes: Vec<String>,
}

impl Compound {
    fn matches(&self, element: &ElementInfo) -> bool {
        if self.tag.as_ref().is_some_and(|t| *t != element.name) {
            return false;
        }
        if self
            .id
            .as_ref()
            .is_some_and(|id| element.id.as_ref() != Some(id))
        {
            return false;
        }
        self.classes
            .iter()
            .all(|c| element.classes.iter().any(|ec| ec == c))
    }

    fn specificity(&self) -> Specificity {
        Specificity(
            u32::from(self.id.is_some()),
            u32::try_from(self.classes.len()).unwrap_or(u32::MAX),
            u32::from(self.tag.is_some()),
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Combinator {
    Descendant,
    Child,
}

/// A parsed complex selector, e.g. `.bm-wrapper td > a.bm-button`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector {
    /// Compounds left to right.
    compounds: Vec<Compound>,
    /// `combinators[i]` joins `compounds[i]` and `compounds[i + 1]`.
    combinators: Vec<Combinator>,
}

impl Selector {
    /// Parse a single complex selector. Returns `None` when it cannot be inlined.
    pub fn parse(input: &str) -> Option<Self> {
        let input = input.trim();
        if input.is_empty() {
            return None;
        }

        let mut compounds = Vec::new();
        let mut combinators = Vec::new();
        let mut pending: Option<Combinator> = None;
        let mut rest = input;

        loop {
            let trimmed = rest.trim_start();
            let had_space = trimmed.len() < rest.len();
            rest = trimmed;
            if rest.is_empty() {
                break;
            }

            if let Some(after) = rest.strip_prefix('>') {
                if compounds.is_empty() || pending == Some(Combinator::Child) {
                    return None;
                }
                pending = Some(Combinator::Child);
                rest = after;
                continue;
            }

            if !compounds.is_empty() {
                match pending.take() {
                    Some(c) => combinators.push(c),
                    None if had_space => combinators.push(Combinator::Descendant),
                    None => return None,
                }
            }

            let (compound, consumed) = parse_compound(rest)?;
            compounds.push(compound);
            rest = &rest[consumed..];
        }

        if compounds.is_empty() || pending.is_some() {
            return None;
        }
        Some(Self {
            compounds,
            combinators,
        })
    }

    /// Summed specificity of all compounds.
    pub fn specificity(&self) -> Specificity {
        self.compounds
            .iter()
            .map(Compound::specificity)
            .fold(Specificity::default(), |acc, s| {
                Specificity(acc.0 + s.0, acc.1 + s.1, acc.2 + s.2)
            })
    }

    /// Whether the selector matches `element`, given its ancestors from root
    /// to parent.
    pub(crate) fn matches(&self, element: &ElementInfo, ancestors: &[ElementInfo]) -> bool {
        let Some((last, _)) = self.compounds.split_last() else {
            return false;
        };
        if !last.matches(element) {
            return false;
        }
        self.compounds.len() == 1 || self.match_left(self.compounds.len() - 2, ancestors)
    }

    /// Match `compounds[index]` and everything left of it against `ancestors`.
    fn match_left(&self, index: usize, ancestors: &[ElementInfo]) -> bool {
        let compound = &self.compounds[index];
        let rest_matches = |end: usize| index == 0 || self.match_left(index - 1, &ancestors[..end]);

        match self.combinators[index] {
            Combinator::Child => ancestors
                .split_last()
                .is_some_and(|(parent, _)| {
                    compound.matches(parent) && rest_matches(ancestors.len() - 1)
                }),
            Combinator::Descendant => (0..ancestors.len())
                .rev()
                .any(|k| compound.matches(&ancestors[k]) && rest_matches(k)),
        }
    }
}

/// Parse one compound at the start of `input`, returning it and the bytes consumed.
fn parse_compound(input: &str) -> Option<(Compound, usize)> {
    let mut compound = Compound::default();
    let mut pos = 0;
    let bytes = input.as_bytes();

    if bytes.first() == Some(&b'*') {
        pos = 1;
    } else {
        let len = ident_len(input);
        if len > 0 {
            compound.tag = Some(input[..len].to_ascii_lowercase());
            pos = len;
        }
    }

    while pos < bytes.len() {
        match bytes[pos] {
            b'.' => {
                let len = ident_len(&input[pos + 1..]);
                if len == 0 {
                    return None;
                }
                compound.classes.push(input[pos + 1..pos + 1 + len].to_owned());
                pos += 1 + len;
            }
            b'#' => {
                let len = ident_len(&input[pos + 1..]);
                if len == 0 || compound.id.is_some() {
                    return None;
                }
                compound.id = Some(input[pos + 1..pos + 1 + len].to_owned());
                pos += 1 + len;
            }
            b if b.is_ascii_whitespace() || b == b'>' => break,
            // Pseudo-classes, attribute selectors, sibling combinators, escapes
            _ => return None,
        }
    }

    (pos > 0).then_some((compound, pos))
}

/// Length of the identifier at the start of `s`.
fn ident_len(s: &str) -> usize {
    s.char_indices()
        .find(|(_, c)| !(c.is_alphanumeric() || *c == '-' || *c == '_' || !c.is_ascii()))
        .map_or(s.len(), |(i, _)| i)
}
