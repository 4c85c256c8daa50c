//! CSS inliner and size budget check for email export.
//!
//! Email clients strip or ignore `<style>` blocks and class-based CSS, so the
//! export pipeline folds every stylesheet rule into the `style` attribute of
//! the elements it matches, then measures the result against the provider's
//! clipping threshold.
//!
//! # Cascade
//!
//! For each element and property, the winning declaration is chosen in this
//! order (lowest first):
//!
//! 1. stylesheet declarations, by specificity then source order
//! 2. existing inline declarations
//! 3. stylesheet `!important` declarations (written back with `!important`)
//! 4. existing inline `!important` declarations
//!
//! Rules that cannot be expressed inline (`@media`, pseudo-classes, attribute
//! selectors, sibling combinators) are kept in one retained `<style>` block.
//!
//! # Example
//!
//! ```
//! let out = bm_inline::inline(r#"<style>.x{color:red}</style><p class="x">Hi</p>"#);
//! assert_eq!(out.html, r#"<p class="x" style="color:red">Hi</p>"#);
//! assert!(!out.clipped);
//! ```

mod budget;
mod css;
mod html;
mod inliner;
mod selector;

pub use budget::{GMAIL_CLIP_THRESHOLD_KB, InlinedEmail, SizeBudget, size_kb};
pub use css::{Declaration, parse_declarations, serialize_declarations};
pub use inliner::{inline, inline_css, inline_with_budget};
pub use selector::{Selector, Specificity};
