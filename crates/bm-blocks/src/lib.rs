//! Block model and dual-mode renderer for blockmail.
//!
//! A [`Document`] is an ordered list of typed [`Block`]s. The [`render`]
//! function turns it into table-based HTML suitable for email clients.
//!
//! # Render Modes
//!
//! - [`RenderMode::Editor`]: interactive options are non-navigating elements
//!   for in-app preview.
//! - [`RenderMode::Email`]: interactive options are hyperlinks built with
//!   [`interaction_url`], one per selectable value.
//! - [`RenderMode::Preview`]: same layout as email, options are static.
//!
//! # Example
//!
//! ```
//! use bm_blocks::{Document, RenderContext, RenderMode, render};
//!
//! let document = Document::from_json(
//!     r#"{"id":"e1","subject":"Hi","blocks":[{"id":"b1","type":"text","props":{"text":"Hello"}}]}"#,
//! )
//! .unwrap();
//! let context = RenderContext::new("https://api.example.com").with_export_token("tok");
//! let html = render(&document, RenderMode::Email, &context);
//! assert!(html.contains("Hello"));
//! ```

mod links;
mod mode;
mod model;
mod renderer;
mod style;
mod templates;

pub use links::interaction_url;
pub use mode::{RenderContext, RenderMode};
pub use model::{Block, BlockType, Document, FeedbackScale, Props};
pub use renderer::{render, render_block};
pub use style::BASE_STYLESHEET;
