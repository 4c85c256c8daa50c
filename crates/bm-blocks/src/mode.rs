//! Render mode and per-render context.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Output target of a render.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RenderMode {
    /// Live on-screen display inside the editor.
    #[default]
    Editor,
    /// Sendable email with response links.
    Email,
    /// Email layout without live interaction.
    Preview,
}

impl RenderMode {
    /// Whether the output targets an email client (email or preview).
    pub fn is_email_layout(self) -> bool {
        !matches!(self, Self::Editor)
    }
}

impl fmt::Display for RenderMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Editor => "editor",
            Self::Email => "email",
            Self::Preview => "preview",
        })
    }
}

impl FromStr for RenderMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "editor" => Ok(Self::Editor),
            "email" => Ok(Self::Email),
            "preview" => Ok(Self::Preview),
            other => Err(format!(
                "unknown render mode '{other}' (expected editor, email or preview)"
            )),
        }
    }
}

/// Values the renderer needs beyond the document itself.
#[derive(Debug, Clone, Default)]
pub struct RenderContext {
    /// Base URL of the response-recording API, e.g. `https://api.example.com`.
    pub api_base: String,
    /// Identifies the specific send/recipient. Required for response links.
    pub export_token: Option<String>,
}

impl RenderContext {
    /// Context without an export token.
    pub fn new(api_base: impl Into<String>) -> Self {
        Self {
            api_base: api_base.into(),
            export_token: None,
        }
    }

    /// Attach the export token used in response links.
    #[must_use]
    pub fn with_export_token(mut self, token: impl Into<String>) -> Self {
        let token = token.into();
        self.export_token = (!token.trim().is_empty()).then_some(token);
        self
    }
}

/// How interactive options render for a given mode and context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Interactivity<'a> {
    /// Clickable in-app elements that never navigate.
    Editor,
    /// One response link per option.
    Links { api_base: &'a str, token: &'a str },
    /// Non-interactive display.
    Static,
}

impl<'a> Interactivity<'a> {
    pub(crate) fn resolve(mode: RenderMode, context: &'a RenderContext) -> Self {
        match mode {
            RenderMode::Editor => Self::Editor,
            RenderMode::Preview => Self::Static,
            RenderMode::Email => match context.export_token.as_deref() {
                Some(token) => Self::Links {
                    api_base: &context.api_base,
                    token,
                },
                None => Self::Static,
            },
        }
    }

    pub(crate) fn is_editor(self) -> bool {
        matches!(self, Self::Editor)
    }
}
