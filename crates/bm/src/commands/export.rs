//! `bm export` command implementation.

use std::io::Write;
use std::path::PathBuf;

use bm_blocks::{Document, RenderContext, RenderMode, render};
use bm_config::{CliSettings, Config};
use bm_inline::{InlinedEmail, SizeBudget, inline_with_budget};
use clap::Args;

use crate::error::CliError;
use crate::output::Output;

/// Arguments for the export command.
#[derive(Args)]
pub(crate) struct ExportArgs {
    /// Document JSON file.
    document: PathBuf,

    /// Recipient export token embedded in response links.
    #[arg(short, long)]
    token: Option<String>,

    /// Render mode: email, preview or editor.
    #[arg(short, long, default_value = "email")]
    mode: RenderMode,

    /// Write HTML to this file instead of stdout.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Path to configuration file (default: auto-discover blockmail.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Public base URL for response links (overrides config).
    #[arg(long, env = "BM_API_BASE")]
    api_base: Option<String>,

    /// Enable verbose output.
    #[arg(short, long)]
    pub verbose: bool,
}

impl ExportArgs {
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        let cli_settings = CliSettings {
            api_base: self.api_base,
            ..CliSettings::default()
        };
        let config = Config::load(self.config.as_deref(), Some(&cli_settings))?;

        let json = std::fs::read_to_string(&self.document)?;
        let document = Document::from_json(&json)?;

        if self.mode == RenderMode::Email && self.token.is_none() {
            output.warning("No --token given, interactive blocks render without response links");
        }

        let email = export_document(&document, self.mode, self.token, &config);

        if let Some(path) = &self.output {
            std::fs::write(path, &email.html)?;
            output.info(&format!("Wrote {}", path.display()));
        } else {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(email.html.as_bytes())?;
            stdout.flush()?;
        }

        if email.clipped {
            output.warning(&format!(
                "Size: {} KB (over {} KB, Gmail will clip this message)",
                email.size_kb, config.budget.clip_threshold_kb
            ));
        } else {
            output.success(&format!("Size: {} KB", email.size_kb));
        }

        Ok(())
    }
}

/// Render `document` and, for email layouts, inline its CSS.
///
/// Editor output keeps its stylesheet; it is only measured.
fn export_document(
    document: &Document,
    mode: RenderMode,
    token: Option<String>,
    config: &Config,
) -> InlinedEmail {
    let mut context = RenderContext::new(config.links.api_base.clone());
    if let Some(token) = token {
        context = context.with_export_token(token);
    }

    let html = render(document, mode, &context);
    let budget = SizeBudget::new(config.budget.clip_threshold_kb);
    if mode.is_email_layout() {
        inline_with_budget(&html, budget)
    } else {
        budget.evaluate(html)
    }
}

#[cfg(test)]
mod tests {
    use bm_blocks::{Block, BlockType};
    use pretty_assertions::assert_eq;

    use super::*;

    fn document() -> Document {
        Document {
            id: "e1".to_owned(),
            subject: "Launch".to_owned(),
            preheader: None,
            blocks: vec![
                Block::new("h", BlockType::Heading).with_prop("text", "Hello"),
                Block::new("fb", BlockType::FeedbackPrompt),
            ],
        }
    }

    #[test]
    fn test_export_email_inlines_and_links() {
        let mut config = Config::default();
        config.links.api_base = "https://api.example.com".to_owned();

        let email = export_document(
            &document(),
            RenderMode::Email,
            Some("tok".to_owned()),
            &config,
        );

        assert!(email.html.contains(r#"href="https://api.example.com/r/tok/fb/love""#));
        assert!(email.html.contains("style=\""));
        assert!(!email.clipped);
    }

    #[test]
    fn test_export_preview_has_no_links() {
        let email = export_document(
            &document(),
            RenderMode::Preview,
            Some("tok".to_owned()),
            &Config::default(),
        );

        assert!(!email.html.contains("/r/tok/"));
    }

    #[test]
    fn test_export_editor_is_measured_only() {
        let email = export_document(&document(), RenderMode::Editor, None, &Config::default());

        assert!(email.html.contains("<style"));
        assert_eq!(email.size_kb, bm_inline::size_kb(email.html.len()));
    }

    #[test]
    fn test_export_respects_clip_threshold() {
        let mut config = Config::default();
        config.budget.clip_threshold_kb = 1;
        let mut doc = document();
        doc.blocks.push(Block::new("t", BlockType::Text).with_prop("text", "x".repeat(4096)));

        let email = export_document(&doc, RenderMode::Email, None, &config);

        assert!(email.size_kb > 1);
        assert!(email.clipped);
    }

    #[test]
    fn test_document_from_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("email.json");
        std::fs::write(&path, r#"{"id":"e1","blocks":[{"id":"d","type":"divider"}]}"#).unwrap();

        let document = Document::from_json(&std::fs::read_to_string(&path).unwrap()).unwrap();

        assert_eq!(document.blocks.len(), 1);
        assert_eq!(document.blocks[0].block_type, BlockType::Divider);
    }
}
