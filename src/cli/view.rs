use clap::ValueEnum;
use image::RgbaImage;
use std::path::PathBuf;
use tracing::{error, info, warn};

use crate::core::app::Presenter;
use crate::core::config::AppConfig;
use crate::core::error::AppResult;
use crate::core::models::CardEntry;
use crate::utils::qrcode::{terminal_preview, EncodeHints};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

/// Renders every card as a row. The list is always drawn in full.
pub fn render_rows(entries: &[CardEntry], format: OutputFormat) -> serde_json::Result<String> {
    match format {
        OutputFormat::Json => {
            let mut json = serde_json::to_string_pretty(entries)?;
            json.push('\n');
            Ok(json)
        }
        OutputFormat::Text => {
            if entries.is_empty() {
                return Ok("No cards yet.\n".to_string());
            }
            let mut output = format!("Cards ({}):\n", entries.len());
            for (i, entry) in entries.iter().enumerate() {
                let marker = format!("{:>3}. ", i + 1);
                let indent = " ".repeat(marker.len());
                for (n, line) in entry.text.lines().enumerate() {
                    output.push_str(if n == 0 { &marker } else { &indent });
                    output.push_str(line);
                    output.push('\n');
                }
                if entry.text.is_empty() {
                    output.push_str(&marker);
                    output.push('\n');
                }
            }
            Ok(output)
        }
    }
}

pub fn print_rows(entries: &[CardEntry], format: OutputFormat) {
    match render_rows(entries, format) {
        Ok(rows) => print!("{}", rows),
        Err(e) => error!("Failed to render card list: {}", e),
    }
}

/// Writes generated images to disk and prints notices to the terminal.
pub struct TerminalPresenter {
    output: PathBuf,
    open_image: bool,
    preview_hints: Option<EncodeHints>,
    format: OutputFormat,
}

impl TerminalPresenter {
    pub fn new(config: &AppConfig, format: OutputFormat) -> Self {
        let preview_hints = config.ui.terminal_preview.then(|| EncodeHints {
            character_set: Some(config.qr.character_set.clone()),
            error_correction: Some(config.qr.error_correction),
            margin: None,
        });

        Self {
            output: config.ui.output.clone(),
            open_image: config.ui.open_image,
            preview_hints,
            format,
        }
    }

    fn say(&self, message: &str) {
        // Keep stdout parseable when printing JSON.
        match self.format {
            OutputFormat::Text => println!("{}", message),
            OutputFormat::Json => eprintln!("{}", message),
        }
    }
}

impl Presenter for TerminalPresenter {
    fn show_image(&mut self, image: &RgbaImage, text: &str) -> AppResult<()> {
        image.save(&self.output)?;
        info!("Saved QR code to {:?}", self.output);
        self.say(&format!("QR code written to {}", self.output.display()));

        if let Some(hints) = &self.preview_hints {
            match terminal_preview(text, hints) {
                Ok(preview) => self.say(&preview),
                Err(e) => warn!("Failed to render terminal preview: {}", e),
            }
        }

        if self.open_image {
            if let Err(e) = open::that(&self.output) {
                error!("Failed to open image: {}", e);
            }
        }

        Ok(())
    }

    fn notice(&mut self, message: &str) {
        self.say(&format!("» {}", message));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn test_render_rows_empty() {
        assert_eq!(render_rows(&[], OutputFormat::Text).unwrap(), "No cards yet.\n");
        assert_eq!(render_rows(&[], OutputFormat::Json).unwrap(), "[]\n");
    }

    #[test]
    fn test_render_rows_text_indents_continuation_lines() {
        let entries = vec![
            CardEntry::generated("John Doe\nCEO"),
            CardEntry::scanned("Jane Roe"),
        ];

        let rows = render_rows(&entries, OutputFormat::Text).unwrap();

        assert_eq!(
            rows,
            "Cards (2):\n  1. John Doe\n     CEO\n  2. Jane Roe\n"
        );
    }

    #[test]
    fn test_render_rows_json() {
        let entries = vec![CardEntry::scanned("Jane Roe\nCTO")];

        let rows = render_rows(&entries, OutputFormat::Json).unwrap();
        let parsed: Vec<CardEntry> = serde_json::from_str(&rows).unwrap();

        assert_eq!(parsed, entries);
    }

    #[test]
    fn test_presenter_writes_png() {
        let temp_dir = TempDir::new().unwrap();
        let mut config = AppConfig::default();
        config.ui.output = temp_dir.path().join("card.png");
        config.ui.terminal_preview = false;

        let mut presenter = TerminalPresenter::new(&config, OutputFormat::Text);
        let image = RgbaImage::from_pixel(8, 8, image::Rgba([0, 0, 0, 255]));
        presenter.show_image(&image, "unused").unwrap();

        let written = image::open(&config.ui.output).unwrap();
        assert_eq!((written.width(), written.height()), (8, 8));
    }

    #[test]
    fn test_presenter_reports_unwritable_output() {
        let mut config = AppConfig::default();
        config.ui.output = PathBuf::from("/definitely/not/here/card.png");
        config.ui.terminal_preview = false;

        let mut presenter = TerminalPresenter::new(&config, OutputFormat::Text);
        let image = RgbaImage::new(4, 4);
        assert!(presenter.show_image(&image, "unused").is_err());
    }
}
