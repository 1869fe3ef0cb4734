use anyhow::Result;
use image::{Rgba, RgbaImage};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::core::error::{AppError, AppResult};
use crate::utils::bitmap::{default_logo, load_logo, SynthesisOptions};
use crate::utils::qrcode::{BarcodeFormat, EncodeHints, ErrorCorrection};

pub const CONFIG_FILE: &str = "qrcard.toml";
pub const EXAMPLE_CONFIG_FILE: &str = "qrcard.example.toml";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub card: CardConfig,
    #[serde(default)]
    pub qr: QrConfig,
    #[serde(default)]
    pub logo: LogoConfig,
    #[serde(default)]
    pub scan: ScanConfig,
    #[serde(default)]
    pub ui: UiConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CardConfig {
    #[serde(default = "default_card_text")]
    pub text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QrConfig {
    #[serde(default = "default_size")]
    pub size: u32,
    #[serde(default = "default_character_set")]
    pub character_set: String,
    #[serde(default)]
    pub error_correction: ErrorCorrection,
    #[serde(default = "default_margin")]
    pub margin: u32,
    #[serde(default = "default_dark_color")]
    pub dark_color: String,
    #[serde(default = "default_light_color")]
    pub light_color: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogoConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    pub path: Option<PathBuf>,
    #[serde(default = "default_logo_divisor")]
    pub divisor: u32,
    #[serde(default = "default_false")]
    pub smooth: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanConfig {
    #[serde(default = "default_formats")]
    pub formats: Vec<BarcodeFormat>,
    #[serde(default = "default_false")]
    pub beep: bool,
    #[serde(default = "default_true")]
    pub orientation_locked: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    #[serde(default = "default_output")]
    pub output: PathBuf,
    #[serde(default = "default_false")]
    pub open_image: bool,
    #[serde(default = "default_true")]
    pub terminal_preview: bool,
}

// Default value functions
fn default_card_text() -> String { "John Doe\nCEO\nAcme Corporation\njohndoe@example.com".to_string() }
fn default_size() -> u32 { 500 }
fn default_character_set() -> String { "UTF-8".to_string() }
fn default_margin() -> u32 { crate::utils::qrcode::DEFAULT_MARGIN }
fn default_dark_color() -> String { "#000000".to_string() }
fn default_light_color() -> String { "#FFFFFF".to_string() }
fn default_logo_divisor() -> u32 { 4 }
fn default_formats() -> Vec<BarcodeFormat> { vec![BarcodeFormat::QrCode] }
fn default_output() -> PathBuf { PathBuf::from("card-qr.png") }
fn default_true() -> bool { true }
fn default_false() -> bool { false }

impl Default for CardConfig {
    fn default() -> Self {
        Self { text: default_card_text() }
    }
}

impl Default for QrConfig {
    fn default() -> Self {
        Self {
            size: default_size(),
            character_set: default_character_set(),
            error_correction: ErrorCorrection::default(),
            margin: default_margin(),
            dark_color: default_dark_color(),
            light_color: default_light_color(),
        }
    }
}

impl Default for LogoConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            path: None,
            divisor: default_logo_divisor(),
            smooth: default_false(),
        }
    }
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            formats: default_formats(),
            beep: default_false(),
            orientation_locked: default_true(),
        }
    }
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            output: default_output(),
            open_image: default_false(),
            terminal_preview: default_true(),
        }
    }
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        Self::load_from(Path::new(CONFIG_FILE))
    }

    /// Layers `path` (optional), `QRCARD__<SECTION>__<KEY>` variables and the
    /// `QRCARD_TEXT`-style shortcuts, in that order.
    pub fn load_from(path: &Path) -> Result<Self> {
        // The double underscore after the prefix keeps the shortcuts below out
        // of this source; `QRCARD_LOGO` would otherwise replace the whole table.
        let mut builder = config::Config::builder()
            .add_source(config::File::from(path).required(false))
            .add_source(
                config::Environment::with_prefix("QRCARD")
                    .prefix_separator("__")
                    .separator("__"),
            );

        // Override with individual environment variables
        if let Ok(text) = std::env::var("QRCARD_TEXT") {
            builder = builder.set_override("card.text", text)?;
        }
        if let Ok(size) = std::env::var("QRCARD_SIZE") {
            builder = builder.set_override("qr.size", size)?;
        }
        if let Ok(output) = std::env::var("QRCARD_OUTPUT") {
            builder = builder.set_override("ui.output", output)?;
        }
        if let Ok(logo) = std::env::var("QRCARD_LOGO") {
            builder = builder.set_override("logo.path", logo)?;
        }

        let settings = builder.build()?;
        let config: AppConfig = settings.try_deserialize()?;
        Ok(config)
    }

    pub fn save_example() -> Result<()> {
        Self::save_example_to(Path::new(EXAMPLE_CONFIG_FILE))
    }

    pub fn save_example_to(path: &Path) -> Result<()> {
        let example_config = AppConfig::default();
        let toml_string = toml::to_string_pretty(&example_config)?;
        std::fs::write(path, toml_string)?;
        Ok(())
    }

    pub fn from_toml(toml_content: &str) -> Result<Self> {
        let config: AppConfig = toml::from_str(toml_content)?;
        Ok(config)
    }

    pub fn synthesis_options(&self) -> AppResult<SynthesisOptions> {
        Ok(SynthesisOptions {
            size: self.qr.size,
            hints: EncodeHints {
                character_set: Some(self.qr.character_set.clone()),
                error_correction: Some(self.qr.error_correction),
                margin: Some(self.qr.margin),
            },
            foreground: parse_color(&self.qr.dark_color)?,
            background: parse_color(&self.qr.light_color)?,
            logo_divisor: self.logo.divisor,
            smooth_logo: self.logo.smooth,
        })
    }

    /// The logo to stamp on generated codes, if logos are enabled.
    pub fn logo_image(&self) -> AppResult<Option<RgbaImage>> {
        if !self.logo.enabled {
            return Ok(None);
        }
        match &self.logo.path {
            Some(path) => load_logo(path).map(Some),
            None => Ok(Some(default_logo())),
        }
    }
}

/// Parses `#RRGGBB` or `#RRGGBBAA`.
pub fn parse_color(value: &str) -> AppResult<Rgba<u8>> {
    let invalid = || AppError::Config(format!("invalid color {value:?}, expected #RRGGBB or #RRGGBBAA"));

    let hex = value.strip_prefix('#').unwrap_or(value);
    if !matches!(hex.len(), 6 | 8) || !hex.is_ascii() {
        return Err(invalid());
    }

    let mut channels = [0xFF; 4];
    for (i, channel) in channels.iter_mut().enumerate().take(hex.len() / 2) {
        *channel = u8::from_str_radix(&hex[i * 2..i * 2 + 2], 16).map_err(|_| invalid())?;
    }
    Ok(Rgba(channels))
}
