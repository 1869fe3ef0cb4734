pub mod shell;
pub mod view;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tokio::io::BufReader;
use tracing::info;

use crate::core::app::App;
use crate::core::config::{AppConfig, EXAMPLE_CONFIG_FILE};
use crate::core::scan::{unescape, LineScanner};

use self::view::{print_rows, OutputFormat, TerminalPresenter};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Card text to encode (`\n` starts a new line)
    #[arg(short, long, global = true)]
    text: Option<String>,

    /// Where to write the generated PNG
    #[arg(short, long, global = true)]
    output: Option<PathBuf>,

    /// Target width and height of the QR image in pixels
    #[arg(short, long, global = true)]
    size: Option<u32>,

    /// Logo image to place in the middle of the QR code
    #[arg(short, long, global = true)]
    logo: Option<PathBuf>,

    /// Generate QR codes without a logo
    #[arg(long, global = true)]
    no_logo: bool,

    /// Disable the terminal QR preview
    #[arg(long, global = true)]
    no_preview: bool,

    /// Open generated images in the system viewer
    #[arg(long, global = true)]
    open: bool,

    /// How to print the card list
    #[arg(long, value_enum, default_value_t = OutputFormat::Text, global = true)]
    format: OutputFormat,

    /// Generate example configuration file
    #[arg(long)]
    generate_config: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Generate the card QR code once
    Generate,
    /// Read a single scan from standard input
    Scan,
    /// Interactive session (default)
    Shell,
}

impl Cli {
    pub async fn run(&self) -> Result<()> {
        // Generate config file if requested
        if self.generate_config {
            AppConfig::save_example()?;
            println!("Generated example configuration file: {}", EXAMPLE_CONFIG_FILE);
            return Ok(());
        }

        // Load configuration
        let mut config = AppConfig::load().unwrap_or_else(|e| {
            info!("Using default configuration ({})", e);
            AppConfig::default()
        });
        self.apply_overrides(&mut config);

        let presenter = TerminalPresenter::new(&config, self.format);
        let mut app = App::new(&config, Box::new(presenter))?;
        let mut stdin = BufReader::new(tokio::io::stdin());

        match self.command.unwrap_or(Command::Shell) {
            Command::Generate => {
                app.generate()?;
                print_rows(app.cards().entries(), self.format);
            }
            Command::Scan => {
                let mut scanner = LineScanner::new(&mut stdin);
                app.scan(&mut scanner).await;
                print_rows(app.cards().entries(), self.format);
            }
            Command::Shell => shell::run(&mut app, &mut stdin, self.format).await?,
        }

        Ok(())
    }

    fn apply_overrides(&self, config: &mut AppConfig) {
        if let Some(ref text) = self.text {
            config.card.text = unescape(text);
        }
        if let Some(size) = self.size {
            config.qr.size = size;
        }
        if let Some(ref output) = self.output {
            config.ui.output = output.clone();
        }
        if let Some(ref logo) = self.logo {
            config.logo.enabled = true;
            config.logo.path = Some(logo.clone());
        }
        if self.no_logo {
            config.logo.enabled = false;
        }
        if self.no_preview {
            config.ui.terminal_preview = false;
        }
        if self.open {
            config.ui.open_image = true;
        }
    }
}
