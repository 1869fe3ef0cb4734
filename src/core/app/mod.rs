use image::RgbaImage;
use tracing::{error, info, warn};

use crate::core::cards::CardList;
use crate::core::config::AppConfig;
use crate::core::error::AppResult;
use crate::core::models::CardEntry;
use crate::core::scan::{ScanOutcome, ScanRequest, Scanner};
use crate::utils::bitmap::{synthesize, SynthesisOptions};

pub const SCAN_CANCELLED_NOTICE: &str = "Scan cancelled";
pub const SCAN_UNKNOWN_NOTICE: &str = "Scan result unavailable";

/// Where the shell shows its results to the user.
pub trait Presenter {
    fn show_image(&mut self, image: &RgbaImage, text: &str) -> AppResult<()>;

    /// Short-lived message, the terminal equivalent of a toast.
    fn notice(&mut self, message: &str);
}

pub struct App {
    card_text: String,
    options: SynthesisOptions,
    logo: Option<RgbaImage>,
    scan_request: ScanRequest,
    cards: CardList,
    presenter: Box<dyn Presenter>,
}

impl App {
    pub fn new(config: &AppConfig, presenter: Box<dyn Presenter>) -> AppResult<Self> {
        let options = config.synthesis_options()?;
        let logo = config.logo_image()?;

        Ok(Self::with_logo(
            config.card.text.clone(),
            options,
            logo,
            ScanRequest::from(&config.scan),
            presenter,
        ))
    }

    pub fn with_logo(
        card_text: String,
        options: SynthesisOptions,
        logo: Option<RgbaImage>,
        scan_request: ScanRequest,
        presenter: Box<dyn Presenter>,
    ) -> Self {
        Self {
            card_text,
            options,
            logo,
            scan_request,
            cards: CardList::new(),
            presenter,
        }
    }

    pub fn card_text(&self) -> &str {
        &self.card_text
    }

    pub fn cards(&self) -> &CardList {
        &self.cards
    }

    pub fn cards_mut(&mut self) -> &mut CardList {
        &mut self.cards
    }

    /// Builds the QR image for the card text, shows it and records the card.
    ///
    /// Nothing is shown or recorded when synthesis fails.
    pub fn generate(&mut self) -> AppResult<RgbaImage> {
        let image = match synthesize(&self.card_text, &self.options, self.logo.as_ref()) {
            Ok(image) => image,
            Err(e) => {
                error!("Failed to generate QR code: {}", e);
                return Err(e);
            }
        };

        self.presenter.show_image(&image, &self.card_text)?;
        let index = self.cards.append(CardEntry::generated(self.card_text.clone()));
        info!(
            index,
            width = image.width(),
            height = image.height(),
            "Generated card QR code"
        );

        Ok(image)
    }

    /// Runs one scan through `scanner` and records the card if one was decoded.
    pub async fn scan(&mut self, scanner: &mut dyn Scanner) -> ScanOutcome {
        let outcome = scanner.scan(&self.scan_request).await;

        match &outcome {
            ScanOutcome::Decoded(text) => {
                self.presenter.notice(text);
                let index = self.cards.append(CardEntry::scanned(text.clone()));
                info!(index, "Scanned card");
            }
            ScanOutcome::Cancelled => {
                info!("Scan cancelled");
                self.presenter.notice(SCAN_CANCELLED_NOTICE);
            }
            ScanOutcome::Unknown => {
                warn!("Scan finished without a usable result");
                self.presenter.notice(SCAN_UNKNOWN_NOTICE);
            }
        }

        outcome
    }
}
