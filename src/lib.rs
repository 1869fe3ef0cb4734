//! qrcard - business-card QR codes with a logo overlay
//!
//! This crate generates a QR code for a fixed block of card text, stamps a
//! logo in its middle, and collects cards that were scanned from other
//! people's codes into an append-only list.

pub mod cli;
pub mod core;
pub mod utils;

// Re-export commonly used types for convenience
pub use crate::core::{
    app::{App, Presenter},
    cards::CardList,
    config::AppConfig,
    error::{AppError, AppResult},
    models::{CardEntry, CardSource},
    scan::{scan_channel, LineScanner, RawScanResult, ScanOutcome, ScanRequest, Scanner},
};

pub use crate::utils::{
    bitmap::{composite, render, scale, synthesize, SynthesisOptions},
    qrcode::{encode, BarcodeFormat, EncodeHints, ModuleMatrix},
};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
pub const DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");
