//! Receiving scan results from an external scanning flow.
//!
//! A scan is a single request answered by exactly one [`ScanOutcome`]. Where the
//! answer comes from is up to the [`Scanner`] implementation: a one-shot channel
//! completed by some other component, or a line of input from a keyboard-wedge
//! scanner.

use async_trait::async_trait;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::sync::oneshot;
use tracing::{debug, warn};

use crate::core::config::ScanConfig;
use crate::utils::qrcode::BarcodeFormat;

/// Settings handed to the scanning flow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanRequest {
    pub formats: Vec<BarcodeFormat>,
    pub beep_enabled: bool,
    pub orientation_locked: bool,
}

impl Default for ScanRequest {
    fn default() -> Self {
        Self {
            formats: vec![BarcodeFormat::QrCode],
            beep_enabled: false,
            orientation_locked: true,
        }
    }
}

impl From<&ScanConfig> for ScanRequest {
    fn from(config: &ScanConfig) -> Self {
        Self {
            formats: config.formats.clone(),
            beep_enabled: config.beep,
            orientation_locked: config.orientation_locked,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanOutcome {
    Decoded(String),
    Cancelled,
    /// The flow answered with something that is neither a decode nor a cancellation.
    Unknown,
}

/// What an external scanning flow reports back. `contents` is `None` when the
/// user backed out.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawScanResult {
    pub contents: Option<String>,
}

impl RawScanResult {
    pub fn decoded(text: impl Into<String>) -> Self {
        Self {
            contents: Some(text.into()),
        }
    }

    pub fn cancelled() -> Self {
        Self { contents: None }
    }
}

impl ScanOutcome {
    pub fn from_raw(raw: Option<RawScanResult>) -> Self {
        match raw {
            Some(RawScanResult { contents: Some(text) }) => ScanOutcome::Decoded(text),
            Some(RawScanResult { contents: None }) => ScanOutcome::Cancelled,
            None => ScanOutcome::Unknown,
        }
    }
}

#[async_trait]
pub trait Scanner: Send {
    async fn scan(&mut self, request: &ScanRequest) -> ScanOutcome;
}

/// Creates a single-use scanner together with the handle that completes it.
pub fn scan_channel() -> (ScanCompleter, ChannelScanner) {
    let (sender, receiver) = oneshot::channel();
    (
        ScanCompleter { sender },
        ChannelScanner {
            receiver: Some(receiver),
        },
    )
}

#[derive(Debug)]
pub struct ScanCompleter {
    sender: oneshot::Sender<Option<RawScanResult>>,
}

impl ScanCompleter {
    pub fn complete(self, result: Option<RawScanResult>) {
        if self.sender.send(result).is_err() {
            debug!("Scan result delivered after the scanner was dropped");
        }
    }
}

#[derive(Debug)]
pub struct ChannelScanner {
    receiver: Option<oneshot::Receiver<Option<RawScanResult>>>,
}

#[async_trait]
impl Scanner for ChannelScanner {
    async fn scan(&mut self, request: &ScanRequest) -> ScanOutcome {
        let Some(receiver) = self.receiver.take() else {
            warn!("Scan channel was already used");
            return ScanOutcome::Unknown;
        };

        debug!(?request, "Waiting for external scan result");
        match receiver.await {
            Ok(raw) => ScanOutcome::from_raw(raw),
            Err(_) => {
                // Completer dropped: the flow was interrupted.
                debug!("Scan flow ended without a result");
                ScanOutcome::Cancelled
            }
        }
    }
}

/// Reads one line per scan, the way keyboard-wedge scanners type their payload.
///
/// An empty line or end of input cancels. A literal `\n` in the line becomes a
/// newline so multi-line cards survive the trip.
#[derive(Debug)]
pub struct LineScanner<R> {
    reader: R,
}

impl<R> LineScanner<R>
where
    R: AsyncBufRead + Unpin + Send,
{
    pub fn new(reader: R) -> Self {
        Self { reader }
    }

    pub fn into_inner(self) -> R {
        self.reader
    }
}

#[async_trait]
impl<R> Scanner for LineScanner<R>
where
    R: AsyncBufRead + Unpin + Send,
{
    async fn scan(&mut self, request: &ScanRequest) -> ScanOutcome {
        debug!(?request, "Reading scan from input");

        let mut line = String::new();
        match self.reader.read_line(&mut line).await {
            Ok(0) => ScanOutcome::Cancelled,
            Ok(_) => {
                let text = line.trim_end_matches(['\r', '\n']);
                if text.is_empty() {
                    ScanOutcome::Cancelled
                } else {
                    ScanOutcome::Decoded(unescape(text))
                }
            }
            Err(e) => {
                warn!(error = %e, "Failed to read scan input");
                ScanOutcome::Unknown
            }
        }
    }
}

/// Turns `\n` into a newline and `\\` into a backslash.
pub fn unescape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('\\') => out.push('\\'),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}
