use qrcode::bits::Bits;
use qrcode::render::unicode;
use qrcode::types::{QrError, QrResult};
use qrcode::{Color, EcLevel, QrCode, Version};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::error::{AppError, AppResult};

/// Quiet-zone width in modules used when no margin hint is given.
pub const DEFAULT_MARGIN: u32 = 4;

/// Largest matrix edge `encode` will produce, in cells.
pub const MAX_DIMENSION: u32 = 16_384;

const UTF8_ECI: u32 = 26;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BarcodeFormat {
    QrCode,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorCorrection {
    #[default]
    L,
    M,
    Q,
    H,
}

impl From<ErrorCorrection> for EcLevel {
    fn from(level: ErrorCorrection) -> Self {
        match level {
            ErrorCorrection::L => EcLevel::L,
            ErrorCorrection::M => EcLevel::M,
            ErrorCorrection::Q => EcLevel::Q,
            ErrorCorrection::H => EcLevel::H,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EncodeHints {
    pub character_set: Option<String>,
    pub error_correction: Option<ErrorCorrection>,
    pub margin: Option<u32>,
}

impl EncodeHints {
    pub fn utf8() -> Self {
        Self {
            character_set: Some("UTF-8".to_string()),
            ..Self::default()
        }
    }
}

/// Grid of QR modules, `true` for dark. Cells are addressed `(x, y)` from the top-left.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleMatrix {
    width: u32,
    height: u32,
    bits: Vec<bool>,
}

impl ModuleMatrix {
    pub fn from_fn(width: u32, height: u32, f: impl Fn(u32, u32) -> bool) -> Self {
        let mut bits = Vec::with_capacity(width as usize * height as usize);
        for y in 0..height {
            for x in 0..width {
                bits.push(f(x, y));
            }
        }
        Self { width, height, bits }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// `None` when `(x, y)` is outside the matrix.
    pub fn get(&self, x: u32, y: u32) -> Option<bool> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.bits.get(y as usize * self.width as usize + x as usize).copied()
    }

    pub fn is_dark(&self, x: u32, y: u32) -> bool {
        self.get(x, y) == Some(true)
    }

    pub fn dark_count(&self) -> usize {
        self.bits.iter().filter(|dark| **dark).count()
    }
}

/// Converts `text` into the byte payload for the requested character set.
fn payload_bytes(text: &str, character_set: Option<&str>) -> AppResult<Vec<u8>> {
    let charset = character_set.unwrap_or("ISO-8859-1").to_ascii_uppercase();
    match charset.as_str() {
        "UTF-8" | "UTF8" => Ok(text.as_bytes().to_vec()),
        "ISO-8859-1" | "ISO8859-1" | "LATIN1" | "LATIN-1" => text
            .chars()
            .map(|c| {
                u8::try_from(u32::from(c)).map_err(|_| {
                    AppError::Encoding(format!("character {c:?} is not representable in ISO-8859-1"))
                })
            })
            .collect(),
        other => Err(AppError::Encoding(format!("unsupported character set: {other}"))),
    }
}

fn is_utf8(character_set: Option<&str>) -> bool {
    character_set.is_some_and(|c| matches!(c.to_ascii_uppercase().as_str(), "UTF-8" | "UTF8"))
}

fn push_utf8_segment(bits: &mut Bits, data: &[u8], level: EcLevel) -> QrResult<()> {
    bits.push_eci_designator(UTF8_ECI)?;
    bits.push_byte_data(data)?;
    bits.push_terminator(level)
}

/// Byte-mode symbol prefixed with the UTF-8 ECI designator, in the smallest version that fits.
fn build_utf8_eci_code(data: &[u8], level: EcLevel) -> AppResult<QrCode> {
    for version in 1..=40 {
        let mut bits = Bits::new(Version::Normal(version));
        match push_utf8_segment(&mut bits, data, level) {
            Ok(()) => return Ok(QrCode::with_bits(bits, level)?),
            Err(QrError::DataTooLong) => continue,
            Err(e) => return Err(e.into()),
        }
    }
    Err(QrError::DataTooLong.into())
}

fn build_code(text: &str, hints: &EncodeHints) -> AppResult<QrCode> {
    let data = payload_bytes(text, hints.character_set.as_deref())?;
    let level: EcLevel = hints.error_correction.unwrap_or_default().into();
    // Pure ASCII reads the same in every charset, so only tag real UTF-8 payloads.
    if is_utf8(hints.character_set.as_deref()) && !text.is_ascii() {
        return build_utf8_eci_code(&data, level);
    }
    Ok(QrCode::with_error_correction_level(data, level)?)
}

/// Encodes `text` into a module matrix sized to at least `desired_width × desired_height`.
///
/// The symbol plus its quiet zone is scaled by the largest whole multiple that fits the
/// desired size and centered; when the desired size is smaller than the symbol the
/// matrix falls back to the symbol size including the quiet zone.
pub fn encode(
    text: &str,
    format: BarcodeFormat,
    desired_width: u32,
    desired_height: u32,
    hints: &EncodeHints,
) -> AppResult<ModuleMatrix> {
    let BarcodeFormat::QrCode = format;
    let code = build_code(text, hints)?;

    let modules = code.width() as u32;
    let margin = hints.margin.unwrap_or(DEFAULT_MARGIN);
    let padded = margin
        .checked_mul(2)
        .and_then(|quiet| quiet.checked_add(modules))
        .filter(|padded| *padded <= MAX_DIMENSION)
        .ok_or_else(|| AppError::Encoding(format!("quiet zone of {margin} modules is too large")))?;

    let out_width = desired_width.max(padded);
    let out_height = desired_height.max(padded);
    if out_width > MAX_DIMENSION || out_height > MAX_DIMENSION {
        return Err(AppError::Encoding(format!(
            "{out_width}x{out_height} exceeds the {MAX_DIMENSION} cell limit"
        )));
    }
    let multiple = (out_width / padded).min(out_height / padded);
    let left = (out_width - modules * multiple) / 2;
    let top = (out_height - modules * multiple) / 2;

    debug!(
        modules,
        multiple,
        width = out_width,
        height = out_height,
        "Encoded QR symbol"
    );

    let colors = code.to_colors();
    let matrix = ModuleMatrix::from_fn(out_width, out_height, |x, y| {
        if x < left || y < top {
            return false;
        }
        let (mx, my) = ((x - left) / multiple, (y - top) / multiple);
        if mx >= modules || my >= modules {
            return false;
        }
        colors[(my * modules + mx) as usize] == Color::Dark
    });

    Ok(matrix)
}

/// Renders the bare symbol for `text` with Unicode half blocks, suitable for a terminal.
pub fn terminal_preview(text: &str, hints: &EncodeHints) -> AppResult<String> {
    let code = build_code(text, hints)?;
    let qr = code
        .render::<unicode::Dense1x2>()
        .dark_color(unicode::Dense1x2::Light)
        .light_color(unicode::Dense1x2::Dark)
        .build();

    let mut output = String::new();
    output.push('\n');
    output.push_str(&qr);
    output.push('\n');

    Ok(output)
}
