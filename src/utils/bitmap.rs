use image::imageops::{self, FilterType};
use image::{Rgba, RgbaImage};
use std::path::Path;
use tracing::debug;

use crate::core::error::AppResult;
use crate::utils::qrcode::{encode, BarcodeFormat, EncodeHints, ModuleMatrix};

pub const BLACK: Rgba<u8> = Rgba([0x00, 0x00, 0x00, 0xFF]);
pub const WHITE: Rgba<u8> = Rgba([0xFF, 0xFF, 0xFF, 0xFF]);

/// Everything the generate pipeline needs besides the text and the logo.
#[derive(Debug, Clone)]
pub struct SynthesisOptions {
    pub size: u32,
    pub hints: EncodeHints,
    pub foreground: Rgba<u8>,
    pub background: Rgba<u8>,
    /// The logo is scaled to `1 / logo_divisor` of the QR image on each axis.
    pub logo_divisor: u32,
    pub smooth_logo: bool,
}

impl Default for SynthesisOptions {
    fn default() -> Self {
        Self {
            size: 500,
            hints: EncodeHints::utf8(),
            foreground: BLACK,
            background: WHITE,
            logo_divisor: 4,
            smooth_logo: false,
        }
    }
}

/// One pixel per module: dark modules take `foreground`, light ones `background`.
pub fn render(matrix: &ModuleMatrix, foreground: Rgba<u8>, background: Rgba<u8>) -> RgbaImage {
    RgbaImage::from_fn(matrix.width(), matrix.height(), |x, y| {
        if matrix.is_dark(x, y) {
            foreground
        } else {
            background
        }
    })
}

pub fn scale(image: &RgbaImage, width: u32, height: u32, smooth: bool) -> RgbaImage {
    if width == 0 || height == 0 || image.width() == 0 || image.height() == 0 {
        return RgbaImage::new(width, height);
    }
    let filter = if smooth {
        FilterType::Triangle
    } else {
        FilterType::Nearest
    };
    imageops::resize(image, width, height, filter)
}

/// Copies `background` and draws `overlay` centered on it.
///
/// Overlay pixels replace the background outright, alpha included. Parts of an
/// overlay larger than the background are clipped.
pub fn composite(background: &RgbaImage, overlay: &RgbaImage) -> RgbaImage {
    let mut combined = background.clone();
    let left = (i64::from(background.width()) - i64::from(overlay.width())).div_euclid(2);
    let top = (i64::from(background.height()) - i64::from(overlay.height())).div_euclid(2);
    imageops::replace(&mut combined, overlay, left, top);
    combined
}

/// Encodes `text`, renders it and stamps `logo` in the middle.
pub fn synthesize(
    text: &str,
    options: &SynthesisOptions,
    logo: Option<&RgbaImage>,
) -> AppResult<RgbaImage> {
    let matrix = encode(
        text,
        BarcodeFormat::QrCode,
        options.size,
        options.size,
        &options.hints,
    )?;
    let base = render(&matrix, options.foreground, options.background);

    let Some(logo) = logo else {
        return Ok(base);
    };

    let divisor = options.logo_divisor.max(1);
    let scaled = scale(
        logo,
        base.width() / divisor,
        base.height() / divisor,
        options.smooth_logo,
    );
    debug!(
        width = scaled.width(),
        height = scaled.height(),
        "Placing logo on QR image"
    );

    Ok(composite(&base, &scaled))
}

pub fn load_logo(path: &Path) -> AppResult<RgbaImage> {
    Ok(image::open(path)?.to_rgba8())
}

/// A small square badge used when no logo file is configured.
pub fn default_logo() -> RgbaImage {
    const SIZE: u32 = 64;
    const BORDER: u32 = 6;
    let accent = Rgba([0x3D, 0xDC, 0x84, 0xFF]);

    RgbaImage::from_fn(SIZE, SIZE, |x, y| {
        let edge = x < BORDER || y < BORDER || x >= SIZE - BORDER || y >= SIZE - BORDER;
        let core = (SIZE / 3..SIZE - SIZE / 3).contains(&x) && (SIZE / 3..SIZE - SIZE / 3).contains(&y);
        if edge {
            WHITE
        } else if core {
            BLACK
        } else {
            accent
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    const RED: Rgba<u8> = Rgba([0xFF, 0x00, 0x00, 0xFF]);

    fn solid(width: u32, height: u32, color: Rgba<u8>) -> RgbaImage {
        RgbaImage::from_pixel(width, height, color)
    }

    #[test]
    fn test_render_maps_modules_to_colors() {
        let matrix = ModuleMatrix::from_fn(4, 3, |x, y| (x + y) % 2 == 0);
        let image = render(&matrix, BLACK, WHITE);

        assert_eq!(image.dimensions(), (4, 3));
        for y in 0..3 {
            for x in 0..4 {
                let expected = if (x + y) % 2 == 0 { BLACK } else { WHITE };
                assert_eq!(*image.get_pixel(x, y), expected);
            }
        }
    }

    #[test]
    fn test_render_adds_no_border() {
        let matrix = ModuleMatrix::from_fn(1, 1, |_, _| true);
        let image = render(&matrix, RED, WHITE);
        assert_eq!(image.dimensions(), (1, 1));
        assert_eq!(*image.get_pixel(0, 0), RED);
    }

    #[test]
    fn test_scale_nearest_repeats_pixels() {
        let source = RgbaImage::from_fn(2, 2, |x, y| if x == y { BLACK } else { WHITE });
        let scaled = scale(&source, 4, 4, false);

        assert_eq!(scaled.dimensions(), (4, 4));
        assert_eq!(*scaled.get_pixel(0, 0), BLACK);
        assert_eq!(*scaled.get_pixel(1, 1), BLACK);
        assert_eq!(*scaled.get_pixel(3, 0), WHITE);
        assert_eq!(*scaled.get_pixel(3, 3), BLACK);
    }

    #[test]
    fn test_scale_smooth_keeps_dimensions() {
        let source = solid(10, 10, RED);
        let scaled = scale(&source, 3, 7, true);
        assert_eq!(scaled.dimensions(), (3, 7));
        assert_eq!(*scaled.get_pixel(1, 3), RED);
    }

    #[test]
    fn test_scale_to_zero_is_empty() {
        let scaled = scale(&solid(10, 10, RED), 0, 5, false);
        assert_eq!(scaled.dimensions(), (0, 5));
    }

    #[rstest]
    #[case(500, 125, 187)]
    #[case(100, 25, 37)]
    #[case(29, 7, 11)]
    #[case(10, 10, 0)]
    fn test_composite_centers_overlay(#[case] bg: u32, #[case] overlay: u32, #[case] offset: u32) {
        let combined = composite(&solid(bg, bg, WHITE), &solid(overlay, overlay, RED));

        assert_eq!(combined.dimensions(), (bg, bg));
        assert_eq!(*combined.get_pixel(offset, offset), RED);
        assert_eq!(*combined.get_pixel(offset + overlay - 1, offset + overlay - 1), RED);
        if offset > 0 {
            assert_eq!(*combined.get_pixel(offset - 1, offset - 1), WHITE);
            assert_eq!(*combined.get_pixel(offset + overlay, offset + overlay), WHITE);
        }
    }

    #[test]
    fn test_composite_replaces_without_blending() {
        let transparent = Rgba([0x10, 0x20, 0x30, 0x00]);
        let combined = composite(&solid(8, 8, WHITE), &solid(2, 2, transparent));
        assert_eq!(*combined.get_pixel(3, 3), transparent);
        assert_eq!(*combined.get_pixel(0, 0), WHITE);
    }

    #[test]
    fn test_composite_clips_large_overlay() {
        let combined = composite(&solid(10, 10, WHITE), &solid(30, 30, RED));
        assert_eq!(combined.dimensions(), (10, 10));
        assert!(combined.pixels().all(|p| *p == RED));
    }

    // Each overlay pixel records its own coordinates so the clip origin is visible.
    #[rstest]
    #[case(10, 13, -2)]
    #[case(10, 11, -1)]
    #[case(10, 15, -3)]
    #[case(10, 12, -1)]
    #[case(7, 10, -2)]
    fn test_composite_floors_negative_offset(
        #[case] bg: u32,
        #[case] overlay: u32,
        #[case] offset: i64,
    ) {
        let pattern = RgbaImage::from_fn(overlay, overlay, |x, y| Rgba([x as u8, y as u8, 0x7F, 0xFF]));
        let combined = composite(&solid(bg, bg, WHITE), &pattern);

        assert_eq!(combined.dimensions(), (bg, bg));
        let shift = (-offset) as u8;
        assert_eq!(*combined.get_pixel(0, 0), Rgba([shift, shift, 0x7F, 0xFF]));
        let last = bg - 1;
        assert_eq!(
            *combined.get_pixel(last, last),
            Rgba([last as u8 + shift, last as u8 + shift, 0x7F, 0xFF])
        );
    }

    #[test]
    fn test_composite_leaves_background_untouched() {
        let background = solid(6, 6, WHITE);
        let _ = composite(&background, &solid(2, 2, RED));
        assert!(background.pixels().all(|p| *p == WHITE));
    }

    #[test]
    fn test_synthesize_with_logo() {
        let options = SynthesisOptions::default();
        let logo = solid(40, 40, RED);
        let image = synthesize("John Doe\nCEO", &options, Some(&logo)).unwrap();

        assert_eq!(image.dimensions(), (500, 500));
        // 500 / 4 = 125, placed at floor((500 - 125) / 2).
        assert_eq!(*image.get_pixel(187, 187), RED);
        assert_eq!(*image.get_pixel(311, 311), RED);
        assert_eq!(*image.get_pixel(0, 0), WHITE);
    }

    #[test]
    fn test_synthesize_without_logo_uses_only_qr_colors() {
        let options = SynthesisOptions {
            foreground: RED,
            ..SynthesisOptions::default()
        };
        let image = synthesize("hello", &options, None).unwrap();
        assert!(image.pixels().all(|p| *p == RED || *p == WHITE));
        assert!(image.pixels().any(|p| *p == RED));
    }

    #[test]
    fn test_synthesize_rejects_oversized_text() {
        let text = "x".repeat(8000);
        let err = synthesize(&text, &SynthesisOptions::default(), Some(&default_logo())).unwrap_err();
        assert!(err.is_encoding());
    }

    #[test]
    fn test_default_logo_shape() {
        let logo = default_logo();
        assert_eq!(logo.dimensions(), (64, 64));
        assert_eq!(*logo.get_pixel(0, 0), WHITE);
        assert_eq!(*logo.get_pixel(32, 32), BLACK);
    }

    #[test]
    fn test_load_logo_round_trips_png() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let path = temp_dir.path().join("logo.png");
        default_logo().save(&path).unwrap();

        let loaded = load_logo(&path).unwrap();
        assert_eq!(loaded, default_logo());
    }

    #[test]
    fn test_load_logo_missing_file() {
        assert!(load_logo(Path::new("/definitely/not/here.png")).is_err());
    }
}
