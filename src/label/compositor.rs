use std::fs;
use std::path::{Path, PathBuf};

use ab_glyph::{FontArc, PxScale};
use image::{DynamicImage, GrayImage, ImageFormat, Rgb, RgbImage, imageops};
use imageproc::drawing::{draw_text_mut, text_size};
use tracing::debug;

use crate::types::RecordId;

use super::{
    CompositionError,
    encode::{CodeEncoder, QrEncoder},
};

const WHITE: Rgb<u8> = Rgb([255, 255, 255]);
const BLACK: Rgb<u8> = Rgb([0, 0, 0]);

/// Floor used when the style carries no candidate sizes.
const FALLBACK_FONT_PX: f32 = 10.0;

/// Font files probed in order; first readable wins.
const FONT_CANDIDATES: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/usr/share/fonts/liberation/LiberationSans-Regular.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
];

/// Layout knobs for composited labels.
#[derive(Debug, Clone)]
pub struct LabelStyle {
    /// Width in pixels reserved for the name text.
    pub text_width: u32,
    /// Horizontal gap between symbol and text.
    pub padding: u32,
    /// Candidate font sizes in pixels, largest first.
    ///
    /// The smallest entry doubles as the floor: a name that fits no
    /// candidate is drawn at the floor size and clips horizontally.
    pub font_sizes: Vec<f32>,
}

impl Default for LabelStyle {
    fn default() -> Self {
        Self {
            text_width: 240,
            padding: 8,
            font_sizes: vec![48.0, 40.0, 32.0, 24.0, 18.0, 14.0, 10.0],
        }
    }
}

/// Produces one immutable PNG artifact per record id.
///
/// Artifacts live at `<dir>/<id>.png`. Generation is idempotent: an existing
/// artifact is returned as-is, never re-rendered, so renaming a record does
/// not refresh its label unless the file is deleted first.
pub struct LabelCompositor {
    dir: PathBuf,
    encoder: Box<dyn CodeEncoder>,
    font: FontArc,
    style: LabelStyle,
}

impl LabelCompositor {
    /// Compositor writing artifacts under `dir` with explicit parts.
    pub fn new(
        dir: impl Into<PathBuf>,
        encoder: Box<dyn CodeEncoder>,
        font: FontArc,
        style: LabelStyle,
    ) -> Self {
        Self {
            dir: dir.into(),
            encoder,
            font,
            style,
        }
    }

    /// Compositor with the default QR encoder, a discovered system font, and
    /// default style.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, CompositionError> {
        let font = discover_font().ok_or(CompositionError::FontUnavailable)?;
        Ok(Self::new(
            dir,
            Box::new(QrEncoder::default()),
            font,
            LabelStyle::default(),
        ))
    }

    /// Deterministic artifact location for `id`.
    pub fn artifact_path(&self, id: RecordId) -> PathBuf {
        self.dir.join(format!("{id}.png"))
    }

    /// Returns the artifact path for `id`, generating the image first if it
    /// does not exist yet.
    ///
    /// The finished canvas is written to a sibling temp path and renamed into
    /// place, so no partial artifact ever sits at the final path.
    pub fn ensure_label(
        &self,
        id: RecordId,
        display_name: &str,
    ) -> Result<PathBuf, CompositionError> {
        let path = self.artifact_path(id);
        if path.exists() {
            return Ok(path);
        }

        fs::create_dir_all(&self.dir)?;

        let symbol = self.encoder.encode(id)?;
        let canvas = self.compose(&symbol, display_name);

        let tmp = path.with_extension("png.tmp");
        if let Err(err) = canvas.save_with_format(&tmp, ImageFormat::Png) {
            let _ = fs::remove_file(&tmp);
            return Err(CompositionError::Render(err));
        }
        fs::rename(&tmp, &path)?;

        debug!(id, path = %path.display(), "label artifact written");
        Ok(path)
    }

    /// Symbol flush left, name text right, opaque white background.
    fn compose(&self, symbol: &GrayImage, name: &str) -> RgbImage {
        let symbol_w = symbol.width();
        let height = symbol.height().max(1);
        let width = symbol_w + self.style.padding + self.style.text_width;

        // Opaque fill of the whole canvas, label region included, before any
        // text lands on it.
        let mut canvas = RgbImage::from_pixel(width, height, WHITE);
        imageops::overlay(
            &mut canvas,
            &DynamicImage::ImageLuma8(symbol.clone()).to_rgb8(),
            0,
            0,
        );

        let scale = self.fit_text(name);
        let (_, text_h) = text_size(scale, &self.font, name);
        let x = (symbol_w + self.style.padding) as i32;
        let y = ((i64::from(height) - text_h as i64).max(0) / 2) as i32;
        draw_text_mut(&mut canvas, BLACK, x, y, scale, &self.font, name);

        canvas
    }

    /// Largest candidate size whose measured width fits the text region,
    /// falling back to the smallest candidate when none fits.
    fn fit_text(&self, text: &str) -> PxScale {
        let floor = self
            .style
            .font_sizes
            .last()
            .copied()
            .unwrap_or(FALLBACK_FONT_PX);

        for size in &self.style.font_sizes {
            let scale = PxScale::from(*size);
            let (text_w, _) = text_size(scale, &self.font, text);
            if text_w as i64 <= i64::from(self.style.text_width) {
                return scale;
            }
        }

        PxScale::from(floor)
    }
}

/// Loads a label font from an explicit file path.
pub fn font_from_path(path: impl AsRef<Path>) -> Result<FontArc, CompositionError> {
    let bytes = fs::read(path)?;
    FontArc::try_from_vec(bytes).map_err(|_| CompositionError::FontUnavailable)
}

/// Probes a fixed list of common system font paths and returns the first
/// font that parses.
pub fn discover_font() -> Option<FontArc> {
    for candidate in FONT_CANDIDATES {
        if let Ok(bytes) = fs::read(candidate) {
            if let Ok(font) = FontArc::try_from_vec(bytes) {
                return Some(font);
            }
        }
    }
    None
}
