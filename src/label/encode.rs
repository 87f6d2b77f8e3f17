use image::{GrayImage, Luma};
use qrcode::QrCode;

use crate::types::RecordId;

use super::CompositionError;

/// Renders a record id as a scannable symbol image.
///
/// The symbol choice is cosmetic; anything a handheld scanner reads back as
/// the decimal id qualifies. The seam exists so the compositor can be driven
/// by a stub encoder in tests.
pub trait CodeEncoder: Send + Sync {
    /// Produces the symbol as an 8-bit grayscale image.
    fn encode(&self, id: RecordId) -> Result<GrayImage, CompositionError>;
}

/// QR encoder drawing each module as a fixed-size pixel square.
#[derive(Debug, Clone)]
pub struct QrEncoder {
    module_px: u32,
}

impl QrEncoder {
    /// Encoder rendering each QR module as a `module_px` square.
    pub fn new(module_px: u32) -> Self {
        Self {
            module_px: module_px.max(1),
        }
    }
}

impl Default for QrEncoder {
    fn default() -> Self {
        Self::new(4)
    }
}

impl CodeEncoder for QrEncoder {
    fn encode(&self, id: RecordId) -> Result<GrayImage, CompositionError> {
        let code = QrCode::new(id.to_string().as_bytes())
            .map_err(|err| CompositionError::Encode(err.to_string()))?;

        Ok(code
            .render::<Luma<u8>>()
            .module_dimensions(self.module_px, self.module_px)
            .build())
    }
}
