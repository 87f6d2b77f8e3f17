//! Scannable label artifacts: symbol encoding and image composition.

/// Label image layout and artifact lifecycle.
pub mod compositor;
/// Machine-readable symbol encoders.
pub mod encode;

/// Failure modes while producing a label artifact.
///
/// Nothing here is fatal; a failed composition leaves no partial artifact
/// behind and is surfaced to the caller as a notification.
#[derive(Debug)]
pub enum CompositionError {
    /// The id could not be encoded as a scannable symbol.
    Encode(String),
    /// Drawing or PNG encoding failed.
    Render(image::ImageError),
    /// Artifact directory or file I/O failed.
    Io(std::io::Error),
    /// No usable label font was found.
    FontUnavailable,
}

impl From<std::io::Error> for CompositionError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<image::ImageError> for CompositionError {
    fn from(value: image::ImageError) -> Self {
        Self::Render(value)
    }
}
