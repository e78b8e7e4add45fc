/// Error categories for terminal text synthesis.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// Font discovery or glyph rasterization errors.
    #[error("Font error: {0}")]
    Font(String),
}

impl Error {
    pub(crate) fn no_fonts_available() -> Self {
        Self::Font("font database contains no usable faces".to_string())
    }
}
