use qrcode::types::QrError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Encoding error: {0}")]
    Encoding(String),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<QrError> for AppError {
    fn from(err: QrError) -> Self {
        AppError::Encoding(err.to_string())
    }
}

impl AppError {
    /// True when the text could not be represented as a QR symbol.
    pub fn is_encoding(&self) -> bool {
        matches!(self, AppError::Encoding(_))
    }
}

pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_qr_error_maps_to_encoding() {
        let err: AppError = QrError::DataTooLong.into();
        assert!(err.is_encoding());
        assert!(err.to_string().starts_with("Encoding error"));
    }

    #[test]
    fn test_io_error_is_not_encoding() {
        let err: AppError = std::io::Error::new(std::io::ErrorKind::Other, "boom").into();
        assert!(!err.is_encoding());
        assert_eq!(err.to_string(), "IO error: boom");
    }
}
