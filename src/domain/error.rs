use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    #[error("markdown content must not be empty")]
    EmptyMarkup,
    #[error("unsupported format `{value}` (supported formats: html, pdf)")]
    UnsupportedFormat { value: String },
}

impl DomainError {
    pub fn unsupported_format(value: impl Into<String>) -> Self {
        Self::UnsupportedFormat {
            value: value.into(),
        }
    }
}
