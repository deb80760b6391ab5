//! Error types for numeric conversions

use thiserror::Error;

/// Fixed-point conversion errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum NumericError {
    #[error("Arithmetic overflow converting {value}")]
    Overflow { value: String },

    #[error("Price must be strictly positive, got {price}")]
    NonPositivePrice { price: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_error_display() {
        let err = NumericError::NonPositivePrice {
            price: "0".to_string(),
        };
        assert_eq!(err.to_string(), "Price must be strictly positive, got 0");
    }
}
