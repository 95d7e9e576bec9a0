//! Layout error types

/// Errors raised while resolving dimensions or composing a layout
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LayoutError {
    #[error("Invalid workcell configuration: {0:?} (expected \"mixed\" or \"all_suspended\")")]
    InvalidConfiguration(String),

    #[error("Invalid dimension `{name}`: {value} (must be positive and finite)")]
    InvalidDimension { name: &'static str, value: f32 },

    #[error("Invalid joint table: {0}")]
    InvalidJointTable(String),
}

/// Reject zero, negative and non-finite lengths
pub(crate) fn ensure_positive(name: &'static str, value: f32) -> Result<f32, LayoutError> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(LayoutError::InvalidDimension { name, value })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ensure_positive() {
        assert_eq!(ensure_positive("width", 2.0), Ok(2.0));
        assert!(matches!(
            ensure_positive("width", 0.0),
            Err(LayoutError::InvalidDimension { name: "width", .. })
        ));
        assert!(ensure_positive("depth", -1.0).is_err());
        assert!(ensure_positive("height", f32::NAN).is_err());
    }

    #[test]
    fn test_error_messages() {
        let err = LayoutError::InvalidConfiguration("bogus".to_string());
        assert!(err.to_string().contains("\"bogus\""));

        let err = LayoutError::InvalidDimension {
            name: "profile_size",
            value: -0.08,
        };
        assert!(err.to_string().contains("profile_size"));
    }
}
