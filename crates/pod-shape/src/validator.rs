use thiserror::Error;

/// A document failed to conform to a shape.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{message}")]
pub struct ValidationError {
    pub message: String,
    /// The node or path the failure is about, when the validator knows it.
    pub focus: Option<String>,
}

impl ValidationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            focus: None,
        }
    }

    pub fn at(focus: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            focus: Some(focus.into()),
        }
    }
}

/// Checks a document against a shape definition.
///
/// The shape and document are opaque text; their syntax is the validator's
/// business. Validation is CPU-bound and synchronous.
pub trait ShapeValidator: Send + Sync {
    fn validate(&self, shape: &str, document: &str) -> Result<(), ValidationError>;
}

impl<F> ShapeValidator for F
where
    F: Fn(&str, &str) -> Result<(), ValidationError> + Send + Sync,
{
    fn validate(&self, shape: &str, document: &str) -> Result<(), ValidationError> {
        self(shape, document)
    }
}

/// Accepts every document. Shape declaration and container membership are
/// still enforced by the store; only content checks are skipped.
#[derive(Clone, Copy, Debug, Default)]
pub struct PermissiveValidator;

impl ShapeValidator for PermissiveValidator {
    fn validate(&self, _shape: &str, _document: &str) -> Result<(), ValidationError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn non_empty(_shape: &str, document: &str) -> Result<(), ValidationError> {
        if document.trim().is_empty() {
            Err(ValidationError::at("<>", "document is empty"))
        } else {
            Ok(())
        }
    }

    #[test]
    fn functions_are_validators() {
        assert!(non_empty.validate("shape", "<> a <#Note>.").is_ok());
        let err = non_empty.validate("shape", "  ").unwrap_err();
        assert_eq!(err.to_string(), "document is empty");
        assert_eq!(err.focus.as_deref(), Some("<>"));
    }

    #[test]
    fn permissive_accepts_anything() {
        assert!(PermissiveValidator.validate("", "").is_ok());
    }
}
