//! Shared contracts for editable assertions.

use serde::de::DeserializeOwned;
use std::error::Error;
use std::fmt::{Debug, Display, Formatter};

/// User-editable projection of one assertion kind.
///
/// Implementations are plain value types: two projections with the same
/// field values are the same edit.
pub trait EditableAssertion: Sized + PartialEq + Debug {
    /// Parses YAML text and validates the editable fields.
    ///
    /// `label` names the document in error messages so that scratch file
    /// paths never leak to the user.
    fn from_yaml_str(source: &str, label: &str) -> Result<Self, AssertionValidationError>;
}

/// Error for edited content that cannot become an editable assertion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssertionValidationError {
    /// Content is not well-formed YAML or does not match the expected shape.
    Yaml { label: String, message: String },
    /// Content parsed but breaks a field invariant.
    Invalid {
        label: String,
        field: String,
        message: String,
    },
}

impl AssertionValidationError {
    pub fn invalid(label: &str, field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Invalid {
            label: label.to_string(),
            field: field.into(),
            message: message.into(),
        }
    }
}

impl Display for AssertionValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Yaml { label, message } => write!(f, "bad {label} content: {message}"),
            Self::Invalid {
                label,
                field,
                message,
            } => write!(f, "bad {label} content:\n- field `{field}`: {message}"),
        }
    }
}

impl Error for AssertionValidationError {}

/// Deserializes YAML text into `T`, labelling failures with `label`.
pub fn parse_yaml<T: DeserializeOwned>(
    source: &str,
    label: &str,
) -> Result<T, AssertionValidationError> {
    serde_yaml::from_str(source).map_err(|err| AssertionValidationError::Yaml {
        label: label.to_string(),
        message: err.to_string(),
    })
}

/// Turns a human assertion name (`confdb schema`) into a file-like label.
pub fn assertion_label(assertion_name: &str) -> String {
    assertion_name.replace(' ', "-")
}

#[cfg(test)]
mod tests {
    use super::{assertion_label, parse_yaml, AssertionValidationError};
    use std::collections::BTreeMap;

    #[test]
    fn label_replaces_spaces() {
        assert_eq!(assertion_label("confdb schema"), "confdb-schema");
    }

    #[test]
    fn parse_yaml_reports_label_instead_of_path() {
        let err = parse_yaml::<BTreeMap<String, String>>("a: [", "confdb-schema").unwrap_err();
        assert!(matches!(err, AssertionValidationError::Yaml { .. }));
        assert!(err.to_string().starts_with("bad confdb-schema content"));
    }
}
