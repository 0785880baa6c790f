//! Redacting wrapper for credentials
//!
//! API keys pass through the CLI, the identity lookup and the provisioning
//! result. Wrapping them in `Sensitive` means a stray `{:?}` in a log line
//! prints a placeholder instead of the key. Serializing one writes the same
//! placeholder, so a key never leaks into JSON output by accident.

use serde::{Serialize, Serializer};
use std::fmt;

const REDACTED: &str = "***REDACTED***";

/// Value that never shows itself through `Debug`, `Display` or serde
///
/// ```
/// use cmdgate_core_types::Sensitive;
///
/// let key = Sensitive::new("0b6e-api-key");
/// assert_eq!(format!("{:?}", key), "***REDACTED***");
/// assert_eq!(key.expose(), &"0b6e-api-key");
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct Sensitive<T>(T);

impl<T> Sensitive<T> {
    pub fn new(value: T) -> Self {
        Self(value)
    }

    /// Borrow the secret. Call sites should be few and obvious.
    pub fn expose(&self) -> &T {
        &self.0
    }

    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T> fmt::Debug for Sensitive<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(REDACTED)
    }
}

impl<T> fmt::Display for Sensitive<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(REDACTED)
    }
}

impl<T> Serialize for Sensitive<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(REDACTED)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_and_display_are_redacted() {
        let key = Sensitive::new("a1b2c3".to_string());
        assert_eq!(format!("{:?}", key), REDACTED);
        assert_eq!(format!("{}", key), REDACTED);
    }

    #[test]
    fn test_redaction_inside_derived_debug() {
        #[derive(Debug)]
        #[allow(dead_code)]
        struct Provisioned {
            name: String,
            api_key: Sensitive<String>,
        }

        let p = Provisioned {
            name: "alice".to_string(),
            api_key: Sensitive::new("key-123".to_string()),
        };
        let rendered = format!("{:?}", p);
        assert!(rendered.contains("alice"));
        assert!(!rendered.contains("key-123"));
    }

    #[test]
    fn test_serialized_form_is_redacted() {
        #[derive(Serialize)]
        struct Provisioned {
            name: String,
            api_key: Sensitive<String>,
        }

        let json = serde_json::to_string(&Provisioned {
            name: "alice".to_string(),
            api_key: Sensitive::new("key-123".to_string()),
        })
        .unwrap();
        assert_eq!(json, r#"{"name":"alice","api_key":"***REDACTED***"}"#);
    }

    #[test]
    fn test_expose_and_into_inner() {
        let key = Sensitive::new(String::from("k"));
        assert_eq!(key.expose(), "k");
        assert_eq!(key.into_inner(), "k");
    }
}
