// # Credentials
//
// Loads the API credentials file.
//
// ## File Format
//
// ```yaml
// customer_name: acme
// user_name: ops
// password: hunter2
// ```
//
// The file is read into a plain YAML value tree and the three fields are
// picked out by name. Tagged values (`!!python/object` and friends) are
// rejected rather than interpreted, and nothing beyond the three scalar
// fields is ever looked at.

use serde_yaml::Value;
use std::fmt;
use std::path::Path;

use crate::{Error, Result};

/// Key holding the provider customer (account) name
pub const CUSTOMER_NAME: &str = "customer_name";
/// Key holding the API user name
pub const USER_NAME: &str = "user_name";
/// Key holding the API password
pub const PASSWORD: &str = "password";

/// API credentials
///
/// # Security
///
/// The Debug implementation does NOT expose the password.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    customer_name: String,
    user_name: String,
    /// ⚠️ NEVER log this value
    password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("customer_name", &self.customer_name)
            .field("user_name", &self.user_name)
            .field("password", &"<REDACTED>")
            .finish()
    }
}

impl Credentials {
    pub fn new(
        customer_name: impl Into<String>,
        user_name: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            customer_name: customer_name.into(),
            user_name: user_name.into(),
            password: password.into(),
        }
    }

    /// Load credentials from a YAML file
    ///
    /// Any failure (unreadable file, malformed YAML, missing field) is a
    /// [`Error::Credentials`] whose message is meant for the user as-is.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        tracing::debug!("Loading API credentials from {}", path.display());

        let contents = std::fs::read_to_string(path).map_err(|e| {
            Error::credentials(format!(
                "Could not load API credentials yaml file: {}: {}",
                path.display(),
                e
            ))
        })?;

        Self::from_yaml(&contents)
    }

    /// Parse credentials from YAML text
    pub fn from_yaml(contents: &str) -> Result<Self> {
        let document: Value = serde_yaml::from_str(contents).map_err(|e| {
            Error::credentials(format!("Could not load API credentials yaml file: {}", e))
        })?;

        let mapping = match document {
            Value::Mapping(mapping) => mapping,
            Value::Null => {
                return Err(Error::credentials("API credentials file is empty"));
            }
            _ => {
                return Err(Error::credentials(
                    "API credentials file must be a mapping of keys to values",
                ));
            }
        };

        let field = |name: &str| -> Result<String> {
            match mapping.get(name) {
                None | Some(Value::Null) => Err(Error::credentials(format!(
                    "API credentials file does not specify '{}'",
                    name
                ))),
                Some(Value::String(s)) => Ok(s.clone()),
                Some(Value::Number(_)) | Some(Value::Bool(_)) => Err(Error::credentials(format!(
                    "API credentials field '{}' must be a plain string (quote the value)",
                    name
                ))),
                Some(_) => Err(Error::credentials(format!(
                    "API credentials field '{}' must be a plain string",
                    name
                ))),
            }
        };

        Ok(Self {
            customer_name: field(CUSTOMER_NAME)?,
            user_name: field(USER_NAME)?,
            password: field(PASSWORD)?,
        })
    }

    pub fn customer_name(&self) -> &str {
        &self.customer_name
    }

    pub fn user_name(&self) -> &str {
        &self.user_name
    }

    pub fn password(&self) -> &str {
        &self.password
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "customer_name: acme\nuser_name: ops\npassword: s3cret").unwrap();

        let creds = Credentials::from_file(file.path()).unwrap();
        assert_eq!(creds.customer_name(), "acme");
        assert_eq!(creds.user_name(), "ops");
        assert_eq!(creds.password(), "s3cret");
    }

    #[test]
    fn test_missing_file() {
        let err = Credentials::from_file("/nonexistent/creds.yaml").unwrap_err();
        assert!(matches!(err, Error::Credentials(_)));
        assert!(err.to_string().starts_with("Could not load API credentials yaml file"));
    }

    #[test]
    fn test_missing_fields_are_named() {
        let err = Credentials::from_yaml("customer_name: acme\npassword: x\n").unwrap_err();
        assert_eq!(
            err.to_string(),
            "API credentials file does not specify 'user_name'"
        );

        let err = Credentials::from_yaml("user_name: ops\npassword: x\n").unwrap_err();
        assert_eq!(
            err.to_string(),
            "API credentials file does not specify 'customer_name'"
        );

        let err = Credentials::from_yaml("customer_name: acme\nuser_name: ops\n").unwrap_err();
        assert_eq!(
            err.to_string(),
            "API credentials file does not specify 'password'"
        );
    }

    #[test]
    fn test_malformed_yaml() {
        let err = Credentials::from_yaml("customer_name: [unterminated").unwrap_err();
        assert!(matches!(err, Error::Credentials(_)));
    }

    #[test]
    fn test_non_mapping_document() {
        assert!(Credentials::from_yaml("- a\n- b\n").is_err());
        assert!(Credentials::from_yaml("").is_err());
    }

    #[test]
    fn test_tagged_values_rejected() {
        let yaml = "customer_name: acme\nuser_name: ops\npassword: !!python/object:os.system ls\n";
        let err = Credentials::from_yaml(yaml).unwrap_err();
        assert!(matches!(err, Error::Credentials(_)));

        let yaml = "customer_name: acme\nuser_name: ops\npassword: !shell ls\n";
        let err = Credentials::from_yaml(yaml).unwrap_err();
        assert_eq!(
            err.to_string(),
            "API credentials field 'password' must be a plain string"
        );
    }

    #[test]
    fn test_unquoted_numbers_rejected() {
        for password in ["12345", "3.14", "true"] {
            let yaml = format!(
                "customer_name: acme\nuser_name: ops\npassword: {}\n",
                password
            );
            let err = Credentials::from_yaml(&yaml).unwrap_err();
            assert_eq!(
                err.to_string(),
                "API credentials field 'password' must be a plain string (quote the value)"
            );
        }
    }

    #[test]
    fn test_quoted_numbers_kept_verbatim() {
        let creds =
            Credentials::from_yaml("customer_name: acme\nuser_name: ops\npassword: '007'\n")
                .unwrap();
        assert_eq!(creds.password(), "007");
    }

    #[test]
    fn test_password_not_exposed_in_debug() {
        let creds = Credentials::new("acme", "ops", "secret_password_123");
        let debug_str = format!("{:?}", creds);
        assert!(!debug_str.contains("secret_password_123"));
        assert!(debug_str.contains("Credentials"));
        assert!(debug_str.contains("acme"));
    }
}
