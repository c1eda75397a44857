#[cfg(feature = "cli")]
pub mod cli;

use crate::domain::model::NATIVE_ID_FIELD;
use crate::domain::ports::ServiceSchema;
use crate::utils::error::{AdapterError, Result};
use crate::utils::validation::{self, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

pub const DEFAULT_URI: &str = "http://localhost:5984";
pub const DEFAULT_PAGE_SIZE: usize = 1000;

/// Driver-level connection parameters.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConnectionOptions {
    pub username: Option<String>,
    pub password: Option<String>,
    pub timeout_seconds: Option<u64>,
    pub headers: Option<HashMap<String, String>>,
    /// Page size used when a query without a limit is paged by bookmark.
    pub page_size: Option<usize>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConnectionConfig {
    pub uri: Option<String>,
    #[serde(flatten)]
    pub options: ConnectionOptions,
}

impl ConnectionConfig {
    pub fn uri(&self) -> &str {
        self.uri.as_deref().unwrap_or(DEFAULT_URI)
    }
}

/// Service metadata; the database is named `"<name>-<collection>"`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServiceConfig {
    pub name: String,
    pub collection: Option<String>,
    pub id_field: Option<String>,
}

impl ServiceConfig {
    pub fn new(name: impl Into<String>, collection: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            collection: Some(collection.into()),
            id_field: None,
        }
    }

    pub fn id_field(&self) -> &str {
        self.id_field.as_deref().unwrap_or(NATIVE_ID_FIELD)
    }
}

impl ServiceSchema for ServiceConfig {
    fn name(&self) -> &str {
        &self.name
    }

    fn collection(&self) -> Option<&str> {
        self.collection.as_deref()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AdapterConfig {
    #[serde(default)]
    pub connection: ConnectionConfig,
    #[serde(default)]
    pub service: ServiceConfig,
}

impl AdapterConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(AdapterError::IoError)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| AdapterError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Replaces `${VAR}` with the value of the environment variable `VAR`.
    /// Unset variables are left as written.
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| AdapterError::config(e.to_string()))?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }
}

impl Validate for AdapterConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_url("connection.uri", self.connection.uri())?;

        if let Some(page_size) = self.connection.options.page_size {
            validation::validate_positive_number("connection.page_size", page_size, 1)?;
        }

        validation::validate_non_empty_string("service.name", &self.service.name)?;
        let collection =
            validation::validate_required_field("service.collection", &self.service.collection)?;
        validation::validate_non_empty_string("service.collection", collection)?;
        validation::validate_database_name(
            "service",
            &format!("{}-{}", self.service.name, collection),
        )?;

        if let Some(id_field) = &self.service.id_field {
            validation::validate_non_empty_string("service.id_field", id_field)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_full_config() {
        let toml_content = r#"
[connection]
uri = "http://couch.internal:5984"
username = "admin"
password = "secret"
timeout_seconds = 10
page_size = 200

[connection.headers]
X-Request-Source = "adapter"

[service]
name = "users"
collection = "profiles"
id_field = "id"
"#;

        let config = AdapterConfig::from_toml_str(toml_content).unwrap();

        assert_eq!(config.connection.uri(), "http://couch.internal:5984");
        assert_eq!(config.connection.options.username.as_deref(), Some("admin"));
        assert_eq!(config.connection.options.timeout_seconds, Some(10));
        assert_eq!(config.connection.options.page_size, Some(200));
        assert_eq!(
            config
                .connection
                .options
                .headers
                .as_ref()
                .and_then(|h| h.get("X-Request-Source"))
                .map(String::as_str),
            Some("adapter")
        );
        assert_eq!(config.service.collection(), Some("profiles"));
        assert_eq!(config.service.id_field(), "id");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_defaults_when_sections_missing() {
        let config = AdapterConfig::from_toml_str("").unwrap();
        assert_eq!(config.connection.uri(), DEFAULT_URI);
        assert_eq!(config.service.id_field(), "_id");
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("COUCH_ADAPTER_TEST_PASSWORD", "from-env");

        let toml_content = r#"
[connection]
password = "${COUCH_ADAPTER_TEST_PASSWORD}"
username = "${COUCH_ADAPTER_TEST_UNSET_USER}"

[service]
name = "users"
collection = "profiles"
"#;

        let config = AdapterConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.connection.options.password.as_deref(), Some("from-env"));
        assert_eq!(
            config.connection.options.username.as_deref(),
            Some("${COUCH_ADAPTER_TEST_UNSET_USER}")
        );

        std::env::remove_var("COUCH_ADAPTER_TEST_PASSWORD");
    }

    #[test]
    fn test_config_validation() {
        let missing_collection = r#"
[service]
name = "users"
"#;
        let config = AdapterConfig::from_toml_str(missing_collection).unwrap();
        assert!(matches!(
            config.validate(),
            Err(AdapterError::MissingConfigError { .. })
        ));

        let bad_uri = r#"
[connection]
uri = "couch.internal"

[service]
name = "users"
collection = "profiles"
"#;
        let config = AdapterConfig::from_toml_str(bad_uri).unwrap();
        assert!(config.validate().is_err());

        let bad_name = r#"
[service]
name = "Users"
collection = "profiles"
"#;
        let config = AdapterConfig::from_toml_str(bad_name).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file
            .write_all(b"[service]\nname = \"orders\"\ncollection = \"items\"\n")
            .unwrap();

        let config = AdapterConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.service.name, "orders");
        assert_eq!(config.connection.uri(), DEFAULT_URI);
    }

    #[test]
    fn test_invalid_toml_is_a_config_error() {
        assert!(matches!(
            AdapterConfig::from_toml_str("[service\nname ="),
            Err(AdapterError::ConfigError { .. })
        ));
    }
}
