//! Configuration loading from disk.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::MockConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", .0.iter().map(ToString::to_string).collect::<Vec<_>>().join(", "))]
    Validation(Vec<ValidationError>),
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<MockConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    parse_config(&content)
}

/// Parse and validate configuration from TOML text.
pub fn parse_config(content: &str) -> Result<MockConfig, ConfigError> {
    let config: MockConfig = toml::from_str(content)?;
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definition::CompileMode;
    use crate::routing::HttpMethod;

    #[test]
    fn test_parse_full_config() {
        let config = parse_config(
            r#"
            [listener]
            bind_address = "0.0.0.0:7000"

            [api]
            root_dir = "mocks"
            base_url = "/v1"
            mode = "lenient"
            watch = true

            [[states]]
            route = "/users/[userid]"
            method = "DELETE"
            state = "ERR"

            [[states]]
            path = "/users/[userid]"
            state = "ERR"
            "#,
        )
        .unwrap();

        assert_eq!(config.listener.bind_address, "0.0.0.0:7000");
        assert_eq!(config.api.root_dir, Path::new("mocks"));
        assert_eq!(config.api.mode, CompileMode::Lenient);
        assert!(config.api.watch);
        assert_eq!(config.admin.prefix, "/__mock");
        assert_eq!(config.states.len(), 2);
        assert_eq!(config.states[0].method, Some(HttpMethod::Delete));
        assert_eq!(config.states[1].method, None);
        assert_eq!(config.states[1].route, "/users/[userid]");
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = parse_config("").unwrap();
        assert_eq!(config.api.base_url, "/api");
        assert_eq!(config.api.mode, CompileMode::Strict);
    }

    #[test]
    fn test_syntax_and_validation_errors() {
        assert!(matches!(parse_config("[api"), Err(ConfigError::Parse(_))));
        assert!(matches!(
            parse_config("[timeouts]\nrequest_secs = 0"),
            Err(ConfigError::Validation(errors)) if errors == vec![ValidationError::ZeroTimeout]
        ));
        assert!(matches!(
            load_config(Path::new("/definitely/not/here.toml")),
            Err(ConfigError::Io(_))
        ));
    }
}
