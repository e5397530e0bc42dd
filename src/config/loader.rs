//! Configuration loading from disk and environment.

use std::fs;
use std::path::Path;

use crate::config::schema::ServiceConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Environment variable selecting the listening port.
pub const PORT_ENV: &str = "PORT";

/// Error type for configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid {name}={value:?}: {reason}")]
    Env {
        name: &'static str,
        value: String,
        reason: String,
    },

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load configuration: defaults, then the optional TOML file, then the environment.
///
/// The result is validated before it is returned.
pub fn load_config(path: Option<&Path>) -> Result<ServiceConfig, ConfigError> {
    let config = match path {
        Some(path) => parse_file(path)?,
        None => ServiceConfig::default(),
    };

    let config = apply_env_overrides(config, |name| std::env::var(name).ok())?;
    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Read and deserialize a TOML file without validating it.
pub fn parse_file(path: &Path) -> Result<ServiceConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    Ok(toml::from_str(&content)?)
}

/// Apply environment overrides using the given variable lookup.
pub fn apply_env_overrides<F>(mut config: ServiceConfig, lookup: F) -> Result<ServiceConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(value) = lookup(PORT_ENV).filter(|v| !v.trim().is_empty()) {
        config.listener.port = value.trim().parse().map_err(|e: std::num::ParseIntError| {
            ConfigError::Env {
                name: PORT_ENV,
                value: value.clone(),
                reason: e.to_string(),
            }
        })?;
    }

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::TransformVariant;

    fn env(pairs: &'static [(&'static str, &'static str)]) -> impl Fn(&str) -> Option<String> {
        move |name| {
            pairs
                .iter()
                .find(|(k, _)| *k == name)
                .map(|(_, v)| v.to_string())
        }
    }

    #[test]
    fn test_port_env_overrides_default() {
        let config = apply_env_overrides(ServiceConfig::default(), env(&[("PORT", "3000")])).unwrap();
        assert_eq!(config.listener.port, 3000);
    }

    #[test]
    fn test_empty_port_env_keeps_default() {
        let config = apply_env_overrides(ServiceConfig::default(), env(&[("PORT", "")])).unwrap();
        assert_eq!(config.listener.port, 8080);
    }

    #[test]
    fn test_invalid_port_env_is_an_error() {
        let err = apply_env_overrides(ServiceConfig::default(), env(&[("PORT", "eighty")])).unwrap_err();
        assert!(matches!(err, ConfigError::Env { name: "PORT", .. }));
        assert!(err.to_string().contains("eighty"));
    }

    #[test]
    fn test_parse_file_reads_toml() {
        let dir = std::env::temp_dir().join(format!("imgproc-config-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("service.toml");
        std::fs::write(
            &path,
            r#"
            [listener]
            port = 9000

            [transform]
            variant = "passthrough"
            header = "HDR:"
            "#,
        )
        .unwrap();

        let config = parse_file(&path).unwrap();
        assert_eq!(config.listener.port, 9000);
        assert_eq!(config.transform.variant, TransformVariant::Passthrough);
        assert_eq!(config.transform.header, "HDR:");

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = parse_file(Path::new("/definitely/not/here.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }

    #[test]
    fn test_validation_errors_are_joined() {
        let err = ConfigError::Validation(vec![
            ValidationError::EmptyField,
            ValidationError::ZeroCeiling,
        ]);
        assert_eq!(
            err.to_string(),
            "Validation failed: upload.field must not be empty, upload.max_bytes must be greater than zero"
        );
    }
}
