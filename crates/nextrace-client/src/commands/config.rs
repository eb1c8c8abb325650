//! Configuration commands.

use nextrace_service::ServiceConfig;

use crate::error::{ClientError, ClientResult};

/// Dump the current configuration to stdout.
pub fn dump(config: &ServiceConfig) -> ClientResult<()> {
    let toml_str = toml::to_string_pretty(config)?;
    println!("# config.toml ({})", ServiceConfig::default_path().display());
    println!("{}", toml_str);
    Ok(())
}

/// Validate the configuration.
pub fn validate(config: &ServiceConfig) -> ClientResult<()> {
    config
        .validate()
        .map_err(|e| ClientError::Config(e.to_string()))?;
    println!(
        "Configuration is valid ({} categories).",
        config.categories.len()
    );
    Ok(())
}

/// Show the configuration file path.
pub fn path() -> ClientResult<()> {
    println!("config: {}", ServiceConfig::default_path().display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_validates() {
        assert!(validate(&ServiceConfig::default()).is_ok());
    }

    #[test]
    fn invalid_config_is_a_config_error() {
        let config = ServiceConfig::default().with_categories(Vec::new());
        assert!(matches!(validate(&config), Err(ClientError::Config(_))));
    }

    #[test]
    fn dump_serializes_defaults() {
        assert!(dump(&ServiceConfig::default()).is_ok());
    }
}
