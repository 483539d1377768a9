//! Configuration validation utilities.

use super::error::{ConfigError, ConfigResult};
use super::schema::{
    AnvilConfig, LogOutput, LogRotation, LoggingConfig, RegistrationConfig, RegistrationScope,
};
use std::collections::HashSet;

/// Validates the entire configuration.
pub fn validate_config(config: &AnvilConfig) -> ConfigResult<()> {
    validate_logging_config(&config.logging)?;
    validate_registration_config(&config.registration)?;
    Ok(())
}

fn validate_logging_config(logging: &LoggingConfig) -> ConfigResult<()> {
    if logging.output == LogOutput::File && logging.file_path.is_none() {
        return Err(ConfigError::invalid(
            "logging.file_path",
            "required when output is `file`",
        ));
    }

    if logging.rotation != LogRotation::Never && logging.max_files == 0 {
        return Err(ConfigError::invalid(
            "logging.max_files",
            "must be greater than 0 when rotation is enabled",
        ));
    }

    if let Some(target) = logging.filters.keys().find(|target| target.trim().is_empty()) {
        return Err(ConfigError::invalid(
            "logging.filters",
            format!("empty target {target:?}"),
        ));
    }

    Ok(())
}

fn validate_registration_config(registration: &RegistrationConfig) -> ConfigResult<()> {
    if registration.scope != RegistrationScope::Guilds {
        return Ok(());
    }

    if registration.guilds.is_empty() {
        return Err(ConfigError::invalid(
            "registration.guilds",
            "at least one guild is required for the `guilds` scope",
        ));
    }

    let mut seen = HashSet::new();
    for guild in &registration.guilds {
        if guild.get() == 0 {
            return Err(ConfigError::invalid("registration.guilds", "guild id cannot be 0"));
        }
        if !seen.insert(guild) {
            return Err(ConfigError::invalid(
                "registration.guilds",
                format!("duplicate guild id {guild}"),
            ));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use anvil_core::Snowflake;
    use std::path::PathBuf;

    #[test]
    fn test_validate_default_config() {
        assert!(validate_config(&AnvilConfig::default()).is_ok());
    }

    #[test]
    fn test_file_output_needs_path() {
        let mut config = AnvilConfig::default();
        config.logging.output = LogOutput::File;
        let err = validate_config(&config).unwrap_err();
        assert_eq!(err.field(), Some("logging.file_path"));

        config.logging.file_path = Some(PathBuf::from("logs/anvil.log"));
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_guild_scope() {
        let mut config = AnvilConfig::default();
        config.registration.scope = RegistrationScope::Guilds;
        let err = validate_config(&config).unwrap_err();
        assert_eq!(err.field(), Some("registration.guilds"));

        config.registration.guilds = vec![Snowflake(1), Snowflake(1)];
        let err = validate_config(&config).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid `registration.guilds`: duplicate guild id 1"
        );

        config.registration.guilds = vec![Snowflake(0)];
        assert!(validate_config(&config).is_err());

        config.registration.guilds = vec![Snowflake(1), Snowflake(2)];
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_guilds_ignored_for_global_scope() {
        let mut config = AnvilConfig::default();
        config.registration.guilds = vec![Snowflake(0)];
        assert!(validate_config(&config).is_ok());
    }
}
