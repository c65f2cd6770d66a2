use thiserror::Error;

pub const ENV_PREFIX: &str = "EXECMIND";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value in environment variable {env_var}: {reason}")]
    InvalidEnvVar { env_var: String, reason: String },

    #[error("Configuration error: {0}")]
    Other(#[from] config::ConfigError),
}

/// The environment variable that sets a dotted settings path, e.g.
/// `chat.api_key_var` -> `EXECMIND_CHAT__API_KEY_VAR`
pub fn to_env_var(field_path: &str) -> String {
    let parts: Vec<String> = field_path
        .split('.')
        .map(|part| part.to_uppercase())
        .collect();
    format!("{}_{}", ENV_PREFIX, parts.join("__"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_env_var() {
        assert_eq!(to_env_var("chat.api_key_var"), "EXECMIND_CHAT__API_KEY_VAR");
        assert_eq!(to_env_var("temperature"), "EXECMIND_TEMPERATURE");
    }

    #[test]
    fn test_invalid_env_var_message() {
        let err = ConfigError::InvalidEnvVar {
            env_var: to_env_var("window.width"),
            reason: "expected an integer, found a string".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Invalid value in environment variable EXECMIND_WINDOW__WIDTH: expected an integer, found a string"
        );
    }
}
