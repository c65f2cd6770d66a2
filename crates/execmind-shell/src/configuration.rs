use crate::error::{to_env_var, ConfigError, ENV_PREFIX};
use config::{Config, Environment};
use execmind::chat::{ChatConfig, DEFAULT_SYSTEM_MESSAGE};
use execmind::providers::configs::{OpenAiProviderConfig, DEEPSEEK_HOST, DEEPSEEK_MODEL};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct ChatSettings {
    #[serde(default = "default_chat_host")]
    pub host: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_system_message")]
    pub system_message: String,
    #[serde(default)]
    pub temperature: Option<f32>,
    /// Name of the host variable that holds the API key
    #[serde(default = "default_api_key_var")]
    pub api_key_var: String,
    /// Offer the builtin tools to the model before each answer
    #[serde(default)]
    pub tools: bool,
}

impl Default for ChatSettings {
    fn default() -> Self {
        Self {
            host: default_chat_host(),
            model: default_model(),
            system_message: default_system_message(),
            temperature: None,
            api_key_var: default_api_key_var(),
            tools: false,
        }
    }
}

impl ChatSettings {
    pub fn provider_config(&self, api_key: String) -> OpenAiProviderConfig {
        OpenAiProviderConfig {
            host: self.host.clone(),
            api_key,
            model: self.model.clone(),
            temperature: self.temperature,
        }
    }

    pub fn chat_config(&self) -> ChatConfig {
        ChatConfig {
            model: self.model.clone(),
            system_message: self.system_message.clone(),
            temperature: self.temperature,
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct WindowSettings {
    #[serde(default = "default_width")]
    pub width: u32,
    #[serde(default = "default_height")]
    pub height: u32,
    #[serde(default = "default_secondary_width")]
    pub secondary_width: u32,
    #[serde(default = "default_secondary_height")]
    pub secondary_height: u32,
}

impl Default for WindowSettings {
    fn default() -> Self {
        Self {
            width: default_width(),
            height: default_height(),
            secondary_width: default_secondary_width(),
            secondary_height: default_secondary_height(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub chat: ChatSettings,
    #[serde(default)]
    pub window: WindowSettings,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        Self::load_and_validate()
    }

    fn load_and_validate() -> Result<Self, ConfigError> {
        let config = Config::builder()
            .set_default("chat.host", default_chat_host())?
            .set_default("chat.model", default_model())?
            .set_default("chat.system_message", default_system_message())?
            .set_default("chat.api_key_var", default_api_key_var())?
            .set_default("chat.tools", false)?
            .set_default("window.width", default_width())?
            .set_default("window.height", default_height())?
            .set_default("window.secondary_width", default_secondary_width())?
            .set_default("window.secondary_height", default_secondary_height())?
            // Layer on the environment variables
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let result: Result<Self, config::ConfigError> = config.try_deserialize();

        match result {
            Ok(settings) => Ok(settings),
            Err(err) => {
                tracing::debug!("Configuration error: {:?}", &err);

                match err {
                    // Every setting has a default, so the only way to break one is
                    // an environment value of the wrong type
                    config::ConfigError::Type {
                        key: Some(key),
                        unexpected,
                        expected,
                        ..
                    } => Err(ConfigError::InvalidEnvVar {
                        env_var: to_env_var(&key),
                        reason: format!("expected {}, found {}", expected, unexpected),
                    }),
                    err => Err(ConfigError::Other(err)),
                }
            }
        }
    }
}

fn default_chat_host() -> String {
    DEEPSEEK_HOST.to_string()
}

fn default_model() -> String {
    DEEPSEEK_MODEL.to_string()
}

fn default_system_message() -> String {
    DEFAULT_SYSTEM_MESSAGE.to_string()
}

fn default_api_key_var() -> String {
    "DEEPSEEK_API_KEY".to_string()
}

fn default_width() -> u32 {
    1000
}

fn default_height() -> u32 {
    800
}

fn default_secondary_width() -> u32 {
    600
}

fn default_secondary_height() -> u32 {
    400
}
