pub const DEEPSEEK_HOST: &str = "https://api.deepseek.com";
pub const DEEPSEEK_MODEL: &str = "deepseek-chat";

/// Connection settings for any OpenAI-compatible chat-completion endpoint
#[derive(Debug, Clone)]
pub struct OpenAiProviderConfig {
    pub host: String,
    pub api_key: String,
    pub model: String,
    pub temperature: Option<f32>,
}

impl OpenAiProviderConfig {
    /// DeepSeek defaults, which is what the desktop client talks to out of the box
    pub fn deepseek<S: Into<String>>(api_key: S) -> Self {
        Self {
            host: DEEPSEEK_HOST.to_string(),
            api_key: api_key.into(),
            model: DEEPSEEK_MODEL.to_string(),
            temperature: None,
        }
    }
}
