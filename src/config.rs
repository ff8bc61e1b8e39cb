use crate::error::ConfigError;
use secrecy::SecretString;

#[derive(Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub host: HostConfig,
    pub model: ModelConfig,
    pub review: ReviewConfig,
}

#[derive(Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// Repository host credentials and payload fallbacks.
#[derive(Clone)]
pub struct HostConfig {
    pub pat: SecretString,
    pub default_project: Option<String>,
    pub default_repo: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelProvider {
    Anthropic,
    OpenAi,
    DeepSeek,
}

impl ModelProvider {
    fn parse(value: &str) -> Result<Self, ConfigError> {
        match value.to_lowercase().as_str() {
            "anthropic" | "claude" => Ok(Self::Anthropic),
            "openai" => Ok(Self::OpenAi),
            "deepseek" | "deepseek-r1" => Ok(Self::DeepSeek),
            _ => Err(ConfigError::InvalidValue("MODEL_TYPE".to_string())),
        }
    }
}

#[derive(Clone)]
pub struct ModelConfig {
    pub provider: ModelProvider,
    pub anthropic_api_key: Option<SecretString>,
    pub openai_api_key: Option<SecretString>,
    pub deepseek_api_key: Option<SecretString>,
    pub deepseek_endpoint: Option<String>,
    pub timeout_secs: u64,
}

#[derive(Clone)]
pub struct ReviewConfig {
    pub instruction_source: String,
    pub create_fix_pr: bool,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            server: ServerConfig {
                host: std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                port: std::env::var("PORT")
                    .unwrap_or_else(|_| "8080".to_string())
                    .parse()
                    .map_err(|_| ConfigError::InvalidValue("PORT".into()))?,
            },
            host: HostConfig {
                pat: std::env::var("AZURE_PAT")
                    .map(SecretString::from)
                    .map_err(|_| ConfigError::MissingRequired("AZURE_PAT".into()))?,
                default_project: std::env::var("AZURE_PROJECT").ok(),
                default_repo: std::env::var("AZURE_REPO").ok(),
            },
            model: ModelConfig {
                provider: match std::env::var("MODEL_TYPE") {
                    Ok(value) => ModelProvider::parse(&value)?,
                    Err(_) => ModelProvider::Anthropic,
                },
                anthropic_api_key: std::env::var("ANTHROPIC_API_KEY")
                    .ok()
                    .map(SecretString::from),
                openai_api_key: std::env::var("OPENAI_API_KEY").ok().map(SecretString::from),
                deepseek_api_key: std::env::var("DEEPSEEK_API_KEY")
                    .ok()
                    .map(SecretString::from),
                deepseek_endpoint: std::env::var("DEEPSEEK_ENDPOINT").ok(),
                timeout_secs: std::env::var("MODEL_TIMEOUT_SECS")
                    .unwrap_or_else(|_| "240".to_string())
                    .parse()
                    .unwrap_or(240),
            },
            review: ReviewConfig {
                instruction_source: std::env::var("INSTRUCTION_SOURCE")
                    .map_err(|_| ConfigError::MissingRequired("INSTRUCTION_SOURCE".into()))?,
                create_fix_pr: std::env::var("CREATE_FIX_PR")
                    .map(|v| v.to_lowercase() == "true")
                    .unwrap_or(false),
            },
        })
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            provider: ModelProvider::Anthropic,
            anthropic_api_key: None,
            openai_api_key: None,
            deepseek_api_key: None,
            deepseek_endpoint: None,
            timeout_secs: 240,
        }
    }
}
