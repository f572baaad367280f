use crate::utils::error::{ProfileError, Result};
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_TIMEOUT_MS: u64 = 1000;
pub const DEFAULT_CHANNEL_CAPACITY: usize = 128;
pub const DEFAULT_EXCHANGE: &str = "profile";
pub const DEFAULT_CONTENT_TYPE: &str = "text/plain";
pub const CREATED_TOPIC: &str = "profile.created";
pub const UPDATED_TOPIC: &str = "profile.updated";
pub const DELETED_TOPIC: &str = "profile.deleted";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub service: ServiceConfig,
    pub broker: BrokerConfig,
    pub dispatcher: DispatcherConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Deadline for one service call, load through persist.
    pub timeout_ms: u64,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            timeout_ms: DEFAULT_TIMEOUT_MS,
        }
    }
}

impl ServiceConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BrokerConfig {
    pub url: Option<String>,
    pub exchange: String,
    pub content_type: String,
    pub created_topic: String,
    pub updated_topic: String,
    pub deleted_topic: String,
    pub mandatory: bool,
    pub immediate: bool,
}

impl Default for BrokerConfig {
    fn default() -> Self {
        Self {
            url: None,
            exchange: DEFAULT_EXCHANGE.to_string(),
            content_type: DEFAULT_CONTENT_TYPE.to_string(),
            created_topic: CREATED_TOPIC.to_string(),
            updated_topic: UPDATED_TOPIC.to_string(),
            deleted_topic: DELETED_TOPIC.to_string(),
            mandatory: false,
            immediate: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DispatcherConfig {
    /// Per-channel buffer; a full channel makes the sender wait.
    pub capacity: usize,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CHANNEL_CAPACITY,
        }
    }
}

impl AppConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(ProfileError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| ProfileError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${AMQP_URL})
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| ProfileError::Internal {
            message: format!("invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn validate_config(&self) -> Result<()> {
        if self.service.timeout_ms == 0 {
            return Err(ProfileError::InvalidConfigValueError {
                field: "service.timeout_ms".to_string(),
                value: self.service.timeout_ms.to_string(),
                reason: "Value must be at least 1".to_string(),
            });
        }

        if let Some(url) = &self.broker.url {
            validation::validate_broker_url("broker.url", url)?;
        }
        validation::validate_non_empty_string("broker.exchange", &self.broker.exchange)?;
        validation::validate_non_empty_string("broker.content_type", &self.broker.content_type)?;
        validation::validate_topic("broker.created_topic", &self.broker.created_topic)?;
        validation::validate_topic("broker.updated_topic", &self.broker.updated_topic)?;
        validation::validate_topic("broker.deleted_topic", &self.broker.deleted_topic)?;

        validation::validate_positive_number("dispatcher.capacity", self.dispatcher.capacity, 1)?;

        Ok(())
    }
}

impl Validate for AppConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
