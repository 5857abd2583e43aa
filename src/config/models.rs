use crate::endpoints::ApiVariant;
use crate::humanize::HumanDuration;
use crate::transport::HttpConfig;
use serde::{Deserialize, Serialize};

/// Top-level configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub worker: WorkerConfig,
    #[serde(default)]
    pub polling: PollingConfig,
    #[serde(default)]
    pub http: HttpSection,
    #[serde(default)]
    pub run: RunConfig,
}

/// Default worker target for items that do not name one
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct WorkerConfig {
    pub url: Option<String>,
    #[serde(default)]
    pub api_variant: ApiVariant,
    /// API key (loaded from environment, not from config file)
    #[serde(skip)]
    pub api_key: Option<String>,
}

/// Poll loop defaults
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PollingConfig {
    #[serde(default = "default_interval")]
    pub interval: HumanDuration,
    #[serde(default = "default_timeout")]
    pub timeout: HumanDuration,
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            interval: default_interval(),
            timeout: default_timeout(),
        }
    }
}

fn default_interval() -> HumanDuration {
    HumanDuration::from_secs(5)
}

fn default_timeout() -> HumanDuration {
    HumanDuration::from_secs(600)
}

/// Outbound HTTP settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct HttpSection {
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout: HumanDuration,
    #[serde(default = "default_request_timeout")]
    pub request_timeout: HumanDuration,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for HttpSection {
    fn default() -> Self {
        Self {
            connect_timeout: default_connect_timeout(),
            request_timeout: default_request_timeout(),
            user_agent: default_user_agent(),
        }
    }
}

impl HttpSection {
    pub fn to_http_config(&self) -> HttpConfig {
        HttpConfig {
            connect_timeout: self.connect_timeout.as_duration(),
            request_timeout: self.request_timeout.as_duration(),
            user_agent: self.user_agent.clone(),
        }
    }
}

fn default_connect_timeout() -> HumanDuration {
    HttpConfig::default().connect_timeout.into()
}

fn default_request_timeout() -> HumanDuration {
    HttpConfig::default().request_timeout.into()
}

fn default_user_agent() -> String {
    HttpConfig::default().user_agent
}

/// Run-wide behavior flags, used as item parameter defaults
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RunConfig {
    #[serde(default)]
    pub continue_on_fail: bool,
    #[serde(default = "default_true")]
    pub wait_for_completion: bool,
    #[serde(default = "default_true")]
    pub auto_download: bool,
    #[serde(default)]
    pub emit_progress: bool,
    #[serde(default)]
    pub fail_on_remote_error: bool,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            continue_on_fail: false,
            wait_for_completion: true,
            auto_download: true,
            emit_progress: false,
            fail_on_remote_error: false,
        }
    }
}

fn default_true() -> bool {
    true
}
