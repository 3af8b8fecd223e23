use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use url::Url;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(300);

const BASE_URL_VAR: &str = "EDUSLIDE_API_BASE_URL";
const CONTRACT_VAR: &str = "EDUSLIDE_API_CONTRACT";
const OUTPUT_DIR_VAR: &str = "EDUSLIDE_OUTPUT_DIR";

/// Which backend contract a deployment talks to. Chosen once, never sniffed
/// from responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ContractVersion {
    /// Every generation call answers with a ready presentation file.
    Binary,
    /// Generation answers with a JSON slide list; files come from export.
    #[default]
    Structured,
}

impl FromStr for ContractVersion {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "binary" | "a" => Ok(ContractVersion::Binary),
            "structured" | "b" => Ok(ContractVersion::Structured),
            other => Err(format!("unknown contract version: {other}")),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid base URL {0:?}: {1}")]
    BaseUrl(String, String),
    #[error("{0}")]
    Contract(String),
}

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: Url,
    pub contract: ContractVersion,
    pub timeout: Duration,
}

impl ClientConfig {
    pub fn new(base_url: &str, contract: ContractVersion) -> Result<Self, ConfigError> {
        Ok(Self {
            base_url: parse_base_url(base_url)?,
            contract,
            timeout: REQUEST_TIMEOUT,
        })
    }

    /// Build from `EDUSLIDE_API_BASE_URL` and `EDUSLIDE_API_CONTRACT`.
    pub fn from_env() -> Result<Self, ConfigError> {
        let base_url = std::env::var(BASE_URL_VAR).unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        Self::new(&base_url, contract_from_env()?)
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Absolute URL for an endpoint path such as `/api/generate/topic`.
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url.as_str().trim_end_matches('/'), path)
    }
}

pub fn contract_from_env() -> Result<ContractVersion, ConfigError> {
    match std::env::var(CONTRACT_VAR) {
        Ok(raw) => raw.parse().map_err(ConfigError::Contract),
        Err(_) => Ok(ContractVersion::default()),
    }
}

pub fn output_dir_from_env() -> PathBuf {
    std::env::var(OUTPUT_DIR_VAR)
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("."))
}

fn parse_base_url(raw: &str) -> Result<Url, ConfigError> {
    let trimmed = raw.trim().trim_end_matches('/');
    let parsed =
        Url::parse(trimmed).map_err(|e| ConfigError::BaseUrl(raw.to_string(), e.to_string()))?;
    match parsed.scheme() {
        "http" | "https" => Ok(parsed),
        other => Err(ConfigError::BaseUrl(
            raw.to_string(),
            format!("unsupported scheme {other}"),
        )),
    }
}
