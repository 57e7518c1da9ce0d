use std::{env, net::SocketAddr, str::FromStr};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingVar(String),
    #[error("Invalid environment variable format for {0}: {1}")]
    InvalidVar(String, String),
    #[error(transparent)]
    DotEnvError(#[from] dotenvy::Error),
}

const DEFAULT_IDENTITY_ENDPOINT: &str = "https://identitytoolkit.googleapis.com";

/// Which repository backs the site.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StoreBackend {
    DynamoDb,
    /// Process-local and empty on start; for development without AWS.
    Memory,
}

impl FromStr for StoreBackend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "dynamodb" => Ok(StoreBackend::DynamoDb),
            "memory" => Ok(StoreBackend::Memory),
            other => Err(ConfigError::InvalidVar(
                "PROMPT_STORE".into(),
                format!("expected 'dynamodb' or 'memory', got '{}'", other),
            )),
        }
    }
}

#[derive(Clone, Debug)]
pub struct Config {
    pub bind_address: SocketAddr,
    pub store: StoreBackend,
    pub prompts_table: String,
    // Store region as string for simplicity here, aws_clients can convert
    pub aws_region: String,
    // Optional endpoint for LocalStack / DynamoDB Local
    pub localstack_endpoint: Option<String>,
    pub site: SiteConfig,
    pub identity_api_key: String,
    pub identity_auth_domain: String,
    pub identity_endpoint: String,
    /// Identities granted publish rights by the allow-list policy.
    pub admin_uids: Vec<String>,
}

/// Web settings for the browser-side Firebase sign-in popup.
#[derive(Clone, Debug)]
pub struct SignInConfig {
    pub api_key: String,
    pub auth_domain: String,
}

/// Values the page renderers need for absolute URLs and titles.
#[derive(Clone, Debug)]
pub struct SiteConfig {
    pub base_url: String,
    pub name: String,
}

impl SiteConfig {
    /// Joins a site-relative path onto the configured base URL.
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

impl Config {
    /// Loads configuration from environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if present (ignores errors, relies on env vars otherwise)
        dotenvy::dotenv().ok();
        Self::from_source(|key| env::var(key).ok())
    }

    pub fn sign_in(&self) -> SignInConfig {
        SignInConfig {
            api_key: self.identity_api_key.clone(),
            auth_domain: self.identity_auth_domain.clone(),
        }
    }

    /// Builds the configuration from an arbitrary key lookup.
    pub fn from_source<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let bind_address_str = lookup("BIND_ADDRESS").unwrap_or_else(|| "0.0.0.0:3000".to_string());
        let bind_address = SocketAddr::from_str(&bind_address_str)
            .map_err(|e| ConfigError::InvalidVar("BIND_ADDRESS".into(), e.to_string()))?;

        let store = match lookup("PROMPT_STORE") {
            Some(raw) => raw.parse()?,
            None => StoreBackend::DynamoDb,
        };

        let prompts_table = lookup("PROMPTS_TABLE").unwrap_or_else(|| "prompts".to_string());
        if prompts_table.trim().is_empty() {
            return Err(ConfigError::InvalidVar("PROMPTS_TABLE".into(), "must not be empty".into()));
        }

        let aws_region = lookup("AWS_DEFAULT_REGION").unwrap_or_else(|| "us-east-1".to_string());

        // Allow overriding endpoint for localstack/testing
        let localstack_endpoint = lookup("AWS_ENDPOINT_URL").filter(|s| !s.is_empty());

        let base_url = lookup("SITE_URL")
            .unwrap_or_else(|| "http://localhost:3000".to_string())
            .trim_end_matches('/')
            .to_string();
        let name = lookup("SITE_NAME").unwrap_or_else(|| "AI Gemini Prompt Gallery".to_string());

        let identity_api_key = lookup("IDENTITY_API_KEY")
            .filter(|s| !s.is_empty())
            .ok_or_else(|| ConfigError::MissingVar("IDENTITY_API_KEY".into()))?;
        let identity_auth_domain = lookup("IDENTITY_AUTH_DOMAIN")
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .ok_or_else(|| ConfigError::MissingVar("IDENTITY_AUTH_DOMAIN".into()))?;
        let identity_endpoint = lookup("IDENTITY_ENDPOINT")
            .unwrap_or_else(|| DEFAULT_IDENTITY_ENDPOINT.to_string())
            .trim_end_matches('/')
            .to_string();

        let admin_uids = lookup("ADMIN_UIDS")
            .map(|raw| {
                raw.split(',')
                    .map(str::trim)
                    .filter(|uid| !uid.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        Ok(Config {
            bind_address,
            store,
            prompts_table,
            aws_region,
            localstack_endpoint,
            site: SiteConfig { base_url, name },
            identity_api_key,
            identity_auth_domain,
            identity_endpoint,
            admin_uids,
        })
    }
}
