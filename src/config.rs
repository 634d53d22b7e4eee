use thiserror::Error;

use crate::navigation::Routes;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

#[derive(Debug, Clone)]
pub struct Config {
    /// Dispatch `auto-login` once the effects are running
    pub auto_login: bool,
    pub node: NodeConfig,
    pub remote: RemoteConfig,
    pub routes: Routes,
}

#[derive(Debug, Clone)]
pub struct NodeConfig {
    pub bind_address: String,
    pub data_dir: String,
}

#[derive(Debug, Clone)]
pub struct RemoteConfig {
    pub auth_api_key: String,
    pub auth_base_url: String,
    pub collection_url: String,
    pub http_timeout_seconds: u64,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1:8080".to_string(),
            data_dir: "./data".to_string(),
        }
    }
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            auth_api_key: String::new(),
            auth_base_url: "https://www.googleapis.com/identitytoolkit/v3/relyingparty".to_string(),
            collection_url: "https://ng-course-recipe-book-65f10.firebaseio.com/recipes.json"
                .to_string(),
            http_timeout_seconds: 10,
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build configuration from an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let node_defaults = NodeConfig::default();
        let remote_defaults = RemoteConfig::default();
        let route_defaults = Routes::default();

        let http_timeout_seconds = match lookup("HTTP_TIMEOUT_SECONDS") {
            Some(raw) => raw.trim().parse().map_err(|_| {
                ConfigError::ValidationError(format!(
                    "HTTP_TIMEOUT_SECONDS must be a whole number of seconds, got {raw:?}"
                ))
            })?,
            None => remote_defaults.http_timeout_seconds,
        };

        let auto_login = lookup("AUTO_LOGIN")
            .map(|v| v == "true" || v == "1")
            .unwrap_or(true);

        let config = Config {
            auto_login,
            node: NodeConfig {
                bind_address: lookup("BIND_ADDRESS").unwrap_or(node_defaults.bind_address),
                data_dir: lookup("DATA_DIR").unwrap_or(node_defaults.data_dir),
            },
            remote: RemoteConfig {
                auth_api_key: lookup("AUTH_API_KEY").unwrap_or_default(),
                auth_base_url: lookup("AUTH_BASE_URL").unwrap_or(remote_defaults.auth_base_url),
                collection_url: lookup("COLLECTION_URL")
                    .unwrap_or(remote_defaults.collection_url),
                http_timeout_seconds,
            },
            routes: Routes {
                home: lookup("HOME_ROUTE").unwrap_or(route_defaults.home),
                login: lookup("LOGIN_ROUTE").unwrap_or(route_defaults.login),
            },
        };

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.remote.auth_api_key.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "AUTH_API_KEY cannot be empty".to_string(),
            ));
        }

        for (name, url) in [
            ("AUTH_BASE_URL", &self.remote.auth_base_url),
            ("COLLECTION_URL", &self.remote.collection_url),
        ] {
            if !(url.starts_with("https://") || url.starts_with("http://")) {
                return Err(ConfigError::ValidationError(format!(
                    "{name} must be an http(s) URL, got {url:?}"
                )));
            }
        }

        for (name, route) in [
            ("HOME_ROUTE", &self.routes.home),
            ("LOGIN_ROUTE", &self.routes.login),
        ] {
            if !route.starts_with('/') {
                return Err(ConfigError::ValidationError(format!(
                    "{name} must start with '/', got {route:?}"
                )));
            }
        }

        if self.remote.http_timeout_seconds == 0 {
            tracing::warn!("HTTP_TIMEOUT_SECONDS is 0; remote calls will fail immediately");
        }

        Ok(())
    }
}
