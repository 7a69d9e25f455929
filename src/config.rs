use anyhow::{anyhow, Context, Result};
use std::env;

#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub errors: ErrorConfig,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub instance_id: String,
}

#[derive(Debug, Clone)]
pub struct ErrorConfig {
    /// Expose failure messages and stack traces in response bodies
    pub development_mode: bool,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        // Load .env file if it exists
        dotenvy::dotenv().ok();

        Ok(Config {
            server: ServerConfig {
                host: env::var("API_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                port: env::var("API_PORT")
                    .unwrap_or_else(|_| "8080".to_string())
                    .parse()
                    .context("API_PORT must be a valid port number")?,
                // Used only for debugging/observability. If unset, fall back to HOSTNAME if
                // present (e.g. Docker/Kubernetes), otherwise "unknown".
                instance_id: env::var("INSTANCE_ID")
                    .or_else(|_| env::var("HOSTNAME"))
                    .unwrap_or_else(|_| "unknown".to_string()),
            },
            errors: ErrorConfig {
                development_mode: parse_development_mode(
                    env::var("APP_DEVELOPMENT").ok().as_deref(),
                    env::var("APP_ENV").ok().as_deref(),
                )?,
            },
        })
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    /// Turn on backtrace capture for unstructured failures in development
    /// mode. Must run before any other thread exists.
    pub fn apply_backtrace_env(&self) -> bool {
        let enable = wants_lib_backtrace(
            self.errors.development_mode,
            env::var_os("RUST_BACKTRACE").is_some(),
            env::var_os("RUST_LIB_BACKTRACE").is_some(),
        );
        if enable {
            env::set_var("RUST_LIB_BACKTRACE", "1");
        }
        enable
    }
}

/// An explicit backtrace setting in the environment is left alone
fn wants_lib_backtrace(
    development_mode: bool,
    rust_backtrace: bool,
    rust_lib_backtrace: bool,
) -> bool {
    development_mode && !rust_backtrace && !rust_lib_backtrace
}

/// `APP_DEVELOPMENT` wins when set; otherwise `APP_ENV=development` enables it
fn parse_development_mode(app_development: Option<&str>, app_env: Option<&str>) -> Result<bool> {
    if let Some(flag) = app_development {
        return match flag.trim().to_ascii_lowercase().as_str() {
            "true" | "1" | "yes" => Ok(true),
            "false" | "0" | "no" | "" => Ok(false),
            other => Err(anyhow!(
                "APP_DEVELOPMENT must be a boolean, got '{}'",
                other
            )),
        };
    }

    Ok(app_env
        .map(|e| matches!(e.trim().to_ascii_lowercase().as_str(), "development" | "dev"))
        .unwrap_or(false))
}
