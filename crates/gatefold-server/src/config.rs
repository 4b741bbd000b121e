//! Server configuration for Gatefold.
//!
//! Loads configuration from environment variables with sensible defaults.
//! All settings can be overridden via `GATEFOLD_*` environment variables.

use std::net::SocketAddr;

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind the HTTP listener to.
    pub bind_addr: SocketAddr,
    /// Log level filter (e.g., `info`, `debug`, `warn`).
    pub log_level: String,
    /// Upstream workspace settings.
    pub workspace: WorkspaceConfig,
}

/// Upstream document-workspace settings.
///
/// The credentials authenticate the signed-URL exchange for private
/// attachments. Both may be absent — attachment resolution then fails
/// gracefully and public content keeps working.
#[derive(Debug, Clone)]
pub struct WorkspaceConfig {
    /// Base URL of the workspace API.
    pub api_base: String,
    /// Session token (`token_v2` cookie value).
    pub token: Option<String>,
    /// Active-user identifier sent alongside the token.
    pub active_user: Option<String>,
}

/// Default bind port.
const DEFAULT_PORT: u16 = 8600;

/// Default workspace API base.
const DEFAULT_API_BASE: &str = "https://www.notion.so/api/v3";

impl ServerConfig {
    /// Load configuration from environment variables.
    ///
    /// Environment variables:
    /// - `PORT` — port to bind on (binds to `0.0.0.0`)
    /// - `GATEFOLD_BIND_ADDR` — full bind address (overrides `PORT`,
    ///   default: `127.0.0.1:8600`)
    /// - `GATEFOLD_LOG_LEVEL` — log filter (default: `info`)
    /// - `GATEFOLD_WORKSPACE_API` — upstream API base URL
    /// - `GATEFOLD_WORKSPACE_TOKEN` — upstream session token (optional)
    /// - `GATEFOLD_WORKSPACE_USER` — upstream active-user id (optional)
    #[must_use]
    pub fn from_env() -> Self {
        // Priority: GATEFOLD_BIND_ADDR > PORT > default 127.0.0.1:8600
        let bind_addr = if let Ok(addr) = std::env::var("GATEFOLD_BIND_ADDR") {
            addr.parse()
                .unwrap_or_else(|_| SocketAddr::from(([127, 0, 0, 1], DEFAULT_PORT)))
        } else if let Ok(port_str) = std::env::var("PORT") {
            let port: u16 = port_str.parse().unwrap_or(DEFAULT_PORT);
            SocketAddr::from(([0, 0, 0, 0], port))
        } else {
            SocketAddr::from(([127, 0, 0, 1], DEFAULT_PORT))
        };

        let log_level =
            std::env::var("GATEFOLD_LOG_LEVEL").unwrap_or_else(|_| "info".to_owned());

        let workspace = WorkspaceConfig {
            api_base: std::env::var("GATEFOLD_WORKSPACE_API")
                .unwrap_or_else(|_| DEFAULT_API_BASE.to_owned()),
            token: std::env::var("GATEFOLD_WORKSPACE_TOKEN").ok(),
            active_user: std::env::var("GATEFOLD_WORKSPACE_USER").ok(),
        };

        Self {
            bind_addr,
            log_level,
            workspace,
        }
    }
}
