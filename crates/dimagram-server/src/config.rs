use std::net::SocketAddr;

use axum::http::{header, HeaderValue, Method};
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;

use crate::error::{ServerError, ServerResult};

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    /// Origins allowed to call the API from a browser.
    pub cors_origins: Vec<String>,
    /// Upper bound on a request body, multipart framing included.
    pub max_request_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 8080)),
            cors_origins: vec!["http://localhost:3000".into()],
            max_request_bytes: 16 * 1024 * 1024,
        }
    }
}

impl ServerConfig {
    pub fn cors_layer(&self) -> ServerResult<CorsLayer> {
        let origins = self
            .cors_origins
            .iter()
            .map(|origin| {
                HeaderValue::from_str(origin)
                    .map_err(|_| ServerError::Config(format!("invalid CORS origin: {origin}")))
            })
            .collect::<ServerResult<Vec<_>>>()?;
        Ok(CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers([header::CONTENT_TYPE]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let c = ServerConfig::default();
        assert_eq!(c.bind_addr, "127.0.0.1:8080".parse::<SocketAddr>().unwrap());
        assert_eq!(c.cors_origins, vec!["http://localhost:3000".to_string()]);
        assert!(c.cors_layer().is_ok());
    }

    #[test]
    fn rejects_unprintable_origin() {
        let c = ServerConfig {
            cors_origins: vec!["http://bad\norigin".into()],
            ..Default::default()
        };
        assert!(matches!(c.cors_layer(), Err(ServerError::Config(_))));
    }
}
