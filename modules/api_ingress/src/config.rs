use serde::{Deserialize, Serialize};

/// Configuration of the HTTP host (`modules.api_ingress`).
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ApiIngressConfig {
    /// Listen address; falls back to `server.host:server.port` when unset.
    #[serde(default)]
    pub bind_addr: Option<String>,
    /// Serve the OpenAPI document at `/openapi.json`.
    #[serde(default)]
    pub enable_docs: bool,
    #[serde(default)]
    pub cors_enabled: bool,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    #[serde(default = "default_body_limit_bytes")]
    pub body_limit_bytes: usize,
}

impl Default for ApiIngressConfig {
    fn default() -> Self {
        Self {
            bind_addr: None,
            enable_docs: false,
            cors_enabled: false,
            request_timeout_secs: default_request_timeout_secs(),
            body_limit_bytes: default_body_limit_bytes(),
        }
    }
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_body_limit_bytes() -> usize {
    16 * 1024 * 1024
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_section_uses_defaults() {
        let cfg: ApiIngressConfig = serde_json::from_value(serde_json::json!({})).unwrap();
        assert_eq!(cfg.bind_addr, None);
        assert!(!cfg.enable_docs);
        assert!(!cfg.cors_enabled);
        assert_eq!(cfg.request_timeout_secs, 30);
        assert_eq!(cfg.body_limit_bytes, 16 * 1024 * 1024);
    }

    #[test]
    fn explicit_values_win() {
        let cfg: ApiIngressConfig = serde_json::from_value(serde_json::json!({
            "bind_addr": "0.0.0.0:9000",
            "enable_docs": true,
            "request_timeout_secs": 5
        }))
        .unwrap();
        assert_eq!(cfg.bind_addr.as_deref(), Some("0.0.0.0:9000"));
        assert!(cfg.enable_docs);
        assert_eq!(cfg.request_timeout_secs, 5);
    }
}
