//! Configuration parsing
//!
//! TOML (primary) and JSON formats.

use contracts::{ContractError, ServiceBlueprint};

/// Configuration file format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// TOML (recommended)
    Toml,
    Json,
}

impl ConfigFormat {
    /// Infer the format from a file extension
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "toml" => Some(Self::Toml),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

pub fn parse_toml(content: &str) -> Result<ServiceBlueprint, ContractError> {
    toml::from_str(content).map_err(|e| ContractError::ConfigParse {
        message: format!("TOML parse error: {e}"),
        source: Some(Box::new(e)),
    })
}

pub fn parse_json(content: &str) -> Result<ServiceBlueprint, ContractError> {
    serde_json::from_str(content).map_err(|e| ContractError::ConfigParse {
        message: format!("JSON parse error: {e}"),
        source: Some(Box::new(e)),
    })
}

pub fn parse(content: &str, format: ConfigFormat) -> Result<ServiceBlueprint, ContractError> {
    match format {
        ConfigFormat::Toml => parse_toml(content),
        ConfigFormat::Json => parse_json(content),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::ProviderKind;

    #[test]
    fn test_parse_toml_minimal() {
        let content = r#"
[request]
timeout_ms = 250

[[slots]]
provider = "1"
fallback = "2"

[[slots]]
provider = "2"

[[providers]]
id = "1"

[[providers]]
id = "2"
kind = "unavailable"
latency_ms = 10
"#;
        let bp = parse_toml(content).unwrap();
        assert_eq!(bp.request.timeout_ms, 250);
        assert_eq!(bp.slots.len(), 2);
        assert_eq!(bp.slots[0].fallback.as_deref(), Some("2"));
        assert!(bp.slots[1].fallback.is_none());
        assert_eq!(bp.providers[1].kind, ProviderKind::Unavailable);
        assert_eq!(bp.providers[1].latency_ms, 10);
    }

    #[test]
    fn test_parse_json_minimal() {
        let content = r#"{
            "server": { "listen_addr": "0.0.0.0:9090" },
            "slots": [{ "provider": "a" }],
            "providers": [{ "id": "a", "kind": "sample" }]
        }"#;
        let bp = parse_json(content).unwrap();
        assert_eq!(bp.server.listen_addr, "0.0.0.0:9090");
        assert_eq!(bp.server.shutdown_timeout_secs, 15);
    }

    #[test]
    fn test_parse_toml_syntax_error() {
        let err = parse_toml("slots = [[[").unwrap_err();
        assert!(matches!(err, ContractError::ConfigParse { .. }));
    }

    #[test]
    fn test_unknown_provider_kind_rejected() {
        let content = r#"
[[slots]]
provider = "1"

[[providers]]
id = "1"
kind = "carrier_pigeon"
"#;
        assert!(parse_toml(content).is_err());
    }

    #[test]
    fn test_format_from_extension() {
        assert_eq!(ConfigFormat::from_extension("toml"), Some(ConfigFormat::Toml));
        assert_eq!(ConfigFormat::from_extension("JSON"), Some(ConfigFormat::Json));
        assert_eq!(ConfigFormat::from_extension("yaml"), None);
    }
}
