pub mod config;
pub mod logging;
pub mod error;
pub mod validation;
pub mod delimited;
pub mod catalog;
pub mod bom;

pub use config::*;
pub use logging::*;
pub use error::*;
pub use validation::*;
pub use catalog::{FlatFileCatalog, PartCatalog, PartIndex};
pub use bom::*;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.bom.max_depth, 5);
        assert_eq!(config.bom.cycle_policy, CyclePolicy::DepthLimit);
    }

    #[test]
    fn test_error_handling() {
        let error = PartforgeError::validation("ipn", "test message");
        assert_eq!(error.error_code(), "INVALID_INPUT");
        assert_eq!(error.http_status_code(), 400);

        let response = ErrorResponse::from(error);
        assert_eq!(response.message, "test message");
        assert_eq!(response.details, Some(serde_json::json!({ "field": "ipn" })));
    }

    #[test]
    fn test_cycle_policy_deserializes_snake_case() {
        let policy: CyclePolicy = serde_json::from_str("\"depth_limit\"").unwrap();
        assert_eq!(policy, CyclePolicy::DepthLimit);
        let policy: CyclePolicy = serde_json::from_str("\"reject\"").unwrap();
        assert_eq!(policy, CyclePolicy::Reject);
    }

    #[test]
    fn test_engine_rejects_invalid_config() {
        let mut config = BomConfig::default();
        config.assembly_prefixes.clear();
        let err = BomEngine::from_config(&config).unwrap_err();
        assert_eq!(err.error_code(), "CONFIGURATION_ERROR");
    }
}
