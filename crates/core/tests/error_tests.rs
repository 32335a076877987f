// ═══════════════════════════════════════════════════════════════════
// Error Tests — CoreError variants, Display formatting, From impls
// ═══════════════════════════════════════════════════════════════════

use portfolio_tracker_core::errors::CoreError;

// ── Display formatting ──────────────────────────────────────────────

mod display {
    use super::*;

    #[test]
    fn validation() {
        let err = CoreError::Validation("quantity must be positive".into());
        assert_eq!(
            err.to_string(),
            "Holding validation failed: quantity must be positive"
        );
    }

    #[test]
    fn holding_not_found() {
        let err = CoreError::HoldingNotFound("abc-123".into());
        assert_eq!(err.to_string(), "Holding not found: abc-123");
    }

    #[test]
    fn market_data() {
        let err = CoreError::MarketData {
            provider: "brapi".into(),
            message: "rate limited".into(),
        };
        assert_eq!(err.to_string(), "Market data error (brapi): rate limited");
    }

    #[test]
    fn market_data_empty_provider() {
        let err = CoreError::MarketData {
            provider: String::new(),
            message: "unknown".into(),
        };
        assert_eq!(err.to_string(), "Market data error (): unknown");
    }

    #[test]
    fn network() {
        let err = CoreError::Network("connection refused".into());
        assert_eq!(err.to_string(), "Network error: connection refused");
    }

    #[test]
    fn no_provider() {
        assert_eq!(
            CoreError::NoProvider.to_string(),
            "No quote provider registered"
        );
    }

    #[test]
    fn persistence() {
        let err = CoreError::Persistence("row locked".into());
        assert_eq!(err.to_string(), "Persistence error: row locked");
    }

    #[test]
    fn serialization() {
        let err = CoreError::Serialization("buffer overflow".into());
        assert_eq!(err.to_string(), "Serialization error: buffer overflow");
    }

    #[test]
    fn deserialization() {
        let err = CoreError::Deserialization("unexpected EOF".into());
        assert_eq!(err.to_string(), "Deserialization error: unexpected EOF");
    }
}

// ── From impls ──────────────────────────────────────────────────────

mod conversions {
    use super::*;

    #[test]
    fn from_serde_json() {
        let parse_err = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let err: CoreError = parse_err.into();
        match err {
            CoreError::Deserialization(_) => {}
            other => panic!("Expected Deserialization, got {:?}", other),
        }
    }

    #[test]
    fn error_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<CoreError>();
    }
}
