//! Tests for config module.

use super::*;
use rust_decimal::Decimal;
use std::io::Write;
use std::str::FromStr;
use std::time::Duration;
use tempfile::NamedTempFile;

// ==================== Duration parsing tests ====================

#[test]
fn test_parse_duration_seconds() {
    let d = duration::parse_duration("30s").unwrap();
    assert_eq!(d, Duration::from_secs(30));
}

#[test]
fn test_parse_duration_minutes() {
    let d = duration::parse_duration("5m").unwrap();
    assert_eq!(d, Duration::from_secs(300));
}

#[test]
fn test_parse_duration_milliseconds() {
    let d = duration::parse_duration("100ms").unwrap();
    assert_eq!(d, Duration::from_millis(100));
}

#[test]
fn test_parse_duration_empty() {
    let d = duration::parse_duration("").unwrap();
    assert_eq!(d, Duration::ZERO);
}

#[test]
fn test_parse_duration_invalid_unit() {
    let result = duration::parse_duration("10x");
    assert!(result.is_err());
    assert!(result.unwrap_err().contains("unknown duration unit"));
}

// ==================== YAML field loading tests ====================

/// Parse config from YAML string (for testing).
fn from_yaml(yaml: &str) -> Result<Config, ConfigError> {
    let config: Config = serde_yaml::from_str(yaml)?;
    config.validate()?;
    Ok(config)
}

fn minimal_valid_yaml() -> String {
    r#"
app:
  name: testengine
  env: development

fees:
  credit_unit_value: "0.5"

arbitrage:
  symbols:
    - BTC/USDT
  exchanges:
    - binance
    - kraken
"#
    .to_string()
}

#[test]
fn test_load_minimal_config_with_defaults() {
    let cfg = from_yaml(&minimal_valid_yaml()).unwrap();

    assert_eq!(cfg.app.name, "testengine");
    assert_eq!(
        cfg.fees.default_commission_rate,
        Decimal::from_str("0.001").unwrap()
    );
    assert_eq!(
        cfg.fees.discount_tiers.get("holder"),
        Some(&Decimal::from_str("0.25").unwrap())
    );
    assert_eq!(cfg.fees.currency_scale, 8);
    assert_eq!(
        cfg.arbitrage.min_profit_percent,
        Decimal::from_str("0.5").unwrap()
    );
    assert_eq!(
        cfg.arbitrage.volume_fraction,
        Decimal::from_str("0.001").unwrap()
    );
    assert_eq!(cfg.arbitrage.opportunity_ttl(), Duration::from_secs(300));
    assert_eq!(cfg.arbitrage.scan_interval(), Duration::from_secs(30));
}

#[test]
fn test_load_fees_fields() {
    let yaml = r#"
app:
  name: testengine
  env: development

fees:
  default_commission_rate: "0.002"
  exchange_rates:
    kraken: "0.0026"
  discount_tiers:
    holder: "0.25"
    vip: "0.5"
  credit_unit_value: "0.5"
  currency_scale: 6

arbitrage:
  symbols:
    - BTC/USDT
  exchanges:
    - binance
    - kraken
"#;
    let cfg = from_yaml(yaml).unwrap();

    assert_eq!(
        cfg.fees.default_commission_rate,
        Decimal::from_str("0.002").unwrap()
    );
    assert_eq!(
        cfg.fees.exchange_rates.get("kraken"),
        Some(&Decimal::from_str("0.0026").unwrap())
    );
    assert_eq!(
        cfg.fees.discount_tiers.get("vip"),
        Some(&Decimal::from_str("0.5").unwrap())
    );
    assert_eq!(cfg.fees.currency_scale, 6);
}

#[test]
fn test_load_arbitrage_and_execution_fields() {
    let yaml = r#"
app:
  name: testengine
  env: development

fees:
  credit_unit_value: "1"

arbitrage:
  symbols:
    - BTC/USDT
    - ETH/USDT
  exchanges:
    - binance
    - kraken
    - coinbase
  min_profit_percent: "1.5"
  volume_fraction: "0.002"
  opportunity_ttl: 2m
  scan_interval: 10s

execution:
  timeout: 15s
  max_pending_age: 90s
"#;
    let cfg = from_yaml(yaml).unwrap();

    assert_eq!(cfg.arbitrage.symbols.len(), 2);
    assert_eq!(cfg.arbitrage.exchanges.len(), 3);
    assert_eq!(
        cfg.arbitrage.min_profit_percent,
        Decimal::from_str("1.5").unwrap()
    );
    assert_eq!(cfg.arbitrage.opportunity_ttl(), Duration::from_secs(120));
    assert_eq!(cfg.arbitrage.scan_interval(), Duration::from_secs(10));

    let execution = cfg.execution.unwrap();
    assert_eq!(execution.timeout(), Duration::from_secs(15));
    assert_eq!(execution.max_pending_age(), Duration::from_secs(90));
}

#[test]
fn test_execution_defaults_when_unset() {
    let execution = ExecutionConfig::default();
    assert_eq!(execution.timeout(), Duration::from_secs(30));
    assert_eq!(execution.max_pending_age(), Duration::from_secs(120));
}

// ==================== Validation tests ====================

#[test]
fn test_validation_requires_symbols() {
    let yaml = r#"
app:
  name: testengine
  env: development

fees:
  credit_unit_value: "0.5"

arbitrage:
  symbols: []
  exchanges:
    - binance
    - kraken
"#;
    let err = from_yaml(yaml).unwrap_err();
    assert!(err.to_string().contains("at least one symbol"));
}

#[test]
fn test_validation_requires_two_exchanges() {
    let yaml = r#"
app:
  name: testengine
  env: development

fees:
  credit_unit_value: "0.5"

arbitrage:
  symbols:
    - BTC/USDT
  exchanges:
    - binance
"#;
    let err = from_yaml(yaml).unwrap_err();
    assert!(err.to_string().contains("at least two exchanges"));
}

#[test]
fn test_validation_rejects_zero_credit_unit_value() {
    let yaml = r#"
app:
  name: testengine
  env: development

fees:
  credit_unit_value: "0"

arbitrage:
  symbols:
    - BTC/USDT
  exchanges:
    - binance
    - kraken
"#;
    let err = from_yaml(yaml).unwrap_err();
    assert!(err.to_string().contains("credit_unit_value"));
}

#[test]
fn test_validation_rejects_bad_volume_fraction() {
    let yaml = r#"
app:
  name: testengine
  env: development

fees:
  credit_unit_value: "0.5"

arbitrage:
  symbols:
    - BTC/USDT
  exchanges:
    - binance
    - kraken
  volume_fraction: "1.5"
"#;
    let err = from_yaml(yaml).unwrap_err();
    assert!(err.to_string().contains("volume_fraction"));
}

#[test]
fn test_validation_rejects_bad_discount_tier() {
    let yaml = r#"
app:
  name: testengine
  env: development

fees:
  credit_unit_value: "0.5"
  discount_tiers:
    holder: "1.1"

arbitrage:
  symbols:
    - BTC/USDT
  exchanges:
    - binance
    - kraken
"#;
    let err = from_yaml(yaml).unwrap_err();
    assert!(err.to_string().contains("discount must be in [0, 1]"));
}

// ==================== File loading tests ====================

#[test]
fn test_load_from_file() {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(minimal_valid_yaml().as_bytes()).unwrap();

    let cfg = Config::load(file.path().to_str().unwrap()).unwrap();
    assert_eq!(cfg.app.name, "testengine");
}

#[test]
fn test_load_missing_file() {
    let result = Config::load("/nonexistent/config.yaml");
    assert!(matches!(result, Err(ConfigError::ReadFile(_))));
}
