//! Tests for the fee engine.

use super::*;
use crate::config::FeesConfig;
use std::str::FromStr;

fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

fn engine() -> FeeEngine {
    let yaml = r#"
default_commission_rate: "0.001"
exchange_rates:
  kraken: "0.0026"
discount_tiers:
  holder: "0.25"
credit_unit_value: "0.5"
"#;
    let cfg: FeesConfig = serde_yaml::from_str(yaml).unwrap();
    FeeEngine::from_config(&cfg)
}

#[test]
fn test_quote_base_case() {
    // amount=1, price=100, rate 0.1%, no discount:
    // total=100, commission=0.1, credit=0.1/0.5=0.2
    let breakdown = engine().quote(dec("1"), dec("100"), "binance", None).unwrap();

    assert_eq!(breakdown.total, dec("100"));
    assert_eq!(breakdown.commission, dec("0.1"));
    assert_eq!(breakdown.credit_required, dec("0.2"));
}

#[test]
fn test_quote_uses_exchange_override() {
    let breakdown = engine().quote(dec("1"), dec("100"), "kraken", None).unwrap();
    assert_eq!(breakdown.commission, dec("0.26"));
}

#[test]
fn test_quote_applies_discount_tier() {
    // commission 0.1 with 25% off -> 0.075
    let breakdown = engine()
        .quote(dec("1"), dec("100"), "binance", Some("holder"))
        .unwrap();

    assert_eq!(breakdown.commission, dec("0.075"));
    assert_eq!(breakdown.credit_required, dec("0.15"));
}

#[test]
fn test_quote_unknown_tier() {
    let result = engine().quote(dec("1"), dec("100"), "binance", Some("platinum"));
    assert!(matches!(result, Err(FeeError::UnknownTier(_))));
}

#[test]
fn test_quote_rejects_non_positive_amount() {
    let result = engine().quote(dec("0"), dec("100"), "binance", None);
    assert!(matches!(result, Err(FeeError::InvalidInput(_))));

    let result = engine().quote(dec("-1"), dec("100"), "binance", None);
    assert!(matches!(result, Err(FeeError::InvalidInput(_))));
}

#[test]
fn test_quote_rejects_non_positive_price() {
    let result = engine().quote(dec("1"), dec("0"), "binance", None);
    assert!(matches!(result, Err(FeeError::InvalidInput(_))));
}

#[test]
fn test_quote_rounds_half_up_at_currency_scale() {
    let yaml = r#"
default_commission_rate: "0.001"
credit_unit_value: "1"
currency_scale: 2
"#;
    let cfg: FeesConfig = serde_yaml::from_str(yaml).unwrap();
    let engine = FeeEngine::from_config(&cfg);

    // total = 125, commission raw = 0.125 -> rounds half-up to 0.13
    let breakdown = engine.quote(dec("1.25"), dec("100"), "binance", None).unwrap();
    assert_eq!(breakdown.commission, dec("0.13"));
}

#[test]
fn test_quote_matches_formula() {
    // commission = amount * price * rate * (1 - discount) at full scale
    let engine = engine();
    let amount = dec("2.5");
    let price = dec("43.17");
    let breakdown = engine
        .quote(amount, price, "binance", Some("holder"))
        .unwrap();

    let expected = (amount * price * dec("0.001") * dec("0.75"))
        .round_dp_with_strategy(8, RoundingStrategy::MidpointAwayFromZero);
    assert_eq!(breakdown.commission, expected);
}

#[test]
fn test_base_rate_default_and_override() {
    let engine = engine();
    assert_eq!(engine.base_rate("binance"), dec("0.001"));
    assert_eq!(engine.base_rate("kraken"), dec("0.0026"));
}
