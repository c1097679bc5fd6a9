use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::collections::HashMap;
use std::sync::OnceLock;

/// Maps a subunit quote currency (pence, cents) onto its major currency.
#[derive(Debug, Clone)]
pub struct CurrencyNormalizationRule {
    pub major_code: &'static str,
    pub factor: Decimal,
    pub label: &'static str,
}

static CURRENCY_RULES: OnceLock<HashMap<&'static str, CurrencyNormalizationRule>> = OnceLock::new();

fn get_rules() -> &'static HashMap<&'static str, CurrencyNormalizationRule> {
    CURRENCY_RULES.get_or_init(|| {
        let subunit = |major_code, factor, label| CurrencyNormalizationRule {
            major_code,
            factor,
            label,
        };

        HashMap::from([
            ("GBp", subunit("GBP", dec!(0.01), "Pence")),
            ("GBX", subunit("GBP", dec!(0.01), "Pence")),
            ("ZAc", subunit("ZAR", dec!(0.01), "SA Cents")),
            ("ZAC", subunit("ZAR", dec!(0.01), "SA Cents")),
            ("ILA", subunit("ILS", dec!(0.01), "Agorot")),
            // 1000 fils to the dinar
            ("KWF", subunit("KWD", dec!(0.001), "Fils")),
        ])
    })
}

/// Returns the normalization rule for a given currency code, if one exists.
///
/// Lookups are case-sensitive: `GBp` is pence while `GBP` is pounds.
pub fn get_normalization_rule(code: &str) -> Option<&'static CurrencyNormalizationRule> {
    get_rules().get(code)
}

/// Converts an amount from its potentially minor unit into its major unit equivalent
/// and returns the normalized major currency code.
pub fn normalize_amount(amount: Decimal, currency: &str) -> (Decimal, &str) {
    match get_normalization_rule(currency) {
        Some(rule) => (amount * rule.factor, rule.major_code),
        None => (amount, currency),
    }
}

/// Returns the major currency code for FX lookups without mutating the amount.
pub fn normalize_currency_code(currency: &str) -> &str {
    match get_normalization_rule(currency) {
        Some(rule) => rule.major_code,
        None => currency,
    }
}

/// Normalized, upper-cased currency code used as an exchange-rate key.
pub fn canonical_currency(currency: &str) -> String {
    normalize_currency_code(currency.trim()).to_ascii_uppercase()
}
