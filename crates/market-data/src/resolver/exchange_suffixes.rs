//! Yahoo Finance exchange suffix resolution.
//!
//! Yahoo identifies non-US listings by appending an exchange suffix to the
//! ticker (`SHOP.TO`, `VOD.L`). The ledger stores exchanges either as a short
//! exchange name (`TSX`) or as an ISO 10383 MIC (`XTSE`); both are accepted.

use std::collections::HashMap;

use lazy_static::lazy_static;

use crate::models::Instrument;

/// Exchange code to Yahoo suffix. US exchanges carry no suffix and are
/// intentionally absent.
const YAHOO_EXCHANGE_SUFFIX_TABLE: &[(&str, &str)] = &[
    // North America
    ("TSX", ".TO"),
    ("XTSE", ".TO"),
    ("TSXV", ".V"),
    ("XTSX", ".V"),
    ("CSE", ".CN"),
    ("XCNQ", ".CN"),
    ("BMV", ".MX"),
    ("XMEX", ".MX"),
    // UK & Europe
    ("LSE", ".L"),
    ("XLON", ".L"),
    ("FRA", ".F"),
    ("XFRA", ".F"),
    ("XETRA", ".DE"),
    ("XETR", ".DE"),
    ("SIX", ".SW"),
    ("XSWX", ".SW"),
    ("EURONEXT", ".PA"),
    ("XPAR", ".PA"),
    ("XAMS", ".AS"),
    ("XBRU", ".BR"),
    ("XMIL", ".MI"),
    ("BME", ".MC"),
    ("XMAD", ".MC"),
    ("XSTO", ".ST"),
    ("XCSE", ".CO"),
    ("XOSL", ".OL"),
    ("XHEL", ".HE"),
    // Asia-Pacific
    ("HKEX", ".HK"),
    ("XHKG", ".HK"),
    ("ASX", ".AX"),
    ("XASX", ".AX"),
    ("NZX", ".NZ"),
    ("XNZE", ".NZ"),
    ("NSE", ".NS"),
    ("XNSE", ".NS"),
    ("BSE", ".BO"),
    ("XBOM", ".BO"),
    ("SGX", ".SI"),
    ("XSES", ".SI"),
    ("KRX", ".KS"),
    ("XKRX", ".KS"),
    ("KOSDAQ", ".KQ"),
    ("XKOS", ".KQ"),
    ("BURSA", ".KL"),
    ("XKLS", ".KL"),
    ("JPX", ".T"),
    ("XTKS", ".T"),
    ("SSE", ".SS"),
    ("XSHG", ".SS"),
    ("SZSE", ".SZ"),
    ("XSHE", ".SZ"),
    ("TWSE", ".TW"),
    ("XTAI", ".TW"),
    ("SET", ".BK"),
    ("XBKK", ".BK"),
    ("IDX", ".JK"),
    ("XIDX", ".JK"),
    // Other
    ("JSE", ".JO"),
    ("XJSE", ".JO"),
    ("TASE", ".TA"),
    ("XTAE", ".TA"),
    ("B3", ".SA"),
    ("BVMF", ".SA"),
];

lazy_static! {
    static ref YAHOO_EXCHANGE_SUFFIXES: HashMap<&'static str, &'static str> =
        YAHOO_EXCHANGE_SUFFIX_TABLE.iter().copied().collect();
}

/// Get the Yahoo suffix for an exchange code (case-insensitive).
pub fn yahoo_suffix_for_exchange(exchange: &str) -> Option<&'static str> {
    let code = exchange.trim().to_ascii_uppercase();
    YAHOO_EXCHANGE_SUFFIXES.get(code.as_str()).copied()
}

/// Build the Yahoo ticker for an instrument.
///
/// An explicit provider symbol wins verbatim; otherwise the exchange suffix
/// is appended to the symbol; otherwise the bare symbol is used.
pub fn yahoo_ticker(instrument: &Instrument) -> String {
    let provider_symbol = instrument.provider_symbol.trim();
    if !provider_symbol.is_empty() {
        return provider_symbol.to_string();
    }

    let symbol = instrument.symbol.trim();
    match yahoo_suffix_for_exchange(&instrument.exchange) {
        Some(suffix) => format!("{}{}", symbol, suffix),
        None => symbol.to_string(),
    }
}

/// Yahoo ticker for a forex pair (e.g. `USDMYR=X`).
pub fn yahoo_fx_ticker(from: &str, to: &str) -> String {
    format!(
        "{}{}=X",
        from.to_ascii_uppercase(),
        to.to_ascii_uppercase()
    )
}
