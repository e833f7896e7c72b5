/// Currency symbols recognised in price text, checked in this order.
pub const CURRENCY_SYMBOLS: &[(&str, &str)] = &[
    ("€", "EUR"),
    ("$", "USD"),
    ("£", "GBP"),
    ("¥", "JPY"),
    ("₹", "INR"),
    ("CHF", "CHF"),
];

/// Splits price text into the numeric residue and the currency code of the
/// first symbol found. Text without a known symbol is returned unchanged.
pub fn split_currency(price_text: &str) -> (String, Option<&'static str>) {
    for (symbol, code) in CURRENCY_SYMBOLS {
        if price_text.contains(symbol) {
            return (price_text.replace(symbol, "").trim().to_string(), Some(*code));
        }
    }
    (price_text.to_string(), None)
}

/// Removes every known currency symbol.
pub fn strip_currency_symbols(price_text: &str) -> String {
    CURRENCY_SYMBOLS
        .iter()
        .fold(price_text.to_string(), |text, (symbol, _)| text.replace(symbol, ""))
        .trim()
        .to_string()
}
