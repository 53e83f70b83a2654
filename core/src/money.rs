// bookpay/src/money.rs

/// Formats a price held in minor currency units (paise) for display,
/// e.g. `99900` -> `"₹999.00"`.
pub fn format_price(price_minor: u64) -> String {
  format!("₹{}.{:02}", price_minor / 100, price_minor % 100)
}
