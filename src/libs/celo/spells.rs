//! Small conversions shared by the provider, the contract wrapper and
//! the binary: hex quantities as JSON-RPC writes them, and human
//! readable amounts for a network's native currency.
use alloy::primitives::utils::{format_units, parse_units};
use alloy::primitives::U256;

use super::error::{Error, Result};
use super::network::NativeCurrency;

/// `0x`-prefixed lowercase hex without leading zeros ("0x0" for zero).
pub fn hex_quantity(value: U256) -> String {
    format!("0x{value:x}")
}

/// Parse a decimal amount ("1.5") into base units.
pub fn parse_amount(amount: &str, decimals: u8) -> Result<U256> {
    let parsed = parse_units(amount.trim(), decimals)
        .map_err(|e| Error::Amount(format!("bad amount `{amount}`: {e}")))?;
    Ok(parsed.into())
}

/// Format base units with `decimals` places, trailing zeros trimmed.
/// More than 77 decimals is rejected.
pub fn format_amount(amount: U256, decimals: u8) -> Result<String> {
    let formatted = format_units(amount, decimals)
        .map_err(|e| Error::Amount(format!("cannot format with {decimals} decimals: {e}")))?;
    if !formatted.contains('.') {
        return Ok(formatted);
    }
    Ok(formatted
        .trim_end_matches('0')
        .trim_end_matches('.')
        .to_string())
}

/// `format_amount` plus the currency symbol, e.g. "1.5 CELO".
pub fn format_native(amount: U256, currency: &NativeCurrency) -> Result<String> {
    Ok(format!("{} {}", format_amount(amount, currency.decimals)?, currency.symbol))
}
