use alloy::primitives::U256;

/// Render atomic token units as a fixed-point decimal, e.g. `1234500` with 6
/// decimals is `"1.234500"`.
pub fn format_token_amount(amount: U256, decimals: u32) -> String {
    if decimals == 0 {
        return amount.to_string();
    }
    let scale = U256::from(10u64).pow(U256::from(decimals));
    let whole = amount / scale;
    let frac = amount % scale;
    format!("{whole}.{frac:0>width$}", frac = frac.to_string(), width = decimals as usize)
}

/// How many calls at `price_units` each a balance covers.
pub fn estimated_calls(balance: U256, price_units: u64) -> U256 {
    if price_units == 0 {
        return U256::ZERO;
    }
    balance / U256::from(price_units)
}

/// Units moved from `before` to `after`; zero if the balance grew.
pub fn spent(before: U256, after: U256) -> U256 {
    before.saturating_sub(after)
}
