//! Constant-product pool arithmetic.
//!
//! Every helper widens to `u128` for intermediate products and returns `None`
//! on division by zero or when the result does not fit in a `u64`.

/// Fees are expressed in basis points of this denominator.
pub const FEE_DENOMINATOR: u64 = 10_000;

/// Integer square root (Babylonian method), rounded down.
pub fn sqrt(y: u64) -> u64 {
    if y < 4 {
        return if y == 0 { 0 } else { 1 };
    }
    let mut z = y;
    let mut x = y / 2 + 1;
    while x < z {
        z = x;
        x = (y / x + x) / 2;
    }
    z
}

/// Bitwise integer square root, the same digit-by-digit method the pool's
/// Move module uses on chain.
pub fn sui_sqrt(x: u64) -> u64 {
    let mut bit = 1u128 << 64;
    let mut res = 0u128;
    let mut x = x as u128;

    while bit != 0 {
        if x >= res + bit {
            x -= res + bit;
            res = (res >> 1) + bit;
        } else {
            res >>= 1;
        }
        bit >>= 2;
    }

    res as u64
}

fn mul_div(a: u64, b: u64, denominator: u64) -> Option<u64> {
    if denominator == 0 {
        return None;
    }
    let value = (a as u128) * (b as u128) / (denominator as u128);
    u64::try_from(value).ok()
}

/// Amount of B matching `input_a` at the current reserve ratio.
pub fn quote(reserve_a: u64, reserve_b: u64, input_a: u64) -> Option<u64> {
    mul_div(input_a, reserve_b, reserve_a)
}

/// Output of swapping `dx` into a pool with reserves `x`/`y`, charging
/// `fee_bps` basis points on the input.
pub fn get_input(dx: u64, x: u64, y: u64, fee_bps: u64) -> Option<u64> {
    let fee_factor = FEE_DENOMINATOR.checked_sub(fee_bps)? as u128;
    let dx_after_fee = fee_factor * dx as u128;
    let numerator = dx_after_fee.checked_mul(y as u128)?;
    let denominator = (FEE_DENOMINATOR as u128 * x as u128).checked_add(dx_after_fee)?;
    if denominator == 0 {
        return None;
    }
    u64::try_from(numerator / denominator).ok()
}

/// LP tokens minted for depositing `dx`/`dy` into reserves `x`/`y`.
pub fn minted_lp_after_increase_liquidity(
    x: u64,
    y: u64,
    dx: u64,
    dy: u64,
    lp_supply: u64,
) -> Option<u64> {
    let from_x = mul_div(dx, lp_supply, x)?;
    let from_y = mul_div(dy, lp_supply, y)?;
    Some(from_x.min(from_y))
}

/// Reserves returned for burning `lp_value` of `lp_supply` LP tokens.
pub fn withdraw_liquidity(
    reserve_x: u64,
    reserve_y: u64,
    lp_value: u64,
    lp_supply: u64,
) -> Option<(u64, u64)> {
    Some((
        mul_div(reserve_x, lp_value, lp_supply)?,
        mul_div(reserve_y, lp_value, lp_supply)?,
    ))
}
