use bigdecimal::{BigDecimal, One, Zero};

/// Decimal places kept on stored amounts
pub const AMOUNT_SCALE: i64 = 2;

/// 10^-scale
fn unit(scale: i64) -> BigDecimal {
    (0..scale).fold(BigDecimal::one(), |acc, _| acc / BigDecimal::from(10))
}

/// Round to `scale` places, ties away from zero (474.975 -> 474.98, -0.125 -> -0.13).
pub fn round_half_away_from_zero(value: &BigDecimal, scale: i64) -> BigDecimal {
    // with_scale truncates toward zero
    let truncated = value.with_scale(scale);
    let remainder = (value - &truncated).abs();
    let step = unit(scale);
    let half = &step / BigDecimal::from(2);

    if remainder < half {
        truncated
    } else if *value < BigDecimal::zero() {
        (truncated - step).with_scale(scale)
    } else {
        (truncated + step).with_scale(scale)
    }
}

/// price × liters rounded to cents
pub fn line_amount(rate_per_liter: &BigDecimal, liters: &BigDecimal) -> BigDecimal {
    round_half_away_from_zero(&(rate_per_liter * liters), AMOUNT_SCALE)
}
