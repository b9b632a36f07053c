//! Quantity formatting
//!
//! Renders amounts the way a cook writes them: `3`, `1/2`, `1 1/2`.

use fraction::{BigInt, Ratio, ToPrimitive};

/// Largest denominator used when rendering fractions
pub const MAX_DENOMINATOR: u128 = 16;

/// Keeps `limit_denominator`'s intermediate products inside `u128`
const MAX_EXACT_DENOMINATOR: u128 = 1 << 120;

/// Render an amount as a whole number or a simple fraction.
///
/// Zero renders as an empty string. Non-integral values are approximated by
/// the closest fraction with a denominator of at most 16.
pub fn format_quantity(amount: f64) -> String {
    if amount == 0.0 {
        return String::new();
    }
    if !amount.is_finite() || amount < 0.0 {
        return format_decimal(amount);
    }
    if amount.fract() == 0.0 {
        return format!("{:.0}", amount);
    }

    let Some((numer, denom)) = exact_ratio(amount) else {
        return format_decimal(amount);
    };
    let (p, q) = limit_denominator(numer, denom, MAX_DENOMINATOR);

    if p > q {
        let whole = p / q;
        let rem = p % q;
        if rem == 0 {
            whole.to_string()
        } else {
            format!("{} {}/{}", whole, rem, q)
        }
    } else if q == 1 {
        p.to_string()
    } else {
        format!("{}/{}", p, q)
    }
}

/// Two decimals with trailing zeros and a dangling point removed
fn format_decimal(amount: f64) -> String {
    let fixed = format!("{:.2}", amount);
    if fixed.contains('.') {
        fixed.trim_end_matches('0').trim_end_matches('.').to_string()
    } else {
        fixed
    }
}

/// Exact value of a positive, finite, non-integral float as `numer / denom`
/// in lowest terms. Values whose denominator exceeds 2^120 are far below
/// 1/16 and come back as zero.
fn exact_ratio(value: f64) -> Option<(u128, u128)> {
    let ratio = Ratio::<BigInt>::from_float(value)?;
    let Some(denom) = ratio.denom().to_u128().filter(|d| *d <= MAX_EXACT_DENOMINATOR) else {
        return Some((0, 1));
    };
    Some((ratio.numer().to_u128()?, denom))
}

/// Closest fraction to `numer / denom` whose denominator is at most `max_denom`.
///
/// Walks the continued-fraction convergents, then picks between the last
/// convergent and the best semiconvergent; ties go to the convergent.
fn limit_denominator(numer: u128, denom: u128, max_denom: u128) -> (u128, u128) {
    if denom <= max_denom {
        return (numer, denom);
    }

    let (mut p0, mut q0, mut p1, mut q1) = (0u128, 1u128, 1u128, 0u128);
    let (mut n, mut d) = (numer, denom);
    loop {
        let a = n / d;
        let q2 = q0 + a * q1;
        if q2 > max_denom {
            break;
        }
        (p0, q0, p1, q1) = (p1, q1, p0 + a * p1, q2);
        (n, d) = (d, n - a * d);
    }

    let k = (max_denom - q0) / q1;
    if 2 * d * (q0 + k * q1) <= denom {
        (p1, q1)
    } else {
        (p0 + k * p1, q0 + k * q1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_zero_and_integers() {
        assert_eq!(format_quantity(0.0), "");
        assert_eq!(format_quantity(3.0), "3");
        assert_eq!(format_quantity(250.0), "250");
    }

    #[test]
    fn test_format_simple_fractions() {
        assert_eq!(format_quantity(0.5), "1/2");
        assert_eq!(format_quantity(0.25), "1/4");
        assert_eq!(format_quantity(0.75), "3/4");
        assert_eq!(format_quantity(1.0 / 3.0), "1/3");
    }

    #[test]
    fn test_format_mixed_numbers() {
        assert_eq!(format_quantity(1.5), "1 1/2");
        assert_eq!(format_quantity(2.0 + 2.0 / 3.0), "2 2/3");
        assert_eq!(format_quantity(1.0 + 2.0 / 3.0), "1 2/3");
    }

    #[test]
    fn test_format_approximates_to_sixteenths() {
        assert_eq!(format_quantity(0.3), "3/10");
        assert_eq!(format_quantity(0.12), "1/8");
        assert_eq!(format_quantity(0.66), "2/3");
        assert_eq!(format_quantity(2.99), "3");
        assert_eq!(format_quantity(0.01), "0");
        assert_eq!(format_quantity(1e-30), "0");
        assert_eq!(format_quantity(f64::MIN_POSITIVE), "0");
    }

    #[test]
    fn test_format_non_finite() {
        assert_eq!(format_quantity(f64::INFINITY), "inf");
        assert_eq!(format_quantity(-1.25), "-1.25");
    }

    #[test]
    fn test_limit_denominator_exact_when_small() {
        assert_eq!(limit_denominator(3, 8, 16), (3, 8));
        assert_eq!(limit_denominator(1, 3, 16), (1, 3));
    }
}
