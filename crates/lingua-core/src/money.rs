//! Money conversion.
//!
//! Prices travel over the wire in the currency's major unit (e.g. dollars) as
//! JSON numbers. Payments and gateway calls use integer minor units.

use crate::error::CatalogError;

/// Minor units per major unit.
pub const MINOR_UNITS_PER_MAJOR: i64 = 100;

/// Largest accepted amount in major units.
pub const MAX_AMOUNT: f64 = 1_000_000.0;

/// Convert a major-unit amount to minor units, rounding to the nearest unit.
///
/// # Errors
///
/// Returns `CatalogError::InvalidAmount` if the amount is not finite, not
/// positive, or larger than [`MAX_AMOUNT`].
pub fn to_minor_units(amount: f64) -> Result<i64, CatalogError> {
    if !amount.is_finite() {
        return Err(CatalogError::InvalidAmount(
            "amount must be a finite number".into(),
        ));
    }
    if amount <= 0.0 {
        return Err(CatalogError::InvalidAmount(
            "amount must be positive".into(),
        ));
    }
    if amount > MAX_AMOUNT {
        return Err(CatalogError::InvalidAmount(format!(
            "amount must not exceed {MAX_AMOUNT}"
        )));
    }

    // Bounded above, so the cast cannot truncate.
    #[allow(clippy::cast_possible_truncation)]
    let cents = (amount * 100.0).round() as i64;

    if cents == 0 {
        return Err(CatalogError::InvalidAmount(
            "amount is below the smallest currency unit".into(),
        ));
    }
    Ok(cents)
}

/// Convert minor units back to a major-unit amount for display.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn to_major_units(cents: i64) -> f64 {
    cents as f64 / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converts_and_rounds() {
        assert_eq!(to_minor_units(50.0).unwrap(), 5000);
        assert_eq!(to_minor_units(19.99).unwrap(), 1999);
        assert_eq!(to_minor_units(0.1).unwrap(), 10);
    }

    #[test]
    fn rejects_bad_amounts() {
        assert!(to_minor_units(0.0).is_err());
        assert!(to_minor_units(-5.0).is_err());
        assert!(to_minor_units(f64::INFINITY).is_err());
        assert!(to_minor_units(f64::NAN).is_err());
        assert!(to_minor_units(0.001).is_err());
        assert!(to_minor_units(MAX_AMOUNT + 1.0).is_err());
    }

    #[test]
    fn major_units_for_display() {
        assert!((to_major_units(1999) - 19.99).abs() < f64::EPSILON);
    }
}
