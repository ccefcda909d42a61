use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::unit::Unit;

/// A measured volume: a quantity together with the unit it was entered in.
///
/// Equality and ordering look only at the canonical millilitre value, so
/// `5 CL == 50 ML`. The original unit is kept for display.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct Amount {
    quantity: f64,
    unit: Unit,
}

impl Amount {
    pub const fn new(quantity: f64, unit: Unit) -> Self {
        Self { quantity, unit }
    }

    /// The zero amount, expressed in millilitres.
    pub const fn zero() -> Self {
        Self::new(0.0, Unit::ML)
    }

    /// The quantity as entered.
    pub fn quantity(&self) -> f64 {
        self.quantity
    }

    /// The unit the amount was entered in.
    pub fn unit(&self) -> Unit {
        self.unit
    }

    /// Canonical value in millilitres.
    pub fn millilitres(&self) -> f64 {
        self.quantity * f64::from(self.unit.millilitres())
    }

    /// The quantity expressed in `target`.
    pub fn to_unit(&self, target: Unit) -> f64 {
        self.quantity * f64::from(self.unit.millilitres()) / f64::from(target.millilitres())
    }

    /// The same volume re-expressed in `target`.
    pub fn convert(&self, target: Unit) -> Self {
        Self::new(self.to_unit(target), target)
    }

    pub fn is_zero(&self) -> bool {
        self.quantity == 0.0
    }
}

impl Default for Amount {
    fn default() -> Self {
        Self::zero()
    }
}

impl PartialEq for Amount {
    fn eq(&self, other: &Self) -> bool {
        self.millilitres() == other.millilitres()
    }
}

impl PartialOrd for Amount {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.millilitres().partial_cmp(&other.millilitres())
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.quantity, self.unit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    // -----------------------------------------------------------------------
    // Conversion
    // -----------------------------------------------------------------------

    #[test]
    fn to_unit_uses_millilitre_factors() {
        let amount = Amount::new(5.0, Unit::CL);
        assert_eq!(amount.to_unit(Unit::ML), 50.0);
        assert_eq!(amount.to_unit(Unit::DL), 0.5);
        assert_eq!(amount.millilitres(), 50.0);
    }

    #[test]
    fn ounce_is_approximate() {
        assert_eq!(Amount::new(2.0, Unit::OZ).millilitres(), 58.0);
    }

    #[test]
    fn convert_keeps_value() {
        let litre = Amount::new(1.0, Unit::L);
        let in_cl = litre.convert(Unit::CL);
        assert_eq!(in_cl.unit(), Unit::CL);
        assert_eq!(in_cl.quantity(), 100.0);
        assert_eq!(in_cl, litre);
    }

    // -----------------------------------------------------------------------
    // Equality and ordering
    // -----------------------------------------------------------------------

    #[test]
    fn equal_across_units() {
        assert_eq!(Amount::new(5.0, Unit::CL), Amount::new(50.0, Unit::ML));
        assert_eq!(Amount::new(1.0, Unit::TBSP), Amount::new(3.0, Unit::TSP));
        assert_ne!(Amount::new(1.0, Unit::CL), Amount::new(1.0, Unit::ML));
    }

    #[test]
    fn ordering_uses_canonical_value() {
        assert!(Amount::new(1.0, Unit::DL) > Amount::new(9.0, Unit::CL));
        assert!(Amount::new(1.0, Unit::TSP) < Amount::new(1.0, Unit::TBSP));
    }

    #[test]
    fn display_keeps_original_unit() {
        assert_eq!(Amount::new(5.0, Unit::CL).to_string(), "5 CL");
        assert_eq!(Amount::new(1.5, Unit::OZ).to_string(), "1.5 OZ");
    }

    #[test]
    fn default_is_zero_millilitres() {
        let amount = Amount::default();
        assert!(amount.is_zero());
        assert_eq!(amount.unit(), Unit::ML);
    }

    fn any_unit() -> impl Strategy<Value = Unit> {
        prop::sample::select(Unit::ALL.to_vec())
    }

    proptest! {
        #[test]
        fn rescaled_amounts_are_equal(q in 0u32..100_000, unit in any_unit()) {
            let original = Amount::new(f64::from(q), unit);
            let in_ml = Amount::new(f64::from(q) * f64::from(unit.millilitres()), Unit::ML);
            prop_assert_eq!(original, in_ml);
        }

        #[test]
        fn ordering_follows_quantity_within_unit(a in 0u32..10_000, b in 0u32..10_000, unit in any_unit()) {
            let left = Amount::new(f64::from(a), unit);
            let right = Amount::new(f64::from(b), unit);
            prop_assert_eq!(left.partial_cmp(&right), Some(a.cmp(&b)));
        }
    }
}
