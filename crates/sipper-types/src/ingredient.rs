use serde::{Deserialize, Serialize};

use crate::amount::Amount;
use crate::error::TypeError;
use crate::id::EntityId;
use crate::listed::Listed;
use crate::unit::Unit;

/// Round a price to currency scale (two decimals, half away from zero).
pub fn round_currency(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// A purchasable ingredient: one container of something pourable.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Ingredient {
    id: Option<EntityId>,
    pub name: String,
    /// Alcohol by volume as a fraction (0.4 for 40%).
    pub alcohol_content: f64,
    pub container_size: Amount,
    pub container_price: f64,
    /// Where the ingredient is bought.
    pub store: String,
    pub comment: String,
}

impl Ingredient {
    /// A new, unsaved ingredient with zeroed measurements.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            alcohol_content: 0.0,
            container_size: Amount::zero(),
            container_price: 0.0,
            store: String::new(),
            comment: String::new(),
        }
    }

    pub fn with_container(mut self, size: Amount, price: f64) -> Self {
        self.container_size = size;
        self.container_price = price;
        self
    }

    pub fn with_alcohol_content(mut self, fraction: f64) -> Self {
        self.alcohol_content = fraction;
        self
    }

    pub fn with_store(mut self, store: impl Into<String>) -> Self {
        self.store = store.into();
        self
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = comment.into();
        self
    }

    /// Attach the store-assigned identifier.
    ///
    /// Re-assigning the identifier the entity already carries is a no-op;
    /// assigning a different one fails.
    pub fn assign_id(mut self, id: EntityId) -> Result<Self, TypeError> {
        match self.id {
            Some(current) if current != id => Err(TypeError::IdentifierReassigned {
                current,
                requested: id,
            }),
            _ => {
                self.id = Some(id);
                Ok(self)
            }
        }
    }

    /// Price of one `unit` of this ingredient.
    ///
    /// An empty container has no meaningful unit price and yields zero.
    pub fn unit_price(&self, unit: Unit) -> f64 {
        let units_per_container = self.container_size.to_unit(unit);
        if units_per_container == 0.0 {
            return 0.0;
        }
        self.container_price / units_per_container
    }
}

impl Listed for Ingredient {
    fn id(&self) -> Option<EntityId> {
        self.id
    }

    fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gin() -> Ingredient {
        Ingredient::new("Gin")
            .with_container(Amount::new(700.0, Unit::ML), 25.0)
            .with_alcohol_content(0.375)
            .with_store("Alko")
    }

    #[test]
    fn new_ingredient_is_unsaved() {
        let ingredient = Ingredient::new("Lime");
        assert!(ingredient.is_new());
        assert!(ingredient.container_size.is_zero());
        assert_eq!(ingredient.store, "");
    }

    #[test]
    fn unit_price_per_unit() {
        let gin = gin();
        assert!((gin.unit_price(Unit::CL) - 25.0 / 70.0).abs() < 1e-12);
        assert!((gin.unit_price(Unit::L) - 25.0 / 0.7).abs() < 1e-9);
        assert!((gin.unit_price(Unit::ML) - 25.0 / 700.0).abs() < 1e-12);
    }

    #[test]
    fn unit_price_of_empty_container_is_zero() {
        let empty = Ingredient::new("Air").with_container(Amount::zero(), 3.0);
        assert_eq!(empty.unit_price(Unit::CL), 0.0);
    }

    #[test]
    fn assign_id_once() {
        let saved = gin().assign_id(EntityId::new(4)).unwrap();
        assert_eq!(saved.id(), Some(EntityId::new(4)));

        let same = saved.clone().assign_id(EntityId::new(4)).unwrap();
        assert_eq!(same, saved);

        let err = saved.assign_id(EntityId::new(5)).unwrap_err();
        assert_eq!(
            err,
            TypeError::IdentifierReassigned {
                current: EntityId::new(4),
                requested: EntityId::new(5),
            }
        );
    }

    #[test]
    fn equality_compares_amounts_canonically() {
        let a = gin();
        let b = gin().with_container(Amount::new(70.0, Unit::CL), 25.0);
        assert_eq!(a, b);
    }

    #[test]
    fn round_currency_two_decimals() {
        assert_eq!(round_currency(3.14159), 3.14);
        assert_eq!(round_currency(2.675_000_1), 2.68);
        assert_eq!(round_currency(-1.005_01), -1.01);
    }
}
