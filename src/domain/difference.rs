use rust_decimal::Decimal;
use serde::Serialize;

use crate::domain::value_objects::ProductKey;

/// A per-key mismatch between the old and new side of a run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Difference {
    pub key: ProductKey,
    pub old_value: Decimal,
    pub new_value: Decimal,
    /// Always `new_value - old_value`; positive means the value went up.
    pub delta: Decimal,
}

impl Difference {
    pub fn new(key: ProductKey, old_value: Decimal, new_value: Decimal) -> Self {
        Difference {
            key,
            old_value,
            new_value,
            delta: new_value - old_value,
        }
    }

    pub fn is_increase(&self) -> bool {
        self.delta.is_sign_positive() && !self.delta.is_zero()
    }
}

/// Differences from one join, and whether a cap stopped the scan while
/// further differing keys remained.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DifferenceSet {
    pub differences: Vec<Difference>,
    pub truncated: bool,
}

impl DifferenceSet {
    pub fn len(&self) -> usize {
        self.differences.len()
    }

    pub fn is_empty(&self) -> bool {
        self.differences.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delta_is_new_minus_old() {
        let d = Difference::new(ProductKey::from("B"), Decimal::from(10), Decimal::from(7));
        assert_eq!(d.delta, Decimal::from(-3));
        assert!(!d.is_increase());

        let up = Difference::new(ProductKey::from("B"), Decimal::from(7), Decimal::from(10));
        assert_eq!(up.delta, Decimal::from(3));
        assert!(up.is_increase());
    }
}
