use rust_decimal::Decimal;

/// Wholesale to retail conversion applied to supplier prices before they are
/// compared with the storefront.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetailPricing {
    pub markup: Decimal,
    /// 0 disables rounding.
    pub rounding_step: Decimal,
}

impl Default for RetailPricing {
    fn default() -> Self {
        Self {
            markup: Decimal::new(160, 2),
            rounding_step: Decimal::TEN,
        }
    }
}

impl RetailPricing {
    pub fn new(markup: Decimal, rounding_step: Decimal) -> Self {
        Self {
            markup,
            rounding_step,
        }
    }

    /// `ceil(b2b * markup / step) * step - 1`, so 50.00 becomes 79.
    /// `None` when the result does not fit a `Decimal`.
    pub fn retail_price(&self, b2b: Decimal) -> Option<Decimal> {
        if b2b.is_zero() {
            return Some(Decimal::ZERO);
        }
        let marked_up = b2b.checked_mul(self.markup)?;
        if self.rounding_step.is_zero() {
            return Some(marked_up.normalize());
        }
        let retail = marked_up
            .checked_div(self.rounding_step)?
            .ceil()
            .checked_mul(self.rounding_step)?
            .checked_sub(Decimal::ONE)?;
        Some(retail.normalize())
    }
}
