//! Product Records

use jiff::Timestamp;

use crate::uuids::TypedUuid;

/// Largest amount, in minor currency units, a price can hold.
pub const MAX_AMOUNT: u64 = i64::MAX.unsigned_abs();

/// Product UUID
pub type ProductUuid = TypedUuid<ProductRecord>;

/// Product Record
#[derive(Debug, Clone, PartialEq)]
pub struct ProductRecord {
    pub uuid: ProductUuid,
    pub name: String,

    /// Unit price in minor currency units.
    pub price: u64,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl ProductRecord {
    /// Subtotal for `quantity` units, or `None` past [`MAX_AMOUNT`].
    #[must_use]
    pub fn line_price(&self, quantity: u32) -> Option<u64> {
        self.price
            .checked_mul(u64::from(quantity))
            .filter(|price| *price <= MAX_AMOUNT)
    }
}
