//! Order Data

use crate::domain::products::records::ProductUuid;

/// A request to put a product into a customer's cart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrderItem {
    pub email: String,
    pub address: String,
    pub postcode: String,
    pub product_uuid: ProductUuid,
    pub product_name: String,
    pub quantity: u32,

    /// Line price the caller expects: unit price times quantity.
    pub price: u64,
}
