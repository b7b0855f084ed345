//! Test Helpers

use jiff::Timestamp;

use crate::domain::{
    orders::{
        data::NewOrderItem,
        records::{OrderRecord, OrderStatus, OrderUuid},
    },
    products::records::{ProductRecord, ProductUuid},
};

pub(crate) fn product_record(name: &str, price: u64) -> ProductRecord {
    ProductRecord {
        uuid: ProductUuid::new(),
        name: name.to_string(),
        price,
        created_at: Timestamp::UNIX_EPOCH,
        updated_at: Timestamp::UNIX_EPOCH,
    }
}

/// A correctly priced request for `quantity` units of `product`.
pub(crate) fn new_item(email: &str, product: &ProductRecord, quantity: u32) -> NewOrderItem {
    NewOrderItem {
        email: email.to_string(),
        address: "1 Roastery Lane".to_string(),
        postcode: "BN1 1AA".to_string(),
        product_uuid: product.uuid,
        product_name: product.name.clone(),
        quantity,
        price: product.price.saturating_mul(u64::from(quantity)),
    }
}

pub(crate) fn order_record(email: &str, status: OrderStatus, created_at: Timestamp) -> OrderRecord {
    OrderRecord {
        uuid: OrderUuid::new(),
        email: email.to_string(),
        address: "1 Roastery Lane".to_string(),
        postcode: "BN1 1AA".to_string(),
        status,
        created_at,
        updated_at: created_at,
    }
}
