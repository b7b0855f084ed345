//! Test helpers.

use std::sync::Arc;

use brew_orders_app::{
    context::AppContext,
    domain::{
        orders::{
            MockOrdersService,
            models::{Order, OrderItem},
            records::{OrderItemUuid, OrderStatus, OrderUuid},
        },
        products::{
            MockProductsService,
            records::{ProductRecord, ProductUuid},
        },
    },
};
use jiff::Timestamp;
use salvo::{affix_state::inject, prelude::*};

use crate::state::State;

pub(crate) const TEST_EMAIL: &str = "jane@example.com";

pub(crate) fn make_state(orders: MockOrdersService, products: MockProductsService) -> Arc<State> {
    State::from_app_context(AppContext {
        orders: Arc::new(orders),
        products: Arc::new(products),
    })
}

pub(crate) fn orders_service(
    orders: MockOrdersService,
    products: MockProductsService,
    route: Router,
) -> Service {
    Service::new(
        Router::new()
            .hoop(inject(make_state(orders, products)))
            .push(route),
    )
}

pub(crate) fn strict_products_mock() -> MockProductsService {
    let mut products = MockProductsService::new();

    products.expect_get_product().never();

    products
}

pub(crate) fn make_product(name: &str, price: u64) -> ProductRecord {
    ProductRecord {
        uuid: ProductUuid::new(),
        name: name.to_string(),
        price,
        created_at: Timestamp::UNIX_EPOCH,
        updated_at: Timestamp::UNIX_EPOCH,
    }
}

pub(crate) fn make_order(email: &str, items: Vec<OrderItem>) -> Order {
    Order {
        uuid: OrderUuid::new(),
        email: email.to_string(),
        address: "1 Roastery Lane".to_string(),
        postcode: "BN1 1AA".to_string(),
        status: OrderStatus::Pending,
        items,
        created_at: Timestamp::UNIX_EPOCH,
    }
}

pub(crate) fn make_order_item(product: &ProductRecord, quantity: u32) -> OrderItem {
    OrderItem {
        uuid: OrderItemUuid::new(),
        quantity,
        price: product.price * u64::from(quantity),
        product_uuid: product.uuid,
        product_name: product.name.clone(),
    }
}
