//! Get Order Handler

use std::sync::Arc;

use salvo::{
    oapi::{ToSchema, extract::PathParam},
    prelude::*,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use brew_orders_app::domain::orders::models::{Order, OrderItem};

use crate::{extensions::*, orders::errors::into_status_error, state::State};

/// Order Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct OrderResponse {
    /// The unique identifier of the order
    pub uuid: Uuid,

    pub email: String,
    pub address: String,
    pub postcode: String,

    /// `PENDING` or `READY_FOR_DELIVERY`
    pub status: String,

    /// The lines in the order, oldest first
    pub items: Vec<OrderItemResponse>,

    /// The date and time the order was created
    pub created_at: String,
}

impl From<Order> for OrderResponse {
    fn from(order: Order) -> Self {
        OrderResponse {
            uuid: order.uuid.into(),
            email: order.email,
            address: order.address,
            postcode: order.postcode,
            status: order.status.to_string(),
            items: order.items.into_iter().map(OrderItemResponse::from).collect(),
            created_at: order.created_at.to_string(),
        }
    }
}

/// Order Item Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct OrderItemResponse {
    /// The unique identifier of the order item
    pub uuid: Uuid,

    pub product_uuid: Uuid,
    pub product_name: String,
    pub quantity: u32,

    /// Line subtotal
    pub price: u64,
}

impl From<OrderItem> for OrderItemResponse {
    fn from(item: OrderItem) -> Self {
        Self {
            uuid: item.uuid.into(),
            product_uuid: item.product_uuid.into(),
            product_name: item.product_name,
            quantity: item.quantity,
            price: item.price,
        }
    }
}

/// Get Order Handler
///
/// Returns the customer's open cart with its lines.
#[endpoint(
    tags("orders"),
    summary = "Get Order",
    responses(
        (status_code = StatusCode::OK, description = "Order found"),
        (status_code = StatusCode::NOT_FOUND, description = "Order not found"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
#[tracing::instrument(
    name = "orders.get",
    skip(email, depot),
    fields(order_uuid = tracing::field::Empty, items_count = tracing::field::Empty),
    err
)]
pub(crate) async fn handler(
    email: PathParam<String>,
    depot: &mut Depot,
) -> Result<Json<OrderResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;

    let order = state
        .app
        .orders
        .get_order(&email.into_inner())
        .await
        .map_err(into_status_error)?;

    let span = tracing::Span::current();

    span.record("order_uuid", tracing::field::display(order.uuid));
    span.record("items_count", order.items.len());

    Ok(Json(order.into()))
}
