//! Add Order Item Handler

use std::sync::Arc;

use salvo::{
    http::header::LOCATION,
    oapi::{ToSchema, extract::JsonBody},
    prelude::*,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use brew_orders_app::domain::{
    orders::{
        OrdersServiceError, data::NewOrderItem, models::AddedOrderItem, records::MAX_QUANTITY,
    },
    products::ProductsService,
};

use crate::{
    extensions::*,
    orders::errors::{into_status_error, product_status_error},
    state::State,
};

/// Add Order Item Request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct CreateOrderItemRequest {
    /// Customer email; identifies the cart
    pub email: String,

    /// Delivery address, used when the cart is created
    pub address: String,

    /// Delivery postcode, used when the cart is created
    pub postcode: String,

    pub product_uuid: Uuid,

    /// Must match the stored product name
    pub product_name: String,

    pub quantity: u32,

    /// Line price: unit price times quantity
    pub price: u64,
}

impl From<CreateOrderItemRequest> for NewOrderItem {
    fn from(request: CreateOrderItemRequest) -> Self {
        NewOrderItem {
            email: request.email,
            address: request.address,
            postcode: request.postcode,
            product_uuid: request.product_uuid.into(),
            product_name: request.product_name,
            quantity: request.quantity,
            price: request.price,
        }
    }
}

/// Order Item Added Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct OrderItemAddedResponse {
    pub uuid: Uuid,
    pub order_uuid: Uuid,
    pub quantity: u32,
    pub price: u64,

    /// `true` when an existing line for the product was topped up
    pub merged: bool,
}

impl From<AddedOrderItem> for OrderItemAddedResponse {
    fn from(item: AddedOrderItem) -> Self {
        Self {
            uuid: item.uuid.into(),
            order_uuid: item.order_uuid.into(),
            quantity: item.quantity,
            price: item.price,
            merged: item.merged,
        }
    }
}

/// Reject requests naming an unknown product or quoting the wrong price
/// before they reach the cart.
async fn check_product(
    products: &dyn ProductsService,
    request: &CreateOrderItemRequest,
) -> Result<(), StatusError> {
    if request.quantity > MAX_QUANTITY {
        return Err(into_status_error(OrdersServiceError::InvalidQuantity));
    }

    let product = products
        .get_product(request.product_uuid.into())
        .await
        .map_err(product_status_error)?;

    if product.name != request.product_name {
        return Err(into_status_error(OrdersServiceError::ProductNotFound));
    }

    match product.line_price(request.quantity) {
        Some(expected) if expected == request.price => Ok(()),
        Some(expected) => Err(into_status_error(OrdersServiceError::PriceMismatch {
            expected,
            actual: request.price,
        })),
        None => Err(into_status_error(OrdersServiceError::InvalidQuantity)),
    }
}

/// Add Order Item Handler
///
/// Adds a product to the customer's open cart, creating the cart on first use.
#[endpoint(
    tags("orders"),
    summary = "Add Order Item",
    responses(
        (status_code = StatusCode::CREATED, description = "Order item added"),
        (status_code = StatusCode::NOT_FOUND, description = "Product not found"),
        (status_code = StatusCode::BAD_REQUEST, description = "Bad Request"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
#[tracing::instrument(
    name = "orders.add_item",
    skip(json, depot, res),
    fields(
        product_uuid = tracing::field::Empty,
        quantity = tracing::field::Empty,
        order_uuid = tracing::field::Empty,
        merged = tracing::field::Empty
    ),
    err
)]
pub(crate) async fn handler(
    json: JsonBody<CreateOrderItemRequest>,
    depot: &mut Depot,
    res: &mut Response,
) -> Result<Json<OrderItemAddedResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let request = json.into_inner();

    let span = tracing::Span::current();

    span.record("product_uuid", tracing::field::display(request.product_uuid));
    span.record("quantity", request.quantity);

    check_product(state.app.products.as_ref(), &request).await?;

    let location = format!("/orders/{}", request.email);

    let added = state
        .app
        .orders
        .add_item(request.into())
        .await
        .map_err(into_status_error)?;

    span.record("order_uuid", tracing::field::display(added.order_uuid));
    span.record("merged", added.merged);

    res.add_header(LOCATION, location, true)
        .or_500("failed to set location header")?
        .status_code(StatusCode::CREATED);

    Ok(Json(added.into()))
}
