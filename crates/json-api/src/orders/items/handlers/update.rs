//! Update Order Item Handler

use std::sync::Arc;

use salvo::{
    oapi::{
        ToSchema,
        extract::{JsonBody, PathParam},
    },
    prelude::*,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{extensions::*, orders::errors::into_status_error, state::State};

/// Update Order Item Request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct UpdateOrderItemRequest {
    /// New quantity; zero or less removes the line
    pub quantity: i64,
}

/// Update Order Item Handler
///
/// Sets the quantity of an order line and reprices it from the product's
/// current unit price.
#[endpoint(
    tags("orders"),
    summary = "Update Order Item",
    responses(
        (status_code = StatusCode::OK, description = "Order item updated"),
        (status_code = StatusCode::NOT_FOUND, description = "Order item not found"),
        (status_code = StatusCode::BAD_REQUEST, description = "Bad Request"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
#[tracing::instrument(
    name = "orders.modify_item",
    skip(item, json, depot),
    fields(item_uuid = tracing::field::Empty, quantity = tracing::field::Empty),
    err
)]
pub(crate) async fn handler(
    item: PathParam<Uuid>,
    json: JsonBody<UpdateOrderItemRequest>,
    depot: &mut Depot,
) -> Result<StatusCode, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let item = item.into_inner();
    let request = json.into_inner();

    let span = tracing::Span::current();

    span.record("item_uuid", tracing::field::display(item));
    span.record("quantity", request.quantity);

    state
        .app
        .orders
        .modify_item(item.into(), request.quantity)
        .await
        .map_err(into_status_error)?;

    Ok(StatusCode::OK)
}
