//! Delete Order Item Handler

use std::sync::Arc;

use salvo::{
    oapi::{ToSchema, extract::PathParam},
    prelude::*,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{extensions::*, orders::errors::into_status_error, state::State};

/// Order Item Deleted Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct OrderItemDeletedResponse {
    pub message: String,
}

/// Delete Order Item Handler
///
/// Removes an order line. The order itself is removed with its last line.
#[endpoint(
    tags("orders"),
    summary = "Delete Order Item",
    responses(
        (status_code = StatusCode::OK, description = "Order item deleted"),
        (status_code = StatusCode::NOT_FOUND, description = "Order item not found"),
        (status_code = StatusCode::BAD_REQUEST, description = "Bad Request"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    )
)]
#[tracing::instrument(
    name = "orders.remove_item",
    skip(item, depot),
    fields(item_uuid = tracing::field::Empty),
    err
)]
pub(crate) async fn handler(
    item: PathParam<Uuid>,
    depot: &mut Depot,
) -> Result<Json<OrderItemDeletedResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let item = item.into_inner();

    tracing::Span::current().record("item_uuid", tracing::field::display(item));

    state
        .app
        .orders
        .remove_item(item.into())
        .await
        .map_err(into_status_error)?;

    Ok(Json(OrderItemDeletedResponse {
        message: "Order deleted".to_string(),
    }))
}
