//! Order Item Handlers

mod handlers;

pub(crate) use handlers::*;
