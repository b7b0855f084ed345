//! App Router

use salvo::Router;

use crate::orders;

pub(crate) fn app_router() -> Router {
    Router::with_path("orders")
        .post(orders::create::handler)
        .push(
            Router::with_path("items/{item}")
                .put(orders::items::update::handler)
                .delete(orders::items::delete::handler),
        )
        .push(Router::with_path("{email}").get(orders::get::handler))
}
