//! App Router

use salvo::Router;

use crate::{appointments, auth, payments};

/// Routes served without a bearer token.
pub(crate) fn public_router() -> Router {
    Router::with_path("payments/webhook").post(payments::webhook::handler)
}

/// Routes that require an authenticated actor.
pub(crate) fn app_router() -> Router {
    Router::new()
        .hoop(auth::middleware::handler)
        .push(
            Router::with_path("appointments")
                .get(appointments::index::handler)
                .post(appointments::create::handler)
                .push(Router::with_path("my").get(appointments::my::handler))
                .push(Router::with_path("availability").get(appointments::availability::handler))
                .push(
                    Router::with_path("calendar/{month}").get(appointments::calendar::handler),
                )
                .push(
                    Router::with_path("{appointment}")
                        .get(appointments::get::handler)
                        .put(appointments::reschedule::handler)
                        .delete(appointments::cancel::delete_handler)
                        .push(Router::with_path("approve").put(appointments::approve::handler))
                        .push(Router::with_path("complete").put(appointments::complete::handler))
                        .push(Router::with_path("cancel").put(appointments::cancel::handler))
                        .push(
                            Router::with_path("pay-with-cash")
                                .put(payments::pay_with_cash::handler),
                        ),
                ),
        )
        .push(
            Router::with_path("admin/appointments/{appointment}")
                .delete(appointments::delete::handler),
        )
        .push(
            Router::with_path("payments")
                .push(Router::with_path("unpaid").get(payments::unpaid::handler))
                .push(Router::with_path("cash").post(payments::cash::handler))
                .push(Router::with_path("stripe/checkout").post(payments::checkout::handler))
                .push(Router::with_path("verify").post(payments::verify::handler)),
        )
}
