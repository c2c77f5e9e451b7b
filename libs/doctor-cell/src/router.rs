use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};

use crate::handlers;
use crate::state::DoctorCellState;

pub fn doctor_routes(state: Arc<DoctorCellState>) -> Router {
    Router::new()
        .route("/all", get(handlers::list_doctors))
        .route("/search", get(handlers::search_doctors))
        .route("/user/{user_id}", get(handlers::get_doctor_by_user))
        .route("/create", post(handlers::create_doctor))
        .route(
            "/{doctor_id}",
            get(handlers::get_doctor)
                .put(handlers::update_doctor)
                .delete(handlers::delete_doctor),
        )
        .with_state(state)
}
