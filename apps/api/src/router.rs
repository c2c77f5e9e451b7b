use std::sync::Arc;

use axum::{
    Router,
    routing::get,
};

use doctor_cell::router::doctor_routes;
use doctor_cell::DoctorCellState;

pub fn create_router(doctor_state: Arc<DoctorCellState>) -> Router {
    Router::new()
        .route("/", get(|| async { "Doctor profile API is running!" }))
        .nest("/api/doctors", doctor_routes(doctor_state))
}
