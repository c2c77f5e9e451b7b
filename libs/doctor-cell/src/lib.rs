pub mod error;
pub mod handlers;
pub mod models;
pub mod router;
pub mod services;
pub mod state;
pub mod store;

pub use error::{DoctorError, StoreError};
pub use models::*;
pub use services::DoctorService;
pub use state::DoctorCellState;
