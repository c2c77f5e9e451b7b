use std::sync::Arc;

use tracing::info;

use shared_config::{AppConfig, StoreBackend};
use shared_database::SupabaseClient;

use crate::store::{
    DoctorRepository, InMemoryStore, SupabaseDoctorRepository, SupabaseUserRepository, UserRepository,
};

/// Shared handles the doctor routes run against.
#[derive(Clone)]
pub struct DoctorCellState {
    pub doctors: Arc<dyn DoctorRepository>,
    pub users: Arc<dyn UserRepository>,
}

impl DoctorCellState {
    pub fn new(doctors: Arc<dyn DoctorRepository>, users: Arc<dyn UserRepository>) -> Self {
        Self { doctors, users }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        match config.store_backend {
            StoreBackend::Supabase => {
                info!("Doctor cell using Supabase store at {}", config.supabase_url);
                let supabase = SupabaseClient::new(config);
                Self::new(
                    Arc::new(SupabaseDoctorRepository::new(supabase.clone())),
                    Arc::new(SupabaseUserRepository::new(supabase)),
                )
            }
            StoreBackend::Memory => {
                info!("Doctor cell using in-memory store");
                Self::with_memory_store(Arc::new(InMemoryStore::new()))
            }
        }
    }

    pub fn with_memory_store(store: Arc<InMemoryStore>) -> Self {
        Self::new(store.clone(), store)
    }
}
