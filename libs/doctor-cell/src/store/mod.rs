pub mod memory;
pub mod supabase;

use async_trait::async_trait;

use crate::error::StoreError;
use crate::models::{Doctor, DoctorFilter, UserRecord};

pub use memory::InMemoryStore;
pub use supabase::{SupabaseDoctorRepository, SupabaseUserRepository};

#[async_trait]
pub trait DoctorRepository: Send + Sync {
    async fn find_by_filter(&self, filter: &DoctorFilter) -> Result<Vec<Doctor>, StoreError>;

    async fn find_all(&self) -> Result<Vec<Doctor>, StoreError> {
        self.find_by_filter(&DoctorFilter::default()).await
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Doctor>, StoreError>;

    async fn find_by_user_id(&self, user_id: &str) -> Result<Option<Doctor>, StoreError>;

    async fn insert(&self, doctor: &Doctor) -> Result<Doctor, StoreError>;

    /// Overwrite an existing record. Returns `None` if it no longer exists.
    async fn save(&self, doctor: &Doctor) -> Result<Option<Doctor>, StoreError>;

    /// Returns whether a record was removed.
    async fn delete(&self, id: &str) -> Result<bool, StoreError>;
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_by_id(&self, id: &str) -> Result<Option<UserRecord>, StoreError>;

    /// Batch lookup used to expand doctor references. Unknown ids are skipped.
    async fn find_many(&self, ids: &[String]) -> Result<Vec<UserRecord>, StoreError>;

    /// Persist the doctor-owned fields of a user (`is_doctor`, `cimage`).
    async fn save(&self, user: &UserRecord) -> Result<(), StoreError>;
}
