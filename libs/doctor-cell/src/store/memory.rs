use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

use crate::error::StoreError;
use crate::models::{Doctor, DoctorFilter, UserRecord};
use super::{DoctorRepository, UserRepository};

/// Process-local store backing both repositories. Doctors keep insertion order.
/// Like the document store it stands in for, it does not enforce one doctor
/// per user.
#[derive(Default)]
pub struct InMemoryStore {
    doctors: RwLock<Vec<Doctor>>,
    users: RwLock<HashMap<String, UserRecord>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed or replace a user account.
    pub async fn insert_user(&self, user: UserRecord) {
        self.users.write().await.insert(user.id.clone(), user);
    }

    pub async fn remove_user(&self, id: &str) -> Option<UserRecord> {
        self.users.write().await.remove(id)
    }

    pub async fn doctor_count(&self) -> usize {
        self.doctors.read().await.len()
    }
}

#[async_trait]
impl DoctorRepository for InMemoryStore {
    async fn find_by_filter(&self, filter: &DoctorFilter) -> Result<Vec<Doctor>, StoreError> {
        let doctors = self.doctors.read().await;
        Ok(doctors
            .iter()
            .filter(|doctor| filter.matches(&doctor.profile))
            .cloned()
            .collect())
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Doctor>, StoreError> {
        let doctors = self.doctors.read().await;
        Ok(doctors.iter().find(|doctor| doctor.id == id).cloned())
    }

    async fn find_by_user_id(&self, user_id: &str) -> Result<Option<Doctor>, StoreError> {
        let doctors = self.doctors.read().await;
        Ok(doctors.iter().find(|doctor| doctor.user_id == user_id).cloned())
    }

    async fn insert(&self, doctor: &Doctor) -> Result<Doctor, StoreError> {
        let mut doctors = self.doctors.write().await;
        if doctors.iter().any(|existing| existing.id == doctor.id) {
            return Err(StoreError::Conflict(format!("duplicate id {}", doctor.id)));
        }
        debug!("Inserting doctor {} in memory", doctor.id);
        doctors.push(doctor.clone());
        Ok(doctor.clone())
    }

    async fn save(&self, doctor: &Doctor) -> Result<Option<Doctor>, StoreError> {
        let mut doctors = self.doctors.write().await;
        match doctors.iter_mut().find(|existing| existing.id == doctor.id) {
            Some(slot) => {
                *slot = doctor.clone();
                Ok(Some(doctor.clone()))
            }
            None => Ok(None),
        }
    }

    async fn delete(&self, id: &str) -> Result<bool, StoreError> {
        let mut doctors = self.doctors.write().await;
        let before = doctors.len();
        doctors.retain(|doctor| doctor.id != id);
        Ok(doctors.len() != before)
    }
}

#[async_trait]
impl UserRepository for InMemoryStore {
    async fn find_by_id(&self, id: &str) -> Result<Option<UserRecord>, StoreError> {
        Ok(self.users.read().await.get(id).cloned())
    }

    async fn find_many(&self, ids: &[String]) -> Result<Vec<UserRecord>, StoreError> {
        let users = self.users.read().await;
        Ok(ids.iter().filter_map(|id| users.get(id).cloned()).collect())
    }

    async fn save(&self, user: &UserRecord) -> Result<(), StoreError> {
        let mut users = self.users.write().await;
        if let Some(existing) = users.get_mut(&user.id) {
            existing.is_doctor = user.is_doctor;
            existing.cimage = user.cimage.clone();
        }
        Ok(())
    }
}
