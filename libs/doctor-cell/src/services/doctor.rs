use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::error::{DoctorError, StoreError};
use crate::models::{
    CreateDoctorRequest, Doctor, DoctorFilter, DoctorPatch, PopulatedDoctor, ResolvedDoctor,
};
use crate::services::provisioning;
use crate::state::DoctorCellState;
use crate::store::{DoctorRepository, UserRepository};

type Result<T> = std::result::Result<T, DoctorError>;

/// Doctor profile operations. Writes that touch both the doctor and the
/// linked user run as a two-step saga: if the second step fails, the first
/// is undone before the error is returned.
pub struct DoctorService {
    doctors: Arc<dyn DoctorRepository>,
    users: Arc<dyn UserRepository>,
}

impl DoctorService {
    pub fn new(state: &DoctorCellState) -> Self {
        Self {
            doctors: state.doctors.clone(),
            users: state.users.clone(),
        }
    }

    /// Expand `userId` on each doctor to `{_id, email}` with one batch lookup.
    async fn populate(&self, doctors: Vec<Doctor>) -> Result<Vec<PopulatedDoctor>> {
        let mut seen = HashSet::new();
        let user_ids: Vec<String> = doctors.iter()
            .filter(|doctor| seen.insert(doctor.user_id.as_str()))
            .map(|doctor| doctor.user_id.clone())
            .collect();

        let users: HashMap<String, _> = self.users.find_many(&user_ids).await?
            .into_iter()
            .map(|user| (user.id.clone(), user.populated()))
            .collect();

        Ok(doctors.into_iter()
            .map(|doctor| {
                let user = users.get(&doctor.user_id).cloned();
                PopulatedDoctor::from_doctor(doctor, user)
            })
            .collect())
    }

    async fn populate_one(&self, doctor: Doctor) -> Result<PopulatedDoctor> {
        let mut populated = self.populate(vec![doctor]).await?;
        populated.pop().ok_or_else(|| {
            DoctorError::Store(StoreError::Unexpected("population dropped a record".to_string()))
        })
    }

    pub async fn list_all(&self) -> Result<Vec<PopulatedDoctor>> {
        debug!("Listing all doctors");
        let doctors = self.doctors.find_all().await?;
        self.populate(doctors).await
    }

    /// Exact-match search; an empty filter returns every doctor.
    pub async fn search(&self, filter: DoctorFilter) -> Result<Vec<PopulatedDoctor>> {
        let filter = filter.normalized();
        debug!("Searching doctors with filter: {:?}", filter);

        let doctors = if filter.is_empty() {
            self.doctors.find_all().await?
        } else {
            self.doctors.find_by_filter(&filter).await?
        };
        self.populate(doctors).await
    }

    pub async fn get(&self, id: &str) -> Result<PopulatedDoctor> {
        debug!("Fetching doctor profile: {}", id);
        let doctor = self.doctors.find_by_id(id).await?
            .ok_or(DoctorError::DoctorNotFound)?;
        self.populate_one(doctor).await
    }

    /// Idempotent lookup of the doctor linked to `user_id`.
    pub async fn find_by_user(&self, user_id: &str) -> Result<Option<PopulatedDoctor>> {
        match self.doctors.find_by_user_id(user_id).await? {
            Some(doctor) => Ok(Some(self.populate_one(doctor).await?)),
            None => Ok(None),
        }
    }

    /// Create the default profile for a doctor account that has none.
    ///
    /// Fails with `DoctorNotFound` if the user is missing or is not flagged as
    /// a doctor. If a concurrent request wins the insert under a unique
    /// constraint, the winner's record is returned instead.
    pub async fn provision_for_user(&self, user_id: &str) -> Result<ResolvedDoctor> {
        let user = match self.users.find_by_id(user_id).await? {
            Some(user) if user.is_doctor => user,
            _ => return Err(DoctorError::DoctorNotFound),
        };

        info!("Creating doctor profile for user: {}", user.id);
        let doctor = provisioning::doctor_from_user(&user);
        debug!("Using registration data: {:?}", doctor.profile);

        match self.doctors.insert(&doctor).await {
            Ok(created) => {
                info!("Doctor profile created: {}", created.id);
                Ok(ResolvedDoctor::Provisioned(created))
            }
            Err(StoreError::Conflict(detail)) => {
                warn!("Concurrent provisioning for user {}: {}", user_id, detail);
                self.find_by_user(user_id).await?
                    .map(ResolvedDoctor::Existing)
                    .ok_or(DoctorError::Store(StoreError::Conflict(detail)))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Return the linked doctor, provisioning one on first access.
    pub async fn find_or_provision(&self, user_id: &str) -> Result<ResolvedDoctor> {
        match self.find_by_user(user_id).await? {
            Some(doctor) => Ok(ResolvedDoctor::Existing(doctor)),
            None => self.provision_for_user(user_id).await,
        }
    }

    pub async fn create(&self, request: CreateDoctorRequest) -> Result<Doctor> {
        debug!("Creating doctor profile for user: {}", request.user_id);

        let mut user = self.users.find_by_id(&request.user_id).await?
            .ok_or(DoctorError::UserNotFound)?;

        if self.doctors.find_by_user_id(&request.user_id).await?.is_some() {
            return Err(DoctorError::AlreadyExists);
        }

        let image = request.supplied_image().map(str::to_string);
        let now = Utc::now();
        let doctor = Doctor {
            id: Uuid::new_v4().to_string(),
            user_id: request.user_id.clone(),
            profile: request.into_profile(),
            created_at: now,
            updated_at: now,
        };

        let created = match self.doctors.insert(&doctor).await {
            Ok(created) => created,
            Err(StoreError::Conflict(_)) => return Err(DoctorError::AlreadyExists),
            Err(e) => return Err(e.into()),
        };

        user.is_doctor = true;
        if let Some(image) = image {
            user.cimage = Some(image);
        }

        if let Err(e) = self.users.save(&user).await {
            warn!("Linking user {} failed, removing doctor {}: {}", user.id, created.id, e);
            if let Err(rollback) = self.doctors.delete(&created.id).await {
                error!("Rollback of doctor {} failed: {}", created.id, rollback);
            }
            return Err(e.into());
        }

        info!("Doctor profile {} created for user {}", created.id, user.id);
        Ok(created)
    }

    pub async fn update(&self, id: &str, patch: DoctorPatch) -> Result<Doctor> {
        debug!("Updating doctor profile: {}", id);

        let previous = self.doctors.find_by_id(id).await?
            .ok_or(DoctorError::DoctorNotFound)?;

        let mut doctor = previous.clone();
        let new_image = patch.apply_to(&mut doctor.profile);
        doctor.updated_at = Utc::now();

        let saved = self.doctors.save(&doctor).await?
            .ok_or(DoctorError::DoctorNotFound)?;

        if let Some(image) = new_image {
            if let Some(mut user) = self.users.find_by_id(&saved.user_id).await? {
                user.cimage = Some(image);
                if let Err(e) = self.users.save(&user).await {
                    warn!("Mirroring image to user {} failed, restoring doctor {}: {}", user.id, id, e);
                    if let Err(rollback) = self.doctors.save(&previous).await {
                        error!("Rollback of doctor {} failed: {}", id, rollback);
                    }
                    return Err(e.into());
                }
            }
        }

        info!("Doctor profile {} updated", id);
        Ok(saved)
    }

    pub async fn delete(&self, id: &str) -> Result<()> {
        debug!("Deleting doctor profile: {}", id);

        let doctor = self.doctors.find_by_id(id).await?
            .ok_or(DoctorError::DoctorNotFound)?;

        let previous_user = match self.users.find_by_id(&doctor.user_id).await? {
            Some(user) => {
                let mut unlinked = user.clone();
                unlinked.is_doctor = false;
                self.users.save(&unlinked).await?;
                Some(user)
            }
            None => None,
        };

        if let Err(e) = self.doctors.delete(id).await {
            if let Some(user) = previous_user {
                warn!("Deleting doctor {} failed, restoring user {}: {}", id, user.id, e);
                if let Err(rollback) = self.users.save(&user).await {
                    error!("Rollback of user {} failed: {}", user.id, rollback);
                }
            }
            return Err(e.into());
        }

        info!("Doctor profile {} deleted", id);
        Ok(())
    }
}
