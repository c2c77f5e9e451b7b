use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{
    header::{HeaderMap, HeaderValue},
    Method,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::debug;

use shared_database::SupabaseClient;

use crate::error::StoreError;
use crate::models::{DayAvailability, Doctor, DoctorFilter, DoctorProfile, UserRecord, DEFAULT_DOCTOR_IMAGE};
use super::{DoctorRepository, UserRepository};

const DOCTORS_PATH: &str = "/rest/v1/doctors";
const USERS_PATH: &str = "/rest/v1/users";

fn eq_condition(column: &str, value: &str) -> String {
    format!("{}=eq.{}", column, urlencoding::encode(value))
}

fn return_representation() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert("Prefer", HeaderValue::from_static("return=representation"));
    headers
}

/// Row shape of the `doctors` table.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct DoctorRow {
    id: String,
    user_id: String,
    name: String,
    specialization: String,
    hospital: String,
    location: String,
    experience: i64,
    consultation_fee: f64,
    availability: Option<Vec<DayAvailability>>,
    bio: Option<String>,
    education: Option<Vec<Value>>,
    certifications: Option<Vec<Value>>,
    languages: Option<Vec<Value>>,
    image: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<&Doctor> for DoctorRow {
    fn from(doctor: &Doctor) -> Self {
        let profile = doctor.profile.clone();
        Self {
            id: doctor.id.clone(),
            user_id: doctor.user_id.clone(),
            name: profile.name,
            specialization: profile.specialization,
            hospital: profile.hospital,
            location: profile.location,
            experience: profile.experience,
            consultation_fee: profile.consultation_fee,
            availability: Some(profile.availability),
            bio: Some(profile.bio),
            education: Some(profile.education),
            certifications: Some(profile.certifications),
            languages: Some(profile.languages),
            image: Some(profile.image),
            created_at: doctor.created_at,
            updated_at: doctor.updated_at,
        }
    }
}

impl From<DoctorRow> for Doctor {
    fn from(row: DoctorRow) -> Self {
        Self {
            id: row.id,
            user_id: row.user_id,
            profile: DoctorProfile {
                name: row.name,
                specialization: row.specialization,
                hospital: row.hospital,
                location: row.location,
                experience: row.experience,
                consultation_fee: row.consultation_fee,
                availability: row.availability.unwrap_or_default(),
                bio: row.bio.unwrap_or_default(),
                education: row.education.unwrap_or_default(),
                certifications: row.certifications.unwrap_or_default(),
                languages: row.languages.unwrap_or_default(),
                image: row.image.unwrap_or_else(|| DEFAULT_DOCTOR_IMAGE.to_string()),
            },
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

fn decode_rows(rows: Vec<Value>) -> Result<Vec<Doctor>, StoreError> {
    rows.into_iter()
        .map(|row| serde_json::from_value::<DoctorRow>(row).map(Doctor::from))
        .collect::<Result<Vec<Doctor>, _>>()
        .map_err(StoreError::from)
}

pub struct SupabaseDoctorRepository {
    supabase: SupabaseClient,
}

impl SupabaseDoctorRepository {
    pub fn new(supabase: SupabaseClient) -> Self {
        Self { supabase }
    }

    async fn find_one(&self, column: &str, value: &str) -> Result<Option<Doctor>, StoreError> {
        let path = format!("{}?{}&limit=1", DOCTORS_PATH, eq_condition(column, value));
        let result: Vec<Value> = self.supabase.request(Method::GET, &path, None).await?;
        Ok(decode_rows(result)?.into_iter().next())
    }
}

#[async_trait]
impl DoctorRepository for SupabaseDoctorRepository {
    async fn find_by_filter(&self, filter: &DoctorFilter) -> Result<Vec<Doctor>, StoreError> {
        debug!("Querying doctors with filter: {:?}", filter);

        let mut query_parts = vec!["select=*".to_string()];
        for (column, value) in filter.conditions() {
            query_parts.push(eq_condition(column, value));
        }
        query_parts.push("order=created_at.asc".to_string());

        let path = format!("{}?{}", DOCTORS_PATH, query_parts.join("&"));
        let result: Vec<Value> = self.supabase.request(Method::GET, &path, None).await?;

        decode_rows(result)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Doctor>, StoreError> {
        self.find_one("id", id).await
    }

    async fn find_by_user_id(&self, user_id: &str) -> Result<Option<Doctor>, StoreError> {
        self.find_one("user_id", user_id).await
    }

    async fn insert(&self, doctor: &Doctor) -> Result<Doctor, StoreError> {
        let body = serde_json::to_value(DoctorRow::from(doctor))?;
        let result: Vec<Value> = self.supabase.request_with_headers(
            Method::POST,
            DOCTORS_PATH,
            Some(body),
            Some(return_representation()),
        ).await?;

        decode_rows(result)?
            .into_iter()
            .next()
            .ok_or_else(|| StoreError::Unexpected("insert returned no rows".to_string()))
    }

    async fn save(&self, doctor: &Doctor) -> Result<Option<Doctor>, StoreError> {
        let path = format!("{}?{}", DOCTORS_PATH, eq_condition("id", &doctor.id));
        let body = serde_json::to_value(DoctorRow::from(doctor))?;
        let result: Vec<Value> = self.supabase.request_with_headers(
            Method::PATCH,
            &path,
            Some(body),
            Some(return_representation()),
        ).await?;

        Ok(decode_rows(result)?.into_iter().next())
    }

    async fn delete(&self, id: &str) -> Result<bool, StoreError> {
        let path = format!("{}?{}", DOCTORS_PATH, eq_condition("id", id));
        let result: Vec<Value> = self.supabase.request_with_headers(
            Method::DELETE,
            &path,
            None,
            Some(return_representation()),
        ).await?;

        Ok(!result.is_empty())
    }
}

pub struct SupabaseUserRepository {
    supabase: SupabaseClient,
}

impl SupabaseUserRepository {
    pub fn new(supabase: SupabaseClient) -> Self {
        Self { supabase }
    }
}

#[async_trait]
impl UserRepository for SupabaseUserRepository {
    async fn find_by_id(&self, id: &str) -> Result<Option<UserRecord>, StoreError> {
        let path = format!("{}?select=*&{}&limit=1", USERS_PATH, eq_condition("id", id));
        let result: Vec<UserRecord> = self.supabase.request(Method::GET, &path, None).await?;
        Ok(result.into_iter().next())
    }

    async fn find_many(&self, ids: &[String]) -> Result<Vec<UserRecord>, StoreError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let quoted: Vec<String> = ids.iter()
            .map(|id| format!("\"{}\"", urlencoding::encode(id)))
            .collect();
        let path = format!("{}?select=id,email&id=in.({})", USERS_PATH, quoted.join(","));

        Ok(self.supabase.request(Method::GET, &path, None).await?)
    }

    async fn save(&self, user: &UserRecord) -> Result<(), StoreError> {
        let path = format!("{}?{}", USERS_PATH, eq_condition("id", &user.id));
        let body = json!({
            "is_doctor": user.is_doctor,
            "cimage": user.cimage,
        });

        self.supabase.execute(Method::PATCH, &path, Some(body)).await?;
        Ok(())
    }
}
