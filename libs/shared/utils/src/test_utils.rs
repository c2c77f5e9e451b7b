use serde_json::json;
use uuid::Uuid;

use shared_config::{AppConfig, StoreBackend};

pub struct TestConfig {
    pub supabase_url: String,
    pub supabase_service_key: String,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            supabase_url: "http://localhost:54321".to_string(),
            supabase_service_key: "test-service-key".to_string(),
        }
    }
}

impl TestConfig {
    /// Config for a Supabase backend served by a mock server.
    pub fn with_supabase_url(url: impl Into<String>) -> Self {
        Self {
            supabase_url: url.into(),
            ..Self::default()
        }
    }

    pub fn to_app_config(&self) -> AppConfig {
        AppConfig {
            supabase_url: self.supabase_url.clone(),
            supabase_service_key: self.supabase_service_key.clone(),
            store_backend: StoreBackend::Supabase,
            host: "127.0.0.1".to_string(),
            port: 0,
        }
    }
}

pub struct TestUser {
    pub id: String,
    pub email: String,
    pub is_doctor: bool,
}

impl TestUser {
    pub fn new(email: &str, is_doctor: bool) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            email: email.to_string(),
            is_doctor,
        }
    }

    pub fn doctor(email: &str) -> Self {
        Self::new(email, true)
    }

    pub fn patient(email: &str) -> Self {
        Self::new(email, false)
    }
}

/// Row shapes as returned by the `users` and `doctors` PostgREST tables.
pub struct MockSupabaseResponses;

impl MockSupabaseResponses {
    pub fn user_row(user: &TestUser) -> serde_json::Value {
        json!({
            "id": user.id,
            "email": user.email,
            "username": "testuser",
            "name": "Test User",
            "is_doctor": user.is_doctor,
            "cimage": null,
            "specialization": null,
            "hospital": null,
            "location": null,
            "doctor_reg": null,
            "consultation_fee": null
        })
    }

    pub fn doctor_row(id: &str, user_id: &str) -> serde_json::Value {
        json!({
            "id": id,
            "user_id": user_id,
            "name": "Dr. Test",
            "specialization": "Cardiology",
            "hospital": "General Hospital",
            "location": "Colombo",
            "experience": 10,
            "consultation_fee": 3000.0,
            "availability": [
                {"day": "Monday", "slots": [{"startTime": "08:00", "endTime": "17:00"}]}
            ],
            "bio": "Experienced cardiologist",
            "education": ["MBBS"],
            "certifications": [],
            "languages": ["English", "Sinhala"],
            "image": "https://s3.amazonaws.com/images/doctor.png",
            "created_at": "2024-01-01T00:00:00Z",
            "updated_at": "2024-01-01T00:00:00Z"
        })
    }

    pub fn error_response(message: &str, code: &str) -> serde_json::Value {
        json!({
            "message": message,
            "code": code
        })
    }
}
