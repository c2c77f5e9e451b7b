use serde::{de, Deserialize, Deserializer, Serialize};
use serde_json::Value;
use chrono::{DateTime, Utc};

/// Placeholder used when a profile has no image of its own.
pub const DEFAULT_DOCTOR_IMAGE: &str = "https://s3.amazonaws.com/images/doctor.png";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Weekday {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl Weekday {
    pub const ALL: [Weekday; 7] = [
        Weekday::Monday,
        Weekday::Tuesday,
        Weekday::Wednesday,
        Weekday::Thursday,
        Weekday::Friday,
        Weekday::Saturday,
        Weekday::Sunday,
    ];
}

/// A bookable window, times as "HH:MM".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeSlot {
    pub start_time: String,
    pub end_time: String,
}

impl TimeSlot {
    pub fn new(start_time: &str, end_time: &str) -> Self {
        Self {
            start_time: start_time.to_string(),
            end_time: end_time.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayAvailability {
    pub day: Weekday,
    #[serde(default)]
    pub slots: Vec<TimeSlot>,
}

/// The bookable attributes of a doctor, shared by the stored and expanded forms.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DoctorProfile {
    pub name: String,
    pub specialization: String,
    pub hospital: String,
    pub location: String,
    pub experience: i64,
    pub consultation_fee: f64,
    #[serde(default)]
    pub availability: Vec<DayAvailability>,
    #[serde(default)]
    pub bio: String,
    #[serde(default)]
    pub education: Vec<Value>,
    #[serde(default)]
    pub certifications: Vec<Value>,
    #[serde(default)]
    pub languages: Vec<Value>,
    pub image: String,
}

/// A stored doctor record. `userId` is the raw reference to the linked user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Doctor {
    #[serde(rename = "_id")]
    pub id: String,
    pub user_id: String,
    #[serde(flatten)]
    pub profile: DoctorProfile,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The linked user as exposed through an expanded doctor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PopulatedUser {
    #[serde(rename = "_id")]
    pub id: String,
    pub email: Option<String>,
}

/// A doctor with `userId` expanded to `{_id, email}`; `null` when the user is gone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PopulatedDoctor {
    #[serde(rename = "_id")]
    pub id: String,
    pub user_id: Option<PopulatedUser>,
    #[serde(flatten)]
    pub profile: DoctorProfile,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PopulatedDoctor {
    pub fn from_doctor(doctor: Doctor, user: Option<PopulatedUser>) -> Self {
        Self {
            id: doctor.id,
            user_id: user,
            profile: doctor.profile,
            created_at: doctor.created_at,
            updated_at: doctor.updated_at,
        }
    }
}

/// Result of the fetch-or-provision lookup. An existing profile comes back
/// expanded, a freshly provisioned one as the raw stored record.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum ResolvedDoctor {
    Existing(PopulatedDoctor),
    Provisioned(Doctor),
}

impl ResolvedDoctor {
    pub fn id(&self) -> &str {
        match self {
            ResolvedDoctor::Existing(doctor) => &doctor.id,
            ResolvedDoctor::Provisioned(doctor) => &doctor.id,
        }
    }

    pub fn profile(&self) -> &DoctorProfile {
        match self {
            ResolvedDoctor::Existing(doctor) => &doctor.profile,
            ResolvedDoctor::Provisioned(doctor) => &doctor.profile,
        }
    }

    pub fn was_provisioned(&self) -> bool {
        matches!(self, ResolvedDoctor::Provisioned(_))
    }
}

/// User account record owned by the accounts side of the application.
/// Only `is_doctor` and `cimage` are ever written from here.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub is_doctor: bool,
    #[serde(default)]
    pub cimage: Option<String>,
    #[serde(default)]
    pub specialization: Option<String>,
    #[serde(default)]
    pub hospital: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub doctor_reg: Option<String>,
    #[serde(default)]
    pub consultation_fee: Option<f64>,
}

impl UserRecord {
    pub fn populated(&self) -> PopulatedUser {
        PopulatedUser {
            id: self.id.clone(),
            email: self.email.clone(),
        }
    }
}

/// Numeric input as clients send it: a JSON number or its text form.
#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrText {
    Int(i64),
    Float(f64),
    Text(String),
}

impl NumberOrText {
    fn is_blank(&self) -> bool {
        matches!(self, NumberOrText::Text(text) if text.trim().is_empty())
    }

    fn to_f64(&self) -> Result<f64, String> {
        match self {
            NumberOrText::Int(value) => Ok(*value as f64),
            NumberOrText::Float(value) => Ok(*value),
            NumberOrText::Text(text) => text.trim().parse::<f64>()
                .ok()
                .filter(|value| value.is_finite())
                .ok_or_else(|| format!("invalid number: {:?}", text)),
        }
    }

    fn to_i64(&self) -> Result<i64, String> {
        if let NumberOrText::Int(value) = self {
            return Ok(*value);
        }
        if let NumberOrText::Text(text) = self {
            if let Ok(value) = text.trim().parse::<i64>() {
                return Ok(value);
            }
        }

        let value = self.to_f64()?;
        if value.fract() == 0.0 && value.abs() < i64::MAX as f64 {
            Ok(value as i64)
        } else {
            Err(format!("expected a whole number, got {}", value))
        }
    }
}

fn lenient_i64<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    NumberOrText::deserialize(deserializer)?.to_i64().map_err(de::Error::custom)
}

fn lenient_f64<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    NumberOrText::deserialize(deserializer)?.to_f64().map_err(de::Error::custom)
}

// `null` and blank text both read as absent.
fn lenient_opt_i64<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<NumberOrText>::deserialize(deserializer)? {
        Some(value) if !value.is_blank() => value.to_i64().map(Some).map_err(de::Error::custom),
        _ => Ok(None),
    }
}

fn lenient_opt_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<NumberOrText>::deserialize(deserializer)? {
        Some(value) if !value.is_blank() => value.to_f64().map(Some).map_err(de::Error::custom),
        _ => Ok(None),
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateDoctorRequest {
    pub user_id: String,
    pub name: String,
    pub specialization: String,
    pub hospital: String,
    pub location: String,
    #[serde(deserialize_with = "lenient_i64")]
    pub experience: i64,
    #[serde(deserialize_with = "lenient_f64")]
    pub consultation_fee: f64,
    #[serde(default)]
    pub availability: Vec<DayAvailability>,
    #[serde(default)]
    pub bio: String,
    #[serde(default)]
    pub education: Vec<Value>,
    #[serde(default)]
    pub certifications: Vec<Value>,
    #[serde(default)]
    pub languages: Vec<Value>,
    #[serde(default)]
    pub image: Option<String>,
}

impl CreateDoctorRequest {
    /// Image explicitly supplied by the caller, if any.
    pub fn supplied_image(&self) -> Option<&str> {
        self.image.as_deref().filter(|image| !image.is_empty())
    }

    pub fn into_profile(self) -> DoctorProfile {
        let image = self.supplied_image()
            .unwrap_or(DEFAULT_DOCTOR_IMAGE)
            .to_string();

        DoctorProfile {
            name: self.name,
            specialization: self.specialization,
            hospital: self.hospital,
            location: self.location,
            experience: self.experience,
            consultation_fee: self.consultation_fee,
            availability: self.availability,
            bio: self.bio,
            education: self.education,
            certifications: self.certifications,
            languages: self.languages,
            image,
        }
    }
}

/// Partial update. `None` means "leave unchanged".
///
/// Falsy values (`""`, `0`, `null`) are also treated as absent, so a field can
/// never be cleared through an update. Arrays always count as present, even
/// when empty.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DoctorPatch {
    pub name: Option<String>,
    pub specialization: Option<String>,
    pub hospital: Option<String>,
    pub location: Option<String>,
    #[serde(default, deserialize_with = "lenient_opt_i64")]
    pub experience: Option<i64>,
    #[serde(default, deserialize_with = "lenient_opt_f64")]
    pub consultation_fee: Option<f64>,
    pub availability: Option<Vec<DayAvailability>>,
    pub bio: Option<String>,
    pub education: Option<Vec<Value>>,
    pub certifications: Option<Vec<Value>>,
    pub languages: Option<Vec<Value>>,
    pub image: Option<String>,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.is_empty())
}

impl DoctorPatch {
    /// Drop falsy values so only meaningful overwrites remain.
    pub fn normalized(self) -> Self {
        Self {
            name: non_empty(self.name),
            specialization: non_empty(self.specialization),
            hospital: non_empty(self.hospital),
            location: non_empty(self.location),
            experience: self.experience.filter(|e| *e != 0),
            consultation_fee: self.consultation_fee.filter(|f| *f != 0.0 && !f.is_nan()),
            availability: self.availability,
            bio: non_empty(self.bio),
            education: self.education,
            certifications: self.certifications,
            languages: self.languages,
            image: non_empty(self.image),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.specialization.is_none()
            && self.hospital.is_none()
            && self.location.is_none()
            && self.experience.is_none()
            && self.consultation_fee.is_none()
            && self.availability.is_none()
            && self.bio.is_none()
            && self.education.is_none()
            && self.certifications.is_none()
            && self.languages.is_none()
            && self.image.is_none()
    }

    /// Overwrite every present field. Returns the new image if one was set.
    pub fn apply_to(self, profile: &mut DoctorProfile) -> Option<String> {
        let patch = self.normalized();

        if let Some(name) = patch.name { profile.name = name; }
        if let Some(specialization) = patch.specialization { profile.specialization = specialization; }
        if let Some(hospital) = patch.hospital { profile.hospital = hospital; }
        if let Some(location) = patch.location { profile.location = location; }
        if let Some(experience) = patch.experience { profile.experience = experience; }
        if let Some(fee) = patch.consultation_fee { profile.consultation_fee = fee; }
        if let Some(availability) = patch.availability { profile.availability = availability; }
        if let Some(bio) = patch.bio { profile.bio = bio; }
        if let Some(education) = patch.education { profile.education = education; }
        if let Some(certifications) = patch.certifications { profile.certifications = certifications; }
        if let Some(languages) = patch.languages { profile.languages = languages; }

        match patch.image {
            Some(image) => {
                profile.image = image.clone();
                Some(image)
            }
            None => None,
        }
    }
}

/// Exact-match search filters. Empty values are omitted, not wildcarded.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DoctorFilter {
    pub specialization: Option<String>,
    pub location: Option<String>,
    pub hospital: Option<String>,
}

impl DoctorFilter {
    pub fn normalized(self) -> Self {
        Self {
            specialization: non_empty(self.specialization),
            location: non_empty(self.location),
            hospital: non_empty(self.hospital),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.specialization.is_none() && self.location.is_none() && self.hospital.is_none()
    }

    pub fn matches(&self, profile: &DoctorProfile) -> bool {
        self.specialization.as_ref().map_or(true, |s| *s == profile.specialization)
            && self.location.as_ref().map_or(true, |l| *l == profile.location)
            && self.hospital.as_ref().map_or(true, |h| *h == profile.hospital)
    }

    /// `(column, value)` pairs for the present filters.
    pub fn conditions(&self) -> Vec<(&'static str, &str)> {
        let mut conditions = Vec::new();
        if let Some(ref specialization) = self.specialization {
            conditions.push(("specialization", specialization.as_str()));
        }
        if let Some(ref location) = self.location {
            conditions.push(("location", location.as_str()));
        }
        if let Some(ref hospital) = self.hospital {
            conditions.push(("hospital", hospital.as_str()));
        }
        conditions
    }
}
