use chrono::Utc;
use uuid::Uuid;

use crate::models::{
    DayAvailability, Doctor, DoctorProfile, TimeSlot, UserRecord, Weekday, DEFAULT_DOCTOR_IMAGE,
};

pub const DEFAULT_HOSPITAL: &str = "General Hospital";
pub const DEFAULT_LOCATION: &str = "Sri Lanka";
pub const DEFAULT_SPECIALIZATION: &str = "General Practitioner";
pub const DEFAULT_CONSULTATION_FEE: f64 = 2000.0;
pub const DEFAULT_EXPERIENCE: i64 = 1;

/// Mon-Fri 08:00-17:00, Sat 08:00-13:00, Sun closed.
pub fn default_weekly_availability() -> Vec<DayAvailability> {
    Weekday::ALL
        .iter()
        .map(|&day| {
            let slots = match day {
                Weekday::Saturday => vec![TimeSlot::new("08:00", "13:00")],
                Weekday::Sunday => vec![],
                _ => vec![TimeSlot::new("08:00", "17:00")],
            };
            DayAvailability { day, slots }
        })
        .collect()
}

fn first_present<'a>(candidates: &[&'a Option<String>]) -> Option<&'a str> {
    candidates
        .iter()
        .filter_map(|value| value.as_deref())
        .find(|value| !value.is_empty())
}

/// Build the profile a doctor account gets when it has none yet, drawing
/// whatever the account already knows and defaulting the rest.
pub fn profile_from_user(user: &UserRecord) -> DoctorProfile {
    let name = first_present(&[&user.name, &user.username])
        .unwrap_or_default()
        .to_string();

    let specialization = match first_present(&[&user.specialization]) {
        Some(specialization) => specialization.to_string(),
        None => match first_present(&[&user.doctor_reg]) {
            Some(reg) => format!("Medical Doctor ({})", reg),
            None => DEFAULT_SPECIALIZATION.to_string(),
        },
    };

    let hospital = first_present(&[&user.hospital])
        .unwrap_or(DEFAULT_HOSPITAL)
        .to_string();

    let location = first_present(&[&user.location])
        .unwrap_or(DEFAULT_LOCATION)
        .to_string();

    let consultation_fee = user.consultation_fee
        .filter(|fee| *fee != 0.0 && !fee.is_nan())
        .unwrap_or(DEFAULT_CONSULTATION_FEE);

    let image = first_present(&[&user.cimage])
        .unwrap_or(DEFAULT_DOCTOR_IMAGE)
        .to_string();

    let bio = format!("Dr. {} is a {} specialist at {}.", name, specialization, hospital);

    DoctorProfile {
        name,
        specialization,
        hospital,
        location,
        experience: DEFAULT_EXPERIENCE,
        consultation_fee,
        availability: default_weekly_availability(),
        bio,
        education: Vec::new(),
        certifications: Vec::new(),
        languages: Vec::new(),
        image,
    }
}

/// A new, not yet persisted doctor record for `user`.
pub fn doctor_from_user(user: &UserRecord) -> Doctor {
    let now = Utc::now();
    Doctor {
        id: Uuid::new_v4().to_string(),
        user_id: user.id.clone(),
        profile: profile_from_user(user),
        created_at: now,
        updated_at: now,
    }
}
