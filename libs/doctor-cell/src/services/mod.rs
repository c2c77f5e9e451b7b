pub mod doctor;
pub mod provisioning;

pub use doctor::DoctorService;
