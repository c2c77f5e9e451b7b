use std::env;
use tracing::warn;

/// Which backing store the doctor cell talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Supabase,
    Memory,
}

impl StoreBackend {
    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "supabase" => Some(StoreBackend::Supabase),
            "memory" => Some(StoreBackend::Memory),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub supabase_url: String,
    pub supabase_service_key: String,
    pub store_backend: StoreBackend,
    pub host: String,
    pub port: u16,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let config = Self {
            supabase_url: env::var("SUPABASE_URL")
                .unwrap_or_else(|_| {
                    warn!("SUPABASE_URL not set, using empty value");
                    String::new()
                }),
            supabase_service_key: env::var("SUPABASE_SERVICE_KEY")
                .or_else(|_| env::var("SUPABASE_ANON_PUBLIC_KEY"))
                .unwrap_or_else(|_| {
                    warn!("SUPABASE_SERVICE_KEY not set, using empty value");
                    String::new()
                }),
            store_backend: match env::var("DOCTOR_STORE") {
                Ok(value) => StoreBackend::parse(&value).unwrap_or_else(|| {
                    warn!("Unknown DOCTOR_STORE '{}', falling back to supabase", value);
                    StoreBackend::Supabase
                }),
                Err(_) => StoreBackend::Supabase,
            },
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env::var("PORT")
                .ok()
                .and_then(|p| match p.parse() {
                    Ok(port) => Some(port),
                    Err(_) => {
                        warn!("Invalid PORT '{}', using default", p);
                        None
                    }
                })
                .unwrap_or(3000),
        };

        if config.store_backend == StoreBackend::Supabase && !config.is_configured() {
            warn!("Application not fully configured - missing environment variables");
        }

        config
    }

    /// Config pointing at an in-process store; used by local runs and tests.
    pub fn in_memory() -> Self {
        Self {
            supabase_url: String::new(),
            supabase_service_key: String::new(),
            store_backend: StoreBackend::Memory,
            host: "127.0.0.1".to_string(),
            port: 3000,
        }
    }

    pub fn is_configured(&self) -> bool {
        !self.supabase_url.is_empty() && !self.supabase_service_key.is_empty()
    }
}
