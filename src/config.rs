use std::env;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub storage_public_url: String,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = env::var("DATABASE_URL")?;
        let storage_public_url = env::var("STORAGE_PUBLIC_URL")
            .unwrap_or_else(|_| "http://127.0.0.1:9000".to_string());
        Ok(Self {
            database_url,
            storage_public_url,
        })
    }
}
