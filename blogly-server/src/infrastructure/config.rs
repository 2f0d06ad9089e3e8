const MEMORY_SCHEME: &str = "memory://";

#[derive(Debug, Clone, PartialEq)]
pub enum Storage {
    Postgres { url: String },
    Memory,
}

impl Storage {
    pub fn from_url(url: &str) -> Self {
        if url.starts_with(MEMORY_SCHEME) {
            Storage::Memory
        } else {
            Storage::Postgres {
                url: url.to_string(),
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub storage: Storage,
    pub max_connections: u32,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let host = lookup("HOST").unwrap_or_else(|| "127.0.0.1".into());
        let port = lookup("PORT")
            .unwrap_or_else(|| "8080".into())
            .parse()
            .map_err(|e| anyhow::anyhow!("invalid PORT: {}", e))?;
        let database_url =
            lookup("DATABASE_URL").ok_or_else(|| anyhow::anyhow!("DATABASE_URL must be set"))?;
        let max_connections = lookup("DATABASE_MAX_CONNECTIONS")
            .unwrap_or_else(|| "20".into())
            .parse()
            .map_err(|e| anyhow::anyhow!("invalid DATABASE_MAX_CONNECTIONS: {}", e))?;

        Ok(Self {
            host,
            port,
            storage: Storage::from_url(&database_url),
            max_connections,
        })
    }
}
