use serde::Deserialize;

use crate::models::TenantId;

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub store: StoreConfig,
    pub report: ReportConfig,
    #[serde(default)]
    pub tenants: Vec<TenantConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    pub path: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReportConfig {
    /// Report generation deadline in seconds; 0 disables the deadline.
    #[serde(default)]
    pub deadline_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TenantConfig {
    pub id: u64,
    pub name: String,
    pub uploads_dir: String,
    /// Path to the tenant's SQLite database; omit for tenants without one.
    pub database: Option<String>,
}

impl AppConfig {
    pub fn load() -> anyhow::Result<Self> {
        let path = std::env::var("CONFIG_FILE").unwrap_or_else(|_| "config.toml".into());
        let s = std::fs::read_to_string(&path)?;
        Self::load_from_str(&s)
    }

    /// Parse and validate config from a string (e.g. for tests).
    pub fn load_from_str(s: &str) -> anyhow::Result<Self> {
        let config: AppConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(!self.store.path.is_empty(), "store.path must be non-empty");
        let mut seen = std::collections::HashSet::new();
        for t in &self.tenants {
            anyhow::ensure!(
                seen.insert(TenantId(t.id)),
                "tenants.id {} appears more than once",
                t.id
            );
            anyhow::ensure!(
                !t.name.is_empty(),
                "tenants.name must be non-empty for tenant {}",
                t.id
            );
            anyhow::ensure!(
                !t.uploads_dir.is_empty(),
                "tenants.uploads_dir must be non-empty for tenant {}",
                t.id
            );
        }
        Ok(())
    }
}
