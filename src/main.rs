use anyhow::Result;
use netmon::*;
use tokio::time::Duration;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::time::FormatTime;

struct LocalTimer;

impl FormatTime for LocalTimer {
    fn format_time(&self, w: &mut tracing_subscriber::fmt::format::Writer<'_>) -> std::fmt::Result {
        write!(
            w,
            "{}",
            chrono::Local::now().format("%Y-%m-%dT%H:%M:%S%.3f%:z")
        )
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_timer(LocalTimer)
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let app_config = config::AppConfig::load()?;

    let store = counter_store::SqliteCounterStore::connect(&app_config.store.path).await?;
    store.init().await?;

    let reporter = report::Reporter::new(
        store,
        host_probe::SysinfoProbe::new(),
        storage_scanner::SqliteCatalog,
        tenant::ConfigTenantDirectory::new(&app_config.tenants),
        tenant::CurrentTenant::new(),
    );

    let deadline = match app_config.report.deadline_secs {
        0 => None,
        secs => Some(Duration::from_secs(secs)),
    };

    tracing::info!(
        tenants = app_config.tenants.len(),
        deadline_secs = app_config.report.deadline_secs,
        "generating network report"
    );
    let report = reporter.build_report(deadline).await?;
    println!("{}", serde_json::to_string_pretty(&report)?);

    Ok(())
}
