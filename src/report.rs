// Report generation: sample the host once, then one pass over the tenant
// directory reading counters and measuring storage inside a paired
// enter/restore context switch per tenant.
//
// Tenants are scanned sequentially: the context switch is a shared
// non-reentrant resource, so each enter/restore pair is a critical section.

use crate::counter_store::CounterStore;
use crate::error::Result;
use crate::host_probe::HostProbe;
use crate::models::{
    CounterKind, LoadSample, MemorySample, NetworkReport, StorageUsage, TenantId, TenantReport,
};
use crate::storage_scanner::{self, DatabaseCatalog};
use crate::tenant::{ContextGuard, Tenant, TenantContext, TenantDirectory};
use tokio::time::{Duration, Instant};

pub struct Reporter<S, P, C, D, X> {
    store: S,
    probe: P,
    catalog: C,
    directory: D,
    context: X,
}

impl<S, P, C, D, X> Reporter<S, P, C, D, X>
where
    S: CounterStore,
    P: HostProbe,
    C: DatabaseCatalog,
    D: TenantDirectory,
    X: TenantContext,
{
    pub fn new(store: S, probe: P, catalog: C, directory: D, context: X) -> Self {
        Self {
            store,
            probe,
            catalog,
            directory,
            context,
        }
    }

    /// Middleware hook: count one page view for the tenant. Store failures
    /// are logged and swallowed; metrics loss must never fail the request
    /// being served.
    pub async fn record_visit(&self, tenant: TenantId) {
        self.record(tenant, CounterKind::Visits).await;
    }

    /// Middleware hook: count one database query for the tenant.
    pub async fn record_query(&self, tenant: TenantId) {
        self.record(tenant, CounterKind::Queries).await;
    }

    async fn record(&self, tenant: TenantId, kind: CounterKind) {
        if let Err(e) = self.store.increment(tenant, kind).await {
            tracing::warn!(
                tenant = %tenant,
                kind = kind.as_str(),
                error = %e,
                operation = "increment",
                "counter increment failed; continuing"
            );
        }
    }

    /// Build one consolidated snapshot. Probe failures zero the affected
    /// sample and flag it; per-tenant failures zero that tenant's fields and
    /// flag the tenant. The only fatal error is a failed context restore.
    ///
    /// With a deadline, tenants not reached before expiry are omitted and
    /// the report is marked truncated; partial beats all-or-nothing.
    pub async fn build_report(&self, deadline: Option<Duration>) -> Result<NetworkReport> {
        let started = Instant::now();

        let (memory, memory_degraded) = match self.probe.sample_memory().await {
            Ok(m) => (m, false),
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    operation = "sample_memory",
                    "memory probe failed; sample zeroed"
                );
                (MemorySample::zeroed(), true)
            }
        };
        let (load, load_degraded) = match self.probe.sample_load().await {
            Ok(l) => (l, false),
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    operation = "sample_load",
                    "load probe failed; sample zeroed"
                );
                (LoadSample::zeroed(), true)
            }
        };

        let tenants = self.directory.list_tenants()?;
        let mut reports = Vec::with_capacity(tenants.len());
        let mut truncated = false;

        for tenant in &tenants {
            if deadline.is_some_and(|d| started.elapsed() >= d) {
                truncated = true;
                tracing::warn!(
                    operation = "build_report",
                    scanned = reports.len(),
                    total = tenants.len(),
                    "deadline expired; returning partial report"
                );
                break;
            }
            reports.push(self.scan_tenant(tenant).await?);
        }

        Ok(NetworkReport {
            memory,
            load,
            memory_degraded,
            load_degraded,
            tenants: reports,
            truncated,
        })
    }

    async fn scan_tenant(&self, tenant: &Tenant) -> Result<TenantReport> {
        let guard = match self.context.enter(tenant) {
            Ok(g) => g,
            Err(e) => {
                tracing::warn!(
                    tenant = %tenant.id,
                    error = %e,
                    operation = "enter_context",
                    "could not enter tenant context; tenant report zeroed"
                );
                return Ok(TenantReport {
                    tenant: tenant.id,
                    display_name: tenant.display_name.clone(),
                    visits: 0,
                    queries: 0,
                    storage: StorageUsage::zeroed(),
                    degraded: true,
                });
            }
        };

        let mut degraded = false;

        let visits = match self.store.get(tenant.id, CounterKind::Visits).await {
            Ok(v) => v,
            Err(e) => {
                tracing::warn!(tenant = %tenant.id, error = %e, operation = "get_visits", "counter read failed");
                degraded = true;
                0
            }
        };
        let queries = match self.store.get(tenant.id, CounterKind::Queries).await {
            Ok(v) => v,
            Err(e) => {
                tracing::warn!(tenant = %tenant.id, error = %e, operation = "get_queries", "counter read failed");
                degraded = true;
                0
            }
        };

        let database_mb = match storage_scanner::database_size(&self.catalog, tenant).await {
            Ok(v) => v,
            Err(e) => {
                tracing::warn!(tenant = %tenant.id, error = %e, operation = "database_size", "database scan failed");
                degraded = true;
                0.0
            }
        };
        let uploads_mb = match storage_scanner::directory_size(&tenant.uploads_dir).await {
            Ok(v) => v,
            Err(e) => {
                tracing::warn!(tenant = %tenant.id, error = %e, operation = "directory_size", "uploads scan failed");
                degraded = true;
                0.0
            }
        };

        // A failed restore aborts the remaining enumeration: leaked context
        // would mis-attribute the next tenants' data.
        guard.restore()?;

        Ok(TenantReport {
            tenant: tenant.id,
            display_name: tenant.display_name.clone(),
            visits,
            queries,
            storage: StorageUsage {
                database_mb,
                uploads_mb,
            },
            degraded,
        })
    }
}
