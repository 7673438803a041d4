// Tenant directory and scoped tenant-context switching. Enter/restore must
// pair even when the per-tenant scan fails, so entering hands back a guard
// and the caller restores explicitly on every exit path.

use crate::config::TenantConfig;
use crate::error::{MonitorError, Result};
use crate::models::TenantId;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone)]
pub struct Tenant {
    pub id: TenantId,
    pub display_name: String,
    pub uploads_dir: PathBuf,
    /// Path to the tenant's SQLite database, if it has one.
    pub database: Option<String>,
}

pub trait TenantDirectory {
    /// Active tenants, in a deterministic order.
    fn list_tenants(&self) -> Result<Vec<Tenant>>;
}

/// Directory backed by the `[[tenants]]` config entries; iteration order is
/// config order.
pub struct ConfigTenantDirectory {
    tenants: Vec<Tenant>,
}

impl ConfigTenantDirectory {
    pub fn new(configs: &[TenantConfig]) -> Self {
        let tenants = configs
            .iter()
            .map(|c| Tenant {
                id: TenantId(c.id),
                display_name: c.name.clone(),
                uploads_dir: PathBuf::from(&c.uploads_dir),
                database: c.database.clone(),
            })
            .collect();
        Self { tenants }
    }
}

impl TenantDirectory for ConfigTenantDirectory {
    fn list_tenants(&self) -> Result<Vec<Tenant>> {
        Ok(self.tenants.clone())
    }
}

/// Release handle returned by [`TenantContext::enter`].
pub trait ContextGuard {
    /// Leave the tenant's namespace. A failure here is the one fatal error
    /// in report generation: a leaked context would attribute subsequent
    /// tenants' data to the wrong tenant.
    fn restore(self) -> Result<()>;
}

pub trait TenantContext {
    type Guard: ContextGuard;

    /// Switch into the tenant's data namespace. Nests correctly.
    fn enter(&self, tenant: &Tenant) -> Result<Self::Guard>;
}

/// Shipped context: a mutex-guarded stack of tenant ids. Restore pops and
/// verifies it found the id it entered with.
#[derive(Default, Clone)]
pub struct CurrentTenant {
    stack: Arc<Mutex<Vec<TenantId>>>,
}

impl CurrentTenant {
    pub fn new() -> Self {
        Self::default()
    }

    /// Innermost entered tenant, if any.
    pub fn current(&self) -> Option<TenantId> {
        self.stack.lock().ok()?.last().copied()
    }
}

impl TenantContext for CurrentTenant {
    type Guard = CurrentTenantGuard;

    fn enter(&self, tenant: &Tenant) -> Result<CurrentTenantGuard> {
        let mut stack = self
            .stack
            .lock()
            .map_err(|e| MonitorError::TenantContext(format!("context lock poisoned: {}", e)))?;
        stack.push(tenant.id);
        Ok(CurrentTenantGuard {
            stack: self.stack.clone(),
            expected: tenant.id,
            restored: false,
        })
    }
}

pub struct CurrentTenantGuard {
    stack: Arc<Mutex<Vec<TenantId>>>,
    expected: TenantId,
    restored: bool,
}

impl ContextGuard for CurrentTenantGuard {
    fn restore(mut self) -> Result<()> {
        self.restored = true;
        let mut stack = self
            .stack
            .lock()
            .map_err(|e| MonitorError::TenantContext(format!("context lock poisoned: {}", e)))?;
        match stack.pop() {
            Some(id) if id == self.expected => Ok(()),
            found => Err(MonitorError::TenantContext(format!(
                "unbalanced restore: entered tenant {}, found {:?}",
                self.expected, found
            ))),
        }
    }
}

impl Drop for CurrentTenantGuard {
    // Backstop only; the report loop restores explicitly on every path.
    fn drop(&mut self) {
        if self.restored {
            return;
        }
        tracing::warn!(
            tenant = %self.expected,
            "tenant context guard dropped without explicit restore"
        );
        if let Ok(mut stack) = self.stack.lock()
            && stack.last() == Some(&self.expected)
        {
            stack.pop();
        }
    }
}
