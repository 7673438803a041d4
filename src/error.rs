// Error taxonomy. Everything except a failed context restore is downgraded
// to zeroed/flagged data by the report builder.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum MonitorError {
    /// Counter persistence failed. Callers log and proceed; the counter is
    /// treated as unchanged (reads as 0). Never fails the serving request.
    #[error("counter store unavailable: {0}")]
    StoreUnavailable(String),

    /// The OS does not expose the requested metric on this platform.
    /// The report substitutes a zeroed sample.
    #[error("host probe unavailable: {0}")]
    ProbeUnavailable(String),

    /// Filesystem or database scan failed for one tenant. That tenant's
    /// storage usage is zeroed and flagged; the rest of the run continues.
    #[error("storage scan failed: {0}")]
    Scan(String),

    /// Entering or restoring a tenant namespace failed. A failed restore is
    /// the only fatal error: subsequent tenants' data would be mis-attributed.
    #[error("tenant context error: {0}")]
    TenantContext(String),
}

pub type Result<T> = std::result::Result<T, MonitorError>;
