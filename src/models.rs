// Report models

use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable identifier of one site within the network.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct TenantId(pub u64);

impl fmt::Display for TenantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// What a counter counts; serializes to lowercase JSON (e.g. "visits").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CounterKind {
    Visits,
    Queries,
}

impl CounterKind {
    /// Key component used by persistent stores.
    pub fn as_str(self) -> &'static str {
        match self {
            CounterKind::Visits => "visits",
            CounterKind::Queries => "queries",
        }
    }
}

/// Round to 2 decimals, half away from zero.
pub fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

/// Host memory in megabytes, `free`-command semantics: used excludes
/// buffers/cache, so used + free need not equal total.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemorySample {
    pub total_mb: f64,
    pub used_mb: f64,
    pub free_mb: f64,
}

impl MemorySample {
    /// Convert a kibibyte triple to rounded megabytes.
    pub fn from_kib(total_kib: f64, used_kib: f64, free_kib: f64) -> Self {
        Self {
            total_mb: round2(total_kib / 1024.0),
            used_mb: round2(used_kib / 1024.0),
            free_mb: round2(free_kib / 1024.0),
        }
    }

    /// Substitute for an unavailable probe.
    pub fn zeroed() -> Self {
        Self {
            total_mb: 0.0,
            used_mb: 0.0,
            free_mb: 0.0,
        }
    }
}

/// 1/5/15-minute load averages, raw OS values, unrounded.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadSample {
    pub one: f64,
    pub five: f64,
    pub fifteen: f64,
}

impl LoadSample {
    pub fn zeroed() -> Self {
        Self {
            one: 0.0,
            five: 0.0,
            fifteen: 0.0,
        }
    }
}

/// Point-in-time storage measurement for one tenant, recomputed fresh on
/// every report (never cached).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageUsage {
    pub database_mb: f64,
    pub uploads_mb: f64,
}

impl StorageUsage {
    pub fn zeroed() -> Self {
        Self {
            database_mb: 0.0,
            uploads_mb: 0.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TenantReport {
    pub tenant: TenantId,
    pub display_name: String,
    pub visits: u64,
    pub queries: u64,
    pub storage: StorageUsage,
    /// True when a counter read or storage scan failed and the affected
    /// fields were zeroed.
    #[serde(default)]
    pub degraded: bool,
}

/// Root snapshot returned by one report generation cycle. Built fresh per
/// invocation and discarded after consumption.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkReport {
    pub memory: MemorySample,
    pub load: LoadSample,
    #[serde(default)]
    pub memory_degraded: bool,
    #[serde(default)]
    pub load_degraded: bool,
    pub tenants: Vec<TenantReport>,
    /// True when the deadline expired before all tenants were scanned.
    #[serde(default)]
    pub truncated: bool,
}
