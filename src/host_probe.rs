// Host memory and load sampling via sysinfo, with a /proc/meminfo reader
// on Linux for `free`-style used/free figures.

pub mod linux;

use crate::error::{MonitorError, Result};
use crate::models::{LoadSample, MemorySample};
use std::sync::Arc;
use sysinfo::{MemoryRefreshKind, RefreshKind, System};

pub trait HostProbe {
    /// Best-effort memory sample; `ProbeUnavailable` when the OS exposes no
    /// usable figures. Callers substitute a zeroed sample, never abort.
    fn sample_memory(&self) -> impl Future<Output = Result<MemorySample>> + Send;

    /// 1/5/15-minute load averages; `ProbeUnavailable` on platforms without
    /// the facility.
    fn sample_load(&self) -> impl Future<Output = Result<LoadSample>> + Send;
}

pub struct SysinfoProbe {
    sys: Arc<std::sync::Mutex<System>>,
}

impl Default for SysinfoProbe {
    fn default() -> Self {
        Self::new()
    }
}

impl SysinfoProbe {
    pub fn new() -> Self {
        let sys = System::new_with_specifics(
            RefreshKind::nothing().with_memory(MemoryRefreshKind::everything()),
        );
        Self {
            sys: Arc::new(std::sync::Mutex::new(sys)),
        }
    }
}

impl HostProbe for SysinfoProbe {
    async fn sample_memory(&self) -> Result<MemorySample> {
        let sys = self.sys.clone();
        tokio::task::spawn_blocking(move || {
            // Prefer /proc/meminfo: its buffer/cache breakdown gives the
            // same used/free split as the `free` command.
            if let Some((total_kib, used_kib, free_kib)) = linux::read_meminfo() {
                return Ok(MemorySample::from_kib(
                    total_kib as f64,
                    used_kib as f64,
                    free_kib as f64,
                ));
            }

            let mut sys = sys
                .lock()
                .map_err(|e| MonitorError::ProbeUnavailable(format!("sysinfo lock poisoned: {}", e)))?;
            sys.refresh_memory();

            let total = sys.total_memory();
            if total == 0 {
                return Err(MonitorError::ProbeUnavailable(
                    "no memory statistics reported".into(),
                ));
            }
            let used = sys.used_memory();
            let free = sys.free_memory();
            Ok(MemorySample::from_kib(
                total as f64 / 1024.0,
                used as f64 / 1024.0,
                free as f64 / 1024.0,
            ))
        })
        .await
        .map_err(|e| MonitorError::ProbeUnavailable(format!("sysinfo task join: {}", e)))?
    }

    async fn sample_load(&self) -> Result<LoadSample> {
        tokio::task::spawn_blocking(|| {
            if cfg!(target_os = "windows") {
                return Err(MonitorError::ProbeUnavailable(
                    "load averages not available on this platform".into(),
                ));
            }
            let avg = System::load_average();
            Ok(LoadSample {
                one: avg.one,
                five: avg.five,
                fifteen: avg.fifteen,
            })
        })
        .await
        .map_err(|e| MonitorError::ProbeUnavailable(format!("sysinfo task join: {}", e)))?
    }
}
