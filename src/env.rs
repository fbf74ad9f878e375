//! Host metadata recorded alongside a run.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sysinfo::{RefreshKind, System};

/// Host description stored next to the timings so runs on different machines
/// can be told apart.
#[derive(Debug, Clone, Serialize)]
pub struct EnvMetadata {
    /// When the run started.
    pub timestamp_utc: DateTime<Utc>,
    /// Machine hostname.
    pub hostname: Option<String>,
    /// Long OS name and version.
    pub os_version: Option<String>,
    /// Kernel version string.
    pub kernel_version: Option<String>,
    /// Brand string of the first CPU.
    pub cpu_brand: Option<String>,
    /// Physical core count, when the platform reports it.
    pub cpu_physical_cores: Option<usize>,
    /// Logical CPUs visible to the process, at least 1.
    pub cpu_logical_cores: usize,
    /// Installed memory in bytes.
    pub total_memory_bytes: u64,
}

impl EnvMetadata {
    /// Samples the current host.
    pub fn collect() -> Self {
        let mut sys = System::new_with_specifics(RefreshKind::everything());
        sys.refresh_all();
        Self {
            timestamp_utc: Utc::now(),
            hostname: System::host_name(),
            os_version: System::long_os_version(),
            kernel_version: System::kernel_version(),
            cpu_brand: sys.cpus().first().map(|cpu| cpu.brand().trim().to_string()),
            cpu_physical_cores: sys.physical_core_count(),
            cpu_logical_cores: sys.cpus().len().max(1),
            total_memory_bytes: sys.total_memory(),
        }
    }

    /// True when `threads` asks for more workers than there are logical CPUs.
    pub fn oversubscribed(&self, threads: u32) -> bool {
        usize::try_from(threads).map_or(true, |t| t > self.cpu_logical_cores)
    }
}
