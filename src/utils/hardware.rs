use serde::Serialize;
use sysinfo::System;

/// The machine generating the load, recorded alongside each run so results
/// from different hosts are not compared blindly.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HostInfo {
    pub cpu_cores: u64,
    pub total_memory: u64,
    pub available_memory: u64,
}

/// Refreshes CPU and memory only. A full refresh scans every process and
/// blocks the calling runtime thread.
pub fn get_hardware_info() -> HostInfo {
    let mut sys = System::new();
    sys.refresh_cpu();
    sys.refresh_memory();

    HostInfo {
        cpu_cores: sys.cpus().len() as u64,
        total_memory: sys.total_memory(),
        available_memory: sys.available_memory(),
    }
}
