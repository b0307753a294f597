//! Snapshots of memory, disks, CPU and processes.
//!
//! The built-ins `free`, `df`, `ps`, `uptime` and `lscpu` only format these
//! records; where the numbers come from is behind [`SystemMonitor`].

use anyhow::Result;
use std::time::Duration;

/// Memory and swap, in bytes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryInfo {
    pub total: u64,
    pub free: u64,
    pub available: u64,
    pub buffers: u64,
    pub cached: u64,
    pub shared: u64,
    pub swap_total: u64,
    pub swap_free: u64,
}

impl MemoryInfo {
    pub fn used(&self) -> u64 {
        self.total
            .saturating_sub(self.free)
            .saturating_sub(self.buffers)
            .saturating_sub(self.cached)
    }

    pub fn swap_used(&self) -> u64 {
        self.swap_total.saturating_sub(self.swap_free)
    }
}

/// One mounted filesystem, sizes in bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiskInfo {
    pub device: String,
    pub mount_point: String,
    pub fs_type: String,
    pub total: u64,
    pub used: u64,
    pub available: u64,
}

impl DiskInfo {
    /// Percentage of the space usable by unprivileged users that is taken,
    /// rounded up like `df` does.
    pub fn use_percent(&self) -> u64 {
        let denom = self.used + self.available;
        if denom == 0 {
            return 0;
        }
        (self.used * 100).div_ceil(denom)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CpuInfo {
    pub model: String,
    pub cores: usize,
    /// 1, 5 and 15 minute load averages.
    pub load: [f32; 3],
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessInfo {
    pub pid: i32,
    pub ppid: i32,
    pub name: String,
    pub state: char,
    /// Resident set size in bytes.
    pub rss: u64,
    /// User plus system CPU time.
    pub cpu_time: Duration,
}

/// Source of system information.
pub trait SystemMonitor {
    fn memory(&self) -> Result<MemoryInfo>;
    fn disks(&self) -> Result<Vec<DiskInfo>>;
    fn cpu(&self) -> Result<CpuInfo>;
    /// Processes sorted by pid.
    fn processes(&self) -> Result<Vec<ProcessInfo>>;
    fn uptime(&self) -> Result<Duration>;
}

/// The monitor for the current platform.
pub fn default_monitor() -> Box<dyn SystemMonitor> {
    #[cfg(target_os = "linux")]
    {
        Box::new(ProcfsMonitor)
    }
    #[cfg(not(target_os = "linux"))]
    {
        Box::new(UnsupportedMonitor)
    }
}

#[cfg(target_os = "linux")]
pub use procfs_monitor::ProcfsMonitor;

#[cfg(target_os = "linux")]
mod procfs_monitor {
    use super::*;
    use anyhow::Context;
    use procfs::Current;
    use tracing::warn;

    /// Reads `/proc` through the `procfs` crate; disk figures come from `statvfs`.
    #[derive(Debug, Default, Clone, Copy)]
    pub struct ProcfsMonitor;

    impl SystemMonitor for ProcfsMonitor {
        fn memory(&self) -> Result<MemoryInfo> {
            let info = procfs::Meminfo::current().context("reading /proc/meminfo")?;
            Ok(MemoryInfo {
                total: info.mem_total,
                free: info.mem_free,
                available: info.mem_available.unwrap_or(info.mem_free),
                buffers: info.buffers,
                cached: info.cached,
                shared: info.shmem.unwrap_or(0),
                swap_total: info.swap_total,
                swap_free: info.swap_free,
            })
        }

        fn disks(&self) -> Result<Vec<DiskInfo>> {
            let mounts = std::fs::read_to_string("/proc/mounts").context("reading /proc/mounts")?;
            let mut disks = Vec::new();
            for line in mounts.lines() {
                let mut fields = line.split_whitespace();
                let (Some(device), Some(mount_point), Some(fs_type)) =
                    (fields.next(), fields.next(), fields.next())
                else {
                    continue;
                };
                if !device.starts_with("/dev/") {
                    continue;
                }
                let mount_point = unescape_mount(mount_point);
                let stat = match nix::sys::statvfs::statvfs(mount_point.as_str()) {
                    Ok(stat) => stat,
                    Err(err) => {
                        warn!(mount = %mount_point, %err, "statvfs failed");
                        continue;
                    }
                };
                let unit = stat.fragment_size() as u64;
                let total = stat.blocks() as u64 * unit;
                let free = stat.blocks_free() as u64 * unit;
                disks.push(DiskInfo {
                    device: device.to_string(),
                    mount_point,
                    fs_type: fs_type.to_string(),
                    total,
                    used: total.saturating_sub(free),
                    available: stat.blocks_available() as u64 * unit,
                });
            }
            Ok(disks)
        }

        fn cpu(&self) -> Result<CpuInfo> {
            let info = procfs::CpuInfo::current().context("reading /proc/cpuinfo")?;
            let load = procfs::LoadAverage::current().context("reading /proc/loadavg")?;
            Ok(CpuInfo {
                model: info.model_name(0).unwrap_or("unknown").to_string(),
                cores: info.num_cores(),
                load: [load.one, load.five, load.fifteen],
            })
        }

        fn processes(&self) -> Result<Vec<ProcessInfo>> {
            let page_size = procfs::page_size();
            let ticks = procfs::ticks_per_second().max(1);
            let mut processes = Vec::new();
            for process in procfs::process::all_processes().context("listing /proc")? {
                // Processes may exit between listing and reading.
                let Ok(stat) = process.and_then(|p| p.stat()) else {
                    continue;
                };
                let cpu_ticks = stat.utime + stat.stime;
                processes.push(ProcessInfo {
                    pid: stat.pid,
                    ppid: stat.ppid,
                    name: stat.comm,
                    state: stat.state,
                    rss: stat.rss * page_size,
                    cpu_time: Duration::from_millis(cpu_ticks * 1000 / ticks),
                });
            }
            processes.sort_by_key(|p| p.pid);
            Ok(processes)
        }

        fn uptime(&self) -> Result<Duration> {
            let uptime = procfs::Uptime::current().context("reading /proc/uptime")?;
            Ok(Duration::from_secs_f64(uptime.uptime))
        }
    }

    /// `/proc/mounts` escapes spaces and a few other bytes as octal.
    fn unescape_mount(field: &str) -> String {
        field
            .replace("\\040", " ")
            .replace("\\011", "\t")
            .replace("\\012", "\n")
            .replace("\\134", "\\")
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn unescapes_octal_sequences() {
            assert_eq!(unescape_mount("/media/usb\\040stick"), "/media/usb stick");
            assert_eq!(unescape_mount("/plain"), "/plain");
        }

        #[test]
        fn reads_live_proc() {
            let monitor = ProcfsMonitor;
            let mem = monitor.memory().unwrap();
            assert!(mem.total > 0);
            assert!(monitor.cpu().unwrap().cores >= 1);
            let me = std::process::id() as i32;
            assert!(monitor.processes().unwrap().iter().any(|p| p.pid == me));
            assert!(monitor.uptime().unwrap() > Duration::ZERO);
        }
    }
}

/// Used where no system information source is available.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnsupportedMonitor;

impl SystemMonitor for UnsupportedMonitor {
    fn memory(&self) -> Result<MemoryInfo> {
        anyhow::bail!("memory information is not supported on this platform")
    }

    fn disks(&self) -> Result<Vec<DiskInfo>> {
        anyhow::bail!("disk information is not supported on this platform")
    }

    fn cpu(&self) -> Result<CpuInfo> {
        anyhow::bail!("CPU information is not supported on this platform")
    }

    fn processes(&self) -> Result<Vec<ProcessInfo>> {
        anyhow::bail!("process listing is not supported on this platform")
    }

    fn uptime(&self) -> Result<Duration> {
        anyhow::bail!("uptime is not supported on this platform")
    }
}

/// Formats a byte count with a binary unit suffix: `512B`, `1.5K`, `12G`.
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: [&str; 6] = ["B", "K", "M", "G", "T", "P"];
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{}B", bytes)
    } else if value < 10.0 {
        format!("{:.1}{}", value, UNITS[unit])
    } else {
        format!("{:.0}{}", value, UNITS[unit])
    }
}

/// `1 day, 3:04` / `17 min` style, as printed by `uptime`.
pub fn format_uptime(uptime: Duration) -> String {
    let total_minutes = uptime.as_secs() / 60;
    let days = total_minutes / (24 * 60);
    let hours = (total_minutes / 60) % 24;
    let minutes = total_minutes % 60;
    let clock = if hours == 0 {
        format!("{} min", minutes)
    } else {
        format!("{}:{:02}", hours, minutes)
    };
    match days {
        0 => clock,
        1 => format!("1 day, {}", clock),
        n => format!("{} days, {}", n, clock),
    }
}
