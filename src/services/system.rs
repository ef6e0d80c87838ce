//! Host system information.
//!
//! SYSTEM CONTEXT
//! ==============
//! The dashboard polls `/api/v1/system/*` for host facts and live
//! cpu/memory/disk/load/network numbers. Everything comes from `/proc` and
//! `statvfs`; the text parsers are pure functions over file contents so
//! they can be tested against captured fixtures.

use std::collections::HashSet;
use std::fs;
use std::io;
use std::time::Duration;

use serde::Serialize;

/// Sampling gap for CPU usage: two `/proc/stat` reads this far apart.
const CPU_SAMPLE_GAP: Duration = Duration::from_millis(200);

// =============================================================================
// MODELS
// =============================================================================

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemInfo {
    pub hostname: String,
    pub os: String,
    pub platform: String,
    pub platform_version: String,
    pub kernel_arch: String,
    pub kernel_version: String,
    pub boot_time: u64,
    pub uptime: u64,
    pub procs: u64,
    pub current_info: CurrentInfo,
}

#[derive(Debug, Clone, Serialize)]
pub struct CurrentInfo {
    #[serde(rename = "cpuInfo")]
    pub cpu: CpuInfo,
    #[serde(rename = "memoryInfo")]
    pub memory: MemoryInfo,
    #[serde(rename = "diskInfo")]
    pub disks: Vec<DiskInfo>,
    #[serde(rename = "loadInfo")]
    pub load: LoadInfo,
    #[serde(rename = "networkInfo")]
    pub network: NetworkInfo,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CpuInfo {
    pub cores: u32,
    pub logical_cores: u32,
    pub model_name: String,
    pub mhz: f64,
    pub used_percent: f64,
    pub per_core_percent: Vec<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MemoryInfo {
    pub total: u64,
    pub used: u64,
    pub free: u64,
    pub available: u64,
    pub used_percent: f64,
    pub cached: u64,
    pub buffers: u64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiskInfo {
    pub device: String,
    pub mountpoint: String,
    pub fstype: String,
    pub total: u64,
    pub used: u64,
    pub free: u64,
    pub used_percent: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadInfo {
    pub load1: f64,
    pub load5: f64,
    pub load15: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkInfo {
    pub bytes_sent: u64,
    pub bytes_recv: u64,
    pub packets_sent: u64,
    pub packets_recv: u64,
}

// =============================================================================
// PARSERS (pure, fixture-testable)
// =============================================================================

fn meminfo_field(contents: &str, name: &str) -> u64 {
    // Lines look like `MemTotal:       16384000 kB`; values are kB.
    contents
        .lines()
        .find_map(|line| {
            let rest = line.strip_prefix(name)?.strip_prefix(':')?;
            rest.split_whitespace().next()?.parse::<u64>().ok()
        })
        .unwrap_or(0)
        * 1024
}

#[must_use]
pub fn parse_meminfo(contents: &str) -> MemoryInfo {
    let total = meminfo_field(contents, "MemTotal");
    let free = meminfo_field(contents, "MemFree");
    let available = meminfo_field(contents, "MemAvailable");
    let cached = meminfo_field(contents, "Cached");
    let buffers = meminfo_field(contents, "Buffers");

    let used = total.saturating_sub(free).saturating_sub(cached).saturating_sub(buffers);
    #[allow(clippy::cast_precision_loss)]
    let used_percent = if total == 0 { 0.0 } else { used as f64 / total as f64 * 100.0 };

    MemoryInfo { total, used, free, available, used_percent, cached, buffers }
}

#[must_use]
pub fn parse_loadavg(contents: &str) -> LoadInfo {
    let mut fields = contents.split_whitespace();
    let mut next = || fields.next().and_then(|f| f.parse::<f64>().ok()).unwrap_or(0.0);
    LoadInfo { load1: next(), load5: next(), load15: next() }
}

/// Whole seconds of uptime from `/proc/uptime`.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn parse_uptime(contents: &str) -> u64 {
    contents
        .split_whitespace()
        .next()
        .and_then(|f| f.parse::<f64>().ok())
        .map_or(0, |secs| secs as u64)
}

/// One `cpuN` (or aggregate `cpu`) line from `/proc/stat`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CpuTimes {
    pub idle: u64,
    pub total: u64,
}

/// Parse the `cpu*` lines of `/proc/stat`. Index 0 is the aggregate line,
/// the rest are per-core in order.
#[must_use]
pub fn parse_cpu_stat(contents: &str) -> Vec<CpuTimes> {
    contents
        .lines()
        .filter(|line| line.starts_with("cpu"))
        .map(|line| {
            let fields: Vec<u64> = line
                .split_whitespace()
                .skip(1)
                .filter_map(|f| f.parse::<u64>().ok())
                .collect();
            // idle counts idle + iowait.
            let idle = fields.get(3).copied().unwrap_or(0) + fields.get(4).copied().unwrap_or(0);
            let total = fields.iter().sum();
            CpuTimes { idle, total }
        })
        .collect()
}

/// Usage percent between two samples of the same line.
#[must_use]
pub fn cpu_percent(prev: CpuTimes, curr: CpuTimes) -> f64 {
    let total = curr.total.saturating_sub(prev.total);
    if total == 0 {
        return 0.0;
    }
    let idle = curr.idle.saturating_sub(prev.idle);
    #[allow(clippy::cast_precision_loss)]
    let busy = (total.saturating_sub(idle)) as f64 / total as f64 * 100.0;
    busy.clamp(0.0, 100.0)
}

fn cpuinfo_value<'a>(contents: &'a str, name: &str) -> Option<&'a str> {
    contents.lines().find_map(|line| {
        let (key, value) = line.split_once(':')?;
        (key.trim() == name).then(|| value.trim())
    })
}

/// (physical cores, logical cores, model name, MHz) from `/proc/cpuinfo`.
#[must_use]
pub fn parse_cpuinfo(contents: &str) -> (u32, u32, String, f64) {
    #[allow(clippy::cast_possible_truncation)]
    let logical = contents.lines().filter(|l| l.starts_with("processor")).count() as u32;
    let cores = cpuinfo_value(contents, "cpu cores")
        .and_then(|v| v.parse::<u32>().ok())
        .unwrap_or(logical);
    let model = cpuinfo_value(contents, "model name").unwrap_or("unknown").to_owned();
    let mhz = cpuinfo_value(contents, "cpu MHz")
        .and_then(|v| v.parse::<f64>().ok())
        .unwrap_or(0.0);
    (cores, logical, model, mhz)
}

/// Aggregate counters over all interfaces except loopback.
#[must_use]
pub fn parse_net_dev(contents: &str) -> NetworkInfo {
    let mut net = NetworkInfo::default();
    for line in contents.lines().skip(2) {
        let Some((iface, rest)) = line.split_once(':') else {
            continue;
        };
        if iface.trim() == "lo" {
            continue;
        }
        let fields: Vec<u64> = rest.split_whitespace().filter_map(|f| f.parse::<u64>().ok()).collect();
        // rx: bytes packets ... (fields 0,1); tx starts at field 8.
        net.bytes_recv += fields.first().copied().unwrap_or(0);
        net.packets_recv += fields.get(1).copied().unwrap_or(0);
        net.bytes_sent += fields.get(8).copied().unwrap_or(0);
        net.packets_sent += fields.get(9).copied().unwrap_or(0);
    }
    net
}

/// (device, mountpoint, fstype) triples for real block devices, first
/// mount per device.
#[must_use]
pub fn parse_mounts(contents: &str) -> Vec<(String, String, String)> {
    let mut seen = HashSet::new();
    contents
        .lines()
        .filter_map(|line| {
            let mut fields = line.split_whitespace();
            let device = fields.next()?;
            let mountpoint = fields.next()?;
            let fstype = fields.next()?;
            if !device.starts_with("/dev/") || !seen.insert(device.to_owned()) {
                return None;
            }
            Some((device.to_owned(), mountpoint.to_owned(), fstype.to_owned()))
        })
        .collect()
}

// =============================================================================
// COLLECTORS
// =============================================================================

#[cfg(unix)]
#[allow(clippy::unnecessary_cast)]
fn statvfs(path: &str) -> Option<(u64, u64, u64)> {
    let c_path = std::ffi::CString::new(path).ok()?;
    let mut stat: libc::statvfs = unsafe { std::mem::zeroed() };
    if unsafe { libc::statvfs(c_path.as_ptr(), &raw mut stat) } != 0 {
        return None;
    }
    // f_* field widths vary by platform.
    let frsize = stat.f_frsize as u64;
    Some((stat.f_blocks as u64 * frsize, stat.f_bfree as u64 * frsize, stat.f_bavail as u64 * frsize))
}

#[cfg(unix)]
fn disk_usage() -> Vec<DiskInfo> {
    let mounts = fs::read_to_string("/proc/mounts").unwrap_or_default();
    parse_mounts(&mounts)
        .into_iter()
        .filter_map(|(device, mountpoint, fstype)| {
            let (total, free, _avail) = statvfs(&mountpoint)?;
            if total == 0 {
                return None;
            }
            let used = total.saturating_sub(free);
            #[allow(clippy::cast_precision_loss)]
            let used_percent = used as f64 / total as f64 * 100.0;
            Some(DiskInfo { device, mountpoint, fstype, total, used, free, used_percent })
        })
        .collect()
}

#[cfg(not(unix))]
fn disk_usage() -> Vec<DiskInfo> {
    Vec::new()
}

fn process_count() -> u64 {
    fs::read_dir("/proc")
        .map(|entries| {
            entries
                .filter_map(Result::ok)
                .filter(|e| e.file_name().to_string_lossy().chars().all(|c| c.is_ascii_digit()))
                .count() as u64
        })
        .unwrap_or(0)
}

/// Live cpu/memory/disk/load/network snapshot. Sleeps ~200 ms to sample
/// CPU usage.
pub async fn current_info() -> io::Result<CurrentInfo> {
    let first = parse_cpu_stat(&fs::read_to_string("/proc/stat")?);
    tokio::time::sleep(CPU_SAMPLE_GAP).await;
    let second = parse_cpu_stat(&fs::read_to_string("/proc/stat")?);

    let percents: Vec<f64> = first
        .iter()
        .zip(second.iter())
        .map(|(prev, curr)| cpu_percent(*prev, *curr))
        .collect();
    let used_percent = percents.first().copied().unwrap_or(0.0);
    let per_core_percent = percents.get(1..).unwrap_or_default().to_vec();

    let cpuinfo = fs::read_to_string("/proc/cpuinfo").unwrap_or_default();
    let (cores, logical_cores, model_name, mhz) = parse_cpuinfo(&cpuinfo);

    Ok(CurrentInfo {
        cpu: CpuInfo { cores, logical_cores, model_name, mhz, used_percent, per_core_percent },
        memory: parse_meminfo(&fs::read_to_string("/proc/meminfo")?),
        disks: disk_usage(),
        load: parse_loadavg(&fs::read_to_string("/proc/loadavg")?),
        network: parse_net_dev(&fs::read_to_string("/proc/net/dev").unwrap_or_default()),
    })
}

/// Static host facts plus a current snapshot.
pub async fn system_info() -> io::Result<SystemInfo> {
    let uptime = parse_uptime(&fs::read_to_string("/proc/uptime")?);
    #[allow(clippy::cast_sign_loss)]
    let now = time::OffsetDateTime::now_utc().unix_timestamp() as u64;

    let os_release = fs::read_to_string("/etc/os-release").unwrap_or_default();
    let platform = os_release_field(&os_release, "NAME").unwrap_or_else(|| std::env::consts::OS.to_owned());
    let platform_version = os_release_field(&os_release, "VERSION_ID").unwrap_or_default();

    Ok(SystemInfo {
        hostname: fs::read_to_string("/etc/hostname").unwrap_or_default().trim().to_owned(),
        os: std::env::consts::OS.to_owned(),
        platform,
        platform_version,
        kernel_arch: std::env::consts::ARCH.to_owned(),
        kernel_version: fs::read_to_string("/proc/sys/kernel/osrelease")
            .unwrap_or_default()
            .trim()
            .to_owned(),
        boot_time: now.saturating_sub(uptime),
        uptime,
        procs: process_count(),
        current_info: current_info().await?,
    })
}

/// Unquoted value of a `KEY=value` line in `/etc/os-release`.
#[must_use]
pub fn os_release_field(contents: &str, key: &str) -> Option<String> {
    contents.lines().find_map(|line| {
        let value = line.strip_prefix(key)?.strip_prefix('=')?;
        Some(value.trim().trim_matches('"').to_owned())
    })
}

#[cfg(test)]
#[path = "system_test.rs"]
mod tests;
