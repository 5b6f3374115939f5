//! System resource detection
//!
//! Collects CPU, memory, OS, disk and boot-time information, plus a
//! point-in-time usage snapshot for embedding in benchmark reports.

use chrono::{DateTime, Local, TimeZone};
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use std::time::Duration;
use sysinfo::{Disks, System};

/// Complete system information snapshot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemInfo {
    /// CPU information
    pub cpu: CpuInfo,
    /// Memory information
    pub memory: MemoryInfo,
    /// Operating system information
    pub os: OsInfo,
    /// Mounted disks
    pub disks: Vec<DiskInfo>,
    /// Boot time, if the platform reports it
    pub boot_time: Option<DateTime<Local>>,
}

/// CPU information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CpuInfo {
    /// Total number of logical CPUs
    pub logical_cores: usize,
    /// Number of physical cores
    pub physical_cores: usize,
    /// CPU model name
    pub model: String,
    /// Vendor (Intel, AMD, ARM, etc.)
    pub vendor: String,
    /// CPU architecture
    pub arch: String,
    /// Current frequency in MHz per logical CPU
    pub frequencies_mhz: Vec<u64>,
}

/// Memory information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryInfo {
    /// Total physical memory in bytes
    pub total: u64,
    /// Available memory in bytes
    pub available: u64,
    /// Used memory in bytes
    pub used: u64,
    /// Swap total in bytes
    pub swap_total: u64,
    /// Swap used in bytes
    pub swap_used: u64,
}

/// Operating system information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OsInfo {
    /// OS name (e.g. "Ubuntu", "Windows")
    pub name: String,
    /// OS version
    pub version: String,
    /// Long OS version string
    pub long_version: String,
    /// Kernel version
    pub kernel: String,
}

/// Mounted disk information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiskInfo {
    /// Mount point path
    pub mount_point: String,
    /// Device name
    pub device: String,
    /// Filesystem type
    pub fs_type: String,
    /// Total space in bytes
    pub total_bytes: u64,
    /// Available space in bytes
    pub available_bytes: u64,
    /// Removable media
    pub removable: bool,
}

fn unknown(value: Option<String>) -> String {
    value.unwrap_or_else(|| "Unknown".to_string())
}

fn percent(part: u64, whole: u64) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64 * 100.0
    }
}

fn size(bytes: u64) -> String {
    humansize::format_size(bytes, humansize::BINARY)
}

impl SystemInfo {
    /// Collect complete system information
    pub fn collect() -> Self {
        let mut sys = System::new_all();
        sys.refresh_all();

        SystemInfo {
            cpu: CpuInfo::collect(&sys),
            memory: MemoryInfo::collect(&sys),
            os: OsInfo::collect(),
            disks: DiskInfo::collect(),
            boot_time: Local.timestamp_opt(System::boot_time() as i64, 0).single(),
        }
    }

    /// Print system summary to console
    pub fn print_summary(&self) {
        println!("=== System Information ===\n");

        println!("CPU:");
        println!("{}", indent(&self.cpu.describe()));

        println!("\nMemory:");
        println!("{}", indent(&self.memory.describe_ram()));
        println!("{}", indent(&self.memory.describe_swap()));

        println!("\nOperating System:");
        println!("{}", indent(&self.os.describe()));

        if !self.disks.is_empty() {
            println!("\nDisks:");
            println!("{}", indent(&DiskInfo::describe_all(&self.disks)));
        }

        if let Some(boot) = self.boot_time {
            println!("\nBoot time: {}", boot.format("%Y-%m-%d %H:%M:%S"));
        }

        println!("\nSuggested worker count: {}", self.cpu.logical_cores);
    }
}

fn indent(text: &str) -> String {
    text.lines()
        .map(|line| format!("  {}", line))
        .collect::<Vec<_>>()
        .join("\n")
}

impl CpuInfo {
    /// Collect CPU information
    pub fn collect(sys: &System) -> Self {
        let cpus = sys.cpus();

        let model = cpus
            .first()
            .map(|c| c.brand().trim().to_string())
            .unwrap_or_else(|| "Unknown".to_string());

        let vendor = cpus
            .first()
            .map(|c| c.vendor_id().to_string())
            .unwrap_or_else(|| "Unknown".to_string());

        CpuInfo {
            logical_cores: num_cpus::get(),
            physical_cores: num_cpus::get_physical(),
            model,
            vendor,
            arch: std::env::consts::ARCH.to_string(),
            frequencies_mhz: cpus.iter().map(|c| c.frequency()).collect(),
        }
    }

    /// Text block for reports
    pub fn describe(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "Brand: {}", self.model);
        let _ = writeln!(out, "Vendor: {}", self.vendor);
        let _ = writeln!(out, "Architecture: {}", self.arch);
        let _ = writeln!(out, "Physical Cores: {}", self.physical_cores);
        let _ = writeln!(out, "Logical Cores: {}", self.logical_cores);

        let min = self.frequencies_mhz.iter().copied().filter(|f| *f > 0).min();
        let max = self.frequencies_mhz.iter().copied().max();
        if let (Some(min), Some(max)) = (min, max) {
            let _ = writeln!(out, "CPU Frequency: Min = {} MHz, Max = {} MHz", min, max);
        }
        out
    }
}

impl MemoryInfo {
    /// Collect memory information
    pub fn collect(sys: &System) -> Self {
        MemoryInfo {
            total: sys.total_memory(),
            available: sys.available_memory(),
            used: sys.used_memory(),
            swap_total: sys.total_swap(),
            swap_used: sys.used_swap(),
        }
    }

    /// RAM usage in percent
    pub fn ram_percent(&self) -> f64 {
        percent(self.used, self.total)
    }

    /// Free swap in bytes
    pub fn swap_free(&self) -> u64 {
        self.swap_total.saturating_sub(self.swap_used)
    }

    /// Swap usage in percent
    pub fn swap_percent(&self) -> f64 {
        percent(self.swap_used, self.swap_total)
    }

    /// RAM usage text block
    pub fn describe_ram(&self) -> String {
        format!(
            "Total RAM: {}\nAvailable RAM: {}\nUsed RAM: {}\nRAM Usage: {:.1}%",
            size(self.total),
            size(self.available),
            size(self.used),
            self.ram_percent()
        )
    }

    /// Swap usage text block
    pub fn describe_swap(&self) -> String {
        format!(
            "Total Swap: {}\nUsed Swap: {}\nFree Swap: {}\nSwap Usage: {:.1}%",
            size(self.swap_total),
            size(self.swap_used),
            size(self.swap_free()),
            self.swap_percent()
        )
    }
}

impl OsInfo {
    /// Collect operating system information
    pub fn collect() -> Self {
        OsInfo {
            name: unknown(System::name()),
            version: unknown(System::os_version()),
            long_version: unknown(System::long_os_version()),
            kernel: unknown(System::kernel_version()),
        }
    }

    /// Text block for reports
    pub fn describe(&self) -> String {
        format!(
            "OS: {}\nVersion: {}\nRelease: {}\nKernel: {}\nMachine: {}",
            self.name,
            self.version,
            self.long_version,
            self.kernel,
            std::env::consts::ARCH
        )
    }
}

impl DiskInfo {
    /// Collect mounted disks
    pub fn collect() -> Vec<Self> {
        let disks = Disks::new_with_refreshed_list();

        disks
            .iter()
            .map(|disk| DiskInfo {
                mount_point: disk.mount_point().to_string_lossy().to_string(),
                device: disk.name().to_string_lossy().to_string(),
                fs_type: disk.file_system().to_string_lossy().to_string(),
                total_bytes: disk.total_space(),
                available_bytes: disk.available_space(),
                removable: disk.is_removable(),
            })
            .collect()
    }

    /// Text block listing every disk
    pub fn describe_all(disks: &[DiskInfo]) -> String {
        let mut out = String::new();
        for disk in disks {
            let _ = writeln!(
                out,
                "{} ({}, {}): {} free of {}{}",
                disk.mount_point,
                disk.device,
                disk.fs_type,
                size(disk.available_bytes),
                size(disk.total_bytes),
                if disk.removable { " [removable]" } else { "" }
            );
        }
        out
    }
}

/// Cumulative block device I/O since boot
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiskIoCounters {
    /// Bytes read
    pub read_bytes: u64,
    /// Bytes written
    pub write_bytes: u64,
    /// Completed read operations
    pub read_count: u64,
    /// Completed write operations
    pub write_count: u64,
}

/// Sector size used by `/proc/diskstats`, independent of the device
const DISKSTATS_SECTOR_SIZE: u64 = 512;

impl DiskIoCounters {
    /// Sum the counters of every whole disk.
    ///
    /// Returns the reason as an error where counters are not available.
    pub fn collect() -> std::result::Result<Self, String> {
        if !cfg!(target_os = "linux") {
            return Err("unsupported OS".to_string());
        }

        let stats = std::fs::read_to_string("/proc/diskstats")
            .map_err(|e| format!("/proc/diskstats not readable: {}", e))?;

        // Partitions are skipped so their I/O is not counted twice
        parse_diskstats(&stats, |name| {
            std::path::Path::new("/sys/block").join(name).exists()
        })
        .ok_or_else(|| "no block devices reported".to_string())
    }

    /// Text block for reports
    pub fn describe(&self) -> String {
        const GIB: f64 = 1024.0 * 1024.0 * 1024.0;
        format!(
            "Total Read: {:.2} GB\nTotal Write: {:.2} GB\nRead Count: {}\nWrite Count: {}",
            self.read_bytes as f64 / GIB,
            self.write_bytes as f64 / GIB,
            self.read_count,
            self.write_count
        )
    }
}

/// Sum `/proc/diskstats` lines whose device passes `is_whole_disk`
pub fn parse_diskstats(stats: &str, is_whole_disk: impl Fn(&str) -> bool) -> Option<DiskIoCounters> {
    let mut total = DiskIoCounters::default();
    let mut devices = 0;

    for line in stats.lines() {
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() < 10 || !is_whole_disk(fields[2]) {
            continue;
        }

        let counter = |idx: usize| fields[idx].parse::<u64>().unwrap_or(0);
        total.read_count += counter(3);
        total.read_bytes += counter(5) * DISKSTATS_SECTOR_SIZE;
        total.write_count += counter(7);
        total.write_bytes += counter(9) * DISKSTATS_SECTOR_SIZE;
        devices += 1;
    }

    tracing::debug!("Disk I/O counters summed over {} devices", devices);
    (devices > 0).then_some(total)
}

/// CPU and memory usage sampled over a short interval
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UsageSnapshot {
    /// Usage per logical CPU in percent
    pub per_core: Vec<f32>,
    /// Overall CPU usage in percent
    pub total: f32,
    /// Memory and swap usage
    pub memory: MemoryInfo,
}

impl UsageSnapshot {
    /// Sample CPU usage over `interval` (at least sysinfo's minimum update interval)
    pub fn collect(interval: Duration) -> Self {
        let mut sys = System::new();
        sys.refresh_cpu_usage();
        std::thread::sleep(interval.max(sysinfo::MINIMUM_CPU_UPDATE_INTERVAL));
        sys.refresh_cpu_usage();
        sys.refresh_memory();

        UsageSnapshot {
            per_core: sys.cpus().iter().map(|c| c.cpu_usage()).collect(),
            total: sys.global_cpu_usage(),
            memory: MemoryInfo::collect(&sys),
        }
    }

    /// CPU usage text block
    pub fn describe_cpu(&self) -> String {
        let mut out = String::from("CPU Usage per Core:\n");
        for (idx, usage) in self.per_core.iter().enumerate() {
            let _ = writeln!(out, "  Core {}: {:.1}%", idx, usage);
        }
        let _ = write!(out, "Total CPU Usage: {:.1}%", self.total);
        out
    }

    /// Full usage text block (CPU, RAM, swap)
    pub fn render(&self) -> String {
        format!(
            "{}\n{}\n{}",
            self.describe_cpu(),
            self.memory.describe_ram(),
            self.memory.describe_swap()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn memory() -> MemoryInfo {
        MemoryInfo {
            total: 8 * 1024 * 1024 * 1024,
            available: 6 * 1024 * 1024 * 1024,
            used: 2 * 1024 * 1024 * 1024,
            swap_total: 0,
            swap_used: 0,
        }
    }

    #[test]
    fn test_system_info_collection() {
        let info = SystemInfo::collect();
        assert!(info.cpu.logical_cores > 0);
        assert!(info.cpu.physical_cores > 0);
        assert!(info.memory.total > 0);
    }

    #[test]
    fn test_memory_percentages() {
        let mem = memory();
        assert_eq!(mem.ram_percent(), 25.0);
        // No swap configured must not divide by zero
        assert_eq!(mem.swap_percent(), 0.0);
        assert_eq!(mem.swap_free(), 0);
        assert!(mem.describe_ram().contains("RAM Usage: 25.0%"));
        assert!(mem.describe_ram().contains("Total RAM: 8"));
    }

    #[test]
    fn test_usage_snapshot_render() {
        let snapshot = UsageSnapshot {
            per_core: vec![10.0, 30.5],
            total: 20.25,
            memory: memory(),
        };
        let text = snapshot.render();

        assert!(text.starts_with("CPU Usage per Core:\n  Core 0: 10.0%\n  Core 1: 30.5%\n"));
        assert!(text.contains("Total CPU Usage: 20.2%") || text.contains("Total CPU Usage: 20.3%"));
        assert!(text.contains("Swap Usage: 0.0%"));
    }

    #[test]
    fn test_cpu_describe() {
        let cpu = CpuInfo {
            logical_cores: 8,
            physical_cores: 4,
            model: "Test CPU".to_string(),
            vendor: "TestVendor".to_string(),
            arch: "x86_64".to_string(),
            frequencies_mhz: vec![0, 2400, 3600],
        };
        let text = cpu.describe();

        assert!(text.contains("Physical Cores: 4"));
        assert!(text.contains("CPU Frequency: Min = 2400 MHz, Max = 3600 MHz"));
    }

    #[test]
    fn test_parse_diskstats_skips_partitions() {
        let stats = "\
   8       0 sda 1000 10 20000 500 2000 20 40000 800 0 900 1300
   8       1 sda1 900 5 18000 450 1900 15 38000 700 0 800 1150
 259       0 nvme0n1 10 0 8 1 4 0 16 2 0 3 3
";
        let counters = parse_diskstats(stats, |name| !name.ends_with('1') || name == "nvme0n1").unwrap();

        assert_eq!(counters.read_count, 1010);
        assert_eq!(counters.write_count, 2004);
        assert_eq!(counters.read_bytes, (20000 + 8) * 512);
        assert_eq!(counters.write_bytes, (40000 + 16) * 512);
    }

    #[test]
    fn test_parse_diskstats_without_devices() {
        assert_eq!(parse_diskstats("", |_| true), None);
        assert_eq!(parse_diskstats("   8 0 sda 1 2 3", |_| true), None);
    }

    #[test]
    fn test_disk_io_describe() {
        let counters = DiskIoCounters {
            read_bytes: 3 * 1024 * 1024 * 1024,
            write_bytes: 512 * 1024 * 1024,
            read_count: 42,
            write_count: 7,
        };

        assert_eq!(
            counters.describe(),
            "Total Read: 3.00 GB\nTotal Write: 0.50 GB\nRead Count: 42\nWrite Count: 7"
        );
    }
}
