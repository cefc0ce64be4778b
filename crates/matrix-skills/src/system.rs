//! Battery, CPU, memory and disk status.

use std::path::{Path, PathBuf};

use matrix_core::command::SystemQuery;
use matrix_core::helpers::format_bytes;
use sysinfo::{Disks, System};

use crate::error::{SkillError, SkillResult};

const POWER_SUPPLY_DIR: &str = "/sys/class/power_supply";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Battery {
    pub percent: u8,
    pub charging: bool,
}

impl Battery {
    pub fn describe(&self) -> String {
        if self.charging {
            format!("Battery is at {}% and charging.", self.percent)
        } else {
            format!("Battery is at {}%.", self.percent)
        }
    }
}

/// Read the first `BAT*` entry under a power-supply directory.
pub fn read_battery(power_supply: &Path) -> Option<Battery> {
    let mut batteries: Vec<PathBuf> = std::fs::read_dir(power_supply)
        .ok()?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| {
            path.file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.starts_with("BAT"))
        })
        .collect();
    batteries.sort();

    let battery = batteries.first()?;
    let percent = std::fs::read_to_string(battery.join("capacity"))
        .ok()?
        .trim()
        .parse::<u8>()
        .ok()?;
    let charging = std::fs::read_to_string(battery.join("status"))
        .is_ok_and(|s| matches!(s.trim(), "Charging" | "Full"));

    Some(Battery {
        percent: percent.min(100),
        charging,
    })
}

/// Used share of a total, in percent.
pub fn percent_of(used: u64, total: u64) -> f64 {
    if total == 0 {
        0.0
    } else {
        used as f64 / total as f64 * 100.0
    }
}

fn usage_line(what: &str, used: u64, total: u64) -> String {
    format!(
        "{what} usage is {:.1}% ({} of {} used).",
        percent_of(used, total),
        format_bytes(used),
        format_bytes(total)
    )
}

pub fn battery_status() -> SkillResult<String> {
    if !cfg!(target_os = "linux") {
        return Err(SkillError::Unsupported("Battery status"));
    }
    Ok(read_battery(Path::new(POWER_SUPPLY_DIR)).map_or_else(
        || String::from("No battery found on this computer."),
        |battery| battery.describe(),
    ))
}

/// CPU usage needs two samples spaced by the minimum update interval.
pub async fn cpu_usage() -> String {
    let mut sys = System::new();
    sys.refresh_cpu_usage();
    tokio::time::sleep(sysinfo::MINIMUM_CPU_UPDATE_INTERVAL).await;
    sys.refresh_cpu_usage();
    format!("CPU usage is {:.1}%.", sys.global_cpu_usage())
}

pub fn memory_usage() -> String {
    let mut sys = System::new();
    sys.refresh_memory();
    usage_line("Memory", sys.used_memory(), sys.total_memory())
}

/// Usage of the disk mounted at `/`, or the first disk when none is.
pub fn disk_usage() -> SkillResult<String> {
    let disks = Disks::new_with_refreshed_list();
    let disk = disks
        .list()
        .iter()
        .find(|d| d.mount_point() == Path::new("/"))
        .or_else(|| disks.list().first())
        .ok_or_else(|| SkillError::NotFound {
            what: "disk",
            name: String::from("/"),
        })?;

    let total = disk.total_space();
    let used = total.saturating_sub(disk.available_space());
    Ok(usage_line("Disk", used, total))
}

pub async fn full_status() -> String {
    let mut lines = vec![cpu_usage().await, memory_usage()];
    if let Ok(disk) = disk_usage() {
        lines.push(disk);
    }
    if let Ok(battery) = battery_status() {
        lines.push(battery);
    }
    lines.join(" ")
}

pub async fn query(query: SystemQuery) -> SkillResult<String> {
    tracing::debug!("System query: {:?}", query);
    match query {
        SystemQuery::Battery => battery_status(),
        SystemQuery::Cpu => Ok(cpu_usage().await),
        SystemQuery::Memory => Ok(memory_usage()),
        SystemQuery::Disk => disk_usage(),
        SystemQuery::Full => Ok(full_status().await),
    }
}
