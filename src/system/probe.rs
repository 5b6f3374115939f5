//! Optional hardware capability probes
//!
//! Probes shell out to platform tools (`dmidecode`, `nvidia-smi`, `lspci`,
//! `wmic`). A missing tool or unsupported platform yields an explicit
//! [`Capability::Unavailable`] instead of an error.

use rayon::prelude::*;
use serde::Serialize;
use std::process::Command;

/// Result of a capability probe
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Capability {
    /// Probe succeeded; one line per finding
    Available(Vec<String>),
    /// Information could not be obtained, with the reason
    Unavailable(String),
}

impl Capability {
    /// Check if the probe found anything
    pub fn is_available(&self) -> bool {
        matches!(self, Self::Available(_))
    }

    /// Text block for reports
    pub fn describe(&self) -> String {
        match self {
            Self::Available(lines) => lines.join("\n"),
            Self::Unavailable(reason) => format!("Unavailable: {}", reason),
        }
    }
}

/// Pluggable source of optional hardware information
pub trait CapabilityProbe: Send + Sync {
    /// Section title for reports
    fn title(&self) -> &str;

    /// Gather the information
    fn probe(&self) -> Capability;
}

/// Run all probes concurrently, keeping their order
pub fn run_probes(probes: &[Box<dyn CapabilityProbe>]) -> Vec<(String, Capability)> {
    probes
        .par_iter()
        .map(|probe| {
            let capability = probe.probe();
            if let Capability::Unavailable(reason) = &capability {
                tracing::warn!("{} unavailable: {}", probe.title(), reason);
            }
            (probe.title().to_string(), capability)
        })
        .collect()
}

/// The probes used by the system report
pub fn default_probes() -> Vec<Box<dyn CapabilityProbe>> {
    vec![Box::new(RamSpeedProbe), Box::new(GpuProbe)]
}

fn command_output(program: &str, args: &[&str]) -> Result<String, String> {
    let output = Command::new(program)
        .args(args)
        .output()
        .map_err(|e| format!("{} not runnable: {}", program, e))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(format!("{} exited with {}: {}", program, output.status, stderr.trim()));
    }

    Ok(String::from_utf8_lossy(&output.stdout).to_string())
}

/// Memory module speed
#[derive(Debug, Clone, Copy, Default)]
pub struct RamSpeedProbe;

impl CapabilityProbe for RamSpeedProbe {
    fn title(&self) -> &str {
        "RAM Specifications"
    }

    fn probe(&self) -> Capability {
        let output = if cfg!(target_os = "linux") {
            command_output("dmidecode", &["-t", "memory"]).map(|out| parse_dmidecode_speed(&out))
        } else if cfg!(target_os = "windows") {
            command_output("wmic", &["memorychip", "get", "speed"]).map(|out| parse_wmic_speed(&out))
        } else {
            return Capability::Unavailable("unsupported OS".to_string());
        };

        match output {
            Ok(Some(speed)) => Capability::Available(vec![format!("RAM Speed: {}", speed)]),
            Ok(None) => Capability::Unavailable("no memory speed reported".to_string()),
            Err(reason) => Capability::Unavailable(reason),
        }
    }
}

/// First module speed from `dmidecode -t memory` output
pub fn parse_dmidecode_speed(output: &str) -> Option<String> {
    output
        .lines()
        .map(str::trim)
        .filter(|line| line.starts_with("Speed:") && !line.contains("Configured"))
        .filter_map(|line| line.split_once(':').map(|(_, value)| value.trim()))
        .find(|value| !value.is_empty() && *value != "Unknown")
        .map(str::to_string)
}

/// First module speed from `wmic memorychip get speed` output
pub fn parse_wmic_speed(output: &str) -> Option<String> {
    output
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty() && line.chars().all(|c| c.is_ascii_digit()))
        .map(|mhz| format!("{} MHz", mhz))
}

/// Graphics adapters
#[derive(Debug, Clone, Copy, Default)]
pub struct GpuProbe;

impl CapabilityProbe for GpuProbe {
    fn title(&self) -> &str {
        "GPU Specifications"
    }

    fn probe(&self) -> Capability {
        let mut lines = Vec::new();
        let mut reasons = Vec::new();

        match command_output(
            "nvidia-smi",
            &["--query-gpu=name,memory.total,driver_version", "--format=csv,noheader"],
        ) {
            Ok(out) => lines.extend(parse_nvidia_smi(&out)),
            Err(reason) => reasons.push(reason),
        }

        if cfg!(target_os = "linux") {
            match command_output("lspci", &[]) {
                Ok(out) => lines.extend(parse_lspci(&out)),
                Err(reason) => reasons.push(reason),
            }
        }

        if lines.is_empty() {
            if reasons.is_empty() {
                reasons.push("no GPU detected".to_string());
            }
            Capability::Unavailable(reasons.join("; "))
        } else {
            Capability::Available(lines)
        }
    }
}

/// One line per GPU from `nvidia-smi --format=csv,noheader` output
pub fn parse_nvidia_smi(output: &str) -> Vec<String> {
    output
        .lines()
        .filter(|line| !line.trim().is_empty())
        .enumerate()
        .map(|(idx, line)| {
            let fields: Vec<&str> = line.split(',').map(str::trim).collect();
            match fields.as_slice() {
                [name, memory, driver] => {
                    format!("GPU {}: {}, VRAM: {}, Driver: {}", idx, name, memory, driver)
                }
                _ => format!("GPU {}: {}", idx, line.trim()),
            }
        })
        .collect()
}

/// Display controllers from `lspci` output
pub fn parse_lspci(output: &str) -> Vec<String> {
    let mut lines: Vec<String> = output
        .lines()
        .filter(|line| {
            line.contains("VGA compatible controller")
                || line.contains("3D controller")
                || line.contains("Display controller")
        })
        .map(|line| format!("PCI: {}", line.trim()))
        .collect();

    if lines.iter().any(|line| line.contains("AMD") || line.contains("Radeon")) {
        lines.push("AMD GPU detected (via lspci).".to_string());
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed(&'static str, Capability);

    impl CapabilityProbe for Fixed {
        fn title(&self) -> &str {
            self.0
        }

        fn probe(&self) -> Capability {
            self.1.clone()
        }
    }

    #[test]
    fn test_parse_dmidecode_speed() {
        let output = "\
Memory Device
\tSize: 16 GB
\tSpeed: Unknown
\tConfigured Memory Speed: 3200 MT/s
Memory Device
\tSpeed: 3200 MT/s
";
        assert_eq!(parse_dmidecode_speed(output), Some("3200 MT/s".to_string()));
        assert_eq!(parse_dmidecode_speed("nothing here"), None);
    }

    #[test]
    fn test_parse_wmic_speed() {
        assert_eq!(parse_wmic_speed("Speed  \r\n2666   \r\n2666\r\n"), Some("2666 MHz".to_string()));
        assert_eq!(parse_wmic_speed("Speed\r\n"), None);
    }

    #[test]
    fn test_parse_nvidia_smi() {
        let lines = parse_nvidia_smi("NVIDIA GeForce RTX 3080, 10240 MiB, 535.54.03\n");
        assert_eq!(lines, vec!["GPU 0: NVIDIA GeForce RTX 3080, VRAM: 10240 MiB, Driver: 535.54.03"]);
    }

    #[test]
    fn test_parse_lspci() {
        let output = "\
00:00.0 Host bridge: Intel Corporation Device 9b61
03:00.0 VGA compatible controller: Advanced Micro Devices, Inc. [AMD/ATI] Navi 21 [Radeon RX 6800]
";
        let lines = parse_lspci(output);
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("PCI: 03:00.0 VGA compatible controller"));
        assert_eq!(lines[1], "AMD GPU detected (via lspci).");
    }

    #[test]
    fn test_run_probes_keeps_order() {
        let probes: Vec<Box<dyn CapabilityProbe>> = vec![
            Box::new(Fixed("First", Capability::Available(vec!["a".to_string()]))),
            Box::new(Fixed("Second", Capability::Unavailable("missing tool".to_string()))),
        ];

        let results = run_probes(&probes);

        assert_eq!(results[0].0, "First");
        assert!(results[0].1.is_available());
        assert_eq!(results[1].1.describe(), "Unavailable: missing tool");
    }

    #[test]
    fn test_missing_tool_is_unavailable() {
        let result = command_output("pcbench-definitely-not-a-real-tool", &[]);
        assert!(result.is_err());
    }
}
