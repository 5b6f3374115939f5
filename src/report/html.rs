//! HTML system report
//!
//! Assembles hardware, OS, usage and disk-speed sections into a single
//! `pc<host><YYYYMMDD_HHMMSS>.html` page.

use crate::error::{IoResultExt, Result};
use crate::system::{Capability, DiskInfo, DiskIoCounters, IoMetrics, SystemInfo, UsageSnapshot};
use chrono::{DateTime, Local};
use std::path::{Path, PathBuf};

/// One titled block of preformatted text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportSection {
    /// Section heading
    pub title: String,
    /// Preformatted body
    pub content: String,
}

impl ReportSection {
    /// Create a section
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
        }
    }
}

/// System report document
#[derive(Debug, Clone)]
pub struct SystemReport {
    /// Host the report describes
    pub host: String,
    /// Generation time
    pub generated: DateTime<Local>,
    /// Sections in display order
    pub sections: Vec<ReportSection>,
}

/// Inputs gathered for a system report
pub struct SystemReportInputs<'a> {
    /// Static hardware and OS information
    pub info: &'a SystemInfo,
    /// Capability probe results, by title
    pub capabilities: &'a [(String, Capability)],
    /// Usage sampled just before writing the report
    pub usage: &'a UsageSnapshot,
    /// Cumulative disk I/O, or why it is unavailable
    pub disk_io: std::result::Result<DiskIoCounters, String>,
    /// Disk speed test outcome; `None` when skipped
    pub disk_speed: Option<std::result::Result<IoMetrics, String>>,
}

/// `pc<host><YYYYMMDD_HHMMSS>.html`
pub fn system_report_file_name(host: &str, generated: &DateTime<Local>) -> String {
    format!("pc{}{}.html", host, generated.format("%Y%m%d_%H%M%S"))
}

/// Escape text for HTML element content
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

impl SystemReport {
    /// Empty report for `host`
    pub fn new(host: impl Into<String>, generated: DateTime<Local>) -> Self {
        Self {
            host: host.into(),
            generated,
            sections: Vec::new(),
        }
    }

    /// Build the standard section list
    pub fn from_inputs(host: impl Into<String>, generated: DateTime<Local>, inputs: SystemReportInputs<'_>) -> Self {
        let mut report = Self::new(host, generated);
        let info = inputs.info;

        report.push("CPU Specifications", info.cpu.describe());
        for (title, capability) in inputs.capabilities {
            report.push(title.clone(), capability.describe());
        }
        report.push("OS Information", info.os.describe());
        report.push("CPU Usage", inputs.usage.describe_cpu());
        report.push("RAM Usage", inputs.usage.memory.describe_ram());
        report.push("Swap Usage", inputs.usage.memory.describe_swap());
        match inputs.disk_io {
            Ok(counters) => report.push("Disk I/O", counters.describe()),
            Err(reason) => report.push("Disk I/O", format!("Unavailable: {}", reason)),
        }
        report.push("Disks", DiskInfo::describe_all(&info.disks));

        match inputs.disk_speed {
            Some(Ok(metrics)) => report.push("Disk Speed Test", metrics.describe()),
            Some(Err(reason)) => report.push("Disk Speed Test", format!("Failed: {}", reason)),
            None => {}
        }

        let boot = info
            .boot_time
            .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_else(|| "Unknown".to_string());
        report.push("Boot Time", boot);

        report
    }

    /// Append a section
    pub fn push(&mut self, title: impl Into<String>, content: impl Into<String>) {
        self.sections.push(ReportSection::new(title, content));
    }

    /// Render the whole page
    pub fn render(&self) -> String {
        let host = escape_html(&self.host);
        let mut html = String::from("<html><head><title>System Report</title></head><body>");
        html.push_str(&format!(
            "<h1>System Report for {}</h1><p>Generated on: {}</p>",
            host,
            self.generated.format("%Y-%m-%d %H:%M:%S")
        ));
        for section in &self.sections {
            html.push_str(&format!(
                "<h2>{}</h2><pre>{}</pre>",
                escape_html(&section.title),
                escape_html(section.content.trim_end())
            ));
        }
        html.push_str("</body></html>");
        html
    }

    /// Write the page into `dir` and return its path
    pub fn save(&self, dir: &Path) -> Result<PathBuf> {
        let path = dir.join(system_report_file_name(&self.host, &self.generated));
        std::fs::write(&path, self.render()).report_path(&path)?;
        tracing::info!("System report written to {}", path.display());
        Ok(path)
    }
}
