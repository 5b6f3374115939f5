//! Disk write/read speed test

use crate::error::{IoResultExt, Result};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

const CHUNK_SIZE: usize = 1024 * 1024;

/// I/O performance metrics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IoMetrics {
    /// Bytes written and read back
    pub bytes: u64,
    /// Write speed in MB/s
    pub write_mbps: f64,
    /// Read speed in MB/s
    pub read_mbps: f64,
}

impl IoMetrics {
    /// Text block for reports
    pub fn describe(&self) -> String {
        format!(
            "Test Size: {}\nWrite Speed: {:.2} MB/s\nRead Speed: {:.2} MB/s",
            humansize::format_size(self.bytes, humansize::BINARY),
            self.write_mbps,
            self.read_mbps
        )
    }
}

/// Sequential write-then-read speed test in a directory
pub struct DiskSpeedTest {
    /// Test data size in bytes
    pub test_size: u64,
}

impl DiskSpeedTest {
    /// Create a new speed test
    pub fn new(test_size: u64) -> Self {
        Self { test_size }
    }

    fn test_file(dir: &Path) -> PathBuf {
        dir.join(format!(".pcbench_speed_test_{}.tmp", std::process::id()))
    }

    /// Write `test_size` bytes in 1 MiB chunks, read them back, remove the file
    pub fn run(&self, dir: &Path) -> Result<IoMetrics> {
        let path = Self::test_file(dir);
        let result = self.measure(&path);

        if let Err(e) = std::fs::remove_file(&path) {
            tracing::debug!("Could not remove {}: {}", path.display(), e);
        }
        result
    }

    fn measure(&self, path: &Path) -> Result<IoMetrics> {
        let chunk: Vec<u8> = (0..CHUNK_SIZE).map(|i| (i % 251) as u8).collect();

        let write_start = Instant::now();
        {
            let mut file = File::create(path).with_path(path)?;
            let mut remaining = self.test_size;
            while remaining > 0 {
                let len = remaining.min(CHUNK_SIZE as u64) as usize;
                file.write_all(&chunk[..len]).with_path(path)?;
                remaining -= len as u64;
            }
            file.sync_all().with_path(path)?;
        }
        let write_secs = write_start.elapsed().as_secs_f64();

        let read_start = Instant::now();
        let mut read_total = 0u64;
        {
            let mut file = File::open(path).with_path(path)?;
            let mut buffer = vec![0u8; CHUNK_SIZE];
            loop {
                let n = file.read(&mut buffer).with_path(path)?;
                if n == 0 {
                    break;
                }
                read_total += n as u64;
            }
        }
        let read_secs = read_start.elapsed().as_secs_f64();

        let mb = read_total as f64 / (1024.0 * 1024.0);
        tracing::debug!("Disk test: {} bytes in {:.3}s / {:.3}s", read_total, write_secs, read_secs);

        Ok(IoMetrics {
            bytes: read_total,
            write_mbps: throughput(mb, write_secs),
            read_mbps: throughput(mb, read_secs),
        })
    }
}

fn throughput(mb: f64, secs: f64) -> f64 {
    if secs > 0.0 {
        mb / secs
    } else {
        0.0
    }
}
