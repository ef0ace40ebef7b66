use crate::core::memory::BYTES_PER_MIB;
use std::fs;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum DeviceError {
    #[error("Invalid device id {requested}: only {available} device(s) present")]
    InvalidDevice { requested: usize, available: usize },

    #[error("Device query failed: {0}")]
    Query(String),
}

/// Memory figures reported by a device after it has been selected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceMemory {
    pub available_bytes: u64,
    pub total_bytes: u64,
}

impl DeviceMemory {
    pub fn available_mib(&self) -> u64 {
        self.available_bytes / BYTES_PER_MIB
    }

    pub fn total_mib(&self) -> u64 {
        self.total_bytes / BYTES_PER_MIB
    }
}

/// Access to the accelerator runtime.
///
/// `select` pins the process to one device; every later allocation, including the ones the
/// docking engine performs, happens on that device.
pub trait DeviceProbe {
    fn device_count(&self) -> usize;
    fn select(&mut self, device_id: usize) -> Result<(), DeviceError>;
    fn memory_info(&self) -> Result<DeviceMemory, DeviceError>;
}

/// A probe for hosts without an accelerator runtime. Reports zero devices.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoDevice;

impl DeviceProbe for NoDevice {
    fn device_count(&self) -> usize {
        0
    }

    fn select(&mut self, device_id: usize) -> Result<(), DeviceError> {
        Err(DeviceError::InvalidDevice {
            requested: device_id,
            available: 0,
        })
    }

    fn memory_info(&self) -> Result<DeviceMemory, DeviceError> {
        Err(DeviceError::Query("no device selected".to_string()))
    }
}

const MEMINFO_PATH: &str = "/proc/meminfo";

/// Physical memory of the host in bytes, read from `/proc/meminfo`.
///
/// Returns `None` where the file is unavailable or unparsable.
pub fn host_memory_bytes() -> Option<u64> {
    let text = fs::read_to_string(MEMINFO_PATH).ok()?;
    parse_mem_total(&text)
}

fn parse_mem_total(meminfo: &str) -> Option<u64> {
    let line = meminfo.lines().find(|l| l.starts_with("MemTotal:"))?;
    let mut parts = line.split_whitespace().skip(1);
    let value: u64 = parts.next()?.parse().ok()?;
    let multiplier = match parts.next() {
        Some("kB") | Some("KB") | Some("kb") => 1024,
        Some("B") | None => 1,
        Some(_) => return None,
    };
    value.checked_mul(multiplier)
}
