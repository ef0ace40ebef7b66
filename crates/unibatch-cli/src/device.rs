use anyhow::{Context, bail};
use std::process::Command;
use tracing::{debug, warn};
use unibatch::core::memory::BYTES_PER_MIB;
use unibatch::engine::device::{DeviceError, DeviceMemory, DeviceProbe};

#[derive(Debug, Clone, PartialEq, Eq)]
struct GpuInfo {
    index: usize,
    name: String,
    total_mib: u64,
    free_mib: u64,
}

/// Queries NVIDIA devices through `nvidia-smi`.
///
/// The docking executable runs as a child process, so selecting a device only records which
/// device the run is pinned to; it is handed to the executable as `--device_id`.
#[derive(Debug, Default)]
pub struct NvidiaSmiProbe {
    devices: Vec<GpuInfo>,
    selected: Option<usize>,
}

impl NvidiaSmiProbe {
    /// Lists the devices visible to `nvidia-smi`. A host without the tool has no devices.
    pub fn detect() -> Self {
        match query_devices() {
            Ok(devices) => {
                for gpu in &devices {
                    debug!(index = gpu.index, name = %gpu.name, total_mib = gpu.total_mib, free_mib = gpu.free_mib, "Found device");
                }
                Self {
                    devices,
                    selected: None,
                }
            }
            Err(e) => {
                warn!("Device query failed, continuing without a device: {:#}", e);
                Self::default()
            }
        }
    }
}

impl DeviceProbe for NvidiaSmiProbe {
    fn device_count(&self) -> usize {
        self.devices.len()
    }

    fn select(&mut self, device_id: usize) -> Result<(), DeviceError> {
        if !self.devices.iter().any(|gpu| gpu.index == device_id) {
            return Err(DeviceError::InvalidDevice {
                requested: device_id,
                available: self.devices.len(),
            });
        }
        self.selected = Some(device_id);
        Ok(())
    }

    fn memory_info(&self) -> Result<DeviceMemory, DeviceError> {
        let id = self
            .selected
            .ok_or_else(|| DeviceError::Query("no device selected".to_string()))?;
        let gpu = self
            .devices
            .iter()
            .find(|gpu| gpu.index == id)
            .ok_or_else(|| DeviceError::Query(format!("device {id} disappeared")))?;
        Ok(DeviceMemory {
            available_bytes: gpu.free_mib.saturating_mul(BYTES_PER_MIB),
            total_bytes: gpu.total_mib.saturating_mul(BYTES_PER_MIB),
        })
    }
}

fn query_devices() -> anyhow::Result<Vec<GpuInfo>> {
    let output = Command::new("nvidia-smi")
        .args([
            "--query-gpu=index,name,memory.total,memory.free",
            "--format=csv,noheader,nounits",
        ])
        .output()
        .context("failed to execute nvidia-smi")?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        bail!("nvidia-smi exited with {}: {}", output.status, stderr);
    }

    let stdout = String::from_utf8(output.stdout).context("nvidia-smi output was not UTF-8")?;
    parse_query_output(&stdout)
}

fn parse_query_output(raw: &str) -> anyhow::Result<Vec<GpuInfo>> {
    let mut devices = Vec::new();
    for (line_idx, line) in raw.lines().map(str::trim).enumerate() {
        if line.is_empty() {
            continue;
        }
        let columns: Vec<&str> = line.split(',').map(str::trim).collect();
        let [index, name, total, free] = columns.as_slice() else {
            bail!("unexpected nvidia-smi output at line {}: '{}'", line_idx + 1, line);
        };
        devices.push(GpuInfo {
            index: index
                .parse()
                .with_context(|| format!("invalid device index '{index}'"))?,
            name: name.to_string(),
            total_mib: total
                .parse()
                .with_context(|| format!("invalid total memory '{total}'"))?,
            free_mib: free
                .parse()
                .with_context(|| format!("invalid free memory '{free}'"))?,
        });
    }
    Ok(devices)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn probe_from(raw: &str) -> NvidiaSmiProbe {
        NvidiaSmiProbe {
            devices: parse_query_output(raw).unwrap(),
            selected: None,
        }
    }

    #[test]
    fn parses_multiple_rows() {
        let devices = parse_query_output(
            "0, NVIDIA A100-SXM4-40GB, 40960, 40000\n1, NVIDIA A100-SXM4-40GB, 40960, 1200\n",
        )
        .unwrap();
        assert_eq!(devices.len(), 2);
        assert_eq!(devices[1].index, 1);
        assert_eq!(devices[1].free_mib, 1200);
        assert_eq!(devices[0].name, "NVIDIA A100-SXM4-40GB");
    }

    #[test]
    fn rejects_malformed_rows() {
        assert!(parse_query_output("0, A100, 40960\n").is_err());
        assert!(parse_query_output("zero, A100, 40960, 100\n").is_err());
    }

    #[test]
    fn selected_device_reports_its_memory() {
        let mut probe = probe_from("0, T4, 15360, 15000\n1, A10, 24576, 20000\n");
        assert_eq!(probe.device_count(), 2);
        probe.select(1).unwrap();

        let memory = probe.memory_info().unwrap();
        assert_eq!(memory.available_mib(), 20000);
        assert_eq!(memory.total_mib(), 24576);
    }

    #[test]
    fn unknown_device_cannot_be_selected() {
        let mut probe = probe_from("0, T4, 15360, 15000\n");
        assert_eq!(
            probe.select(4),
            Err(DeviceError::InvalidDevice {
                requested: 4,
                available: 1
            })
        );
        assert!(probe.memory_info().is_err());
    }
}
