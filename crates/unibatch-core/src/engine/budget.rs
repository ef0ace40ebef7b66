use super::device::{DeviceError, DeviceMemory, DeviceProbe};
use crate::core::memory::BYTES_PER_MIB;
use tracing::{info, instrument, warn};

/// Fraction of reported memory the scheduler allows itself to plan against.
pub const MEMORY_HEADROOM: f64 = 0.95;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BudgetSource {
    Host,
    Device { id: usize },
    Override,
}

/// The memory ceiling every batch is packed against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedBudget {
    pub ceiling_mib: u64,
    pub source: BudgetSource,
    /// Memory figures of the selected device, when one was selected.
    pub device: Option<DeviceMemory>,
}

impl ResolvedBudget {
    /// A budget fixed by the caller, without consulting host or device.
    pub fn fixed(ceiling_mib: u64) -> Self {
        Self {
            ceiling_mib,
            source: BudgetSource::Override,
            device: None,
        }
    }
}

fn with_headroom(mib: u64) -> u64 {
    (mib as f64 * MEMORY_HEADROOM) as u64
}

/// Resolves the effective memory ceiling in MiB.
///
/// The host's physical memory bounds the budget when no device is present. When a device is
/// present, `device_id` is selected (and stays selected for the rest of the process) and its
/// available memory replaces the host figure. A positive `max_gpu_memory_mib` smaller than the
/// resolved figure replaces it in turn.
#[instrument(skip_all, name = "budget_resolution")]
pub fn resolve_budget(
    host_total_bytes: u64,
    probe: &mut dyn DeviceProbe,
    device_id: usize,
    max_gpu_memory_mib: u64,
) -> Result<ResolvedBudget, DeviceError> {
    let mut budget = ResolvedBudget {
        ceiling_mib: with_headroom(host_total_bytes / BYTES_PER_MIB),
        source: BudgetSource::Host,
        device: None,
    };

    let available = probe.device_count();
    if available == 0 {
        warn!("No accelerator device found, planning against host memory");
    } else {
        if device_id >= available {
            return Err(DeviceError::InvalidDevice {
                requested: device_id,
                available,
            });
        }
        probe.select(device_id)?;
        let memory = probe.memory_info()?;
        info!(
            device_id,
            available_mib = memory.available_mib(),
            total_mib = memory.total_mib(),
            "Selected device"
        );
        budget = ResolvedBudget {
            ceiling_mib: with_headroom(memory.available_mib()),
            source: BudgetSource::Device { id: device_id },
            device: Some(memory),
        };
    }

    if max_gpu_memory_mib > 0 && max_gpu_memory_mib < budget.ceiling_mib {
        budget.ceiling_mib = max_gpu_memory_mib;
        budget.source = BudgetSource::Override;
    }

    info!(
        ceiling_mib = budget.ceiling_mib,
        source = ?budget.source,
        "Resolved memory budget"
    );
    Ok(budget)
}
