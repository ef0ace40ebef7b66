//! Adapters driving a Uni-Dock compatible executable as a child process.

use crate::config::{EngineSettings, PairedAppConfig};
use std::ffi::OsString;
use std::io::BufRead;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::{debug, error, info};
use unibatch::core::models::ligand::NamedLigand;
use unibatch::engine::worker::{DockingSession, DockingTemplate, SearchParams, WorkerError};
use unibatch::workflows::paired::PairedBatchCoordinator;

fn push_arg(args: &mut Vec<OsString>, flag: &str, value: impl Into<OsString>) {
    args.push(flag.into());
    args.push(value.into());
}

fn push_box(args: &mut Vec<OsString>, prefix: &str, values: [f64; 3]) {
    for (axis, value) in ["x", "y", "z"].into_iter().zip(values) {
        push_arg(args, &format!("--{prefix}_{axis}"), value.to_string());
    }
}

/// Receptor-level invocation settings shared by every batch of a run.
#[derive(Debug, Clone)]
pub struct ExternalDockingTemplate {
    settings: EngineSettings,
    receptor: PathBuf,
    receptor_atoms: usize,
    out_dir: PathBuf,
    device_id: usize,
    energy_range: f64,
    multi_bias: bool,
    receptor_bias: Option<PathBuf>,
}

impl ExternalDockingTemplate {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        settings: EngineSettings,
        receptor: PathBuf,
        receptor_atoms: usize,
        out_dir: PathBuf,
        device_id: usize,
        energy_range: f64,
        multi_bias: bool,
        receptor_bias: Option<PathBuf>,
    ) -> Self {
        Self {
            settings,
            receptor,
            receptor_atoms,
            out_dir,
            device_id,
            energy_range,
            multi_bias,
            receptor_bias,
        }
    }
}

impl DockingTemplate for ExternalDockingTemplate {
    type Session = ExternalDockingSession;

    fn receptor_atom_count(&self) -> usize {
        self.receptor_atoms
    }

    fn session(&self) -> Self::Session {
        ExternalDockingSession {
            template: self.clone(),
            ligands: Vec::new(),
            biased: Vec::new(),
        }
    }
}

pub struct ExternalDockingSession {
    template: ExternalDockingTemplate,
    ligands: Vec<NamedLigand>,
    biased: Vec<PathBuf>,
}

impl ExternalDockingSession {
    fn batch_arguments(&self, params: &SearchParams) -> Vec<OsString> {
        let t = &self.template;
        let mut args = Vec::new();

        match &t.settings.maps {
            Some(maps) => push_arg(&mut args, "--maps", maps),
            None => push_arg(&mut args, "--receptor", &t.receptor),
        }
        push_arg(&mut args, "--scoring", t.settings.scoring.as_str());
        if let Some(center) = t.settings.center {
            push_box(&mut args, "center", center);
        }
        if let Some(size) = t.settings.size {
            push_box(&mut args, "size", size);
        }

        args.push("--gpu_batch".into());
        args.extend(self.ligands.iter().map(|l| OsString::from(l.ligand.source())));
        push_arg(&mut args, "--dir", &t.out_dir);

        push_arg(&mut args, "--exhaustiveness", params.exhaustiveness.to_string());
        push_arg(&mut args, "--num_modes", params.num_modes.to_string());
        push_arg(&mut args, "--min_rmsd", params.min_rmsd.to_string());
        push_arg(&mut args, "--energy_range", t.energy_range.to_string());
        push_arg(&mut args, "--max_evals", params.max_evals.to_string());
        push_arg(&mut args, "--max_step", params.max_step.to_string());
        push_arg(&mut args, "--refine_step", params.refine_step.to_string());
        push_arg(&mut args, "--seed", params.seed.to_string());
        push_arg(&mut args, "--device_id", t.device_id.to_string());
        if params.local_only {
            args.push("--local_only".into());
        }
        if t.multi_bias {
            args.push("--multi_bias".into());
        }
        if let Some(bias) = &t.receptor_bias {
            push_arg(&mut args, "--bias", bias);
        }
        args.extend(t.settings.extra_args.iter().map(OsString::from));
        args
    }
}

impl DockingSession for ExternalDockingSession {
    fn set_batch_bias(&mut self, ligand: &Path, bias: &mut dyn BufRead) -> Result<(), WorkerError> {
        // The executable reads `<ligand>.bpf` itself; only check the file holds bias records.
        let mut has_records = false;
        for line in bias.lines() {
            let line = line?;
            let trimmed = line.trim();
            if !trimmed.is_empty() && !trimmed.starts_with('#') {
                has_records = true;
                break;
            }
        }
        if !has_records {
            return Err(WorkerError::Bias {
                path: ligand.to_path_buf(),
                message: "bias file contains no records".to_string(),
            });
        }
        self.biased.push(ligand.to_path_buf());
        Ok(())
    }

    fn set_ligands(&mut self, ligands: Vec<NamedLigand>) -> Result<(), WorkerError> {
        if self.template.multi_bias && self.biased.len() != ligands.len() {
            return Err(WorkerError::Assignment(format!(
                "{} ligands assigned but {} bias files loaded",
                ligands.len(),
                self.biased.len()
            )));
        }
        self.ligands = ligands;
        Ok(())
    }

    fn search(&mut self, params: &SearchParams) -> Result<(), WorkerError> {
        let args = self.batch_arguments(params);
        debug!(executable = %self.template.settings.executable.display(), ?args, "Launching docking engine");

        let status = Command::new(&self.template.settings.executable)
            .args(&args)
            .status()
            .map_err(|e| {
                WorkerError::Search(format!(
                    "failed to launch '{}': {}",
                    self.template.settings.executable.display(),
                    e
                ))
            })?;

        if !status.success() {
            return Err(WorkerError::Search(format!(
                "'{}' exited with {}",
                self.template.settings.executable.display(),
                status
            )));
        }
        Ok(())
    }

    fn write_poses(
        &mut self,
        output_paths: &[PathBuf],
        _num_modes: u32,
        _energy_range: f64,
    ) -> Result<(), WorkerError> {
        // Poses are written by the executable during the search; placeholders are expected to fail.
        let missing: Vec<&PathBuf> = self
            .ligands
            .iter()
            .zip(output_paths)
            .filter(|(named, path)| !named.ligand.is_placeholder() && !path.is_file())
            .map(|(_, path)| path)
            .collect();

        if let Some(first) = missing.first() {
            return Err(WorkerError::Output(format!(
                "{} expected pose file(s) missing, first: {}",
                missing.len(),
                first.display()
            )));
        }
        Ok(())
    }
}

/// Runs the executable's own paired batch mode.
pub struct ExternalPairedCoordinator {
    config: PairedAppConfig,
}

impl ExternalPairedCoordinator {
    pub fn new(config: PairedAppConfig) -> Self {
        Self { config }
    }

    fn arguments(&self) -> Vec<OsString> {
        let c = &self.config;
        let mut args = Vec::new();
        push_arg(&mut args, "--paired_batch_size", c.paired_batch_size.to_string());
        push_arg(&mut args, "--ligand_index", &c.ligand_index);
        push_arg(&mut args, "--dir", &c.out_dir);
        push_box(&mut args, "size", c.box_size);
        push_arg(&mut args, "--exhaustiveness", c.exhaustiveness.to_string());
        push_arg(&mut args, "--num_modes", c.num_modes.to_string());
        push_arg(&mut args, "--max_step", c.max_step.to_string());
        push_arg(&mut args, "--refine_step", c.refine_step.to_string());
        push_arg(&mut args, "--seed", c.seed.to_string());
        push_arg(&mut args, "--device_id", c.device_id.to_string());
        if c.local_only {
            args.push("--local_only".into());
        }
        args.extend(c.engine.extra_args.iter().map(OsString::from));
        args
    }
}

impl PairedBatchCoordinator for ExternalPairedCoordinator {
    fn prime(&mut self) -> i32 {
        let c = &self.config;
        if c.paired_batch_size == 0 {
            error!("Paired batch size must be positive");
            return -1;
        }
        match std::fs::metadata(&c.ligand_index) {
            Ok(meta) if meta.is_file() && meta.len() > 0 => {}
            Ok(_) => {
                error!(index = %c.ligand_index.display(), "Paired batch description is empty");
                return -1;
            }
            Err(e) => {
                error!(index = %c.ligand_index.display(), "Cannot read paired batch description: {}", e);
                return -1;
            }
        }
        if !c.out_dir.is_dir() {
            error!(dir = %c.out_dir.display(), "Output directory does not exist");
            return -1;
        }
        i32::try_from(c.paired_batch_size).unwrap_or(i32::MAX)
    }

    fn launch(&mut self) -> i32 {
        let executable = &self.config.engine.executable;
        info!(executable = %executable.display(), "Entering paired batch mode");
        match Command::new(executable).args(self.arguments()).status() {
            Ok(status) => status.code().unwrap_or(-1),
            Err(e) => {
                error!("Failed to launch '{}': {}", executable.display(), e);
                -1
            }
        }
    }
}
