use crate::engine::error::EngineError;
use crate::engine::progress::{Progress, ProgressReporter};
use std::time::{Duration, Instant};
use tracing::{info, instrument, warn};

/// The 1:1 ligand/receptor docking path.
///
/// Each ligand is docked against its own receptor, so nothing on this path goes through the
/// batch scheduler.
pub trait PairedBatchCoordinator {
    /// Validates and loads the pairing. A non-positive status means failure.
    fn prime(&mut self) -> i32;

    /// Runs every pair to completion. `0` means success.
    fn launch(&mut self) -> i32;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PairedOutcome {
    pub primed: i32,
    pub status: i32,
    pub elapsed: Duration,
}

impl PairedOutcome {
    pub fn succeeded(&self) -> bool {
        self.status == 0
    }
}

#[instrument(skip_all, name = "paired_workflow")]
pub fn run<C>(coordinator: &mut C, reporter: &ProgressReporter) -> Result<PairedOutcome, EngineError>
where
    C: PairedBatchCoordinator + ?Sized,
{
    reporter.report(Progress::PhaseStart { name: "Priming" });
    let primed = coordinator.prime();
    reporter.report(Progress::PhaseFinish);
    if primed <= 0 {
        return Err(EngineError::PairedPrime { status: primed });
    }
    info!(primed, "Paired batch primed");

    reporter.report(Progress::PhaseStart { name: "Paired docking" });
    let started = Instant::now();
    let status = coordinator.launch();
    let elapsed = started.elapsed();
    reporter.report(Progress::PhaseFinish);

    if status == 0 {
        info!(elapsed_ms = elapsed.as_millis() as u64, "Paired batch finished");
    } else {
        warn!(status, "Paired batch finished with a non-zero status");
    }
    Ok(PairedOutcome {
        primed,
        status,
        elapsed,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    struct ScriptedCoordinator {
        prime_status: i32,
        launch_status: i32,
        launched: bool,
    }

    impl ScriptedCoordinator {
        fn new(prime_status: i32, launch_status: i32) -> Self {
            Self {
                prime_status,
                launch_status,
                launched: false,
            }
        }
    }

    impl PairedBatchCoordinator for ScriptedCoordinator {
        fn prime(&mut self) -> i32 {
            self.prime_status
        }

        fn launch(&mut self) -> i32 {
            self.launched = true;
            self.launch_status
        }
    }

    #[test]
    fn successful_prime_launches_and_returns_status() {
        let mut coordinator = ScriptedCoordinator::new(12, 0);
        let outcome = run(&mut coordinator, &ProgressReporter::new()).unwrap();
        assert!(coordinator.launched);
        assert_eq!(outcome.primed, 12);
        assert!(outcome.succeeded());
    }

    #[test]
    fn non_positive_prime_never_launches() {
        for status in [0, -3] {
            let mut coordinator = ScriptedCoordinator::new(status, 0);
            let err = run(&mut coordinator, &ProgressReporter::new()).unwrap_err();
            assert!(matches!(err, EngineError::PairedPrime { status: s } if s == status));
            assert!(!coordinator.launched);
        }
    }

    #[test]
    fn launch_failure_status_is_surfaced() {
        let mut coordinator = ScriptedCoordinator::new(1, 7);
        let outcome = run(&mut coordinator, &ProgressReporter::new()).unwrap();
        assert_eq!(outcome.status, 7);
        assert!(!outcome.succeeded());
    }
}
