use std::time::Duration;

/// Cleanup opens this long before the end of the run.
const PRE_CLEANUP_START: Duration = Duration::from_secs(90);

/// The one-time leftover sweep may fire this long before the end.
const FINAL_SWEEP_START: Duration = Duration::from_secs(60);

/// Seeding stops once no more than this much run time remains.
pub const SEED_CUTOFF: Duration = Duration::from_secs(120);

/// Pause after the seed target is reached, giving the backend time to work
/// through the queued async deletions.
pub const SEED_DRAIN_PAUSE: Duration = Duration::from_secs(60);

/// What a virtual user does with its current tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Seeding,
    Exercising,
    Cleanup,
    FinalSweep,
}

/// Remaining-run-time thresholds that open the cleanup phases.
#[derive(Debug, Clone, Copy)]
pub struct PhaseThresholds {
    pub pre_cleanup: Duration,
    pub final_sweep: Duration,
}

impl PhaseThresholds {
    /// GET-only runs that create nothing have nothing to clean up, so both
    /// windows collapse to zero and no cleanup phase can ever trigger.
    pub fn for_run(get_only: bool, kafkas_to_create: usize) -> Self {
        if get_only && kafkas_to_create == 0 {
            Self {
                pre_cleanup: Duration::ZERO,
                final_sweep: Duration::ZERO,
            }
        } else {
            Self {
                pre_cleanup: PRE_CLEANUP_START,
                final_sweep: FINAL_SWEEP_START,
            }
        }
    }
}

/// Derive the phase for one tick.
///
/// `seeding` is the live seed-population flag; the state machine clears it
/// before calling in here once [`SEED_CUTOFF`] is reached. `sweep_done`
/// suppresses [`Phase::FinalSweep`] after the one-time sweep has run.
pub fn phase_at(
    remaining: Duration,
    seeding: bool,
    sweep_done: bool,
    thresholds: PhaseThresholds,
) -> Phase {
    if seeding {
        return Phase::Seeding;
    }
    if remaining < thresholds.pre_cleanup {
        if remaining < thresholds.final_sweep && !sweep_done {
            return Phase::FinalSweep;
        }
        return Phase::Cleanup;
    }
    Phase::Exercising
}

#[cfg(test)]
mod tests {
    use super::*;

    fn secs(s: u64) -> Duration {
        Duration::from_secs(s)
    }

    #[test]
    fn final_sweep_implies_both_cleanup_windows() {
        let threshold_grid = [
            PhaseThresholds::for_run(false, 2),
            PhaseThresholds {
                pre_cleanup: secs(10),
                final_sweep: secs(10),
            },
            PhaseThresholds {
                pre_cleanup: secs(30),
                final_sweep: secs(90),
            },
        ];
        for thresholds in threshold_grid {
            for remaining_s in 0..200 {
                let remaining = secs(remaining_s);
                if phase_at(remaining, false, false, thresholds) == Phase::FinalSweep {
                    assert!(remaining < thresholds.pre_cleanup);
                    assert!(remaining < thresholds.final_sweep);
                }
            }
        }
    }

    #[test]
    fn get_only_without_creations_never_cleans_up() {
        let thresholds = PhaseThresholds::for_run(true, 0);
        let total = secs(600);
        for elapsed_s in 0..600 {
            let remaining = total - secs(elapsed_s);
            let phase = phase_at(remaining, false, false, thresholds);
            assert_eq!(phase, Phase::Exercising, "at t={elapsed_s}s");
        }
    }

    #[test]
    fn get_only_with_creations_keeps_the_cleanup_windows() {
        let thresholds = PhaseThresholds::for_run(true, 2);
        assert_eq!(
            phase_at(secs(30), false, false, thresholds),
            Phase::FinalSweep
        );
        assert_eq!(phase_at(secs(75), false, false, thresholds), Phase::Cleanup);
    }

    #[test]
    fn sweep_runs_at_most_once() {
        let thresholds = PhaseThresholds::for_run(false, 1);
        assert_eq!(
            phase_at(secs(30), false, false, thresholds),
            Phase::FinalSweep
        );
        assert_eq!(phase_at(secs(30), false, true, thresholds), Phase::Cleanup);
    }

    #[test]
    fn phases_only_progress_forward() {
        // rank collapses the two cleanup flavors: once cleaning, a user may
        // alternate between sweep and per-tick cleanup but never exercises
        // or seeds again
        fn rank(phase: Phase) -> u8 {
            match phase {
                Phase::Seeding => 0,
                Phase::Exercising => 1,
                Phase::Cleanup | Phase::FinalSweep => 2,
            }
        }

        let thresholds = PhaseThresholds::for_run(false, 2);
        let total = secs(400);
        let mut seeding = true;
        let mut sweep_done = false;
        let mut last_rank = 0;

        for elapsed_s in 0..400 {
            let remaining = total - secs(elapsed_s);
            if seeding && remaining <= SEED_CUTOFF {
                seeding = false;
            }
            let phase = phase_at(remaining, seeding, sweep_done, thresholds);
            if phase == Phase::FinalSweep {
                sweep_done = true;
            }
            assert!(
                rank(phase) >= last_rank,
                "phase went backwards at t={elapsed_s}s: {phase:?}"
            );
            last_rank = rank(phase);
        }
    }

    #[test]
    fn seeding_takes_priority_over_everything() {
        let thresholds = PhaseThresholds::for_run(false, 2);
        assert_eq!(
            phase_at(secs(300), true, false, thresholds),
            Phase::Seeding
        );
    }
}
