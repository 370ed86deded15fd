//! Batch checkpoints reported while a generator runs.

use crate::generator::Stage;

/// Where a generator is within the stage it is working towards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    pub stage: Stage,
    pub processed: usize,
    pub total: usize,
}

impl Progress {
    pub fn fraction(&self) -> f32 {
        if self.total == 0 {
            1.0
        } else {
            self.processed as f32 / self.total as f32
        }
    }

    pub fn is_stage_complete(&self) -> bool {
        self.processed >= self.total
    }
}

/// Receives a report after every batch.
pub trait ProgressSink {
    fn report(&mut self, progress: &Progress);
}

impl<F: FnMut(&Progress)> ProgressSink for F {
    fn report(&mut self, progress: &Progress) {
        self(progress)
    }
}

/// Forwards every checkpoint to `log::info!`.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogProgress;

impl ProgressSink for LogProgress {
    fn report(&mut self, progress: &Progress) {
        log::info!(
            "{:?}: {}/{} tiles ({:.0}%)",
            progress.stage,
            progress.processed,
            progress.total,
            progress.fraction() * 100.0
        );
    }
}

/// Discards every report.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullProgress;

impl ProgressSink for NullProgress {
    fn report(&mut self, _progress: &Progress) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn closures_are_sinks() {
        let mut seen = Vec::new();
        {
            let mut sink = |p: &Progress| seen.push(p.processed);
            sink.report(&Progress {
                stage: Stage::ClimateSampled,
                processed: 10,
                total: 20,
            });
        }
        assert_eq!(seen, vec![10]);
    }

    #[test]
    fn fraction() {
        let half = Progress {
            stage: Stage::BiomesAssigned,
            processed: 5,
            total: 10,
        };
        assert_eq!(half.fraction(), 0.5);
        assert!(!half.is_stage_complete());
        let empty = Progress { total: 0, processed: 0, ..half };
        assert_eq!(empty.fraction(), 1.0);
    }
}
