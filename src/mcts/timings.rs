//! Wall-clock accounting per search stage.
//!
//! Stages run in microseconds, often below the clock resolution; a sample
//! that measures zero is counted as half a microsecond so cheap stages still
//! show up in the totals.

use std::collections::BTreeMap;
use std::time::Duration;

/// Accumulated cost of one stage
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct StageTiming {
    pub calls: u64,
    pub total_micros: f64,
}

impl StageTiming {
    pub fn mean_micros(&self) -> f64 {
        if self.calls == 0 {
            0.0
        } else {
            self.total_micros / self.calls as f64
        }
    }
}

/// Per-stage timings of one decision episode
#[derive(Debug, Clone, Default)]
pub struct StageTimings {
    stages: BTreeMap<&'static str, StageTiming>,
}

impl StageTimings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, stage: &'static str, elapsed: Duration) {
        let micros = elapsed.as_secs_f64() * 1_000_000.0;
        let entry = self.stages.entry(stage).or_default();
        entry.calls += 1;
        entry.total_micros += if micros > 0.0 { micros } else { 0.5 };
    }

    pub fn get(&self, stage: &str) -> Option<&StageTiming> {
        self.stages.get(stage)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &StageTiming)> + '_ {
        self.stages.iter().map(|(stage, timing)| (*stage, timing))
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Stages sorted by ascending total time
    pub fn summary(&self) -> String {
        let mut entries: Vec<_> = self.iter().collect();
        entries.sort_by(|a, b| {
            a.1.total_micros
                .partial_cmp(&b.1.total_micros)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        entries
            .iter()
            .map(|(stage, timing)| {
                format!("{}={}x/{:.0}us", stage, timing.calls, timing.total_micros)
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_accumulates() {
        let mut timings = StageTimings::new();
        timings.record("selection", Duration::from_micros(10));
        timings.record("selection", Duration::from_micros(30));
        let selection = timings.get("selection").unwrap();
        assert_eq!(selection.calls, 2);
        assert!((selection.total_micros - 40.0).abs() < 1e-6);
        assert!((selection.mean_micros() - 20.0).abs() < 1e-6);
    }

    #[test]
    fn test_zero_samples_count_half() {
        let mut timings = StageTimings::new();
        timings.record("expansion", Duration::ZERO);
        timings.record("expansion", Duration::ZERO);
        assert!((timings.get("expansion").unwrap().total_micros - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_summary_sorted_by_cost() {
        let mut timings = StageTimings::new();
        timings.record("simulation", Duration::from_micros(500));
        timings.record("selection", Duration::from_micros(5));
        assert_eq!(timings.summary(), "selection=1x/5us simulation=1x/500us");
        assert!(timings.get("backpropagation").is_none());
    }
}
