use std::time::{Duration, Instant};

/// Measures consecutive pipeline stages. When enabled each finished stage is
/// printed as `<stage> took <duration>`.
pub struct Stopwatch {
    enabled: bool,
    start: Instant,
    laps: Vec<(&'static str, Duration)>,
}

impl Stopwatch {
    pub fn new(enabled: bool) -> Self {
        Stopwatch {
            enabled,
            start: Instant::now(),
            laps: Vec::new(),
        }
    }

    /// Closes the current stage and starts the next one.
    pub fn lap(&mut self, stage: &'static str) -> Duration {
        let elapsed = self.start.elapsed();
        if self.enabled {
            println!("{}", format_lap(stage, elapsed));
        }
        log::debug!("{} took {:?}", stage, elapsed);
        self.laps.push((stage, elapsed));
        self.start = Instant::now();
        elapsed
    }

    /// Sum of all finished stages.
    pub fn total(&self) -> Duration {
        self.laps.iter().map(|(_, d)| *d).sum()
    }

    #[cfg(test)]
    fn laps(&self) -> &[(&'static str, Duration)] {
        &self.laps
    }
}

pub fn format_lap(stage: &str, elapsed: Duration) -> String {
    format!("{} took {:?}", stage, elapsed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_stages_in_order() {
        let mut watch = Stopwatch::new(false);
        watch.lap("Read");
        watch.lap("Transfer");
        watch.lap("Write");
        let names: Vec<_> = watch.laps().iter().map(|(n, _)| *n).collect();
        assert_eq!(names, ["Read", "Transfer", "Write"]);
        let sum: Duration = watch.laps().iter().map(|(_, d)| *d).sum();
        assert_eq!(watch.total(), sum);
    }

    #[test]
    fn lap_format() {
        assert_eq!(
            format_lap("Read", Duration::from_millis(12)),
            "Read took 12ms"
        );
    }
}
