use std::time::Duration;

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

/// Cumulative counters of one copy; only ever grow.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TransferStats {
    pub total_bytes: u64,
    pub read_duration: Duration,
    pub write_duration: Duration,
}

impl TransferStats {
    pub fn record_read(&mut self, elapsed: Duration) {
        self.read_duration += elapsed;
    }

    /// One chunk of `bytes` went out to every output in `elapsed`
    pub fn record_write(&mut self, bytes: usize, elapsed: Duration) {
        self.total_bytes += bytes as u64;
        self.write_duration += elapsed;
    }

    pub fn total_mb(&self) -> f64 {
        self.total_bytes as f64 / BYTES_PER_MB
    }

    pub fn read_rate(&self) -> Option<f64> {
        rate(self.total_mb(), self.read_duration)
    }

    pub fn write_rate(&self) -> Option<f64> {
        rate(self.total_mb(), self.write_duration)
    }

    pub fn copy_rate(&self) -> Option<f64> {
        rate(self.total_mb(), self.read_duration + self.write_duration)
    }

    /// Lines printed at the end of `run`
    pub fn run_report(&self, bufsize: usize) -> Vec<String> {
        let mb = self.total_mb();
        vec![
            format!("Buffer size used by the application: {}", bufsize),
            format!("Read {:.3} [MB] of data at {} [MB/s]", mb, fmt_rate(self.read_rate())),
            format!("Wrote {:.3} [MB] of data at {} [MB/s]", mb, fmt_rate(self.write_rate())),
            format!("Copied {:.3} [MB] of data at {} [MB/s]", mb, fmt_rate(self.copy_rate())),
        ]
    }

    /// Line printed when the input drop completes
    pub fn completion_report(&self, n_outputs: usize) -> String {
        format!(
            "Wrote {:.3} [MB] of data to {} outputs in {:.3} [ms] at {} [MB/s]",
            self.total_mb(),
            n_outputs,
            self.write_duration.as_secs_f64() * 1000.0,
            fmt_rate(self.write_rate()),
        )
    }
}

fn rate(mb: f64, over: Duration) -> Option<f64> {
    if over.is_zero() {
        None
    } else {
        Some(mb / over.as_secs_f64())
    }
}

fn fmt_rate(rate: Option<f64>) -> String {
    match rate {
        Some(r) => format!("{:.3}", r),
        None => "n/a".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_mb() -> TransferStats {
        TransferStats {
            total_bytes: 2 * 1024 * 1024,
            read_duration: Duration::from_secs(1),
            write_duration: Duration::from_millis(500),
        }
    }

    #[test]
    fn rates_use_cumulative_durations() {
        let stats = two_mb();
        assert_eq!(stats.total_mb(), 2.0);
        assert_eq!(stats.read_rate(), Some(2.0));
        assert_eq!(stats.write_rate(), Some(4.0));
    }

    #[test]
    fn run_report_lines() {
        assert_eq!(
            two_mb().run_report(4096),
            vec![
                "Buffer size used by the application: 4096",
                "Read 2.000 [MB] of data at 2.000 [MB/s]",
                "Wrote 2.000 [MB] of data at 4.000 [MB/s]",
                "Copied 2.000 [MB] of data at 1.333 [MB/s]",
            ]
        );
    }

    #[test]
    fn completion_report_line() {
        assert_eq!(
            two_mb().completion_report(3),
            "Wrote 2.000 [MB] of data to 3 outputs in 500.000 [ms] at 4.000 [MB/s]"
        );
    }

    #[test]
    fn zero_duration_has_no_rate() {
        let stats = TransferStats::default();
        assert_eq!(stats.copy_rate(), None);
        assert_eq!(stats.run_report(1)[1], "Read 0.000 [MB] of data at n/a [MB/s]");
    }

    #[test]
    fn counters_accumulate() {
        let mut stats = TransferStats::default();
        stats.record_read(Duration::from_micros(10));
        stats.record_write(4, Duration::from_micros(5));
        stats.record_write(4, Duration::from_micros(5));
        assert_eq!(stats.total_bytes, 8);
        assert_eq!(stats.read_duration, Duration::from_micros(10));
        assert_eq!(stats.write_duration, Duration::from_micros(10));
    }
}
