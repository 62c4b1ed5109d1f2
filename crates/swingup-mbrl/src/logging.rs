//! Loggers for the model-fitting loop.
//!
//! Provides console and CSV backends behind a common trait, so the fit loop
//! stays agnostic to where its metrics go.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::time::Instant;

/// Snapshot of the fit loop at one logging interval.
#[derive(Debug, Clone)]
pub struct FitSnapshot {
    /// Optimizer iteration.
    pub iteration: usize,
    /// Mean data log-likelihood of the current minibatch.
    pub log_likelihood: f32,
    /// Regularization term (already divided by the dataset size).
    pub regularization: f32,
    /// Total minimized loss.
    pub loss: f32,
    /// Learning rate in effect.
    pub learning_rate: f64,
}

/// Logger trait for fit metrics.
pub trait FitLogger {
    /// Log one snapshot.
    fn log(&mut self, snapshot: &FitSnapshot);

    /// Flush any buffered output.
    fn flush(&mut self);
}

/// Logger that drops everything (for tests and silent fits).
#[derive(Debug, Default)]
pub struct NullLogger;

impl FitLogger for NullLogger {
    fn log(&mut self, _snapshot: &FitSnapshot) {}
    fn flush(&mut self) {}
}

/// Console logger with fixed-width columns.
pub struct ConsoleLogger {
    log_interval: usize,
    last_log_iter: usize,
    start_time: Instant,
    show_header: bool,
}

impl ConsoleLogger {
    /// Create a console logger emitting every `log_interval` iterations.
    pub fn new(log_interval: usize) -> Self {
        Self {
            log_interval: log_interval.max(1),
            last_log_iter: 0,
            start_time: Instant::now(),
            show_header: true,
        }
    }

    fn print_header(&self) {
        println!(
            "{:>8} {:>12} {:>12} {:>12} {:>10} {:>8}",
            "Iter", "LogLik", "Reg", "Loss", "LR", "it/s"
        );
        println!("{}", "-".repeat(68));
    }
}

impl FitLogger for ConsoleLogger {
    fn log(&mut self, snapshot: &FitSnapshot) {
        if snapshot.iteration != 0
            && snapshot.iteration < self.last_log_iter + self.log_interval
        {
            return;
        }

        if self.show_header {
            self.print_header();
            self.show_header = false;
        }

        let elapsed = self.start_time.elapsed().as_secs_f32();
        let rate = if elapsed > 0.0 {
            snapshot.iteration as f32 / elapsed
        } else {
            0.0
        };

        println!(
            "{:>8} {:>12.4} {:>12.6} {:>12.4} {:>10.2e} {:>8.0}",
            snapshot.iteration,
            snapshot.log_likelihood,
            snapshot.regularization,
            snapshot.loss,
            snapshot.learning_rate,
            rate
        );

        self.last_log_iter = snapshot.iteration;
    }

    fn flush(&mut self) {
        // stdout is line-buffered, nothing to do
    }
}

/// CSV file logger for offline analysis.
pub struct CsvLogger {
    writer: BufWriter<File>,
    start_time: Instant,
}

impl CsvLogger {
    /// Create a CSV logger writing to `path`.
    pub fn new(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        writeln!(
            writer,
            "iteration,log_likelihood,regularization,loss,learning_rate,elapsed_secs"
        )?;

        Ok(Self {
            writer,
            start_time: Instant::now(),
        })
    }
}

impl FitLogger for CsvLogger {
    fn log(&mut self, snapshot: &FitSnapshot) {
        let elapsed = self.start_time.elapsed().as_secs_f32();
        let _ = writeln!(
            self.writer,
            "{},{:.6},{:.8},{:.6},{:.8},{:.2}",
            snapshot.iteration,
            snapshot.log_likelihood,
            snapshot.regularization,
            snapshot.loss,
            snapshot.learning_rate,
            elapsed
        );
    }

    fn flush(&mut self) {
        let _ = self.writer.flush();
    }
}

impl Drop for CsvLogger {
    fn drop(&mut self) {
        self.flush();
    }
}
