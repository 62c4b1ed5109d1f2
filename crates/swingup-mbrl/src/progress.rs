//! Console progress bar for parallel jobs.
//!
//! The bar keeps its counter in an atomic so worker threads can tick it
//! directly; [`parallel_progress`] wires it to a rayon fan-out, reporting
//! each job as it completes.

use std::io::Write;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;

use rayon::prelude::*;

/// Thread-safe console progress bar.
pub struct ProgressBar {
    label: String,
    total: usize,
    done: AtomicUsize,
    start_time: Instant,
    width: usize,
}

impl ProgressBar {
    /// Create a bar for `total` units of work.
    pub fn new(label: impl Into<String>, total: usize) -> Self {
        Self {
            label: label.into(),
            total,
            done: AtomicUsize::new(0),
            start_time: Instant::now(),
            width: 30,
        }
    }

    /// Completed units so far.
    pub fn done(&self) -> usize {
        self.done.load(Ordering::Relaxed)
    }

    /// Advance the bar by `n` units and redraw it.
    pub fn inc(&self, n: usize) {
        let done = self.done.fetch_add(n, Ordering::Relaxed) + n;
        self.render(done);
    }

    /// Finish the bar and move to the next line.
    pub fn finish(&self) {
        self.render(self.done());
        println!();
    }

    fn render_bar(&self, progress: f32) -> String {
        let filled = (progress * self.width as f32) as usize;
        let empty = self.width.saturating_sub(filled);
        format!("[{}{}]", "=".repeat(filled), " ".repeat(empty))
    }

    fn render(&self, done: usize) {
        let progress = if self.total > 0 {
            (done as f32 / self.total as f32).min(1.0)
        } else {
            1.0
        };
        let elapsed = self.start_time.elapsed().as_secs_f32();
        let eta = if progress > 0.0 {
            elapsed / progress * (1.0 - progress)
        } else {
            0.0
        };

        let mut out = std::io::stdout();
        let _ = write!(
            out,
            "\r{} {} {:>3}% ({}/{}) | ETA {:>5.0}s",
            self.label,
            self.render_bar(progress),
            (progress * 100.0) as usize,
            done,
            self.total,
            eta
        );
        let _ = out.flush();
    }
}

/// Run `f` over `items` in parallel, ticking a progress bar per completion.
///
/// Results come back in input order.
pub fn parallel_progress<T, R, F>(label: &str, items: Vec<T>, f: F) -> Vec<R>
where
    T: Send,
    R: Send,
    F: Fn(T) -> R + Send + Sync,
{
    let bar = ProgressBar::new(label, items.len());
    let results: Vec<R> = items
        .into_par_iter()
        .map(|item| {
            let result = f(item);
            bar.inc(1);
            result
        })
        .collect();
    bar.finish();
    results
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_counts() {
        let bar = ProgressBar::new("test", 10);
        assert_eq!(bar.done(), 0);
        bar.inc(3);
        bar.inc(2);
        assert_eq!(bar.done(), 5);
        bar.finish();
    }

    #[test]
    fn test_parallel_progress_preserves_order() {
        let items: Vec<usize> = (0..100).collect();
        let results = parallel_progress("square", items, |x| x * x);

        assert_eq!(results.len(), 100);
        for (i, &r) in results.iter().enumerate() {
            assert_eq!(r, i * i);
        }
    }

    #[test]
    fn test_parallel_progress_empty() {
        let results = parallel_progress("noop", Vec::<usize>::new(), |x| x);
        assert!(results.is_empty());
    }
}
