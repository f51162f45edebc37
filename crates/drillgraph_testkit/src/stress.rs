//! Stress runs for the engine.
//!
//! These drive many concurrent mutations and queries and check that
//! per-document serialization held.

use drillgraph_core::{Address, CoreError, Edit, Engine, Mutation};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

/// Result of a stress test run.
#[derive(Debug, Clone)]
pub struct StressTestResult {
    /// Total operations performed.
    pub total_ops: usize,
    /// Successful operations.
    pub successful_ops: usize,
    /// Failed operations.
    pub failed_ops: usize,
    /// Total duration.
    pub duration: Duration,
    /// Operations per second.
    pub ops_per_second: f64,
}

impl StressTestResult {
    /// Creates a new result.
    pub fn new(successful: usize, failed: usize, duration: Duration) -> Self {
        let total = successful + failed;
        let ops_per_second = if duration.as_secs_f64() > 0.0 {
            total as f64 / duration.as_secs_f64()
        } else {
            0.0
        };

        Self {
            total_ops: total,
            successful_ops: successful,
            failed_ops: failed,
            duration,
            ops_per_second,
        }
    }

    /// Prints a summary of the run.
    pub fn print_summary(&self, name: &str) {
        println!("\n=== {name} ===");
        println!("Total operations: {}", self.total_ops);
        println!("Successful: {}", self.successful_ops);
        println!("Failed: {}", self.failed_ops);
        println!("Duration: {:?}", self.duration);
        println!("Throughput: {:.2} ops/sec", self.ops_per_second);
    }
}

/// Configuration for stress runs.
#[derive(Debug, Clone)]
pub struct StressConfig {
    /// Operations per thread.
    pub operations: usize,
    /// Number of concurrent threads.
    pub threads: usize,
    /// Number of distinct documents the threads contend on.
    pub documents: usize,
}

impl Default for StressConfig {
    fn default() -> Self {
        Self {
            operations: 200,
            threads: 4,
            documents: 2,
        }
    }
}

/// Id of the `i`-th stress document.
pub fn stress_document_id(i: usize) -> String {
    format!("stress{i}")
}

/// Creates `config.documents` empty-lined documents, then has every thread
/// append one line per operation, round-robin over the documents.
///
/// With per-document locking no append is lost, so afterwards the line
/// counts sum to the number of successful operations.
///
/// # Panics
///
/// Panics if a stress document cannot be created. Existing ones are reused.
pub fn stress_concurrent_appends(engine: Arc<Engine>, config: &StressConfig) -> StressTestResult {
    let documents = config.documents.max(1);
    for i in 0..documents {
        let id = stress_document_id(i);
        match engine.create_document(&id, "", Default::default()) {
            Ok(_) | Err(CoreError::DocumentExists { .. }) => {}
            Err(e) => panic!("Failed to create {id}: {e}"),
        }
    }

    let start = Instant::now();
    let handles: Vec<_> = (0..config.threads)
        .map(|t| {
            let engine = Arc::clone(&engine);
            let operations = config.operations;
            thread::spawn(move || {
                let mut successful = 0usize;
                let mut failed = 0usize;
                for op in 0..operations {
                    let id = stress_document_id((t + op) % documents);
                    let mutation = Mutation::new(
                        Address::lines(),
                        Edit::Insert {
                            position: usize::MAX,
                            value: format!("t{t} op{op}"),
                        },
                    );
                    match engine.mutate(&id, &mutation) {
                        Ok(_) => successful += 1,
                        Err(_) => failed += 1,
                    }
                }
                (successful, failed)
            })
        })
        .collect();

    let (mut successful, mut failed) = (0, 0);
    for handle in handles {
        match handle.join() {
            Ok((s, f)) => {
                successful += s;
                failed += f;
            }
            Err(_) => failed += config.operations,
        }
    }

    StressTestResult::new(successful, failed, start.elapsed())
}

/// Mixes cross-link queries and drill-downs with appends from other threads.
pub fn stress_reads_during_writes(engine: Arc<Engine>, config: &StressConfig) -> StressTestResult {
    let writer = {
        let engine = Arc::clone(&engine);
        let config = config.clone();
        thread::spawn(move || stress_concurrent_appends(engine, &config))
    };

    let start = Instant::now();
    let mut successful = 0usize;
    let mut failed = 0usize;
    for op in 0..config.operations {
        let result = if op % 2 == 0 {
            engine.cross_links().map(|_| ())
        } else {
            engine
                .build_tree(&stress_document_id(op % config.documents.max(1)), Some(2))
                .map(|_| ())
        };
        match result {
            Ok(()) => successful += 1,
            // The document may not have been created yet.
            Err(_) => failed += 1,
        }
    }

    let writes = writer
        .join()
        .unwrap_or_else(|_| StressTestResult::new(0, 0, Duration::ZERO));
    StressTestResult::new(
        successful + writes.successful_ops,
        failed + writes.failed_ops,
        start.elapsed(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::TestEngine;

    #[test]
    fn test_concurrent_appends_lose_nothing() {
        let engine = Arc::new(TestEngine::memory().engine);
        let config = StressConfig {
            operations: 50,
            threads: 4,
            documents: 2,
        };
        let result = stress_concurrent_appends(Arc::clone(&engine), &config);
        result.print_summary("concurrent appends");

        assert_eq!(result.failed_ops, 0);
        let lines: usize = engine
            .list_summaries()
            .unwrap()
            .iter()
            .map(|s| s.line_count)
            .sum();
        assert_eq!(lines, result.successful_ops);
    }

    #[test]
    fn test_reads_during_writes() {
        let engine = Arc::new(TestEngine::memory().engine);
        let config = StressConfig {
            operations: 40,
            threads: 2,
            documents: 2,
        };
        let result = stress_reads_during_writes(Arc::clone(&engine), &config);
        result.print_summary("reads during writes");
        assert!(result.successful_ops >= 40);
    }
}
