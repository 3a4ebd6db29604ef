//! Stress helpers for data backends.
//!
//! These run many operations from several threads against one shared
//! backend and count how many succeed.

use retryspool_data::{Background, DataBackend};
use std::io::Read;
use std::sync::atomic::{AtomicUsize, Ordering};
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
}

impl StressTestResult {
    /// Creates a new result.
    pub fn new(successful: usize, failed: usize, duration: Duration) -> Self {
        Self {
            total_ops: successful + failed,
            successful_ops: successful,
            failed_ops: failed,
            duration,
        }
    }

    /// Returns true if every operation succeeded.
    pub fn all_succeeded(&self) -> bool {
        self.failed_ops == 0
    }

    /// Prints a summary of the test.
    pub fn print_summary(&self, name: &str) {
        println!("\n=== {} ===", name);
        println!("Total operations: {}", self.total_ops);
        println!("Successful: {}", self.successful_ops);
        println!("Failed: {}", self.failed_ops);
        println!("Duration: {:?}", self.duration);
    }
}

/// Configuration for stress tests.
#[derive(Debug, Clone)]
pub struct StressConfig {
    /// Number of concurrent threads.
    pub threads: usize,
    /// Distinct ids owned by each thread.
    pub ids_per_thread: usize,
    /// Size of each payload in bytes.
    pub payload_size: usize,
}

impl Default for StressConfig {
    fn default() -> Self {
        Self {
            threads: 8,
            ids_per_thread: 32,
            payload_size: 1024,
        }
    }
}

/// Id used by `thread` for its `index`-th blob.
pub fn stress_id(thread: usize, index: usize) -> String {
    format!("t{thread:02}-{index:05}")
}

/// Deterministic payload for an id, so readers can verify content.
pub fn stress_payload(id: &str, size: usize) -> Vec<u8> {
    id.bytes().cycle().take(size.max(id.len())).collect()
}

/// Stores distinct ids from every thread concurrently, then reads each one
/// back and compares it with what was written.
///
/// A store counts as successful only if its reported size and its
/// read-back content both match.
pub fn stress_concurrent_store(
    backend: Arc<dyn DataBackend>,
    config: &StressConfig,
) -> StressTestResult {
    let successful = Arc::new(AtomicUsize::new(0));
    let failed = Arc::new(AtomicUsize::new(0));
    let start = Instant::now();

    let handles: Vec<_> = (0..config.threads)
        .map(|t| {
            let backend = Arc::clone(&backend);
            let failed = Arc::clone(&failed);
            let config = config.clone();

            thread::spawn(move || {
                for i in 0..config.ids_per_thread {
                    let id = stress_id(t, i);
                    let payload = stress_payload(&id, config.payload_size);
                    match backend.store_data(&Background, &id, &mut payload.as_slice()) {
                        Ok(size) if size == payload.len() as u64 => {}
                        _ => {
                            failed.fetch_add(1, Ordering::Relaxed);
                        }
                    }
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().expect("Stress thread panicked");
    }

    for t in 0..config.threads {
        for i in 0..config.ids_per_thread {
            let id = stress_id(t, i);
            let expected = stress_payload(&id, config.payload_size);
            if read_matches(backend.as_ref(), &id, &expected) {
                successful.fetch_add(1, Ordering::Relaxed);
            }
        }
    }

    let successful = successful.load(Ordering::Relaxed);
    let total = config.threads * config.ids_per_thread;
    let failed = failed.load(Ordering::Relaxed).max(total - successful);
    StressTestResult::new(total - failed, failed, start.elapsed())
}

/// Each thread repeatedly stores, reads and deletes its own ids while the
/// other threads do the same.
pub fn stress_mixed_operations(
    backend: Arc<dyn DataBackend>,
    config: &StressConfig,
) -> StressTestResult {
    let successful = Arc::new(AtomicUsize::new(0));
    let failed = Arc::new(AtomicUsize::new(0));
    let start = Instant::now();

    let handles: Vec<_> = (0..config.threads)
        .map(|t| {
            let backend = Arc::clone(&backend);
            let successful = Arc::clone(&successful);
            let failed = Arc::clone(&failed);
            let config = config.clone();

            thread::spawn(move || {
                for i in 0..config.ids_per_thread {
                    let id = stress_id(t, i);
                    let payload = stress_payload(&id, config.payload_size);

                    let ok = backend
                        .store_data(&Background, &id, &mut payload.as_slice())
                        .is_ok()
                        && read_matches(backend.as_ref(), &id, &payload)
                        && backend.delete_data(&Background, &id).is_ok()
                        && backend
                            .data_reader(&Background, &id)
                            .err()
                            .is_some_and(|e| e.is_not_found());

                    if ok {
                        successful.fetch_add(1, Ordering::Relaxed);
                    } else {
                        failed.fetch_add(1, Ordering::Relaxed);
                    }
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().expect("Stress thread panicked");
    }

    StressTestResult::new(
        successful.load(Ordering::Relaxed),
        failed.load(Ordering::Relaxed),
        start.elapsed(),
    )
}

fn read_matches(backend: &dyn DataBackend, id: &str, expected: &[u8]) -> bool {
    let mut data = Vec::new();
    match backend.data_reader(&Background, id) {
        Ok(mut reader) => reader.read_to_end(&mut data).is_ok() && data == expected,
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use retryspool_data::InMemoryBackend;

    #[test]
    fn payload_is_deterministic() {
        let id = stress_id(3, 7);
        assert_eq!(id, "t03-00007");
        assert_eq!(stress_payload(&id, 20), stress_payload(&id, 20));
        assert_eq!(stress_payload(&id, 20).len(), 20);
    }

    #[test]
    fn memory_backend_survives_stress() {
        let config = StressConfig {
            threads: 4,
            ids_per_thread: 16,
            payload_size: 64,
        };
        let result = stress_concurrent_store(Arc::new(InMemoryBackend::new()), &config);
        assert!(result.all_succeeded(), "{result:?}");
        assert_eq!(result.total_ops, 64);
    }
}
