//! Shared test utilities: tracing setup and a fault-injecting allocator.
//!
//! # Usage
//!
//! ```rust,ignore
//! mod common;
//!
//! #[test]
//! fn my_test() {
//!     common::init_tracing();
//!     // ... test code; build with `--features tracing` to see tree events
//! }
//! ```
//!
//! # Configuration
//!
//! Environment variables:
//! - `RUST_LOG`: Filter directives (e.g., `radixtree=debug,radixtree::alloc=trace`)
//! - `RADIXTREE_LOG_DIR`: Log directory (default: `logs/`)
//! - `RADIXTREE_LOG_CONSOLE`: Set to "0" to disable console output
//!
//! # Log Files
//!
//! Logs are written to `logs/radixtree.jsonl` as newline-delimited JSON (NDJSON):
//!
//! ```bash
//! # Node churn for one test run
//! cat logs/radixtree.jsonl | jq 'select(.fields.message == "releasing empty node")'
//!
//! # Height changes
//! cat logs/radixtree.jsonl | jq 'select(.fields.height != null)'
//! ```

#![allow(dead_code)]

use std::env;
use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Once;

use radixtree::{AllocPolicy, HeapAllocator, Node, NodeAllocator, TreeError};
use tracing::Level;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry};

// ============================================================================
//  Tracing
// ============================================================================

/// Ensures tracing is only initialized once across all tests.
static INIT: Once = Once::new();

/// Initialize the tracing subscriber with file and console logging.
///
/// Safe to call multiple times - only the first call takes effect.
pub fn init_tracing() {
    INIT.call_once(|| {
        setup_tracing();
    });
}

/// Configuration for tracing setup.
#[derive(Debug, Clone)]
pub struct TracingConfig {
    /// Directory for log files.
    pub log_dir: PathBuf,
    /// Log file name.
    pub log_file: String,
    /// Enable console output.
    pub console_enabled: bool,
    /// Default log level if RUST_LOG is not set.
    pub default_level: Level,
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            log_dir: PathBuf::from("logs"),
            log_file: "radixtree.jsonl".to_string(),
            console_enabled: true,
            default_level: Level::INFO,
        }
    }
}

impl TracingConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(dir) = env::var("RADIXTREE_LOG_DIR") {
            config.log_dir = PathBuf::from(dir);
        }

        if env::var("RADIXTREE_LOG_CONSOLE").is_ok_and(|v| v == "0") {
            config.console_enabled = false;
        }

        config
    }
}

/// Create an EnvFilter from RUST_LOG or use default level.
fn make_filter(default_level: Level) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(format!("{default_level}")))
}

#[expect(clippy::expect_used)]
fn setup_tracing() {
    let config = TracingConfig::from_env();

    std::fs::create_dir_all(&config.log_dir).expect("Failed to create log directory");

    let log_path = config.log_dir.join(&config.log_file);

    // Append: test binaries run in separate processes.
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .expect("Failed to open log file");

    // === Console Layer ===
    let console_layer = if config.console_enabled {
        Some(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_file(true)
                .with_line_number(true)
                .with_span_events(FmtSpan::CLOSE)
                .with_ansi(true)
                .compact()
                .with_filter(make_filter(config.default_level)),
        )
    } else {
        None
    };

    // === File Layer (NDJSON format) ===
    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::sync::Mutex::new(file))
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .with_span_events(FmtSpan::CLOSE)
        .json()
        .with_filter(make_filter(config.default_level));

    let _ = Registry::default()
        .with(console_layer)
        .with(file_layer)
        .try_init();
}

// ============================================================================
//  FaultyAllocator
// ============================================================================

/// Heap allocator that fails every allocation after the first `budget`.
///
/// Frees are always accepted. [`refill`](Self::refill) grants a new budget.
#[derive(Debug)]
pub struct FaultyAllocator {
    inner: HeapAllocator,

    /// Allocations still allowed to succeed.
    budget: usize,

    /// Allocations refused so far.
    pub failures: usize,
}

impl FaultyAllocator {
    pub const fn new(budget: usize) -> Self {
        Self {
            inner: HeapAllocator::unbounded(),
            budget,
            failures: 0,
        }
    }

    pub fn refill(&mut self, budget: usize) {
        self.budget = budget;
    }

    pub const fn budget(&self) -> usize {
        self.budget
    }

    pub const fn outstanding(&self) -> usize {
        self.inner.outstanding()
    }
}

impl<T, const WIDTH: usize> NodeAllocator<T, WIDTH> for FaultyAllocator {
    fn alloc_node(&mut self, policy: AllocPolicy) -> Result<Box<Node<T, WIDTH>>, TreeError> {
        if self.budget == 0 {
            self.failures += 1;
            return Err(TreeError::OutOfMemory);
        }

        self.budget -= 1;
        self.inner.alloc_node(policy)
    }

    fn free_node(&mut self, node: Box<Node<T, WIDTH>>) {
        self.inner.free_node(node);
    }

    fn outstanding(&self) -> usize {
        self.inner.outstanding()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tracing_init() {
        init_tracing();
        tracing::info!("Tracing initialized successfully");
        tracing::debug!(index = 42u64, "Debug event");
    }
}
