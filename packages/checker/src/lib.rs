#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Checker trait, execution wrapper, registry, and the 13 compliance
//! checker implementations.

pub mod checkers;
pub mod registry;

use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use defarm_checker_models::{CheckerDescriptor, CheckerResult, Evidence, Status};
use defarm_input_models::{InputType, NormalizedInput};
use switchy_database::Database;

pub use registry::{CheckerRegistry, RegistryConfig, build_registry};

/// Per-invocation context passed to every checker.
pub struct CheckContext {
    /// Handle to the relational/spatial store.
    pub db: Arc<dyn Database>,
}

/// Uniform contract every compliance checker implements.
///
/// Mirrors the shape of the teacher's `CrimeSource` trait: a small set of
/// metadata accessors plus one fallible async operation.
#[async_trait]
pub trait Checker: Send + Sync {
    /// Static metadata for this checker.
    fn descriptor(&self) -> &'static CheckerDescriptor;

    /// Whether this checker supports `input_type`.
    fn applies_to(&self, input_type: InputType) -> bool {
        self.descriptor().applies_to(input_type)
    }

    /// Executes the check against `input`.
    ///
    /// Implementations only need to handle the input types they declare in
    /// `supportedInputTypes`; [`instrument`] filters unsupported input
    /// before this is called.
    async fn execute(&self, input: &NormalizedInput, ctx: &CheckContext) -> CheckerResult;
}

/// Runs `checker` against `input`, injecting `cached = false`,
/// `executionTimeMs`, the checker's configured timeout, and `NOT_APPLICABLE`
/// short-circuiting for unsupported input types.
///
/// This is the single place that wraps every checker invocation; callers
/// (the cache layer, the orchestrator) never call `execute` directly.
pub async fn instrument(
    checker: &dyn Checker,
    input: &NormalizedInput,
    ctx: &CheckContext,
) -> CheckerResult {
    let descriptor = checker.descriptor();

    if !checker.applies_to(input.input_type) {
        return CheckerResult {
            status: Status::NotApplicable,
            severity: None,
            message: format!("{} does not apply to {}", descriptor.name, input.input_type),
            details: serde_json::Value::Null,
            evidence: Evidence {
                data_source: descriptor.name.to_string(),
                url: None,
                last_update: None,
                raw: None,
            },
            execution_time_ms: 0,
            cached: false,
        };
    }

    let started = Instant::now();
    let timeout = std::time::Duration::from_millis(descriptor.timeout_ms);

    let result = match tokio::time::timeout(timeout, checker.execute(input, ctx)).await {
        Ok(result) => result,
        Err(_) => {
            log::warn!("checker {} timed out after {:?}", descriptor.name, timeout);
            CheckerResult {
                status: Status::Error,
                severity: None,
                message: "timeout".to_string(),
                details: serde_json::Value::Null,
                evidence: Evidence {
                    data_source: descriptor.name.to_string(),
                    url: None,
                    last_update: None,
                    raw: None,
                },
                execution_time_ms: 0,
                cached: false,
            }
        }
    };

    if result.status == Status::Error {
        log::warn!("checker {} returned ERROR: {}", descriptor.name, result.message);
    }

    CheckerResult {
        execution_time_ms: u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
        cached: false,
        ..result
    }
}
