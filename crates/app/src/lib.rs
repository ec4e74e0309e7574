//! # crisiswatch-app
//!
//! Application layer: use-cases and **port definitions** (traits).
//!
//! ## Responsibilities
//! - Define **port traits** that adapters must implement (driven/outbound ports):
//!   - `CrisisDetector`: check the inbox, reset the deduplication cache
//!   - `ResponseDispatcher`: deliver the drafted response
//!   - `ComplianceRecorder`: record a handled crisis
//!   - `StepExecutor`: perform the action behind one automation step
//! - Define the **use-cases** driven by the outside world:
//!   - `WorkflowRunner`: run automations, draft, dispatch, record compliance
//!   - `Scanner`: periodic and manual detection with mutual exclusion
//! - Own the **session** aggregate observers read (`Session`, `SessionState`)
//! - Provide **in-process infrastructure** (log bus) that doesn't need IO
//!
//! ## Dependency rule
//! Depends on `crisiswatch-domain` only (plus `tokio` for channels, timers and
//! the scanner task). Never imports adapter crates. Adapters depend on *this*
//! crate, not the reverse.

pub mod log_bus;
pub mod ports;
pub mod scanner;
pub mod session;
pub mod workflow_runner;

#[cfg(test)]
mod testing;
