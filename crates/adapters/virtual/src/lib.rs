//! # crisiswatch-adapter-virtual
//!
//! Virtual/demo backend that lets the engine run end-to-end without any
//! external service.
//!
//! ## Provided collaborators
//!
//! | Type | Port | Behaviour |
//! |------|------|-----------|
//! | [`VirtualInbox`] | `CrisisDetector` | Keyword analysis of delivered messages, with a processed-message cache |
//! | [`Outbox`] | `ResponseDispatcher`, `ComplianceRecorder` | Records sent responses and compliance reports |
//! | [`PacedStepExecutor`] | `StepExecutor` | Waits for a step's estimated duration |
//!
//! ## Dependency rule
//!
//! Depends on `crisiswatch-app` (port traits) and `crisiswatch-domain` only.

mod executor;
mod inbox;
mod outbox;
pub mod rules;

pub use executor::PacedStepExecutor;
pub use inbox::{InboxMessage, VirtualInbox};
pub use outbox::{ComplianceRecord, Outbox, SentResponse};
