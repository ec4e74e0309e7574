//! # crisiswatch-domain
//!
//! Pure domain model for the crisiswatch crisis-response engine.
//!
//! ## Responsibilities
//! - Foundational types: typed identifiers, error conventions, timestamps
//! - Define the **automation catalog** (definitions and their step templates)
//! - Define **crisis events** as reported by the detection collaborator
//! - Define **automation instances** and their monotonic step state machine
//! - Define **log entries** (the user-facing narration of a run)
//! - Define **email drafts** and the deterministic response drafter
//! - Define the **scan state** exposed to the presentation layer
//!
//! ## Dependency rule
//! This crate has **no internal dependencies**.
//! It must never import anything from `app`, adapters, or external IO crates.
//! All IO boundaries are expressed as traits in the `app` crate (ports).

pub mod error;
pub mod id;
pub mod time;

pub mod automation;
pub mod catalog;
pub mod crisis;
pub mod draft;
pub mod log;
pub mod scan;
