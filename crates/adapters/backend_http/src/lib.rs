//! # crisiswatch-adapter-backend-http
//!
//! Driven adapter for the crisis backend, built on [reqwest](https://docs.rs/reqwest).
//!
//! ## Responsibilities
//! - Implement `CrisisDetector` over `POST /api/crisis/check-emails` and
//!   `POST /api/crisis/reset-emails`
//! - Implement `ResponseDispatcher` over `POST /api/crisis/respond-email`
//! - Implement `ComplianceRecorder` over `POST /api/crisis/execute`
//! - Map the backend's `{success, error}` envelopes into typed port errors
//!
//! ## Dependency rule
//! Depends on `crisiswatch-app` (for port traits) and `crisiswatch-domain`.
//! Wire types stay private to this crate.

pub mod client;
pub mod config;
pub mod error;
mod wire;

pub use client::BackendClient;
pub use config::BackendConfig;
pub use error::BackendError;
