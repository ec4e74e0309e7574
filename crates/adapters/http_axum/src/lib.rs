//! # crisiswatch-adapter-http-axum
//!
//! HTTP adapter built on [axum](https://docs.rs/axum).
//!
//! ## Responsibilities
//! - Serve a **JSON API** for observers and operators
//!   (`/api/session`, `/api/catalog`, `/api/scan`, `/api/scanner/…`)
//! - Stream appended event-log entries as **Server-Sent Events**
//!   (`/api/log/stream`)
//! - Map HTTP requests into scanner calls (driving adapter)
//! - Map application results into HTTP responses
//!
//! ## Dependency rule
//! Depends on `crisiswatch-app` (for port traits, the scanner and the session)
//! and `crisiswatch-domain` (for types used in request/response mapping).
//! Never leaks axum types into the domain.

pub mod api;
pub mod error;
pub mod router;
pub mod state;
