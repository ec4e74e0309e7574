//! Port definitions: traits that adapters implement.
//!
//! Ports are the boundaries between the application core and the outside world.
//! They are defined here (in `app`) so that both the use-case layer and the
//! adapter layer can depend on them without creating circular dependencies.

pub mod compliance;
pub mod detection;
pub mod dispatch;
pub mod step_executor;

pub use compliance::ComplianceRecorder;
pub use detection::CrisisDetector;
pub use dispatch::ResponseDispatcher;
pub use step_executor::StepExecutor;
