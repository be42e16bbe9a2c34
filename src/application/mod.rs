//! Application layer - The runtime core
//!
//! This layer contains:
//! - Runtime: Session handle and the transport event loop
//! - Messaging: Command routing
//! - Scheduling: Periodic and calendar task execution
//! - Errors: Error taxonomy
//! - Execution: Handler isolation and bounded fan-out

pub mod errors;
pub mod execution;
pub mod format;
pub mod messaging;
pub mod runtime;
pub mod scheduling;
