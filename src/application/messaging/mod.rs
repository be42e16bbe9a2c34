//! Message handling - Routes inbound text to plugin commands

pub mod router;

pub use router::CommandRouter;
