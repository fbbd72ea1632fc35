//! Heimdall tools — external analyzer plumbing
//!
//! Subprocess invocation with enforced deadlines, request-scoped payload
//! files, and the narrow interface the API layer talks to. The actual
//! diagnosis and recovery intelligence lives in the external tool; nothing
//! in this crate interprets its output beyond a JSON parse attempt.

pub mod analyzer;
pub mod invoker;
pub mod payload;

pub use analyzer::{
    command_available, AnalyzerAvailability, AnalyzerRun, CliAnalyzer, CommandStatus,
    ExternalAnalyzer,
};
pub use invoker::{invoke, CommandSpec, InvokeError, InvokeOutput};
pub use payload::ErrorPayload;
