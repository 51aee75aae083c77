//! Observability for the probe: structured logging on standard error

pub mod logging;

pub use logging::{init_default_logging, init_logging, parse_level, LogFormat};
pub use logging::probe_span;
