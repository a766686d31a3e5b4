//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → tracing events (operator messages, warnings)
//!     → logging.rs access lines (one per response)
//!
//! Consumers:
//!     → stdout via tracing-subscriber fmt layer
//! ```

pub mod logging;
