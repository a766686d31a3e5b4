//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Raw URL path
//!     → resolver.rs (decode, normalize)
//!     → matcher.rs (exclusion patterns)
//!     → resolver.rs (file / fallback / index decision, existence check)
//!     → ResolvedTarget
//! ```
//!
//! # Design Decisions
//! - Patterns compiled at startup, immutable at runtime
//! - Deterministic: same path and same disk state give the same target

pub mod matcher;
pub mod resolver;

pub use matcher::{ExclusionSet, PathMatcher};
pub use resolver::{ResolvedTarget, Resolver};
