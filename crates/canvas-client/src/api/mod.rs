//! Typed endpoint accessors.

mod context;
mod health;

pub use context::ContextApi;
pub use health::HealthApi;
