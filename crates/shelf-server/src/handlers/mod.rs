//! HTTP handlers.

pub mod bootstrap;
pub mod health;
pub mod invalidate;
pub mod metrics;
pub mod response;
