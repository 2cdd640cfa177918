//! Custom extractors for the HTTP handlers.

pub mod query;
pub mod token;

pub use query::BootstrapQuery;
pub use token::AdminToken;
