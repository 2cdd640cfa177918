//! Test helpers para shelf-server.

#![allow(dead_code, unused_imports)]

pub mod client;
pub mod fixtures;

pub use client::{TestClient, TestResponse, client};
pub use fixtures::*;
