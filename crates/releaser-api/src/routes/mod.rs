//! # Route Modules
//!
//! Each module defines an Axum Router for one part of the HTTP surface.
//! Routers are merged in [`crate::app`].

pub mod artifacts;
pub mod health;
pub mod releases;
