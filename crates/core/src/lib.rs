//! Showroom Core - Shared types library.
//!
//! This crate provides the domain types used across all Showroom components:
//! - `site` - Public dealership marketing site
//! - `admin` - Content-management panel for dealership staff
//! - `backend` - Typed client for the remote backend service that owns all data
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no HTTP clients. The backend
//! service is the source of truth for every record defined here; the web
//! crates only hold cached copies.
//!
//! # Modules
//!
//! - [`types`] - Newtype IDs, emails, prices, statuses and the admin session
//! - [`entities`] - Records exchanged with the backend service

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod entities;
pub mod types;

pub use entities::*;
pub use types::*;
