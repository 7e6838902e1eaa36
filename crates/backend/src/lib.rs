//! Showroom Backend - typed client for the backend RPC service.
//!
//! The backend owns every record (vehicles, promotions, testimonials, blog
//! posts, comments, media, leads, visitor stats). The site and the admin
//! panel talk to it only through [`BackendClient`].
//!
//! # Operations
//!
//! - Public reads and submissions, used by the site (no token)
//! - Admin login/logout and token-gated CRUD, used by the admin panel
//!
//! Token-gated CRUD is generic over the [`Resource`] and [`Editable`] traits,
//! which record each entity's RPC method names and related cache slots.
//!
//! # Example
//!
//! ```rust,ignore
//! use showroom_backend::{BackendClient, BackendConfig};
//! use showroom_core::Vehicle;
//!
//! let client = BackendClient::new(&config.backend)?;
//! let _probe = client.spawn_readiness_probe();
//!
//! let session = client.admin_login("staff@dealer.com", &password).await?;
//! if let Some(session) = session {
//!     let vehicles = client.list::<Vehicle>(session.token()).await?;
//! }
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

mod admin;
mod client;
mod error;
mod public;
pub mod resource;

pub use admin::SESSION_PROBE_METHOD;
pub use client::{BackendClient, BackendConfig};
pub use error::BackendError;
pub use resource::{Editable, Resource, ResourceKind};
