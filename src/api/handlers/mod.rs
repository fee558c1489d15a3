//! API route handlers.
//!
//! `auth` carries the identity core (registration, dual-mode login, session
//! validation). `google` is the Drive link flow built on the signed state
//! from the auth core. `health` and `root` are operational endpoints.

pub mod auth;
pub mod google;
pub mod health;
pub mod root;
