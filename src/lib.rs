//! Multi-user task tracker: signup/signin with bearer tokens, and
//! owner-scoped, paginated task CRUD.

pub mod auth;
pub mod config;
pub mod error;
pub mod routes;
pub mod state;
pub mod store;
