//! Business logic services layer

pub mod auth_service;

pub use auth_service::AuthService;
