//! 会话认证库
//! 可插拔的认证策略、会话生命周期与账户服务

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod redact;
pub mod repository;
pub mod routes;
pub mod services;
pub mod telemetry;
