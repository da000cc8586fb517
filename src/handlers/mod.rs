//! HTTP 处理器模块

pub mod account;
pub mod session_auth;
pub mod status;
