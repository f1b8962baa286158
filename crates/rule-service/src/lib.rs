//! 规则服务
//!
//! 通过 REST API 暴露规则的创建、查询、求值与合并。

pub mod dto;
pub mod error;
pub mod handlers;
pub mod models;
pub mod repository;
pub mod routes;
pub mod service;
pub mod state;

pub use error::{Result, ServiceError};
pub use state::AppState;
