//! keyweave 核心模块
//!
//! 包含输入注入与配置管理

pub mod config;
pub mod input;
