//! # 通用工具函数模块
//!
//! - `path` - 配置目录和配置文件路径解析

pub mod path;
