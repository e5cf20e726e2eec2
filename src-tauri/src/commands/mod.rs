//! # Tauri Command 处理模块
//!
//! 本模块包含所有注册到 Tauri 的 command 处理函数。
//! 每个子模块对应一个功能域：
//! - `rules` - 注入规则的登记、查询、清空和脚本生成
//! - `config` - 应用配置的读取、保存和重载

pub mod config;
pub mod rules;
