//! # 业务逻辑服务模块
//!
//! 包含桌面外壳的核心业务逻辑，与 Tauri command 层解耦：
//! - `injection` - 注入规则存储与 URL 匹配
//! - `script` - 注入脚本生成
//! - `page_load` - 页面加载时解析规则并生成脚本
//! - `app_config` - 运行时配置状态、启动加载与重载
//! - `watcher` - 配置文件监听（热重载）

pub mod app_config;
pub mod injection;
pub mod page_load;
pub mod script;
pub mod watcher;
