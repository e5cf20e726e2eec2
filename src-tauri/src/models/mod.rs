//! # 数据模型模块
//!
//! 所有结构体均派生 `Serialize` 和 `Deserialize`，用于 Tauri IPC 传输和 JSON 文件读写。
//! - `config` - 被打包应用的配置（`app.json`）

pub mod config;
