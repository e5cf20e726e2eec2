//! # 打包工具模块
//!
//! `webwrap-pack` 二进制使用的全部逻辑，与桌面外壳运行时无关：
//! - `cli` - clap 命令行参数定义
//! - `scaffold` - 以桌面外壳工程为模板生成独立项目
//! - `toolchain` - 检查 / 安装 tauri-cli，调用 `cargo tauri build`
//! - `builder` - 串联生成、构建、收集产物的完整流水线

pub mod builder;
pub mod cli;
pub mod scaffold;
pub mod toolchain;
