//! # webwrap - 桌面外壳原生入口点
//!
//! 打包出的每个桌面应用都从这里启动：`main()` 只调用 `app_lib::run()`，
//! 配置加载、注入规则填充、主窗口创建和配置监听全部在 `lib.rs` 中完成。
//!
//! 核心逻辑放在库 crate 中，以便桌面端入口和移动端入口
//! （`#[cfg_attr(mobile, tauri::mobile_entry_point)]`）共享同一份初始化代码，
//! 同时让 `webwrap-pack` 打包工具复用配置模型和项目生成逻辑。

// Prevents additional console window on Windows in release, DO NOT REMOVE!!
// 在 Windows 平台的 Release 构建中隐藏控制台窗口，请勿移除此属性！
// 仅在非调试模式下生效，调试构建保留控制台以便查看日志输出。
#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

/// 桌面外壳主入口函数
///
/// 调用 `app_lib::run()` 启动 Tauri 事件循环，直到主窗口关闭才返回。
fn main() {
  app_lib::run();
}
