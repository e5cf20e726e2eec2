//! # 构建工具链服务
//!
//! 检查并安装打包所需的外部工具，以及调用 `cargo tauri build` 构建应用。
//! 所有子进程均通过 `tokio::process` 异步执行。
//!
//! 本工具不负责安装 Rust 本身：缺少 `cargo` 时只给出 rustup 安装提示。
//! `cargo tauri build` 继承标准输出和标准错误，编译进度直接显示在终端。

use std::path::Path;
use std::process::Stdio;

use tokio::process::Command;

/// 安装 tauri-cli 时使用的版本约束
const TAURI_CLI_VERSION: &str = "^2";

/// 检查外部工具是否可用
///
/// 以给定参数运行程序（通常是 `--version`），进程成功退出即视为可用。
/// 程序不存在或退出码非零时返回 false。
pub async fn check_tool(program: &str, args: &[&str]) -> bool {
    Command::new(program)
        .args(args)
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .await
        .map(|status| status.success())
        .unwrap_or(false)
}

/// 初始化打包环境
///
/// 1. 检查 `cargo` 是否可用，不可用时提示安装 Rust 工具链
/// 2. 检查 `cargo tauri` 是否可用，不可用时通过 `cargo install` 安装 tauri-cli
///
/// # 错误
/// 缺少 cargo 或 tauri-cli 安装失败时返回错误
pub async fn init_environment() -> Result<(), String> {
    if !check_tool("cargo", &["--version"]).await {
        return Err("未找到 cargo，请先通过 https://rustup.rs 安装 Rust 工具链".to_string());
    }
    log::info!("✓ cargo 已安装");

    if check_tool("cargo", &["tauri", "--version"]).await {
        log::info!("✓ tauri-cli 已安装");
        return Ok(());
    }

    log::info!("正在安装 tauri-cli...");
    let output = Command::new("cargo")
        .args(["install", "tauri-cli", "--version", TAURI_CLI_VERSION, "--locked"])
        .output()
        .await
        .map_err(|e| format!("启动 cargo install 失败: {}", e))?;

    if !output.status.success() {
        return Err(format!(
            "安装 tauri-cli 失败: {}\n{}",
            output.status,
            String::from_utf8_lossy(&output.stderr)
        ));
    }

    log::info!("✓ tauri-cli 安装成功");
    Ok(())
}

/// 在项目目录中执行 `cargo tauri build`
///
/// 子进程继承当前进程的标准输出和标准错误，构建日志直接展示给用户。
///
/// # 错误
/// 进程无法启动或构建失败（退出码非零）时返回错误
pub async fn run_tauri_build(project_dir: &Path) -> Result<(), String> {
    log::info!("执行 cargo tauri build: {}", project_dir.display());

    let status = Command::new("cargo")
        .args(["tauri", "build"])
        .current_dir(project_dir)
        .stdin(Stdio::null())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .status()
        .await
        .map_err(|e| format!("启动 cargo tauri build 失败: {}", e))?;

    if status.success() {
        Ok(())
    } else {
        Err(format!("cargo tauri build 失败: {}", status))
    }
}
