//! # 应用配置 Tauri Commands
//!
//! - `read_app_config` - 读取当前生效的配置
//! - `save_app_config` - 保存配置到运行时配置文件并立即生效
//! - `reload_app_config` - 从运行时配置文件重新加载配置
//!
//! 运行时配置文件位于 `<config_dir>/webwrap/app.json`，可用 `WEBWRAP_CONFIG` 环境变量覆盖。
//!
//! 文件读写通过 `tokio::fs` 异步完成，不阻塞 Tauri 的异步 command 工作线程。
//! 保存成功后配置监听器还会收到一次修改事件，重复的重载结果一致。

use tauri::State;

use crate::models::config::{self, AppConfig};
use crate::services::app_config::{self, ConfigState};
use crate::services::injection::RuleStore;

/// 读取当前生效的应用配置
#[tauri::command]
pub async fn read_app_config(state: State<'_, ConfigState>) -> Result<AppConfig, String> {
    Ok(state.get())
}

/// 保存应用配置
///
/// 写入运行时配置文件后立即更新内存中的配置和注入规则。
/// 文件监听器随后也会收到修改事件并再次重载，结果相同。
///
/// # 错误
/// 配置文件路径未知或写入失败时返回错误
#[tauri::command]
pub async fn save_app_config(
    config: AppConfig,
    state: State<'_, ConfigState>,
    store: State<'_, RuleStore>,
) -> Result<(), String> {
    config::save_config(&config, state.path()?).await?;
    app_config::apply_config(config, &state, &store);
    Ok(())
}

/// 从运行时配置文件重新加载配置
///
/// # 返回值
/// 重新加载后的注入规则数量
///
/// # 错误
/// 读取或解析失败时返回错误，原有规则保持不变
#[tauri::command]
pub async fn reload_app_config(
    state: State<'_, ConfigState>,
    store: State<'_, RuleStore>,
) -> Result<usize, String> {
    app_config::reload_config_async(&state, &store).await
}
