//! # 路径工具函数
//!
//! 提供与配置文件路径相关的工具函数：
//! - 获取 webwrap 配置目录（`<config_dir>/webwrap/`）
//! - 解析运行时配置文件路径（支持 `WEBWRAP_CONFIG` 环境变量覆盖）

use std::ffi::OsString;
use std::path::PathBuf;

/// 覆盖配置文件路径的环境变量名
pub const CONFIG_ENV_VAR: &str = "WEBWRAP_CONFIG";

/// 配置文件名
pub const CONFIG_FILE_NAME: &str = "app.json";

/// 获取 webwrap 配置目录的绝对路径
///
/// 使用 `dirs` crate 获取跨平台的用户配置目录。
///
/// # 示例
/// - Windows: `C:\Users\username\AppData\Roaming\webwrap`
/// - macOS: `/Users/username/Library/Application Support/webwrap`
/// - Linux: `/home/username/.config/webwrap`
///
/// # 错误
/// 无法确定用户配置目录时返回错误信息
pub fn get_config_dir() -> Result<PathBuf, String> {
    let base = dirs::config_dir().ok_or_else(|| "无法获取用户配置目录".to_string())?;
    Ok(base.join("webwrap"))
}

/// 解析运行时配置文件路径
///
/// 优先级：`WEBWRAP_CONFIG` 环境变量（非空时） > `<config_dir>/webwrap/app.json`
///
/// # 错误
/// 未设置环境变量且无法确定用户配置目录时返回错误信息
pub fn resolve_config_path() -> Result<PathBuf, String> {
    select_config_path(std::env::var_os(CONFIG_ENV_VAR), get_config_dir().ok())
}

/// 按优先级从候选项中选出配置文件路径
fn select_config_path(
    env_override: Option<OsString>,
    config_dir: Option<PathBuf>,
) -> Result<PathBuf, String> {
    if let Some(path) = env_override.filter(|p| !p.is_empty()) {
        return Ok(PathBuf::from(path));
    }

    config_dir
        .map(|dir| dir.join(CONFIG_FILE_NAME))
        .ok_or_else(|| "无法获取用户配置目录".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_override_wins() {
        let path = select_config_path(
            Some(OsString::from("/tmp/custom.json")),
            Some(PathBuf::from("/home/u/.config/webwrap")),
        )
        .unwrap();
        assert_eq!(path, PathBuf::from("/tmp/custom.json"));
    }

    #[test]
    fn test_empty_env_falls_back_to_config_dir() {
        let path = select_config_path(
            Some(OsString::new()),
            Some(PathBuf::from("/home/u/.config/webwrap")),
        )
        .unwrap();
        assert_eq!(path, PathBuf::from("/home/u/.config/webwrap").join("app.json"));
    }

    #[test]
    fn test_no_candidates_is_an_error() {
        assert!(select_config_path(None, None).is_err());
    }
}
