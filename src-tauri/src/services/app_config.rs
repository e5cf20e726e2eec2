//! # 运行时配置管理服务
//!
//! 持有桌面外壳当前生效的 `AppConfig`，并负责把配置同步进注入规则存储：
//! - 启动时：优先读取运行时配置文件，不存在时使用内置配置
//! - 重载时：重新读取配置文件，整体替换注入规则
//!
//! ## 线程安全
//! 配置重载可能来自文件监听线程，也可能来自前端 command，
//! 与页面加载回调并发执行。当前配置用 `RwLock` 保护，
//! 规则替换通过 `RuleStore::replace_rules` 一次写锁完成。
//!
//! 两次并发的 `apply_config` 由 `apply_lock` 串行化：
//! 否则可能出现配置状态来自 A、注入规则来自 B 的交错结果。
//!
//! ## 同步与异步
//! - `reload_config` - 同步读取，供 notify 事件线程调用
//! - `reload_config_async` - 通过 `tokio::fs` 读取，供 Tauri command 调用

use std::path::{Path, PathBuf};
use std::sync::{Mutex, RwLock};

use crate::models::config::{self, AppConfig};
use crate::services::injection::{self, RuleStore};

/// 应用全局配置状态
///
/// 通过 Tauri 的 `manage()` 注册，command 通过 `State<ConfigState>` 访问。
pub struct ConfigState {
    /// 当前生效的配置
    current: RwLock<AppConfig>,
    /// 运行时配置文件路径；无法确定用户配置目录时为 None
    path: Option<PathBuf>,
    /// 保证"更新配置 + 替换规则"两步整体执行
    apply_lock: Mutex<()>,
}

impl ConfigState {
    /// 创建配置状态
    ///
    /// # 参数
    /// - `config` - 初始配置
    /// - `path` - 运行时配置文件路径
    pub fn new(config: AppConfig, path: Option<PathBuf>) -> Self {
        Self {
            current: RwLock::new(config),
            path,
            apply_lock: Mutex::new(()),
        }
    }

    /// 获取当前配置的副本
    pub fn get(&self) -> AppConfig {
        self.current
            .read()
            .map(|c| c.clone())
            .unwrap_or_else(|poisoned| poisoned.into_inner().clone())
    }

    /// 替换当前配置
    pub fn set(&self, config: AppConfig) {
        match self.current.write() {
            Ok(mut current) => *current = config,
            Err(poisoned) => *poisoned.into_inner() = config,
        }
    }

    /// 运行时配置文件路径
    ///
    /// # 错误
    /// 启动时未能确定配置文件路径时返回错误
    pub fn path(&self) -> Result<&Path, String> {
        self.path
            .as_deref()
            .ok_or_else(|| "未能确定配置文件路径".to_string())
    }
}

/// 加载启动配置
///
/// 运行时配置文件存在且可解析时使用它，否则回退到内置配置。
/// 配置文件损坏时记录警告而不是阻止应用启动。
///
/// # 参数
/// - `path` - 运行时配置文件路径
pub fn load_startup_config(path: Option<&Path>) -> AppConfig {
    let Some(path) = path.filter(|p| p.exists()) else {
        return AppConfig::bundled();
    };

    match config::load_config(path) {
        Ok(config) => {
            log::info!("已加载配置文件: {}", path.display());
            config
        }
        Err(e) => {
            log::warn!("{}，使用内置配置", e);
            AppConfig::bundled()
        }
    }
}

/// 应用一份配置：更新配置状态并整体替换注入规则
///
/// # 返回值
/// 替换后的规则数量
pub fn apply_config(config: AppConfig, state: &ConfigState, store: &RuleStore) -> usize {
    let rules = injection::rules_from_config(&config);
    let count = rules.len();

    let guard = state
        .apply_lock
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    store.replace_rules(rules);
    state.set(config);
    drop(guard);

    log::info!("注入规则已更新，共 {} 条", count);
    count
}

/// 从运行时配置文件重新加载配置
///
/// # 返回值
/// 重新加载后的规则数量
///
/// # 错误
/// 配置文件路径未知、读取或解析失败时返回错误，此时原有配置和规则保持不变
pub fn reload_config(state: &ConfigState, store: &RuleStore) -> Result<usize, String> {
    let path = state.path()?;
    let config = if path.exists() {
        config::load_config(path)?
    } else {
        AppConfig::bundled()
    };
    Ok(apply_config(config, state, store))
}

/// 从运行时配置文件重新加载配置（异步版本）
///
/// 语义与 [`reload_config`] 相同，文件读取在 tokio 运行时上完成，不阻塞 command 工作线程。
///
/// # 错误
/// 配置文件路径未知、读取或解析失败时返回错误，此时原有配置和规则保持不变
pub async fn reload_config_async(state: &ConfigState, store: &RuleStore) -> Result<usize, String> {
    let path = state.path()?;
    let config = if path.exists() {
        config::read_config(path).await?
    } else {
        AppConfig::bundled()
    };
    Ok(apply_config(config, state, store))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::thread;

    use super::*;
    use crate::models::config::save_config;

    #[test]
    fn test_startup_without_file_uses_bundled() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_startup_config(Some(&dir.path().join("missing.json")));
        assert_eq!(config, AppConfig::bundled());
    }

    #[test]
    fn test_startup_with_broken_file_uses_bundled() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("app.json");
        std::fs::write(&path, "not json").unwrap();

        assert_eq!(load_startup_config(Some(&path)), AppConfig::bundled());
    }

    #[tokio::test]
    async fn test_reload_replaces_rules_and_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("app.json");

        let store = RuleStore::new();
        store.add_rule("stale".into(), vec!["stale{}".into()], vec![], Default::default());
        let state = ConfigState::new(AppConfig::default(), Some(path.clone()));

        let config = AppConfig {
            url: "https://example.com".into(),
            inject_css: vec!["body{}".into()],
            ..AppConfig::default()
        };
        save_config(&config, &path).await.unwrap();

        let count = reload_config(&state, &store).unwrap();
        assert_eq!(count, 1);
        assert_eq!(state.get(), config);
        assert_eq!(store.rules_for_url("stale").css, vec!["body{}".to_string()]);
    }

    #[tokio::test]
    async fn test_async_reload_matches_sync_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("app.json");
        let config = AppConfig {
            inject_js: vec!["init()".into()],
            ..AppConfig::default()
        };
        save_config(&config, &path).await.unwrap();

        let store = RuleStore::new();
        let state = ConfigState::new(AppConfig::default(), Some(path));
        assert_eq!(reload_config_async(&state, &store).await.unwrap(), 1);
        assert_eq!(state.get(), config);
        assert_eq!(store.rules_for_url("any").js, vec!["init()".to_string()]);
    }

    #[test]
    fn test_concurrent_apply_keeps_state_and_rules_in_step() {
        let state = Arc::new(ConfigState::new(AppConfig::default(), None));
        let store = Arc::new(RuleStore::new());

        let handles: Vec<_> = (0..16)
            .map(|i| {
                let state = Arc::clone(&state);
                let store = Arc::clone(&store);
                thread::spawn(move || {
                    for round in 0..50 {
                        let config = AppConfig {
                            inject_css: vec![format!("/* {i}-{round} */")],
                            ..AppConfig::default()
                        };
                        apply_config(config, &state, &store);
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(store.rules_for_url("x").css, state.get().inject_css);
    }

    #[test]
    fn test_reload_failure_keeps_previous_rules() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("app.json");
        std::fs::write(&path, "{ broken").unwrap();

        let store = RuleStore::new();
        store.add_rule(String::new(), vec!["keep{}".into()], vec![], Default::default());
        let state = ConfigState::new(AppConfig::default(), Some(path));

        assert!(reload_config(&state, &store).is_err());
        assert_eq!(store.rules_for_url("x").css, vec!["keep{}".to_string()]);
    }

    #[test]
    fn test_unknown_path_is_an_error() {
        let state = ConfigState::new(AppConfig::default(), None);
        assert!(reload_config(&state, &RuleStore::new()).is_err());
    }
}
