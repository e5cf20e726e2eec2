//! # 配置文件监听服务
//!
//! 使用 `notify` 监听运行时配置文件所在目录，配置文件被创建或修改时触发回调，
//! 由调用方完成配置重载和注入规则替换。
//!
//! 监听的是父目录而不是文件本身：编辑器保存文件时常见"写临时文件再重命名"的方式，
//! 直接监听文件会在第一次保存后丢失监听目标。

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};

/// 配置文件监听器状态
///
/// 通过 Tauri 的 `manage()` 注册；内部持有活动的 watcher，
/// watcher 被 drop 时监听自动停止。
#[derive(Default)]
pub struct ConfigWatcher {
    inner: Mutex<Option<RecommendedWatcher>>,
}

impl ConfigWatcher {
    /// 创建未启动的监听器
    pub fn new() -> Self {
        Self::default()
    }

    /// 开始监听配置文件
    ///
    /// 已有的监听会先被停止。配置目录不存在时会先创建，
    /// 以便用户之后新建配置文件也能被感知。
    ///
    /// # 参数
    /// - `config_path` - 配置文件路径
    /// - `on_change` - 配置文件被创建或修改时调用（在 notify 的事件线程上执行）
    ///
    /// # 错误
    /// 目录创建或 watcher 初始化失败时返回错误
    pub fn watch<F>(&self, config_path: &Path, on_change: F) -> Result<(), String>
    where
        F: Fn() + Send + 'static,
    {
        self.stop();

        let target_name = config_path
            .file_name()
            .map(|name| name.to_os_string())
            .ok_or_else(|| format!("配置文件路径无效: {}", config_path.display()))?;
        let watch_dir = config_path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));

        if !watch_dir.exists() {
            std::fs::create_dir_all(&watch_dir)
                .map_err(|e| format!("创建配置目录失败: {}", e))?;
        }

        let mut watcher = notify::recommended_watcher(move |res: Result<Event, notify::Error>| {
            match res {
                Ok(event) => {
                    if should_reload(&event.kind) && touches_file(&event.paths, &target_name) {
                        log::debug!("配置文件变更: {:?}", event.kind);
                        on_change();
                    }
                }
                Err(e) => log::warn!("配置文件监听出错: {}", e),
            }
        })
        .map_err(|e| format!("创建配置文件监听器失败: {}", e))?;

        watcher
            .watch(&watch_dir, RecursiveMode::NonRecursive)
            .map_err(|e| format!("监听配置目录失败: {}", e))?;

        log::info!("开始监听配置文件: {}", config_path.display());
        match self.inner.lock() {
            Ok(mut guard) => *guard = Some(watcher),
            Err(poisoned) => *poisoned.into_inner() = Some(watcher),
        }
        Ok(())
    }

    /// 停止监听
    pub fn stop(&self) {
        let previous = match self.inner.lock() {
            Ok(mut guard) => guard.take(),
            Err(poisoned) => poisoned.into_inner().take(),
        };
        if previous.is_some() {
            log::debug!("停止监听配置文件");
        }
    }

    /// 是否正在监听
    pub fn is_active(&self) -> bool {
        match self.inner.lock() {
            Ok(guard) => guard.is_some(),
            Err(poisoned) => poisoned.into_inner().is_some(),
        }
    }
}

/// 判断事件类型是否需要触发重载
///
/// 只关心创建和修改（重命名属于修改）；访问事件和删除事件忽略，
/// 删除配置文件不会清空当前规则。
fn should_reload(kind: &EventKind) -> bool {
    matches!(kind, EventKind::Create(_) | EventKind::Modify(_) | EventKind::Any)
}

/// 判断事件是否涉及配置文件
fn touches_file(paths: &[PathBuf], target_name: &OsString) -> bool {
    paths
        .iter()
        .any(|path| path.file_name() == Some(target_name.as_os_str()))
}

#[cfg(test)]
mod tests {
    use std::sync::mpsc;
    use std::time::Duration;

    use notify::event::{AccessKind, CreateKind, DataChange, ModifyKind, RemoveKind};

    use super::*;

    #[test]
    fn test_should_reload_event_kinds() {
        assert!(should_reload(&EventKind::Create(CreateKind::File)));
        assert!(should_reload(&EventKind::Modify(ModifyKind::Data(DataChange::Content))));
        assert!(!should_reload(&EventKind::Access(AccessKind::Any)));
        assert!(!should_reload(&EventKind::Remove(RemoveKind::File)));
    }

    #[test]
    fn test_touches_file_compares_file_name() {
        let target = OsString::from("app.json");
        assert!(touches_file(&[PathBuf::from("/cfg/webwrap/app.json")], &target));
        assert!(!touches_file(&[PathBuf::from("/cfg/webwrap/other.json")], &target));
        assert!(!touches_file(&[], &target));
    }

    #[test]
    fn test_watch_creates_directory_and_stops() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("app.json");

        let watcher = ConfigWatcher::new();
        watcher.watch(&path, || {}).unwrap();
        assert!(path.parent().unwrap().exists());
        assert!(watcher.is_active());

        watcher.stop();
        assert!(!watcher.is_active());
    }

    #[test]
    fn test_writing_config_file_triggers_callback() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("app.json");

        let (tx, rx) = mpsc::channel();
        let watcher = ConfigWatcher::new();
        watcher
            .watch(&path, move || {
                let _ = tx.send(());
            })
            .unwrap();

        std::fs::write(&path, r#"{ "url": "https://example.com" }"#).unwrap();
        assert!(rx.recv_timeout(Duration::from_secs(5)).is_ok());
    }

    #[test]
    fn test_other_files_do_not_trigger_callback() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("app.json");

        let (tx, rx) = mpsc::channel();
        let watcher = ConfigWatcher::new();
        watcher
            .watch(&path, move || {
                let _ = tx.send(());
            })
            .unwrap();

        std::fs::write(dir.path().join("notes.txt"), "x").unwrap();
        assert!(rx.recv_timeout(Duration::from_millis(500)).is_err());
    }
}
