//! # webwrap - Tauri 桌面外壳核心初始化模块
//!
//! 本模块负责被打包应用的完整初始化流程，包括：
//! - 注册日志插件（仅调试模式）
//! - 加载应用配置并填充注入规则存储
//! - 按配置创建主窗口，在页面加载完成时执行注入脚本
//! - 监听配置文件，变更后热重载注入规则
//! - 注册自定义 Tauri commands（规则管理、配置读写）
//!
//! ## 注入流程
//! 主窗口直接加载目标网址（外部 URL），不加载本地前端页面。
//! 每次页面加载完成（`PageLoadEvent::Finished`）时：
//! 1. 用当前页面 URL 查询 `RuleStore`，得到匹配的 CSS / JS 片段和 HTTP 头
//! 2. 由 `services::script` 合成为一段自执行脚本
//! 3. 通过 `webview.eval` 在页面上下文中执行
//!
//! ## 远程 IPC
//! Tauri 2 默认拒绝远程页面的 IPC 调用。`capabilities/remote.json` 列出目标网址的 origin，
//! 打包工具生成项目时按目标网址重写该文件，页面脚本和 devtools 因此可以调用下面的 commands。
//!
//! ## 模块结构
//! - `commands/` - Tauri command 处理函数（IPC 接口层）
//! - `models/` - 数据模型（应用配置）
//! - `services/` - 核心业务逻辑（规则匹配、脚本生成、配置重载、文件监听）
//! - `packager/` - 打包工具逻辑（供 `webwrap-pack` 二进制使用）
//! - `utils/` - 通用工具函数

mod commands;
pub mod models;
pub mod packager;
pub mod services;
mod utils;

use std::path::Path;

use tauri::webview::PageLoadEvent;
use tauri::{AppHandle, Manager, WebviewUrl, WebviewWindow, WebviewWindowBuilder};

use models::config::AppConfig;
use services::app_config::{self, ConfigState};
use services::injection::RuleStore;
use services::page_load;
use services::watcher::ConfigWatcher;
use utils::path;

/// 主窗口标签
const MAIN_WINDOW_LABEL: &str = "main";

/// 应用名为空时使用的窗口标题
const DEFAULT_TITLE: &str = "webwrap";

// `#[cfg_attr(mobile, tauri::mobile_entry_point)]`：条件编译属性
// 当目标平台为移动端（Android/iOS）时，此属性将 `run()` 函数标记为
// Tauri 移动端入口点；在桌面端编译时不生效，`run()` 由 `main.rs` 直接调用。
#[cfg_attr(mobile, tauri::mobile_entry_point)]
/// Tauri 应用启动函数
///
/// 1. 注册规则存储和配置监听器为 managed state
/// 2. 注册所有自定义 Tauri commands
/// 3. 在 `setup` 钩子中加载配置、填充规则、创建主窗口并启动配置监听
/// 4. 生成应用上下文并启动主事件循环
///
/// # Panics
/// 如果 Tauri 应用启动失败（例如目标网址无效或窗口创建失败），
/// 将通过 `.expect()` 触发 panic 并输出错误信息。
pub fn run() {
    tauri::Builder::default()
        // === 应用全局状态初始化 ===
        // RuleStore：页面加载回调、commands 和配置监听线程共享的注入规则存储，
        // 启动时为空，在 setup 钩子中按配置填充
        .manage(RuleStore::new())
        // ConfigWatcher：持有 notify watcher，drop 时监听自动停止，
        // 因此必须放进 managed state 以保证与应用同生命周期
        .manage(ConfigWatcher::new())
        // === 自定义 Tauri Commands 注册 ===
        // 页面通过 `window.__TAURI_INTERNALS__.invoke()` 调用，需要 remote capability 放行
        .invoke_handler(tauri::generate_handler![
            // 注入规则 commands
            commands::rules::add_injection_rule,
            commands::rules::get_rules_for_url,
            commands::rules::clear_injection_rules,
            commands::rules::generate_injection_script,
            // 应用配置 commands
            commands::config::read_app_config,
            commands::config::save_app_config,
            commands::config::reload_app_config,
        ])
        .setup(|app| {
            // 仅在开发调试模式下启用日志插件
            if cfg!(debug_assertions) {
                app.handle().plugin(
                    tauri_plugin_log::Builder::default()
                        .level(log::LevelFilter::Debug)
                        .build(),
                )?;
            }

            // 运行时配置文件路径：WEBWRAP_CONFIG 环境变量优先，否则为 <config_dir>/webwrap/app.json
            // 无法确定路径时只使用内置配置，并且不启动热重载
            let config_path = match path::resolve_config_path() {
                Ok(p) => Some(p),
                Err(e) => {
                    log::warn!("{}，仅使用内置配置", e);
                    None
                }
            };

            // 运行时配置文件存在则优先使用，否则回退到编译进二进制的 app.json
            let config = app_config::load_startup_config(config_path.as_deref());
            let state = ConfigState::new(config.clone(), config_path.clone());
            app_config::apply_config(config.clone(), &state, &app.state::<RuleStore>());
            // ConfigState 必须在窗口创建前注册：页面加载回调和 commands 都依赖它
            app.manage(state);

            // 注入规则在窗口创建前填充完毕，首个页面加载即可命中
            create_main_window(app.handle(), &config)?;

            if let Some(path) = config_path {
                start_config_watch(app.handle(), &path);
            }
            Ok(())
        })
        .run(tauri::generate_context!())
        .expect("error while running tauri application");
}

/// 按配置创建主窗口
///
/// 窗口直接加载目标网址；页面每次加载完成时触发注入。
///
/// # 错误
/// 目标网址无法解析或窗口创建失败时返回错误
fn create_main_window(app: &AppHandle, config: &AppConfig) -> Result<(), String> {
    let url: tauri::Url = config
        .url
        .parse()
        .map_err(|e| format!("无效的目标网址 \"{}\": {}", config.url, e))?;

    let title = match config.name.trim() {
        "" => DEFAULT_TITLE,
        name => name,
    };

    let mut builder =
        WebviewWindowBuilder::new(app, MAIN_WINDOW_LABEL, WebviewUrl::External(url))
            .title(title)
            .inner_size(f64::from(config.width), f64::from(config.height))
            .decorations(!config.hide_title_bar)
            .always_on_top(config.always_on_top)
            .on_page_load(|webview, payload| {
                if matches!(payload.event(), PageLoadEvent::Finished) {
                    inject_page(&webview, payload.url().as_str());
                }
            });

    // macOS 上透明窗口需要 macos-private-api，本外壳不启用
    #[cfg(not(target_os = "macos"))]
    {
        builder = builder.transparent(config.transparent);
    }

    if let Some(ua) = config.effective_user_agent() {
        builder = builder.user_agent(ua);
    }

    builder
        .build()
        .map_err(|e| format!("创建主窗口失败: {}", e))?;
    Ok(())
}

/// 页面加载完成回调：解析规则并在页面中执行注入脚本
///
/// 执行失败只记录日志，不影响页面继续使用。
fn inject_page(webview: &WebviewWindow, url: &str) {
    let store = webview.state::<RuleStore>();
    let Some(script) = page_load::script_for_url(&store, url) else {
        return;
    };

    if let Err(e) = webview.eval(&script) {
        log::warn!("执行注入脚本失败 ({}): {}", url, e);
    }
}

/// 启动配置文件监听
///
/// 配置文件变更时在 notify 事件线程上重载配置，与页面加载回调并发执行。
/// 监听启动失败只记录警告，应用照常运行（仅失去热重载能力）。
fn start_config_watch(app: &AppHandle, config_path: &Path) {
    let handle = app.clone();
    let result = app.state::<ConfigWatcher>().watch(config_path, move || {
        let state = handle.state::<ConfigState>();
        let store = handle.state::<RuleStore>();
        if let Err(e) = app_config::reload_config(&state, &store) {
            log::warn!("配置重载失败: {}", e);
        }
    });

    if let Err(e) = result {
        log::warn!("{}", e);
    }
}
