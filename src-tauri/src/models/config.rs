//! # 应用配置数据模型
//!
//! 定义了被打包应用的配置文件（`app.json`）对应的 Rust 结构体，
//! 以及配置文件的读取和保存函数。
//!
//! 同一份配置被两处使用：
//! - 打包工具（`webwrap-pack`）：生成项目时写入 `app.json`，并据此改写 `tauri.conf.json`
//! - 桌面外壳：启动时读取配置，创建窗口并把注入字段写入规则存储（`RuleStore`）
//!
//! JSON 字段使用 camelCase 命名（如 `hideTitleBar`、`injectCSS`），
//! 缺失的字段一律取默认值，因此只写了 `url` 的配置文件也是合法的。

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

/// 默认 User-Agent
///
/// 使用桌面版 Chrome 的 UA，避免部分站点对内嵌 WebView 返回移动端或降级页面。
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// 默认窗口宽度（像素）
pub const DEFAULT_WIDTH: u32 = 1024;

/// 默认窗口高度（像素）
pub const DEFAULT_HEIGHT: u32 = 768;

/// 编译进桌面外壳的默认配置
///
/// 打包工具在生成项目时会覆写该文件，因此每个打包出的应用都内置了自己的配置。
const BUNDLED_CONFIG: &str = include_str!("../../app.json");

/// 被打包应用的完整配置
///
/// 对应 `app.json` 文件内容：
/// ```json
/// {
///   "url": "https://example.com",
///   "name": "Example",
///   "width": 1200,
///   "height": 800,
///   "injectCSS": ["body { zoom: 1.1 }"],
///   "rules": [{ "urlPattern": "/login", "js": ["console.log('hi')"] }]
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AppConfig {
    /// 要打包的目标网址，窗口启动后直接加载
    pub url: String,

    /// 应用名称：用作窗口标题、产品名和项目目录名
    pub name: String,

    /// 应用图标路径（PNG），仅打包工具使用
    pub icon: String,

    /// 窗口初始宽度
    pub width: u32,

    /// 窗口初始高度
    pub height: u32,

    /// 是否隐藏系统标题栏（无边框窗口）
    pub hide_title_bar: bool,

    /// 是否启用透明窗口
    pub transparent: bool,

    /// 窗口是否始终置顶
    pub always_on_top: bool,

    /// WebView 使用的 User-Agent，空字符串表示使用 WebView 自带的 UA
    pub user_agent: String,

    /// 全局 HTTP 头：对所有页面生效
    pub headers: BTreeMap<String, String>,

    /// 全局注入的 CSS 片段
    #[serde(rename = "injectCSS")]
    pub inject_css: Vec<String>,

    /// 全局注入的 JS 片段
    #[serde(rename = "injectJS")]
    pub inject_js: Vec<String>,

    /// 按 URL 模式生效的注入规则，按文件中的顺序注册
    pub rules: Vec<UrlRuleConfig>,
}

/// 单条按 URL 模式生效的注入配置
///
/// `url_pattern` 按子串匹配：只要页面 URL 中任意位置包含该字符串即生效。
/// 注意空字符串会匹配所有页面。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UrlRuleConfig {
    /// URL 子串模式
    pub url_pattern: String,

    /// 匹配时注入的 CSS 片段
    pub css: Vec<String>,

    /// 匹配时注入的 JS 片段
    pub js: Vec<String>,

    /// 匹配时附带的 HTTP 头
    pub headers: BTreeMap<String, String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            name: String::new(),
            icon: String::new(),
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            hide_title_bar: false,
            transparent: false,
            always_on_top: false,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            headers: BTreeMap::new(),
            inject_css: vec![],
            inject_js: vec![],
            rules: vec![],
        }
    }
}

impl AppConfig {
    /// 读取编译进二进制的 `app.json`
    ///
    /// 解析失败时记录警告并回退到默认配置，不会导致应用无法启动。
    pub fn bundled() -> Self {
        match serde_json::from_str(BUNDLED_CONFIG) {
            Ok(config) => config,
            Err(e) => {
                log::warn!("内置配置解析失败，使用默认配置: {}", e);
                Self::default()
            }
        }
    }

    /// 实际生效的 User-Agent
    ///
    /// # 返回值
    /// - `Some(ua)` - 配置了非空 UA
    /// - `None` - 未配置，沿用 WebView 默认 UA
    pub fn effective_user_agent(&self) -> Option<&str> {
        let ua = self.user_agent.trim();
        if ua.is_empty() { None } else { Some(ua) }
    }
}

/// 从文件加载应用配置（同步版本）
///
/// 文件不存在时返回默认配置；文件中缺失的字段同样取默认值。
/// 供 Tauri `setup` 钩子和 notify 事件线程使用，这两处都不在异步运行时中。
///
/// # 参数
/// - `path` - 配置文件路径
///
/// # 错误
/// 文件存在但无法读取或 JSON 解析失败时返回错误
pub fn load_config(path: &Path) -> Result<AppConfig, String> {
    if !path.exists() {
        return Ok(AppConfig::default());
    }

    let content = std::fs::read_to_string(path)
        .map_err(|e| format!("读取配置文件失败: {}", e))?;

    parse_config(&content)
}

/// 从文件加载应用配置（异步版本）
///
/// 语义与 [`load_config`] 相同，使用 `tokio::fs` 读取，
/// 供 Tauri command 和打包工具在异步上下文中调用。
///
/// # 错误
/// 文件存在但无法读取或 JSON 解析失败时返回错误
pub async fn read_config(path: &Path) -> Result<AppConfig, String> {
    if !path.exists() {
        return Ok(AppConfig::default());
    }

    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| format!("读取配置文件失败: {}", e))?;

    parse_config(&content)
}

fn parse_config(content: &str) -> Result<AppConfig, String> {
    serde_json::from_str(content).map_err(|e| format!("解析配置文件失败: {}", e))
}

/// 将应用配置保存到文件
///
/// 使用 2 空格缩进格式化 JSON。父目录不存在时会递归创建。
///
/// # 参数
/// - `config` - 要保存的配置
/// - `path` - 目标文件路径
///
/// # 错误
/// 目录创建、序列化或文件写入失败时返回错误
pub async fn save_config(config: &AppConfig, path: &Path) -> Result<(), String> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| format!("创建配置目录失败: {}", e))?;
        }
    }

    let content = serde_json::to_string_pretty(config)
        .map_err(|e| format!("序列化配置失败: {}", e))?;

    tokio::fs::write(path, content)
        .await
        .map_err(|e| format!("写入配置文件失败: {}", e))
}
