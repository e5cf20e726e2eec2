//! # 注入规则 Tauri Commands
//!
//! 提供注入规则的登记、查询和清空 command，以及脚本生成 command：
//! - `add_injection_rule` - 追加一条注入规则
//! - `get_rules_for_url` - 查询对指定 URL 生效的 CSS / JS / HTTP 头
//! - `clear_injection_rules` - 清空所有注入规则
//! - `generate_injection_script` - 把 CSS / JS 片段合成为注入脚本
//!
//! 这些 command 与页面加载回调共享同一个 `RuleStore`，
//! 运行时登记的规则从下一次页面加载开始生效。

use std::collections::BTreeMap;

use tauri::State;

use crate::services::injection::{RuleMatch, RuleStore};
use crate::services::script;

/// 追加一条注入规则
///
/// # 参数
/// - `url_pattern` - URL 子串模式，空字符串表示对所有页面生效
/// - `css` - 注入的 CSS 片段
/// - `js` - 注入的 JS 片段
/// - `headers` - 附带的 HTTP 头
/// - `store` - Tauri managed state，注入规则存储
#[tauri::command]
pub async fn add_injection_rule(
    url_pattern: String,
    css: Vec<String>,
    js: Vec<String>,
    headers: BTreeMap<String, String>,
    store: State<'_, RuleStore>,
) -> Result<(), String> {
    if url_pattern.is_empty() {
        log::warn!("登记了空 URL 模式的注入规则，将对所有页面生效");
    }
    store.add_rule(url_pattern, css, js, headers);
    Ok(())
}

/// 查询对指定 URL 生效的注入内容
///
/// # 参数
/// - `url` - 页面 URL
///
/// # 返回值
/// 合并后的 CSS、JS 片段和 HTTP 头；没有匹配时三者均为空
#[tauri::command]
pub async fn get_rules_for_url(
    url: String,
    store: State<'_, RuleStore>,
) -> Result<RuleMatch, String> {
    Ok(store.rules_for_url(&url))
}

/// 清空所有注入规则
///
/// 仅影响内存中的规则；重新加载配置后规则会按配置文件重新生成。
#[tauri::command]
pub async fn clear_injection_rules(store: State<'_, RuleStore>) -> Result<(), String> {
    store.clear_rules();
    log::info!("注入规则已清空");
    Ok(())
}

/// 生成注入脚本
///
/// # 参数
/// - `css` - CSS 片段
/// - `js` - JS 片段
///
/// # 返回值
/// 可直接执行的脚本文本
#[tauri::command]
pub async fn generate_injection_script(
    css: Vec<String>,
    js: Vec<String>,
) -> Result<String, String> {
    Ok(script::generate_injection_script(&css, &js))
}
