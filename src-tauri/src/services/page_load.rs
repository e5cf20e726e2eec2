//! # 页面加载注入服务
//!
//! 串联规则匹配和脚本生成：页面加载完成时，先按 URL 解析规则，再合成注入脚本。
//! 具体的执行（`webview.eval`）由 `lib.rs` 中的页面加载回调负责。
//!
//! ## 调用时机
//! 主窗口每次页面加载完成都会调用一次，包括站内跳转和刷新。
//! 同一页面重复加载会重复注入，脚本本身不做去重。
//!
//! ## HTTP 头
//! 匹配到的 HTTP 头只记录调试日志：WebView 没有按请求附加自定义头的接口，
//! 需要查看解析结果时可调用 `get_rules_for_url` command。

use crate::services::injection::RuleStore;
use crate::services::script;

/// 为正在加载的页面生成注入脚本
///
/// # 参数
/// - `store` - 注入规则存储
/// - `url` - 页面 URL
///
/// # 返回值
/// - `Some(script)` - 有匹配的 CSS 或 JS 时返回待执行脚本
/// - `None` - 没有需要注入的内容（仅匹配到 HTTP 头也视为无需执行脚本）
pub fn script_for_url(store: &RuleStore, url: &str) -> Option<String> {
    let matched = store.rules_for_url(url);

    if !matched.headers.is_empty() {
        log::debug!(
            "页面 {} 匹配到 HTTP 头: {:?}",
            url,
            matched.headers.keys().collect::<Vec<_>>()
        );
    }

    if matched.css.is_empty() && matched.js.is_empty() {
        return None;
    }

    log::info!(
        "页面 {} 注入 {} 段 CSS、{} 段 JS",
        url,
        matched.css.len(),
        matched.js.len()
    );
    Some(script::generate_injection_script(&matched.css, &matched.js))
}
