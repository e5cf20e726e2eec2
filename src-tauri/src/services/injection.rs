//! # 注入规则存储与匹配服务
//!
//! 保存按 URL 模式登记的注入规则（CSS、JS、HTTP 头），
//! 并在页面加载时解析出对当前 URL 生效的全部内容。
//!
//! ## 匹配语义
//! 规则的 `url_pattern` 按**子串**匹配：页面 URL 中任意位置包含该模式即生效，
//! 区分大小写、逐字节比较。空模式匹配所有 URL（即全局规则）。
//!
//! 注意：子串匹配范围较宽，模式 `"com"` 会命中任何包含 `com` 的 URL，
//! 包括路径和查询参数中出现的情况。配置时应尽量写出足够具体的模式。
//!
//! ## 合并顺序
//! - CSS / JS：按规则登记顺序拼接，同一规则内保持片段原有顺序
//! - HTTP 头：后登记的规则覆盖先登记规则的同名键（last match wins）
//!
//! ## 线程安全
//! 使用 `std::sync::RwLock` 保护规则列表。
//! 页面加载回调（主线程）、Tauri command（异步运行时线程）和配置监听线程
//! 会并发访问同一个 `RuleStore`，RwLock 允许多个查询并发进行，写操作互斥。
//! 查询看到的是调用期间某一时刻的一致快照，不会看到写了一半的状态。

use std::collections::BTreeMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde::{Deserialize, Serialize};

use crate::models::config::AppConfig;

/// 一条注入规则
///
/// 登记后不可修改：规则只会被追加或整体清空，不会原地编辑。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InjectionRule {
    /// URL 子串模式，空字符串匹配所有 URL
    pub url_pattern: String,
    /// 匹配时注入的 CSS 片段（有序）
    pub css: Vec<String>,
    /// 匹配时注入的 JS 片段（有序）
    pub js: Vec<String>,
    /// 匹配时附带的 HTTP 头
    pub headers: BTreeMap<String, String>,
}

impl InjectionRule {
    /// 判断该规则是否对给定 URL 生效
    ///
    /// 使用 `memchr::memmem` 做 SIMD 加速的逐字节子串查找。
    /// 对合法 UTF-8 字符串而言，逐字节子串与按字符子串的结果一致。
    pub fn matches(&self, url: &str) -> bool {
        memchr::memmem::find(url.as_bytes(), self.url_pattern.as_bytes()).is_some()
    }
}

/// 一次 URL 查询的解析结果
///
/// 三个集合互相独立；没有任何规则匹配时全部为空。
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleMatch {
    /// 所有匹配规则的 CSS 片段，按登记顺序拼接
    pub css: Vec<String>,
    /// 所有匹配规则的 JS 片段，按登记顺序拼接
    pub js: Vec<String>,
    /// 合并后的 HTTP 头，同名键以最后匹配的规则为准
    pub headers: BTreeMap<String, String>,
}

impl RuleMatch {
    /// 是否没有任何需要注入的内容
    pub fn is_empty(&self) -> bool {
        self.css.is_empty() && self.js.is_empty() && self.headers.is_empty()
    }
}

/// 注入规则存储
///
/// 通过 Tauri 的 `manage()` 注册为应用状态，每个应用会话一个实例，
/// 不做持久化（启动和配置重载时由 `rules_from_config` 重新填充）。
///
/// 所有操作都不会失败：锁中毒时直接取回内部数据继续使用，
/// 因为被保护的只是一个 `Vec`，写操作要么整体完成要么没有发生。
pub struct RuleStore {
    rules: RwLock<Vec<InjectionRule>>,
}

impl RuleStore {
    /// 创建空的规则存储
    pub fn new() -> Self {
        Self {
            rules: RwLock::new(Vec::new()),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, Vec<InjectionRule>> {
        self.rules.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, Vec<InjectionRule>> {
        self.rules.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// 追加一条注入规则
    ///
    /// 不对输入做任何校验，空字符串和空集合均可接受。
    /// 返回后，其他线程随后发起的查询都能看到这条规则。
    pub fn add_rule(
        &self,
        url_pattern: String,
        css: Vec<String>,
        js: Vec<String>,
        headers: BTreeMap<String, String>,
    ) {
        self.write().push(InjectionRule {
            url_pattern,
            css,
            js,
            headers,
        });
    }

    /// 解析对给定 URL 生效的全部注入内容
    ///
    /// 按登记顺序遍历规则：匹配的规则追加其 CSS、JS 片段，并把 HTTP 头合并进结果，
    /// 后匹配的规则覆盖同名键。
    ///
    /// # 参数
    /// - `url` - 正在加载的页面 URL，可以是任意字符串（包括空串）
    pub fn rules_for_url(&self, url: &str) -> RuleMatch {
        let rules = self.read();
        let mut result = RuleMatch::default();

        for rule in rules.iter().filter(|rule| rule.matches(url)) {
            result.css.extend(rule.css.iter().cloned());
            result.js.extend(rule.js.iter().cloned());
            for (key, value) in &rule.headers {
                result.headers.insert(key.clone(), value.clone());
            }
        }

        result
    }

    /// 清空所有规则
    pub fn clear_rules(&self) {
        *self.write() = Vec::new();
    }

    /// 用一组新规则整体替换现有规则
    ///
    /// 在一次写锁内完成替换，供配置重载使用：
    /// 并发的查询要么看到旧规则，要么看到新规则，不会看到中间的空状态。
    pub fn replace_rules(&self, rules: Vec<InjectionRule>) {
        *self.write() = rules;
    }

    /// 当前规则数量
    pub fn len(&self) -> usize {
        self.read().len()
    }

    /// 是否没有任何规则
    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }
}

impl Default for RuleStore {
    fn default() -> Self {
        Self::new()
    }
}

/// 从应用配置生成注入规则列表
///
/// 生成顺序：
/// 1. 顶层 `headers` / `injectCSS` / `injectJS` 任一非空时，生成一条空模式的全局规则
/// 2. `rules` 数组中的每一项各生成一条规则，保持文件中的顺序
///
/// 全局规则排在最前，因此按 URL 配置的规则可以覆盖全局 HTTP 头。
pub fn rules_from_config(config: &AppConfig) -> Vec<InjectionRule> {
    let mut rules = Vec::with_capacity(config.rules.len() + 1);

    if !config.headers.is_empty() || !config.inject_css.is_empty() || !config.inject_js.is_empty()
    {
        rules.push(InjectionRule {
            url_pattern: String::new(),
            css: config.inject_css.clone(),
            js: config.inject_js.clone(),
            headers: config.headers.clone(),
        });
    }

    rules.extend(config.rules.iter().map(|rule| InjectionRule {
        url_pattern: rule.url_pattern.clone(),
        css: rule.css.clone(),
        js: rule.js.clone(),
        headers: rule.headers.clone(),
    }));

    rules
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::thread;

    use super::*;
    use crate::models::config::UrlRuleConfig;

    fn headers(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_empty_store_returns_empty_match() {
        let store = RuleStore::new();
        let result = store.rules_for_url("https://example.com");
        assert!(result.is_empty());
    }

    #[test]
    fn test_substring_match_anywhere_in_url() {
        let store = RuleStore::new();
        store.add_rule("example.com".into(), strings(&["a{}"]), vec![], BTreeMap::new());
        store.add_rule("/login".into(), strings(&["b{}"]), vec![], BTreeMap::new());
        store.add_rule("other.org".into(), strings(&["c{}"]), vec![], BTreeMap::new());

        let result = store.rules_for_url("https://example.com/login?next=/");
        assert_eq!(result.css, strings(&["a{}", "b{}"]));
    }

    #[test]
    fn test_match_is_case_sensitive() {
        let store = RuleStore::new();
        store.add_rule("Example.com".into(), strings(&["a{}"]), vec![], BTreeMap::new());

        assert!(store.rules_for_url("https://example.com").is_empty());
        assert_eq!(store.rules_for_url("https://Example.com").css.len(), 1);
    }

    #[test]
    fn test_empty_pattern_matches_everything() {
        let store = RuleStore::new();
        store.add_rule(String::new(), vec![], strings(&["go()"]), BTreeMap::new());

        assert_eq!(store.rules_for_url("").js, strings(&["go()"]));
        assert_eq!(store.rules_for_url("about:blank").js, strings(&["go()"]));
    }

    #[test]
    fn test_fragments_follow_registration_then_rule_order() {
        let store = RuleStore::new();
        store.add_rule("a".into(), strings(&["c1", "c2"]), strings(&["j1"]), BTreeMap::new());
        store.add_rule("a".into(), strings(&["c3"]), strings(&["j2", "j3"]), BTreeMap::new());

        let result = store.rules_for_url("a");
        assert_eq!(result.css, strings(&["c1", "c2", "c3"]));
        assert_eq!(result.js, strings(&["j1", "j2", "j3"]));
    }

    #[test]
    fn test_later_rule_wins_header_collision() {
        let store = RuleStore::new();
        store.add_rule(
            "example.com".into(),
            strings(&["body{color:red}"]),
            vec![],
            headers(&[("X-Test", "1"), ("X-Only-A", "a")]),
        );
        store.add_rule(String::new(), vec![], vec![], headers(&[("X-Test", "2")]));

        let result = store.rules_for_url("https://example.com/page");
        assert_eq!(result.css, strings(&["body{color:red}"]));
        assert!(result.js.is_empty());
        assert_eq!(result.headers, headers(&[("X-Test", "2"), ("X-Only-A", "a")]));
    }

    #[test]
    fn test_clear_rules_empties_every_lookup() {
        let store = RuleStore::new();
        store.add_rule(String::new(), strings(&["x"]), strings(&["y"]), headers(&[("K", "V")]));
        store.clear_rules();

        assert!(store.is_empty());
        assert_eq!(store.rules_for_url("https://example.com"), RuleMatch::default());
        assert_eq!(store.rules_for_url(""), RuleMatch::default());
    }

    #[test]
    fn test_replace_rules_swaps_collection() {
        let store = RuleStore::new();
        store.add_rule("old".into(), strings(&["old"]), vec![], BTreeMap::new());

        store.replace_rules(vec![InjectionRule {
            url_pattern: "new".into(),
            css: strings(&["new"]),
            js: vec![],
            headers: BTreeMap::new(),
        }]);

        assert_eq!(store.len(), 1);
        assert!(store.rules_for_url("old").is_empty());
        assert_eq!(store.rules_for_url("new").css, strings(&["new"]));
    }

    #[test]
    fn test_concurrent_add_rule_keeps_every_rule() {
        const N: usize = 64;
        let store = Arc::new(RuleStore::new());

        let handles: Vec<_> = (0..N)
            .map(|i| {
                let store = Arc::clone(&store);
                thread::spawn(move || {
                    let key = format!("X-{i}");
                    store.add_rule(
                        "app".into(),
                        vec![format!("css-{i}")],
                        vec![format!("js-{i}")],
                        headers(&[(key.as_str(), "1")]),
                    );
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let result = store.rules_for_url("https://app.local");
        assert_eq!(result.css.len(), N);
        assert_eq!(result.js.len(), N);
        assert_eq!(result.headers.len(), N);

        let mut css = result.css.clone();
        css.sort();
        css.dedup();
        assert_eq!(css.len(), N);
        for i in 0..N {
            assert!(result.css.contains(&format!("css-{i}")));
            assert!(result.js.contains(&format!("js-{i}")));
        }
    }

    #[test]
    fn test_concurrent_reads_during_replace_see_whole_snapshots() {
        let store = Arc::new(RuleStore::new());
        let snapshot = |tag: &str| {
            vec![
                InjectionRule {
                    url_pattern: String::new(),
                    css: vec![format!("{tag}-1")],
                    js: vec![],
                    headers: BTreeMap::new(),
                },
                InjectionRule {
                    url_pattern: String::new(),
                    css: vec![format!("{tag}-2")],
                    js: vec![],
                    headers: BTreeMap::new(),
                },
            ]
        };
        store.replace_rules(snapshot("a"));

        let writer = {
            let store = Arc::clone(&store);
            let a = snapshot("a");
            let b = snapshot("b");
            thread::spawn(move || {
                for i in 0..200 {
                    store.replace_rules(if i % 2 == 0 { b.clone() } else { a.clone() });
                }
            })
        };

        for _ in 0..200 {
            let css = store.rules_for_url("https://x").css;
            assert!(
                css == strings(&["a-1", "a-2"]) || css == strings(&["b-1", "b-2"]),
                "unexpected snapshot: {css:?}"
            );
        }
        writer.join().unwrap();
    }

    #[test]
    fn test_rules_from_config_global_rule_first() {
        let config = AppConfig {
            headers: headers(&[("X-App", "1")]),
            inject_css: strings(&["body{}"]),
            rules: vec![UrlRuleConfig {
                url_pattern: "/docs".into(),
                js: strings(&["init()"]),
                headers: headers(&[("X-App", "2")]),
                ..UrlRuleConfig::default()
            }],
            ..AppConfig::default()
        };

        let rules = rules_from_config(&config);
        assert_eq!(rules.len(), 2);
        assert_eq!(rules[0].url_pattern, "");
        assert_eq!(rules[1].url_pattern, "/docs");

        let store = RuleStore::new();
        store.replace_rules(rules);
        let result = store.rules_for_url("https://site/docs/intro");
        assert_eq!(result.css, strings(&["body{}"]));
        assert_eq!(result.js, strings(&["init()"]));
        assert_eq!(result.headers, headers(&[("X-App", "2")]));
    }

    #[test]
    fn test_rules_from_config_skips_empty_global_rule() {
        let rules = rules_from_config(&AppConfig::default());
        assert!(rules.is_empty());
    }
}
