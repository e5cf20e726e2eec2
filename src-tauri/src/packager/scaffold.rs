//! # 项目生成服务
//!
//! 以桌面外壳工程为模板，为一个网址生成独立的 Tauri 项目：
//! 1. 递归复制模板目录（跳过 `target`、`gen`、`.git` 等构建产物）
//! 2. 写入 `app.json`（外壳编译时通过 `include_str!` 内置该配置）
//! 3. 改写 `tauri.conf.json` 中的产品名和 bundle identifier
//! 4. 把 Cargo 包名改为应用 slug，并使其脱离外层 workspace
//! 5. 写入远程 capability，允许目标网址所在 origin 调用 IPC command
//! 6. 复制应用图标到 `icons/icon.png`
//!
//! 所有文件操作通过 `tokio::fs` 异步执行。

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use serde_json::{Value, json};

use crate::models::config::{self, AppConfig};

/// 复制模板时跳过的目录名
const SKIPPED_DIRS: &[&str] = &["target", "gen", ".git", "node_modules"];

/// 应用名为空或全部为特殊字符时使用的 slug
pub const FALLBACK_SLUG: &str = "webwrap-app";

/// 模板工程的 Cargo 包名
const TEMPLATE_PACKAGE_LINE: &str = "name = \"webwrap\"";

/// 远程 capability 文件（相对项目目录）
const REMOTE_CAPABILITY_PATH: &str = "capabilities/remote.json";

/// 连续的非字母数字字符
static NON_ALNUM_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^a-z0-9]+").unwrap());

/// 把应用名转换为适合做目录名和包名的 slug
///
/// 规则：转小写，连续的非字母数字字符替换为单个 `-`，去掉首尾的 `-`。
///
/// # 示例
/// - `"My App!"` → `"my-app"`
/// - `"  "` → `"webwrap-app"`
pub fn app_slug(name: &str) -> String {
    let lowered = name.to_lowercase();
    let slug = NON_ALNUM_RE.replace_all(&lowered, "-");
    let slug = slug.trim_matches('-');
    if slug.is_empty() {
        FALLBACK_SLUG.to_string()
    } else {
        slug.to_string()
    }
}

/// 生成 bundle identifier（`com.webwrap.<slug 去掉短横线>`）
pub fn bundle_identifier(slug: &str) -> String {
    format!("com.webwrap.{}", slug.replace('-', ""))
}

/// 目标网址对应的远程 URL 匹配模式 `<scheme>://<host>[:port]/*`
///
/// Tauri 2 默认拒绝远程页面发起的 IPC，主窗口加载的是外部网址，
/// 必须在 capability 中列出该 origin，页面和 devtools 才能调用注入规则 commands。
///
/// # 返回值
/// 网址无法解析或没有可序列化的 origin（如 `data:`、`file:`）时返回 None
pub fn remote_url_pattern(url: &str) -> Option<String> {
    let url: tauri::Url = url.trim().parse().ok()?;
    let origin = url.origin();
    if !origin.is_tuple() {
        return None;
    }
    Some(format!("{}/*", origin.ascii_serialization()))
}

/// 生成项目
///
/// # 参数
/// - `config` - 应用配置
/// - `template_dir` - 桌面外壳工程目录（含 `Cargo.toml` 和 `tauri.conf.json`）
/// - `build_root` - 生成项目的父目录
///
/// # 返回值
/// 生成的项目目录 `<build_root>/<slug>`
///
/// # 错误
/// 任一文件操作失败或模板缺少必要文件时返回错误
pub async fn scaffold_project(
    config: &AppConfig,
    template_dir: &Path,
    build_root: &Path,
) -> Result<PathBuf, String> {
    let slug = app_slug(&config.name);
    let project_dir = build_root.join(&slug);

    if project_dir.exists() {
        tokio::fs::remove_dir_all(&project_dir)
            .await
            .map_err(|e| format!("清理旧项目目录失败: {}", e))?;
    }

    tokio::fs::create_dir_all(build_root)
        .await
        .map_err(|e| format!("创建构建目录失败: {}", e))?;
    // 构建目录可能位于模板目录之内（例如在模板目录下直接运行打包工具），复制时必须跳过
    let build_root = tokio::fs::canonicalize(build_root)
        .await
        .map_err(|e| format!("解析构建目录失败: {}", e))?;

    log::info!("生成项目: {}", project_dir.display());
    copy_template(template_dir, &project_dir, &build_root).await?;

    config::save_config(config, &project_dir.join("app.json")).await?;
    rewrite_tauri_conf(&project_dir.join("tauri.conf.json"), config, &slug).await?;
    rewrite_cargo_manifest(&project_dir.join("Cargo.toml"), &slug).await?;
    write_remote_capability(&project_dir.join(REMOTE_CAPABILITY_PATH), &config.url).await?;

    if !config.icon.is_empty() {
        let icons_dir = project_dir.join("icons");
        tokio::fs::create_dir_all(&icons_dir)
            .await
            .map_err(|e| format!("创建图标目录失败: {}", e))?;
        tokio::fs::copy(&config.icon, icons_dir.join("icon.png"))
            .await
            .map_err(|e| format!("复制图标失败: {}", e))?;
    }

    Ok(project_dir)
}

/// 复制模板目录，跳过构建产物目录和 `exclude` 目录
///
/// 用显式栈代替递归，避免递归 async fn 需要装箱。
async fn copy_template(src: &Path, dst: &Path, exclude: &Path) -> Result<(), String> {
    let mut pending = vec![(src.to_path_buf(), dst.to_path_buf())];

    while let Some((src, dst)) = pending.pop() {
        tokio::fs::create_dir_all(&dst)
            .await
            .map_err(|e| format!("创建目录失败: {}", e))?;

        let mut entries = tokio::fs::read_dir(&src)
            .await
            .map_err(|e| format!("读取模板目录 {} 失败: {}", src.display(), e))?;

        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| format!("读取模板目录失败: {}", e))?
        {
            let file_type = entry
                .file_type()
                .await
                .map_err(|e| format!("读取文件类型失败: {}", e))?;
            let name = entry.file_name();
            let target = dst.join(&name);
            let path = entry.path();

            if file_type.is_dir() {
                if name.to_str().is_some_and(|n| SKIPPED_DIRS.contains(&n)) {
                    continue;
                }
                let canonical = tokio::fs::canonicalize(&path).await;
                if canonical.is_ok_and(|p| p.as_path() == exclude) {
                    continue;
                }
                pending.push((path, target));
            } else if file_type.is_file() {
                tokio::fs::copy(&path, &target)
                    .await
                    .map_err(|e| format!("复制文件 {} 失败: {}", path.display(), e))?;
            }
        }
    }

    Ok(())
}

/// 改写 `tauri.conf.json` 的产品名和 identifier
async fn rewrite_tauri_conf(path: &Path, config: &AppConfig, slug: &str) -> Result<(), String> {
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| format!("读取 tauri.conf.json 失败: {}", e))?;
    let mut conf: Value = serde_json::from_str(&content)
        .map_err(|e| format!("解析 tauri.conf.json 失败: {}", e))?;

    let obj = conf
        .as_object_mut()
        .ok_or_else(|| "tauri.conf.json 顶层不是对象".to_string())?;

    let product_name = if config.name.trim().is_empty() {
        slug.to_string()
    } else {
        config.name.trim().to_string()
    };
    obj.insert("productName".to_string(), Value::String(product_name));
    obj.insert("identifier".to_string(), Value::String(bundle_identifier(slug)));

    let content = serde_json::to_string_pretty(&conf)
        .map_err(|e| format!("序列化 tauri.conf.json 失败: {}", e))?;
    tokio::fs::write(path, content)
        .await
        .map_err(|e| format!("写入 tauri.conf.json 失败: {}", e))
}

/// 改写 Cargo 包名，并追加空的 `[workspace]` 使生成项目成为独立工程
///
/// 生成目录可能位于本仓库之内，不脱离 workspace 的话 cargo 会拒绝构建。
async fn rewrite_cargo_manifest(path: &Path, slug: &str) -> Result<(), String> {
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| format!("读取 Cargo.toml 失败: {}", e))?;

    let mut content = content.replacen(TEMPLATE_PACKAGE_LINE, &format!("name = \"{}\"", slug), 1);
    if !content.lines().any(|line| line.trim() == "[workspace]") {
        content.push_str("\n[workspace]\n");
    }

    tokio::fs::write(path, content)
        .await
        .map_err(|e| format!("写入 Cargo.toml 失败: {}", e))
}

/// 写入主窗口的远程 capability
///
/// 目标网址没有可用的 origin 时删除模板自带的文件，生成的应用不开放远程 IPC。
async fn write_remote_capability(path: &Path, url: &str) -> Result<(), String> {
    let Some(pattern) = remote_url_pattern(url) else {
        log::warn!("目标网址 \"{}\" 没有可用的 origin，不开放远程 IPC", url);
        if path.exists() {
            tokio::fs::remove_file(path)
                .await
                .map_err(|e| format!("删除远程 capability 失败: {}", e))?;
        }
        return Ok(());
    };

    let capability = json!({
        "identifier": "remote",
        "description": "允许目标网址调用注入规则和配置 commands",
        "windows": ["main"],
        "remote": { "urls": [pattern] },
        "permissions": ["core:default"]
    });

    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| format!("创建 capabilities 目录失败: {}", e))?;
    }
    let content = serde_json::to_string_pretty(&capability)
        .map_err(|e| format!("序列化远程 capability 失败: {}", e))?;
    tokio::fs::write(path, content)
        .await
        .map_err(|e| format!("写入远程 capability 失败: {}", e))
}
