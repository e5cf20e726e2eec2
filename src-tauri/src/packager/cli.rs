//! # 打包工具命令行参数
//!
//! 使用 clap derive 定义 `webwrap-pack` 的子命令：
//! - `init` - 检查并安装构建工具链
//! - `build` - 为一个网址生成项目并构建桌面应用

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::models::config::{self, AppConfig};

/// 默认窗口宽度（命令行）
pub const CLI_DEFAULT_WIDTH: u32 = 1200;

/// 默认窗口高度（命令行）
pub const CLI_DEFAULT_HEIGHT: u32 = 800;

/// 将任意网页打包为桌面应用
#[derive(Parser, Debug)]
#[command(name = "webwrap-pack")]
#[command(author, version, about)]
pub struct Cli {
    /// 输出调试日志
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// 子命令
#[derive(Subcommand, Debug)]
pub enum Command {
    /// 检查并安装构建工具链（cargo、tauri-cli）
    Init,
    /// 构建桌面应用
    Build(BuildArgs),
}

/// `build` 子命令参数
#[derive(Args, Debug, Clone)]
pub struct BuildArgs {
    /// 要打包的网址
    #[arg(long)]
    pub url: Option<String>,

    /// 应用名称
    #[arg(long, default_value = "")]
    pub name: String,

    /// 应用图标（PNG）路径
    #[arg(long, default_value = "")]
    pub icon: String,

    /// 窗口宽度
    #[arg(long, default_value_t = CLI_DEFAULT_WIDTH)]
    pub width: u32,

    /// 窗口高度
    #[arg(long, default_value_t = CLI_DEFAULT_HEIGHT)]
    pub height: u32,

    /// 隐藏标题栏
    #[arg(long)]
    pub hide_title_bar: bool,

    /// 透明窗口
    #[arg(long)]
    pub transparent: bool,

    /// 窗口始终置顶
    #[arg(long)]
    pub always_on_top: bool,

    /// 自定义 User-Agent
    #[arg(long, default_value = "")]
    pub user_agent: String,

    /// 配置文件路径；提供时完全取代上面的命令行选项
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// 桌面外壳模板工程目录
    #[arg(long, default_value = env!("CARGO_MANIFEST_DIR"))]
    pub template: PathBuf,

    /// 输出目录
    #[arg(long, default_value = "build")]
    pub out: PathBuf,
}

impl BuildArgs {
    /// 解析最终使用的应用配置
    ///
    /// 提供 `--config` 时读取配置文件，否则用命令行选项构造配置。
    ///
    /// # 错误
    /// 既没有 `--url` 也没有 `--config`，或配置文件读取失败时返回错误
    pub async fn resolve_config(&self) -> Result<AppConfig, String> {
        if let Some(path) = &self.config {
            return config::read_config(path).await;
        }

        let url = self
            .url
            .as_deref()
            .filter(|u| !u.trim().is_empty())
            .ok_or_else(|| "必须提供 --url 或 --config".to_string())?;

        Ok(AppConfig {
            url: url.to_string(),
            name: self.name.clone(),
            icon: self.icon.clone(),
            width: self.width,
            height: self.height,
            hide_title_bar: self.hide_title_bar,
            transparent: self.transparent,
            always_on_top: self.always_on_top,
            user_agent: self.user_agent.clone(),
            ..AppConfig::default()
        })
    }
}
