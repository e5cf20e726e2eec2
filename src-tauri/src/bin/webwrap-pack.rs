//! # webwrap-pack - 打包工具入口
//!
//! 用法：
//! - `webwrap-pack init` - 检查并安装构建工具链
//! - `webwrap-pack build --url <url> [options]` - 打包网址
//! - `webwrap-pack build --config <file>` - 按配置文件打包

use clap::Parser;

use app_lib::packager::builder::Builder;
use app_lib::packager::cli::{Cli, Command};
use app_lib::packager::toolchain;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();

    // 优先级：RUST_LOG 环境变量 > -v 参数 > 默认 Info
    env_logger::Builder::default()
        .filter_level(if cli.verbose {
            log::LevelFilter::Debug
        } else {
            log::LevelFilter::Info
        })
        .parse_default_env()
        .init();

    if let Err(e) = run(cli).await {
        log::error!("{}", e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), String> {
    match cli.command {
        Command::Init => {
            log::info!("正在初始化构建环境...");
            toolchain::init_environment().await?;
            log::info!("构建环境初始化完成");
        }
        Command::Build(args) => {
            let config = args.resolve_config().await?;
            log::debug!("打包配置: {:?}", config);

            let builder = Builder::new(config, args.template.clone(), args.out.clone());
            let output = builder.build().await?;
            log::info!("应用已生成: {}", output.display());
        }
    }
    Ok(())
}
