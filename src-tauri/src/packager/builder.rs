//! # 应用构建流水线
//!
//! 串联项目生成和工具链调用，完成一次完整的打包：
//! 1. 在 `<out>/.staging/` 下生成项目
//! 2. 执行 `cargo tauri build`
//! 3. 把 `target/release/bundle` 移动到 `<out>/<slug>`（已存在时先删除）
//! 4. 删除临时项目目录
//!
//! 文件移动和清理通过 `tokio::fs` 完成，与子进程调用共用同一个运行时。

use std::path::{Path, PathBuf};

use crate::models::config::AppConfig;
use crate::packager::{scaffold, toolchain};

/// 临时项目目录名
const STAGING_DIR: &str = ".staging";

/// 应用构建器
pub struct Builder {
    config: AppConfig,
    template_dir: PathBuf,
    out_dir: PathBuf,
}

impl Builder {
    /// 创建构建器
    ///
    /// # 参数
    /// - `config` - 应用配置
    /// - `template_dir` - 桌面外壳工程目录
    /// - `out_dir` - 输出目录
    pub fn new(config: AppConfig, template_dir: PathBuf, out_dir: PathBuf) -> Self {
        Self {
            config,
            template_dir,
            out_dir,
        }
    }

    /// 临时项目的父目录
    pub fn staging_root(&self) -> PathBuf {
        self.out_dir.join(STAGING_DIR)
    }

    /// 最终产物目录 `<out>/<slug>`
    pub fn output_dir(&self) -> PathBuf {
        self.out_dir.join(scaffold::app_slug(&self.config.name))
    }

    /// 执行完整的打包流程
    ///
    /// # 返回值
    /// 最终产物目录
    ///
    /// # 错误
    /// 任一步骤失败时返回错误；构建失败时保留临时项目目录以便排查
    pub async fn build(&self) -> Result<PathBuf, String> {
        let project_dir =
            scaffold::scaffold_project(&self.config, &self.template_dir, &self.staging_root())
                .await?;

        toolchain::run_tauri_build(&project_dir).await?;

        let output = self.output_dir();
        collect_bundle(&project_dir, &output).await?;

        tokio::fs::remove_dir_all(&project_dir)
            .await
            .map_err(|e| format!("清理临时项目目录失败: {}", e))?;

        log::info!("打包完成: {}", output.display());
        Ok(output)
    }
}

/// 把构建产物从项目目录移动到输出目录
async fn collect_bundle(project_dir: &Path, output: &Path) -> Result<(), String> {
    let bundle_dir = project_dir.join("target").join("release").join("bundle");
    if !bundle_dir.exists() {
        return Err(format!("未找到构建产物: {}", bundle_dir.display()));
    }

    if output.exists() {
        tokio::fs::remove_dir_all(output)
            .await
            .map_err(|e| format!("删除旧产物失败: {}", e))?;
    }
    if let Some(parent) = output.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| format!("创建输出目录失败: {}", e))?;
    }

    tokio::fs::rename(&bundle_dir, output)
        .await
        .map_err(|e| format!("移动构建产物失败: {}", e))
}
