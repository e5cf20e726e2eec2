//! # webwrap - Tauri Cargo 构建脚本
//!
//! 在编译主项目之前生成 Tauri 运行时所需的资源绑定代码，
//! 并处理 `tauri.conf.json` 中声明的图标和权限清单。
//! 打包工具改写 `tauri.conf.json` 后，重新构建即可得到新的产品名和 identifier。

fn main() {
  tauri_build::build()
}
