//! # 注入脚本生成服务
//!
//! 把解析出的 CSS / JS 片段合成为一段可在页面上下文中直接执行的脚本。
//!
//! ## 生成规则
//! - 每个 CSS 片段包装为一个立即执行函数：创建 `<style>` 元素、写入文本、追加到 `document.head`
//! - 每个 JS 片段原样包装为一个立即执行函数（片段视为可信代码，不做转义）
//! - 先输出全部 CSS 包装，再输出全部 JS 包装，各自保持输入顺序
//!
//! 每个片段都有独立的函数作用域，某个片段抛异常或声明同名变量不会影响其他片段。
//!
//! 纯函数、无共享状态，可在任意线程调用，无需加锁。

/// 转义字符串，使其可以安全放入 JS 单引号字符串字面量
///
/// 必须先转义反斜杠再转义单引号，否则单引号转义产生的 `\` 会被二次转义。
/// 之后再转义行终止符（`\n`、`\r`、U+2028、U+2029）：
/// 它们不能出现在字符串字面量中，多行 CSS 不转义会让整段注入脚本解析失败。
pub fn escape_single_quoted(input: &str) -> String {
    input
        .replace('\\', "\\\\")
        .replace('\'', "\\'")
        .replace('\n', "\\n")
        .replace('\r', "\\r")
        .replace('\u{2028}', "\\u2028")
        .replace('\u{2029}', "\\u2029")
}

/// 生成注入脚本
///
/// # 参数
/// - `css` - 要注入的样式片段
/// - `js` - 要执行的脚本片段
///
/// # 返回值
/// 拼接后的脚本文本；两个输入都为空时返回空字符串
pub fn generate_injection_script(css: &[String], js: &[String]) -> String {
    let mut script = String::new();

    for style in css {
        script.push_str("(function() {");
        script.push_str("var style = document.createElement('style');");
        script.push_str("style.textContent = '");
        script.push_str(&escape_single_quoted(style));
        script.push_str("';");
        script.push_str("document.head.appendChild(style);");
        script.push_str("})();");
    }

    for code in js {
        script.push_str("(function() {");
        script.push_str(code);
        script.push_str("})();");
    }

    script
}
