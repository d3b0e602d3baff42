//! 场景程序的源码拼接
//!
//! 负责缩进、字面量转义和动画时长累计，调用方只描述"放什么、怎么动"。

use crate::services::sanitizer::{escape_for_embedding, EmbedContext};

const INDENT: &str = "    ";

/// Python 源码拼接器
#[derive(Debug, Default)]
pub struct PyEmitter {
    buf: String,
    indent: usize,
    elapsed: f64,
}

impl PyEmitter {
    pub fn new() -> Self {
        Self::default()
    }

    /// 从指定缩进层级开始（用于拼接方法体片段）
    pub fn nested(indent: usize) -> Self {
        Self {
            indent,
            ..Self::default()
        }
    }

    pub fn line(&mut self, code: impl AsRef<str>) {
        for _ in 0..self.indent {
            self.buf.push_str(INDENT);
        }
        self.buf.push_str(code.as_ref());
        self.buf.push('\n');
    }

    pub fn blank(&mut self) {
        self.buf.push('\n');
    }

    pub fn indent(&mut self) {
        self.indent += 1;
    }

    pub fn dedent(&mut self) {
        self.indent = self.indent.saturating_sub(1);
    }

    /// 文件头：导入与渲染参数
    pub fn header(&mut self) {
        self.line("from manim import *");
        self.blank();
        self.line("config.frame_rate = 30");
        self.line("config.pixel_width = 1920");
        self.line("config.pixel_height = 1080");
        self.line("config.background_color = \"#1a1a1a\"");
        self.blank();
        self.blank();
    }

    /// 播放动画并累计时长
    pub fn play(&mut self, animations: impl AsRef<str>, run_time: f64) {
        self.line(format!(
            "self.play({}, run_time={:.2})",
            animations.as_ref(),
            run_time
        ));
        self.elapsed += run_time;
    }

    /// 停顿，非正数时不输出
    pub fn wait(&mut self, seconds: f64) {
        if seconds > 0.0 {
            self.line(format!("self.wait({:.2})", seconds));
            self.elapsed += seconds;
        }
    }

    /// 拼接另一个片段（缩进以片段自身为准）
    pub fn append(&mut self, other: PyEmitter) {
        self.elapsed += other.elapsed;
        self.buf.push_str(&other.buf);
    }

    /// 已累计的动画与停顿时长
    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    pub fn finish(self) -> String {
        self.buf
    }
}

/// 普通字符串字面量
pub fn py_str(text: &str) -> String {
    format!("\"{}\"", escape_for_embedding(text, EmbedContext::PyString))
}

/// 多行字符串字面量，行之间用 `\n` 连接
pub fn py_str_lines(lines: &[String]) -> String {
    let escaped: Vec<String> = lines
        .iter()
        .map(|l| escape_for_embedding(l, EmbedContext::PyString))
        .collect();
    format!("\"{}\"", escaped.join("\\n"))
}

/// 原始字符串字面量，用于公式
pub fn raw_math(latex: &str) -> String {
    format!("r\"{}\"", escape_for_embedding(latex, EmbedContext::RawMath))
}

/// Python 列表字面量
pub fn py_list(names: &[String]) -> String {
    format!("[{}]", names.join(", "))
}
