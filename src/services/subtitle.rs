//! 字幕轨生成
//!
//! 每页按时长占据一段时间，页内文字过长时按标点切成多条字幕，
//! 时间按字符数比例分配。

use crate::models::{Page, SubtitleCue, SubtitleTrack};

/// 单条字幕的最大字符数
pub const MAX_CUE_CHARS: usize = 50;

/// 相邻字幕之间的间隔（秒）
const CUE_GAP: f64 = 0.2;

/// 字幕生成器
pub struct SubtitleBuilder {
    max_chars: usize,
    gap: f64,
}

impl Default for SubtitleBuilder {
    fn default() -> Self {
        Self {
            max_chars: MAX_CUE_CHARS,
            gap: CUE_GAP,
        }
    }
}

impl SubtitleBuilder {
    /// 生成字幕轨
    ///
    /// # 参数
    /// - `pages`: 分页脚本
    /// - `page_scale`: 分页时长缩放系数（协调后的总时长 / 分页总时长）
    pub fn build(&self, pages: &[Page], page_scale: f64) -> SubtitleTrack {
        let scale = if page_scale.is_finite() && page_scale > 0.0 {
            page_scale
        } else {
            1.0
        };

        let mut cues = Vec::new();
        let mut cursor = 0.0;

        for page in pages {
            let span = page.duration_seconds * scale;
            let segments = split_text(&page.narration_text, self.max_chars);
            let total_chars: usize = segments.iter().map(|s| s.chars().count()).sum();

            let mut start = cursor;
            for segment in segments {
                let share = if total_chars == 0 {
                    1.0
                } else {
                    segment.chars().count() as f64 / total_chars as f64
                };
                let length = span * share;
                // 时长太短时不留间隔
                let gap = if length > self.gap * 2.0 { self.gap } else { 0.0 };
                cues.push(SubtitleCue {
                    index: cues.len() + 1,
                    start,
                    end: start + length - gap,
                    text: segment,
                });
                start += length;
            }
            cursor += span;
        }

        SubtitleTrack { cues }
    }
}

/// 按标点切分文本，每段不超过 `max_chars` 个字符
fn split_text(text: &str, max_chars: usize) -> Vec<String> {
    let text = text.trim();
    if text.is_empty() {
        return Vec::new();
    }

    // 先按标点切成短句
    // 半角标点后面必须跟空白或到达结尾，`3.5`、`1,000` 不会被拆开
    let mut clauses: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        current.push(c);
        let boundary = match c {
            '，' | '。' | '；' | '！' | '？' | '：' => true,
            ',' | '.' | ';' | ':' | '!' | '?' => chars.peek().map_or(true, |n| n.is_whitespace()),
            _ => false,
        };
        if boundary {
            clauses.push(std::mem::take(&mut current));
        }
    }
    if !current.trim().is_empty() {
        clauses.push(current);
    }

    // 再把短句合并到不超过上限
    let mut segments: Vec<String> = Vec::new();
    let mut buffer = String::new();
    for clause in clauses {
        if !buffer.is_empty() && buffer.chars().count() + clause.chars().count() > max_chars {
            segments.push(buffer.trim().to_string());
            buffer.clear();
        }
        buffer.push_str(&clause);
        while buffer.chars().count() > max_chars {
            let head: String = buffer.chars().take(max_chars).collect();
            let tail: String = buffer.chars().skip(max_chars).collect();
            segments.push(head.trim().to_string());
            buffer = tail;
        }
    }
    if !buffer.trim().is_empty() {
        segments.push(buffer.trim().to_string());
    }

    segments.retain(|s| !s.is_empty());
    segments
}
