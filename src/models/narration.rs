use serde::{Deserialize, Serialize};

/// 旁白稿
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NarrationTranscript {
    pub text: String,
    /// 预估朗读时长（秒）
    pub estimated_duration_seconds: f64,
    pub language_tag: String,
}

impl NarrationTranscript {
    /// 生成 SSML 文档
    ///
    /// # 参数
    /// - `voice`: 语音名称，例如 `zh-CN-XiaoxiaoNeural`
    pub fn to_ssml(&self, voice: &str) -> String {
        format!(
            "<speak version=\"1.0\" xmlns=\"http://www.w3.org/2001/10/synthesis\" xml:lang=\"{}\">\n  <voice name=\"{}\">\n    <prosody rate=\"medium\" pitch=\"medium\">\n      {}\n    </prosody>\n  </voice>\n</speak>\n",
            escape_xml(&self.language_tag),
            escape_xml(voice),
            escape_xml(&self.text)
        )
    }
}

fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}
