use serde::{Deserialize, Serialize};

/// 单条字幕
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubtitleCue {
    /// 序号（从 1 开始）
    pub index: usize,
    /// 开始时间（秒）
    pub start: f64,
    /// 结束时间（秒）
    pub end: f64,
    pub text: String,
}

/// 字幕轨
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SubtitleTrack {
    pub cues: Vec<SubtitleCue>,
}

impl SubtitleTrack {
    /// 最后一条字幕的结束时间
    pub fn end_time(&self) -> f64 {
        self.cues.last().map(|c| c.end).unwrap_or(0.0)
    }

    /// 输出 SRT 格式
    pub fn to_srt(&self) -> String {
        let mut out = String::new();
        for cue in &self.cues {
            out.push_str(&format!(
                "{}\n{} --> {}\n{}\n\n",
                cue.index,
                format_timestamp(cue.start, ','),
                format_timestamp(cue.end, ','),
                cue.text
            ));
        }
        out
    }

    /// 输出 WebVTT 格式
    pub fn to_vtt(&self) -> String {
        let mut out = String::from("WEBVTT\n\n");
        for cue in &self.cues {
            out.push_str(&format!(
                "{}\n{} --> {}\n{}\n\n",
                cue.index,
                format_timestamp(cue.start, '.'),
                format_timestamp(cue.end, '.'),
                cue.text
            ));
        }
        out
    }
}

/// 格式化时间戳：`HH:MM:SS,mmm`（SRT）或 `HH:MM:SS.mmm`（VTT）
pub fn format_timestamp(seconds: f64, millis_separator: char) -> String {
    let total_ms = (seconds.max(0.0) * 1000.0).round() as u64;
    let hours = total_ms / 3_600_000;
    let minutes = (total_ms % 3_600_000) / 60_000;
    let secs = (total_ms % 60_000) / 1000;
    let ms = total_ms % 1000;
    format!(
        "{:02}:{:02}:{:02}{}{:03}",
        hours, minutes, secs, millis_separator, ms
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_timestamp() {
        assert_eq!(format_timestamp(0.0, ','), "00:00:00,000");
        assert_eq!(format_timestamp(3.2, ','), "00:00:03,200");
        assert_eq!(format_timestamp(3725.5, '.'), "01:02:05.500");
        assert_eq!(format_timestamp(-1.0, ','), "00:00:00,000");
    }

    #[test]
    fn test_srt_and_vtt_layout() {
        let track = SubtitleTrack {
            cues: vec![SubtitleCue {
                index: 1,
                start: 0.0,
                end: 2.5,
                text: "第1步".to_string(),
            }],
        };
        assert_eq!(track.to_srt(), "1\n00:00:00,000 --> 00:00:02,500\n第1步\n\n");
        assert!(track.to_vtt().starts_with("WEBVTT\n\n1\n00:00:00.000 --> 00:00:02.500"));
        assert_eq!(track.end_time(), 2.5);
    }
}
