use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::models::category::Category;

/// 题目类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuestionType {
    /// 单选题
    Mcq,
    /// 作文题
    Essay,
}

/// 单选题的一个选项
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionOption {
    pub text: String,
}

/// 小节内的一道题目
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub question_id: String,
    pub question_type: QuestionType,
    /// 题干，可能携带 HTML（含 <img> 标签）
    pub question_text: String,
    #[serde(default)]
    pub options: Vec<QuestionOption>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_path: Option<String>,
}

impl Question {
    /// 提取题干 HTML 中的图片 URL（用于日志展示）
    pub fn image_urls(&self) -> Vec<String> {
        let mut urls = Vec::new();

        if let Ok(re) = Regex::new(r#"<img\s+[^>]*src="([^"]+)""#) {
            urls.extend(
                re.captures_iter(&self.question_text)
                    .filter_map(|cap| cap.get(1).map(|m| m.as_str().to_string())),
            );
        }

        if let Some(path) = &self.image_path {
            urls.push(path.clone());
        }

        urls
    }
}

/// 一个计时小节
///
/// 小节按 sequence_number 严格递增的顺序下发，提交后不再回头
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Section {
    #[serde(rename = "id")]
    pub section_id: String,
    /// 类别名（如 "english"、"math"）
    pub name: String,
    /// 作答时长（分钟），由管理员在创建时固定
    pub duration_minutes: u32,
    /// 1 起始的小节序号，不可被考生更改
    pub sequence_number: u32,
}

impl Section {
    /// 校验小节数据完整性：缺 ID 或时长直接快速失败
    pub fn validate(&self) -> AppResult<()> {
        if self.section_id.trim().is_empty() {
            return Err(AppError::malformed_section("小节 ID 为空"));
        }
        if self.duration_minutes == 0 {
            return Err(AppError::malformed_section(format!(
                "小节 {} 时长为 0",
                self.section_id
            )));
        }
        if self.sequence_number == 0 {
            return Err(AppError::malformed_section(format!(
                "小节 {} 序号为 0",
                self.section_id
            )));
        }
        Ok(())
    }

    /// 作答时长（秒）
    pub fn duration_secs(&self) -> u64 {
        self.duration_minutes as u64 * 60
    }

    /// 解析小节类别
    pub fn category(&self) -> Option<Category> {
        Category::find(&self.name)
    }
}

impl std::fmt::Display for Section {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[小节 #{} {} {}分钟]",
            self.sequence_number, self.name, self.duration_minutes
        )
    }
}

/// "获取下一小节"接口的响应数据
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NextSectionPayload {
    pub section: Section,
    #[serde(default)]
    pub questions: Vec<Question>,
    pub total_sections: u32,
    pub current_section_number: u32,
    pub sections_completed: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn section() -> Section {
        Section {
            section_id: "sec-1".to_string(),
            name: "english".to_string(),
            duration_minutes: 25,
            sequence_number: 1,
        }
    }

    #[test]
    fn valid_section_passes() {
        assert!(section().validate().is_ok());
        assert_eq!(section().duration_secs(), 1500);
    }

    #[test]
    fn missing_id_fails_fast() {
        let mut s = section();
        s.section_id = "  ".to_string();
        assert!(s.validate().is_err());
    }

    #[test]
    fn zero_duration_fails_fast() {
        let mut s = section();
        s.duration_minutes = 0;
        assert!(s.validate().is_err());
    }

    #[test]
    fn extracts_image_urls_from_html() {
        let q = Question {
            question_id: "q1".to_string(),
            question_type: QuestionType::Mcq,
            question_text:
                r#"<p>如图所示</p><img class="fig" src="https://cdn.example.cn/fig1.png">"#
                    .to_string(),
            options: vec![],
            image_id: None,
            image_path: Some("/images/extra.png".to_string()),
        };

        let urls = q.image_urls();
        assert_eq!(urls.len(), 2);
        assert_eq!(urls[0], "https://cdn.example.cn/fig1.png");
        assert_eq!(urls[1], "/images/extra.png");
    }

    #[test]
    fn question_type_wire_names() {
        let q: Question = serde_json::from_value(serde_json::json!({
            "questionId": "q9",
            "questionType": "essay",
            "questionText": "请论述……"
        }))
        .unwrap();
        assert_eq!(q.question_type, QuestionType::Essay);
        assert!(q.options.is_empty());
    }
}
