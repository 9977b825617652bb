use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::models::section::Question;

/// 提交接口中的单题答案
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerPayload {
    pub question_id: String,
    pub answer_text: String,
}

/// 当前小节的作答表
///
/// questionId → 当前答案（单选题为所选选项文本，作文题为正文）。
/// 只在显式作答事件中被修改；新小节加载时清空；提交时只读
#[derive(Debug, Default)]
pub struct AnswerSheet {
    answers: HashMap<String, String>,
}

impl AnswerSheet {
    /// 创建空作答表
    pub fn new() -> Self {
        Self::default()
    }

    /// 记录一题的答案（重复作答覆盖旧值）
    pub fn record(&mut self, question_id: impl Into<String>, answer: impl Into<String>) {
        self.answers.insert(question_id.into(), answer.into());
    }

    /// 读取一题的当前答案
    pub fn answer(&self, question_id: &str) -> Option<&str> {
        self.answers.get(question_id).map(|s| s.as_str())
    }

    /// 已作答题数
    pub fn len(&self) -> usize {
        self.answers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.answers.is_empty()
    }

    /// 清空作答表（新小节加载时调用）
    pub fn clear(&mut self) {
        self.answers.clear();
    }

    /// 按小节题目顺序生成提交数据，只包含已作答的题目
    pub fn payload(&self, questions: &[Question]) -> Vec<AnswerPayload> {
        questions
            .iter()
            .filter_map(|q| {
                self.answers.get(&q.question_id).map(|answer| AnswerPayload {
                    question_id: q.question_id.clone(),
                    answer_text: answer.clone(),
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::section::{QuestionOption, QuestionType};

    fn question(id: &str) -> Question {
        Question {
            question_id: id.to_string(),
            question_type: QuestionType::Mcq,
            question_text: format!("题目 {}", id),
            options: vec![QuestionOption {
                text: "A".to_string(),
            }],
            image_id: None,
            image_path: None,
        }
    }

    #[test]
    fn record_then_read_round_trip() {
        let mut sheet = AnswerSheet::new();
        sheet.record("q1", "选项A");
        assert_eq!(sheet.answer("q1"), Some("选项A"));
    }

    #[test]
    fn second_record_overwrites_not_duplicates() {
        let mut sheet = AnswerSheet::new();
        sheet.record("q1", "选项A");
        sheet.record("q1", "选项B");
        assert_eq!(sheet.len(), 1);
        assert_eq!(sheet.answer("q1"), Some("选项B"));
    }

    #[test]
    fn payload_follows_question_order_and_skips_unanswered() {
        let mut sheet = AnswerSheet::new();
        let questions = vec![question("q1"), question("q2"), question("q3")];

        sheet.record("q3", "C");
        sheet.record("q1", "A");

        let payload = sheet.payload(&questions);
        assert_eq!(payload.len(), 2);
        assert_eq!(payload[0].question_id, "q1");
        assert_eq!(payload[1].question_id, "q3");
    }

    #[test]
    fn clear_empties_sheet() {
        let mut sheet = AnswerSheet::new();
        sheet.record("q1", "A");
        sheet.clear();
        assert!(sheet.is_empty());
        assert_eq!(sheet.payload(&[question("q1")]), vec![]);
    }
}
