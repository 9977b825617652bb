use std::collections::HashMap;

use serde::Deserialize;

/// 提交方式
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubmitMode {
    /// 录完本小节答案后立即手动提交
    #[default]
    Manual,
    /// 等倒计时走完，由到期自动提交
    Expiry,
}

/// 单个小节的答题方案
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SectionPlan {
    /// 按小节内题目顺序排列的答案（单选题为选项文本，作文题为正文）
    #[serde(default)]
    pub answers: Vec<String>,
}

/// 预先准备好的答题方案（TOML 文件）
///
/// ```toml
/// exam_id = "exam-2026-001"
/// submit_mode = "manual"
///
/// [sections.english]
/// answers = ["He ran quickly", "B", "C"]
///
/// [sections.math]
/// answers = ["42", "x = 3"]
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct AnswerPlan {
    /// 要参加的考试ID
    pub exam_id: String,
    #[serde(default)]
    pub submit_mode: SubmitMode,
    /// 类别名 → 该小节的答案列表
    #[serde(default)]
    pub sections: HashMap<String, SectionPlan>,
}

impl AnswerPlan {
    /// 取某个类别小节的答案列表，没有方案时返回空
    pub fn answers_for(&self, section_name: &str) -> &[String] {
        self.sections
            .get(section_name)
            .map(|plan| plan.answers.as_slice())
            .unwrap_or(&[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plan_toml() {
        let plan: AnswerPlan = toml::from_str(
            r#"
            exam_id = "exam-1"
            submit_mode = "expiry"

            [sections.english]
            answers = ["A", "B"]
            "#,
        )
        .unwrap();

        assert_eq!(plan.exam_id, "exam-1");
        assert_eq!(plan.submit_mode, SubmitMode::Expiry);
        assert_eq!(plan.answers_for("english"), ["A", "B"]);
        assert!(plan.answers_for("math").is_empty());
    }

    #[test]
    fn submit_mode_defaults_to_manual() {
        let plan: AnswerPlan = toml::from_str(r#"exam_id = "exam-1""#).unwrap();
        assert_eq!(plan.submit_mode, SubmitMode::Manual);
    }
}
