use serde::{Deserialize, Serialize};

/// 最终成绩：对控制器只读的不透明投影，仅用于展示
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExamResults {
    pub total_score_percent: f64,
    #[serde(default)]
    pub sections: Vec<SectionResult>,
}

/// 单个小节的成绩
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionResult {
    pub name: String,
    pub correct: u32,
    pub total: u32,
    pub percent: f64,
    #[serde(default)]
    pub per_question_breakdown: Vec<QuestionResult>,
}

/// 单题判定结果
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionResult {
    pub question_id: String,
    pub correct: bool,
}
