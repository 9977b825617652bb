use crate::models::plan::AnswerPlan;
use anyhow::{Context, Result};
use std::path::Path;
use tokio::fs;

/// 从 TOML 文件加载答题方案
pub async fn load_answer_plan(plan_file_path: &Path) -> Result<AnswerPlan> {
    let content = fs::read_to_string(plan_file_path)
        .await
        .with_context(|| format!("无法读取答题方案文件: {}", plan_file_path.display()))?;

    let plan: AnswerPlan = toml::from_str(&content)
        .with_context(|| format!("无法解析答题方案文件: {}", plan_file_path.display()))?;

    if plan.exam_id.trim().is_empty() {
        anyhow::bail!("答题方案缺少 exam_id: {}", plan_file_path.display());
    }

    let answered_sections = plan.sections.len();
    tracing::info!(
        "成功加载答题方案: 考试 {} / {} 个小节有预置答案",
        plan.exam_id,
        answered_sections
    );

    Ok(plan)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[tokio::test]
    async fn loads_plan_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"
            exam_id = "exam-7"

            [sections.math]
            answers = ["42"]
            "#
        )
        .unwrap();

        let plan = load_answer_plan(file.path()).await.unwrap();
        assert_eq!(plan.exam_id, "exam-7");
        assert_eq!(plan.answers_for("math"), ["42"]);
    }

    #[tokio::test]
    async fn empty_exam_id_is_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"exam_id = """#).unwrap();

        assert!(load_answer_plan(file.path()).await.is_err());
    }

    #[tokio::test]
    async fn missing_file_is_reported() {
        let result = load_answer_plan(Path::new("no_such_plan.toml")).await;
        assert!(result.is_err());
    }
}
