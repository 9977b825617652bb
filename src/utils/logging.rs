use anyhow::Result;
/// 日志工具模块
///
/// 提供日志格式化和输出的辅助函数
use std::fs;
use tracing::info;

use crate::config::Config;
use crate::models::results::ExamResults;

/// 初始化日志文件
///
/// # 参数
/// - `log_file_path`: 日志文件路径
///
/// # 返回
/// 返回是否成功初始化
pub fn init_log_file(log_file_path: &str) -> Result<()> {
    let log_header = format!(
        "{}\n自动答卷日志 - {}\n{}\n\n",
        "=".repeat(60),
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
        "=".repeat(60)
    );
    fs::write(log_file_path, log_header)?;
    Ok(())
}

/// 记录程序启动信息
pub fn log_startup(config: &Config) {
    info!("{}", "=".repeat(60));
    info!("🚀 程序启动 - 自动答卷模式");
    info!("📊 考试后端: {}", config.backend_base_url);
    info!(
        "⏱ 重试延迟: {} 秒 / 兜底超时: {} 秒",
        config.retry_delay_secs, config.safety_timeout_secs
    );
    info!("{}", "=".repeat(60));
}

/// 记录答卷开始信息
///
/// # 参数
/// - `exam_title`: 考试标题
/// - `attempt_id`: 答卷ID
pub fn log_attempt_started(exam_title: &str, attempt_id: &str) {
    info!("\n{}", "=".repeat(60));
    info!("📋 答卷已创建: {}", exam_title);
    info!("📄 答卷 ID: {}", attempt_id);
    info!("{}", "=".repeat(60));
}

/// 打印最终成绩
///
/// # 参数
/// - `results`: 最终成绩
/// - `config`: 程序配置（用于提示日志位置）
pub fn print_final_results(results: &ExamResults, config: &Config) {
    info!("\n{}", "=".repeat(60));
    info!("📊 考试完成，成绩如下");
    info!(
        "完成时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("{}", "=".repeat(60));

    for section in &results.sections {
        info!(
            "  {}: {}/{} ({:.1}%)",
            section.name, section.correct, section.total, section.percent
        );
    }

    info!("{}", "─".repeat(60));
    info!("✅ 总分: {:.1}%", results.total_score_percent);
    info!("{}", "=".repeat(60));
    info!("\n日志已保存至: {}", config.output_log_file);
}

/// 截断长文本用于日志显示
///
/// # 参数
/// - `text`: 原始文本
/// - `max_len`: 最大长度
///
/// # 返回
/// 返回截断后的文本
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        text.chars().take(max_len).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}
