//! 未决小节记录服务 - 业务能力层
//!
//! 只负责"写 unresolved.txt"能力，不关心流程

use anyhow::Result;
use std::fs::OpenOptions;
use std::io::Write;
use tracing::debug;

/// 未决小节记录服务
///
/// 职责：
/// - 将提交未能确认（重试耗尽或兜底超时）的小节写入 unresolved.txt，
///   供事后人工核对
/// - 只处理单个小节的记录
/// - 不关心流程顺序
pub struct UnresolvedWriter {
    unresolved_file_path: String,
}

impl UnresolvedWriter {
    /// 创建新的未决小节记录服务
    pub fn new() -> Self {
        Self {
            unresolved_file_path: "unresolved.txt".to_string(),
        }
    }

    /// 使用自定义文件路径创建
    pub fn with_path(path: impl Into<String>) -> Self {
        Self {
            unresolved_file_path: path.into(),
        }
    }

    /// 写入一条未决记录
    ///
    /// # 参数
    /// - `attempt_id`: 答卷ID
    /// - `section_id`: 小节ID
    /// - `reason`: 未决原因
    pub fn write(&self, attempt_id: &str, section_id: &str, reason: &str) -> Result<()> {
        debug!(
            "写入未决记录: 答卷 {} | 小节 {} | 原因: {}",
            attempt_id, section_id, reason
        );

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.unresolved_file_path)?;

        let line = format!(
            "答卷 {} | 小节 {} | 原因: {}\n",
            attempt_id, section_id, reason
        );

        file.write_all(line.as_bytes())?;

        Ok(())
    }
}

impl Default for UnresolvedWriter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn appends_records() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("unresolved.txt");
        let writer = UnresolvedWriter::with_path(path.display().to_string());

        writer.write("att-1", "sec-1", "兜底超时").unwrap();
        writer.write("att-1", "sec-2", "重试耗尽").unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content.lines().count(), 2);
        assert!(content.contains("sec-1"));
        assert!(content.contains("重试耗尽"));
    }
}
