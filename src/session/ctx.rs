//! 小节处理上下文
//!
//! 封装"我正在作答哪场答卷的第几个小节"这一信息

use std::fmt::Display;

/// 小节处理上下文
///
/// 包含日志与未决记录所需的全部上下文信息
#[derive(Debug, Clone)]
pub struct SectionCtx {
    /// 答卷ID
    pub attempt_id: String,

    /// 小节ID
    pub section_id: String,

    /// 小节序号（从1开始）
    pub sequence_number: u32,

    /// 小节类别名
    pub name: String,
}

impl SectionCtx {
    /// 创建新的小节上下文
    pub fn new(
        attempt_id: String,
        section_id: String,
        sequence_number: u32,
        name: String,
    ) -> Self {
        Self {
            attempt_id,
            section_id,
            sequence_number,
            name,
        }
    }
}

impl Display for SectionCtx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[答卷 ID#{} 小节#{} 类别#{}]",
            self.attempt_id, self.sequence_number, self.name
        )
    }
}
