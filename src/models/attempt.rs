use serde::{Deserialize, Serialize};

/// "开始答卷"接口的响应数据
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartAttemptPayload {
    pub attempt_id: String,
    pub exam_title: String,
    #[serde(default)]
    pub exam_description: String,
}

/// 一场答卷：一名考生对一份考试从开始到结束的一次作答
///
/// 由会话控制器独占持有，进度字段以后端每次"获取下一小节"
/// 响应中的数据为准刷新
#[derive(Debug, Clone)]
pub struct ExamAttempt {
    /// 答卷ID（由后端在开始答卷时签发）
    pub attempt_id: String,
    /// 考试标题
    pub exam_title: String,
    /// 考试描述
    pub exam_description: String,
    /// 小节总数
    pub total_sections: u32,
    /// 已完成小节数
    pub sections_completed: u32,
    /// 是否已完成全部小节
    pub completed: bool,
}

impl ExamAttempt {
    /// 从"开始答卷"响应创建答卷（此时尚未知晓小节总数）
    pub fn from_start(payload: StartAttemptPayload) -> Self {
        Self {
            attempt_id: payload.attempt_id,
            exam_title: payload.exam_title,
            exam_description: payload.exam_description,
            total_sections: 0,
            sections_completed: 0,
            completed: false,
        }
    }

    /// 按后端返回的权威数据刷新进度
    pub fn refresh_progress(&mut self, total_sections: u32, sections_completed: u32) {
        self.total_sections = total_sections;
        self.sections_completed = sections_completed;
    }

    /// 记录一个小节提交成功
    pub fn record_section_done(&mut self) {
        self.sections_completed += 1;
    }

    /// 是否所有小节都已提交
    pub fn all_sections_done(&self) -> bool {
        self.total_sections > 0 && self.sections_completed >= self.total_sections
    }

    /// 标记答卷终态
    pub fn mark_completed(&mut self) {
        self.completed = true;
    }
}
