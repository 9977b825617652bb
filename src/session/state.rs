use crate::models::section::Section;

/// 会话状态
///
/// 状态只能沿 加载中 → 作答中 → 提交中 → (下一小节的加载中 | 已完成)
/// 推进；提交失败的可恢复路径允许 提交中 → 作答中 退回一次。
/// `Completed` 为终态
#[derive(Debug, Clone)]
pub enum SessionState {
    /// 正在向后端请求下一小节
    Loading,
    /// 小节作答中，倒计时走秒
    Active {
        section: Section,
        /// 剩余秒数
        time_left: u64,
    },
    /// 提交已发起，等待网络结果
    Submitting { section: Section },
    /// 全部小节已提交，答卷终态
    Completed,
}

impl SessionState {
    /// 是否处于作答中（只有此状态下倒计时递减）
    pub fn is_active(&self) -> bool {
        matches!(self, SessionState::Active { .. })
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, SessionState::Completed)
    }

    /// 当前小节（作答中或提交中才有）
    pub fn current_section(&self) -> Option<&Section> {
        match self {
            SessionState::Active { section, .. } | SessionState::Submitting { section } => {
                Some(section)
            }
            _ => None,
        }
    }

    /// 剩余秒数（仅作答中有意义）
    pub fn time_left(&self) -> Option<u64> {
        match self {
            SessionState::Active { time_left, .. } => Some(*time_left),
            _ => None,
        }
    }

    /// 状态的中文名（用于日志）
    pub fn label(&self) -> &'static str {
        match self {
            SessionState::Loading => "加载中",
            SessionState::Active { .. } => "作答中",
            SessionState::Submitting { .. } => "提交中",
            SessionState::Completed => "已完成",
        }
    }
}

impl std::fmt::Display for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}
