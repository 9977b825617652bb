use crate::models::answers::AnswerPayload;
use crate::models::results::ExamResults;
use crate::models::section::NextSectionPayload;

/// 提交触发方式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitTrigger {
    /// 用户显式提交
    Manual,
    /// 倒计时走到 0 的自动提交
    AutoExpiry,
    /// 失败后的自动重试
    AutoRetry,
}

impl std::fmt::Display for SubmitTrigger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            SubmitTrigger::Manual => "手动",
            SubmitTrigger::AutoExpiry => "倒计时到期",
            SubmitTrigger::AutoRetry => "自动重试",
        };
        write!(f, "{}", label)
    }
}

/// 提交失败的类别，决定恢复策略
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitFailureKind {
    /// 瞬时网络故障，允许恰好一次自动重试
    Network,
    /// 数据校验失败，重试会原样重发同一份无效数据，不重试
    Validation,
    /// 凭证失效，整场答卷终止
    Auth,
}

/// 驱动状态机的离散事件
///
/// 所有输入（计时、用户操作、网络结果）都经由单消费者队列
/// 逐个送入状态机，事件之间不存在交错
#[derive(Debug)]
pub enum SessionEvent {
    /// 请求加载下一小节
    LoadRequested,
    /// "获取下一小节"成功返回
    SectionReady { payload: Box<NextSectionPayload> },
    /// "获取下一小节"失败
    LoadFailed {
        message: String,
        /// 鉴权类失败不重试，直接终止答卷
        auth: bool,
    },
    /// 没有更多小节（完成信号）
    NoMoreSections,
    /// 秒级走表
    Tick,
    /// 考生作答一题
    AnswerRecorded { question_id: String, answer: String },
    /// 提交请求（手动触发）
    SubmitRequested { trigger: SubmitTrigger },
    /// 提交网络调用成功
    SubmitSucceeded { section_id: String },
    /// 提交网络调用失败
    SubmitFailed {
        section_id: String,
        kind: SubmitFailureKind,
        message: String,
    },
    /// 失败后的重试延迟已到
    RetryElapsed { section_id: String },
    /// 兜底超时已到
    SafetyTimeoutElapsed {
        section_id: String,
        /// 调度该超时时的提交次数，用于识别过期超时
        attempt_no: u32,
    },
    /// 成绩获取成功
    ResultsReady { results: Box<ExamResults> },
    /// 成绩获取失败
    ResultsFailed { message: String },
}

/// 状态机输出的效果：由驱动器异步执行，结果再以事件回流
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// 请求下一小节
    LoadNextSection,
    /// 延迟后重新请求下一小节
    ScheduleLoadRetry,
    /// 发起提交网络调用
    SubmitSection {
        section_id: String,
        answers: Vec<AnswerPayload>,
        trigger: SubmitTrigger,
    },
    /// 调度失败重试
    ScheduleRetry { section_id: String },
    /// 调度兜底超时
    ScheduleSafetyTimeout { section_id: String, attempt_no: u32 },
    /// 记录未决小节
    RecordUnresolved { section_id: String, reason: String },
    /// 获取最终成绩
    FetchResults,
}
