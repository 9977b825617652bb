//! 会话驱动器 - 编排层
//!
//! 状态机只产出效果，本模块负责把效果变成真实世界的动作：
//! 网络调用、延迟调度、未决记录。动作的结果再以事件形式
//! 回流到单消费者队列，由状态机逐个消化

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, warn};

use crate::clients::{ExamBackend, NextSectionOutcome};
use crate::config::Config;
use crate::error::{ApiError, AppError, AppResult};
use crate::models::answers::AnswerPayload;
use crate::models::plan::{AnswerPlan, SubmitMode};
use crate::models::results::ExamResults;
use crate::services::UnresolvedWriter;
use crate::session::{Effect, SessionEvent, SessionMachine, SubmitFailureKind, SubmitTrigger};

/// 驱动器的时间参数（经验值，全部可配）
#[derive(Debug, Clone, Copy)]
pub struct DriverTimings {
    /// 提交失败后的自动重试延迟
    pub retry_delay: Duration,
    /// 兜底超时：提交与重试都未决议时强制推进
    pub safety_timeout: Duration,
    /// 小节加载失败后的重试延迟
    pub load_retry_delay: Duration,
}

impl DriverTimings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            retry_delay: Duration::from_secs(config.retry_delay_secs),
            safety_timeout: Duration::from_secs(config.safety_timeout_secs),
            load_retry_delay: Duration::from_secs(config.retry_delay_secs),
        }
    }
}

/// 会话驱动器
///
/// 职责：
/// - 持有事件队列与秒级走表，逐个事件驱动状态机
/// - 执行状态机产出的效果（网络 / 延迟 / 记录）
/// - 按答题方案为新加载的小节填答案并触发提交
/// - 不做任何防重或转移判断
pub struct SessionDriver {
    backend: Arc<dyn ExamBackend>,
    machine: SessionMachine,
    plan: AnswerPlan,
    timings: DriverTimings,
    unresolved: UnresolvedWriter,
    tx: mpsc::UnboundedSender<SessionEvent>,
    rx: mpsc::UnboundedReceiver<SessionEvent>,
}

impl SessionDriver {
    /// 创建新的会话驱动器
    pub fn new(
        backend: Arc<dyn ExamBackend>,
        machine: SessionMachine,
        plan: AnswerPlan,
        timings: DriverTimings,
        unresolved: UnresolvedWriter,
    ) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            backend,
            machine,
            plan,
            timings,
            unresolved,
            tx,
            rx,
        }
    }

    /// 驱动整场答卷直到成绩落定
    pub async fn run(mut self) -> AppResult<ExamResults> {
        // 请求第一个小节
        let effects = self.machine.handle_event(SessionEvent::LoadRequested)?;
        self.dispatch(effects);

        let mut ticker = tokio::time::interval(Duration::from_secs(1));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            let event = tokio::select! {
                // 只有作答中才走表
                _ = ticker.tick(), if self.machine.state().is_active() => SessionEvent::Tick,
                maybe_event = self.rx.recv() => {
                    match maybe_event {
                        Some(event) => event,
                        None => break,
                    }
                }
            };

            let section_loaded = matches!(event, SessionEvent::SectionReady { .. });

            let effects = self.machine.handle_event(event)?;
            self.dispatch(effects);

            if section_loaded && self.machine.state().is_active() {
                // 新小节的倒计时从满时长重新起表
                ticker.reset();
                self.apply_answer_plan()?;
            }

            if self.machine.is_finished() {
                break;
            }
        }

        self.machine
            .results()
            .cloned()
            .ok_or_else(|| AppError::Other("会话在成绩落定前结束".to_string()))
    }

    /// 按答题方案为当前小节填答案，并按提交方式触发提交
    fn apply_answer_plan(&mut self) -> AppResult<()> {
        let Some(section) = self.machine.state().current_section() else {
            return Ok(());
        };
        let section_name = section.name.clone();
        let category = section.category();
        let ctx = self.machine.current_ctx();

        let question_ids: Vec<String> = self
            .machine
            .questions()
            .iter()
            .map(|q| q.question_id.clone())
            .collect();

        // 先按小节名精确取方案，取不到时退回规范类别名
        let mut answers = self.plan.answers_for(&section_name).to_vec();
        if answers.is_empty() {
            if let Some(category) = category {
                answers = self.plan.answers_for(category.name()).to_vec();
            }
        }

        if answers.len() < question_ids.len() {
            warn!(
                "{} ⚠️ 预置答案不足: {} 道题只有 {} 个答案",
                ctx.as_ref().map(|c| c.to_string()).unwrap_or_default(),
                question_ids.len(),
                answers.len()
            );
        }

        for (question_id, answer) in question_ids.into_iter().zip(answers) {
            let effects = self.machine.handle_event(SessionEvent::AnswerRecorded {
                question_id,
                answer,
            })?;
            self.dispatch(effects);
        }

        match self.plan.submit_mode {
            SubmitMode::Manual => {
                let effects = self.machine.handle_event(SessionEvent::SubmitRequested {
                    trigger: SubmitTrigger::Manual,
                })?;
                self.dispatch(effects);
            }
            SubmitMode::Expiry => {
                info!("💡 按方案等待倒计时自然结束后自动提交");
            }
        }

        Ok(())
    }

    /// 执行状态机产出的效果
    fn dispatch(&mut self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::LoadNextSection => self.spawn_load(),
                Effect::ScheduleLoadRetry => {
                    self.spawn_delayed(self.timings.load_retry_delay, SessionEvent::LoadRequested)
                }
                Effect::SubmitSection {
                    section_id,
                    answers,
                    trigger,
                } => self.spawn_submit(section_id, answers, trigger),
                Effect::ScheduleRetry { section_id } => self.spawn_delayed(
                    self.timings.retry_delay,
                    SessionEvent::RetryElapsed { section_id },
                ),
                Effect::ScheduleSafetyTimeout {
                    section_id,
                    attempt_no,
                } => self.spawn_delayed(
                    self.timings.safety_timeout,
                    SessionEvent::SafetyTimeoutElapsed {
                        section_id,
                        attempt_no,
                    },
                ),
                Effect::RecordUnresolved { section_id, reason } => {
                    // 记录失败不中断考试
                    if let Err(e) = self.unresolved.write(
                        &self.machine.attempt().attempt_id,
                        &section_id,
                        &reason,
                    ) {
                        error!("写入未决记录失败: {}", e);
                    }
                }
                Effect::FetchResults => self.spawn_fetch_results(),
            }
        }
    }

    fn spawn_load(&self) {
        let backend = self.backend.clone();
        let tx = self.tx.clone();
        let attempt_id = self.machine.attempt().attempt_id.clone();

        tokio::spawn(async move {
            let event = match backend.next_section(&attempt_id).await {
                Ok(NextSectionOutcome::Section(payload)) => SessionEvent::SectionReady { payload },
                Ok(NextSectionOutcome::NoMoreSections) => SessionEvent::NoMoreSections,
                Err(e) => SessionEvent::LoadFailed {
                    auth: e.is_auth(),
                    message: e.to_string(),
                },
            };
            let _ = tx.send(event);
        });
    }

    fn spawn_submit(
        &self,
        section_id: String,
        answers: Vec<AnswerPayload>,
        trigger: SubmitTrigger,
    ) {
        let backend = self.backend.clone();
        let tx = self.tx.clone();
        let attempt_id = self.machine.attempt().attempt_id.clone();

        debug!(
            "提交任务入队: 小节 {} / {} 题 / {} 触发",
            section_id,
            answers.len(),
            trigger
        );

        tokio::spawn(async move {
            let event = match backend
                .submit_section(&attempt_id, &section_id, &answers)
                .await
            {
                Ok(()) => SessionEvent::SubmitSucceeded { section_id },
                Err(e) => SessionEvent::SubmitFailed {
                    kind: submit_failure_kind(&e),
                    message: e.to_string(),
                    section_id,
                },
            };
            let _ = tx.send(event);
        });
    }

    fn spawn_fetch_results(&self) {
        let backend = self.backend.clone();
        let tx = self.tx.clone();
        let attempt_id = self.machine.attempt().attempt_id.clone();

        tokio::spawn(async move {
            let event = match backend.fetch_results(&attempt_id).await {
                Ok(results) => SessionEvent::ResultsReady {
                    results: Box::new(results),
                },
                Err(e) => SessionEvent::ResultsFailed {
                    message: e.to_string(),
                },
            };
            let _ = tx.send(event);
        });
    }

    fn spawn_delayed(&self, delay: Duration, event: SessionEvent) {
        let tx = self.tx.clone();
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = tx.send(event);
        });
    }
}

/// 把 API 错误归类为状态机的提交失败类别
fn submit_failure_kind(err: &AppError) -> SubmitFailureKind {
    match err {
        AppError::Api(ApiError::AuthFailed { .. }) => SubmitFailureKind::Auth,
        AppError::Api(ApiError::ValidationFailed { .. }) => SubmitFailureKind::Validation,
        _ => SubmitFailureKind::Network,
    }
}
