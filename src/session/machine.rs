//! 会话状态机 - 流程层
//!
//! 核心职责：定义"一场答卷"的完整推进流程
//!
//! 流程顺序：
//! 1. 加载小节 → 倒计时作答 → 提交（手动或到期自动）
//! 2. 提交失败 → 恰好一次自动重试 → 仍失败则尽力推进
//! 3. 没有更多小节 → 获取成绩 → 终态
//!
//! 防重是本模块的核心正确性性质：同一 (答卷, 小节) 至多有一次
//! 提交网络调用在途。倒计时到期与手动提交是两个独立触发源，
//! 先占到提交标记的一方胜出，另一方成为空操作

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::error::{AppError, AppResult, SessionError};
use crate::infrastructure::AttemptStateStore;
use crate::models::answers::AnswerSheet;
use crate::models::attempt::ExamAttempt;
use crate::models::results::ExamResults;
use crate::models::section::{NextSectionPayload, Question, Section};
use crate::services::SubmissionGuard;
use crate::session::ctx::SectionCtx;
use crate::session::event::{Effect, SessionEvent, SubmitFailureKind, SubmitTrigger};
use crate::session::state::SessionState;
use crate::utils::logging::truncate_text;

/// 每小节最多发起的提交次数：首次提交 + 恰好一次自动重试
const MAX_SUBMIT_ATTEMPTS: u32 = 2;

/// 会话状态机
///
/// - 同步处理事件，返回待执行的效果列表
/// - 独占持有答卷、作答表与提交防重标记
/// - 不做网络 IO，不持有计时器
/// - 不关心效果如何被执行
pub struct SessionMachine {
    attempt: ExamAttempt,
    state: SessionState,
    sheet: AnswerSheet,
    guard: SubmissionGuard,
    /// 当前小节的题目列表
    questions: Vec<Question>,
    /// 已见过的最大小节序号，序号必须严格递增
    last_sequence: u32,
    /// 当前小节已发起的提交次数
    submit_attempts: u32,
    /// 进入提交中时冻结的剩余秒数，失败退回作答中时恢复
    frozen_time_left: u64,
    /// 当前小节的连续加载失败次数
    load_attempts: u32,
    max_load_retries: u32,
    results: Option<ExamResults>,
    finished: bool,
}

impl SessionMachine {
    /// 创建新的会话状态机
    pub fn new(
        attempt: ExamAttempt,
        store: Arc<dyn AttemptStateStore>,
        max_load_retries: u32,
    ) -> Self {
        Self {
            attempt,
            state: SessionState::Loading,
            sheet: AnswerSheet::new(),
            guard: SubmissionGuard::new(store),
            questions: Vec::new(),
            last_sequence: 0,
            submit_attempts: 0,
            frozen_time_left: 0,
            load_attempts: 0,
            max_load_retries,
            results: None,
            finished: false,
        }
    }

    /// 处理一个事件，返回需要执行的效果
    pub fn handle_event(&mut self, event: SessionEvent) -> AppResult<Vec<Effect>> {
        match event {
            SessionEvent::LoadRequested => self.on_load_requested(),
            SessionEvent::SectionReady { payload } => self.on_section_ready(*payload),
            SessionEvent::LoadFailed { message, auth } => self.on_load_failed(message, auth),
            SessionEvent::NoMoreSections => self.on_no_more_sections(),
            SessionEvent::Tick => self.on_tick(),
            SessionEvent::AnswerRecorded {
                question_id,
                answer,
            } => self.on_answer_recorded(question_id, answer),
            SessionEvent::SubmitRequested { trigger } => self.on_submit_requested(trigger),
            SessionEvent::SubmitSucceeded { section_id } => self.on_submit_succeeded(&section_id),
            SessionEvent::SubmitFailed {
                section_id,
                kind,
                message,
            } => self.on_submit_failed(&section_id, kind, message),
            SessionEvent::RetryElapsed { section_id } => self.on_retry_elapsed(&section_id),
            SessionEvent::SafetyTimeoutElapsed {
                section_id,
                attempt_no,
            } => self.on_safety_timeout(&section_id, attempt_no),
            SessionEvent::ResultsReady { results } => self.on_results_ready(*results),
            SessionEvent::ResultsFailed { message } => {
                Err(AppError::Session(SessionError::ResultsUnavailable {
                    message,
                }))
            }
        }
    }

    // ========== 加载 ==========

    fn on_load_requested(&mut self) -> AppResult<Vec<Effect>> {
        match self.state {
            SessionState::Loading => Ok(vec![Effect::LoadNextSection]),
            _ => {
                debug!("当前状态 {} 不接受加载请求，忽略", self.state);
                Ok(vec![])
            }
        }
    }

    fn on_section_ready(&mut self, payload: NextSectionPayload) -> AppResult<Vec<Effect>> {
        if !matches!(self.state, SessionState::Loading) {
            warn!("非加载状态收到小节数据，忽略");
            return Ok(vec![]);
        }

        // 数据不完整时快速失败，不猜默认值
        payload.section.validate()?;
        if payload.section.sequence_number <= self.last_sequence {
            return Err(AppError::Session(SessionError::SequenceRegression {
                previous: self.last_sequence,
                received: payload.section.sequence_number,
            }));
        }

        self.attempt
            .refresh_progress(payload.total_sections, payload.sections_completed);
        self.last_sequence = payload.section.sequence_number;
        self.sheet.clear();
        self.questions = payload.questions;
        self.submit_attempts = 0;
        self.load_attempts = 0;

        let time_left = payload.section.duration_secs();
        info!(
            "✓ {} 加载成功: {} 道题，限时 {} 秒",
            payload.section,
            self.questions.len(),
            time_left
        );
        for question in &self.questions {
            let imgs = question.image_urls();
            if !imgs.is_empty() {
                debug!("题目 {} 含 {} 张图片", question.question_id, imgs.len());
            }
        }

        self.state = SessionState::Active {
            section: payload.section,
            time_left,
        };

        Ok(vec![])
    }

    fn on_load_failed(&mut self, message: String, auth: bool) -> AppResult<Vec<Effect>> {
        if !matches!(self.state, SessionState::Loading) {
            debug!("非加载状态收到加载失败事件，忽略");
            return Ok(vec![]);
        }

        if auth {
            return Err(AppError::auth_failed(message));
        }

        self.load_attempts += 1;
        if self.load_attempts <= self.max_load_retries {
            warn!(
                "⚠️ 小节加载失败 (尝试 {}/{}): {}，稍后重试",
                self.load_attempts, self.max_load_retries, message
            );
            return Ok(vec![Effect::ScheduleLoadRetry]);
        }

        Err(AppError::Session(SessionError::LoadRetriesExhausted {
            attempts: self.load_attempts,
            message,
        }))
    }

    fn on_no_more_sections(&mut self) -> AppResult<Vec<Effect>> {
        match self.state {
            // 零个剩余小节与最后一节提交成功同等对待
            SessionState::Loading => self.complete_attempt(),
            _ => {
                debug!("当前状态 {} 收到完成信号，忽略", self.state);
                Ok(vec![])
            }
        }
    }

    // ========== 倒计时与作答 ==========

    fn on_tick(&mut self) -> AppResult<Vec<Effect>> {
        // 只有作答中才走表；剩余 0 秒后的走表不再有任何效果，
        // 因此 1→0 的那次递减是自动提交的唯一触发点
        let reached_zero = match &mut self.state {
            SessionState::Active { time_left, .. } if *time_left > 0 => {
                *time_left -= 1;
                *time_left == 0
            }
            _ => false,
        };

        if reached_zero {
            if let Some(section) = self.state.current_section() {
                info!("{} ⏰ 倒计时结束，自动提交", section);
            }
            return self.initiate_submit(SubmitTrigger::AutoExpiry);
        }

        Ok(vec![])
    }

    fn on_answer_recorded(&mut self, question_id: String, answer: String) -> AppResult<Vec<Effect>> {
        match self.state {
            SessionState::Active { .. } => {
                debug!(
                    "记录作答: 题目 {} = {}",
                    question_id,
                    truncate_text(&answer, 40)
                );
                self.sheet.record(question_id, answer);
            }
            _ => {
                debug!("非作答状态收到作答事件，忽略: 题目 {}", question_id);
            }
        }
        Ok(vec![])
    }

    // ========== 提交 ==========

    fn on_submit_requested(&mut self, trigger: SubmitTrigger) -> AppResult<Vec<Effect>> {
        match self.state {
            SessionState::Active { .. } => self.initiate_submit(trigger),
            SessionState::Submitting { .. } => {
                debug!("已在提交中，忽略重复的 {} 触发", trigger);
                Ok(vec![])
            }
            _ => {
                debug!("当前状态 {} 不可提交，忽略 {} 触发", self.state, trigger);
                Ok(vec![])
            }
        }
    }

    /// 提交路径的唯一入口：先占提交标记，再发网络调用
    fn initiate_submit(&mut self, trigger: SubmitTrigger) -> AppResult<Vec<Effect>> {
        let (section, time_left) = match &self.state {
            SessionState::Active { section, time_left } => (section.clone(), *time_left),
            _ => {
                debug!("当前状态 {} 不可提交，忽略 {} 触发", self.state, trigger);
                return Ok(vec![]);
            }
        };

        let attempt_id = self.attempt.attempt_id.clone();
        let section_id = section.section_id.clone();

        if !self.guard.try_acquire(&attempt_id, &section_id)? {
            // 标记已存在：多半是上次运行在提交途中被打断。
            // 不再发网络调用，只挂兜底超时保证向前推进
            warn!(
                "{} ⚠️ 提交标记已存在（{} 触发），不再发起网络调用",
                section, trigger
            );
            let attempt_no = self.submit_attempts;
            self.frozen_time_left = time_left;
            self.state = SessionState::Submitting { section };
            return Ok(vec![Effect::ScheduleSafetyTimeout {
                section_id,
                attempt_no,
            }]);
        }

        self.submit_attempts += 1;
        self.frozen_time_left = time_left;
        let answers = self.sheet.payload(&self.questions);

        info!(
            "{} 📤 发起提交（{} 触发，第 {} 次，已作答 {} 题）",
            section,
            trigger,
            self.submit_attempts,
            answers.len()
        );

        self.state = SessionState::Submitting { section };

        Ok(vec![
            Effect::SubmitSection {
                section_id: section_id.clone(),
                answers,
                trigger,
            },
            Effect::ScheduleSafetyTimeout {
                section_id,
                attempt_no: self.submit_attempts,
            },
        ])
    }

    fn on_submit_succeeded(&mut self, section_id: &str) -> AppResult<Vec<Effect>> {
        let section = match &self.state {
            SessionState::Submitting { section } if section.section_id == section_id => {
                section.clone()
            }
            _ => {
                debug!("过期的提交成功事件: 小节 {}，忽略", section_id);
                return Ok(vec![]);
            }
        };

        // 标记保持已设置：该小节已永久决议
        self.attempt.record_section_done();
        info!(
            "✓ {} 提交成功（已完成 {}/{}）",
            section, self.attempt.sections_completed, self.attempt.total_sections
        );

        if self.attempt.all_sections_done() {
            self.complete_attempt()
        } else {
            self.state = SessionState::Loading;
            Ok(vec![Effect::LoadNextSection])
        }
    }

    fn on_submit_failed(
        &mut self,
        section_id: &str,
        kind: SubmitFailureKind,
        message: String,
    ) -> AppResult<Vec<Effect>> {
        let section = match &self.state {
            SessionState::Submitting { section } if section.section_id == section_id => {
                section.clone()
            }
            _ => {
                debug!("过期的提交失败事件: 小节 {}，忽略", section_id);
                return Ok(vec![]);
            }
        };

        match kind {
            SubmitFailureKind::Auth => Err(AppError::auth_failed(message)),
            SubmitFailureKind::Validation => {
                warn!("{} ❌ 提交数据校验失败: {}，不重试", section, message);
                self.abandon_section(&section, "提交数据校验失败")
            }
            SubmitFailureKind::Network => {
                if self.submit_attempts < MAX_SUBMIT_ATTEMPTS {
                    warn!("{} ⚠️ 提交失败: {}，稍后自动重试一次", section, message);
                    // 释放标记，恰好允许一次额外尝试；倒计时不重开，
                    // 剩余时间保持冻结值
                    self.guard
                        .release(&self.attempt.attempt_id, &section.section_id)?;
                    let section_id = section.section_id.clone();
                    self.state = SessionState::Active {
                        section,
                        time_left: self.frozen_time_left,
                    };
                    Ok(vec![Effect::ScheduleRetry { section_id }])
                } else {
                    warn!("{} ❌ 重试后仍提交失败，按尽力提交处理并继续", section);
                    self.abandon_section(&section, "网络重试耗尽")
                }
            }
        }
    }

    fn on_retry_elapsed(&mut self, section_id: &str) -> AppResult<Vec<Effect>> {
        match &self.state {
            SessionState::Active { section, .. } if section.section_id == section_id => {
                self.initiate_submit(SubmitTrigger::AutoRetry)
            }
            _ => {
                debug!("过期的重试事件: 小节 {}，忽略", section_id);
                Ok(vec![])
            }
        }
    }

    fn on_safety_timeout(&mut self, section_id: &str, attempt_no: u32) -> AppResult<Vec<Effect>> {
        let section = match &self.state {
            SessionState::Submitting { section }
                if section.section_id == section_id && attempt_no == self.submit_attempts =>
            {
                section.clone()
            }
            _ => {
                debug!("过期的兜底超时: 小节 {}，忽略", section_id);
                return Ok(vec![]);
            }
        };

        warn!("{} ⚠️ 兜底超时: 提交结果迟迟未决，按尽力提交处理并继续", section);
        self.abandon_section(&section, "兜底超时")
    }

    /// 放弃等待当前小节的提交结果，尽力推进到下一小节
    ///
    /// 标记保持已设置：考生侧不允许再对该小节发起提交
    fn abandon_section(&mut self, section: &Section, reason: &str) -> AppResult<Vec<Effect>> {
        self.state = SessionState::Loading;
        Ok(vec![
            Effect::RecordUnresolved {
                section_id: section.section_id.clone(),
                reason: reason.to_string(),
            },
            Effect::LoadNextSection,
        ])
    }

    // ========== 完成 ==========

    fn complete_attempt(&mut self) -> AppResult<Vec<Effect>> {
        self.attempt.mark_completed();
        self.state = SessionState::Completed;
        info!("🎉 全部小节已提交，正在获取成绩…");
        Ok(vec![Effect::FetchResults])
    }

    fn on_results_ready(&mut self, results: ExamResults) -> AppResult<Vec<Effect>> {
        if !self.state.is_completed() {
            debug!("非终态收到成绩，忽略");
            return Ok(vec![]);
        }
        info!("✓ 成绩已获取: 总分 {:.1}%", results.total_score_percent);
        self.results = Some(results);
        self.finished = true;
        Ok(vec![])
    }

    // ========== 只读访问 ==========

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn attempt(&self) -> &ExamAttempt {
        &self.attempt
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn answer_sheet(&self) -> &AnswerSheet {
        &self.sheet
    }

    pub fn results(&self) -> Option<&ExamResults> {
        self.results.as_ref()
    }

    /// 成绩已落定，事件循环可以退出
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// 当前小节的日志上下文
    pub fn current_ctx(&self) -> Option<SectionCtx> {
        self.state.current_section().map(|section| {
            SectionCtx::new(
                self.attempt.attempt_id.clone(),
                section.section_id.clone(),
                section.sequence_number,
                section.name.clone(),
            )
        })
    }
}
