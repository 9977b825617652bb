//! 答卷全流程集成测试
//!
//! 使用脚本化的后端桩与 tokio 虚拟时间（start_paused），
//! 在毫秒内走完以分钟计的倒计时场景

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use auto_take_exam::clients::{ExamBackend, NextSectionOutcome};
use auto_take_exam::error::{ApiError, AppError, AppResult};
use auto_take_exam::models::answers::AnswerPayload;
use auto_take_exam::models::attempt::{ExamAttempt, StartAttemptPayload};
use auto_take_exam::models::plan::{AnswerPlan, SectionPlan, SubmitMode};
use auto_take_exam::models::results::ExamResults;
use auto_take_exam::models::section::{
    NextSectionPayload, Question, QuestionOption, QuestionType, Section,
};
use auto_take_exam::infrastructure::{AttemptStateStore, MemoryAttemptStore};
use auto_take_exam::orchestrator::{DriverTimings, SessionDriver};
use auto_take_exam::services::UnresolvedWriter;
use auto_take_exam::session::SessionMachine;

/// 脚本化的考试后端桩
struct MockBackend {
    /// 按顺序下发的小节，取完即返回"没有更多小节"
    sections: Mutex<VecDeque<NextSectionPayload>>,
    /// 收到的提交调用: (小节ID, 答案列表)
    submit_calls: Mutex<Vec<(String, Vec<AnswerPayload>)>>,
    /// 前 N 次提交返回网络错误
    failing_submits: AtomicUsize,
    /// 前 N 次提交永不返回（用于兜底超时场景）
    hanging_submits: AtomicUsize,
    /// 成绩接口被调用的次数
    results_calls: AtomicUsize,
}

impl MockBackend {
    fn new(sections: Vec<NextSectionPayload>) -> Arc<Self> {
        Arc::new(Self {
            sections: Mutex::new(sections.into()),
            submit_calls: Mutex::new(Vec::new()),
            failing_submits: AtomicUsize::new(0),
            hanging_submits: AtomicUsize::new(0),
            results_calls: AtomicUsize::new(0),
        })
    }

    fn submit_calls(&self) -> Vec<(String, Vec<AnswerPayload>)> {
        self.submit_calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ExamBackend for MockBackend {
    async fn start_attempt(&self, _exam_id: &str) -> AppResult<StartAttemptPayload> {
        Ok(StartAttemptPayload {
            attempt_id: "att-1".to_string(),
            exam_title: "模拟考试".to_string(),
            exam_description: String::new(),
        })
    }

    async fn next_section(&self, _attempt_id: &str) -> AppResult<NextSectionOutcome> {
        let next = self.sections.lock().unwrap().pop_front();
        match next {
            Some(payload) => Ok(NextSectionOutcome::Section(Box::new(payload))),
            None => Ok(NextSectionOutcome::NoMoreSections),
        }
    }

    async fn submit_section(
        &self,
        _attempt_id: &str,
        section_id: &str,
        answers: &[AnswerPayload],
    ) -> AppResult<()> {
        self.submit_calls
            .lock()
            .unwrap()
            .push((section_id.to_string(), answers.to_vec()));

        if self.hanging_submits.load(Ordering::SeqCst) > 0 {
            self.hanging_submits.fetch_sub(1, Ordering::SeqCst);
            // 永不决议：只有兜底超时能推进
            tokio::time::sleep(Duration::from_secs(86400)).await;
            return Ok(());
        }

        if self.failing_submits.load(Ordering::SeqCst) > 0 {
            self.failing_submits.fetch_sub(1, Ordering::SeqCst);
            return Err(AppError::Api(ApiError::BadResponse {
                endpoint: "api/attempt/submit-section".to_string(),
                code: Some(500),
                message: Some("服务端暂不可用".to_string()),
            }));
        }

        Ok(())
    }

    async fn fetch_results(&self, _attempt_id: &str) -> AppResult<ExamResults> {
        self.results_calls.fetch_add(1, Ordering::SeqCst);
        Ok(ExamResults {
            total_score_percent: 75.0,
            sections: vec![],
        })
    }
}

// ========== 测试数据构造 ==========

fn question(id: &str) -> Question {
    Question {
        question_id: id.to_string(),
        question_type: QuestionType::Mcq,
        question_text: format!("题目 {}", id),
        options: vec![
            QuestionOption {
                text: "A".to_string(),
            },
            QuestionOption {
                text: "B".to_string(),
            },
        ],
        image_id: None,
        image_path: None,
    }
}

fn section_payload(
    seq: u32,
    name: &str,
    total: u32,
    completed: u32,
    questions: Vec<Question>,
) -> NextSectionPayload {
    NextSectionPayload {
        section: Section {
            section_id: format!("sec-{}", seq),
            name: name.to_string(),
            duration_minutes: 1,
            sequence_number: seq,
        },
        questions,
        total_sections: total,
        current_section_number: seq,
        sections_completed: completed,
    }
}

fn plan(submit_mode: SubmitMode, sections: &[(&str, &[&str])]) -> AnswerPlan {
    let sections: HashMap<String, SectionPlan> = sections
        .iter()
        .map(|(name, answers)| {
            (
                name.to_string(),
                SectionPlan {
                    answers: answers.iter().map(|a| a.to_string()).collect(),
                },
            )
        })
        .collect();
    AnswerPlan {
        exam_id: "exam-1".to_string(),
        submit_mode,
        sections,
    }
}

fn timings() -> DriverTimings {
    DriverTimings {
        retry_delay: Duration::from_secs(3),
        safety_timeout: Duration::from_secs(30),
        load_retry_delay: Duration::from_secs(3),
    }
}

fn driver(
    backend: Arc<MockBackend>,
    store: Arc<dyn AttemptStateStore>,
    plan: AnswerPlan,
    unresolved_path: &std::path::Path,
) -> SessionDriver {
    let attempt = ExamAttempt::from_start(StartAttemptPayload {
        attempt_id: "att-1".to_string(),
        exam_title: "模拟考试".to_string(),
        exam_description: String::new(),
    });
    let machine = SessionMachine::new(attempt, store, 3);
    SessionDriver::new(
        backend,
        machine,
        plan,
        timings(),
        UnresolvedWriter::with_path(unresolved_path.display().to_string()),
    )
}

// ========== 场景测试 ==========

/// 两小节全流程：第一节倒计时走完自动提交（带一题答案），
/// 第二节无预置答案到期空提交，最终恰好取一次成绩
#[tokio::test(start_paused = true)]
async fn two_sections_expiry_flow() {
    let backend = MockBackend::new(vec![
        section_payload(1, "english", 2, 0, vec![question("q1")]),
        section_payload(2, "math", 2, 1, vec![question("q2")]),
    ]);
    let dir = tempfile::tempdir().unwrap();

    let results = driver(
        backend.clone(),
        Arc::new(MemoryAttemptStore::new()),
        plan(SubmitMode::Expiry, &[("english", &["B"])]),
        &dir.path().join("unresolved.txt"),
    )
    .run()
    .await
    .unwrap();

    let calls = backend.submit_calls();
    assert_eq!(calls.len(), 2, "每个小节恰好一次提交调用");

    assert_eq!(calls[0].0, "sec-1");
    assert_eq!(calls[0].1.len(), 1);
    assert_eq!(calls[0].1[0].question_id, "q1");
    assert_eq!(calls[0].1[0].answer_text, "B");

    // 第二节没有作答：空答案数组
    assert_eq!(calls[1].0, "sec-2");
    assert!(calls[1].1.is_empty());

    assert_eq!(backend.results_calls.load(Ordering::SeqCst), 1);
    assert_eq!(results.total_score_percent, 75.0);
}

/// 手动提交模式：答案录完立即提交，不等倒计时
#[tokio::test(start_paused = true)]
async fn manual_mode_submits_without_waiting() {
    let backend = MockBackend::new(vec![
        section_payload(1, "english", 2, 0, vec![question("q1")]),
        section_payload(2, "math", 2, 1, vec![question("q2")]),
    ]);
    let dir = tempfile::tempdir().unwrap();

    driver(
        backend.clone(),
        Arc::new(MemoryAttemptStore::new()),
        plan(
            SubmitMode::Manual,
            &[("english", &["A"]), ("math", &["B"])],
        ),
        &dir.path().join("unresolved.txt"),
    )
    .run()
    .await
    .unwrap();

    let calls = backend.submit_calls();
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[0].1[0].answer_text, "A");
    assert_eq!(calls[1].1[0].answer_text, "B");
    assert_eq!(backend.results_calls.load(Ordering::SeqCst), 1);
}

/// 提交失败一次后重试成功：恰好两次网络尝试，之后正常推进
#[tokio::test(start_paused = true)]
async fn failed_submit_retries_once_then_succeeds() {
    let backend = MockBackend::new(vec![section_payload(
        1,
        "english",
        1,
        0,
        vec![question("q1")],
    )]);
    backend.failing_submits.store(1, Ordering::SeqCst);
    let dir = tempfile::tempdir().unwrap();

    driver(
        backend.clone(),
        Arc::new(MemoryAttemptStore::new()),
        plan(SubmitMode::Manual, &[("english", &["A"])]),
        &dir.path().join("unresolved.txt"),
    )
    .run()
    .await
    .unwrap();

    let calls = backend.submit_calls();
    assert_eq!(calls.len(), 2, "首次失败 + 恰好一次自动重试");
    assert_eq!(calls[0].0, "sec-1");
    assert_eq!(calls[1].0, "sec-1");
    assert_eq!(backend.results_calls.load(Ordering::SeqCst), 1);
}

/// 重启恢复场景：标记在上次运行中已写入，
/// 本次不得再发提交调用，由兜底超时推进
#[tokio::test(start_paused = true)]
async fn preset_guard_prevents_duplicate_submission() {
    let backend = MockBackend::new(vec![section_payload(
        1,
        "english",
        1,
        0,
        vec![question("q1")],
    )]);
    let dir = tempfile::tempdir().unwrap();

    let store = Arc::new(MemoryAttemptStore::new());
    store.mark("att-1", "sec-1").unwrap();

    driver(
        backend.clone(),
        store,
        plan(SubmitMode::Manual, &[("english", &["A"])]),
        &dir.path().join("unresolved.txt"),
    )
    .run()
    .await
    .unwrap();

    assert!(
        backend.submit_calls().is_empty(),
        "标记已存在时不得重复发起提交"
    );
    assert_eq!(backend.results_calls.load(Ordering::SeqCst), 1);

    // 未决小节被记录，供人工核对
    let unresolved = std::fs::read_to_string(dir.path().join("unresolved.txt")).unwrap();
    assert!(unresolved.contains("sec-1"));
}

/// 后端挂起不返回：兜底超时保证考生不被永远卡住
#[tokio::test(start_paused = true)]
async fn hanging_submit_is_resolved_by_safety_timeout() {
    let backend = MockBackend::new(vec![section_payload(
        1,
        "english",
        1,
        0,
        vec![question("q1")],
    )]);
    backend.hanging_submits.store(1, Ordering::SeqCst);
    let dir = tempfile::tempdir().unwrap();

    let results = driver(
        backend.clone(),
        Arc::new(MemoryAttemptStore::new()),
        plan(SubmitMode::Manual, &[("english", &["A"])]),
        &dir.path().join("unresolved.txt"),
    )
    .run()
    .await
    .unwrap();

    // 提交被发起过，但从未决议；兜底超时后仍能拿到成绩
    assert_eq!(backend.submit_calls().len(), 1);
    assert_eq!(results.total_score_percent, 75.0);

    let unresolved = std::fs::read_to_string(dir.path().join("unresolved.txt")).unwrap();
    assert!(unresolved.contains("兜底超时"));
}
