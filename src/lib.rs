//! # Auto Take Exam
//!
//! 一个用于自动化在线考试作答的 Rust 应用程序
//!
//! ## 架构设计
//!
//! 本系统采用严格的四层架构：
//!
//! ### ① 基础设施层（Infrastructure）
//! - `infrastructure/` - 持有稀缺资源（提交标记文件），只暴露能力
//! - `AttemptStateStore` - 唯一的持久化 owner，提供标记读写能力
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 描述"我能做什么"，只处理单个小节
//! - `SubmissionGuard` - 提交防重能力
//! - `UnresolvedWriter` - 写 unresolved.txt 能力
//!
//! ### ③ 流程层（Session）
//! - `session/` - 定义"一场答卷"的完整推进流程
//! - `SessionState` / `SessionEvent` / `Effect` - 状态、事件与效果
//! - `SessionMachine` - 纯状态机（倒计时 → 提交 → 下一小节）
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/exam_app` - 应用入口，管理资源与生命周期
//! - `orchestrator/session_driver` - 事件循环，执行状态机产出的效果
//!
//! ## 模块结构

pub mod clients;
pub mod config;
pub mod error;
pub mod infrastructure;
pub mod logger;

pub mod models;
pub mod orchestrator;
pub mod services;
pub mod session;
pub mod utils;

// 重新导出常用类型
pub use clients::{ExamBackend, ExamClient, NextSectionOutcome};
pub use config::Config;
pub use error::{AppError, AppResult};
pub use infrastructure::{AttemptStateStore, FileAttemptStore, MemoryAttemptStore};
pub use models::{AnswerPlan, AnswerSheet, ExamAttempt, ExamResults, Question, Section};
pub use orchestrator::{App, DriverTimings, SessionDriver};
pub use session::{Effect, SessionEvent, SessionMachine, SessionState, SubmitTrigger};
