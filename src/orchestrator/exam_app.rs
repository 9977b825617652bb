//! 应用入口 - 编排层
//!
//! ## 职责
//!
//! 1. **应用初始化**：启动日志、加载答题方案、打开标记存储、创建后端客户端
//! 2. **生命周期**：开始答卷 → 驱动会话 → 输出成绩
//! 3. **资源所有者**：唯一持有后端客户端与持久化存储的模块

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;

use crate::clients::{ExamBackend, ExamClient};
use crate::config::Config;
use crate::infrastructure::{AttemptStateStore, FileAttemptStore};
use crate::models::attempt::ExamAttempt;
use crate::models::loaders::load_answer_plan;
use crate::models::plan::AnswerPlan;
use crate::orchestrator::session_driver::{DriverTimings, SessionDriver};
use crate::services::UnresolvedWriter;
use crate::session::SessionMachine;
use crate::utils::logging;

/// 应用主结构
pub struct App {
    config: Config,
    backend: Arc<dyn ExamBackend>,
    store: Arc<dyn AttemptStateStore>,
    plan: AnswerPlan,
}

impl App {
    /// 初始化应用
    pub async fn initialize(config: Config) -> Result<Self> {
        // 初始化日志文件
        logging::init_log_file(&config.output_log_file)?;

        logging::log_startup(&config);

        // 凭证缺失时尽早失败
        config.validate().context("配置校验失败")?;

        // 加载答题方案
        info!("\n📁 正在加载答题方案: {}", config.answer_plan_file);
        let plan = load_answer_plan(Path::new(&config.answer_plan_file)).await?;

        if config.verbose_logging {
            for (name, section_plan) in &plan.sections {
                info!("  方案 [{}]: {} 个预置答案", name, section_plan.answers.len());
            }
        }

        // 打开提交标记存储（跨进程重启保留）
        let store: Arc<dyn AttemptStateStore> = Arc::new(
            FileAttemptStore::open(&config.state_dir)
                .with_context(|| format!("无法打开状态目录: {}", config.state_dir))?,
        );

        // 创建考试后端客户端
        let backend: Arc<dyn ExamBackend> = Arc::new(ExamClient::new(&config));

        Ok(Self {
            config,
            backend,
            store,
            plan,
        })
    }

    /// 运行应用主逻辑：完成一场答卷
    pub async fn run(&self) -> Result<()> {
        info!("\n🚀 开始答卷: 考试 {}", self.plan.exam_id);

        let start = self
            .backend
            .start_attempt(&self.plan.exam_id)
            .await
            .context("开始答卷失败")?;

        logging::log_attempt_started(&start.exam_title, &start.attempt_id);

        let attempt = ExamAttempt::from_start(start);
        let machine = SessionMachine::new(
            attempt,
            self.store.clone(),
            self.config.max_load_retries,
        );

        let driver = SessionDriver::new(
            self.backend.clone(),
            machine,
            self.plan.clone(),
            DriverTimings::from_config(&self.config),
            UnresolvedWriter::with_path(self.config.unresolved_file.clone()),
        );

        let results = driver.run().await.context("答卷过程失败")?;

        // 输出最终成绩
        logging::print_final_results(&results, &self.config);

        Ok(())
    }
}
