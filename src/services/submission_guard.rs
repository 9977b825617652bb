//! 提交防重服务 - 业务能力层
//!
//! 只负责"同一小节至多发起一次提交"能力，不关心流程

use std::sync::Arc;

use tracing::debug;

use crate::error::AppResult;
use crate::infrastructure::AttemptStateStore;

/// 提交防重服务
///
/// 职责：
/// - 按 (答卷, 小节) 管理"提交已发起"标记
/// - 占用标记必须发生在提交网络请求之前
/// - 只处理单个小节的标记
/// - 不关心流程顺序
///
/// 所有事件在单消费者队列上串行处理，检查与写入之间
/// 不会被其他提交路径抢占；持久化存储负责跨进程重启的场景
pub struct SubmissionGuard {
    store: Arc<dyn AttemptStateStore>,
}

impl SubmissionGuard {
    /// 创建新的提交防重服务
    pub fn new(store: Arc<dyn AttemptStateStore>) -> Self {
        Self { store }
    }

    /// 尝试占用本小节的提交资格
    ///
    /// # 返回
    /// - `true`: 占用成功，标记已写入，可以发起提交
    /// - `false`: 标记已存在，本次提交应作为空操作直接返回
    pub fn try_acquire(&self, attempt_id: &str, section_id: &str) -> AppResult<bool> {
        if self.store.is_marked(attempt_id, section_id)? {
            debug!("小节 {} 的提交标记已存在，跳过", section_id);
            return Ok(false);
        }

        self.store.mark(attempt_id, section_id)?;
        Ok(true)
    }

    /// 查询本小节的提交标记
    pub fn is_marked(&self, attempt_id: &str, section_id: &str) -> AppResult<bool> {
        self.store.is_marked(attempt_id, section_id)
    }

    /// 释放标记，允许恰好一次额外的提交尝试（仅在失败重试路径上调用）
    pub fn release(&self, attempt_id: &str, section_id: &str) -> AppResult<()> {
        debug!("释放小节 {} 的提交标记", section_id);
        self.store.clear(attempt_id, section_id)
    }
}
