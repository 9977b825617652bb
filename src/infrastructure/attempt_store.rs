//! 答卷状态存储 - 基础设施层
//!
//! 持有唯一的持久化资源（状态文件），只暴露"读写提交标记"的能力

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::error::{AppResult, StoreError};

/// 答卷状态存储
///
/// 按 (attempt_id, section_id) 记录"该小节的提交已发起"标记。
/// 标记必须在发起提交网络请求之前同步写入，且要在进程重启后
/// 仍然可读，否则刷新/重启会造成重复提交
pub trait AttemptStateStore: Send + Sync {
    /// 查询提交标记
    fn is_marked(&self, attempt_id: &str, section_id: &str) -> AppResult<bool>;

    /// 写入提交标记
    fn mark(&self, attempt_id: &str, section_id: &str) -> AppResult<()>;

    /// 清除提交标记（仅在允许重试的失败路径上调用）
    fn clear(&self, attempt_id: &str, section_id: &str) -> AppResult<()>;
}

fn flag_key(attempt_id: &str, section_id: &str) -> String {
    format!("{}::{}", attempt_id, section_id)
}

/// 文件型状态存储
///
/// 职责：
/// - 持有状态文件（JSON），进程重启后标记仍然有效
/// - 每次变更立刻写回磁盘
/// - 不认识 Section / Attempt 的业务含义
pub struct FileAttemptStore {
    file_path: PathBuf,
    flags: Mutex<HashSet<String>>,
}

impl FileAttemptStore {
    /// 打开（或创建）状态目录下的标记文件
    pub fn open(state_dir: impl AsRef<Path>) -> AppResult<Self> {
        let dir = state_dir.as_ref();
        fs::create_dir_all(dir).map_err(|source| StoreError::WriteFailed {
            path: dir.display().to_string(),
            source,
        })?;

        let file_path = dir.join("submitted_sections.json");
        let flags = if file_path.exists() {
            let content =
                fs::read_to_string(&file_path).map_err(|source| StoreError::ReadFailed {
                    path: file_path.display().to_string(),
                    source,
                })?;
            serde_json::from_str::<HashSet<String>>(&content).map_err(|source| {
                StoreError::Corrupted {
                    path: file_path.display().to_string(),
                    source,
                }
            })?
        } else {
            HashSet::new()
        };

        Ok(Self {
            file_path,
            flags: Mutex::new(flags),
        })
    }

    fn persist(&self, flags: &HashSet<String>) -> AppResult<()> {
        let content =
            serde_json::to_string_pretty(flags).map_err(|source| StoreError::Corrupted {
                path: self.file_path.display().to_string(),
                source,
            })?;
        fs::write(&self.file_path, content).map_err(|source| StoreError::WriteFailed {
            path: self.file_path.display().to_string(),
            source,
        })?;
        Ok(())
    }
}

impl AttemptStateStore for FileAttemptStore {
    fn is_marked(&self, attempt_id: &str, section_id: &str) -> AppResult<bool> {
        let flags = self.flags.lock().expect("标记锁中毒");
        Ok(flags.contains(&flag_key(attempt_id, section_id)))
    }

    fn mark(&self, attempt_id: &str, section_id: &str) -> AppResult<()> {
        let mut flags = self.flags.lock().expect("标记锁中毒");
        flags.insert(flag_key(attempt_id, section_id));
        self.persist(&flags)
    }

    fn clear(&self, attempt_id: &str, section_id: &str) -> AppResult<()> {
        let mut flags = self.flags.lock().expect("标记锁中毒");
        flags.remove(&flag_key(attempt_id, section_id));
        self.persist(&flags)
    }
}

/// 内存型状态存储（测试用，不跨进程保留）
#[derive(Default)]
pub struct MemoryAttemptStore {
    flags: Mutex<HashSet<String>>,
}

impl MemoryAttemptStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl AttemptStateStore for MemoryAttemptStore {
    fn is_marked(&self, attempt_id: &str, section_id: &str) -> AppResult<bool> {
        let flags = self.flags.lock().expect("标记锁中毒");
        Ok(flags.contains(&flag_key(attempt_id, section_id)))
    }

    fn mark(&self, attempt_id: &str, section_id: &str) -> AppResult<()> {
        let mut flags = self.flags.lock().expect("标记锁中毒");
        flags.insert(flag_key(attempt_id, section_id));
        Ok(())
    }

    fn clear(&self, attempt_id: &str, section_id: &str) -> AppResult<()> {
        let mut flags = self.flags.lock().expect("标记锁中毒");
        flags.remove(&flag_key(attempt_id, section_id));
        Ok(())
    }
}
