//! 编排层（Orchestration Layer）
//!
//! ## 职责
//!
//! 本层负责一场答卷从开始到出分的完整调度，是整个系统的"指挥中心"。
//!
//! ## 模块划分
//!
//! ### `exam_app` - 应用入口
//! - 管理应用生命周期（初始化、运行、收尾）
//! - 加载答题方案与配置
//! - 持有后端客户端与持久化存储
//! - 输出最终成绩与统计信息
//!
//! ### `session_driver` - 会话驱动器
//! - 持有事件队列（单消费者）与秒级走表
//! - 逐个事件驱动状态机，执行其返回的效果
//! - 把网络调用、重试延迟、兜底超时放入后台任务，
//!   结果再以事件形式回流队列
//! - 按答题方案为新加载的小节填答案
//!
//! ## 层次关系
//!
//! ```text
//! exam_app (一场考试)
//!     ↓
//! session_driver (事件循环)
//!     ↓
//! session::SessionMachine (纯状态机)
//!     ↓
//! services (能力层：提交防重 / 未决记录)
//!     ↓
//! infrastructure (基础设施：提交标记存储) + clients (考试后端)
//! ```
//!
//! ## 设计原则
//!
//! 1. **单一消费者**：所有事件串行进入状态机，不存在交错
//! 2. **资源隔离**：只有编排层持有后端客户端与计时器
//! 3. **向下依赖**：编排层 → session → services → infrastructure
//! 4. **无业务判断**：防重与转移逻辑全部在状态机内

pub mod exam_app;
pub mod session_driver;

// 重新导出主要类型
pub use exam_app::App;
pub use session_driver::{DriverTimings, SessionDriver};
