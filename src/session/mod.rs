//! 考试会话层 - 流程层
//!
//! 定义"一场答卷"的状态机：状态、事件、效果与转移函数。
//!
//! 状态机是同步、纯逻辑的：一次处理一个事件，返回需要执行的
//! 效果列表，不直接做网络 IO、不依赖计时器实现，因而可以在
//! 不起异步运行时的情况下单元测试全部竞态场景

pub mod ctx;
pub mod event;
pub mod machine;
pub mod state;

pub use ctx::SectionCtx;
pub use event::{Effect, SessionEvent, SubmitFailureKind, SubmitTrigger};
pub use machine::SessionMachine;
pub use state::SessionState;
