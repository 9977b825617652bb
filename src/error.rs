//! 应用程序错误类型
//!
//! 按领域划分的错误分类：
//! - `Api` - 考试后端 API 调用错误
//! - `Store` - 提交标记持久化错误
//! - `Session` - 考试会话状态机错误
//! - `Config` - 配置错误

use thiserror::Error;

/// 应用程序错误类型
#[derive(Debug, Error)]
pub enum AppError {
    /// API 调用错误
    #[error("API错误: {0}")]
    Api(#[from] ApiError),
    /// 持久化存储错误
    #[error("存储错误: {0}")]
    Store(#[from] StoreError),
    /// 会话状态机错误
    #[error("会话错误: {0}")]
    Session(#[from] SessionError),
    /// 配置错误
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),
    /// 其他错误（用于包装第三方库错误）
    #[error("错误: {0}")]
    Other(String),
}

/// 考试后端 API 调用错误
#[derive(Debug, Error)]
pub enum ApiError {
    /// 鉴权失败（凭证缺失或失效），不应重试
    #[error("鉴权失败: {reason}")]
    AuthFailed { reason: String },
    /// 网络请求失败（瞬时故障，可按策略重试）
    #[error("API请求失败 ({endpoint}): {source}")]
    RequestFailed {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },
    /// API 返回错误响应
    #[error("API返回错误响应 ({endpoint}): code={code:?}, message={message:?}")]
    BadResponse {
        endpoint: String,
        code: Option<u64>,
        message: Option<String>,
    },
    /// 已存在进行中的答卷
    #[error("考试 {exam_id} 已存在进行中的答卷")]
    AlreadyInProgress { exam_id: String },
    /// 提交数据校验失败，重试只会原样重发同一份无效数据
    #[error("提交数据校验失败 ({endpoint}): {message}")]
    ValidationFailed { endpoint: String, message: String },
    /// API 返回空结果
    #[error("API返回空结果: {endpoint}")]
    EmptyResponse { endpoint: String },
    /// JSON 解析失败
    #[error("JSON解析失败: {source}")]
    JsonParseFailed {
        #[source]
        source: serde_json::Error,
    },
}

/// 提交标记持久化错误
#[derive(Debug, Error)]
pub enum StoreError {
    /// 读取状态文件失败
    #[error("读取状态文件失败 ({path}): {source}")]
    ReadFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// 写入状态文件失败
    #[error("写入状态文件失败 ({path}): {source}")]
    WriteFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// 状态文件内容损坏
    #[error("状态文件内容损坏 ({path}): {source}")]
    Corrupted {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// 考试会话状态机错误
#[derive(Debug, Error)]
pub enum SessionError {
    /// 小节数据不完整（缺少 ID 或时长），快速失败而不是猜默认值
    #[error("小节数据不完整: {reason}")]
    MalformedSection { reason: String },
    /// 小节序号回退（同一场答卷内序号必须严格递增）
    #[error("小节序号回退: 已见过 {previous}，却收到 {received}")]
    SequenceRegression { previous: u32, received: u32 },
    /// 小节加载重试次数耗尽
    #[error("小节加载失败，已重试 {attempts} 次: {message}")]
    LoadRetriesExhausted { attempts: u32, message: String },
    /// 成绩获取失败
    #[error("成绩获取失败: {message}")]
    ResultsUnavailable { message: String },
}

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 缺少会话凭证
    #[error("缺少会话凭证，请设置环境变量 {var_name} 后重试")]
    MissingCredential { var_name: String },
}

// ========== 便捷构造函数 ==========

impl AppError {
    /// 创建API请求失败错误
    pub fn api_request_failed(endpoint: impl Into<String>, source: reqwest::Error) -> Self {
        AppError::Api(ApiError::RequestFailed {
            endpoint: endpoint.into(),
            source,
        })
    }

    /// 创建鉴权失败错误
    pub fn auth_failed(reason: impl Into<String>) -> Self {
        AppError::Api(ApiError::AuthFailed {
            reason: reason.into(),
        })
    }

    /// 创建小节数据不完整错误
    pub fn malformed_section(reason: impl Into<String>) -> Self {
        AppError::Session(SessionError::MalformedSection {
            reason: reason.into(),
        })
    }

    /// 是否为鉴权类错误（不重试，直接引导重新登录）
    pub fn is_auth(&self) -> bool {
        matches!(self, AppError::Api(ApiError::AuthFailed { .. }))
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Api(ApiError::JsonParseFailed { source: err })
    }
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;
