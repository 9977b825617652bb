//! 考试后端 API 客户端
//!
//! 封装所有与考试后端的交互：开始答卷、获取下一小节、提交小节答案、
//! 获取成绩。后端响应统一为 `{ code, message, data }` 信封

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::debug;

use crate::config::Config;
use crate::error::{ApiError, AppError, AppResult};
use crate::models::answers::AnswerPayload;
use crate::models::attempt::StartAttemptPayload;
use crate::models::results::ExamResults;
use crate::models::section::NextSectionPayload;

/// "获取下一小节"的两种正常结果
#[derive(Debug)]
pub enum NextSectionOutcome {
    /// 还有未作答的小节
    Section(Box<NextSectionPayload>),
    /// 没有更多小节（完成信号，不是错误）
    NoMoreSections,
}

/// 考试后端接口
///
/// 会话控制器只依赖该 trait，网络实现与测试桩都在其后
#[async_trait]
pub trait ExamBackend: Send + Sync {
    /// 开始一场答卷
    async fn start_attempt(&self, exam_id: &str) -> AppResult<StartAttemptPayload>;

    /// 获取下一个未作答的小节及其题目
    async fn next_section(&self, attempt_id: &str) -> AppResult<NextSectionOutcome>;

    /// 提交一个小节的答案
    async fn submit_section(
        &self,
        attempt_id: &str,
        section_id: &str,
        answers: &[AnswerPayload],
    ) -> AppResult<()>;

    /// 获取最终成绩
    async fn fetch_results(&self, attempt_id: &str) -> AppResult<ExamResults>;
}

/// API 响应信封
#[derive(Debug, Deserialize)]
struct ApiEnvelope {
    code: u64,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    data: Value,
}

/// 考试后端 API 客户端（reqwest 实现）
pub struct ExamClient {
    http: reqwest::Client,
    base_url: String,
    token: String,
}

impl ExamClient {
    /// 创建新的考试后端客户端
    pub fn new(config: &Config) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: config.backend_base_url.trim_end_matches('/').to_string(),
            token: config.auth_token.clone(),
        }
    }

    /// 发起 POST 请求并解析响应信封
    ///
    /// # 参数
    /// - `endpoint`: 接口路径（相对 base_url）
    /// - `body`: 请求体
    ///
    /// # 返回
    /// 返回响应信封；HTTP 401/403 直接映射为鉴权错误
    async fn post_api(&self, endpoint: &str, body: &impl Serialize) -> AppResult<ApiEnvelope> {
        let url = format!("{}/{}", self.base_url, endpoint);

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.token)
            .json(body)
            .send()
            .await
            .map_err(|source| AppError::api_request_failed(endpoint, source))?;

        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN
        {
            return Err(AppError::auth_failed(format!(
                "后端返回 {}，凭证已失效",
                status.as_u16()
            )));
        }

        let envelope: ApiEnvelope = response
            .json()
            .await
            .map_err(|source| AppError::api_request_failed(endpoint, source))?;

        debug!("API {} 响应 code={}", endpoint, envelope.code);

        Ok(envelope)
    }

    /// 解析信封中的 data 字段
    fn extract_data<T: DeserializeOwned>(endpoint: &str, envelope: ApiEnvelope) -> AppResult<T> {
        if envelope.data.is_null() {
            return Err(AppError::Api(ApiError::EmptyResponse {
                endpoint: endpoint.to_string(),
            }));
        }
        let data = serde_json::from_value(envelope.data)?;
        Ok(data)
    }

    fn bad_response(endpoint: &str, envelope: &ApiEnvelope) -> AppError {
        AppError::Api(ApiError::BadResponse {
            endpoint: endpoint.to_string(),
            code: Some(envelope.code),
            message: envelope.message.clone(),
        })
    }
}

#[async_trait]
impl ExamBackend for ExamClient {
    async fn start_attempt(&self, exam_id: &str) -> AppResult<StartAttemptPayload> {
        // 没有会话凭证时本地直接失败，不发网络请求
        if self.token.trim().is_empty() {
            return Err(AppError::auth_failed("未设置会话凭证 EXAM_AUTH_TOKEN"));
        }

        let endpoint = "api/attempt/start";
        let envelope = self
            .post_api(endpoint, &json!({ "examId": exam_id }))
            .await?;

        match envelope.code {
            200 => Self::extract_data(endpoint, envelope),
            409 => Err(AppError::Api(ApiError::AlreadyInProgress {
                exam_id: exam_id.to_string(),
            })),
            401 | 403 => Err(AppError::auth_failed(
                envelope.message.unwrap_or_else(|| "凭证无效".to_string()),
            )),
            _ => Err(Self::bad_response(endpoint, &envelope)),
        }
    }

    async fn next_section(&self, attempt_id: &str) -> AppResult<NextSectionOutcome> {
        let endpoint = "api/attempt/next-section";
        let envelope = self
            .post_api(endpoint, &json!({ "attemptId": attempt_id }))
            .await?;

        match envelope.code {
            200 => {
                let payload: NextSectionPayload = Self::extract_data(endpoint, envelope)?;
                Ok(NextSectionOutcome::Section(Box::new(payload)))
            }
            // 404 是"没有更多小节"的完成信号
            404 => Ok(NextSectionOutcome::NoMoreSections),
            401 | 403 => Err(AppError::auth_failed(
                envelope.message.unwrap_or_else(|| "凭证无效".to_string()),
            )),
            _ => Err(Self::bad_response(endpoint, &envelope)),
        }
    }

    async fn submit_section(
        &self,
        attempt_id: &str,
        section_id: &str,
        answers: &[AnswerPayload],
    ) -> AppResult<()> {
        let endpoint = "api/attempt/submit-section";
        let envelope = self
            .post_api(
                endpoint,
                &json!({
                    "attemptId": attempt_id,
                    "sectionId": section_id,
                    "answers": answers,
                }),
            )
            .await?;

        match envelope.code {
            200 => Ok(()),
            422 => Err(AppError::Api(ApiError::ValidationFailed {
                endpoint: endpoint.to_string(),
                message: envelope
                    .message
                    .unwrap_or_else(|| "答案数据格式不合法".to_string()),
            })),
            401 | 403 => Err(AppError::auth_failed(
                envelope.message.unwrap_or_else(|| "凭证无效".to_string()),
            )),
            _ => Err(Self::bad_response(endpoint, &envelope)),
        }
    }

    async fn fetch_results(&self, attempt_id: &str) -> AppResult<ExamResults> {
        let endpoint = "api/attempt/results";
        let envelope = self
            .post_api(endpoint, &json!({ "attemptId": attempt_id }))
            .await?;

        match envelope.code {
            200 => Self::extract_data(endpoint, envelope),
            _ => Err(Self::bad_response(endpoint, &envelope)),
        }
    }
}
