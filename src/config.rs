/// 程序配置文件
#[derive(Clone, Debug)]
pub struct Config {
    /// 考试后端 API 地址
    pub backend_base_url: String,
    /// 会话凭证（Bearer Token）
    pub auth_token: String,
    /// 答题方案 TOML 文件路径
    pub answer_plan_file: String,
    /// 提交标记持久化目录（跨进程重启保留）
    pub state_dir: String,
    /// 提交失败后的自动重试延迟（秒）
    pub retry_delay_secs: u64,
    /// 兜底超时（秒）：提交与重试都未决议时强制推进
    pub safety_timeout_secs: u64,
    /// 小节加载最大重试次数
    pub max_load_retries: u32,
    /// 是否显示详细日志
    pub verbose_logging: bool,
    /// 输出日志文件
    pub output_log_file: String,
    /// 安排不了的小节写入的兜底文件
    pub unresolved_file: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backend_base_url: "https://exam-api.example.cn".to_string(),
            auth_token: String::new(),
            answer_plan_file: "answer_plan.toml".to_string(),
            state_dir: ".exam_state".to_string(),
            retry_delay_secs: 3,
            safety_timeout_secs: 30,
            max_load_retries: 3,
            verbose_logging: false,
            output_log_file: "output.txt".to_string(),
            unresolved_file: "unresolved.txt".to_string(),
        }
    }
}

impl Config {
    /// 校验必填配置：凭证缺失时在发起任何网络请求之前失败
    pub fn validate(&self) -> Result<(), crate::error::ConfigError> {
        if self.auth_token.trim().is_empty() {
            return Err(crate::error::ConfigError::MissingCredential {
                var_name: "EXAM_AUTH_TOKEN".to_string(),
            });
        }
        Ok(())
    }

    pub fn from_env() -> Self {
        let default = Self::default();
        Self {
            backend_base_url: std::env::var("EXAM_API_BASE_URL").unwrap_or(default.backend_base_url),
            auth_token: std::env::var("EXAM_AUTH_TOKEN").unwrap_or(default.auth_token),
            answer_plan_file: std::env::var("ANSWER_PLAN_FILE").unwrap_or(default.answer_plan_file),
            state_dir: std::env::var("EXAM_STATE_DIR").unwrap_or(default.state_dir),
            retry_delay_secs: std::env::var("SUBMIT_RETRY_DELAY_SECS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.retry_delay_secs),
            safety_timeout_secs: std::env::var("SUBMIT_SAFETY_TIMEOUT_SECS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.safety_timeout_secs),
            max_load_retries: std::env::var("MAX_LOAD_RETRIES").ok().and_then(|v| v.parse().ok()).unwrap_or(default.max_load_retries),
            verbose_logging: std::env::var("VERBOSE_LOGGING").ok().and_then(|v| v.parse().ok()).unwrap_or(default.verbose_logging),
            output_log_file: std::env::var("OUTPUT_LOG_FILE").unwrap_or(default.output_log_file),
            unresolved_file: std::env::var("UNRESOLVED_FILE").unwrap_or(default.unresolved_file),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_credential_fails_validation() {
        let mut config = Config::default();
        assert!(config.validate().is_err());

        config.auth_token = "token-123".to_string();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn default_timings_are_bounded() {
        let config = Config::default();
        // 重试延迟应在数秒级，兜底超时在数十秒级
        assert!(config.retry_delay_secs >= 1 && config.retry_delay_secs <= 10);
        assert!(config.safety_timeout_secs >= 10 && config.safety_timeout_secs <= 120);
        assert!(config.safety_timeout_secs > config.retry_delay_secs);
    }
}
