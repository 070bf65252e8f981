//! OCR 错误类型

use thiserror::Error;

#[derive(Error, Debug)]
pub enum OcrError {
    #[error("获取访问令牌失败: {0}")]
    Token(String),

    #[error("请求失败: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("提交分析请求失败，状态码: {0}")]
    SubmitStatus(reqwest::StatusCode),

    #[error("响应缺少 Operation-Location 头")]
    MissingOperationLocation,

    #[error("服务分析失败: {0}")]
    AnalyzeFailed(String),

    #[error("轮询 {0} 次后操作仍未完成")]
    PollTimeout(u32),

    #[error("IO 错误: {0}")]
    Io(#[from] std::io::Error),
}

impl OcrError {
    /// 是否属于可重试的瞬时故障
    pub fn is_transient(&self) -> bool {
        match self {
            OcrError::Transport(e) => e.is_timeout() || e.is_connect(),
            OcrError::SubmitStatus(code) => code.is_server_error(),
            _ => false,
        }
    }
}
