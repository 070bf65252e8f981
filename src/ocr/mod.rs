//! 远程 OCR 客户端
//!
//! 调用文档智能服务的 prebuilt-read 模型：提交页面图片字节，
//! 轮询 Operation-Location 直到分析完成。凭据走 OAuth2
//! 客户端凭据流，令牌在进程内缓存、临近过期时刷新。

mod error;
mod types;

pub use error::OcrError;
pub use types::{AnalyzeOperation, AnalyzeResult, OcrLine, OcrPage, OperationError};

use std::fs;
use std::path::Path;
use std::thread;
use std::time::{Duration, Instant};

use reqwest::header::CONTENT_TYPE;
use serde::Deserialize;

use crate::config::OcrServiceConfig;

const API_VERSION: &str = "2023-07-31";
const TOKEN_SCOPE: &str = "https://cognitiveservices.azure.com/.default";
const POLL_INTERVAL: Duration = Duration::from_secs(1);
const RETRY_BACKOFF: Duration = Duration::from_secs(2);
/// 刷新提前量，避免请求途中令牌过期
const TOKEN_REFRESH_MARGIN: Duration = Duration::from_secs(60);

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: u64,
}

struct CachedToken {
    value: String,
    expires_at: Instant,
}

/// prebuilt-read OCR 客户端（阻塞式）
pub struct ReadOcrClient {
    http: reqwest::blocking::Client,
    config: OcrServiceConfig,
    token: Option<CachedToken>,
}

impl ReadOcrClient {
    pub fn new(config: OcrServiceConfig) -> Result<Self, OcrError> {
        let http = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            config,
            token: None,
        })
    }

    /// 分析一张页面图片，带有界重试
    pub fn analyze_read(&mut self, image_path: &Path) -> Result<AnalyzeResult, OcrError> {
        let mut attempt = 0u32;
        loop {
            match self.analyze_once(image_path) {
                Ok(result) => return Ok(result),
                Err(err) if err.is_transient() && attempt < self.config.max_retries => {
                    attempt += 1;
                    log::warn!(
                        "[OCR] 第 {} 次重试 {:?}: {}",
                        attempt,
                        image_path.file_name().unwrap_or_default(),
                        err
                    );
                    thread::sleep(RETRY_BACKOFF);
                }
                Err(err) => return Err(err),
            }
        }
    }

    fn analyze_once(&mut self, image_path: &Path) -> Result<AnalyzeResult, OcrError> {
        let bytes = fs::read(image_path)?;
        let token = self.bearer_token()?;

        let url = format!(
            "{}/formrecognizer/documentModels/prebuilt-read:analyze?api-version={}",
            self.config.endpoint.trim_end_matches('/'),
            API_VERSION
        );

        log::debug!("[OCR] 提交分析: {:?} ({} 字节)", image_path, bytes.len());

        let response = self
            .http
            .post(&url)
            .bearer_auth(&token)
            .header(CONTENT_TYPE, "application/octet-stream")
            .body(bytes)
            .send()?;

        let status = response.status();
        if !status.is_success() {
            return Err(OcrError::SubmitStatus(status));
        }

        let operation_url = response
            .headers()
            .get("operation-location")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
            .ok_or(OcrError::MissingOperationLocation)?;

        self.poll_operation(&operation_url, &token)
    }

    fn poll_operation(&self, url: &str, token: &str) -> Result<AnalyzeResult, OcrError> {
        for _ in 0..self.config.poll_attempts {
            thread::sleep(POLL_INTERVAL);

            let operation: AnalyzeOperation = self
                .http
                .get(url)
                .bearer_auth(token)
                .send()?
                .error_for_status()?
                .json()?;

            match operation.status.as_str() {
                "succeeded" => {
                    return operation
                        .analyze_result
                        .ok_or_else(|| OcrError::AnalyzeFailed("响应缺少 analyzeResult".to_string()));
                }
                "failed" => {
                    let detail = operation
                        .error
                        .map(|e| format!("{}: {}", e.code, e.message))
                        .unwrap_or_else(|| "未知错误".to_string());
                    return Err(OcrError::AnalyzeFailed(detail));
                }
                other => {
                    log::debug!("[OCR] 操作状态: {}", other);
                }
            }
        }

        Err(OcrError::PollTimeout(self.config.poll_attempts))
    }

    fn bearer_token(&mut self) -> Result<String, OcrError> {
        let expired = match &self.token {
            Some(cached) => Instant::now() + TOKEN_REFRESH_MARGIN >= cached.expires_at,
            None => true,
        };

        if expired {
            self.token = Some(self.request_token()?);
        }

        Ok(self.token.as_ref().map(|t| t.value.clone()).unwrap_or_default())
    }

    fn request_token(&self) -> Result<CachedToken, OcrError> {
        let url = format!(
            "https://login.microsoftonline.com/{}/oauth2/v2.0/token",
            self.config.tenant_id
        );

        log::debug!("[OCR] 请求访问令牌");

        let params = [
            ("grant_type", "client_credentials"),
            ("client_id", self.config.client_id.as_str()),
            ("client_secret", self.config.client_secret.as_str()),
            ("scope", TOKEN_SCOPE),
        ];

        let response = self.http.post(&url).form(&params).send()?;
        let status = response.status();
        if !status.is_success() {
            return Err(OcrError::Token(format!("状态码 {}", status)));
        }

        let token: TokenResponse = response.json()?;
        Ok(CachedToken {
            value: token.access_token,
            expires_at: Instant::now() + Duration::from_secs(token.expires_in),
        })
    }
}
