//! 运行配置
//!
//! 服务凭据从环境变量读取；其余参数来自可选的 JSON 配置文件，
//! 再被命令行参数覆盖。

use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use crate::rules::BandRuleSet;

pub const DEFAULT_DPI: u32 = 200;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// OCR 服务设置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct OcrServiceConfig {
    /// 服务端点，如 https://xxx.cognitiveservices.azure.com
    pub endpoint: String,
    pub tenant_id: String,
    pub client_id: String,
    pub client_secret: String,
    /// 单次 HTTP 请求超时（秒）
    pub timeout_secs: u64,
    /// 轮询次数上限（间隔 1 秒）
    pub poll_attempts: u32,
    /// 每页瞬时故障的重试次数上限
    pub max_retries: u32,
}

impl Default for OcrServiceConfig {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            tenant_id: String::new(),
            client_id: String::new(),
            client_secret: String::new(),
            timeout_secs: 30,
            poll_attempts: 60,
            max_retries: 2,
        }
    }
}

impl OcrServiceConfig {
    /// 用环境变量覆盖凭据字段
    pub fn apply_env(&mut self) {
        if let Ok(v) = env::var("AZURE_DI_ENDPOINT") {
            self.endpoint = v;
        }
        if let Ok(v) = env::var("AZURE_TENANT_ID") {
            self.tenant_id = v;
        }
        if let Ok(v) = env::var("AZURE_CLIENT_ID") {
            self.client_id = v;
        }
        if let Ok(v) = env::var("AZURE_CLIENT_SECRET") {
            self.client_secret = v;
        }
    }
}

/// JSON 配置文件内容
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default, rename_all = "camelCase")]
pub struct FileConfig {
    pub out_dir: Option<String>,
    pub dpi: Option<u32>,
    pub rules: Option<BandRuleSet>,
    pub ocr: Option<OcrServiceConfig>,
}

pub fn load_file_config(path: &Path) -> Result<FileConfig, ConfigError> {
    let raw = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&raw)?)
}

pub fn load_rule_file(path: &Path) -> Result<BandRuleSet, ConfigError> {
    let raw = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&raw)?)
}

/// 一次脱敏运行的完整配置
#[derive(Debug, Clone)]
pub struct RedactConfig {
    pub input_path: PathBuf,
    pub out_dir: PathBuf,
    pub dpi: u32,
    pub rules: BandRuleSet,
    pub ocr: OcrServiceConfig,
}

impl RedactConfig {
    pub fn new(input_path: PathBuf) -> Self {
        Self {
            input_path,
            out_dir: PathBuf::from("output"),
            dpi: DEFAULT_DPI,
            rules: BandRuleSet::default(),
            ocr: OcrServiceConfig::default(),
        }
    }

    /// 渲染页面目录：`<out_dir>/pages`
    pub fn pages_dir(&self) -> PathBuf {
        self.out_dir.join("pages")
    }

    /// 脱敏页面目录：`<out_dir>/redacted`
    pub fn redacted_dir(&self) -> PathBuf {
        self.out_dir.join("redacted")
    }

    /// 输出 PDF 路径：`<out_dir>/redacted_output.pdf`
    pub fn output_pdf_path(&self) -> PathBuf {
        self.out_dir.join("redacted_output.pdf")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_ocr_config_defaults() {
        let config = OcrServiceConfig::default();
        assert_eq!(config.timeout_secs, 30);
        assert_eq!(config.poll_attempts, 60);
        assert_eq!(config.max_retries, 2);
        assert!(config.endpoint.is_empty());
    }

    #[test]
    fn test_output_layout_paths() {
        let config = RedactConfig::new(PathBuf::from("in.pdf"));
        assert_eq!(config.pages_dir(), PathBuf::from("output/pages"));
        assert_eq!(config.redacted_dir(), PathBuf::from("output/redacted"));
        assert_eq!(
            config.output_pdf_path(),
            PathBuf::from("output/redacted_output.pdf")
        );
    }

    #[test]
    fn test_load_file_config() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{
                "dpi": 150,
                "outDir": "out",
                "ocr": {{ "endpoint": "https://example.test", "timeoutSecs": 10 }}
            }}"#
        )
        .unwrap();

        let config = load_file_config(file.path()).unwrap();
        assert_eq!(config.dpi, Some(150));
        assert_eq!(config.out_dir.as_deref(), Some("out"));

        let ocr = config.ocr.unwrap();
        assert_eq!(ocr.endpoint, "https://example.test");
        assert_eq!(ocr.timeout_secs, 10);
        // 未出现的字段取默认值
        assert_eq!(ocr.poll_attempts, 60);
    }
}
