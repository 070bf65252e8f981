//! 基于锚点文本的 PDF 整行脱敏工具
//!
//! 流水线：渲染页面 → 远程 OCR → 锚点定位 → 坐标映射 → 涂黑条带 → 重组 PDF

pub mod assemble;
pub mod config;
pub mod ocr;
pub mod pipeline;
pub mod redact;
pub mod render;
pub mod rules;

pub use config::RedactConfig;
pub use pipeline::PipelineContext;
pub use rules::{AnchorSpec, BandRule, BandRuleSet, Edge};

pub type Result<T> = std::result::Result<T, RedactError>;

/// 流水线顶层错误
#[derive(Debug, thiserror::Error)]
pub enum RedactError {
    #[error("渲染失败: {0}")]
    Render(#[from] render::RenderError),

    #[error("OCR 失败: {0}")]
    Ocr(#[from] ocr::OcrError),

    #[error("规则应用失败: {0}")]
    Rule(#[from] rules::RuleError),

    #[error("重组 PDF 失败: {0}")]
    Assemble(#[from] assemble::AssembleError),

    #[error("图片处理失败: {0}")]
    Image(#[from] image::ImageError),
}
