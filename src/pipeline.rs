//! 脱敏流水线
//!
//! 渲染 → OCR → 规则应用（锚点定位、坐标映射、涂黑）→ 存图 → 重组 PDF。
//! 全程单线程顺序执行，页面顺序即输出顺序；任一阶段出错即终止。

use image::RgbImage;
use std::path::PathBuf;

use crate::config::RedactConfig;
use crate::ocr::{AnalyzeResult, ReadOcrClient};
use crate::redact;
use crate::rules::{self, BandRule, RuleError};
use crate::{assemble, render, RedactError, Result};

/// 流水线上下文：各阶段共享的中间产物
pub struct PipelineContext {
    /// 渲染出的页面图片路径（页序）
    pub page_paths: Vec<PathBuf>,
    /// 内存中的页面图片，规则应用阶段原地修改
    pub images: Vec<RgbImage>,
    /// 每页一个识别结果，与 `images` 同序
    pub ocr_results: Vec<AnalyzeResult>,
    /// 已计算出的条带 (页索引, 起始行, 结束行)
    pub bands: Vec<(usize, i64, i64)>,
}

/// 执行完整流水线，返回输出 PDF 路径
pub fn run(config: &RedactConfig) -> Result<PathBuf> {
    let page_paths = render::render_pdf_to_images(&config.input_path, &config.pages_dir(), config.dpi)?;

    let mut client = ReadOcrClient::new(config.ocr.clone())?;
    let mut ocr_results = Vec::with_capacity(page_paths.len());
    for (idx, path) in page_paths.iter().enumerate() {
        log::info!("[Pipeline] OCR 第 {}/{} 页", idx + 1, page_paths.len());
        ocr_results.push(client.analyze_read(path)?);
    }

    let mut images = Vec::with_capacity(page_paths.len());
    for path in &page_paths {
        images.push(image::open(path)?.to_rgb8());
    }

    let mut ctx = PipelineContext {
        page_paths,
        images,
        ocr_results,
        bands: Vec::new(),
    };

    for rule in &config.rules.rules {
        apply_rule(&mut ctx, rule)?;
    }

    let saved = assemble::save_redacted_images(&ctx.images, &config.redacted_dir())?;
    let output_pdf = config.output_pdf_path();
    assemble::assemble_pdf(&saved, &output_pdf, config.dpi)?;

    Ok(output_pdf)
}

/// 应用一条条带规则：定位起止锚点、换算像素行、涂黑
fn apply_rule(ctx: &mut PipelineContext, rule: &BandRule) -> Result<()> {
    let page_count = ctx.images.len();
    let page = ctx
        .ocr_results
        .get(rule.page_index)
        .and_then(|result| result.pages.first())
        .ok_or(RuleError::PageOutOfRange {
            page_index: rule.page_index,
            page_count,
        })?;

    let y_start = rules::locate_anchor(page, &rule.start, rule.page_index)?;
    let y_end = rules::locate_anchor(page, &rule.end, rule.page_index)?;
    let ocr_height = page.height;

    let img = ctx
        .images
        .get_mut(rule.page_index)
        .ok_or(RedactError::Rule(RuleError::PageOutOfRange {
            page_index: rule.page_index,
            page_count,
        }))?;

    let row_start = redact::y_to_px(y_start, img.height(), ocr_height);
    let row_end = redact::y_to_px(y_end, img.height(), ocr_height);

    log::info!(
        "[Pipeline] 页面 {} 条带 [{}, {})（y {} -> {}，页面高 {}）",
        rule.page_index,
        row_start.min(row_end),
        row_start.max(row_end),
        y_start,
        y_end,
        ocr_height
    );

    redact::redact_band(img, row_start, row_end, redact::BLACK);
    ctx.bands.push((rule.page_index, row_start, row_end));

    Ok(())
}
