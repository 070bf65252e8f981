//! 输出重组
//!
//! 先把（可能已涂黑的）页面图片逐页存为 PNG，再重新打开这些文件，
//! 作为整页图片对象写入一个新的输出 PDF。页面尺寸按渲染 DPI
//! 换算回点（pt）。

use image::RgbImage;
use pdfium_render::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::render;

#[derive(Error, Debug)]
pub enum AssembleError {
    #[error("Pdfium 库不可用: {0}")]
    Pdfium(String),

    #[error("创建输出 PDF 失败: {0}")]
    CreatePdf(String),

    #[error("写入页面 {0} 失败: {1}")]
    WritePage(usize, String),

    #[error("保存 PDF 失败: {0}")]
    SavePdf(String),

    #[error("图片处理失败: {0}")]
    Image(#[from] image::ImageError),

    #[error("IO 错误: {0}")]
    Io(#[from] std::io::Error),
}

/// 脱敏页面的输出文件名（页号 1 起，补零到 4 位）
pub fn redacted_image_name(page_index: usize) -> String {
    format!("page_{:04}_redacted.png", page_index + 1)
}

/// 将每页图片存为 PNG，返回按页序排列的文件路径
pub fn save_redacted_images(
    images: &[RgbImage],
    out_dir: &Path,
) -> Result<Vec<PathBuf>, AssembleError> {
    fs::create_dir_all(out_dir)?;

    let mut out_paths = Vec::with_capacity(images.len());
    for (idx, img) in images.iter().enumerate() {
        let path = out_dir.join(redacted_image_name(idx));
        img.save(&path)?;
        out_paths.push(path);
    }

    log::info!("[Assemble] 已保存 {} 张脱敏图片到 {:?}", out_paths.len(), out_dir);
    Ok(out_paths)
}

/// 页面像素尺寸按渲染 DPI 换算为点（pt）
pub fn page_size_points(width_px: u32, height_px: u32, dpi: u32) -> (f32, f32) {
    let px_to_pt = 72.0 / dpi as f32;
    (width_px as f32 * px_to_pt, height_px as f32 * px_to_pt)
}

/// 把按页序排列的图片文件拼成一个输出 PDF
///
/// 每页创建一个与图片等比的页面，图片经临时 JPEG 作为整页
/// 图片对象写入。输出页数与输入文件数一致；没有输入页时
/// 不写输出文件。
pub fn assemble_pdf(
    image_paths: &[PathBuf],
    output_path: &Path,
    dpi: u32,
) -> Result<(), AssembleError> {
    if image_paths.is_empty() {
        log::warn!("[Assemble] 没有页面图片，跳过输出 PDF");
        return Ok(());
    }

    let pdfium = render::bind_pdfium().map_err(|e| AssembleError::Pdfium(e.to_string()))?;

    let mut document = pdfium
        .create_new_pdf()
        .map_err(|e| AssembleError::CreatePdf(e.to_string()))?;

    for (idx, image_path) in image_paths.iter().enumerate() {
        let img = image::open(image_path)?.to_rgb8();
        let (width_px, height_px) = img.dimensions();

        let (width_pt, height_pt) = page_size_points(width_px, height_px, dpi);
        let page_width = PdfPoints::new(width_pt);
        let page_height = PdfPoints::new(height_pt);

        let mut page = document
            .pages_mut()
            .create_page_at_end(PdfPagePaperSize::Custom(page_width, page_height))
            .map_err(|e| AssembleError::WritePage(idx, e.to_string()))?;

        // pdfium 的图片对象走 JPEG 文件导入
        let temp_path = std::env::temp_dir().join(format!("assemble_page_{}.jpg", idx));
        img.save_with_format(&temp_path, image::ImageFormat::Jpeg)?;

        let mut image_obj = PdfPageImageObject::new_from_jpeg_file(&document, &temp_path)
            .map_err(|e| AssembleError::WritePage(idx, e.to_string()))?;

        image_obj
            .scale(page_width.value, page_height.value)
            .map_err(|e| AssembleError::WritePage(idx, e.to_string()))?;

        page.objects_mut()
            .add_image_object(image_obj)
            .map_err(|e| AssembleError::WritePage(idx, e.to_string()))?;

        let _ = fs::remove_file(&temp_path);
    }

    document
        .save_to_file(output_path)
        .map_err(|e| AssembleError::SavePdf(e.to_string()))?;

    log::info!(
        "[Assemble] 输出 PDF: {:?}（{} 页）",
        output_path,
        image_paths.len()
    );
    Ok(())
}
