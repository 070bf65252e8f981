//! 页面渲染
//!
//! 基于 pdfium-render 将 PDF 每页栅格化为 PNG 图片，
//! 渲染比例为 `dpi / 72`。

use pdfium_render::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Pdfium 库不可用: {0}")]
    PdfiumUnavailable(String),

    #[error("加载 PDF 失败: {0}")]
    LoadPdf(String),

    #[error("渲染页面 {0} 失败: {1}")]
    RenderPage(u16, String),

    #[error("保存图片失败: {0}")]
    SaveImage(#[from] image::ImageError),

    #[error("IO 错误: {0}")]
    Io(#[from] std::io::Error),
}

/// pdfium 动态库搜索路径
fn pdfium_search_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();

    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            paths.push(exe_dir.join("libs"));
            paths.push(exe_dir.to_path_buf());
        }
    }

    paths.push(PathBuf::from("libs"));
    paths.push(PathBuf::from("./"));

    paths
}

/// 绑定 pdfium 库，依次尝试各搜索路径，最后回退到系统库
pub fn bind_pdfium() -> Result<Pdfium, RenderError> {
    for path in &pdfium_search_paths() {
        let lib_path = Pdfium::pdfium_platform_library_name_at_path(path);
        log::debug!("[Render] 尝试加载 pdfium: {:?}", lib_path);

        if let Ok(bindings) = Pdfium::bind_to_library(&lib_path) {
            log::info!("[Render] 成功从 {:?} 加载 pdfium", path);
            return Ok(Pdfium::new(bindings));
        }
    }

    log::debug!("[Render] 尝试加载系统 pdfium 库");
    Pdfium::bind_to_system_library()
        .map(Pdfium::new)
        .map_err(|e| RenderError::PdfiumUnavailable(e.to_string()))
}

/// 渲染页面的输出文件名（页号 1 起，补零到 4 位）
pub fn page_image_name(page_index: u16) -> String {
    format!("page_{:04}.png", page_index as u32 + 1)
}

/// 将 PDF 的每一页渲染为 PNG，返回按页序排列的输出路径
pub fn render_pdf_to_images(
    pdf_path: &Path,
    out_dir: &Path,
    dpi: u32,
) -> Result<Vec<PathBuf>, RenderError> {
    fs::create_dir_all(out_dir)?;

    let pdfium = bind_pdfium()?;
    let document = pdfium
        .load_pdf_from_file(pdf_path, None)
        .map_err(|e| RenderError::LoadPdf(e.to_string()))?;

    let page_count = document.pages().len();
    let scale = dpi as f32 / 72.0;
    let mut image_paths = Vec::with_capacity(page_count as usize);

    for page_idx in 0..page_count {
        let page = document
            .pages()
            .get(page_idx)
            .map_err(|e| RenderError::RenderPage(page_idx, e.to_string()))?;

        let target_width = (page.width().value * scale) as i32;
        let target_height = (page.height().value * scale) as i32;

        log::info!(
            "[Render] 页面 {}: {}x{} pt -> {}x{} px (DPI: {})",
            page_idx,
            page.width().value,
            page.height().value,
            target_width,
            target_height,
            dpi
        );

        let render_config = PdfRenderConfig::new()
            .set_target_width(target_width)
            .set_target_height(target_height);

        let bitmap = page
            .render_with_config(&render_config)
            .map_err(|e| RenderError::RenderPage(page_idx, e.to_string()))?;

        let img_path = out_dir.join(page_image_name(page_idx));
        bitmap.as_image().to_rgb8().save(&img_path)?;
        image_paths.push(img_path);
    }

    log::info!("[Render] 渲染完成，共 {} 页", image_paths.len());
    Ok(image_paths)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_image_name_is_one_based_and_padded() {
        assert_eq!(page_image_name(0), "page_0001.png");
        assert_eq!(page_image_name(9), "page_0010.png");
        assert_eq!(page_image_name(122), "page_0123.png");
    }
}
