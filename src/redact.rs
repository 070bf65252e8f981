//! 坐标映射与条带涂黑
//!
//! OCR 返回的 y 坐标以页面单位（英寸或像素）表示，先按渲染图高度
//! 与 OCR 页面高度的比例换算为像素行，再对整行宽度的条带填充纯色。

use image::{Rgb, RgbImage};
use imageproc::drawing::draw_filled_rect_mut;
use imageproc::rect::Rect;

/// 默认涂黑颜色
pub const BLACK: Rgb<u8> = Rgb([0u8, 0u8, 0u8]);

/// 将页面单位的 y 坐标换算为渲染图的像素行
///
/// 取整到最近的行，半值取偶（四舍六入五成双）。
/// `ocr_h` 为 0 或负数时按 1.0 比例处理（页面单位即像素）。
pub fn y_to_px(y: f64, img_h: u32, ocr_h: f64) -> i64 {
    let scale = if ocr_h > 0.0 {
        img_h as f64 / ocr_h
    } else {
        1.0
    };
    (y * scale).round_ties_even() as i64
}

/// 在图片上涂黑一个整宽条带
///
/// 两个行号不要求有序，先归一化为 (min, max) 再裁剪到图片范围内；
/// 裁剪后跨度不为正时不做任何绘制。原地修改图片。
pub fn redact_band(img: &mut RgbImage, row_a: i64, row_b: i64, color: Rgb<u8>) {
    let y0 = row_a.min(row_b).max(0);
    let y1 = row_a.max(row_b).min(img.height() as i64);
    if y1 <= y0 {
        return;
    }

    let rect = Rect::at(0, y0 as i32).of_size(img.width(), (y1 - y0) as u32);
    draw_filled_rect_mut(img, rect, color);
}
