//! 远程 OCR 服务的响应类型

use serde::{Deserialize, Serialize};

/// 文档分析操作的轮询响应
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeOperation {
    pub status: String,
    #[serde(default)]
    pub analyze_result: Option<AnalyzeResult>,
    #[serde(default)]
    pub error: Option<OperationError>,
}

/// 服务侧的操作错误详情
#[derive(Debug, Clone, Deserialize)]
pub struct OperationError {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub message: String,
}

/// 一次"read"分析的结果
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeResult {
    #[serde(default)]
    pub pages: Vec<OcrPage>,
}

/// 单页识别结果
///
/// 宽高以服务上报的页面单位表示（`unit`，如 "inch" 或 "pixel"），
/// 与渲染图的像素尺寸无关。
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OcrPage {
    #[serde(default)]
    pub page_number: u32,
    #[serde(default)]
    pub width: f64,
    #[serde(default)]
    pub height: f64,
    #[serde(default)]
    pub unit: String,
    #[serde(default)]
    pub lines: Vec<OcrLine>,
}

/// 识别出的文字行
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OcrLine {
    pub content: String,
    /// 边界四边形，扁平格式 [x1, y1, x2, y2, x3, y3, x4, y4]
    #[serde(default)]
    pub polygon: Vec<f64>,
}

impl OcrLine {
    fn ys(&self) -> impl Iterator<Item = f64> + '_ {
        self.polygon.iter().skip(1).step_by(2).copied()
    }

    /// 多边形各点的最小 y（行顶边）
    pub fn min_y(&self) -> Option<f64> {
        self.ys().reduce(f64::min)
    }

    /// 多边形各点的最大 y（行底边）
    pub fn max_y(&self) -> Option<f64> {
        self.ys().reduce(f64::max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_min_max_y() {
        let line = OcrLine {
            content: "UGI/Party ID: 123".to_string(),
            polygon: vec![1.0, 100.0, 5.0, 100.0, 5.0, 120.0, 1.0, 120.0],
        };
        assert_eq!(line.min_y(), Some(100.0));
        assert_eq!(line.max_y(), Some(120.0));
    }

    #[test]
    fn test_line_empty_polygon() {
        let line = OcrLine {
            content: "x".to_string(),
            polygon: Vec::new(),
        };
        assert_eq!(line.min_y(), None);
        assert_eq!(line.max_y(), None);
    }

    #[test]
    fn test_deserialize_operation_response() {
        let raw = r#"{
            "status": "succeeded",
            "analyzeResult": {
                "pages": [{
                    "pageNumber": 1,
                    "width": 8.5,
                    "height": 11.0,
                    "unit": "inch",
                    "lines": [
                        { "content": "Request Date", "polygon": [0.5, 1.0, 3.0, 1.0, 3.0, 1.2, 0.5, 1.2] }
                    ]
                }]
            }
        }"#;

        let op: AnalyzeOperation = serde_json::from_str(raw).unwrap();
        assert_eq!(op.status, "succeeded");
        let result = op.analyze_result.unwrap();
        assert_eq!(result.pages.len(), 1);
        let page = &result.pages[0];
        assert_eq!(page.page_number, 1);
        assert_eq!(page.unit, "inch");
        assert_eq!(page.lines[0].content, "Request Date");
        assert_eq!(page.lines[0].max_y(), Some(1.2));
    }

    #[test]
    fn test_deserialize_failed_operation() {
        let raw = r#"{
            "status": "failed",
            "error": { "code": "InvalidRequest", "message": "bad image" }
        }"#;

        let op: AnalyzeOperation = serde_json::from_str(raw).unwrap();
        assert_eq!(op.status, "failed");
        assert!(op.analyze_result.is_none());
        assert_eq!(op.error.unwrap().code, "InvalidRequest");
    }
}
