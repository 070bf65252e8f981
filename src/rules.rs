//! 条带脱敏规则
//!
//! 每条规则描述一个页面上的一个纵向条带：起止各由一个锚点文本
//! 和取边方式（行顶边/行底边）确定。规则彼此独立应用。

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::ocr::OcrPage;

#[derive(Error, Debug)]
pub enum RuleError {
    #[error("页面 {page_index} 上未找到锚点文本 \"{marker}\"")]
    AnchorNotFound { marker: String, page_index: usize },

    #[error("规则引用的页面索引 {page_index} 超出文档页数 {page_count}")]
    PageOutOfRange {
        page_index: usize,
        page_count: usize,
    },

    #[error("锚点行缺少多边形坐标: \"{marker}\"")]
    EmptyPolygon { marker: String },
}

/// 锚点取边方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Edge {
    /// 取多边形最小 y（行顶边）
    Top,
    /// 取多边形最大 y（行底边）
    Bottom,
}

/// 锚点：待查找的子串加取边方式
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnchorSpec {
    pub marker: String,
    pub edge: Edge,
}

/// 单条条带规则
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BandRule {
    /// 目标页索引（0 起）
    pub page_index: usize,
    pub start: AnchorSpec,
    pub end: AnchorSpec,
}

/// 规则集合，可从 JSON 加载
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BandRuleSet {
    pub rules: Vec<BandRule>,
}

impl Default for BandRuleSet {
    /// 内置规则：复现固定两页版式的客户信息条带
    fn default() -> Self {
        Self {
            rules: vec![
                BandRule {
                    page_index: 2,
                    start: AnchorSpec {
                        marker: "UGI/Party ID".to_string(),
                        edge: Edge::Top,
                    },
                    end: AnchorSpec {
                        marker: "GCMS/S".to_string(),
                        edge: Edge::Top,
                    },
                },
                BandRule {
                    page_index: 3,
                    start: AnchorSpec {
                        marker: "Request Date".to_string(),
                        edge: Edge::Bottom,
                    },
                    end: AnchorSpec {
                        marker: "PARTY DETAILS".to_string(),
                        edge: Edge::Top,
                    },
                },
            ],
        }
    }
}

/// 在页面识别行中定位锚点的 y 坐标
///
/// 按文档行序做大小写敏感的子串匹配，取第一个命中的行；
/// 未命中返回 `AnchorNotFound`。
pub fn locate_anchor(
    page: &OcrPage,
    spec: &AnchorSpec,
    page_index: usize,
) -> Result<f64, RuleError> {
    for line in &page.lines {
        if line.content.contains(&spec.marker) {
            let y = match spec.edge {
                Edge::Top => line.min_y(),
                Edge::Bottom => line.max_y(),
            };
            return y.ok_or_else(|| RuleError::EmptyPolygon {
                marker: spec.marker.clone(),
            });
        }
    }

    Err(RuleError::AnchorNotFound {
        marker: spec.marker.clone(),
        page_index,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ocr::OcrLine;

    fn line(content: &str, y_top: f64, y_bottom: f64) -> OcrLine {
        OcrLine {
            content: content.to_string(),
            polygon: vec![0.0, y_top, 5.0, y_top, 5.0, y_bottom, 0.0, y_bottom],
        }
    }

    fn page(lines: Vec<OcrLine>) -> OcrPage {
        OcrPage {
            page_number: 1,
            width: 8.5,
            height: 11.0,
            unit: "inch".to_string(),
            lines,
        }
    }

    fn anchor(marker: &str, edge: Edge) -> AnchorSpec {
        AnchorSpec {
            marker: marker.to_string(),
            edge,
        }
    }

    #[test]
    fn test_locate_anchor_top_and_bottom_edges() {
        let p = page(vec![
            line("Request Date: 2024-01-01", 1.0, 1.2),
            line("PARTY DETAILS", 3.0, 3.2),
        ]);

        let y = locate_anchor(&p, &anchor("Request Date", Edge::Bottom), 0).unwrap();
        assert_eq!(y, 1.2);

        let y = locate_anchor(&p, &anchor("PARTY DETAILS", Edge::Top), 0).unwrap();
        assert_eq!(y, 3.0);
    }

    #[test]
    fn test_locate_anchor_first_match_wins() {
        let p = page(vec![
            line("GCMS/S first", 2.0, 2.2),
            line("GCMS/S second", 6.0, 6.2),
        ]);

        let y = locate_anchor(&p, &anchor("GCMS/S", Edge::Top), 0).unwrap();
        assert_eq!(y, 2.0);
    }

    #[test]
    fn test_locate_anchor_is_case_sensitive() {
        let p = page(vec![line("party details", 1.0, 1.2)]);
        let err = locate_anchor(&p, &anchor("PARTY DETAILS", Edge::Top), 4).unwrap_err();
        assert!(matches!(
            err,
            RuleError::AnchorNotFound { page_index: 4, .. }
        ));
    }

    #[test]
    fn test_locate_anchor_missing_is_error() {
        let p = page(vec![line("nothing to see", 1.0, 1.2)]);
        let err = locate_anchor(&p, &anchor("UGI/Party ID", Edge::Top), 2).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("UGI/Party ID"));
        assert!(message.contains('2'));
    }

    #[test]
    fn test_locate_anchor_empty_polygon() {
        let p = page(vec![OcrLine {
            content: "UGI/Party ID: 9".to_string(),
            polygon: Vec::new(),
        }]);
        let err = locate_anchor(&p, &anchor("UGI/Party ID", Edge::Top), 0).unwrap_err();
        assert!(matches!(err, RuleError::EmptyPolygon { .. }));
    }

    #[test]
    fn test_default_rule_set_matches_fixed_layout() {
        let set = BandRuleSet::default();
        assert_eq!(set.rules.len(), 2);

        let first = &set.rules[0];
        assert_eq!(first.page_index, 2);
        assert_eq!(first.start.marker, "UGI/Party ID");
        assert_eq!(first.start.edge, Edge::Top);
        assert_eq!(first.end.marker, "GCMS/S");
        assert_eq!(first.end.edge, Edge::Top);

        let second = &set.rules[1];
        assert_eq!(second.page_index, 3);
        assert_eq!(second.start.marker, "Request Date");
        assert_eq!(second.start.edge, Edge::Bottom);
        assert_eq!(second.end.marker, "PARTY DETAILS");
        assert_eq!(second.end.edge, Edge::Top);
    }

    #[test]
    fn test_rule_set_round_trips_through_json() {
        let raw = r#"{
            "rules": [{
                "pageIndex": 0,
                "start": { "marker": "HEADER", "edge": "bottom" },
                "end": { "marker": "FOOTER", "edge": "top" }
            }]
        }"#;

        let set: BandRuleSet = serde_json::from_str(raw).unwrap();
        assert_eq!(set.rules[0].page_index, 0);
        assert_eq!(set.rules[0].start.edge, Edge::Bottom);
        assert_eq!(set.rules[0].end.edge, Edge::Top);
    }
}
