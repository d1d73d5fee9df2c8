//! Per-family attribute conventions.
//!
//! Each formatter overlays family-specific attributes onto the base block tree
//! for a given section type, and may remap the block name.

use crate::blocks::BlockNode;
use crate::types::BlockFamily;
use serde_json::json;

pub trait FamilyFormatter: Send + Sync {
    fn family(&self) -> BlockFamily;

    /// Apply the family's overlay for `section_type` (already lowercased).
    fn apply_overlay(&self, section_type: &str, node: &mut BlockNode);

    /// CSS class for the built-in markup wrapper.
    fn wrapper_class(&self, node: &BlockNode) -> String {
        block_class(&node.block_name)
    }
}

/// `wp-block-<namespace>-<name>`, with the namespace dropped for core blocks.
pub fn block_class(block_name: &str) -> String {
    match block_name.split_once('/') {
        Some(("core", name)) => format!("wp-block-{}", name),
        Some((namespace, name)) => format!("wp-block-{}-{}", namespace, name),
        None => format!("wp-block-{}", block_name),
    }
}

fn merge(node: &mut BlockNode, overlay: serde_json::Value) {
    if let serde_json::Value::Object(map) = overlay {
        for (key, value) in map {
            node.attrs.insert(key, value);
        }
    }
}

pub struct KadenceFormatter;

impl FamilyFormatter for KadenceFormatter {
    fn family(&self) -> BlockFamily {
        BlockFamily::Kadence
    }

    fn apply_overlay(&self, section_type: &str, node: &mut BlockNode) {
        let overlay = match section_type {
            "hero" => json!({
                "bgColor": "#1a202c",
                "overlay": "#000000",
                "overlayOpacity": 50,
                "topPadding": 120,
                "bottomPadding": 120,
                "minHeight": 520,
                "verticalAlignment": "middle",
                "textColor": "#ffffff",
            }),
            "testimonial" => json!({
                "bgColor": "#f7fafc",
                "topPadding": 60,
                "bottomPadding": 60,
                "columns": 1,
            }),
            "feature" | "features" => json!({
                "columns": 3,
                "colLayout": "equal",
                "columnGutter": "wide",
            }),
            "cta" => json!({
                "bgColor": "#2b6cb0",
                "textColor": "#ffffff",
                "topPadding": 80,
                "bottomPadding": 80,
            }),
            _ => return,
        };
        merge(node, overlay);
    }
}

pub struct GenerateBlocksFormatter;

impl FamilyFormatter for GenerateBlocksFormatter {
    fn family(&self) -> BlockFamily {
        BlockFamily::GenerateBlocks
    }

    fn apply_overlay(&self, section_type: &str, node: &mut BlockNode) {
        match section_type {
            "hero" => {
                node.block_name = "generateblocks/element".to_string();
                merge(
                    node,
                    json!({
                        "tagName": "section",
                        "align": "full",
                        "styles": {
                            "minHeight": "520px",
                            "paddingTop": "120px",
                            "paddingBottom": "120px",
                            "backgroundColor": "#1a202c",
                            "color": "#ffffff",
                            "display": "flex",
                            "alignItems": "center",
                        },
                    }),
                );
            }
            "testimonial" => merge(
                node,
                json!({
                    "paddingTop": "60",
                    "paddingBottom": "60",
                    "backgroundColor": "#f7fafc",
                    "borderRadius": "8",
                }),
            ),
            "cta" => merge(
                node,
                json!({
                    "paddingTop": "80",
                    "paddingBottom": "80",
                    "backgroundColor": "#2b6cb0",
                    "textColor": "#ffffff",
                }),
            ),
            _ => {}
        }
    }
}

pub struct CoreFormatter;

impl FamilyFormatter for CoreFormatter {
    fn family(&self) -> BlockFamily {
        BlockFamily::Core
    }

    fn apply_overlay(&self, section_type: &str, node: &mut BlockNode) {
        match section_type {
            "hero" => {
                node.block_name = "core/cover".to_string();
                merge(
                    node,
                    json!({
                        "dimRatio": 50,
                        "minHeight": 520,
                        "minHeightUnit": "px",
                        "isDark": true,
                        "align": "full",
                    }),
                );
            }
            "testimonial" => {
                node.block_name = "core/quote".to_string();
                merge(node, json!({"className": "is-style-testimonial"}));
            }
            "cta" => merge(
                node,
                json!({
                    "backgroundColor": "primary",
                    "textColor": "background",
                    "layout": {"type": "constrained"},
                }),
            ),
            _ => {}
        }
    }
}

/// Unknown families: base tree only.
pub struct GenericFormatter;

impl FamilyFormatter for GenericFormatter {
    fn family(&self) -> BlockFamily {
        BlockFamily::Generic("generic".to_string())
    }

    fn apply_overlay(&self, _section_type: &str, _node: &mut BlockNode) {}
}
