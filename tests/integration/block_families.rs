//! Family-specific block output for a hero section, resolved from preferences.

use pagecraft::blocks::{unique_block_id, BlockConverter, BlockResolver, PreferenceResolver};
use pagecraft::request::BlockPreferences;
use pagecraft::types::BlockFamily;
use serde_json::{json, Value};

const HERO_COPY: &str = "Bread worth waking up for.";

fn hero_preferences(family: BlockFamily) -> BlockPreferences {
    BlockPreferences {
        preferred_family: family,
        section_type: "hero".to_string(),
        ..BlockPreferences::default()
    }
}

#[test]
fn kadence_hero_uses_row_layout_overlay() {
    let spec = PreferenceResolver::default()
        .resolve(&hero_preferences(BlockFamily::Kadence))
        .unwrap();
    let converter = BlockConverter::new();
    let node = converter.convert("home-hero", HERO_COPY, &spec).unwrap();

    assert_eq!(node.block_name, "kadence/rowlayout");
    assert_eq!(node.attrs["bgColor"], json!("#1a202c"));
    assert_eq!(node.attrs["overlayOpacity"], json!(50));
    assert_eq!(node.attrs["minHeight"], json!(520));
    assert_eq!(node.attrs["verticalAlignment"], json!("middle"));
    assert_eq!(
        converter.render(&node, &spec),
        "<div class=\"wp-block-kadence-rowlayout\">Bread worth waking up for.</div>"
    );
}

#[test]
fn generateblocks_hero_becomes_a_section_element() {
    let spec = PreferenceResolver::default()
        .resolve(&hero_preferences(BlockFamily::GenerateBlocks))
        .unwrap();
    let converter = BlockConverter::new();
    let node = converter.convert("home-hero", HERO_COPY, &spec).unwrap();

    assert_eq!(node.block_name, "generateblocks/element");
    assert_eq!(node.attrs["tagName"], json!("section"));
    assert_eq!(node.attrs["styles"]["minHeight"], json!("520px"));
    assert_eq!(node.attrs["styles"]["display"], json!("flex"));
    assert!(converter
        .render(&node, &spec)
        .starts_with("<div class=\"wp-block-generateblocks-element\">"));
}

#[test]
fn core_hero_is_a_cover_block() {
    let spec = PreferenceResolver::default()
        .resolve(&hero_preferences(BlockFamily::Core))
        .unwrap();
    let node = BlockConverter::new()
        .convert("home-hero", HERO_COPY, &spec)
        .unwrap();

    assert_eq!(node.block_name, "core/cover");
    assert_eq!(node.attrs["dimRatio"], json!(50));
    assert_eq!(node.attrs["isDark"], json!(true));
    assert_eq!(node.content(), HERO_COPY);
}

#[test]
fn unknown_family_falls_back_and_keeps_base_tree() {
    let resolver = PreferenceResolver::new(vec![BlockFamily::from_plugin("stackable")]);
    let spec = resolver
        .resolve(&hero_preferences(BlockFamily::from_plugin("stackable")))
        .unwrap();
    assert!(!spec.fallback_used);
    assert_eq!(spec.block_name, "stackable/section");

    let node = BlockConverter::new()
        .convert("home-hero", HERO_COPY, &spec)
        .unwrap();
    assert_eq!(node.block_name, "stackable/section");
    assert_eq!(node.attrs.len(), 2);
}

#[test]
fn unique_ids_differ_per_section() {
    let spec = PreferenceResolver::default()
        .resolve(&hero_preferences(BlockFamily::Kadence))
        .unwrap();
    let converter = BlockConverter::new();
    let a = converter.convert("page-a", HERO_COPY, &spec).unwrap();
    let b = converter.convert("page-b", HERO_COPY, &spec).unwrap();
    let again = converter.convert("page-a", HERO_COPY, &spec).unwrap();
    assert_ne!(a.attrs["uniqueId"], b.attrs["uniqueId"]);
    assert_eq!(a.attrs["uniqueId"], again.attrs["uniqueId"]);
}

fn hero_attrs(family: BlockFamily) -> (String, Value) {
    let spec = PreferenceResolver::default()
        .resolve(&hero_preferences(family))
        .unwrap();
    let node = BlockConverter::new()
        .convert("home-hero", HERO_COPY, &spec)
        .unwrap();
    (node.block_name, serde_json::to_value(&node.attrs).unwrap())
}

#[test]
fn hero_overlays_match_golden_output_per_family() {
    let golden = [
        (
            BlockFamily::Kadence,
            "kadence/rowlayout",
            json!({
                "uniqueId": unique_block_id("home-hero", "kadence/rowlayout"),
                "content": HERO_COPY,
                "bgColor": "#1a202c",
                "overlay": "#000000",
                "overlayOpacity": 50,
                "topPadding": 120,
                "bottomPadding": 120,
                "minHeight": 520,
                "verticalAlignment": "middle",
                "textColor": "#ffffff"
            }),
        ),
        (
            BlockFamily::GenerateBlocks,
            "generateblocks/element",
            json!({
                "uniqueId": unique_block_id("home-hero", "generateblocks/container"),
                "content": HERO_COPY,
                "tagName": "section",
                "align": "full",
                "styles": {
                    "minHeight": "520px",
                    "paddingTop": "120px",
                    "paddingBottom": "120px",
                    "backgroundColor": "#1a202c",
                    "color": "#ffffff",
                    "display": "flex",
                    "alignItems": "center"
                }
            }),
        ),
        (
            BlockFamily::Core,
            "core/cover",
            json!({
                "uniqueId": unique_block_id("home-hero", "core/group"),
                "content": HERO_COPY,
                "dimRatio": 50,
                "minHeight": 520,
                "minHeightUnit": "px",
                "isDark": true,
                "align": "full"
            }),
        ),
    ];

    for (family, block_name, attrs) in &golden {
        let (actual_name, actual_attrs) = hero_attrs(family.clone());
        assert_eq!(&actual_name, block_name, "block name for {:?}", family);
        assert_eq!(&actual_attrs, attrs, "attrs for {:?}", family);
        assert_eq!(hero_attrs(family.clone()), (actual_name, actual_attrs));
    }

    let outputs: Vec<(String, Value)> = golden
        .iter()
        .map(|(family, _, _)| hero_attrs(family.clone()))
        .collect();
    for (i, a) in outputs.iter().enumerate() {
        for b in &outputs[i + 1..] {
            assert_ne!(a.0, b.0);
            assert_ne!(a.1, b.1);
        }
    }
}
