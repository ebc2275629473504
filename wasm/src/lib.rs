use famtree::theme::Theme;
use famtree::{RenderOptions, render_family};
use serde::Deserialize;
use wasm_bindgen::prelude::*;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FamilyRenderOptions {
    theme: Option<String>,
    font_family: Option<String>,
    font_size: Option<f32>,
    fast_text: Option<bool>,
    flat: Option<bool>,
    node_width: Option<f64>,
    node_height: Option<f64>,
}

fn build_render_options(options: FamilyRenderOptions) -> Result<RenderOptions, String> {
    let theme = match options.theme.as_deref() {
        Some(name) => Theme::by_name(name).ok_or_else(|| format!("unknown theme `{name}`"))?,
        None => Theme::modern(),
    };
    let mut render_options = RenderOptions::modern();
    render_options.render.background = theme.background.clone();
    render_options.theme = theme;

    if let Some(font_family) = options.font_family {
        render_options.theme.font_family = font_family;
    }
    if let Some(font_size) = options.font_size {
        render_options.theme.font_size = font_size;
    }
    if let Some(node_width) = options.node_width {
        render_options.layout.node_width = node_width;
    }
    if let Some(node_height) = options.node_height {
        render_options.layout.node_height = node_height;
    }
    if render_options.layout.node_width <= 0.0 || render_options.layout.node_height <= 0.0 {
        return Err("nodeWidth and nodeHeight must be positive".to_string());
    }
    // No system fonts in the browser.
    render_options.layout.fast_text_metrics = options.fast_text.unwrap_or(true);
    render_options.flat = options.flat.unwrap_or(false);

    Ok(render_options)
}

#[wasm_bindgen]
pub fn render_family_svg(input: &str, options_json: Option<String>) -> Result<String, JsValue> {
    let options = if let Some(raw_options) = options_json {
        serde_json::from_str::<FamilyRenderOptions>(&raw_options)
            .map_err(|error| JsValue::from_str(&error.to_string()))?
    } else {
        FamilyRenderOptions::default()
    };

    let render_options = build_render_options(options).map_err(|error| JsValue::from_str(&error))?;
    render_family(input, &render_options).map_err(|error| JsValue::from_str(&error.to_string()))
}
