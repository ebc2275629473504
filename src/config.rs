use crate::theme::Theme;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// CSS class names attached to rendered elements.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Styles {
    pub node: String,
    pub linage: String,
    pub marriage: String,
    pub text: String,
}

impl Default for Styles {
    fn default() -> Self {
        Self {
            node: "node".to_string(),
            linage: "linage".to_string(),
            marriage: "marriage".to_string(),
            text: "nodeText".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutConfig {
    pub node_width: f64,
    pub node_height: f64,
    /// Vertical distance between generations; `2 × node height` when unset.
    pub row_spacing: Option<f64>,
    pub hidden_separation: f64,
    pub visible_separation: f64,
    pub elbow_ratio: f64,
    pub union_offset_ratio: f64,
    pub union_stack_ratio: f64,
    pub node_padding_x: f32,
    pub node_padding_y: f32,
    pub label_line_height: f32,
    pub fast_text_metrics: bool,
    pub styles: Styles,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            node_width: 100.0,
            node_height: 60.0,
            row_spacing: None,
            hidden_separation: 0.3,
            visible_separation: 0.6,
            elbow_ratio: 0.5,
            union_offset_ratio: 0.6,
            union_stack_ratio: 0.55,
            node_padding_x: 8.0,
            node_padding_y: 8.0,
            label_line_height: 1.4,
            fast_text_metrics: false,
            styles: Styles::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Margin {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl Margin {
    pub fn uniform(value: f64) -> Self {
        Self {
            top: value,
            right: value,
            bottom: value,
            left: value,
        }
    }
}

impl Default for Margin {
    fn default() -> Self {
        Self::uniform(20.0)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderConfig {
    /// Where the rendered chart goes; stdout when unset.
    pub target: Option<PathBuf>,
    pub width: f32,
    pub height: f32,
    pub margin: Margin,
    pub background: String,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            target: None,
            width: 600.0,
            height: 600.0,
            margin: Margin::default(),
            background: "#FFFFFF".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub theme: Theme,
    pub layout: LayoutConfig,
    pub render: RenderConfig,
    pub debug: bool,
}

impl Default for Config {
    fn default() -> Self {
        let theme = Theme::classic();
        let render = RenderConfig {
            background: theme.background.clone(),
            ..Default::default()
        };
        Self {
            theme,
            layout: LayoutConfig::default(),
            render,
            debug: false,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConfigFile {
    target: Option<PathBuf>,
    debug: Option<bool>,
    width: Option<f32>,
    height: Option<f32>,
    margin: Option<MarginFile>,
    node_width: Option<f64>,
    node_height: Option<f64>,
    row_spacing: Option<f64>,
    fast_text: Option<bool>,
    styles: Option<StylesFile>,
    theme: Option<String>,
    theme_variables: Option<ThemeVariables>,
    separation: Option<SeparationFile>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum MarginFile {
    Uniform(f64),
    Sides {
        top: Option<f64>,
        right: Option<f64>,
        bottom: Option<f64>,
        left: Option<f64>,
    },
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StylesFile {
    node: Option<String>,
    linage: Option<String>,
    marriage: Option<String>,
    text: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SeparationFile {
    hidden: Option<f64>,
    visible: Option<f64>,
    union_offset: Option<f64>,
    union_stack: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ThemeVariables {
    font_family: Option<String>,
    font_size: Option<f32>,
    node_fill: Option<String>,
    node_text_color: Option<String>,
    node_border_color: Option<String>,
    man_fill: Option<String>,
    woman_fill: Option<String>,
    lineage_color: Option<String>,
    marriage_color: Option<String>,
    divorced_color: Option<String>,
    background: Option<String>,
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    let Some(path) = path else {
        return Ok(Config::default());
    };
    let contents = std::fs::read_to_string(path)?;
    parse_config(&contents)
}

pub fn parse_config(contents: &str) -> anyhow::Result<Config> {
    let parsed: ConfigFile = match serde_json::from_str(contents) {
        Ok(parsed) => parsed,
        Err(json_err) => json5::from_str(contents).map_err(|_| json_err)?,
    };
    let mut config = Config::default();

    if let Some(theme_name) = parsed.theme.as_deref() {
        config.theme = Theme::by_name(theme_name)
            .ok_or_else(|| anyhow::anyhow!("unknown theme `{}`", theme_name))?;
    }

    if let Some(vars) = parsed.theme_variables {
        if let Some(v) = vars.font_family {
            config.theme.font_family = v;
        }
        if let Some(v) = vars.font_size {
            config.theme.font_size = v;
        }
        if let Some(v) = vars.node_fill {
            config.theme.node_fill = v;
        }
        if let Some(v) = vars.node_text_color {
            config.theme.node_text_color = v;
        }
        if let Some(v) = vars.node_border_color {
            config.theme.node_border_color = v;
        }
        if let Some(v) = vars.man_fill {
            config.theme.man_fill = v;
        }
        if let Some(v) = vars.woman_fill {
            config.theme.woman_fill = v;
        }
        if let Some(v) = vars.lineage_color {
            config.theme.lineage_color = v;
        }
        if let Some(v) = vars.marriage_color {
            config.theme.marriage_color = v;
        }
        if let Some(v) = vars.divorced_color {
            config.theme.divorced_color = v;
        }
        if let Some(v) = vars.background {
            config.theme.background = v;
        }
    }

    if let Some(v) = parsed.target {
        config.render.target = Some(v);
    }
    if let Some(v) = parsed.debug {
        config.debug = v;
    }
    if let Some(v) = parsed.width {
        config.render.width = v;
    }
    if let Some(v) = parsed.height {
        config.render.height = v;
    }
    match parsed.margin {
        Some(MarginFile::Uniform(v)) => config.render.margin = Margin::uniform(v),
        Some(MarginFile::Sides {
            top,
            right,
            bottom,
            left,
        }) => {
            let margin = &mut config.render.margin;
            margin.top = top.unwrap_or(margin.top);
            margin.right = right.unwrap_or(margin.right);
            margin.bottom = bottom.unwrap_or(margin.bottom);
            margin.left = left.unwrap_or(margin.left);
        }
        None => {}
    }

    if let Some(v) = parsed.node_width {
        config.layout.node_width = v;
    }
    if let Some(v) = parsed.node_height {
        config.layout.node_height = v;
    }
    if parsed.row_spacing.is_some() {
        config.layout.row_spacing = parsed.row_spacing;
    }
    if let Some(v) = parsed.fast_text {
        config.layout.fast_text_metrics = v;
    }
    if let Some(styles) = parsed.styles {
        if let Some(v) = styles.node {
            config.layout.styles.node = v;
        }
        if let Some(v) = styles.linage {
            config.layout.styles.linage = v;
        }
        if let Some(v) = styles.marriage {
            config.layout.styles.marriage = v;
        }
        if let Some(v) = styles.text {
            config.layout.styles.text = v;
        }
    }
    if let Some(sep) = parsed.separation {
        if let Some(v) = sep.hidden {
            config.layout.hidden_separation = v;
        }
        if let Some(v) = sep.visible {
            config.layout.visible_separation = v;
        }
        if let Some(v) = sep.union_offset {
            config.layout.union_offset_ratio = v;
        }
        if let Some(v) = sep.union_stack {
            config.layout.union_stack_ratio = v;
        }
    }

    if config.layout.node_width <= 0.0 || config.layout.node_height <= 0.0 {
        return Err(anyhow::anyhow!(
            "nodeWidth and nodeHeight must be positive (got {} x {})",
            config.layout.node_width,
            config.layout.node_height
        ));
    }

    config.render.background = config.theme.background.clone();

    Ok(config)
}
