use std::path::Path;

use tracing::debug;

use crate::config::{Config, LayoutConfig};
#[cfg(feature = "png")]
use crate::config::RenderConfig;
use crate::error::{FamilyTreeError, Result};
use crate::layout::{FamilyLayout, NodeLayout, measure_label, to_svg_path};
use crate::theme::Theme;

/// Draws the content of one visible node.
pub trait NodeRenderer {
    /// Markup for the node label, centered on the node.
    fn render_text(&self, node: &NodeLayout, theme: &Theme, config: &LayoutConfig) -> Result<String>;

    /// Markup for the whole node; `text` is what `render_text` produced.
    fn render_node(&self, node: &NodeLayout, text: &str, theme: &Theme, config: &LayoutConfig) -> Result<String>;
}

/// Rounded box filled by class (`man`, `woman`, anything else) with the
/// wrapped name inside.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultNodeRenderer;

impl NodeRenderer for DefaultNodeRenderer {
    fn render_text(&self, node: &NodeLayout, theme: &Theme, config: &LayoutConfig) -> Result<String> {
        let block = measure_label(&node.name, node.width, theme, config);
        let line_height = theme.font_size * config.label_line_height;
        let start_y = node.y as f32 - block.height / 2.0 + theme.font_size;
        let x = node.x;

        let mut text = format!(
            "<text class=\"{}\" x=\"{x:.2}\" y=\"{start_y:.2}\" text-anchor=\"middle\">",
            escape_xml(&node.text_class)
        );
        for (idx, line) in block.lines.iter().enumerate() {
            let dy = if idx == 0 { 0.0 } else { line_height };
            text.push_str(&format!("<tspan x=\"{x:.2}\" dy=\"{dy:.2}\">{}</tspan>", escape_xml(line)));
        }
        text.push_str("</text>");
        Ok(text)
    }

    fn render_node(&self, node: &NodeLayout, text: &str, theme: &Theme, _config: &LayoutConfig) -> Result<String> {
        let fill = node_fill(node, theme);
        Ok(format!(
            "<g data-id=\"{}\"><rect class=\"{}\" x=\"{:.2}\" y=\"{:.2}\" width=\"{:.2}\" height=\"{:.2}\" rx=\"4\" ry=\"4\" fill=\"{}\" stroke=\"{}\" stroke-width=\"1.2\"/>{}</g>",
            escape_xml(&node.id),
            escape_xml(&node.class_name),
            node.x - node.width / 2.0,
            node.y - node.height / 2.0,
            node.width,
            node.height,
            fill,
            theme.node_border_color,
            text
        ))
    }
}

fn node_fill<'a>(node: &NodeLayout, theme: &'a Theme) -> &'a str {
    let mut classes = node.class_name.split_whitespace();
    if classes.clone().any(|class| class == "woman") {
        theme.woman_fill.as_str()
    } else if classes.any(|class| class == "man") {
        theme.man_fill.as_str()
    } else {
        theme.node_fill.as_str()
    }
}

/// Renders a positioned family tree to a standalone SVG document.
pub fn render_svg(
    layout: &FamilyLayout,
    theme: &Theme,
    config: &Config,
    renderer: &dyn NodeRenderer,
) -> Result<String> {
    let styles = &config.layout.styles;
    let margin = config.render.margin;
    let view_x = layout.bounds.min_x - margin.left;
    let view_y = layout.bounds.min_y - margin.top;
    let view_w = (layout.bounds.width() + margin.left + margin.right).max(1.0);
    let view_h = (layout.bounds.height() + margin.top + margin.bottom).max(1.0);

    let mut svg = String::new();
    svg.push_str(&format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{}\" height=\"{}\" viewBox=\"{view_x:.2} {view_y:.2} {view_w:.2} {view_h:.2}\">",
        config.render.width, config.render.height
    ));

    svg.push_str("<style>");
    svg.push_str(&format!(
        ".{}{{fill:none;stroke:{};stroke-width:1.5}}",
        styles.linage, theme.lineage_color
    ));
    svg.push_str(&format!(
        ".{}{{fill:none;stroke:{};stroke-width:1.5}}",
        styles.marriage, theme.marriage_color
    ));
    svg.push_str(&format!(
        ".{}.divorced{{stroke:{};stroke-dasharray:6 4}}",
        styles.marriage, theme.divorced_color
    ));
    svg.push_str(&format!(
        ".{}{{font-family:{};font-size:{}px;fill:{}}}",
        styles.text,
        theme.font_family.replace('"', "'"),
        theme.font_size,
        theme.node_text_color
    ));
    svg.push_str("</style>");

    svg.push_str(&format!(
        "<rect x=\"{view_x:.2}\" y=\"{view_y:.2}\" width=\"{view_w:.2}\" height=\"{view_h:.2}\" fill=\"{}\"/>",
        config.render.background
    ));

    for link in layout.links.iter().filter(|link| !link.suppressed) {
        svg.push_str(&format!(
            "<path class=\"{}\" d=\"{}\"/>",
            escape_xml(&styles.linage),
            to_svg_path(&link.points)
        ));
    }

    for union in &layout.unions {
        let class = if union.divorced {
            format!("{} divorced", styles.marriage)
        } else {
            styles.marriage.clone()
        };
        let dash = if union.divorced {
            " stroke-dasharray=\"6 4\""
        } else {
            ""
        };
        svg.push_str(&format!(
            "<path class=\"{}\" d=\"{}\"{dash}/>",
            escape_xml(&class),
            to_svg_path(&union.points)
        ));
    }

    let mut drawn = 0;
    for node in layout.visible_nodes() {
        let text = renderer.render_text(node, theme, &config.layout)?;
        svg.push_str(&renderer.render_node(node, &text, theme, &config.layout)?);
        drawn += 1;
    }

    svg.push_str("</svg>");
    debug!(nodes = drawn, bytes = svg.len(), "rendered svg");
    Ok(svg)
}

pub fn write_output_svg(svg: &str, output: Option<&Path>) -> anyhow::Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, svg)?;
        }
        None => {
            print!("{}", svg);
        }
    }
    Ok(())
}

#[cfg(feature = "png")]
pub fn write_output_png(svg: &str, output: &Path, render_cfg: &RenderConfig, theme: &Theme) -> anyhow::Result<()> {
    let mut opt = usvg::Options::default();
    if let Some(family) = theme.font_family.split(',').next() {
        opt.font_family = family.trim().trim_matches('"').to_string();
    }
    let fallback = usvg::Size::from_wh(600.0, 600.0).ok_or_else(|| anyhow::anyhow!("invalid default size"))?;
    opt.default_size = usvg::Size::from_wh(render_cfg.width, render_cfg.height).unwrap_or(fallback);

    let tree = usvg::Tree::from_str(svg, &opt)?;
    let size = tree.size().to_int_size();
    let mut pixmap = resvg::tiny_skia::Pixmap::new(size.width(), size.height())
        .ok_or_else(|| anyhow::anyhow!("Failed to allocate pixmap"))?;

    let mut pixmap_mut = pixmap.as_mut();
    resvg::render(&tree, resvg::tiny_skia::Transform::default(), &mut pixmap_mut);
    pixmap.save_png(output)?;
    Ok(())
}

/// Error for a node renderer that could not produce markup.
pub fn render_error(node: &NodeLayout, message: impl Into<String>) -> FamilyTreeError {
    FamilyTreeError::Render {
        node: node.id.clone(),
        message: message.into(),
    }
}

pub(crate) fn escape_xml(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interact::Callbacks;
    use crate::ir::{MarriageRecord, PersonRecord};
    use crate::layout::{FixedMeasure, compute_layout_with};

    fn layout_for(forest: &[PersonRecord], config: &Config) -> FamilyLayout {
        let mut callbacks = Callbacks::default().with_measure(FixedMeasure(20.0));
        compute_layout_with(forest, &config.theme, &config.layout, &mut callbacks).unwrap()
    }

    fn family() -> Vec<PersonRecord> {
        let alex = PersonRecord::new("a", "Alex").with_class("woman");
        vec![
            PersonRecord::new("p", "Al & Jo")
                .with_class("man")
                .with_marriage(MarriageRecord::to(alex).divorced())
                .with_marriage(
                    MarriageRecord::to(PersonRecord::new("b", "Bo"))
                        .with_child(PersonRecord::new("c", "Cy")),
                ),
        ]
    }

    #[test]
    fn renders_visible_people_and_escapes_names() {
        let config = Config::default();
        let layout = layout_for(&family(), &config);
        let svg = render_svg(&layout, &config.theme, &config, &DefaultNodeRenderer).unwrap();
        assert!(svg.starts_with("<svg"));
        assert!(svg.contains("Al &amp; Jo"));
        assert_eq!(svg.matches("<rect class=").count(), 4);
        assert!(svg.contains(&config.theme.man_fill));
        assert!(svg.contains(&config.theme.woman_fill));
    }

    #[test]
    fn divorced_unions_are_dashed_and_suppressed_links_skipped() {
        let config = Config::default();
        let layout = layout_for(&family(), &config);
        let svg = render_svg(&layout, &config.theme, &config, &DefaultNodeRenderer).unwrap();
        assert_eq!(svg.matches("class=\"marriage divorced\"").count(), 1);
        assert_eq!(svg.matches("<path class=\"marriage").count(), 2);
        let drawn_links = layout.links.iter().filter(|link| !link.suppressed).count();
        assert_eq!(drawn_links, 1);
        assert_eq!(svg.matches("<path class=\"linage\"").count(), drawn_links);
    }

    #[test]
    fn renderer_errors_abort_the_render() {
        struct Failing;
        impl NodeRenderer for Failing {
            fn render_text(&self, node: &NodeLayout, _: &Theme, _: &LayoutConfig) -> Result<String> {
                Err(render_error(node, "template missing"))
            }
            fn render_node(&self, _: &NodeLayout, text: &str, _: &Theme, _: &LayoutConfig) -> Result<String> {
                Ok(text.to_string())
            }
        }
        let config = Config::default();
        let layout = layout_for(&family(), &config);
        let err = render_svg(&layout, &config.theme, &config, &Failing).unwrap_err();
        assert!(err.to_string().contains("template missing"));
    }

    #[test]
    fn escape_xml_covers_markup() {
        assert_eq!(escape_xml("<a href='x'>&</a>"), "&lt;a href=&apos;x&apos;&gt;&amp;&lt;/a&gt;");
    }
}
