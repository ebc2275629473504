#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod error;
pub mod import;
pub mod interact;
pub mod ir;
pub mod layout;
pub mod layout_dump;
pub mod parser;
pub mod render;
pub mod text_metrics;
pub mod theme;

#[cfg(feature = "cli")]
pub use cli::run;
pub use error::{FamilyTreeError, Result};
pub use interact::{Callbacks, Interaction};
pub use ir::{MarriageRecord, PersonRecord};
pub use layout::{FamilyLayout, compute_layout, compute_layout_with};
pub use render::{DefaultNodeRenderer, NodeRenderer, render_svg};

use config::{Config, LayoutConfig, RenderConfig};
use theme::Theme;

/// Everything one render needs besides the data.
#[derive(Debug, Clone)]
pub struct RenderOptions {
    pub theme: Theme,
    pub layout: LayoutConfig,
    pub render: RenderConfig,
    /// Input is a flat `{id, momId, dadId}` list rather than nested records.
    pub flat: bool,
}

impl RenderOptions {
    pub fn classic() -> Self {
        Self::with_theme(Theme::classic())
    }

    pub fn modern() -> Self {
        Self::with_theme(Theme::modern())
    }

    fn with_theme(theme: Theme) -> Self {
        let render = RenderConfig {
            background: theme.background.clone(),
            ..RenderConfig::default()
        };
        Self {
            theme,
            layout: LayoutConfig::default(),
            render,
            flat: false,
        }
    }

    pub fn config(&self) -> Config {
        Config {
            theme: self.theme.clone(),
            layout: self.layout.clone(),
            render: self.render.clone(),
            debug: false,
        }
    }
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self::classic()
    }
}

/// Parses `input`, lays it out and renders it to SVG in one call.
pub fn render_family(input: &str, options: &RenderOptions) -> Result<String> {
    let forest = if options.flat {
        import::convert_flat(&import::parse_flat(input)?)?
    } else {
        parser::parse_family(input)?
    };
    render_forest(&forest, options, &mut Callbacks::default(), &DefaultNodeRenderer)
}

/// Renders an already parsed forest with caller-supplied hooks.
pub fn render_forest(
    forest: &[PersonRecord],
    options: &RenderOptions,
    callbacks: &mut Callbacks,
    renderer: &dyn NodeRenderer,
) -> Result<String> {
    let layout = compute_layout_with(forest, &options.theme, &options.layout, callbacks)?;
    render_svg(&layout, &options.theme, &options.config(), renderer)
}
