use crate::config::{Config, load_config};
use crate::import::{convert_flat, parse_flat};
use crate::interact::Callbacks;
use crate::layout::compute_layout_with;
use crate::layout_dump::write_layout_dump;
use crate::parser::parse_family;
#[cfg(feature = "png")]
use crate::render::write_output_png;
use crate::render::{DefaultNodeRenderer, render_svg, write_output_svg};
use crate::theme::Theme;
use anyhow::Result;
use clap::{Parser, ValueEnum};
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "famtree", version, about = "Family tree renderer in Rust")]
pub struct Args {
    /// Input file (.json) or '-' for stdin
    #[arg(short = 'i', long = "input")]
    pub input: Option<PathBuf>,

    /// Output file (svg/png). Defaults to the config target, then stdout for SVG.
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,

    /// Output format
    #[arg(short = 'e', long = "outputFormat", value_enum, default_value = "svg")]
    pub output_format: OutputFormat,

    /// Config JSON file
    #[arg(short = 'c', long = "configFile")]
    pub config: Option<PathBuf>,

    /// Viewport width
    #[arg(short = 'w', long = "width")]
    pub width: Option<f32>,

    /// Viewport height
    #[arg(short = 'H', long = "height")]
    pub height: Option<f32>,

    #[arg(long = "nodeWidth")]
    pub node_width: Option<f64>,

    #[arg(long = "nodeHeight")]
    pub node_height: Option<f64>,

    /// Theme preset (classic, modern)
    #[arg(short = 't', long = "theme")]
    pub theme: Option<String>,

    /// Input is a flat list of {id, name, momId, dadId, gender} records
    #[arg(long = "flat")]
    pub flat: bool,

    /// Measure labels with the built-in character table instead of system fonts
    #[arg(long = "fastText")]
    pub fast_text: bool,

    /// Write the computed layout as JSON to this file
    #[arg(long = "dumpLayout")]
    pub dump_layout: Option<PathBuf>,

    /// Log every pipeline stage to stderr
    #[arg(short = 'd', long = "debug")]
    pub debug: bool,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Svg,
    Png,
}

pub fn run() -> Result<()> {
    let args = Args::parse();
    let config = build_config(&args)?;
    init_tracing(config.debug);

    let input = read_input(args.input.as_deref())?;
    let forest = if args.flat {
        convert_flat(&parse_flat(&input)?)?
    } else {
        parse_family(&input)?
    };

    let mut callbacks = Callbacks::default();
    let layout = compute_layout_with(&forest, &config.theme, &config.layout, &mut callbacks)?;
    if let Some(path) = args.dump_layout.as_deref() {
        write_layout_dump(path, &layout)?;
    }
    let svg = render_svg(&layout, &config.theme, &config, &DefaultNodeRenderer)?;

    let output = args.output.clone().or_else(|| config.render.target.clone());
    match args.output_format {
        OutputFormat::Svg => write_output_svg(&svg, output.as_deref())?,
        OutputFormat::Png => {
            let output = ensure_output(&output, "png")?;
            write_png(&svg, &output, &config)?;
        }
    }
    Ok(())
}

/// Config file first, then command line flags on top.
fn build_config(args: &Args) -> Result<Config> {
    let mut config = load_config(args.config.as_deref())?;
    if let Some(name) = args.theme.as_deref() {
        config.theme = Theme::by_name(name).ok_or_else(|| anyhow::anyhow!("unknown theme `{}`", name))?;
        config.render.background = config.theme.background.clone();
    }
    if let Some(width) = args.width {
        config.render.width = width;
    }
    if let Some(height) = args.height {
        config.render.height = height;
    }
    if let Some(node_width) = args.node_width {
        config.layout.node_width = node_width;
    }
    if let Some(node_height) = args.node_height {
        config.layout.node_height = node_height;
    }
    if config.layout.node_width <= 0.0 || config.layout.node_height <= 0.0 {
        return Err(anyhow::anyhow!("nodeWidth and nodeHeight must be positive"));
    }
    config.layout.fast_text_metrics |= args.fast_text;
    config.debug |= args.debug;
    Ok(config)
}

fn init_tracing(debug: bool) {
    let filter = if debug {
        EnvFilter::new("famtree=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

#[cfg(feature = "png")]
fn write_png(svg: &str, output: &Path, config: &Config) -> Result<()> {
    write_output_png(svg, output, &config.render, &config.theme)
}

#[cfg(not(feature = "png"))]
fn write_png(_svg: &str, _output: &Path, _config: &Config) -> Result<()> {
    Err(anyhow::anyhow!("PNG output requires the `png` feature"))
}

fn read_input(path: Option<&Path>) -> Result<String> {
    if let Some(path) = path
        && path != Path::new("-")
    {
        return Ok(std::fs::read_to_string(path)?);
    }
    let mut buf = String::new();
    io::stdin().read_to_string(&mut buf)?;
    Ok(buf)
}

fn ensure_output(output: &Option<PathBuf>, ext: &str) -> Result<PathBuf> {
    if let Some(path) = output {
        return Ok(path.clone());
    }
    Err(anyhow::anyhow!("Output path required for {} output", ext))
}
