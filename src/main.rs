use std::{fs, path::PathBuf};

use anyhow::{bail, Context as _};
use clap::{Parser, ValueEnum};
use glam::{vec2, Vec2};
use nameplate::{
    Compositor, DirectorySink, Font, FontStore, FsAssets, InlinePool, RenderOutcome, Variant,
};

#[derive(Parser)]
#[command(name = "nameplate", about = "Writes a name onto a background image")]
struct Cli {
    /// The name to draw
    #[arg(long)]
    text: String,
    #[arg(long, value_enum, default_value = "jersey")]
    variant: VariantArg,
    /// Variant definition in TOML; overrides --variant
    #[arg(long)]
    config: Option<PathBuf>,
    /// Directory background paths are relative to
    #[arg(long, default_value = ".")]
    assets: PathBuf,
    /// Replaces the variant's background image
    #[arg(long)]
    background: Option<PathBuf>,
    /// Window size the viewport is fitted to, as WIDTHxHEIGHT
    #[arg(long, default_value = "1280x800", value_parser = parse_window)]
    window: Vec2,
    /// Directory the PNG is written to
    #[arg(long, default_value = ".")]
    out: PathBuf,
    /// Font file used instead of the variant's font family
    #[arg(long)]
    font: Option<PathBuf>,
    /// Print a data URL instead of writing a file
    #[arg(long)]
    data_url: bool,
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
    #[arg(short, long)]
    quiet: bool,
}

#[derive(Copy, Clone, ValueEnum)]
enum VariantArg {
    Jersey,
    Holiday,
}

fn parse_window(s: &str) -> Result<Vec2, String> {
    let (width, height) = s
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected WIDTHxHEIGHT, got '{}'", s))?;
    let parse = |v: &str| {
        v.trim()
            .parse::<f32>()
            .ok()
            .filter(|v| v.is_finite() && *v > 0.)
            .ok_or_else(|| format!("invalid window dimension '{}'", v))
    };
    Ok(vec2(parse(width)?, parse(height)?))
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let level = match (cli.quiet, cli.verbose) {
        (true, _) => log::LevelFilter::Error,
        (false, 0) => log::LevelFilter::Warn,
        (false, 1) => log::LevelFilter::Info,
        (false, 2) => log::LevelFilter::Debug,
        (false, _) => log::LevelFilter::Trace,
    };
    simple_logger::SimpleLogger::new()
        .with_level(level)
        .init()
        .context("failed to initialize logging")?;

    let mut variant = match &cli.config {
        Some(path) => Variant::load(path)
            .with_context(|| format!("failed to load variant '{}'", path.display()))?,
        None => match cli.variant {
            VariantArg::Jersey => Variant::jersey_banner(),
            VariantArg::Holiday => Variant::holiday_card(),
        },
    };
    if let Some(background) = cli.background {
        variant.background = background;
    }

    let mut fonts = FontStore::new();
    match &cli.font {
        Some(path) => {
            let data =
                fs::read(path).with_context(|| format!("failed to read '{}'", path.display()))?;
            let font = Font::from_data(data)
                .with_context(|| format!("failed to parse font '{}'", path.display()))?;
            fonts.set_fallback(font);
            variant.font_family = None;
        }
        None => fonts.load_system_fonts(),
    }

    let mut compositor = Compositor::builder(variant)
        .loader(FsAssets::new(&cli.assets))
        .thread_pool(InlinePool)
        .fonts(fonts)
        .window_size(cli.window)
        .build()
        .context("invalid variant")?;

    compositor.render_text(&cli.text);
    match compositor.wait() {
        Some(RenderOutcome::Rendered(_)) => {}
        _ => bail!(
            "could not render over '{}'",
            compositor.variant().background.display()
        ),
    }

    if cli.data_url {
        let export = compositor
            .export_png()
            .context("failed to encode PNG")?
            .context("nothing was rendered")?;
        println!("{}", export.to_data_url());
    } else {
        let mut sink = DirectorySink::new(&cli.out);
        compositor
            .download(&mut sink)
            .context("failed to save PNG")?;
        for path in sink.saved() {
            println!("{}", path.display());
        }
    }

    Ok(())
}
