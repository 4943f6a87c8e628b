#![allow(clippy::uninlined_format_args)]

use anyhow::{bail, Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use serde::Deserialize;
use size_diff_rs::size_diff_canvas2d::{Canvas2dContext, FontConfig};
use size_diff_rs::{
    calculate_taur, parse_height, Character, ImageProvider, ImageProviderConfig, RenderOptions,
    ShareState, SizeDiffRenderer, SpeciesLibrary, TaurInput, TaurMeasurement,
};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

/// size-diff: Render size comparison images
#[derive(Parser, Debug)]
#[command(name = "size-diff")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Render a scene file to PNG
    Render {
        /// Path to input scene JSON file: {"characters": [...], "options": {...}}
        #[arg(short, long)]
        input: PathBuf,

        /// Path to output PNG file, or - to write base64 to stdout
        #[arg(short, long, default_value = "-")]
        output: String,

        #[command(flatten)]
        render: RenderArgs,
    },

    /// Print the layout of a scene file as JSON
    Layout {
        /// Path to input scene JSON file
        #[arg(short, long)]
        input: PathBuf,

        /// Directory containing character images
        #[arg(long, default_value = "species_data")]
        species_root: PathBuf,

        /// Override the scene's size option
        #[arg(long)]
        size: Option<u32>,

        /// Pretty-print JSON
        #[arg(short, long)]
        pretty: bool,
    },

    /// Resolve characters through species data and render them
    Query {
        /// Characters as species,gender,height,name joined with |
        #[arg(short, long, conflicts_with = "query")]
        characters: Option<String>,

        /// Full share-state query string, e.g. characters=...&size=800
        #[arg(short, long)]
        query: Option<String>,

        /// Draw ear-height indicators and count ears in the scale
        #[arg(long, action = ArgAction::Set, default_value_t = true)]
        measure_ears: bool,

        /// Set the scaleHeight share flag. The CLI has no species scaling policy, so heights are unchanged
        #[arg(long)]
        scale_height: bool,

        /// Path to output PNG file, or - to write base64 to stdout
        #[arg(short, long, default_value = "-")]
        output: String,

        #[command(flatten)]
        render: RenderArgs,
    },

    /// Compute taur body proportions from anthro and feral measurements
    Taur {
        /// Anthro height before taurification, e.g. 6'0" or 72
        #[arg(long, value_parser = parse_length)]
        anthro_height: f64,

        /// Feral species shoulder height
        #[arg(long, value_parser = parse_length)]
        species_height: f64,

        /// Feral species body length without the tail
        #[arg(long, value_parser = parse_length)]
        species_length: f64,

        /// Feral species tail length
        #[arg(long, value_parser = parse_length, default_value = "0")]
        tail_length: f64,

        /// Taur height from the ground to the top of the head
        #[arg(long, value_parser = parse_length)]
        full_height: f64,

        /// Feral species weight
        #[arg(long)]
        weight: f64,

        /// Body length override (limb measurement only)
        #[arg(long, value_parser = parse_length)]
        taur_length: Option<f64>,

        /// limb (mammals) or vitruvian (reptiles)
        #[arg(short, long, default_value = "limb", value_parser = parse_measurement)]
        measurement: TaurMeasurement,

        /// Extra anthro measurement to scale, as name=length (repeatable)
        #[arg(long = "part", value_parser = parse_body_part)]
        parts: Vec<(String, f64)>,

        /// Pretty-print JSON
        #[arg(short, long)]
        pretty: bool,
    },
}

#[derive(clap::Args, Debug)]
struct RenderArgs {
    /// Directory containing species data and character images
    #[arg(long, visible_alias = "species-data", default_value = "species_data")]
    species_root: PathBuf,

    /// Pixel height of the ground line
    #[arg(long)]
    size: Option<u32>,

    /// Write base64 PNG to stdout instead of a file
    #[arg(long)]
    base64: bool,

    /// Seconds to wait for each image load
    #[arg(long, default_value_t = 30)]
    timeout_secs: u64,

    /// Additional directories to search for label fonts
    #[arg(long)]
    font_dir: Vec<PathBuf>,
}

#[derive(Deserialize, Debug)]
struct Scene {
    characters: Vec<Character>,
    #[serde(default)]
    options: RenderOptions,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Render {
            input,
            output,
            render,
        } => {
            let mut scene = read_scene(&input)?;
            if let Some(size) = render.size {
                scene.options.size = size;
            }
            render_to_output(&scene.characters, scene.options, &render, &output).await?;
        }
        Commands::Layout {
            input,
            species_root,
            size,
            pretty,
        } => {
            let mut scene = read_scene(&input)?;
            if let Some(size) = size {
                scene.options.size = size;
            }
            let provider = Arc::new(ImageProvider::new(provider_config(species_root, 30)));
            let renderer: SizeDiffRenderer = SizeDiffRenderer::new(scene.options, provider)?;
            let layout = renderer
                .layout(&scene.characters)
                .await
                .context("Failed to compute layout")?;
            let json = if pretty {
                serde_json::to_string_pretty(&layout)?
            } else {
                serde_json::to_string(&layout)?
            };
            println!("{}", json);
        }
        Commands::Query {
            characters,
            query,
            measure_ears,
            scale_height,
            output,
            render,
        } => {
            let state = match (query, characters) {
                (Some(query), _) => ShareState::parse(&query)?,
                (None, Some(characters)) => ShareState {
                    characters: size_diff_rs::parse_characters(&characters),
                    measure_ears,
                    scale_height,
                    size: render.size.unwrap_or(400),
                },
                (None, None) => bail!("One of --characters or --query is required"),
            };
            if state.characters.is_empty() {
                bail!("No characters given");
            }

            let library = SpeciesLibrary::new(&render.species_root);
            let characters = library
                .resolve_all(&state.characters)
                .await
                .context("Failed to resolve characters from species data")?;
            let options = RenderOptions {
                size: render.size.unwrap_or(state.size),
                measure_to_ears: state.measure_ears,
                use_species_scaling: state.scale_height,
                ..RenderOptions::default()
            };
            render_to_output(&characters, options, &render, &output).await?;
        }
        Commands::Taur {
            anthro_height,
            species_height,
            species_length,
            tail_length,
            full_height,
            weight,
            taur_length,
            measurement,
            parts,
            pretty,
        } => {
            let input = TaurInput {
                anthro_height,
                species_height,
                species_length,
                species_tail_length: tail_length,
                taur_full_height: full_height,
                species_weight: weight,
                taur_length,
                measurement,
                custom_body_parts: parts.into_iter().collect(),
            };
            let taur = calculate_taur(&input).context("Failed to compute taur proportions")?;
            log::info!("Computed {} taur with anthro ratio {:.3}", measurement, taur.anthro_ratio);
            let json = if pretty {
                serde_json::to_string_pretty(&taur)?
            } else {
                serde_json::to_string(&taur)?
            };
            println!("{}", json);
        }
    }
    Ok(())
}

fn parse_length(s: &str) -> Result<f64, String> {
    parse_height(s).map_err(|e| e.to_string())
}

fn parse_measurement(s: &str) -> Result<TaurMeasurement, String> {
    s.parse().map_err(|e: size_diff_rs::SizeDiffError| e.to_string())
}

fn parse_body_part(s: &str) -> Result<(String, f64), String> {
    let (name, length) = s
        .split_once('=')
        .ok_or_else(|| format!("expected name=length, got {s:?}"))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("body part name is empty in {s:?}"));
    }
    Ok((name.to_string(), parse_length(length)?))
}

fn read_scene(path: &Path) -> Result<Scene> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read input file: {}", path.display()))?;
    serde_json::from_str(&text)
        .with_context(|| format!("Failed to parse input file as a scene: {}", path.display()))
}

fn provider_config(species_root: PathBuf, timeout_secs: u64) -> ImageProviderConfig {
    ImageProviderConfig {
        root: species_root,
        load_timeout: Duration::from_secs(timeout_secs),
        ..ImageProviderConfig::default()
    }
}

async fn render_to_output(
    characters: &[Character],
    options: RenderOptions,
    args: &RenderArgs,
    output: &str,
) -> Result<()> {
    let provider = Arc::new(ImageProvider::new(provider_config(
        args.species_root.clone(),
        args.timeout_secs,
    )));

    let mut renderer = if args.font_dir.is_empty() {
        SizeDiffRenderer::with_default_canvas(options, provider)?
    } else {
        let fonts = FontConfig {
            font_dirs: args.font_dir.clone(),
            ..FontConfig::default()
        }
        .resolve();
        let mut renderer = SizeDiffRenderer::new(options, provider)?;
        renderer.attach_surface(Canvas2dContext::with_resolved(1, 1, &fonts)?);
        renderer
    };

    let rendered = renderer
        .render(characters)
        .await
        .context("Failed to render size comparison")?;
    log::info!(
        "Rendered {} characters at {}x{}",
        characters.len(),
        rendered.layout.width,
        rendered.layout.height
    );

    if args.base64 || output == "-" {
        let mut stdout = std::io::stdout().lock();
        writeln!(stdout, "{}", rendered.to_base64()?)?;
    } else {
        std::fs::write(output, rendered.to_png()?)
            .with_context(|| format!("Failed to write output file: {}", output))?;
    }
    Ok(())
}
