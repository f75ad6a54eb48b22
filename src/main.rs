use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use lumen_shading::demo::{create_demo_scene, render};
use lumen_shading::shading::{ShadingConfig, ShadingVariant};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Shader revision to render with
    #[arg(long, value_enum, default_value_t = ShadingVariant::NormalMapped)]
    variant: ShadingVariant,

    #[arg(long, default_value_t = 800)]
    width: u32,

    #[arg(long, default_value_t = 600)]
    height: u32,

    /// Output PNG path
    #[arg(short, long, default_value = "frame.png")]
    output: PathBuf,

    /// Point light intensity (normal-mapped variant only)
    #[arg(long, default_value_t = 12.0)]
    light_intensity: f32,

    /// Fold the material's metallic-roughness map into the specular term
    #[arg(long)]
    metallic_roughness: bool,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    if args.width == 0 || args.height == 0 {
        anyhow::bail!("frame size must be non-zero, got {}x{}", args.width, args.height);
    }
    if args.metallic_roughness && args.variant != ShadingVariant::NormalMapped {
        log::warn!("--metallic-roughness has no effect on the {} variant", args.variant);
    }

    let mut config = ShadingConfig::for_variant(args.variant);
    config.use_metallic_roughness = args.metallic_roughness;

    let scene = create_demo_scene(args.width, args.height, args.light_intensity)
        .context("Failed to build demo scene")?;
    let image = render(&scene, config, args.width, args.height)
        .context("Failed to render frame")?;

    image
        .save(&args.output)
        .with_context(|| format!("Failed to write {}", args.output.display()))?;
    log::info!("Wrote {}", args.output.display());

    Ok(())
}
