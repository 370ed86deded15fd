//! planetgen: generate a planet, moon or gas giant from a RON config and
//! report what came out.

mod config;

use anyhow::{Context, Result};
use planetgen::{Biome, BiomeTable, GenerationContext, Generator};
use serde::Serialize;

use config::{CliConfig, SurfacePreview};

#[derive(Serialize)]
struct SurfaceDump<'a> {
    tile: usize,
    biome: Biome,
    resolution: usize,
    map_size: f32,
    heights: &'a [f32],
}

fn write_ron<T: Serialize + ?Sized>(path: &std::path::Path, value: &T) -> Result<()> {
    let text = ron::ser::to_string_pretty(value, ron::ser::PrettyConfig::default())?;
    std::fs::write(path, text).with_context(|| format!("writing {:?}", path))?;
    log::info!("Wrote {:?}", path);
    Ok(())
}

fn print_census(gen: &Generator) {
    let total = gen.tile_count().max(1);
    println!("{:?} with {} tiles (seed {})", gen.kind(), gen.tile_count(), gen.config().seed);
    for (biome, count) in gen.biome_census() {
        println!("  {:<14} {:>7} {:>6.1}%", format!("{:?}", biome), count, count as f32 * 100.0 / total as f32);
    }
    println!(
        "  rivers: {}  lava flows: {}  craters: {}  cave clusters: {}",
        gen.rivers().len(),
        gen.lava_flows().len(),
        gen.crater_count(),
        gen.cave_clusters().len()
    );
}

fn write_surface(gen: &Generator, preview: &SurfacePreview) -> Result<()> {
    let map = gen
        .surface_heightmap(preview.tile, &preview.settings)
        .with_context(|| format!("carving surface for tile {}", preview.tile))?;
    let biome = gen.tile(preview.tile)?.biome;
    write_ron(
        &preview.out,
        &SurfaceDump {
            tile: preview.tile,
            biome,
            resolution: map.resolution(),
            map_size: map.map_size(),
            heights: map.heights(),
        },
    )
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let arg = std::env::args_os().nth(1).map(std::path::PathBuf::from);
    let config = CliConfig::load(arg.as_deref())?;

    let mut biomes = BiomeTable::builtin();
    if let Some(path) = &config.biome_table {
        biomes.merge(BiomeTable::load(path).with_context(|| format!("loading biome table {:?}", path))?);
    }

    let ctx = GenerationContext::new(biomes).with_batch_size(config.batch_size);
    let mut gen = Generator::new(config.body, config.planet.clone(), ctx).context("invalid generation config")?;
    gen.run().context("generation failed")?;

    print_census(&gen);
    if let Some(out) = &config.tiles_out {
        write_ron(out, gen.tiles()?)?;
    }
    if let Some(preview) = &config.surface {
        write_surface(&gen, preview)?;
    }
    Ok(())
}
