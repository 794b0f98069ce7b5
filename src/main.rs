use std::io::{self, BufRead, Write};

use anyhow::Context;
use log::error;
use phong_gltf::{config::Config, flow};

/// Scene file name from the first argument, or asked for on stdin.
fn scene_file_name() -> anyhow::Result<String> {
    if let Some(name) = std::env::args().nth(1) {
        return Ok(name);
    }
    print!("Enter the glTF file name: ");
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin()
        .lock()
        .read_line(&mut line)
        .context("Failed to read the file name")?;
    let name = line.trim();
    anyhow::ensure!(!name.is_empty(), "No glTF file name given");
    Ok(name.to_string())
}

fn try_main() -> anyhow::Result<()> {
    let config = Config::load(Config::default_path())?;
    let scene_path = config.scene_path(&scene_file_name()?);
    flow::run(config, scene_path)
}

fn main() {
    if let Err(e) = env_logger::try_init() {
        println!("Warning: Could not initialize logger: {}", e);
    }

    if let Err(e) = try_main() {
        error!("{e:#}");
        std::process::exit(1);
    }
}
