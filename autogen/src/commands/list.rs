//! `autogen list`: show the configuration files a run would build.

use anyhow::Result;
use autogen_batch::discover_configs;
use autogen_core::config::BatchConfig;

pub fn cmd_list(cfg: &BatchConfig, json: bool) -> Result<()> {
    let files = discover_configs(&cfg.work_dir)?;
    if json {
        let names: Vec<String> = files.iter().map(|f| f.display().to_string()).collect();
        println!("{}", serde_json::to_string_pretty(&names)?);
        return Ok(());
    }
    if files.is_empty() {
        eprintln!("No *.yaml files found in {}", cfg.work_dir.display());
        return Ok(());
    }
    for file in &files {
        println!("{}", file.display());
    }
    Ok(())
}
