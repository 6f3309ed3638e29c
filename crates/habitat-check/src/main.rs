//! Headless validator for scene documents and their module assets.
//!
//! ```text
//! habitat-check --configs public/configs --assets public station-a station-b
//! ```

mod check;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use habitat_core::assets::FsAssetSource;
use habitat_core::scene::{DEFAULT_CONFIG_ID, FsConfigSource, SceneConfigStore};

use check::{check_scene, summary_line};

#[derive(Debug, Parser)]
#[command(name = "habitat-check", version, about = "Validate scene configs and module assets")]
struct Args {
    /// Directory containing `<id>.json` scene documents
    #[arg(long, default_value = "configs")]
    configs: PathBuf,

    /// Root that web-style asset paths (`/models/x.glb`) resolve under
    #[arg(long, default_value = ".")]
    assets: PathBuf,

    /// Only parse and validate the documents
    #[arg(long)]
    skip_assets: bool,

    /// Print every module, not just failures
    #[arg(short, long)]
    verbose: bool,

    /// Scene ids to check
    ids: Vec<String>,
}

fn main() -> ExitCode {
    let args = Args::parse();

    let level = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let ids = if args.ids.is_empty() {
        vec![DEFAULT_CONFIG_ID.to_string()]
    } else {
        args.ids.clone()
    };

    let configs = FsConfigSource::new(&args.configs);
    let assets = FsAssetSource::new(&args.assets);
    let mut store = SceneConfigStore::new();
    let mut failed = 0usize;

    for id in &ids {
        let config = match store.load(&configs, id) {
            Ok(config) => config,
            Err(err) => {
                log::error!("{id}: {err}");
                failed += 1;
                continue;
            }
        };

        if args.skip_assets {
            println!(
                "scene {} \"{}\": {} descriptor(s), document ok",
                config.id,
                config.name,
                config.descriptors().count()
            );
            continue;
        }

        let report = check_scene(&config, &assets);
        println!("{}", summary_line(&report));
        for module in &report.modules {
            if args.verbose || !module.is_ok() {
                println!("  {module}");
            }
        }
        if !report.is_ok() {
            failed += 1;
        }
    }

    if failed == 0 {
        ExitCode::SUCCESS
    } else {
        log::warn!("{failed} of {} scene(s) had problems", ids.len());
        ExitCode::FAILURE
    }
}
