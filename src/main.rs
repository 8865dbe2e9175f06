use std::path::Path;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use glam::{Mat4, Vec3};

use signhands::cli::{Cli, Command};
use signhands::dispatch::ScriptedTracking;
use signhands::host::HostCall;
use signhands::{config, dae, logging, Options, PlayOutcome, Recorder};
use signhands::{AnchorEvent, Assets, Collaborators, Runtime, SignCatalog};

const FRAME: Duration = Duration::from_millis(16);

fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Load configuration file, then let the command line override it
    let options = config::load_config(&cli.configdir)?;
    let options = cli.merge_into_options(options)?;

    logging::init(options.log_level, options.log_file.as_deref().map(Path::new))?;
    log::info!("signhands starting");
    log::debug!("Configuration: {:?}", options);

    match cli.command() {
        Command::List => list(&options),
        Command::FlattenDae { path } => {
            let backup = dae::flatten_file(&path)?;
            println!("Flattened {} (original at {})", path.display(), backup.display());
            Ok(())
        }
        Command::Demo { signs } => demo(&options, &signs),
    }
}

fn list(options: &Options) -> Result<()> {
    let loaded = SignCatalog::load(&options.catalog_path);
    if let Some(problem) = loaded.problem {
        anyhow::bail!(problem);
    }
    for row in loaded.catalog.menu_rows() {
        println!("{}", row);
    }
    Ok(())
}

/// Headless session: a scripted tracker finds a surface, then each sign plays
/// and its caption is left to fade.
fn demo(options: &Options, keys: &[String]) -> Result<()> {
    let recorder = Recorder::new();
    let assets = Assets::load(&options.catalog_path, &options.scene_path, &options.clip_policy());
    let mut runtime = Runtime::new(
        assets,
        Collaborators::recorded(&recorder),
        options.runtime_settings(),
    );

    let mut tracking = ScriptedTracking::new(vec![(
        Duration::from_millis(200),
        AnchorEvent::Added(Mat4::from_translation(Vec3::new(0.0, -0.5, -1.0))),
    )]);
    runtime.start_tracking(&mut tracking);
    let delivered = tracking.join();
    runtime.frame(FRAME);
    log::info!("Tracking delivered {} event(s), session {:?}", delivered, runtime.phase());

    let signs: Vec<_> = if keys.is_empty() {
        runtime.catalog().iter().cloned().collect()
    } else {
        keys.iter()
            .filter_map(|key| {
                let sign = runtime.catalog().find(key).cloned();
                if sign.is_none() {
                    log::warn!("No sign '{}' in the catalog", key);
                }
                sign
            })
            .collect()
    };

    let linger = options.caption_delay + options.fade;
    for sign in signs {
        let outcome = runtime.play(&sign);
        println!("{:<24} {:?}", sign.menu_row(), outcome);
        if let PlayOutcome::Started { .. } = outcome {
            let mut elapsed = Duration::ZERO;
            while elapsed < linger {
                runtime.frame(FRAME);
                elapsed += FRAME;
            }
        }
    }

    for notice in recorder.notices() {
        println!("{}: {}", notice.title, notice.body);
    }
    let fades = recorder.count(|c| matches!(c, HostCall::FadeOut(..)));
    println!(
        "{} host calls, {} narrations, {} fades",
        recorder.calls().len(),
        recorder.spoken().len(),
        fades
    );
    Ok(())
}
