#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

use anyhow::Result;
use log::info;
use pathsense::{log_init, FrameReport, LoggingLink, Session};
use pathsense_depth::scene::{portrait_intrinsics, ScenePreset};
use pathsense_depth::{AnalysisConfig, CameraPose};
use std::path::Path;
use tokio::sync::mpsc::unbounded_channel;
use tokio::task::{spawn_blocking, JoinHandle};

const BUFFER_WIDTH: usize = 256;
const BUFFER_HEIGHT: usize = 192;
/// Simulated sensor rate.
const TICK_HZ: f64 = 30.0;

fn flag_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.iter()
        .position(|arg| arg == flag)
        .and_then(|i| args.get(i + 1))
        .map(String::as_str)
}

#[tokio::main]
async fn main() -> Result<()> {
    log_init();

    let args: Vec<String> = std::env::args().collect();
    let config = if args.len() > 1 && !args[1].starts_with("--") {
        info!("Loading configuration from {}", args[1]);
        AnalysisConfig::load(&args[1])?
    } else if Path::new("pathsense.toml").exists() {
        info!("Loading configuration from pathsense.toml");
        AnalysisConfig::load("pathsense.toml")?
    } else {
        info!("Using default configuration");
        AnalysisConfig::default()
    };
    let frames = flag_value(&args, "--frames")
        .map(str::parse::<usize>)
        .transpose()?
        .unwrap_or(90);
    let preset = flag_value(&args, "--scene")
        .map(str::parse::<ScenePreset>)
        .transpose()?
        .unwrap_or(ScenePreset::Pole);
    info!("Replaying {frames} ticks of the {preset} scene");

    let (sender, mut receiver) = unbounded_channel::<FrameReport>();

    let producer: JoinHandle<Result<()>> = spawn_blocking(move || {
        let intrinsics =
            portrait_intrinsics(BUFFER_WIDTH, BUFFER_HEIGHT, config.grid.horizontal_fov_deg);
        let pose = CameraPose::portrait(1.4, 30.0);
        let scene = preset.build();
        let mut session = Session::new(config, Box::new(sender), Box::new(LoggingLink::default()))?;

        for tick in 0..frames {
            let frame = scene.render(
                tick as f64 / TICK_HZ,
                BUFFER_WIDTH,
                BUFFER_HEIGHT,
                pose,
                intrinsics,
            )?;
            session.on_tick(&frame);
        }
        Ok(())
    });

    let consumer = tokio::spawn(async move {
        let mut received = 0usize;
        while let Some(report) = receiver.recv().await {
            received += 1;
            let command = report
                .command
                .map_or_else(|| "-".to_string(), |command| command.to_string());
            info!(
                "Report {received}: flags [{}] haptics [{}] command {command}",
                report.analysis.flags, report.haptics
            );
        }
        received
    });

    let (produced, consumed) = futures::join!(producer, consumer);
    produced??;
    info!("Session finished, {} reports delivered", consumed?);
    Ok(())
}
