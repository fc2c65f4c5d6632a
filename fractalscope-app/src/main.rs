mod app_dir;
mod error;
mod input;
mod preferences;
mod session;

use std::process::ExitCode;

use tracing::{error, info, warn};

use crate::error::AppError;
use crate::preferences::AppPreferences;
use crate::session::Session;

const USAGE: &str = "\
Usage: fractalscope [EVENT ...]

Replays view events, then renders one frame and saves it as PNG.

Events:
  zoom-in[@u,v]      zoom in about (u, v) in [0,1]² (v up), default centre
  zoom-out[@u,v]     zoom out about (u, v)
  pan:du,dv          drag the view by a fraction of its size
  palette            cycle to the next palette
  palette:<name>     rainbow | fiery | psychedelic | grayscale
  set:<kind>         mandelbrot | burning-ship | tricorn
  back               undo the last zoom, drag or reset
  reset              return to the home view";

fn run(args: &[String]) -> Result<(), AppError> {
    let config = preferences::config_path();
    let prefs = AppPreferences::load_from(&config);
    if !config.exists() {
        if let Err(e) = prefs.save_to(&config) {
            warn!("Could not write default preferences: {e}");
        }
    }

    let mut session = Session::new(prefs)?;
    session.replay(args)?;
    info!(
        history = session.state().history().len(),
        events = args.len(),
        "Events applied"
    );

    let frame = session.produce()?;
    let path = session.export(&frame, &app_dir::images_directory())?;

    println!("{}", frame.status_line());
    println!("Saved {}", path.display());
    Ok(())
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.iter().any(|a| a == "-h" || a == "--help") {
        println!("{USAGE}");
        return ExitCode::SUCCESS;
    }

    info!("Starting FractalScope");
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            eprintln!("{USAGE}");
            ExitCode::FAILURE
        }
    }
}
