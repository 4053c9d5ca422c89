// Copyright (C) 2024 Laixer Equipment B.V.
// All rights reserved.
//
// This software may be modified and distributed under the terms
// of the included license.  See the LICENSE file for details.

use std::path::PathBuf;

use clap::{Parser, ValueHint};

use glonax::{
    input::{Keymap, KeyboardInput, ScriptInput},
    render::{JsonRenderer, LogRenderer},
    runtime::Builder,
    Config, Controller,
};

#[derive(Parser)]
#[command(author = "Copyright (C) 2024 Laixer Equipment B.V.")]
#[command(version, propagate_version = true)]
#[command(about = "Articulated arm simulator", long_about = None)]
struct Args {
    /// Configuration file.
    #[arg(
        short = 'c',
        long = "config",
        alias = "conf",
        value_name = "FILE",
        value_hint = ValueHint::FilePath
    )]
    config: Option<PathBuf>,
    /// Keyboard input device.
    #[arg(short = 'd', long, value_hint = ValueHint::FilePath)]
    device: Option<PathBuf>,
    /// Play back key events from a script file.
    #[arg(short = 's', long, value_hint = ValueHint::FilePath)]
    script: Option<PathBuf>,
    /// Stop after a number of frames.
    #[arg(long)]
    frames: Option<u64>,
    /// Frames per second.
    #[arg(long)]
    fps: Option<u32>,
    /// Write frames as JSON lines to standard output.
    #[arg(long)]
    json: bool,
    /// Quiet output (no logging).
    #[arg(long)]
    quiet: bool,
    /// Daemonize the service.
    #[arg(short = 'D', long)]
    daemon: bool,
    /// Level of verbosity.
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    use log::LevelFilter;

    let args = Args::parse();

    let mut log_config = simplelog::ConfigBuilder::new();
    if args.daemon {
        log_config.set_time_level(log::LevelFilter::Off);
        log_config.set_thread_level(log::LevelFilter::Off);
    }

    log_config.set_target_level(log::LevelFilter::Off);
    log_config.set_location_level(log::LevelFilter::Off);
    log_config.add_filter_ignore_str("mio");

    let log_level = if args.daemon {
        LevelFilter::Info
    } else if args.quiet {
        LevelFilter::Off
    } else {
        match args.verbose {
            0 => LevelFilter::Info,
            1 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    };

    let color_choice = if args.daemon {
        simplelog::ColorChoice::Never
    } else {
        simplelog::ColorChoice::Auto
    };

    // Frames go to standard output, keep the log on standard error.
    let terminal_mode = if args.json {
        simplelog::TerminalMode::Stderr
    } else {
        simplelog::TerminalMode::Mixed
    };

    simplelog::TermLogger::init(
        log_level,
        log_config.build(),
        terminal_mode,
        color_choice,
    )?;

    if args.daemon {
        log::debug!("Running service as daemon");
    }

    let mut config = match &args.config {
        Some(path) => glonax::from_file(path)?,
        None => {
            let path = std::path::Path::new(glonax::consts::DEFAULT_CONFIG_PATH);
            if path.exists() {
                glonax::from_file(path)?
            } else {
                Config::default()
            }
        }
    };

    if let Some(fps) = args.fps {
        config.runtime.frame_rate = fps;
    }

    config.validate()?;

    log::trace!("{:#?}", config);

    run(config, args).await
}

fn intro() -> String {
    format!(
        "Hello, I'm an {} 🦾. Hand me something to catch!",
        ansi_term::Color::Yellow.paint("articulated arm")
    )
}

async fn run(config: Config, args: Args) -> anyhow::Result<()> {
    let bin_name = env!("CARGO_BIN_NAME");

    log::info!("Starting {}", bin_name);
    log::debug!("Runtime version: {}", glonax::consts::VERSION);
    log::info!("{}", intro());
    log::debug!("{}", config);

    let keymap = Keymap::try_from(&config.keymap)?;

    let mut builder = Builder::from_config(&config).with_shutdown();
    if let Some(frames) = args.frames {
        builder = builder.with_frame_limit(frames);
    }
    if args.script.is_some() && args.device.is_none() {
        builder = builder.with_stop_on_input_end();
    }

    let runtime = builder.build();

    if let Some(path) = &args.script {
        let script = ScriptInput::from_file(path, &keymap)?;

        log::info!("Playing {} event(s) from {}", script.len(), path.display());

        runtime.spawn_input_device(script);
    }

    let device = match args.device {
        Some(path) => Some(path),
        None if args.script.is_none() => {
            match glonax_keyboard::discover() {
                Ok(nodes) if !nodes.is_empty() => nodes.into_iter().next(),
                Ok(_) => {
                    log::warn!("Keyboard not found");
                    None
                }
                Err(e) => {
                    log::warn!("Keyboard discovery failed: {}", e);
                    None
                }
            }
        }
        None => None,
    };

    if let Some(path) = device {
        let keyboard = KeyboardInput::new(&path, keymap).await?;

        log::info!("Listen for key events on {}", path.display());

        runtime.spawn_input_device(keyboard);
    }

    let mut controller = Controller::from(&config);

    let frames = if args.json {
        let mut renderer = JsonRenderer::new(std::io::stdout().lock());
        runtime.run(&mut controller, &mut renderer).await?
    } else {
        let mut renderer = LogRenderer::default();
        runtime.run(&mut controller, &mut renderer).await?
    };

    log::info!("Stopped after {} frame(s)", frames);

    Ok(())
}
