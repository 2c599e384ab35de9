//! Isolator standalone app
//!
//! Processes the default (or configured) input device into the output
//! device and takes parameter changes on stdin.
//!
//! Log level via `RUST_LOG`, e.g. `RUST_LOG=isolator_core=debug`.

mod console;

use std::io::{self, BufRead, Write};
use std::sync::Arc;
use std::thread;

use anyhow::{Context, Result};
use crossbeam_channel::Receiver;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use isolator_core::{
    find_device, AudioStream, DeviceType, EngineConfig, Event, IsolatorParams, IsolatorSettings,
};

use console::Command;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("Starting Isolator");

    let mut settings = IsolatorSettings::load();
    let params = Arc::new(IsolatorParams::new());
    params.apply_state(&settings.state);

    let input = find_device(DeviceType::Input, settings.input_device.as_deref())
        .context("opening input device")?;
    let output = find_device(DeviceType::Output, settings.output_device.as_deref())
        .context("opening output device")?;

    let (sender, receiver) = crossbeam_channel::unbounded();
    let stream = AudioStream::new_duplex(
        EngineConfig::from_stream(settings.stream),
        &input,
        &output,
        Arc::clone(&params),
        sender.clone(),
    )
    .context("starting audio stream")?;

    let logger = thread::Builder::new()
        .name("isolator-events".into())
        .spawn(move || log_events(receiver))
        .context("spawning event thread")?;

    println!("{}", console::help());
    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let line = line.context("reading stdin")?;
        let command = match console::parse(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(e) => {
                println!("error: {}", e);
                continue;
            }
        };

        match command {
            Command::Set(id, value) => {
                params.set(id, value);
                println!("{} = {}", id.display_name(), id.format_value(params.get(id)));
                let _ = sender.try_send(Event::StateUpdate(params.get_state()));
            }
            Command::State => {
                println!("{}", serde_json::to_string_pretty(&params.get_state())?);
            }
            Command::Levels => {
                let (left, right) = stream.peaks();
                println!("L {:.3}  R {:.3}", left, right);
            }
            Command::Save => {
                settings.state = params.get_state();
                match settings.save() {
                    Ok(path) => println!("saved to {}", path.display()),
                    Err(e) => println!("error: {}", e),
                }
            }
            Command::Help => println!("{}", console::help()),
            Command::Quit => break,
        }
        io::stdout().flush()?;
    }

    stream.stop()?;
    drop(stream);
    drop(sender);
    if logger.join().is_err() {
        warn!("Event thread panicked");
    }

    info!("Isolator stopped");
    Ok(())
}

/// Runs until every sender is dropped
fn log_events(receiver: Receiver<Event>) {
    let mut underruns = 0u64;
    let mut overruns = 0u64;
    for event in receiver {
        match event {
            Event::Started {
                sample_rate,
                channels,
            } => info!(sample_rate, channels, "Processing started"),
            Event::Stopped => info!("Processing stopped"),
            Event::Error { message } => error!("Stream error: {}", message),
            Event::BufferUnderrun => {
                underruns += 1;
                // Underruns come in bursts; keep the log readable
                if underruns.is_power_of_two() {
                    warn!(underruns, "Buffer underrun");
                }
            }
            Event::BufferOverrun => {
                overruns += 1;
                if overruns.is_power_of_two() {
                    warn!(overruns, "Buffer overrun, input dropped");
                }
            }
            Event::StateUpdate(state) => tracing::debug!(?state, "State changed"),
        }
    }
}
