use std::io::BufRead;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::Context;
use clap::Parser;
use log::{info, warn};
use reactive_lights_core::config::ControllerConfig;
use reactive_lights_core::controller::{LogObserver, ReactiveController};
use reactive_lights_core::output::OFF;
use reactive_terminal::cli::Cli;
use reactive_terminal::settings::load_config;
use reactive_terminal::{CpalDevice, light_sink, list_input_devices};
use smart_leds::RGB8;

/// how often to check if the loop died while waiting
const POLL: Duration = Duration::from_millis(100);

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_nanos()
        .init();

    let cli = Cli::parse();

    if cli.list_devices {
        for device in list_input_devices()? {
            println!(
                "{}: {} ({} input channels)",
                device.index, device.name, device.max_input_channels
            );
        }

        return Ok(());
    }

    let mut config = load_config(&cli.config)?;
    cli.apply(&mut config);

    config.validate().context("invalid settings")?;

    match cli.solid {
        Some(color) => solid(&config, color, cli.seconds),
        None => reactive(&config, cli.seconds),
    }
}

/// resolves on Enter, on the time limit, or when `keep_going` says no
fn wait(seconds: Option<f64>, mut keep_going: impl FnMut() -> bool) {
    let (tx, rx) = flume::bounded(1);

    thread::spawn(move || {
        let mut line = String::new();

        let _ = std::io::stdin().lock().read_line(&mut line);
        let _ = tx.send(());
    });

    let deadline = seconds.map(|x| Instant::now() + Duration::from_secs_f64(x.max(0.0)));

    match deadline {
        Some(x) => info!("running for {:?}. press Enter to stop early", x - Instant::now()),
        None => info!("press Enter to stop"),
    }

    loop {
        match rx.recv_timeout(POLL) {
            Ok(()) | Err(flume::RecvTimeoutError::Disconnected) => break,
            Err(flume::RecvTimeoutError::Timeout) => {}
        }

        if deadline.is_some_and(|x| Instant::now() >= x) {
            break;
        }

        if !keep_going() {
            warn!("control loop exited on its own");
            break;
        }
    }
}

fn reactive(config: &ControllerConfig, seconds: Option<f64>) -> anyhow::Result<()> {
    let mut controller = ReactiveController::configure(
        config,
        &CpalDevice,
        light_sink(config),
        Box::new(LogObserver),
    )
    .context("failed configuring the controller")?;

    controller.start().context("failed starting")?;

    wait(seconds, || controller.is_running());

    let stopped = controller.stop();

    controller.teardown().context("failed tearing down")?;

    stopped.context("control loop failed")?;

    info!("goodbye");

    Ok(())
}

fn solid(config: &ControllerConfig, color: RGB8, seconds: Option<f64>) -> anyhow::Result<()> {
    let mut sink = light_sink(config);

    sink.open().context("failed opening the light")?;
    sink.send(color).context("failed sending the color")?;

    info!("showing {:?}", color);

    wait(seconds, || true);

    sink.send(OFF).context("failed turning the light off")?;
    sink.close().context("failed closing the light")?;

    Ok(())
}
