use std::path::PathBuf;

use clap::Parser;
use reactive_lights_core::config::ControllerConfig;
use smart_leds::RGB8;

use crate::settings::DEFAULT_CONFIG_PATH;

#[derive(Parser, Debug)]
#[command(name = "reactive-lights", about = "Drive an RGB light from the microphone")]
pub struct Cli {
    /// JSON settings file. Missing fields and a missing file use the defaults
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    pub config: PathBuf,

    /// List the audio input devices and exit
    #[arg(long)]
    pub list_devices: bool,

    /// Show a single color (r,g,b) instead of reacting to audio
    #[arg(long, value_parser = parse_rgb)]
    pub solid: Option<RGB8>,

    /// Stop after this many seconds instead of waiting for Enter
    #[arg(long)]
    pub seconds: Option<f64>,

    /// Serial port of the light
    #[arg(short, long)]
    pub port: Option<String>,

    /// Index of the input device (see --list-devices)
    #[arg(short, long)]
    pub device: Option<usize>,

    /// Don't open the serial port
    #[arg(long)]
    pub no_output: bool,
}

impl Cli {
    /// command line flags win over the settings file
    pub fn apply(&self, config: &mut ControllerConfig) {
        if let Some(port) = &self.port {
            config.output_port.clone_from(port);
        }

        if let Some(device) = self.device {
            config.device_index = Some(device);
        }

        if self.no_output {
            config.output_enabled = false;
        }
    }
}

fn parse_rgb(s: &str) -> Result<RGB8, String> {
    let channels = s
        .split(',')
        .map(|x| x.trim().parse::<u8>().map_err(|err| format!("{x:?}: {err}")))
        .collect::<Result<Vec<_>, _>>()?;

    match channels.as_slice() {
        &[r, g, b] => Ok(RGB8::new(r, g, b)),
        _ => Err(format!("expected r,g,b but got {} values", channels.len())),
    }
}
