pub mod audio;
pub mod cli;
pub mod serial;
pub mod settings;

pub use audio::{CpalDevice, list_input_devices};
pub use serial::{SerialSink, light_sink};
