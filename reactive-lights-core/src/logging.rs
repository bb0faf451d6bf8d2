//! everything in the core logs through here so the backend can change in one place
pub use log::{debug, error, info, trace, warn};
