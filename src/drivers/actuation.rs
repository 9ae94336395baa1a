//! Actuator link to the bin's servo controller.
//!
//! Wire format is one ASCII line per accepted item: `"<label>\n"`.  There
//! is no acknowledgement and no retry; a command either leaves the port or
//! the failure is reported to the caller and dropped.
//!
//! Concrete channels:
//! - [`SerialActuator`] over any `std::io::Write` (the UART in production)
//! - [`NullChannel`] when no link could be opened

use std::io::Write;

use log::{info, warn};

use crate::app::ports::ActuationChannel;
use crate::error::ActuationError;

/// Longest label the servo controller's line buffer accepts.
pub const MAX_LABEL_LEN: usize = 63;

/// Encode a label as a command line.
///
/// Labels must be non-empty printable ASCII; anything else is rejected
/// before touching the port.
pub fn encode_command(label: &str) -> Result<Vec<u8>, ActuationError> {
    let valid = !label.is_empty()
        && label.len() <= MAX_LABEL_LEN
        && label.bytes().all(|b| b.is_ascii_graphic() || b == b' ');
    if !valid {
        return Err(ActuationError::WriteFailed);
    }
    let mut line = Vec::with_capacity(label.len() + 1);
    line.extend_from_slice(label.as_bytes());
    line.push(b'\n');
    Ok(line)
}

/// Fire-and-forget writer over a byte stream.
pub struct SerialActuator<W> {
    port: W,
    commands_sent: u64,
}

impl<W: Write> SerialActuator<W> {
    pub fn new(port: W) -> Self {
        Self {
            port,
            commands_sent: 0,
        }
    }

    pub fn commands_sent(&self) -> u64 {
        self.commands_sent
    }

    pub fn get_ref(&self) -> &W {
        &self.port
    }
}

impl<W: Write> ActuationChannel for SerialActuator<W> {
    fn send(&mut self, label: &str) -> Result<(), ActuationError> {
        let line = encode_command(label).inspect_err(|_| {
            warn!("Actuator: refusing unencodable label {label:?}");
        })?;
        self.port
            .write_all(&line)
            .and_then(|()| self.port.flush())
            .map_err(|e| {
                warn!("Actuator: write failed: {e}");
                ActuationError::WriteFailed
            })?;
        self.commands_sent += 1;
        info!(">>> Actuator: sent {label}");
        Ok(())
    }

    fn is_connected(&self) -> bool {
        true
    }
}

/// Channel used when no actuator link is available.  Every send reports
/// [`ActuationError::Unavailable`] without blocking.
pub struct NullChannel;

impl ActuationChannel for NullChannel {
    fn send(&mut self, _label: &str) -> Result<(), ActuationError> {
        Err(ActuationError::Unavailable)
    }

    fn is_connected(&self) -> bool {
        false
    }
}
