use std::io;
use thiserror::Error;

use crate::flags::DeviceError;

/// Broad classes of failure. Only `PortInit` and `Config` stop the driver from starting;
/// the others are reported and retried on the next tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    PortInit,
    Communication,
    Device,
    Config,
}

#[derive(Debug, Error)]
pub enum TiltScanError {
    #[error("Failed to open \"{port}\". Error: {source}")]
    PortInit {
        port: String,
        #[source]
        source: serialport::Error,
    },
    #[error("Status packet must be at least six bytes. Actually {0} bytes.")]
    InvalidHeaderLength(usize),
    #[error("Status packet must start with 0xFF 0xFF. Observed = {0}.")]
    InvalidMagicNumber(String),
    #[error("Expected status length of {0} bytes but found {1} bytes.")]
    InvalidResponseLength(usize, usize),
    #[error("Expected a status packet from id {0} but obtained one from id {1}.")]
    IdMismatch(u8, u8),
    #[error("Checksum mismatched. Calculated = {1:02X}, expected = {0:02X}.")]
    ChecksumMismatch(u8, u8),
    #[error("Device error: {0}")]
    DeviceError(DeviceError),
    #[error("Operation timed out")]
    Timeout,
    #[error(transparent)]
    SerialError(#[from] serialport::Error),
    #[error(transparent)]
    IoError(#[from] io::Error),
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
    #[error(transparent)]
    ConfigParseError(#[from] toml::de::Error),
}

impl TiltScanError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            TiltScanError::PortInit { .. } => ErrorKind::PortInit,
            TiltScanError::DeviceError(_) => ErrorKind::Device,
            TiltScanError::InvalidConfig(_) | TiltScanError::ConfigParseError(_) => {
                ErrorKind::Config
            }
            _ => ErrorKind::Communication,
        }
    }
}
