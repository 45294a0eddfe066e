use crate::constants::{N_READ_TRIALS, SERIAL_TIMEOUT_MS};
use crate::error::TiltScanError;
use crate::time::sleep_ms;
use serialport::SerialPort;
use std::io::{Read, Write};
use std::time::Duration;

pub(crate) fn open_port(
    port_name: &str,
    baud_rate: u32,
) -> Result<Box<dyn SerialPort>, TiltScanError> {
    serialport::new(port_name, baud_rate)
        .timeout(Duration::from_millis(SERIAL_TIMEOUT_MS))
        .open()
        .map_err(|source| TiltScanError::PortInit {
            port: port_name.to_string(),
            source,
        })
}

pub(crate) fn send_data(port: &mut Box<dyn SerialPort>, data: &[u8]) -> Result<(), TiltScanError> {
    port.write_all(data)?;
    port.flush()?;
    Ok(())
}

pub(crate) fn get_n_read(port: &mut Box<dyn SerialPort>) -> Result<usize, TiltScanError> {
    let n_u32: u32 = port.bytes_to_read()?;
    Ok(n_u32.try_into().unwrap_or(0))
}

/// Drops whatever is waiting in the input buffer, e.g. a late reply to a timed out request.
pub(crate) fn flush(port: &mut Box<dyn SerialPort>) -> Result<(), TiltScanError> {
    let n_read: usize = get_n_read(port).unwrap_or(0);
    if n_read == 0 {
        return Ok(());
    }
    let mut packet: Vec<u8> = vec![0; n_read];
    port.read_exact(packet.as_mut_slice())?;
    Ok(())
}

pub(crate) fn read(
    port: &mut Box<dyn SerialPort>,
    data_size: usize,
) -> Result<Vec<u8>, TiltScanError> {
    assert!(data_size > 0);
    for _ in 0..N_READ_TRIALS {
        let n_read: usize = get_n_read(port)?;

        if n_read < data_size {
            sleep_ms(10);
            continue;
        }

        let mut packet: Vec<u8> = vec![0; data_size];
        port.read_exact(packet.as_mut_slice())?;
        return Ok(packet);
    }
    Err(TiltScanError::Timeout)
}
