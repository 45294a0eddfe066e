use crate::constants::{
    ADDR_GOAL_POSITION, ADDR_MOVING_SPEED, ADDR_PRESENT_POSITION, ADDR_TORQUE_ENABLE,
    BROADCAST_ID, INST_PING, INST_READ, INST_WRITE, TORQUE_DISABLE, TORQUE_ENABLE,
};
use crate::error::TiltScanError;
use crate::numeric::{split_u16, to_u16};
use crate::packet::{instruction_packet, status_packet_size, validate_status_packet};
use crate::serial::{flush, open_port, read, send_data};
use serialport::SerialPort;

/// Single-axis position servo.
///
/// Every call is one request/response exchange with the device. Implementations report
/// transport problems and device-side error flags as distinct `TiltScanError` kinds.
pub trait Actuator {
    fn write_goal_position(&mut self, raw_angle: u16) -> Result<(), TiltScanError>;
    fn read_present_position(&mut self) -> Result<u16, TiltScanError>;
    fn set_torque_enabled(&mut self, enabled: bool) -> Result<(), TiltScanError>;
    fn set_moving_speed(&mut self, raw_speed: u16) -> Result<(), TiltScanError>;
}

/// Dynamixel servo spoken to with protocol 1.0.
pub struct Dynamixel {
    port: Box<dyn SerialPort>,
    id: u8,
}

impl Dynamixel {
    pub fn new(port: Box<dyn SerialPort>, id: u8) -> Dynamixel {
        Dynamixel { port, id }
    }

    /// Opens `port_name` at `baud_rate`. Failure here is a `PortInit` error.
    pub fn open(port_name: &str, baud_rate: u32, id: u8) -> Result<Dynamixel, TiltScanError> {
        let port = open_port(port_name, baud_rate)?;
        log::info!("Opened \"{}\" at {} baud", port_name, baud_rate);
        Ok(Dynamixel::new(port, id))
    }

    pub fn id(&self) -> u8 {
        self.id
    }

    pub fn ping(&mut self) -> Result<(), TiltScanError> {
        self.transact(INST_PING, &[], 0)?;
        Ok(())
    }

    fn write1(&mut self, address: u8, value: u8) -> Result<(), TiltScanError> {
        self.transact(INST_WRITE, &[address, value], 0)?;
        Ok(())
    }

    fn write2(&mut self, address: u8, value: u16) -> Result<(), TiltScanError> {
        let [low, high] = split_u16(value);
        self.transact(INST_WRITE, &[address, low, high], 0)?;
        Ok(())
    }

    fn read2(&mut self, address: u8) -> Result<u16, TiltScanError> {
        let params = self.transact(INST_READ, &[address, 2], 2)?;
        match params[..] {
            [low, high] => Ok(to_u16(low, high)),
            _ => Err(TiltScanError::InvalidResponseLength(2, params.len())),
        }
    }

    fn transact(
        &mut self,
        instruction: u8,
        params: &[u8],
        n_response_params: usize,
    ) -> Result<Vec<u8>, TiltScanError> {
        if !cfg!(test) {
            // In testing, disable flushing to receive dummy status packets
            flush(&mut self.port)?;
        }
        send_data(
            &mut self.port,
            &instruction_packet(self.id, instruction, params),
        )?;
        if self.id == BROADCAST_ID {
            // Broadcast instructions are never answered.
            return Ok(Vec::new());
        }
        let status = read(&mut self.port, status_packet_size(n_response_params))?;
        let response = validate_status_packet(&status, self.id, n_response_params)?;
        Ok(response.to_vec())
    }
}

impl Actuator for Dynamixel {
    fn write_goal_position(&mut self, raw_angle: u16) -> Result<(), TiltScanError> {
        self.write2(ADDR_GOAL_POSITION, raw_angle)
    }

    fn read_present_position(&mut self) -> Result<u16, TiltScanError> {
        self.read2(ADDR_PRESENT_POSITION)
    }

    fn set_torque_enabled(&mut self, enabled: bool) -> Result<(), TiltScanError> {
        let value = if enabled { TORQUE_ENABLE } else { TORQUE_DISABLE };
        self.write1(ADDR_TORQUE_ENABLE, value)
    }

    fn set_moving_speed(&mut self, raw_speed: u16) -> Result<(), TiltScanError> {
        self.write2(ADDR_MOVING_SPEED, raw_speed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::time::sleep_ms;
    use serialport::TTYPort;
    use std::io::{Read, Write};

    fn pair() -> (TTYPort, Dynamixel) {
        let (master, slave) = TTYPort::pair().expect("Unable to create ptty pair");
        let slave_ptr = Box::new(slave) as Box<dyn SerialPort>;
        (master, Dynamixel::new(slave_ptr, 1))
    }

    #[test]
    fn test_read_present_position() {
        let (mut master, mut servo) = pair();
        master
            .write_all(&[0xFF, 0xFF, 0x01, 0x04, 0x00, 0xC2, 0x01, 0x37])
            .unwrap();
        sleep_ms(10);

        assert_eq!(servo.read_present_position().unwrap(), 450);

        let mut buf = [0u8; 8];
        master.read_exact(&mut buf).unwrap();
        assert_eq!(buf, [0xFF, 0xFF, 0x01, 0x04, 0x02, 0x24, 0x02, 0xD2]);
    }

    #[test]
    fn test_write_goal_position() {
        let (mut master, mut servo) = pair();
        master.write_all(&[0xFF, 0xFF, 0x01, 0x02, 0x00, 0xFC]).unwrap();
        sleep_ms(10);

        servo.write_goal_position(500).unwrap();

        let mut buf = [0u8; 9];
        master.read_exact(&mut buf).unwrap();
        assert_eq!(buf, [0xFF, 0xFF, 0x01, 0x05, 0x03, 0x1E, 0xF4, 0x01, 0xE3]);
    }

    #[test]
    fn test_set_torque_enabled() {
        let (mut master, mut servo) = pair();
        master.write_all(&[0xFF, 0xFF, 0x01, 0x02, 0x00, 0xFC]).unwrap();
        sleep_ms(10);

        servo.set_torque_enabled(true).unwrap();

        let mut buf = [0u8; 8];
        master.read_exact(&mut buf).unwrap();
        // !(0x01 + 0x04 + 0x03 + 0x18 + 0x01) = !0x21
        assert_eq!(buf, [0xFF, 0xFF, 0x01, 0x04, 0x03, 0x18, 0x01, 0xDE]);
    }

    #[test]
    fn test_device_error() {
        let (mut master, mut servo) = pair();
        master.write_all(&[0xFF, 0xFF, 0x01, 0x02, 0x20, 0xDC]).unwrap();
        sleep_ms(10);

        let err = servo.set_moving_speed(100).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Device);
    }

    #[test]
    fn test_no_reply_is_communication_failure() {
        let (_master, mut servo) = pair();
        let err = servo.read_present_position().unwrap_err();
        assert!(matches!(err, TiltScanError::Timeout));
        assert_eq!(err.kind(), ErrorKind::Communication);
    }

    #[test]
    fn test_broadcast_read_is_an_error() {
        let (mut master, slave) = TTYPort::pair().expect("Unable to create ptty pair");
        let slave_ptr = Box::new(slave) as Box<dyn SerialPort>;
        let mut servo = Dynamixel::new(slave_ptr, BROADCAST_ID);

        let err = servo.read_present_position().unwrap_err();
        assert!(matches!(err, TiltScanError::InvalidResponseLength(2, 0)));
        assert_eq!(err.kind(), ErrorKind::Communication);

        let mut buf = [0u8; 8];
        master.read_exact(&mut buf).unwrap();
        assert_eq!(buf, [0xFF, 0xFF, 0xFE, 0x04, 0x02, 0x24, 0x02, 0xD5]);
    }

    #[test]
    fn test_open_missing_port() {
        let err = Dynamixel::open("/dev/this-port-does-not-exist", 1_000_000, 1)
            .err()
            .unwrap();
        assert_eq!(err.kind(), ErrorKind::PortInit);
    }
}
