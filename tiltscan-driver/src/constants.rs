pub(crate) const PACKET_HEADER: [u8; 2] = [0xFF, 0xFF];
/// Header, id, length, error/instruction and checksum.
pub(crate) const STATUS_OVERHEAD: usize = 6;
pub(crate) const BROADCAST_ID: u8 = 0xFE;

pub(crate) const INST_PING: u8 = 0x01;
pub(crate) const INST_READ: u8 = 0x02;
pub(crate) const INST_WRITE: u8 = 0x03;

// Control table, MX series with protocol 1.0
pub(crate) const ADDR_TORQUE_ENABLE: u8 = 24;
pub(crate) const ADDR_GOAL_POSITION: u8 = 30;
pub(crate) const ADDR_MOVING_SPEED: u8 = 32;
pub(crate) const ADDR_PRESENT_POSITION: u8 = 36;

pub(crate) const TORQUE_ENABLE: u8 = 1;
pub(crate) const TORQUE_DISABLE: u8 = 0;

pub(crate) const N_READ_TRIALS: usize = 3;
pub(crate) const SERIAL_TIMEOUT_MS: u64 = 10;
pub(crate) const SUPPORTED_PROTOCOL_VERSION: f32 = 1.0;
