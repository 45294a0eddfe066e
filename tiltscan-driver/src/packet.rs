use crate::constants::{PACKET_HEADER, STATUS_OVERHEAD};
use crate::error::TiltScanError;
use crate::flags::DeviceError;
use crate::numeric::to_string;

/// Protocol 1.0 checksum over everything between the header and the checksum byte.
pub(crate) fn calc_checksum(body: &[u8]) -> u8 {
    let sum = body.iter().fold(0u8, |acc, e| acc.wrapping_add(*e));
    !sum
}

pub(crate) fn instruction_packet(id: u8, instruction: u8, params: &[u8]) -> Vec<u8> {
    let mut packet = Vec::with_capacity(STATUS_OVERHEAD + params.len());
    packet.extend_from_slice(&PACKET_HEADER);
    packet.push(id);
    packet.push((params.len() + 2) as u8);
    packet.push(instruction);
    packet.extend_from_slice(params);
    packet.push(calc_checksum(&packet[2..]));
    packet
}

pub(crate) fn status_packet_size(n_params: usize) -> usize {
    STATUS_OVERHEAD + n_params
}

/// Checks a complete status packet and returns its parameters.
pub(crate) fn validate_status_packet(
    packet: &[u8],
    id: u8,
    n_params: usize,
) -> Result<&[u8], TiltScanError> {
    if packet.len() < STATUS_OVERHEAD {
        return Err(TiltScanError::InvalidHeaderLength(packet.len()));
    }
    if packet[0..2] != PACKET_HEADER {
        return Err(TiltScanError::InvalidMagicNumber(to_string(&packet[0..2])));
    }
    if packet[2] != id {
        return Err(TiltScanError::IdMismatch(id, packet[2]));
    }
    let length = packet[3] as usize;
    if length != n_params + 2 || packet.len() != status_packet_size(n_params) {
        return Err(TiltScanError::InvalidResponseLength(
            status_packet_size(n_params),
            length + 4,
        ));
    }
    let last = packet.len() - 1;
    let calculated = calc_checksum(&packet[2..last]);
    if calculated != packet[last] {
        return Err(TiltScanError::ChecksumMismatch(packet[last], calculated));
    }
    match packet[4] {
        0 => Ok(&packet[5..last]),
        error => Err(TiltScanError::DeviceError(DeviceError(error))),
    }
}
