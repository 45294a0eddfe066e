use std::sync::mpsc;
use std::sync::Arc;

mod actuator;
mod angle;
mod config;
mod constants;
mod driver_threads;
mod error;
mod flags;
mod fusion;
mod numeric;
mod packet;
mod serial;
mod sweep;
mod time;

use crate::driver_threads::{fuse_scans, sweep_actuator};
use crossbeam_channel::bounded;
use tiltscan_data::{PointCloud, RangeScan};

pub use crate::actuator::{Actuator, Dynamixel};
pub use crate::angle::AngleState;
pub use crate::config::{
    ActuatorConfig, FusionConfig, InvalidRangePolicy, SweepConfig, TiltScanConfig, ZProjection,
};
pub use crate::driver_threads::{join, DriverThreads};
pub use crate::error::{ErrorKind, TiltScanError};
pub use crate::flags::DeviceError;
pub use crate::fusion::{elevation_deg, project, raw_from_elevation, ScanFuser};
pub use crate::sweep::{SweepController, SweepTarget, TickReport};

const CLOUD_CHANNEL_SIZE: usize = 10;

/// Function to launch the scanner.
/// # Arguments
///
/// * `config` - Validated configuration. `config.actuator.port` is opened here.
/// * `scan_rx` - Incoming 2D scans.
///
/// Fails with `ErrorKind::PortInit` when the serial port cannot be opened; in that case
/// no thread is started.
pub fn run_driver(
    config: &TiltScanConfig,
    scan_rx: mpsc::Receiver<RangeScan>,
) -> Result<(DriverThreads, mpsc::Receiver<PointCloud>), TiltScanError> {
    config.validate()?;
    let mut actuator = Dynamixel::open(
        &config.actuator.port,
        config.actuator.baud_rate,
        config.actuator.id,
    )?;
    match actuator.ping() {
        Ok(()) => log::info!("Actuator {} has been successfully connected", actuator.id()),
        Err(e) => log::warn!("Actuator {} did not answer a ping: {e}", actuator.id()),
    }
    Ok(run_driver_with(actuator, config, scan_rx))
}

/// Same as [`run_driver`] with an already opened actuator.
pub fn run_driver_with<A: Actuator + Send + 'static>(
    actuator: A,
    config: &TiltScanConfig,
    scan_rx: mpsc::Receiver<RangeScan>,
) -> (DriverThreads, mpsc::Receiver<PointCloud>) {
    let angle = Arc::new(AngleState::new(config.actuator.initial_position));
    let sweep = SweepController::new(
        actuator,
        Arc::clone(&angle),
        config.sweep.clone(),
        config.actuator.id,
    );
    let moving_speed = config.actuator.moving_speed;
    let release_torque = config.actuator.release_torque_on_shutdown;

    let (sweep_terminator_tx, sweep_terminator_rx) = bounded(10);
    let sweep_thread = Some(std::thread::spawn(move || {
        sweep_actuator(sweep, moving_speed, release_torque, sweep_terminator_rx);
    }));

    let (mut driver_threads, cloud_rx) = run_fuser(&config.fusion, angle, scan_rx);
    driver_threads.sweep_terminator_tx = Some(sweep_terminator_tx);
    driver_threads.sweep_thread = sweep_thread;
    (driver_threads, cloud_rx)
}

/// Starts only the fusion thread. Clouds are built with whatever `angle` holds, which
/// lets scans keep flowing when the actuator could not be brought up.
pub fn run_fuser(
    config: &FusionConfig,
    angle: Arc<AngleState>,
    scan_rx: mpsc::Receiver<RangeScan>,
) -> (DriverThreads, mpsc::Receiver<PointCloud>) {
    let fuser = ScanFuser::new(Arc::clone(&angle), config.clone());
    let (fuser_terminator_tx, fuser_terminator_rx) = bounded(10);
    let (cloud_tx, cloud_rx) = mpsc::sync_channel::<PointCloud>(CLOUD_CHANNEL_SIZE);
    let fuser_thread = Some(std::thread::spawn(move || {
        fuse_scans(fuser, scan_rx, fuser_terminator_rx, cloud_tx);
    }));

    let driver_threads = DriverThreads {
        angle,
        sweep_terminator_tx: None,
        fuser_terminator_tx,
        sweep_thread: None,
        fuser_thread,
    };
    (driver_threads, cloud_rx)
}
