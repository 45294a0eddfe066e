use crate::actuator::Actuator;
use crate::angle::AngleState;
use crate::fusion::ScanFuser;
use crate::sweep::SweepController;
use crossbeam_channel::{Receiver, Sender};
use std::sync::mpsc;
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;
use tiltscan_data::{PointCloud, RangeScan};

const SCAN_POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Struct that contains driver threads.
pub struct DriverThreads {
    pub(crate) angle: Arc<AngleState>,
    pub(crate) sweep_terminator_tx: Option<Sender<bool>>,
    pub(crate) fuser_terminator_tx: Sender<bool>,
    pub(crate) sweep_thread: Option<JoinHandle<()>>,
    pub(crate) fuser_thread: Option<JoinHandle<()>>,
}

impl DriverThreads {
    /// Actuator position shared by both threads.
    pub fn angle(&self) -> &Arc<AngleState> {
        &self.angle
    }

    /// `false` when only the fuser is running.
    pub fn is_sweeping(&self) -> bool {
        self.sweep_thread.is_some()
    }
}

pub(crate) fn sweep_actuator<A: Actuator>(
    mut sweep: SweepController<A>,
    moving_speed: u16,
    release_torque: bool,
    terminator_rx: Receiver<bool>,
) {
    sweep.initialize(moving_speed);
    sweep.run(&terminator_rx);
    if release_torque {
        match sweep.actuator_mut().set_torque_enabled(false) {
            Ok(()) => log::info!("Actuator torque released"),
            Err(e) => log::error!("Failed to release torque: {e}"),
        }
    }
}

pub(crate) fn fuse_scans(
    fuser: ScanFuser,
    scan_rx: mpsc::Receiver<RangeScan>,
    terminator_rx: Receiver<bool>,
    cloud_tx: mpsc::SyncSender<PointCloud>,
) {
    while !do_terminate(&terminator_rx) {
        let scan = match scan_rx.recv_timeout(SCAN_POLL_INTERVAL) {
            Ok(scan) => scan,
            Err(mpsc::RecvTimeoutError::Timeout) => continue,
            Err(mpsc::RecvTimeoutError::Disconnected) => {
                log::info!("Scan input closed");
                return;
            }
        };

        match cloud_tx.try_send(fuser.fuse(&scan)) {
            Ok(()) => {}
            Err(mpsc::TrySendError::Full(_)) => log::warn!("Cloud output is full. Dropped a cloud."),
            Err(mpsc::TrySendError::Disconnected(_)) => {
                log::info!("Cloud output closed");
                return;
            }
        }
    }
}

pub(crate) fn do_terminate(terminator_rx: &Receiver<bool>) -> bool {
    terminator_rx.try_recv().unwrap_or(false)
}

fn join_thread(name: &str, thread: Option<JoinHandle<()>>) {
    if let Some(thread) = thread {
        if thread.join().is_err() {
            log::error!("The {name} thread panicked");
        }
    }
}

/// Function to join driver threads.
/// This function is automatically called when `driver_threads` is dropped.
pub fn join(driver_threads: &mut DriverThreads) {
    // A thread that already returned has dropped its receiver, so sending may fail.
    if let Some(tx) = &driver_threads.sweep_terminator_tx {
        let _ = tx.send(true);
    }
    let _ = driver_threads.fuser_terminator_tx.send(true);

    join_thread("sweep", driver_threads.sweep_thread.take());
    join_thread("fuser", driver_threads.fuser_thread.take());
}

impl Drop for DriverThreads {
    fn drop(&mut self) {
        join(self);
    }
}
