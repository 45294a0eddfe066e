use crate::actuator::Actuator;
use crate::angle::AngleState;
use crate::config::SweepConfig;
use crossbeam_channel::{Receiver, RecvTimeoutError};
use std::sync::Arc;
use std::time::Instant;

/// Which of the two setpoints the actuator is currently driven towards.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SweepTarget {
    Min,
    Max,
}

impl SweepTarget {
    pub fn toggled(self) -> SweepTarget {
        match self {
            SweepTarget::Min => SweepTarget::Max,
            SweepTarget::Max => SweepTarget::Min,
        }
    }
}

/// Outcome of a single control tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TickReport {
    /// Goal position commanded on this tick.
    pub goal: u16,
    /// Position read back, `None` if the read failed.
    pub present: Option<u16>,
    /// Whether the active target flipped for the next tick.
    pub switched: bool,
}

/// Oscillates the actuator between two raw setpoints and publishes its position.
pub struct SweepController<A: Actuator> {
    actuator: A,
    angle: Arc<AngleState>,
    config: SweepConfig,
    actuator_id: u8,
    active: SweepTarget,
}

impl<A: Actuator> SweepController<A> {
    pub fn new(
        actuator: A,
        angle: Arc<AngleState>,
        config: SweepConfig,
        actuator_id: u8,
    ) -> SweepController<A> {
        SweepController {
            actuator,
            angle,
            config,
            actuator_id,
            active: SweepTarget::Min,
        }
    }

    pub fn active(&self) -> SweepTarget {
        self.active
    }

    pub fn goal(&self) -> u16 {
        match self.active {
            SweepTarget::Min => self.config.min_position,
            SweepTarget::Max => self.config.max_position,
        }
    }

    pub fn actuator_mut(&mut self) -> &mut A {
        &mut self.actuator
    }

    /// Enables torque and sets the moving speed. Failures are logged, not returned.
    pub fn initialize(&mut self, moving_speed: u16) {
        match self.actuator.set_torque_enabled(true) {
            Ok(()) => log::info!("Actuator {} torque enabled", self.actuator_id),
            Err(e) => log::error!("Failed to enable torque: {e}"),
        }
        match self.actuator.set_moving_speed(moving_speed) {
            Ok(()) => log::info!(
                "Actuator {} moving speed set to {}",
                self.actuator_id,
                moving_speed
            ),
            Err(e) => log::error!("Failed to set moving speed: {e}"),
        }
    }

    /// Command, read back, and flip the target once settled.
    pub fn tick(&mut self) -> TickReport {
        let goal = self.goal();
        if let Err(e) = self.actuator.write_goal_position(goal) {
            log::warn!("Failed to write goal position {goal}: {e}");
        }

        let present = match self.actuator.read_present_position() {
            Ok(present) => {
                self.angle.store(present);
                Some(present)
            }
            Err(e) => {
                log::warn!("Failed to read present position: {e}");
                None
            }
        };

        let switched = match present {
            Some(present) => goal.abs_diff(present) < self.config.settle_threshold,
            None => false,
        };
        log::debug!(
            "[ID:{:03}] GoalPos:{:03}  PresPos:{:03}",
            self.actuator_id,
            goal,
            self.angle.load()
        );
        if switched {
            self.active = self.active.toggled();
            log::debug!("Reached {goal}, heading to {}", self.goal());
        }

        TickReport {
            goal,
            present,
            switched,
        }
    }

    /// Ticks at the configured rate until `terminator_rx` yields `true` or disconnects.
    pub fn run(&mut self, terminator_rx: &Receiver<bool>) {
        let period = self.config.period();
        let mut next_tick = Instant::now();
        loop {
            self.tick();

            next_tick += period;
            let now = Instant::now();
            if next_tick < now {
                // Overran the period; start counting from here.
                next_tick = now;
            }
            match terminator_rx.recv_deadline(next_tick) {
                Ok(true) | Err(RecvTimeoutError::Disconnected) => return,
                Ok(false) | Err(RecvTimeoutError::Timeout) => {}
            }
        }
    }
}
