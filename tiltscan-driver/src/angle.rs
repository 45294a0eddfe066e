use crossbeam_utils::atomic::AtomicCell;

/// Latest raw actuator position, shared between the sweep thread (writer) and the
/// fusion thread (reader).
#[derive(Debug)]
pub struct AngleState {
    position: AtomicCell<u16>,
}

impl AngleState {
    pub fn new(initial_position: u16) -> AngleState {
        AngleState {
            position: AtomicCell::new(initial_position),
        }
    }

    pub fn load(&self) -> u16 {
        self.position.load()
    }

    pub(crate) fn store(&self, position: u16) {
        self.position.store(position);
    }
}

impl Default for AngleState {
    fn default() -> AngleState {
        AngleState::new(0)
    }
}
