//! Simulated hardware
//!
//! Stand-ins for the vehicle hardware used by the demo executive and the test
//! suites. The actuator handles are cheaply clonable so the simulation can be
//! stepped from outside the module controllers which own them; everything is
//! single threaded.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

// Internal
use super::{CalibStore, DriveActuator, HeadingSensor, SteerActuator};
use crate::traj_ctrl::WheelFollower;
use util::maths::clamp;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Simulated drive actuator with an integrating position sensor.
#[derive(Clone, Default)]
pub struct SimDriveActuator {
    state: Rc<RefCell<SimDriveState>>,
}

#[derive(Default)]
struct SimDriveState {
    power: f64,
    position: f64,
    velocity: f64,
}

/// Simulated steering actuator whose closed loop controller converges on the
/// setpoint within one cycle.
#[derive(Clone, Default)]
pub struct SimSteerActuator {
    position: Rc<RefCell<f64>>,
}

/// Simulated heading sensor.
#[derive(Clone, Default)]
pub struct SimHeadingSensor {
    yaw_deg: Rc<RefCell<f64>>,
}

/// In-memory calibration store.
#[derive(Default)]
pub struct MemCalibStore {
    values: HashMap<String, f64>,
}

/// A single trajectory sample consumed by the scripted follower.
#[derive(Clone, Copy, Debug)]
pub struct TrajSample {
    /// Drive speed demand (normalised units).
    pub speed: f64,

    /// Desired wheel heading, radians.
    pub heading_rad: f64,
}

/// Follower which replays a precomputed sample list, one sample per cycle.
pub struct ScriptedFollower {
    samples: Vec<TrajSample>,
    index: usize,
    current_heading_rad: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl SimDriveActuator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance the simulated position sensor by one cycle at the current
    /// power demand.
    pub fn step(&self, ticks_per_cycle_at_full_power: f64) {
        let mut state = self.state.borrow_mut();
        let velocity = state.power * ticks_per_cycle_at_full_power;
        state.velocity = velocity;
        state.position += velocity;
    }
}

impl DriveActuator for SimDriveActuator {
    fn set_power(&mut self, power: f64) {
        // A real drive controller saturates at full power
        self.state.borrow_mut().power = clamp(&power, &-1.0, &1.0);
    }

    fn position(&self) -> f64 {
        self.state.borrow().position
    }

    fn velocity(&self) -> f64 {
        self.state.borrow().velocity
    }
}

impl SimSteerActuator {
    pub fn new(initial_position: f64) -> Self {
        Self {
            position: Rc::new(RefCell::new(initial_position)),
        }
    }
}

impl SteerActuator for SimSteerActuator {
    fn set_position_setpoint(&mut self, setpoint: f64) {
        *self.position.borrow_mut() = setpoint;
    }

    fn position(&self) -> f64 {
        *self.position.borrow()
    }
}

impl SimHeadingSensor {
    pub fn new(yaw_deg: f64) -> Self {
        Self {
            yaw_deg: Rc::new(RefCell::new(yaw_deg)),
        }
    }

    /// Set the simulated yaw, e.g. to inject a disturbance.
    pub fn set_yaw(&self, yaw_deg: f64) {
        *self.yaw_deg.borrow_mut() = yaw_deg;
    }
}

impl HeadingSensor for SimHeadingSensor {
    fn yaw_deg(&self) -> f64 {
        *self.yaw_deg.borrow()
    }

    fn reset_yaw(&mut self, yaw_deg: f64) {
        *self.yaw_deg.borrow_mut() = yaw_deg;
    }
}

impl CalibStore for MemCalibStore {
    fn get_f64(&self, key: &str, default: f64) -> f64 {
        self.values.get(key).copied().unwrap_or(default)
    }

    fn put_f64(&mut self, key: &str, value: f64) {
        self.values.insert(key.to_owned(), value);
    }
}

impl ScriptedFollower {
    pub fn new(samples: Vec<TrajSample>) -> Self {
        let current_heading_rad = samples.first().map(|s| s.heading_rad).unwrap_or(0.0);

        Self {
            samples,
            index: 0,
            current_heading_rad,
        }
    }
}

impl WheelFollower for ScriptedFollower {
    fn reset(&mut self) {
        self.index = 0;
        self.current_heading_rad = self.samples.first().map(|s| s.heading_rad).unwrap_or(0.0);
    }

    fn calculate(&mut self, _position_ticks: i32) -> f64 {
        match self.samples.get(self.index) {
            Some(sample) => {
                self.index += 1;
                self.current_heading_rad = sample.heading_rad;
                sample.speed
            }
            // Beyond the end of the trajectory the follower demands a stop
            None => 0.0,
        }
    }

    fn heading_rad(&self) -> f64 {
        self.current_heading_rad
    }
}
