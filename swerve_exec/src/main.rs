//! Main drive executable entry point.
//!
//! # Architecture
//!
//! The general execution methodology consists of:
//!
//!     - Initialise all modules
//!     - Main loop:
//!         - System input acquisition:
//!             - Heading sensing
//!             - Drive position sensing
//!         - Command determination (scripted teleop or trajectory following)
//!         - Swerve control processing
//!         - Trajectory control processing
//!         - Mechanisms driver execution
//!
//! # Modules
//!
//! All control modules (e.g. `swerve_ctrl`) shall meet the following
//! requirements:
//!     1. Provide a public struct implementing the `util::module::State`
//!        trait.
//!
//! The hardware in this executable is simulated; the real vehicle binds the
//! same `hw` contracts to its actuator electronics.

// ---------------------------------------------------------------------------
// USE MODULES FROM LIBRARY
// ---------------------------------------------------------------------------

use swerve_lib::{
    data_store::{DataStore, SafeModeCause},
    diagnostics,
    hw::sim::{
        MemCalibStore, ScriptedFollower, SimDriveActuator, SimHeadingSensor, SimSteerActuator,
        TrajSample,
    },
    hw::{CalibStore, HeadingSensor},
    mech_driver::{self, MechDriver},
    module_ctrl::{SwerveModule, STEER_CALIB_KEYS},
    swerve_ctrl::{self, DriveCommand, DriveType, NUM_WHEELS, WHEEL_FL},
    traj_ctrl::{self, WheelFollower},
};

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use color_eyre::{eyre::WrapErr, Report};
use log::{info, warn};
use std::thread;
use std::time::{Duration, Instant};

// Internal
use util::{
    logger::{logger_init, LevelFilter},
    module::State,
    session::Session,
};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Target period of one cycle.
const CYCLE_PERIOD_S: f64 = 0.02;

/// Number of cycles spent in the scripted teleop phase.
const TELEOP_CYCLES: u128 = 150;

/// Limit on the total number of cycles. A following run which hasn't
/// finished by this point is abandoned - there is no retry inside the core.
const MAX_CYCLES: u128 = 1000;

/// Limit on the number of consecutive cycle overruns before the drive is
/// made safe.
const MAX_CONSEC_CYCLE_OVERRUNS: u64 = 10;

/// Simulated drive sensor ticks per cycle at full power.
const SIM_TICKS_PER_CYCLE: f64 = 28.0;

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Executable main function, entry point.
fn main() -> Result<(), Report> {

    // ---- EARLY INITIALISATION ----

    // Initialise session
    let session = Session::new(
        "swerve_exec",
        "sessions"
    ).wrap_err("Failed to create the session")?;

    // Initialise logger
    logger_init(LevelFilter::Trace, &session)
        .wrap_err("Failed to initialise logging")?;

    // Log information on this execution.
    info!("Swerve Drive Executable\n");
    info!("Session directory: {:?}\n", session.session_root);

    // ---- LOAD PARAMETERS ----

    let mech_params: mech_driver::Params = util::params::load(
        "mech_driver.toml"
    ).wrap_err("Could not load mech_driver params")?;

    info!("Exec parameters loaded");

    // ---- INITIALISE HARDWARE ----

    // The calibration store would normally be backed by persisted data;
    // here it is seeded with the simulated steering zero positions.
    let mut calib_store = MemCalibStore::default();
    for key in STEER_CALIB_KEYS.iter() {
        calib_store.put_f64(key, 512.0);
    }

    let drives = [
        SimDriveActuator::new(),
        SimDriveActuator::new(),
        SimDriveActuator::new(),
        SimDriveActuator::new(),
    ];
    let steers = [
        SimSteerActuator::new(512.0),
        SimSteerActuator::new(512.0),
        SimSteerActuator::new(512.0),
        SimSteerActuator::new(512.0),
    ];
    let mut heading_sensor = SimHeadingSensor::new(0.0);

    let modules = [
        SwerveModule::from_calib(
            drives[0].clone(),
            steers[0].clone(),
            &calib_store,
            STEER_CALIB_KEYS[0],
            mech_params.steer_ticks_per_rev,
        ),
        SwerveModule::from_calib(
            drives[1].clone(),
            steers[1].clone(),
            &calib_store,
            STEER_CALIB_KEYS[1],
            mech_params.steer_ticks_per_rev,
        ),
        SwerveModule::from_calib(
            drives[2].clone(),
            steers[2].clone(),
            &calib_store,
            STEER_CALIB_KEYS[2],
            mech_params.steer_ticks_per_rev,
        ),
        SwerveModule::from_calib(
            drives[3].clone(),
            steers[3].clone(),
            &calib_store,
            STEER_CALIB_KEYS[3],
            mech_params.steer_ticks_per_rev,
        ),
    ];
    let mut mech = MechDriver::new(modules);

    info!("Resetting heading");
    heading_sensor.reset_yaw(0.0);

    // ---- INITIALISE MODULES ----

    info!("Initialising modules...");

    let mut ds = DataStore::default();

    ds.swerve_ctrl.init("swerve_ctrl.toml")
        .wrap_err("Failed to initialise SwerveCtrl")?;
    info!("SwerveCtrl init complete");

    ds.traj_ctrl.init("traj_ctrl.toml")
        .wrap_err("Failed to initialise TrajCtrl")?;
    info!("TrajCtrl init complete");

    info!("Module initialisation complete\n");

    // ---- BRING-UP CHECK ----

    // Short open loop pulse on the front left wheel to confirm the drive
    // sensor counts
    diagnostics::run_single_wheel(&mut mech, WHEEL_FL, 0.2);
    drives[WHEEL_FL].step(SIM_TICKS_PER_CYCLE);
    info!(
        "Bring-up check: FL drive moved {} ticks at {} ticks/cycle",
        mech.drive_positions()[WHEEL_FL],
        mech.drive_velocities()[WHEEL_FL]
    );
    diagnostics::run_single_wheel(&mut mech, WHEEL_FL, 0.0);

    // ---- MAIN LOOP ----

    info!("Begining main loop\n");

    let mut following_started = false;

    loop {

        // Get cycle start time
        let cycle_start_instant = Instant::now();

        // ---- DATA INPUT ----

        let heading_deg = heading_sensor.yaw_deg();
        let drive_positions = mech.drive_positions();

        // Inject a heading disturbance partway through the teleop phase to
        // exercise the heading hold
        if ds.num_cycles == 50 {
            heading_sensor.set_yaw(5.0);
        }

        // ---- COMMAND DETERMINATION ----

        if ds.num_cycles < TELEOP_CYCLES {
            // Scripted teleop phase: field oriented drive towards field +X
            // while holding heading zero
            ds.swerve_ctrl_input = swerve_ctrl::InputData {
                cmd: Some(DriveCommand {
                    drive_type: DriveType::FieldOriented,
                    magnitude: Some(0.5),
                    direction_deg: Some(0.0),
                    target_heading_deg: Some(0.0),
                    intent: None,
                }),
                heading_deg,
            };
        }
        else if !following_started {
            // Hand over to trajectory following: reset the drive position
            // baselines and start the followers
            mech.reset_drive_positions();
            ds.traj_ctrl
                .start_following(build_followers(), 0.0)
                .wrap_err("Failed to start trajectory following")?;
            following_started = true;
        }

        // ---- CONTROL ALGORITHM PROCESSING ----

        if ds.traj_ctrl.is_following() {
            // TrajCtrl processing
            ds.traj_ctrl_input = traj_ctrl::InputData {
                drive_positions,
                heading_deg,
            };

            match ds.traj_ctrl.proc(&ds.traj_ctrl_input) {
                Ok((o, r)) => {
                    ds.traj_ctrl_output = o;
                    ds.traj_ctrl_status_rpt = r;
                },
                Err(e) => warn!("Error during TrajCtrl processing: {}", e)
            };

            if let Some(wheel_cmds) = ds.traj_ctrl_output.wheel_cmds {
                mech.apply(&wheel_cmds, ds.safe);
            }
        }
        else {
            // SwerveCtrl processing
            match ds.swerve_ctrl.proc(&ds.swerve_ctrl_input) {
                Ok((o, r)) => {
                    ds.swerve_ctrl_output = o;
                    ds.swerve_ctrl_status_rpt = r;
                },
                Err(e) => {
                    // SwerveCtrl errors usually just mean a malformed
                    // command was sent, so just issue the warning and
                    // continue.
                    warn!("Error during SwerveCtrl processing: {}", e)
                }
            };

            mech.apply(&ds.swerve_ctrl_output.wheel_cmds, ds.safe);
        }

        // ---- SIMULATION PROPAGATION ----

        for drive in drives.iter() {
            drive.step(SIM_TICKS_PER_CYCLE);
        }

        if ds.traj_ctrl_output.finished {
            info!("Trajectory finished after {} cycles", ds.num_cycles);
            break;
        }

        // ---- CYCLE MANAGEMENT ----

        let cycle_dur = Instant::now() - cycle_start_instant;

        // Get sleep duration
        match Duration::from_secs_f64(CYCLE_PERIOD_S)
            .checked_sub(cycle_dur)
        {
            Some(d) => {
                ds.num_consec_cycle_overruns = 0;
                thread::sleep(d);
            },
            None => {
                warn!(
                    "Cycle overran by {:.06} s",
                    cycle_dur.as_secs_f64()
                        - Duration::from_secs_f64(CYCLE_PERIOD_S).as_secs_f64()
                );
                ds.num_consec_cycle_overruns += 1;

                // Persistent overruns mean the loop is no longer keeping
                // real time, stop driving
                if ds.num_consec_cycle_overruns > MAX_CONSEC_CYCLE_OVERRUNS {
                    ds.make_safe(SafeModeCause::CycleOverrunLimit);
                }
            }
        }

        // Increment cycle counter
        ds.num_cycles += 1;

        if ds.num_cycles >= MAX_CYCLES {
            warn!("Cycle limit reached before the trajectory finished, stopping");
            break;
        }
    }

    // ---- SHUTDOWN ----

    // Leave the drive stopped with the steering held
    ds.make_safe(SafeModeCause::MakeSafeCmd);
    mech.apply(&ds.swerve_ctrl_output.wheel_cmds, ds.safe);

    // Save a diagnostics snapshot and persist the steering calibration for
    // the next startup
    diagnostics::save_steer_snapshot(&session, &mech);
    diagnostics::calibrate_steer_zeros(&mech, &mut calib_store);

    info!("End of execution");

    Ok(())
}

/// Build the scripted followers for the demo following run.
///
/// A real vehicle builds one follower per wheel from a generated trajectory;
/// here each wheel replays the same trapezoidal speed profile, ending in the
/// explicit zero sample which marks the end of the trajectory.
fn build_followers() -> [Box<dyn WheelFollower>; NUM_WHEELS] {
    let mut samples: Vec<TrajSample> = Vec::new();

    for i in 1..=25 {
        samples.push(TrajSample {
            speed: 0.8 * i as f64 / 25.0,
            heading_rad: 0.0,
        });
    }
    for _ in 0..50 {
        samples.push(TrajSample {
            speed: 0.8,
            heading_rad: 0.0,
        });
    }
    for i in 1..=25 {
        samples.push(TrajSample {
            speed: 0.8 * (1.0 - i as f64 / 25.0),
            heading_rad: 0.0,
        });
    }
    samples.push(TrajSample {
        speed: 0.0,
        heading_rad: 0.0,
    });

    [
        Box::new(ScriptedFollower::new(samples.clone())),
        Box::new(ScriptedFollower::new(samples.clone())),
        Box::new(ScriptedFollower::new(samples.clone())),
        Box::new(ScriptedFollower::new(samples)),
    ]
}
