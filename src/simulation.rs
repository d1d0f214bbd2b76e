use crate::config::SimulationConfig;
#[cfg(feature = "debug")]
use crate::debug::take_debug_frame;
use crate::error::ConfigError;
use crate::parking::{plan_parking, select_target, SpotId};
use crate::planner::GridPlanner;
use crate::render::{Canvas, Frame, SpotView};
use crate::vehicle::{MotionState, Vehicle};
use crate::world::World;
use rand::rngs::StdRng;
use rand::SeedableRng;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// An external command.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Command {
    Start,
    Pause,
    Reset,
}

/// How a run of the simulation ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Outcome {
    /// The vehicle parked in the given spot.
    Parked(SpotId),
    /// The vehicle gave up after the given number of attempts.
    Exhausted(usize),
}

/// An autonomous parking simulation.
///
/// The vehicle picks a vacant spot, plans a route to it and drives in. If it
/// cannot reach the spot, or hits something on the way, it returns to its
/// start and tries another spot, up to a fixed number of attempts.
pub struct Simulation {
    /// The parameters of the simulation.
    config: SimulationConfig,
    /// A fixed layout to restore on reset, instead of generating one.
    layout: Option<World>,
    /// The current parking lot.
    world: World,
    /// Plans routes across the lot.
    planner: GridPlanner,
    /// The vehicle being parked.
    vehicle: Vehicle,
    /// Lays out new worlds.
    rng: StdRng,
    /// Spots that have been tried and failed.
    failed: BTreeSet<SpotId>,
    /// The number of spots selected so far.
    attempts: usize,
    /// The spot currently being attempted.
    active: Option<SpotId>,
    /// A human-readable description of what is happening.
    status: String,
    /// The status to restore when resuming from a pause.
    paused_status: Option<String>,
    /// Whether ticks are being processed.
    running: bool,
    /// The number of ticks processed since the last reset.
    tick: usize,
    /// Set once the run has ended.
    outcome: Option<Outcome>,
    /// Debugging information from the previously simulated tick.
    #[cfg(feature = "debug")]
    debug: serde_json::Value,
}

impl Simulation {
    /// Creates a new, paused simulation with a randomly generated parking lot.
    pub fn new(config: SimulationConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let mut rng = StdRng::seed_from_u64(config.seed);
        let world = World::generate(&config.world, &mut rng);
        Ok(Self::build(config, None, world, rng))
    }

    /// Creates a new, paused simulation of the given parking lot.
    /// Resetting restores the same lot.
    pub fn with_world(config: SimulationConfig, world: World) -> Result<Self, ConfigError> {
        config.validate_within(&world.bounds())?;
        let rng = StdRng::seed_from_u64(config.seed);
        Ok(Self::build(config, Some(world.clone()), world, rng))
    }

    fn build(config: SimulationConfig, layout: Option<World>, world: World, rng: StdRng) -> Self {
        let bounds = world.bounds();
        let mut vehicle = Vehicle::new(&config.vehicle, config.start);
        vehicle.set_bounds(Some(bounds));
        Self {
            planner: GridPlanner::covering(&bounds, config.cell_size),
            config,
            layout,
            world,
            vehicle,
            rng,
            failed: BTreeSet::new(),
            attempts: 0,
            active: None,
            status: "Ready to start".into(),
            paused_status: None,
            running: false,
            tick: 0,
            outcome: None,
            #[cfg(feature = "debug")]
            debug: serde_json::Value::Null,
        }
    }

    /// Applies an external command.
    pub fn apply(&mut self, command: Command) {
        match command {
            Command::Start => self.start(),
            Command::Pause => self.pause(),
            Command::Reset => self.reset(),
        }
    }

    /// Starts or resumes processing ticks.
    pub fn start(&mut self) {
        if self.running {
            return;
        }
        self.running = true;
        if let Some(status) = self.paused_status.take() {
            self.status = status;
        }
        log::info!("started at tick {}", self.tick);
    }

    /// Stops processing ticks until [Self::start] is called.
    pub fn pause(&mut self) {
        if !self.running {
            return;
        }
        self.running = false;
        self.paused_status = Some(std::mem::replace(&mut self.status, "Paused".into()));
        log::info!("paused at tick {}", self.tick);
    }

    /// Lays out a new parking lot and puts the vehicle back at its start.
    /// The simulation is left paused.
    pub fn reset(&mut self) {
        self.world = match &self.layout {
            Some(layout) => layout.clone(),
            None => World::generate(&self.config.world, &mut self.rng),
        };
        self.vehicle.reset();
        self.failed.clear();
        self.attempts = 0;
        self.active = None;
        self.status = "Reset".into();
        self.paused_status = None;
        self.running = false;
        self.tick = 0;
        self.outcome = None;
        log::info!("reset");
    }

    /// Advances the simulation by one tick. Does nothing while paused or
    /// once the run has ended.
    pub fn step(&mut self) {
        if !self.running || self.outcome.is_some() {
            return;
        }

        let before = self.vehicle.state();
        self.vehicle.update(self.world.obstacles());
        let after = self.vehicle.state();

        let mut retry_next_tick = false;
        if before != after && after == MotionState::Idle {
            match (before, self.active) {
                (MotionState::Parking, Some(spot)) => {
                    self.finish(Outcome::Parked(spot), "Successfully parked!".into());
                }
                (MotionState::Returning, active) => {
                    if let Some(spot) = active {
                        self.failed.insert(spot);
                    }
                    self.status = format!(
                        "Parking attempt {} failed, trying new spot",
                        self.attempts
                    );
                    log::info!("{}", self.status);
                    retry_next_tick = true;
                }
                _ => {}
            }
        }

        if after == MotionState::Idle && self.outcome.is_none() && !retry_next_tick {
            self.next_attempt();
        }

        self.tick += 1;

        #[cfg(feature = "debug")]
        {
            self.debug = take_debug_frame();
        }
    }

    /// Selects a spot and sets the vehicle off towards it. Spots that cannot
    /// be reached are marked as failed and the next one is tried straight away.
    ///
    /// Failed spots are already excluded from selection, so the selection
    /// index only counts attempts that did not leave a spot in the failed set.
    fn next_attempt(&mut self) {
        let max_attempts = self.config.max_attempts;
        loop {
            if self.attempts >= max_attempts {
                let status = format!("No parking available after {} attempts", max_attempts);
                self.finish(Outcome::Exhausted(self.attempts), status);
                return;
            }

            let target = select_target(
                &self.vehicle.pose(),
                self.world.spots(),
                self.world.obstacles(),
                &self.failed,
                self.attempts.saturating_sub(self.failed.len()),
            );
            let target = match target {
                Some(target) => target,
                None => {
                    let status = "No valid parking spots found".into();
                    self.finish(Outcome::Exhausted(self.attempts), status);
                    return;
                }
            };

            self.attempts += 1;
            self.active = Some(target);
            let plan = plan_parking(
                &self.planner,
                self.vehicle.position(),
                self.world.spots(),
                target,
                self.world.obstacles(),
            );

            match plan {
                Some(plan) => {
                    log::debug!(
                        "planned {} waypoints to spot {:?}",
                        plan.path.len(),
                        target
                    );
                    self.vehicle
                        .set_path(plan.path, plan.maneuver_start, self.attempts);
                    self.vehicle.start_parking();
                    self.status = format!(
                        "Attempting parking in spot {}/{}",
                        self.attempts, max_attempts
                    );
                    log::info!("{}", self.status);
                    return;
                }
                None => {
                    log::info!("no route to spot {:?}, marking it failed", target);
                    self.failed.insert(target);
                }
            }
        }
    }

    fn finish(&mut self, outcome: Outcome, status: String) {
        log::info!("{} ({:?} at tick {})", status, outcome, self.tick);
        self.outcome = Some(outcome);
        self.status = status;
        self.running = false;
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn vehicle(&self) -> &Vehicle {
        &self.vehicle
    }

    /// A human-readable description of what the simulation is doing.
    pub fn status(&self) -> &str {
        &self.status
    }

    /// The number of spots selected since the last reset.
    pub fn attempts(&self) -> usize {
        self.attempts
    }

    pub fn max_attempts(&self) -> usize {
        self.config.max_attempts
    }

    /// The spots that have been tried and failed since the last reset.
    pub fn failed_spots(&self) -> &BTreeSet<SpotId> {
        &self.failed
    }

    /// The spot most recently selected.
    pub fn active_spot(&self) -> Option<SpotId> {
        self.active
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Gets the number of ticks processed since the last reset.
    pub fn tick(&self) -> usize {
        self.tick
    }

    /// How the run ended, if it has.
    pub fn outcome(&self) -> Option<Outcome> {
        self.outcome
    }

    /// Takes a snapshot of everything a renderer needs.
    pub fn frame(&self) -> Frame {
        let vehicle = &self.vehicle;
        Frame {
            tick: self.tick,
            running: self.running,
            state: vehicle.state(),
            outcome: self.outcome,
            status: self.status.clone(),
            attempts: self.attempts,
            max_attempts: self.config.max_attempts,
            vehicle: vehicle.corners(),
            heading_indicator: vehicle.heading_indicator(),
            path: vehicle.path().to_vec(),
            cursor: vehicle.cursor(),
            path_colour: vehicle.path_colour(),
            spots: self
                .world
                .spots()
                .iter()
                .enumerate()
                .map(|(idx, spot)| SpotView {
                    spot: *spot,
                    active: self.active == Some(SpotId(idx)),
                })
                .collect(),
            obstacles: self.world.obstacles().to_vec(),
        }
    }

    /// Draws the current state onto the canvas.
    pub fn draw<C: Canvas + ?Sized>(&self, canvas: &mut C) {
        self.frame().draw(canvas);
    }

    /// Gets debugging information from the previously simulated tick.
    #[cfg(feature = "debug")]
    pub fn debug(&self) -> serde_json::Value {
        self.debug.clone()
    }
}
