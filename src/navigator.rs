//! Autonomous maze walker.
//!
//! The walker keeps its right hand on the wall. On arrival at a cell it picks, in order,
//! a right turn, straight on, or a left turn, whichever side is open first, and turns
//! around at dead ends. Its continuous pose is advanced one step per simulation tick by a
//! three state machine: `Deciding` picks the next direction, `Turning` rotates the heading
//! the short way round towards it, and `Moving` slides between cell centres.
//!
//! On a perfect maze the policy walks the tree's boundary, so every cell (and in particular
//! the goal) is reached after crossing each passage at most twice.

use std::f32::consts::PI;

use error_chain::bail;
use log::{info, trace};

use crate::cells::{shortest_angle_between, CompassPrimary, GridCoordinate};
use crate::errors::*;
use crate::grid::MazeGrid;

/// Below this remaining angle (radians) a turn snaps to its target heading.
pub const TURN_SNAP_THRESHOLD: f32 = 0.05;

/// Per tick speeds of the walker.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct MotionSpeeds {
    /// Fraction of a cell covered per tick.
    pub move_speed: f32,
    /// Radians turned per tick.
    pub turn_speed: f32,
}

impl Default for MotionSpeeds {
    fn default() -> MotionSpeeds {
        MotionSpeeds {
            move_speed: 0.08,
            turn_speed: 0.03,
        }
    }
}

/// Where the walker is and which way it is looking.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Pose {
    /// The cell the walker occupies, or is leaving while a move is in progress.
    pub cell: GridCoordinate,
    /// The discrete facing used to pick and make the next move.
    pub facing: CompassPrimary,
    /// Continuous heading in [0, 2π), clockwise from North. Equal to `facing.heading()`
    /// whenever the walker is not mid-turn.
    pub heading: f32,
    /// Destination of the move in progress.
    pub destination: Option<GridCoordinate>,
    /// Fraction of the move in progress, in [0, 1).
    pub progress: f32,
}

impl Pose {
    pub fn at_rest(cell: GridCoordinate, facing: CompassPrimary) -> Pose {
        Pose {
            cell,
            facing,
            heading: facing.heading(),
            destination: None,
            progress: 0.0,
        }
    }

    /// Position in grid units, where cell (x, z) is centred on (x, z). Linearly interpolated
    /// between the source and destination centres while moving.
    pub fn position(&self) -> (f32, f32) {
        let (x0, z0) = (self.cell.x as f32, self.cell.z as f32);
        match self.destination {
            Some(destination) => {
                let (x1, z1) = (destination.x as f32, destination.z as f32);
                (x0 + (x1 - x0) * self.progress, z0 + (z1 - z0) * self.progress)
            }
            None => (x0, z0),
        }
    }

    /// Position in a renderer's world frame where the grid is centred on the origin and each
    /// cell is `cell_size` units wide.
    pub fn world_position(&self, cell_size: f32, grid_size: usize) -> (f32, f32) {
        let (x, z) = self.position();
        let half = grid_size as f32 / 2.0;
        ((x - half) * cell_size, (z - half) * cell_size)
    }
}

/// The direction the right-hand rule picks at a cell, and whether to step that way.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Decision {
    pub direction: CompassPrimary,
    /// False only at a dead end, where the walker just turns around.
    pub advance: bool,
}

/// Right-hand rule: right, else straight, else left, else turn back without advancing.
pub fn decide(grid: &MazeGrid, cell: GridCoordinate, facing: CompassPrimary) -> Decision {
    [facing.right(), facing, facing.left()]
        .iter()
        .cloned()
        .find(|dir| grid.is_open(cell, *dir))
        .map(|direction| Decision { direction, advance: true })
        .unwrap_or(Decision {
            direction: facing.opposite(),
            advance: false,
        })
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub enum MotionState {
    Deciding,
    Turning { target: CompassPrimary },
    Moving { destination: GridCoordinate, progress: f32 },
    /// The goal has been reached. Nothing changes until a new navigator replaces this one.
    Completed,
}

/// What one tick did.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum TickEvent {
    /// A decision was made without moving or turning this tick.
    Decided(Decision),
    /// The heading rotated. `finished` is set on the tick that snapped to the target.
    Turned { finished: bool },
    /// A move advanced but has not reached the next cell.
    Advanced,
    /// A move finished at a cell that is not the goal.
    Arrived(GridCoordinate),
    /// A move finished at the goal. Emitted exactly once per navigator.
    MazeCompleted,
    /// Nothing happens once the maze is completed.
    Idle,
}

impl TickEvent {
    #[inline]
    pub fn is_completion(&self) -> bool {
        *self == TickEvent::MazeCompleted
    }
}

#[derive(Debug, Clone)]
pub struct Navigator {
    pose: Pose,
    state: MotionState,
    start: GridCoordinate,
    goal: GridCoordinate,
    speeds: MotionSpeeds,
    moves_made: usize,
}

impl Navigator {
    /// Place a walker on `start`, facing its first open side scanning North, East, South, West.
    pub fn new(grid: &MazeGrid,
               start: GridCoordinate,
               goal: GridCoordinate,
               speeds: MotionSpeeds)
               -> Result<Navigator> {

        if !grid.is_valid_coordinate(start) || !grid.is_valid_coordinate(goal) {
            bail!(ErrorKind::InvalidConfiguration(format!("start {} or goal {} is outside the {}x{} maze",
                                                          start, goal, grid.size().0, grid.size().0)));
        }
        if !(speeds.move_speed.is_finite() && speeds.move_speed > 0.0) ||
           !(speeds.turn_speed.is_finite() && speeds.turn_speed > 0.0) {
            bail!(ErrorKind::InvalidConfiguration(format!("speeds must be finite and positive, got {:?}",
                                                          speeds)));
        }

        let facing = grid.walls(start)
            .and_then(|walls| walls.first_open_side())
            .ok_or_else(|| Error::from(ErrorKind::MalformedMaze(start)))?;

        Ok(Navigator {
            pose: Pose::at_rest(start, facing),
            state: MotionState::Deciding,
            start,
            goal,
            speeds,
            moves_made: 0,
        })
    }

    #[inline]
    pub fn pose(&self) -> &Pose {
        &self.pose
    }

    #[inline]
    pub fn state(&self) -> MotionState {
        self.state
    }

    #[inline]
    pub fn start(&self) -> GridCoordinate {
        self.start
    }

    #[inline]
    pub fn goal(&self) -> GridCoordinate {
        self.goal
    }

    #[inline]
    pub fn is_completed(&self) -> bool {
        self.state == MotionState::Completed
    }

    /// Completed cell to cell moves so far.
    #[inline]
    pub fn moves_made(&self) -> usize {
        self.moves_made
    }

    /// Advance the walker by one simulation tick. `grid` must be the maze this navigator
    /// was created for.
    pub fn tick(&mut self, grid: &MazeGrid) -> TickEvent {
        match self.state {
            MotionState::Deciding => self.tick_deciding(grid),
            MotionState::Turning { target } => self.tick_turning(grid, target),
            MotionState::Moving { destination, progress } => self.tick_moving(destination, progress),
            MotionState::Completed => TickEvent::Idle,
        }
    }

    fn tick_deciding(&mut self, grid: &MazeGrid) -> TickEvent {
        let decision = decide(grid, self.pose.cell, self.pose.facing);
        trace!("At {} facing {:?}: {:?}", self.pose.cell, self.pose.facing, decision);

        if decision.direction != self.pose.facing {
            self.state = MotionState::Turning { target: decision.direction };
        } else if decision.advance {
            self.begin_move(grid);
        }
        TickEvent::Decided(decision)
    }

    fn tick_turning(&mut self, grid: &MazeGrid, target: CompassPrimary) -> TickEvent {
        let target_heading = target.heading();
        let remaining = shortest_angle_between(self.pose.heading, target_heading);

        if remaining.abs() < TURN_SNAP_THRESHOLD {
            self.pose.heading = target_heading;
            self.pose.facing = CompassPrimary::from_heading(target_heading);
            if grid.is_open(self.pose.cell, self.pose.facing) {
                self.begin_move(grid);
            } else {
                self.state = MotionState::Deciding;
            }
            TickEvent::Turned { finished: true }
        } else {
            let step = self.speeds.turn_speed.min(remaining.abs()).copysign(remaining);
            self.pose.heading = normalise_heading(self.pose.heading + step);
            TickEvent::Turned { finished: false }
        }
    }

    fn tick_moving(&mut self, destination: GridCoordinate, progress: f32) -> TickEvent {
        let progress = progress + self.speeds.move_speed;

        if progress < 1.0 {
            self.pose.progress = progress;
            self.state = MotionState::Moving { destination, progress };
            return TickEvent::Advanced;
        }

        self.pose.cell = destination;
        self.pose.destination = None;
        self.pose.progress = 0.0;
        self.moves_made += 1;

        if destination == self.goal {
            info!("Maze completed at {} after {} moves", destination, self.moves_made);
            self.state = MotionState::Completed;
            TickEvent::MazeCompleted
        } else {
            self.state = MotionState::Deciding;
            TickEvent::Arrived(destination)
        }
    }

    fn begin_move(&mut self, grid: &MazeGrid) {
        match grid.passage_towards(self.pose.cell, self.pose.facing) {
            Some(destination) => {
                self.pose.destination = Some(destination);
                self.pose.progress = 0.0;
                self.state = MotionState::Moving { destination, progress: 0.0 };
            }
            None => self.state = MotionState::Deciding,
        }
    }
}

fn normalise_heading(angle: f32) -> f32 {
    angle.rem_euclid(2.0 * PI)
}
