//! Runs the screensaver loop: one maze at a time, walked until the goal is reached, then
//! replaced by a fresh maze after a pause.

use std::time::Duration;

use log::{debug, info};
use rand::Rng;

use crate::cells::GridCoordinate;
use crate::errors::*;
use crate::generators;
use crate::grid::MazeGrid;
use crate::grid_displays::{CellOverlay, WalkerDisplay};
use crate::navigator::{MotionSpeeds, Navigator, TickEvent};
use crate::scheduler::{AnimationDriver, FpsCounter};
use crate::settings::MazeSettings;

/// A maze and the walker exploring it. Always replaced as a whole so the walker never sees
/// a grid it was not created for.
#[derive(Debug, Clone)]
pub struct Maze {
    grid: MazeGrid,
    navigator: Navigator,
}

impl Maze {
    /// Place a walker on the top left corner of `grid`, heading for the bottom right corner.
    pub fn new(grid: MazeGrid, speeds: MotionSpeeds) -> Result<Maze> {
        let last = (grid.size().0 as u32).saturating_sub(1);
        let start = GridCoordinate::new(0, 0);
        let goal = GridCoordinate::new(last, last);
        let navigator = Navigator::new(&grid, start, goal, speeds)?;
        Ok(Maze { grid, navigator })
    }

    pub fn generate<R: Rng>(settings: &MazeSettings, rng: &mut R) -> Result<Maze> {
        settings.validate()?;
        let grid = generators::recursive_backtracker(settings.grid_size(), rng)?;
        let maze = Maze::new(grid, settings.motion_speeds())?;
        info!("New maze from {} to {}", maze.start(), maze.goal());
        Ok(maze)
    }

    #[inline]
    pub fn grid(&self) -> &MazeGrid {
        &self.grid
    }

    #[inline]
    pub fn navigator(&self) -> &Navigator {
        &self.navigator
    }

    #[inline]
    pub fn start(&self) -> GridCoordinate {
        self.navigator.start()
    }

    #[inline]
    pub fn goal(&self) -> GridCoordinate {
        self.navigator.goal()
    }

    /// Advance the walker one tick through its own grid.
    pub fn tick(&mut self) -> TickEvent {
        self.navigator.tick(&self.grid)
    }

    /// The maze as text with the start, goal and walker marked.
    pub fn render(&self) -> String {
        let display = WalkerDisplay::new(self.start(), self.goal(), self.navigator.pose());
        self.grid.render(Some(&display as &dyn CellOverlay))
    }
}

/// What happened during one display frame.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum FrameReport {
    /// The animation is stopped and no restart is pending.
    Stopped,
    /// The frame came too soon after the last tick.
    Skipped,
    Ticked(TickEvent),
    /// The maze was completed and the next one is not due yet.
    AwaitingRestart,
    /// A fresh maze was generated and the animation restarted.
    Restarted,
}

pub struct MazeSession<R: Rng> {
    settings: MazeSettings,
    rng: R,
    maze: Maze,
    driver: AnimationDriver,
    restart_countdown: Option<Duration>,
    fps: FpsCounter,
    completed_count: usize,
    ticks: u64,
}

impl<R: Rng> MazeSession<R> {
    /// Validate the settings and build the first maze. The animation starts stopped.
    pub fn new(settings: MazeSettings, mut rng: R) -> Result<MazeSession<R>> {
        let maze = Maze::generate(&settings, &mut rng)?;
        let driver = AnimationDriver::new(settings.frame_scheduler());
        Ok(MazeSession {
            settings,
            rng,
            maze,
            driver,
            restart_countdown: None,
            fps: FpsCounter::new(),
            completed_count: 0,
            ticks: 0,
        })
    }

    #[inline]
    pub fn settings(&self) -> &MazeSettings {
        &self.settings
    }

    #[inline]
    pub fn maze(&self) -> &Maze {
        &self.maze
    }

    #[inline]
    pub fn is_running(&self) -> bool {
        self.driver.is_running()
    }

    #[inline]
    pub fn is_awaiting_restart(&self) -> bool {
        self.restart_countdown.is_some()
    }

    /// Mazes solved since the session was created.
    #[inline]
    pub fn completed_count(&self) -> usize {
        self.completed_count
    }

    /// Simulation ticks run since the session was created.
    #[inline]
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn start(&mut self) {
        self.driver.start();
    }

    /// Stop the animation and cancel any pending restart.
    pub fn stop(&mut self) {
        self.driver.stop();
        if self.restart_countdown.take().is_some() {
            debug!("Pending maze restart cancelled");
        }
    }

    /// Swap in a freshly generated maze. On failure the current maze is kept.
    pub fn regenerate(&mut self) -> Result<()> {
        let maze = Maze::generate(&self.settings, &mut self.rng)?;
        self.maze = maze;
        Ok(())
    }

    /// Account for one display frame that took `elapsed`.
    pub fn frame(&mut self, elapsed: Duration) -> Result<FrameReport> {
        if let Some(remaining) = self.restart_countdown {
            return match remaining.checked_sub(elapsed) {
                Some(left) if left > Duration::from_secs(0) => {
                    self.restart_countdown = Some(left);
                    Ok(FrameReport::AwaitingRestart)
                }
                _ => {
                    self.restart_countdown = None;
                    self.regenerate()?;
                    self.driver.start();
                    debug!("Restarted with maze {} of this session", self.completed_count + 1);
                    Ok(FrameReport::Restarted)
                }
            };
        }

        if !self.driver.is_running() {
            return Ok(FrameReport::Stopped);
        }

        let ticked = self.driver.frame(elapsed);
        if self.settings.debug {
            if let Some(rate) = self.fps.record(elapsed, ticked) {
                debug!("FPS: {}", rate);
            }
        }
        if !ticked {
            return Ok(FrameReport::Skipped);
        }

        self.ticks += 1;
        let event = self.maze.tick();
        if event.is_completion() {
            self.completed_count += 1;
            self.driver.stop();
            self.restart_countdown = Some(self.settings.restart_delay);
            info!("Maze {} completed after {} moves",
                  self.completed_count,
                  self.maze.navigator().moves_made());
        }
        Ok(FrameReport::Ticked(event))
    }
}

#[cfg(test)]
mod tests {

    use rand::{SeedableRng, XorShiftRng};

    use super::*;
    use crate::cells::CompassPrimary;
    use crate::navigator::MotionState;
    use crate::units::GridSize;

    fn seeded_rng(seed: u32) -> XorShiftRng {
        XorShiftRng::from_seed([seed | 1, 0x5f37_59df, 0x2545_f491, 0x9e37_79b9])
    }

    fn sized(size: usize) -> MazeSettings {
        let mut settings = MazeSettings::default();
        settings.size = size;
        settings
    }

    fn tick_frame() -> Duration {
        MazeSettings::default().frame_scheduler().interval()
    }

    fn kind_of<T>(result: Result<T>) -> Option<ErrorKind> {
        match result {
            Err(Error(kind, _)) => Some(kind),
            Ok(_) => None,
        }
    }

    fn run_until_completed(session: &mut MazeSession<XorShiftRng>) -> usize {
        for frame in 0..1_000_000 {
            if let FrameReport::Ticked(TickEvent::MazeCompleted) = session.frame(tick_frame()).expect("frame") {
                return frame;
            }
        }
        panic!("maze was never completed");
    }

    #[test]
    fn invalid_sizes_fail_before_anything_is_built() {
        match kind_of(MazeSession::new(sized(0), seeded_rng(1))) {
            Some(ErrorKind::InvalidConfiguration(_)) => {}
            other => panic!("expected InvalidConfiguration, got {:?}", other),
        }
        match kind_of(MazeSession::new(sized(1), seeded_rng(1))) {
            Some(ErrorKind::MalformedMaze(cell)) => assert_eq!(cell, GridCoordinate::new(0, 0)),
            other => panic!("expected MalformedMaze, got {:?}", other),
        }
    }

    #[test]
    fn corners_are_start_and_goal() {
        let maze = Maze::generate(&sized(5), &mut seeded_rng(2)).expect("valid");
        assert_eq!(maze.start(), GridCoordinate::new(0, 0));
        assert_eq!(maze.goal(), GridCoordinate::new(4, 4));
        assert_eq!(maze.navigator().pose().cell, maze.start());
    }

    #[test]
    fn render_marks_walker_and_goal() {
        let mut grid = MazeGrid::new(GridSize(2));
        grid.carve_passage(GridCoordinate::new(0, 0), CompassPrimary::East).expect("carve");
        grid.carve_passage(GridCoordinate::new(1, 0), CompassPrimary::South).expect("carve");
        grid.carve_passage(GridCoordinate::new(1, 1), CompassPrimary::West).expect("carve");
        let maze = Maze::new(grid, MotionSpeeds::default()).expect("valid");
        let text = maze.render();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[1], "│ >     │");
        assert_eq!(lines[3], "│     E │");
    }

    #[test]
    fn stopped_session_does_not_tick() {
        let mut session = MazeSession::new(sized(4), seeded_rng(3)).expect("valid");
        assert!(!session.is_running());
        let before = *session.maze().navigator().pose();
        for _ in 0..10 {
            assert_eq!(session.frame(tick_frame()).expect("frame"), FrameReport::Stopped);
        }
        assert_eq!(*session.maze().navigator().pose(), before);
        assert_eq!(session.ticks(), 0);
    }

    #[test]
    fn early_frames_are_skipped() {
        let mut session = MazeSession::new(sized(4), seeded_rng(4)).expect("valid");
        session.start();
        let short = Duration::from_millis(5);
        assert_eq!(session.frame(short).expect("frame"), FrameReport::Skipped);
        assert_eq!(session.frame(short).expect("frame"), FrameReport::Skipped);
        assert_eq!(session.frame(short).expect("frame"), FrameReport::Skipped);
        match session.frame(short).expect("frame") {
            FrameReport::Ticked(_) => {}
            other => panic!("expected a tick, got {:?}", other),
        }
        assert_eq!(session.ticks(), 1);
    }

    #[test]
    fn completion_stops_then_restarts_with_a_new_maze() {
        let mut session = MazeSession::new(sized(6), seeded_rng(5)).expect("valid");
        session.start();
        run_until_completed(&mut session);

        assert_eq!(session.completed_count(), 1);
        assert!(!session.is_running());
        assert!(session.is_awaiting_restart());
        assert!(session.maze().navigator().is_completed());
        let ticks_at_completion = session.ticks();

        // One second of 60Hz frames is just short of the restart delay.
        for _ in 0..59 {
            assert_eq!(session.frame(tick_frame()).expect("frame"), FrameReport::AwaitingRestart);
        }
        let mut restarted = false;
        for _ in 0..2 {
            if session.frame(tick_frame()).expect("frame") == FrameReport::Restarted {
                restarted = true;
                break;
            }
        }
        assert!(restarted);
        assert_eq!(session.ticks(), ticks_at_completion);

        assert!(session.is_running());
        assert!(!session.is_awaiting_restart());
        let navigator = session.maze().navigator();
        assert_eq!(navigator.state(), MotionState::Deciding);
        assert_eq!(navigator.pose().cell, GridCoordinate::new(0, 0));
        assert_eq!(navigator.moves_made(), 0);

        run_until_completed(&mut session);
        assert_eq!(session.completed_count(), 2);
    }

    #[test]
    fn stop_cancels_a_pending_restart() {
        let mut session = MazeSession::new(sized(3), seeded_rng(6)).expect("valid");
        session.start();
        run_until_completed(&mut session);
        session.stop();
        session.stop();
        assert!(!session.is_awaiting_restart());
        for _ in 0..120 {
            assert_eq!(session.frame(tick_frame()).expect("frame"), FrameReport::Stopped);
        }
        assert!(session.maze().navigator().is_completed());
    }

    #[test]
    fn regenerate_replaces_grid_and_walker_together() {
        let mut session = MazeSession::new(sized(8), seeded_rng(7)).expect("valid");
        session.start();
        for _ in 0..200 {
            session.frame(tick_frame()).expect("frame");
        }
        let old_grid = session.maze().grid().clone();
        session.regenerate().expect("valid");
        assert_ne!(*session.maze().grid(), old_grid);
        let navigator = session.maze().navigator();
        assert_eq!(navigator.pose().cell, GridCoordinate::new(0, 0));
        assert_eq!(navigator.state(), MotionState::Deciding);
        assert!(session.is_running());
    }
}
