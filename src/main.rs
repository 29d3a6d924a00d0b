use docopt::Docopt;
use log::debug;
use mazewalker::{
    grid::MazeGrid,
    navigator::TickEvent,
    pathing,
    scheduler,
    session::{FrameReport, Maze, MazeSession},
    settings::MazeSettings,
};
use rand::{SeedableRng, XorShiftRng};
use serde_derive::Deserialize;
use std::{
    f32::consts::PI,
    fs::File,
    io,
    io::prelude::*,
    time::Duration,
};

const USAGE: &str = "Maze walker

Simulates the maze screensaver without a display: each maze is walked from the top left to the
bottom right corner by a right-hand wall follower, then replaced by a new one.

Usage:
    mazewalker_driver -h | --help
    mazewalker_driver [--grid-size=<n>] [--query=<q>] [--fps=<n>] [--speed=<m>] [--debug] [--mazes=<n>] [--refresh-hz=<hz>] [--seed=<s>] [--show-maze] [--show-walk=<n>] [--save-edges=<path>]

Options:
    -h --help              Show this screen.
    --grid-size=<n>        The grid size is n * n. Overrides the query.
    --query=<q>            Browser source settings, e.g. 'size=20&speed=1&wall=brick&floor=wood&ceiling=ceiling'.
    --fps=<n>              Simulation ticks per second. Overrides the query.
    --speed=<m>            Multiplier for the walking and turning speeds. Overrides the query.
    --debug                Log ticks per second (visible with RUST_LOG=debug).
    --mazes=<n>            How many mazes to walk [default: 1].
    --refresh-hz=<hz>      Simulated display refresh rate [default: 144].
    --seed=<s>             Seed for reproducible mazes.
    --show-maze            Print each maze with its start and goal before walking it.
    --show-walk=<n>        Print the walker's position every n ticks.
    --save-edges=<path>    Serialize the first maze to a text file: each line is a pair of numbers. Line 1: n(#vertices) m(#edges). Line 2+ edge between vertices. Uses 1-based vertex indices.
";
#[derive(Debug, Deserialize)]
struct MazeArgs {
    flag_grid_size: Option<usize>,
    flag_query: String,
    flag_fps: Option<u32>,
    flag_speed: Option<f32>,
    flag_debug: bool,
    flag_mazes: usize,
    flag_refresh_hz: u32,
    flag_seed: Option<u32>,
    flag_show_maze: bool,
    flag_show_walk: Option<u64>,
    flag_save_edges: String,
}

// The driver has its own errors on top of the library's, for argument parsing failures.
mod errors {
    use error_chain::*;
    error_chain! {

        links {
            Maze(::mazewalker::errors::Error, ::mazewalker::errors::ErrorKind);
        }

        foreign_links {
            DocOptFailure(::docopt::Error);
            Io(::std::io::Error);
        }
    }
}
use crate::errors::*;

fn main() -> Result<()> {

    env_logger::init();

    let args: MazeArgs = Docopt::new(USAGE).and_then(|d| d.deserialize())?;
    let settings = settings_from_args(&args)?;
    debug!("Running with settings {}", settings);

    if args.flag_refresh_hz == 0 {
        return Err("The display refresh rate must be at least 1Hz".into());
    }
    let display_frame = Duration::from_nanos(1_000_000_000 / u64::from(args.flag_refresh_hz));

    let rng = match args.flag_seed {
        Some(seed) => XorShiftRng::from_seed([seed | 1, 0x3c6e_f372, 0xa54f_f53a, 0x510e_527f]),
        None => rand::weak_rng(),
    };
    let mut session = MazeSession::new(settings, rng)?;

    if !args.flag_save_edges.is_empty() {
        save_maze_graph(session.maze().grid(), &args.flag_save_edges)?;
    }

    session.start();
    for maze_number in 1..=args.flag_mazes {
        if maze_number > 1 {
            wait_for_restart(&mut session, display_frame)?;
        }
        walk_maze(&mut session, maze_number, display_frame, &args)?;
    }

    Ok(())
}

/// Defaults, then the query, then explicit flags.
fn settings_from_args(args: &MazeArgs) -> Result<MazeSettings> {
    let mut settings = MazeSettings::from_query(&args.flag_query)?;
    if let Some(size) = args.flag_grid_size {
        settings.size = size;
    }
    if let Some(fps) = args.flag_fps {
        settings.target_fps = fps;
    }
    if let Some(speed) = args.flag_speed {
        settings.speed_multiplier = speed;
    }
    if args.flag_debug {
        settings.debug = true;
    }
    settings.validate()?;
    Ok(settings)
}

/// Generous upper bound on the ticks a walk can take: every passage crossed twice, each
/// crossing preceded by a decision and at most a half turn.
fn tick_limit(session: &MazeSession<XorShiftRng>) -> u64 {
    let speeds = session.settings().motion_speeds();
    let cells = session.maze().grid().cells_count().0 as u64;
    let turn_ticks = (PI / speeds.turn_speed) as u64 + 2;
    let move_ticks = (1.0 / speeds.move_speed) as u64 + 2;
    2 * cells * (1 + turn_ticks + move_ticks)
}

fn walk_maze(session: &mut MazeSession<XorShiftRng>,
             maze_number: usize,
             display_frame: Duration,
             args: &MazeArgs)
             -> Result<()> {

    let shortest_moves = shortest_path_moves(session.maze());
    if args.flag_show_maze {
        println!("{}", session.maze().render());
    }

    let first_tick = session.ticks();
    let limit = tick_limit(session);
    let mut frames = 0u64;

    loop {
        let report = session.frame(display_frame)?;
        frames += 1;

        if report == FrameReport::Stopped {
            return Err(format!("Maze {} stopped before it was completed", maze_number).into());
        }
        if let FrameReport::Ticked(event) = report {
            let ticks = session.ticks() - first_tick;
            if let Some(every) = args.flag_show_walk {
                if every > 0 && ticks % every == 0 {
                    let (x, z) = session.maze().navigator().pose().position();
                    println!("tick {}: ({:.2}, {:.2}) facing {:?}",
                             ticks,
                             x,
                             z,
                             session.maze().navigator().pose().facing);
                }
            }
            if event == TickEvent::MazeCompleted {
                break;
            }
            if ticks > limit {
                return Err(format!("Maze {} was not completed within {} ticks", maze_number, limit).into());
            }
        }
    }

    let simulated = scheduler::frames_duration(display_frame, frames);
    println!("maze {}: {}x{}, walked {} moves (shortest {}) in {} ticks, {} frames, {:.2}s",
             maze_number,
             session.settings().size,
             session.settings().size,
             session.maze().navigator().moves_made(),
             shortest_moves.map_or_else(|| "none".to_string(), |moves| moves.to_string()),
             session.ticks() - first_tick,
             frames,
             simulated.as_secs() as f64 + f64::from(simulated.subsec_nanos()) / 1e9);
    Ok(())
}

fn wait_for_restart(session: &mut MazeSession<XorShiftRng>, display_frame: Duration) -> Result<()> {
    while session.is_awaiting_restart() {
        if session.frame(display_frame)? == FrameReport::Restarted {
            return Ok(());
        }
    }
    Err("The session stopped without scheduling a new maze".into())
}

fn shortest_path_moves(maze: &Maze) -> Option<usize> {
    pathing::Distances::new(maze.grid(), maze.start())
        .and_then(|distances| pathing::shortest_path(maze.grid(), &distances, maze.goal()))
        .map(|path| path.len() - 1)
}

fn write_text_to_file(data: &str, file_name: &str) -> io::Result<()> {
    let mut f = File::create(file_name)?;
    f.write_all(data.as_bytes())?;
    Ok(())
}

fn save_maze_graph(maze_grid: &MazeGrid, file_path: &str) -> Result<()> {

    let mut graph_data = String::new();
    let vertices_count = maze_grid.cells_count().0;
    let edges_count = maze_grid.edges_count().0;
    graph_data.push_str(vertices_count.to_string().as_ref());
    graph_data.push(' ');
    graph_data.push_str(edges_count.to_string().as_ref());
    graph_data.push('\n');

    for (src, dst) in maze_grid.iter_links() {
        let index_a = maze_grid
            .grid_coordinate_to_index(src)
            .ok_or("Links iter should give valid coordinate")?;
        let index_b = maze_grid
            .grid_coordinate_to_index(dst)
            .ok_or("Links iter should give valid coordinate")?;

        graph_data.push_str((index_a + 1).to_string().as_ref());
        graph_data.push(' ');
        graph_data.push_str((index_b + 1).to_string().as_ref());
        graph_data.push('\n');
    }

    write_text_to_file(&graph_data, file_path)
        .chain_err(|| format!("Failed to write maze graph to text file {}", file_path))?;

    Ok(())
}
