use error_chain::bail;
use log::info;
use rand::Rng;
use smallvec::SmallVec;

use crate::cells::{CompassPrimary, GridCoordinate};
use crate::errors::*;
use crate::grid::MazeGrid;
use crate::units::GridSize;
use crate::utils;

/// Generate a perfect maze with a fresh thread local random source.
pub fn generate(size: GridSize) -> Result<MazeGrid> {
    let mut rng = rand::thread_rng();
    recursive_backtracker(size, &mut rng)
}

/// Apply the recursive backtracker maze generation algorithm to a fully walled grid.
///
/// Starting from a random cell, carve into a random unvisited neighbour and make that the
/// current cell. When the current cell has no unvisited neighbours, backtrack along the
/// frontier stack to the most recent cell that does. A passage is only ever carved towards
/// an unvisited cell, so the result is a spanning tree: every cell is reachable and there
/// are exactly `size * size - 1` passages.
///
/// The recursion is an explicit stack so large grids cannot overflow the call stack.
pub fn recursive_backtracker<R: Rng>(size: GridSize, rng: &mut R) -> Result<MazeGrid> {
    if size.0 == 0 {
        bail!(ErrorKind::InvalidConfiguration("maze size must be at least 1".to_string()));
    }
    if size.0 > u32::max_value() as usize {
        bail!(ErrorKind::InvalidConfiguration(format!("maze size {} is too large", size.0)));
    }

    let mut grid = MazeGrid::new(size);
    let cells_count = grid.cells_count().0;
    let mut visited = utils::fnv_hashset(cells_count);
    let mut stack: Vec<GridCoordinate> = Vec::with_capacity(cells_count);

    let start = grid.random_cell(rng);
    visited.insert(start);
    stack.push(start);

    while let Some(&current) = stack.last() {

        let unvisited_neighbours = CompassPrimary::ALL
            .iter()
            .filter_map(|dir| {
                grid.neighbour_at_direction(current, *dir)
                    .map(|neighbour| (*dir, neighbour))
            })
            .filter(|&(_, neighbour)| !visited.contains(&neighbour))
            .collect::<SmallVec<[(CompassPrimary, GridCoordinate); 4]>>();

        if let Some(&(dir, next)) = rng.choose(&unvisited_neighbours[..]) {
            grid.carve_passage(current, dir)
                .map_err(|e| format!("carving {:?} from {} failed: {:?}", dir, current, e))?;
            visited.insert(next);
            stack.push(next);
        } else {
            stack.pop();
        }
    }

    info!("Generated {}x{} maze with {} passages", size.0, size.0, grid.links_count());
    Ok(grid)
}

#[cfg(test)]
mod tests {

    use quickcheck::{quickcheck, TestResult};
    use rand::{SeedableRng, XorShiftRng};

    use super::*;
    use crate::pathing::Distances;

    fn seeded_rng(seed: u32) -> XorShiftRng {
        XorShiftRng::from_seed([seed | 1, 0x193a_6754, 0xa8a7_d469, 0x9783_0e05])
    }

    fn walls_are_symmetric(grid: &MazeGrid) -> bool {
        grid.iter().all(|coord| {
            CompassPrimary::ALL.iter().all(|dir| {
                match grid.neighbour_at_direction(coord, *dir) {
                    Some(neighbour) => {
                        grid.has_wall(coord, *dir) == grid.has_wall(neighbour, dir.opposite())
                    }
                    // Boundary walls are never carved.
                    None => grid.has_wall(coord, *dir),
                }
            })
        })
    }

    fn is_spanning_tree(grid: &MazeGrid) -> bool {
        let all_reachable = Distances::new(grid, GridCoordinate::new(0, 0))
            .map_or(false, |distances| distances.reachable_count() == grid.cells_count().0);
        grid.edges_count() == grid.size().spanning_tree_edges() && all_reachable
    }

    #[test]
    fn zero_size_is_invalid_configuration() {
        let result = recursive_backtracker(GridSize(0), &mut seeded_rng(1));
        match result {
            Err(ref e) => match *e.kind() {
                ErrorKind::InvalidConfiguration(_) => {}
                ref kind => panic!("expected InvalidConfiguration, got {:?}", kind),
            },
            Ok(grid) => panic!("expected InvalidConfiguration, got {:?}", grid),
        }
    }

    #[test]
    fn single_cell_maze_has_no_passages() {
        let grid = recursive_backtracker(GridSize(1), &mut seeded_rng(1)).expect("size 1 is valid");
        let walls = grid.walls(GridCoordinate::new(0, 0)).expect("cell exists");
        assert_eq!(walls.first_open_side(), None);
        assert_eq!(grid.links_count(), 0);
    }

    #[test]
    fn two_by_two_maze_has_three_passages() {
        for seed in 0..20 {
            let grid = recursive_backtracker(GridSize(2), &mut seeded_rng(seed)).expect("valid");
            assert_eq!(grid.links_count(), 3);
            assert!(is_spanning_tree(&grid));
        }
    }

    #[test]
    fn default_size_maze_is_perfect() {
        let grid = generate(GridSize(20)).expect("valid");
        assert!(walls_are_symmetric(&grid));
        assert!(is_spanning_tree(&grid));
    }

    #[test]
    fn different_random_sources_still_give_perfect_mazes() {
        let a = recursive_backtracker(GridSize(12), &mut seeded_rng(7)).expect("valid");
        let b = recursive_backtracker(GridSize(12), &mut seeded_rng(8)).expect("valid");
        assert!(is_spanning_tree(&a) && walls_are_symmetric(&a));
        assert!(is_spanning_tree(&b) && walls_are_symmetric(&b));
    }

    #[test]
    fn same_seed_same_maze() {
        let a = recursive_backtracker(GridSize(8), &mut seeded_rng(3)).expect("valid");
        let b = recursive_backtracker(GridSize(8), &mut seeded_rng(3)).expect("valid");
        assert_eq!(a, b);
    }

    #[test]
    fn quickcheck_generated_mazes_are_spanning_trees() {
        fn prop(size: u8, seed: u32) -> TestResult {
            let size = GridSize(size as usize % 24);
            if size.0 == 0 {
                return TestResult::discard();
            }
            let grid = match recursive_backtracker(size, &mut seeded_rng(seed)) {
                Ok(g) => g,
                Err(_) => return TestResult::failed(),
            };
            TestResult::from_bool(is_spanning_tree(&grid) && walls_are_symmetric(&grid))
        }
        quickcheck(prop as fn(u8, u32) -> TestResult);
    }
}
