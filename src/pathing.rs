use itertools::Itertools;

use crate::cells::GridCoordinate;
use crate::grid::MazeGrid;
use crate::utils;
use crate::utils::FnvHashMap;

/// Passage distances from one start cell to every cell reachable from it.
#[derive(Debug, Clone)]
pub struct Distances {
    start_coordinate: GridCoordinate,
    distances: FnvHashMap<GridCoordinate, u32>,
}

impl Distances {
    /// Breadth first flood fill over open passages. Returns None for a start outside the grid.
    pub fn new(grid: &MazeGrid, start_coordinate: GridCoordinate) -> Option<Distances> {

        if !grid.is_valid_coordinate(start_coordinate) {
            return None;
        }

        let mut distances = utils::fnv_hashmap(grid.cells_count().0);
        distances.insert(start_coordinate, 0);

        // Every link costs one step, so the first time a cell is reached is the shortest
        // distance to it and the map doubles as the visited set.
        let mut frontier = vec![start_coordinate];
        while !frontier.is_empty() {

            let mut new_frontier = vec![];
            for cell_coord in &frontier {

                let distance_to_cell = distances[cell_coord];

                if let Some(links) = grid.links(*cell_coord) {
                    for link_coordinate in links.iter() {
                        if !distances.contains_key(link_coordinate) {
                            distances.insert(*link_coordinate, distance_to_cell + 1);
                            new_frontier.push(*link_coordinate);
                        }
                    }
                }
            }
            frontier = new_frontier;
        }

        Some(Distances {
            start_coordinate,
            distances,
        })
    }

    #[inline(always)]
    pub fn start(&self) -> GridCoordinate {
        self.start_coordinate
    }

    #[inline(always)]
    pub fn distance_from_start_to(&self, coord: GridCoordinate) -> Option<u32> {
        self.distances.get(&coord).cloned()
    }

    /// How many cells, including the start, can be reached from the start.
    #[inline]
    pub fn reachable_count(&self) -> usize {
        self.distances.len()
    }
}

/// Walk back from `end_point` to the start of `distances_from_start`, always stepping to a
/// linked neighbour one step closer to the start.
pub fn shortest_path(grid: &MazeGrid,
                     distances_from_start: &Distances,
                     end_point: GridCoordinate)
                     -> Option<Vec<GridCoordinate>> {

    // The end point is not reachable from start.
    distances_from_start.distance_from_start_to(end_point)?;

    let mut path = vec![end_point];
    let start = distances_from_start.start();
    let mut current_coord = end_point;

    while current_coord != start {

        let current_distance = distances_from_start.distance_from_start_to(current_coord)?;
        let closest_to_start = grid.links(current_coord)?
            .iter()
            .filter_map(|coord| {
                distances_from_start.distance_from_start_to(*coord).map(|d| (*coord, d))
            })
            .fold1(|closest, candidate| if candidate.1 < closest.1 { candidate } else { closest });

        match closest_to_start {
            Some((closer_coord, closer_distance)) if closer_distance < current_distance => {
                current_coord = closer_coord;
                path.push(current_coord);
            }
            // No linked neighbour gets closer to the start, the distances belong to another grid.
            _ => return None,
        }
    }

    path.reverse();
    Some(path)
}
