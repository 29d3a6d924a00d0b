use std::fmt;

use rand::Rng;

use crate::cells::{CellWalls, CompassPrimary, CoordinateSmallVec, GridCoordinate};
use crate::grid_displays::CellOverlay;
use crate::grid_iterators::{index_to_grid_coordinate, CellIter, RowIter};
use crate::units::{EdgesCount, GridSize, NodesCount};

/// A square maze stored as a row-major arena of per-cell wall records.
///
/// Walls are shared between adjacent cells but recorded on both sides. All mutation goes
/// through `carve_passage`, which clears both records together, so a wall is always
/// either present on both sides or absent on both.
#[derive(Clone, PartialEq, Eq)]
pub struct MazeGrid {
    cells: Vec<CellWalls>,
    size: GridSize,
}

#[derive(Eq, PartialEq, Copy, Clone, Debug)]
pub enum CarveError {
    InvalidGridCoordinate,
    OutsideBoundary,
}

impl fmt::Debug for MazeGrid {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "MazeGrid :: size: {:?}, open edges: {:?}", self.size, self.links_count())
    }
}

impl MazeGrid {
    /// A grid with every wall of every cell present.
    pub fn new(size: GridSize) -> MazeGrid {
        MazeGrid {
            cells: vec![CellWalls::closed(); size.cells_count().0],
            size,
        }
    }

    #[inline]
    pub fn size(&self) -> GridSize {
        self.size
    }

    #[inline]
    pub fn cells_count(&self) -> NodesCount {
        self.size.cells_count()
    }

    /// Number of open passages between adjacent cells.
    pub fn links_count(&self) -> usize {
        self.iter_links().count()
    }

    #[inline]
    pub fn edges_count(&self) -> EdgesCount {
        EdgesCount(self.links_count())
    }

    pub fn random_cell<R: Rng>(&self, rng: &mut R) -> GridCoordinate {
        let index = rng.gen_range(0, self.cells.len());
        index_to_grid_coordinate(self.size.0, index)
    }

    /// The wall record of a cell, None if the coordinate is outside the grid.
    #[inline]
    pub fn walls(&self, coord: GridCoordinate) -> Option<&CellWalls> {
        self.grid_coordinate_to_index(coord).map(|index| &self.cells[index])
    }

    /// Is there a wall on the `dir` side of `coord`? Cells outside the grid are solid.
    #[inline]
    pub fn has_wall(&self, coord: GridCoordinate, dir: CompassPrimary) -> bool {
        self.walls(coord).map_or(true, |walls| walls.has_wall(dir))
    }

    /// Can a walker step from `coord` through its `dir` side?
    #[inline]
    pub fn is_open(&self, coord: GridCoordinate, dir: CompassPrimary) -> bool {
        !self.has_wall(coord, dir)
    }

    /// The cell reached by stepping through an open `dir` side of `coord`.
    pub fn passage_towards(&self, coord: GridCoordinate, dir: CompassPrimary) -> Option<GridCoordinate> {
        if self.is_open(coord, dir) {
            self.neighbour_at_direction(coord, dir)
        } else {
            None
        }
    }

    /// Remove the wall between `coord` and its neighbour in `dir`, on both cells' records.
    pub fn carve_passage(&mut self,
                         coord: GridCoordinate,
                         dir: CompassPrimary)
                         -> Result<GridCoordinate, CarveError> {
        let index = self.grid_coordinate_to_index(coord)
            .ok_or(CarveError::InvalidGridCoordinate)?;
        let neighbour = self.neighbour_at_direction(coord, dir)
            .ok_or(CarveError::OutsideBoundary)?;
        let neighbour_index = self.grid_coordinate_to_index(neighbour)
            .ok_or(CarveError::OutsideBoundary)?;

        self.cells[index].remove_wall(dir);
        self.cells[neighbour_index].remove_wall(dir.opposite());
        Ok(neighbour)
    }

    /// Cells that are linked to a particular cell by an open passage.
    pub fn links(&self, coord: GridCoordinate) -> Option<CoordinateSmallVec> {
        self.walls(coord).map(|walls| {
            walls.open_sides()
                 .iter()
                 .filter_map(|dir| self.neighbour_at_direction(coord, *dir))
                 .collect()
        })
    }

    pub fn neighbour_at_direction(&self,
                                  coord: GridCoordinate,
                                  direction: CompassPrimary)
                                  -> Option<GridCoordinate> {
        if !self.is_valid_coordinate(coord) {
            return None;
        }
        direction.offset_coordinate(coord)
                 .and_then(|neighbour_coord| if self.is_valid_coordinate(neighbour_coord) {
                     Some(neighbour_coord)
                 } else {
                     None
                 })
    }

    /// Are two cells in the grid adjacent with no wall between them?
    pub fn is_linked(&self, a: GridCoordinate, b: GridCoordinate) -> bool {
        CompassPrimary::ALL
            .iter()
            .any(|dir| self.passage_towards(a, *dir) == Some(b))
    }

    #[inline]
    pub fn is_neighbour_linked(&self, coord: GridCoordinate, direction: CompassPrimary) -> bool {
        self.passage_towards(coord, direction).is_some()
    }

    /// Is the grid coordinate within the grid's dimensions?
    #[inline]
    pub fn is_valid_coordinate(&self, coord: GridCoordinate) -> bool {
        (coord.x as usize) < self.size.0 && (coord.z as usize) < self.size.0
    }

    /// Convert a grid coordinate to a one dimensional index in the range 0...cells_count.
    /// Returns None if the grid coordinate is invalid.
    #[inline]
    pub fn grid_coordinate_to_index(&self, coord: GridCoordinate) -> Option<usize> {
        if self.is_valid_coordinate(coord) {
            Some(coord.z as usize * self.size.0 + coord.x as usize)
        } else {
            None
        }
    }

    #[inline]
    pub fn iter(&self) -> CellIter {
        CellIter::new(self.size)
    }

    #[inline]
    pub fn iter_row(&self) -> RowIter {
        RowIter::new(self.size)
    }

    /// Every open passage exactly once, as (cell, cell to its East or South).
    pub fn iter_links(&self) -> LinksIter {
        LinksIter {
            grid: self,
            cells: self.iter(),
            pending_south: None,
        }
    }

    /// Text rendering of the maze, with an optional overlay filling the cell bodies.
    pub fn render(&self, overlay: Option<&dyn CellOverlay>) -> String {
        const WALL_L: &str = "╴";
        const WALL_R: &str = "╶";
        const WALL_U: &str = "╵";
        const WALL_D: &str = "╷";
        const WALL_LR_3: &str = "───";
        const WALL_LR: &str = "─";
        const WALL_UD: &str = "│";
        const WALL_LD: &str = "┐";
        const WALL_RU: &str = "└";
        const WALL_LU: &str = "┘";
        const WALL_RD: &str = "┌";
        const WALL_LRU: &str = "┴";
        const WALL_LRD: &str = "┬";
        const WALL_LRUD: &str = "┼";
        const WALL_RUD: &str = "├";
        const WALL_LUD: &str = "┤";
        const EMPTY_BODY: &str = "   ";

        let columns_count = self.size.0;
        let rows_count = columns_count;
        if columns_count == 0 {
            return String::new();
        }

        // The north boundary is the only row edge not drawn as some cell's south side.
        let mut output = String::from(WALL_RD);
        for x in 0..columns_count {
            let coord = GridCoordinate::new(x as u32, 0);
            output.push_str(WALL_LR_3);
            if self.is_neighbour_linked(coord, CompassPrimary::East) {
                output.push_str(WALL_LR);
            } else if x == columns_count - 1 {
                output.push_str(WALL_LD);
            } else {
                output.push_str(WALL_LRD);
            }
        }
        output.push('\n');

        for (index_row, row) in self.iter_row().enumerate() {

            let is_last_row = index_row == rows_count - 1;
            let mut row_middle_section_render = String::from(WALL_UD);
            let mut row_bottom_section_render = String::new();

            for (index_column, cell_coord) in row.into_iter().enumerate() {

                let is_first_column = index_column == 0;
                let is_last_column = index_column == columns_count - 1;
                let east_open = self.is_neighbour_linked(cell_coord, CompassPrimary::East);
                let south_open = self.is_neighbour_linked(cell_coord, CompassPrimary::South);

                match overlay {
                    Some(cell_overlay) => {
                        row_middle_section_render.push_str(&cell_overlay.render_cell_body(cell_coord))
                    }
                    None => row_middle_section_render.push_str(EMPTY_BODY),
                }
                row_middle_section_render.push_str(if east_open { " " } else { WALL_UD });

                if is_first_column {
                    row_bottom_section_render = if is_last_row {
                        String::from(WALL_RU)
                    } else if south_open {
                        String::from(WALL_UD)
                    } else {
                        String::from(WALL_RUD)
                    };
                }
                row_bottom_section_render.push_str(if south_open { "   " } else { WALL_LR_3 });

                let corner = match (is_last_row, is_last_column) {
                    (true, true) => WALL_LU,
                    (true, false) => if east_open { WALL_LR } else { WALL_LRU },
                    (false, true) => if south_open { WALL_UD } else { WALL_LUD },
                    (false, false) => {
                        let access_se_from_east =
                            self.neighbour_at_direction(cell_coord, CompassPrimary::East)
                                .map_or(false,
                                        |c| self.is_neighbour_linked(c, CompassPrimary::South));
                        let access_se_from_south =
                            self.neighbour_at_direction(cell_coord, CompassPrimary::South)
                                .map_or(false,
                                        |c| self.is_neighbour_linked(c, CompassPrimary::East));

                        match (!south_open, !access_se_from_east, !east_open, !access_se_from_south) {
                            (true, true, true, true) => WALL_LRUD,
                            (true, true, true, false) => WALL_LRU,
                            (true, true, false, true) => WALL_LRD,
                            (true, false, true, true) => WALL_LUD,
                            (false, true, true, true) => WALL_RUD,
                            (true, true, false, false) => WALL_LR,
                            (false, false, true, true) => WALL_UD,
                            (false, true, true, false) => WALL_RU,
                            (true, false, false, true) => WALL_LD,
                            (true, false, true, false) => WALL_LU,
                            (false, true, false, true) => WALL_RD,
                            (true, false, false, false) => WALL_L,
                            (false, true, false, false) => WALL_R,
                            (false, false, true, false) => WALL_U,
                            (false, false, false, true) => WALL_D,
                            _ => " ",
                        }
                    }
                };
                row_bottom_section_render.push_str(corner);
            }

            output.push_str(&row_middle_section_render);
            output.push('\n');
            output.push_str(&row_bottom_section_render);
            output.push('\n');
        }

        output
    }
}

impl fmt::Display for MazeGrid {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.render(None))
    }
}

impl<'a> IntoIterator for &'a MazeGrid {
    type Item = GridCoordinate;
    type IntoIter = CellIter;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[derive(Debug)]
pub struct LinksIter<'a> {
    grid: &'a MazeGrid,
    cells: CellIter,
    pending_south: Option<(GridCoordinate, GridCoordinate)>,
}

impl<'a> Iterator for LinksIter<'a> {
    type Item = (GridCoordinate, GridCoordinate);

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(link) = self.pending_south.take() {
            return Some(link);
        }
        while let Some(coord) = self.cells.next() {
            let east = self.grid.passage_towards(coord, CompassPrimary::East);
            let south = self.grid.passage_towards(coord, CompassPrimary::South);
            match (east, south) {
                (Some(e), Some(s)) => {
                    self.pending_south = Some((coord, s));
                    return Some((coord, e));
                }
                (Some(e), None) => return Some((coord, e)),
                (None, Some(s)) => return Some((coord, s)),
                (None, None) => {}
            }
        }
        None
    }
}
