use crate::cells::GridCoordinate;
use crate::units::GridSize;

/// Row-major iterator over every cell coordinate of a square grid.
#[derive(Debug, Copy, Clone)]
pub struct CellIter {
    current_cell_number: usize,
    dimension_size: usize,
    cells_count: usize,
}

impl CellIter {
    pub fn new(size: GridSize) -> CellIter {
        CellIter {
            current_cell_number: 0,
            dimension_size: size.0,
            cells_count: size.cells_count().0,
        }
    }
}

impl ExactSizeIterator for CellIter {} // default impl using size_hint()
impl Iterator for CellIter {
    type Item = GridCoordinate;
    fn next(&mut self) -> Option<Self::Item> {
        if self.current_cell_number < self.cells_count {
            let coord = index_to_grid_coordinate(self.dimension_size, self.current_cell_number);
            self.current_cell_number += 1;
            Some(coord)
        } else {
            None
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let lower_bound = self.cells_count - self.current_cell_number;
        let upper_bound = lower_bound;
        (lower_bound, Some(upper_bound))
    }
}

/// Yields each row of the grid, north to south, as a west to east run of coordinates.
#[derive(Debug, Copy, Clone)]
pub struct RowIter {
    current_row: usize,
    dimension_size: usize,
}

impl RowIter {
    pub fn new(size: GridSize) -> RowIter {
        RowIter {
            current_row: 0,
            dimension_size: size.0,
        }
    }
}

impl ExactSizeIterator for RowIter {}
impl Iterator for RowIter {
    type Item = Vec<GridCoordinate>;
    fn next(&mut self) -> Option<Self::Item> {
        if self.current_row < self.dimension_size {
            let z = self.current_row as u32;
            let coords = (0..self.dimension_size)
                .map(|x| GridCoordinate::new(x as u32, z))
                .collect();
            self.current_row += 1;
            Some(coords)
        } else {
            None
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let lower_bound = self.dimension_size - self.current_row;
        (lower_bound, Some(lower_bound))
    }
}

#[inline]
pub fn index_to_grid_coordinate(dimension_size: usize, one_dimensional_index: usize) -> GridCoordinate {
    let z = one_dimensional_index / dimension_size;
    let x = one_dimensional_index - (z * dimension_size);
    GridCoordinate::new(x as u32, z as u32)
}

#[cfg(test)]
mod tests {

    use super::*;

    #[test]
    fn cell_iter() {
        let cells = CellIter::new(GridSize(2)).collect::<Vec<GridCoordinate>>();
        assert_eq!(cells,
                   &[GridCoordinate::new(0, 0),
                     GridCoordinate::new(1, 0),
                     GridCoordinate::new(0, 1),
                     GridCoordinate::new(1, 1)]);
    }

    #[test]
    fn cell_iter_len() {
        let mut iter = CellIter::new(GridSize(3));
        assert_eq!(iter.len(), 9);
        iter.next();
        assert_eq!(iter.len(), 8);
    }

    #[test]
    fn row_iter() {
        assert_eq!(RowIter::new(GridSize(2)).collect::<Vec<Vec<GridCoordinate>>>(),
                   &[&[GridCoordinate::new(0, 0), GridCoordinate::new(1, 0)],
                     &[GridCoordinate::new(0, 1), GridCoordinate::new(1, 1)]]);
    }

    #[test]
    fn empty_grid_iterates_nothing() {
        assert_eq!(CellIter::new(GridSize(0)).count(), 0);
        assert_eq!(RowIter::new(GridSize(0)).count(), 0);
    }
}
