/// Side length of a square maze grid, in cells.
#[derive(Eq, PartialEq, Copy, Clone, Debug, Hash, Ord, PartialOrd)]
pub struct GridSize(pub usize);

#[derive(Eq, PartialEq, Copy, Clone, Debug)]
pub struct NodesCount(pub usize);
#[derive(Eq, PartialEq, Copy, Clone, Debug)]
pub struct EdgesCount(pub usize);

impl GridSize {
    /// Number of cells in a `size * size` grid.
    #[inline]
    pub fn cells_count(&self) -> NodesCount {
        NodesCount(self.0 * self.0)
    }

    /// Edge count of any spanning tree over the grid's cells.
    #[inline]
    pub fn spanning_tree_edges(&self) -> EdgesCount {
        EdgesCount(self.cells_count().0.saturating_sub(1))
    }
}
