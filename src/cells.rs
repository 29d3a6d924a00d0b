use std::f32::consts::{FRAC_PI_2, PI};
use std::fmt;
use std::ops::Index;

use smallvec::SmallVec;

/// A cell position on the maze grid. `x` grows eastwards, `z` grows southwards.
#[derive(Hash, Eq, PartialEq, Copy, Clone, Debug, Ord, PartialOrd)]
pub struct GridCoordinate {
    pub x: u32,
    pub z: u32,
}

impl GridCoordinate {
    pub fn new(x: u32, z: u32) -> GridCoordinate {
        GridCoordinate { x, z }
    }
}

impl fmt::Display for GridCoordinate {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.z)
    }
}

pub type CoordinateSmallVec = SmallVec<[GridCoordinate; 4]>;
pub type DirectionSmallVec = SmallVec<[CompassPrimary; 4]>;

/// The four wall sides of a cell. The discriminants are the wall record indices.
#[derive(Eq, PartialEq, Copy, Clone, Debug, Hash)]
pub enum CompassPrimary {
    North = 0,
    East = 1,
    South = 2,
    West = 3,
}

impl CompassPrimary {
    /// Clockwise from North, which is also the order a start cell is scanned for an open side.
    pub const ALL: [CompassPrimary; 4] = [CompassPrimary::North,
                                          CompassPrimary::East,
                                          CompassPrimary::South,
                                          CompassPrimary::West];

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    #[inline]
    pub fn from_index(index: usize) -> CompassPrimary {
        CompassPrimary::ALL[index % 4]
    }

    #[inline]
    pub fn right(self) -> CompassPrimary {
        CompassPrimary::from_index(self.index() + 1)
    }

    #[inline]
    pub fn opposite(self) -> CompassPrimary {
        CompassPrimary::from_index(self.index() + 2)
    }

    #[inline]
    pub fn left(self) -> CompassPrimary {
        CompassPrimary::from_index(self.index() + 3)
    }

    /// Heading angle in radians, a quarter turn per direction clockwise from North.
    #[inline]
    pub fn heading(self) -> f32 {
        self.index() as f32 * FRAC_PI_2
    }

    /// The cardinal direction nearest to an arbitrary heading angle.
    pub fn from_heading(angle: f32) -> CompassPrimary {
        let quarter_turns = (angle / FRAC_PI_2).round() as i64;
        CompassPrimary::from_index(quarter_turns.rem_euclid(4) as usize)
    }

    /// Creates a new coordinate offset 1 cell away in this direction.
    /// Returns None if the coordinate would be negative. The grid bounds are not checked.
    pub fn offset_coordinate(self, coord: GridCoordinate) -> Option<GridCoordinate> {
        let (x, z) = (coord.x, coord.z);
        match self {
            CompassPrimary::North => {
                if z > 0 {
                    Some(GridCoordinate { x, z: z - 1 })
                } else {
                    None
                }
            }
            CompassPrimary::East => x.checked_add(1).map(|x| GridCoordinate { x, z }),
            CompassPrimary::South => z.checked_add(1).map(|z| GridCoordinate { x, z }),
            CompassPrimary::West => {
                if x > 0 {
                    Some(GridCoordinate { x: x - 1, z })
                } else {
                    None
                }
            }
        }
    }
}

/// Signed difference `to - from` folded into (-π, π], the shorter way round.
pub fn shortest_angle_between(from: f32, to: f32) -> f32 {
    let diff = to - from;
    let folded = diff.sin().atan2(diff.cos());
    if folded <= -PI {
        folded + 2.0 * PI
    } else {
        folded
    }
}

/// Wall presence on each side of one cell, indexed by `CompassPrimary`.
#[derive(Eq, PartialEq, Copy, Clone, Debug, Hash)]
pub struct CellWalls {
    walls: [bool; 4],
}

impl CellWalls {
    pub fn closed() -> CellWalls {
        CellWalls { walls: [true; 4] }
    }

    #[inline]
    pub fn has_wall(&self, dir: CompassPrimary) -> bool {
        self.walls[dir.index()]
    }

    #[inline]
    pub fn is_open(&self, dir: CompassPrimary) -> bool {
        !self.has_wall(dir)
    }

    #[inline]
    pub(crate) fn remove_wall(&mut self, dir: CompassPrimary) {
        self.walls[dir.index()] = false;
    }

    /// The open sides in North, East, South, West order.
    pub fn open_sides(&self) -> DirectionSmallVec {
        CompassPrimary::ALL
            .iter()
            .cloned()
            .filter(|dir| self.is_open(*dir))
            .collect()
    }

    /// The first open side scanning North, East, South then West.
    pub fn first_open_side(&self) -> Option<CompassPrimary> {
        CompassPrimary::ALL.iter().cloned().find(|dir| self.is_open(*dir))
    }
}

impl Default for CellWalls {
    fn default() -> CellWalls {
        CellWalls::closed()
    }
}

impl Index<CompassPrimary> for CellWalls {
    type Output = bool;

    fn index(&self, dir: CompassPrimary) -> &bool {
        &self.walls[dir.index()]
    }
}

#[cfg(test)]
mod tests {

    use super::*;
    use std::f32::consts::PI;

    #[test]
    fn relative_turns() {
        assert_eq!(CompassPrimary::North.right(), CompassPrimary::East);
        assert_eq!(CompassPrimary::North.left(), CompassPrimary::West);
        assert_eq!(CompassPrimary::West.right(), CompassPrimary::North);
        assert_eq!(CompassPrimary::South.left(), CompassPrimary::East);
        for dir in CompassPrimary::ALL.iter() {
            assert_eq!(dir.opposite().opposite(), *dir);
            assert_eq!(dir.right().left(), *dir);
        }
    }

    #[test]
    fn headings_round_trip_to_directions() {
        for dir in CompassPrimary::ALL.iter() {
            assert_eq!(CompassPrimary::from_heading(dir.heading()), *dir);
        }
        assert_eq!(CompassPrimary::from_heading(2.0 * PI), CompassPrimary::North);
        assert_eq!(CompassPrimary::from_heading(-PI / 2.0), CompassPrimary::West);
        assert_eq!(CompassPrimary::from_heading(PI / 2.0 + 0.02), CompassPrimary::East);
    }

    #[test]
    fn offsets_stop_at_zero() {
        let origin = GridCoordinate::new(0, 0);
        assert_eq!(CompassPrimary::North.offset_coordinate(origin), None);
        assert_eq!(CompassPrimary::West.offset_coordinate(origin), None);
        assert_eq!(CompassPrimary::East.offset_coordinate(origin),
                   Some(GridCoordinate::new(1, 0)));
        assert_eq!(CompassPrimary::South.offset_coordinate(origin),
                   Some(GridCoordinate::new(0, 1)));
    }

    #[test]
    fn shortest_angle_takes_the_short_way_round() {
        let quarter = PI / 2.0;
        // West to North is a quarter turn clockwise, not three quarters back.
        let d = shortest_angle_between(3.0 * quarter, 0.0);
        assert!((d - quarter).abs() < 1e-5);
        let d = shortest_angle_between(0.0, 3.0 * quarter);
        assert!((d + quarter).abs() < 1e-5);
        let d = shortest_angle_between(quarter, 0.0);
        assert!((d + quarter).abs() < 1e-5);
        let d = shortest_angle_between(0.0, PI);
        assert!(d.abs() <= PI + 1e-5);
    }

    #[test]
    fn walls_index_by_direction() {
        let mut walls = CellWalls::closed();
        assert!(walls[CompassPrimary::South]);
        assert_eq!(walls.first_open_side(), None);

        walls.remove_wall(CompassPrimary::South);
        walls.remove_wall(CompassPrimary::West);
        assert!(!walls[CompassPrimary::South]);
        assert_eq!(walls.first_open_side(), Some(CompassPrimary::South));
        assert_eq!(&*walls.open_sides(), &[CompassPrimary::South, CompassPrimary::West]);
    }
}
