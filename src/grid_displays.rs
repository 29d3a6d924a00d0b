use crate::cells::{CompassPrimary, GridCoordinate};
use crate::navigator::Pose;

pub trait CellOverlay {
    /// Render the contents of a grid cell as text.
    /// The String should be 3 glyphs long, padded if required.
    fn render_cell_body(&self, _: GridCoordinate) -> String {
        String::from("   ")
    }
}

/// Marks the maze entrance with 'S' and the goal with 'E'.
#[derive(Debug, Copy, Clone)]
pub struct StartGoalDisplay {
    start: GridCoordinate,
    goal: GridCoordinate,
}

impl StartGoalDisplay {
    pub fn new(start: GridCoordinate, goal: GridCoordinate) -> StartGoalDisplay {
        StartGoalDisplay { start, goal }
    }
}

impl CellOverlay for StartGoalDisplay {
    fn render_cell_body(&self, coord: GridCoordinate) -> String {
        if coord == self.start {
            String::from(" S ")
        } else if coord == self.goal {
            String::from(" E ")
        } else {
            String::from("   ")
        }
    }
}

/// Start and goal markers plus an arrow for the walker, drawn in the cell it currently occupies.
#[derive(Debug, Copy, Clone)]
pub struct WalkerDisplay {
    markers: StartGoalDisplay,
    walker: GridCoordinate,
    facing: CompassPrimary,
}

impl WalkerDisplay {
    pub fn new(start: GridCoordinate, goal: GridCoordinate, pose: &Pose) -> WalkerDisplay {
        WalkerDisplay {
            markers: StartGoalDisplay::new(start, goal),
            walker: pose.cell,
            facing: pose.facing,
        }
    }
}

impl CellOverlay for WalkerDisplay {
    fn render_cell_body(&self, coord: GridCoordinate) -> String {
        if coord == self.walker {
            let arrow = match self.facing {
                CompassPrimary::North => '^',
                CompassPrimary::East => '>',
                CompassPrimary::South => 'v',
                CompassPrimary::West => '<',
            };
            format!(" {} ", arrow)
        } else {
            self.markers.render_cell_body(coord)
        }
    }
}

#[cfg(test)]
mod tests {

    use super::*;
    use crate::grid::MazeGrid;
    use crate::units::GridSize;

    #[test]
    fn start_and_goal_markers() {
        let display = StartGoalDisplay::new(GridCoordinate::new(0, 0), GridCoordinate::new(1, 1));
        assert_eq!(display.render_cell_body(GridCoordinate::new(0, 0)), " S ");
        assert_eq!(display.render_cell_body(GridCoordinate::new(1, 1)), " E ");
        assert_eq!(display.render_cell_body(GridCoordinate::new(1, 0)), "   ");
    }

    #[test]
    fn walker_arrow_hides_the_marker_beneath_it() {
        let pose = Pose::at_rest(GridCoordinate::new(0, 0), CompassPrimary::East);
        let display = WalkerDisplay::new(GridCoordinate::new(0, 0), GridCoordinate::new(1, 1), &pose);
        assert_eq!(display.render_cell_body(GridCoordinate::new(0, 0)), " > ");
        assert_eq!(display.render_cell_body(GridCoordinate::new(1, 1)), " E ");
    }

    #[test]
    fn overlay_fills_rendered_cell_bodies() {
        let mut g = MazeGrid::new(GridSize(2));
        g.carve_passage(GridCoordinate::new(0, 0), CompassPrimary::East).expect("carve failed");
        let display = StartGoalDisplay::new(GridCoordinate::new(0, 0), GridCoordinate::new(1, 1));
        let text = g.render(Some(&display as &dyn CellOverlay));
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[1], "│ S     │");
        assert_eq!(lines[3], "│   │ E │");
    }
}
