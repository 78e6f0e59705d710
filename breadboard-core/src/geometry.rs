//! Surface-independent geometry: points, cell indices, orientations and the
//! footprint transforms shared by collision detection and comparison.
//!
//! Screen convention: x grows to the right, y grows downward. North is the
//! unrotated frame of every plate kind.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Pixel-space point.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const ZERO: Point = Point { x: 0.0, y: 0.0 };

    pub fn new(x: f64, y: f64) -> Self {
        Point { x, y }
    }
}

impl From<(f64, f64)> for Point {
    fn from(v: (f64, f64)) -> Self {
        Point { x: v.0, y: v.1 }
    }
}

impl std::ops::Add for Point {
    type Output = Point;
    fn add(self, rhs: Point) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl std::ops::Sub for Point {
    type Output = Point;
    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

/// Integer cell coordinates. Used both for absolute grid cells and for
/// offsets relative to a plate origin.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CellIdx {
    pub x: i32,
    pub y: i32,
}

impl CellIdx {
    pub const ORIGIN: CellIdx = CellIdx { x: 0, y: 0 };

    pub const fn new(x: i32, y: i32) -> Self {
        CellIdx { x, y }
    }

    /// Saturates, so a cell pushed past `i32` range stays off every grid.
    pub fn offset(self, dx: i32, dy: i32) -> Self {
        CellIdx::new(self.x.saturating_add(dx), self.y.saturating_add(dy))
    }
}

impl std::ops::Add for CellIdx {
    type Output = CellIdx;
    fn add(self, rhs: CellIdx) -> CellIdx {
        self.offset(rhs.x, rhs.y)
    }
}

impl fmt::Display for CellIdx {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// One of the four cardinal placements of a plate.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Orientation {
    #[default]
    #[serde(rename = "N", alias = "north")]
    North,
    #[serde(rename = "E", alias = "east")]
    East,
    #[serde(rename = "S", alias = "south")]
    South,
    #[serde(rename = "W", alias = "west")]
    West,
}

impl Orientation {
    pub const ALL: [Orientation; 4] = [
        Orientation::North,
        Orientation::East,
        Orientation::South,
        Orientation::West,
    ];

    /// Number of clockwise quarter turns from North.
    pub fn quarter_turns(self) -> u8 {
        match self {
            Orientation::North => 0,
            Orientation::East => 1,
            Orientation::South => 2,
            Orientation::West => 3,
        }
    }

    pub fn from_quarter_turns(turns: i32) -> Self {
        Self::ALL[turns.rem_euclid(4) as usize]
    }

    pub fn clockwise(self) -> Self {
        Self::from_quarter_turns(self.quarter_turns() as i32 + 1)
    }

    pub fn counter_clockwise(self) -> Self {
        Self::from_quarter_turns(self.quarter_turns() as i32 - 1)
    }

    pub fn opposite(self) -> Self {
        Self::from_quarter_turns(self.quarter_turns() as i32 + 2)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Orientation::North => "N",
            Orientation::East => "E",
            Orientation::South => "S",
            Orientation::West => "W",
        }
    }
}

impl fmt::Display for Orientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown orientation '{0}', expected one of N, E, S, W")]
pub struct ParseOrientationError(pub String);

impl FromStr for Orientation {
    type Err = ParseOrientationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "n" | "north" => Ok(Orientation::North),
            "e" | "east" => Ok(Orientation::East),
            "s" | "south" => Ok(Orientation::South),
            "w" | "west" => Ok(Orientation::West),
            _ => Err(ParseOrientationError(s.to_string())),
        }
    }
}

/// Where a plate sits: its origin cell and orientation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub cell: CellIdx,
    pub orientation: Orientation,
}

impl Position {
    pub fn new(cell: CellIdx, orientation: Orientation) -> Self {
        Position { cell, orientation }
    }

    pub fn rotated_clockwise(self) -> Self {
        Position { orientation: self.orientation.clockwise(), ..self }
    }

    pub fn rotated_counter_clockwise(self) -> Self {
        Position { orientation: self.orientation.counter_clockwise(), ..self }
    }

    pub fn shifted(self, dx: i32, dy: i32) -> Self {
        Position { cell: self.cell.offset(dx, dy), ..self }
    }

    pub fn moved_to(self, cell: CellIdx) -> Self {
        Position { cell, ..self }
    }
}

/// Rotate a relative offset from the North frame into `orientation`.
pub fn rotate_offset(offset: CellIdx, orientation: Orientation) -> CellIdx {
    let CellIdx { x, y } = offset;
    match orientation {
        Orientation::North => CellIdx::new(x, y),
        Orientation::East => CellIdx::new(-y, x),
        Orientation::South => CellIdx::new(-x, -y),
        Orientation::West => CellIdx::new(y, -x),
    }
}

/// Relative footprint of `surface` under `orientation`, order preserved.
pub fn footprint(surface: &[CellIdx], orientation: Orientation) -> Vec<CellIdx> {
    surface.iter().map(|&o| rotate_offset(o, orientation)).collect()
}

/// Absolute occupied cells: the origin itself plus every rotated offset.
pub fn absolute_cells(position: Position, surface: &[CellIdx]) -> BTreeSet<CellIdx> {
    let mut cells = BTreeSet::new();
    cells.insert(position.cell);
    for offset in footprint(surface, position.orientation) {
        cells.insert(position.cell + offset);
    }
    cells
}

pub fn cells_intersect(a: &BTreeSet<CellIdx>, b: &BTreeSet<CellIdx>) -> bool {
    let (small, large) = if a.len() <= b.len() { (a, b) } else { (b, a) };
    small.iter().any(|c| large.contains(c))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn four_clockwise_turns_are_identity() {
        for o in Orientation::ALL {
            assert_eq!(o.clockwise().clockwise().clockwise().clockwise(), o);
            assert_eq!(o.clockwise().counter_clockwise(), o);
        }
        assert_eq!(Orientation::West.clockwise(), Orientation::North);
        assert_eq!(Orientation::North.counter_clockwise(), Orientation::West);
        assert_eq!(Orientation::East.opposite(), Orientation::West);
    }

    #[test]
    fn clockwise_turns_right_into_down() {
        let right = CellIdx::new(1, 0);
        assert_eq!(rotate_offset(right, Orientation::East), CellIdx::new(0, 1));
        assert_eq!(rotate_offset(right, Orientation::South), CellIdx::new(-1, 0));
        assert_eq!(rotate_offset(right, Orientation::West), CellIdx::new(0, -1));
    }

    #[test]
    fn cell_arithmetic_saturates_at_the_edge_of_range() {
        let far = CellIdx::new(i32::MAX, i32::MIN);
        assert_eq!(far + CellIdx::new(1, -1), far);
        assert_eq!(far.offset(-1, 1), CellIdx::new(i32::MAX - 1, i32::MIN + 1));
        let cells = absolute_cells(Position::new(far, Orientation::East), &[CellIdx::new(1, 0)]);
        assert!(cells.contains(&far));
    }

    #[test]
    fn absolute_cells_include_origin() {
        let pos = Position::new(CellIdx::new(3, 3), Orientation::South);
        let cells = absolute_cells(pos, &[CellIdx::new(1, 0), CellIdx::new(2, 0)]);
        let expected: BTreeSet<_> =
            [CellIdx::new(3, 3), CellIdx::new(2, 3), CellIdx::new(1, 3)].into_iter().collect();
        assert_eq!(cells, expected);
    }

    #[test]
    fn orientation_parses_short_and_long_names() {
        assert_eq!("E".parse::<Orientation>().unwrap(), Orientation::East);
        assert_eq!("west".parse::<Orientation>().unwrap(), Orientation::West);
        assert!("up".parse::<Orientation>().is_err());

        let o: Orientation = serde_json::from_str("\"south\"").unwrap();
        assert_eq!(o, Orientation::South);
        assert_eq!(serde_json::to_string(&Orientation::North).unwrap(), "\"N\"");
    }

    #[test]
    fn intersection_is_symmetric() {
        let a = absolute_cells(Position::new(CellIdx::new(0, 0), Orientation::North), &[CellIdx::new(1, 0)]);
        let b = absolute_cells(Position::new(CellIdx::new(1, 1), Orientation::West), &[CellIdx::new(1, 0)]);
        assert!(cells_intersect(&a, &b));
        assert!(cells_intersect(&b, &a));
        let c = absolute_cells(Position::new(CellIdx::new(5, 5), Orientation::North), &[]);
        assert!(!cells_intersect(&a, &c));
    }
}
