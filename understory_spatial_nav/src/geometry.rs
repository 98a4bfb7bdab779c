// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Pure geometry used to rank directional candidates.
//!
//! A rectangle is reduced to one of its edges, a [`LineSegment`], depending on
//! the [`Direction`] of travel and on whether it plays the role of the origin or
//! of a candidate:
//!
//! | Direction | origin edge | candidate edge |
//! |-----------|-------------|----------------|
//! | `Up`      | top         | bottom         |
//! | `Down`    | bottom      | top            |
//! | `Left`    | left        | right          |
//! | `Right`   | right       | left           |
//!
//! The *movement axis* is the axis parallel to the direction (y for vertical
//! movement) and the *cross axis* is the perpendicular one.
//!
//! All rectangles are expected in one shared coordinate space with
//! `x0 <= x1` and `y0 <= y1`.

use core::fmt;
use core::str::FromStr;

use kurbo::{Point, Rect};

use crate::error::ParseError;

/// Fraction of the origin edge that a candidate edge must cover on the cross
/// axis to count as overlapping.
pub const OVERLAP_THRESHOLD: f64 = 0.2;

/// Direction of travel for spatial navigation.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Towards smaller y.
    Up,
    /// Towards larger y.
    Down,
    /// Towards smaller x.
    Left,
    /// Towards larger x.
    Right,
}

impl Direction {
    /// All four directions.
    pub const ALL: [Self; 4] = [Self::Up, Self::Down, Self::Left, Self::Right];

    /// Whether the movement axis is y.
    pub const fn is_vertical(self) -> bool {
        matches!(self, Self::Up | Self::Down)
    }

    /// Whether travel goes towards larger coordinates (down or right).
    pub const fn is_incremental(self) -> bool {
        matches!(self, Self::Down | Self::Right)
    }

    /// Lowercase name, as used in key maps and diagnostics.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Up => "up",
            Self::Down => "down",
            Self::Left => "left",
            Self::Right => "right",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Direction {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "up" => Ok(Self::Up),
            "down" => Ok(Self::Down),
            "left" => Ok(Self::Left),
            "right" => Ok(Self::Right),
            _ => Err(ParseError::UnknownDirection(s.into())),
        }
    }
}

/// One edge of a rectangle.
///
/// `begin` is always the left or top end and `end` the right or bottom end.
/// For a horizontal edge both points share `y`; for a vertical edge both share `x`.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct LineSegment {
    /// Left or top end.
    pub begin: Point,
    /// Right or bottom end.
    pub end: Point,
}

impl LineSegment {
    fn horizontal(x0: f64, x1: f64, y: f64) -> Self {
        Self {
            begin: Point::new(x0, y),
            end: Point::new(x1, y),
        }
    }

    fn vertical(x: f64, y0: f64, y1: f64) -> Self {
        Self {
            begin: Point::new(x, y0),
            end: Point::new(x, y1),
        }
    }
}

/// Extract the edge of `rect` that faces `direction`.
///
/// With `is_sibling == false` this is the origin's leading edge (the edge it
/// leaves through); with `is_sibling == true` it is the candidate's near edge
/// (the edge focus would arrive at).
pub fn line_segment(direction: Direction, is_sibling: bool, rect: Rect) -> LineSegment {
    match direction {
        Direction::Up => {
            let y = if is_sibling { rect.y1 } else { rect.y0 };
            LineSegment::horizontal(rect.x0, rect.x1, y)
        }
        Direction::Down => {
            let y = if is_sibling { rect.y0 } else { rect.y1 };
            LineSegment::horizontal(rect.x0, rect.x1, y)
        }
        Direction::Left => {
            let x = if is_sibling { rect.x1 } else { rect.x0 };
            LineSegment::vertical(x, rect.y0, rect.y1)
        }
        Direction::Right => {
            let x = if is_sibling { rect.x0 } else { rect.x1 };
            LineSegment::vertical(x, rect.y0, rect.y1)
        }
    }
}

#[inline]
fn cross(p: Point, is_vertical: bool) -> f64 {
    if is_vertical { p.x } else { p.y }
}

#[inline]
fn main(p: Point, is_vertical: bool) -> f64 {
    if is_vertical { p.y } else { p.x }
}

/// Whether `dest` overlaps `origin` on the cross axis by at least
/// [`OVERLAP_THRESHOLD`] of the origin's own length.
pub fn has_overlap(origin: &LineSegment, dest: &LineSegment, is_vertical: bool) -> bool {
    overlaps_by(origin, dest, is_vertical, OVERLAP_THRESHOLD)
}

/// [`has_overlap`] with an explicit threshold fraction.
///
/// The threshold scales with the origin segment only, so the test is not
/// symmetric in its arguments.
pub fn overlaps_by(
    origin: &LineSegment,
    dest: &LineSegment,
    is_vertical: bool,
    threshold: f64,
) -> bool {
    let judgment = (cross(origin.end, is_vertical) - cross(origin.begin, is_vertical)) * threshold;
    let end = cross(origin.end, is_vertical).min(cross(dest.end, is_vertical));
    let begin = cross(origin.begin, is_vertical).max(cross(dest.begin, is_vertical));
    let intersection = (end - begin).max(0.0);
    intersection >= judgment
}

/// Distance between the two segments along the movement axis.
pub fn primary_axis_distance(origin: &LineSegment, dest: &LineSegment, is_vertical: bool) -> f64 {
    // Both ends share the movement-axis coordinate, so `begin` is enough.
    (main(origin.begin, is_vertical) - main(dest.begin, is_vertical)).abs()
}

/// Closest approach between the two segments' ends on the cross axis.
pub fn secondary_axis_distance(
    origin: &LineSegment,
    dest: &LineSegment,
    is_vertical: bool,
) -> f64 {
    let ob = cross(origin.begin, is_vertical);
    let oe = cross(origin.end, is_vertical);
    let db = cross(dest.begin, is_vertical);
    let de = cross(dest.end, is_vertical);
    (db - ob)
        .abs()
        .min((db - oe).abs())
        .min((de - ob).abs())
        .min((de - oe).abs())
}

/// Coordinate of the origin's leading edge on the movement axis.
pub fn origin_coordinate(direction: Direction, rect: Rect) -> f64 {
    match direction {
        Direction::Up => rect.y0,
        Direction::Down => rect.y1,
        Direction::Left => rect.x0,
        Direction::Right => rect.x1,
    }
}

/// Coordinate of a candidate's near edge on the movement axis.
pub fn destination_coordinate(direction: Direction, rect: Rect) -> f64 {
    match direction {
        Direction::Up => rect.y1,
        Direction::Down => rect.y0,
        Direction::Left => rect.x1,
        Direction::Right => rect.x0,
    }
}

/// Whether `candidate` lies on or past the origin's leading edge in `direction`.
pub fn is_ahead(direction: Direction, origin: Rect, candidate: Rect) -> bool {
    let o = origin_coordinate(direction, origin);
    let d = destination_coordinate(direction, candidate);
    if direction.is_incremental() {
        d >= o
    } else {
        d <= o
    }
}

/// Manhattan distance of the rectangle's top-left corner from the coordinate origin.
pub fn distance_from_origin(rect: Rect) -> f64 {
    rect.x0.abs() + rect.y0.abs()
}

#[cfg(test)]
mod tests {
    use alloc::string::ToString;

    use super::*;

    fn rect(left: f64, top: f64, width: f64, height: f64) -> Rect {
        Rect::new(left, top, left + width, top + height)
    }

    #[test]
    fn edges_follow_direction_and_role() {
        let r = rect(10.0, 20.0, 30.0, 40.0);
        let down_origin = line_segment(Direction::Down, false, r);
        assert_eq!(down_origin.begin, Point::new(10.0, 60.0));
        assert_eq!(down_origin.end, Point::new(40.0, 60.0));
        let down_sibling = line_segment(Direction::Down, true, r);
        assert_eq!(down_sibling.begin.y, 20.0);

        let left_origin = line_segment(Direction::Left, false, r);
        assert_eq!(left_origin.begin, Point::new(10.0, 20.0));
        assert_eq!(left_origin.end, Point::new(10.0, 60.0));
        let left_sibling = line_segment(Direction::Left, true, r);
        assert_eq!(left_sibling.begin.x, 40.0);

        assert_eq!(line_segment(Direction::Up, true, r).begin.y, 60.0);
        assert_eq!(line_segment(Direction::Right, false, r).begin.x, 40.0);
    }

    #[test]
    fn overlap_is_relative_to_origin_length() {
        // Origin spans 0..100 on x; 20 is the judgment value.
        let long = line_segment(Direction::Down, false, rect(0.0, 0.0, 100.0, 10.0));
        let short = line_segment(Direction::Down, true, rect(90.0, 50.0, 10.0, 10.0));
        assert!(!has_overlap(&long, &short, true));

        // Swapping roles: the short origin needs only 2 units.
        let short_origin = line_segment(Direction::Down, false, rect(90.0, 0.0, 10.0, 10.0));
        let long_dest = line_segment(Direction::Down, true, rect(0.0, 50.0, 100.0, 10.0));
        assert!(has_overlap(&short_origin, &long_dest, true));
    }

    #[test]
    fn overlap_threshold_is_inclusive() {
        let origin = line_segment(Direction::Right, false, rect(0.0, 0.0, 10.0, 10.0));
        // Covers exactly 2 of 10 units on y.
        let dest = line_segment(Direction::Right, true, rect(20.0, 8.0, 10.0, 10.0));
        assert!(has_overlap(&origin, &dest, false));
        let dest = line_segment(Direction::Right, true, rect(20.0, 8.5, 10.0, 10.0));
        assert!(!has_overlap(&origin, &dest, false));
    }

    #[test]
    fn axis_distances() {
        let origin = line_segment(Direction::Right, false, rect(0.0, 0.0, 10.0, 10.0));
        let dest = line_segment(Direction::Right, true, rect(25.0, 30.0, 10.0, 10.0));
        assert_eq!(primary_axis_distance(&origin, &dest, false), 15.0);
        // Closest ends on y: origin end 10 vs dest begin 30.
        assert_eq!(secondary_axis_distance(&origin, &dest, false), 20.0);
    }

    #[test]
    fn ahead_predicate_includes_touching_edges() {
        let origin = rect(0.0, 0.0, 10.0, 10.0);
        assert!(is_ahead(Direction::Right, origin, rect(10.0, 0.0, 5.0, 5.0)));
        assert!(!is_ahead(Direction::Right, origin, rect(9.0, 0.0, 5.0, 5.0)));
        assert!(is_ahead(Direction::Up, origin, rect(0.0, -10.0, 5.0, 10.0)));
        assert!(!is_ahead(Direction::Up, origin, rect(0.0, -10.0, 5.0, 11.0)));
    }

    #[test]
    fn parse_directions() {
        assert_eq!("left".parse::<Direction>(), Ok(Direction::Left));
        assert!("diagonal".parse::<Direction>().is_err());
        assert_eq!(Direction::Down.to_string(), "down");
    }
}
