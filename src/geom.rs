//! Integer rectangle geometry and grid directions
//!
//! Entity rects are pixel-aligned; positions and velocities are `glam::Vec2`.

use glam::{IVec2, Vec2};
use serde::{Deserialize, Serialize};

/// Axis-aligned pixel rectangle (x, y is the top-left corner, y grows down)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

impl Rect {
    pub const fn new(x: i32, y: i32, w: i32, h: i32) -> Self {
        Self { x, y, w, h }
    }

    #[inline]
    pub const fn left(&self) -> i32 {
        self.x
    }

    #[inline]
    pub const fn right(&self) -> i32 {
        self.x + self.w
    }

    #[inline]
    pub const fn top(&self) -> i32 {
        self.y
    }

    #[inline]
    pub const fn bottom(&self) -> i32 {
        self.y + self.h
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(
            self.x as f32 + self.w as f32 / 2.0,
            self.y as f32 + self.h as f32 / 2.0,
        )
    }

    pub fn top_left(&self) -> IVec2 {
        IVec2::new(self.x, self.y)
    }

    pub fn is_empty(&self) -> bool {
        self.w <= 0 || self.h <= 0
    }

    /// Grow (or shrink, with negative deltas) around the center.
    ///
    /// The total change per axis is `dw` / `dh`; sizes never go negative.
    pub fn inflate(&self, dw: i32, dh: i32) -> Self {
        let w = (self.w + dw).max(0);
        let h = (self.h + dh).max(0);
        Self {
            x: self.x - dw.div_euclid(2),
            y: self.y - dh.div_euclid(2),
            w,
            h,
        }
    }

    pub fn translate(&self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
            ..*self
        }
    }

    /// True when the interiors overlap; touching edges do not count.
    pub fn overlaps(&self, other: &Rect) -> bool {
        !self.is_empty()
            && !other.is_empty()
            && self.x < other.right()
            && other.x < self.right()
            && self.y < other.bottom()
            && other.y < self.bottom()
    }

    pub fn contains_point(&self, p: IVec2) -> bool {
        p.x >= self.x && p.x < self.right() && p.y >= self.y && p.y < self.bottom()
    }

    /// A `dist`-thick strip just outside the given face.
    pub fn sliver(&self, dir: Direction, dist: i32) -> Self {
        let dist = dist.max(1);
        match dir {
            Direction::Up => Self::new(self.x, self.y - dist, self.w, dist),
            Direction::Down => Self::new(self.x, self.bottom(), self.w, dist),
            Direction::Left => Self::new(self.x - dist, self.y, dist, self.h),
            Direction::Right => Self::new(self.right(), self.y, dist, self.h),
        }
    }

    /// Overlap area, zero if disjoint
    pub fn intersection(&self, other: &Rect) -> Option<Rect> {
        let x0 = self.x.max(other.x);
        let y0 = self.y.max(other.y);
        let x1 = self.right().min(other.right());
        let y1 = self.bottom().min(other.bottom());
        (x1 > x0 && y1 > y0).then(|| Rect::new(x0, y0, x1 - x0, y1 - y0))
    }
}

/// One of the four grid directions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Down,
        Direction::Up,
        Direction::Left,
        Direction::Right,
    ];

    pub fn to_ivec(self) -> IVec2 {
        match self {
            Direction::Up => IVec2::new(0, -1),
            Direction::Down => IVec2::new(0, 1),
            Direction::Left => IVec2::new(-1, 0),
            Direction::Right => IVec2::new(1, 0),
        }
    }

    pub fn to_vec2(self) -> Vec2 {
        self.to_ivec().as_vec2()
    }

    pub fn opposite(self) -> Self {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }

    pub fn is_horizontal(self) -> bool {
        matches!(self, Direction::Left | Direction::Right)
    }

    /// Quarter turn of the raw vector, measured as in a y-up frame.
    ///
    /// Clockwise maps `(x, y)` to `(y, -x)`, so `Right` turns to `Up`;
    /// counter-clockwise maps `(x, y)` to `(-y, x)`, so `Right` turns to `Down`.
    pub fn turned(self, clockwise: bool) -> Self {
        match (self, clockwise) {
            (Direction::Right, true) => Direction::Up,
            (Direction::Up, true) => Direction::Left,
            (Direction::Left, true) => Direction::Down,
            (Direction::Down, true) => Direction::Right,
            (Direction::Right, false) => Direction::Down,
            (Direction::Down, false) => Direction::Left,
            (Direction::Left, false) => Direction::Up,
            (Direction::Up, false) => Direction::Right,
        }
    }
}

/// Place `rect` around the outer corner of `wall` it just ran past.
///
/// `travel` is the direction the rect was moving along the face it left and
/// `surface` points from the rect toward that face. The result hugs the wall
/// face that looks along `travel`, lined up with the edge of the face it left,
/// and extends in the `surface` direction.
pub fn outside_corner_snap(rect: Rect, wall: Rect, travel: Direction, surface: Direction) -> Rect {
    let mut out = rect;
    match travel {
        Direction::Right => out.x = wall.right(),
        Direction::Left => out.x = wall.left() - rect.w,
        Direction::Down => out.y = wall.bottom(),
        Direction::Up => out.y = wall.top() - rect.h,
    }
    match surface {
        Direction::Down => out.y = wall.top(),
        Direction::Up => out.y = wall.bottom() - rect.h,
        Direction::Right => out.x = wall.left(),
        Direction::Left => out.x = wall.right() - rect.w,
    }
    out
}

/// Subtract a set of closed-open intervals from `[start, end)`.
pub fn subtract_spans(start: i32, end: i32, cuts: &[(i32, i32)]) -> Vec<(i32, i32)> {
    let mut spans = vec![(start, end)];
    for &(c0, c1) in cuts {
        let mut next = Vec::with_capacity(spans.len() + 1);
        for (s0, s1) in spans {
            if c1 <= s0 || c0 >= s1 {
                next.push((s0, s1));
                continue;
            }
            if c0 > s0 {
                next.push((s0, c0));
            }
            if c1 < s1 {
                next.push((c1, s1));
            }
        }
        spans = next;
    }
    spans
}
