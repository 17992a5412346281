//! Planar vectors, bounding boxes and fixture shapes.
//!
//! Fixture shapes are authored in `f64` game units. Exact overlap, point
//! containment and segment crossing queries go through `parry2d` (re-exported
//! by rapier2d), after a cheap bounding-box rejection.

use std::ops::{Add, AddAssign, Mul, Neg, Sub, SubAssign};

use rapier2d::math::{Isometry, Point, Real, Vector};
use rapier2d::parry::query::{self, PointQuery, Ray, RayCast};
use rapier2d::parry::shape::{Ball, Cuboid, Segment, Shape};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Vec2
// ---------------------------------------------------------------------------

/// A 2D vector in game units (pixels). Used for positions, sizes, offsets and
/// velocities alike.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vec2 {
    /// Horizontal component.
    pub x: f64,
    /// Vertical component (up is positive).
    pub y: f64,
}

impl Vec2 {
    /// The zero vector.
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };

    /// Construct from components.
    #[inline]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Squared euclidean length.
    #[inline]
    pub fn length_squared(self) -> f64 {
        self.x * self.x + self.y * self.y
    }

    /// Euclidean distance to `other`.
    #[inline]
    pub fn distance(self, other: Vec2) -> f64 {
        (self - other).length_squared().sqrt()
    }

    fn to_point(self) -> Point<Real> {
        Point::new(self.x as Real, self.y as Real)
    }

    fn from_point(p: Point<Real>) -> Self {
        Self::new(p.x as f64, p.y as f64)
    }
}

impl Add for Vec2 {
    type Output = Vec2;
    fn add(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Vec2 {
    type Output = Vec2;
    fn sub(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl AddAssign for Vec2 {
    fn add_assign(&mut self, rhs: Vec2) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl SubAssign for Vec2 {
    fn sub_assign(&mut self, rhs: Vec2) {
        self.x -= rhs.x;
        self.y -= rhs.y;
    }
}

impl Neg for Vec2 {
    type Output = Vec2;
    fn neg(self) -> Vec2 {
        Vec2::new(-self.x, -self.y)
    }
}

impl Mul<f64> for Vec2 {
    type Output = Vec2;
    fn mul(self, rhs: f64) -> Vec2 {
        Vec2::new(self.x * rhs, self.y * rhs)
    }
}

// ---------------------------------------------------------------------------
// Bounds
// ---------------------------------------------------------------------------

/// An axis-aligned bounding box. Edges are inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    /// Bottom-left corner.
    pub min: Vec2,
    /// Top-right corner.
    pub max: Vec2,
}

impl Bounds {
    /// Box centered on `center` with the given half extents.
    pub fn from_center(center: Vec2, half: Vec2) -> Self {
        Self {
            min: center - half,
            max: center + half,
        }
    }

    /// Box spanned by two arbitrary corners.
    pub fn spanning(a: Vec2, b: Vec2) -> Self {
        Self {
            min: Vec2::new(a.x.min(b.x), a.y.min(b.y)),
            max: Vec2::new(a.x.max(b.x), a.y.max(b.y)),
        }
    }

    /// Width of the box.
    pub fn width(&self) -> f64 {
        self.max.x - self.min.x
    }

    /// Height of the box.
    pub fn height(&self) -> f64 {
        self.max.y - self.min.y
    }

    /// Center point.
    pub fn center(&self) -> Vec2 {
        (self.min + self.max) * 0.5
    }

    /// Whether the two boxes share at least one point.
    pub fn overlaps(&self, other: &Bounds) -> bool {
        self.min.x <= other.max.x
            && other.min.x <= self.max.x
            && self.min.y <= other.max.y
            && other.min.y <= self.max.y
    }

    /// Whether `p` lies inside or on the edge of the box.
    pub fn contains(&self, p: Vec2) -> bool {
        p.x >= self.min.x && p.x <= self.max.x && p.y >= self.min.y && p.y <= self.max.y
    }
}

// ---------------------------------------------------------------------------
// FixtureShape
// ---------------------------------------------------------------------------

/// The immutable shape of a fixture, centered on the fixture's position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum FixtureShape {
    /// Axis-aligned rectangle.
    Rect {
        /// Full width.
        width: f64,
        /// Full height.
        height: f64,
    },
    /// Circle.
    Circle {
        /// Radius.
        radius: f64,
    },
    /// Segment from the fixture center to `center + to`. Lasers use this.
    Line {
        /// End point relative to the fixture center.
        to: Vec2,
    },
}

impl FixtureShape {
    /// Place the shape at a world-space center.
    pub fn at(self, center: Vec2) -> PlacedShape {
        PlacedShape {
            shape: self,
            center,
        }
    }
}

enum ParryShape {
    Cuboid(Cuboid),
    Ball(Ball),
    Segment(Segment),
}

impl ParryShape {
    fn as_shape(&self) -> &dyn Shape {
        match self {
            ParryShape::Cuboid(s) => s,
            ParryShape::Ball(s) => s,
            ParryShape::Segment(s) => s,
        }
    }
}

// ---------------------------------------------------------------------------
// PlacedShape
// ---------------------------------------------------------------------------

/// A fixture shape resolved to a world-space position for one tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlacedShape {
    /// The local shape.
    pub shape: FixtureShape,
    /// World-space center.
    pub center: Vec2,
}

impl PlacedShape {
    /// World-space bounding box.
    pub fn bounds(&self) -> Bounds {
        match self.shape {
            FixtureShape::Rect { width, height } => {
                Bounds::from_center(self.center, Vec2::new(width * 0.5, height * 0.5))
            }
            FixtureShape::Circle { radius } => {
                Bounds::from_center(self.center, Vec2::new(radius, radius))
            }
            FixtureShape::Line { to } => Bounds::spanning(self.center, self.center + to),
        }
    }

    fn isometry(&self) -> Isometry<Real> {
        Isometry::translation(self.center.x as Real, self.center.y as Real)
    }

    fn parry(&self) -> ParryShape {
        match self.shape {
            FixtureShape::Rect { width, height } => ParryShape::Cuboid(Cuboid::new(Vector::new(
                (width * 0.5) as Real,
                (height * 0.5) as Real,
            ))),
            FixtureShape::Circle { radius } => ParryShape::Ball(Ball::new(radius as Real)),
            FixtureShape::Line { to } => {
                ParryShape::Segment(Segment::new(Point::origin(), Vec2::to_point(to)))
            }
        }
    }

    /// Whether the two shapes overlap (touching counts).
    pub fn overlaps(&self, other: &PlacedShape) -> bool {
        if !self.bounds().overlaps(&other.bounds()) {
            return false;
        }
        // Two rectangles are fully decided by their boxes.
        if matches!(self.shape, FixtureShape::Rect { .. })
            && matches!(other.shape, FixtureShape::Rect { .. })
        {
            return true;
        }
        let (a, b) = (self.parry(), other.parry());
        match query::intersection_test(
            &self.isometry(),
            a.as_shape(),
            &other.isometry(),
            b.as_shape(),
        ) {
            Ok(hit) => hit,
            Err(_) => {
                tracing::trace!(
                    a = ?self.shape,
                    b = ?other.shape,
                    "unsupported shape pair, falling back to bounding boxes"
                );
                true
            }
        }
    }

    /// Whether the world-space point `p` lies inside the shape.
    pub fn contains_point(&self, p: Vec2) -> bool {
        if let FixtureShape::Rect { .. } = self.shape {
            return self.bounds().contains(p);
        }
        self.parry()
            .as_shape()
            .contains_point(&self.isometry(), &p.to_point())
    }

    /// Points where this shape, taken as a segment, crosses the boundary of
    /// `other`. Returns nothing unless `self` is a [`FixtureShape::Line`].
    ///
    /// At most two points are produced: the first crossing walking from the
    /// segment start, and the first crossing walking back from its end.
    pub fn crossings(&self, other: &PlacedShape) -> Vec<Vec2> {
        let FixtureShape::Line { to } = self.shape else {
            return Vec::new();
        };
        let start = self.center;
        let end = self.center + to;
        let target = other.parry();
        let iso = other.isometry();

        let mut points: Vec<Vec2> = Vec::with_capacity(2);
        for (origin, dir) in [(start, end - start), (end, start - end)] {
            let ray = Ray::new(origin.to_point(), Vector::new(dir.x as Real, dir.y as Real));
            if let Some(toi) = target.as_shape().cast_ray(&iso, &ray, 1.0, false) {
                let hit = Vec2::from_point(ray.point_at(toi));
                if points.iter().all(|p| p.distance(hit) > 1e-3) {
                    points.push(hit);
                }
            }
        }
        points
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
