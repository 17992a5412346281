//! Velocity alterations requested by forces, bouncers and gravity zones.
//!
//! A source fixture never touches another body's velocity directly. It returns
//! a [`VelocityAlteration`] from its stored closure, and [`alter`] applies it.
//! Keeping the math in the closure makes every bouncer or force testable
//! without a collision in sight.

use serde::{Deserialize, Serialize};

use crate::body::Body;
use crate::fixture::Fixture;
use crate::geometry::Vec2;

// ---------------------------------------------------------------------------
// AxisAlteration
// ---------------------------------------------------------------------------

/// How one velocity axis is changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AlterationMode {
    /// Leave the axis alone.
    #[default]
    Keep,
    /// Add the value to the current component.
    Add,
    /// Overwrite the component with the value.
    Set,
}

/// Change applied to a single axis.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct AxisAlteration {
    /// Add, set, or keep.
    pub mode: AlterationMode,
    /// Amount added or value set.
    pub value: f64,
}

impl AxisAlteration {
    /// Leave the axis unchanged.
    pub const KEEP: AxisAlteration = AxisAlteration {
        mode: AlterationMode::Keep,
        value: 0.0,
    };

    /// Add `value`.
    pub fn add(value: f64) -> Self {
        Self {
            mode: AlterationMode::Add,
            value,
        }
    }

    /// Set to `value`.
    pub fn set(value: f64) -> Self {
        Self {
            mode: AlterationMode::Set,
            value,
        }
    }

    fn apply(self, current: f64) -> f64 {
        match self.mode {
            AlterationMode::Keep => current,
            AlterationMode::Add => current + self.value,
            AlterationMode::Set => self.value,
        }
    }
}

// ---------------------------------------------------------------------------
// VelocityClamp
// ---------------------------------------------------------------------------

/// Per-axis bounds on the resulting velocity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VelocityClamp {
    /// Lower bound per axis.
    pub min: Vec2,
    /// Upper bound per axis.
    pub max: Vec2,
}

impl VelocityClamp {
    /// Bounds from two corners in any order.
    pub fn new(a: Vec2, b: Vec2) -> Self {
        Self {
            min: Vec2::new(a.x.min(b.x), a.y.min(b.y)),
            max: Vec2::new(a.x.max(b.x), a.y.max(b.y)),
        }
    }

    /// Bounds `[-limit, limit]` on each axis.
    pub fn symmetric(limit_x: f64, limit_y: f64) -> Self {
        let (lx, ly) = (limit_x.abs(), limit_y.abs());
        Self::new(Vec2::new(-lx, -ly), Vec2::new(lx, ly))
    }

    fn clamp_axis(value: f64, lo: f64, hi: f64) -> f64 {
        let (lo, hi) = if lo <= hi { (lo, hi) } else { (hi, lo) };
        if value.is_nan() {
            return 0.0_f64.max(lo).min(hi);
        }
        value.max(lo).min(hi)
    }

    /// Clamp `v` into the bounds.
    pub fn apply(&self, v: Vec2) -> Vec2 {
        Vec2::new(
            Self::clamp_axis(v.x, self.min.x, self.max.x),
            Self::clamp_axis(v.y, self.min.y, self.max.y),
        )
    }
}

// ---------------------------------------------------------------------------
// VelocityAlteration
// ---------------------------------------------------------------------------

/// A requested velocity change.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct VelocityAlteration {
    /// Horizontal change.
    pub x: AxisAlteration,
    /// Vertical change.
    pub y: AxisAlteration,
    /// Optional bounds applied after the change.
    pub clamp: Option<VelocityClamp>,
}

impl VelocityAlteration {
    /// Change nothing.
    pub fn none() -> Self {
        Self::default()
    }

    /// Add to both axes.
    pub fn add(dx: f64, dy: f64) -> Self {
        Self {
            x: AxisAlteration::add(dx),
            y: AxisAlteration::add(dy),
            clamp: None,
        }
    }

    /// Overwrite both axes.
    pub fn set(vx: f64, vy: f64) -> Self {
        Self {
            x: AxisAlteration::set(vx),
            y: AxisAlteration::set(vy),
            clamp: None,
        }
    }

    /// Overwrite the horizontal axis only.
    pub fn set_x(vx: f64) -> Self {
        Self {
            x: AxisAlteration::set(vx),
            ..Self::default()
        }
    }

    /// Overwrite the vertical axis only.
    pub fn set_y(vy: f64) -> Self {
        Self {
            y: AxisAlteration::set(vy),
            ..Self::default()
        }
    }

    /// Attach bounds on the result.
    pub fn with_clamp(mut self, clamp: VelocityClamp) -> Self {
        self.clamp = Some(clamp);
        self
    }

    /// The velocity that results from applying this alteration to `v`.
    pub fn apply_to(&self, v: Vec2) -> Vec2 {
        let out = Vec2::new(self.x.apply(v.x), self.y.apply(v.y));
        match &self.clamp {
            Some(clamp) => clamp.apply(out),
            None => out,
        }
    }
}

/// The fixture a force or bouncer is acting on, with its body for context.
#[derive(Debug, Clone, Copy)]
pub struct AffectedFixture<'a> {
    /// The touched fixture.
    pub fixture: &'a Fixture,
    /// The body that owns it.
    pub body: &'a Body,
}

/// Apply `alteration` to the body's velocity.
pub fn alter(body: &mut Body, alteration: &VelocityAlteration) {
    body.velocity = alteration.apply_to(body.velocity);
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::EntityId;

    fn moving_body(vx: f64, vy: f64) -> Body {
        Body::new(EntityId::new(0, 0), Vec2::ZERO, Vec2::new(1.0, 1.0)).with_velocity(vx, vy)
    }

    #[test]
    fn add_accumulates() {
        let mut b = moving_body(1.0, 2.0);
        alter(&mut b, &VelocityAlteration::add(3.0, -1.0));
        alter(&mut b, &VelocityAlteration::add(3.0, -1.0));
        assert_eq!(b.velocity, Vec2::new(7.0, 0.0));
    }

    #[test]
    fn set_overwrites_only_the_named_axis() {
        let mut b = moving_body(5.0, -9.0);
        alter(&mut b, &VelocityAlteration::set_y(12.0));
        assert_eq!(b.velocity, Vec2::new(5.0, 12.0));
    }

    #[test]
    fn clamp_bounds_the_result() {
        let mut b = moving_body(0.0, 0.0);
        let push = VelocityAlteration::add(1e9, -1e9).with_clamp(VelocityClamp::symmetric(4.0, 6.0));
        alter(&mut b, &push);
        assert_eq!(b.velocity, Vec2::new(4.0, -6.0));
    }

    #[test]
    fn clamp_corners_in_any_order() {
        let clamp = VelocityClamp::new(Vec2::new(3.0, 3.0), Vec2::new(-3.0, -1.0));
        assert_eq!(clamp.min, Vec2::new(-3.0, -1.0));
        assert_eq!(clamp.apply(Vec2::new(-10.0, 10.0)), Vec2::new(-3.0, 3.0));
    }

    #[test]
    fn nan_result_stays_within_clamp() {
        let clamp = VelocityClamp::new(Vec2::new(2.0, -5.0), Vec2::new(8.0, 5.0));
        let out = VelocityAlteration::set(f64::NAN, f64::NAN)
            .with_clamp(clamp)
            .apply_to(Vec2::ZERO);
        assert_eq!(out, Vec2::new(2.0, 0.0));
    }

    #[test]
    fn none_changes_nothing() {
        let v = Vec2::new(-3.5, 8.25);
        assert_eq!(VelocityAlteration::none().apply_to(v), v);
    }
}
