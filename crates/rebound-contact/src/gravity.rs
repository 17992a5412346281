//! Gravity-direction zones.
//!
//! A zone re-orients an entity's "up" once the leading edge of its body
//! crosses into the zone. The leading edge is picked from the sign of the
//! body's motion this tick: a body moving up and to the right is tested at
//! its top-right corner, a body falling straight down at its bottom-center.
//! Leaving a zone changes nothing; turning back needs another zone.

use rebound_body::body::{Body, BodyLabel};
use rebound_body::fixture::{Direction, Fixture, FixtureHandle};
use rebound_body::geometry::{Bounds, Vec2};

use crate::capability::GameEntity;
use crate::ContactError;

/// The point of `bounds` leading a motion of `delta`.
///
/// Per axis: positive motion picks the max edge, negative the min edge, and
/// no motion the center.
pub fn probe_point(bounds: Bounds, delta: Vec2) -> Vec2 {
    let center = bounds.center();
    let pick = |d: f64, min: f64, max: f64, mid: f64| {
        if d > 0.0 {
            max
        } else if d < 0.0 {
            min
        } else {
            mid
        }
    };
    Vec2::new(
        pick(delta.x, bounds.min.x, bounds.max.x, center.x),
        pick(delta.y, bounds.min.y, bounds.max.y, center.y),
    )
}

/// Rotate `entity` if `body`'s leading point is inside the zone.
///
/// Returns the direction applied, or `None` when nothing changed.
pub(crate) fn apply_zone(
    body: &Body,
    entity: &mut dyn GameEntity,
    zone: &Fixture,
    zone_handle: FixtureHandle,
    zone_body_center: Vec2,
) -> Result<Option<Direction>, ContactError> {
    let point = probe_point(body.bounds(), body.position_delta());
    if !zone.placed(zone_body_center).contains_point(point) {
        return Ok(None);
    }
    if body.has_label(BodyLabel::NoGravityRotation) {
        return Ok(None);
    }
    let Some(rotatable) = entity.as_rotatable() else {
        return Ok(None);
    };
    let direction = zone.props.direction.ok_or(ContactError::MissingProperty {
        fixture: zone_handle,
        kind: zone.kind(),
        property: "direction",
    })?;
    if rotatable.direction_rotation() != direction {
        tracing::debug!(entity = %body.entity(), ?direction, "gravity rotated");
    }
    rotatable.set_direction_rotation(direction);
    Ok(Some(direction))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_box() -> Bounds {
        Bounds {
            min: Vec2::new(0.0, 0.0),
            max: Vec2::new(2.0, 4.0),
        }
    }

    #[test]
    fn probe_follows_motion_sign() {
        let b = unit_box();
        assert_eq!(probe_point(b, Vec2::new(1.0, 1.0)), Vec2::new(2.0, 4.0));
        assert_eq!(probe_point(b, Vec2::new(-1.0, -1.0)), Vec2::new(0.0, 0.0));
        assert_eq!(probe_point(b, Vec2::new(0.0, -3.0)), Vec2::new(1.0, 0.0));
        assert_eq!(probe_point(b, Vec2::new(5.0, 0.0)), Vec2::new(2.0, 2.0));
        assert_eq!(probe_point(b, Vec2::ZERO), Vec2::new(1.0, 2.0));
    }
}
