//! Capability traits shared by the concrete entity kinds.
//!
//! Kinds mix these freely: a resource node is only an [`Item`], units and
//! projectiles are [`Mobile`] and [`Living`]. Each trait needs a pair of
//! accessors from the implementor and provides the behaviour on top.

use crate::components::{Body, EntityId, Footprint, Life, Motion};
use crate::math::{Fixed, Vec2Fixed};

/// Anything that exists in the arena.
pub trait Item {
    /// Shared entity state.
    fn body(&self) -> &Body;

    /// Mutable shared entity state.
    fn body_mut(&mut self) -> &mut Body;

    /// Identity of the entity.
    fn id(&self) -> EntityId {
        self.body().id()
    }

    /// Current world position.
    fn position(&self) -> Vec2Fixed {
        self.body().position
    }

    /// Fixed footprint.
    fn footprint(&self) -> Footprint {
        self.body().footprint()
    }

    /// Whether the entity is flagged for removal.
    fn is_pending_removal(&self) -> bool {
        self.body().is_pending_removal()
    }

    /// Flag the entity for removal. It is not updated again and is erased by
    /// the registry one full pass later.
    fn mark_for_removal(&mut self) {
        self.body_mut().mark_for_removal();
    }
}

/// Entities that move and burn fuel.
pub trait Mobile: Item {
    /// Movement state.
    fn motion(&self) -> &Motion;

    /// Mutable movement state.
    fn motion_mut(&mut self) -> &mut Motion;

    /// Per-tick bookkeeping, called before any positional change.
    fn pre_update(&mut self) {
        self.motion_mut().reset_speed();
    }

    /// Turn instantly toward `target`.
    ///
    /// The heading is kept when `target` is the current position.
    fn rotate_to(&mut self, target: Vec2Fixed) {
        if let Some(heading) = (target - self.position()).normalize() {
            self.motion_mut().heading = heading;
        }
    }

    /// Euclidean distance to `target`.
    fn distance_to(&self, target: Vec2Fixed) -> Fixed {
        self.position().distance(target)
    }

    /// Longest distance the remaining fuel can fund.
    fn max_travel(&self) -> Fixed {
        self.motion().max_travel()
    }

    /// Move by the current speed along the heading and pay for it.
    ///
    /// The caller caps `speed` to [`max_travel`](Self::max_travel) first; this
    /// does not shorten the move on its own. Returns the distance travelled.
    fn advance(&mut self) -> Fixed {
        let motion = *self.motion();
        if motion.speed <= Fixed::ZERO {
            return Fixed::ZERO;
        }

        let cost = motion.fuel_cost(motion.speed);
        self.motion_mut().burn(cost);
        let step = motion.heading.scale(motion.speed);
        let body = self.body_mut();
        body.position = body.position + step;
        motion.speed
    }

    /// Add fuel, clamped to capacity. Returns the amount accepted.
    fn refuel(&mut self, amount: Fixed) -> Fixed {
        self.motion_mut().add_fuel(amount)
    }
}

/// Entities with life points.
pub trait Living: Item {
    /// Life state.
    fn life(&self) -> &Life;

    /// Mutable life state.
    fn life_mut(&mut self) -> &mut Life;

    /// Remove up to `amount` life points, floored at zero.
    ///
    /// When life reaches zero and `fatal_if_zero` is set, the kind's death
    /// transition runs. Returns the damage actually dealt.
    fn take_life(&mut self, amount: u32, fatal_if_zero: bool) -> u32 {
        let dealt = self.life_mut().apply_damage(amount);
        if fatal_if_zero && self.life().is_dead() {
            self.on_death();
        }
        dealt
    }

    /// Death transition. Every kind in this game is removed on death.
    fn on_death(&mut self) {
        self.mark_for_removal();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::Footprint;

    struct Dummy {
        body: Body,
        motion: Motion,
        life: Life,
    }

    impl Item for Dummy {
        fn body(&self) -> &Body {
            &self.body
        }

        fn body_mut(&mut self) -> &mut Body {
            &mut self.body
        }
    }

    impl Mobile for Dummy {
        fn motion(&self) -> &Motion {
            &self.motion
        }

        fn motion_mut(&mut self) -> &mut Motion {
            &mut self.motion
        }
    }

    impl Living for Dummy {
        fn life(&self) -> &Life {
            &self.life
        }

        fn life_mut(&mut self) -> &mut Life {
            &mut self.life
        }
    }

    fn dummy() -> Dummy {
        Dummy {
            body: Body::new(7, Vec2Fixed::ZERO, Footprint::new(2, 2)),
            motion: Motion::new(
                Fixed::from_num(5),
                Fixed::from_num(100),
                Fixed::from_num(100),
                Fixed::from_num(1),
            ),
            life: Life::new(10),
        }
    }

    #[test]
    fn test_rotate_then_advance() {
        let mut p = dummy();
        p.rotate_to(Vec2Fixed::from_num(0, 30));
        assert_eq!(p.motion().heading, Vec2Fixed::from_num(0, 1));

        let travelled = p.advance();
        assert_eq!(travelled, Fixed::from_num(5));
        assert_eq!(p.position(), Vec2Fixed::from_num(0, 5));
        assert_eq!(p.motion().fuel(), Fixed::from_num(99));
        assert_eq!(p.distance_to(Vec2Fixed::from_num(0, 30)), Fixed::from_num(25));
    }

    #[test]
    fn test_rotate_to_own_position_keeps_heading() {
        let mut p = dummy();
        p.rotate_to(Vec2Fixed::from_num(0, -3));
        p.rotate_to(Vec2Fixed::ZERO);
        assert_eq!(p.motion().heading, Vec2Fixed::from_num(0, -1));
    }

    #[test]
    fn test_partial_move_pays_partial_fuel() {
        let mut p = dummy();
        p.motion_mut().speed = Fixed::from_num(2.5);
        p.advance();
        assert_eq!(p.position(), Vec2Fixed::from_num(2.5, 0));
        assert_eq!(p.motion().fuel(), Fixed::from_num(99.5));

        p.pre_update();
        assert_eq!(p.motion().speed, Fixed::from_num(5));
    }

    #[test]
    fn test_zero_speed_does_not_move_or_burn() {
        let mut p = dummy();
        p.motion_mut().speed = Fixed::ZERO;
        assert_eq!(p.advance(), Fixed::ZERO);
        assert_eq!(p.position(), Vec2Fixed::ZERO);
        assert_eq!(p.motion().fuel(), Fixed::from_num(100));
    }

    #[test]
    fn test_take_life_triggers_death_only_when_fatal() {
        let mut p = dummy();
        p.take_life(10, false);
        assert!(p.life().is_dead());
        assert!(!p.is_pending_removal());

        let mut q = dummy();
        assert_eq!(q.take_life(25, true), 10);
        assert!(q.is_pending_removal());
    }
}
