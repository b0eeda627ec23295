use std::time::Duration;

use crate::color::Rgb;
use crate::math::Point2D;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Easing {
    Linear,
    #[default]
    CubicOut,
}

impl Easing {
    pub fn apply(self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Easing::Linear => t,
            Easing::CubicOut => {
                let f = t - 1.0;
                f * f * f + 1.0
            }
        }
    }
}

/// Values a tween can move between.
pub trait Interpolate: Clone {
    fn lerp(&self, to: &Self, t: f64) -> Self;
}

fn mix(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

impl Interpolate for f64 {
    fn lerp(&self, to: &Self, t: f64) -> Self {
        mix(*self, *to, t)
    }
}

impl Interpolate for Point2D {
    fn lerp(&self, to: &Self, t: f64) -> Self {
        Point2D::new(mix(self.x, to.x, t), mix(self.y, to.y, t))
    }
}

impl Interpolate for Rgb {
    fn lerp(&self, to: &Self, t: f64) -> Self {
        Rgb([
            mix(self.0[0], to.0[0], t),
            mix(self.0[1], to.0[1], t),
            mix(self.0[2], to.0[2], t),
        ])
    }
}

/// Identifies one committed transition. Every retarget gets a fresh id.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TransitionId(u64);

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transition {
    pub duration: Duration,
    pub easing: Easing,
}

impl Transition {
    pub const INSTANT: Transition = Transition { duration: Duration::ZERO, easing: Easing::Linear };

    pub fn new(duration: Duration, easing: Easing) -> Self {
        Transition { duration, easing }
    }

    pub fn millis(ms: u64) -> Self {
        Transition::new(Duration::from_millis(ms), Easing::CubicOut)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Motion<T> {
    Idle(T),
    Animating {
        from: T,
        to: T,
        elapsed: Duration,
        transition: Transition,
    },
}

/// Result of advancing a tween by one frame.
#[derive(Clone, Debug, PartialEq)]
pub struct Step<T> {
    pub value: T,
    /// Set on the frame the transition reaches its target.
    pub settled: Option<TransitionId>,
}

/// Timer-driven interpolation toward a target.
///
/// `Idle(v)` --retarget--> `Animating(from, to, elapsed)` --advance past duration--> `Idle(to)`.
/// Retargeting while animating starts the new transition from the current
/// interpolated value.
#[derive(Clone, Debug)]
pub struct Tween<T> {
    motion: Motion<T>,
    current: T,
    id: TransitionId,
}

impl<T: Interpolate> Tween<T> {
    pub fn new(value: T) -> Self {
        Tween {
            motion: Motion::Idle(value.clone()),
            current: value,
            id: TransitionId(0),
        }
    }

    pub fn value(&self) -> &T {
        &self.current
    }

    pub fn motion(&self) -> &Motion<T> {
        &self.motion
    }

    pub fn is_animating(&self) -> bool {
        matches!(self.motion, Motion::Animating { .. })
    }

    /// Id of the most recent retarget.
    pub fn current_id(&self) -> TransitionId {
        self.id
    }

    /// The value the tween is heading to (or resting at).
    pub fn target(&self) -> &T {
        match &self.motion {
            Motion::Idle(v) => v,
            Motion::Animating { to, .. } => to,
        }
    }

    /// Commits a new target. A zero duration jumps straight to `Idle(to)`.
    pub fn retarget(&mut self, to: T, transition: Transition) -> TransitionId {
        self.id = TransitionId(self.id.0 + 1);
        if transition.duration.is_zero() {
            self.current = to.clone();
            self.motion = Motion::Idle(to);
        } else {
            self.motion = Motion::Animating {
                from: self.current.clone(),
                to,
                elapsed: Duration::ZERO,
                transition,
            };
        }
        self.id
    }

    /// Moves time forward. Returns `None` when idle (nothing to emit).
    pub fn advance(&mut self, dt: Duration) -> Option<Step<T>> {
        let Motion::Animating { from, to, elapsed, transition } = &mut self.motion else {
            return None;
        };
        *elapsed += dt;
        if *elapsed >= transition.duration {
            let to = to.clone();
            self.current = to.clone();
            self.motion = Motion::Idle(to.clone());
            return Some(Step { value: to, settled: Some(self.id) });
        }
        let t = elapsed.as_secs_f64() / transition.duration.as_secs_f64();
        self.current = from.lerp(to, transition.easing.apply(t));
        Some(Step { value: self.current.clone(), settled: None })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn cubic_out_endpoints_and_shape() {
        assert_eq!(Easing::CubicOut.apply(0.0), 0.0);
        assert_eq!(Easing::CubicOut.apply(1.0), 1.0);
        assert!(Easing::CubicOut.apply(0.5) > 0.5);
        assert_eq!(Easing::Linear.apply(2.0), 1.0);
    }

    #[test]
    fn instant_retarget_is_idle_immediately() {
        let mut tw = Tween::new(1.0);
        tw.retarget(5.0, Transition::INSTANT);
        assert_eq!(*tw.value(), 5.0);
        assert!(!tw.is_animating());
        assert_eq!(tw.advance(ms(16)), None);
    }

    #[test]
    fn animates_along_path_then_settles() {
        let mut tw = Tween::new(0.0);
        let id = tw.retarget(10.0, Transition::new(ms(100), Easing::Linear));

        let step = tw.advance(ms(25)).unwrap();
        assert!((step.value - 2.5).abs() < 1e-9);
        assert_eq!(step.settled, None);

        let step = tw.advance(ms(100)).unwrap();
        assert_eq!(step.value, 10.0);
        assert_eq!(step.settled, Some(id));
        assert_eq!(tw.motion(), &Motion::Idle(10.0));
    }

    #[test]
    fn retarget_mid_flight_starts_from_current_value() {
        let mut tw = Tween::new(0.0);
        let first = tw.retarget(10.0, Transition::new(ms(100), Easing::Linear));
        tw.advance(ms(50));
        let second = tw.retarget(0.0, Transition::new(ms(100), Easing::Linear));
        assert_ne!(first, second);

        match tw.motion() {
            Motion::Animating { from, to, .. } => {
                assert!((from - 5.0).abs() < 1e-9);
                assert_eq!(*to, 0.0);
            }
            other => panic!("expected animation, got {:?}", other),
        }

        let step = tw.advance(ms(200)).unwrap();
        assert_eq!(step.settled, Some(second));
    }

    #[test]
    fn interpolates_points_and_colors() {
        let p = Point2D::new(0.0, 0.0).lerp(&Point2D::new(2.0, -2.0), 0.5);
        assert_eq!(p, Point2D::new(1.0, -1.0));
        let c = Rgb::new(0.0, 0.0, 1.0).lerp(&Rgb::new(1.0, 0.0, 0.0), 0.25);
        assert_eq!(c, Rgb::new(0.25, 0.0, 0.75));
    }
}
