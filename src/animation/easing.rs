//! Easing curves mapping linear progress in `[0, 1]` to eased progress.

use std::f32::consts::PI;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Easing {
    #[default]
    Linear,
    QuadraticIn,
    QuadraticOut,
    QuadraticInOut,
    CubicIn,
    CubicOut,
    CubicInOut,
    QuinticIn,
    QuinticOut,
    QuinticInOut,
    SinusoidalInOut,
    BounceIn,
    BounceOut,
    BounceInOut,
}

impl Easing {
    pub fn apply(self, k: f32) -> f32 {
        match self {
            Easing::Linear => k,
            Easing::QuadraticIn => k * k,
            Easing::QuadraticOut => k * (2.0 - k),
            Easing::QuadraticInOut => {
                let k = k * 2.0;
                if k < 1.0 {
                    0.5 * k * k
                } else {
                    let k = k - 1.0;
                    -0.5 * (k * (k - 2.0) - 1.0)
                }
            }
            Easing::CubicIn => k * k * k,
            Easing::CubicOut => {
                let k = k - 1.0;
                k * k * k + 1.0
            }
            Easing::CubicInOut => {
                let k = k * 2.0;
                if k < 1.0 {
                    0.5 * k * k * k
                } else {
                    let k = k - 2.0;
                    0.5 * (k * k * k + 2.0)
                }
            }
            Easing::QuinticIn => k.powi(5),
            Easing::QuinticOut => (k - 1.0).powi(5) + 1.0,
            Easing::QuinticInOut => {
                let k = k * 2.0;
                if k < 1.0 {
                    0.5 * k.powi(5)
                } else {
                    0.5 * ((k - 2.0).powi(5) + 2.0)
                }
            }
            Easing::SinusoidalInOut => 0.5 * (1.0 - (PI * k).cos()),
            Easing::BounceIn => 1.0 - bounce_out(1.0 - k),
            Easing::BounceOut => bounce_out(k),
            Easing::BounceInOut => {
                if k < 0.5 {
                    (1.0 - bounce_out(1.0 - k * 2.0)) * 0.5
                } else {
                    bounce_out(k * 2.0 - 1.0) * 0.5 + 0.5
                }
            }
        }
    }
}

fn bounce_out(k: f32) -> f32 {
    if k < 1.0 / 2.75 {
        7.5625 * k * k
    } else if k < 2.0 / 2.75 {
        let k = k - 1.5 / 2.75;
        7.5625 * k * k + 0.75
    } else if k < 2.5 / 2.75 {
        let k = k - 2.25 / 2.75;
        7.5625 * k * k + 0.9375
    } else {
        let k = k - 2.625 / 2.75;
        7.5625 * k * k + 0.984375
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;

    const ALL: [Easing; 14] = [
        Easing::Linear,
        Easing::QuadraticIn,
        Easing::QuadraticOut,
        Easing::QuadraticInOut,
        Easing::CubicIn,
        Easing::CubicOut,
        Easing::CubicInOut,
        Easing::QuinticIn,
        Easing::QuinticOut,
        Easing::QuinticInOut,
        Easing::SinusoidalInOut,
        Easing::BounceIn,
        Easing::BounceOut,
        Easing::BounceInOut,
    ];

    #[test]
    fn test_endpoints() {
        for easing in ALL {
            assert!(easing.apply(0.0).abs() < 1e-5, "{easing:?} at 0");
            assert!((easing.apply(1.0) - 1.0).abs() < 1e-5, "{easing:?} at 1");
        }
    }

    #[test]
    fn test_in_out_curves_are_symmetric() {
        let mut rng = rand::rng();
        for easing in [
            Easing::QuadraticInOut,
            Easing::CubicInOut,
            Easing::QuinticInOut,
            Easing::SinusoidalInOut,
        ] {
            for _ in 0..50 {
                let k: f32 = rng.random_range(0.0..1.0);
                let sum = easing.apply(k) + easing.apply(1.0 - k);
                assert!((sum - 1.0).abs() < 1e-4, "{easing:?} at {k}");
            }
        }
    }

    #[test]
    fn test_smooth_curves_stay_in_range() {
        let mut rng = rand::rng();
        for _ in 0..200 {
            let k: f32 = rng.random_range(0.0..=1.0);
            for easing in ALL {
                let v = easing.apply(k);
                assert!((-1e-4..=1.0 + 1e-4).contains(&v), "{easing:?} at {k} gave {v}");
            }
        }
    }

    #[test]
    fn test_quadratic_out_is_ahead_of_linear() {
        assert!(Easing::QuadraticOut.apply(0.5) > 0.5);
        assert!(Easing::QuadraticIn.apply(0.5) < 0.5);
    }
}
