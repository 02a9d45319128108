use crate::palette::Rgba8;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EasingCurve {
    #[default]
    Linear,
    EaseIn,
    EaseOut,
    EaseInOut,
}

impl EasingCurve {
    fn apply(self, t: f32) -> f32 {
        match self {
            Self::Linear => t,
            Self::EaseIn => t * t,
            Self::EaseOut => 1.0 - (1.0 - t) * (1.0 - t),
            Self::EaseInOut => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    1.0 - ((-2.0 * t + 2.0).powi(2) / 2.0)
                }
            }
        }
    }
}

pub trait Interpolate {
    fn interpolate(from: &Self, to: &Self, t: f32) -> Self;
}

impl Interpolate for f32 {
    fn interpolate(from: &Self, to: &Self, t: f32) -> Self {
        from + (to - from) * t
    }
}

impl Interpolate for Rgba8 {
    fn interpolate(from: &Self, to: &Self, t: f32) -> Self {
        let channel = |a: u8, b: u8| {
            (f32::from(a) + (f32::from(b) - f32::from(a)) * t)
                .round()
                .clamp(0.0, 255.0) as u8
        };
        Self {
            r: channel(from.r, to.r),
            g: channel(from.g, to.g),
            b: channel(from.b, to.b),
        }
    }
}

/// A single in-flight transition on the session timeline, sampled by
/// millisecond timestamp. Holds its endpoints before the start and after the
/// end, so finished tweens can stay attached to their owner.
#[derive(Debug, Clone, Copy)]
pub struct Tween<T> {
    pub from: T,
    pub to: T,
    pub start_ms: u64,
    pub duration_ms: u64,
    pub easing: EasingCurve,
}

impl<T: Interpolate + Clone> Tween<T> {
    pub fn sample(&self, now_ms: u64) -> T {
        if now_ms <= self.start_ms || self.duration_ms == 0 {
            if now_ms >= self.start_ms + self.duration_ms {
                return self.to.clone();
            }
            return self.from.clone();
        }

        let end_ms = self.start_ms + self.duration_ms;
        if now_ms >= end_ms {
            return self.to.clone();
        }

        let progress = (now_ms - self.start_ms) as f32 / self.duration_ms as f32;
        let eased = self.easing.apply(progress.clamp(0.0, 1.0));
        T::interpolate(&self.from, &self.to, eased)
    }

    pub fn finished(&self, now_ms: u64) -> bool {
        now_ms >= self.start_ms + self.duration_ms
    }
}

#[cfg(test)]
mod tests {
    use super::{EasingCurve, Tween};
    use crate::palette::Rgba8;

    fn tween(start_ms: u64, duration_ms: u64) -> Tween<f32> {
        Tween {
            from: 0.0,
            to: 10.0,
            start_ms,
            duration_ms,
            easing: EasingCurve::Linear,
        }
    }

    #[test]
    fn sample_holds_endpoints_outside_the_window() {
        let t = tween(100, 200);
        assert_eq!(t.sample(0), 0.0);
        assert_eq!(t.sample(100), 0.0);
        assert_eq!(t.sample(200), 5.0);
        assert_eq!(t.sample(300), 10.0);
        assert_eq!(t.sample(1000), 10.0);
    }

    #[test]
    fn zero_duration_jumps_to_target() {
        let t = tween(100, 0);
        assert_eq!(t.sample(99), 0.0);
        assert_eq!(t.sample(100), 10.0);
        assert!(t.finished(100));
    }

    #[test]
    fn color_interpolation_is_channelwise() {
        let t = Tween {
            from: Rgba8::BLACK,
            to: Rgba8 { r: 200, g: 100, b: 50 },
            start_ms: 0,
            duration_ms: 100,
            easing: EasingCurve::Linear,
        };
        assert_eq!(t.sample(50), Rgba8 { r: 100, g: 50, b: 25 });
        assert_eq!(t.sample(100), Rgba8 { r: 200, g: 100, b: 50 });
    }

    #[test]
    fn ease_out_reaches_endpoints() {
        let t = Tween {
            easing: EasingCurve::EaseOut,
            ..tween(0, 100)
        };
        assert_eq!(t.sample(0), 0.0);
        assert_eq!(t.sample(100), 10.0);
        assert!(t.sample(50) > 5.0);
    }
}
