use crate::{RawClock, TimeUs};

/// Rollover model for a fixed-width hardware tick counter.
///
/// Converts raw counts into continuous microseconds and computes signed
/// deltas across the wrap boundary. Pure value type, no state beyond the
/// counter width and frequency.
#[derive(Clone, Copy, Debug)]
pub struct ClockModel {
    /// Width of the hardware counter in bits (counter wraps at 2^bits).
    pub counter_bits: u8,
    /// Counter frequency expressed as ticks per microsecond.
    pub ticks_per_us: f64,
}

impl ClockModel {
    /// Counter modulus expressed in microseconds.
    #[inline]
    pub fn modulus_us(&self) -> TimeUs {
        2f64.powi(self.counter_bits as i32) / self.ticks_per_us
    }

    /// Convert a raw count into microseconds since the counter epoch.
    ///
    /// Returns `None` for a count that is impossible for the configured
    /// width; such events carry no usable trigger time.
    #[inline]
    pub fn correct(&self, raw: RawClock) -> Option<TimeUs> {
        if self.counter_bits < 64 && (raw >> self.counter_bits) != 0 {
            return None;
        }
        Some(raw as f64 / self.ticks_per_us)
    }

    /// Signed delta `b - a` between two corrected times, re-centered into
    /// `(-M/2, +M/2]` so counts straddling the wrap yield a small delta
    /// instead of a near-full-range jump.
    #[inline]
    pub fn time_diff(&self, a: TimeUs, b: TimeUs) -> TimeUs {
        let m = self.modulus_us();
        let mut d = b - a;
        if d > m / 2.0 {
            d -= m;
        } else if d <= -m / 2.0 {
            d += m;
        }
        d
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clock_32bit_1mhz() -> ClockModel {
        ClockModel { counter_bits: 32, ticks_per_us: 1.0 }
    }

    #[test]
    fn correct_rejects_out_of_width_counts() {
        let c = ClockModel { counter_bits: 30, ticks_per_us: 20.0 };
        assert!(c.correct((1 << 30) - 1).is_some());
        assert!(c.correct(1 << 30).is_none());
        assert!(c.correct(u64::MAX).is_none());
    }

    #[test]
    fn correct_scales_by_frequency() {
        let c = ClockModel { counter_bits: 32, ticks_per_us: 20.0 };
        assert_eq!(c.correct(200), Some(10.0));
    }

    #[test]
    fn full_width_counter_accepts_all_counts() {
        let c = ClockModel { counter_bits: 64, ticks_per_us: 1.0 };
        assert!(c.correct(u64::MAX).is_some());
    }

    #[test]
    fn diff_across_wrap_is_small_and_signed() {
        let c = clock_32bit_1mhz();
        let a = c.correct(4294967295).unwrap();
        let b = c.correct(1).unwrap();
        // one tick before wrap vs one tick after: 2 us apart, not ~2^32
        assert_eq!(c.time_diff(a, b), 2.0);
        assert_eq!(c.time_diff(b, a), -2.0);
    }

    #[test]
    fn diff_without_wrap_is_plain_subtraction() {
        let c = clock_32bit_1mhz();
        assert_eq!(c.time_diff(100.0, 250.5), 150.5);
        assert_eq!(c.time_diff(250.5, 100.0), -150.5);
    }
}
