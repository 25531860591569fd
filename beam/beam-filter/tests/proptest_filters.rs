//! Property-based tests for the smoothing filters.
//!
//! Random samples and parameters; checks the pass-through, reset, hold,
//! and bracketing invariants shared by the One-Euro and EMA filters.
//!
//! Run with: cargo test -p beam-filter -- proptest

use approx::relative_eq;
use beam_filter::{Ema2, Ema3, EmaConfig, EmaRotator, OneEuroConfig, OneEuroFilter2};
use glam::{Vec2, Vec3};
use proptest::prelude::*;

const DT: f32 = 1.0 / 120.0;

proptest! {
    /// The first sample after construction or reset passes through
    /// unchanged, for any filter parameters.
    #[test]
    fn one_euro_first_sample_is_identity(
        x in -4000.0f32..4000.0,
        y in -4000.0f32..4000.0,
        min_cutoff in 0.1f32..10.0,
        beta in 0.0f32..2.0,
    ) {
        let config = OneEuroConfig { min_cutoff, beta, data_rate_hz: 120.0 };
        let sample = Vec2::new(x, y);

        let mut filter = OneEuroFilter2::new(config);
        prop_assert_eq!(filter.apply(sample, DT), sample);

        filter.apply(Vec2::ZERO, DT);
        filter.reset();
        prop_assert_eq!(filter.apply(sample, DT), sample);
    }

    /// EMA first-sample identity holds for every channel shape.
    #[test]
    fn ema_first_sample_is_identity(
        x in -500.0f32..500.0,
        y in -500.0f32..500.0,
        z in -500.0f32..500.0,
        alpha in 0.01f32..1.0,
        adaptive: bool,
    ) {
        let config = EmaConfig { alpha, adaptive, min_confidence: 0.0 };

        let mut ema2 = Ema2::new(config);
        prop_assert_eq!(ema2.apply(Vec2::new(x, y), 1.0), Vec2::new(x, y));

        let mut ema3 = Ema3::new(config);
        prop_assert_eq!(ema3.apply(Vec3::new(x, y, z), 1.0), Vec3::new(x, y, z));

        let mut rot = EmaRotator::new(config);
        prop_assert_eq!(rot.apply(Vec3::new(x, y, z), 1.0), Vec3::new(x, y, z));
    }

    /// Each One-Euro step lands between the previous output and the sample.
    #[test]
    fn one_euro_output_brackets_input(
        start in -1000.0f32..1000.0,
        target in -1000.0f32..1000.0,
        min_cutoff in 0.1f32..10.0,
        beta in 0.0f32..2.0,
    ) {
        let config = OneEuroConfig { min_cutoff, beta, data_rate_hz: 120.0 };
        let mut filter = OneEuroFilter2::new(config);
        filter.apply(Vec2::new(start, 0.0), DT);
        let out = filter.apply(Vec2::new(target, 0.0), DT);

        let lo = start.min(target);
        let hi = start.max(target);
        prop_assert!(out.x >= lo - 1e-3 && out.x <= hi + 1e-3);
    }

    /// A non-positive `dt` behaves exactly like the configured data rate.
    #[test]
    fn one_euro_bad_dt_matches_data_rate(
        x in -100.0f32..100.0,
        rate in 30.0f32..240.0,
    ) {
        let config = OneEuroConfig { min_cutoff: 1.0, beta: 0.2, data_rate_hz: rate };

        let mut bad = OneEuroFilter2::new(config);
        bad.apply(Vec2::ZERO, 0.0);
        let from_bad = bad.apply(Vec2::new(x, 0.0), -1.0);

        let mut good = OneEuroFilter2::new(config);
        good.apply(Vec2::ZERO, 1.0 / rate);
        let from_good = good.apply(Vec2::new(x, 0.0), 1.0 / rate);

        prop_assert!(relative_eq!(from_bad.x, from_good.x, epsilon = 1e-4));
        prop_assert!(relative_eq!(from_bad.y, from_good.y, epsilon = 1e-4));
    }

    /// A below-threshold confidence never moves the EMA output.
    #[test]
    fn ema_low_confidence_holds(
        held in -500.0f32..500.0,
        next in -500.0f32..500.0,
        min_confidence in 0.1f32..1.0,
    ) {
        let config = EmaConfig { alpha: 0.5, adaptive: false, min_confidence };
        let mut ema = Ema3::new(config);
        ema.apply(Vec3::splat(held), 1.0);
        let out = ema.apply(Vec3::splat(next), min_confidence / 2.0);
        prop_assert_eq!(out, Vec3::splat(held));
    }
}
