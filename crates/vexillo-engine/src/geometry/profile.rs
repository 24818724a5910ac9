//! Half-width profiles for [`MeshBuilder::add_tapering_strip`](super::MeshBuilder::add_tapering_strip).
//!
//! A profile maps the strip parameter `t` in `[0, 1]` to a half-width.
//! Negative results are treated as zero by the builder.

/// Same half-width along the whole strip.
pub fn constant(half_width: f32) -> impl Fn(f32) -> f32 + Copy {
    move |_| half_width
}

/// Linear blend from `base` at the start to `tip` at the end.
pub fn taper(base: f32, tip: f32) -> impl Fn(f32) -> f32 + Copy {
    move |t| base + (tip - base) * t.clamp(0.0, 1.0)
}

/// Thin shaft with knobs of half-width `knob` at both ends.
///
/// The knobs occupy the outer `end_fraction` of the strip on each side.
pub fn bone(shaft: f32, knob: f32, end_fraction: f32) -> impl Fn(f32) -> f32 + Copy {
    let span = end_fraction.max(f32::EPSILON);
    move |t| {
        let t = t.clamp(0.0, 1.0);
        let near = (1.0 - t / span).max(0.0);
        let far = (1.0 - (1.0 - t) / span).max(0.0);
        shaft + (knob - shaft) * near.max(far)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn taper_hits_both_ends() {
        let p = taper(0.04, 0.0);
        assert_eq!(p(0.0), 0.04);
        assert_eq!(p(1.0), 0.0);
        assert!((p(0.5) - 0.02).abs() < 1e-6);
    }

    #[test]
    fn bone_is_thicker_at_the_ends() {
        let p = bone(0.02, 0.05, 0.15);
        assert_eq!(p(0.0), 0.05);
        assert_eq!(p(1.0), 0.05);
        assert_eq!(p(0.5), 0.02);
    }
}
