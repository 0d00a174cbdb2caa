use rand::Rng;

/// GLSL-style `mix(a, b, t)` for scalars.
#[inline]
pub fn mix(a: f32, b: f32, t: f32) -> f32 {
    a * (1.0 - t) + b * t
}

/// Uniform sample in `[0, span)`; a non-positive span yields 0.
///
/// Unlike `gen_range`, never panics on an empty range, which happens on
/// canvases narrower than the spawn margins.
#[inline]
pub fn uniform<R: Rng + ?Sized>(rng: &mut R, span: f32) -> f32 {
    if span > 0.0 {
        rng.gen::<f32>() * span
    } else {
        0.0
    }
}

/// Centered noise in `[-amplitude/2, amplitude/2)`.
#[inline]
pub fn jitter<R: Rng + ?Sized>(rng: &mut R, amplitude: f32) -> f32 {
    (rng.gen::<f32>() - 0.5) * amplitude
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_mix_endpoints() {
        assert_eq!(mix(2.0, 6.0, 0.0), 2.0);
        assert_eq!(mix(2.0, 6.0, 1.0), 6.0);
        assert!((mix(2.0, 6.0, 0.25) - 3.0).abs() < 1e-6);
    }

    #[test]
    fn test_uniform_empty_span_is_zero() {
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(uniform(&mut rng, 0.0), 0.0);
        assert_eq!(uniform(&mut rng, -40.0), 0.0);
    }

    #[test]
    fn test_jitter_bounds() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..1000 {
            let j = jitter(&mut rng, 4.0);
            assert!((-2.0..2.0).contains(&j), "jitter out of range: {j}");
        }
    }
}
