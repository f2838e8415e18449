use std::f32::consts::TAU;

/// Symmetric Hann window, scaled so its coefficients average to 1.0.
///
/// The normalisation keeps a windowed full-scale sine at the same spectral
/// peak height as an unwindowed one, so dB readings need no extra offset.
pub fn hann_normalised(len: usize) -> Vec<f32> {
    if len <= 1 {
        return vec![1.0; len];
    }

    let denom = (len - 1) as f32;
    let mut window: Vec<f32> = (0..len)
        .map(|i| 0.5 - 0.5 * (TAU * i as f32 / denom).cos())
        .collect();

    let sum: f32 = window.iter().sum();
    if sum > 0.0 {
        let factor = len as f32 / sum;
        for w in &mut window {
            *w *= factor;
        }
    }

    window
}
