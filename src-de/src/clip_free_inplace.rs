use ndarray::Array1;

/// Project `x` onto the box: free variables are clamped, fixed ones pinned to their bound.
pub(crate) fn clip_free_inplace(
    x: &mut Array1<f64>,
    lower: &Array1<f64>,
    upper: &Array1<f64>,
    is_free: &[bool],
) {
    for i in 0..x.len() {
        x[i] = if is_free[i] {
            // NaN coordinates would escape clamp, pull them back to the lower bound
            if x[i].is_nan() { lower[i] } else { x[i].clamp(lower[i], upper[i]) }
        } else {
            lower[i]
        };
    }
}
