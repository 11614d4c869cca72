//! Preview scale derivation from viewport and page dimensions

/// Compute the preview scale factor for a page inside the available
/// viewport area (viewport minus fixed chrome regions).
///
/// Returns `min(avail_w / page_w, avail_h / page_h, 1.0)`: the page is
/// shrunk to fit but never upscaled past its native resolution, so for
/// positive inputs the result is always in `(0, 1]`.
///
/// Recomputed on every resize and page navigation; never stored, and
/// never used to mutate stored marker positions (those stay in document
/// space).
pub fn fit_scale(avail_w: f64, avail_h: f64, page_w: f64, page_h: f64) -> f64 {
    let fit_w = avail_w / page_w;
    let fit_h = avail_h / page_h;
    fit_w.min(fit_h).min(1.0)
}
