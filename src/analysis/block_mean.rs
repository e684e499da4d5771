use crate::analysis::utility::mean;

/// Block width of a day in hours.
pub const DAILY: usize = 24;
/// Block width of a week in hours.
pub const WEEKLY: usize = 168;

/// Replaces every value with the mean of its fixed-width block.
///
/// Blocks are anchored at position 0 (`[0, width)`, `[width, 2*width)`, ...),
/// not at any calendar boundary. A trailing partial block averages only the
/// values it actually holds.
///
/// # Panics
///
/// Panics if `width` is zero.
pub fn block_means(values: &[f64], width: usize) -> Vec<f64> {
    assert!(width > 0, "block width must be positive");

    let mut out = Vec::with_capacity(values.len());
    for block in values.chunks(width) {
        let m = mean(block);
        out.extend(std::iter::repeat_n(m, block.len()));
    }
    out
}
