/// Center frequencies of `count` bins covering a band that starts at `low_edge_hz`,
/// shifted by the LO offset into the true RF domain.
pub fn bin_centers(low_edge_hz: u64, lnb_lo: i64, step_hz: f64, count: usize) -> impl Iterator<Item = f64> {
    let first = low_edge_hz as f64 + lnb_lo as f64 + step_hz / 2.0;
    (0..count).map(move |i| first + i as f64 * step_hz)
}
