pub struct StatsHelper;

impl StatsHelper {
    /// Index and value of the strongest bin.
    pub fn peak(powers: &[f32]) -> Option<(usize, f32)> {
        powers
            .iter()
            .copied()
            .enumerate()
            .filter(|(_, v)| !v.is_nan())
            .max_by(|a, b| a.1.total_cmp(&b.1))
    }

    pub fn mean(powers: &[f32]) -> f32 {
        if powers.is_empty() {
            return 0.0;
        }
        powers.iter().sum::<f32>() / powers.len() as f32
    }
}
