/// Equal-width histogram over `[min, min + width * counts.len()]`.
///
/// The last bin is closed on the right so the maximum value is counted.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Histogram {
    pub min: f64,
    pub width: f64,
    pub counts: Vec<usize>,
}

impl Histogram {
    /// Bin `values` into `bins` equal-width buckets spanning their range.
    ///
    /// Empty input (or `bins == 0`) yields no buckets. A constant series gets
    /// a unit-wide span centred on the value.
    pub fn new(values: &[f64], bins: usize) -> Self {
        let finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
        if finite.is_empty() || bins == 0 {
            return Self::default();
        }

        let lo = finite.iter().copied().fold(f64::INFINITY, f64::min);
        let hi = finite.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let (min, span) = if hi > lo { (lo, hi - lo) } else { (lo - 0.5, 1.0) };
        let width = span / bins as f64;

        let mut counts = vec![0usize; bins];
        for v in finite {
            let idx = (((v - min) / width).floor() as usize).min(bins - 1);
            counts[idx] += 1;
        }

        Self { min, width, counts }
    }

    pub fn total(&self) -> usize {
        self.counts.iter().sum()
    }

    pub fn max_count(&self) -> usize {
        self.counts.iter().copied().max().unwrap_or(0)
    }

    /// `(lower, upper, count)` per bucket.
    pub fn buckets(&self) -> impl Iterator<Item = (f64, f64, usize)> + '_ {
        self.counts.iter().enumerate().map(|(i, &c)| {
            let lower = self.min + self.width * i as f64;
            (lower, lower + self.width, c)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_every_value_once() {
        let values: Vec<f64> = (0..100).map(f64::from).collect();
        let h = Histogram::new(&values, 30);
        assert_eq!(h.counts.len(), 30);
        assert_eq!(h.total(), 100);
        assert_eq!(h.counts[29], 4, "max lands in the last bin");
    }

    #[test]
    fn two_values_fill_the_outer_bins() {
        let h = Histogram::new(&[300.0, 150.0], 30);
        assert_eq!(h.min, 150.0);
        assert_eq!(h.width, 5.0);
        assert_eq!(h.counts[0], 1);
        assert_eq!(h.counts[29], 1);
        assert_eq!(h.total(), 2);
    }

    #[test]
    fn constant_series_gets_a_single_populated_bin() {
        let h = Histogram::new(&[42.0, 42.0, 42.0], 30);
        assert_eq!(h.total(), 3);
        assert_eq!(h.max_count(), 3);
        let (lo, hi, _) = h.buckets().find(|b| b.2 == 3).unwrap();
        assert!(lo <= 42.0 && 42.0 < hi);
    }

    #[test]
    fn empty_input_has_no_buckets() {
        let h = Histogram::new(&[], 30);
        assert!(h.counts.is_empty());
        assert_eq!(h.max_count(), 0);
        assert_eq!(h.buckets().count(), 0);
    }
}
