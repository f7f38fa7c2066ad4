/// Exponential moving average over raw load-cell samples, with a tare
/// offset subtracted from what gets reported.
#[derive(Debug, Clone)]
pub struct EmaFilter {
    alpha: f32,
    smoothed: Option<f32>,
    tare_offset: f32,
}

impl EmaFilter {
    pub fn new(alpha: f32) -> Self {
        Self {
            alpha: alpha.clamp(0.0, 1.0),
            smoothed: None,
            tare_offset: 0.0,
        }
    }

    /// Folds in one raw sample and returns the tared reading.
    pub fn update(&mut self, raw: f32) -> f32 {
        let smoothed = match self.smoothed {
            Some(previous) => previous + self.alpha * (raw - previous),
            None => raw,
        };
        self.smoothed = Some(smoothed);
        smoothed - self.tare_offset
    }

    /// Re-zeros the baseline at the current smoothed value.
    pub fn tare(&mut self) {
        self.tare_offset = self.smoothed.unwrap_or(0.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_sample_passes_through() {
        let mut filter = EmaFilter::new(0.2);
        assert_eq!(filter.update(100.0), 100.0);
    }

    #[test]
    fn converges_toward_a_constant_input() {
        let mut filter = EmaFilter::new(0.5);
        filter.update(0.0);

        let mut reading = 0.0;
        for _ in 0..20 {
            reading = filter.update(10.0);
        }
        assert!((reading - 10.0).abs() < 0.01);
    }

    #[test]
    fn tare_zeroes_the_current_baseline() {
        let mut filter = EmaFilter::new(1.0);
        filter.update(42.0);
        filter.tare();

        assert_eq!(filter.update(42.0), 0.0);
        assert_eq!(filter.update(52.0), 10.0);
    }

    #[test]
    fn tare_before_any_sample_is_a_noop() {
        let mut filter = EmaFilter::new(0.5);
        filter.tare();
        assert_eq!(filter.update(5.0), 5.0);
    }
}
