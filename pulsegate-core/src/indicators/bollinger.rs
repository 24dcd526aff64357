//! Volatility bands — moving average ± standard deviation multiplier.
//!
//! Middle: SMA(close, period). Upper/lower: middle ± mult * stddev.
//! Width: upper - lower. Uses population stddev (divide by N).

/// The four band series, all aligned to the input length.
pub struct BandSeries {
    pub upper: Vec<f64>,
    pub middle: Vec<f64>,
    pub lower: Vec<f64>,
    pub width: Vec<f64>,
}

pub fn band_series(closes: &[f64], period: usize, multiplier: f64) -> BandSeries {
    let n = closes.len();
    let mut upper = vec![f64::NAN; n];
    let mut middle = vec![f64::NAN; n];
    let mut lower = vec![f64::NAN; n];
    let mut width = vec![f64::NAN; n];

    if n >= period && period > 0 {
        for i in (period - 1)..n {
            let window = &closes[i + 1 - period..=i];
            if window.iter().any(|v| v.is_nan()) {
                continue;
            }

            let mean = window.iter().sum::<f64>() / period as f64;
            let variance = window
                .iter()
                .map(|v| {
                    let diff = v - mean;
                    diff * diff
                })
                .sum::<f64>()
                / period as f64;
            let stddev = variance.sqrt();

            middle[i] = mean;
            upper[i] = mean + multiplier * stddev;
            lower[i] = mean - multiplier * stddev;
            width[i] = upper[i] - lower[i];
        }
    }

    BandSeries {
        upper,
        middle,
        lower,
        width,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, DEFAULT_EPSILON};

    #[test]
    fn middle_is_sma() {
        let bands = band_series(&[10.0, 11.0, 12.0, 13.0, 14.0], 3, 2.0);
        assert!(bands.middle[1].is_nan());
        assert_approx(bands.middle[2], 11.0, DEFAULT_EPSILON);
        assert_approx(bands.middle[3], 12.0, DEFAULT_EPSILON);
    }

    #[test]
    fn bands_symmetric_around_middle() {
        let bands = band_series(&[10.0, 11.0, 12.0, 13.0, 14.0], 3, 2.0);
        for i in 2..5 {
            let up = bands.upper[i] - bands.middle[i];
            let down = bands.middle[i] - bands.lower[i];
            assert_approx(up, down, DEFAULT_EPSILON);
        }
    }

    #[test]
    fn constant_price_zero_width() {
        let bands = band_series(&[100.0; 5], 3, 2.0);
        assert_approx(bands.width[3], 0.0, DEFAULT_EPSILON);
        assert_approx(bands.upper[3], 100.0, DEFAULT_EPSILON);
    }

    #[test]
    fn width_is_upper_minus_lower() {
        let closes = [10.0, 14.0, 9.0, 15.0, 11.0, 13.0];
        let bands = band_series(&closes, 3, 2.0);
        for i in 2..6 {
            assert_approx(bands.width[i], bands.upper[i] - bands.lower[i], DEFAULT_EPSILON);
        }
    }

    #[test]
    fn nan_window_skipped_not_fatal() {
        let closes = [10.0, 11.0, f64::NAN, 13.0, 14.0, 15.0];
        let bands = band_series(&closes, 3, 2.0);
        assert!(bands.middle[2].is_nan());
        assert!(bands.middle[3].is_nan());
        assert!(bands.middle[4].is_nan());
        // Window [3,4,5] is clean again.
        assert!(!bands.middle[5].is_nan());
    }
}
