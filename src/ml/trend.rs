//! Score trend using linear regression (linfa)

use linfa::prelude::*;
use linfa_linear::LinearRegression;
use ndarray::{Array1, Array2};
use serde::Serialize;

/// Minimum scored submissions required for a fit
const MIN_DATA_POINTS: usize = 3;

/// Submissions averaged for the recent-mean figure
pub const RECENT_WINDOW: usize = 5;

/// Linear fit of score against submission index
pub struct ScoreTrend {
    slope: f64,
    intercept: f64,
    r2_score: f64,
    scores: Vec<f64>,
}

/// Trend summary for display
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendReport {
    /// Score change per submission
    pub slope: f64,
    pub next_score: f64,
    pub r2_score: f64,
    pub data_points: usize,
    pub recent_mean: Option<f64>,
}

impl ScoreTrend {
    /// Fit a trend over scores in submission order
    pub fn fit(scores: &[f64]) -> Option<Self> {
        if scores.len() < MIN_DATA_POINTS {
            return None;
        }

        // X = submission index, Y = score
        let x_data: Vec<f64> = (0..scores.len()).map(|i| i as f64).collect();
        let records = Array2::from_shape_vec((scores.len(), 1), x_data).ok()?;
        let targets = Array1::from_vec(scores.to_vec());

        let dataset = Dataset::new(records, targets);

        let model = LinearRegression::default().fit(&dataset).ok()?;

        let slope = model.params()[0];
        let intercept = model.intercept();

        let predictions = model.predict(&dataset);
        let r2_score = predictions.r2(&dataset).unwrap_or(0.0);

        Some(Self {
            slope,
            intercept,
            // Flat scores leave R2 undefined
            r2_score: if r2_score.is_finite() { r2_score } else { 0.0 },
            scores: scores.to_vec(),
        })
    }

    /// Predicted score at a submission index
    pub fn predict(&self, index: usize) -> f64 {
        self.slope * index as f64 + self.intercept
    }

    /// Predicted score of the next submission
    pub fn next_score(&self) -> f64 {
        self.predict(self.scores.len())
    }

    pub fn slope(&self) -> f64 {
        self.slope
    }

    pub fn r2_score(&self) -> f64 {
        self.r2_score
    }

    pub fn data_points(&self) -> usize {
        self.scores.len()
    }

    /// Mean of the last `n` scores
    pub fn recent_mean(&self, n: usize) -> Option<f64> {
        if n == 0 {
            return None;
        }
        let recent = &self.scores[self.scores.len().saturating_sub(n)..];
        Some(recent.iter().sum::<f64>() / recent.len() as f64)
    }

    pub fn report(&self) -> TrendReport {
        TrendReport {
            slope: self.slope,
            next_score: self.next_score(),
            r2_score: self.r2_score,
            data_points: self.data_points(),
            recent_mean: self.recent_mean(RECENT_WINDOW),
        }
    }

    /// One-line summary for logs and the CLI
    pub fn format_report(&self) -> String {
        let report = self.report();
        let slope = if report.slope >= 0.0 {
            format!("+{:.2}", report.slope)
        } else {
            format!("{:.2}", report.slope)
        };

        let mut line = format!(
            "Trend: {} per submission | Next: {:.2} | R2: {:.2} ({} points)",
            slope, report.next_score, report.r2_score, report.data_points
        );
        if let Some(mean) = report.recent_mean {
            line.push_str(&format!(" | Recent mean: {:.2}", mean));
        }
        line
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trend_insufficient_data() {
        assert!(ScoreTrend::fit(&[]).is_none());
        assert!(ScoreTrend::fit(&[3.0, 3.5]).is_none());
    }

    #[test]
    fn test_trend_rising_scores() {
        let trend = ScoreTrend::fit(&[2.0, 3.0, 4.0]).unwrap();

        let slope = trend.slope();
        assert!(slope > 0.9 && slope < 1.1, "Slope: {}", slope);
        assert!(trend.r2_score() > 0.9, "R2 score: {}", trend.r2_score());

        let next = trend.next_score();
        assert!(next > 4.9 && next < 5.1, "Next: {}", next);
    }

    #[test]
    fn test_trend_falling_scores() {
        let trend = ScoreTrend::fit(&[5.0, 4.5, 4.0, 3.5]).unwrap();
        assert!(trend.slope() < 0.0);
        assert!(trend.next_score() < trend.predict(0));
    }

    #[test]
    fn test_data_points_count() {
        let trend = ScoreTrend::fit(&[3.0, 3.1, 3.2, 3.3]).unwrap();
        assert_eq!(trend.data_points(), 4);
    }

    #[test]
    fn test_recent_mean() {
        let trend = ScoreTrend::fit(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]).unwrap();
        assert_eq!(trend.recent_mean(2), Some(5.5));
        assert_eq!(trend.recent_mean(100), Some(3.5));
        assert_eq!(trend.recent_mean(0), None);
    }

    #[test]
    fn test_report() {
        let trend = ScoreTrend::fit(&[2.0, 3.0, 4.0]).unwrap();
        let report = trend.report();
        assert_eq!(report.data_points, 3);
        assert_eq!(report.recent_mean, Some(3.0));
        assert!(report.slope > 0.0);
    }

    #[test]
    fn test_format_report() {
        let trend = ScoreTrend::fit(&[2.0, 3.0, 4.0]).unwrap();
        let formatted = trend.format_report();

        assert!(formatted.contains("Trend: +"), "Format: {}", formatted);
        assert!(formatted.contains("Next:"), "Format: {}", formatted);
        assert!(formatted.contains("Recent mean: 3.00"), "Format: {}", formatted);
    }
}
