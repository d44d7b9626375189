//! Delay regression and versioned model snapshots.

use chrono::{DateTime, Utc};

use super::types::FeedbackRecord;
use crate::error::{FleetError, Result};

/// Linear model `delay ≈ intercept + a·distance + b·estimated_time`.
///
/// Fitted by ordinary least squares on centred features. When the two
/// features are collinear the model falls back to a single feature, and to
/// the mean delay when neither varies.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DelayModel {
    pub intercept: f64,
    /// Seconds of delay per metre.
    pub coef_distance: f64,
    /// Seconds of delay per planned second.
    pub coef_time: f64,
    /// Mean absolute error on the training rows, in seconds.
    pub mae: f64,
    pub samples: usize,
}

impl DelayModel {
    /// Fits the model on `records`.
    ///
    /// # Errors
    /// [`FleetError::Input`] when `records` is empty.
    ///
    /// # Examples
    ///
    /// ```
    /// use chrono::Utc;
    /// use u_fleet::feedback::{DelayModel, ExecutedRoute, FeedbackRecord};
    ///
    /// let records: Vec<FeedbackRecord> = [(1_000.0, 600.0, 660.0), (2_000.0, 1_200.0, 1_320.0), (4_000.0, 1_800.0, 2_100.0)]
    ///     .iter()
    ///     .map(|&(d, est, actual)| {
    ///         let run = ExecutedRoute {
    ///             route_id: "V1".into(),
    ///             planned_stops: vec![],
    ///             executed_stops: vec![],
    ///             estimated_time: est,
    ///             actual_time: actual,
    ///             distance: d,
    ///         };
    ///         FeedbackRecord::from_execution(&run, Utc::now())
    ///     })
    ///     .collect();
    ///
    /// let model = DelayModel::fit(&records).unwrap();
    /// assert!(model.mae < 1e-6);
    /// assert!((model.predict(1_000.0, 600.0) - 60.0).abs() < 1e-6);
    /// ```
    pub fn fit(records: &[FeedbackRecord]) -> Result<Self> {
        if records.is_empty() {
            return Err(FleetError::input("no feedback records to train on"));
        }
        let n = records.len() as f64;
        let xs: Vec<(f64, f64)> = records.iter().map(|r| (r.planned_distance(), r.planned_time())).collect();
        let ys: Vec<f64> = records.iter().map(|r| r.delay()).collect();

        let mean_d = xs.iter().map(|x| x.0).sum::<f64>() / n;
        let mean_t = xs.iter().map(|x| x.1).sum::<f64>() / n;
        let mean_y = ys.iter().sum::<f64>() / n;

        let (mut sdd, mut stt, mut sdt, mut sdy, mut sty) = (0.0, 0.0, 0.0, 0.0, 0.0);
        for ((d, t), y) in xs.iter().zip(&ys) {
            let (cd, ct, cy) = (d - mean_d, t - mean_t, y - mean_y);
            sdd += cd * cd;
            stt += ct * ct;
            sdt += cd * ct;
            sdy += cd * cy;
            sty += ct * cy;
        }

        let det = sdd * stt - sdt * sdt;
        let (coef_distance, coef_time) = if sdd > 0.0 && stt > 0.0 && det > 1e-12 * sdd * stt {
            ((sdy * stt - sty * sdt) / det, (sty * sdd - sdy * sdt) / det)
        } else if stt > 0.0 {
            (0.0, sty / stt)
        } else if sdd > 0.0 {
            (sdy / sdd, 0.0)
        } else {
            (0.0, 0.0)
        };
        let intercept = mean_y - coef_distance * mean_d - coef_time * mean_t;

        let mut model = Self {
            intercept,
            coef_distance,
            coef_time,
            mae: 0.0,
            samples: records.len(),
        };
        model.mae = xs
            .iter()
            .zip(&ys)
            .map(|((d, t), y)| (model.predict(*d, *t) - y).abs())
            .sum::<f64>()
            / n;
        Ok(model)
    }

    /// Raw prediction; may be negative.
    pub fn predict(&self, distance_m: f64, estimated_time_s: f64) -> f64 {
        self.intercept + self.coef_distance * distance_m + self.coef_time * estimated_time_s
    }
}

/// An immutable, versioned trained model.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ModelSnapshot {
    pub version: u64,
    pub trained_at: DateTime<Utc>,
    pub model: DelayModel,
}

impl ModelSnapshot {
    /// Expected delay in seconds, clamped at zero.
    pub fn predicted_delay(&self, distance_m: f64, estimated_time_s: f64) -> f64 {
        self.model.predict(distance_m, estimated_time_s).max(0.0)
    }
}
