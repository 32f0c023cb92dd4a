use super::corpus::TrainingSample;
use super::domain::{TimePeriod, TrafficLevel, TripRequest, VehicleCategory};
use linfa::prelude::*;
use linfa_linear::{FittedLinearRegression, LinearRegression};
use ndarray::{arr2, Array1, Array2};

const FEATURE_COUNT: usize = 10;

/// Raised when the regression fit fails. Cloneable so a failed one-shot
/// initialization can be cached and re-reported to every caller.
#[derive(Debug, Clone, thiserror::Error)]
#[error("context model training failed: {message}")]
pub struct ModelError {
    message: String,
}

impl ModelError {
    fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Regression over trip attributes, fit once on the synthetic corpus. Only
/// ever queried at the fixed reference distance; the per-trip distance
/// scaling stays with the deterministic model.
pub(crate) struct ContextModel {
    fitted: FittedLinearRegression<f64>,
}

impl ContextModel {
    pub(crate) fn fit(samples: &[TrainingSample]) -> Result<Self, ModelError> {
        let flat: Vec<f64> = samples
            .iter()
            .flat_map(|sample| encode(&sample.request))
            .collect();
        let records = Array2::from_shape_vec((samples.len(), FEATURE_COUNT), flat)
            .map_err(|err| ModelError::new(err.to_string()))?;
        let targets = Array1::from_iter(samples.iter().map(|sample| sample.price));

        let dataset = Dataset::new(records, targets);
        let fitted = LinearRegression::new()
            .fit(&dataset)
            .map_err(|err| ModelError::new(err.to_string()))?;

        Ok(Self { fitted })
    }

    pub(crate) fn predict(&self, request: &TripRequest) -> f64 {
        let features = arr2(&[encode(request)]);
        self.fitted.predict(&features)[0]
    }
}

// Drop-one one-hot encoding keeps the design matrix full rank: the small
// vehicle, light traffic, and morning levels are the implicit baselines.
fn encode(request: &TripRequest) -> [f64; FEATURE_COUNT] {
    let vehicle = request.vehicle;
    let traffic = request.traffic;
    let period = request.period;

    [
        request.distance_km,
        indicator(vehicle == VehicleCategory::Medium),
        indicator(vehicle == VehicleCategory::Large),
        indicator(traffic == TrafficLevel::Medium),
        indicator(traffic == TrafficLevel::Heavy),
        indicator(traffic == TrafficLevel::VeryHeavy),
        indicator(period == TimePeriod::Afternoon),
        indicator(period == TimePeriod::Evening),
        indicator(period == TimePeriod::Night),
        indicator(request.is_peak_hour),
    ]
}

fn indicator(level_is_active: bool) -> f64 {
    if level_is_active {
        1.0
    } else {
        0.0
    }
}
