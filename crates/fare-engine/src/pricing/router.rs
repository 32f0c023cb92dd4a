use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::domain::{is_peak_clock, TimePeriod, TrafficLevel, TripRequest, VehicleCategory};
use super::{FareEstimator, PricingError};

/// Distance ladder used by the comparison view when the caller does not
/// supply one.
pub const DEFAULT_COMPARE_DISTANCES: [f64; 7] = [3.0, 5.0, 10.0, 15.0, 20.0, 25.0, 30.0];

// Booking forms default to mid-afternoon when no time is picked.
const DEFAULT_TIME_OF_DAY: &str = "14:00";

/// Router builder exposing the estimate and comparison endpoints.
pub fn fare_router(estimator: Arc<FareEstimator>) -> Router {
    Router::new()
        .route("/api/v1/fares/estimate", post(estimate_handler))
        .route("/api/v1/fares/compare", post(compare_handler))
        .with_state(estimator)
}

/// Wire shape of an estimate call. Categorical fields arrive as raw strings
/// and are normalized with documented defaults; the peak flag accepts a
/// boolean or 0/1 and is inferred from the clock when omitted.
#[derive(Debug, Default, Deserialize)]
pub struct EstimateRequest {
    pub distance_km: f64,
    #[serde(default)]
    pub vehicle_category: Option<String>,
    #[serde(default)]
    pub traffic_level: Option<String>,
    #[serde(default)]
    pub time_of_day: Option<String>,
    #[serde(default, deserialize_with = "deserialize_flag")]
    pub is_peak_hour: Option<bool>,
}

impl EstimateRequest {
    pub fn into_trip(self) -> TripRequest {
        let time_of_day = self
            .time_of_day
            .unwrap_or_else(|| DEFAULT_TIME_OF_DAY.to_string());
        let is_peak_hour = self
            .is_peak_hour
            .unwrap_or_else(|| is_peak_clock(&time_of_day));

        TripRequest::from_raw(
            self.distance_km,
            self.vehicle_category.as_deref().unwrap_or(""),
            self.traffic_level.as_deref().unwrap_or(""),
            &time_of_day,
            is_peak_hour,
        )
    }
}

/// Wire shape of the price/distance comparison view. Omitting the vehicle
/// category compares every category side by side.
#[derive(Debug, Default, Deserialize)]
pub struct CompareRequest {
    #[serde(default)]
    pub vehicle_category: Option<String>,
    #[serde(default)]
    pub traffic_level: Option<String>,
    #[serde(default)]
    pub time_of_day: Option<String>,
    #[serde(default, deserialize_with = "deserialize_flag")]
    pub is_peak_hour: Option<bool>,
    #[serde(default)]
    pub distances_km: Option<Vec<f64>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompareRow {
    pub vehicle_category: VehicleCategory,
    pub distance_km: f64,
    pub final_price: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompareResponse {
    pub traffic_level: TrafficLevel,
    pub time_period: TimePeriod,
    pub is_peak_hour: bool,
    pub rows: Vec<CompareRow>,
}

/// Price a distance ladder per category. Shared by the HTTP endpoint and the
/// CLI comparison table.
pub fn build_comparison(
    estimator: &FareEstimator,
    request: CompareRequest,
) -> Result<CompareResponse, PricingError> {
    let time_of_day = request
        .time_of_day
        .unwrap_or_else(|| DEFAULT_TIME_OF_DAY.to_string());
    let is_peak_hour = request
        .is_peak_hour
        .unwrap_or_else(|| is_peak_clock(&time_of_day));
    let traffic = TrafficLevel::normalize(request.traffic_level.as_deref().unwrap_or(""));
    let period = TimePeriod::normalize(&time_of_day);

    let categories: Vec<VehicleCategory> = match request.vehicle_category.as_deref() {
        Some(raw) => vec![VehicleCategory::normalize(raw)],
        None => VehicleCategory::ALL.to_vec(),
    };
    let distances = request
        .distances_km
        .unwrap_or_else(|| DEFAULT_COMPARE_DISTANCES.to_vec());

    let mut rows = Vec::with_capacity(categories.len() * distances.len());
    for category in categories {
        for &distance_km in &distances {
            let trip = TripRequest::new(distance_km, category, traffic, period, is_peak_hour);
            let quote = estimator.estimate(&trip)?;
            rows.push(CompareRow {
                vehicle_category: category,
                distance_km: trip.distance_km,
                final_price: quote.final_price,
            });
        }
    }

    Ok(CompareResponse {
        traffic_level: traffic,
        time_period: period,
        is_peak_hour,
        rows,
    })
}

pub(crate) async fn estimate_handler(
    State(estimator): State<Arc<FareEstimator>>,
    axum::Json(request): axum::Json<EstimateRequest>,
) -> Response {
    let trip = request.into_trip();
    match estimator.estimate(&trip) {
        Ok(quote) => (StatusCode::OK, axum::Json(quote)).into_response(),
        Err(PricingError::Model(error)) => {
            let payload = json!({
                "error": error.to_string(),
            });
            (StatusCode::SERVICE_UNAVAILABLE, axum::Json(payload)).into_response()
        }
    }
}

pub(crate) async fn compare_handler(
    State(estimator): State<Arc<FareEstimator>>,
    axum::Json(request): axum::Json<CompareRequest>,
) -> Response {
    match build_comparison(&estimator, request) {
        Ok(comparison) => (StatusCode::OK, axum::Json(comparison)).into_response(),
        Err(PricingError::Model(error)) => {
            let payload = json!({
                "error": error.to_string(),
            });
            (StatusCode::SERVICE_UNAVAILABLE, axum::Json(payload)).into_response()
        }
    }
}

fn deserialize_flag<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Bool(bool),
        Int(i64),
    }

    let value = Option::<Flag>::deserialize(deserializer)?;
    Ok(value.map(|flag| match flag {
        Flag::Bool(flag) => flag,
        Flag::Int(flag) => flag != 0,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn estimate_request_infers_peak_from_clock() {
        let request = EstimateRequest {
            distance_km: 8.0,
            vehicle_category: Some("small_vehicle".to_string()),
            traffic_level: Some("light".to_string()),
            time_of_day: Some("08:30".to_string()),
            is_peak_hour: None,
        };
        let trip = request.into_trip();
        assert!(trip.is_peak_hour);
        assert_eq!(trip.period, TimePeriod::Morning);
    }

    #[test]
    fn explicit_peak_flag_wins_over_clock() {
        let request = EstimateRequest {
            distance_km: 8.0,
            time_of_day: Some("08:30".to_string()),
            is_peak_hour: Some(false),
            ..EstimateRequest::default()
        };
        assert!(!request.into_trip().is_peak_hour);
    }

    #[test]
    fn missing_fields_resolve_to_documented_defaults() {
        let request = EstimateRequest {
            distance_km: 5.0,
            ..EstimateRequest::default()
        };
        let trip = request.into_trip();
        assert_eq!(trip.vehicle, VehicleCategory::Medium);
        assert_eq!(trip.traffic, TrafficLevel::Medium);
        assert_eq!(trip.period, TimePeriod::Afternoon);
        assert!(!trip.is_peak_hour);
    }

    #[test]
    fn peak_flag_accepts_zero_and_one() {
        let request: EstimateRequest =
            serde_json::from_value(json!({ "distance_km": 4.0, "is_peak_hour": 1 }))
                .expect("deserializes");
        assert_eq!(request.is_peak_hour, Some(true));

        let request: EstimateRequest =
            serde_json::from_value(json!({ "distance_km": 4.0, "is_peak_hour": 0 }))
                .expect("deserializes");
        assert_eq!(request.is_peak_hour, Some(false));

        let request: EstimateRequest =
            serde_json::from_value(json!({ "distance_km": 4.0, "is_peak_hour": true }))
                .expect("deserializes");
        assert_eq!(request.is_peak_hour, Some(true));
    }

    #[test]
    fn comparison_covers_all_categories_by_default() {
        let estimator = FareEstimator::new();
        let comparison =
            build_comparison(&estimator, CompareRequest::default()).expect("comparison builds");
        assert_eq!(
            comparison.rows.len(),
            VehicleCategory::ALL.len() * DEFAULT_COMPARE_DISTANCES.len()
        );
        assert_eq!(comparison.time_period, TimePeriod::Afternoon);
        assert!(!comparison.is_peak_hour);
    }

    #[test]
    fn comparison_rows_never_decrease_with_distance() {
        let estimator = FareEstimator::new();
        let comparison = build_comparison(
            &estimator,
            CompareRequest {
                vehicle_category: Some("large_vehicle".to_string()),
                traffic_level: Some("heavy".to_string()),
                ..CompareRequest::default()
            },
        )
        .expect("comparison builds");

        for pair in comparison.rows.windows(2) {
            assert!(pair[0].final_price <= pair[1].final_price);
        }
    }
}
