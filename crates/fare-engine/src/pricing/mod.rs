//! Hybrid fare estimation: a transparent deterministic cost model nudged by
//! a bounded, learned context factor, with fairness and charge-band
//! guarantees enforced on the way out.

mod corpus;
mod deterministic;
pub mod domain;
mod model;
pub mod router;
pub mod tables;

pub use deterministic::{compute_breakdown, PriceBreakdown};
pub use domain::{is_peak_clock, TimePeriod, TrafficLevel, TripRequest, VehicleCategory};
pub use model::ModelError;
pub use router::{
    build_comparison, fare_router, CompareRequest, CompareResponse, CompareRow, EstimateRequest,
};
pub use tables::{FactorTable, PricingPolicy, RateCard, RateTable};

use model::ContextModel;
use serde::Serialize;
use std::sync::OnceLock;
use tracing::info;

/// Error raised by the estimator. Input problems never surface here; they
/// are normalized away. Only a failed model initialization is fatal.
#[derive(Debug, thiserror::Error)]
pub enum PricingError {
    #[error(transparent)]
    Model(#[from] ModelError),
}

/// Complete quote returned to callers: the rounded price plus everything
/// needed to explain it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FareQuote {
    /// Final price in whole currency units. Rounding happens here and only
    /// here; the breakdown keeps full precision.
    pub final_price: i64,
    pub breakdown: PriceBreakdown,
    pub context_factor: f64,
    pub fair_floor: f64,
}

/// Owns the rate tables, the blending policy, and the one-shot context model
/// cache. Construct once at the composition root and share by reference;
/// `estimate` is a pure function of its inputs after the model is resident.
pub struct FareEstimator {
    rates: RateTable,
    factors: FactorTable,
    policy: PricingPolicy,
    model: OnceLock<Result<ContextModel, ModelError>>,
}

impl Default for FareEstimator {
    fn default() -> Self {
        Self::new()
    }
}

impl FareEstimator {
    pub fn new() -> Self {
        Self::with_config(
            RateTable::default(),
            FactorTable::default(),
            PricingPolicy::default(),
        )
    }

    pub fn with_policy(policy: PricingPolicy) -> Self {
        Self::with_config(RateTable::default(), FactorTable::default(), policy)
    }

    pub fn with_config(rates: RateTable, factors: FactorTable, policy: PricingPolicy) -> Self {
        Self {
            rates,
            factors,
            policy,
            model: OnceLock::new(),
        }
    }

    pub fn rates(&self) -> &RateTable {
        &self.rates
    }

    pub fn policy(&self) -> &PricingPolicy {
        &self.policy
    }

    /// Train the context model eagerly instead of on the first quote.
    pub fn warm_up(&self) -> Result<(), PricingError> {
        self.context_model().map(|_| ())
    }

    /// Quote a trip. The only failure mode is a context model that could not
    /// be trained; every input combination produces some valid quote.
    pub fn estimate(&self, request: &TripRequest) -> Result<FareQuote, PricingError> {
        let breakdown = compute_breakdown(request, &self.rates, &self.factors);
        let context_factor = self.context_factor(request)?;
        let fair_floor = self.fairness_floor(request.distance_km, request.vehicle);

        let card = self.rates.card(request.vehicle);
        let final_price = (breakdown.deterministic_total * context_factor)
            .max(fair_floor)
            .max(card.minimum_charge)
            .min(card.maximum_charge);

        Ok(FareQuote {
            final_price: final_price.round() as i64,
            breakdown,
            context_factor,
            fair_floor,
        })
    }

    /// Bounded correction derived from the model's opinion of this
    /// vehicle/traffic/time combination at the reference distance. Querying
    /// at a fixed distance keeps per-trip distance scaling fully
    /// deterministic, so prices stay monotonic in distance no matter how
    /// noisy the fit is. The peak flag is cleared on both sides of the
    /// ratio: the deterministic multiplier already carries the full peak
    /// surcharge, and letting the model's weaker peak lift into the ratio
    /// would discount peak trips below off-peak ones wherever the minimum
    /// charge binds.
    pub fn context_factor(&self, request: &TripRequest) -> Result<f64, PricingError> {
        let model = self.context_model()?;

        let reference = TripRequest::new(
            self.policy.reference_distance_km,
            request.vehicle,
            request.traffic,
            request.period,
            false,
        );
        let reference_deterministic =
            compute_breakdown(&reference, &self.rates, &self.factors).deterministic_total;
        if reference_deterministic <= 0.0 {
            return Ok(1.0);
        }

        let predicted = model.predict(&reference);
        let raw = predicted / reference_deterministic;
        Ok(raw.clamp(self.policy.context_factor_min, self.policy.context_factor_max))
    }

    /// Distance-scaling minimum: the category minimum charge plus a floor
    /// rate on every kilometer beyond the free base, capped at the maximum
    /// charge. Guarantees longer trips are never underpriced.
    pub fn fairness_floor(&self, distance_km: f64, category: VehicleCategory) -> f64 {
        let card = self.rates.card(category);
        let billable_km = (distance_km - self.policy.floor_free_km).max(0.0);
        (card.minimum_charge + billable_km * card.per_km_floor).min(card.maximum_charge)
    }

    fn context_model(&self) -> Result<&ContextModel, PricingError> {
        let outcome = self.model.get_or_init(|| {
            let samples = corpus::generate(&self.rates, &self.factors, &self.policy);
            let model = ContextModel::fit(&samples)?;
            info!(
                samples = samples.len(),
                seed = self.policy.training_seed,
                "context model trained"
            );
            Ok(model)
        });

        outcome
            .as_ref()
            .map_err(|err| PricingError::Model(err.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn afternoon_request(distance_km: f64, vehicle: VehicleCategory) -> TripRequest {
        TripRequest::new(
            distance_km,
            vehicle,
            TrafficLevel::Light,
            TimePeriod::Afternoon,
            false,
        )
    }

    #[test]
    fn context_factor_stays_in_band_for_all_combinations() {
        let estimator = FareEstimator::new();
        let policy = estimator.policy().clone();

        for vehicle in VehicleCategory::ALL {
            for traffic in TrafficLevel::ALL {
                for period in TimePeriod::ALL {
                    for peak in [false, true] {
                        let request = TripRequest::new(7.0, vehicle, traffic, period, peak);
                        let factor = estimator
                            .context_factor(&request)
                            .expect("context model available");
                        assert!(factor >= policy.context_factor_min);
                        assert!(factor <= policy.context_factor_max);
                    }
                }
            }
        }
    }

    #[test]
    fn context_factor_ignores_the_peak_flag() {
        let estimator = FareEstimator::new();

        for vehicle in VehicleCategory::ALL {
            for traffic in TrafficLevel::ALL {
                for period in TimePeriod::ALL {
                    let off_peak = estimator
                        .context_factor(&TripRequest::new(6.0, vehicle, traffic, period, false))
                        .expect("factor");
                    let peak = estimator
                        .context_factor(&TripRequest::new(6.0, vehicle, traffic, period, true))
                        .expect("factor");
                    assert_eq!(off_peak, peak);
                }
            }
        }
    }

    #[test]
    fn context_factor_ignores_trip_distance() {
        let estimator = FareEstimator::new();
        let short = estimator
            .context_factor(&afternoon_request(2.0, VehicleCategory::Medium))
            .expect("factor");
        let long = estimator
            .context_factor(&afternoon_request(28.0, VehicleCategory::Medium))
            .expect("factor");
        assert_eq!(short, long);
    }

    #[test]
    fn fairness_floor_starts_after_free_base_and_caps_out() {
        let estimator = FareEstimator::new();

        assert_eq!(
            estimator.fairness_floor(0.0, VehicleCategory::Medium),
            700.0
        );
        assert_eq!(
            estimator.fairness_floor(2.0, VehicleCategory::Medium),
            700.0
        );
        assert_eq!(
            estimator.fairness_floor(10.0, VehicleCategory::Medium),
            700.0 + 8.0 * 9.0
        );
        // Far enough out the floor saturates at the maximum charge.
        assert_eq!(
            estimator.fairness_floor(1000.0, VehicleCategory::Medium),
            2500.0
        );
    }

    #[test]
    fn degenerate_rate_table_defaults_context_factor_to_one() {
        let zeroed = RateCard {
            per_km_rate: 0.0,
            minimum_charge: 0.0,
            maximum_charge: 0.0,
            labor_cost: 0.0,
            service_fee: 0.0,
            fuel_maintenance_per_km: 0.0,
            per_km_floor: 0.0,
        };
        let rates = RateTable {
            small: zeroed.clone(),
            medium: zeroed.clone(),
            large: zeroed,
        };
        let estimator =
            FareEstimator::with_config(rates, FactorTable::default(), PricingPolicy::default());

        let factor = estimator
            .context_factor(&afternoon_request(5.0, VehicleCategory::Medium))
            .expect("factor");
        assert_eq!(factor, 1.0);
    }

    #[test]
    fn estimate_is_deterministic_after_initialization() {
        let estimator = FareEstimator::new();
        let request = TripRequest::new(
            13.4,
            VehicleCategory::Large,
            TrafficLevel::Heavy,
            TimePeriod::Evening,
            true,
        );
        let first = estimator.estimate(&request).expect("quote");
        let second = estimator.estimate(&request).expect("quote");
        assert_eq!(first, second);
    }

    #[test]
    fn warm_up_is_idempotent() {
        let estimator = FareEstimator::new();
        estimator.warm_up().expect("first warm-up");
        estimator.warm_up().expect("second warm-up");
    }
}
