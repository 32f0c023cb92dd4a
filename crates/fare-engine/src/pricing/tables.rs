use super::domain::{TimePeriod, TrafficLevel, VehicleCategory};
use serde::{Deserialize, Serialize};

/// Per-category rate constants. Calibrated against Kathmandu market prices;
/// the medium card is the reference point the other two scale around.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateCard {
    pub per_km_rate: f64,
    pub minimum_charge: f64,
    pub maximum_charge: f64,
    pub labor_cost: f64,
    pub service_fee: f64,
    pub fuel_maintenance_per_km: f64,
    /// Floor rate used by the fairness floor; deliberately below
    /// `per_km_rate` so the floor only catches underpriced long trips.
    pub per_km_floor: f64,
}

/// Immutable rate configuration, one card per vehicle category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateTable {
    pub small: RateCard,
    pub medium: RateCard,
    pub large: RateCard,
}

impl RateTable {
    pub fn card(&self, category: VehicleCategory) -> &RateCard {
        match category {
            VehicleCategory::Small => &self.small,
            VehicleCategory::Medium => &self.medium,
            VehicleCategory::Large => &self.large,
        }
    }
}

impl Default for RateTable {
    fn default() -> Self {
        Self {
            small: RateCard {
                per_km_rate: 18.0,
                minimum_charge: 400.0,
                maximum_charge: 1500.0,
                labor_cost: 120.0,
                service_fee: 80.0,
                fuel_maintenance_per_km: 8.0,
                per_km_floor: 6.0,
            },
            medium: RateCard {
                per_km_rate: 25.0,
                minimum_charge: 700.0,
                maximum_charge: 2500.0,
                labor_cost: 180.0,
                service_fee: 120.0,
                fuel_maintenance_per_km: 12.0,
                per_km_floor: 9.0,
            },
            large: RateCard {
                per_km_rate: 35.0,
                minimum_charge: 1200.0,
                maximum_charge: 4000.0,
                labor_cost: 350.0,
                service_fee: 240.0,
                fuel_maintenance_per_km: 22.0,
                per_km_floor: 12.0,
            },
        }
    }
}

/// Multiplicative situational factors applied on top of the subtotal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FactorTable {
    pub traffic_light: f64,
    pub traffic_medium: f64,
    pub traffic_heavy: f64,
    pub traffic_very_heavy: f64,
    pub peak_multiplier: f64,
    pub night_multiplier: f64,
}

impl FactorTable {
    pub fn traffic_multiplier(&self, level: TrafficLevel) -> f64 {
        match level {
            TrafficLevel::Light => self.traffic_light,
            TrafficLevel::Medium => self.traffic_medium,
            TrafficLevel::Heavy => self.traffic_heavy,
            TrafficLevel::VeryHeavy => self.traffic_very_heavy,
        }
    }

    pub fn peak_multiplier(&self, is_peak_hour: bool) -> f64 {
        if is_peak_hour {
            self.peak_multiplier
        } else {
            1.0
        }
    }

    /// Night trips carry a small discount; every other period is neutral.
    pub fn time_multiplier(&self, period: TimePeriod) -> f64 {
        match period {
            TimePeriod::Night => self.night_multiplier,
            _ => 1.0,
        }
    }
}

impl Default for FactorTable {
    fn default() -> Self {
        Self {
            traffic_light: 1.0,
            traffic_medium: 1.1,
            traffic_heavy: 1.3,
            traffic_very_heavy: 1.5,
            peak_multiplier: 1.15,
            night_multiplier: 0.95,
        }
    }
}

/// Blending policy for the learned context adjustment. These are hand-tuned
/// knobs; changing them recalibrates prices, so the defaults must stay
/// behaviorally compatible.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricingPolicy {
    /// Distance the context model is queried at, never the trip distance.
    pub reference_distance_km: f64,
    pub context_factor_min: f64,
    pub context_factor_max: f64,
    /// Distance below which the fairness floor stays at the minimum charge.
    pub floor_free_km: f64,
    pub training_samples: usize,
    pub training_seed: u64,
}

impl Default for PricingPolicy {
    fn default() -> Self {
        Self {
            reference_distance_km: 5.0,
            context_factor_min: 0.98,
            context_factor_max: 1.08,
            floor_free_km: 2.0,
            training_samples: 500,
            training_seed: 42,
        }
    }
}
