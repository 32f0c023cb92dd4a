use super::domain::TripRequest;
use super::tables::{FactorTable, RateTable};
use serde::{Deserialize, Serialize};

/// Itemized deterministic costing for one trip. Every intermediate value is
/// kept at full precision so callers can audit the final price.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceBreakdown {
    pub distance_fare: f64,
    pub fuel_maintenance: f64,
    pub labor: f64,
    pub service_fee: f64,
    pub subtotal_before_multiplier: f64,
    pub traffic_factor: f64,
    pub peak_factor: f64,
    pub time_factor: f64,
    pub total_multiplier: f64,
    pub deterministic_total: f64,
}

/// Transparent baseline price: per-km terms, fixed labor and service costs,
/// then the situational multipliers, clipped to the category's charge band.
/// Pure computation with no failure modes.
pub fn compute_breakdown(
    request: &TripRequest,
    rates: &RateTable,
    factors: &FactorTable,
) -> PriceBreakdown {
    let card = rates.card(request.vehicle);

    let distance_fare = request.distance_km * card.per_km_rate;
    let fuel_maintenance = request.distance_km * card.fuel_maintenance_per_km;
    let labor = card.labor_cost;
    let service_fee = card.service_fee;
    let subtotal = distance_fare + fuel_maintenance + labor + service_fee;

    let traffic_factor = factors.traffic_multiplier(request.traffic);
    let peak_factor = factors.peak_multiplier(request.is_peak_hour);
    let time_factor = factors.time_multiplier(request.period);
    let total_multiplier = traffic_factor * peak_factor * time_factor;

    let deterministic_total =
        (subtotal * total_multiplier).clamp(card.minimum_charge, card.maximum_charge);

    PriceBreakdown {
        distance_fare,
        fuel_maintenance,
        labor,
        service_fee,
        subtotal_before_multiplier: subtotal,
        traffic_factor,
        peak_factor,
        time_factor,
        total_multiplier,
        deterministic_total,
    }
}
