use super::deterministic::compute_breakdown;
use super::domain::{TimePeriod, TrafficLevel, TripRequest, VehicleCategory};
use super::tables::{FactorTable, PricingPolicy, RateTable};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// One synthetic labelled trip.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct TrainingSample {
    pub(crate) request: TripRequest,
    pub(crate) price: f64,
}

/// Generate the synthetic training corpus the context model is fit on.
///
/// The corpus exists only to give the model something consistent with the
/// deterministic model's shape; labels are the deterministic subtotal and
/// multipliers with independent ±10% noise, clipped to the category band.
/// A fixed seed keeps training reproducible across processes.
pub(crate) fn generate(
    rates: &RateTable,
    factors: &FactorTable,
    policy: &PricingPolicy,
) -> Vec<TrainingSample> {
    let mut rng = StdRng::seed_from_u64(policy.training_seed);

    (0..policy.training_samples)
        .map(|_| sample_trip(&mut rng, rates, factors))
        .collect()
}

fn sample_trip(rng: &mut StdRng, rates: &RateTable, factors: &FactorTable) -> TrainingSample {
    // Fleet skew observed in bookings: most trips use small vehicles.
    let vehicle = match rng.gen::<f64>() {
        roll if roll < 0.60 => VehicleCategory::Small,
        roll if roll < 0.90 => VehicleCategory::Medium,
        _ => VehicleCategory::Large,
    };

    let distance_km = rng.gen_range(1.5..=18.5);

    let period = match rng.gen::<f64>() {
        roll if roll < 0.30 => TimePeriod::Morning,
        roll if roll < 0.60 => TimePeriod::Afternoon,
        roll if roll < 0.85 => TimePeriod::Evening,
        _ => TimePeriod::Night,
    };
    let is_peak_hour = matches!(period, TimePeriod::Morning | TimePeriod::Evening);

    let traffic = if is_peak_hour {
        match rng.gen::<f64>() {
            roll if roll < 0.20 => TrafficLevel::Medium,
            roll if roll < 0.70 => TrafficLevel::Heavy,
            _ => TrafficLevel::VeryHeavy,
        }
    } else if period == TimePeriod::Night {
        match rng.gen::<f64>() {
            roll if roll < 0.70 => TrafficLevel::Light,
            _ => TrafficLevel::Medium,
        }
    } else {
        match rng.gen::<f64>() {
            roll if roll < 0.30 => TrafficLevel::Light,
            roll if roll < 0.80 => TrafficLevel::Medium,
            _ => TrafficLevel::Heavy,
        }
    };

    let request = TripRequest::new(distance_km, vehicle, traffic, period, is_peak_hour);
    let breakdown = compute_breakdown(&request, rates, factors);
    let card = rates.card(vehicle);

    let noise = rng.gen_range(0.9..=1.1);
    let price = (breakdown.subtotal_before_multiplier * breakdown.total_multiplier * noise)
        .clamp(card.minimum_charge, card.maximum_charge);

    TrainingSample { request, price }
}
