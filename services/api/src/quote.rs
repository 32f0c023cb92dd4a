use chrono::Local;
use clap::Args;
use fare_engine::config::AppConfig;
use fare_engine::error::AppError;
use fare_engine::pricing::{
    build_comparison, is_peak_clock, CompareRequest, FareEstimator, FareQuote, TripRequest,
};

#[derive(Args, Debug)]
pub(crate) struct EstimateArgs {
    /// Trip distance in kilometers
    #[arg(long)]
    pub(crate) distance_km: f64,
    /// Vehicle category (small_vehicle, medium_vehicle, large_vehicle)
    #[arg(long, default_value = "medium_vehicle")]
    pub(crate) vehicle: String,
    /// Traffic level (light, medium, heavy, very_heavy)
    #[arg(long, default_value = "medium")]
    pub(crate) traffic: String,
    /// Departure time as "HH:MM" or a period name. Defaults to now.
    #[arg(long)]
    pub(crate) time: Option<String>,
    /// Force the peak-hour surcharge on or off instead of inferring it
    #[arg(long)]
    pub(crate) peak: Option<bool>,
}

#[derive(Args, Debug)]
pub(crate) struct CompareArgs {
    /// Restrict the table to one vehicle category
    #[arg(long)]
    pub(crate) vehicle: Option<String>,
    /// Traffic level (light, medium, heavy, very_heavy)
    #[arg(long, default_value = "medium")]
    pub(crate) traffic: String,
    /// Departure time as "HH:MM" or a period name. Defaults to now.
    #[arg(long)]
    pub(crate) time: Option<String>,
    /// Force the peak-hour surcharge on or off instead of inferring it
    #[arg(long)]
    pub(crate) peak: Option<bool>,
    /// Comma-separated distance ladder in kilometers
    #[arg(long, value_delimiter = ',')]
    pub(crate) distances: Vec<f64>,
}

pub(crate) fn run_estimate(args: EstimateArgs) -> Result<(), AppError> {
    let estimator = load_estimator()?;

    let time = args
        .time
        .unwrap_or_else(|| Local::now().format("%H:%M").to_string());
    let peak = args.peak.unwrap_or_else(|| is_peak_clock(&time));
    let request = TripRequest::from_raw(args.distance_km, &args.vehicle, &args.traffic, &time, peak);

    let quote = estimator.estimate(&request)?;
    render_quote(&request, &quote);
    Ok(())
}

pub(crate) fn run_compare(args: CompareArgs) -> Result<(), AppError> {
    let estimator = load_estimator()?;

    let comparison = build_comparison(
        &estimator,
        CompareRequest {
            vehicle_category: args.vehicle,
            traffic_level: Some(args.traffic),
            time_of_day: args.time,
            is_peak_hour: args.peak,
            distances_km: if args.distances.is_empty() {
                None
            } else {
                Some(args.distances)
            },
        },
    )?;

    println!(
        "Fare comparison ({} traffic, {}, peak: {})",
        comparison.traffic_level.label(),
        comparison.time_period.label(),
        if comparison.is_peak_hour { "yes" } else { "no" }
    );
    for row in &comparison.rows {
        println!(
            "  {:<15} {:>6.1} km  Rs {:>5}",
            row.vehicle_category.label(),
            row.distance_km,
            row.final_price
        );
    }
    Ok(())
}

fn load_estimator() -> Result<FareEstimator, AppError> {
    let config = AppConfig::load()?;
    let estimator = FareEstimator::with_policy(config.pricing);
    estimator.warm_up()?;
    Ok(estimator)
}

fn render_quote(request: &TripRequest, quote: &FareQuote) {
    let breakdown = &quote.breakdown;
    println!("Fare quote");
    println!(
        "  {} | {} traffic | {} | peak: {}",
        request.vehicle.label(),
        request.traffic.label(),
        request.period.label(),
        if request.is_peak_hour { "yes" } else { "no" }
    );
    println!("  distance            {:>9.1} km", request.distance_km);
    println!("  distance fare       {:>9.2}", breakdown.distance_fare);
    println!("  fuel & maintenance  {:>9.2}", breakdown.fuel_maintenance);
    println!("  labor               {:>9.2}", breakdown.labor);
    println!("  service fee         {:>9.2}", breakdown.service_fee);
    println!(
        "  subtotal            {:>9.2}",
        breakdown.subtotal_before_multiplier
    );
    println!(
        "  multiplier          {:>9.3} (traffic {:.2} x peak {:.2} x time {:.2})",
        breakdown.total_multiplier,
        breakdown.traffic_factor,
        breakdown.peak_factor,
        breakdown.time_factor
    );
    println!(
        "  deterministic total {:>9.2}",
        breakdown.deterministic_total
    );
    println!("  context factor      {:>9.3}", quote.context_factor);
    println!("  fairness floor      {:>9.2}", quote.fair_floor);
    println!("  final price         Rs {:>6}", quote.final_price);
}
