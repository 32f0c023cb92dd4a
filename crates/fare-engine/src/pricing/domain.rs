use chrono::{NaiveTime, Timelike};
use serde::{Deserialize, Serialize};

/// Vehicle size classes offered by the marketplace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VehicleCategory {
    Small,
    Medium,
    Large,
}

impl VehicleCategory {
    pub const ALL: [VehicleCategory; 3] = [Self::Small, Self::Medium, Self::Large];

    /// Resolve a booking-form value. Unknown strings fall back to `Medium`
    /// rather than erroring; an odd form value should never block a quote.
    pub fn normalize(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "small_vehicle" | "small" => Self::Small,
            "large_vehicle" | "large" => Self::Large,
            _ => Self::Medium,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Small => "small_vehicle",
            Self::Medium => "medium_vehicle",
            Self::Large => "large_vehicle",
        }
    }
}

/// Congestion bands used by the runtime multiplier table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrafficLevel {
    Light,
    Medium,
    Heavy,
    VeryHeavy,
}

impl TrafficLevel {
    pub const ALL: [TrafficLevel; 4] = [Self::Light, Self::Medium, Self::Heavy, Self::VeryHeavy];

    /// Resolve a traffic string; unknown values fall back to `Medium`.
    pub fn normalize(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "light" => Self::Light,
            "heavy" => Self::Heavy,
            "very_heavy" | "very heavy" => Self::VeryHeavy,
            _ => Self::Medium,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Medium => "medium",
            Self::Heavy => "heavy",
            Self::VeryHeavy => "very_heavy",
        }
    }
}

/// Coarse time-of-day bands used for the time multiplier and the training
/// corpus distributions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimePeriod {
    Morning,
    Afternoon,
    Evening,
    Night,
}

impl TimePeriod {
    pub const ALL: [TimePeriod; 4] = [
        Self::Morning,
        Self::Afternoon,
        Self::Evening,
        Self::Night,
    ];

    /// Resolve either a period name or an "HH:MM" clock string. Anything
    /// unrecognized falls back to `Afternoon`.
    pub fn normalize(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.contains(':') {
            return Self::from_clock(trimmed);
        }
        match trimmed.to_ascii_lowercase().as_str() {
            "morning" => Self::Morning,
            "evening" => Self::Evening,
            "night" => Self::Night,
            _ => Self::Afternoon,
        }
    }

    /// Kathmandu time bands: 05:00-11:59 morning, 12:00-16:59 afternoon,
    /// 17:00-19:59 evening, otherwise night.
    pub fn from_clock(raw: &str) -> Self {
        let Some(time) = parse_clock(raw) else {
            return Self::Afternoon;
        };
        match time.hour() {
            5..=11 => Self::Morning,
            12..=16 => Self::Afternoon,
            17..=19 => Self::Evening,
            _ => Self::Night,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Morning => "Morning",
            Self::Afternoon => "Afternoon",
            Self::Evening => "Evening",
            Self::Night => "Night",
        }
    }
}

/// Commute windows carrying the peak surcharge: 06:00-09:00 and 17:00-20:00
/// inclusive. Callers that only have a clock string use this to fill the
/// peak flag; unparseable input is treated as off-peak.
pub fn is_peak_clock(raw: &str) -> bool {
    let Some(time) = parse_clock(raw) else {
        return false;
    };
    let minutes = time.hour() * 60 + time.minute();
    (360..=540).contains(&minutes) || (1020..=1200).contains(&minutes)
}

fn parse_clock(raw: &str) -> Option<NaiveTime> {
    let trimmed = raw.trim();
    NaiveTime::parse_from_str(trimmed, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(trimmed, "%H:%M:%S"))
        .ok()
}

/// Normalized trip attributes consumed by the estimator. Construction is
/// total: every raw input resolves to some valid request.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TripRequest {
    pub distance_km: f64,
    pub vehicle: VehicleCategory,
    pub traffic: TrafficLevel,
    pub period: TimePeriod,
    pub is_peak_hour: bool,
}

impl TripRequest {
    pub fn new(
        distance_km: f64,
        vehicle: VehicleCategory,
        traffic: TrafficLevel,
        period: TimePeriod,
        is_peak_hour: bool,
    ) -> Self {
        Self {
            distance_km: coerce_distance(distance_km),
            vehicle,
            traffic,
            period,
            is_peak_hour,
        }
    }

    /// Build a request from wire-format strings, applying the documented
    /// default-on-unknown mappings.
    pub fn from_raw(
        distance_km: f64,
        vehicle: &str,
        traffic: &str,
        time_of_day: &str,
        is_peak_hour: bool,
    ) -> Self {
        Self::new(
            distance_km,
            VehicleCategory::normalize(vehicle),
            TrafficLevel::normalize(traffic),
            TimePeriod::normalize(time_of_day),
            is_peak_hour,
        )
    }

}

// Negative and non-finite distances are coerced to zero; the estimator must
// stay defined for all inputs.
fn coerce_distance(distance_km: f64) -> f64 {
    if distance_km.is_finite() && distance_km > 0.0 {
        distance_km
    } else {
        0.0
    }
}
