use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct WellnessMetric {
    pub id: Uuid,
    pub user_id: Uuid,
    pub date: NaiveDate,
    pub sleep_hours: f64,
    pub exercise_minutes: i32,
    pub water_glasses: i32,
    pub energy_level: i32,
    pub stress_level: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Partial upsert: fields left out keep their stored value, or the column
/// default on the first save of a day.
#[derive(Debug, Deserialize, Validate)]
pub struct UpsertMetricRequest {
    pub date: Option<NaiveDate>,

    #[validate(range(min = 0.0, max = 12.0, message = "Sleep must be between 0 and 12 hours"))]
    pub sleep_hours: Option<f64>,

    #[validate(range(min = 0, max = 180, message = "Exercise must be between 0 and 180 minutes"))]
    pub exercise_minutes: Option<i32>,

    #[validate(range(min = 0, max = 15, message = "Water must be between 0 and 15 glasses"))]
    pub water_glasses: Option<i32>,

    #[validate(range(min = 1, max = 10, message = "Energy must be between 1 and 10"))]
    pub energy_level: Option<i32>,

    #[validate(range(min = 1, max = 10, message = "Stress must be between 1 and 10"))]
    pub stress_level: Option<i32>,
}

impl UpsertMetricRequest {
    /// Sleep is tracked in half-hour steps.
    pub fn validate_sleep_step(&self) -> Result<(), String> {
        match self.sleep_hours {
            Some(h) if (h * 2.0).fract() != 0.0 => {
                Err("Sleep hours must be a multiple of 0.5".into())
            }
            _ => Ok(()),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct MetricsQuery {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> UpsertMetricRequest {
        UpsertMetricRequest {
            date: None,
            sleep_hours: Some(7.5),
            exercise_minutes: Some(45),
            water_glasses: Some(8),
            energy_level: Some(6),
            stress_level: Some(3),
        }
    }

    #[test]
    fn test_valid_request_passes() {
        let req = request();
        assert!(req.validate().is_ok());
        assert!(req.validate_sleep_step().is_ok());
    }

    #[test]
    fn test_energy_and_stress_use_ten_point_scale() {
        let mut req = request();
        req.energy_level = Some(10);
        req.stress_level = Some(1);
        assert!(req.validate().is_ok());

        req.stress_level = Some(11);
        assert!(req.validate().is_err());

        req.stress_level = Some(0);
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_sleep_must_be_half_hour_steps() {
        let mut req = request();
        req.sleep_hours = Some(7.25);
        assert!(req.validate_sleep_step().is_err());

        req.sleep_hours = None;
        assert!(req.validate_sleep_step().is_ok());
    }

    #[test]
    fn test_exercise_upper_bound() {
        let mut req = request();
        req.exercise_minutes = Some(181);
        assert!(req.validate().is_err());
    }
}
