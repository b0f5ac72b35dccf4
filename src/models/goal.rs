use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Goal {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub target_date: Option<NaiveDate>,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateGoalRequest {
    #[validate(length(min = 1, max = 200, message = "Title must be 1-200 characters"))]
    pub title: String,

    #[validate(length(max = 2000, message = "Description must be under 2000 characters"))]
    pub description: Option<String>,

    pub target_date: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateGoalRequest {
    pub completed: bool,
}

/// Goal completion figures for the dashboard.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct GoalProgress {
    pub total: u32,
    pub completed: u32,
    pub completion_rate: u8,
    pub overdue: u32,
}

impl GoalProgress {
    pub fn from_goals(goals: &[Goal], today: NaiveDate) -> Self {
        let total = goals.len() as u32;
        let completed = goals.iter().filter(|g| g.completed).count() as u32;
        let overdue = goals
            .iter()
            .filter(|g| !g.completed && g.target_date.is_some_and(|d| d < today))
            .count() as u32;
        let completion_rate = if total > 0 {
            ((completed as f64 / total as f64) * 100.0).round() as u8
        } else {
            0
        };

        Self {
            total,
            completed,
            completion_rate,
            overdue,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn goal(completed: bool, target_date: Option<NaiveDate>) -> Goal {
        Goal {
            id: Uuid::new_v4(),
            user_id: Uuid::nil(),
            title: "Sleep by 11pm".into(),
            description: None,
            target_date,
            completed,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_progress_empty() {
        let today = NaiveDate::from_ymd_opt(2026, 3, 10).unwrap();
        let progress = GoalProgress::from_goals(&[], today);
        assert_eq!(progress.total, 0);
        assert_eq!(progress.completion_rate, 0);
    }

    #[test]
    fn test_progress_counts_overdue_only_for_open_goals() {
        let today = NaiveDate::from_ymd_opt(2026, 3, 10).unwrap();
        let past = NaiveDate::from_ymd_opt(2026, 3, 1);
        let future = NaiveDate::from_ymd_opt(2026, 4, 1);
        let goals = vec![
            goal(true, past),
            goal(false, past),
            goal(false, future),
            goal(false, None),
        ];

        let progress = GoalProgress::from_goals(&goals, today);
        assert_eq!(progress.total, 4);
        assert_eq!(progress.completed, 1);
        assert_eq!(progress.completion_rate, 25);
        assert_eq!(progress.overdue, 1);
    }

    #[test]
    fn test_title_required() {
        let req = CreateGoalRequest {
            title: String::new(),
            description: None,
            target_date: None,
        };
        assert!(req.validate().is_err());
    }
}
