use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::enums::{PeriodType, Sport};

// Custom serde module for DateTime to ensure RFC3339 string format
pub(crate) mod datetime_format {
    use chrono::{DateTime, Utc};
    use serde::{self, Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(date: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let s = date.to_rfc3339();
        serializer.serialize_str(&s)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse::<DateTime<Utc>>().map_err(serde::de::Error::custom)
    }
}

mod optional_datetime_format {
    use chrono::{DateTime, Utc};
    use serde::{self, Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(date: &Option<DateTime<Utc>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match date {
            Some(date) => serializer.serialize_str(&date.to_rfc3339()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = Option::<String>::deserialize(deserializer)?;
        s.map(|s| s.parse::<DateTime<Utc>>().map_err(serde::de::Error::custom))
            .transpose()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    #[serde(default)]
    pub is_superuser: bool,
    #[serde(with = "datetime_format")]
    pub date_joined: DateTime<Utc>,
}

/// Reference exercise imported from the catalog dataset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Exercise {
    pub id: i64,
    pub exercise_name: String,
    pub main_muscle: String,
    #[serde(default)]
    pub target_muscle: Option<String>,
    #[serde(default)]
    pub synergist_muscle: Option<String>,
    #[serde(default)]
    pub equipment: Option<String>,
    #[serde(default)]
    pub instructions: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
}

/// Compact exercise reference used by search results and profiles
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExerciseSummary {
    pub id: i64,
    pub name: String,
}

/// A scheduled exercise entry for a user on a specific date
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkoutPlan {
    pub id: i64,
    pub user_id: Uuid,
    pub exercise_id: i64,
    pub exercise_name: String,
    pub sets: u32,
    pub reps: u32,
    pub plan_date: NaiveDate,
    pub is_completed: bool,
    #[serde(default, with = "optional_datetime_format")]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(with = "datetime_format")]
    pub date_created: DateTime<Utc>,
}

impl WorkoutPlan {
    /// Mark the plan as done. The completion flag and timestamp always move together.
    pub fn complete(&mut self, at: DateTime<Utc>, description: Option<String>) {
        self.is_completed = true;
        self.completed_at = Some(at);
        self.description = description;
    }

    /// A plan counts as on time when it was completed on or before its planned day.
    pub fn is_on_time(&self) -> bool {
        match (self.is_completed, self.completed_at) {
            (true, Some(at)) => at.date_naive() <= self.plan_date,
            _ => false,
        }
    }
}

/// Body returned after a plan is created
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanCreatedResponse {
    pub id: i64,
    pub name: String,
    pub exercise_name: String,
    pub sets: u32,
    pub reps: u32,
    pub plan_date: NaiveDate,
    pub is_completed: bool,
}

impl From<&WorkoutPlan> for PlanCreatedResponse {
    fn from(plan: &WorkoutPlan) -> Self {
        Self {
            id: plan.id,
            name: plan.exercise_name.clone(),
            exercise_name: plan.exercise_name.clone(),
            sets: plan.sets,
            reps: plan.reps,
            plan_date: plan.plan_date,
            is_completed: plan.is_completed,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    pub user_id: Uuid,
    pub username: String,
    pub display_name: String,
    pub bio: String,
    #[serde(default)]
    pub profile_picture: Option<String>,
    #[serde(default)]
    pub favorite_sports: Vec<Sport>,
    #[serde(default)]
    pub favorite_exercises: Vec<ExerciseSummary>,
    #[serde(with = "datetime_format")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "datetime_format")]
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Thread {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub author_id: Uuid,
    pub author_username: String,
    #[serde(with = "datetime_format")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "datetime_format")]
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub reply_count: i64,
    #[serde(default)]
    pub like_count: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reply {
    pub id: i64,
    pub thread_id: i64,
    pub author_id: Uuid,
    pub author_username: String,
    /// Parent reply for nested replies (None for top-level replies)
    #[serde(default)]
    pub parent_id: Option<i64>,
    pub content: String,
    #[serde(with = "datetime_format")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "datetime_format")]
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub like_count: i64,
}

/// A reply together with every reply nested beneath it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReplyNode {
    #[serde(flatten)]
    pub reply: Reply,
    pub children: Vec<ReplyNode>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThreadDetail {
    pub thread: Thread,
    pub replies: Vec<ReplyNode>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LikeResponse {
    pub liked: bool,
    pub like_count: i64,
}

// Workout log aggregation output

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeriodStats {
    pub total_plans_period: u32,
    pub completed_plans_period: u32,
    pub on_time_plans_period: u32,
    pub completion_percentage: f64,
}

impl PeriodStats {
    /// Summarize the plans of one period. The percentage is on-time over
    /// total, rounded to one decimal, and 0 for an empty period.
    pub fn compute(plans: &[WorkoutPlan]) -> Self {
        let total = plans.len() as u32;
        let completed = plans.iter().filter(|p| p.is_completed).count() as u32;
        let on_time = plans.iter().filter(|p| p.is_on_time()).count() as u32;

        let completion_percentage = if total == 0 {
            0.0
        } else {
            (f64::from(on_time) / f64::from(total) * 1000.0).round() / 10.0
        };

        Self {
            total_plans_period: total,
            completed_plans_period: completed,
            on_time_plans_period: on_time,
            completion_percentage,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthOption {
    pub number: u32,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeekBucket {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AvailablePeriods {
    pub years: Vec<i32>,
    pub months: Vec<MonthOption>,
    pub weeks: Vec<WeekBucket>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DateGroup {
    pub date: NaiveDate,
    pub plans: Vec<WorkoutPlan>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkoutLogResponse {
    pub period_type: PeriodType,
    pub year: i32,
    pub month: u32,
    pub month_name: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(default)]
    pub week_start: Option<NaiveDate>,
    pub plans: Vec<WorkoutPlan>,
    pub grouped_plans: Vec<DateGroup>,
    pub stats: PeriodStats,
    pub available: AvailablePeriods,
}

// Request/Response types for API

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password1: String,
    #[serde(default)]
    pub password2: String,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    pub username: String,
    pub status: bool,
    pub message: String,
    pub session_token: String,
}

/// Raw add-plan body. Fields stay loosely typed so validation can report
/// missing and malformed values separately.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct AddPlanRequest {
    #[serde(default)]
    pub exercise_id: Option<serde_json::Value>,
    #[serde(default)]
    pub sets: Option<serde_json::Value>,
    #[serde(default)]
    pub reps: Option<serde_json::Value>,
    #[serde(default)]
    pub plan_date: Option<serde_json::Value>,
}

/// Validated add-plan input
#[derive(Debug, Clone, PartialEq)]
pub struct NewPlan {
    pub exercise_id: i64,
    pub sets: u32,
    pub reps: u32,
    pub plan_date: NaiveDate,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct CompletePlanRequest {
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ThreadRequest {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct CreateReplyRequest {
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub parent_id: Option<i64>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct UpdateReplyRequest {
    #[serde(default)]
    pub content: String,
}

/// A sport entry as sent by clients: a plain slug or label, or a tag-widget
/// object carrying it under `value`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SportTag {
    Name(String),
    Tagged { value: String },
}

impl SportTag {
    pub fn name(&self) -> &str {
        match self {
            SportTag::Name(name) => name,
            SportTag::Tagged { value } => value,
        }
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct CreateProfileRequest {
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub bio: String,
    #[serde(default)]
    pub profile_picture: Option<String>,
    #[serde(default)]
    pub favorite_sports: Vec<SportTag>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct UpdateProfileRequest {
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub profile_picture: Option<String>,
    /// Replaces the whole list when present
    #[serde(default)]
    pub favorite_sports: Option<Vec<SportTag>>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}
