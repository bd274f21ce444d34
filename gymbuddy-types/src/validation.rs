//! Field-level checks for incoming request bodies.
//!
//! Each request struct exposes a `validate` method returning either the
//! cleaned input or a [`ValidationError`] whose message is sent back to the
//! client unchanged.

use chrono::NaiveDate;
use serde_json::Value;
use thiserror::Error;

use crate::enums::Sport;
use crate::models::{
    AddPlanRequest, CreateProfileRequest, CreateReplyRequest, NewPlan, Profile, RegisterRequest,
    SportTag, ThreadRequest, UpdateProfileRequest, UpdateReplyRequest,
};

pub const USERNAME_MAX_LEN: usize = 150;
pub const DISPLAY_NAME_MAX_LEN: usize = 40;
pub const THREAD_TITLE_MAX_LEN: usize = 255;
pub const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Missing required fields.")]
    MissingFields,
    #[error("Invalid exercise id.")]
    InvalidExerciseId,
    #[error("Invalid data for sets or reps.")]
    InvalidNumber,
    #[error("Invalid data: Sets and reps must be positive numbers.")]
    NonPositive,
    #[error("Invalid date format. Use YYYY-MM-DD.")]
    InvalidDate,
    #[error("Username and password cannot be empty.")]
    EmptyCredentials,
    #[error("Passwords do not match.")]
    PasswordMismatch,
    #[error("Username may contain only letters, digits and @/./+/-/_ characters.")]
    InvalidUsername,
    #[error("{0} cannot be empty.")]
    Empty(&'static str),
    #[error("{field} must be at most {max} characters.")]
    TooLong { field: &'static str, max: usize },
    #[error("Enter a valid URL.")]
    InvalidUrl,
    #[error("Unknown sport: {0}.")]
    UnknownSport(String),
}

/// Parse a `YYYY-MM-DD` date
pub fn parse_date(s: &str) -> Result<NaiveDate, ValidationError> {
    NaiveDate::parse_from_str(s.trim(), DATE_FORMAT).map_err(|_| ValidationError::InvalidDate)
}

/// Accept integers and integer strings, matching what HTML forms and JSON
/// clients both send.
fn integer_value(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn present(value: &Option<Value>) -> Option<&Value> {
    match value {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) if s.trim().is_empty() => None,
        Some(v) => Some(v),
    }
}

fn positive_count(value: &Value) -> Result<u32, ValidationError> {
    let n = integer_value(value).ok_or(ValidationError::InvalidNumber)?;
    if n <= 0 {
        return Err(ValidationError::NonPositive);
    }
    u32::try_from(n).map_err(|_| ValidationError::InvalidNumber)
}

impl AddPlanRequest {
    pub fn validate(&self) -> Result<NewPlan, ValidationError> {
        let (Some(exercise_id), Some(sets), Some(reps), Some(plan_date)) = (
            present(&self.exercise_id),
            present(&self.sets),
            present(&self.reps),
            present(&self.plan_date),
        ) else {
            return Err(ValidationError::MissingFields);
        };

        let exercise_id = integer_value(exercise_id).ok_or(ValidationError::InvalidExerciseId)?;
        let sets = positive_count(sets)?;
        let reps = positive_count(reps)?;
        let plan_date = plan_date
            .as_str()
            .ok_or(ValidationError::InvalidDate)
            .and_then(parse_date)?;

        Ok(NewPlan {
            exercise_id,
            sets,
            reps,
            plan_date,
        })
    }
}

/// Usernames follow the classic `[\w.@+-]` rule
pub fn is_valid_username(username: &str) -> bool {
    !username.is_empty()
        && username.chars().count() <= USERNAME_MAX_LEN
        && username
            .chars()
            .all(|c| c.is_alphanumeric() || matches!(c, '@' | '.' | '+' | '-' | '_'))
}

impl RegisterRequest {
    /// Returns the trimmed username and the password as entered
    pub fn validate(&self) -> Result<(String, String), ValidationError> {
        let username = self.username.trim();
        let password1 = self.password1.as_str();
        let password2 = self.password2.as_str();

        if username.is_empty() || password1.trim().is_empty() {
            return Err(ValidationError::EmptyCredentials);
        }
        if password1 != password2 {
            return Err(ValidationError::PasswordMismatch);
        }
        if !is_valid_username(username) {
            return Err(ValidationError::InvalidUsername);
        }

        Ok((username.to_string(), password1.to_string()))
    }
}

fn required_text(
    value: &str,
    field: &'static str,
    max: Option<usize>,
) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::Empty(field));
    }
    if let Some(max) = max {
        if trimmed.chars().count() > max {
            return Err(ValidationError::TooLong { field, max });
        }
    }
    Ok(trimmed.to_string())
}

impl ThreadRequest {
    /// Returns the trimmed `(title, content)` pair
    pub fn validate(&self) -> Result<(String, String), ValidationError> {
        let title = required_text(&self.title, "Title", Some(THREAD_TITLE_MAX_LEN))?;
        let content = required_text(&self.content, "Content", None)?;
        Ok((title, content))
    }
}

impl CreateReplyRequest {
    pub fn validate(&self) -> Result<String, ValidationError> {
        required_text(&self.content, "Content", None)
    }
}

impl UpdateReplyRequest {
    pub fn validate(&self) -> Result<String, ValidationError> {
        required_text(&self.content, "Content", None)
    }
}

/// Empty input clears the picture; anything else must be an http(s) URL
fn validate_picture(picture: Option<&str>) -> Result<Option<String>, ValidationError> {
    match picture.map(str::trim) {
        None | Some("") => Ok(None),
        Some(raw) => {
            let parsed = url::Url::parse(raw).map_err(|_| ValidationError::InvalidUrl)?;
            if !matches!(parsed.scheme(), "http" | "https") {
                return Err(ValidationError::InvalidUrl);
            }
            Ok(Some(raw.to_string()))
        }
    }
}

/// Blank tags are dropped and repeats collapse onto their first position
fn validate_sports(tags: &[SportTag]) -> Result<Vec<Sport>, ValidationError> {
    let mut sports = Vec::new();
    for tag in tags {
        let name = tag.name().trim();
        if name.is_empty() {
            continue;
        }
        let sport = Sport::parse(name).ok_or_else(|| ValidationError::UnknownSport(name.to_string()))?;
        if !sports.contains(&sport) {
            sports.push(sport);
        }
    }
    Ok(sports)
}

/// Cleaned profile fields shared by create and update
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileFields {
    pub display_name: String,
    pub bio: String,
    pub profile_picture: Option<String>,
    pub favorite_sports: Vec<Sport>,
}

impl From<&Profile> for ProfileFields {
    fn from(profile: &Profile) -> Self {
        ProfileFields {
            display_name: profile.display_name.clone(),
            bio: profile.bio.clone(),
            profile_picture: profile.profile_picture.clone(),
            favorite_sports: profile.favorite_sports.clone(),
        }
    }
}

impl CreateProfileRequest {
    pub fn validate(&self) -> Result<ProfileFields, ValidationError> {
        Ok(ProfileFields {
            display_name: required_text(
                &self.display_name,
                "Display name",
                Some(DISPLAY_NAME_MAX_LEN),
            )?,
            bio: self.bio.trim().to_string(),
            profile_picture: validate_picture(self.profile_picture.as_deref())?,
            favorite_sports: validate_sports(&self.favorite_sports)?,
        })
    }
}

impl UpdateProfileRequest {
    /// Merge the supplied fields over the current values
    pub fn apply_to(&self, current: &ProfileFields) -> Result<ProfileFields, ValidationError> {
        let display_name = match &self.display_name {
            Some(name) => required_text(name, "Display name", Some(DISPLAY_NAME_MAX_LEN))?,
            None => current.display_name.clone(),
        };
        let bio = match &self.bio {
            Some(bio) => bio.trim().to_string(),
            None => current.bio.clone(),
        };
        let profile_picture = match &self.profile_picture {
            Some(picture) => validate_picture(Some(picture))?,
            None => current.profile_picture.clone(),
        };
        let favorite_sports = match &self.favorite_sports {
            Some(tags) => validate_sports(tags)?,
            None => current.favorite_sports.clone(),
        };

        Ok(ProfileFields {
            display_name,
            bio,
            profile_picture,
            favorite_sports,
        })
    }
}
