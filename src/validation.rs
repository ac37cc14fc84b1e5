use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_TITLE_MAX: usize = 120;
pub const DEFAULT_BODY_MAX: usize = 5000;

/// Length bounds applied to trimmed note fields, counted in characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Limits {
    pub title_max: usize,
    pub body_max: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            title_max: DEFAULT_TITLE_MAX,
            body_max: DEFAULT_BODY_MAX,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Title is required.")]
    TitleRequired,
    #[error("Body is required.")]
    BodyRequired,
    #[error("Title too long (>{max}).")]
    TitleTooLong { max: usize },
    #[error("Body too long (>{max}).")]
    BodyTooLong { max: usize },
}

/// Checks a candidate title/body pair, reporting the first violated rule.
pub fn validate(title: &str, body: &str, limits: &Limits) -> Result<(), ValidationError> {
    let title = title.trim();
    let body = body.trim();
    if title.is_empty() {
        return Err(ValidationError::TitleRequired);
    }
    if body.is_empty() {
        return Err(ValidationError::BodyRequired);
    }
    if title.chars().count() > limits.title_max {
        return Err(ValidationError::TitleTooLong {
            max: limits.title_max,
        });
    }
    if body.chars().count() > limits.body_max {
        return Err(ValidationError::BodyTooLong {
            max: limits.body_max,
        });
    }
    Ok(())
}
