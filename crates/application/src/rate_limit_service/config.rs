use fieldtrack_core::{AppError, AppResult};

/// Budget of one rate-limited endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimitRule {
    /// Endpoint category (e.g. "client_dashboard", "issue_report").
    pub category: String,
    /// Maximum attempts allowed per window.
    pub max_attempts: i32,
    /// Window length in seconds.
    pub window_seconds: i64,
}

impl RateLimitRule {
    /// Creates a new rate limit rule.
    #[must_use]
    pub fn new(category: impl Into<String>, max_attempts: i32, window_seconds: i64) -> Self {
        Self {
            category: category.into(),
            max_attempts,
            window_seconds,
        }
    }

    /// Parses a `"{max_attempts}/{window_seconds}"` budget.
    pub fn parse(category: impl Into<String>, budget: &str) -> AppResult<Self> {
        let category = category.into();
        let invalid = || {
            AppError::Validation(format!(
                "rate limit for '{category}' must look like '<max>/<seconds>', got '{budget}'"
            ))
        };

        let (max_attempts, window_seconds) = budget.trim().split_once('/').ok_or_else(invalid)?;
        let max_attempts = max_attempts
            .trim()
            .parse::<i32>()
            .map_err(|_| invalid())?;
        let window_seconds = window_seconds
            .trim()
            .parse::<i64>()
            .map_err(|_| invalid())?;

        if max_attempts <= 0 || window_seconds <= 0 {
            return Err(invalid());
        }

        Ok(Self::new(category, max_attempts, window_seconds))
    }

    /// Returns the storage key for one source.
    #[must_use]
    pub fn key_for(&self, source: &str) -> String {
        format!("{}:{source}", self.category)
    }
}
