use std::fmt::{Display, Formatter};

use sweeper_core::{AppError, AppResult};

/// Unit of a retention window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetentionUnit {
    /// `h`
    Hours,
    /// `d`
    Days,
    /// `w`
    Weeks,
    /// `m`
    Months,
    /// `y`
    Years,
}

impl RetentionUnit {
    /// Returns the single-letter suffix understood by the server.
    #[must_use]
    pub fn suffix(&self) -> char {
        match self {
            Self::Hours => 'h',
            Self::Days => 'd',
            Self::Weeks => 'w',
            Self::Months => 'm',
            Self::Years => 'y',
        }
    }

    /// Parses a single-letter suffix.
    pub fn from_suffix(value: char) -> AppResult<Self> {
        match value {
            'h' => Ok(Self::Hours),
            'd' => Ok(Self::Days),
            'w' => Ok(Self::Weeks),
            'm' => Ok(Self::Months),
            'y' => Ok(Self::Years),
            _ => Err(AppError::Configuration(format!(
                "unknown retention unit '{value}', expected one of h, d, w, m, y"
            ))),
        }
    }
}

/// Age threshold beyond which executions become deletion candidates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetentionWindow {
    amount: u32,
    unit: RetentionUnit,
}

impl RetentionWindow {
    /// Parses `<integer><unit>`, e.g. `30d` or `12h`.
    pub fn parse(value: &str) -> AppResult<Self> {
        let invalid = || {
            AppError::Configuration(format!(
                "invalid retention window '{value}', expected <integer><h|d|w|m|y>"
            ))
        };

        let mut chars = value.chars();
        let suffix = chars.next_back().ok_or_else(invalid)?;
        let digits = chars.as_str();
        if digits.is_empty() || !digits.bytes().all(|byte| byte.is_ascii_digit()) {
            return Err(invalid());
        }

        let unit = RetentionUnit::from_suffix(suffix).map_err(|_| invalid())?;
        let amount = digits.parse::<u32>().map_err(|_| invalid())?;

        Ok(Self { amount, unit })
    }

    /// Returns the numeric part.
    #[must_use]
    pub fn amount(&self) -> u32 {
        self.amount
    }

    /// Returns the unit.
    #[must_use]
    pub fn unit(&self) -> RetentionUnit {
        self.unit
    }

    /// Renders the value of the `olderFilter` query parameter.
    #[must_use]
    pub fn older_filter(&self) -> String {
        self.to_string()
    }
}

impl Display for RetentionWindow {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}{}", self.amount, self.unit.suffix())
    }
}
