//! Heuristic password strength scoring.
//!
//! The weights and thresholds are fixed so scores stay comparable across
//! runs and exports.

use std::fmt;

/// Scores below this count as weak in the security analysis.
pub const WEAK_THRESHOLD: f64 = 3.0;

/// Strength bucket derived from a score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StrengthLabel {
    None,
    Weak,
    Fair,
    Good,
    Strong,
    VeryStrong,
}

impl StrengthLabel {
    fn from_score(score: f64) -> Self {
        if score >= 5.0 {
            StrengthLabel::VeryStrong
        } else if score >= 4.0 {
            StrengthLabel::Strong
        } else if score >= 3.0 {
            StrengthLabel::Good
        } else if score >= 2.0 {
            StrengthLabel::Fair
        } else {
            StrengthLabel::Weak
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            StrengthLabel::None => "None",
            StrengthLabel::Weak => "Weak",
            StrengthLabel::Fair => "Fair",
            StrengthLabel::Good => "Good",
            StrengthLabel::Strong => "Strong",
            StrengthLabel::VeryStrong => "Very Strong",
        }
    }

    /// Color tag for frontends.
    pub fn color_tag(self) -> &'static str {
        match self {
            StrengthLabel::None => "gray",
            StrengthLabel::Weak => "red",
            StrengthLabel::Fair => "orange",
            StrengthLabel::Good => "yellow",
            StrengthLabel::Strong => "green",
            StrengthLabel::VeryStrong => "emerald",
        }
    }
}

impl fmt::Display for StrengthLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of scoring one password.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Strength {
    pub score: f64,
    pub label: StrengthLabel,
}

impl Strength {
    pub fn is_weak(&self) -> bool {
        self.score < WEAK_THRESHOLD
    }
}

/// Score a password.
pub fn password_strength(password: &str) -> Strength {
    if password.is_empty() {
        return Strength {
            score: 0.0,
            label: StrengthLabel::None,
        };
    }

    let length = password.chars().count();
    let mut score = 0.0;

    if length >= 16 {
        score += 2.0;
    } else if length >= 12 {
        score += 1.5;
    } else if length >= 8 {
        score += 1.0;
    }

    let has_upper = password.chars().any(|c| c.is_ascii_uppercase());
    let has_lower = password.chars().any(|c| c.is_ascii_lowercase());
    let has_digit = password.chars().any(|c| c.is_ascii_digit());
    let has_symbol = password.chars().any(|c| !c.is_ascii_alphanumeric());

    let classes = [has_upper, has_lower, has_digit, has_symbol];
    score += classes.iter().filter(|&&present| present).count() as f64;

    if classes.iter().all(|&present| present) && length >= 12 {
        score += 1.0;
    }

    if !has_long_repeat(password) {
        score += 0.5;
    }

    Strength {
        score,
        label: StrengthLabel::from_score(score),
    }
}

/// True if some character occurs three or more times in a row.
fn has_long_repeat(password: &str) -> bool {
    let mut previous = None;
    let mut run = 0;
    for c in password.chars() {
        if Some(c) == previous {
            run += 1;
            if run >= 3 {
                return true;
            }
        } else {
            previous = Some(c);
            run = 1;
        }
    }
    false
}
