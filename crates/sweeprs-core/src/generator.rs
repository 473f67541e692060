//! Random password generation.

use rand::Rng;
use serde::{Deserialize, Serialize};

pub const MIN_LENGTH: usize = 8;
pub const MAX_LENGTH: usize = 32;

const UPPERCASE: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZ";
const LOWERCASE: &str = "abcdefghijklmnopqrstuvwxyz";
const DIGITS: &str = "0123456789";
const SYMBOLS: &str = "!@#$%^&*()_+-=[]{}|;:,.<>?";

/// Which character sets to draw from and how long the password is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorOptions {
    pub length: usize,
    pub uppercase: bool,
    pub lowercase: bool,
    pub digits: bool,
    pub symbols: bool,
}

impl Default for GeneratorOptions {
    fn default() -> Self {
        Self {
            length: 16,
            uppercase: true,
            lowercase: true,
            digits: true,
            symbols: true,
        }
    }
}

impl GeneratorOptions {
    /// Length limited to `MIN_LENGTH..=MAX_LENGTH`.
    pub fn clamped_length(&self) -> usize {
        self.length.clamp(MIN_LENGTH, MAX_LENGTH)
    }

    pub fn enabled_sets(&self) -> usize {
        [self.uppercase, self.lowercase, self.digits, self.symbols]
            .iter()
            .filter(|&&on| on)
            .count()
    }

    fn charset(&self) -> Vec<char> {
        let sets = [
            (self.uppercase, UPPERCASE),
            (self.lowercase, LOWERCASE),
            (self.digits, DIGITS),
            (self.symbols, SYMBOLS),
        ];
        sets.iter()
            .filter(|(on, _)| *on)
            .flat_map(|(_, chars)| chars.chars())
            .collect()
    }

    pub fn lengthen(&mut self) {
        self.length = (self.clamped_length() + 1).min(MAX_LENGTH);
    }

    pub fn shorten(&mut self) {
        self.length = self.clamped_length().saturating_sub(1).max(MIN_LENGTH);
    }
}

/// Draw a password uniformly from the enabled character sets.
///
/// Returns `None` when every set is disabled.
pub fn generate<R: Rng + ?Sized>(options: &GeneratorOptions, rng: &mut R) -> Option<String> {
    let charset = options.charset();
    if charset.is_empty() {
        return None;
    }

    let password: String = (0..options.clamped_length())
        .map(|_| charset[rng.gen_range(0..charset.len())])
        .collect();
    Some(password)
}

/// [`generate`] with the thread-local RNG.
pub fn generate_password(options: &GeneratorOptions) -> Option<String> {
    generate(options, &mut rand::thread_rng())
}

/// Strength meter for a set of generator options.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OptionsStrength {
    /// 0 to 100.
    pub percent: f64,
    pub label: &'static str,
}

/// Rate generator options: up to 40 points for length, 15 per character set.
pub fn options_strength(options: &GeneratorOptions) -> OptionsStrength {
    let length_score = (options.clamped_length() - MIN_LENGTH) as f64 / 24.0 * 40.0;
    let type_score = options.enabled_sets() as f64 * 15.0;
    let percent = (length_score + type_score).min(100.0);

    let label = if percent >= 80.0 {
        "Very Strong"
    } else if percent >= 60.0 {
        "Strong"
    } else if percent >= 40.0 {
        "Good"
    } else {
        "Weak"
    };

    OptionsStrength { percent, label }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn generates_requested_length_from_enabled_sets() {
        let mut rng = StdRng::seed_from_u64(7);
        let options = GeneratorOptions {
            length: 20,
            uppercase: false,
            lowercase: true,
            digits: true,
            symbols: false,
        };

        let password = generate(&options, &mut rng).unwrap();
        assert_eq!(password.chars().count(), 20);
        assert!(password
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit()));
    }

    #[test]
    fn no_enabled_set_yields_nothing() {
        let options = GeneratorOptions {
            uppercase: false,
            lowercase: false,
            digits: false,
            symbols: false,
            ..GeneratorOptions::default()
        };
        assert_eq!(generate_password(&options), None);
    }

    #[test]
    fn length_is_clamped() {
        let mut rng = StdRng::seed_from_u64(1);
        let short = GeneratorOptions { length: 2, ..GeneratorOptions::default() };
        let long = GeneratorOptions { length: 500, ..GeneratorOptions::default() };
        assert_eq!(generate(&short, &mut rng).unwrap().len(), MIN_LENGTH);
        assert_eq!(generate(&long, &mut rng).unwrap().len(), MAX_LENGTH);
    }

    #[test]
    fn lengthen_and_shorten_stay_in_range() {
        let mut options = GeneratorOptions { length: MAX_LENGTH, ..GeneratorOptions::default() };
        options.lengthen();
        assert_eq!(options.length, MAX_LENGTH);
        options.length = MIN_LENGTH;
        options.shorten();
        assert_eq!(options.length, MIN_LENGTH);
        options.lengthen();
        assert_eq!(options.length, MIN_LENGTH + 1);
    }

    #[test]
    fn meter_matches_option_weights() {
        let default = options_strength(&GeneratorOptions::default());
        assert!((default.percent - (8.0 / 24.0 * 40.0 + 60.0)).abs() < 1e-9);
        assert_eq!(default.label, "Strong");

        let max = options_strength(&GeneratorOptions { length: 32, ..GeneratorOptions::default() });
        assert_eq!(max.percent, 100.0);
        assert_eq!(max.label, "Very Strong");

        let minimal = options_strength(&GeneratorOptions {
            length: 8,
            uppercase: false,
            lowercase: true,
            digits: false,
            symbols: false,
        });
        assert_eq!(minimal.percent, 15.0);
        assert_eq!(minimal.label, "Weak");
    }
}
