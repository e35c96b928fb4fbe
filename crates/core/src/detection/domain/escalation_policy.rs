use std::fmt;
use std::str::FromStr;

use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum PolicyError {
    #[error("escalation policy needs at least one upsample level")]
    Empty,
    #[error("unknown escalation preset '{0}' (expected 'normal' or 'high')")]
    UnknownPreset(String),
}

/// Ordered upsample levels tried by the escalator until a face is found.
///
/// Presets cover the common cases; any non-empty list is accepted so callers
/// can trade speed for sensitivity explicitly.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EscalationPolicy {
    levels: Vec<u32>,
}

impl EscalationPolicy {
    pub fn new(levels: Vec<u32>) -> Result<Self, PolicyError> {
        if levels.is_empty() {
            return Err(PolicyError::Empty);
        }
        Ok(Self { levels })
    }

    /// Fast preset: levels 0 through 3.
    pub fn normal() -> Self {
        Self {
            levels: vec![0, 1, 2, 3],
        }
    }

    /// Thorough preset: levels 0 through 4.
    pub fn high() -> Self {
        Self {
            levels: vec![0, 1, 2, 3, 4],
        }
    }

    pub fn levels(&self) -> &[u32] {
        &self.levels
    }
}

impl Default for EscalationPolicy {
    fn default() -> Self {
        Self::normal()
    }
}

impl FromStr for EscalationPolicy {
    type Err = PolicyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "normal" => Ok(Self::normal()),
            "high" => Ok(Self::high()),
            other => Err(PolicyError::UnknownPreset(other.to_string())),
        }
    }
}

impl fmt::Display for EscalationPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let levels: Vec<String> = self.levels.iter().map(u32::to_string).collect();
        write!(f, "[{}]", levels.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_presets() {
        assert_eq!(EscalationPolicy::normal().levels(), &[0, 1, 2, 3]);
        assert_eq!(EscalationPolicy::high().levels(), &[0, 1, 2, 3, 4]);
        assert_eq!(EscalationPolicy::default(), EscalationPolicy::normal());
    }

    #[test]
    fn test_custom_levels_keep_caller_order() {
        let policy = EscalationPolicy::new(vec![2, 0]).unwrap();
        assert_eq!(policy.levels(), &[2, 0]);
    }

    #[test]
    fn test_empty_levels_rejected() {
        assert_eq!(EscalationPolicy::new(vec![]), Err(PolicyError::Empty));
    }

    #[rstest]
    #[case::normal("normal", EscalationPolicy::normal())]
    #[case::high("high", EscalationPolicy::high())]
    #[case::case_insensitive("HIGH", EscalationPolicy::high())]
    fn test_parse_presets(#[case] input: &str, #[case] expected: EscalationPolicy) {
        assert_eq!(input.parse::<EscalationPolicy>().unwrap(), expected);
    }

    #[test]
    fn test_parse_unknown_preset() {
        assert_eq!(
            "turbo".parse::<EscalationPolicy>(),
            Err(PolicyError::UnknownPreset("turbo".to_string()))
        );
    }

    #[test]
    fn test_display_lists_levels() {
        assert_eq!(EscalationPolicy::high().to_string(), "[0, 1, 2, 3, 4]");
    }
}
