//! User-selected dashboard scope.
//!
//! A [`FilterState`] is built from the set of states the warehouse knows about
//! and is then mutated only through explicit selection events coming from the
//! presentation layer.

use log::warn;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// Smallest number of tickets the AI analysis panel may request.
pub const AI_SAMPLE_SIZE_MIN: u32 = 5;
/// Largest number of tickets the AI analysis panel may request.
pub const AI_SAMPLE_SIZE_MAX: u32 = 50;
/// Sample size used until the user moves the slider.
pub const AI_SAMPLE_SIZE_DEFAULT: u32 = 10;

/// Network event severity filter.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    #[default]
    All,
    Critical,
    Major,
    Minor,
    Warning,
}

impl Severity {
    /// Options in the order the severity selector lists them.
    pub const OPTIONS: [Severity; 5] = [
        Severity::All,
        Severity::Critical,
        Severity::Major,
        Severity::Minor,
        Severity::Warning,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::All => "ALL",
            Severity::Critical => "CRITICAL",
            Severity::Major => "MAJOR",
            Severity::Minor => "MINOR",
            Severity::Warning => "WARNING",
        }
    }

    /// `true` when the severity does not restrict anything.
    pub fn is_all(&self) -> bool {
        matches!(self, Severity::All)
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "ALL" => Ok(Severity::All),
            "CRITICAL" => Ok(Severity::Critical),
            "MAJOR" => Ok(Severity::Major),
            "MINOR" => Ok(Severity::Minor),
            "WARNING" => Ok(Severity::Warning),
            _ => Err(format!("Unknown severity: {}", s)),
        }
    }
}

/// Filter values that parameterize every report in a render pass.
///
/// Invariant: `selected_states` is always a subset of `known_states`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilterState {
    known_states: BTreeSet<String>,
    selected_states: BTreeSet<String>,
    severity: Severity,
    ai_sample_size: u32,
}

impl FilterState {
    /// Create a filter with every known state selected, `ALL` severity and
    /// the default AI sample size.
    pub fn new<I, S>(known_states: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let known_states: BTreeSet<String> = known_states.into_iter().map(Into::into).collect();
        Self {
            selected_states: known_states.clone(),
            known_states,
            severity: Severity::All,
            ai_sample_size: AI_SAMPLE_SIZE_DEFAULT,
        }
    }

    pub fn known_states(&self) -> impl Iterator<Item = &str> {
        self.known_states.iter().map(String::as_str)
    }

    /// Selected states in ascending order.
    pub fn selected_states(&self) -> impl Iterator<Item = &str> {
        self.selected_states.iter().map(String::as_str)
    }

    pub fn selected_count(&self) -> usize {
        self.selected_states.len()
    }

    pub fn severity(&self) -> Severity {
        self.severity
    }

    pub fn ai_sample_size(&self) -> u32 {
        self.ai_sample_size
    }

    /// Replace the state selection.
    ///
    /// Values the warehouse did not report are ignored. An empty selection is
    /// valid and makes state-filtered reports return no rows.
    pub fn select_states<I, S>(&mut self, states: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut selected = BTreeSet::new();
        for state in states {
            let state = state.as_ref();
            if self.known_states.contains(state) {
                selected.insert(state.to_string());
            } else {
                warn!("Ignoring unknown state in filter selection: {:?}", state);
            }
        }
        self.selected_states = selected;
    }

    pub fn set_severity(&mut self, severity: Severity) {
        self.severity = severity;
    }

    /// Set the AI sample size, clamping into the slider range.
    pub fn set_ai_sample_size(&mut self, size: i64) {
        let clamped = size.clamp(AI_SAMPLE_SIZE_MIN as i64, AI_SAMPLE_SIZE_MAX as i64);
        self.ai_sample_size = clamped as u32;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filter() -> FilterState {
        FilterState::new(["TX", "CA", "NY"])
    }

    #[test]
    fn test_defaults_select_everything() {
        let f = filter();
        assert_eq!(f.selected_states().collect::<Vec<_>>(), vec!["CA", "NY", "TX"]);
        assert_eq!(f.severity(), Severity::All);
        assert_eq!(f.ai_sample_size(), AI_SAMPLE_SIZE_DEFAULT);
    }

    #[test]
    fn test_select_states_drops_unknown_values() {
        let mut f = filter();
        f.select_states(["CA", "ZZ"]);
        assert_eq!(f.selected_states().collect::<Vec<_>>(), vec!["CA"]);
    }

    #[test]
    fn test_select_states_allows_empty() {
        let mut f = filter();
        f.select_states(Vec::<String>::new());
        assert_eq!(f.selected_count(), 0);
        assert_eq!(f.known_states().count(), 3);
    }

    #[test]
    fn test_ai_sample_size_is_clamped() {
        let mut f = filter();
        f.set_ai_sample_size(1);
        assert_eq!(f.ai_sample_size(), 5);
        f.set_ai_sample_size(500);
        assert_eq!(f.ai_sample_size(), 50);
        f.set_ai_sample_size(-3);
        assert_eq!(f.ai_sample_size(), 5);
        f.set_ai_sample_size(25);
        assert_eq!(f.ai_sample_size(), 25);
    }

    #[test]
    fn test_severity_parsing() {
        assert_eq!("critical".parse::<Severity>().unwrap(), Severity::Critical);
        assert_eq!(" Warning ".parse::<Severity>().unwrap(), Severity::Warning);
        assert!("SEVERE".parse::<Severity>().is_err());
        assert_eq!(Severity::Major.to_string(), "MAJOR");
    }
}
