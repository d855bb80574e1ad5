use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::UnknownExperimentError;
use crate::set::ExperimentSet;

/// A recognized experiment.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum Name {
    /// Allow secrets to be overridden from a `.secrets.local` file.
    LocalSecretsOverride,
    /// Enable metrics collection.
    Metrics,
    /// Enable the v2 parser/compiler and the auth methods gated on it.
    V2,
    /// Enable the beta runtime.
    BetaRuntime,
    /// Route every RPC externally instead of through the runtime.
    ExternalCalls,
}

impl Name {
    pub const ALL: [Name; 5] = [
        Name::LocalSecretsOverride,
        Name::Metrics,
        Name::V2,
        Name::BetaRuntime,
        Name::ExternalCalls,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Name::LocalSecretsOverride => "local-secrets-override",
            Name::Metrics => "metrics",
            Name::V2 => "v2",
            Name::BetaRuntime => "beta-runtime",
            Name::ExternalCalls => "external-calls",
        }
    }

    /// Reports whether this experiment is enabled in `set`. No set means
    /// nothing is enabled.
    pub fn enabled(self, set: Option<&ExperimentSet>) -> bool {
        set.is_some_and(|set| set.enabled(self))
    }
}

impl FromStr for Name {
    type Err = UnknownExperimentError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        Name::ALL
            .iter()
            .copied()
            .find(|name| name.as_str() == raw)
            .ok_or_else(|| UnknownExperimentError::new(raw))
    }
}

// Ordered by wire name so listings come out alphabetically.
impl Ord for Name {
    fn cmp(&self, other: &Self) -> Ordering {
        self.as_str().cmp(other.as_str())
    }
}

impl PartialOrd for Name {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_names_parse_back() {
        for name in Name::ALL {
            assert_eq!(name.as_str().parse::<Name>().expect("known name"), name);
        }
    }

    #[test]
    fn parsing_is_case_sensitive() {
        let err = "Metrics".parse::<Name>().expect_err("wrong case");
        assert_eq!(err.name, "Metrics");
    }

    #[test]
    fn serde_uses_kebab_case() {
        let encoded = serde_json::to_string(&Name::LocalSecretsOverride).expect("encode");
        assert_eq!(encoded, "\"local-secrets-override\"");
        assert!(serde_json::from_str::<Name>("\"no-such-thing\"").is_err());
    }

    #[test]
    fn ordering_follows_wire_name() {
        let mut names = Name::ALL.to_vec();
        names.sort();
        let wire: Vec<&str> = names.iter().map(|name| name.as_str()).collect();
        let expected = [
            "beta-runtime",
            "external-calls",
            "local-secrets-override",
            "metrics",
            "v2",
        ];
        assert_eq!(wire, expected);
    }

    #[test]
    fn missing_set_enables_nothing() {
        assert!(!Name::V2.enabled(None));
    }
}
