use std::collections::BTreeSet;

use crate::error::UnknownExperimentError;
use crate::name::Name;

/// Environment variable carrying a comma-separated experiment list.
pub const ENV_NAME: &str = "ENCORE_EXPERIMENT";

/// The experiments enabled for one run of the process.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ExperimentSet {
    experiments: BTreeSet<Name>,
}

impl ExperimentSet {
    /// Merges experiment sources in order: `app`, then `process_env` (the
    /// value of [`ENV_NAME`] for this process), then every `ENV_NAME=...`
    /// entry in `environ`.
    ///
    /// Fails on the first unrecognized name.
    pub fn from_sources<S: AsRef<str>>(
        app: &[S],
        process_env: Option<&str>,
        environ: &[String],
    ) -> Result<Self, UnknownExperimentError> {
        let mut set = Self::default();

        set.add(app.iter().map(|name| name.as_ref()))?;

        if let Some(value) = process_env.filter(|value| !value.is_empty()) {
            set.add(parse_env_value(value))?;
        }

        let prefix = format!("{ENV_NAME}=");
        for entry in environ {
            if let Some(value) = entry.strip_prefix(prefix.as_str()) {
                set.add(parse_env_value(value))?;
            }
        }

        log::debug!("experiment set resolved: {:?}", set.string_list());
        Ok(set)
    }

    /// Like [`ExperimentSet::from_sources`], reading [`ENV_NAME`] from the
    /// current process.
    pub fn from_env<S: AsRef<str>>(
        app: &[S],
        environ: &[String],
    ) -> Result<Self, UnknownExperimentError> {
        let process_env = std::env::var(ENV_NAME).ok();
        Self::from_sources(app, process_env.as_deref(), environ)
    }

    pub fn enabled(&self, name: Name) -> bool {
        self.experiments.contains(&name)
    }

    /// Enabled experiments in sorted order.
    pub fn list(&self) -> Vec<Name> {
        self.experiments.iter().copied().collect()
    }

    pub fn string_list(&self) -> Vec<String> {
        self.experiments
            .iter()
            .map(|name| name.as_str().to_owned())
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.experiments.is_empty()
    }

    fn add<'a>(
        &mut self,
        names: impl IntoIterator<Item = &'a str>,
    ) -> Result<(), UnknownExperimentError> {
        for raw in names {
            if raw.is_empty() {
                continue;
            }
            let name = raw.parse::<Name>()?;
            self.experiments.insert(name);
        }
        Ok(())
    }
}

fn parse_env_value(value: &str) -> impl Iterator<Item = &str> {
    value.trim_matches(|c| c == '"' || c == '\'').split(',')
}
