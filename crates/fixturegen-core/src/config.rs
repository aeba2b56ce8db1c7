//! Layered configuration for a generation run.
//!
//! Options are string-keyed. Values are resolved from, in increasing
//! precedence:
//!
//! 1. Built-in defaults
//! 2. `[package.metadata.fixtures]` in the crate's `Cargo.toml`
//! 3. Environment variables (`FIXTURES_RUN`, `FIXTURES_RANDOMIZE`,
//!    `FIXTURES_SEED`, `FIXTURES_MODULE`)
//! 4. Explicit options (`-O key=value` or `Generator::option`)
//!
//! Every resolved value records the [`ConfigSource`] it came from.
//!
//! Boolean options are true iff the value equals `true` ignoring ASCII case;
//! any other value reads as false.

use serde::Serialize;
use tracing::{debug, warn};

use crate::error::FixtureError;
use crate::naming::{Naming, DEFAULT_MODULE_ROOT};

/// Enables or disables generation entirely.
pub const KEY_RUN: &str = "fixtures.run";
/// Selects randomized default values.
pub const KEY_RANDOMIZE: &str = "fixtures.randomize";
/// Seeds randomized default values.
pub const KEY_SEED: &str = "fixtures.seed";
/// Module path output units are mounted under.
pub const KEY_MODULE: &str = "fixtures.module";

/// Prefix shared by every recognized key.
pub const KEY_PREFIX: &str = "fixtures.";

/// Environment variables, paired with the key they set.
pub const ENV_VARS: &[(&str, &str)] = &[
    ("FIXTURES_RUN", KEY_RUN),
    ("FIXTURES_RANDOMIZE", KEY_RANDOMIZE),
    ("FIXTURES_SEED", KEY_SEED),
    ("FIXTURES_MODULE", KEY_MODULE),
];

// ============================================================================
// Configuration Sources
// ============================================================================

/// Configuration value source (for precedence tracking).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfigSource {
    /// Built-in default value.
    Default = 0,
    /// From `[package.metadata.fixtures]` in Cargo.toml.
    ProjectConfig = 1,
    /// From environment variable.
    EnvVar = 2,
    /// From an explicit option (highest precedence).
    Option = 3,
}

/// A configuration value with its source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConfigValue<T> {
    pub value: T,
    pub source: ConfigSource,
}

impl<T> ConfigValue<T> {
    pub fn new(value: T, source: ConfigSource) -> Self {
        ConfigValue { value, source }
    }

    /// Merge with another value, preferring higher precedence.
    pub fn merge(self, other: Self) -> Self {
        if other.source >= self.source {
            other
        } else {
            self
        }
    }
}

// ============================================================================
// Resolved Options
// ============================================================================

/// Resolved options for one run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FixtureOptions {
    pub run: ConfigValue<bool>,
    pub randomize: ConfigValue<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<ConfigValue<u64>>,
    pub module: ConfigValue<String>,
}

impl Default for FixtureOptions {
    fn default() -> Self {
        FixtureOptions {
            run: ConfigValue::new(true, ConfigSource::Default),
            randomize: ConfigValue::new(false, ConfigSource::Default),
            seed: None,
            module: ConfigValue::new(DEFAULT_MODULE_ROOT.to_string(), ConfigSource::Default),
        }
    }
}

impl FixtureOptions {
    /// Resolve from all sources, reading the process environment.
    pub fn resolve(
        manifest: Option<&str>,
        options: &[(String, String)],
    ) -> Result<Self, FixtureError> {
        Self::resolve_with_env(manifest, |name| std::env::var(name).ok(), options)
    }

    /// Resolve from all sources with an explicit environment lookup.
    pub fn resolve_with_env<F>(
        manifest: Option<&str>,
        env: F,
        options: &[(String, String)],
    ) -> Result<Self, FixtureError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut resolved = FixtureOptions::default();

        if let Some(text) = manifest {
            for (key, value) in manifest_options(text)? {
                resolved.apply(&key, &value, ConfigSource::ProjectConfig)?;
            }
        }

        for (var, key) in ENV_VARS {
            if let Some(value) = env(var) {
                resolved.apply(key, &value, ConfigSource::EnvVar)?;
            }
        }

        for (key, value) in options {
            resolved.apply(key, value, ConfigSource::Option)?;
        }

        Ok(resolved)
    }

    /// Defaults overridden by explicit options only.
    pub fn from_options(options: &[(String, String)]) -> Result<Self, FixtureError> {
        Self::resolve_with_env(None, |_| None, options)
    }

    /// Apply one key/value pair from `source`.
    pub fn apply(
        &mut self,
        key: &str,
        value: &str,
        source: ConfigSource,
    ) -> Result<(), FixtureError> {
        match key {
            KEY_RUN => {
                let next = ConfigValue::new(parse_bool(value), source);
                self.run = self.run.clone().merge(next);
            }
            KEY_RANDOMIZE => {
                let next = ConfigValue::new(parse_bool(value), source);
                self.randomize = self.randomize.clone().merge(next);
            }
            KEY_SEED => {
                let seed: u64 = value.trim().parse().map_err(|_| {
                    FixtureError::invalid_option(key, value, "expected an unsigned integer")
                })?;
                let next = ConfigValue::new(seed, source);
                self.seed = Some(match self.seed.take() {
                    Some(current) => current.merge(next),
                    None => next,
                });
            }
            KEY_MODULE => {
                let module = value.trim();
                if module.is_empty() || module.split("::").any(str::is_empty) {
                    return Err(FixtureError::invalid_option(
                        key,
                        value,
                        "expected a module path such as crate::fixtures",
                    ));
                }
                let next = ConfigValue::new(module.to_string(), source);
                self.module = self.module.clone().merge(next);
            }
            other if other.starts_with(KEY_PREFIX) => {
                warn!("ignoring unknown option {}", other);
            }
            other => {
                debug!("ignoring option {} outside {}*", other, KEY_PREFIX);
            }
        }
        Ok(())
    }

    pub fn run(&self) -> bool {
        self.run.value
    }

    pub fn randomize(&self) -> bool {
        self.randomize.value
    }

    pub fn seed(&self) -> Option<u64> {
        self.seed.as_ref().map(|seed| seed.value)
    }

    pub fn module(&self) -> &str {
        &self.module.value
    }

    /// Naming policy rooted at the configured module.
    pub fn naming(&self) -> Naming {
        Naming::new(self.module.value.clone())
    }
}

/// Boolean option parsing: true iff `value` is `true` ignoring ASCII case.
pub fn parse_bool(value: &str) -> bool {
    value.trim().eq_ignore_ascii_case("true")
}

/// Split a `key=value` argument.
pub fn parse_key_value(arg: &str) -> Result<(String, String), FixtureError> {
    match arg.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.to_string()))
        }
        _ => Err(FixtureError::invalid_option(
            arg,
            "",
            "expected key=value",
        )),
    }
}

/// Options from `[package.metadata.fixtures]`, as `fixtures.<key>` pairs.
fn manifest_options(text: &str) -> Result<Vec<(String, String)>, FixtureError> {
    let manifest: toml::Value = toml::from_str(text).map_err(|e| {
        FixtureError::invalid_option("Cargo.toml", "", format!("failed to parse manifest: {}", e))
    })?;
    let Some(table) = manifest
        .get("package")
        .and_then(|p| p.get("metadata"))
        .and_then(|m| m.get("fixtures"))
        .and_then(toml::Value::as_table)
    else {
        return Ok(Vec::new());
    };

    let mut pairs = Vec::with_capacity(table.len());
    for (name, value) in table {
        let key = format!("{}{}", KEY_PREFIX, name);
        let text = match value {
            toml::Value::String(s) => s.clone(),
            toml::Value::Boolean(b) => b.to_string(),
            toml::Value::Integer(i) => i.to_string(),
            other => {
                return Err(FixtureError::invalid_option(
                    key,
                    other.to_string(),
                    "expected a string, boolean or integer",
                ))
            }
        };
        pairs.push((key, text));
    }
    Ok(pairs)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn opts(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    mod config_value_tests {
        use super::*;

        #[test]
        fn merge_prefers_higher_precedence() {
            let default = ConfigValue::new(false, ConfigSource::Default);
            let option = ConfigValue::new(true, ConfigSource::Option);
            assert!(default.clone().merge(option.clone()).value);
            assert!(option.merge(default).value);
        }

        #[test]
        fn source_ordering() {
            assert!(ConfigSource::Default < ConfigSource::ProjectConfig);
            assert!(ConfigSource::ProjectConfig < ConfigSource::EnvVar);
            assert!(ConfigSource::EnvVar < ConfigSource::Option);
        }
    }

    mod resolution_tests {
        use super::*;

        #[test]
        fn defaults() {
            let resolved = FixtureOptions::from_options(&[]).unwrap();
            assert!(resolved.run());
            assert!(!resolved.randomize());
            assert_eq!(resolved.seed(), None);
            assert_eq!(resolved.module(), "crate::fixtures");
            assert_eq!(resolved.run.source, ConfigSource::Default);
        }

        #[test]
        fn booleans_ignore_case_and_default_to_false() {
            let resolved = FixtureOptions::from_options(&opts(&[
                ("fixtures.run", "TRUE"),
                ("fixtures.randomize", "True"),
            ]))
            .unwrap();
            assert!(resolved.run());
            assert!(resolved.randomize());

            let resolved =
                FixtureOptions::from_options(&opts(&[("fixtures.run", "yes")])).unwrap();
            assert!(!resolved.run());
        }

        #[test]
        fn precedence_manifest_env_option() {
            let manifest = r#"
[package]
name = "demo"
version = "0.1.0"

[package.metadata.fixtures]
randomize = true
seed = 5
module = "crate::support"
"#;
            let env = |name: &str| match name {
                "FIXTURES_SEED" => Some("9".to_string()),
                _ => None,
            };
            let resolved = FixtureOptions::resolve_with_env(
                Some(manifest),
                env,
                &opts(&[("fixtures.module", "crate::test_fixtures")]),
            )
            .unwrap();

            assert!(resolved.randomize());
            assert_eq!(resolved.randomize.source, ConfigSource::ProjectConfig);
            assert_eq!(resolved.seed(), Some(9));
            assert_eq!(
                resolved.seed.as_ref().map(|s| s.source),
                Some(ConfigSource::EnvVar)
            );
            assert_eq!(resolved.module(), "crate::test_fixtures");
            assert_eq!(resolved.module.source, ConfigSource::Option);
        }

        #[test]
        fn manifest_without_metadata_uses_defaults() {
            let manifest = "[package]\nname = \"demo\"\n";
            let resolved =
                FixtureOptions::resolve_with_env(Some(manifest), |_| None, &[]).unwrap();
            assert_eq!(resolved, FixtureOptions::default());
        }

        #[test]
        fn invalid_seed_is_rejected() {
            let err =
                FixtureOptions::from_options(&opts(&[("fixtures.seed", "abc")])).unwrap_err();
            assert!(matches!(err, FixtureError::InvalidOption { .. }));
            assert_eq!(err.error_code().code(), 2);
        }

        #[test]
        fn empty_module_is_rejected() {
            assert!(FixtureOptions::from_options(&opts(&[("fixtures.module", "")])).is_err());
            assert!(
                FixtureOptions::from_options(&opts(&[("fixtures.module", "crate::")])).is_err()
            );
        }

        #[test]
        fn unknown_keys_are_ignored() {
            let resolved = FixtureOptions::from_options(&opts(&[
                ("fixtures.colour", "blue"),
                ("other.key", "1"),
            ]))
            .unwrap();
            assert_eq!(resolved, FixtureOptions::default());
        }
    }

    mod key_value_tests {
        use super::*;

        #[test]
        fn splits_on_first_equals() {
            assert_eq!(
                parse_key_value("fixtures.module=crate::a=b").unwrap(),
                ("fixtures.module".to_string(), "crate::a=b".to_string())
            );
        }

        #[test]
        fn rejects_missing_key() {
            assert!(parse_key_value("=true").is_err());
            assert!(parse_key_value("fixtures.run").is_err());
        }
    }
}
