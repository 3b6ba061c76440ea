// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*!
Connectivity profile files.

A profile is a TOML document carrying batch options and weight/delay
override rules for [`apply_connectivity_table`]:

```toml
[options]
count_scaling = 0.5

[[rules]]
component = "ampa"
post_population = "inh_l2"
weight = 0.25

[[rules]]
component = "*"        # wildcard, matches any component
delay_ms = 2.0
```

Rules keep file order; `apply_connectivity_table` takes the first match per
component, so the wildcard belongs last. Every rule must set at least one of
`weight` / `delay_ms`.

[`apply_connectivity_table`]: crate::connectivity::apply_connectivity_table
*/

use crate::connectivity::{BatchOptions, OverrideRule};
use crate::params::ComponentSelector;
use crate::types::{BuildError, BuildResult};
use serde::Deserialize;
use std::fs;
use std::path::Path;
use tracing::info;

/// Validated connectivity profile, ready to hand to the orchestrator.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConnectivityProfile {
    pub options: BatchOptions,
    pub rules: Vec<OverrideRule>,
}

#[derive(Debug, Deserialize)]
struct RawProfile {
    #[serde(default)]
    options: BatchOptions,
    #[serde(default)]
    rules: Vec<RawRule>,
}

#[derive(Debug, Deserialize)]
struct RawRule {
    component: String,
    post_population: Option<String>,
    weight: Option<f64>,
    delay_ms: Option<f64>,
}

impl ConnectivityProfile {
    /// Parse and validate a profile from TOML text.
    pub fn from_toml_str(text: &str) -> BuildResult<Self> {
        let raw: RawProfile = toml::from_str(text)?;

        if !raw.options.count_scaling.is_finite() || raw.options.count_scaling < 0.0 {
            return Err(BuildError::Config(format!(
                "count_scaling {} must be finite and non-negative",
                raw.options.count_scaling
            )));
        }

        let mut rules = Vec::with_capacity(raw.rules.len());
        for (index, rule) in raw.rules.into_iter().enumerate() {
            let position = index + 1;
            if rule.component.is_empty() {
                return Err(BuildError::Config(format!(
                    "rule {} has an empty component",
                    position
                )));
            }
            if rule.weight.is_none() && rule.delay_ms.is_none() {
                return Err(BuildError::Config(format!(
                    "rule {} ('{}') sets neither weight nor delay_ms",
                    position, rule.component
                )));
            }
            if let Some(weight) = rule.weight {
                if !weight.is_finite() {
                    return Err(BuildError::Config(format!(
                        "rule {} ('{}') has non-finite weight",
                        position, rule.component
                    )));
                }
            }
            if let Some(delay) = rule.delay_ms {
                if !delay.is_finite() || delay < 0.0 {
                    return Err(BuildError::Config(format!(
                        "rule {} ('{}') has invalid delay_ms {}",
                        position, rule.component, delay
                    )));
                }
            }
            let component = if rule.component == "*" {
                ComponentSelector::Any
            } else {
                ComponentSelector::Component(rule.component)
            };
            rules.push(OverrideRule {
                component,
                post_population: rule.post_population,
                weight: rule.weight,
                delay_ms: rule.delay_ms,
            });
        }

        Ok(Self {
            options: raw.options,
            rules,
        })
    }

    /// Load a profile from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> BuildResult<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        let profile = Self::from_toml_str(&content)?;
        info!(
            target: "connectogen-synthesis",
            "Loaded connectivity profile from {} ({} rules, count_scaling {})",
            path.display(),
            profile.rules.len(),
            profile.options.count_scaling
        );
        Ok(profile)
    }
}
