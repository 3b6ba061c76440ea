// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*!
Synapse parameter specification and resolution.

Per-component delays and weights are described through tagged unions rather
than scalar-or-list overloading: one value for every component, one value per
component matched by position, or values keyed by component id with an
explicit wildcard. Resolution happens once per synthesis call; the resolved
values then feed every connection draw, with optional Gaussian jitter.
*/

use crate::rng::NetRng;
use crate::types::{BuildError, BuildResult};

/// Selects which synapse component a keyed value applies to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ComponentSelector {
    /// Match one component id exactly
    Component(String),
    /// Match every component (explicit wildcard; first match wins, so place
    /// it last)
    Any,
}

impl ComponentSelector {
    pub fn matches(&self, component: &str) -> bool {
        match self {
            ComponentSelector::Component(id) => id == component,
            ComponentSelector::Any => true,
        }
    }
}

/// One synapse parameter (delay or weight) across components.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamSpec {
    /// Use the built-in default (0 ms for delays, 1 for weights)
    Default,
    /// One value shared by every component
    Uniform(f64),
    /// One value per component, matched by position in the component list
    PerComponent(Vec<f64>),
    /// Values keyed by component selector; the first matching entry wins,
    /// components matching no entry fall back to the default
    Keyed(Vec<(ComponentSelector, f64)>),
}

impl ParamSpec {
    fn value_for(
        &self,
        component: &str,
        position: usize,
        component_count: usize,
        what: &str,
    ) -> BuildResult<Option<f64>> {
        match self {
            ParamSpec::Default => Ok(None),
            ParamSpec::Uniform(value) => Ok(Some(*value)),
            ParamSpec::PerComponent(values) => {
                if values.len() != component_count {
                    return Err(BuildError::BadParameters(format!(
                        "{} list has {} entries for {} synapse components",
                        what,
                        values.len(),
                        component_count
                    )));
                }
                Ok(Some(values[position]))
            }
            ParamSpec::Keyed(entries) => Ok(entries
                .iter()
                .find(|(selector, _)| selector.matches(component))
                .map(|(_, value)| *value)),
        }
    }
}

/// Full parameter set for one chemical synthesis call.
///
/// One projection is produced per entry in `synapses`; all of them share the
/// same attachment sites per formed contact while delay and weight resolve
/// per component.
#[derive(Debug, Clone)]
pub struct SynapseParams {
    /// Synapse component ids
    pub synapses: Vec<String>,

    /// Mean delays in milliseconds (default 0)
    pub delays: ParamSpec,

    /// Mean weights (default 1)
    pub weights: ParamSpec,

    /// Gaussian jitter on delays (standard deviation, ms)
    pub delay_std: Option<f64>,

    /// Gaussian jitter on weights (standard deviation)
    pub weight_std: Option<f64>,

    /// Clip jittered values: delays resample until non-negative, weights
    /// until they match the sign of their mean
    pub clipped: bool,
}

impl SynapseParams {
    /// Defaults only: delay 0 ms and weight 1 for every component
    pub fn with_defaults(synapses: Vec<String>) -> Self {
        Self {
            synapses,
            delays: ParamSpec::Default,
            weights: ParamSpec::Default,
            delay_std: None,
            weight_std: None,
            clipped: false,
        }
    }

    /// One shared delay and weight for every component, no jitter
    pub fn uniform(synapses: Vec<String>, delay_ms: f64, weight: f64) -> Self {
        Self {
            synapses,
            delays: ParamSpec::Uniform(delay_ms),
            weights: ParamSpec::Uniform(weight),
            delay_std: None,
            weight_std: None,
            clipped: false,
        }
    }

    /// Resolve the specification into one entry per component.
    ///
    /// # Errors
    ///
    /// `BadParameters` on an empty or duplicated component list, a
    /// `PerComponent` length mismatch, or a negative jitter deviation.
    pub(crate) fn resolve(&self) -> BuildResult<Vec<ResolvedComponent>> {
        if self.synapses.is_empty() {
            return Err(BuildError::BadParameters(
                "at least one synapse component is required".to_string(),
            ));
        }
        for (i, synapse) in self.synapses.iter().enumerate() {
            if self.synapses[..i].contains(synapse) {
                return Err(BuildError::BadParameters(format!(
                    "duplicate synapse component '{}'",
                    synapse
                )));
            }
        }
        for (std_dev, what) in [(self.delay_std, "delay"), (self.weight_std, "weight")] {
            if let Some(std_dev) = std_dev {
                if std_dev < 0.0 {
                    return Err(BuildError::BadParameters(format!(
                        "{} jitter deviation cannot be negative, got {}",
                        what, std_dev
                    )));
                }
            }
        }

        let count = self.synapses.len();
        let mut resolved = Vec::with_capacity(count);
        for (position, synapse) in self.synapses.iter().enumerate() {
            let delay_mean = self
                .delays
                .value_for(synapse, position, count, "delay")?
                .unwrap_or(0.0);
            let weight_mean = self
                .weights
                .value_for(synapse, position, count, "weight")?
                .unwrap_or(1.0);
            resolved.push(ResolvedComponent {
                synapse: synapse.clone(),
                delay: ValueSpec {
                    mean: delay_mean,
                    std_dev: self.delay_std,
                    clip: if self.clipped { Clip::NonNegative } else { Clip::None },
                },
                weight: ValueSpec {
                    mean: weight_mean,
                    std_dev: self.weight_std,
                    clip: if self.clipped { Clip::MatchMeanSign } else { Clip::None },
                },
            });
        }
        Ok(resolved)
    }
}

/// One component with its resolved delay and weight distributions.
#[derive(Debug, Clone)]
pub(crate) struct ResolvedComponent {
    pub synapse: String,
    pub delay: ValueSpec,
    pub weight: ValueSpec,
}

#[derive(Debug, Clone, Copy)]
pub(crate) enum Clip {
    None,
    NonNegative,
    MatchMeanSign,
}

/// A scalar with optional Gaussian jitter and a clipping rule.
#[derive(Debug, Clone, Copy)]
pub(crate) struct ValueSpec {
    pub mean: f64,
    pub std_dev: Option<f64>,
    pub clip: Clip,
}

impl ValueSpec {
    /// Resampling bound for clipped draws; a mean far outside the admissible
    /// range exhausts this and errors instead of spinning.
    const MAX_CLIP_RESAMPLES: usize = 1000;

    /// Draw one value. Without jitter (or with a zero deviation) the mean is
    /// returned and no randomness is consumed.
    pub fn sample(&self, rng: &mut NetRng) -> BuildResult<f64> {
        let std_dev = match self.std_dev {
            Some(std_dev) if std_dev > 0.0 => std_dev,
            _ => return Ok(self.mean),
        };
        for _ in 0..Self::MAX_CLIP_RESAMPLES {
            let value = rng.gauss(self.mean, std_dev);
            let admissible = match self.clip {
                Clip::None => true,
                Clip::NonNegative => value >= 0.0,
                Clip::MatchMeanSign => {
                    if self.mean >= 0.0 {
                        value >= 0.0
                    } else {
                        value <= 0.0
                    }
                }
            };
            if admissible {
                return Ok(value);
            }
        }
        Err(BuildError::BadParameters(format!(
            "clipped jitter around mean {} produced no admissible value in {} draws",
            self.mean,
            Self::MAX_CLIP_RESAMPLES
        )))
    }
}
