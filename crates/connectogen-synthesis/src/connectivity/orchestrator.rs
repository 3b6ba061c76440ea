// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*!
Batch connectivity driver.

Parses a whitespace-delimited connectivity table and applies it to every
ordered pair of non-empty populations (self-pairs included). Table format,
one row per line, `#` starts a comment:

```text
# pre      post       components          count  target group     direction
exc        exc        [ampa,nmda]         20     dendrite_group
exc        inh        ampa                10     soma_group       convergent
inh        exc        gaba                8      soma_group       divergent
net        net        [elect:gj]          3      soma_group
```

Pre/post columns match population ids by substring. The component column is
a bracketed comma-separated list (brackets optional for a single entry);
`elect:` marks gap junction components and cannot be mixed with chemical
ones in the same row. The direction column is optional and defaults to
convergent (count per postsynaptic cell).

Weight/delay overrides come in as [`OverrideRule`]s: each rule keys on a
synapse component id (or the wildcard selector) plus an optional exact
post-population id, and the first matching rule per component wins.
Segment-group target specs are resolved through the [`BuildContext`] cache,
at most once per cell type and group, and stay cached for subsequent calls.
*/

use super::electrical::targeted_electrical_projection;
use super::synthesis::targeted_projection;
use super::TargetingMode;
use crate::context::BuildContext;
use crate::params::{ComponentSelector, ParamSpec, SynapseParams};
use crate::types::{BuildError, BuildResult};
use connectogen_structures::{CellMorphology, ElectricalProjection, Population, Projection};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// One parsed table row.
#[derive(Debug, Clone, PartialEq)]
pub struct ConnectivityRow {
    /// Substring matched against presynaptic population ids
    pub pre_match: String,

    /// Substring matched against postsynaptic population ids
    pub post_match: String,

    /// Synapse or gap junction component ids
    pub components: Vec<String>,

    /// True when the component list carried the `elect:` marker
    pub electrical: bool,

    /// Per-cell target count, scaled by [`BatchOptions::count_scaling`]
    pub count: f64,

    /// Segment group resolved against the postsynaptic cell type
    pub target_group: String,

    /// Which side the count applies to
    pub mode: TargetingMode,
}

/// A parsed connectivity table.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConnectivityTable {
    pub rows: Vec<ConnectivityRow>,
}

impl ConnectivityTable {
    /// Parse the textual table format. Line numbers in errors are 1-based.
    pub fn parse(text: &str) -> BuildResult<Self> {
        let mut rows = Vec::new();
        for (index, raw) in text.lines().enumerate() {
            let line = index + 1;
            let content = match raw.find('#') {
                Some(pos) => &raw[..pos],
                None => raw,
            };
            let tokens: Vec<&str> = content.split_whitespace().collect();
            if tokens.is_empty() {
                continue;
            }
            if tokens.len() < 5 || tokens.len() > 6 {
                return Err(BuildError::MalformedRow {
                    line,
                    reason: format!("expected 5 or 6 columns, found {}", tokens.len()),
                });
            }
            let (components, electrical) = parse_components(tokens[2], line)?;
            let count: f64 = tokens[3].parse().map_err(|_| BuildError::MalformedRow {
                line,
                reason: format!("count '{}' is not a number", tokens[3]),
            })?;
            if !count.is_finite() || count < 0.0 {
                return Err(BuildError::MalformedRow {
                    line,
                    reason: format!("count {} must be finite and non-negative", count),
                });
            }
            let mode = match tokens.get(5) {
                None => TargetingMode::Convergent,
                Some(&"convergent") => TargetingMode::Convergent,
                Some(&"divergent") => TargetingMode::Divergent,
                Some(other) => {
                    return Err(BuildError::MalformedRow {
                        line,
                        reason: format!(
                            "direction '{}' must be 'convergent' or 'divergent'",
                            other
                        ),
                    })
                }
            };
            rows.push(ConnectivityRow {
                pre_match: tokens[0].to_string(),
                post_match: tokens[1].to_string(),
                components,
                electrical,
                count,
                target_group: tokens[4].to_string(),
                mode,
            });
        }
        Ok(Self { rows })
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

fn parse_components(token: &str, line: usize) -> BuildResult<(Vec<String>, bool)> {
    let inner = if token.starts_with('[') && token.ends_with(']') {
        &token[1..token.len() - 1]
    } else {
        token
    };
    let mut components = Vec::new();
    let mut electrical = Vec::new();
    for part in inner.split(',') {
        let part = part.trim();
        if part.is_empty() {
            continue;
        }
        match part.strip_prefix("elect:") {
            Some("") => {
                return Err(BuildError::MalformedRow {
                    line,
                    reason: "empty component after 'elect:'".to_string(),
                })
            }
            Some(stripped) => {
                components.push(stripped.to_string());
                electrical.push(true);
            }
            None => {
                components.push(part.to_string());
                electrical.push(false);
            }
        }
    }
    if components.is_empty() {
        return Err(BuildError::MalformedRow {
            line,
            reason: "no synapse components listed".to_string(),
        });
    }
    if electrical.iter().any(|&flag| flag != electrical[0]) {
        return Err(BuildError::MalformedRow {
            line,
            reason: "cannot mix chemical and electrical components in one row".to_string(),
        });
    }
    Ok((components, electrical[0]))
}

/// Weight/delay override keyed on component id and optional post population.
/// Rules are consulted in order; the first match per component wins.
#[derive(Debug, Clone, PartialEq)]
pub struct OverrideRule {
    /// Component this rule applies to, or the wildcard catch-all
    pub component: ComponentSelector,

    /// When set, the rule only applies to this exact postsynaptic
    /// population id
    pub post_population: Option<String>,

    pub weight: Option<f64>,
    pub delay_ms: Option<f64>,
}

/// Table-wide knobs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchOptions {
    /// Multiplier applied to every row's count before synthesis
    #[serde(default = "default_count_scaling")]
    pub count_scaling: f64,
}

fn default_count_scaling() -> f64 {
    1.0
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            count_scaling: default_count_scaling(),
        }
    }
}

/// Everything one orchestrator call produced. The segment-target cache is
/// not part of the outcome; it lives on in the [`BuildContext`].
#[derive(Debug, Default)]
pub struct BatchOutcome {
    /// Component ids used by at least one synthesized projection, deduped
    /// in first-use order
    pub synapse_components: Vec<String>,

    pub projections: Vec<Projection>,
    pub electrical_projections: Vec<ElectricalProjection>,
}

/// Apply a parsed table across all ordered pairs of non-empty populations.
///
/// Morphologies are looked up by each postsynaptic population's `component`
/// field; a missing morphology is `UnknownCellType`. The row's target group
/// is resolved against that morphology (presynaptic sites default to the
/// soma center). Rows that match no pair are reported at debug level.
pub fn apply_connectivity_table(
    ctx: &mut BuildContext,
    populations: &[Population],
    morphologies: &[CellMorphology],
    table: &ConnectivityTable,
    rules: &[OverrideRule],
    options: &BatchOptions,
) -> BuildResult<BatchOutcome> {
    if !options.count_scaling.is_finite() || options.count_scaling < 0.0 {
        return Err(BuildError::BadParameters(format!(
            "count_scaling {} must be finite and non-negative",
            options.count_scaling
        )));
    }

    let mut outcome = BatchOutcome::default();
    let mut row_matches = vec![0usize; table.rows.len()];

    for pre in populations {
        if pre.is_empty() {
            continue;
        }
        for post in populations {
            if post.is_empty() {
                continue;
            }
            for (row_index, row) in table.rows.iter().enumerate() {
                if !pre.id.contains(&row.pre_match) || !post.id.contains(&row.post_match) {
                    continue;
                }
                row_matches[row_index] += 1;

                let morphology = morphology_for(morphologies, &post.component)?;
                let post_targets = ctx.resolve_targets(
                    &post.component,
                    morphology,
                    std::slice::from_ref(&row.target_group),
                )?;
                let count = row.count * options.count_scaling;

                if row.electrical {
                    let result = targeted_electrical_projection(
                        ctx,
                        pre,
                        post,
                        &row.components,
                        count,
                        row.mode,
                        &[],
                        &post_targets,
                    )?;
                    if let Some(mut projections) = result {
                        record_components(&mut outcome.synapse_components, &row.components);
                        outcome.electrical_projections.append(&mut projections);
                    }
                } else {
                    let params = params_for(row, post, rules);
                    let result = targeted_projection(
                        ctx,
                        pre,
                        post,
                        &params,
                        count,
                        row.mode,
                        &[],
                        &post_targets,
                    )?;
                    if let Some(mut projections) = result {
                        record_components(&mut outcome.synapse_components, &row.components);
                        outcome.projections.append(&mut projections);
                    }
                }
            }
        }
    }

    for (row_index, matches) in row_matches.iter().enumerate() {
        if *matches == 0 {
            debug!(
                target: "connectogen-synthesis",
                "Connectivity row {} ('{}' -> '{}') matched no population pair",
                row_index + 1,
                table.rows[row_index].pre_match,
                table.rows[row_index].post_match
            );
        }
    }

    info!(
        target: "connectogen-synthesis",
        "Connectivity table applied: {} projections and {} electrical projections from {} rows",
        outcome.projections.len(),
        outcome.electrical_projections.len(),
        table.rows.len()
    );
    Ok(outcome)
}

fn morphology_for<'a>(
    morphologies: &'a [CellMorphology],
    cell_type: &str,
) -> BuildResult<&'a CellMorphology> {
    morphologies
        .iter()
        .find(|morphology| morphology.id == cell_type)
        .ok_or_else(|| BuildError::UnknownCellType(cell_type.to_string()))
}

/// Overlay override rules onto default params for one row and post
/// population. Rules filtered out by population keep their slot order for
/// the survivors, so first-match-wins is preserved.
fn params_for(row: &ConnectivityRow, post: &Population, rules: &[OverrideRule]) -> SynapseParams {
    let mut params = SynapseParams::with_defaults(row.components.clone());
    let applicable: Vec<&OverrideRule> = rules
        .iter()
        .filter(|rule| {
            rule.post_population
                .as_deref()
                .map_or(true, |id| id == post.id)
        })
        .collect();

    let weights: Vec<(ComponentSelector, f64)> = applicable
        .iter()
        .filter_map(|rule| rule.weight.map(|weight| (rule.component.clone(), weight)))
        .collect();
    if !weights.is_empty() {
        params.weights = ParamSpec::Keyed(weights);
    }

    let delays: Vec<(ComponentSelector, f64)> = applicable
        .iter()
        .filter_map(|rule| rule.delay_ms.map(|delay| (rule.component.clone(), delay)))
        .collect();
    if !delays.is_empty() {
        params.delays = ParamSpec::Keyed(delays);
    }
    params
}

fn record_components(seen: &mut Vec<String>, components: &[String]) {
    for component in components {
        if !seen.contains(component) {
            seen.push(component.clone());
        }
    }
}
