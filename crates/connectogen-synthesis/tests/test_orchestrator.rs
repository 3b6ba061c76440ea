// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*!
Batch Orchestrator Integration Tests

Drives the connectivity table across multiple populations, covering:
- Substring row matching and chemical/electrical dispatch
- TOML profile loading feeding override rules into synthesis
- Count scaling and the direction column
- Target group resolution through the per-cell-type cache
- Determinism of a whole table application
*/

use connectogen_synthesis::{
    apply_connectivity_table, BatchOptions, BuildContext, CellMorphology, ConnectivityProfile,
    ConnectivityTable, Population, Segment, SegmentGroup, SegmentPoint,
};

/// Helper for a soma plus dendrite morphology with named groups
fn stick_morphology(id: &str) -> CellMorphology {
    let soma = SegmentPoint {
        x: 0.0,
        y: 0.0,
        z: 0.0,
        diameter: 15.0,
    };
    CellMorphology::new(
        id.to_string(),
        vec![
            Segment {
                id: 0,
                name: Some("soma".to_string()),
                parent: None,
                proximal: Some(soma),
                distal: soma,
            },
            Segment {
                id: 1,
                name: Some("dend".to_string()),
                parent: Some(0),
                proximal: None,
                distal: SegmentPoint {
                    x: 0.0,
                    y: 120.0,
                    z: 0.0,
                    diameter: 2.0,
                },
            },
        ],
        vec![
            SegmentGroup {
                id: "soma_group".to_string(),
                members: vec![0],
                includes: vec![],
            },
            SegmentGroup {
                id: "dendrite_group".to_string(),
                members: vec![1],
                includes: vec![],
            },
        ],
    )
    .expect("Failed to build morphology")
}

fn population(id: &str, component: &str, size: usize) -> Population {
    Population::new(id.to_string(), component.to_string(), size)
        .expect("Failed to create population")
}

// ============================================================================
// TEST 1: Mixed Chemical and Electrical Table
// ============================================================================

#[test]
fn test_mixed_table_application() {
    let mut ctx = BuildContext::seeded(100);
    let populations = vec![
        population("exc_l2", "pyr", 8),
        population("inh_l2", "basket", 4),
    ];
    let morphologies = vec![stick_morphology("pyr"), stick_morphology("basket")];

    let table = ConnectivityTable::parse(
        "# layer 2 wiring\n\
         exc   inh   [ampa,nmda]   3   dendrite_group\n\
         inh   exc   gaba          2   soma_group\n\
         inh   inh   [elect:gj]    1   soma_group\n",
    )
    .expect("Failed to parse table");

    let outcome = apply_connectivity_table(
        &mut ctx,
        &populations,
        &morphologies,
        &table,
        &[],
        &BatchOptions::default(),
    )
    .expect("Failed to apply table");

    // ampa + nmda to inh (2 projections), gaba to exc (1), gj among inh (1)
    assert_eq!(outcome.projections.len(), 3);
    assert_eq!(outcome.electrical_projections.len(), 1);
    assert_eq!(
        outcome.synapse_components,
        vec!["ampa".to_string(), "nmda".to_string(), "gaba".to_string(), "gj".to_string()]
    );

    let ampa = &outcome.projections[0];
    assert_eq!(ampa.synapse, "ampa");
    assert_eq!(ampa.presynaptic, "exc_l2");
    assert_eq!(ampa.postsynaptic, "inh_l2");
    // 3 per post cell, 4 post cells
    assert_eq!(ampa.len(), 12);
    // Row targets the dendrite group; pre side defaults to the soma center
    assert!(ampa.connections.iter().all(|c| c.post_segment == 1));
    assert!(ampa
        .connections
        .iter()
        .all(|c| c.pre_segment == 0 && c.pre_fraction == 0.5));

    let gaba = &outcome.projections[2];
    assert_eq!(gaba.len(), 2 * 8);
    assert!(gaba.connections.iter().all(|c| c.post_segment == 0));

    let gj = &outcome.electrical_projections[0];
    assert_eq!(gj.len(), 4);
    assert!(gj.connections.iter().all(|c| c.pre_cell != c.post_cell));

    println!("✅ Test 1: Mixed table application - PASSED");
}

// ============================================================================
// TEST 2: Profile Rules Feed Synthesis
// ============================================================================

#[test]
fn test_profile_rules_feed_synthesis() {
    let profile = ConnectivityProfile::from_toml_str(
        r#"
        [options]
        count_scaling = 1.0

        [[rules]]
        component = "gaba"
        weight = -0.8
        delay_ms = 1.5

        [[rules]]
        component = "*"
        post_population = "inh"
        weight = 0.3

        [[rules]]
        component = "*"
        weight = 1.1
        delay_ms = 0.5
        "#,
    )
    .expect("Failed to parse profile");

    let mut ctx = BuildContext::seeded(8);
    let populations = vec![population("exc", "pyr", 6), population("inh", "basket", 3)];
    let morphologies = vec![stick_morphology("pyr"), stick_morphology("basket")];
    let table = ConnectivityTable::parse(
        "exc inh ampa 2 dendrite_group\n\
         inh exc gaba 2 soma_group\n\
         exc exc ampa 2 dendrite_group\n",
    )
    .expect("Failed to parse table");

    let outcome = apply_connectivity_table(
        &mut ctx,
        &populations,
        &morphologies,
        &table,
        &profile.rules,
        &profile.options,
    )
    .expect("Failed to apply table");

    for projection in &outcome.projections {
        let (expected_weight, expected_delay) = match projection.synapse.as_str() {
            // First rule wins for gaba everywhere
            "gaba" => (-0.8, 1.5),
            // Population-scoped wildcard beats the global one for inh
            "ampa" if projection.postsynaptic == "inh" => (0.3, 0.5),
            // Global wildcard catches the rest
            _ => (1.1, 0.5),
        };
        assert!(
            projection
                .connections
                .iter()
                .all(|c| c.weight == expected_weight && c.delay_ms == expected_delay),
            "Projection '{}' has wrong overrides",
            projection.id
        );
    }

    println!("✅ Test 2: Profile rules feed synthesis - PASSED");
}

// ============================================================================
// TEST 3: Count Scaling
// ============================================================================

#[test]
fn test_count_scaling() {
    let populations = vec![population("net", "pyr", 10)];
    let morphologies = vec![stick_morphology("pyr")];
    let table =
        ConnectivityTable::parse("net net ampa 4 soma_group").expect("Failed to parse table");

    let run = |scaling: f64| {
        let mut ctx = BuildContext::seeded(5);
        let options = BatchOptions {
            count_scaling: scaling,
        };
        apply_connectivity_table(&mut ctx, &populations, &morphologies, &table, &[], &options)
            .expect("Failed to apply table")
    };

    // 4 per cell at scale 1, 8 at scale 2, none at scale 0
    assert_eq!(run(1.0).projections[0].len(), 40);
    assert_eq!(run(2.0).projections[0].len(), 80);
    let zeroed = run(0.0);
    assert_eq!(zeroed.projections.len(), 1);
    assert!(zeroed.projections[0].is_empty());

    println!("✅ Test 3: Count scaling - PASSED");
}

// ============================================================================
// TEST 4: Direction Column
// ============================================================================

#[test]
fn test_direction_column() {
    let populations = vec![population("a_pop", "pyr", 12), population("b_pop", "pyr", 3)];
    let morphologies = vec![stick_morphology("pyr")];

    let run = |table_text: &str| {
        let mut ctx = BuildContext::seeded(21);
        let table = ConnectivityTable::parse(table_text).expect("Failed to parse table");
        apply_connectivity_table(
            &mut ctx,
            &populations,
            &morphologies,
            &table,
            &[],
            &BatchOptions::default(),
        )
        .expect("Failed to apply table")
    };

    // Convergent: 2 per post cell (3 posts). Divergent: 2 per pre cell (12 pres).
    assert_eq!(
        run("a_pop b_pop ampa 2 soma_group convergent").projections[0].len(),
        6
    );
    assert_eq!(
        run("a_pop b_pop ampa 2 soma_group divergent").projections[0].len(),
        24
    );
    assert_eq!(run("a_pop b_pop ampa 2 soma_group").projections[0].len(), 6);

    println!("✅ Test 4: Direction column - PASSED");
}

// ============================================================================
// TEST 5: Unmatched Rows Produce Nothing
// ============================================================================

#[test]
fn test_unmatched_rows() {
    let mut ctx = BuildContext::seeded(2);
    let populations = vec![population("exc", "pyr", 5)];
    let morphologies = vec![stick_morphology("pyr")];
    let table = ConnectivityTable::parse("thalamus cortex ampa 5 soma_group")
        .expect("Failed to parse table");

    let outcome = apply_connectivity_table(
        &mut ctx,
        &populations,
        &morphologies,
        &table,
        &[],
        &BatchOptions::default(),
    )
    .expect("Unmatched rows are not an error");

    assert!(outcome.projections.is_empty());
    assert!(outcome.electrical_projections.is_empty());
    assert!(outcome.synapse_components.is_empty());

    println!("✅ Test 5: Unmatched rows produce nothing - PASSED");
}

// ============================================================================
// TEST 6: Whole-Table Determinism
// ============================================================================

#[test]
fn test_whole_table_determinism() {
    let populations = vec![
        population("exc", "pyr", 15),
        population("inh", "basket", 6),
    ];
    let morphologies = vec![stick_morphology("pyr"), stick_morphology("basket")];
    let table = ConnectivityTable::parse(
        "exc inh ampa 2.5 dendrite_group\n\
         inh exc gaba 3 soma_group\n\
         exc exc [elect:gj] 1 soma_group\n",
    )
    .expect("Failed to parse table");

    let run = |seed: u64| {
        let mut ctx = BuildContext::seeded(seed);
        let outcome = apply_connectivity_table(
            &mut ctx,
            &populations,
            &morphologies,
            &table,
            &[],
            &BatchOptions::default(),
        )
        .expect("Failed to apply table");
        (
            serde_json::to_string(&outcome.projections).expect("Failed to serialize"),
            serde_json::to_string(&outcome.electrical_projections)
                .expect("Failed to serialize"),
        )
    };

    assert_eq!(run(77), run(77));
    assert_ne!(run(77).0, run(78).0);

    println!("✅ Test 6: Whole-table determinism - PASSED");
}
