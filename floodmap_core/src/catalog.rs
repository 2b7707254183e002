// Copyright 2026 the Floodmap Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The static layer catalog and its naming convention.
//!
//! The catalog is a pure description of every layer and group the viewer can
//! show: a handful of always-available background vector layers and the full
//! scenario grid of pre-computed flood rasters, expanded programmatically
//! from climate × maintenance × parameter × return period.
//!
//! [`build_catalog`] produces the tree once at startup as an immutable
//! value. Nothing in this crate mutates it afterwards; all tree "mutations"
//! are path-copied snapshots derived from it (see [`crate::layer`]).
//!
//! # Naming convention
//!
//! Scenario leaf ids double as the map server's layer names:
//!
//! ```text
//! t3_{returnPeriod}yrs_{climate}_{maintenance}_{parameter}
//! ```
//!
//! all lowercase, underscore-joined, e.g. `t3_50yrs_present_breaches_maxdepth`.
//! [`scenario_layer_name`] is the only place this pattern is spelled out; the
//! scenario matrix builds ids through the same function, since matrix
//! correctness depends on string equality with catalog ids, not on
//! structural lookup.

use alloc::collections::BTreeSet;
use alloc::format;
use alloc::string::{String, ToString};
use alloc::sync::Arc;
use alloc::vec;
use alloc::vec::Vec;

use crate::layer::{GroupNode, LayerKind, LayerNode, LeafNode};

/// Climate scenario under which the simulations were run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Climate {
    /// Present-day climate.
    Present,
    /// Projected future climate.
    Future,
}

impl Climate {
    /// All climates, in display order.
    pub const ALL: [Self; 2] = [Self::Present, Self::Future];

    /// Lowercase token used in layer names.
    #[must_use]
    pub const fn token(self) -> &'static str {
        match self {
            Self::Present => "present",
            Self::Future => "future",
        }
    }

    /// Human-readable label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Present => "Present climate",
            Self::Future => "Future climate",
        }
    }
}

/// Dike maintenance assumption of a simulation run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Maintenance {
    /// Dikes breach at their assessed weak points.
    Breaches,
    /// Perfectly maintained dikes, no breaching.
    Perfect,
    /// Reduced discharge capacity of the drainage system.
    RedCapacity,
}

impl Maintenance {
    /// All maintenance levels, in display order.
    pub const ALL: [Self; 3] = [Self::Breaches, Self::Perfect, Self::RedCapacity];

    /// Lowercase token used in layer names.
    #[must_use]
    pub const fn token(self) -> &'static str {
        match self {
            Self::Breaches => "breaches",
            Self::Perfect => "perfect",
            Self::RedCapacity => "redcapacity",
        }
    }

    /// Human-readable label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Breaches => "With breaches",
            Self::Perfect => "Perfect maintenance",
            Self::RedCapacity => "Reduced capacity",
        }
    }
}

/// Simulated quantity shown by a scenario raster.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Parameter {
    /// Maximum inundation depth.
    MaxDepth,
    /// Maximum flow speed.
    MaxSpeed,
    /// Time until water arrival.
    ArrivalTime,
}

impl Parameter {
    /// All parameters, in display order.
    pub const ALL: [Self; 3] = [Self::MaxDepth, Self::MaxSpeed, Self::ArrivalTime];

    /// Lowercase token used in layer names.
    #[must_use]
    pub const fn token(self) -> &'static str {
        match self {
            Self::MaxDepth => "maxdepth",
            Self::MaxSpeed => "maxspeed",
            Self::ArrivalTime => "arrivaltime",
        }
    }

    /// Human-readable label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::MaxDepth => "Max depth",
            Self::MaxSpeed => "Max speed",
            Self::ArrivalTime => "Arrival time",
        }
    }
}

/// Return periods (in years) of the simulated events, in display order.
pub const RETURN_PERIODS: [u16; 5] = [10, 25, 50, 100, 1000];

/// Default opacity for scenario rasters.
pub const DEFAULT_RASTER_OPACITY: f32 = 0.8;

/// Builds the scenario layer name, which is also the leaf's id and its
/// map-server layer name.
#[must_use]
pub fn scenario_layer_name(
    return_period: u16,
    climate: Climate,
    maintenance: Maintenance,
    parameter: Parameter,
) -> String {
    format!(
        "t3_{return_period}yrs_{}_{}_{}",
        climate.token(),
        maintenance.token(),
        parameter.token()
    )
}

/// Builds the immutable catalog tree.
///
/// The root group holds a background group of vector layers (visible by
/// default) and one group per climate, each holding one group per
/// maintenance level with the full return-period × parameter raster grid
/// (hidden by default). Group and leaf ids share one namespace; uniqueness
/// is checked with a debug assertion.
#[must_use]
pub fn build_catalog() -> Arc<LayerNode> {
    let mut top: Vec<Arc<LayerNode>> = vec![background_group()];
    for climate in Climate::ALL {
        top.push(climate_group(climate));
    }

    let tree = Arc::new(LayerNode::Group(GroupNode {
        id: "root".to_string(),
        name: "Flood layers".to_string(),
        // Background layers are on by default.
        visible: true,
        expanded: true,
        children: top,
    }));

    debug_assert!(ids_are_unique(&tree), "catalog ids must be unique");
    tree
}

/// Returns the ids of leaves visible in a freshly built catalog.
#[must_use]
pub fn initial_visible(catalog: &LayerNode) -> BTreeSet<String> {
    let mut out = BTreeSet::new();
    collect_visible(catalog, &mut out);
    out
}

fn collect_visible(node: &LayerNode, out: &mut BTreeSet<String>) {
    match node {
        LayerNode::Leaf(l) => {
            if l.visible {
                out.insert(l.id.clone());
            }
        }
        LayerNode::Group(g) => {
            for child in &g.children {
                collect_visible(child, out);
            }
        }
    }
}

fn background_group() -> Arc<LayerNode> {
    let children = vec![
        vector_leaf(
            "bg_area",
            "Area of interest",
            LayerKind::VectorPolygon,
            "t3_area_of_interest",
            0.4,
        ),
        vector_leaf(
            "bg_dikes",
            "Dike rings",
            LayerKind::VectorLine,
            "t3_dike_rings",
            1.0,
        ),
        vector_leaf(
            "bg_breaches",
            "Breach locations",
            LayerKind::VectorPoint,
            "t3_breach_locations",
            1.0,
        ),
    ];
    Arc::new(LayerNode::Group(GroupNode {
        id: "grp_background".to_string(),
        name: "Background".to_string(),
        visible: true,
        expanded: true,
        children,
    }))
}

fn vector_leaf(
    id: &str,
    name: &str,
    kind: LayerKind,
    source_ref: &str,
    opacity: f32,
) -> Arc<LayerNode> {
    Arc::new(LayerNode::Leaf(LeafNode {
        id: id.to_string(),
        name: name.to_string(),
        visible: true,
        opacity,
        kind,
        source_ref: source_ref.to_string(),
    }))
}

fn climate_group(climate: Climate) -> Arc<LayerNode> {
    let mut children = Vec::with_capacity(Maintenance::ALL.len());
    for maintenance in Maintenance::ALL {
        children.push(maintenance_group(climate, maintenance));
    }
    Arc::new(LayerNode::Group(GroupNode {
        id: format!("grp_{}", climate.token()),
        name: climate.label().to_string(),
        visible: false,
        expanded: false,
        children,
    }))
}

fn maintenance_group(climate: Climate, maintenance: Maintenance) -> Arc<LayerNode> {
    let mut children = Vec::with_capacity(Parameter::ALL.len() * RETURN_PERIODS.len());
    for parameter in Parameter::ALL {
        for return_period in RETURN_PERIODS {
            let name = scenario_layer_name(return_period, climate, maintenance, parameter);
            children.push(Arc::new(LayerNode::Leaf(LeafNode {
                id: name.clone(),
                name: format!("{} ({return_period} yr)", parameter.label()),
                visible: false,
                opacity: DEFAULT_RASTER_OPACITY,
                kind: LayerKind::Raster,
                source_ref: name,
            })));
        }
    }
    Arc::new(LayerNode::Group(GroupNode {
        id: format!("grp_{}_{}", climate.token(), maintenance.token()),
        name: maintenance.label().to_string(),
        visible: false,
        expanded: false,
        children,
    }))
}

/// Checks id uniqueness across the entire tree (groups and leaves share one
/// namespace).
fn ids_are_unique(tree: &LayerNode) -> bool {
    fn walk(node: &LayerNode, seen: &mut BTreeSet<String>) -> bool {
        if !seen.insert(node.id().to_string()) {
            return false;
        }
        match node {
            LayerNode::Leaf(_) => true,
            LayerNode::Group(g) => g.children.iter().all(|c| walk(c, seen)),
        }
    }
    walk(tree, &mut BTreeSet::new())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layer::{find_node, visibility_is_derived};

    #[test]
    fn naming_convention_matches_server_pattern() {
        assert_eq!(
            scenario_layer_name(50, Climate::Present, Maintenance::Breaches, Parameter::MaxDepth),
            "t3_50yrs_present_breaches_maxdepth"
        );
        assert_eq!(
            scenario_layer_name(
                1000,
                Climate::Future,
                Maintenance::RedCapacity,
                Parameter::ArrivalTime
            ),
            "t3_1000yrs_future_redcapacity_arrivaltime"
        );
    }

    #[test]
    fn catalog_ids_are_unique() {
        let catalog = build_catalog();
        assert!(ids_are_unique(&catalog), "group and leaf ids share one namespace");
    }

    #[test]
    fn catalog_visibility_is_derived_everywhere() {
        let catalog = build_catalog();
        assert!(visibility_is_derived(&catalog));
    }

    #[test]
    fn scenario_leaves_exist_for_whole_grid() {
        let catalog = build_catalog();
        for climate in Climate::ALL {
            for maintenance in Maintenance::ALL {
                for parameter in Parameter::ALL {
                    for rp in RETURN_PERIODS {
                        let id = scenario_layer_name(rp, climate, maintenance, parameter);
                        let node = find_node(&catalog, &id)
                            .unwrap_or_else(|| panic!("missing leaf {id}"));
                        assert!(node.is_leaf());
                        assert!(!node.visible());
                    }
                }
            }
        }
    }

    #[test]
    fn initial_visible_is_background_only() {
        let catalog = build_catalog();
        let visible = initial_visible(&catalog);
        let expected: BTreeSet<String> = ["bg_area", "bg_dikes", "bg_breaches"]
            .into_iter()
            .map(ToString::to_string)
            .collect();
        assert_eq!(visible, expected);
    }

    #[test]
    fn root_is_expanded_and_visible() {
        let catalog = build_catalog();
        let root = catalog.as_group().expect("root is a group");
        assert!(root.expanded);
        assert!(root.visible);
    }
}
