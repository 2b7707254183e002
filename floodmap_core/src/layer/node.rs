// Copyright 2026 the Floodmap Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Layer node types.

use alloc::string::String;
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::fmt;

/// Geometry class of a leaf layer.
///
/// The kind determines the layer's draw-order band: rasters at the bottom,
/// then polygons, lines, and points on top. The band depends on the kind
/// alone, never on list position, so reordering the visible list does not
/// churn stacking values.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LayerKind {
    /// Server-rendered raster imagery (flood depth grids and the like).
    Raster,
    /// Filled vector areas (dike rings, regions of interest).
    VectorPolygon,
    /// Vector polylines (dikes, channels).
    VectorLine,
    /// Vector point markers (breach locations).
    VectorPoint,
}

impl LayerKind {
    /// Returns the draw-order band for this kind.
    ///
    /// Higher values draw on top: raster < polygon < line < point.
    #[must_use]
    pub const fn stacking(self) -> u16 {
        match self {
            Self::Raster => 100,
            Self::VectorPolygon => 200,
            Self::VectorLine => 300,
            Self::VectorPoint => 400,
        }
    }
}

/// A grouping node with derived visibility and an ordered child list.
#[derive(Clone, Debug, PartialEq)]
pub struct GroupNode {
    /// Unique id, shared namespace with leaves.
    pub id: String,
    /// Display label.
    pub name: String,
    /// Derived flag: true iff any descendant leaf is visible.
    pub visible: bool,
    /// UI-only disclosure state; never gates visibility logic.
    pub expanded: bool,
    /// Children in display order.
    pub children: Vec<Arc<LayerNode>>,
}

/// A terminal node representing one renderable map layer.
#[derive(Clone, Debug, PartialEq)]
pub struct LeafNode {
    /// Unique id, shared namespace with groups.
    pub id: String,
    /// Display label.
    pub name: String,
    /// Whether this layer is currently shown.
    pub visible: bool,
    /// Catalog default opacity in `[0, 1]`.
    pub opacity: f32,
    /// Geometry class, drives render stacking.
    pub kind: LayerKind,
    /// Opaque reference resolved by the render backend into a fetchable
    /// resource. Not interpreted by the core.
    pub source_ref: String,
}

/// A node in the layer tree: either a group or a leaf.
#[derive(Clone, PartialEq)]
pub enum LayerNode {
    /// An aggregating node.
    Group(GroupNode),
    /// A renderable layer.
    Leaf(LeafNode),
}

impl LayerNode {
    /// Returns the node's id.
    #[must_use]
    pub fn id(&self) -> &str {
        match self {
            Self::Group(g) => &g.id,
            Self::Leaf(l) => &l.id,
        }
    }

    /// Returns the node's display label.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Group(g) => &g.name,
            Self::Leaf(l) => &l.name,
        }
    }

    /// Returns the node's visibility flag.
    ///
    /// For groups this is the derived any-descendant-leaf-visible flag.
    #[must_use]
    pub fn visible(&self) -> bool {
        match self {
            Self::Group(g) => g.visible,
            Self::Leaf(l) => l.visible,
        }
    }

    /// Returns the group payload, if this is a group.
    #[must_use]
    pub fn as_group(&self) -> Option<&GroupNode> {
        match self {
            Self::Group(g) => Some(g),
            Self::Leaf(_) => None,
        }
    }

    /// Returns the leaf payload, if this is a leaf.
    #[must_use]
    pub fn as_leaf(&self) -> Option<&LeafNode> {
        match self {
            Self::Group(_) => None,
            Self::Leaf(l) => Some(l),
        }
    }

    /// Returns `true` if this node is a leaf.
    #[must_use]
    pub fn is_leaf(&self) -> bool {
        matches!(self, Self::Leaf(_))
    }
}

impl fmt::Debug for LayerNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Group(g) => write!(
                f,
                "Group({:?}, visible={}, children={})",
                g.id,
                g.visible,
                g.children.len()
            ),
            Self::Leaf(l) => write!(f, "Leaf({:?}, visible={})", l.id, l.visible),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stacking_is_a_total_order_over_kinds() {
        assert!(LayerKind::Raster.stacking() < LayerKind::VectorPolygon.stacking());
        assert!(LayerKind::VectorPolygon.stacking() < LayerKind::VectorLine.stacking());
        assert!(LayerKind::VectorLine.stacking() < LayerKind::VectorPoint.stacking());
    }

    #[test]
    fn accessors_cover_both_variants() {
        use alloc::string::ToString;

        let leaf = LayerNode::Leaf(LeafNode {
            id: "l".to_string(),
            name: "Leaf".to_string(),
            visible: true,
            opacity: 0.8,
            kind: LayerKind::Raster,
            source_ref: "src".to_string(),
        });
        assert_eq!(leaf.id(), "l");
        assert!(leaf.is_leaf());
        assert!(leaf.as_group().is_none());

        let group = LayerNode::Group(GroupNode {
            id: "g".to_string(),
            name: "Group".to_string(),
            visible: false,
            expanded: true,
            children: Vec::new(),
        });
        assert_eq!(group.name(), "Group");
        assert!(!group.visible());
        assert!(group.as_leaf().is_none());
    }
}
