use std::collections::{HashMap, HashSet};

use tracing::{debug, trace};

use super::types::{FamilyTree, NodeId, NodeRole, Point, UnionIndexEntry};
use crate::error::{FamilyTreeError, Result};

const GRID: f64 = 64.0;

/// Rounds to the 1/64 grid. Sums, doublings and halvings of grid values stay
/// exact, which keeps union midpoints exact.
pub(super) fn snap(value: f64) -> f64 {
    (value * GRID).round() / GRID
}

pub(super) fn snap_tree(tree: &mut FamilyTree) {
    let ids: Vec<NodeId> = tree.nodes().map(|(id, _)| id).collect();
    for id in ids {
        let node = tree.node_mut(id);
        node.x = snap(node.x);
        node.y = snap(node.y);
    }
}

/// Puts every marriage union exactly halfway between its two spouses.
///
/// Unions are visited bottom-up. The left spouse is mirrored around the
/// union; a spouse that an earlier union already placed stays put, in which
/// case the right spouse moves, and when both are placed the union moves to
/// their midpoint.
pub(super) fn recenter_unions(tree: &mut FamilyTree) {
    let mut placed: HashSet<NodeId> = HashSet::new();
    for id in tree.post_order() {
        let union = tree.node(id);
        if union.role != NodeRole::MarriageUnion {
            continue;
        }
        let (Some(spouse), Some(other)) = (union.spouse, union.other_spouse) else {
            continue;
        };
        let ux = union.x;
        let (left, right) = if tree.node(spouse).x <= tree.node(other).x {
            (spouse, other)
        } else {
            (other, spouse)
        };
        let (lx, rx) = (tree.node(left).x, tree.node(right).x);

        if !placed.contains(&left) {
            tree.node_mut(left).x = 2.0 * ux - rx;
        } else if !placed.contains(&right) {
            tree.node_mut(right).x = 2.0 * ux - lx;
        } else {
            tree.node_mut(id).x = (lx + rx) / 2.0;
        }
        trace!(union = %tree.node(id).id, x = tree.node(id).x, "recentered union");
        placed.insert(left);
        placed.insert(right);
    }
}

/// A union index entry resolved against the positioned tree.
#[derive(Debug, Clone)]
pub(super) struct AnchoredUnion {
    pub entry: UnionIndexEntry,
    pub source: Point,
    pub target: Point,
    pub union_id: String,
    pub union: Point,
}

pub(super) fn anchor_unions(tree: &FamilyTree, unions: &[UnionIndexEntry]) -> Result<Vec<AnchoredUnion>> {
    let index: HashMap<&str, NodeId> = tree
        .nodes()
        .filter(|(_, node)| node.role == NodeRole::Person)
        .map(|(id, node)| (node.id.as_str(), id))
        .collect();

    let mut anchored = Vec::with_capacity(unions.len());
    for entry in unions {
        let dangling = |missing: &str| FamilyTreeError::DanglingUnion {
            source_id: entry.source.clone(),
            target_id: entry.target.clone(),
            ordinal: entry.ordinal,
            missing: missing.to_string(),
        };
        let source = *index.get(entry.source.as_str()).ok_or_else(|| dangling(&entry.source))?;
        let target = *index.get(entry.target.as_str()).ok_or_else(|| dangling(&entry.target))?;
        let (source, target) = (tree.node(source), tree.node(target));

        let union = Some(entry.union)
            .filter(|id| tree.get(*id).is_some_and(|node| node.role == NodeRole::MarriageUnion))
            .or(source.marriage_node)
            .or(target.marriage_node)
            .ok_or_else(|| dangling("marriage union"))?;
        let union = tree.node(union);

        anchored.push(AnchoredUnion {
            entry: entry.clone(),
            source: Point::new(source.x, source.y),
            target: Point::new(target.x, target.y),
            union_id: union.id.clone(),
            union: Point::new(union.x, union.y),
        });
    }
    debug!(unions = anchored.len(), "anchored unions");
    Ok(anchored)
}
