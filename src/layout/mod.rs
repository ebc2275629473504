mod coords;
mod reconcile;
mod routing;
mod sizing;
mod sort;
mod text;
mod tidy;
pub(crate) mod types;

pub use reconcile::{Reconciled, reconcile};
pub use routing::{step_after, to_svg_path, union_row_y};
pub use sizing::{FixedMeasure, FontMeasure, MeasureScope, TextMeasure, compute_size};
pub use sort::{DefaultSorter, PersonSorter};
pub use text::{TextBlock, measure_label};
pub use tidy::{LayoutParams, TidyTree, TreeLayoutEngine};
pub use types::*;

use coords::AnchoredUnion;
use routing::UnionGeometry;
use tracing::debug;

use crate::config::LayoutConfig;
use crate::error::Result;
use crate::interact::Callbacks;
use crate::ir::PersonRecord;
use crate::theme::Theme;

/// Runs the whole pipeline with the built-in sorter, measurer and engine.
pub fn compute_layout(forest: &[PersonRecord], theme: &Theme, config: &LayoutConfig) -> Result<FamilyLayout> {
    compute_layout_with(forest, theme, config, &mut Callbacks::default())
}

/// Reconcile, size, lay out, then fix up unions and route every connector.
pub fn compute_layout_with(
    forest: &[PersonRecord],
    theme: &Theme,
    config: &LayoutConfig,
    callbacks: &mut Callbacks,
) -> Result<FamilyLayout> {
    let Reconciled { mut tree, unions } = reconcile(forest, callbacks.sorter.as_ref(), &config.styles)?;

    let (node_width, node_height) = match callbacks.measure.as_deref_mut() {
        Some(measure) => compute_size(&mut tree, config.node_width, config.node_height, measure)?,
        None => {
            let mut measure = FontMeasure::new(theme, config);
            compute_size(&mut tree, config.node_width, config.node_height, &mut measure)?
        }
    };

    let params = LayoutParams {
        dx: 2.0 * node_width,
        dy: config.row_spacing.unwrap_or(2.0 * node_height),
        hidden_separation: config.hidden_separation,
        visible_separation: config.visible_separation,
    };
    let links = callbacks.engine.layout(&mut tree, &params);
    coords::snap_tree(&mut tree);
    coords::recenter_unions(&mut tree);
    let anchored = coords::anchor_unions(&tree, &unions)?;

    let layout = assemble(&tree, &links, anchored, config, node_width, node_height);
    debug!(
        nodes = layout.nodes.len(),
        visible = layout.visible_nodes().count(),
        links = layout.links.len(),
        unions = layout.unions.len(),
        "family layout ready"
    );
    Ok(layout)
}

fn assemble(
    tree: &FamilyTree,
    links: &[(NodeId, NodeId)],
    anchored: Vec<AnchoredUnion>,
    config: &LayoutConfig,
    node_width: f64,
    node_height: f64,
) -> FamilyLayout {
    let nodes: Vec<NodeLayout> = tree
        .nodes()
        .map(|(_, node)| NodeLayout {
            id: node.id.clone(),
            name: node.name.clone(),
            role: node.role,
            x: node.x,
            y: node.y,
            width: node.c_width,
            height: node.c_height,
            hidden: node.hidden(),
            no_parent: node.no_parent,
            class_name: node.class_name.clone(),
            text_class: node.text_class.clone(),
            extra: node.extra.clone(),
        })
        .collect();

    let links: Vec<LinkLayout> = links
        .iter()
        .map(|(parent, child)| {
            let (source, target) = (tree.node(*parent), tree.node(*child));
            let suppressed = target.hidden() || target.no_parent;
            let points = if suppressed {
                routing::suppressed_points()
            } else {
                routing::elbow_points(
                    Point::new(source.x, source.y),
                    Point::new(target.x, target.y),
                    config.elbow_ratio,
                )
            };
            LinkLayout {
                source: source.id.clone(),
                target: target.id.clone(),
                points,
                suppressed,
            }
        })
        .collect();

    let geometry = UnionGeometry {
        node_width,
        node_height,
        offset_ratio: config.union_offset_ratio,
        stack_ratio: config.union_stack_ratio,
    };
    let unions: Vec<UnionLayout> = anchored
        .into_iter()
        .map(|anchored| UnionLayout {
            points: routing::union_points(
                anchored.source,
                anchored.target,
                anchored.union,
                anchored.entry.ordinal,
                &geometry,
            ),
            source: anchored.entry.source,
            target: anchored.entry.target,
            ordinal: anchored.entry.ordinal,
            union: anchored.union_id,
            source_point: anchored.source,
            target_point: anchored.target,
            union_point: anchored.union,
            divorced: anchored.entry.divorced,
        })
        .collect();

    let bounds = content_bounds(&nodes, &links, &unions);
    FamilyLayout {
        nodes,
        links,
        unions,
        node_width,
        node_height,
        bounds,
    }
}

fn content_bounds(nodes: &[NodeLayout], links: &[LinkLayout], unions: &[UnionLayout]) -> Bounds {
    let mut bounds: Option<Bounds> = None;
    let mut include = |min_x: f64, min_y: f64, max_x: f64, max_y: f64| {
        let b = bounds.get_or_insert(Bounds {
            min_x,
            min_y,
            max_x,
            max_y,
        });
        b.min_x = b.min_x.min(min_x);
        b.min_y = b.min_y.min(min_y);
        b.max_x = b.max_x.max(max_x);
        b.max_y = b.max_y.max(max_y);
    };
    for node in nodes.iter().filter(|node| !node.hidden) {
        include(
            node.x - node.width / 2.0,
            node.y - node.height / 2.0,
            node.x + node.width / 2.0,
            node.y + node.height / 2.0,
        );
    }
    let drawn_links = links.iter().filter(|link| !link.suppressed).map(|link| &link.points);
    for points in drawn_links.chain(unions.iter().map(|union| &union.points)) {
        for point in points {
            include(point.x, point.y, point.x, point.y);
        }
    }
    bounds.unwrap_or(Bounds {
        min_x: 0.0,
        min_y: 0.0,
        max_x: 0.0,
        max_y: 0.0,
    })
}
