use tracing::debug;

use super::text::measure_label;
use super::types::{FamilyTree, NodeId, TreeNode};
use crate::config::LayoutConfig;
use crate::error::{FamilyTreeError, Result, describe_person};
use crate::theme::Theme;

/// Reports the rendered height of a node's content.
///
/// `open` and `close` bracket one sizing pass; `close` runs even when a
/// measurement fails.
pub trait TextMeasure {
    fn open(&mut self) -> Result<()> {
        Ok(())
    }

    fn measure(&mut self, node: &TreeNode, width: f64) -> Result<f32>;

    fn close(&mut self) {}
}

/// Wraps the node name to the node width with real font metrics.
#[derive(Debug, Clone)]
pub struct FontMeasure {
    theme: Theme,
    config: LayoutConfig,
}

impl FontMeasure {
    pub fn new(theme: &Theme, config: &LayoutConfig) -> Self {
        Self {
            theme: theme.clone(),
            config: config.clone(),
        }
    }
}

impl TextMeasure for FontMeasure {
    fn measure(&mut self, node: &TreeNode, width: f64) -> Result<f32> {
        let block = measure_label(&node.name, width, &self.theme, &self.config);
        Ok(block.height + 2.0 * self.config.node_padding_y)
    }
}

/// Every node measures the same.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedMeasure(pub f32);

impl TextMeasure for FixedMeasure {
    fn measure(&mut self, _node: &TreeNode, _width: f64) -> Result<f32> {
        Ok(self.0)
    }
}

/// An open measurement pass. Dropping it closes the pass.
pub struct MeasureScope<'a> {
    inner: &'a mut dyn TextMeasure,
}

impl<'a> MeasureScope<'a> {
    pub fn open(inner: &'a mut dyn TextMeasure) -> Result<Self> {
        inner.open()?;
        Ok(Self { inner })
    }

    pub fn measure(&mut self, node: &TreeNode, width: f64) -> Result<f32> {
        self.inner.measure(node, width)
    }
}

impl Drop for MeasureScope<'_> {
    fn drop(&mut self) {
        self.inner.close();
    }
}

/// Sizes every node of the tree and returns `(width, max_height)`.
///
/// All visible nodes share one box: the nominal width and the tallest
/// measured height (never below the nominal height). Hidden nodes are 0 x 0.
/// Running it twice on the same tree gives the same result.
pub fn compute_size(
    tree: &mut FamilyTree,
    nominal_width: f64,
    nominal_height: f64,
    measure: &mut dyn TextMeasure,
) -> Result<(f64, f64)> {
    let visible: Vec<NodeId> = tree
        .nodes()
        .filter(|(_, node)| !node.hidden())
        .map(|(id, _)| id)
        .collect();

    let mut max_height = nominal_height;
    {
        let mut scope = MeasureScope::open(measure)?;
        for id in &visible {
            let node = tree.node(*id);
            let height = scope.measure(node, nominal_width)?;
            if !height.is_finite() || height < 0.0 {
                return Err(FamilyTreeError::Measurement {
                    node: describe_person(Some(&node.id), &node.name),
                    message: format!("measured height {height} is not a finite, non-negative number"),
                });
            }
            max_height = max_height.max(f64::from(height));
        }
    }

    let ids: Vec<NodeId> = tree.nodes().map(|(id, _)| id).collect();
    for id in ids {
        let node = tree.node_mut(id);
        if node.hidden() {
            node.c_width = 0.0;
            node.c_height = 0.0;
        } else {
            node.c_width = nominal_width;
            node.c_height = max_height;
        }
    }
    debug!(visible = visible.len(), width = nominal_width, height = max_height, "sized nodes");
    Ok((nominal_width, max_height))
}
