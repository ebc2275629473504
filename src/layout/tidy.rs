use tracing::trace;

use super::types::{FamilyTree, NodeId, NodeRole};

/// Spacing and separation handed to a [`TreeLayoutEngine`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutParams {
    /// Horizontal unit; separations are multiples of it.
    pub dx: f64,
    /// Distance between generations.
    pub dy: f64,
    pub hidden_separation: f64,
    pub visible_separation: f64,
}

impl LayoutParams {
    fn separation(&self, a_hidden: bool, b_hidden: bool) -> f64 {
        if a_hidden || b_hidden {
            self.hidden_separation
        } else {
            self.visible_separation
        }
    }
}

/// Assigns raw `(x, y)` to every node of a reconciled tree.
///
/// Returns the parent to child pairs the engine actually laid out, which is
/// what lineage links are drawn from.
pub trait TreeLayoutEngine {
    fn layout(&self, tree: &mut FamilyTree, params: &LayoutParams) -> Vec<(NodeId, NodeId)>;
}

/// Linear-time tidy tree (Buchheim, Jünger and Leipert's take on Walker).
///
/// In-law junctions are laid out as if their children belonged to the
/// junction's parent, so they never add a generation. The junction itself is
/// placed at the midpoint of its children afterwards.
#[derive(Debug, Clone, Copy, Default)]
pub struct TidyTree;

impl TreeLayoutEngine for TidyTree {
    fn layout(&self, tree: &mut FamilyTree, params: &LayoutParams) -> Vec<(NodeId, NodeId)> {
        let mut walk = Walk::build(tree, *params);
        walk.run();

        let mut links = Vec::with_capacity(walk.nodes.len());
        for w in walk.nodes.iter().skip(1) {
            let node = tree.node_mut(w.node);
            node.x = w.x * params.dx;
            node.y = w.depth as f64 * params.dy;
            if let Some(parent) = w.parent.filter(|p| *p != VIRTUAL) {
                links.push((walk.nodes[parent].node, w.node));
            }
        }

        place_junctions(tree, params.dy);
        trace!(nodes = walk.nodes.len() - 1, links = links.len(), "tidy tree placed");
        links
    }
}

/// Children of `id` as the layout sees them, with junctions spliced open.
pub(super) fn layout_children(tree: &FamilyTree, id: NodeId) -> Vec<NodeId> {
    let mut out = Vec::new();
    for child in &tree.node(id).children {
        if tree.node(*child).role == NodeRole::InLawJunction {
            out.extend(layout_children(tree, *child));
        } else {
            out.push(*child);
        }
    }
    out
}

fn place_junctions(tree: &mut FamilyTree, dy: f64) {
    for id in tree.post_order() {
        if tree.node(id).role != NodeRole::InLawJunction {
            continue;
        }
        let children = tree.node(id).children.clone();
        let (x, y) = match (children.first(), children.last()) {
            (Some(first), Some(last)) => {
                let (first, last) = (tree.node(*first), tree.node(*last));
                ((first.x + last.x) / 2.0, first.y)
            }
            _ => match tree.node(id).parent {
                Some(parent) => (tree.node(parent).x, tree.node(parent).y + dy),
                None => (0.0, 0.0),
            },
        };
        let junction = tree.node_mut(id);
        junction.x = x;
        junction.y = y;
    }
}

const VIRTUAL: usize = 0;

struct Walker {
    node: NodeId,
    hidden: bool,
    depth: usize,
    parent: Option<usize>,
    children: Vec<usize>,
    /// Position among siblings.
    index: usize,
    ancestor: usize,
    /// Default ancestor handed down while apportioning this node's children.
    default_ancestor: Option<usize>,
    prelim: f64,
    modifier: f64,
    change: f64,
    shift: f64,
    thread: Option<usize>,
    x: f64,
}

impl Walker {
    fn new(node: NodeId, hidden: bool, depth: usize, parent: Option<usize>, index: usize, own: usize) -> Self {
        Self {
            node,
            hidden,
            depth,
            parent,
            children: Vec::new(),
            index,
            ancestor: own,
            default_ancestor: None,
            prelim: 0.0,
            modifier: 0.0,
            change: 0.0,
            shift: 0.0,
            thread: None,
            x: 0.0,
        }
    }
}

struct Walk {
    nodes: Vec<Walker>,
    params: LayoutParams,
    /// Real nodes in pre-order.
    order: Vec<usize>,
}

impl Walk {
    fn build(tree: &FamilyTree, params: LayoutParams) -> Self {
        let root = tree.root();
        let mut nodes = vec![
            Walker::new(root, true, 0, None, 0, VIRTUAL),
            Walker::new(root, tree.node(root).hidden(), 0, Some(VIRTUAL), 0, 1),
        ];
        nodes[VIRTUAL].children.push(1);

        let mut order = Vec::with_capacity(tree.len());
        let mut stack = vec![1];
        while let Some(w) = stack.pop() {
            order.push(w);
            let node = nodes[w].node;
            let depth = nodes[w].depth;
            let mut kids = Vec::new();
            for (index, child) in layout_children(tree, node).into_iter().enumerate() {
                let own = nodes.len();
                nodes.push(Walker::new(child, tree.node(child).hidden(), depth + 1, Some(w), index, own));
                kids.push(own);
            }
            stack.extend(kids.iter().rev());
            nodes[w].children = kids;
        }

        Self { nodes, params, order }
    }

    fn run(&mut self) {
        // The first walk reads each left sibling's finished contour, so
        // children go left to right and before their parent.
        for w in self.post_order() {
            self.first_walk(w);
        }
        self.nodes[VIRTUAL].modifier = -self.nodes[1].prelim;
        let order = std::mem::take(&mut self.order);
        for w in &order {
            self.second_walk(*w);
        }
        self.order = order;
    }

    fn post_order(&self) -> Vec<usize> {
        let mut out = Vec::with_capacity(self.order.len());
        let mut stack = vec![(1, false)];
        while let Some((w, expanded)) = stack.pop() {
            if expanded {
                out.push(w);
                continue;
            }
            stack.push((w, true));
            stack.extend(self.nodes[w].children.iter().rev().map(|child| (*child, false)));
        }
        out
    }

    fn separation(&self, a: usize, b: usize) -> f64 {
        self.params.separation(self.nodes[a].hidden, self.nodes[b].hidden)
    }

    fn first_walk(&mut self, v: usize) {
        let Some(parent) = self.nodes[v].parent else {
            return;
        };
        let index = self.nodes[v].index;
        let left_sibling = (index > 0).then(|| self.nodes[parent].children[index - 1]);

        if let (Some(&first), Some(&last)) = (self.nodes[v].children.first(), self.nodes[v].children.last()) {
            self.execute_shifts(v);
            let midpoint = (self.nodes[first].prelim + self.nodes[last].prelim) / 2.0;
            match left_sibling {
                Some(w) => {
                    self.nodes[v].prelim = self.nodes[w].prelim + self.separation(v, w);
                    self.nodes[v].modifier = self.nodes[v].prelim - midpoint;
                }
                None => self.nodes[v].prelim = midpoint,
            }
        } else if let Some(w) = left_sibling {
            self.nodes[v].prelim = self.nodes[w].prelim + self.separation(v, w);
        }

        let default_ancestor = self.nodes[parent]
            .default_ancestor
            .unwrap_or(self.nodes[parent].children[0]);
        let ancestor = self.apportion(v, parent, left_sibling, default_ancestor);
        self.nodes[parent].default_ancestor = Some(ancestor);
    }

    fn second_walk(&mut self, v: usize) {
        let Some(parent) = self.nodes[v].parent else {
            return;
        };
        let parent_modifier = self.nodes[parent].modifier;
        let node = &mut self.nodes[v];
        node.x = node.prelim + parent_modifier;
        node.modifier += parent_modifier;
    }

    fn apportion(&mut self, v: usize, parent: usize, left_sibling: Option<usize>, mut ancestor: usize) -> usize {
        let Some(w) = left_sibling else {
            return ancestor;
        };
        // Inner/outer contours on the right (p) and left (m) side.
        let mut vop = v;
        let mut vom = self.nodes[parent].children[0];
        let mut sip = self.nodes[v].modifier;
        let mut sop = self.nodes[v].modifier;
        let mut sim = self.nodes[w].modifier;
        let mut som = self.nodes[vom].modifier;

        let mut vim = self.next_right(w);
        let mut vip = self.next_left(v);
        while let (Some(im), Some(ip)) = (vim, vip) {
            let (Some(om), Some(op)) = (self.next_left(vom), self.next_right(vop)) else {
                break;
            };
            vom = om;
            vop = op;
            self.nodes[vop].ancestor = v;
            let shift = self.nodes[im].prelim + sim - self.nodes[ip].prelim - sip + self.separation(im, ip);
            if shift > 0.0 {
                let moved = self.next_ancestor(im, v, ancestor);
                self.move_subtree(moved, v, shift);
                sip += shift;
                sop += shift;
            }
            sim += self.nodes[im].modifier;
            sip += self.nodes[ip].modifier;
            som += self.nodes[vom].modifier;
            sop += self.nodes[vop].modifier;
            vim = self.next_right(im);
            vip = self.next_left(ip);
        }

        if let Some(im) = vim {
            if self.next_right(vop).is_none() {
                self.nodes[vop].thread = Some(im);
                self.nodes[vop].modifier += sim - sop;
            }
        }
        if let Some(ip) = vip {
            if self.next_left(vom).is_none() {
                self.nodes[vom].thread = Some(ip);
                self.nodes[vom].modifier += sip - som;
                ancestor = v;
            }
        }
        ancestor
    }

    fn next_left(&self, v: usize) -> Option<usize> {
        self.nodes[v].children.first().copied().or(self.nodes[v].thread)
    }

    fn next_right(&self, v: usize) -> Option<usize> {
        self.nodes[v].children.last().copied().or(self.nodes[v].thread)
    }

    fn next_ancestor(&self, vim: usize, v: usize, ancestor: usize) -> usize {
        let candidate = self.nodes[vim].ancestor;
        if self.nodes[candidate].parent == self.nodes[v].parent {
            candidate
        } else {
            ancestor
        }
    }

    fn move_subtree(&mut self, wm: usize, wp: usize, shift: f64) {
        let span = self.nodes[wp].index.saturating_sub(self.nodes[wm].index).max(1) as f64;
        let change = shift / span;
        self.nodes[wp].change -= change;
        self.nodes[wp].shift += shift;
        self.nodes[wm].change += change;
        self.nodes[wp].prelim += shift;
        self.nodes[wp].modifier += shift;
    }

    fn execute_shifts(&mut self, v: usize) {
        let mut shift = 0.0;
        let mut change = 0.0;
        let children = self.nodes[v].children.clone();
        for w in children.into_iter().rev() {
            let node = &mut self.nodes[w];
            node.prelim += shift;
            node.modifier += shift;
            change += node.change;
            shift += node.shift + change;
        }
    }
}
