use serde::Serialize;

/// Index of a node in a [`FamilyTree`] arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct NodeId(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum NodeRole {
    /// The single synthetic super-root.
    Root,
    Person,
    MarriageUnion,
    InLawJunction,
}

impl NodeRole {
    pub fn is_hidden(self) -> bool {
        self != NodeRole::Person
    }
}

/// How a person node is currently filed in the tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Placement {
    /// Child of the super-root, no known parents.
    Root,
    /// Child of a person or of a marriage union.
    Lineage,
    /// Placed next to a marriage union as the in-marrying partner.
    Spouse,
}

#[derive(Debug, Clone)]
pub struct TreeNode {
    pub id: String,
    pub name: String,
    pub role: NodeRole,
    pub placement: Placement,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
    pub no_parent: bool,
    pub divorced: bool,
    pub class_name: String,
    pub text_class: String,
    pub extra: Option<serde_json::Value>,
    pub age: Option<f64>,
    /// Latest spouse married by this person.
    pub spouse_node: Option<NodeId>,
    /// Latest union this person entered as the in-marrying partner.
    pub marriage_node: Option<NodeId>,
    /// Union only: the person whose record declared the marriage.
    pub spouse: Option<NodeId>,
    /// Union only: the partner named in the marriage record.
    pub other_spouse: Option<NodeId>,
    pub x: f64,
    pub y: f64,
    pub c_width: f64,
    pub c_height: f64,
}

impl TreeNode {
    pub(crate) fn new(id: String, name: String, role: NodeRole) -> Self {
        Self {
            id,
            name,
            role,
            placement: Placement::Lineage,
            parent: None,
            children: Vec::new(),
            no_parent: false,
            divorced: false,
            class_name: String::new(),
            text_class: String::new(),
            extra: None,
            age: None,
            spouse_node: None,
            marriage_node: None,
            spouse: None,
            other_spouse: None,
            x: 0.0,
            y: 0.0,
            c_width: 0.0,
            c_height: 0.0,
        }
    }

    pub fn hidden(&self) -> bool {
        self.role.is_hidden()
    }
}

/// Arena holding every node of one reconciled family tree.
///
/// Ownership is expressed by `children` lists; `parent` is the matching
/// back-reference. Node ids are stable for the lifetime of the tree.
#[derive(Debug, Clone)]
pub struct FamilyTree {
    nodes: Vec<TreeNode>,
    root: NodeId,
}

impl FamilyTree {
    pub(crate) fn new(root_id: String) -> Self {
        let mut root = TreeNode::new(root_id, String::new(), NodeRole::Root);
        root.placement = Placement::Root;
        Self {
            nodes: vec![root],
            root: NodeId(0),
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, id: NodeId) -> &TreeNode {
        &self.nodes[id.0]
    }

    pub fn get(&self, id: NodeId) -> Option<&TreeNode> {
        self.nodes.get(id.0)
    }

    pub fn node_mut(&mut self, id: NodeId) -> &mut TreeNode {
        &mut self.nodes[id.0]
    }

    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &TreeNode)> {
        self.nodes.iter().enumerate().map(|(idx, node)| (NodeId(idx), node))
    }

    pub fn find(&self, id: &str) -> Option<NodeId> {
        self.nodes
            .iter()
            .position(|node| node.id == id)
            .map(NodeId)
    }

    pub(crate) fn push(&mut self, node: TreeNode) -> NodeId {
        self.nodes.push(node);
        NodeId(self.nodes.len() - 1)
    }

    pub(crate) fn attach(&mut self, child: NodeId, parent: NodeId) {
        self.nodes[parent.0].children.push(child);
        self.nodes[child.0].parent = Some(parent);
    }

    pub(crate) fn detach(&mut self, child: NodeId) {
        if let Some(parent) = self.nodes[child.0].parent.take() {
            self.nodes[parent.0].children.retain(|id| *id != child);
        }
    }

    /// True when `ancestor` lies on the parent chain of `node` (or is `node`).
    pub fn is_ancestor(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.nodes[id.0].parent;
        }
        false
    }

    /// Nodes reachable from the root, children before parents.
    pub fn post_order(&self) -> Vec<NodeId> {
        let mut order = Vec::with_capacity(self.nodes.len());
        let mut stack = vec![(self.root, false)];
        while let Some((id, expanded)) = stack.pop() {
            if expanded {
                order.push(id);
                continue;
            }
            stack.push((id, true));
            for child in self.nodes[id.0].children.iter().rev() {
                stack.push((*child, false));
            }
        }
        order
    }

    pub fn depth(&self, id: NodeId) -> usize {
        let mut depth = 0;
        let mut current = self.nodes[id.0].parent;
        while let Some(parent) = current {
            depth += 1;
            current = self.nodes[parent.0].parent;
        }
        depth
    }

    /// Checks the structural invariants: each non-root node is listed in
    /// exactly one `children` list, that list belongs to its `parent`, and
    /// no person id occurs twice.
    pub fn verify(&self) -> Result<(), String> {
        let mut owners: Vec<Vec<NodeId>> = vec![Vec::new(); self.nodes.len()];
        for (idx, node) in self.nodes.iter().enumerate() {
            for child in &node.children {
                owners[child.0].push(NodeId(idx));
            }
        }
        for (idx, node) in self.nodes.iter().enumerate() {
            let id = NodeId(idx);
            let listed = &owners[idx];
            if id == self.root {
                if !listed.is_empty() || node.parent.is_some() {
                    return Err("root must not have a parent".to_string());
                }
                continue;
            }
            if listed.len() != 1 {
                return Err(format!("node `{}` is listed in {} children lists", node.id, listed.len()));
            }
            if node.parent != Some(listed[0]) {
                return Err(format!("node `{}` has a stale parent link", node.id));
            }
        }
        let mut seen = std::collections::HashSet::new();
        for node in &self.nodes {
            if node.role == NodeRole::Person && !seen.insert(node.id.as_str()) {
                return Err(format!("person `{}` has more than one node", node.id));
            }
        }
        Ok(())
    }
}

/// One recorded marriage, in encounter order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UnionIndexEntry {
    pub source: String,
    pub target: String,
    pub ordinal: usize,
    /// The marriage-union node created for this marriage.
    pub union: NodeId,
    pub divorced: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct NodeLayout {
    pub id: String,
    pub name: String,
    pub role: NodeRole,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub hidden: bool,
    pub no_parent: bool,
    pub class_name: String,
    pub text_class: String,
    pub extra: Option<serde_json::Value>,
}

impl NodeLayout {
    pub fn contains(&self, x: f64, y: f64) -> bool {
        !self.hidden
            && (x - self.x).abs() <= self.width / 2.0
            && (y - self.y).abs() <= self.height / 2.0
    }
}

/// Parent → child lineage line.
#[derive(Debug, Clone, Serialize)]
pub struct LinkLayout {
    pub source: String,
    pub target: String,
    /// Step-after control points; the rendered polyline is their orthogonal
    /// expansion.
    pub points: Vec<Point>,
    pub suppressed: bool,
}

/// Union index entry after anchoring, with its routed connector.
#[derive(Debug, Clone, Serialize)]
pub struct UnionLayout {
    pub source: String,
    pub target: String,
    pub ordinal: usize,
    pub union: String,
    pub source_point: Point,
    pub target_point: Point,
    pub union_point: Point,
    pub divorced: bool,
    pub points: Vec<Point>,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct Bounds {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl Bounds {
    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct FamilyLayout {
    pub nodes: Vec<NodeLayout>,
    pub links: Vec<LinkLayout>,
    pub unions: Vec<UnionLayout>,
    pub node_width: f64,
    pub node_height: f64,
    pub bounds: Bounds,
}

impl FamilyLayout {
    pub fn visible_nodes(&self) -> impl Iterator<Item = &NodeLayout> {
        self.nodes.iter().filter(|node| !node.hidden)
    }

    pub fn node(&self, id: &str) -> Option<&NodeLayout> {
        self.nodes.iter().find(|node| node.id == id)
    }

    /// Topmost visible node whose box contains the point.
    pub fn node_at(&self, x: f64, y: f64) -> Option<&NodeLayout> {
        self.nodes.iter().rev().find(|node| node.contains(x, y))
    }
}
