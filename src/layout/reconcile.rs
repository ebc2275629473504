use std::collections::{HashMap, HashSet};

use tracing::{debug, trace, warn};

use super::sort::{PersonSorter, sorted_marriages, sorted_persons};
use super::types::{FamilyTree, NodeId, NodeRole, Placement, TreeNode, UnionIndexEntry};
use crate::config::Styles;
use crate::error::{FamilyTreeError, Result, describe_person};
use crate::ir::{MarriageRecord, PersonRecord};

/// A normalized family tree plus the marriages recorded while building it.
#[derive(Debug, Clone)]
pub struct Reconciled {
    pub tree: FamilyTree,
    pub unions: Vec<UnionIndexEntry>,
}

/// Folds a forest of person records into one single-rooted tree.
///
/// Every person id ends up with exactly one node. Marriages become hidden
/// union nodes that own the couple's children; within a non-root parent the
/// unions of one person are grouped under a hidden in-law junction. A person
/// first filed as a spouse or as a top-level root is moved under their own
/// parents as soon as a lineage branch claims them, independent of the order
/// in which the branches are visited.
pub fn reconcile(
    forest: &[PersonRecord],
    sorter: &dyn PersonSorter,
    styles: &Styles,
) -> Result<Reconciled> {
    let mut ctx = Reconciler::new(forest, sorter, styles);
    let root = ctx.tree.root();
    for person in forest {
        ctx.visit(person, root, Arrival::Root)?;
    }
    debug!(
        nodes = ctx.tree.len(),
        persons = ctx.by_person.len(),
        unions = ctx.unions.len(),
        junctions = ctx.junctions.len(),
        "reconciled family forest"
    );
    Ok(Reconciled {
        tree: ctx.tree,
        unions: ctx.unions,
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Arrival {
    Root,
    Lineage,
}

struct Reconciler<'a> {
    tree: FamilyTree,
    sorter: &'a dyn PersonSorter,
    styles: &'a Styles,
    by_person: HashMap<String, NodeId>,
    explicit_ids: HashSet<String>,
    next_id: usize,
    /// Union of each couple, keyed by the ordered pair of spouses.
    couples: HashMap<(NodeId, NodeId), NodeId>,
    /// Unions declared so far by each person.
    declared: HashMap<NodeId, usize>,
    junctions: HashMap<(NodeId, NodeId), NodeId>,
    path: Vec<NodeId>,
    unions: Vec<UnionIndexEntry>,
}

impl<'a> Reconciler<'a> {
    fn new(forest: &[PersonRecord], sorter: &'a dyn PersonSorter, styles: &'a Styles) -> Self {
        let mut explicit_ids = HashSet::new();
        collect_ids(forest, &mut explicit_ids);
        let mut ctx = Self {
            tree: FamilyTree::new(String::new()),
            sorter,
            styles,
            by_person: HashMap::new(),
            explicit_ids,
            next_id: 0,
            couples: HashMap::new(),
            declared: HashMap::new(),
            junctions: HashMap::new(),
            path: Vec::new(),
            unions: Vec::new(),
        };
        let root = ctx.tree.root();
        let root_id = ctx.fresh_id();
        ctx.tree.node_mut(root).id = root_id;
        ctx
    }

    /// Next synthetic id that no explicit person id in the input uses.
    fn fresh_id(&mut self) -> String {
        loop {
            let candidate = self.next_id.to_string();
            self.next_id += 1;
            if !self.explicit_ids.contains(&candidate) {
                return candidate;
            }
        }
    }

    fn visit(&mut self, person: &PersonRecord, parent: NodeId, arrival: Arrival) -> Result<NodeId> {
        let existing = person
            .id
            .as_deref()
            .and_then(|id| self.by_person.get(id).copied());

        let node = match existing {
            Some(node) => {
                if self.path.contains(&node) {
                    return Err(self.cycle_error(node));
                }
                self.refresh(node, person);
                if arrival == Arrival::Lineage && self.tree.node(node).placement != Placement::Lineage {
                    self.relink(node, parent)?;
                }
                trace!(id = %self.tree.node(node).id, "merging record into existing node");
                node
            }
            None => {
                let placement = match arrival {
                    Arrival::Root => Placement::Root,
                    Arrival::Lineage => Placement::Lineage,
                };
                self.create_person(person, parent, placement)
            }
        };

        self.path.push(node);

        for child in sorted_persons(&person.children, self.sorter) {
            self.visit(child, node, Arrival::Lineage)?;
        }
        for (position, (_, marriage)) in sorted_marriages(&person.marriages, self.sorter)
            .into_iter()
            .enumerate()
        {
            self.marry(node, marriage, position)?;
        }

        self.path.pop();
        Ok(node)
    }

    fn create_person(&mut self, person: &PersonRecord, parent: NodeId, placement: Placement) -> NodeId {
        let id = match &person.id {
            Some(id) => id.clone(),
            None => self.fresh_id(),
        };
        let mut node = TreeNode::new(id.clone(), person.name.clone(), NodeRole::Person);
        node.placement = placement;
        node.class_name = person
            .class_name
            .clone()
            .unwrap_or_else(|| self.styles.node.clone());
        node.text_class = person
            .text_class
            .clone()
            .unwrap_or_else(|| self.styles.text.clone());
        node.extra = person.extra.clone();
        node.age = person.age;
        node.no_parent = parent == self.tree.root() || placement == Placement::Spouse;

        let node_id = self.tree.push(node);
        if person.id.is_some() {
            self.by_person.insert(id, node_id);
        }
        self.tree.attach(node_id, parent);
        trace!(id = %self.tree.node(node_id).id, ?placement, "created person node");
        node_id
    }

    /// Later records may fill in what an earlier, thinner mention left out.
    fn refresh(&mut self, node: NodeId, person: &PersonRecord) {
        let target = self.tree.node_mut(node);
        if target.name.is_empty() && !person.name.is_empty() {
            target.name = person.name.clone();
        }
        if let Some(class_name) = &person.class_name {
            target.class_name = class_name.clone();
        }
        if let Some(text_class) = &person.text_class {
            target.text_class = text_class.clone();
        }
        if target.extra.is_none() {
            target.extra = person.extra.clone();
        }
        if target.age.is_none() {
            target.age = person.age;
        }
    }

    /// `position` is the marriage's place in the record, used for errors.
    fn marry(&mut self, person: NodeId, marriage: &MarriageRecord, position: usize) -> Result<()> {
        let Some(spouse_record) = marriage.spouse.as_deref() else {
            return Err(FamilyTreeError::MissingSpouse {
                person: self.describe(person),
                ordinal: position,
            });
        };
        let existing = spouse_record
            .id
            .as_deref()
            .and_then(|id| self.by_person.get(id).copied());
        if existing == Some(person) {
            return Err(FamilyTreeError::SelfMarriage {
                person: self.describe(person),
                ordinal: position,
            });
        }
        if !spouse_record.children.is_empty() || !spouse_record.marriages.is_empty() {
            warn!(
                spouse = %describe_person(spouse_record.id.as_deref(), &spouse_record.name),
                "children and marriages nested in a spouse record are ignored; declare them on a record with the same id"
            );
        }

        // A couple met again, from either side, shares the first union.
        let known = existing.and_then(|spouse| Some((spouse, *self.couples.get(&couple(person, spouse))?)));
        if let Some((spouse, union_node)) = known {
            self.refresh(spouse, spouse_record);
            trace!(union = %self.tree.node(union_node).id, "marriage already recorded");
            for child in sorted_persons(&marriage.children, self.sorter) {
                self.visit(child, union_node, Arrival::Lineage)?;
            }
            return Ok(());
        }

        let context = self.context_of(person);
        let container = if context == self.tree.root() {
            context
        } else {
            self.junction(context, person)
        };

        let union_id = self.fresh_id();
        let mut union = TreeNode::new(union_id, String::new(), NodeRole::MarriageUnion);
        union.no_parent = true;
        union.divorced = marriage.divorced;
        union.extra = marriage.extra.clone();
        union.class_name = self.styles.marriage.clone();
        let union_node = self.tree.push(union);
        self.tree.attach(union_node, container);

        let spouse = match existing {
            Some(spouse) => {
                self.refresh(spouse, spouse_record);
                spouse
            }
            None => self.create_person(spouse_record, container, Placement::Spouse),
        };

        self.couples.insert(couple(person, spouse), union_node);
        let declared = self.declared.entry(person).or_default();
        let ordinal = *declared;
        *declared += 1;

        self.tree.node_mut(spouse).marriage_node = Some(union_node);
        self.tree.node_mut(person).spouse_node = Some(spouse);
        {
            let union = self.tree.node_mut(union_node);
            union.spouse = Some(person);
            union.other_spouse = Some(spouse);
        }

        for child in sorted_persons(&marriage.children, self.sorter) {
            self.visit(child, union_node, Arrival::Lineage)?;
        }

        self.unions.push(UnionIndexEntry {
            source: self.tree.node(person).id.clone(),
            target: self.tree.node(spouse).id.clone(),
            ordinal,
            union: union_node,
            divorced: marriage.divorced,
        });
        Ok(())
    }

    /// The structural parent that a person's marriages hang off.
    fn context_of(&self, person: NodeId) -> NodeId {
        let root = self.tree.root();
        let Some(parent) = self.tree.node(person).parent else {
            return root;
        };
        if self.tree.node(parent).role == NodeRole::InLawJunction {
            self.tree.node(parent).parent.unwrap_or(root)
        } else {
            parent
        }
    }

    fn junction(&mut self, context: NodeId, person: NodeId) -> NodeId {
        if let Some(junction) = self.junctions.get(&(context, person)) {
            return *junction;
        }
        let id = self.fresh_id();
        let mut node = TreeNode::new(id, String::new(), NodeRole::InLawJunction);
        node.no_parent = true;
        let junction = self.tree.push(node);
        self.tree.attach(junction, context);
        self.junctions.insert((context, person), junction);
        debug!(
            junction = %self.tree.node(junction).id,
            person = %self.tree.node(person).id,
            context = %self.tree.node(context).id,
            "created in-law junction"
        );
        junction
    }

    fn relink(&mut self, node: NodeId, new_parent: NodeId) -> Result<()> {
        self.ensure_movable(node, new_parent)?;
        let old_context = self.context_of(node);
        debug!(
            id = %self.tree.node(node).id,
            from = %self.tree.node(old_context).id,
            to = %self.tree.node(new_parent).id,
            "relinking under own lineage"
        );
        self.tree.detach(node);
        self.tree.attach(node, new_parent);
        let root = self.tree.root();
        {
            let moved = self.tree.node_mut(node);
            moved.placement = Placement::Lineage;
            moved.no_parent = new_parent == root;
        }
        self.carry_marriages(node, old_context, new_parent)
    }

    /// Moves the unions a person declared (and the partners filed next to
    /// them) along with the person.
    fn carry_marriages(&mut self, person: NodeId, old_context: NodeId, new_context: NodeId) -> Result<()> {
        if let Some(junction) = self.junctions.remove(&(old_context, person)) {
            self.ensure_movable(junction, new_context)?;
            self.tree.detach(junction);
            self.tree.attach(junction, new_context);
            self.junctions.insert((new_context, person), junction);
            return Ok(());
        }

        let mut group = Vec::new();
        for child in &self.tree.node(old_context).children {
            let node = self.tree.node(*child);
            if node.role != NodeRole::MarriageUnion || node.spouse != Some(person) {
                continue;
            }
            group.push(*child);
            if let Some(partner) = node.other_spouse {
                let partner_node = self.tree.node(partner);
                if partner_node.placement == Placement::Spouse && partner_node.parent == Some(old_context) {
                    group.push(partner);
                }
            }
        }
        if group.is_empty() {
            return Ok(());
        }

        let junction = self.junction(new_context, person);
        for member in group {
            self.ensure_movable(member, junction)?;
            self.tree.detach(member);
            self.tree.attach(member, junction);
        }
        Ok(())
    }

    fn ensure_movable(&self, node: NodeId, new_parent: NodeId) -> Result<()> {
        if self.tree.is_ancestor(node, new_parent) {
            let mut chain = Vec::new();
            let mut current = Some(new_parent);
            while let Some(id) = current {
                chain.push(self.tree.node(id).id.clone());
                if id == node {
                    break;
                }
                current = self.tree.node(id).parent;
            }
            chain.reverse();
            return Err(FamilyTreeError::CyclicReference {
                person: self.describe(node),
                path: chain.join(" -> "),
            });
        }
        Ok(())
    }

    fn cycle_error(&self, node: NodeId) -> FamilyTreeError {
        let start = self.path.iter().position(|id| *id == node).unwrap_or(0);
        let mut chain: Vec<String> = self.path[start..]
            .iter()
            .map(|id| self.tree.node(*id).id.clone())
            .collect();
        chain.push(self.tree.node(node).id.clone());
        FamilyTreeError::CyclicReference {
            person: self.describe(node),
            path: chain.join(" -> "),
        }
    }

    fn describe(&self, node: NodeId) -> String {
        let node = self.tree.node(node);
        describe_person(Some(&node.id), &node.name)
    }
}

fn couple(a: NodeId, b: NodeId) -> (NodeId, NodeId) {
    (a.min(b), a.max(b))
}

fn collect_ids(persons: &[PersonRecord], ids: &mut HashSet<String>) {
    for person in persons {
        if let Some(id) = &person.id {
            ids.insert(id.clone());
        }
        collect_ids(&person.children, ids);
        for marriage in &person.marriages {
            if let Some(spouse) = &marriage.spouse {
                collect_ids(std::slice::from_ref(spouse.as_ref()), ids);
            }
            collect_ids(&marriage.children, ids);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::sort::DefaultSorter;

    fn run(forest: &[PersonRecord]) -> Reconciled {
        let reconciled = reconcile(forest, &DefaultSorter, &Styles::default()).unwrap();
        reconciled.tree.verify().unwrap();
        reconciled
    }

    fn person_count(tree: &FamilyTree) -> usize {
        tree.nodes().filter(|(_, n)| n.role == NodeRole::Person).count()
    }

    fn parent_of(tree: &FamilyTree, id: &str) -> NodeId {
        let node = tree.find(id).unwrap();
        tree.node(node).parent.unwrap()
    }

    #[test]
    fn single_person_hangs_off_hidden_root() {
        let out = run(&[PersonRecord::new("p", "Solo")]);
        assert_eq!(out.tree.len(), 2);
        assert!(out.unions.is_empty());
        let root = out.tree.root();
        assert!(out.tree.node(root).hidden());
        let p = out.tree.find("p").unwrap();
        assert!(out.tree.node(p).no_parent);
        assert_eq!(out.tree.node(p).parent, Some(root));
        assert_eq!(out.tree.node(p).class_name, "node");
    }

    #[test]
    fn marriage_creates_union_and_spouse_at_root() {
        let forest = [PersonRecord::new("p", "P").with_marriage(MarriageRecord::to(PersonRecord::new("s", "S")))];
        let out = run(&forest);
        assert_eq!(out.tree.len(), 4);
        assert_eq!(out.unions.len(), 1);
        let entry = &out.unions[0];
        assert_eq!((entry.source.as_str(), entry.target.as_str(), entry.ordinal), ("p", "s", 0));

        let root = out.tree.root();
        let p = out.tree.find("p").unwrap();
        let s = out.tree.find("s").unwrap();
        assert_eq!(out.tree.node(root).children, vec![p, entry.union, s]);
        let union = out.tree.node(entry.union);
        assert_eq!(union.role, NodeRole::MarriageUnion);
        assert_eq!((union.spouse, union.other_spouse), (Some(p), Some(s)));
        assert_eq!(out.tree.node(s).marriage_node, Some(entry.union));
        assert_eq!(out.tree.node(p).spouse_node, Some(s));
        assert_eq!(out.tree.node(s).placement, Placement::Spouse);
    }

    #[test]
    fn remarriage_gets_increasing_ordinals() {
        let forest = [PersonRecord::new("p", "P")
            .with_marriage(MarriageRecord::to(PersonRecord::new("s1", "S1")).divorced())
            .with_marriage(MarriageRecord::to(PersonRecord::new("s2", "S2")))];
        let out = run(&forest);
        let ordinals: Vec<_> = out.unions.iter().map(|u| (u.target.as_str(), u.ordinal)).collect();
        assert_eq!(ordinals, vec![("s1", 0), ("s2", 1)]);
        assert!(out.unions[0].divorced);
        assert!(out.tree.node(out.unions[0].union).divorced);
        assert_ne!(out.unions[0].union, out.unions[1].union);
    }

    #[test]
    fn union_children_hang_off_the_union() {
        let forest = [PersonRecord::new("p", "P").with_marriage(
            MarriageRecord::to(PersonRecord::new("s", "S")).with_child(PersonRecord::new("c", "C")),
        )];
        let out = run(&forest);
        assert_eq!(parent_of(&out.tree, "c"), out.unions[0].union);
        assert!(!out.tree.node(out.tree.find("c").unwrap()).no_parent);
    }

    #[test]
    fn nested_marriage_is_grouped_in_a_junction() {
        let child = PersonRecord::new("c", "C")
            .with_marriage(MarriageRecord::to(PersonRecord::new("w1", "W1")))
            .with_marriage(MarriageRecord::to(PersonRecord::new("w2", "W2")));
        let forest = [PersonRecord::new("p", "P").with_child(child)];
        let out = run(&forest);

        let p = out.tree.find("p").unwrap();
        let c = out.tree.find("c").unwrap();
        let junctions: Vec<_> = out
            .tree
            .nodes()
            .filter(|(_, n)| n.role == NodeRole::InLawJunction)
            .map(|(id, _)| id)
            .collect();
        assert_eq!(junctions.len(), 1, "one junction per person and context");
        let junction = junctions[0];
        assert_eq!(out.tree.node(p).children, vec![c, junction]);
        let w1 = out.tree.find("w1").unwrap();
        let w2 = out.tree.find("w2").unwrap();
        assert_eq!(
            out.tree.node(junction).children,
            vec![out.unions[0].union, w1, out.unions[1].union, w2]
        );
    }

    #[test]
    fn shared_grandchild_has_one_node_and_first_lineage_wins() {
        let g = PersonRecord::new("g", "Grandchild");
        let branch1 = PersonRecord::new("a", "A").with_marriage(
            MarriageRecord::to(PersonRecord::new("b", "B")).with_child(g.clone()),
        );
        let branch2 = PersonRecord::new("x", "X").with_child(g);
        let out = run(&[branch1, branch2]);

        let count = out.tree.nodes().filter(|(_, n)| n.id == "g").count();
        assert_eq!(count, 1);
        assert_eq!(parent_of(&out.tree, "g"), out.unions[0].union);
    }

    #[test]
    fn spouse_is_relinked_under_own_parents() {
        // "s" is first seen as a spouse, then as the child of "y".
        let a = PersonRecord::new("a", "A").with_marriage(MarriageRecord::to(PersonRecord::new("s", "S")));
        let y = PersonRecord::new("y", "Y").with_child(PersonRecord::new("s", "S"));
        let out = run(&[a, y]);
        let s = out.tree.find("s").unwrap();
        assert_eq!(parent_of(&out.tree, "s"), out.tree.find("y").unwrap());
        assert_eq!(out.tree.node(s).placement, Placement::Lineage);
        assert!(!out.tree.node(s).no_parent);
        // The union stays with the declaring partner.
        assert_eq!(out.tree.node(out.unions[0].union).parent, Some(out.tree.root()));
    }

    #[test]
    fn lineage_wins_regardless_of_visit_order() {
        let a = PersonRecord::new("a", "A").with_marriage(MarriageRecord::to(PersonRecord::new("s", "S")));
        let y = PersonRecord::new("y", "Y").with_child(PersonRecord::new("s", "S"));

        let forward = run(&[a.clone(), y.clone()]);
        let backward = run(&[y, a]);
        for out in [&forward, &backward] {
            assert_eq!(parent_of(&out.tree, "s"), out.tree.find("y").unwrap());
            assert_eq!(person_count(&out.tree), 3);
        }
    }

    #[test]
    fn relinked_root_person_carries_their_marriages() {
        // "c" starts as a top-level person with a wife, then turns out to be
        // the son of "f".
        let c = PersonRecord::new("c", "C").with_marriage(
            MarriageRecord::to(PersonRecord::new("w", "W")).with_child(PersonRecord::new("k", "K")),
        );
        let f = PersonRecord::new("f", "F").with_child(PersonRecord::new("c", "C"));
        let out = run(&[c, f]);

        let f_node = out.tree.find("f").unwrap();
        let c_node = out.tree.find("c").unwrap();
        assert_eq!(out.tree.node(c_node).parent, Some(f_node));
        let union = out.unions[0].union;
        let junction = out.tree.node(union).parent.unwrap();
        assert_eq!(out.tree.node(junction).role, NodeRole::InLawJunction);
        assert_eq!(out.tree.node(junction).parent, Some(f_node));
        assert_eq!(parent_of(&out.tree, "w"), junction);
        assert_eq!(parent_of(&out.tree, "k"), union);
        assert_eq!(out.tree.depth(out.tree.find("k").unwrap()), out.tree.depth(c_node) + 2);
    }

    #[test]
    fn anonymous_persons_get_ids_that_avoid_explicit_ones() {
        let forest = [
            PersonRecord::new("1", "Explicit one"),
            PersonRecord::anonymous("Anon").with_marriage(MarriageRecord::to(PersonRecord::anonymous("Anon spouse"))),
        ];
        let out = run(&forest);
        let mut ids: Vec<_> = out.tree.nodes().map(|(_, n)| n.id.clone()).collect();
        let total = ids.len();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), total);
        assert_eq!(out.tree.node(out.tree.root()).id, "0");
        assert_eq!(out.tree.nodes().filter(|(_, n)| n.id == "1").count(), 1);
    }

    #[test]
    fn missing_spouse_is_reported() {
        let mut person = PersonRecord::new("p", "Pat");
        person.marriages.push(MarriageRecord::default());
        let err = reconcile(&[person], &DefaultSorter, &Styles::default()).unwrap_err();
        assert_eq!(err.to_string(), "person `p` (Pat): marriage #0 has no spouse");
    }

    #[test]
    fn self_marriage_is_reported() {
        let person = PersonRecord::new("p", "Pat").with_marriage(MarriageRecord::to(PersonRecord::new("p", "Pat")));
        let err = reconcile(&[person], &DefaultSorter, &Styles::default()).unwrap_err();
        assert!(matches!(err, FamilyTreeError::SelfMarriage { .. }));
    }

    #[test]
    fn ancestor_cycle_fails_fast() {
        let person = PersonRecord::new("a", "A")
            .with_child(PersonRecord::new("b", "B").with_child(PersonRecord::new("a", "A")));
        let err = reconcile(&[person], &DefaultSorter, &Styles::default()).unwrap_err();
        match err {
            FamilyTreeError::CyclicReference { path, .. } => assert_eq!(path, "a -> b -> a"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn repeated_record_is_idempotent() {
        let full = PersonRecord::new("a", "A")
            .with_child(PersonRecord::new("k", "K"))
            .with_marriage(MarriageRecord::to(PersonRecord::new("s", "S")).with_child(PersonRecord::new("c", "C")));
        let once = run(std::slice::from_ref(&full));
        let twice = run(&[full.clone(), full]);
        assert_eq!(twice.unions.len(), 1);
        assert_eq!(person_count(&twice.tree), 4);
        assert_eq!(twice.tree.len(), once.tree.len());
        assert_eq!(parent_of(&twice.tree, "c"), twice.unions[0].union);
        assert_eq!(twice.tree.node(twice.unions[0].union).children.len(), 1);
    }

    fn charlie() -> PersonRecord {
        PersonRecord::new("c", "Charlie").with_marriage(
            MarriageRecord::to(PersonRecord::new("s", "Sue")).with_child(PersonRecord::new("t", "Tim")),
        )
    }

    fn grandpa() -> PersonRecord {
        PersonRecord::new("g", "Grandpa").with_child(PersonRecord::new("c", "Charlie"))
    }

    fn person_ids(tree: &FamilyTree) -> Vec<String> {
        let mut ids: Vec<String> = tree
            .nodes()
            .filter(|(_, n)| n.role == NodeRole::Person)
            .map(|(_, n)| n.id.clone())
            .collect();
        ids.sort();
        ids
    }

    #[test]
    fn later_full_record_extends_an_earlier_mention() {
        let forward = run(&[charlie(), grandpa()]);
        let backward = run(&[grandpa(), charlie()]);
        for out in [&forward, &backward] {
            assert_eq!(person_ids(&out.tree), vec!["c", "g", "s", "t"]);
            assert_eq!(out.unions.len(), 1);
            assert_eq!(parent_of(&out.tree, "c"), out.tree.find("g").unwrap());
            assert_eq!(parent_of(&out.tree, "t"), out.unions[0].union);
            let junction = out.tree.node(out.unions[0].union).parent.unwrap();
            assert_eq!(out.tree.node(junction).role, NodeRole::InLawJunction);
        }
    }

    #[test]
    fn couple_declared_from_both_sides_shares_one_union() {
        let a = PersonRecord::new("a", "A").with_marriage(
            MarriageRecord::to(PersonRecord::new("b", "B")).with_child(PersonRecord::new("k1", "K1")),
        );
        let b = PersonRecord::new("b", "B").with_marriage(
            MarriageRecord::to(PersonRecord::new("a", "A")).with_child(PersonRecord::new("k2", "K2")),
        );
        let out = run(&[a, b]);
        assert_eq!(out.unions.len(), 1);
        assert_eq!(parent_of(&out.tree, "k1"), out.unions[0].union);
        assert_eq!(parent_of(&out.tree, "k2"), out.unions[0].union);
    }

    #[test]
    fn merged_marriages_continue_the_ordinals() {
        let first = PersonRecord::new("p", "P").with_marriage(MarriageRecord::to(PersonRecord::new("s1", "S1")));
        let second = PersonRecord::new("p", "P").with_marriage(MarriageRecord::to(PersonRecord::new("s2", "S2")));
        let out = run(&[first, second]);
        let ordinals: Vec<_> = out.unions.iter().map(|u| (u.target.as_str(), u.ordinal)).collect();
        assert_eq!(ordinals, vec![("s1", 0), ("s2", 1)]);
    }

    #[test]
    fn styles_fill_in_missing_classes() {
        let styles = Styles {
            node: "card".to_string(),
            text: "label".to_string(),
            ..Styles::default()
        };
        let forest = [PersonRecord::new("a", "A"), PersonRecord::new("b", "B").with_class("woman")];
        let out = reconcile(&forest, &DefaultSorter, &styles).unwrap();
        let a = out.tree.node(out.tree.find("a").unwrap());
        let b = out.tree.node(out.tree.find("b").unwrap());
        assert_eq!((a.class_name.as_str(), a.text_class.as_str()), ("card", "label"));
        assert_eq!(b.class_name, "woman");
    }
}
