use serde_json::Value;
use tracing::trace;

use crate::layout::{DefaultSorter, FamilyLayout, PersonSorter, TextMeasure, TidyTree, TreeLayoutEngine};

/// Handler receiving `(name, extra, id)` of the node that was hit.
pub type NodeCallback = Box<dyn FnMut(&str, Option<&Value>, &str)>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interaction {
    Click,
    ContextMenu,
}

/// Caller-supplied hooks for one render.
///
/// Everything has a default: input order refined by [`DefaultSorter`], font
/// based measurement, the built-in [`TidyTree`] engine and no handlers.
pub struct Callbacks {
    pub sorter: Box<dyn PersonSorter>,
    /// `None` measures labels with [`crate::layout::FontMeasure`].
    pub measure: Option<Box<dyn TextMeasure>>,
    pub engine: Box<dyn TreeLayoutEngine>,
    pub on_click: Option<NodeCallback>,
    pub on_context_menu: Option<NodeCallback>,
}

impl Default for Callbacks {
    fn default() -> Self {
        Self {
            sorter: Box::new(DefaultSorter),
            measure: None,
            engine: Box::new(TidyTree),
            on_click: None,
            on_context_menu: None,
        }
    }
}

impl Callbacks {
    pub fn with_sorter(mut self, sorter: impl PersonSorter + 'static) -> Self {
        self.sorter = Box::new(sorter);
        self
    }

    pub fn with_measure(mut self, measure: impl TextMeasure + 'static) -> Self {
        self.measure = Some(Box::new(measure));
        self
    }

    pub fn on_click(mut self, handler: impl FnMut(&str, Option<&Value>, &str) + 'static) -> Self {
        self.on_click = Some(Box::new(handler));
        self
    }

    pub fn on_context_menu(mut self, handler: impl FnMut(&str, Option<&Value>, &str) + 'static) -> Self {
        self.on_context_menu = Some(Box::new(handler));
        self
    }

    /// Hit-tests `(x, y)` in layout coordinates and fires the matching
    /// handler. Returns whether a handler ran.
    pub fn dispatch(&mut self, layout: &FamilyLayout, interaction: Interaction, x: f64, y: f64) -> bool {
        let Some(node) = layout.node_at(x, y) else {
            return false;
        };
        let handler = match interaction {
            Interaction::Click => self.on_click.as_mut(),
            Interaction::ContextMenu => self.on_context_menu.as_mut(),
        };
        let Some(handler) = handler else {
            return false;
        };
        trace!(id = %node.id, ?interaction, "dispatching node event");
        handler(&node.name, node.extra.as_ref(), &node.id);
        true
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::config::LayoutConfig;
    use crate::ir::{MarriageRecord, PersonRecord};
    use crate::layout::{FixedMeasure, compute_layout_with};
    use crate::theme::Theme;

    fn couple_layout() -> FamilyLayout {
        let mut person = PersonRecord::new("p", "Pat");
        person.extra = Some(serde_json::json!({"born": 1901}));
        let forest = [person.with_marriage(MarriageRecord::to(PersonRecord::new("s", "Sam")))];
        let mut callbacks = Callbacks::default().with_measure(FixedMeasure(10.0));
        compute_layout_with(&forest, &Theme::classic(), &LayoutConfig::default(), &mut callbacks).unwrap()
    }

    #[test]
    fn click_on_a_person_fires_with_name_extra_and_id() {
        let layout = couple_layout();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let mut callbacks = Callbacks::default().on_click(move |name, extra, id| {
            sink.borrow_mut().push((name.to_string(), extra.cloned(), id.to_string()));
        });
        let p = layout.node("p").unwrap();
        assert!(callbacks.dispatch(&layout, Interaction::Click, p.x, p.y));
        let seen = seen.borrow();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].0, "Pat");
        assert_eq!(seen[0].1, Some(serde_json::json!({"born": 1901})));
        assert_eq!(seen[0].2, "p");
    }

    #[test]
    fn hidden_union_never_fires() {
        let layout = couple_layout();
        let fired = Rc::new(RefCell::new(0));
        let counter = Rc::clone(&fired);
        let mut callbacks = Callbacks::default().on_context_menu(move |_, _, _| *counter.borrow_mut() += 1);
        let union = layout.node(&layout.unions[0].union).unwrap();
        // The union sits between the spouses, outside both boxes at default spacing.
        let hit = callbacks.dispatch(&layout, Interaction::ContextMenu, union.x, union.y);
        assert!(!hit);
        assert_eq!(*fired.borrow(), 0);
        assert!(!callbacks.dispatch(&layout, Interaction::Click, 1.0e6, 1.0e6));
    }
}
