//! A retained element tree standing in for the page.
//!
//! Elements live in an arena keyed by `ElementId`. An element is *attached* when
//! its parent chain reaches the root; detached elements keep their subtree and
//! can be attached again (the caption of a photo moves around this way).
//! Removing an element deletes it together with its descendants, the elements
//! it owns and their listeners, after which any operation addressing it is a
//! no-op.

use crate::dom::{Event, Interaction, Listener, Task};
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;
use tracing::debug;

/// Class marking an element and its subtree as hidden.
pub const HIDDEN: &str = "hide";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementId(usize);

impl ElementId {
    pub fn from_raw(raw: usize) -> Self {
        ElementId(raw)
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone)]
pub struct Element {
    pub tag: &'static str,
    pub classes: Vec<String>,
    pub text: Option<String>,
    pub src: Option<String>,
    pub parent: Option<ElementId>,
    pub children: Vec<ElementId>,
}

impl Element {
    fn new(tag: &'static str, classes: &str) -> Self {
        Self {
            tag,
            classes: classes.split_whitespace().map(str::to_string).collect(),
            text: None,
            src: None,
            parent: None,
            children: Vec::new(),
        }
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }
}

struct Document {
    elements: HashMap<ElementId, Element>,
    listeners: HashMap<ElementId, Vec<(Interaction, Rc<dyn Listener>)>>,
    owned: HashMap<ElementId, Vec<ElementId>>,
    next_id: usize,
    root: ElementId,
}

impl Document {
    fn new() -> Self {
        let root = ElementId(0);
        let mut elements = HashMap::new();
        elements.insert(root, Element::new("div", "root"));

        Self {
            elements,
            listeners: HashMap::new(),
            owned: HashMap::new(),
            next_id: 1,
            root,
        }
    }

    fn unlink(&mut self, id: ElementId) {
        let Some(parent) = self.elements.get_mut(&id).and_then(|e| e.parent.take()) else {
            return;
        };
        if let Some(parent) = self.elements.get_mut(&parent) {
            parent.children.retain(|child| *child != id);
        }
    }

    fn delete_subtree(&mut self, id: ElementId) {
        let mut pending = vec![id];
        while let Some(current) = pending.pop() {
            self.listeners.remove(&current);
            for owned in self.owned.remove(&current).unwrap_or_default() {
                self.unlink(owned);
                pending.push(owned);
            }
            if let Some(element) = self.elements.remove(&current) {
                pending.extend(element.children);
            }
        }
    }

    /// `true` if `ancestor` is `id` or one of its ancestors.
    fn is_inclusive_ancestor(&self, ancestor: ElementId, id: ElementId) -> bool {
        let mut current = Some(id);
        while let Some(node) = current {
            if node == ancestor {
                return true;
            }
            current = self.elements.get(&node).and_then(|e| e.parent);
        }
        false
    }
}

/// Shared handle to the element tree.
///
/// Cloning is cheap; every clone addresses the same document. Borrows are
/// released before listeners run, so handlers may freely mutate the tree.
///
/// Components registered as listeners keep a handle back to the document, so
/// the document and its mounted page form a reference cycle. Removing the
/// page's elements drops their listeners and breaks it; `clear` does this for
/// the whole tree.
#[derive(Clone)]
pub struct RenderTarget {
    document: Rc<RefCell<Document>>,
}

impl Default for RenderTarget {
    fn default() -> Self {
        Self::new()
    }
}

impl RenderTarget {
    pub fn new() -> Self {
        Self {
            document: Rc::new(RefCell::new(Document::new())),
        }
    }

    pub fn root(&self) -> ElementId {
        self.document.borrow().root
    }

    /// Creates a detached element.
    pub fn create(&self, tag: &'static str, classes: &str) -> ElementId {
        let mut document = self.document.borrow_mut();
        let id = ElementId(document.next_id);
        document.next_id += 1;
        document.elements.insert(id, Element::new(tag, classes));
        id
    }

    pub fn create_with_text(&self, tag: &'static str, classes: &str, text: &str) -> ElementId {
        let id = self.create(tag, classes);
        self.set_text(id, text);
        id
    }

    pub fn set_text(&self, id: ElementId, text: &str) {
        if let Some(element) = self.document.borrow_mut().elements.get_mut(&id) {
            element.text = Some(text.to_string());
        }
    }

    pub fn set_src(&self, id: ElementId, src: &str) {
        if let Some(element) = self.document.borrow_mut().elements.get_mut(&id) {
            element.src = Some(src.to_string());
        }
    }

    /// Appends `child` as last child of `parent`, moving it if it already has a
    /// parent. Returns `false` when either element no longer exists or the move
    /// would create a cycle.
    pub fn append(&self, parent: ElementId, child: ElementId) -> bool {
        let mut document = self.document.borrow_mut();
        if !document.elements.contains_key(&parent)
            || !document.elements.contains_key(&child)
            || document.is_inclusive_ancestor(child, parent)
        {
            return false;
        }

        document.unlink(child);
        if let Some(element) = document.elements.get_mut(&child) {
            element.parent = Some(parent);
        }
        if let Some(element) = document.elements.get_mut(&parent) {
            element.children.push(child);
        }
        true
    }

    /// Places `child` right after `reference` among the reference's siblings.
    pub fn insert_after(&self, reference: ElementId, child: ElementId) -> bool {
        let mut document = self.document.borrow_mut();
        let Some(parent) = document.elements.get(&reference).and_then(|e| e.parent) else {
            return false;
        };
        if reference == child
            || !document.elements.contains_key(&child)
            || document.is_inclusive_ancestor(child, parent)
        {
            return false;
        }

        document.unlink(child);
        if let Some(element) = document.elements.get_mut(&child) {
            element.parent = Some(parent);
        }
        if let Some(element) = document.elements.get_mut(&parent) {
            let position = element
                .children
                .iter()
                .position(|c| *c == reference)
                .map(|p| p + 1)
                .unwrap_or(element.children.len());
            element.children.insert(position, child);
        }
        true
    }

    /// Takes the element out of its parent, keeping it and its subtree alive.
    pub fn detach(&self, id: ElementId) {
        self.document.borrow_mut().unlink(id);
    }

    /// Ties the lifetime of `id` to `owner`.
    ///
    /// When `owner` is deleted, `id` is deleted with it, whether or not it is
    /// attached anywhere at that point.
    pub fn adopt(&self, owner: ElementId, id: ElementId) {
        let mut document = self.document.borrow_mut();
        if document.elements.contains_key(&owner) && document.elements.contains_key(&id) {
            document.owned.entry(owner).or_default().push(id);
        }
    }

    /// Deletes everything below the root.
    pub fn clear(&self) {
        self.remove_children(self.root());
    }

    /// Deletes every child of `id`, recursively, with their listeners.
    pub fn remove_children(&self, id: ElementId) {
        let mut document = self.document.borrow_mut();
        let children = document
            .elements
            .get_mut(&id)
            .map(|e| std::mem::take(&mut e.children))
            .unwrap_or_default();
        for child in children {
            document.delete_subtree(child);
        }
    }

    pub fn exists(&self, id: ElementId) -> bool {
        self.document.borrow().elements.contains_key(&id)
    }

    pub fn is_attached(&self, id: ElementId) -> bool {
        let document = self.document.borrow();
        document.elements.contains_key(&id) && document.is_inclusive_ancestor(document.root, id)
    }

    /// Attached and neither the element nor any ancestor carries `HIDDEN`.
    pub fn is_visible(&self, id: ElementId) -> bool {
        let document = self.document.borrow();
        let mut current = Some(id);
        while let Some(node) = current {
            let Some(element) = document.elements.get(&node) else {
                return false;
            };
            if element.has_class(HIDDEN) {
                return false;
            }
            if node == document.root {
                return true;
            }
            current = element.parent;
        }
        false
    }

    pub fn element(&self, id: ElementId) -> Option<Element> {
        self.document.borrow().elements.get(&id).cloned()
    }

    pub fn parent(&self, id: ElementId) -> Option<ElementId> {
        self.document.borrow().elements.get(&id).and_then(|e| e.parent)
    }

    pub fn children(&self, id: ElementId) -> Vec<ElementId> {
        self.document
            .borrow()
            .elements
            .get(&id)
            .map(|e| e.children.clone())
            .unwrap_or_default()
    }

    pub fn has_class(&self, id: ElementId, class: &str) -> bool {
        self.document
            .borrow()
            .elements
            .get(&id)
            .map(|e| e.has_class(class))
            .unwrap_or(false)
    }

    pub fn add_class(&self, id: ElementId, class: &str) {
        if let Some(element) = self.document.borrow_mut().elements.get_mut(&id) {
            if !element.has_class(class) {
                element.classes.push(class.to_string());
            }
        }
    }

    pub fn remove_class(&self, id: ElementId, class: &str) {
        if let Some(element) = self.document.borrow_mut().elements.get_mut(&id) {
            element.classes.retain(|c| c != class);
        }
    }

    /// Flips `class` on the element and returns whether it is now present.
    pub fn toggle_class(&self, id: ElementId, class: &str) -> bool {
        if self.has_class(id, class) {
            self.remove_class(id, class);
            false
        } else {
            self.add_class(id, class);
            self.has_class(id, class)
        }
    }

    /// Attached elements carrying `class`, in document order.
    pub fn find_by_class(&self, class: &str) -> Vec<ElementId> {
        let document = self.document.borrow();
        let mut found = Vec::new();
        let mut pending = vec![document.root];
        while let Some(id) = pending.pop() {
            let Some(element) = document.elements.get(&id) else {
                continue;
            };
            if element.has_class(class) {
                found.push(id);
            }
            pending.extend(element.children.iter().rev());
        }
        found
    }

    pub fn listen(&self, id: ElementId, interaction: Interaction, listener: Rc<dyn Listener>) {
        let mut document = self.document.borrow_mut();
        if document.elements.contains_key(&id) {
            document
                .listeners
                .entry(id)
                .or_default()
                .push((interaction, listener));
        }
    }

    /// Delivers `event` to the listeners on its target and the target's ancestors.
    ///
    /// A listener runs only when it declares no activation target or when its
    /// activation target is the event target, so a node ignores interactions
    /// that bubble up from its descendants. Tasks returned by handlers are
    /// handed back to the caller to spawn or await.
    pub fn dispatch(&self, event: Event) -> Vec<Task> {
        let path_listeners: Vec<Rc<dyn Listener>> = {
            let document = self.document.borrow();
            if !document.elements.contains_key(&event.target) {
                debug!(target_id = %event.target, "dispatch to missing element ignored");
                return Vec::new();
            }

            let mut collected = Vec::new();
            let mut current = Some(event.target);
            while let Some(id) = current {
                if let Some(listeners) = document.listeners.get(&id) {
                    collected.extend(
                        listeners
                            .iter()
                            .filter(|(interaction, _)| *interaction == event.kind)
                            .map(|(_, listener)| listener.clone()),
                    );
                }
                current = document.elements.get(&id).and_then(|e| e.parent);
            }
            collected
        };

        path_listeners
            .into_iter()
            .filter(|listener| {
                listener
                    .activation_target()
                    .map_or(true, |anchor| anchor == event.target)
            })
            .filter_map(|listener| listener.handle(&event))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    struct Counter {
        anchor: Option<ElementId>,
        hits: Cell<usize>,
    }

    impl Listener for Counter {
        fn activation_target(&self) -> Option<ElementId> {
            self.anchor
        }

        fn handle(self: Rc<Self>, _event: &Event) -> Option<Task> {
            self.hits.set(self.hits.get() + 1);
            None
        }
    }

    fn counter(anchor: Option<ElementId>) -> Rc<Counter> {
        Rc::new(Counter {
            anchor,
            hits: Cell::new(0),
        })
    }

    #[test]
    fn test_append_moves_instead_of_copying() {
        let target = RenderTarget::new();
        let a = target.create("div", "a");
        let b = target.create("div", "b");
        let child = target.create("span", "");
        target.append(target.root(), a);
        target.append(target.root(), b);

        assert!(target.append(a, child));
        assert!(target.append(b, child));

        assert!(target.children(a).is_empty());
        assert_eq!(target.children(b), vec![child]);
        assert_eq!(target.parent(child), Some(b));
    }

    #[test]
    fn test_insert_after_places_next_to_reference() {
        let target = RenderTarget::new();
        let first = target.create("img", "");
        let last = target.create("div", "");
        let inserted = target.create("h4", "");
        target.append(target.root(), first);
        target.append(target.root(), last);

        assert!(target.insert_after(first, inserted));
        assert_eq!(target.children(target.root()), vec![first, inserted, last]);
    }

    #[test]
    fn test_insert_after_detached_reference_fails() {
        let target = RenderTarget::new();
        let reference = target.create("img", "");
        let child = target.create("h4", "");

        assert!(!target.insert_after(reference, child));
    }

    #[test]
    fn test_append_rejects_cycles() {
        let target = RenderTarget::new();
        let outer = target.create("div", "");
        let inner = target.create("div", "");
        target.append(outer, inner);

        assert!(!target.append(inner, outer));
    }

    #[test]
    fn test_removal_deletes_owned_detached_elements() {
        let target = RenderTarget::new();
        let item = target.create("li", "");
        let caption = target.create("div", "");
        let title = target.create_with_text("h4", "", "Title");
        target.append(caption, title);
        target.append(target.root(), item);
        target.adopt(item, caption);

        target.clear();

        assert!(!target.exists(item));
        assert!(!target.exists(caption));
        assert!(!target.exists(title));
    }

    #[test]
    fn test_removal_unlinks_owned_element_attached_elsewhere() {
        let target = RenderTarget::new();
        let container = target.create("div", "");
        let page = target.create("div", "");
        let elsewhere = target.create("div", "");
        let owned = target.create("span", "");
        target.append(target.root(), container);
        target.append(container, page);
        target.append(target.root(), elsewhere);
        target.append(elsewhere, owned);
        target.adopt(page, owned);

        target.remove_children(container);

        assert!(!target.exists(page));
        assert!(!target.exists(owned));
        assert!(target.exists(elsewhere));
        assert!(target.children(elsewhere).is_empty());
    }

    #[test]
    fn test_remove_children_deletes_subtree_and_listeners() {
        let target = RenderTarget::new();
        let page = target.create("div", "");
        let button = target.create("span", "");
        target.append(target.root(), page);
        target.append(page, button);
        let listener = counter(None);
        target.listen(button, Interaction::Click, listener.clone());

        target.remove_children(target.root());

        assert!(!target.exists(page));
        assert!(!target.exists(button));
        assert!(target.dispatch(Event::click(button)).is_empty());
        assert_eq!(listener.hits.get(), 0);
        assert_eq!(Rc::strong_count(&listener), 1);
        assert!(!target.append(page, target.create("p", "")));
    }

    #[test]
    fn test_visibility_follows_hidden_ancestors() {
        let target = RenderTarget::new();
        let container = target.create("div", HIDDEN);
        let item = target.create("li", "");
        target.append(container, item);

        assert!(!target.is_visible(item));
        target.append(target.root(), container);
        assert!(!target.is_visible(item));
        target.toggle_class(container, HIDDEN);
        assert!(target.is_visible(item));
        assert!(target.is_attached(item));
    }

    #[test]
    fn test_dispatch_bubbles_but_respects_activation_target() {
        let target = RenderTarget::new();
        let outer = target.create("ul", "");
        let outer_anchor = target.create("h2", "");
        let inner = target.create("ul", "");
        target.append(target.root(), outer);
        target.append(outer, outer_anchor);
        target.append(outer, inner);

        let anchored = counter(Some(outer_anchor));
        let catch_all = counter(None);
        target.listen(outer, Interaction::Click, anchored.clone());
        target.listen(outer, Interaction::Click, catch_all.clone());

        target.dispatch(Event::click(inner));
        assert_eq!(anchored.hits.get(), 0);
        assert_eq!(catch_all.hits.get(), 1);

        target.dispatch(Event::click(outer_anchor));
        assert_eq!(anchored.hits.get(), 1);
        assert_eq!(catch_all.hits.get(), 2);

        target.dispatch(Event::new(Interaction::PointerEnter, outer_anchor));
        assert_eq!(anchored.hits.get(), 1);
    }

    #[test]
    fn test_find_by_class_in_document_order() {
        let target = RenderTarget::new();
        let first = target.create("li", "item");
        let nested = target.create("li", "item");
        let second = target.create("li", "item");
        let detached = target.create("li", "item");
        target.append(target.root(), first);
        target.append(first, nested);
        target.append(target.root(), second);

        assert_eq!(target.find_by_class("item"), vec![first, nested, second]);
        assert!(!target.find_by_class("item").contains(&detached));
    }
}
