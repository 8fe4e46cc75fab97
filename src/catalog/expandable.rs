//! The lazily populated accordion node shared by users and albums.
//!
//! A node fetches its children the first time it is opened and keeps them for
//! the rest of its life. Later toggles only show or hide the children container.
//! Only one fetch is ever issued per node: while it is pending, toggles are
//! ignored, and a failed fetch leaves the node loaded with no children.

use crate::api_client::FetchError;
use crate::dom::{ElementId, Event, Interaction, Listener, RenderTarget, Task, HIDDEN};
use futures::future::{FutureExt, LocalBoxFuture};
use std::cell::RefCell;
use std::rc::Rc;
use tracing::{debug, warn};

/// Loads the child descriptors of the node with the given identifier.
pub type ChildFetch<C> = Rc<dyn Fn(u64) -> LocalBoxFuture<'static, Result<Vec<C>, FetchError>>>;

/// Builds the rendered child for one descriptor.
pub type ChildRender<C, H> = Rc<dyn Fn(C) -> H>;

/// A rendered component with a single root element.
pub trait Mounted {
    fn root(&self) -> ElementId;
}

impl<T: Mounted> Mounted for Rc<T> {
    fn root(&self) -> ElementId {
        (**self).root()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpansionState {
    Collapsed,
    Loading,
    ExpandedEmpty,
    ExpandedLoaded,
}

/// Element tags and classes of a node and its parts.
pub struct NodeLayout {
    pub tag: &'static str,
    pub class: &'static str,
    pub header_tag: &'static str,
    pub container_tag: &'static str,
    pub container_class: &'static str,
}

enum Children<H> {
    NotFetched,
    Pending,
    Loaded(Vec<H>),
}

pub struct ExpandableNode<C, H> {
    id: u64,
    target: RenderTarget,
    element: ElementId,
    anchor: ElementId,
    container: ElementId,
    children: RefCell<Children<H>>,
    fetch_children: ChildFetch<C>,
    render_child: ChildRender<C, H>,
}

impl<C: 'static, H: Mounted + Clone + 'static> ExpandableNode<C, H> {
    /// Builds the node's elements, detached, and registers its click listener.
    ///
    /// The header is the node's anchor; the children container starts hidden.
    pub fn mount(
        target: &RenderTarget,
        id: u64,
        layout: &NodeLayout,
        label: &str,
        fetch_children: ChildFetch<C>,
        render_child: ChildRender<C, H>,
    ) -> Rc<Self> {
        let element = target.create(layout.tag, layout.class);
        let anchor = target.create_with_text(layout.header_tag, "", label);
        let container = target.create(
            layout.container_tag,
            &format!("{} {}", layout.container_class, HIDDEN),
        );
        target.append(element, anchor);
        target.append(element, container);

        let node = Rc::new(Self {
            id,
            target: target.clone(),
            element,
            anchor,
            container,
            children: RefCell::new(Children::NotFetched),
            fetch_children,
            render_child,
        });
        target.listen(element, Interaction::Click, node.clone());
        node
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn anchor(&self) -> ElementId {
        self.anchor
    }

    pub fn container(&self) -> ElementId {
        self.container
    }

    pub fn expansion_state(&self) -> ExpansionState {
        match &*self.children.borrow() {
            Children::NotFetched => ExpansionState::Collapsed,
            Children::Pending => ExpansionState::Loading,
            Children::Loaded(_) if self.target.has_class(self.container, HIDDEN) => {
                ExpansionState::Collapsed
            }
            Children::Loaded(children) if children.is_empty() => ExpansionState::ExpandedEmpty,
            Children::Loaded(_) => ExpansionState::ExpandedLoaded,
        }
    }

    /// The rendered children, empty until the fetch has completed.
    pub fn children(&self) -> Vec<H> {
        match &*self.children.borrow() {
            Children::Loaded(children) => children.clone(),
            _ => Vec::new(),
        }
    }

    /// Opens or closes the node.
    ///
    /// The first call returns the task that fetches and renders the children;
    /// the caller decides whether to spawn or await it. Calls while that task is
    /// pending do nothing. Once loaded, calls flip the container's visibility.
    pub fn toggle(self: &Rc<Self>) -> Option<Task> {
        let mut children = self.children.borrow_mut();
        match &*children {
            Children::Loaded(_) => {
                self.target.toggle_class(self.container, HIDDEN);
                None
            }
            Children::Pending => {
                debug!(node = self.id, "toggle ignored while children are loading");
                None
            }
            Children::NotFetched => {
                *children = Children::Pending;
                let node = self.clone();
                Some(async move { node.load_children().await }.boxed_local())
            }
        }
    }

    async fn load_children(self: Rc<Self>) {
        let fetched = (self.fetch_children)(self.id).await;

        let rendered = if !self.target.exists(self.container) {
            debug!(node = self.id, "node was removed before its children arrived");
            Vec::new()
        } else {
            match fetched {
                Ok(descriptors) => descriptors
                    .into_iter()
                    .map(|descriptor| (self.render_child)(descriptor))
                    .collect(),
                Err(e) => {
                    warn!(node = self.id, error = %e, "failed to fetch children, showing none");
                    Vec::new()
                }
            }
        };

        for child in &rendered {
            self.target.append(self.container, child.root());
        }
        self.target.remove_class(self.container, HIDDEN);
        *self.children.borrow_mut() = Children::Loaded(rendered);
    }
}

impl<C, H> Mounted for ExpandableNode<C, H> {
    fn root(&self) -> ElementId {
        self.element
    }
}

impl<C: 'static, H: Mounted + Clone + 'static> Listener for ExpandableNode<C, H> {
    fn activation_target(&self) -> Option<ElementId> {
        Some(self.anchor)
    }

    fn handle(self: Rc<Self>, _event: &Event) -> Option<Task> {
        self.toggle()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::future::join_all;
    use std::cell::Cell;

    const LAYOUT: NodeLayout = NodeLayout {
        tag: "ul",
        class: "node",
        header_tag: "h2",
        container_tag: "div",
        container_class: "spoiler",
    };

    #[derive(Clone)]
    struct Leaf {
        element: ElementId,
    }

    impl Mounted for Leaf {
        fn root(&self) -> ElementId {
            self.element
        }
    }

    type TestNode = ExpandableNode<String, Leaf>;

    fn counting_fetch(
        result: Result<Vec<String>, String>,
    ) -> (ChildFetch<String>, Rc<Cell<usize>>) {
        let calls = Rc::new(Cell::new(0));
        let counter = calls.clone();
        let fetch: ChildFetch<String> = Rc::new(move |_id: u64| {
            counter.set(counter.get() + 1);
            let result = result.clone().map_err(FetchError::Other);
            async move { result }.boxed_local()
        });
        (fetch, calls)
    }

    fn leaf_render(target: &RenderTarget) -> ChildRender<String, Leaf> {
        let target = target.clone();
        Rc::new(move |label: String| Leaf {
            element: target.create_with_text("li", "leaf", &label),
        })
    }

    fn mounted_node(
        result: Result<Vec<String>, String>,
    ) -> (RenderTarget, Rc<TestNode>, Rc<Cell<usize>>) {
        let target = RenderTarget::new();
        let (fetch, calls) = counting_fetch(result);
        let node = ExpandableNode::mount(&target, 1, &LAYOUT, "Node", fetch, leaf_render(&target));
        target.append(target.root(), node.root());
        (target, node, calls)
    }

    #[tokio::test]
    async fn test_children_are_fetched_once_and_cached() {
        let (target, node, calls) = mounted_node(Ok(vec!["a".into(), "b".into()]));
        assert_eq!(node.expansion_state(), ExpansionState::Collapsed);

        node.toggle().expect("first toggle starts a fetch").await;
        assert_eq!(node.expansion_state(), ExpansionState::ExpandedLoaded);
        assert_eq!(target.find_by_class("leaf").len(), 2);

        for _ in 0..5 {
            assert!(node.toggle().is_none());
        }
        assert_eq!(node.expansion_state(), ExpansionState::Collapsed);
        assert!(node.toggle().is_none());
        assert_eq!(node.expansion_state(), ExpansionState::ExpandedLoaded);

        assert_eq!(calls.get(), 1);
        assert_eq!(target.find_by_class("leaf").len(), 2);
    }

    #[tokio::test]
    async fn test_toggles_while_loading_are_ignored() {
        let (target, node, calls) = mounted_node(Ok(vec!["a".into()]));

        let first = node.toggle().expect("first toggle starts a fetch");
        assert_eq!(node.expansion_state(), ExpansionState::Loading);
        assert!(node.toggle().is_none());
        assert!(node.toggle().is_none());

        first.await;
        assert_eq!(calls.get(), 1);
        assert_eq!(node.children().len(), 1);
        assert!(target.is_visible(node.children()[0].root()));
    }

    #[tokio::test]
    async fn test_failed_fetch_marks_node_loaded_and_empty() {
        let (target, node, calls) = mounted_node(Err("offline".into()));

        node.toggle().expect("first toggle starts a fetch").await;

        assert_eq!(node.expansion_state(), ExpansionState::ExpandedEmpty);
        assert!(target.children(node.container()).is_empty());
        assert!(node.toggle().is_none());
        assert!(node.toggle().is_none());
        assert_eq!(calls.get(), 1);
    }

    #[tokio::test]
    async fn test_only_anchor_clicks_toggle_the_node() {
        let (target, node, calls) = mounted_node(Ok(vec!["a".into()]));

        assert!(target.dispatch(Event::click(node.root())).is_empty());
        assert_eq!(calls.get(), 0);

        join_all(target.dispatch(Event::click(node.anchor()))).await;
        assert_eq!(node.expansion_state(), ExpansionState::ExpandedLoaded);

        let leaf = node.children()[0].root();
        assert!(target.dispatch(Event::click(leaf)).is_empty());
        assert_eq!(node.expansion_state(), ExpansionState::ExpandedLoaded);
    }

    #[tokio::test]
    async fn test_fetch_completing_after_removal_is_harmless() {
        let (target, node, calls) = mounted_node(Ok(vec!["a".into()]));

        let task = node.toggle().expect("first toggle starts a fetch");
        target.remove_children(target.root());
        task.await;

        assert_eq!(calls.get(), 1);
        assert!(node.children().is_empty());
        assert!(target.find_by_class("leaf").is_empty());
        assert!(target.children(target.root()).is_empty());
    }

    #[test]
    fn test_clearing_the_tree_releases_the_node() {
        let (target, node, _) = mounted_node(Ok(Vec::new()));
        let weak = Rc::downgrade(&node);
        drop(node);
        assert!(weak.upgrade().is_some());

        target.clear();
        assert!(weak.upgrade().is_none());
    }
}
