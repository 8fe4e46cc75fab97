use crate::dom::ElementId;
use futures::future::LocalBoxFuture;
use std::rc::Rc;

/// Deferred work started by a handler, such as fetching a node's children.
///
/// Tasks never hold a borrow of the document across an await point; they run to
/// completion even if the element they were started from is gone by then.
pub type Task = LocalBoxFuture<'static, ()>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interaction {
    Click,
    PointerEnter,
    PointerLeave,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Event {
    pub kind: Interaction,
    pub target: ElementId,
}

impl Event {
    pub fn new(kind: Interaction, target: ElementId) -> Self {
        Self { kind, target }
    }

    pub fn click(target: ElementId) -> Self {
        Self::new(Interaction::Click, target)
    }
}

/// Something reacting to interactions on an element or its descendants.
pub trait Listener {
    /// The only element whose interactions activate this listener.
    ///
    /// `None` accepts every event bubbling through the element it is registered on.
    fn activation_target(&self) -> Option<ElementId> {
        None
    }

    fn handle(self: Rc<Self>, event: &Event) -> Option<Task>;
}
