use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::rc::Rc;

/// What a drag gesture is doing to the node under it. Only `Move` drags pin
/// simulated positions; anything else pauses the simulation outright.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DragOperation {
    Move,
    Other(String),
}

/// Notifications that cross the graph/layout seam.
#[derive(Debug, Clone, PartialEq)]
pub enum GraphEvent {
    DragStart {
        node: String,
        operation: DragOperation,
    },
    DragEnd {
        node: String,
        operation: DragOperation,
    },
    CollapseChanged {
        node: String,
        collapsed: bool,
    },
}

#[derive(Debug, Default)]
struct BusInner {
    next_id: u64,
    queues: HashMap<u64, VecDeque<GraphEvent>>,
}

/// Single-threaded publish/subscribe channel scoped to one graph. Handles
/// are cheap clones of the same underlying bus; subscribers poll their queue
/// rather than registering callbacks, so a layout can drain drag events at
/// its own cadence and release its subscription on destroy.
#[derive(Debug, Clone, Default)]
pub struct EventBus {
    inner: Rc<RefCell<BusInner>>,
}

/// A live subscription id. Events published after `subscribe` accumulate in
/// the subscriber's queue until drained or unsubscribed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubscriptionId(u64);

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self) -> SubscriptionId {
        let mut inner = self.inner.borrow_mut();
        let id = inner.next_id;
        inner.next_id += 1;
        inner.queues.insert(id, VecDeque::new());
        SubscriptionId(id)
    }

    /// Safe to call with an already-released id.
    pub fn unsubscribe(&self, id: SubscriptionId) {
        self.inner.borrow_mut().queues.remove(&id.0);
    }

    pub fn emit(&self, event: GraphEvent) {
        for queue in self.inner.borrow_mut().queues.values_mut() {
            queue.push_back(event.clone());
        }
    }

    /// Removes and returns everything queued for this subscription. An
    /// unknown id yields an empty batch.
    pub fn drain(&self, id: SubscriptionId) -> Vec<GraphEvent> {
        self.inner
            .borrow_mut()
            .queues
            .get_mut(&id.0)
            .map(|queue| queue.drain(..).collect())
            .unwrap_or_default()
    }
}
