//! Lets the renderer and tools know which markings changed without polling every marking.
//! Subscribers are not serialized, they are recreated by whoever needs them.

use crate::MarkingID;
use std::collections::BTreeSet;
use std::sync::{Arc, Mutex};

#[derive(Eq, PartialEq, Hash, Copy, Clone, Debug)]
pub enum UpdateType {
    /// Lines, rules, crosswalks or fillers were edited, or points moved
    Marking,
    /// The marking was dropped with its road element
    Released,
}

#[derive(Default)]
pub struct MarkingSubscribers(Mutex<Vec<MarkingSubscriber>>);

impl MarkingSubscribers {
    pub fn subscribe(&self, filter: UpdateType) -> MarkingSubscriber {
        let sub = MarkingSubscriber::new(filter);
        self.0.lock().unwrap().push(sub.clone());
        sub
    }

    pub fn dispatch(&self, update_type: UpdateType, id: MarkingID) {
        let mut me = self.0.lock().unwrap();
        for sub in me.iter_mut() {
            sub.dispatch(update_type, id);
        }
    }

    pub fn dispatch_clear(&self) {
        let me = self.0.lock().unwrap();
        for sub in me.iter() {
            sub.inner.lock().unwrap().cleared = true;
        }
    }
}

#[derive(Default)]
pub struct MarkingSubscriberInner {
    pub updated: BTreeSet<MarkingID>,
    pub cleared: bool,
}

/// Describes a subscriber to a specific UpdateType
#[derive(Clone)]
pub struct MarkingSubscriber {
    filter: UpdateType,
    inner: Arc<Mutex<MarkingSubscriberInner>>,
}

impl MarkingSubscriber {
    pub fn new(update_type: UpdateType) -> Self {
        Self {
            filter: update_type,
            inner: Default::default(),
        }
    }

    pub fn take_updated(&mut self) -> impl Iterator<Item = MarkingID> {
        let mut inner = self.inner.lock().unwrap();
        std::mem::take(&mut inner.updated).into_iter()
    }

    pub fn take_one_updated(&mut self) -> Option<MarkingID> {
        let mut inner = self.inner.lock().unwrap();
        inner.updated.pop_first()
    }

    pub fn take_cleared(&mut self) -> bool {
        let mut inner = self.inner.lock().unwrap();
        std::mem::take(&mut inner.cleared)
    }

    pub fn dispatch(&mut self, update_type: UpdateType, id: MarkingID) {
        if update_type != self.filter {
            return;
        }
        let mut inner = self.inner.lock().unwrap();
        inner.updated.insert(id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filters_by_type() {
        let subs = MarkingSubscribers::default();
        let mut edits = subs.subscribe(UpdateType::Marking);
        let mut released = subs.subscribe(UpdateType::Released);

        subs.dispatch(UpdateType::Marking, MarkingID::Node(3));
        subs.dispatch(UpdateType::Marking, MarkingID::Node(3));
        subs.dispatch(UpdateType::Released, MarkingID::Segment(1));

        assert_eq!(edits.take_updated().collect::<Vec<_>>(), vec![MarkingID::Node(3)]);
        assert_eq!(edits.take_one_updated(), None);
        assert_eq!(released.take_one_updated(), Some(MarkingID::Segment(1)));

        subs.dispatch_clear();
        assert!(edits.take_cleared());
        assert!(!edits.take_cleared());
    }
}
