//! Contact and sensor events
//!
//! Events are produced at the end of each step by diffing this step's
//! touching pairs against the previous step's, handed to the registered
//! callback, and dropped.

use crate::physics::body::{BodyId, UserTag};
use crate::physics::collision::ContactManifold;
use std::collections::BTreeMap;

/// Whether a pair started or stopped touching this step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContactPhase {
    Begin,
    End,
}

/// Transient description of a pair transition
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContactEvent {
    pub phase: ContactPhase,
    /// Lower id of the canonical pair
    pub body_a: BodyId,
    pub body_b: BodyId,
    pub tag_a: Option<UserTag>,
    pub tag_b: Option<UserTag>,
    /// Normal (A to B) and point; `None` for sensor overlaps
    pub manifold: Option<ContactManifold>,
}

impl ContactEvent {
    pub fn is_begin(&self) -> bool {
        self.phase == ContactPhase::Begin
    }

    /// The other body of the pair, if `id` is part of it
    pub fn other(&self, id: BodyId) -> Option<BodyId> {
        if id == self.body_a {
            Some(self.body_b)
        } else if id == self.body_b {
            Some(self.body_a)
        } else {
            None
        }
    }
}

/// Callback receiving contact or sensor events
pub type EventCallback = Box<dyn FnMut(&ContactEvent) + Send>;

/// What the world remembers about a touching pair between steps
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct PairRecord {
    pub tag_a: Option<UserTag>,
    pub tag_b: Option<UserTag>,
    pub manifold: Option<ContactManifold>,
}

pub(crate) type PairSet = BTreeMap<(BodyId, BodyId), PairRecord>;

/// Emit begin events for new pairs and end events for vanished ones, in pair order
pub(crate) fn diff_pairs(previous: &PairSet, current: &PairSet, mut emit: impl FnMut(ContactEvent)) {
    for (&(body_a, body_b), record) in current {
        if !previous.contains_key(&(body_a, body_b)) {
            emit(event(ContactPhase::Begin, body_a, body_b, record));
        }
    }
    for (&(body_a, body_b), record) in previous {
        if !current.contains_key(&(body_a, body_b)) {
            emit(event(ContactPhase::End, body_a, body_b, record));
        }
    }
}

fn event(phase: ContactPhase, body_a: BodyId, body_b: BodyId, record: &PairRecord) -> ContactEvent {
    ContactEvent {
        phase,
        body_a,
        body_b,
        tag_a: record.tag_a,
        tag_b: record.tag_b,
        manifold: record.manifold,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slotmap::SlotMap;

    fn record() -> PairRecord {
        PairRecord {
            tag_a: None,
            tag_b: Some(UserTag(7)),
            manifold: None,
        }
    }

    #[test]
    fn test_diff_emits_transitions_only() {
        let mut keys: SlotMap<BodyId, ()> = SlotMap::with_key();
        let a = keys.insert(());
        let b = keys.insert(());
        let c = keys.insert(());

        let mut previous = PairSet::new();
        previous.insert((a, b), record());
        previous.insert((a, c), record());

        let mut current = PairSet::new();
        current.insert((a, b), record());
        current.insert((b, c), record());

        let mut events = Vec::new();
        diff_pairs(&previous, &current, |e| events.push(e));

        assert_eq!(events.len(), 2);
        assert_eq!(events[0].phase, ContactPhase::Begin);
        assert_eq!((events[0].body_a, events[0].body_b), (b, c));
        assert_eq!(events[1].phase, ContactPhase::End);
        assert_eq!((events[1].body_a, events[1].body_b), (a, c));
        assert_eq!(events[1].tag_b, Some(UserTag(7)));
        assert_eq!(events[1].other(c), Some(a));
    }
}
