#![forbid(unsafe_code)]

//! Keyed listener registry.
//!
//! Records are keyed by (element, subscribed type, callback identity), which
//! is unique per registration. Two ordered indexes keep registration order
//! for dispatch (by element and native type) and for per-element queries.

use std::collections::BTreeMap;
use std::rc::Rc;

use fwidget_dom::{EventType, NativeListenerId, NodeId};
use rustc_hash::FxHashMap;

use crate::listener::{
    CallbackId, ContextOverride, ExecutionContext, Listener, ListenerDescriptor, Payload, Phase,
};
use crate::normalize::DomEvent;

/// Listener bound to its context and payload.
pub(crate) type Wrapped = Rc<dyn Fn(&DomEvent, NodeId, Phase)>;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) struct ListenerKey {
    pub element: NodeId,
    pub event_type: EventType,
    pub callback: CallbackId,
}

pub(crate) struct ListenerRecord {
    pub key: ListenerKey,
    pub native_type: EventType,
    pub listener: Listener,
    pub wrapped: Wrapped,
    pub context: ExecutionContext,
    pub payload: Option<Payload>,
    pub context_override: ContextOverride,
    pub capture: bool,
    pub seq: u64,
    pub native: Option<NativeListenerId>,
}

impl ListenerRecord {
    pub fn descriptor(&self) -> ListenerDescriptor {
        ListenerDescriptor {
            event_type: self.key.event_type.clone(),
            callback: self.listener.id(),
            payload: self.payload.clone(),
            context_override: self.context_override.clone(),
            context: self.context.clone(),
            capture: self.capture,
            index: self.seq,
        }
    }
}

#[derive(Default)]
pub(crate) struct ListenerRegistry {
    records: FxHashMap<ListenerKey, ListenerRecord>,
    by_native: FxHashMap<(NodeId, EventType), BTreeMap<u64, ListenerKey>>,
    by_element: FxHashMap<NodeId, BTreeMap<u64, ListenerKey>>,
    next_seq: u64,
}

impl ListenerRegistry {
    pub fn contains(&self, key: &ListenerKey) -> bool {
        self.records.contains_key(key)
    }

    pub fn next_seq(&mut self) -> u64 {
        let seq = self.next_seq;
        self.next_seq += 1;
        seq
    }

    pub fn insert(&mut self, record: ListenerRecord) {
        let key = record.key.clone();
        self.by_native
            .entry((key.element, record.native_type.clone()))
            .or_default()
            .insert(record.seq, key.clone());
        self.by_element
            .entry(key.element)
            .or_default()
            .insert(record.seq, key.clone());
        self.records.insert(key, record);
    }

    pub fn get(&self, key: &ListenerKey) -> Option<&ListenerRecord> {
        self.records.get(key)
    }

    pub fn get_mut(&mut self, key: &ListenerKey) -> Option<&mut ListenerRecord> {
        self.records.get_mut(key)
    }

    pub fn remove(&mut self, key: &ListenerKey) -> Option<ListenerRecord> {
        let record = self.records.remove(key)?;
        let native_key = (key.element, record.native_type.clone());
        if let Some(index) = self.by_native.get_mut(&native_key) {
            index.remove(&record.seq);
            if index.is_empty() {
                self.by_native.remove(&native_key);
            }
        }
        if let Some(index) = self.by_element.get_mut(&key.element) {
            index.remove(&record.seq);
            if index.is_empty() {
                self.by_element.remove(&key.element);
            }
        }
        Some(record)
    }

    /// Keys on `element`, optionally filtered by subscribed type, in
    /// registration order.
    pub fn keys_for(&self, element: NodeId, event_type: Option<&EventType>) -> Vec<ListenerKey> {
        self.by_element
            .get(&element)
            .map(|index| {
                index
                    .values()
                    .filter(|key| event_type.is_none_or(|ty| &key.event_type == ty))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Keys that receive a native `event_type` on `element`. `capture`
    /// restricts to capturing or non-capturing registrations.
    pub fn dispatch_keys(
        &self,
        element: NodeId,
        event_type: &EventType,
        capture: Option<bool>,
    ) -> Vec<ListenerKey> {
        self.by_native
            .get(&(element, event_type.clone()))
            .map(|index| {
                index
                    .values()
                    .filter(|key| {
                        capture.is_none_or(|want| {
                            self.records.get(*key).is_some_and(|r| r.capture == want)
                        })
                    })
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Every key in registration order.
    pub fn all_keys(&self) -> Vec<ListenerKey> {
        let mut records: Vec<&ListenerRecord> = self.records.values().collect();
        records.sort_by_key(|r| r.seq);
        records.into_iter().map(|r| r.key.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }
}
