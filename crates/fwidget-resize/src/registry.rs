#![forbid(unsafe_code)]

//! Id-keyed table of live engines.
//!
//! Binding the same element twice hands back the engine that already owns
//! it instead of building a second one.

use std::cell::RefCell;
use std::rc::Rc;

use fwidget_dom::{Document, NodeId};
use rustc_hash::FxHashMap;

use crate::config::ResizeConfig;
use crate::engine::ResizeEngine;
use crate::error::ResizeError;

pub type SharedEngine = Rc<RefCell<ResizeEngine>>;

#[derive(Debug, Default)]
pub struct ResizeRegistry {
    instances: FxHashMap<String, SharedEngine>,
}

impl ResizeRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The engine bound to `element`, creating it if needed. The flag is
    /// true when a new engine was built; `config` is ignored otherwise.
    pub fn get_or_create(
        &mut self,
        doc: &mut Document,
        element: NodeId,
        config: ResizeConfig,
    ) -> Result<(SharedEngine, bool), ResizeError> {
        if let Some(existing) = doc.id_attr(element).and_then(|id| self.instances.get(id)) {
            tracing::debug!(element = %element, "element already resizable, reusing engine");
            return Ok((Rc::clone(existing), false));
        }
        let engine = ResizeEngine::new(doc, element, config)?;
        let id = engine.id().to_owned();
        let shared = Rc::new(RefCell::new(engine));
        self.instances.insert(id, Rc::clone(&shared));
        Ok((shared, true))
    }

    /// Track an engine built elsewhere. An engine already registered under
    /// the same id wins and is returned.
    pub fn register(&mut self, engine: ResizeEngine) -> SharedEngine {
        let id = engine.id().to_owned();
        Rc::clone(
            self.instances
                .entry(id)
                .or_insert_with(|| Rc::new(RefCell::new(engine))),
        )
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<SharedEngine> {
        self.instances.get(id).cloned()
    }

    /// Forget an engine without tearing it down.
    pub fn remove(&mut self, id: &str) -> Option<SharedEngine> {
        self.instances.remove(id)
    }

    /// Tear down and forget. Returns false when nothing was registered
    /// under `id`.
    pub fn destroy(&mut self, doc: &mut Document, id: &str) -> bool {
        let Some(engine) = self.instances.remove(id) else {
            return false;
        };
        engine.borrow_mut().destroy(doc);
        true
    }

    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.instances.contains_key(id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.instances.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    /// Registered ids, sorted.
    #[must_use]
    pub fn ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.instances.keys().cloned().collect();
        ids.sort();
        ids
    }
}
