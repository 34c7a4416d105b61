//! Optional callables invoked by the merge engine.

use std::fmt;

use crate::error::Result;
use crate::record::{Body, Record};

pub type MapBody = Box<dyn Fn(Body) -> Body>;
pub type MapInsert<R> = Box<dyn Fn(Body) -> Result<R>>;
pub type MapUpdate<R> = Box<dyn Fn(&R, Body) -> Body>;
pub type AfterHook<R> = Box<dyn Fn(&R)>;

/// Hook slots for a collection. Every slot is optional; an empty slot falls
/// back to the default behaviour noted on its setter.
///
/// Hooks only ever see shared borrows of records and are owned by the
/// collection they are installed on, so they cannot mutate that collection
/// while a merge is running.
pub struct Hooks<R> {
    pub(crate) map_record: Option<MapBody>,
    pub(crate) map_upsert: Option<MapBody>,
    pub(crate) map_insert: Option<MapInsert<R>>,
    pub(crate) map_update: Option<MapUpdate<R>>,
    pub(crate) after_insert: Option<AfterHook<R>>,
    pub(crate) after_update: Option<AfterHook<R>>,
    pub(crate) after_upsert: Option<AfterHook<R>>,
}

impl<R> Default for Hooks<R> {
    fn default() -> Self {
        Self {
            map_record: None,
            map_upsert: None,
            map_insert: None,
            map_update: None,
            after_insert: None,
            after_update: None,
            after_upsert: None,
        }
    }
}

impl<R: Record> Hooks<R> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Applied first to every incoming body. Default: unchanged.
    pub fn map_record<F>(mut self, f: F) -> Self
    where
        F: Fn(Body) -> Body + 'static,
    {
        self.map_record = Some(Box::new(f));
        self
    }

    /// Applied to every incoming body after `map_record`, before the body's
    /// key is read. Default: unchanged.
    pub fn map_upsert<F>(mut self, f: F) -> Self
    where
        F: Fn(Body) -> Body + 'static,
    {
        self.map_upsert = Some(Box::new(f));
        self
    }

    /// Builds the stored record on the insert path. Default: `R::from_body`.
    pub fn map_insert<F>(mut self, f: F) -> Self
    where
        F: Fn(Body) -> Result<R> + 'static,
    {
        self.map_insert = Some(Box::new(f));
        self
    }

    /// Returns the fields merged onto an existing record on the update path.
    /// Default: the whole body.
    pub fn map_update<F>(mut self, f: F) -> Self
    where
        F: Fn(&R, Body) -> Body + 'static,
    {
        self.map_update = Some(Box::new(f));
        self
    }

    pub fn after_insert<F>(mut self, f: F) -> Self
    where
        F: Fn(&R) + 'static,
    {
        self.after_insert = Some(Box::new(f));
        self
    }

    pub fn after_update<F>(mut self, f: F) -> Self
    where
        F: Fn(&R) + 'static,
    {
        self.after_update = Some(Box::new(f));
        self
    }

    /// Runs for every merged body, after `after_insert`/`after_update`.
    pub fn after_upsert<F>(mut self, f: F) -> Self
    where
        F: Fn(&R) + 'static,
    {
        self.after_upsert = Some(Box::new(f));
        self
    }

    /// Whether `map_record` or `map_upsert` may rewrite incoming bodies.
    pub(crate) fn maps_bodies(&self) -> bool {
        self.map_record.is_some() || self.map_upsert.is_some()
    }

    pub(crate) fn prepare(&self, body: Body) -> Body {
        let body = match &self.map_record {
            Some(map) => map(body),
            None => body,
        };
        match &self.map_upsert {
            Some(map) => map(body),
            None => body,
        }
    }

    pub(crate) fn insert(&self, body: Body) -> Result<R> {
        match &self.map_insert {
            Some(map) => map(body),
            None => R::from_body(body),
        }
    }

    pub(crate) fn update(&self, existing: &R, body: Body) -> Body {
        match &self.map_update {
            Some(map) => map(existing, body),
            None => body,
        }
    }

    pub(crate) fn inserted(&self, record: &R) {
        if let Some(hook) = &self.after_insert {
            hook(record);
        }
        if let Some(hook) = &self.after_upsert {
            hook(record);
        }
    }

    pub(crate) fn updated(&self, record: &R) {
        if let Some(hook) = &self.after_update {
            hook(record);
        }
        if let Some(hook) = &self.after_upsert {
            hook(record);
        }
    }
}

impl<R> fmt::Debug for Hooks<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Hooks")
            .field("map_record", &self.map_record.is_some())
            .field("map_upsert", &self.map_upsert.is_some())
            .field("map_insert", &self.map_insert.is_some())
            .field("map_update", &self.map_update.is_some())
            .field("after_insert", &self.after_insert.is_some())
            .field("after_update", &self.after_update.is_some())
            .field("after_upsert", &self.after_upsert.is_some())
            .finish()
    }
}
