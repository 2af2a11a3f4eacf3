//! Named registries with typed integer handles.

use std::collections::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;

use crate::error::GraphicsError;

/// Index of a `T` in its [`Registry`].
///
/// Handles are assigned densely in insertion order and stay valid for the
/// registry's lifetime; entries are never removed.
pub struct Handle<T> {
    index: u32,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Handle<T> {
    fn new(index: u32) -> Self {
        Self {
            index,
            _marker: PhantomData,
        }
    }

    /// Raw index.
    pub fn index(self) -> usize {
        self.index as usize
    }
}

impl<T> Clone for Handle<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Handle<T> {}

impl<T> PartialEq for Handle<T> {
    fn eq(&self, other: &Self) -> bool {
        self.index == other.index
    }
}

impl<T> Eq for Handle<T> {}

impl<T> Hash for Handle<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.index.hash(state);
    }
}

impl<T> fmt::Debug for Handle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Handle({})", self.index)
    }
}

/// Entries of one kind, addressable by unique name or by [`Handle`].
///
/// Names and handles are in one-to-one correspondence.
#[derive(Debug)]
pub struct Registry<T> {
    entries: Vec<T>,
    names: Vec<String>,
    by_name: HashMap<String, Handle<T>>,
}

impl<T> Registry<T> {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            names: Vec::new(),
            by_name: HashMap::new(),
        }
    }

    /// Add `value` under `name`.
    ///
    /// # Errors
    ///
    /// Returns [`GraphicsError::DuplicateName`] if `name` is taken.
    pub fn insert(&mut self, name: impl Into<String>, value: T) -> Result<Handle<T>, GraphicsError> {
        let name = name.into();
        if self.by_name.contains_key(&name) {
            return Err(GraphicsError::DuplicateName(name));
        }
        let index = u32::try_from(self.entries.len())
            .map_err(|_| GraphicsError::Internal("registry is full".to_string()))?;
        let handle = Handle::new(index);
        self.entries.push(value);
        self.names.push(name.clone());
        self.by_name.insert(name, handle);
        Ok(handle)
    }

    /// Look up the handle registered under `name`.
    pub fn handle(&self, name: &str) -> Option<Handle<T>> {
        self.by_name.get(name).copied()
    }

    /// Name of the entry behind `handle`.
    pub fn name(&self, handle: Handle<T>) -> Option<&str> {
        self.names.get(handle.index()).map(String::as_str)
    }

    /// Entry behind `handle`.
    pub fn get(&self, handle: Handle<T>) -> Option<&T> {
        self.entries.get(handle.index())
    }

    /// Mutable entry behind `handle`.
    pub fn get_mut(&mut self, handle: Handle<T>) -> Option<&mut T> {
        self.entries.get_mut(handle.index())
    }

    /// Look up an entry by name.
    pub fn by_name(&self, name: &str) -> Option<&T> {
        self.handle(name).and_then(|handle| self.get(handle))
    }

    /// Iterate entries in handle order.
    pub fn iter(&self) -> impl Iterator<Item = (Handle<T>, &T)> {
        self.entries
            .iter()
            .enumerate()
            .map(|(i, entry)| (Handle::new(i as u32), entry))
    }

    /// Iterate entries mutably in handle order.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (Handle<T>, &mut T)> {
        self.entries
            .iter_mut()
            .enumerate()
            .map(|(i, entry)| (Handle::new(i as u32), entry))
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the registry has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<T> Default for Registry<T> {
    fn default() -> Self {
        Self::new()
    }
}
