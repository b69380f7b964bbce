//! Typed opaque handles and the table that owns the objects behind them.
//!
//! The renderer refers to objects such as descriptor sets through a [`Handle`]. The [`HandleTable`] owns one strong
//! reference to each live object. Destructing a handle only drops that reference, so an object that is still
//! referenced elsewhere (for example by an in-flight command buffer) is only destroyed once those references are gone
//! too.

use std::collections::HashMap;
use std::marker::PhantomData;
use std::sync::Arc;

/// Opaque handle to an object of type `T` stored in a [`HandleTable`].
#[derive(Derivative)]
#[derivative(
    Debug(bound = ""),
    Copy(bound = ""),
    Clone(bound = ""),
    PartialEq(bound = ""),
    Eq(bound = ""),
    Hash(bound = "")
)]
pub struct Handle<T> {
    id: u64,
    #[derivative(Debug = "ignore")]
    _marker: PhantomData<fn() -> T>,
}

impl<T> Handle<T> {
    /// The numeric id of this handle. Ids are never reused within one table.
    pub fn id(&self) -> u64 {
        self.id
    }
}

/// Hands out handles for reference-counted objects.
#[derive(Derivative)]
#[derivative(Debug(bound = "T: std::fmt::Debug"))]
pub struct HandleTable<T> {
    objects: HashMap<Handle<T>, Arc<T>>,
    next_id: u64,
}

impl<T> HandleTable<T> {
    pub fn new() -> Self {
        Self {
            objects: HashMap::new(),
            next_id: 1,
        }
    }

    /// Store an object and return a fresh handle to it.
    pub fn construct(&mut self, object: T) -> Handle<T> {
        let handle = Handle {
            id: self.next_id,
            _marker: PhantomData,
        };
        self.next_id += 1;
        self.objects.insert(handle, Arc::new(object));
        handle
    }

    pub fn get(&self, handle: Handle<T>) -> Option<&Arc<T>> {
        self.objects.get(&handle)
    }

    /// Remove the table's reference to the object. Returns the removed reference, if the handle was live.
    pub fn destruct(&mut self, handle: Handle<T>) -> Option<Arc<T>> {
        self.objects.remove(&handle)
    }

    /// Number of live handles.
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}

impl<T> Default for HandleTable<T> {
    fn default() -> Self {
        Self::new()
    }
}
