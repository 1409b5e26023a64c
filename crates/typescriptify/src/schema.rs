//! Arena of type descriptors keyed by identity.
//!
//! Record fields refer to other records by [`TypeIdentity`] only, so cyclic
//! type graphs are plain data here. The schema is the lookup table the
//! resolver and collector use to follow those references.

use std::collections::HashMap;

use crate::types::{TypeDescriptor, TypeIdentity};

#[derive(Debug, Clone, Default)]
pub struct Schema {
    types: HashMap<TypeIdentity, TypeDescriptor>,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a descriptor. The first registration of an identity wins.
    ///
    /// Returns `false` if the identity was already registered, which is what
    /// terminates recursive registration of self-referencing types.
    pub fn insert(&mut self, descriptor: TypeDescriptor) -> bool {
        if self.types.contains_key(&descriptor.identity) {
            return false;
        }
        self.types.insert(descriptor.identity.clone(), descriptor);
        true
    }

    pub fn get(&self, identity: &TypeIdentity) -> Option<&TypeDescriptor> {
        self.types.get(identity)
    }

    pub fn contains(&self, identity: &TypeIdentity) -> bool {
        self.types.contains_key(identity)
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}
