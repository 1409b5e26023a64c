//! Discovery of every record type reachable from the roots.
//!
//! The traversal is depth-first and emits in post-order: a type is appended
//! only after every type it references has been appended, so dependencies
//! always precede their dependents. Ties are broken by first discovery (roots
//! in registration order, then fields in declaration order with embedded
//! members expanded in place). A type is marked visited before its fields are
//! scanned, which is what terminates self and mutual recursion.

use std::collections::HashSet;

use tracing::trace;

use crate::error::{ConvertError, ConvertResult};
use crate::resolver::FieldResolver;
use crate::types::{TypeDescriptor, TypeIdentity};

struct TypeCollector<'r, 's> {
    resolver: &'r FieldResolver<'s>,
    visited: HashSet<TypeIdentity>,
    order: Vec<&'s TypeDescriptor>,
}

/// Produce the duplicate-free emission sequence for `roots`.
///
/// Duplicate roots are ignored, as are roots whose type carries its own wire
/// encoding.
pub fn collect<'s>(
    resolver: &FieldResolver<'s>,
    roots: &[TypeIdentity],
) -> ConvertResult<Vec<&'s TypeDescriptor>> {
    let mut collector = TypeCollector {
        resolver,
        visited: HashSet::new(),
        order: Vec::new(),
    };

    for identity in roots {
        if !collector.visited.insert(identity.clone()) {
            continue;
        }
        let descriptor = resolver
            .schema()
            .get(identity)
            .ok_or_else(|| ConvertError::UnregisteredRoot {
                identity: identity.clone(),
            })?;
        if descriptor.custom_encoding {
            trace!(identity = %identity, "skipping custom-encoded root");
            continue;
        }
        collector.visit(descriptor)?;
    }

    Ok(collector.order)
}

impl<'r, 's> TypeCollector<'r, 's> {
    fn visit(&mut self, descriptor: &'s TypeDescriptor) -> ConvertResult<()> {
        for slot in self.resolver.expand(descriptor)? {
            if let Some(nested) = self.resolver.classify(&slot)?
                && self.visited.insert(nested.identity.clone())
            {
                let dependency = self.resolver.schema().get(&nested.identity).ok_or_else(|| {
                    ConvertError::UnregisteredType {
                        owner: slot.owner.identity.clone(),
                        field: slot.field.name.clone(),
                        identity: nested.identity.clone(),
                    }
                })?;
                self.visit(dependency)?;
            }
        }

        trace!(identity = %descriptor.identity, position = self.order.len(), "collected type");
        self.order.push(descriptor);
        Ok(())
    }
}
