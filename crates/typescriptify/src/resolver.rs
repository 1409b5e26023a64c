//! Field resolution: from a field descriptor and its tags to the property the
//! emitter renders.
//!
//! Precedence, first match wins:
//!
//! 1. a `ts_type` tag, used verbatim;
//! 2. a well-known mapping registered for the field's record type;
//! 3. the generic fallback for types with their own wire encoding;
//! 4. structural inference through pointers and collections.

use std::collections::{HashMap, HashSet};

use crate::error::{ConvertError, ConvertResult};
use crate::schema::Schema;
use crate::tag::TagOptions;
use crate::types::{FieldDescriptor, FieldKind, TypeDescriptor, TypeIdentity};

/// Type text used when nothing more specific applies.
pub const FALLBACK: &str = "any";

/// A well-known mapping for a type, applied wherever the type appears.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeOverride {
    pub ts_type: String,
    pub ts_transform: Option<String>,
}

impl TypeOverride {
    pub fn new(ts_type: impl Into<String>) -> Self {
        Self {
            ts_type: ts_type.into(),
            ts_transform: None,
        }
    }

    pub fn with_transform(mut self, template: impl Into<String>) -> Self {
        self.ts_transform = Some(template.into());
        self
    }
}

/// The record type a field reconstructs through, and how many collection
/// layers wrap it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NestedRecord {
    pub identity: TypeIdentity,
    pub class_name: String,
    /// `0` for a single nested object, `n` for `n` collection layers.
    pub depth: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedField {
    /// Emitted property name, also the JSON key read by the factory.
    pub name: String,
    pub ts_type: String,
    /// Access expression template containing the placeholder.
    pub transform: Option<String>,
    pub omit_empty: bool,
    pub nested: Option<NestedRecord>,
}

/// A field after embedded-member expansion, with the type that declares it
/// and its parsed tags.
#[derive(Debug, Clone)]
pub struct FieldSlot<'s> {
    pub owner: &'s TypeDescriptor,
    pub field: &'s FieldDescriptor,
    pub options: TagOptions,
}

struct Structural {
    ts_type: String,
    transform: Option<String>,
    nested: Option<NestedRecord>,
}

impl Structural {
    fn scalar(ts_type: &str) -> Self {
        Self {
            ts_type: ts_type.to_string(),
            transform: None,
            nested: None,
        }
    }
}

/// Resolves fields against one schema, prefix and set of well-known mappings.
#[derive(Debug, Clone, Copy)]
pub struct FieldResolver<'s> {
    schema: &'s Schema,
    prefix: &'s str,
    managed: &'s HashMap<TypeIdentity, TypeOverride>,
}

impl<'s> FieldResolver<'s> {
    pub fn new(
        schema: &'s Schema,
        prefix: &'s str,
        managed: &'s HashMap<TypeIdentity, TypeOverride>,
    ) -> Self {
        Self {
            schema,
            prefix,
            managed,
        }
    }

    pub fn schema(&self) -> &'s Schema {
        self.schema
    }

    /// Emitted class name of a record type.
    pub fn class_name(&self, descriptor: &TypeDescriptor) -> String {
        format!("{}{}", self.prefix, descriptor.name)
    }

    /// Fields of `descriptor` in declaration order, with each embedded member
    /// replaced by its own fields at the position it occupied. Excluded fields
    /// are dropped here.
    ///
    /// When several fields serialize under the same name, the least nested
    /// one is kept; among equally nested ones, the first declared.
    pub fn expand(&self, descriptor: &'s TypeDescriptor) -> ConvertResult<Vec<FieldSlot<'s>>> {
        let mut slots = Vec::new();
        let mut embedding = vec![&descriptor.identity];
        self.expand_into(descriptor, &mut embedding, &mut slots)?;

        let mut shallowest: HashMap<String, usize> = HashMap::new();
        for (level, slot) in &slots {
            if let Some(name) = slot.options.serialized_name(&slot.field.name) {
                let entry = shallowest.entry(name.to_string()).or_insert(*level);
                *entry = (*entry).min(*level);
            }
        }

        let mut taken = HashSet::new();
        Ok(slots
            .into_iter()
            .filter(|(level, slot)| match slot.options.serialized_name(&slot.field.name) {
                Some(name) => shallowest.get(name) == Some(level) && taken.insert(name.to_string()),
                None => true,
            })
            .map(|(_, slot)| slot)
            .collect())
    }

    fn expand_into(
        &self,
        owner: &'s TypeDescriptor,
        embedding: &mut Vec<&'s TypeIdentity>,
        slots: &mut Vec<(usize, FieldSlot<'s>)>,
    ) -> ConvertResult<()> {
        for field in &owner.fields {
            let options = field
                .tag
                .parse()
                .map_err(|source| ConvertError::MalformedTag {
                    owner: owner.identity.clone(),
                    field: field.name.clone(),
                    source,
                })?;
            if options.is_excluded() {
                continue;
            }

            if field.embedded
                && let FieldKind::Record(identity) = field.kind.pointee()
            {
                let member = self.lookup(owner, field, identity)?;
                if !member.custom_encoding {
                    if embedding.contains(&&member.identity) {
                        return Err(ConvertError::RecursiveEmbedding {
                            owner: owner.identity.clone(),
                            field: field.name.clone(),
                        });
                    }
                    embedding.push(&member.identity);
                    self.expand_into(member, embedding, slots)?;
                    embedding.pop();
                    continue;
                }
            }

            slots.push((
                embedding.len() - 1,
                FieldSlot {
                    owner,
                    field,
                    options,
                },
            ));
        }
        Ok(())
    }

    /// The record type a field structurally depends on, if any.
    ///
    /// Overridden, unnamed, custom-encoded and well-known fields have none.
    pub fn classify(&self, slot: &FieldSlot<'s>) -> ConvertResult<Option<NestedRecord>> {
        if slot.options.ts_type.is_some()
            || slot.options.serialized_name(&slot.field.name).is_none()
        {
            return Ok(None);
        }

        let mut kind = &slot.field.kind;
        let mut depth = 0;
        loop {
            match kind {
                FieldKind::Pointer(inner) => kind = inner.as_ref(),
                FieldKind::Collection(inner) => {
                    depth += 1;
                    kind = inner.as_ref();
                }
                FieldKind::Record(identity) => {
                    if self.managed.contains_key(identity) {
                        return Ok(None);
                    }
                    let descriptor = self.lookup(slot.owner, slot.field, identity)?;
                    if descriptor.custom_encoding {
                        return Ok(None);
                    }
                    return Ok(Some(NestedRecord {
                        identity: identity.clone(),
                        class_name: self.class_name(descriptor),
                        depth,
                    }));
                }
                _ => return Ok(None),
            }
        }
    }

    /// Resolve a slot into its emitted property. `None` when the field has
    /// no serialized name.
    pub fn resolve(&self, slot: &FieldSlot<'s>) -> ConvertResult<Option<ResolvedField>> {
        let options = &slot.options;
        let Some(name) = options.serialized_name(&slot.field.name) else {
            return Ok(None);
        };

        if let Some(ts_type) = &options.ts_type {
            return Ok(Some(ResolvedField {
                name: name.to_string(),
                ts_type: ts_type.clone(),
                transform: options.ts_transform.clone(),
                omit_empty: options.omit_empty(),
                nested: None,
            }));
        }

        let structural = self.structural(slot, &slot.field.kind, 0)?;
        Ok(Some(ResolvedField {
            name: name.to_string(),
            ts_type: structural.ts_type,
            transform: options.ts_transform.clone().or(structural.transform),
            omit_empty: options.omit_empty(),
            nested: structural.nested,
        }))
    }

    fn structural(
        &self,
        slot: &FieldSlot<'s>,
        kind: &FieldKind,
        depth: usize,
    ) -> ConvertResult<Structural> {
        let quoted = depth == 0 && slot.options.as_string();
        Ok(match kind {
            FieldKind::Bool if quoted => Structural::scalar("string"),
            FieldKind::Bool => Structural::scalar("boolean"),
            FieldKind::Number if quoted => Structural::scalar("string"),
            FieldKind::Number => Structural::scalar("number"),
            FieldKind::String => Structural::scalar("string"),
            FieldKind::Bytes | FieldKind::Map(..) | FieldKind::Any => Structural::scalar(FALLBACK),
            FieldKind::Pointer(inner) => self.structural(slot, inner, depth)?,
            FieldKind::Collection(inner) => {
                let element = self.structural(slot, inner, depth + 1)?;
                Structural {
                    ts_type: array_of(&element.ts_type),
                    transform: None,
                    nested: element.nested,
                }
            }
            FieldKind::Record(identity) => {
                if let Some(mapping) = self.managed.get(identity) {
                    Structural {
                        ts_type: mapping.ts_type.clone(),
                        transform: if depth == 0 {
                            mapping.ts_transform.clone()
                        } else {
                            None
                        },
                        nested: None,
                    }
                } else {
                    let descriptor = self.lookup(slot.owner, slot.field, identity)?;
                    if descriptor.custom_encoding {
                        Structural::scalar(FALLBACK)
                    } else {
                        let class_name = self.class_name(descriptor);
                        Structural {
                            ts_type: class_name.clone(),
                            transform: None,
                            nested: Some(NestedRecord {
                                identity: identity.clone(),
                                class_name,
                                depth,
                            }),
                        }
                    }
                }
            }
        })
    }

    fn lookup(
        &self,
        owner: &TypeDescriptor,
        field: &FieldDescriptor,
        identity: &TypeIdentity,
    ) -> ConvertResult<&'s TypeDescriptor> {
        self.schema
            .get(identity)
            .ok_or_else(|| ConvertError::UnregisteredType {
                owner: owner.identity.clone(),
                field: field.name.clone(),
                identity: identity.clone(),
            })
    }
}

fn array_of(element: &str) -> String {
    if element.contains('|') || element.contains('&') {
        format!("({element})[]")
    } else {
        format!("{element}[]")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TagError;

    fn address() -> TypeDescriptor {
        TypeDescriptor::new("app::Address", "Address")
            .field(FieldDescriptor::new("Duration", FieldKind::Number).json("duration"))
            .field(FieldDescriptor::new("Text1", FieldKind::String).json("text,omitempty"))
    }

    fn schema_with(descriptors: Vec<TypeDescriptor>) -> Schema {
        let mut schema = Schema::new();
        for descriptor in descriptors {
            schema.insert(descriptor);
        }
        schema
    }

    fn resolve_all(
        schema: &Schema,
        prefix: &str,
        managed: &HashMap<TypeIdentity, TypeOverride>,
        identity: &str,
    ) -> ConvertResult<Vec<ResolvedField>> {
        let resolver = FieldResolver::new(schema, prefix, managed);
        let descriptor = schema.get(&TypeIdentity::new(identity.to_string())).unwrap();
        let mut fields = Vec::new();
        for slot in resolver.expand(descriptor)? {
            if let Some(field) = resolver.resolve(&slot)? {
                fields.push(field);
            }
        }
        Ok(fields)
    }

    fn holder(field: FieldDescriptor) -> TypeDescriptor {
        TypeDescriptor::new("app::Holder", "Holder").field(field)
    }

    #[test]
    fn test_primitive_mappings() {
        let schema = schema_with(vec![
            TypeDescriptor::new("app::P", "P")
                .field(FieldDescriptor::new("a", FieldKind::Bool))
                .field(FieldDescriptor::new("b", FieldKind::Number))
                .field(FieldDescriptor::new("c", FieldKind::String))
                .field(FieldDescriptor::new("d", FieldKind::Any))
                .field(FieldDescriptor::new(
                    "e",
                    FieldKind::map(FieldKind::String, FieldKind::Number),
                ))
                .field(FieldDescriptor::new("f", FieldKind::Bytes)),
        ]);
        let fields = resolve_all(&schema, "", &HashMap::new(), "app::P").unwrap();
        let types: Vec<_> = fields.iter().map(|f| f.ts_type.as_str()).collect();
        assert_eq!(types, ["boolean", "number", "string", "any", "any", "any"]);
        assert!(fields.iter().all(|f| f.nested.is_none()));
    }

    #[test]
    fn test_untagged_field_keeps_declared_name() {
        let schema = schema_with(vec![holder(FieldDescriptor::new("Plain", FieldKind::String))]);
        let fields = resolve_all(&schema, "", &HashMap::new(), "app::Holder").unwrap();
        assert_eq!(fields[0].name, "Plain");
    }

    #[test]
    fn test_excluded_and_unnamed_fields_are_dropped() {
        let schema = schema_with(vec![
            TypeDescriptor::new("app::A", "A")
                .field(FieldDescriptor::new("Text2", FieldKind::String).json(",omitempty"))
                .field(FieldDescriptor::new("Text3", FieldKind::String).json("-"))
                .field(FieldDescriptor::new("Kept", FieldKind::String).json("kept")),
        ]);
        let fields = resolve_all(&schema, "", &HashMap::new(), "app::A").unwrap();
        assert_eq!(fields.len(), 1);
        assert_eq!(fields[0].name, "kept");
    }

    #[test]
    fn test_pointer_is_transparent() {
        let schema = schema_with(vec![
            address(),
            holder(
                FieldDescriptor::new(
                    "Address",
                    FieldKind::pointer(FieldKind::pointer(FieldKind::record("app::Address"))),
                )
                .json("address"),
            ),
        ]);
        let fields = resolve_all(&schema, "", &HashMap::new(), "app::Holder").unwrap();
        assert_eq!(fields[0].ts_type, "Address");
        assert_eq!(
            fields[0].nested,
            Some(NestedRecord {
                identity: "app::Address".into(),
                class_name: "Address".to_string(),
                depth: 0,
            })
        );
    }

    #[test]
    fn test_collection_layers_add_markers() {
        let kind = FieldKind::collection(FieldKind::pointer(FieldKind::collection(
            FieldKind::collection(FieldKind::record("app::Address")),
        )));
        let schema = schema_with(vec![address(), holder(FieldDescriptor::new("deep", kind))]);
        let fields = resolve_all(&schema, "", &HashMap::new(), "app::Holder").unwrap();
        assert_eq!(fields[0].ts_type, "Address[][][]");
        assert_eq!(fields[0].nested.as_ref().map(|n| n.depth), Some(3));
    }

    #[test]
    fn test_prefix_applies_to_references_only() {
        let schema = schema_with(vec![
            address(),
            holder(FieldDescriptor::new(
                "all",
                FieldKind::collection(FieldKind::record("app::Address")),
            ))
            .field(FieldDescriptor::new("count", FieldKind::Number)),
        ]);
        let fields = resolve_all(&schema, "test_", &HashMap::new(), "app::Holder").unwrap();
        assert_eq!(fields[0].ts_type, "test_Address[]");
        assert_eq!(fields[1].ts_type, "number");
    }

    #[test]
    fn test_override_wins_and_skips_structure() {
        let schema = schema_with(vec![holder(
            FieldDescriptor::new("Map", FieldKind::map(FieldKind::String, FieldKind::Number))
                .json("map")
                .ts_type("{[key: string]: number}"),
        )]);
        let fields = resolve_all(&schema, "", &HashMap::new(), "app::Holder").unwrap();
        assert_eq!(fields[0].ts_type, "{[key: string]: number}");
        assert_eq!(fields[0].transform, None);
    }

    #[test]
    fn test_override_with_transform() {
        let schema = schema_with(vec![holder(
            FieldDescriptor::new("Time", FieldKind::record("time::Time"))
                .json("time")
                .ts_type("Date")
                .ts_transform("new Date(__VALUE__)"),
        )]);
        // The override means the unregistered record is never looked up.
        let fields = resolve_all(&schema, "", &HashMap::new(), "app::Holder").unwrap();
        assert_eq!(fields[0].ts_type, "Date");
        assert_eq!(fields[0].transform.as_deref(), Some("new Date(__VALUE__)"));
        assert_eq!(fields[0].nested, None);
    }

    #[test]
    fn test_custom_encoding_falls_back_unless_overridden() {
        let ms_time = TypeDescriptor::new("app::MSTime", "MSTime").custom_encoding();
        let schema = schema_with(vec![
            ms_time,
            TypeDescriptor::new("app::S", "S")
                .field(FieldDescriptor::new("Raw", FieldKind::record("app::MSTime")).json("raw"))
                .field(
                    FieldDescriptor::new("Time", FieldKind::record("app::MSTime"))
                        .json("time")
                        .ts_type("number"),
                ),
        ]);
        let fields = resolve_all(&schema, "", &HashMap::new(), "app::S").unwrap();
        assert_eq!(fields[0].ts_type, "any");
        assert_eq!(fields[0].nested, None);
        assert_eq!(fields[1].ts_type, "number");
    }

    #[test]
    fn test_well_known_mapping() {
        let mut managed = HashMap::new();
        managed.insert(
            TypeIdentity::new("chrono::DateTime"),
            TypeOverride::new("Date").with_transform("new Date(__VALUE__)"),
        );
        let schema = schema_with(vec![
            TypeDescriptor::new("app::Event", "Event")
                .field(FieldDescriptor::new(
                    "at",
                    FieldKind::pointer(FieldKind::record("chrono::DateTime")),
                ))
                .field(FieldDescriptor::new(
                    "history",
                    FieldKind::collection(FieldKind::record("chrono::DateTime")),
                ))
                .field(
                    FieldDescriptor::new("raw", FieldKind::record("chrono::DateTime"))
                        .ts_type("string"),
                ),
        ]);
        let fields = resolve_all(&schema, "", &managed, "app::Event").unwrap();
        assert_eq!(fields[0].ts_type, "Date");
        assert_eq!(fields[0].transform.as_deref(), Some("new Date(__VALUE__)"));
        assert_eq!(fields[1].ts_type, "Date[]");
        assert_eq!(fields[1].transform, None);
        assert_eq!(fields[2].ts_type, "string");
        assert_eq!(fields[2].transform, None);
    }

    #[test]
    fn test_union_mapping_is_parenthesized_in_arrays() {
        let mut managed = HashMap::new();
        managed.insert(TypeIdentity::new("app::Id"), TypeOverride::new("string | number"));
        let schema = schema_with(vec![holder(FieldDescriptor::new(
            "ids",
            FieldKind::collection(FieldKind::record("app::Id")),
        ))]);
        let fields = resolve_all(&schema, "", &managed, "app::Holder").unwrap();
        assert_eq!(fields[0].ts_type, "(string | number)[]");
    }

    #[test]
    fn test_json_string_option_quotes_scalars() {
        let schema = schema_with(vec![holder(
            FieldDescriptor::new("Count", FieldKind::Number).json("count,string"),
        )]);
        let fields = resolve_all(&schema, "", &HashMap::new(), "app::Holder").unwrap();
        assert_eq!(fields[0].ts_type, "string");
    }

    #[test]
    fn test_embedded_fields_are_spliced_in_place() {
        let has_name = TypeDescriptor::new("app::HasName", "HasName")
            .field(FieldDescriptor::new("Name", FieldKind::String).json("name"));
        let schema = schema_with(vec![
            has_name,
            TypeDescriptor::new("app::Person", "Person")
                .field(FieldDescriptor::new("Id", FieldKind::Number).json("id"))
                .field(FieldDescriptor::new("HasName", FieldKind::record("app::HasName")).embedded())
                .field(FieldDescriptor::new("Age", FieldKind::Number).json("age")),
        ]);
        let fields = resolve_all(&schema, "", &HashMap::new(), "app::Person").unwrap();
        let names: Vec<_> = fields.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, ["id", "name", "age"]);
    }

    #[test]
    fn test_shallower_field_wins_name_conflict() {
        let has_name = TypeDescriptor::new("app::HasName", "HasName")
            .field(FieldDescriptor::new("Name", FieldKind::String).json("name"))
            .field(FieldDescriptor::new("Nick", FieldKind::String).json("nick"));
        let schema = schema_with(vec![
            has_name,
            TypeDescriptor::new("app::Person", "Person")
                .field(FieldDescriptor::new("HasName", FieldKind::record("app::HasName")).embedded())
                .field(FieldDescriptor::new("Name", FieldKind::Number).json("name"))
                .field(FieldDescriptor::new("Alias", FieldKind::Bool).json("nick"))
                .field(FieldDescriptor::new("Other", FieldKind::Bool).json("nick")),
        ]);
        let fields = resolve_all(&schema, "", &HashMap::new(), "app::Person").unwrap();
        let props: Vec<_> = fields
            .iter()
            .map(|f| (f.name.as_str(), f.ts_type.as_str()))
            .collect();
        assert_eq!(props, [("name", "number"), ("nick", "boolean")]);
    }

    #[test]
    fn test_recursive_embedding_is_rejected() {
        let schema = schema_with(vec![
            TypeDescriptor::new("app::A", "A")
                .field(FieldDescriptor::new("B", FieldKind::record("app::B")).embedded()),
            TypeDescriptor::new("app::B", "B").field(
                FieldDescriptor::new("A", FieldKind::pointer(FieldKind::record("app::A")))
                    .embedded(),
            ),
        ]);
        let err = resolve_all(&schema, "", &HashMap::new(), "app::A").unwrap_err();
        assert!(matches!(err, ConvertError::RecursiveEmbedding { ref field, .. } if field == "A"));
    }

    #[test]
    fn test_malformed_tag_reports_owner_and_field() {
        let schema = schema_with(vec![holder(
            FieldDescriptor::new("Broken", FieldKind::String).tag("json:broken"),
        )]);
        let err = resolve_all(&schema, "", &HashMap::new(), "app::Holder").unwrap_err();
        match err {
            ConvertError::MalformedTag {
                owner,
                field,
                source,
            } => {
                assert_eq!(owner.as_str(), "app::Holder");
                assert_eq!(field, "Broken");
                assert!(matches!(source, TagError::Syntax { .. }));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_unregistered_reference() {
        let schema = schema_with(vec![holder(FieldDescriptor::new(
            "missing",
            FieldKind::record("app::Missing"),
        ))]);
        let err = resolve_all(&schema, "", &HashMap::new(), "app::Holder").unwrap_err();
        assert!(matches!(err, ConvertError::UnregisteredType { ref identity, .. }
            if identity.as_str() == "app::Missing"));
    }

    #[test]
    fn test_classify() {
        let schema = schema_with(vec![
            address(),
            TypeDescriptor::new("app::H", "H")
                .field(FieldDescriptor::new(
                    "list",
                    FieldKind::collection(FieldKind::pointer(FieldKind::record("app::Address"))),
                ))
                .field(
                    FieldDescriptor::new("over", FieldKind::record("app::Address"))
                        .ts_type("object"),
                )
                .field(FieldDescriptor::new("n", FieldKind::Number)),
        ]);
        let managed = HashMap::new();
        let resolver = FieldResolver::new(&schema, "", &managed);
        let descriptor = schema.get(&"app::H".into()).unwrap();
        let slots = resolver.expand(descriptor).unwrap();
        let nested: Vec<_> = slots
            .iter()
            .map(|slot| resolver.classify(slot).unwrap().map(|n| n.depth))
            .collect();
        assert_eq!(nested, [Some(1), None, None]);
    }
}
