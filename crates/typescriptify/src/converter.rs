//! The conversion entry point.

use std::collections::HashMap;
use std::path::Path;

use tracing::debug;

use crate::collector::collect;
use crate::config::ConverterConfig;
use crate::emitter::Emitter;
use crate::error::{ConvertResult, WriteError};
use crate::registry::{TypeMapping, TypeRegistry};
use crate::resolver::{FieldResolver, TypeOverride};
use crate::schema::Schema;
use crate::traits::TsRecord;
use crate::types::{TypeDescriptor, TypeIdentity};
use crate::writer::{OutputWriter, WriteOutcome, read_custom_code};

/// Accumulates root types and configuration, and renders them as TypeScript
/// classes.
///
/// Every call to [`convert`](Converter::convert) runs the whole pipeline from
/// the registered roots; nothing is cached between calls.
///
/// # Example
///
/// ```
/// use typescriptify::{Converter, FieldDescriptor, FieldKind, TypeDescriptor};
///
/// let mut converter = Converter::new();
/// converter.set_create_from(false).add_type(
///     TypeDescriptor::new("app::Dummy", "Dummy")
///         .field(FieldDescriptor::new("Something", FieldKind::String).json("something")),
/// );
///
/// let code = converter.convert().unwrap();
/// assert_eq!(code, "export class Dummy {\n    something: string;\n}\n");
/// ```
#[derive(Debug, Clone, Default)]
pub struct Converter {
    schema: Schema,
    roots: Vec<TypeIdentity>,
    managed: HashMap<TypeIdentity, TypeOverride>,
    config: ConverterConfig,

    /// Rust path mappings used when extracting types from source.
    pub(crate) registry: TypeRegistry,
}

impl Converter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: ConverterConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub fn config(&self) -> &ConverterConfig {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut ConverterConfig {
        &mut self.config
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Registered roots, in registration order and including duplicates.
    pub fn roots(&self) -> &[TypeIdentity] {
        &self.roots
    }

    /// Register `T` as a root, together with every record type it refers to.
    pub fn add<T: TsRecord>(&mut self) -> &mut Self {
        T::visit(&mut self.schema);
        self.roots.push(T::identity());
        self
    }

    /// Register the type of `sample` as a root. Only the type is used.
    pub fn add_value<T: TsRecord>(&mut self, _sample: &T) -> &mut Self {
        self.add::<T>()
    }

    /// Register a hand-built descriptor as a root.
    ///
    /// Record types it refers to must be registered with
    /// [`define`](Converter::define) or as roots themselves.
    pub fn add_type(&mut self, descriptor: TypeDescriptor) -> &mut Self {
        self.roots.push(descriptor.identity.clone());
        self.schema.insert(descriptor);
        self
    }

    /// Make a descriptor available for references without registering it as
    /// a root.
    pub fn define(&mut self, descriptor: TypeDescriptor) -> &mut Self {
        self.schema.insert(descriptor);
        self
    }

    /// Map every occurrence of a record type to a fixed TypeScript type.
    pub fn manage_type(
        &mut self,
        identity: impl Into<TypeIdentity>,
        mapping: TypeOverride,
    ) -> &mut Self {
        self.managed.insert(identity.into(), mapping);
        self
    }

    /// Teach the source extractor a fully-qualified Rust path.
    pub fn register_type(&mut self, path: impl Into<String>, mapping: TypeMapping) -> &mut Self {
        self.registry.register(path, mapping);
        self
    }

    pub fn unregister_type(&mut self, path: &str) -> Option<TypeMapping> {
        self.registry.unregister(path)
    }

    pub fn set_prefix(&mut self, prefix: impl Into<String>) -> &mut Self {
        self.config.prefix = prefix.into();
        self
    }

    pub fn set_export(&mut self, export: bool) -> &mut Self {
        self.config.export = export;
        self
    }

    pub fn set_create_from(&mut self, create_from: bool) -> &mut Self {
        self.config.create_from = create_from;
        self
    }

    pub fn set_indent(&mut self, indent: impl Into<String>) -> &mut Self {
        self.config.indent = indent.into();
        self
    }

    pub fn set_prologue(&mut self, prologue: impl Into<String>) -> &mut Self {
        self.config.prologue = Some(prologue.into());
        self
    }

    pub fn set_epilogue(&mut self, epilogue: impl Into<String>) -> &mut Self {
        self.config.epilogue = Some(epilogue.into());
        self
    }

    pub fn set_optional_omitempty(&mut self, enabled: bool) -> &mut Self {
        self.config.optional_omitempty = enabled;
        self
    }

    /// Render every type reachable from the roots.
    pub fn convert(&self) -> ConvertResult<String> {
        self.render(None)
    }

    /// Like [`convert`](Converter::convert), with a custom code block in every
    /// class, filled from `custom_code` by emitted class name.
    pub fn convert_with_custom_code(
        &self,
        custom_code: &HashMap<String, String>,
    ) -> ConvertResult<String> {
        self.render(Some(custom_code))
    }

    /// Convert and write the result to `path` as configured in
    /// [`OutputConfig`](crate::OutputConfig).
    pub fn convert_to_file(&self, path: impl AsRef<Path>) -> Result<WriteOutcome, WriteError> {
        let path = path.as_ref();
        let code = if self.config.output.preserve_custom_code {
            self.convert_with_custom_code(&read_custom_code(path)?)?
        } else {
            self.convert()?
        };
        OutputWriter::from_config(&self.config.output).write(path, &code)
    }

    fn render(&self, custom_code: Option<&HashMap<String, String>>) -> ConvertResult<String> {
        debug!(roots = self.roots.len(), types = self.schema.len(), "converting");

        let resolver = FieldResolver::new(&self.schema, &self.config.prefix, &self.managed);
        let order = collect(&resolver, &self.roots)?;

        let mut emitter = Emitter::new(&self.config);
        if let Some(custom_code) = custom_code {
            emitter = emitter.with_custom_code(custom_code);
        }

        let mut blocks = Vec::with_capacity(order.len());
        for &descriptor in &order {
            let mut fields = Vec::new();
            for slot in resolver.expand(descriptor)? {
                if let Some(field) = resolver.resolve(&slot)? {
                    fields.push(field);
                }
            }
            blocks.push(emitter.render(&resolver.class_name(descriptor), &fields));
        }

        let mut sections = Vec::new();
        if let Some(prologue) = self.config.prologue.as_deref().map(str::trim_end)
            && !prologue.is_empty()
        {
            sections.push(prologue.to_string());
        }
        if !blocks.is_empty() {
            sections.push(blocks.join("\n\n"));
        }
        if let Some(epilogue) = self.config.epilogue.as_deref().map(str::trim_end)
            && !epilogue.is_empty()
        {
            sections.push(epilogue.to_string());
        }

        let mut output = sections.join("\n\n");
        if !output.is_empty() {
            output.push('\n');
        }

        debug!(classes = order.len(), bytes = output.len(), "converted");
        Ok(output)
    }
}
