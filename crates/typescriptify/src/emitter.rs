//! Rendering of class declarations and `createFrom` factories.

use std::collections::HashMap;

use crate::config::ConverterConfig;
use crate::resolver::ResolvedField;
use crate::tag::PLACEHOLDER;

/// Renders one class block per emitted type.
#[derive(Debug, Clone, Copy)]
pub struct Emitter<'a> {
    config: &'a ConverterConfig,
    custom_code: Option<&'a HashMap<String, String>>,
}

impl<'a> Emitter<'a> {
    pub fn new(config: &'a ConverterConfig) -> Self {
        Self {
            config,
            custom_code: None,
        }
    }

    /// Emit a `//[Name:]` ... `//[end]` block in every class, filled from
    /// `custom_code` by class name.
    pub fn with_custom_code(mut self, custom_code: &'a HashMap<String, String>) -> Self {
        self.custom_code = Some(custom_code);
        self
    }

    pub fn render(&self, class_name: &str, fields: &[ResolvedField]) -> String {
        let indent = self.config.indent.as_str();
        let mut output = String::new();

        if self.config.export {
            output.push_str("export ");
        }
        output.push_str(&format!("class {class_name} {{\n"));

        for field in fields {
            let optional = if self.config.optional_omitempty && field.omit_empty {
                "?"
            } else {
                ""
            };
            output.push_str(&format!(
                "{indent}{}{optional}: {};\n",
                field.name, field.ts_type
            ));
        }

        if self.config.create_from {
            let body = indent.repeat(2);
            output.push('\n');
            output.push_str(&format!("{indent}static createFrom(source: any) {{\n"));
            output.push_str(&format!(
                "{body}if ('string' === typeof source) source = JSON.parse(source);\n"
            ));
            output.push_str(&format!("{body}const result = new {class_name}();\n"));
            for field in fields {
                output.push_str(&format!(
                    "{body}result.{} = {};\n",
                    field.name,
                    access_expression(field)
                ));
            }
            output.push_str(&format!("{body}return result;\n"));
            output.push_str(&format!("{indent}}}\n\n"));
        }

        if let Some(custom_code) = self.custom_code {
            let code = custom_code.get(class_name).map(String::as_str).unwrap_or("");
            output.push_str(&format!(
                "{indent}//[{class_name}:]\n{code}\n\n{indent}//[end]\n"
            ));
        }

        output.push('}');
        output
    }
}

/// Expression assigning one field inside `createFrom`.
pub fn access_expression(field: &ResolvedField) -> String {
    let read = format!("source[\"{}\"]", escape_key(&field.name));

    if let Some(template) = &field.transform {
        return template.replace(PLACEHOLDER, &read);
    }

    match &field.nested {
        Some(nested) if nested.depth == 0 => {
            format!("{read} ? {}.createFrom({read}) : null", nested.class_name)
        }
        Some(nested) => format!(
            "{read} ? {read}.map({}) : null",
            element_mapper(&nested.class_name, nested.depth)
        ),
        None => read,
    }
}

fn element_mapper(class_name: &str, depth: usize) -> String {
    if depth <= 1 {
        format!("function(element: any) {{ return {class_name}.createFrom(element); }}")
    } else {
        format!(
            "function(element: any) {{ return element.map({}); }}",
            element_mapper(class_name, depth - 1)
        )
    }
}

fn escape_key(key: &str) -> String {
    key.replace('\\', "\\\\").replace('"', "\\\"")
}
