//! End-to-end scenarios built from hand-written descriptors.
//!
//! Output is compared line by line with surrounding whitespace trimmed, so the
//! expected text only has to get the line structure right.

use typescriptify::{
    ConvertError, Converter, FieldDescriptor, FieldKind, TypeDescriptor, TypeOverride,
};

fn assert_code(converter: &Converter, expected: &str) {
    let code = converter.convert().unwrap();
    let actual: Vec<&str> = code.trim().lines().map(str::trim).collect();
    let wanted: Vec<&str> = expected.trim().lines().map(str::trim).collect();
    assert_eq!(actual, wanted, "\nExpected:\n{expected}\n\nGot:\n{code}");
}

fn address() -> TypeDescriptor {
    TypeDescriptor::new("fixtures::Address", "Address")
        .field(FieldDescriptor::new("Duration", FieldKind::Number).json("duration"))
        .field(FieldDescriptor::new("Text1", FieldKind::String).json("text,omitempty"))
        .field(FieldDescriptor::new("Text2", FieldKind::String).json(",omitempty"))
        .field(FieldDescriptor::new("Text3", FieldKind::String).json("-"))
}

fn dummy() -> TypeDescriptor {
    TypeDescriptor::new("fixtures::Dummy", "Dummy")
        .field(FieldDescriptor::new("Something", FieldKind::String).json("something"))
}

fn has_name() -> TypeDescriptor {
    TypeDescriptor::new("fixtures::HasName", "HasName")
        .field(FieldDescriptor::new("Name", FieldKind::String).json("name"))
}

fn person() -> TypeDescriptor {
    TypeDescriptor::new("fixtures::Person", "Person")
        .field(FieldDescriptor::new("HasName", FieldKind::record("fixtures::HasName")).embedded())
        .field(
            FieldDescriptor::new("Nicknames", FieldKind::collection(FieldKind::String))
                .json("nicknames"),
        )
        .field(
            FieldDescriptor::new(
                "Addresses",
                FieldKind::collection(FieldKind::record("fixtures::Address")),
            )
            .json("addresses"),
        )
        .field(
            FieldDescriptor::new(
                "Address",
                FieldKind::pointer(FieldKind::record("fixtures::Address")),
            )
            .json("address"),
        )
        .field(
            FieldDescriptor::new("Metadata", FieldKind::Bytes)
                .tag(r#"json:"metadata" ts_type:"{[key:string]:string}""#),
        )
        .field(
            FieldDescriptor::new(
                "Friends",
                FieldKind::collection(FieldKind::pointer(FieldKind::record("fixtures::Person"))),
            )
            .json("friends"),
        )
        .field(FieldDescriptor::new("Dummy", FieldKind::record("fixtures::Dummy")).json("a"))
}

fn person_converter() -> Converter {
    let mut converter = Converter::new();
    converter
        .set_create_from(false)
        .define(has_name())
        .define(address())
        .define(dummy());
    converter
}

const PERSON_CLASSES: &str = r#"
export class Address {
    duration: number;
    text: string;
}

export class Dummy {
    something: string;
}

export class Person {
    name: string;
    nicknames: string[];
    addresses: Address[];
    address: Address;
    metadata: {[key:string]:string};
    friends: Person[];
    a: Dummy;
}
"#;

#[test]
fn test_person_with_types() {
    let mut converter = person_converter();
    converter.add_type(person());
    assert_code(&converter, PERSON_CLASSES);
}

#[test]
fn test_person_registered_twice() {
    let mut converter = person_converter();
    converter.add_type(person()).add_type(person());
    assert_code(&converter, PERSON_CLASSES);
}

#[test]
fn test_person_not_exported() {
    let mut converter = person_converter();
    converter
        .set_export(false)
        .add_type(person())
        .add_type(dummy());

    let expected = PERSON_CLASSES.replace("export class", "class");
    assert_code(&converter, &expected);
}

#[test]
fn test_with_prefix() {
    let mut converter = Converter::new();
    converter
        .set_prefix("test_")
        .set_create_from(false)
        .set_export(false)
        .add_type(address())
        .add_type(dummy());

    assert_code(
        &converter,
        r#"
        class test_Address {
            duration: number;
            text: string;
        }

        class test_Dummy {
            something: string;
        }
        "#,
    );
}

#[test]
fn test_map_with_type_override() {
    let mut converter = Converter::new();
    converter.set_create_from(false).add_type(
        TypeDescriptor::new("fixtures::TestCustomType", "TestCustomType").field(
            FieldDescriptor::new("Map", FieldKind::map(FieldKind::String, FieldKind::Number))
                .json("map")
                .ts_type("{[key: string]: number}"),
        ),
    );

    assert_code(
        &converter,
        r#"
        export class TestCustomType {
            map: {[key: string]: number};
        }
        "#,
    );
}

#[test]
fn test_date_transform() {
    let mut converter = Converter::new();
    converter.add_type(
        TypeDescriptor::new("fixtures::TestCustomType", "TestCustomType").field(
            FieldDescriptor::new("Time", FieldKind::String)
                .json("time")
                .ts_type("Date")
                .ts_transform("new Date(__VALUE__)"),
        ),
    );

    assert_code(
        &converter,
        r#"
        export class TestCustomType {
            time: Date;

            static createFrom(source: any) {
                if ('string' === typeof source) source = JSON.parse(source);
                const result = new TestCustomType();
                result.time = new Date(source["time"]);
                return result;
            }

        }
        "#,
    );
}

#[test]
fn test_self_referencing_collection() {
    let mut converter = Converter::new();
    converter.add_type(
        TypeDescriptor::new("fixtures::Test", "Test").field(
            FieldDescriptor::new(
                "Children",
                FieldKind::collection(FieldKind::record("fixtures::Test")),
            )
            .json("children"),
        ),
    );

    assert_code(
        &converter,
        r#"
        export class Test {
            children: Test[];

            static createFrom(source: any) {
                if ('string' === typeof source) source = JSON.parse(source);
                const result = new Test();
                result.children = source["children"] ? source["children"].map(function(element: any) { return Test.createFrom(element); }) : null;
                return result;
            }

        }
        "#,
    );
}

#[test]
fn test_array_of_arrays() {
    let mut converter = Converter::new();
    converter
        .define(
            TypeDescriptor::new("fixtures::Key", "Key")
                .field(FieldDescriptor::new("Key", FieldKind::String).json("key")),
        )
        .add_type(
            TypeDescriptor::new("fixtures::Keyboard", "Keyboard").field(
                FieldDescriptor::new(
                    "Keys",
                    FieldKind::collection(FieldKind::collection(FieldKind::record(
                        "fixtures::Key",
                    ))),
                )
                .json("keys"),
            ),
        );

    assert_code(
        &converter,
        r#"
        export class Key {
            key: string;

            static createFrom(source: any) {
                if ('string' === typeof source) source = JSON.parse(source);
                const result = new Key();
                result.key = source["key"];
                return result;
            }

        }

        export class Keyboard {
            keys: Key[][];

            static createFrom(source: any) {
                if ('string' === typeof source) source = JSON.parse(source);
                const result = new Keyboard();
                result.keys = source["keys"] ? source["keys"].map(function(element: any) { return element.map(function(element: any) { return Key.createFrom(element); }); }) : null;
                return result;
            }

        }
        "#,
    );
}

#[test]
fn test_any_field() {
    let mut converter = Converter::new();
    converter.add_type(
        TypeDescriptor::new("fixtures::Test", "Test")
            .field(FieldDescriptor::new("Any", FieldKind::Any).json("field")),
    );

    assert_code(
        &converter,
        r#"
        export class Test {
            field: any;

            static createFrom(source: any) {
                if ('string' === typeof source) source = JSON.parse(source);
                const result = new Test();
                result.field = source["field"];
                return result;
            }

        }
        "#,
    );
}

#[test]
fn test_custom_encoded_type_with_override() {
    let mut converter = Converter::new();
    converter
        .set_create_from(false)
        .define(TypeDescriptor::new("fixtures::MsTime", "MsTime").custom_encoding())
        .add_type(
            TypeDescriptor::new("fixtures::SomeStruct", "SomeStruct")
                .field(
                    FieldDescriptor::new("Time", FieldKind::record("fixtures::MsTime"))
                        .json("time")
                        .ts_type("number"),
                )
                .field(
                    FieldDescriptor::new("Raw", FieldKind::record("fixtures::MsTime"))
                        .json("raw"),
                ),
        );

    assert_code(
        &converter,
        r#"
        export class SomeStruct {
            time: number;
            raw: any;
        }
        "#,
    );
}

#[test]
fn test_string_option_quotes_scalars() {
    let mut converter = Converter::new();
    converter.set_create_from(false).add_type(
        TypeDescriptor::new("fixtures::Quoted", "Quoted")
            .field(FieldDescriptor::new("Id", FieldKind::Number).json("id,string"))
            .field(FieldDescriptor::new("Flag", FieldKind::Bool).json("flag,string"))
            .field(
                FieldDescriptor::new("Ids", FieldKind::collection(FieldKind::Number))
                    .json("ids,string"),
            ),
    );

    assert_code(
        &converter,
        r#"
        export class Quoted {
            id: string;
            flag: string;
            ids: number[];
        }
        "#,
    );
}

#[test]
fn test_managed_type_in_collection_keeps_plain_access() {
    let mut converter = Converter::new();
    converter
        .manage_type(
            "fixtures::Time",
            TypeOverride::new("Date").with_transform("new Date(__VALUE__)"),
        )
        .add_type(
            TypeDescriptor::new("fixtures::Log", "Log")
                .field(FieldDescriptor::new("At", FieldKind::record("fixtures::Time")).json("at"))
                .field(
                    FieldDescriptor::new(
                        "History",
                        FieldKind::collection(FieldKind::record("fixtures::Time")),
                    )
                    .json("history"),
                ),
        );

    assert_code(
        &converter,
        r#"
        export class Log {
            at: Date;
            history: Date[];

            static createFrom(source: any) {
                if ('string' === typeof source) source = JSON.parse(source);
                const result = new Log();
                result.at = new Date(source["at"]);
                result.history = source["history"];
                return result;
            }

        }
        "#,
    );
}

#[test]
fn test_mutual_references_call_back_into_each_factory() {
    let mut converter = Converter::new();
    converter
        .define(
            TypeDescriptor::new("fixtures::Edge", "Edge").field(
                FieldDescriptor::new(
                    "Target",
                    FieldKind::pointer(FieldKind::record("fixtures::Node")),
                )
                .json("target"),
            ),
        )
        .add_type(
            TypeDescriptor::new("fixtures::Node", "Node").field(
                FieldDescriptor::new(
                    "Edges",
                    FieldKind::collection(FieldKind::record("fixtures::Edge")),
                )
                .json("edges"),
            ),
        );

    assert_code(
        &converter,
        r#"
        export class Edge {
            target: Node;

            static createFrom(source: any) {
                if ('string' === typeof source) source = JSON.parse(source);
                const result = new Edge();
                result.target = source["target"] ? Node.createFrom(source["target"]) : null;
                return result;
            }

        }

        export class Node {
            edges: Edge[];

            static createFrom(source: any) {
                if ('string' === typeof source) source = JSON.parse(source);
                const result = new Node();
                result.edges = source["edges"] ? source["edges"].map(function(element: any) { return Edge.createFrom(element); }) : null;
                return result;
            }

        }
        "#,
    );
}

#[test]
fn test_embedded_name_conflict_keeps_outer_field() {
    let mut converter = Converter::new();
    converter
        .set_create_from(false)
        .define(has_name())
        .add_type(
            TypeDescriptor::new("fixtures::Named", "Named")
                .field(
                    FieldDescriptor::new("HasName", FieldKind::record("fixtures::HasName"))
                        .embedded(),
                )
                .field(FieldDescriptor::new("Name", FieldKind::Number).json("name")),
        );

    assert_code(
        &converter,
        r#"
        export class Named {
            name: number;
        }
        "#,
    );
}

#[test]
fn test_unregistered_field_type_aborts() {
    let mut converter = Converter::new();
    converter.add_type(dummy()).add_type(
        TypeDescriptor::new("fixtures::Holder", "Holder").field(
            FieldDescriptor::new("Missing", FieldKind::record("fixtures::Missing")).json("missing"),
        ),
    );

    match converter.convert() {
        Err(ConvertError::UnregisteredType { identity, .. }) => {
            assert_eq!(identity.as_str(), "fixtures::Missing");
        }
        other => panic!("expected UnregisteredType, got {other:?}"),
    }
}

#[test]
fn test_recursive_embedding_aborts() {
    let mut converter = Converter::new();
    converter.add_type(
        TypeDescriptor::new("fixtures::Loop", "Loop")
            .field(FieldDescriptor::new("Loop", FieldKind::record("fixtures::Loop")).embedded()),
    );

    assert!(matches!(
        converter.convert(),
        Err(ConvertError::RecursiveEmbedding { .. })
    ));
}
