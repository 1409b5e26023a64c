use std::env;
use std::path::PathBuf;

use typescriptify::Converter;

fn main() {
    let manifest_dir = PathBuf::from(env::var("CARGO_MANIFEST_DIR").unwrap());
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());

    let mut converter = Converter::new();
    converter.config_mut().output.header = Some(
        "/* Generated TypeScript bindings for typescriptify-example.\n   \
         These classes match the Rust structs in src/lib.rs */"
            .to_string(),
    );

    // Register every type annotated with #[derive(TypeScriptify)]
    converter
        .add_source_file(manifest_dir.join("src/lib.rs"))
        .expect("Failed to parse source file");

    // Write to OUT_DIR (standard cargo location)
    converter
        .convert_to_file(out_dir.join("bindings.ts"))
        .expect("Failed to write bindings");

    // Also write to a more accessible location during development
    converter.config_mut().output.preserve_custom_code = true;
    converter
        .convert_to_file(manifest_dir.join("generated/bindings.ts"))
        .ok();

    println!("cargo:rerun-if-changed=src/lib.rs");
    println!("cargo:rerun-if-changed=build.rs");
}
