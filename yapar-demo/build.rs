// build.rs
use std::path::PathBuf;
use yapar_gen::{ArtifactFormat, GenConfig};

fn main() {
    let manifest_dir = std::env::var("CARGO_MANIFEST_DIR").unwrap();
    let out_dir = PathBuf::from(std::env::var("OUT_DIR").unwrap());

    let input_file = PathBuf::from(&manifest_dir).join("src/brackets.yalp");
    let output_file = out_dir.join("parser_data.rs");
    println!("cargo:rerun-if-changed={}", input_file.display());
    yapar_gen::generate(
        &input_file,
        &output_file,
        ArtifactFormat::Rust,
        &GenConfig::default(),
    )
    .unwrap();
}
