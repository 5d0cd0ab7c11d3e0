use serde::Deserialize;
use std::collections::HashSet;
use std::fs;
use std::path::Path;

#[derive(Deserialize)]
struct Block {
    id: i32,
    name: String,
    /// Protocol number of the release that introduced this block.
    since: i32,
}

/// Load all JSON files from a directory, deserialize as Vec<T>, merge, and sort by ID.
fn load_from_dir<T: serde::de::DeserializeOwned>(dir: &Path, id_fn: fn(&T) -> i32) -> Vec<T> {
    let mut all = Vec::new();
    let mut entries: Vec<_> = fs::read_dir(dir)
        .unwrap_or_else(|e| panic!("Cannot read directory {:?}: {}", dir, e))
        .filter_map(|e| e.ok())
        .filter(|e| e.path().extension().is_some_and(|ext| ext == "json"))
        .collect();
    entries.sort_by_key(|e| e.file_name());
    for entry in entries {
        let path = entry.path();
        let contents = fs::read_to_string(&path)
            .unwrap_or_else(|e| panic!("Cannot read {:?}: {}", path, e));
        let items: Vec<T> = serde_json::from_str(&contents)
            .unwrap_or_else(|e| panic!("Invalid JSON in {:?}: {}", path, e));
        all.extend(items);
    }
    all.sort_by_key(|item| id_fn(item));
    all
}

/// Append `pub fn <signature> { match <scrutinee> { <arms> _ => None } }` to `out`.
fn emit_lookup(out: &mut String, doc: &str, signature: &str, scrutinee: &str, arms: Vec<String>) {
    out.push_str(&format!("/// {}\npub fn {} {{\n    match {} {{\n", doc, signature, scrutinee));
    for arm in arms {
        out.push_str(&format!("        {},\n", arm));
    }
    out.push_str("        _ => None,\n    }\n}\n\n");
}

fn main() {
    let manifest_dir = std::env::var("CARGO_MANIFEST_DIR").expect("CARGO_MANIFEST_DIR not set");
    let data_dir = Path::new(&manifest_dir).join("../../data/legacy");
    let out_dir = std::env::var("OUT_DIR").expect("OUT_DIR not set");

    let blocks_dir = data_dir.join("blocks");
    let blocks: Vec<Block> = load_from_dir(&blocks_dir, |b| b.id);

    let mut seen = HashSet::new();
    for b in &blocks {
        assert!(
            (0..=0xFFF).contains(&b.id),
            "Block id {} ({}) does not fit in 12 bits",
            b.id,
            b.name
        );
        assert!(seen.insert(b.id), "Duplicate block id {} ({})", b.id, b.name);
    }

    let mut out = String::new();
    emit_lookup(
        &mut out,
        "Map a legacy block type id to its registry name.",
        "legacy_block_name(type_id: i32) -> Option<&'static str>",
        "type_id",
        blocks.iter().map(|b| format!("{} => Some({:?})", b.id, b.name)).collect(),
    );
    emit_lookup(
        &mut out,
        "Map a registry name to its legacy block type id.",
        "legacy_block_id(name: &str) -> Option<i32>",
        "name",
        blocks.iter().map(|b| format!("{:?} => Some({})", b.name, b.id)).collect(),
    );
    emit_lookup(
        &mut out,
        "Protocol number of the release that introduced a legacy block type.",
        "legacy_block_since(type_id: i32) -> Option<i32>",
        "type_id",
        blocks.iter().map(|b| format!("{} => Some({})", b.id, b.since)).collect(),
    );
    out.push_str("/// Number of block types in the legacy registry.\n");
    out.push_str(&format!("pub const LEGACY_BLOCK_COUNT: usize = {};\n", blocks.len()));

    fs::write(Path::new(&out_dir).join("generated.rs"), out)
        .unwrap_or_else(|e| panic!("Cannot write generated.rs: {}", e));

    println!("cargo:rerun-if-changed={}", blocks_dir.display());
}
