include!(concat!(env!("OUT_DIR"), "/generated.rs"));

/// Returns true if the block type exists in the release with the given protocol number.
pub fn legacy_block_exists_in(type_id: i32, protocol: i32) -> bool {
    legacy_block_since(type_id).is_some_and(|since| since <= protocol)
}

/// Highest legacy block type id that the given release knows about.
pub fn legacy_max_block_type(protocol: i32) -> Option<i32> {
    (0..=0xFF).rev().find(|&id| legacy_block_exists_in(id, protocol))
}
