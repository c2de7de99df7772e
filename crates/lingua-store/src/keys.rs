//! Key encoding utilities.
//!
//! Document keys are the raw id bytes. Index keys join two components with a
//! NUL separator; neither ids nor normalized emails may contain NUL, so the
//! split is unambiguous.

/// Separator between the components of an index key.
pub const SEPARATOR: u8 = 0;

/// Create a document key from an id.
#[must_use]
pub fn document_key(id: &str) -> Vec<u8> {
    id.as_bytes().to_vec()
}

/// Create a composite index key: `owner || 0x00 || item`.
#[must_use]
pub fn index_key(owner: &str, item: &str) -> Vec<u8> {
    let mut key = Vec::with_capacity(owner.len() + item.len() + 1);
    key.extend_from_slice(owner.as_bytes());
    key.push(SEPARATOR);
    key.extend_from_slice(item.as_bytes());
    key
}

/// Create a prefix for iterating all index entries of an owner.
#[must_use]
pub fn index_prefix(owner: &str) -> Vec<u8> {
    let mut key = Vec::with_capacity(owner.len() + 1);
    key.extend_from_slice(owner.as_bytes());
    key.push(SEPARATOR);
    key
}

/// Extract the item component from a composite index key.
///
/// Returns `None` if the key has no separator or the item is not UTF-8.
#[must_use]
pub fn index_item(key: &[u8]) -> Option<&str> {
    let pos = key.iter().position(|b| *b == SEPARATOR)?;
    std::str::from_utf8(key.get(pos + 1..)?).ok()
}

/// Create the selection pair key for an (email, program) pair.
#[must_use]
pub fn selection_pair_key(email: &str, program_id: &str) -> Vec<u8> {
    index_key(email, program_id)
}
