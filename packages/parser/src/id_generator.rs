use crate::ast::Node;

/// Prefix of every generated element id
pub const ID_PREFIX: &str = "el-";

/// Sequential id allocator for tree nodes (`el-1`, `el-2`, ...).
///
/// Threaded explicitly through the parser and the tree operations so that two
/// trees (or two tests) never share a counter by accident.
#[derive(Debug, Clone, Default)]
pub struct IdGenerator {
    count: u64,
}

impl IdGenerator {
    pub fn new() -> Self {
        Self { count: 0 }
    }

    /// Generator whose next id is `el-<count + 1>`
    pub fn starting_after(count: u64) -> Self {
        Self { count }
    }

    /// Generate next sequential ID
    pub fn new_id(&mut self) -> String {
        self.count += 1;
        format!("{}{}", ID_PREFIX, self.count)
    }

    /// Last suffix handed out (or synced to)
    pub fn count(&self) -> u64 {
        self.count
    }

    /// Make sure no future id reuses a suffix up to `suffix`.
    /// The counter never moves backwards.
    pub fn advance_past(&mut self, suffix: u64) {
        self.count = self.count.max(suffix);
    }

    /// Resynchronize with a tree loaded from outside, so fresh ids never
    /// collide with the ones already in it
    pub fn sync_with(&mut self, root: &Node) {
        self.advance_past(max_id_suffix(root));
    }
}

/// Largest `el-<n>` suffix anywhere in the tree, 0 when there is none
pub fn max_id_suffix(node: &Node) -> u64 {
    node.children
        .iter()
        .map(max_id_suffix)
        .chain(parse_id_suffix(&node.id))
        .max()
        .unwrap_or(0)
}

/// Numeric suffix of a generated id, `None` for ids outside the `el-<n>` pattern
pub fn parse_id_suffix(id: &str) -> Option<u64> {
    let digits = id.strip_prefix(ID_PREFIX)?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}
