/// Per-file rewrite state, threaded through exactly one compilation
/// unit's traversal and discarded with it. Each field is written at most
/// once during the package visit and read at most once later in the same
/// pass; values left unread simply expire with the context.
#[derive(Debug, Default)]
pub struct RewriteContext {
    /// The original package detected on the file.
    pub rename_from: Option<String>,
    /// The computed destination package (empty string when the package is
    /// being removed entirely).
    pub rename_to: Option<String>,
    /// Leading trivia displaced by a deleted package declaration, waiting
    /// for the next file element to absorb it.
    pub pending_prefix: Option<String>,
}

impl RewriteContext {
    pub fn new() -> Self {
        Self::default()
    }
}
