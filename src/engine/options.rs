/// Options consumed by the inference engine (`spec.md` §6.1).
#[derive(Debug, Clone)]
pub struct EngineOptions {
    /// If true, newly discovered dependencies are enqueued for transitive
    /// inference; if false, the queue only ever contains the seed(s).
    pub recurse: bool,
    /// Diff context expansion around each hunk.
    pub context_lines: u32,
    /// Revision expressions; any candidate dependency found on the
    /// ancestry of any entry is filtered out. Resolved lazily, on first use.
    pub exclude_commits: Vec<String>,
    /// Enables diagnostic logging. Does not affect results.
    pub debug: bool,
}

impl Default for EngineOptions {
    fn default() -> Self {
        EngineOptions {
            recurse: false,
            context_lines: 1,
            exclude_commits: Vec::new(),
            debug: false,
        }
    }
}
