/// Prints a debug message with a colored prefix, gated by the engine's
/// `debug` option rather than a compile-time flag: `spec.md` makes `debug`
/// a runtime option consumed by every `find_dependencies` call, so the
/// check has to happen at the call site, not at build time.
pub fn debug_log(enabled: bool, msg: &str) {
    if enabled {
        eprintln!("\x1b[1;33m[git-deps]\x1b[0m {}", msg);
    }
}
