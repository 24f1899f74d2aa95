use std::process::Command;

use crate::commit::{Commit, CommitId};
use crate::config::Config;
use crate::events::Listener;

/// Output shape for [`TextListener`], independent of the engine's own
/// options since a caller can drive the engine non-recursively while still
/// wanting `--log`-style output, or vice versa.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextListenerOptions {
    /// Mirrors the engine's `recurse` option: changes whether a dependency
    /// line is prefixed with its dependent (`stable-deps.py`'s
    /// `CLIDependencyListener.new_dependency`).
    pub recurse: bool,
    /// Print the full `git log -n1` entry for each dependency instead of
    /// just its id.
    pub log: bool,
}

/// Streams dependencies to stdout as they're discovered, grounded in
/// `CLIDependencyListener` from `stable-deps.py`: useful output well before
/// a deep recursive search finishes, rather than waiting for `all_done`.
pub struct TextListener {
    options: TextListenerOptions,
}

impl TextListener {
    pub fn new(options: TextListenerOptions) -> Self {
        TextListener { options }
    }

    fn print_log_entry(&self, id: &CommitId) {
        let output = Command::new(Config::get().git_cmd())
            .args([
                "--no-pager",
                "-c",
                "color.ui=always",
                "log",
                "-n1",
                id.as_str(),
            ])
            .output();

        match output {
            Ok(output) => {
                print!("{}", String::from_utf8_lossy(&output.stdout));
            }
            Err(e) => {
                eprintln!("git-deps: couldn't run `git log` on {}: {}", id, e);
            }
        }
    }
}

impl Listener for TextListener {
    fn new_dependency(
        &mut self,
        dependent: &Commit,
        dependency: &Commit,
        _path: &str,
        _line: u32,
    ) {
        if self.options.recurse {
            if self.options.log {
                println!("{} depends on:", dependent.id);
            } else {
                println!("{} {}", dependent.id, dependency.id);
            }
        } else if !self.options.log {
            println!("{}", dependency.id);
        }

        if self.options.log {
            self.print_log_entry(&dependency.id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_non_recursive_and_quiet() {
        let options = TextListenerOptions::default();
        assert!(!options.recurse);
        assert!(!options.log);
    }
}
