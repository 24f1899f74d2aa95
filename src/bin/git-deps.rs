use clap::Parser;

use git_deps::commands::deps::{self, DepsArgs};

/// Auto-detects commits on which the given commit-ish(es) depend,
/// mirroring `stable-deps.py`'s `argparse` surface (`spec.md` §6.1).
#[derive(Parser)]
#[command(name = "git-deps", disable_help_flag = false, disable_version_flag = true)]
struct Cli {
    /// Commit-ish(es) whose dependencies should be found.
    commitish: Vec<String>,

    /// Follow dependencies recursively.
    #[arg(short, long)]
    recurse: bool,

    /// Number of lines of diff context to use.
    #[arg(short = 'c', long = "context-lines", default_value_t = 1)]
    context_lines: u32,

    /// Exclude commits which are ancestors of the given commit-ish (repeatable).
    #[arg(short = 'e', long = "exclude-commits", value_name = "COMMITISH")]
    exclude_commits: Vec<String>,

    /// Show commit logs for calculated dependencies.
    #[arg(short, long)]
    log: bool,

    /// Output dependencies as JSON.
    #[arg(short, long)]
    json: bool,

    /// Show debugging output.
    #[arg(short, long)]
    debug: bool,

    /// Run a web server for visualizing the dependency graph.
    ///
    /// The visualization server is an external collaborator to this crate's
    /// inference engine (`spec.md` §1) and isn't built here.
    #[arg(short, long)]
    serve: bool,

    /// IP address for the webserver to bind to.
    #[arg(short = 'b', long = "bind-ip", default_value = "127.0.0.1")]
    bindaddr: String,

    /// Port number for the webserver.
    #[arg(short, long, default_value_t = 5000)]
    port: u16,
}

fn main() {
    let cli = Cli::parse();

    if cli.serve {
        if cli.log || cli.json || cli.recurse {
            eprintln!("git-deps: --log, --json and --recurse don't make sense in webserver mode.");
            std::process::exit(2);
        }
        eprintln!(
            "git-deps: webserver mode (--serve, binding {}:{}) is not built into this crate; \
             it's an external collaborator over this library's JSON output (spec.md §1).",
            cli.bindaddr, cli.port
        );
        std::process::exit(1);
    }

    if cli.commitish.is_empty() {
        eprintln!("git-deps: you must specify at least one commit-ish.");
        std::process::exit(2);
    }

    let args = DepsArgs {
        commitish: cli.commitish,
        recurse: cli.recurse,
        context_lines: cli.context_lines,
        exclude_commits: cli.exclude_commits,
        log: cli.log,
        json: cli.json,
        debug: cli.debug,
    };

    if let Err(e) = deps::run(args) {
        eprintln!("git-deps: {}", e);
        std::process::exit(1);
    }
}
