use std::path::Path;

use crate::config::Config;
use crate::engine::{Engine, EngineOptions};
use crate::error::DepsError;
use crate::git::Repo;
use crate::listeners::text::TextListenerOptions;
use crate::listeners::{SharedJsonGraphListener, TextListener};
use crate::utils::debug_log;

/// Parameters for one `run` invocation, mirroring `stable-deps.py`'s
/// `argparse` surface (`spec.md` §6.1).
pub struct DepsArgs {
    pub commitish: Vec<String>,
    pub recurse: bool,
    pub context_lines: u32,
    pub exclude_commits: Vec<String>,
    pub log: bool,
    pub json: bool,
    pub debug: bool,
}

/// Builds the engine, attaches the listener the output mode calls for, and
/// drives it once per commit-ish on the command line (`spec.md` §6.1 -
/// multiple positional commit-ishes each seed their own traversal, sharing
/// caches and the completed set).
pub fn run(args: DepsArgs) -> Result<(), DepsError> {
    let repo = Repo::open(Path::new("."))?;

    let options = EngineOptions {
        recurse: args.recurse,
        context_lines: args.context_lines,
        exclude_commits: args.exclude_commits,
        debug: args.debug,
    };

    let mut engine = Engine::new(options, &repo);

    debug_log(
        args.debug,
        &format!("using git binary '{}'", Config::get().git_cmd()),
    );

    if args.json {
        run_json(&mut engine, &repo, &args.commitish)
    } else {
        let listener = TextListener::new(TextListenerOptions {
            recurse: args.recurse,
            log: args.log,
        });
        engine.add_listener(Box::new(listener));

        for commitish in &args.commitish {
            engine.find_dependencies(commitish)?;
        }
        Ok(())
    }
}

/// The JSON graph is only meaningful once every seed has finished, so it's
/// printed here rather than incrementally (`spec.md` §6.2). `root` is set
/// only when exactly one commit-ish was given, matching the original CLI's
/// single-seed webserver route (`stable-deps.py`'s `deps()` handler).
fn run_json(engine: &mut Engine, repo: &Repo, commitish: &[String]) -> Result<(), DepsError> {
    let json_listener = SharedJsonGraphListener::new(repo);
    engine.add_listener(Box::new(json_listener.clone()));

    for rev in commitish {
        engine.find_dependencies(rev)?;
    }

    let mut graph = json_listener.into_graph()?;

    if let [single] = commitish {
        let root_commit = repo.resolve(single)?;
        let root = serde_json::json!({
            "commitish": single,
            "sha1": root_commit.id.to_string(),
            "abbrev": repo.short_name(&root_commit.id)?,
        });
        if let Some(obj) = graph.as_object_mut() {
            obj.insert("root".to_string(), root);
        }
    }

    println!("{}", serde_json::to_string_pretty(&graph)?);
    Ok(())
}
