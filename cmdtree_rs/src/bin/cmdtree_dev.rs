//! Dev workflow CLI for the cmdtree workspace, built with the framework
//! itself: one handler per task, each shelling out through [`cmdtree::ops`].
//!
//! ```bash
//! cmdtree-dev fmt            # cargo fmt
//! cmdtree-dev fmt --check    # check only
//! cmdtree-dev lint           # cargo clippy, warnings denied
//! cmdtree-dev test           # cargo test
//! cmdtree-dev style          # fmt + lint
//! cmdtree-dev say hello -n 3 # framework demo leaf
//! ```

use anyhow::Result;
use tracing_subscriber::EnvFilter;

use cmdtree::{ArgSpec, ArgType, Handler, Node, TreeError, ops};

fn check_arg(node: &mut Node) -> Result<(), TreeError> {
    node.add_bool_arg(false, "--check", "Only check; do not rewrite files", None, None)?;
    Ok(())
}

fn say_args(node: &mut Node) -> Result<(), TreeError> {
    node.add_positional_arg("word", "Word to repeat", None, None)?;
    node.register(
        ArgSpec::long("--repeat")
            .short("n")
            .help("How many times to repeat the word")
            .value_type(ArgType::Int)
            .default(3i64),
    )?;
    Ok(())
}

fn fmt_action(node: &Node) -> Result<()> {
    let check = node.get_bool("check")?.unwrap_or(false);
    ops::cargo_fmt(check)
}

fn lint_action(_node: &Node) -> Result<()> {
    ops::cargo_clippy()
}

fn test_action(_node: &Node) -> Result<()> {
    ops::cargo_test()
}

fn style_action(node: &Node) -> Result<()> {
    let check = node.get_bool("check")?.unwrap_or(false);
    ops::style(check)
}

fn say_action(node: &Node) -> Result<()> {
    let word = node.get_str("word")?.unwrap_or_default().to_string();
    let repeat = node.get_int("repeat")?.unwrap_or(1).max(0);
    let line = vec![word; repeat as usize].join(" ");
    println!("{line}");
    Ok(())
}

fn dev_tree() -> Handler {
    Handler::new("tip", "Development task runner for the cmdtree workspace")
        .child(
            Handler::new("fmt", "Format the workspace with cargo fmt")
                .set_args(check_arg)
                .action(fmt_action),
        )
        .child(Handler::new("lint", "Run cargo clippy with warnings denied").action(lint_action))
        .child(Handler::new("test", "Run the workspace test suite").action(test_action))
        .child(
            Handler::new("style", "Formatting then lints, stopping at the first failure")
                .set_args(check_arg)
                .action(style_action),
        )
        .child(
            Handler::new("say", "Repeat a word (framework demo)")
                .set_args(say_args)
                .action(say_action),
        )
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let mut tree = dev_tree().build()?;
    tree.parse()?;
    tree.run()
}
