//! End-to-end tests for the cmdtree-dev binary.
//!
//! These exercise the full pipeline: blueprint spawn, tree composition,
//! clap parsing, registry fill, and dispatch.

use assert_cmd::Command;
use predicates::prelude::*;

fn dev() -> Command {
    Command::cargo_bin("cmdtree-dev").expect("binary built")
}

mod help_output {
    use super::*;

    #[test]
    fn help_embeds_the_rendered_command_tree() {
        dev()
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("Command Tree"))
            .stdout(predicate::str::contains("tip"))
            .stdout(predicate::str::contains("├── fmt"))
            .stdout(predicate::str::contains("└── say"));
    }

    #[test]
    fn subcommand_help_shows_its_own_subtree() {
        dev()
            .args(["say", "--help"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Repeat a word"))
            .stdout(predicate::str::contains("--repeat"));
    }

    #[test]
    fn bare_invocation_prints_root_help() {
        // No action is bound on the root, so dispatch falls back to help.
        dev()
            .assert()
            .success()
            .stdout(predicate::str::contains("Command Tree"));
    }
}

mod dispatch {
    use super::*;

    #[test]
    fn say_repeats_the_positional() {
        dev()
            .args(["say", "hello", "--repeat", "2"])
            .assert()
            .success()
            .stdout(predicate::str::contains("hello hello"));
    }

    #[test]
    fn say_uses_the_default_repeat_count() {
        dev()
            .args(["say", "xyz"])
            .assert()
            .success()
            .stdout(predicate::str::contains("xyz xyz xyz"));
    }

    #[test]
    fn say_accepts_the_short_alias() {
        dev()
            .args(["say", "once", "-n", "1"])
            .assert()
            .success()
            .stdout(predicate::str::diff("once\n"));
    }
}

mod malformed_input {
    use super::*;

    #[test]
    fn unknown_flag_exits_nonzero_with_usage() {
        dev()
            .args(["say", "hello", "--no-such-flag"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Usage"));
    }

    #[test]
    fn missing_required_positional_exits_nonzero() {
        dev().arg("say").assert().failure();
    }

    #[test]
    fn non_integer_repeat_is_rejected_by_the_parser() {
        dev()
            .args(["say", "hello", "--repeat", "lots"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("invalid value"));
    }
}
