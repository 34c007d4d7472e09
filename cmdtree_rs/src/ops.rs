//! Dev workflow steps that shell out to external tools.
//!
//! Each step runs one external command behind a spinner, captures its
//! output, and reports through the console helpers. A non-zero exit fails
//! the step (and any composite it belongs to) immediately.

use std::process::Command;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use indicatif::{ProgressBar, ProgressStyle};

use crate::console;

/// Spinner shown while a step runs.
struct Spinner {
    bar: ProgressBar,
}

impl Spinner {
    fn new(message: &str) -> Self {
        let bar = ProgressBar::new_spinner();
        bar.set_style(
            ProgressStyle::default_spinner()
                .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"])
                .template("{spinner:.cyan} {msg}")
                .expect("valid template"),
        );
        bar.set_message(message.to_string());
        bar.enable_steady_tick(Duration::from_millis(80));
        Spinner { bar }
    }

    fn clear(&self) {
        self.bar.finish_and_clear();
    }
}

/// Run one external command as a named step. Output is captured and only
/// replayed when the step fails.
pub fn run_step(name: &str, program: &str, args: &[&str]) -> Result<()> {
    let spinner = Spinner::new(&format!("{name}..."));
    let output = Command::new(program)
        .args(args)
        .output()
        .with_context(|| format!("failed to launch `{program}` for step `{name}`"))?;
    spinner.clear();

    if output.status.success() {
        console::success(name);
        Ok(())
    } else {
        console::error(name);
        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);
        if !stdout.trim().is_empty() {
            println!("{}", stdout.trim_end());
        }
        if !stderr.trim().is_empty() {
            eprintln!("{}", stderr.trim_end());
        }
        bail!("step `{name}` failed with {}", output.status);
    }
}

/// `cargo fmt`, optionally in check-only mode.
pub fn cargo_fmt(check: bool) -> Result<()> {
    if check {
        run_step("fmt (check)", "cargo", &["fmt", "--all", "--", "--check"])
    } else {
        run_step("fmt", "cargo", &["fmt", "--all"])
    }
}

/// `cargo clippy` over all targets, warnings denied.
pub fn cargo_clippy() -> Result<()> {
    run_step(
        "clippy",
        "cargo",
        &["clippy", "--all-targets", "--", "-D", "warnings"],
    )
}

/// `cargo test` for the whole workspace.
pub fn cargo_test() -> Result<()> {
    run_step("test", "cargo", &["test", "--workspace"])
}

/// The full style pass: formatting then lints, stopping at the first
/// failure.
pub fn style(check: bool) -> Result<()> {
    cargo_fmt(check)?;
    cargo_clippy()?;
    Ok(())
}
