//! Console output helpers: sectioned printing, line clearing, prompts.
//!
//! A thin convenience layer over the `console` crate. `tprint` prints a
//! block of text with optional section spacing, callout rules, indentation,
//! or a header banner, and returns the number of terminal lines written so
//! callers can clear them again with [`clear_lines`].

use std::io::Write;
use std::process;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use console::{Term, style};

static FIRST_PRINTOUT: AtomicBool = AtomicBool::new(true);
static PREV_NUM_LINES: AtomicUsize = AtomicUsize::new(0);
static DEBUG_MODE: AtomicBool = AtomicBool::new(false);

/// Formatting options for [`tprint`].
#[derive(Debug, Clone)]
pub struct PrintOpts {
    /// Print a blank separator line first (suppressed on the very first
    /// printout of the process).
    pub new_section: bool,
    /// Surround the text with rules sized to its longest line.
    pub callout: bool,
    pub callout_char: char,
    /// Indent every line by this many spaces.
    pub indent: usize,
    /// Print as a `==== text ====` banner instead of plain lines.
    pub header: bool,
    pub header_char: char,
}

impl Default for PrintOpts {
    fn default() -> Self {
        PrintOpts {
            new_section: false,
            callout: false,
            callout_char: '-',
            indent: 0,
            header: false,
            header_char: '=',
        }
    }
}

impl PrintOpts {
    pub fn section() -> Self {
        PrintOpts {
            new_section: true,
            ..PrintOpts::default()
        }
    }

    pub fn callout() -> Self {
        PrintOpts {
            callout: true,
            ..PrintOpts::default()
        }
    }

    pub fn header() -> Self {
        PrintOpts {
            header: true,
            ..PrintOpts::default()
        }
    }
}

/// Print `text` with the given options, returning the number of lines
/// written. The count of the last call is remembered for
/// [`clear_lines`]`(None)`.
pub fn tprint(text: &str, opts: &PrintOpts) -> usize {
    let mut num_lines = 0;

    let was_first = FIRST_PRINTOUT.swap(false, Ordering::Relaxed);
    if opts.new_section && !was_first {
        println!();
        num_lines += 1;
    }

    let pad = " ".repeat(opts.indent);
    let lines: Vec<String> = text.lines().map(|line| format!("{pad}{line}")).collect();

    if opts.header {
        let rule: String = opts.header_char.to_string().repeat(10);
        println!("{rule} {text} {rule}");
        num_lines += 1;
        // A header opens a new visual block; the next section separator is
        // suppressed again.
        FIRST_PRINTOUT.store(true, Ordering::Relaxed);
    } else {
        let width = lines.iter().map(|line| line.len()).max().unwrap_or(0);
        let rule: String = opts.callout_char.to_string().repeat(width);
        if opts.callout {
            println!("{rule}");
            num_lines += 1;
        }
        for line in &lines {
            println!("{line}");
            num_lines += 1;
        }
        if opts.callout {
            println!("{rule}");
            num_lines += 1;
        }
    }

    PREV_NUM_LINES.store(num_lines, Ordering::Relaxed);
    num_lines
}

/// Toggle (or set) debug printing for the whole process.
pub fn set_debug(mode: Option<bool>) {
    let new_mode = mode.unwrap_or_else(|| !DEBUG_MODE.load(Ordering::Relaxed));
    DEBUG_MODE.store(new_mode, Ordering::Relaxed);
    let text = format!("debug printing {}", if new_mode { "on" } else { "off" });
    tprint(
        &style(text).magenta().bold().to_string(),
        &PrintOpts::callout(),
    );
}

pub fn debug_enabled() -> bool {
    DEBUG_MODE.load(Ordering::Relaxed)
}

/// Like [`tprint`], but only when debug printing is on. Returns 0 otherwise.
pub fn debug_tprint(text: &str, opts: &PrintOpts) -> usize {
    if debug_enabled() { tprint(text, opts) } else { 0 }
}

/// Blank separator line opening a new section, suppressed on the very
/// first printout of the process. Returns the number of lines written.
fn section_break() -> usize {
    let was_first = FIRST_PRINTOUT.swap(false, Ordering::Relaxed);
    if was_first {
        0
    } else {
        println!();
        1
    }
}

/// Clear the previous `n` terminal lines (or however many the last
/// [`tprint`] wrote, when `None`).
pub fn clear_lines(n: Option<usize>) -> std::io::Result<()> {
    let n = n.unwrap_or_else(|| PREV_NUM_LINES.load(Ordering::Relaxed));
    Term::stdout().clear_last_lines(n)
}

/// Ask a y/N question, opening a new section above the prompt. Empty
/// input takes the default; declining with `exit_on_decline` terminates
/// the process with a cancellation message.
pub fn confirm(prompt: &str, default_yes: bool, exit_on_decline: bool) -> std::io::Result<bool> {
    let suffix = if default_yes { "(Y/n)" } else { "(y/N)" };
    let term = Term::stdout();
    section_break();
    print!("{} {} ", prompt.trim(), suffix);
    std::io::stdout().flush()?;
    let response = term.read_line()?.trim().to_lowercase();

    let confirmed = if default_yes {
        response == "y" || response.is_empty()
    } else {
        response == "y"
    };

    if exit_on_decline && !confirmed {
        eprintln!("Operation canceled by user.");
        process::exit(1);
    }
    Ok(confirmed)
}

/// Print a success message (green checkmark).
pub fn success(message: &str) {
    println!("{} {}", style("✓").green().bold(), message);
}

/// Print an info message (blue).
pub fn info(message: &str) {
    println!("{} {}", style("ℹ").blue().bold(), message);
}

/// Print a warning message (yellow).
pub fn warning(message: &str) {
    println!("{} {}", style("⚠").yellow().bold(), message);
}

/// Print an error message (red).
pub fn error(message: &str) {
    eprintln!("{} {}", style("✗").red().bold(), message);
}
