//! # cmdtree
//!
//! Declarative command-tree argument parsing and dispatch on top of clap.
//!
//! A program declares a tree of named commands - root, subcommands,
//! sub-subcommands - where each node owns its own flags/positionals and an
//! action. Parsing walks the tree to refresh an ASCII rendering of its
//! shape (embedded in generated help), delegates the actual token parsing
//! to one composed `clap::Command`, copies the parsed values into each
//! node's registry, and dispatches to the selected leaf's action.
//!
//! ## Quick start
//!
//! ```no_run
//! use cmdtree::{Handler, Node, TreeError};
//!
//! fn say_args(node: &mut Node) -> Result<(), TreeError> {
//!     node.add_positional_arg("word", "Word to print", None, None)?;
//!     Ok(())
//! }
//!
//! let mut tree = Handler::new("tip", "Example tool")
//!     .child(
//!         Handler::new("say", "Print a word")
//!             .set_args(say_args)
//!             .action(|node| {
//!                 println!("{}", node.get_str("word")?.unwrap_or_default());
//!                 Ok(())
//!             }),
//!     )
//!     .build()?;
//!
//! tree.parse()?; // exits with clap's usage message on malformed input
//! tree.run()?;
//! # Ok::<(), anyhow::Error>(())
//! ```
//!
//! ## Two-phase registry discipline
//!
//! Argument values live in per-node registries whose slots are `Unset`
//! until the tree-wide parse pass fills them. Extracting before the parse
//! ran is a [`TreeError::UsageOrder`] programmer error, never a silent
//! `None`. A failed parse mutates no registry at all.
//!
//! ## Naming
//!
//! Nodes are addressed by their full path name, the root-to-node `cmd`
//! chain joined by `_` (root `tip`, child `a`, grandchild `b` →
//! `"tip_a_b"`); full names are unique across the whole tree. Argument
//! logical names are the chosen spelling with dashes stripped, or an
//! explicit `dest` override.

/// Argument declaration: the [`ArgSpec`] builder and its clap lowering.
pub mod arg;

/// Console output helpers (sectioned printing, prompts, line clearing).
pub mod console;

/// Error taxonomy.
pub mod error;

/// Declarative tree blueprints and the depth-first spawn step.
pub mod handler;

/// One command in the tree: registry, action, extraction.
pub mod node;

/// External-command steps for the dev-tool binary.
pub mod ops;

/// The tree itself: arena, uniqueness, two-phase parse, dispatch.
pub mod tree;

/// Runtime argument values and registry slots.
pub mod value;

/// ASCII tree rendering.
pub mod viz;

pub use arg::ArgSpec;
pub use error::TreeError;
pub use handler::{Handler, SetArgs};
pub use node::{Action, Node, NodeId};
pub use tree::{ParentRef, TIP, Tree};
pub use value::{ArgType, ArgValue, Slot};
