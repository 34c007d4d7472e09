//! Declarative blueprints for whole command trees.
//!
//! A [`Handler`] is build-time data only: a command name, help text, an
//! ordered list of child handlers, an optional argument-setup hook, and an
//! optional action. Spawning walks the blueprint depth-first and
//! materializes one [`Node`] per handler, preserving declared child order
//! (which drives help ordering). Handlers carry no state after spawning.
//!
//! ```no_run
//! use cmdtree::{Handler, Node, TreeError};
//!
//! fn set_args(node: &mut Node) -> Result<(), TreeError> {
//!     node.add_positional_arg("word", "Word to print", None, None)?;
//!     Ok(())
//! }
//!
//! let blueprint = Handler::new("tip", "Example tool").child(
//!     Handler::new("say", "Print a word")
//!         .set_args(set_args)
//!         .action(|node| {
//!             println!("{}", node.get_str("word")?.unwrap_or_default());
//!             Ok(())
//!         }),
//! );
//! let mut tree = blueprint.build()?;
//! tree.parse()?;
//! tree.run()?;
//! # Ok::<(), anyhow::Error>(())
//! ```

use std::rc::Rc;

use tracing::debug;

use crate::error::TreeError;
use crate::node::{Action, Node, NodeId};
use crate::tree::Tree;

/// Argument-setup hook, called once on the freshly created node.
pub type SetArgs = fn(&mut Node) -> Result<(), TreeError>;

pub struct Handler {
    cmd: &'static str,
    help: &'static str,
    children: Vec<Handler>,
    set_args: Option<SetArgs>,
    action: Option<Action>,
}

impl Handler {
    pub fn new(cmd: &'static str, help: &'static str) -> Self {
        Handler {
            cmd,
            help,
            children: Vec::new(),
            set_args: None,
            action: None,
        }
    }

    /// Append a child handler. Declared order is preserved by spawning.
    pub fn child(mut self, child: Handler) -> Self {
        self.children.push(child);
        self
    }

    /// Hook that registers this handler's arguments on its node.
    pub fn set_args(mut self, hook: SetArgs) -> Self {
        self.set_args = Some(hook);
        self
    }

    /// Action bound to this handler's node.
    pub fn action<F>(mut self, action: F) -> Self
    where
        F: Fn(&Node) -> anyhow::Result<()> + 'static,
    {
        self.action = Some(Rc::new(action));
        self
    }

    /// Create a tree holding only this handler's node as root; children
    /// stay unspawned until [`Handler::spawn`].
    pub fn start_tree(&self) -> Result<Tree, TreeError> {
        let mut tree = Tree::new();
        let root = tree.add_root(self.cmd, self.help)?;
        self.apply(&mut tree, root)?;
        Ok(tree)
    }

    /// Depth-first spawn of this handler's descendants into `tree`,
    /// starting under its root. The root must have been created from this
    /// handler (see [`Handler::start_tree`]).
    pub fn spawn(&self, tree: &mut Tree) -> Result<(), TreeError> {
        let root = tree.root().ok_or_else(|| TreeError::NodeLookup {
            name: "(root)".to_string(),
        })?;
        if tree.node(root).cmd() != self.cmd {
            return Err(TreeError::NodeLookup {
                name: self.cmd.to_string(),
            });
        }
        spawn_under(tree, root, &self.children)
    }

    /// Convenience: [`Handler::start_tree`] + [`Handler::spawn`].
    pub fn build(&self) -> Result<Tree, TreeError> {
        let mut tree = self.start_tree()?;
        self.spawn(&mut tree)?;
        Ok(tree)
    }

    fn apply(&self, tree: &mut Tree, id: NodeId) -> Result<(), TreeError> {
        if let Some(hook) = self.set_args {
            hook(tree.node_mut(id))?;
        }
        if let Some(action) = &self.action {
            tree.node_mut(id).set_action_shared(Rc::clone(action));
        }
        Ok(())
    }
}

fn spawn_under(tree: &mut Tree, parent: NodeId, children: &[Handler]) -> Result<(), TreeError> {
    for handler in children {
        let id = tree.add_node(handler.cmd, parent, handler.help)?;
        handler.apply(tree, id)?;
        debug!(
            cmd = handler.cmd,
            full_name = tree.node(id).full_name(),
            "handler spawned"
        );
        spawn_under(tree, id, &handler.children)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn robot_args(node: &mut Node) -> Result<(), TreeError> {
        node.add_positional_arg("robot", "Robot name", None, None)?;
        Ok(())
    }

    fn blueprint() -> Handler {
        Handler::new("tip", "root help")
            .child(Handler::new("hello", "hello help"))
            .child(
                Handler::new("hi", "hi help").child(
                    Handler::new("bellop", "bellop help")
                        .child(Handler::new("gghaa", "gghaa help").set_args(robot_args)),
                ),
            )
            .child(Handler::new("blah", "blah help"))
    }

    #[test]
    fn test_build_materializes_whole_blueprint() {
        let tree = blueprint().build().unwrap();
        assert!(tree.find("tip").is_ok());
        assert!(tree.find("tip_hello").is_ok());
        assert!(tree.find("tip_hi_bellop_gghaa").is_ok());
        assert!(tree.find("tip_missing").is_err());
    }

    #[test]
    fn test_start_tree_spawns_root_only() {
        let tree = blueprint().start_tree().unwrap();
        assert!(tree.find("tip").is_ok());
        assert!(tree.find("tip_hello").is_err());
    }

    #[test]
    fn test_spawn_preserves_declared_child_order() {
        let tree = blueprint().build().unwrap();
        let root = tree.root().unwrap();
        let cmds: Vec<&str> = tree
            .node(root)
            .children()
            .iter()
            .map(|&id| tree.node(id).cmd())
            .collect();
        assert_eq!(cmds, ["hello", "hi", "blah"]);
    }

    #[test]
    fn test_set_args_hook_registers_on_spawned_node() {
        let mut tree = blueprint().build().unwrap();
        tree.parse_from(["tip", "hi", "bellop", "gghaa", "marvin"])
            .unwrap();
        let leaf = tree.find("tip_hi_bellop_gghaa").unwrap();
        assert_eq!(tree.node(leaf).get_str("robot").unwrap(), Some("marvin"));
        assert_eq!(tree.selected(), Some(leaf));
    }

    #[test]
    fn test_duplicate_blueprint_names_fail_spawn() {
        let bad = Handler::new("tip", "root")
            .child(Handler::new("x", "one"))
            .child(Handler::new("x", "two"));
        let err = bad.build().unwrap_err();
        assert!(matches!(err, TreeError::DuplicateName { .. }));
    }

    #[test]
    fn test_spawn_rejects_foreign_root() {
        let mut tree = Handler::new("other", "other root").start_tree().unwrap();
        let err = blueprint().spawn(&mut tree).unwrap_err();
        assert!(matches!(err, TreeError::NodeLookup { .. }));
    }
}
