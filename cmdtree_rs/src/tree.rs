//! The command tree: arena of nodes, uniqueness enforcement, two-phase
//! parse, and dispatch.
//!
//! The tree is the sole authority for full-name uniqueness and path
//! resolution. Parsing is strictly sequential, one pass each:
//!
//! 1. Pre-order walk refreshing every node's tree visualization (and its
//!    composed help), so help output reflects the current shape including
//!    late-added nodes.
//! 2. Compose one `clap::Command` for the whole tree and delegate the
//!    tokens to it. A clap failure aborts here; no registry is touched.
//! 3. Flatten the selected subcommand chain into one logical-name → value
//!    set, then pre-order walk all nodes copying each declared name's
//!    value (or `None`) into its registry.
//!
//! Adding nodes between a parse and extraction is unsupported; the next
//! parse re-synchronizes everything.

use std::collections::HashMap;
use std::ffi::OsString;

use tracing::debug;

use crate::error::TreeError;
use crate::node::{Node, NodeId};
use crate::value::ArgValue;
use crate::viz;

/// Conventional name of the root node.
pub const TIP: &str = "tip";

/// A parent reference: either an arena id or a full path name.
#[derive(Debug, Clone, Copy)]
pub enum ParentRef<'a> {
    Id(NodeId),
    Path(&'a str),
}

impl From<NodeId> for ParentRef<'static> {
    fn from(id: NodeId) -> Self {
        ParentRef::Id(id)
    }
}

impl<'a> From<&'a str> for ParentRef<'a> {
    fn from(path: &'a str) -> Self {
        ParentRef::Path(path)
    }
}

#[derive(Default)]
pub struct Tree {
    nodes: Vec<Node>,
    root: Option<NodeId>,
    selected: Option<NodeId>,
    parsed: bool,
}

impl std::fmt::Debug for Tree {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Tree")
            .field("root", &self.root)
            .field("selected", &self.selected)
            .field("parsed", &self.parsed)
            .finish_non_exhaustive()
    }
}

impl Tree {
    pub fn new() -> Self {
        Tree::default()
    }

    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    /// Whether the whole structure has been through a parse pass.
    pub fn is_parsed(&self) -> bool {
        self.parsed
    }

    /// The leaf selected by the last parse pass.
    pub fn selected(&self) -> Option<NodeId> {
        self.selected
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id]
    }

    pub fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id]
    }

    // ------------------------------------------------------------------
    // Construction
    // ------------------------------------------------------------------

    /// Create the root node. A second parentless node is a
    /// [`TreeError::DuplicateName`] on the existing root.
    pub fn add_root(&mut self, cmd: &str, help: &str) -> Result<NodeId, TreeError> {
        if let Some(root) = self.root {
            return Err(TreeError::DuplicateName {
                name: self.nodes[root].full_name().to_string(),
            });
        }
        let id = self.nodes.len();
        self.nodes.push(Node::new(cmd, cmd, help, None));
        self.root = Some(id);
        debug!(cmd, "tree root created");
        Ok(id)
    }

    /// Create a node under `parent` (an id or a full path name). The
    /// would-be full name is checked against every existing node in the
    /// tree, not just siblings; a collision is
    /// [`TreeError::DuplicateName`].
    pub fn add_node<'a>(
        &mut self,
        cmd: &str,
        parent: impl Into<ParentRef<'a>>,
        help: &str,
    ) -> Result<NodeId, TreeError> {
        let parent_id = match parent.into() {
            ParentRef::Id(id) => {
                if id >= self.nodes.len() {
                    return Err(TreeError::NodeLookup {
                        name: format!("#{id}"),
                    });
                }
                id
            }
            ParentRef::Path(path) => self.find(path)?,
        };

        let full_name = format!("{}_{}", self.nodes[parent_id].full_name(), cmd);
        // Whole-tree scan, deliberately broader than a sibling check.
        if self.nodes.iter().any(|n| n.full_name() == full_name) {
            return Err(TreeError::DuplicateName { name: full_name });
        }

        let id = self.nodes.len();
        self.nodes.push(Node::new(cmd, full_name, help, Some(parent_id)));
        self.nodes[parent_id].attach_child(id);
        debug!(
            cmd,
            full_name = self.nodes[id].full_name(),
            "node attached"
        );
        Ok(id)
    }

    /// Resolve a node by its full path name, requiring exactly one match.
    pub fn find(&self, full_name: &str) -> Result<NodeId, TreeError> {
        let mut matches = self
            .nodes
            .iter()
            .enumerate()
            .filter(|(_, n)| n.full_name() == full_name)
            .map(|(id, _)| id);
        let found = matches.next().ok_or_else(|| TreeError::NodeLookup {
            name: full_name.to_string(),
        })?;
        // add_node prevents duplicates, but assert the invariant anyway.
        debug_assert!(matches.next().is_none(), "full name `{full_name}` not unique");
        Ok(found)
    }

    /// All node ids, parent before children, siblings in declared order.
    pub fn preorder(&self) -> Vec<NodeId> {
        let mut order = Vec::with_capacity(self.nodes.len());
        let mut stack = Vec::new();
        if let Some(root) = self.root {
            stack.push(root);
        }
        while let Some(id) = stack.pop() {
            order.push(id);
            for &child in self.nodes[id].children().iter().rev() {
                stack.push(child);
            }
        }
        order
    }

    // ------------------------------------------------------------------
    // Parsing
    // ------------------------------------------------------------------

    /// Parse the given argv (the first item is the program name) and
    /// return the selected leaf. On malformed input the clap error is
    /// returned untouched and no registry is mutated.
    pub fn parse_from<I, T>(&mut self, argv: I) -> Result<NodeId, TreeError>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let root = self.root.ok_or_else(|| TreeError::NodeLookup {
            name: "(root)".to_string(),
        })?;

        // Pass 1: refresh every node's visualization, then its composed
        // help text (which embeds the fresh visualization).
        let order = self.preorder();
        for &id in &order {
            let rendered = viz::render_tree(
                id,
                &|n: NodeId| self.nodes[n].children().to_vec(),
                &|n: NodeId| self.nodes[n].cmd().to_string(),
            );
            self.nodes[id].set_viz(rendered);
        }
        for &id in &order {
            let mut command = self.compose(id);
            let text = command.render_long_help().to_string();
            self.nodes[id].set_help_text(text);
        }

        // Pass 2: delegate the tokens to the composed root command.
        let matches = self.compose(root).try_get_matches_from(argv)?;

        // Pass 3: flatten the selected chain, then fill every registry.
        let mut flat: HashMap<String, ArgValue> = HashMap::new();
        let mut cursor = root;
        let mut level = &matches;
        loop {
            for resolved in self.nodes[cursor].args() {
                if let Some(value) = resolved.read(level) {
                    flat.insert(resolved.logical.clone(), value);
                }
            }
            match level.subcommand() {
                Some((name, sub)) => {
                    cursor = self.nodes[cursor]
                        .children()
                        .iter()
                        .copied()
                        .find(|&c| self.nodes[c].cmd() == name)
                        .ok_or_else(|| TreeError::NodeLookup {
                            name: name.to_string(),
                        })?;
                    level = sub;
                }
                None => break,
            }
        }

        for &id in &order {
            self.nodes[id].update_args(&flat);
        }
        self.selected = Some(cursor);
        self.parsed = true;
        debug!(
            selected = self.nodes[cursor].full_name(),
            values = flat.len(),
            "parse complete"
        );
        Ok(cursor)
    }

    /// Parse the process's command line. Malformed input (and `--help`)
    /// defer to the underlying parser's usage message and exit code,
    /// matching its own contract; declaration errors are returned.
    pub fn parse(&mut self) -> Result<NodeId, TreeError> {
        match self.parse_from(std::env::args()) {
            Err(TreeError::InvalidInput(err)) => err.exit(),
            other => other,
        }
    }

    /// Dispatch to the leaf selected by the parse step.
    pub fn run(&self) -> anyhow::Result<()> {
        let selected = self.selected.ok_or_else(|| TreeError::UsageOrder {
            what: "dispatch".to_string(),
        })?;
        debug!(node = self.nodes[selected].full_name(), "dispatching");
        self.nodes[selected].run()
    }

    /// Compose the `clap::Command` for the subtree rooted at `id`: the
    /// node's declared args, its subtree rendering appended after the
    /// normal help block, and its children as subcommands.
    fn compose(&self, id: NodeId) -> clap::Command {
        let node = &self.nodes[id];
        let mut command = clap::Command::new(node.cmd().to_string())
            .about(node.help().to_string())
            .disable_help_subcommand(true);
        if !node.viz().is_empty() {
            command = command.after_help(format!("Command Tree\n\n{}", node.viz()));
        }
        for resolved in node.args() {
            command = command.arg(resolved.arg.clone());
        }
        for &child in node.children() {
            command = command.subcommand(self.compose(child));
        }
        command
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arg::ArgSpec;
    use crate::value::ArgType;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn tip_a_b() -> (Tree, NodeId, NodeId, NodeId) {
        let mut tree = Tree::new();
        let tip = tree.add_root(TIP, "root").unwrap();
        let a = tree.add_node("a", tip, "a help").unwrap();
        let b = tree.add_node("b", a, "b help").unwrap();
        (tree, tip, a, b)
    }

    #[test]
    fn test_full_names_join_with_underscore() {
        let (tree, tip, a, b) = tip_a_b();
        assert_eq!(tree.node(tip).full_name(), "tip");
        assert_eq!(tree.node(a).full_name(), "tip_a");
        assert_eq!(tree.node(b).full_name(), "tip_a_b");
    }

    #[test]
    fn test_find_resolves_exactly_one_node() {
        let (tree, _, _, b) = tip_a_b();
        assert_eq!(tree.find("tip_a_b").unwrap(), b);
        let err = tree.find("missing").unwrap_err();
        assert!(matches!(err, TreeError::NodeLookup { .. }));
    }

    #[test]
    fn test_duplicate_full_name_rejected_anywhere() {
        let (mut tree, tip, a, _) = tip_a_b();
        let err = tree.add_node("a", tip, "again").unwrap_err();
        assert!(matches!(err, TreeError::DuplicateName { .. }));
        // A fresh name under a different parent is fine.
        assert!(tree.add_node("a", a, "nested a").is_ok());
    }

    #[test]
    fn test_second_root_rejected() {
        let mut tree = Tree::new();
        tree.add_root(TIP, "root").unwrap();
        let err = tree.add_root("other", "again").unwrap_err();
        assert!(matches!(err, TreeError::DuplicateName { .. }));
    }

    #[test]
    fn test_parent_resolved_by_path_string() {
        let (mut tree, _, _, _) = tip_a_b();
        let c = tree.add_node("c", "tip_a_b", "c help").unwrap();
        assert_eq!(tree.node(c).full_name(), "tip_a_b_c");
        let err = tree.add_node("d", "nowhere", "d help").unwrap_err();
        assert!(matches!(err, TreeError::NodeLookup { .. }));
    }

    #[test]
    fn test_extract_before_parse_is_usage_order() {
        let (mut tree, tip, _, _) = tip_a_b();
        tree.node_mut(tip)
            .add_positional_arg("robot", "h", None, None)
            .unwrap();
        let err = tree.node(tip).extract("robot").unwrap_err();
        assert!(matches!(err, TreeError::UsageOrder { .. }));
    }

    #[test]
    fn test_default_survives_unrelated_input() {
        let (mut tree, tip, _, _) = tip_a_b();
        tree.node_mut(tip)
            .add_optional_arg("--foo", "h", None, None, Some("D".into()))
            .unwrap();
        tree.parse_from(["tip", "a"]).unwrap();
        assert_eq!(tree.node(tip).get_str("foo").unwrap(), Some("D"));
    }

    #[test]
    fn test_bool_flag_disable_semantics() {
        let (mut tree, tip, _, _) = tip_a_b();
        tree.node_mut(tip)
            .add_bool_arg(true, "--disable-x", "h", None, None)
            .unwrap();
        tree.parse_from(["tip"]).unwrap();
        assert_eq!(tree.node(tip).get_bool("disablex").unwrap(), Some(true));

        tree.parse_from(["tip", "--disablex"]).unwrap();
        assert_eq!(tree.node(tip).get_bool("disablex").unwrap(), Some(false));
    }

    #[test]
    fn test_bool_flag_enable_semantics() {
        let (mut tree, tip, _, _) = tip_a_b();
        tree.node_mut(tip)
            .add_bool_arg(false, "--enable-x", "h", None, None)
            .unwrap();
        tree.parse_from(["tip"]).unwrap();
        assert_eq!(tree.node(tip).get_bool("enablex").unwrap(), Some(false));

        tree.parse_from(["tip", "--enablex"]).unwrap();
        assert_eq!(tree.node(tip).get_bool("enablex").unwrap(), Some(true));
    }

    #[test]
    fn test_leaf_positional_flows_into_registry_and_action() {
        let (mut tree, _, _, b) = tip_a_b();
        tree.node_mut(b)
            .add_positional_arg("robot", "h", None, None)
            .unwrap();

        let seen: Rc<RefCell<Vec<String>>> = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        tree.node_mut(b).set_action(move |node| {
            let robot = node.get_str("robot")?.unwrap_or_default().to_string();
            sink.borrow_mut().push(robot);
            Ok(())
        });

        tree.parse_from(["tip", "a", "b", "xyz"]).unwrap();
        assert_eq!(tree.selected(), Some(b));
        assert_eq!(tree.node(b).get_str("robot").unwrap(), Some("xyz"));

        tree.run().unwrap();
        assert_eq!(seen.borrow().as_slice(), ["xyz".to_string()]);
    }

    #[test]
    fn test_typed_option_with_default() {
        let (mut tree, tip, a, _) = tip_a_b();
        tree.node_mut(a)
            .register(
                ArgSpec::long("--repeat")
                    .short("n")
                    .help("h")
                    .value_type(ArgType::Int)
                    .default(3i64),
            )
            .unwrap();

        tree.parse_from(["tip", "a"]).unwrap();
        assert_eq!(tree.node(a).get_int("repeat").unwrap(), Some(3));

        tree.parse_from(["tip", "a", "-n", "7"]).unwrap();
        assert_eq!(tree.node(a).get_int("repeat").unwrap(), Some(7));

        // Off the selected path, the slot fills with None.
        tree.parse_from(["tip"]).unwrap();
        assert_eq!(tree.node(a).extract("repeat").unwrap(), None);
        assert!(tree.node(tip).is_updated());
    }

    #[test]
    fn test_positional_choices_reject_out_of_set_token() {
        let (mut tree, _, a, _) = tip_a_b();
        tree.node_mut(a)
            .add_positional_arg("mode", "h", Some(&["fast", "slow"]), None)
            .unwrap();

        let err = tree.parse_from(["tip", "a", "turbo"]).unwrap_err();
        assert!(matches!(err, TreeError::InvalidInput(_)));

        tree.parse_from(["tip", "a", "fast"]).unwrap();
        assert_eq!(tree.node(a).get_str("mode").unwrap(), Some("fast"));
    }

    #[test]
    fn test_typed_positional_parses_int() {
        let (mut tree, _, _, b) = tip_a_b();
        tree.node_mut(b)
            .add_positional_arg("count", "h", None, Some(ArgType::Int))
            .unwrap();
        tree.parse_from(["tip", "a", "b", "12"]).unwrap();
        assert_eq!(tree.node(b).get_int("count").unwrap(), Some(12));
    }

    #[test]
    fn test_optional_helper_carries_type_short_and_default() {
        let (mut tree, tip, _, _) = tip_a_b();
        tree.node_mut(tip)
            .add_optional_arg("--depth", "h", Some(ArgType::Int), Some("d"), Some(4i64.into()))
            .unwrap();

        tree.parse_from(["tip"]).unwrap();
        assert_eq!(tree.node(tip).get_int("depth").unwrap(), Some(4));

        tree.parse_from(["tip", "-d", "9"]).unwrap();
        assert_eq!(tree.node(tip).get_int("depth").unwrap(), Some(9));
    }

    #[test]
    fn test_bool_flag_short_alias_and_dest() {
        let (mut tree, tip, _, _) = tip_a_b();
        tree.node_mut(tip)
            .add_bool_arg(false, "--verbose", "h", Some("v"), Some("chatty"))
            .unwrap();

        tree.parse_from(["tip", "-v"]).unwrap();
        assert_eq!(tree.node(tip).get_bool("chatty").unwrap(), Some(true));
    }

    #[test]
    fn test_default_variant_decides_the_value_type() {
        let (mut tree, tip, _, _) = tip_a_b();
        tree.node_mut(tip)
            .register(ArgSpec::long("--n").default(3i64).help("h"))
            .unwrap();

        tree.parse_from(["tip"]).unwrap();
        assert_eq!(tree.node(tip).get_int("n").unwrap(), Some(3));
    }

    #[test]
    fn test_malformed_input_leaves_registry_unset() {
        let (mut tree, tip, _, _) = tip_a_b();
        tree.node_mut(tip)
            .add_optional_arg("--foo", "h", None, None, None)
            .unwrap();

        let err = tree.parse_from(["tip", "--no-such-flag"]).unwrap_err();
        assert!(matches!(err, TreeError::InvalidInput(_)));
        assert!(!tree.is_parsed());
        let err = tree.node(tip).extract("foo").unwrap_err();
        assert!(matches!(err, TreeError::UsageOrder { .. }));
    }

    #[test]
    fn test_run_before_parse_is_usage_order() {
        let (tree, _, _, _) = tip_a_b();
        let err = tree.run().unwrap_err();
        let err = err.downcast::<TreeError>().expect("tree error");
        assert!(matches!(err, TreeError::UsageOrder { .. }));
    }

    #[test]
    fn test_late_added_node_shows_up_in_next_help() {
        let (mut tree, tip, _, _) = tip_a_b();
        tree.parse_from(["tip"]).unwrap();
        assert!(!tree.node(tip).viz().contains("late"));

        tree.add_node("late", tip, "added after first parse").unwrap();
        tree.parse_from(["tip"]).unwrap();
        assert!(tree.node(tip).viz().contains("late"));
        assert!(tree.node(tip).help_text().contains("late"));
    }

    #[test]
    fn test_visualization_shape() {
        let (mut tree, tip, _, _) = tip_a_b();
        tree.add_node("c", tip, "c help").unwrap();
        tree.parse_from(["tip"]).unwrap();
        assert_eq!(tree.node(tip).viz(), "tip\n├── a\n│   └── b\n└── c");
    }

    #[test]
    fn test_default_action_prints_help_without_panic() {
        let (mut tree, _, _, _) = tip_a_b();
        tree.parse_from(["tip", "a"]).unwrap();
        // No action bound on `a`: dispatch falls back to printing help.
        tree.run().unwrap();
    }
}
