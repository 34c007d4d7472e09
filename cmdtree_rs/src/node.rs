//! One command in the tree: identity, argument registry, and bound action.
//!
//! Nodes are arena-allocated by [`Tree`](crate::tree::Tree); parents and
//! children are plain arena ids, so there are no reference cycles to manage.
//! A node's registry follows a strict two-phase discipline: slots are
//! declared `Unset` at registration time, written exactly once by the
//! tree-wide parse pass, and only then readable through [`Node::extract`].

use std::collections::HashMap;
use std::rc::Rc;

use crate::arg::{ArgSpec, ResolvedArg};
use crate::error::TreeError;
use crate::value::{ArgType, ArgValue, Slot};

/// Arena index of a node within its tree.
pub type NodeId = usize;

/// Action bound to a node, invoked by dispatch with the node's filled
/// registry in scope.
pub type Action = Rc<dyn Fn(&Node) -> anyhow::Result<()>>;

pub struct Node {
    cmd: String,
    full_name: String,
    help: String,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    args: Vec<ResolvedArg>,
    registry: HashMap<String, Slot>,
    action: Option<Action>,
    viz: String,
    help_text: String,
    updated: bool,
}

impl Node {
    pub(crate) fn new(
        cmd: impl Into<String>,
        full_name: impl Into<String>,
        help: impl Into<String>,
        parent: Option<NodeId>,
    ) -> Self {
        Node {
            cmd: cmd.into(),
            full_name: full_name.into(),
            help: help.into(),
            parent,
            children: Vec::new(),
            args: Vec::new(),
            registry: HashMap::new(),
            action: None,
            viz: String::new(),
            help_text: String::new(),
            updated: false,
        }
    }

    /// Local command name.
    pub fn cmd(&self) -> &str {
        &self.cmd
    }

    /// Root-to-node path joined by `_`; unique across the whole tree.
    pub fn full_name(&self) -> &str {
        &self.full_name
    }

    pub fn help(&self) -> &str {
        &self.help
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// Whether the tree-wide parse pass has filled this node's registry.
    pub fn is_updated(&self) -> bool {
        self.updated
    }

    /// The ASCII rendering of this node's subtree, as refreshed by the last
    /// parse pass (empty before the first parse).
    pub fn viz(&self) -> &str {
        &self.viz
    }

    /// This node's composed help text, as refreshed by the last parse pass.
    pub fn help_text(&self) -> &str {
        &self.help_text
    }

    // ------------------------------------------------------------------
    // Argument registration
    // ------------------------------------------------------------------

    /// Register one argument from a full [`ArgSpec`]. Returns the logical
    /// name to use later with [`Node::extract`] - it does *not* return the
    /// value itself.
    pub fn register(&mut self, spec: ArgSpec) -> Result<String, TreeError> {
        let resolved = spec.resolve()?;
        if self.registry.contains_key(&resolved.logical) {
            return Err(TreeError::spec(format!(
                "logical name `{}` is already registered on `{}`",
                resolved.logical, self.full_name
            )));
        }
        let logical = resolved.logical.clone();
        self.registry.insert(logical.clone(), Slot::Unset);
        self.args.push(resolved);
        Ok(logical)
    }

    /// Convenience: a required positional argument, optionally restricted
    /// to a fixed choice set (text only) or typed.
    pub fn add_positional_arg(
        &mut self,
        name: &str,
        help: &str,
        choices: Option<&[&str]>,
        value_type: Option<ArgType>,
    ) -> Result<String, TreeError> {
        let mut spec = ArgSpec::positional(name).help(help);
        if let Some(choices) = choices {
            spec = spec.choices(choices.iter().copied());
        }
        if let Some(ty) = value_type {
            spec = spec.value_type(ty);
        }
        self.register(spec)
    }

    /// Convenience: a single optional argument with an optional type
    /// (text when unset), short alias, and default. Choice-restricted or
    /// `dest`-renamed arguments go through [`Node::register`].
    pub fn add_optional_arg(
        &mut self,
        long: &str,
        help: &str,
        value_type: Option<ArgType>,
        short: Option<&str>,
        default: Option<ArgValue>,
    ) -> Result<String, TreeError> {
        let mut spec = ArgSpec::long(long).help(help);
        if let Some(ty) = value_type {
            spec = spec.value_type(ty);
        }
        if let Some(short) = short {
            spec = spec.short(short);
        }
        if let Some(default) = default {
            spec = spec.default(default);
        }
        self.register(spec)
    }

    /// Convenience: a boolean flag. `default = true` makes a "disable" flag
    /// whose presence flips the value to false; `default = false` an
    /// "enable" flag flipping it to true. Takes an optional short alias and
    /// logical-name override.
    pub fn add_bool_arg(
        &mut self,
        default: bool,
        long: &str,
        help: &str,
        short: Option<&str>,
        dest: Option<&str>,
    ) -> Result<String, TreeError> {
        let mut spec = ArgSpec::long(long).flag(default).help(help);
        if let Some(short) = short {
            spec = spec.short(short);
        }
        if let Some(dest) = dest {
            spec = spec.dest(dest);
        }
        self.register(spec)
    }

    // ------------------------------------------------------------------
    // Extraction
    // ------------------------------------------------------------------

    /// Read a parsed value by logical name. `Ok(None)` means the argument
    /// was declared but had no matching token and no default. Reading
    /// before the tree-wide parse ran is a [`TreeError::UsageOrder`] error.
    pub fn extract(&self, name: &str) -> Result<Option<&ArgValue>, TreeError> {
        let key = name.replace('-', "");
        match self.registry.get(&key) {
            Some(Slot::Value(value)) => Ok(value.as_ref()),
            _ => Err(TreeError::UsageOrder {
                what: format!("extraction of `{key}` from `{}`", self.full_name),
            }),
        }
    }

    pub fn get_str(&self, name: &str) -> Result<Option<&str>, TreeError> {
        Ok(self.extract(name)?.and_then(ArgValue::as_str))
    }

    pub fn get_int(&self, name: &str) -> Result<Option<i64>, TreeError> {
        Ok(self.extract(name)?.and_then(ArgValue::as_int))
    }

    pub fn get_float(&self, name: &str) -> Result<Option<f64>, TreeError> {
        Ok(self.extract(name)?.and_then(ArgValue::as_float))
    }

    pub fn get_bool(&self, name: &str) -> Result<Option<bool>, TreeError> {
        Ok(self.extract(name)?.and_then(ArgValue::as_bool))
    }

    // ------------------------------------------------------------------
    // Action + dispatch
    // ------------------------------------------------------------------

    /// Bind the action invoked when this node is the selected leaf.
    pub fn set_action<F>(&mut self, action: F)
    where
        F: Fn(&Node) -> anyhow::Result<()> + 'static,
    {
        self.action = Some(Rc::new(action));
    }

    /// Bind an already-shared action (used by handler spawning).
    pub fn set_action_shared(&mut self, action: Action) {
        self.action = Some(action);
    }

    /// Invoke the bound action. Without one, the default action prints this
    /// node's help (refreshed by the last parse).
    pub fn run(&self) -> anyhow::Result<()> {
        match &self.action {
            Some(action) => action(self),
            None => {
                if self.help_text.is_empty() {
                    println!("{} - {}", self.cmd, self.help);
                } else {
                    println!("{}", self.help_text);
                }
                Ok(())
            }
        }
    }

    // ------------------------------------------------------------------
    // Tree-internal plumbing
    // ------------------------------------------------------------------

    pub(crate) fn attach_child(&mut self, child: NodeId) {
        self.children.push(child);
    }

    pub(crate) fn args(&self) -> &[ResolvedArg] {
        &self.args
    }

    pub(crate) fn set_viz(&mut self, viz: String) {
        self.viz = viz;
    }

    pub(crate) fn set_help_text(&mut self, text: String) {
        self.help_text = text;
    }

    /// Fill every declared slot from the flat parsed set, `None` when the
    /// name is absent. Flips all slots to `Value` in one step; a node is
    /// never left partially filled.
    pub(crate) fn update_args(&mut self, parsed: &HashMap<String, ArgValue>) {
        for resolved in &self.args {
            let value = parsed.get(&resolved.logical).cloned();
            self.registry.insert(resolved.logical.clone(), Slot::Value(value));
        }
        self.updated = true;
    }
}
