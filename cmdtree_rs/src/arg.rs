//! Argument declaration: the [`ArgSpec`] builder and its lowering to clap.
//!
//! An `ArgSpec` describes one flag or positional argument. Registration
//! validates the spelling combination, derives the *logical name* used for
//! later extraction, and lowers the spec to a `clap::Arg`. Supported
//! spelling combinations are exactly {positional}, {long}, {short} and
//! {long+short}; anything else is an [`TreeError::ArgumentSpec`] error.
//!
//! Logical names are the chosen spelling with every dash stripped, or an
//! explicit `dest` override.

use clap::builder::PossibleValuesParser;
use clap::{Arg, ArgAction};

use crate::error::TreeError;
use crate::value::{ArgType, ArgValue};

/// How the parsed value is read back out of clap matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ValueKind {
    Text,
    Int,
    Float,
    Flag,
}

/// Declarative description of a single argument.
///
/// ```
/// use cmdtree::{ArgSpec, ArgType};
///
/// let positional = ArgSpec::positional("robot").help("Robot name");
/// let optional = ArgSpec::long("--count")
///     .short("c")
///     .help("How many")
///     .value_type(ArgType::Int)
///     .default(3i64);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ArgSpec {
    positional: Option<String>,
    long: Option<String>,
    short: Option<String>,
    help: Option<String>,
    value_type: Option<ArgType>,
    default: Option<ArgValue>,
    choices: Option<Vec<String>>,
    required: Option<bool>,
    dest: Option<String>,
    flag_default: Option<bool>,
}

impl ArgSpec {
    /// A positional argument. The name may not contain dashes.
    pub fn positional(name: impl Into<String>) -> Self {
        ArgSpec {
            positional: Some(name.into()),
            ..<ArgSpec as Default>::default()
        }
    }

    /// An optional argument with a long spelling (`--name` or `name`).
    pub fn long(name: impl Into<String>) -> Self {
        ArgSpec {
            long: Some(name.into()),
            ..<ArgSpec as Default>::default()
        }
    }

    /// An optional argument carrying only a short spelling (`-n` or `n`).
    pub fn short_only(name: impl Into<String>) -> Self {
        ArgSpec {
            short: Some(name.into()),
            ..<ArgSpec as Default>::default()
        }
    }

    /// Add a short alias to a long spelling.
    pub fn short(mut self, name: impl Into<String>) -> Self {
        self.short = Some(name.into());
        self
    }

    /// Help text. Mandatory; registration fails without it.
    pub fn help(mut self, text: impl Into<String>) -> Self {
        self.help = Some(text.into());
        self
    }

    /// Declared value type. Defaults to [`ArgType::Text`].
    pub fn value_type(mut self, ty: ArgType) -> Self {
        self.value_type = Some(ty);
        self
    }

    /// Default value, used when no matching token is supplied. Must satisfy
    /// the declared type when both are given.
    pub fn default(mut self, value: impl Into<ArgValue>) -> Self {
        self.default = Some(value.into());
        self
    }

    /// Restrict accepted values to a fixed set. Text arguments only.
    pub fn choices<I, S>(mut self, items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.choices = Some(items.into_iter().map(Into::into).collect());
        self
    }

    pub fn required(mut self, yes: bool) -> Self {
        self.required = Some(yes);
        self
    }

    /// Override the derived logical name.
    pub fn dest(mut self, name: impl Into<String>) -> Self {
        self.dest = Some(name.into());
        self
    }

    /// Turn this spec into a boolean flag. `default = true` yields a
    /// "disable" flag (presence flips to false); `default = false` an
    /// "enable" flag (presence flips to true).
    pub fn flag(mut self, default: bool) -> Self {
        self.flag_default = Some(default);
        self
    }

    /// Validate the spec, derive the logical name, and lower to clap.
    pub(crate) fn resolve(self) -> Result<ResolvedArg, TreeError> {
        let help = self
            .help
            .ok_or_else(|| TreeError::spec("help text must be populated"))?;

        if self.positional.is_none() && self.long.is_none() && self.short.is_none() {
            return Err(TreeError::spec("must have at least one spelling"));
        }

        // Ordered spellings: positional, then long, then short. The logical
        // name is dest > single spelling > long, always dash-stripped.
        let mut spellings: Vec<String> = Vec::new();

        if let Some(pos) = &self.positional {
            if pos.is_empty() {
                return Err(TreeError::spec("positional name must not be empty"));
            }
            if pos.contains('-') {
                return Err(TreeError::spec(format!(
                    "positional `{pos}` may not contain dashes"
                )));
            }
            if self.long.is_some() || self.short.is_some() {
                return Err(TreeError::spec(
                    "cannot combine a positional and an optional spelling",
                ));
            }
            if self.flag_default.is_some() {
                return Err(TreeError::spec("a positional cannot be a flag"));
            }
            spellings.push(pos.clone());
        }

        let long_stripped = match &self.long {
            Some(long) => {
                let leading = long.len() - long.trim_start_matches('-').len();
                if leading != 0 && leading != 2 {
                    return Err(TreeError::spec(format!(
                        "long spelling `{long}` must carry 0 or 2 leading dashes"
                    )));
                }
                let stripped = long.replace('-', "");
                if stripped.is_empty() {
                    return Err(TreeError::spec("long spelling must not be empty"));
                }
                spellings.push(stripped.clone());
                Some(stripped)
            }
            None => None,
        };

        let short_char = match &self.short {
            Some(short) => {
                if short.matches('-').count() >= 2 {
                    return Err(TreeError::spec(format!(
                        "short spelling `{short}` must carry fewer than 2 dashes"
                    )));
                }
                let stripped = short.replace('-', "");
                let mut chars = stripped.chars();
                let (Some(c), None) = (chars.next(), chars.next()) else {
                    return Err(TreeError::spec(format!(
                        "short spelling `{short}` must be a single character"
                    )));
                };
                spellings.push(stripped);
                Some(c)
            }
            None => None,
        };

        let logical = match (&self.dest, spellings.len()) {
            (Some(dest), _) => dest.replace('-', ""),
            (None, 1) => spellings[0].clone(),
            // long + short: the long spelling wins.
            (None, 2) => long_stripped.clone().unwrap_or_else(|| {
                unreachable!("two spellings without a long cannot be declared")
            }),
            _ => {
                return Err(TreeError::spec(
                    "unsupported spelling combination (expected positional, long, short, or long+short)",
                ));
            }
        };

        let kind = match self.flag_default {
            Some(_) => ValueKind::Flag,
            None => {
                // A declared type wins; otherwise the default's variant
                // decides, so `.default(3i64)` yields an int argument.
                let ty = self.value_type.unwrap_or_else(|| match &self.default {
                    Some(ArgValue::Int(_)) => ArgType::Int,
                    Some(ArgValue::Float(_)) => ArgType::Float,
                    _ => ArgType::Text,
                });
                if let Some(default) = &self.default {
                    if !default.satisfies(ty) {
                        return Err(TreeError::spec(format!(
                            "default `{default}` does not satisfy the argument type `{}`",
                            ty.name()
                        )));
                    }
                }
                match ty {
                    ArgType::Text => ValueKind::Text,
                    ArgType::Int => ValueKind::Int,
                    ArgType::Float => ValueKind::Float,
                }
            }
        };

        if self.flag_default.is_some() && self.default.is_some() {
            return Err(TreeError::spec("flags take their default from `flag()`"));
        }
        if self.choices.is_some() && kind != ValueKind::Text {
            return Err(TreeError::spec("choices are only supported for text arguments"));
        }

        let mut arg = Arg::new(logical.clone()).help(help);
        if self.positional.is_some() {
            // Positionals are required unless defaulted or relaxed, matching
            // the underlying parser's convention.
            arg = arg.required(self.required.unwrap_or(self.default.is_none()));
        } else {
            if let Some(long) = &long_stripped {
                arg = arg.long(long.clone());
            }
            if let Some(c) = short_char {
                arg = arg.short(c);
            }
            arg = arg.required(self.required.unwrap_or(false));
        }

        arg = match kind {
            ValueKind::Flag => {
                let action = if self.flag_default.unwrap_or(false) {
                    ArgAction::SetFalse
                } else {
                    ArgAction::SetTrue
                };
                arg.action(action)
            }
            ValueKind::Text => match &self.choices {
                Some(choices) => arg.value_parser(PossibleValuesParser::new(choices.clone())),
                None => arg.value_parser(clap::value_parser!(String)),
            },
            ValueKind::Int => arg.value_parser(clap::value_parser!(i64)),
            ValueKind::Float => arg.value_parser(clap::value_parser!(f64)),
        };

        if let Some(default) = &self.default {
            arg = arg.default_value(default.to_string());
        }

        Ok(ResolvedArg { logical, kind, arg })
    }
}

/// A validated, lowered argument, ready to be attached to a node.
#[derive(Debug, Clone)]
pub(crate) struct ResolvedArg {
    pub(crate) logical: String,
    pub(crate) kind: ValueKind,
    pub(crate) arg: Arg,
}

impl ResolvedArg {
    /// Read this argument's value out of one level of clap matches.
    pub(crate) fn read(&self, matches: &clap::ArgMatches) -> Option<ArgValue> {
        match self.kind {
            ValueKind::Flag => Some(ArgValue::Bool(matches.get_flag(&self.logical))),
            ValueKind::Text => matches
                .get_one::<String>(&self.logical)
                .cloned()
                .map(ArgValue::Str),
            ValueKind::Int => matches
                .get_one::<i64>(&self.logical)
                .copied()
                .map(ArgValue::Int),
            ValueKind::Float => matches
                .get_one::<f64>(&self.logical)
                .copied()
                .map(ArgValue::Float),
        }
    }
}
