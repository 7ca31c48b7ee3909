//! Line-oriented token scripts
//!
//! One engine call per line, for driving the engine from files and tests:
//!
//! ```text
//! # weapons usable at level 30 with 2+ slots
//! and
//! var level 1..30
//! or
//! var slots 2..4 @17
//! var weight 0..50
//! reduce
//! resolve level 0..99
//! print
//! ```
//!
//! `#` starts a comment; blank lines are skipped. Ranges use the
//! [`Range`] text form (`1..3,5..7`, `4`, `{}`).

mod runner;

pub use runner::{run_script, ScriptEvent};

use crate::node::{Operator, OwnerTag};
use crate::range::Range;
use crate::LogicError;

/// One parsed script line
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// `and` / `or`
    Push(Operator),
    /// `var NAME RANGE [@OWNER]`
    Var {
        /// Variable name
        name: String,
        /// Constraint
        range: Range,
        /// Caller tag
        owner: OwnerTag,
    },
    /// `reduce` (one step) or `reduce all`
    Reduce {
        /// Reduce until one subtree remains
        all: bool,
    },
    /// `resolve NAME [RANGE]` or `feasible NAME [RANGE]`
    Resolve {
        /// Queried name
        name: String,
        /// Starting accumulator (everything when omitted)
        accumulator: Range,
        /// Skip unsatisfiable branches
        feasible: bool,
    },
    /// `clear`
    Clear,
    /// `print`
    Print,
}

impl Command {
    /// Parse one line; `Ok(None)` for blank and comment lines
    pub fn parse_line(line_no: usize, line: &str) -> Result<Option<Command>, LogicError> {
        let text = line.split('#').next().unwrap_or("").trim();
        if text.is_empty() {
            return Ok(None);
        }

        let fail = |message: String| LogicError::Script {
            line: line_no,
            message,
        };
        let mut fields = text.split_whitespace();
        let Some(keyword) = fields.next() else {
            return Ok(None);
        };
        let rest: Vec<&str> = fields.collect();

        let command = match keyword.to_ascii_lowercase().as_str() {
            "and" | "or" => {
                expect_arity(&rest, 0, 0).map_err(fail)?;
                Command::Push(keyword.parse().map_err(fail)?)
            }
            "var" => {
                expect_arity(&rest, 2, 3).map_err(fail)?;
                let range = parse_range(rest[1]).map_err(fail)?;
                let owner = match rest.get(2) {
                    Some(tag) => parse_owner(tag).map_err(fail)?,
                    None => OwnerTag::default(),
                };
                Command::Var {
                    name: rest[0].to_string(),
                    range,
                    owner,
                }
            }
            "reduce" => {
                expect_arity(&rest, 0, 1).map_err(fail)?;
                match rest.first() {
                    None => Command::Reduce { all: false },
                    Some(&"all") => Command::Reduce { all: true },
                    Some(other) => return Err(fail(format!("unexpected argument '{}'", other))),
                }
            }
            kw @ ("resolve" | "feasible") => {
                expect_arity(&rest, 1, 2).map_err(fail)?;
                let accumulator = match rest.get(1) {
                    Some(text) => parse_range(text).map_err(fail)?,
                    None => Range::full(),
                };
                Command::Resolve {
                    name: rest[0].to_string(),
                    accumulator,
                    feasible: kw == "feasible",
                }
            }
            "clear" => {
                expect_arity(&rest, 0, 0).map_err(fail)?;
                Command::Clear
            }
            "print" => {
                expect_arity(&rest, 0, 0).map_err(fail)?;
                Command::Print
            }
            other => return Err(fail(format!("unknown command '{}'", other))),
        };
        Ok(Some(command))
    }
}

fn expect_arity(args: &[&str], min: usize, max: usize) -> Result<(), String> {
    if args.len() < min || args.len() > max {
        return Err(if min == max {
            format!("expected {} argument(s), got {}", min, args.len())
        } else {
            format!("expected {}-{} arguments, got {}", min, max, args.len())
        });
    }
    Ok(())
}

fn parse_range(text: &str) -> Result<Range, String> {
    text.parse::<Range>().map_err(|e| e.to_string())
}

fn parse_owner(text: &str) -> Result<OwnerTag, String> {
    let digits = text
        .strip_prefix('@')
        .ok_or_else(|| format!("owner tag must start with '@', got '{}'", text))?;
    digits
        .parse()
        .map(OwnerTag)
        .map_err(|_| format!("invalid owner tag '{}'", text))
}
