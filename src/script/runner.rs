use tracing::{debug, info_span};

use super::Command;
use crate::engine::LogicEngine;
use crate::pool::NodeAllocator;
use crate::range::Range;
use crate::LogicError;

/// Observable output of a script
#[derive(Debug, Clone, PartialEq)]
pub enum ScriptEvent {
    /// Result of a `resolve`/`feasible` line
    Resolved {
        /// Script line
        line: usize,
        /// Queried name
        name: String,
        /// Narrowed accumulator
        range: Range,
    },
    /// Rendered formula from a `print` line (`None` when the stack is empty)
    Printed {
        /// Script line
        line: usize,
        /// Tree rendering of the top subtree
        formula: Option<String>,
    },
}

/// Execute `source` line by line against `engine`
///
/// Parse errors come back as [`LogicError::Script`]; engine errors are
/// returned unchanged, with the failing line recorded on the tracing span.
pub fn run_script<A: NodeAllocator>(
    engine: &mut LogicEngine<A>,
    source: &str,
) -> Result<Vec<ScriptEvent>, LogicError> {
    let mut events = Vec::new();

    for (idx, raw) in source.lines().enumerate() {
        let line = idx + 1;
        let Some(command) = Command::parse_line(line, raw)? else {
            continue;
        };
        let _span = info_span!("script", line).entered();
        debug!(?command, "executing");

        match command {
            Command::Push(op) => engine.push_operator(op)?,
            Command::Var { name, range, owner } => {
                engine.push_owned_variable(owner, &name, &range)?
            }
            Command::Reduce { all: false } => {
                engine.reduce()?;
            }
            Command::Reduce { all: true } => {
                engine.reduce_all()?;
            }
            Command::Resolve {
                name,
                mut accumulator,
                feasible,
            } => {
                if feasible {
                    engine.resolve_feasible(&name, &mut accumulator)?;
                } else {
                    engine.resolve(&name, &mut accumulator)?;
                }
                events.push(ScriptEvent::Resolved {
                    line,
                    name,
                    range: accumulator,
                });
            }
            Command::Clear => engine.clear(),
            Command::Print => events.push(ScriptEvent::Printed {
                line,
                formula: engine.top().map(|node| node.to_string()),
            }),
        }
    }

    Ok(events)
}
