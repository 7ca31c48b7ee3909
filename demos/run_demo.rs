//! Weapon filter demo: builds a formula from the bundled token script and
//! reports the feasible range of each queried attribute.

use lookup_logic::script::{run_script, ScriptEvent};
use lookup_logic::{EngineConfig, LogicEngine};

fn main() -> anyhow::Result<()> {
    let source = include_str!("weapon_filter.logic");

    let mut engine = LogicEngine::new(EngineConfig::default())?;
    let events = run_script(&mut engine, source)?;

    for event in &events {
        match event {
            ScriptEvent::Resolved { name, range, .. } => {
                println!("{name}: {range} ({} values)", range.cardinality());
            }
            ScriptEvent::Printed { formula: Some(text), .. } => print!("{text}"),
            ScriptEvent::Printed { formula: None, .. } => println!("logic is empty"),
        }
    }

    engine.clear();
    anyhow::ensure!(engine.allocator().leaked().is_empty(), "formula nodes leaked");
    Ok(())
}
