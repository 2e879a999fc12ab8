//! List the abilities a scenario may bind.

use anyhow::Result;
use arena_runtime::AbilityRegistry;
use clap::Parser;
use console::style;

#[derive(Parser)]
pub struct Abilities;

impl Abilities {
    pub fn execute(self) -> Result<()> {
        let registry = AbilityRegistry::builtin();
        println!("{}", style("=== Built-in Abilities ===").bold().green());
        for id in registry.ids() {
            let Some(ability) = registry.get(id) else {
                continue;
            };
            let uses = match ability.max_uses() {
                Some(uses) => format!("{uses} use(s)"),
                None => "unlimited".to_string(),
            };
            println!(
                "  {:<12} {} {}",
                style(id).bold().cyan(),
                ability.description(),
                style(format!(
                    "[cooldown {}, {uses}, priority {}]",
                    ability.max_cooldown(),
                    ability.priority()
                ))
                .dim()
            );
        }
        Ok(())
    }
}
