use anyhow::Result;
use docwatch_cli::WatchConfig;
use perceiver_mutation::Category;

use super::output::{render, OutputFormat};

pub async fn cmd_rules(config: &WatchConfig, format: OutputFormat) -> Result<()> {
    let table = config.rule_table()?;
    if let Some(rendered) = render(&table, &format)? {
        println!("{rendered}");
        return Ok(());
    }

    match &config.rules_path {
        Some(path) => println!("Rule table: {}", path.display()),
        None => println!("Rule table: built-in"),
    }
    for category in Category::ALL {
        let rules = table.rules_for(category);
        if rules.is_empty() {
            continue;
        }
        println!();
        println!("{category} ({})", rules.len());
        for rule in rules {
            let ancestor = if rule.ancestor.is_empty() {
                "*"
            } else {
                rule.ancestor.as_str()
            };
            print!("  {} in {} -> {}", rule.source, ancestor, rule.label);
            if let Some(context) = &rule.context {
                print!(" [context: {context}]");
            }
            println!();
        }
    }
    Ok(())
}
