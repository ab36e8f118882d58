//! Stack listing.

use rehearse::model::Stack;
use rehearse::storage::Storage;

pub(super) fn cmd_list(storage: &Storage) -> Result<(), String> {
    let stacks = storage
        .list_stacks()
        .map_err(|e| format!("failed to list stacks: {e}"))?;

    if stacks.is_empty() {
        println!("No stacks. Add some with `rehearse import <file>`.");
        return Ok(());
    }

    for stack in &stacks {
        println!("{}", format_stack(stack));
    }
    Ok(())
}

fn format_stack(stack: &Stack) -> String {
    let mut line = format!(
        "{:<20} {:<24} {} item(s)",
        stack.key,
        stack.name,
        stack.contents.len()
    );
    if !stack.descendants.is_empty() {
        line.push_str(&format!("  includes {}", stack.descendants.join(", ")));
    }
    line
}
