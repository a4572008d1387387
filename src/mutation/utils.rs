use tracing::debug;

use super::DocumentEdit;

pub fn log_edit(edit: &DocumentEdit) {
    match edit {
        DocumentEdit::Insert { index, element } => {
            debug!("+ Element {} at {}", element.id, index);
            debug!("  + Type: {}", element.kind);
            debug!("  + Position: ({}, {})", element.x, element.y);
        }
        DocumentEdit::Remove { index, element } => {
            debug!("- Element {} at {}", element.id, index);
        }
        DocumentEdit::Replace {
            index,
            before,
            after,
        } => {
            debug!("~ Element {} at {}", after.id, index);
            if before.kind != after.kind {
                debug!("  ~ Type: {} -> {}", before.kind, after.kind);
            }
            if before.x != after.x || before.y != after.y {
                debug!(
                    "  ~ Position: ({}, {}) -> ({}, {})",
                    before.x, before.y, after.x, after.y
                );
            }
            if before.label != after.label {
                debug!("  ~ Label: {:?} -> {:?}", before.label, after.label);
            }
            for (key, value) in after.properties.iter() {
                if before.properties.get(key) != Some(value) {
                    debug!("  + Property: {} = {}", key, value);
                }
            }
            for key in before.properties.keys() {
                if !after.properties.contains_key(key) {
                    debug!("  - Property: {}", key);
                }
            }
        }
    }
}
