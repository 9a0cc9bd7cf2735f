use crate::entry::{EntryId, LiteralCode};

fn dump_entry(code: &LiteralCode, id: EntryId, indent: usize) {
    let entry = code.entry(id);
    let pad = "  ".repeat(indent);
    eprintln!(
        "{}- {:?} [{}] (depth={}; mode={:?}; subwork={:?}): trim-space={}, preserve-new-line={}, keep-empty-line={}, tail-new-line={}",
        pad,
        entry.name,
        entry.title,
        entry.depth,
        entry.mode,
        entry.sub_work,
        entry.trim_space,
        entry.preserve_new_line,
        entry.keep_empty_line,
        entry.tail_new_line,
    );
    if !entry.parameters.is_empty() {
        eprintln!("{}  > params: {:?}", pad, entry.parameters);
    }
    eprintln!("{}  > content ({}):", pad, entry.content.len());
    for (idx, line) in entry.content.iter().enumerate() {
        eprintln!("{}    {:03}: {:?}", pad, idx, line);
    }
    if !entry.replace_rules.is_empty() {
        eprintln!("{}  > replace ({}):", pad, entry.replace_rules.len());
        for (idx, rule) in entry.replace_rules.iter().enumerate() {
            eprintln!("{}    {}: {:?} x{}", pad, idx, rule.pattern_str(), rule.targets.len());
        }
    }
    if let Some(prepare) = entry.builder_prepare {
        eprintln!("{}  > builder-prepare:", pad);
        dump_entry(code, prepare, indent + 2);
    }
    for child in &entry.children {
        dump_entry(code, *child, indent + 1);
    }
}

/// Dump the parsed document tree to stderr.
pub fn dump_literal_code(code: &LiteralCode) {
    eprintln!("# Heading Code ({})", code.heading_codes.len());
    for id in &code.heading_codes {
        dump_entry(code, *id, 0);
    }
    eprintln!("# Literal Constants ({})", code.literal_constants.len());
    for id in &code.literal_constants {
        dump_entry(code, *id, 0);
    }
}
