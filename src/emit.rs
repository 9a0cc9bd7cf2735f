use crate::config::Config;
use crate::entry::{EntryId, LiteralCode, LiteralEntry, TranslationMode};
use crate::error::GenError;
use crate::replace::{do_replace, ReplaceResult};
use std::io::Write;

/// Quote a content line as a Go string literal.
pub fn quote_go_string(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for ch in s.chars() {
        match ch {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            c if (c as u32) < 0x20 || (c as u32) == 0x7f => {
                out.push_str(&format!("\\x{:02x}", c as u32));
            }
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

/// Write entry content verbatim, terminating unterminated lines.
fn write_passthrough(out: &mut dyn Write, entry: &LiteralEntry) -> Result<(), GenError> {
    for line in &entry.content {
        out.write_all(line.as_bytes())?;
        if !line.ends_with('\n') {
            out.write_all(b"\n")?;
        }
    }
    Ok(())
}

fn write_heading_codes(out: &mut dyn Write, code: &LiteralCode) -> Result<(), GenError> {
    for id in &code.heading_codes {
        write_passthrough(out, code.entry(*id))?;
        out.write_all(b"\n")?;
    }
    Ok(())
}

fn write_simple_literal_line(
    out: &mut dyn Write,
    line: &str,
    current_line_index: usize,
    last_line_index: usize,
) -> Result<(), GenError> {
    let mut code_line = quote_go_string(line);
    if current_line_index != 0 {
        code_line = format!("\t\t{}", code_line);
    }
    if current_line_index != last_line_index {
        code_line.push_str(" +");
    }
    code_line.push('\n');
    out.write_all(code_line.as_bytes())?;
    Ok(())
}

fn append_literal_text(code_line: &mut String, literal: &str, has_code: bool) -> bool {
    if literal.is_empty() {
        return has_code;
    }
    if has_code {
        code_line.push_str(" + ");
    }
    code_line.push_str(&quote_go_string(literal));
    true
}

fn append_literal_code(code_line: &mut String, code_text: &str, has_code: bool) -> bool {
    if code_text.is_empty() {
        return has_code;
    }
    if has_code {
        code_line.push_str(" + ");
    }
    code_line.push('(');
    code_line.push_str(code_text);
    code_line.push(')');
    true
}

fn write_replaced_line(
    out: &mut dyn Write,
    segments: &[ReplaceResult],
    current_line_index: usize,
    last_line_index: usize,
) -> Result<(), GenError> {
    let mut code_line = if current_line_index != 0 {
        "\t\t".to_string()
    } else {
        String::new()
    };
    let mut has_code = false;
    for seg in segments {
        has_code = append_literal_text(&mut code_line, &seg.prefix_literal, has_code);
        has_code = append_literal_code(&mut code_line, &seg.replaced_code, has_code);
        has_code = append_literal_text(&mut code_line, &seg.suffix_literal, has_code);
    }
    if !has_code {
        return Ok(());
    }
    if current_line_index != last_line_index {
        code_line.push_str(" +");
    }
    code_line.push('\n');
    out.write_all(code_line.as_bytes())?;
    Ok(())
}

fn write_const(out: &mut dyn Write, entry: &LiteralEntry) -> Result<(), GenError> {
    write!(out, "const {} = ", entry.name)?;
    let content = entry.filtered_content()?;
    let last_line_index = content.len().saturating_sub(1);
    for (idx, line) in content.iter().enumerate() {
        write_simple_literal_line(out, line, idx, last_line_index)?;
    }
    out.write_all(b"\n")?;
    Ok(())
}

fn write_builder(out: &mut dyn Write, code: &LiteralCode, id: EntryId) -> Result<(), GenError> {
    let entry = code.entry(id);
    write!(out, "func {}({}) string {{\n", entry.name, entry.parameters.join(", "))?;
    if let Some(prepare) = entry.builder_prepare {
        write_passthrough(out, code.entry(prepare))?;
    }
    out.write_all(b"\treturn ")?;
    let content = entry.filtered_content()?;
    let last_line_index = content.len().saturating_sub(1);
    for (idx, line) in content.iter().enumerate() {
        match do_replace(&entry.replace_rules, line)? {
            None => write_simple_literal_line(out, line, idx, last_line_index)?,
            Some(segments) => write_replaced_line(out, &segments, idx, last_line_index)?,
        }
    }
    out.write_all(b"}\n\n")?;
    Ok(())
}

/// Number of root entries that produce a declaration, excluding noop entries
/// and entries skipped for an empty or sentinel name.
pub fn count_declarations(code: &LiteralCode, config: &Config) -> usize {
    code.literal_constants
        .iter()
        .filter(|id| {
            let entry = code.entry(**id);
            !entry.name.is_empty()
                && entry.name != config.skip_sentinel
                && entry.mode != TranslationMode::Noop
        })
        .count()
}

/// Walk the finished tree and write target-language declarations: heading
/// code first, then one declaration per root entry in document order.
pub fn generate_code(
    out: &mut dyn Write,
    code: &LiteralCode,
    config: &Config,
) -> Result<(), GenError> {
    if config.do_not_edit {
        out.write_all(b"// Code generated by litgen. DO NOT EDIT.\n\n")?;
    }
    write_heading_codes(out, code)?;
    for id in &code.literal_constants {
        let entry = code.entry(*id);
        if entry.name.is_empty() || entry.name == config.skip_sentinel {
            eprintln!("skip: {}", entry.title);
            continue;
        }
        match entry.mode {
            TranslationMode::Noop => eprintln!("noop: {}", entry.title),
            TranslationMode::Const => write_const(out, entry)?,
            TranslationMode::Builder => write_builder(out, code, *id)?,
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::LiteralCode;

    fn emit(code: &LiteralCode) -> String {
        let mut buf: Vec<u8> = Vec::new();
        generate_code(&mut buf, code, &Config::default()).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_quote_go_string() {
        assert_eq!(quote_go_string("plain"), "\"plain\"");
        assert_eq!(quote_go_string("a\"b\\c"), "\"a\\\"b\\\\c\"");
        assert_eq!(quote_go_string("tab\tnl\n"), "\"tab\\tnl\\n\"");
        assert_eq!(quote_go_string("\x01"), "\"\\x01\"");
    }

    #[test]
    fn test_heading_code_passthrough() {
        let mut code = LiteralCode::new();
        let id = code.new_heading_code();
        code.entry_mut(id).content = vec!["package sample".to_string(), "import \"fmt\"\n".to_string()];
        assert_eq!(emit(&code), "package sample\nimport \"fmt\"\n\n");
    }

    #[test]
    fn test_const_declaration() {
        let mut code = LiteralCode::new();
        let id = code.new_literal_constant();
        {
            let e = code.entry_mut(id);
            e.name = "SampleQuery".to_string();
            e.mode = TranslationMode::Const;
            e.content = vec!["SELECT a".to_string(), "FROM t".to_string()];
        }
        assert_eq!(
            emit(&code),
            "const SampleQuery = \"SELECT a\" +\n\t\t\"FROM t\"\n\n"
        );
    }

    #[test]
    fn test_noop_and_skip_sentinels_produce_nothing() {
        let mut code = LiteralCode::new();
        let noop = code.new_literal_constant();
        code.entry_mut(noop).name = "Explicit".to_string();
        let unnamed = code.new_literal_constant();
        code.entry_mut(unnamed).mode = TranslationMode::Const;
        let dash = code.new_literal_constant();
        {
            let e = code.entry_mut(dash);
            e.name = "-".to_string();
            e.mode = TranslationMode::Const;
        }
        assert_eq!(emit(&code), "");
    }

    #[test]
    fn test_count_declarations_excludes_skipped_entries() {
        let mut code = LiteralCode::new();
        let real = code.new_literal_constant();
        {
            let e = code.entry_mut(real);
            e.name = "Real".to_string();
            e.mode = TranslationMode::Const;
        }
        let noop = code.new_literal_constant();
        code.entry_mut(noop).name = "Named".to_string();
        code.new_literal_constant();
        let dash = code.new_literal_constant();
        {
            let e = code.entry_mut(dash);
            e.name = "-".to_string();
            e.mode = TranslationMode::Builder;
        }
        assert_eq!(count_declarations(&code, &Config::default()), 1);
    }

    #[test]
    fn test_builder_without_rules_is_constant_concatenation() {
        let mut code = LiteralCode::new();
        let id = code.new_literal_constant();
        {
            let e = code.entry_mut(id);
            e.name = "Make".to_string();
            e.mode = TranslationMode::Builder;
            e.parameters = vec!["id string".to_string()];
            e.content = vec!["SELECT a".to_string(), "FROM t".to_string()];
        }
        assert_eq!(
            emit(&code),
            "func Make(id string) string {\n\treturn \"SELECT a\" +\n\t\t\"FROM t\"\n}\n\n"
        );
    }

    #[test]
    fn test_builder_with_replace_rule() {
        let mut code = LiteralCode::new();
        let id = code.new_literal_constant();
        {
            let e = code.entry_mut(id);
            e.name = "ById".to_string();
            e.mode = TranslationMode::Builder;
            e.parameters = vec!["id string".to_string()];
            e.content = vec!["WHERE id = $1".to_string()];
            let mut rule = crate::replace::ReplaceRule::new(r"\$1").unwrap();
            rule.add_target(0, "id");
            rule.sort_targets();
            e.append_replace_rule(rule);
        }
        assert_eq!(
            emit(&code),
            "func ById(id string) string {\n\treturn \"WHERE id = \" + (id)\n}\n\n"
        );
    }

    #[test]
    fn test_builder_with_prepare_prelude() {
        let mut code = LiteralCode::new();
        let id = code.new_literal_constant();
        {
            let e = code.entry_mut(id);
            e.name = "Make".to_string();
            e.mode = TranslationMode::Builder;
            e.content = vec!["x".to_string()];
        }
        let prep = code.builder_prepare_node(id);
        code.entry_mut(prep).content = vec!["\tquoted := quote(name)".to_string()];
        assert_eq!(
            emit(&code),
            "func Make() string {\n\tquoted := quote(name)\n\treturn \"x\"\n}\n\n"
        );
    }

    #[test]
    fn test_do_not_edit_line() {
        let mut code = LiteralCode::new();
        let id = code.new_heading_code();
        code.entry_mut(id).content = vec!["package x".to_string()];
        let mut buf: Vec<u8> = Vec::new();
        let config = Config {
            do_not_edit: true,
            ..Default::default()
        };
        generate_code(&mut buf, &code, &config).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.starts_with("// Code generated by litgen. DO NOT EDIT.\n\n"));
    }

    #[test]
    fn test_group_out_of_range_surfaces_at_emission() {
        let mut code = LiteralCode::new();
        let id = code.new_literal_constant();
        {
            let e = code.entry_mut(id);
            e.name = "Bad".to_string();
            e.mode = TranslationMode::Builder;
            e.content = vec!["value 42".to_string()];
            let mut rule = crate::replace::ReplaceRule::new(r"(\d+)").unwrap();
            rule.add_target(5, "x");
            e.append_replace_rule(rule);
        }
        let mut buf: Vec<u8> = Vec::new();
        let err = generate_code(&mut buf, &code, &Config::default()).unwrap_err();
        assert!(matches!(err, GenError::GroupOutOfRange { group: 5, .. }));
    }

    #[test]
    fn test_sql_filter_applies_before_emission() {
        let mut code = LiteralCode::new();
        let id = code.new_literal_constant();
        {
            let e = code.entry_mut(id);
            e.name = "Schema".to_string();
            e.mode = TranslationMode::Const;
            e.language_type = "sql".to_string();
            e.content = vec!["-- comment".to_string(), "SELECT 1;".to_string()];
        }
        assert_eq!(emit(&code), "const Schema = \"SELECT 1\"\n\n");
    }
}
