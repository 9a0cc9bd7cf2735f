use crate::error::GenError;
use indexmap::IndexMap;
use std::sync::LazyLock;

type LanguageFilter = fn(&[String], &[String]) -> Result<Vec<String>, GenError>;

static LANGUAGE_FILTERS: LazyLock<IndexMap<&'static str, LanguageFilter>> =
    LazyLock::new(|| {
        let mut m: IndexMap<&'static str, LanguageFilter> = IndexMap::new();
        m.insert("sql", sql_content_filter);
        m
    });

fn parse_sql_filter_args(filter_args: &[String]) -> bool {
    let mut remove_comments = true;
    for arg in filter_args {
        if arg == "keep-comment" {
            remove_comments = false;
        }
    }
    remove_comments
}

/// Normalize SQL content: strip comment lines, trim the trailing statement
/// terminator, and keep keyword spacing intact across joined lines.
fn sql_content_filter(content: &[String], filter_args: &[String]) -> Result<Vec<String>, GenError> {
    let remove_comments = parse_sql_filter_args(filter_args);
    let last_line_index = content.len().saturating_sub(1);
    let mut not_need_space = true;
    let mut result = Vec::new();
    for (idx, raw) in content.iter().enumerate() {
        if remove_comments {
            let stripped = raw.trim_start();
            if stripped.starts_with("--") || stripped.starts_with("/*") {
                continue;
            }
        }
        let mut line = if idx == last_line_index {
            raw.trim_end_matches(|r: char| r == ';' || r.is_whitespace())
                .to_string()
        } else {
            raw.clone()
        };
        if let Some(first_ch) = line.chars().next() {
            let last_ch = line.chars().next_back().unwrap_or(first_ch);
            if !not_need_space && first_ch.is_ascii_uppercase() {
                line.insert(0, ' ');
            }
            not_need_space = last_ch == '(' || last_ch == ',';
        }
        result.push(line);
    }
    Ok(result)
}

/// Run the content filter registered for a language tag. Unrecognized tags
/// pass content through unchanged.
pub fn run_language_filter(
    lang_type: &str,
    content: &[String],
    filter_args: &[String],
) -> Result<Vec<String>, GenError> {
    match LANGUAGE_FILTERS.get(lang_type) {
        Some(filter) => filter(content, filter_args),
        None => Ok(content.to_vec()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn s(v: &[&str]) -> Vec<String> {
        v.iter().map(|x| x.to_string()).collect()
    }

    #[test]
    fn test_unknown_language_passthrough() {
        let content = s(&["anything -- goes"]);
        let result = run_language_filter("text", &content, &[]).unwrap();
        assert_eq!(result, content);
    }

    #[test]
    fn test_sql_removes_comment_lines() {
        let content = s(&["-- a comment", "CREATE TABLE t (", "/* block */", "x INTEGER)"]);
        let result = run_language_filter("sql", &content, &[]).unwrap();
        assert_eq!(result, s(&["CREATE TABLE t (", "x INTEGER)"]));
    }

    #[test]
    fn test_sql_keep_comment_arg() {
        let content = s(&["-- keep me", "SELECT 1"]);
        let result = run_language_filter("sql", &content, &s(&["keep-comment"])).unwrap();
        assert_eq!(result, s(&["-- keep me", "SELECT 1"]));
    }

    #[test]
    fn test_sql_trims_trailing_terminator() {
        let content = s(&["SELECT 1 ; "]);
        let result = run_language_filter("sql", &content, &[]).unwrap();
        assert_eq!(result, s(&["SELECT 1"]));
    }

    #[test]
    fn test_sql_keyword_spacing() {
        // Lines joined by the emitter must not glue keywords together, except
        // after an opening paren or a comma.
        let content = s(&["CREATE TABLE t (", "a INTEGER,", "b TEXT)", "WITHOUT ROWID;"]);
        let result = run_language_filter("sql", &content, &[]).unwrap();
        assert_eq!(
            result,
            s(&["CREATE TABLE t (", "a INTEGER,", "b TEXT)", " WITHOUT ROWID"])
        );
    }
}
