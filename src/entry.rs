use crate::error::GenError;
use crate::filter::run_language_filter;
use crate::replace::ReplaceRule;

/// Max supported depth level of heading.
pub const MAX_HEADING_DEPTH: usize = 6;

/// How one entry translates into generated code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TranslationMode {
    #[default]
    Noop,
    Const,
    Builder,
}

/// Marks entries that hold auxiliary work for their parent instead of a
/// declaration of their own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SubWorkKind {
    #[default]
    None,
    BuilderPrepare,
}

/// Stable handle of one entry inside the arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EntryId(usize);

/// One literal entity to generate.
#[derive(Debug, Clone, Default)]
pub struct LiteralEntry {
    pub depth: usize,
    pub title: String,
    pub name: String,
    pub parameters: Vec<String>,
    pub mode: TranslationMode,
    pub sub_work: SubWorkKind,
    pub trim_space: bool,
    pub preserve_new_line: bool,
    pub keep_empty_line: bool,
    pub tail_new_line: bool,
    pub disable_language_filter: bool,
    pub content: Vec<String>,
    pub language_type: String,
    pub language_filter_args: Vec<String>,
    pub builder_prepare: Option<EntryId>,
    pub parent: Option<EntryId>,
    pub children: Vec<EntryId>,
    pub replace_rules: Vec<ReplaceRule>,
    pub plugin_data: Option<serde_json::Value>,
}

impl LiteralEntry {
    /// Add fenced block content line by line, transformed per the entry's
    /// formatting flags, and record the language tag of the first fence.
    pub fn append_content(&mut self, content: &str, lang_type: &str, filter_args: &[String]) {
        let block = if self.keep_empty_line {
            content.trim_end()
        } else {
            content
        };
        let lines: Vec<&str> = block.split('\n').collect();
        let last_line_index = lines.len() - 1;
        for (idx, raw) in lines.iter().enumerate() {
            let mut line = if self.trim_space {
                raw.trim().to_string()
            } else if self.keep_empty_line {
                raw.to_string()
            } else {
                raw.trim_end().to_string()
            };
            if (idx == last_line_index && self.tail_new_line) || self.preserve_new_line {
                line.push('\n');
            } else if line.is_empty() && !self.keep_empty_line {
                continue;
            }
            self.content.push(line);
        }
        if self.language_type.is_empty() {
            self.language_type = lang_type.to_string();
            self.language_filter_args = filter_args.to_vec();
        } else if !filter_args.is_empty() && filter_args != self.language_filter_args {
            eprintln!(
                "WARN: only filter arguments from first code block are taken: {:?}",
                filter_args
            );
        }
    }

    pub fn append_replace_rule(&mut self, rule: ReplaceRule) {
        self.replace_rules.push(rule);
    }

    /// Content after the content-language filter ran over it.
    pub fn filtered_content(&self) -> Result<Vec<String>, GenError> {
        if self.disable_language_filter {
            return Ok(self.content.clone());
        }
        run_language_filter(&self.language_type, &self.content, &self.language_filter_args)
    }
}

/// The parsed document: heading-code pass-through entries plus the literal
/// constant tree, all nodes living in one arena.
#[derive(Debug, Default)]
pub struct LiteralCode {
    nodes: Vec<LiteralEntry>,
    pub heading_codes: Vec<EntryId>,
    pub literal_constants: Vec<EntryId>,
}

impl LiteralCode {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entry(&self, id: EntryId) -> &LiteralEntry {
        &self.nodes[id.0]
    }

    pub fn entry_mut(&mut self, id: EntryId) -> &mut LiteralEntry {
        &mut self.nodes[id.0]
    }

    fn alloc(&mut self) -> EntryId {
        let id = EntryId(self.nodes.len());
        self.nodes.push(LiteralEntry::default());
        id
    }

    /// Allocate one entry as heading code node.
    pub fn new_heading_code(&mut self) -> EntryId {
        let id = self.alloc();
        self.heading_codes.push(id);
        id
    }

    /// Allocate one entry as a root literal constant node.
    pub fn new_literal_constant(&mut self) -> EntryId {
        let id = self.alloc();
        self.literal_constants.push(id);
        id
    }

    /// Allocate one entry that will be attached below an existing node.
    pub fn new_child_entry(&mut self) -> EntryId {
        self.alloc()
    }

    /// Attach a freshly allocated entry to its parent. The parent link is
    /// assigned once; formatting flags are copied here and never re-inherited.
    pub fn attach(&mut self, child: EntryId, parent: EntryId) {
        self.link(child, parent);
        self.entry_mut(parent).children.push(child);
    }

    fn link(&mut self, child: EntryId, parent: EntryId) {
        let (depth, trim_space, preserve_new_line, keep_empty_line, tail_new_line, disable_filter) = {
            let p = self.entry(parent);
            (
                p.depth + 1,
                p.trim_space,
                p.preserve_new_line,
                p.keep_empty_line,
                p.tail_new_line,
                p.disable_language_filter,
            )
        };
        let c = self.entry_mut(child);
        c.parent = Some(parent);
        c.depth = depth;
        c.trim_space = trim_space;
        c.preserve_new_line = preserve_new_line;
        c.keep_empty_line = keep_empty_line;
        c.tail_new_line = tail_new_line;
        c.disable_language_filter = disable_filter;
    }

    /// Lazily create the builder-prepare sub-node of an entry. The node hangs
    /// off its owner instead of the children list: it is emitted through the
    /// owner's builder body, never as an independent declaration.
    pub fn builder_prepare_node(&mut self, owner: EntryId) -> EntryId {
        if let Some(existing) = self.entry(owner).builder_prepare {
            return existing;
        }
        let id = self.alloc();
        self.link(id, owner);
        self.entry_mut(id).sub_work = SubWorkKind::BuilderPrepare;
        self.entry_mut(owner).builder_prepare = Some(id);
        id
    }

    /// Copy replace rules from ancestors onto rule-less descendants. A node
    /// with explicit local rules keeps them.
    pub fn push_replace_rules_down(&mut self) {
        let roots: Vec<EntryId> = self.literal_constants.clone();
        for root in roots {
            self.push_rules_below(root);
        }
    }

    fn push_rules_below(&mut self, parent: EntryId) {
        let children: Vec<EntryId> = self.entry(parent).children.clone();
        for child in children {
            if self.entry(child).replace_rules.is_empty() {
                let inherited = self.entry(parent).replace_rules.clone();
                self.entry_mut(child).replace_rules = inherited;
            }
            self.push_rules_below(child);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::replace::ReplaceRule;

    #[test]
    fn test_append_content_drops_empty_lines() {
        let mut entry = LiteralEntry::default();
        entry.append_content("a\n\nb\n", "sql", &[]);
        assert_eq!(entry.content, vec!["a", "b"]);
        assert_eq!(entry.language_type, "sql");
    }

    #[test]
    fn test_append_content_trim_space() {
        let mut entry = LiteralEntry {
            trim_space: true,
            ..Default::default()
        };
        entry.append_content("  a  \n\tb\t\n", "", &[]);
        assert_eq!(entry.content, vec!["a", "b"]);
    }

    #[test]
    fn test_append_content_tail_new_line() {
        let mut entry = LiteralEntry {
            tail_new_line: true,
            ..Default::default()
        };
        entry.append_content("a\nb", "", &[]);
        assert_eq!(entry.content, vec!["a", "b\n"]);
    }

    #[test]
    fn test_append_content_preserve_new_line() {
        let mut entry = LiteralEntry {
            preserve_new_line: true,
            ..Default::default()
        };
        entry.append_content("a\nb", "", &[]);
        assert_eq!(entry.content, vec!["a\n", "b\n"]);
    }

    #[test]
    fn test_append_content_keep_empty_line() {
        let mut entry = LiteralEntry {
            keep_empty_line: true,
            ..Default::default()
        };
        entry.append_content("a\n\nb\n\n", "", &[]);
        assert_eq!(entry.content, vec!["a", "", "b"]);
    }

    #[test]
    fn test_first_fence_language_wins() {
        let mut entry = LiteralEntry::default();
        entry.append_content("a", "sql", &["keep-comment".to_string()]);
        entry.append_content("b", "text", &["other-arg".to_string()]);
        assert_eq!(entry.language_type, "sql");
        assert_eq!(entry.language_filter_args, vec!["keep-comment"]);
    }

    #[test]
    fn test_attach_copies_flags_and_depth() {
        let mut code = LiteralCode::new();
        let root = code.new_literal_constant();
        code.entry_mut(root).trim_space = true;
        code.entry_mut(root).tail_new_line = true;
        let child = code.new_child_entry();
        code.attach(child, root);
        let c = code.entry(child);
        assert_eq!(c.depth, 1);
        assert_eq!(c.parent, Some(root));
        assert!(c.trim_space);
        assert!(c.tail_new_line);
        assert!(!c.preserve_new_line);
        assert_eq!(code.entry(root).children, vec![child]);
    }

    #[test]
    fn test_builder_prepare_node_is_lazy_and_hidden() {
        let mut code = LiteralCode::new();
        let root = code.new_literal_constant();
        let prep = code.builder_prepare_node(root);
        assert_eq!(code.builder_prepare_node(root), prep);
        assert_eq!(code.entry(prep).sub_work, SubWorkKind::BuilderPrepare);
        assert_eq!(code.entry(prep).parent, Some(root));
        assert!(code.entry(root).children.is_empty());
        assert_eq!(code.literal_constants, vec![root]);
    }

    #[test]
    fn test_push_replace_rules_down() {
        let mut code = LiteralCode::new();
        let root = code.new_literal_constant();
        let rule = ReplaceRule::new(r"(\d+)").unwrap();
        code.entry_mut(root).append_replace_rule(rule);

        let plain = code.new_child_entry();
        code.attach(plain, root);
        let with_local = code.new_child_entry();
        code.attach(with_local, root);
        let mut local = ReplaceRule::new(r"local").unwrap();
        local.add_target(0, "x");
        code.entry_mut(with_local).append_replace_rule(local);
        let grandchild = code.new_child_entry();
        code.attach(grandchild, plain);

        code.push_replace_rules_down();

        assert_eq!(code.entry(plain).replace_rules.len(), 1);
        assert_eq!(code.entry(plain).replace_rules[0].pattern_str(), r"(\d+)");
        assert_eq!(code.entry(grandchild).replace_rules.len(), 1);
        // Explicit local rules are never overwritten.
        assert_eq!(code.entry(with_local).replace_rules[0].pattern_str(), "local");
    }
}
