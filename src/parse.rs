use crate::entry::{EntryId, LiteralCode, SubWorkKind, TranslationMode, MAX_HEADING_DEPTH};
use crate::error::GenError;
use crate::replace::{parse_group_index, ReplaceRule};
use crate::scan::Token;

/// Heading text marking the verbatim pass-through group.
pub const TRAP_HEADING_CODE: &str = "Heading Code";
/// Depth-2 heading text switching into a builder-prepare sub-node.
pub const TRAP_BUILDER_PREPARE: &str = "- Builder Prepare";
/// Depth-2 heading text restoring from a sub-work node to its parent.
pub const TRAP_CONTENT_CODE: &str = "- Content Code";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OptionState {
    Zero,
    ConstName,
    BuilderArgs,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Zero,
    Heading1,
    Heading2,
    HeadingN,
    OptionItem(OptionState),
    ReplaceRule,
}

/// A replace rule under construction inside a nested bullet list.
#[derive(Default)]
struct RuleDraft {
    active: bool,
    rule: Option<ReplaceRule>,
    target_open: bool,
}

/// The one mutable parse workspace: current node, per-depth ancestor chain
/// and the pending replace rule, threaded through every transition.
struct ParseSpace {
    result: LiteralCode,
    current: Option<EntryId>,
    chain: [Option<EntryId>; MAX_HEADING_DEPTH],
    draft: RuleDraft,
}

impl ParseSpace {
    fn new() -> Self {
        ParseSpace {
            result: LiteralCode::new(),
            current: None,
            chain: [None; MAX_HEADING_DEPTH],
            draft: RuleDraft::default(),
        }
    }

    fn wipe_chain_from(&mut self, index: usize) {
        for slot in self.chain.iter_mut().skip(index) {
            *slot = None;
        }
    }

    fn state_zero(&mut self, token: &Token) -> Result<State, GenError> {
        match token {
            Token::HeadingOpen { level: 1 } => {
                self.wipe_chain_from(0);
                Ok(State::Heading1)
            }
            Token::HeadingOpen { level: 2 } => Ok(State::Heading2),
            Token::HeadingOpen { level } if *level <= MAX_HEADING_DEPTH => {
                self.wipe_chain_from(*level - 1);
                if self.chain[0].is_none() {
                    return Err(GenError::Structure(format!(
                        "heading of depth {} should have parent node",
                        level
                    )));
                }
                Ok(State::HeadingN)
            }
            Token::ListItemOpen => Ok(State::OptionItem(OptionState::Zero)),
            Token::Fence { info, content } => {
                match self.current {
                    Some(id) => {
                        let (lang_type, filter_args) = parse_fence_info(info);
                        self.result
                            .entry_mut(id)
                            .append_content(content, &lang_type, &filter_args);
                    }
                    None => eprintln!("WARN: code block without a current node, skipped"),
                }
                Ok(State::Zero)
            }
            // Structural closes and prose between blocks carry no meaning here.
            _ => Ok(State::Zero),
        }
    }

    fn state_heading1(&mut self, token: &Token) -> Result<State, GenError> {
        let Token::InlineText(text) = token else {
            return Err(GenError::Structure(format!(
                "unexpected token after depth-1 heading: {:?}",
                token
            )));
        };
        if text == TRAP_HEADING_CODE {
            self.current = Some(self.result.new_heading_code());
        } else {
            let node = self.result.new_literal_constant();
            self.result.entry_mut(node).title = text.clone();
            self.current = Some(node);
            self.chain[0] = Some(node);
        }
        Ok(State::Zero)
    }

    fn state_heading2(&mut self, token: &Token) -> Result<State, GenError> {
        if let Token::InlineText(text) = token {
            match text.as_str() {
                TRAP_BUILDER_PREPARE => {
                    let Some(base) = self.current else {
                        return Err(GenError::Structure(
                            "expecting base node for builder prepare".to_string(),
                        ));
                    };
                    if self.result.entry(base).builder_prepare.is_some() {
                        eprintln!(
                            "WARN: builder prepare already existed: [{}]",
                            self.result.entry(base).title
                        );
                    }
                    let node = self.result.builder_prepare_node(base);
                    self.result.entry_mut(node).title = text.clone();
                    self.current = Some(node);
                    return Ok(State::Zero);
                }
                TRAP_CONTENT_CODE => {
                    let Some(node) = self.current else {
                        return Err(GenError::Structure(
                            "expecting a working node for content code".to_string(),
                        ));
                    };
                    if self.result.entry(node).sub_work != SubWorkKind::None {
                        self.current = self.result.entry(node).parent;
                    }
                    return Ok(State::Zero);
                }
                _ => {}
            }
        }
        self.wipe_chain_from(1);
        if self.chain[0].is_none() {
            return Err(GenError::Structure(
                "heading of depth 2 should have parent node".to_string(),
            ));
        }
        self.state_heading_n(token)
    }

    fn state_heading_n(&mut self, token: &Token) -> Result<State, GenError> {
        let Token::InlineText(text) = token else {
            return Err(GenError::Structure(format!(
                "unexpected token after nested heading: {:?}",
                token
            )));
        };
        let node = self.result.new_child_entry();
        self.result.entry_mut(node).title = text.clone();
        let mut parent = self.chain[0];
        for idx in 1..MAX_HEADING_DEPTH {
            match self.chain[idx] {
                Some(id) => parent = Some(id),
                None => {
                    let Some(parent) = parent else {
                        return Err(GenError::Structure(
                            "nested heading should have parent node".to_string(),
                        ));
                    };
                    self.result.attach(node, parent);
                    self.current = Some(node);
                    self.chain[idx] = Some(node);
                    return Ok(State::Zero);
                }
            }
        }
        Err(GenError::Structure(
            "ancestor chain exhausted for nested heading".to_string(),
        ))
    }

    fn option_keyword(&mut self, keyword: &str) -> OptionState {
        let Some(id) = self.current else {
            eprintln!("WARN: option directive without a current node: {}", keyword);
            return OptionState::Zero;
        };
        let entry = self.result.entry_mut(id);
        match keyword {
            "noop" => entry.mode = TranslationMode::Noop,
            "const" => {
                entry.mode = TranslationMode::Const;
                return OptionState::ConstName;
            }
            "builder" => {
                entry.mode = TranslationMode::Builder;
                return OptionState::BuilderArgs;
            }
            "replace" => {
                self.draft = RuleDraft {
                    active: true,
                    ..Default::default()
                };
            }
            "strip-spaces" => entry.trim_space = true,
            "preserve-new-line" => entry.preserve_new_line = true,
            "keep-empty-line" => entry.keep_empty_line = true,
            "tail-new-line" => entry.tail_new_line = true,
            "disable-language-filter" => entry.disable_language_filter = true,
            _ => eprintln!("WARN: unknown option command: {}", keyword),
        }
        OptionState::Zero
    }

    fn state_option_item(&mut self, opt: OptionState, token: &Token) -> Result<State, GenError> {
        match token {
            Token::CodeSpan(text) => {
                let next = match (opt, self.current) {
                    (_, None) => {
                        eprintln!("WARN: option token without a current node: {}", text);
                        opt
                    }
                    (OptionState::Zero, Some(_)) => self.option_keyword(text),
                    (OptionState::ConstName, Some(id)) => {
                        self.result.entry_mut(id).name = text.clone();
                        OptionState::ConstName
                    }
                    (OptionState::BuilderArgs, Some(id)) => {
                        let entry = self.result.entry_mut(id);
                        if entry.name.is_empty() {
                            entry.name = text.clone();
                        } else {
                            entry.parameters.push(text.clone());
                        }
                        OptionState::BuilderArgs
                    }
                };
                Ok(State::OptionItem(next))
            }
            Token::ListItemClose => {
                self.draft = RuleDraft::default();
                Ok(State::Zero)
            }
            Token::BulletListOpen => {
                if self.draft.active {
                    Ok(State::ReplaceRule)
                } else {
                    eprintln!("WARN: nested list without a replace directive, skipped");
                    Ok(State::OptionItem(opt))
                }
            }
            _ => Ok(State::OptionItem(opt)),
        }
    }

    fn state_replace_rule(&mut self, token: &Token) -> Result<State, GenError> {
        match token {
            Token::CodeSpan(text) => {
                if self.draft.rule.is_none() {
                    self.draft.rule = Some(ReplaceRule::new(text)?);
                    self.draft.target_open = false;
                } else if self.draft.target_open {
                    if let Some(rule) = &mut self.draft.rule {
                        if let Some(target) = rule.targets.last_mut() {
                            target.replacement_code = text.clone();
                        }
                    }
                    self.draft.target_open = false;
                } else {
                    let group = parse_group_index(text)?;
                    if let Some(rule) = &mut self.draft.rule {
                        rule.add_target(group, "");
                    }
                    self.draft.target_open = true;
                }
                Ok(State::ReplaceRule)
            }
            Token::BulletListClose => {
                if let Some(mut rule) = self.draft.rule.take() {
                    rule.sort_targets();
                    if let Some(id) = self.current {
                        self.result.entry_mut(id).append_replace_rule(rule);
                    }
                }
                self.draft = RuleDraft::default();
                Ok(State::OptionItem(OptionState::Zero))
            }
            // Item boundaries inside the rule list are positional noise.
            _ => Ok(State::ReplaceRule),
        }
    }

    fn feed(&mut self, state: State, token: &Token) -> Result<State, GenError> {
        match state {
            State::Zero => self.state_zero(token),
            State::Heading1 => self.state_heading1(token),
            State::Heading2 => self.state_heading2(token),
            State::HeadingN => self.state_heading_n(token),
            State::OptionItem(opt) => self.state_option_item(opt, token),
            State::ReplaceRule => self.state_replace_rule(token),
        }
    }
}

/// Split a fence info string into the content-language tag and filter args.
fn parse_fence_info(info: &str) -> (String, Vec<String>) {
    let mut parts = info.split_whitespace();
    let lang = parts.next().unwrap_or_default().to_string();
    let args = parts.map(|s| s.to_string()).collect();
    (lang, args)
}

/// Consume the token stream in document order and build the entry tree.
pub fn parse_tokens(tokens: &[Token]) -> Result<LiteralCode, GenError> {
    let mut work = ParseSpace::new();
    let mut state = State::Zero;
    for token in tokens {
        state = work.feed(state, token)?;
    }
    let mut result = work.result;
    result.push_replace_rules_down();
    Ok(result)
}
