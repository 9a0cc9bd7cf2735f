use crate::error::GenError;
use fancy_regex::Regex;

/// One capture-group-to-code mapping of a replace rule.
#[derive(Debug, Clone)]
pub struct ReplaceTarget {
    pub group_index: usize,
    pub replacement_code: String,
}

/// Parse a group index from an inline code span, keeping only the digits.
pub fn parse_group_index(text: &str) -> Result<usize, GenError> {
    let digits = text.trim_matches(|c: char| !c.is_ascii_digit());
    digits.parse::<usize>().map_err(|_| GenError::BadGroupIndex {
        text: text.to_string(),
    })
}

/// A compiled text pattern plus ordered replace targets.
#[derive(Debug, Clone)]
pub struct ReplaceRule {
    pattern: Regex,
    pub targets: Vec<ReplaceTarget>,
}

impl ReplaceRule {
    pub fn new(pattern_text: &str) -> Result<Self, GenError> {
        let trimmed = pattern_text.trim();
        let pattern = Regex::new(trimmed).map_err(|e| GenError::PatternCompile {
            pattern: trimmed.to_string(),
            reason: e.to_string(),
        })?;
        Ok(ReplaceRule {
            pattern,
            targets: Vec::new(),
        })
    }

    pub fn pattern_str(&self) -> &str {
        self.pattern.as_str()
    }

    pub fn add_target(&mut self, group_index: usize, replacement_code: &str) {
        self.targets.push(ReplaceTarget {
            group_index,
            replacement_code: replacement_code.to_string(),
        });
    }

    /// Targets must be ascending by group index before first use.
    pub fn sort_targets(&mut self) {
        self.targets.sort_by_key(|t| t.group_index);
    }

    /// Apply this rule once to a text line. An empty result means no match.
    /// Group existence is checked lazily, per matched line.
    fn apply(&self, line: &str) -> Result<Vec<ReplaceResult>, GenError> {
        let caps = match self.pattern.captures(line)? {
            Some(caps) => caps,
            None => return Ok(Vec::new()),
        };
        let mut results = Vec::with_capacity(self.targets.len());
        let last_target = self.targets.len().saturating_sub(1);
        let mut previous_suffix_start = 0usize;
        for (target_index, target) in self.targets.iter().enumerate() {
            let group = caps.get(target.group_index).ok_or_else(|| {
                GenError::GroupOutOfRange {
                    group: target.group_index,
                    groups: caps.len(),
                    line: line.to_string(),
                }
            })?;
            // Sorted targets must carve the line left to right; a group that
            // reaches back into an already consumed span is nested or
            // overlapping and cannot be spliced.
            if group.start() < previous_suffix_start {
                return Err(GenError::GroupOverlap {
                    group: target.group_index,
                    line: line.to_string(),
                });
            }
            let mut result = ReplaceResult {
                prefix_literal: line[previous_suffix_start..group.start()].to_string(),
                replaced_code: target.replacement_code.clone(),
                suffix_literal: String::new(),
            };
            if target_index == last_target {
                result.suffix_literal = line[group.end()..].to_string();
            } else {
                previous_suffix_start = group.end();
            }
            results.push(result);
        }
        Ok(results)
    }
}

/// Output of applying one rule to one line segment.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ReplaceResult {
    pub prefix_literal: String,
    pub replaced_code: String,
    pub suffix_literal: String,
}

impl ReplaceResult {
    fn is_empty(&self) -> bool {
        self.prefix_literal.is_empty()
            && self.replaced_code.is_empty()
            && self.suffix_literal.is_empty()
    }

    fn is_simple_literal(&self) -> bool {
        !self.prefix_literal.is_empty()
            && self.replaced_code.is_empty()
            && self.suffix_literal.is_empty()
    }

    /// Re-match this segment's literal prefix and suffix against a rule.
    /// Replaced code is never re-matched.
    fn run_with(&self, rule: &ReplaceRule) -> Result<Vec<ReplaceResult>, GenError> {
        let mut replaced = self.clone();
        let mut out = Vec::new();
        if !self.prefix_literal.is_empty() {
            let prefix_results = rule.apply(&self.prefix_literal)?;
            if !prefix_results.is_empty() {
                replaced.prefix_literal.clear();
                out.extend(prefix_results);
            }
        }
        let mut suffix_results = Vec::new();
        if !self.suffix_literal.is_empty() {
            suffix_results = rule.apply(&self.suffix_literal)?;
            if !suffix_results.is_empty() {
                replaced.suffix_literal.clear();
            }
        }
        if !replaced.is_empty() {
            out.push(replaced);
        }
        out.extend(suffix_results);
        Ok(out)
    }
}

/// Apply an ordered list of rules to one content line. `None` means the line
/// stays a plain literal.
pub fn do_replace(
    rules: &[ReplaceRule],
    line: &str,
) -> Result<Option<Vec<ReplaceResult>>, GenError> {
    if rules.is_empty() {
        return Ok(None);
    }
    let mut result = vec![ReplaceResult {
        prefix_literal: line.to_string(),
        ..Default::default()
    }];
    for rule in rules {
        let buffer = std::mem::take(&mut result);
        for segment in &buffer {
            result.extend(segment.run_with(rule)?);
        }
    }
    if result.is_empty() || (result.len() == 1 && result[0].is_simple_literal()) {
        return Ok(None);
    }
    Ok(Some(result))
}
