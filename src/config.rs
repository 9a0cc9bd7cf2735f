use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Write a DO-NOT-EDIT marker line before everything else.
    #[serde(default)]
    pub do_not_edit: bool,

    /// Dump the parsed entry tree to stderr before generation.
    #[serde(default)]
    pub dump_tree: bool,

    /// Output symbol name that marks an entry as intentionally skipped.
    #[serde(default = "default_skip_sentinel")]
    pub skip_sentinel: String,
}

fn default_skip_sentinel() -> String {
    "-".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Config {
            do_not_edit: false,
            dump_tree: false,
            skip_sentinel: "-".to_string(),
        }
    }
}
