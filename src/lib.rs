pub mod config;
pub mod dump;
pub mod emit;
pub mod entry;
pub mod error;
pub mod filter;
pub mod normalize;
pub mod parse;
pub mod plugin;
pub mod replace;
pub mod scan;

use config::Config;
use entry::LiteralCode;
use error::GenError;
use plugin::{Plugin, PluginList};

/// Parse one literal definition document into the entry tree.
pub fn parse_document(text: &str) -> Result<LiteralCode, GenError> {
    let lines = normalize::normalize_lines(text);
    let tokens = scan::scan_lines(&lines);
    parse::parse_tokens(&tokens)
}

/// Run plugin pre-pass, emission and plugin post-pass. Output is rendered in
/// memory, so a fatal condition never leaves partial output behind.
pub fn generate(
    code: &mut LiteralCode,
    config: &Config,
    plugins: &mut PluginList,
) -> Result<Vec<u8>, GenError> {
    if config.dump_tree {
        dump::dump_literal_code(code);
    }
    plugins.pre_generate(code)?;
    let mut out: Vec<u8> = Vec::new();
    emit::generate_code(&mut out, code, config)?;
    plugins.post_generate(&mut out, code)?;
    Ok(out)
}

/// Parse and generate in one step, without plugins.
pub fn compile(text: &str, config: &Config) -> Result<String, GenError> {
    let mut code = parse_document(text)?;
    let mut plugins = PluginList::new();
    let out = generate(&mut code, config, &mut plugins)?;
    Ok(String::from_utf8_lossy(&out).into_owned())
}
