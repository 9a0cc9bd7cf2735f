use clap::Parser;
use litgen::config::Config;
use litgen::plugin::PluginList;
use std::fs;
use std::path::PathBuf;
use std::process;

#[derive(Parser)]
#[command(
    name = "litgen",
    about = "litgen - compile annotated Markdown literal definitions into Go source declarations"
)]
struct Cli {
    /// Input literal definition document
    input: PathBuf,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Write a DO-NOT-EDIT marker line before generated code
    #[arg(long)]
    do_not_edit: bool,

    /// Dump the parsed entry tree to stderr
    #[arg(long)]
    dump_tree: bool,

    /// Config file path
    #[arg(long)]
    config: Option<PathBuf>,
}

fn die(msg: &str) -> ! {
    eprintln!("error: {}", msg);
    process::exit(1);
}

fn load_config(path: &PathBuf) -> Config {
    let text =
        fs::read_to_string(path).unwrap_or_else(|e| die(&format!("cannot read config: {}", e)));
    serde_json::from_str(&text).unwrap_or_else(|e| die(&format!("invalid config JSON: {}", e)))
}

fn main() {
    let cli = Cli::parse();

    let mut config = if let Some(ref config_path) = cli.config {
        load_config(config_path)
    } else {
        let default_path = PathBuf::from("litgen.config.json");
        if default_path.is_file() {
            load_config(&default_path)
        } else {
            Config::default()
        }
    };

    // CLI overrides
    if cli.do_not_edit {
        config.do_not_edit = true;
    }
    if cli.dump_tree {
        config.dump_tree = true;
    }

    let text = fs::read_to_string(&cli.input)
        .unwrap_or_else(|e| die(&format!("cannot read {}: {}", cli.input.display(), e)));

    let mut code =
        litgen::parse_document(&text).unwrap_or_else(|e| die(&format!("parse failed: {}", e)));

    let mut plugins = PluginList::new();
    let result = litgen::generate(&mut code, &config, &mut plugins)
        .unwrap_or_else(|e| die(&format!("generation failed: {}", e)));

    // The output file is only touched once the whole run succeeded.
    if let Some(ref output_path) = cli.output {
        fs::write(output_path, &result)
            .unwrap_or_else(|e| die(&format!("cannot write {}: {}", output_path.display(), e)));
        eprintln!(
            "generated {} declaration(s) -> {}",
            litgen::emit::count_declarations(&code, &config),
            output_path.display()
        );
    } else {
        let mut stdout = std::io::stdout();
        use std::io::Write;
        stdout
            .write_all(&result)
            .unwrap_or_else(|e| die(&format!("cannot write output: {}", e)));
    }
}
