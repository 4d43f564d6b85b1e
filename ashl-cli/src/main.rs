//! Command-line interface for ashl
//! Compiles an ashl file into one GLSL module per stage, or dumps an intermediate form.
//!
//! Usage:
//!   ashl `<path>` [--stage `<stage>`] [--format `<format>`]   - Print the result to stdout
//!   ashl `<path>` --out-dir `<dir>` [--format `<format>`]     - Write one file per stage
//!   ashl --list-formats                                     - List all available formats
//!
//! An `ashl.toml` next to the shader is picked up automatically; `--config`
//! and `--profile` are layered over it.

use ashl::{Compilation, Compiler, FormatRegistry, Formatter, Stage};
use ashl_config::{AshlConfig, Loader, ProfilePreset};
use clap::{Arg, ArgAction, ArgMatches, Command};
use log::{debug, info, LevelFilter};
use std::fs;
use std::path::{Path, PathBuf};

fn main() {
    let matches = Command::new("ashl")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Compile ashl shaders to GLSL")
        .arg_required_else_help(true)
        .arg(
            Arg::new("path")
                .help("Path to the ashl file")
                .required_unless_present("list-formats")
                .index(1),
        )
        .arg(
            Arg::new("stage")
                .long("stage")
                .short('s')
                .help("Stage to compile")
                .value_parser(["vertex", "fragment", "all"])
                .default_value("all"),
        )
        .arg(
            Arg::new("format")
                .long("format")
                .short('f')
                .help("Output format (see --list-formats)")
                .default_value("glsl"),
        )
        .arg(
            Arg::new("out-dir")
                .long("out-dir")
                .short('o')
                .help("Write each stage's GLSL into this directory instead of stdout"),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .short('c')
                .help("Configuration file layered over the defaults"),
        )
        .arg(
            Arg::new("profile")
                .long("profile")
                .short('p')
                .help("Language profile preset, overriding configuration files")
                .value_parser(["extended", "core"]),
        )
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .help("Log each compilation phase")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("list-formats")
                .long("list-formats")
                .help("List available output formats")
                .action(ArgAction::SetTrue),
        )
        .get_matches();

    init_logging(matches.get_flag("verbose"));

    if matches.get_flag("list-formats") {
        handle_list_formats_command();
        return;
    }

    handle_compile_command(&matches);
}

fn init_logging(verbose: bool) {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"));
    if verbose {
        builder.filter_level(LevelFilter::Debug);
    }
    builder.init();
}

fn load_config(matches: &ArgMatches, shader: &str) -> AshlConfig {
    let mut loader = Loader::new().with_project_file(shader);
    if let Some(path) = matches.get_one::<String>("config") {
        loader = loader.with_file(path);
    }
    if let Some(name) = matches.get_one::<String>("profile") {
        let preset = name.parse::<ProfilePreset>().unwrap_or_else(|e| {
            eprintln!("Configuration error: {}", e);
            std::process::exit(1);
        });
        loader = loader.with_preset(preset).unwrap_or_else(|e| {
            eprintln!("Configuration error: {}", e);
            std::process::exit(1);
        });
    }
    loader.build().unwrap_or_else(|e| {
        eprintln!("Configuration error: {}", e);
        std::process::exit(1);
    })
}

/// The stage picked with `--stage`, or `None` for all configured stages.
fn selected_stage(matches: &ArgMatches) -> Option<Stage> {
    matches
        .get_one::<String>("stage")
        .and_then(|name| name.parse().ok())
}

/// Handle the compile command
fn handle_compile_command(matches: &ArgMatches) {
    let Some(path) = matches.get_one::<String>("path") else {
        eprintln!("A path to an ashl file is required");
        std::process::exit(1);
    };
    let format = matches
        .get_one::<String>("format")
        .map(String::as_str)
        .unwrap_or("glsl");

    let config = load_config(matches, path);
    let stage = selected_stage(matches);
    let stages = stage.map_or_else(|| config.output.stages.clone(), |stage| vec![stage]);
    debug!("compiling {} for stages {:?}", path, stages);

    let compiler = Compiler::new(config.profile.language_profile())
        .with_preamble(config.output.preamble.iter().cloned())
        .with_stages(stages);
    let compilation = compiler.analyze_file(path).unwrap_or_else(|e| {
        eprintln!("Compilation error: {}", e);
        std::process::exit(1);
    });

    let registry = FormatRegistry::with_defaults();
    let formatter = registry.get(format).unwrap_or_else(|e| {
        eprintln!("Output error: {}", e);
        eprintln!("\nAvailable formats:");
        for name in registry.list_formats() {
            eprintln!("  {}", name);
        }
        std::process::exit(1);
    });

    if let Some(dir) = matches.get_one::<String>("out-dir") {
        write_stages(&compilation, formatter, &config, Path::new(path), Path::new(dir));
        return;
    }

    let output = registry
        .render(&compilation, format, stage)
        .unwrap_or_else(|e| {
            eprintln!("Output error: {}", e);
            std::process::exit(1);
        });

    print!("{}", output);
}

/// Write `<stem>.<ext>` (plus the format's suffix) for every compiled stage
/// and print the written paths.
fn write_stages(
    compilation: &Compilation,
    formatter: &dyn Formatter,
    config: &AshlConfig,
    source: &Path,
    dir: &Path,
) {
    let stem = source
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("shader");

    if let Err(e) = fs::create_dir_all(dir) {
        eprintln!("Failed to create {}: {}", dir.display(), e);
        std::process::exit(1);
    }

    for &(stage, _) in &compilation.stages {
        let text = formatter
            .render_stage(compilation, stage)
            .unwrap_or_else(|e| {
                eprintln!("Output error in {} stage: {}", stage, e);
                std::process::exit(1);
            });
        if let Ok(Some(size)) = compilation.push_constant_size(stage) {
            info!("{} stage push constant block is {} bytes", stage, size);
        }

        let mut file_name = format!("{}.{}", stem, config.output.extensions.for_stage(stage));
        if let Some(suffix) = formatter.file_suffix() {
            file_name = format!("{}.{}", file_name, suffix);
        }
        let target: PathBuf = dir.join(file_name);
        if let Err(e) = fs::write(&target, text) {
            eprintln!("Failed to write {}: {}", target.display(), e);
            std::process::exit(1);
        }
        println!("{}", target.display());
    }
}

/// Handle the list-formats command
fn handle_list_formats_command() {
    let registry = FormatRegistry::with_defaults();
    println!("Available output formats:\n");

    for name in registry.list_formats() {
        if let Ok(formatter) = registry.get(&name) {
            println!("  {}", name);
            println!("    {}", formatter.description());
            println!();
        }
    }
}
