mod commands;
mod context;
mod examples;
mod output;
mod theme;

use anyhow::Result;
use clap::{ColorChoice, Command, CommandFactory, FromArgMatches, Parser, Subcommand, builder::Styles};
use std::fmt::Write;

use commands::{
    generate::{GenerateArgs, handle_generate},
    init::{InitArgs, handle_init},
    scan::{ScanArgs, handle_scan},
};
use examples::{examples_for, render_examples};
use output::{GlobalOptions, OutputFormat, OutputManager};
use theme::{COLOR_SUPPORTED, Tone, paint};

const ENVIRONMENT_VARIABLES: &[(&str, &str)] = &[
    ("MODELREG_SOURCE_DIR", "Directory holding the model declarations"),
    ("MODELREG_OUTPUT_FILE", "File the generated registry is written to"),
    ("RUST_LOG", "Log filter (e.g. modelreg_build=debug)"),
];

#[derive(Parser)]
#[command(name = "modelreg")]
#[command(version)]
#[command(
    about = "Generate a registry of every model struct in a module directory",
    long_about = r#"Scans a module directory for top-level record structs and writes a
sibling module listing a zero-valued instance of each, ready to be handed
to schema migration code.

Commands:
  init      Write a default .modelreg/config.toml
  generate  Scan the model directory and write the registry
  scan      List classified declarations without writing anything
"#
)]
#[command(subcommand_required = true, arg_required_else_help = true)]
struct Cli {
    /// Output format
    #[arg(long, value_enum, default_value = "table", global = true)]
    output: OutputFormat,

    /// Suppress output (only errors will be shown)
    #[arg(short = 'q', long, global = true)]
    quiet: bool,

    /// Enable verbose output and debug logging
    #[arg(short = 'v', long, global = true)]
    verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a default .modelreg/config.toml
    Init(InitArgs),

    /// Scan the model directory and write the registry
    Generate(GenerateArgs),

    /// List classified declarations without writing anything
    Scan(ScanArgs),
}

fn build_cli_command() -> Command {
    let use_color = *COLOR_SUPPORTED;
    let mut command = Cli::command()
        .after_long_help(render_top_level_appendix(use_color))
        .color(if use_color { ColorChoice::Auto } else { ColorChoice::Never })
        .styles(help_styles());

    for subcommand in command.get_subcommands_mut() {
        if let Some(groups) = examples_for(subcommand.get_name()) {
            *subcommand = subcommand
                .clone()
                .after_long_help(render_examples(groups, use_color));
        }
    }
    command
}

fn render_top_level_appendix(use_color: bool) -> String {
    let mut buffer = String::new();

    let _ = writeln!(
        buffer,
        "{}",
        paint("Environment Variables:", Tone::Heading, true, use_color)
    );
    for (key, description) in ENVIRONMENT_VARIABLES {
        let key_text = paint(key, Tone::Label, true, use_color);
        let _ = writeln!(buffer, "  {key_text}  {}", paint(description, Tone::Value, false, use_color));
    }

    buffer.push('\n');
    let tip = paint(
        "Use 'modelreg <command> --help' to view examples for each command.",
        Tone::Accent,
        false,
        use_color,
    );
    let _ = writeln!(buffer, "{} {tip}", paint("Tip:", Tone::Heading, true, use_color));

    buffer
}

fn help_styles() -> Styles {
    Styles::styled()
        .usage(Tone::Title.help_style().bold())
        .header(Tone::Heading.help_style().bold())
        .literal(Tone::Accent.help_style())
        .placeholder(Tone::Subtle.help_style())
        .valid(Tone::Success.help_style())
        .invalid(Tone::Warning.help_style())
        .error(Tone::Failure.help_style().bold())
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .format_timestamp(None)
        .init();
}

fn main() {
    let matches = build_cli_command().get_matches();
    let cli = match Cli::from_arg_matches(&matches) {
        Ok(cli) => cli,
        Err(err) => err.exit(),
    };

    init_logging(cli.verbose);

    let output = OutputManager::new(GlobalOptions {
        output_format: cli.output,
        quiet: cli.quiet,
        verbose: cli.verbose,
        no_color: cli.no_color,
    });
    if output.options.no_color {
        colored::control::set_override(false);
    }

    if let Err(err) = execute(cli.command, &output) {
        output.error(&format!("Error: {err:#}"));
        std::process::exit(1);
    }
}

fn execute(command: Commands, output: &OutputManager) -> Result<()> {
    match command {
        Commands::Init(args) => handle_init(args, output),
        Commands::Generate(args) => handle_generate(args, output),
        Commands::Scan(args) => handle_scan(args, output),
    }
}
