//! foldconf CLI - Command-line interface for foldconf INI configuration
//!
//! Usage:
//!   foldconf get web url app.ini
//!   foldconf dump app.ini local.ini --resolve --format json
//!   foldconf check app.ini
//!   foldconf sections app.ini --options

use clap::{Parser, Subcommand};
use colored::Colorize;
use foldconf_core::{Config, Store};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

/// foldconf - INI configuration with %(var)s and ${ENV} unfolding
#[derive(Parser)]
#[command(name = "foldconf")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Get a single option value
    Get {
        /// Section name
        section: String,

        /// Option name
        option: String,

        /// Configuration file(s); later files override earlier ones
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Print the stored value without unfolding references
        #[arg(long)]
        raw: bool,

        /// Output format: text, json
        #[arg(short, long, default_value = "text")]
        format: String,

        /// Value to print if the option is not found
        #[arg(short, long)]
        default: Option<String>,
    },

    /// Export every section
    Dump {
        /// Configuration file(s) to dump
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Unfold references
        #[arg(short, long)]
        resolve: bool,

        /// Output format: yaml, json
        #[arg(short, long, default_value = "yaml")]
        format: String,

        /// Write to file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Quick syntax check
    Check {
        /// Configuration file(s) to check
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },

    /// List sections
    Sections {
        /// Configuration file(s)
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Also list the options visible from each section
        #[arg(long)]
        options: bool,
    },
}

/// Run the CLI with the process arguments
pub fn run() -> ExitCode {
    let cli = Cli::parse();

    match cli.command {
        Commands::Get {
            files,
            section,
            option,
            raw,
            format,
            default,
        } => cmd_get(files, &section, &option, raw, &format, default),

        Commands::Dump {
            files,
            resolve,
            format,
            output,
        } => cmd_dump(files, resolve, &format, output),

        Commands::Check { files } => cmd_check(files),

        Commands::Sections { files, options } => cmd_sections(files, options),
    }
}

fn load_config(files: &[PathBuf]) -> Result<Config, String> {
    if files.is_empty() {
        return Err("No configuration files specified".to_string());
    }

    Config::load_merged(files).map_err(|e| format!("Failed to load configuration: {}", e))
}

fn cmd_get(
    files: Vec<PathBuf>,
    section: &str,
    option: &str,
    raw: bool,
    format: &str,
    default: Option<String>,
) -> ExitCode {
    let config = match load_config(&files) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("{}", e.red());
            return ExitCode::from(2);
        }
    };

    let result = if raw {
        config.get_raw(section, option)
    } else {
        config.get_string(section, option)
    };

    match result {
        Ok(value) => {
            println!("{}", render_value(&value, format));
            ExitCode::SUCCESS
        }
        Err(e) if e.is_not_found() => {
            if let Some(default_val) = default {
                println!("{}", render_value(&default_val, format));
                ExitCode::SUCCESS
            } else {
                eprintln!(
                    "{}: Option '{}' not found in section [{}]",
                    "Error".red(),
                    option,
                    section
                );
                ExitCode::from(1)
            }
        }
        Err(e) => {
            eprintln!("{}: {}", "Error".red(), e);
            ExitCode::from(1)
        }
    }
}

fn render_value(value: &str, format: &str) -> String {
    match format {
        "json" => serde_json::Value::String(value.to_string()).to_string(),
        _ => value.to_string(),
    }
}

fn cmd_dump(files: Vec<PathBuf>, resolve: bool, format: &str, output: Option<PathBuf>) -> ExitCode {
    let config = match load_config(&files) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("{}", e.red());
            return ExitCode::from(2);
        }
    };

    let result = match format {
        "json" => config.to_json(resolve),
        _ => config.to_yaml(resolve),
    };

    match result {
        Ok(content) => {
            if let Some(output_path) = output {
                if let Err(e) = std::fs::write(&output_path, &content) {
                    eprintln!("{}: {}", "Error writing file".red(), e);
                    return ExitCode::from(2);
                }
                eprintln!("{} Wrote to {}", "✓".green(), output_path.display());
            } else {
                print!("{}", content);
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("{}: {}", "Error".red(), e);
            ExitCode::from(1)
        }
    }
}

fn check_file(file: &Path) -> Result<usize, String> {
    let content = std::fs::read_to_string(file).map_err(|e| e.to_string())?;
    let store = foldconf_core::ini::parse(&content, Some(&file.display().to_string()))
        .map_err(|e| e.to_string())?;
    Ok(store.sections().len())
}

fn cmd_check(files: Vec<PathBuf>) -> ExitCode {
    let mut all_valid = true;

    for file in files {
        match check_file(&file) {
            Ok(sections) => {
                println!(
                    "{} {}: valid INI ({} sections)",
                    "✓".green(),
                    file.display(),
                    sections
                );
            }
            Err(e) => {
                eprintln!("{} {}: {}", "✗".red(), file.display(), e);
                all_valid = false;
            }
        }
    }

    if all_valid {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(1)
    }
}

fn list_sections(store: &Store, with_options: bool) -> Vec<String> {
    let mut lines = Vec::new();
    for section in store.sections() {
        lines.push(format!("[{}]", section));
        if with_options {
            if let Ok(options) = store.options(section) {
                lines.extend(options.into_iter().map(|o| format!("  {}", o)));
            }
        }
    }
    lines
}

fn cmd_sections(files: Vec<PathBuf>, with_options: bool) -> ExitCode {
    let config = match load_config(&files) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("{}", e.red());
            return ExitCode::from(2);
        }
    };

    for line in list_sections(config.store(), with_options) {
        println!("{}", line);
    }
    ExitCode::SUCCESS
}
