// This file is part of the product NoPressure.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use log::info;
use richtext::config::{Config, ValidatedConfig};
use richtext::sanitize::{DomSanitizer, HtmlSanitizer};
use richtext::templates::MiniJinjaEngine;
use richtext::util;
use richtext::view::{RichTextView, ViewEvent, ViewOptions};
use std::io::Read;
use std::path::PathBuf;

fn main() {
    let exit_code = run();
    std::process::exit(exit_code);
}

fn run() -> i32 {
    let parsed_args = match parse_args() {
        Ok(args) => args,
        Err(error) => {
            eprintln!("❌ Invalid command line arguments: {}", error);
            eprintln!("❌ Use `richtext help` to list the commands.");
            return 1;
        }
    };

    let command = match parsed_args.action {
        Action::Help => {
            print!("{}", help_text());
            return 0;
        }
        Action::Run(command) => command,
    };

    let config = match Config::load_and_validate(&parsed_args.runtime_root) {
        Ok(config) => config,
        Err(error) => {
            eprintln!("❌ {}", error);
            return 1;
        }
    };

    if let Err(error) = util::init_logger(
        util::default_level_rules(),
        util::build_logger(config.log_level),
    ) {
        eprintln!("❌ Failed to initialize logger: {}", error);
        return 1;
    }
    log_startup_info(&config, &parsed_args.runtime_root);

    match execute(&command, &config) {
        Ok(output) => {
            print!("{}", output);
            0
        }
        Err(error) => {
            eprintln!("❌ {}", error);
            1
        }
    }
}

fn log_startup_info(config: &ValidatedConfig, runtime_root: &std::path::Path) {
    if config.loaded_from_file {
        info!("Configuration loaded from {}", runtime_root.display());
    } else {
        info!(
            "No config.yaml in {}; using built-in defaults",
            runtime_root.display()
        );
    }
    info!("Asset origin: {}", config.asset_resolver().base_origin());
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum InputSource {
    Stdin,
    File(PathBuf),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Action {
    Help,
    Run(Command),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Command {
    Sanitize(InputSource),
    Images(InputSource),
    Render {
        input: InputSource,
        open: Option<usize>,
    },
}

#[derive(Debug)]
struct ParsedArgs {
    runtime_root: PathBuf,
    action: Action,
}

fn execute(command: &Command, config: &ValidatedConfig) -> Result<String, String> {
    let sanitizer = DomSanitizer::new(config.asset_resolver())
        .with_default_image_label(&config.rendering.default_image_label);

    match command {
        Command::Sanitize(input) => {
            let raw = read_input(input)?;
            let mut html = sanitizer.sanitize(&raw);
            html.push('\n');
            Ok(html)
        }
        Command::Images(input) => {
            let raw = read_input(input)?;
            let fragment = sanitizer.sanitize_fragment(&raw);
            let mut json = serde_json::to_string_pretty(&fragment.images)
                .map_err(|error| format!("Failed to encode image list: {}", error))?;
            json.push('\n');
            Ok(json)
        }
        Command::Render { input, open } => {
            let raw = read_input(input)?;
            let options = ViewOptions {
                default_image_label: config.rendering.default_image_label.clone(),
                lightbox_max_height: config.rendering.lightbox_max_height.clone(),
            };
            let mut view = RichTextView::new(sanitizer, options);
            view.set_html(&raw);

            if let Some(index) = open {
                let images = view.image_nodes();
                let target = images.get(*index).ok_or_else(|| {
                    format!(
                        "No image at index {}; the content has {} image(s)",
                        index,
                        images.len()
                    )
                })?;
                if !view.dispatch(ViewEvent::Click(target)) {
                    return Err(format!("Image {} has no usable source", index));
                }
            }

            let engine = MiniJinjaEngine::from_config(config).map_err(|error| error.to_string())?;
            let mut html = view
                .render(&engine)
                .map_err(|error| format!("Failed to render view: {}", error))?;
            html.push('\n');
            Ok(html)
        }
    }
}

fn read_input(source: &InputSource) -> Result<String, String> {
    match source {
        InputSource::Stdin => {
            let mut buffer = String::new();
            std::io::stdin()
                .read_to_string(&mut buffer)
                .map_err(|error| format!("Failed to read standard input: {}", error))?;
            Ok(buffer)
        }
        InputSource::File(path) => std::fs::read_to_string(path)
            .map_err(|error| format!("Failed to read '{}': {}", path.display(), error)),
    }
}

fn help_text() -> String {
    [
        "Usage:",
        "  richtext [options] sanitize <file|->",
        "  richtext [options] images <file|->",
        "  richtext [options] render <file|-> [--open <index>]",
        "  richtext help",
        "",
        "Options:",
        "  -C <root>   Directory holding config.yaml (default: .).",
        "  -h, --help  Show this help.",
        "",
        "Commands:",
        "  sanitize    Print the sanitized HTML.",
        "  images      Print the images found in the sanitized HTML as JSON.",
        "  render      Print the rendered content region; --open clicks the",
        "              image at <index> (0-based) and includes the lightbox.",
        "",
    ]
    .join("\n")
}

fn parse_args() -> Result<ParsedArgs, String> {
    parse_args_from(std::env::args().skip(1))
}

fn parse_args_from<I>(args: I) -> Result<ParsedArgs, String>
where
    I: IntoIterator<Item = String>,
{
    let args: Vec<String> = args.into_iter().collect();
    if args.iter().any(|arg| is_help_flag(arg)) {
        return Ok(ParsedArgs {
            runtime_root: PathBuf::from("."),
            action: Action::Help,
        });
    }

    let mut args = args.into_iter();
    let mut runtime_root = PathBuf::from(".");
    let mut tokens = Vec::new();
    let mut open = None;

    while let Some(arg) = args.next() {
        if arg == "--" {
            continue;
        } else if arg == "-C" {
            let value = args
                .next()
                .ok_or_else(|| "Missing value for -C".to_string())?;
            runtime_root = PathBuf::from(value);
        } else if arg == "--open" {
            let value = args
                .next()
                .ok_or_else(|| "Missing value for --open".to_string())?;
            let index = value
                .parse::<usize>()
                .map_err(|_| format!("Invalid image index for --open: {}", value))?;
            open = Some(index);
        } else {
            tokens.push(arg);
        }
    }

    let mut tokens = tokens.into_iter();
    let action = match tokens.next() {
        None => return Err("Missing command".to_string()),
        Some(name) if name.eq_ignore_ascii_case("help") => Action::Help,
        Some(name) => {
            let input = match tokens.next() {
                Some(value) => parse_input(value),
                None => return Err(format!("Missing input for '{}'", name)),
            };
            let command = match name.as_str() {
                "sanitize" => Command::Sanitize(input),
                "images" => Command::Images(input),
                "render" => Command::Render { input, open },
                other => return Err(format!("Unknown command '{}'", other)),
            };
            Action::Run(command)
        }
    };

    if let Some(extra) = tokens.next() {
        return Err(format!("Unexpected argument '{}'", extra));
    }
    if open.is_some() && !matches!(action, Action::Run(Command::Render { .. })) {
        return Err("--open can only be used with render".to_string());
    }

    Ok(ParsedArgs {
        runtime_root: make_runtime_root_absolute(runtime_root)?,
        action,
    })
}

fn parse_input(value: String) -> InputSource {
    if value == "-" {
        InputSource::Stdin
    } else {
        InputSource::File(PathBuf::from(value))
    }
}

fn is_help_flag(arg: &str) -> bool {
    arg == "-h" || arg == "--help"
}

fn make_runtime_root_absolute(runtime_root: PathBuf) -> Result<PathBuf, String> {
    if runtime_root.is_absolute() {
        return Ok(runtime_root);
    }

    let current_dir = std::env::current_dir()
        .map_err(|error| format!("Failed to resolve current directory: {}", error))?;
    Ok(current_dir.join(runtime_root))
}
