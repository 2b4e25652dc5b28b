use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Parser, Subcommand};
use kalaconnect::app::{App, AppError, Args, COMMANDS, CommandOutput};
use kalaconnect::config::{AppConfig, ConfigError};
use kalaconnect::datauri;
use kalaconnect::device::FileDevices;
use kalaconnect::status::Severity;
use serde_json::Value;
use tracing::warn;

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error(transparent)]
    App(#[from] AppError),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("invalid JSON payload: {0}")]
    InvalidJson(#[from] serde_json::Error),
    #[error("invalid argument `{0}`; expected KEY=VALUE")]
    InvalidArg(String),
    #[error("sign-in failed: {0}")]
    SignIn(String),
    #[error("pass --uid with --id-token, or --guest")]
    MissingIdentity,
}

#[derive(Parser, Debug)]
#[command(name = "kalaconnect", about = "KalaConnect artisan tools CLI")]
struct Cli {
    /// Federated user id.
    #[arg(long, env = "KALA_UID")]
    uid: Option<String>,

    /// Bearer token issued by the identity service for `--uid`.
    #[arg(long, env = "KALA_ID_TOKEN")]
    id_token: Option<String>,

    #[arg(long)]
    display_name: Option<String>,

    /// Sign in with a generated guest identity.
    #[arg(long, default_value_t = false, conflicts_with = "uid")]
    guest: bool,

    /// Image file served as the camera.
    #[arg(long)]
    camera: Option<PathBuf>,

    /// Audio file served as the microphone.
    #[arg(long)]
    microphone: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List command ids.
    Commands,
    /// Run a single command.
    Run {
        command: String,
        /// String argument, repeatable.
        #[arg(long = "arg", value_name = "KEY=VALUE")]
        args: Vec<String>,
        /// File argument sent as a data URI, repeatable.
        #[arg(long = "file", value_name = "KEY=PATH")]
        files: Vec<String>,
        /// Extra arguments as a JSON object.
        #[arg(long)]
        json: Option<String>,
    },
    /// Run commands line by line: `<command> [json-object]`.
    Script {
        #[arg(long, default_value = "-", help = "Input file path, or - for stdin")]
        input: String,
    },
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt().with_writer(io::stderr).init();

    let cli = Cli::parse();
    if let Command::Commands = cli.command {
        for (name, _) in COMMANDS {
            println!("{name}");
        }
        return Ok(());
    }

    let config = AppConfig::from_env()?;
    let devices = FileDevices { camera: cli.camera.clone(), microphone: cli.microphone.clone() };
    let app = App::from_config(&config, Arc::new(devices))?;
    sign_in(&app, &cli)?;

    match cli.command {
        Command::Commands => Ok(()),
        Command::Run { command, args, files, json } => {
            let args = build_args(&args, &files, json.as_deref())?;
            let output = app.dispatch(&command, &args).await?;
            print_output(&command, &output)
        }
        Command::Script { input } => run_script(&app, &input).await,
    }
}

fn sign_in(app: &App, cli: &Cli) -> Result<(), CliError> {
    let status = match (&cli.uid, &cli.id_token) {
        (Some(uid), Some(token)) => app.sign_in_federated(uid, cli.display_name.as_deref(), token),
        (None, None) if cli.guest => app.sign_in_guest(),
        (None, None) => return Ok(()),
        _ => return Err(CliError::MissingIdentity),
    };
    if status.severity == Severity::Error {
        return Err(CliError::SignIn(status.text));
    }
    Ok(())
}

async fn run_script(app: &App, input: &str) -> Result<(), CliError> {
    let reader: Box<dyn BufRead> = if input == "-" {
        Box::new(BufReader::new(io::stdin()))
    } else {
        Box::new(BufReader::new(File::open(input)?))
    };
    run_lines(app, reader, &mut io::stdout().lock()).await
}

/// One command per line. A failing line prints an error object and the
/// script carries on with the same session.
async fn run_lines(app: &App, reader: impl BufRead, out: &mut impl Write) -> Result<(), CliError> {
    for line in reader.lines() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let (command, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
        let result = match build_args(&[], &[], Some(rest).filter(|r| !r.trim().is_empty())) {
            Ok(args) => app.dispatch(command, &args).await.map_err(CliError::from),
            Err(e) => Err(e),
        };
        match result {
            Ok(output) => write_output(out, command, &output)?,
            Err(e) => {
                warn!(command, error = %e, "script: command failed");
                let json = serde_json::json!({ "command": command, "error": e.to_string() });
                writeln!(out, "{}", serde_json::to_string_pretty(&json)?)?;
            }
        }
    }
    Ok(())
}

fn build_args(pairs: &[String], files: &[String], json: Option<&str>) -> Result<Args, CliError> {
    let mut args = match json {
        Some(raw) => match serde_json::from_str::<Value>(raw)? {
            Value::Object(map) => map,
            _ => return Err(CliError::InvalidArg(raw.to_owned())),
        },
        None => Args::new(),
    };
    for pair in pairs {
        let (key, value) = split_pair(pair)?;
        args.insert(key.to_owned(), Value::String(value.to_owned()));
    }
    for pair in files {
        let (key, path) = split_pair(pair)?;
        let path = Path::new(path);
        let bytes = std::fs::read(path)?;
        args.insert(key.to_owned(), Value::String(datauri::encode(guess_mime(path), &bytes)));
    }
    Ok(args)
}

fn split_pair(pair: &str) -> Result<(&str, &str), CliError> {
    pair.split_once('=')
        .filter(|(k, _)| !k.is_empty())
        .ok_or_else(|| CliError::InvalidArg(pair.to_owned()))
}

fn guess_mime(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();
    match ext.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "wav" => "audio/wav",
        "webm" => "audio/webm",
        "mp3" => "audio/mpeg",
        _ => "application/octet-stream",
    }
}

fn print_output(command: &str, output: &CommandOutput) -> Result<(), CliError> {
    write_output(&mut io::stdout().lock(), command, output)
}

fn write_output(out: &mut impl Write, command: &str, output: &CommandOutput) -> Result<(), CliError> {
    let mut json = serde_json::to_value(output)?;
    if let Value::Object(map) = &mut json {
        map.insert("command".to_owned(), Value::String(command.to_owned()));
    }
    writeln!(out, "{}", serde_json::to_string_pretty(&json)?)?;
    Ok(())
}

#[cfg(test)]
#[path = "main_test.rs"]
mod tests;
