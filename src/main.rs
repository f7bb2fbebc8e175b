use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::io::{self, SeekFrom, Write};
use std::path::{Path, PathBuf};
use tracing::{error, info};

use streamio::logging::init_logging;
use streamio::{Direction, ProcessExit, ProcessStream, ShellCommand, Stream, StreamConfig};

/// Buffered file and subprocess streams
#[derive(Parser)]
#[command(name = "streamio")]
#[command(about = "Copy files and drive shell commands through buffered streams", long_about = None)]
struct Cli {
    /// Enable verbose output (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Path to a TOML configuration file
    #[arg(short = 'c', long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Copy a file through a read stream and a write stream
    Copy {
        src: PathBuf,
        dst: PathBuf,
        /// Append to the destination instead of truncating it
        #[arg(long)]
        append: bool,
    },
    /// Run a shell command and echo its standard output
    Run {
        /// Command line; several words are quoted and joined
        #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
        command: Vec<String>,
    },
    /// Feed a file to a shell command's standard input
    Feed {
        input: PathBuf,
        /// Command line; several words are quoted and joined
        #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
        command: Vec<String>,
    },
    /// Print the size of a file by seeking to its end
    Tell { path: PathBuf },
}

fn main() {
    let cli = Cli::parse();

    let config = match StreamConfig::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e.user_message());
            std::process::exit(2);
        }
    };
    init_logging(cli.verbose, &config.log_level);

    match execute(cli.command, &config) {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            error!("Fatal error: {:#}", e);
            eprintln!("Error: {e:#}");
            std::process::exit(1);
        }
    }
}

fn execute(command: Commands, config: &StreamConfig) -> Result<i32> {
    match command {
        Commands::Copy { src, dst, append } => copy_file(&src, &dst, append, config),
        Commands::Run { command } => run_command(&command_line(&command), config),
        Commands::Feed { input, command } => feed_command(&input, &command_line(&command), config),
        Commands::Tell { path } => tell_size(&path, config),
    }
}

/// A single word is taken as a complete shell command line.
fn command_line(words: &[String]) -> String {
    match words {
        [line] => line.clone(),
        _ => shell_words::join(words),
    }
}

/// Process exit code for a child: its own code, or 128 + signal.
fn exit_code(exit: ProcessExit) -> i32 {
    exit.code().unwrap_or_else(|| 128 + exit.signal_number().unwrap_or(0))
}

fn copy_file(src: &Path, dst: &Path, append: bool, config: &StreamConfig) -> Result<i32> {
    let mut input = Stream::open_with(src, "r", config)
        .with_context(|| format!("Failed to open {}", src.display()))?;
    let mode = if append { "a" } else { "w" };
    let mut output = Stream::open_with(dst, mode, config)
        .with_context(|| format!("Failed to open {}", dst.display()))?;

    let mut chunk = vec![0u8; config.buffer_capacity];
    let mut total = 0u64;
    loop {
        let chunk_len = chunk.len();
        let n = input.read_elements(&mut chunk, 1, chunk_len);
        if n > 0 && output.write_elements(&chunk[..n], 1, n) != n {
            bail!("Write to {} failed", dst.display());
        }
        total += n as u64;
        if n < chunk.len() {
            break;
        }
    }
    if input.has_error() {
        bail!("Read from {} failed", src.display());
    }

    input.close()?;
    output
        .close()
        .with_context(|| format!("Failed to close {}", dst.display()))?;
    info!("Copied {} bytes from {} to {}", total, src.display(), dst.display());
    Ok(0)
}

fn run_command(line: &str, config: &StreamConfig) -> Result<i32> {
    let mut child = ProcessStream::spawn_with(ShellCommand::new(line), Direction::Read, config)?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    io::copy(&mut child, &mut out).context("Failed to relay command output")?;
    out.flush()?;

    let exit = child.close()?;
    info!("'{}' {}", line, exit);
    Ok(exit_code(exit))
}

fn feed_command(input: &Path, line: &str, config: &StreamConfig) -> Result<i32> {
    let mut source = Stream::open_with(input, "r", config)
        .with_context(|| format!("Failed to open {}", input.display()))?;
    let mut child = ProcessStream::spawn_with(ShellCommand::new(line), Direction::Write, config)?;

    let copied = io::copy(&mut source, &mut child);
    source.close()?;
    let exit = child.close()?;
    let copied = copied.context("Failed to feed command input")?;

    info!("Fed {} bytes to '{}', {}", copied, line, exit);
    Ok(exit_code(exit))
}

fn tell_size(path: &Path, config: &StreamConfig) -> Result<i32> {
    let mut stream = Stream::open_with(path, "r", config)
        .with_context(|| format!("Failed to open {}", path.display()))?;
    stream.seek(SeekFrom::End(0))?;
    let size = stream.tell()?;
    stream.close()?;

    println!("{}", size);
    Ok(0)
}
