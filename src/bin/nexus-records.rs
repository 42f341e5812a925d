use clap::{Parser, Subcommand};
use nexus_records::cli::{self, Command, OutputMode, RecordOp, ScriptSource};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(name = "nexus-records", version, about = "Compile and run relational-style record requests")]
struct Cli {
    /// Configuration file (TOML)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Output format
    #[arg(long, global = true, value_enum, default_value_t = OutputMode::Json)]
    format: OutputMode,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the native filter/projection/sort for one request
    Compile {
        /// findMany | findUnique | create | update | delete | count
        op: String,
        /// Request arguments as JSON
        #[arg(long, default_value = "{}")]
        args: String,
    },
    /// Run NDJSON request lines against an in-memory store
    Exec {
        /// Script file, or - for stdin
        #[arg(long, default_value = "-")]
        script: String,
    },
}

fn main() -> ExitCode {
    let args = Cli::parse();
    let svc = match nexus_records::init(args.config.as_deref()) {
        Ok(svc) => svc,
        Err(e) => {
            eprintln!("Error: {e}");
            return ExitCode::from(2);
        }
    };
    let cmd = match args.command {
        Commands::Compile { op, args } => match RecordOp::parse(&op) {
            Ok(op) => Command::Compile { op, args_json: args },
            Err(e) => {
                eprintln!("Error: {e}");
                return ExitCode::from(2);
            }
        },
        Commands::Exec { script } => Command::Exec { script: ScriptSource::from_arg(&script) },
    };
    let mut stdout = std::io::stdout().lock();
    match cli::run(&svc, cmd, args.format, &mut stdout) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
