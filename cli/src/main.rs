use clap::Parser;
use tasktrack_cli::commands::{add, cli, edit, index, list};
use tasktrack_core::api::{AppConfig, CliError, ConfigError, IndexingError, LoggingConfig};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

static LOG_GUARD: std::sync::OnceLock<tracing_appender::non_blocking::WorkerGuard> =
    std::sync::OnceLock::new();

#[tokio::main]
async fn main() {
    let exit = match real_main().await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{e}");
            exit_code_for_error(&e)
        }
    };

    std::process::exit(exit);
}

async fn real_main() -> Result<i32, CliError> {
    let args = cli::Args::parse();
    let mut cfg = tasktrack_core::config::load_default()?;
    if let Some(size) = args.window_size {
        if size == 0 {
            return Err(ConfigError::InvalidValue {
                key: "--window-size",
                value: size.to_string(),
            }
            .into());
        }
        cfg.indexing.window_size = size;
    }
    init_tracing(&cfg.logging).map_err(CliError::Command)?;

    dispatch(args, &cfg).await
}

async fn dispatch(args: cli::Args, cfg: &AppConfig) -> Result<i32, CliError> {
    let root = args.root.as_path();
    match args.command {
        cli::Commands::Index(a) => index::handle_index(a, cfg, root, args.format).await,
        cli::Commands::Watch(a) => index::handle_watch(a, cfg, root, args.format).await,
        cli::Commands::List(a) => list::handle_list(a, cfg, root, args.format).await,
        cli::Commands::Edit(a) => edit::handle_edit(a, cfg, root, args.format).await,
        cli::Commands::Add(a) => add::handle_add(a, cfg, root, args.format).await,
    }
}

fn exit_code_for_error(e: &CliError) -> i32 {
    // 0: success
    // 1: some documents failed to index (returned as a normal exit code)
    // 11: config error
    // 20: document store / IO error
    // 30: worker unavailable
    // 40: edit rejected
    // 50: internal/uncategorized
    match e {
        CliError::Config(_) => 11,
        CliError::Store(_) | CliError::Io(_) => 20,
        CliError::Indexing(ie) => match ie {
            IndexingError::WorkerUnavailable(_) => 30,
            IndexingError::Read { .. } | IndexingError::Store(_) => 20,
            IndexingError::Dispatch { .. } | IndexingError::Rejected(_) => 30,
        },
        CliError::Worker(_) => 30,
        CliError::Rewrite(_) | CliError::Command(_) => 40,
        CliError::Anyhow(_) => 50,
    }
}

fn init_tracing(logging: &LoggingConfig) -> Result<(), String> {
    if !logging.enabled {
        return Ok(());
    }

    let filter = match std::env::var("RUST_LOG") {
        Ok(v) if !v.trim().is_empty() => EnvFilter::from_default_env(),
        _ => EnvFilter::try_new(logging.level.clone()).map_err(|e| e.to_string())?,
    };

    let mut maybe_writer = None;

    if logging.file {
        let dir = match logging
            .directory
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
        {
            Some(d) => std::path::PathBuf::from(d),
            None => std::env::temp_dir().join("tasktrack"),
        };

        std::fs::create_dir_all(&dir).map_err(|e| format!("create log dir failed: {e}"))?;
        let file_name = format!("tasktrack.{}.log", std::process::id());
        let appender = tracing_appender::rolling::never(dir, file_name);
        let (non_blocking, guard) = tracing_appender::non_blocking(appender);
        let _ = LOG_GUARD.set(guard);
        maybe_writer = Some(non_blocking);
    }

    if !logging.console && maybe_writer.is_none() {
        return Err("logging disabled for both console and file".to_string());
    }

    let console_layer = logging.console.then(|| {
        tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_ansi(atty::is(atty::Stream::Stderr))
    });

    let file_layer = maybe_writer.map(|w| {
        tracing_subscriber::fmt::layer()
            .with_writer(w)
            .with_ansi(false)
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(console_layer)
        .with(file_layer)
        .init();

    Ok(())
}
