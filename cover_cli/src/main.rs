mod cli;
mod error_fmt;
mod run;

use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use clap::Parser;
use cover_core::{Cover, TravelCfg};
use eyre::WrapErr;

use crate::cli::{Cli, FILE_GUARD, JSON_MODE};

fn main() {
    let args = Cli::parse();
    let _ = JSON_MODE.set(args.json);
    let _ = color_eyre::install();

    if let Err(e) = real_main(&args) {
        if args.json {
            eprintln!("{}", error_fmt::format_error_json(&e));
        } else {
            eprintln!("Error: {}", error_fmt::humanize(&e));
        }
        std::process::exit(error_fmt::exit_code_for_error(&e));
    }
}

fn real_main(args: &Cli) -> eyre::Result<()> {
    let cfg = cover_config::load_file(&args.config)?;
    cfg.validate()?;
    init_tracing(args, &cfg.logging);

    let cover_cfg = cfg.select_cover(args.cover.as_deref())?;
    let switch = run::make_switch(cover_cfg)?;
    let engine = Cover::builder()
        .with_switch(switch)
        .with_travel(TravelCfg {
            travel_time_s: cover_cfg.travel_time_s,
            initial_position: cover_cfg.initial_position,
        })
        .with_sink(run::StdoutSink::new(&cover_cfg.name, args.json))
        .build()?;
    let cover = Cover::new(engine);

    let shutdown = Arc::new(AtomicBool::new(false));
    {
        let flag = shutdown.clone();
        ctrlc::set_handler(move || flag.store(true, Ordering::SeqCst))
            .wrap_err("install signal handler")?;
    }

    run::execute(&cover, &cover_cfg.name, &args.cmd, &shutdown, args.json)
}

/// Console logging to stderr; optional JSON-lines file from the config.
fn init_tracing(args: &Cli, logging: &cover_config::Logging) {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;
    use tracing_subscriber::{EnvFilter, fmt};

    let level = logging.level.as_deref().unwrap_or(&args.log_level);
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let console = fmt::layer().with_writer(std::io::stderr).with_target(false);
    let registry = tracing_subscriber::registry().with(filter).with(console);

    if let Some(path) = logging.file.as_deref() {
        let path = Path::new(path);
        let dir = path.parent().filter(|p| !p.as_os_str().is_empty());
        let file = path.file_name().unwrap_or_else(|| "cover.log".as_ref());
        let appender =
            tracing_appender::rolling::never(dir.unwrap_or_else(|| Path::new(".")), file);
        let (writer, guard) = tracing_appender::non_blocking(appender);
        let _ = FILE_GUARD.set(guard);
        registry.with(fmt::layer().json().with_writer(writer)).init();
    } else {
        registry.init();
    }
}
