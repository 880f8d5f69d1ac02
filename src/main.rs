use std::io::{self, Write};
use std::process;
use std::sync::Arc;

use argspec::cli::{output, run_invocation, CliError, Invocation};
use argspec::config::Settings;
use argspec::exitcode;
use argspec::infrastructure::traits::RealFileSystem;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::filter::filter_fn;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, Layer};

fn main() {
    let settings = match Settings::load() {
        Ok(settings) => settings,
        Err(e) => {
            output::error(&e);
            process::exit(exitcode::CONFIG);
        }
    };
    let width = settings.output_width;

    // verbosity comes from this parse, so its own tracing output is not captured
    let invocation = match Invocation::parse(std::env::args().skip(1)) {
        Ok(invocation) => invocation,
        Err(e) => exit_with(&e, width),
    };

    setup_logging(invocation.debug);

    // a valid --width also applies to the usage block of a failed command
    let width = invocation.width.filter(|w| *w >= argspec::config::MIN_OUTPUT_WIDTH).unwrap_or(width);
    let mut stdout = io::stdout().lock();
    if let Err(e) = run_invocation(&invocation, settings, Arc::new(RealFileSystem), &mut stdout) {
        exit_with(&e, width);
    }
    stdout.flush().ok();
}

fn exit_with(e: &CliError, width: usize) -> ! {
    output::report(e, width);
    process::exit(e.exit_code());
}

fn setup_logging(verbosity: usize) {
    let filter = match verbosity {
        0 => LevelFilter::WARN,
        1 => LevelFilter::INFO,
        2 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    };

    // our own crate only; dependencies stay quiet
    let module_filter = filter_fn(|metadata| metadata.target().starts_with("argspec"));

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_names(false)
        .with_span_events(FmtSpan::CLOSE);

    let filtered_layer = fmt_layer.with_filter(filter).with_filter(module_filter);

    tracing_subscriber::registry().with(filtered_layer).init();

    match filter {
        LevelFilter::INFO => tracing::info!("Debug mode: info"),
        LevelFilter::DEBUG => tracing::debug!("Debug mode: debug"),
        LevelFilter::TRACE => tracing::debug!("Debug mode: trace"),
        _ => {}
    }
}
