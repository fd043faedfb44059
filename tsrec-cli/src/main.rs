use std::process;
use std::sync::Arc;

use clap::Parser;
use platforms_parser::Showroom;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};
use tsrec::cli::Args;
use tsrec::error::AppError;
use tsrec::logging::init_logging;
use tsrec::resolver::ShowroomResolver;
use tsrec::signal::shutdown_signal;
use tsrec_engine::{CaptureOrchestrator, ReqwestFetcher};

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[tokio::main]
async fn main() {
    let args = Args::parse();

    let guard = match init_logging(args.verbose, args.quiet, args.log_dir.as_deref()) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Error: {e}");
            process::exit(1);
        }
    };

    let code = match run(args).await {
        Ok(()) => 0,
        Err(e) => {
            error!("Application error: {e}");
            eprintln!("Error: {e}");
            1
        }
    };

    drop(guard);
    process::exit(code);
}

async fn run(args: Args) -> Result<(), AppError> {
    let config = args.capture_config()?;
    let client = config.http.build_client()?;

    let http = Arc::new(ReqwestFetcher::new(client.clone()));
    let resolver = Arc::new(ShowroomResolver::new(Showroom::new(client)));
    let orchestrator = CaptureOrchestrator::new(config, http, resolver, &args.destination);

    let token = CancellationToken::new();
    tokio::spawn(shutdown_signal(token.clone()));

    info!(source = %args.source_url, dest = %args.destination.display(), "starting capture");
    match orchestrator.run(&args.source_url, token).await? {
        Some(report) => info!(
            output = %report.output_path.display(),
            segments = report.merge.merged,
            skipped = report.merge.skipped,
            bytes = report.merge.bytes_written,
            "capture saved"
        ),
        None => info!("stopped before the stream went live, nothing recorded"),
    }
    Ok(())
}
