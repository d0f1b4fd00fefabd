/*
 * npcforge - scheduled fantasy NPC generator and publishing bot.
 *
 * Generates a character sheet with a hosted LLM, renders a portrait,
 * optionally narrates the backstory into a short video, publishes to
 * the configured sinks and archives the result. A weekly calendar
 * schedule and a web control panel both feed the same pipeline, one
 * cycle at a time.
 *
 * The program uses the reqwest crate for the service clients, clap for
 * configuration, axum for the control panel, tokio for asynchronous IO
 * and the log crate for logging.
 *
 * MIT License
*/

use clap::Parser;
use log::{error, info};
use npcforge::args::Args;
use npcforge::pipeline::CycleRunner;
use npcforge::scheduler;
use npcforge::server;
use npcforge::status::StatusHandle;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

#[tokio::main]
async fn main() {
    // Read .env file
    dotenv::dotenv().ok();

    // Initialize logging
    let _ = env_logger::try_init();

    // Parse command line arguments
    let args = Args::parse();

    // Set Rust log level with --loglevel if it is set
    let loglevel = args.loglevel.to_lowercase();
    match loglevel.as_str() {
        "error" => {
            log::set_max_level(log::LevelFilter::Error);
        }
        "warn" => {
            log::set_max_level(log::LevelFilter::Warn);
        }
        "info" => {
            log::set_max_level(log::LevelFilter::Info);
        }
        "debug" => {
            log::set_max_level(log::LevelFilter::Debug);
        }
        "trace" => {
            log::set_max_level(log::LevelFilter::Trace);
        }
        _ => {
            log::set_max_level(log::LevelFilter::Info);
        }
    }

    // Create an atomic bool to track if Ctrl+C is pressed
    let running = Arc::new(AtomicBool::new(true));
    let rctrlc = running.clone();

    // Set up the Ctrl+C handler
    ctrlc::set_handler(move || {
        println!();
        println!("Ctrl+C received, shutting down after the current cycle step...");
        rctrlc.store(false, Ordering::SeqCst);
    })
    .expect("Error setting Ctrl+C handler");

    let entries = match scheduler::parse_schedule(&args.schedule) {
        Ok(entries) => entries,
        Err(e) => {
            error!("Invalid schedule '{}': {}", args.schedule, e);
            std::process::exit(1);
        }
    };
    if entries.is_empty() {
        info!("Schedule is empty, manual triggers only");
    }

    let status = StatusHandle::new();
    let runner = match CycleRunner::new(args.clone(), status, running.clone()) {
        Ok(runner) => Arc::new(runner),
        Err(e) => {
            error!("Failed to build the HTTP client: {}", e);
            std::process::exit(1);
        }
    };

    // Keep the control panel alive on its own task
    let server_runner = runner.clone();
    let server_running = running.clone();
    let bind_address = args.bind_address.clone();
    let server_task = tokio::spawn(async move {
        if let Err(e) = server::serve(server_runner, &bind_address, server_running).await {
            error!("Control panel failed: {}", e);
        }
    });

    scheduler::run(runner, entries, args.tick_secs, running.clone()).await;

    let _ = server_task.await;
    info!("Shutdown complete");
}
