// Command handlers for the terminal front end

use std::process::ExitCode;
use std::sync::Arc;

use serde_json::json;

use crate::cli::Commands;
use crate::downloader::{
    check_backend_health, BackendHealth, DownloadResult, Downloader, HealthPoller, Platform,
    TwoStepResult,
};
use crate::interactive;
use crate::render::{render_health, render_result, render_two_step};

fn exit_for(success: bool) -> ExitCode {
    if success {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

fn print_result(result: &DownloadResult, json: bool) {
    if json {
        match serde_json::to_string_pretty(result) {
            Ok(text) => println!("{}", text),
            Err(e) => log::error!("[Commands] Failed to serialize result: {}", e),
        }
    } else {
        print!("{}", render_result(result));
    }
}

fn print_two_step(result: &TwoStepResult, json: bool) {
    if json {
        let value = json!({
            "infoResult": result.info.as_ref(),
            "downloadResult": result.download.as_deref(),
        });
        println!("{:#}", value);
    } else {
        print!("{}", render_two_step(result));
    }
}

pub async fn dispatch(command: Commands, downloader: Arc<Downloader>, json: bool) -> ExitCode {
    match command {
        Commands::Download { url } => {
            let result = downloader.download(&url).await;
            print_result(&result, json);
            exit_for(result.success)
        }
        Commands::Info { url, resolve } => info(&downloader, &url, resolve, json).await,
        Commands::InstagramVideo { url } => {
            let result = downloader.instagram_video_url(&url).await;
            print_result(&result, json);
            exit_for(result.success)
        }
        Commands::Detect { url } => detect(&url, json),
        Commands::Health { watch } => health(&downloader, watch, json).await,
        Commands::Stats => match downloader.api_stats().await {
            Some(stats) => {
                println!("{:#}", stats);
                ExitCode::SUCCESS
            }
            None => {
                eprintln!("API stats unavailable");
                ExitCode::FAILURE
            }
        },
        Commands::Interactive => interactive::run(downloader).await,
    }
}

async fn info(downloader: &Downloader, url: &str, resolve: bool, json: bool) -> ExitCode {
    let mut result = downloader.download_two_step(url).await;

    if resolve && result.needs_resolution() {
        if !json {
            print!("{}", render_two_step(&result));
        }
        result = downloader.complete_two_step(url, result).await;
        if !json {
            if let Some(download) = result.download.as_deref() {
                print!("{}", render_result(download));
            }
        }
    } else if !json {
        print!("{}", render_two_step(&result));
    }

    if json {
        print_two_step(&result, json);
    }

    let success = match result.download.as_deref() {
        Some(download) => download.success,
        None => result.info.success,
    };
    exit_for(success)
}

fn detect(url: &str, json: bool) -> ExitCode {
    let strict = Platform::from_url(url);
    let routed = Platform::detect(url);

    if json {
        println!(
            "{:#}",
            json!({ "platform": routed, "recognized": strict.is_some() })
        );
    } else {
        match strict {
            Some(platform) => println!("{}", platform.display_name()),
            None => println!(
                "{} (no platform marker found, routed to the {} backend)",
                routed.display_name(),
                routed.display_name()
            ),
        }
    }
    ExitCode::SUCCESS
}

async fn health(downloader: &Downloader, watch: bool, json: bool) -> ExitCode {
    let show = |health: BackendHealth| {
        if json {
            println!("{}", json!({ "backend": health }));
        } else {
            println!("{}", render_health(health));
        }
    };

    if !watch {
        let online = check_backend_health(downloader.client()).await;
        show(if online {
            BackendHealth::Online
        } else {
            BackendHealth::Offline
        });
        return exit_for(online);
    }

    let poller = HealthPoller::spawn(downloader.client().clone());
    let mut rx = poller.subscribe();
    show(poller.status());

    loop {
        tokio::select! {
            changed = rx.changed() => {
                if changed.is_err() {
                    break;
                }
                let health = *rx.borrow_and_update();
                show(health);
            }
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    poller.stop();
    ExitCode::SUCCESS
}
