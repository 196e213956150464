// Interactive mode: one URL per line, results printed as they arrive
//
// Health updates, stdin and finished requests are multiplexed on a single
// task that owns the session. Requests run on spawned tasks and report back
// through a channel with the ticket they were started with.

use std::process::ExitCode;
use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

use crate::downloader::{BackendHealth, Downloader, HealthPoller, Platform, TwoStepResult};
use crate::render::{render_health, render_result};
use crate::session::{DownloadSession, RequestTicket};

type Finished = (RequestTicket, TwoStepResult);

const HELP: &str = "Paste a URL to download it. Commands: :platform <name>, :status, :help, :quit";

pub async fn run(downloader: Arc<Downloader>) -> ExitCode {
    let poller = HealthPoller::spawn(downloader.client().clone());
    let mut health_rx = poller.subscribe();

    let mut session = DownloadSession::new();
    session.set_backend_health(poller.status());

    let (done_tx, mut done_rx) = mpsc::channel::<Finished>(8);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    println!("{}", HELP);
    println!("{}", render_health(session.backend_health()));

    loop {
        tokio::select! {
            changed = health_rx.changed() => {
                if changed.is_err() {
                    break;
                }
                let health = *health_rx.borrow_and_update();
                session.set_backend_health(health);
                println!("{}", render_health(health));
            }

            line = lines.next_line() => {
                let line = match line {
                    Ok(Some(line)) => line,
                    Ok(None) => break,
                    Err(e) => {
                        log::error!("[Interactive] Failed to read stdin: {}", e);
                        break;
                    }
                };
                if !handle_line(line.trim(), &mut session, &downloader, &done_tx) {
                    break;
                }
            }

            Some((ticket, result)) = done_rx.recv() => {
                on_finished(ticket, result, &mut session, &downloader, &done_tx);
            }
        }
    }

    poller.stop();
    ExitCode::SUCCESS
}

/// Returns false when the user asked to leave.
fn handle_line(
    line: &str,
    session: &mut DownloadSession,
    downloader: &Arc<Downloader>,
    done_tx: &mpsc::Sender<Finished>,
) -> bool {
    match line {
        "" => {}
        ":q" | ":quit" | ":exit" => return false,
        ":help" => println!("{}", HELP),
        ":status" => {
            println!("{}", render_health(session.backend_health()));
            if session.is_downloading() {
                println!("Downloading {}", session.url());
            }
        }
        _ if line.starts_with(":platform") => {
            let name = line.trim_start_matches(":platform").trim();
            match name.parse::<Platform>() {
                Ok(platform) => {
                    session.select_platform(platform);
                    println!("{} URL, e.g. {}", platform.display_name(), platform.placeholder());
                }
                Err(e) => println!("{}", e),
            }
        }
        _ if line.starts_with(':') => println!("Unknown command. {}", HELP),
        url => submit(url, session, downloader, done_tx),
    }
    true
}

fn submit(
    url: &str,
    session: &mut DownloadSession,
    downloader: &Arc<Downloader>,
    done_tx: &mpsc::Sender<Finished>,
) {
    if session.backend_health() != BackendHealth::Online {
        println!(
            "Backend is not reachable ({}), try again later",
            session.backend_health()
        );
        return;
    }

    session.set_url(url);
    if Platform::from_url(url).is_none() {
        println!("No platform recognised, trying {}", session.detected_platform().display_name());
    }

    let Some(ticket) = session.begin() else {
        return;
    };
    println!("Downloading...");

    let downloader = Arc::clone(downloader);
    let done_tx = done_tx.clone();
    tokio::spawn(async move {
        let result = downloader.download_two_step(ticket.url()).await;
        let _ = done_tx.send((ticket, result)).await;
    });
}

fn on_finished(
    ticket: RequestTicket,
    result: TwoStepResult,
    session: &mut DownloadSession,
    downloader: &Arc<Downloader>,
    done_tx: &mpsc::Sender<Finished>,
) {
    if !session.complete_two_step(&ticket, result) {
        return;
    }

    if let Some(visible) = session.last_result() {
        print!("{}", render_result(visible));
    }

    let Some(pending) = session.take_pending() else {
        return;
    };
    println!("… Info found, now resolving download link");

    let downloader = Arc::clone(downloader);
    let done_tx = done_tx.clone();
    tokio::spawn(async move {
        let url = ticket.url().to_string();
        let result = downloader.complete_two_step(&url, pending).await;
        let _ = done_tx.send((ticket, result)).await;
    });
}
