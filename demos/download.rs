//! Download example
//!
//! Usage: `cargo run --example download -- <url> [output-dir]`
//!
//! Checks whether the URL is a playlist, lists the available resolutions, then
//! downloads it while printing progress. Ctrl+C cancels the download.

use futures::StreamExt;
use pullbox_dl::{Config, DownloadRequest, Downloader, Event, run_with_shutdown};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing for logging (optional)
    // Uncomment if you add tracing-subscriber to your dependencies:
    // tracing_subscriber::fmt::init();

    let mut args = std::env::args().skip(1);
    let url = args
        .next()
        .ok_or("usage: download <url> [output-dir]")?;
    let output_dir = args.next().unwrap_or_else(|| "downloads".to_string());

    let downloader = Downloader::new(Config::default())?;

    let playlist = downloader.check_playlist(&url).await?;
    if playlist.is_playlist {
        println!(
            "Playlist: {} ({} items)",
            playlist.playlist_title.as_deref().unwrap_or("untitled"),
            playlist.playlist_count.unwrap_or(0)
        );
    } else {
        let info = downloader.fetch_formats(&url).await?;
        println!("{} ({:.0}s)", info.title, info.duration);
        println!("Resolutions: {:?}", info.resolutions);
    }

    // Print progress from an event stream
    let mut events = downloader.event_stream();
    tokio::spawn(async move {
        while let Some(Ok(event)) = events.next().await {
            match event {
                Event::Started { url } => println!("Downloading {url}"),
                Event::Progress { snapshot, complete } => {
                    let item = match (snapshot.playlist_index, snapshot.playlist_total) {
                        (Some(index), Some(total)) => format!("[{index}/{total}] "),
                        _ => String::new(),
                    };
                    println!(
                        "{item}{:5.1}% {:>10} ETA {:>8} {}{}",
                        snapshot.percentage,
                        snapshot.speed,
                        snapshot.eta,
                        snapshot.filename,
                        if complete { " (done)" } else { "" }
                    );
                }
                Event::ErrorOutput { message } => eprint!("{message}"),
                Event::Finished { .. } => println!("Finished"),
                Event::Failed { message, .. } => eprintln!("Failed: {message}"),
                Event::Cancelled => println!("Cancelled"),
            }
        }
    });

    let request = DownloadRequest::builder(url.as_str())
        .output_directory(output_dir)
        .include_metadata(true)
        .download_entire_playlist(playlist.is_playlist)
        .build()?;

    let mut job = {
        let downloader = downloader.clone();
        tokio::spawn(async move { downloader.start_download(request).await })
    };

    tokio::select! {
        result = &mut job => {
            if let Err(e) = result? {
                eprintln!("{}", e.user_message());
            }
        }
        _ = run_with_shutdown(downloader.clone()) => {
            println!("Stopping...");
            job.await?.ok();
        }
    }

    Ok(())
}
