use std::num::NonZeroU32;

use clap::Parser;
use color_eyre::eyre::Result;

use postboard::{
    app::{App, Ports},
    infrastructure::{cli::Cli, config::Config, http::HttpClient},
    presentation::notification::Notifier,
    utils::{initialize_logging, initialize_panic_handler},
};

async fn tokio_main() -> Result<()> {
    initialize_logging()?;

    initialize_panic_handler()?;

    let args = <Cli as Parser>::parse();

    let config = Config::new()?;
    let page_size = args
        .page_size
        .and_then(NonZeroU32::new)
        .unwrap_or_else(|| config.page_size());

    let (notifier, mut notifications) = Notifier::new(config.notification_duration());
    let printer = tokio::spawn(async move {
        while let Some(notification) = notifications.recv().await {
            eprintln!("[{}] {}", notification.kind, notification.message);
        }
    });

    let app = App::new(
        Ports::from_client(HttpClient::from_config(&config)?),
        notifier,
        page_size,
    );
    let output = app.run(args.command).await;

    // Closing the channel lets the printer drain and finish
    drop(app);
    printer.await?;

    print!("{}", output?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    if let Err(e) = tokio_main().await {
        eprintln!("{} error: Something went wrong", env!("CARGO_PKG_NAME"));
        Err(e)
    } else {
        Ok(())
    }
}
