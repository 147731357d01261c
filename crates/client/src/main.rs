//! shaper-client CLI entry point.

use clap::Parser;
use shaper_client::cli::{Cli, Commands, OutputFormat};
use shaper_client::output::html::{self, EmbedOptions};
use shaper_client::output::{format_output, format_state};
use shaper_client::{HttpTransport, Poller};
use shaper_core::frame::present;
use shaper_core::generation::{ClientState, GenerationRequest};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "shaper_client=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = cli.config();
    tracing::debug!(endpoint = %config.endpoint_url(), "Using generation endpoint");

    match cli.command {
        Commands::Generate(command) => {
            let request = config.prepare(command.params.to_request()?);
            let poller = poller(&config);

            let state = if command.watch {
                watch(&poller, request, cli.format).await
            } else {
                if !cli.quiet {
                    eprintln!("Generating \"{}\"...", request.prompt);
                }
                poller.submit(request);
                poller.settled().await
            };

            if !command.watch {
                println!("{}", format_state(&state, cli.format));
            }
            if let Some(error) = state.error {
                return Err(error.into());
            }
        }
        Commands::Render(command) => {
            let request = config.prepare(command.params.to_request()?);
            let poller = poller(&config);
            poller.submit(request);
            let state = poller.settled().await;

            let options = EmbedOptions {
                class_name: command.class_name,
                auto_resize: command.auto_resize.into(),
                await_init: command.await_init,
            };
            let markup = html::render(&present(&state), &options)?;
            match cli.format {
                OutputFormat::Json => println!(
                    "{}",
                    format_output(&serde_json::json!({ "state": state, "html": markup }), cli.format)
                ),
                OutputFormat::Pretty => println!("{}", markup),
            }
        }
    }

    Ok(())
}

fn poller(config: &shaper_client::ClientConfig) -> Poller<HttpTransport> {
    Poller::builder(HttpTransport::new(config))
        .interval(config.polling_interval())
        .build()
}

/// Print every published state until the request settles.
async fn watch(
    poller: &Poller<HttpTransport>,
    request: GenerationRequest,
    format: OutputFormat,
) -> ClientState {
    poller.submit(request);
    let mut rx = poller.subscribe();

    loop {
        let state = rx.borrow_and_update().clone();
        println!("{}", format_state(&state, format));
        if state.is_settled() || rx.changed().await.is_err() {
            return state;
        }
    }
}
