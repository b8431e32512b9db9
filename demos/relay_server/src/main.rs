use std::path::PathBuf;

use argh::FromArgs;
use simlabel::{
    io::{FileFormat, FileSaver},
    relay::{LabelStore, RelayConfig, RelayServer},
};

/// Receives label sessions from the simulation client and saves them
#[derive(FromArgs)]
struct Args {
    /// host to listen on
    #[argh(option, default = "String::from(\"127.0.0.1\")")]
    host: String,

    /// port to listen on
    #[argh(option, short = 'p', default = "8053")]
    port: u16,

    /// directory receiving the saved sessions
    #[argh(option, short = 'r', default = "PathBuf::from(\"saves\")")]
    root: PathBuf,

    /// file format of the saved sessions, yaml or json
    #[argh(option, short = 'f', default = "FileFormat::Yaml")]
    format: FileFormat,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Args = argh::from_env();

    let store = LabelStore::new(FileSaver::new(&args.root, args.format)?);
    let config = RelayConfig {
        host: args.host,
        port: args.port,
    };

    let server = RelayServer::bind(&config, store).await?;
    log::info!("saving sessions to {} as {}", args.root.display(), args.format);
    log::info!("Press Ctrl+C to stop the server");

    server
        .serve(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                log::error!("failed to listen for Ctrl-C: {e}");
            }
        })
        .await?;

    Ok(())
}
