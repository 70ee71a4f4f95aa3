use clap::Parser;
use tracing::error;

use cpn_indexer::logging::init_logging;
use cpn_indexer::{completion_message, run, Cli};

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();

    let cli = Cli::parse();
    init_logging(cli.global.debug, cli.global.json_logs);

    match run(cli).await {
        Ok(summary) => {
            println!("{}", completion_message(&summary));
        }
        Err(e) => {
            error!(error = %e, "Indexing failed");
            eprintln!("[ERROR] {}", e);
            std::process::exit(1);
        }
    }
}
