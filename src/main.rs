use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "hossa",
    about = "Leveraged BTC purchase planner (loan vs DCA vs savings, PLN tax and inflation aware)"
)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve the web UI and JSON API.
    Serve {
        #[arg(default_value_t = 8080)]
        port: u16,
    },
}

#[tokio::main]
async fn main() {
    let args = Args::parse();
    match args.command {
        Command::Serve { port } => {
            if let Err(e) = hossa::api::run_http_server(port).await {
                eprintln!("Server error: {e}");
                std::process::exit(1);
            }
        }
    }
}
