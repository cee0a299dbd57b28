use crate::demo::{run_demo, run_fleet_list, DemoArgs, FleetListArgs};
use crate::server;
use booking_flow::error::AppError;
use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "Booking Flow",
    about = "Run the freight booking flow service or walk a booking from the command line",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Inspect the vehicle fleet used on the vehicle step
    Fleet {
        #[command(subcommand)]
        command: FleetCommand,
    },
    /// Walk a scripted booking from job type to confirmation
    Demo(DemoArgs),
}

#[derive(Subcommand, Debug)]
enum FleetCommand {
    /// List vehicles with their capacity and options
    List(FleetListArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Fleet {
            command: FleetCommand::List(args),
        } => run_fleet_list(args),
        Command::Demo(args) => run_demo(args).await,
    }
}
