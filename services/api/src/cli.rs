use crate::server;
use clap::{Args, Parser, Subcommand};
use loan_desk::config::AppConfig;
use loan_desk::error::AppError;
use loan_desk::fraud::{CustomerId, FraudAuthorityClient};

#[derive(Parser, Debug)]
#[command(
    name = "Loan Desk",
    about = "Run the loan intake service or the fraud authority it consults",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the loan intake HTTP service (default command)
    LoanIntake(ServeArgs),
    /// Start the fraud authority HTTP service
    FraudAuthority(ServeArgs),
    /// Ask the configured fraud authority for one customer's verdict
    Check(CheckArgs),
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

#[derive(Args, Debug)]
pub(crate) struct CheckArgs {
    /// Customer identifier to look up
    #[arg(long, allow_negative_numbers = true)]
    pub(crate) customer_id: i32,
    /// Override FRAUD_AUTHORITY_URL for this call
    #[arg(long)]
    pub(crate) authority_url: Option<String>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::LoanIntake(ServeArgs::default()));

    match command {
        Command::LoanIntake(args) => server::run_loan_intake(args).await,
        Command::FraudAuthority(args) => server::run_fraud_authority(args).await,
        Command::Check(args) => run_check(args).await,
    }
}

async fn run_check(args: CheckArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;
    if let Some(url) = args.authority_url {
        config.fraud_authority.base_url = url;
    }

    let client = FraudAuthorityClient::from_config(&config.fraud_authority)?;
    let verdict = client.evaluate(CustomerId(args.customer_id)).await?;
    println!("customer {}: {}", args.customer_id, verdict);
    Ok(())
}
