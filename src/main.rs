use clap::{Parser, Subcommand};
use miette::{IntoDiagnostic, Result, miette};
use serde::Serialize;
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use wayforpay::application::gateway::{CallbackOutcome, Gateway};
use wayforpay::config::{DEFAULT_ENDPOINT, GatewayConfig};
use wayforpay::domain::acknowledgement::Acknowledgement;
use wayforpay::domain::credentials::MerchantCredentials;
use wayforpay::domain::order::Order;
use wayforpay::interfaces::callback::decode_payload;
use wayforpay::interfaces::csv::LineItemReader;
use wayforpay::interfaces::html::render_purchase_form;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Merchant account issued by the gateway
    #[arg(long, env = "WAYFORPAY_MERCHANT_ACCOUNT")]
    merchant_account: String,

    /// Merchant secret key used for signing
    #[arg(long, env = "WAYFORPAY_SECRET_KEY", hide_env_values = true)]
    secret_key: String,

    /// Payment page URL the purchase form posts to
    #[arg(long, env = "WAYFORPAY_ENDPOINT", default_value = DEFAULT_ENDPOINT)]
    endpoint: String,

    /// Payment page language for orders that do not set one
    #[arg(long)]
    language: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Sign an order and print the purchase form fields
    Purchase {
        /// Order JSON file
        order: PathBuf,

        /// CSV file with `name,price,quantity` line items, appended to the order's products
        #[arg(long)]
        items: Option<PathBuf>,

        /// Print a self-submitting HTML page instead of JSON
        #[arg(long)]
        html: bool,
    },
    /// Verify and classify a payment callback body
    Callback {
        /// File holding the raw callback body (JSON or form-encoded)
        payload: PathBuf,

        /// Acknowledge callbacks even when their signature does not verify
        #[arg(long)]
        allow_unsigned: bool,
    },
}

#[derive(Serialize)]
struct CallbackReport {
    #[serde(flatten)]
    outcome: CallbackOutcome,
    #[serde(skip_serializing_if = "Option::is_none")]
    acknowledgement: Option<Acknowledgement>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    let credentials =
        MerchantCredentials::new(cli.merchant_account, cli.secret_key).into_diagnostic()?;
    let mut config = GatewayConfig::new(credentials)
        .and_then(|config| config.with_endpoint(&cli.endpoint))
        .into_diagnostic()?;
    if let Some(language) = cli.language {
        config = config.with_language(language);
    }
    let gateway = Gateway::new(config);

    let stdout = io::stdout();
    let mut out = stdout.lock();

    match cli.command {
        Command::Purchase { order, items, html } => {
            let body = fs::read_to_string(order).into_diagnostic()?;
            let mut order: Order = serde_json::from_str(&body).into_diagnostic()?;
            if let Some(items) = items {
                let file = File::open(items).into_diagnostic()?;
                let line_items = LineItemReader::new(file).read_all().into_diagnostic()?;
                order.line_items.extend(line_items);
            }

            let form = gateway.purchase(order).into_diagnostic()?;
            if html {
                out.write_all(render_purchase_form(&form).as_bytes())
                    .into_diagnostic()?;
            } else {
                serde_json::to_writer_pretty(&mut out, &form).into_diagnostic()?;
                writeln!(out).into_diagnostic()?;
            }
        }
        Command::Callback {
            payload,
            allow_unsigned,
        } => {
            let body = fs::read_to_string(payload).into_diagnostic()?;
            let payload = decode_payload(&body).into_diagnostic()?;
            let outcome = gateway.receive(&payload);

            let verified = outcome.verification.is_valid();
            let acknowledgement = if verified || allow_unsigned {
                gateway.acknowledge(&outcome.notification)
            } else {
                None
            };
            let verification = outcome.verification;

            let report = CallbackReport {
                outcome,
                acknowledgement,
            };
            serde_json::to_writer_pretty(&mut out, &report).into_diagnostic()?;
            writeln!(out).into_diagnostic()?;

            if !verified && !allow_unsigned {
                return Err(miette!("callback signature check failed: {verification}"));
            }
        }
    }

    Ok(())
}
