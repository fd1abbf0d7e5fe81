use std::path::{Path, PathBuf};
use anyhow::{anyhow, bail, Context};
use clap::{Args, Parser, Subcommand};
use reqwest::{Client, Response, StatusCode};
use serde::Deserialize;
use lasku::server::engine::currency::CurrencyFormat;
use lasku::server::engine::totals::InvoiceSummary;
use lasku::server::model::invoice::Invoice;
use lasku::server::util::banking::{create_reference, format_reference, is_standard_vat_rate};

#[derive(Parser, Debug)]
#[command(name = "lasku")]
#[command(about = "client cli to preview invoices and fetch their pdf from the server", version, long_about = None
)]
struct Cli {
    #[arg(long, global = true, default_value = HOST, help = "Base url of the invoice server")]
    host: String,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Parser, Debug)]
enum Commands {
    /// print a fresh draft invoice
    Draft,
    /// print formatted totals of an invoice file
    #[command(arg_required_else_help = true)]
    Totals(FileArgs),
    /// render an invoice file to pdf
    #[command(arg_required_else_help = true)]
    Generate(GenerateArgs),
    /// hand an invoice over to the render view
    #[command(arg_required_else_help = true)]
    Handoff(HandoffArgs),
    /// build a reference number with its check digit
    #[command(arg_required_else_help = true)]
    Reference {
        #[arg(help = "Base digits, the check digit is appended", value_name = "BASE")]
        base: String,
    },
}

#[derive(Debug, Args)]
struct FileArgs {
    #[arg(long, help = "Invoice json file", value_name = "FILE")]
    file: PathBuf,
}

#[derive(Debug, Args)]
struct GenerateArgs {
    #[arg(long, help = "Invoice json file", value_name = "FILE")]
    file: PathBuf,
    #[arg(long, help = "Where to write the pdf", value_name = "PATH", default_value = "invoice.pdf")]
    out: PathBuf,
}

#[derive(Debug, Args)]
struct HandoffArgs {
    #[command(subcommand)]
    command: HandoffCmds,
}

#[derive(Debug, Subcommand)]
enum HandoffCmds {
    #[command(arg_required_else_help = true)]
    Put(FileArgs),
    #[command(arg_required_else_help = true)]
    Render {
        #[arg(long, help = "Token returned by `handoff put`", value_name = "TOKEN")]
        token: String,
        #[arg(long, help = "Where to write the pdf", value_name = "PATH", default_value = "invoice.pdf")]
        out: PathBuf,
    },
}

const HOST: &str = "http://localhost:8080";

#[derive(Debug, Deserialize)]
struct HandoffResponse {
    token: String,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: String,
    #[serde(default)]
    fields: Option<serde_json::Map<String, serde_json::Value>>,
}

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    let args = Cli::parse();
    let host = args.host.trim_end_matches('/');

    match args.command {
        Commands::Draft => {
            let draft = fetch_draft(host).await?;
            println!("{}", serde_json::to_string_pretty(&draft)?);
        }
        Commands::Totals(args) => {
            let invoice = read_invoice(&args.file)?;
            print_totals(&invoice);
        }
        Commands::Generate(args) => {
            let invoice = read_invoice(&args.file)?;
            println!("generating pdf for invoice={}", invoice.details.invoice_number);
            let res = Client::new()
                .post(format!("{}/{}", host, "api/generate-pdf"))
                .json(&invoice)
                .send()
                .await?;
            save_pdf(res, &args.out).await?;
        }
        Commands::Handoff(handoff) => match handoff.command {
            HandoffCmds::Put(args) => {
                let invoice = read_invoice(&args.file)?;
                let res = Client::new()
                    .post(format!("{}/{}", host, "v1/handoff"))
                    .json(&invoice)
                    .send()
                    .await?;
                match res.status() {
                    StatusCode::OK => {
                        let res = res.json::<HandoffResponse>().await?;
                        println!("{}", res.token);
                    }
                    _ => return Err(report_failure(res).await),
                }
            }
            HandoffCmds::Render { token, out } => {
                let res = Client::new()
                    .get(format!("{}/v1/handoff/{}/pdf", host, token))
                    .send()
                    .await?;
                save_pdf(res, &out).await?;
            }
        },
        Commands::Reference { base } => match create_reference(&base) {
            Some(reference) => println!("{}", format_reference(&reference)),
            None => bail!("reference base must be 3 to 19 digits, got {}", base),
        },
    }
    Ok(())
}

async fn fetch_draft(host: &str) -> anyhow::Result<Invoice> {
    let res = Client::new()
        .get(format!("{}/{}", host, "v1/invoice/draft"))
        .send()
        .await?;
    match res.status() {
        StatusCode::OK => Ok(res.json::<Invoice>().await?),
        _ => Err(report_failure(res).await),
    }
}

fn read_invoice(path: &Path) -> anyhow::Result<Invoice> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("{} is not an invoice", path.display()))
}

fn print_totals(invoice: &Invoice) {
    let currency = CurrencyFormat::default();
    let summary = InvoiceSummary::compute(&invoice.items);
    for (item, line) in invoice.items.iter().zip(&summary.lines) {
        let marker = if is_standard_vat_rate(item.tax_rate) { "" } else { " (non-standard rate)" };
        println!(
            "{:<30} {:>8} x {:>14} {:>7}{} = {:>16}",
            item.description,
            currency.format_decimal(item.quantity),
            currency.format(item.price),
            currency.format_percent(item.tax_rate),
            marker,
            currency.format(line.gross),
        );
    }
    for group in &summary.vat_breakdown {
        println!(
            "VAT {:>7} on {:>16}: {:>16}",
            currency.format_percent(group.tax_rate),
            currency.format(group.net),
            currency.format(group.tax),
        );
    }
    println!("Subtotal  {:>16}", currency.format(summary.subtotal));
    println!("VAT total {:>16}", currency.format(summary.tax_total));
    println!("Total     {:>16}", currency.format(summary.grand_total));
}

async fn save_pdf(res: Response, out: &Path) -> anyhow::Result<()> {
    match res.status() {
        StatusCode::OK => {
            let bytes = res.bytes().await?;
            std::fs::write(out, &bytes).with_context(|| format!("failed to write {}", out.display()))?;
            println!("wrote {} ({} bytes)", out.display(), bytes.len());
            Ok(())
        }
        _ => Err(report_failure(res).await),
    }
}

/// Print the server's error and its field list, as an error to bail with
async fn report_failure(res: Response) -> anyhow::Error {
    let status = res.status();
    match res.json::<ErrorResponse>().await {
        Ok(body) => {
            println!("{}: {}", status, body.error);
            for (field, message) in body.fields.unwrap_or_default() {
                println!("  {}: {}", field, message.as_str().unwrap_or_default());
            }
        }
        Err(_) => println!("got unexpected status code, {}", status),
    }
    anyhow!("request failed with {}", status)
}
