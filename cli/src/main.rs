mod api;
mod retry;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use estimate::{Catalog, DEFAULT_COAT_COUNT, EstimateError, EstimateSummary, format_currency};
use reqwest::Method;
use serde_json::{Map, Value, json};
use uuid::Uuid;

use crate::api::ApiClient;
use crate::retry::{DEFAULT_MAX_RETRIES, RetryPolicy};

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("invalid base URL: {0}")]
    InvalidBaseUrl(String),
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("server returned HTTP {status}: {message}")]
    Server { status: u16, message: String },
    #[error(transparent)]
    Estimate(#[from] EstimateError),
    #[error("invalid --detail `{0}`; expected key=value")]
    InvalidDetail(String),
    #[error("cannot read {path}: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("invalid JSON payload: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

#[derive(Parser, Debug)]
#[command(name = "solarcoat", about = "Coating estimates and CRM API client")]
struct Cli {
    #[arg(long, env = "SOLARCOAT_BASE_URL", default_value = "http://127.0.0.1:3000")]
    base_url: String,

    #[arg(long, env = "SOLARCOAT_MAX_RETRIES", default_value_t = DEFAULT_MAX_RETRIES)]
    max_retries: u32,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Check that the server is up.
    Ping,
    /// Estimate gallons and cost for a coating job.
    Estimate(EstimateArgs),
    /// List coating products.
    Products {
        /// YAML catalog to use instead of the built-in product line.
        #[arg(long)]
        catalog: Option<PathBuf>,
    },
    /// Call the CRM and consultation endpoints.
    Api(ApiCommand),
}

#[derive(Args, Debug)]
struct EstimateArgs {
    /// Surface area in square feet.
    #[arg(long, allow_negative_numbers = true)]
    area: f64,
    /// Product key, e.g. `premium`.
    #[arg(long)]
    product: String,
    #[arg(long, default_value_t = DEFAULT_COAT_COUNT)]
    coats: u32,
    #[arg(long, conflicts_with = "remote")]
    catalog: Option<PathBuf>,
    /// Ask the server instead of computing locally.
    #[arg(long, default_value_t = false)]
    remote: bool,
}

#[derive(Args, Debug)]
struct ApiCommand {
    #[command(subcommand)]
    command: ApiSubcommand,
}

#[derive(Subcommand, Debug)]
enum ApiSubcommand {
    Dashboard,
    Contacts(ContactsCommand),
    Opportunities(OpportunitiesCommand),
    Submissions(SubmissionsCommand),
    /// Submit a consultation request for a service line.
    Consult(ConsultArgs),
}

#[derive(Args, Debug)]
struct ContactsCommand {
    #[command(subcommand)]
    command: ContactsSubcommand,
}

#[derive(Subcommand, Debug)]
enum ContactsSubcommand {
    List {
        #[arg(long)]
        status: Option<String>,
        #[arg(long)]
        limit: Option<i64>,
        #[arg(long)]
        offset: Option<i64>,
    },
    Search {
        query: String,
    },
    Create(ContactFields),
    Update {
        id: Uuid,
        #[command(flatten)]
        fields: ContactFields,
    },
    Delete {
        id: Uuid,
    },
    /// Import contacts from a CSV file.
    Import {
        file: PathBuf,
    },
}

#[derive(Args, Debug, Default)]
struct ContactFields {
    #[arg(long)]
    first_name: Option<String>,
    #[arg(long)]
    last_name: Option<String>,
    #[arg(long)]
    email: Option<String>,
    #[arg(long)]
    phone: Option<String>,
    #[arg(long)]
    company: Option<String>,
    #[arg(long)]
    source: Option<String>,
    #[arg(long)]
    status: Option<String>,
    #[arg(long)]
    notes: Option<String>,
}

impl ContactFields {
    /// JSON body with only the flags that were given.
    fn to_json(&self) -> Value {
        let fields = [
            ("firstName", &self.first_name),
            ("lastName", &self.last_name),
            ("email", &self.email),
            ("phone", &self.phone),
            ("company", &self.company),
            ("source", &self.source),
            ("status", &self.status),
            ("notes", &self.notes),
        ];
        let body: Map<String, Value> = fields
            .into_iter()
            .filter_map(|(key, value)| value.as_ref().map(|v| (key.to_owned(), Value::String(v.clone()))))
            .collect();
        Value::Object(body)
    }
}

#[derive(Args, Debug)]
struct OpportunitiesCommand {
    #[command(subcommand)]
    command: OpportunitiesSubcommand,
}

#[derive(Subcommand, Debug)]
enum OpportunitiesSubcommand {
    List {
        #[arg(long)]
        stage: Option<String>,
    },
    Create {
        #[arg(long)]
        title: String,
        #[arg(long)]
        contact_id: Option<Uuid>,
        #[arg(long)]
        value: Option<f64>,
        #[arg(long)]
        stage: Option<String>,
        #[arg(long)]
        service: Option<String>,
        /// ISO date, e.g. 2026-03-31.
        #[arg(long)]
        expected_close_date: Option<String>,
    },
}

#[derive(Args, Debug)]
struct SubmissionsCommand {
    #[command(subcommand)]
    command: SubmissionsSubcommand,
}

#[derive(Subcommand, Debug)]
enum SubmissionsSubcommand {
    List {
        #[arg(long)]
        status: Option<String>,
        #[arg(long)]
        source: Option<String>,
        #[arg(long)]
        limit: Option<i64>,
    },
}

#[derive(Args, Debug)]
struct ConsultArgs {
    /// Service slug: fire-prevention, commercial-solar, residential-solar,
    /// or specialty-coatings.
    service: String,
    #[arg(long)]
    name: String,
    #[arg(long)]
    email: String,
    #[arg(long)]
    phone: Option<String>,
    #[arg(long)]
    company: Option<String>,
    #[arg(long)]
    message: Option<String>,
    /// Extra form field as key=value; repeatable.
    #[arg(long = "detail")]
    details: Vec<String>,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let connect = || ApiClient::new(&cli.base_url, RetryPolicy::new(cli.max_retries));
    match cli.command {
        Command::Products { catalog } => run_products(catalog.as_deref()),
        Command::Estimate(args) if !args.remote => run_estimate_local(&args),
        Command::Estimate(args) => run_estimate_remote(&connect()?, &args).await,
        Command::Ping => run_ping(&connect()?).await,
        Command::Api(api) => run_api(&connect()?, api).await,
    }
}

fn load_catalog(path: Option<&std::path::Path>) -> Result<Catalog, CliError> {
    Ok(match path {
        Some(path) => Catalog::from_path(path)?,
        None => Catalog::builtin(),
    })
}

fn run_estimate_local(args: &EstimateArgs) -> Result<(), CliError> {
    let catalog = load_catalog(args.catalog.as_deref())?;
    let result = catalog.estimate(&args.product, args.area, args.coats)?;
    println!("{}", EstimateSummary(&result));
    Ok(())
}

async fn run_estimate_remote(client: &ApiClient, args: &EstimateArgs) -> Result<(), CliError> {
    let body = json!({ "surfaceArea": args.area, "productKey": args.product, "coatCount": args.coats });
    let response = client.send_json(Method::POST, &["api", "estimate"], Some(&body)).await?;
    let result = serde_json::from_value::<estimate::CalculationResult>(response["estimate"].clone())?;
    println!("{}", EstimateSummary(&result));
    Ok(())
}

fn run_products(catalog: Option<&std::path::Path>) -> Result<(), CliError> {
    let catalog = load_catalog(catalog)?;
    println!("{:<14} {:<26} {:>14} {:>10}", "KEY", "NAME", "SQ FT/GALLON", "PRICE");
    for product in catalog.products() {
        println!(
            "{:<14} {:<26} {:>14} {:>10}",
            product.key,
            product.name,
            product.coverage_per_gallon,
            format_currency(product.price_per_gallon)
        );
    }
    Ok(())
}

async fn run_ping(client: &ApiClient) -> Result<(), CliError> {
    client.get(&["healthz"], &[]).await?;
    println!("ok");
    Ok(())
}

async fn run_api(client: &ApiClient, api: ApiCommand) -> Result<(), CliError> {
    let json = match api.command {
        ApiSubcommand::Dashboard => client.get(&["api", "crm", "dashboard"], &[]).await?,
        ApiSubcommand::Contacts(contacts) => run_api_contacts(client, contacts).await?,
        ApiSubcommand::Opportunities(opportunities) => run_api_opportunities(client, opportunities).await?,
        ApiSubcommand::Submissions(submissions) => match submissions.command {
            SubmissionsSubcommand::List { status, source, limit } => {
                let query = query_pairs([("status", status), ("source", source), ("limit", limit.map(|l| l.to_string()))]);
                client.get(&["api", "crm", "form-submissions"], &query).await?
            }
        },
        ApiSubcommand::Consult(args) => {
            let body = consultation_body(&args)?;
            client.send_json(Method::POST, &["api", &args.service, "consultation"], Some(&body)).await?
        }
    };
    print_json(&json)
}

async fn run_api_contacts(client: &ApiClient, contacts: ContactsCommand) -> Result<Value, CliError> {
    match contacts.command {
        ContactsSubcommand::List { status, limit, offset } => {
            let query = query_pairs([
                ("status", status),
                ("limit", limit.map(|l| l.to_string())),
                ("offset", offset.map(|o| o.to_string())),
            ]);
            client.get(&["api", "crm", "contacts"], &query).await
        }
        ContactsSubcommand::Search { query } => {
            client.get(&["api", "crm", "contacts", "search", &query], &[]).await
        }
        ContactsSubcommand::Create(fields) => {
            client.send_json(Method::POST, &["api", "crm", "contacts"], Some(&fields.to_json())).await
        }
        ContactsSubcommand::Update { id, fields } => {
            let id = id.to_string();
            client.send_json(Method::PUT, &["api", "crm", "contacts", &id], Some(&fields.to_json())).await
        }
        ContactsSubcommand::Delete { id } => {
            let id = id.to_string();
            client.send_json(Method::DELETE, &["api", "crm", "contacts", &id], None).await
        }
        ContactsSubcommand::Import { file } => {
            let bytes = std::fs::read(&file).map_err(|source| CliError::ReadFile { path: file.clone(), source })?;
            let file_name = file.file_name().and_then(|n| n.to_str()).unwrap_or("contacts.csv");
            client.upload_csv(&["api", "crm", "contacts", "import"], file_name, bytes).await
        }
    }
}

async fn run_api_opportunities(client: &ApiClient, opportunities: OpportunitiesCommand) -> Result<Value, CliError> {
    match opportunities.command {
        OpportunitiesSubcommand::List { stage } => {
            client.get(&["api", "crm", "opportunities"], &query_pairs([("stage", stage)])).await
        }
        OpportunitiesSubcommand::Create { title, contact_id, value, stage, service, expected_close_date } => {
            let mut body = Map::new();
            body.insert("title".to_owned(), Value::String(title));
            if let Some(contact_id) = contact_id {
                body.insert("contactId".to_owned(), Value::String(contact_id.to_string()));
            }
            if let Some(value) = value {
                body.insert("value".to_owned(), json!(value));
            }
            for (key, field) in [("stage", stage), ("service", service), ("expectedCloseDate", expected_close_date)] {
                if let Some(field) = field {
                    body.insert(key.to_owned(), Value::String(field));
                }
            }
            client.send_json(Method::POST, &["api", "crm", "opportunities"], Some(&Value::Object(body))).await
        }
    }
}

/// Keep only the query parameters that were given.
fn query_pairs<const N: usize>(pairs: [(&'static str, Option<String>); N]) -> Vec<(&'static str, String)> {
    pairs.into_iter().filter_map(|(key, value)| value.map(|v| (key, v))).collect()
}

fn consultation_body(args: &ConsultArgs) -> Result<Value, CliError> {
    let mut body = Map::new();
    for detail in &args.details {
        let (key, value) = detail
            .split_once('=')
            .filter(|(key, _)| !key.trim().is_empty())
            .ok_or_else(|| CliError::InvalidDetail(detail.clone()))?;
        body.insert(key.trim().to_owned(), Value::String(value.to_owned()));
    }

    body.insert("name".to_owned(), Value::String(args.name.clone()));
    body.insert("email".to_owned(), Value::String(args.email.clone()));
    for (key, field) in [("phone", &args.phone), ("company", &args.company), ("message", &args.message)] {
        if let Some(field) = field {
            body.insert(key.to_owned(), Value::String(field.clone()));
        }
    }
    Ok(Value::Object(body))
}

fn print_json(value: &Value) -> Result<(), CliError> {
    let rendered = serde_json::to_string_pretty(value)?;
    println!("{rendered}");
    Ok(())
}

#[cfg(test)]
#[path = "main_test.rs"]
mod tests;
