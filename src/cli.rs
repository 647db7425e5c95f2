use crate::api::HttpCatalogClient;
use crate::model::{ApiConfig, Credentials, Locale, Notice, Product};
use crate::orchestrator::{AppState, Controller, FieldInput, Intent, ProductField};
use crate::storage::{self, TokenStore};
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::io::Write;
use tokio::sync::mpsc;

/// Output line routing for stdout/stderr writer.
enum OutputLine {
    Stdout(String),
    Stderr(String),
}

/// Spawn a blocking writer for stdout/stderr to avoid blocking async tasks.
fn spawn_output_writer() -> (
    mpsc::UnboundedSender<OutputLine>,
    tokio::task::JoinHandle<()>,
) {
    let (tx, mut rx) = mpsc::unbounded_channel::<OutputLine>();
    let handle = tokio::task::spawn_blocking(move || {
        let stdout = std::io::stdout();
        let stderr = std::io::stderr();
        let mut out = std::io::LineWriter::new(stdout.lock());
        let mut err = std::io::LineWriter::new(stderr.lock());

        while let Some(line) = rx.blocking_recv() {
            match line {
                OutputLine::Stdout(msg) => {
                    let _ = writeln!(out, "{}", msg);
                }
                OutputLine::Stderr(msg) => {
                    let _ = writeln!(err, "{}", msg);
                }
            }
        }

        let _ = out.flush();
        let _ = err.flush();
    });
    (tx, handle)
}

#[derive(Debug, Parser, Clone)]
#[command(
    name = "catalog-admin",
    version,
    about = "Product catalog admin console with optional TUI"
)]
pub struct Cli {
    /// Base URL of the catalog API
    #[arg(
        long,
        env = "CATALOG_BASE_URL",
        default_value = "https://ec-course-api.hexschool.io"
    )]
    pub base_url: String,

    /// API path segment identifying the shop (`/v2/api/{API_PATH}/...`)
    #[arg(long, env = "CATALOG_API_PATH")]
    pub api_path: String,

    /// Where the session token is kept between runs
    #[arg(long, env = "CATALOG_TOKEN_FILE")]
    pub token_file: Option<std::path::PathBuf>,

    /// Language for notices and labels
    #[arg(long, env = "CATALOG_LOCALE", value_enum, default_value = "zh-tw")]
    pub locale: Locale,

    /// Give up on requests after this long (no limit by default)
    #[arg(long)]
    pub request_timeout: Option<humantime::Duration>,

    /// Write logs to this file
    #[arg(long)]
    pub log_file: Option<std::path::PathBuf>,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Sign in and store the session token
    Login {
        #[arg(long)]
        username: String,
        #[arg(long, env = "CATALOG_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Forget the stored session token
    Logout,
    /// Print one page of products
    List {
        #[arg(long, default_value_t = 1)]
        page: u32,
        /// Print the page as JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Create a product from a JSON file
    Create {
        #[arg(long)]
        file: std::path::PathBuf,
    },
    /// Replace a product with the contents of a JSON file.
    ///
    /// The file is sent as the complete product and must include `is_enabled`.
    Update {
        #[arg(long)]
        id: String,
        #[arg(long)]
        file: std::path::PathBuf,
    },
    /// Delete a product
    Delete {
        #[arg(long)]
        id: String,
    },
}

impl Cli {
    pub fn is_interactive(&self) -> bool {
        self.command.is_none()
    }
}

pub async fn run(args: Cli) -> Result<()> {
    let Some(command) = args.command.clone() else {
        #[cfg(feature = "tui")]
        {
            return crate::tui::run(args).await;
        }
        #[cfg(not(feature = "tui"))]
        {
            return Err(anyhow::anyhow!(
                "built without TUI support; pass a subcommand (see --help)"
            ));
        }
    };
    run_command(&args, command).await
}

/// Build an `ApiConfig` from CLI arguments.
pub fn build_config(args: &Cli) -> ApiConfig {
    ApiConfig {
        base_url: args.base_url.clone(),
        api_path: args.api_path.clone(),
        token_path: args
            .token_file
            .clone()
            .unwrap_or_else(storage::default_token_path),
        request_timeout: args.request_timeout.map(Into::into),
        user_agent: format!("catalog-admin/{}", env!("CARGO_PKG_VERSION")),
    }
}

pub(crate) fn build_controller(args: &Cli) -> Result<Controller<HttpCatalogClient>> {
    let cfg = build_config(args);
    let api = HttpCatalogClient::new(&cfg)?;
    Ok(Controller::new(api, TokenStore::new(cfg.token_path)))
}

/// Intents that stage `product` into an open product dialog, field by field.
pub(crate) fn staging_intents(product: &Product) -> Vec<Intent> {
    let text = |field, value: String| Intent::EditField {
        field,
        input: FieldInput::Text(value),
    };
    let mut intents = vec![
        text(ProductField::Title, product.title.clone()),
        text(ProductField::Category, product.category.clone()),
        text(ProductField::OriginPrice, product.origin_price.to_string()),
        text(ProductField::Price, product.price.to_string()),
        text(ProductField::Unit, product.unit.clone()),
        text(ProductField::Description, product.description.clone()),
        text(ProductField::Content, product.content.clone()),
        text(ProductField::ImageUrl, product.image_url.clone()),
        Intent::EditField {
            field: ProductField::IsEnabled,
            input: FieldInput::Checked(product.is_enabled),
        },
    ];
    for (index, url) in product.images_url.iter().enumerate() {
        intents.push(Intent::AddImage);
        intents.push(Intent::SetImage {
            index,
            url: url.clone(),
        });
    }
    intents
}

fn read_product(path: &std::path::Path) -> Result<serde_json::Value> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("invalid product JSON in {}", path.display()))
}

fn parse_product(value: serde_json::Value) -> Result<Product> {
    serde_json::from_value(value).context("invalid product JSON")
}

/// An update replaces the whole product, so a missing flag would silently disable it.
fn parse_replacement(value: serde_json::Value) -> Result<Product> {
    if value.get("is_enabled").is_none() {
        anyhow::bail!("update file must set is_enabled (1 or 0); the product is replaced as a whole");
    }
    parse_product(value)
}

/// A login succeeds once the session is authenticated, even if the first page then
/// fails to load; that failure is only reported.
fn login_result(state: &AppState, locale: Locale) -> Result<Option<String>> {
    if state.authenticated {
        return Ok(state.notice.map(|n| n.to_message(locale).to_string()));
    }
    let notice = state.notice.unwrap_or(Notice::LoginFailed);
    Err(anyhow::anyhow!(notice.to_message(locale)))
}

/// Turn the controller's last notice into the command result.
fn finish(notice: Option<Notice>, locale: Locale) -> Result<Option<String>> {
    match notice {
        Some(n) if n.is_failure() => Err(anyhow::anyhow!(n.to_message(locale))),
        Some(n) => Ok(Some(n.to_message(locale).to_string())),
        None => Ok(None),
    }
}

async fn run_command(args: &Cli, command: Command) -> Result<()> {
    let is_login = matches!(command, Command::Login { .. });
    let mut controller = build_controller(args)?;
    let (out_tx, out_handle) = spawn_output_writer();

    let result = execute_command(&mut controller, command, args.locale, &out_tx).await;

    if result.is_ok() && is_login {
        let _ = out_tx.send(OutputLine::Stderr(format!(
            "Signed in; token saved to {}",
            controller.tokens().path().display()
        )));
    }
    drop(out_tx);
    let _ = out_handle.await;
    result
}

async fn execute_command(
    controller: &mut Controller<HttpCatalogClient>,
    command: Command,
    locale: Locale,
    out_tx: &mpsc::UnboundedSender<OutputLine>,
) -> Result<()> {
    let report = |msg: Option<String>| -> Result<()> {
        if let Some(msg) = msg {
            let _ = out_tx.send(OutputLine::Stderr(msg));
        }
        Ok(())
    };

    match command {
        Command::Login { username, password } => {
            controller
                .dispatch(Intent::Login(Credentials { username, password }))
                .await;
            return report(login_result(controller.state(), locale)?);
        }
        Command::Logout => {
            controller.dispatch(Intent::Logout).await;
            return report(finish(controller.state().notice, locale)?);
        }
        _ => {}
    }

    controller.dispatch(Intent::Restore).await;
    if !controller.state().authenticated {
        anyhow::bail!("not signed in; run `catalog-admin login` first");
    }

    match command {
        Command::List { page, json } => {
            if page != 1 {
                controller.dispatch(Intent::FetchPage(page)).await;
            }
            finish(controller.state().notice, locale)?;
            let state = controller.state();
            if json {
                let out = serde_json::to_string_pretty(&crate::model::ProductPage {
                    products: state.products.clone(),
                    pagination: state.page_info.clone(),
                })?;
                let _ = out_tx.send(OutputLine::Stdout(out));
            } else {
                let table =
                    crate::listing::build_product_table(&state.products, &state.page_info, locale);
                for line in table.lines {
                    let _ = out_tx.send(OutputLine::Stdout(line));
                }
            }
            Ok(())
        }
        Command::Create { file } => {
            let product = parse_product(read_product(&file)?)?;
            controller.dispatch(Intent::OpenCreate).await;
            for intent in staging_intents(&product) {
                controller.dispatch(intent).await;
            }
            controller.dispatch(Intent::Submit).await;
            report(finish(controller.state().notice, locale)?)
        }
        Command::Update { id, file } => {
            let mut product = parse_replacement(read_product(&file)?)?;
            product.id = Some(id);
            controller.dispatch(Intent::OpenEdit(product)).await;
            controller.dispatch(Intent::Submit).await;
            report(finish(controller.state().notice, locale)?)
        }
        Command::Delete { id } => {
            let target = Product {
                id: Some(id),
                ..Default::default()
            };
            controller.dispatch(Intent::OpenDelete(target)).await;
            controller.dispatch(Intent::ConfirmDelete).await;
            report(finish(controller.state().notice, locale)?)
        }
        Command::Login { .. } | Command::Logout => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orchestrator::reduce;
    use serde_json::json;

    #[test]
    fn staging_intents_reproduce_product_in_create_dialog() {
        let product = Product {
            title: "Oolong".into(),
            category: "tea".into(),
            origin_price: 300.0,
            price: 250.0,
            unit: "can".into(),
            description: "roasted".into(),
            content: "150g".into(),
            is_enabled: false,
            image_url: "https://img/main.png".into(),
            images_url: vec!["https://img/a.png".into(), "https://img/b.png".into()],
            ..Default::default()
        };

        let mut state = AppState::default();
        reduce(&mut state, Intent::OpenCreate);
        for intent in staging_intents(&product) {
            reduce(&mut state, intent);
        }

        assert!(state.is_new);
        assert_eq!(state.staged.to_product(), Some(product));
    }

    #[test]
    fn parses_subcommands_and_env_free_flags() {
        let cli = Cli::try_parse_from([
            "catalog-admin",
            "--api-path",
            "shop",
            "--locale",
            "en",
            "--request-timeout",
            "5s",
            "list",
            "--page",
            "2",
            "--json",
        ])
        .unwrap();
        assert_eq!(cli.locale, Locale::En);
        assert!(!cli.is_interactive());
        assert!(matches!(cli.command, Some(Command::List { page: 2, json: true })));

        let cfg = build_config(&cli);
        assert_eq!(cfg.api_path, "shop");
        assert_eq!(cfg.request_timeout, Some(std::time::Duration::from_secs(5)));
    }

    #[test]
    fn failure_notice_becomes_error() {
        assert!(finish(Some(Notice::DeleteFailed), Locale::En).is_err());
        assert_eq!(
            finish(Some(Notice::Deleted), Locale::En).unwrap().as_deref(),
            Some("Product deleted")
        );
        assert_eq!(finish(None, Locale::En).unwrap(), None);
    }

    #[test]
    fn login_succeeds_when_authenticated_even_if_listing_failed() {
        let state = AppState {
            authenticated: true,
            notice: Some(Notice::FetchFailed),
            ..Default::default()
        };
        assert_eq!(
            login_result(&state, Locale::En).unwrap().as_deref(),
            Some("Failed to load products")
        );

        let rejected = AppState {
            notice: Some(Notice::LoginFailed),
            ..Default::default()
        };
        assert!(login_result(&rejected, Locale::En).is_err());
        assert!(login_result(&AppState::default(), Locale::En).is_err());
    }

    #[test]
    fn update_file_must_state_enabled_flag() {
        let err = parse_replacement(json!({"title": "A", "price": 10})).unwrap_err();
        assert!(err.to_string().contains("is_enabled"));

        let product = parse_replacement(json!({"title": "A", "is_enabled": 0})).unwrap();
        assert!(!product.is_enabled);

        assert!(parse_product(json!({"title": "A"})).is_ok());
    }
}
