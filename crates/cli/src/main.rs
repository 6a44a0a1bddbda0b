use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use dealbot_core::domain::portal::{filter_deals, DealStatus};
use dealbot_core::draft::{DealDraft, DealForm};
use dealbot_core::gateway::{HttpGateway, PortalGateway, RecommendationGateway};
use dealbot_core::session::{FileSessionStore, Mode, Session, SessionStore};

#[derive(Debug, Parser)]
#[command(name = "dealbot", about = "Deal recommendation service client")]
struct Args {
    /// Session file holding the selected persona.
    #[arg(long, env = "DEALBOT_SESSION_FILE", default_value = FileSessionStore::DEFAULT_FILE)]
    session_file: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Select a business or client persona and store it in the session file.
    Select {
        #[arg(long)]
        mode: Mode,
        #[arg(long)]
        business: Option<String>,
        #[arg(long)]
        client: Option<String>,
    },
    /// Print the stored session.
    Session,
    /// Forget the stored session.
    ClearSession,
    /// Normalized deal templates for a business (defaults to the session's business).
    Recommend {
        #[arg(long)]
        business: Option<String>,
    },
    /// Raw deals for a business/client pair (defaults to the session's selection).
    Personalized {
        #[arg(long)]
        business: Option<String>,
        #[arg(long)]
        client: Option<String>,
    },
    /// Journal history of a client.
    Journal {
        #[arg(long)]
        client: Option<String>,
    },
    /// Check the remote service.
    Health,
    /// Preview a deal draft.
    Preview {
        #[arg(long, default_value = "")]
        title: String,
        #[arg(long, default_value = "")]
        description: String,
        #[arg(long)]
        original_price: f64,
        #[arg(long)]
        current_price: f64,
        #[arg(long)]
        currency: Option<String>,
        #[arg(long)]
        location: Option<String>,
        /// YYYY-MM-DD
        #[arg(long)]
        valid_until: Option<String>,
    },
    /// Manage the business's deals.
    #[command(subcommand)]
    Deals(DealsCommand),
}

#[derive(Debug, Subcommand)]
enum DealsCommand {
    List {
        #[arg(long)]
        business: Option<String>,
        #[arg(long, default_value = "active")]
        status: DealStatus,
        #[arg(long, default_value = "")]
        search: String,
    },
    Create {
        /// Start from the n-th recommendation template (market intelligence first).
        #[arg(long)]
        template: Option<usize>,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        discount: Option<String>,
        #[arg(long)]
        original_price: Option<String>,
        #[arg(long)]
        current_price: Option<String>,
        #[arg(long, default_value = "")]
        location: String,
        #[arg(long, default_value = "")]
        date_range: String,
        #[arg(long, default_value = "")]
        button_text: String,
        /// Print the card preview instead of creating the deal.
        #[arg(long)]
        dry_run: bool,
        /// YYYY-MM-DD
        #[arg(long)]
        start: String,
        /// YYYY-MM-DD
        #[arg(long)]
        end: String,
        #[arg(long, default_value = "active")]
        status: DealStatus,
    },
    SetActive {
        #[arg(long)]
        id: String,
        #[arg(long, action = clap::ArgAction::Set)]
        active: bool,
    },
    Delete {
        #[arg(long)]
        id: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let settings = dealbot_core::config::Settings::from_env()?;
    let _sentry_guard = init_sentry(&settings);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(sentry_tracing::layer())
        .init();

    let args = Args::parse();
    let store = FileSessionStore::new(&args.session_file);

    let result = run(args.command, &settings, &store).await;
    if let Err(err) = &result {
        sentry_anyhow::capture_anyhow(err);
        tracing::error!(error = %err, "command failed");
    }
    result
}

async fn run(
    command: Command,
    settings: &dealbot_core::config::Settings,
    store: &dyn SessionStore,
) -> anyhow::Result<()> {
    match command {
        Command::Select {
            mode,
            business,
            client,
        } => {
            let session = Session::select(mode, business, client)?;
            store.save(&session)?;
            tracing::info!(?session, "session saved");
            print_json(&session)
        }
        Command::Session => print_json(&store.load()?),
        Command::ClearSession => {
            let mut session = store.load()?;
            session.clear();
            store.save(&session)
        }
        Command::Preview {
            title,
            description,
            original_price,
            current_price,
            currency,
            location,
            valid_until,
        } => {
            let defaults = DealDraft::default();
            let draft = DealDraft {
                title,
                description,
                original_price,
                current_price,
                currency: currency.unwrap_or(defaults.currency),
                location: location.unwrap_or(defaults.location),
                valid_until: valid_until.as_deref().map(parse_date).transpose()?,
            };
            print_json(&draft.preview())
        }
        Command::Recommend { business } => {
            let (gateway, session) = connect(settings, store)?;
            let business_id = business_or_session(business, &session);
            let bundle = gateway.fetch_recommendations(&business_id).await?;
            print_json(&bundle)
        }
        Command::Personalized { business, client } => {
            let (gateway, session) = connect(settings, store)?;
            let client_id = client_or_session(client, &session)?;
            let bundle = match business {
                Some(business_id) => gateway.fetch_personalized(&business_id, &client_id).await?,
                None if session.mode == Some(Mode::Client) && session.business_id.is_some() => {
                    gateway
                        .fetch_personalized(session.effective_business(), &client_id)
                        .await?
                }
                None => gateway.fetch_client_recommendations(&client_id).await?,
            };
            print_json(&bundle)
        }
        Command::Journal { client } => {
            let (gateway, session) = connect(settings, store)?;
            let client_id = client_or_session(client, &session)?;
            print_json(&gateway.journal_entries(&client_id).await?)
        }
        Command::Health => {
            let (gateway, _) = connect(settings, store)?;
            print_json(&gateway.health().await?)
        }
        Command::Deals(cmd) => {
            let (gateway, session) = connect(settings, store)?;
            run_deals(cmd, &gateway, &session).await
        }
    }
}

fn connect(
    settings: &dealbot_core::config::Settings,
    store: &dyn SessionStore,
) -> anyhow::Result<(HttpGateway, Session)> {
    let gateway = HttpGateway::from_settings(settings)?;
    let session = store.load()?;
    Ok((gateway, session))
}

async fn run_deals(cmd: DealsCommand, gateway: &HttpGateway, session: &Session) -> anyhow::Result<()> {
    match cmd {
        DealsCommand::List {
            business,
            status,
            search,
        } => {
            let business_id = business_or_session(business, session);
            let deals = gateway.list_deals(&business_id).await?;
            print_json(&filter_deals(&deals, status, &search))
        }
        DealsCommand::Create {
            template,
            title,
            description,
            discount,
            original_price,
            current_price,
            location,
            date_range,
            button_text,
            dry_run,
            start,
            end,
            status,
        } => {
            let mut form = DealForm {
                location,
                date_range,
                button_text,
                ..DealForm::default()
            };
            if let Some(index) = template {
                let bundle = gateway
                    .fetch_recommendations(session.effective_business())
                    .await?;
                let rec = bundle
                    .templates()
                    .nth(index)
                    .with_context(|| format!("no recommendation template at index {index}"))?;
                form.apply_recommendation(rec);
            }
            override_field(&mut form.title, title);
            override_field(&mut form.description, description);
            override_field(&mut form.discount, discount);
            override_field(&mut form.original_price, original_price);
            override_field(&mut form.current_price, current_price);

            if dry_run {
                return print_json(&form.preview());
            }

            let request = form.to_create_request(parse_date(&start)?, parse_date(&end)?, status)?;
            let created = gateway.create_deal(&request).await?;
            tracing::info!(deal_id = %created.id, "deal created");
            print_json(&created)
        }
        DealsCommand::SetActive { id, active } => {
            print_json(&gateway.update_deal_status(&id, active).await?)
        }
        DealsCommand::Delete { id } => {
            gateway.delete_deal(&id).await?;
            tracing::info!(deal_id = %id, "deal deleted");
            Ok(())
        }
    }
}

fn business_or_session(arg: Option<String>, session: &Session) -> String {
    arg.unwrap_or_else(|| session.effective_business().to_string())
}

fn client_or_session(arg: Option<String>, session: &Session) -> anyhow::Result<String> {
    arg.or_else(|| session.client_id.clone())
        .context("no client given and none selected in the session")
}

fn override_field(field: &mut String, value: Option<String>) {
    if let Some(value) = value {
        *field = value;
    }
}

fn parse_date(s: &str) -> anyhow::Result<chrono::NaiveDate> {
    chrono::NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .with_context(|| format!("invalid date (expected YYYY-MM-DD): {s}"))
}

fn print_json<T: serde::Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    let out = serde_json::to_string_pretty(value).context("output serialize failed")?;
    println!("{out}");
    Ok(())
}

fn init_sentry(settings: &dealbot_core::config::Settings) -> Option<sentry::ClientInitGuard> {
    let dsn = settings.sentry_dsn.as_deref()?;
    Some(sentry::init((
        dsn,
        sentry::ClientOptions {
            release: sentry::release_name!(),
            ..Default::default()
        },
    )))
}
