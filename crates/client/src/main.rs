use anyhow::{bail, Context};
use clap::{Parser, Subcommand};

use sweetshop_client::{
    table, NewSweetBody, SearchQuery, SweetChanges, SweetshopClient,
};
use sweetshop_core::SweetId;

/// Terminal front-end for the sweetshop API.
#[derive(Debug, Parser)]
#[command(name = "sweetshop", version)]
struct Cli {
    /// Base URL of the API server.
    #[arg(long, env = "SWEETSHOP_URL", default_value = "http://127.0.0.1:8080")]
    url: String,

    /// Bearer token from `register` or `login`.
    #[arg(long, env = "SWEETSHOP_TOKEN", hide_env_values = true)]
    token: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Check that the server is reachable.
    Health,
    /// Create an account and print its token.
    Register { email: String, password: String },
    /// Log in and print a token.
    Login { email: String, password: String },
    /// Show the account behind the current token.
    Me,
    /// List sweets, optionally filtered.
    List {
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        min_price: Option<i64>,
        #[arg(long)]
        max_price: Option<i64>,
    },
    /// Show a single sweet.
    Show { id: SweetId },
    /// Add a sweet to the catalogue (admin).
    Create {
        name: String,
        category: String,
        /// Price in minor units.
        price: i64,
        #[arg(long, default_value_t = 0)]
        quantity: i64,
    },
    /// Change name, category or price (admin).
    Update {
        id: SweetId,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        price: Option<i64>,
    },
    /// Buy units of a sweet.
    Buy {
        id: SweetId,
        #[arg(long, default_value_t = 1)]
        quantity: i64,
    },
    /// Add stock (admin).
    Restock { id: SweetId, quantity: i64 },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    sweetshop_observability::init_cli();

    let cli = Cli::parse();
    let mut client = match cli.token {
        Some(token) => SweetshopClient::with_token(cli.url, token),
        None => SweetshopClient::new(cli.url),
    };

    let needs_token = !matches!(
        cli.command,
        Command::Health | Command::Register { .. } | Command::Login { .. }
    );
    if needs_token && client.token().is_none() {
        bail!("no token: run `sweetshop login` and export SWEETSHOP_TOKEN");
    }

    match cli.command {
        Command::Health => {
            if !client.health().await {
                bail!("server is unreachable");
            }
            println!("ok");
        }
        Command::Register { email, password } => {
            let session = client.register(&email, &password).await.context("register failed")?;
            print!("{}", table::render_user(&session.user));
            println!("{}", session.token);
        }
        Command::Login { email, password } => {
            let session = client.login(&email, &password).await.context("login failed")?;
            print!("{}", table::render_user(&session.user));
            println!("{}", session.token);
        }
        Command::Me => {
            let user = client.me().await?;
            print!("{}", table::render_user(&user));
        }
        Command::List {
            name,
            category,
            min_price,
            max_price,
        } => {
            let query = SearchQuery {
                name,
                category,
                min_price,
                max_price,
            };
            let sweets = client.list_sweets(&query).await?;
            print!("{}", table::render_sweets(&sweets));
        }
        Command::Show { id } => {
            let sweet = client.get_sweet(id).await?;
            print!("{}", table::render_sweets(std::slice::from_ref(&sweet)));
        }
        Command::Create {
            name,
            category,
            price,
            quantity,
        } => {
            let body = NewSweetBody {
                name,
                category,
                price,
                quantity,
            };
            let sweet = client.create_sweet(&body).await?;
            print!("{}", table::render_sweets(std::slice::from_ref(&sweet)));
        }
        Command::Update {
            id,
            name,
            category,
            price,
        } => {
            let changes = SweetChanges {
                name,
                category,
                price,
            };
            let sweet = client.update_sweet(id, &changes).await?;
            print!("{}", table::render_sweets(std::slice::from_ref(&sweet)));
        }
        Command::Buy { id, quantity } => {
            let sweet = client.purchase(id, quantity).await?;
            println!("bought {quantity} x {}; {} left", sweet.name, sweet.quantity);
        }
        Command::Restock { id, quantity } => {
            let sweet = client.restock(id, quantity).await?;
            println!("restocked {} to {}", sweet.name, sweet.quantity);
        }
    }

    Ok(())
}
