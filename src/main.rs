//! Engage X Console
//!
//! Terminal front end for the Engage X CRM backend:
//! - `shell`: interactive console (default); the session cookie lives as
//!   long as the process, like a browser tab
//! - `routes`: print the route table and who may open each route
//! - `config`: generate a default config file

use anyhow::Context;
use clap::{Parser, Subcommand};
use serde::Serialize;
use serde_json::Value;
use std::path::PathBuf;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use engagex::api::{self, ListParams};
use engagex::config::{generate_default_config, Config, LoggingConfig};
use engagex::router::{Access, Outcome};
use engagex::{ApiClient, Method, NavigationState, Router, SessionContext, SessionGuard};

#[derive(Parser)]
#[command(name = "engagex")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Terminal console for the Engage X CRM")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Config file (default: search the usual locations)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Backend base URL, overriding the config
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// Output format (table, json)
    #[arg(short, long, default_value = "table", global = true)]
    pub format: String,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Interactive console
    Shell,

    /// Show the route table
    Routes,

    /// Generate default config file
    Config {
        /// Output path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

/// One line typed into the shell
#[derive(Parser)]
#[command(no_binary_name = true, disable_version_flag = true)]
struct ShellLine {
    #[command(subcommand)]
    command: ShellCommand,
}

#[derive(Subcommand)]
enum ShellCommand {
    /// Log in and remember email and role
    Login { email: String, password: String },
    /// Log out and forget email and role
    Logout,
    /// Show the stored email and role
    Whoami,
    /// Navigate to a console path through the guards
    Open {
        path: String,
        /// Location this navigation was redirected from
        #[arg(long)]
        from: Option<String>,
    },
    /// Sidebar sections visible to the current role
    Sections,
    /// Send any request: raw <METHOD> <endpoint> ['<json>']
    Raw {
        method: String,
        endpoint: String,
        body: Option<String>,
    },
    Customers {
        #[command(subcommand)]
        action: CustomerAction,
    },
    Leads {
        #[command(subcommand)]
        action: LeadAction,
    },
    Products {
        #[command(subcommand)]
        action: ProductAction,
    },
    Users {
        #[command(subcommand)]
        action: UserAction,
    },
    Tasks {
        #[command(subcommand)]
        action: TaskAction,
    },
    Reminders {
        #[command(subcommand)]
        action: ReminderAction,
    },
    /// Headline figures
    Dashboard,
    /// Analyst report for a date range (YYYY-MM-DD)
    Analyst {
        start: chrono::NaiveDate,
        end: Option<chrono::NaiveDate>,
        #[arg(long, default_value = "5")]
        top: u32,
    },
    /// Leave the console
    #[command(alias = "quit")]
    Exit,
}

#[derive(Subcommand)]
enum CustomerAction {
    List {
        #[arg(short, long)]
        search: Option<String>,
        #[arg(long)]
        active: Option<bool>,
        #[arg(short, long, default_value = "0")]
        page: u32,
    },
    Show { id: u64 },
    Activate { id: u64 },
    Deactivate { id: u64 },
}

#[derive(Subcommand)]
enum LeadAction {
    List {
        #[arg(short, long)]
        search: Option<String>,
        #[arg(short, long, default_value = "0")]
        page: u32,
    },
    Show { id: u64 },
    Delete { id: u64 },
}

#[derive(Subcommand)]
enum ProductAction {
    List {
        #[arg(short, long)]
        search: Option<String>,
        #[arg(short, long, default_value = "0")]
        page: u32,
    },
    Show { id: u64 },
    Active,
}

#[derive(Subcommand)]
enum UserAction {
    List {
        #[arg(short, long)]
        search: Option<String>,
        #[arg(short, long, default_value = "0")]
        page: u32,
    },
    Show { id: u64 },
    Deactivate { id: u64 },
    Names,
}

#[derive(Subcommand)]
enum TaskAction {
    /// Task board of a customer
    Board { customer: u64 },
    /// Move the card at FROM_STATUS[FROM_INDEX] to TO_STATUS[TO_INDEX]
    Move {
        customer: u64,
        from_status: api::tasks::TaskStatus,
        from_index: usize,
        to_status: api::tasks::TaskStatus,
        #[arg(default_value = "0")]
        to_index: usize,
    },
    Delete { id: u64 },
}

#[derive(Subcommand)]
enum ReminderAction {
    List,
    Delete { id: u64 },
}

struct Console {
    client: ApiClient,
    session: SessionContext,
    router: Router,
    format: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => Config::load_with_env(path)?,
        None => Config::load_default(),
    };
    if let Some(url) = &cli.api_url {
        config.api.base_url = engagex::gateway::normalize_base_url(url);
    }

    init_logging(&config.logging);

    match cli.command.unwrap_or(Commands::Shell) {
        Commands::Config { output } => {
            let content = generate_default_config();
            match output {
                Some(path) => {
                    std::fs::write(&path, content)
                        .with_context(|| format!("Failed to write {:?}", path))?;
                    println!("Config written to {:?}", path);
                }
                None => print!("{}", content),
            }
        }

        Commands::Routes => {
            let client = ApiClient::connect(&config.api, &config.auth)?;
            let guard = SessionGuard::from_config(client, &config);
            let router = Router::new(guard, SessionContext::in_memory(), &config.routes);

            for route in router.routes() {
                let access = match &route.access {
                    Access::Public => "public".to_string(),
                    Access::Authenticated => "any signed-in user".to_string(),
                    Access::Roles(roles) => roles
                        .iter()
                        .map(|r| r.as_str())
                        .collect::<Vec<_>>()
                        .join(", "),
                };
                println!("{:<20} {:<14} {}", route.pattern, format!("{:?}", route.kind), access);
            }
        }

        Commands::Shell => {
            let client = ApiClient::connect(&config.api, &config.auth)?;
            let session = SessionContext::from_config(&config.session);
            let guard = SessionGuard::from_config(client.clone(), &config);
            let router = Router::new(guard, session.clone(), &config.routes);

            let console = Console {
                client,
                session,
                router,
                format: cli.format,
            };
            console.run(&config).await?;
        }
    }

    Ok(())
}

fn init_logging(config: &LoggingConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(format!("engagex={}", config.level)));

    let registry = tracing_subscriber::registry().with(filter);
    if config.format == "json" {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

impl Console {
    async fn run(&self, config: &Config) -> anyhow::Result<()> {
        println!("Engage X console v{}", env!("CARGO_PKG_VERSION"));
        println!("Backend: {}", config.api.base_url);
        match (self.session.email(), self.session.role_claim()) {
            (Some(email), Some(role)) => println!("Last signed in as {} ({})", email, role),
            _ => println!("Not signed in. Type `login <email> <password>` or `help`."),
        }

        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        let mut stdout = tokio::io::stdout();

        loop {
            stdout.write_all(b"engagex> ").await?;
            stdout.flush().await?;

            let Some(line) = lines.next_line().await? else {
                break;
            };
            let args = match split_args(&line) {
                Ok(args) if args.is_empty() => continue,
                Ok(args) => args,
                Err(e) => {
                    eprintln!("{}", e);
                    continue;
                }
            };

            let parsed = match ShellLine::try_parse_from(args) {
                Ok(parsed) => parsed,
                Err(e) => {
                    let _ = e.print();
                    continue;
                }
            };

            if matches!(parsed.command, ShellCommand::Exit) {
                break;
            }
            if let Err(e) = self.dispatch(parsed.command).await {
                eprintln!("Error: {}", e);
            }
        }

        Ok(())
    }

    /// Open the page a command belongs to; false if the guards redirected
    async fn enter(&self, path: &str) -> bool {
        let nav = self.router.navigate(path, &NavigationState::default()).await;
        match nav.outcome {
            Outcome::Render(_) => true,
            Outcome::Redirect(target) => {
                println!("Redirected to {}", target);
                false
            }
        }
    }

    async fn dispatch(&self, command: ShellCommand) -> anyhow::Result<()> {
        let client = &self.client;

        match command {
            ShellCommand::Login { email, password } => {
                let response = api::auth::login(client, &self.session, &email, &password).await?;
                println!("Login successful: {} ({})", response.email, response.role);
            }

            ShellCommand::Logout => {
                if let Err(e) = api::auth::logout(client, &self.session).await {
                    eprintln!("Logout call failed: {}", e);
                }
                println!("Signed out");
            }

            ShellCommand::Whoami => match (self.session.email(), self.session.role_claim()) {
                (Some(email), Some(role)) => println!("{} ({})", email, role),
                _ => println!("Not signed in"),
            },

            ShellCommand::Open { path, from } => {
                let nav = NavigationState { from };
                let navigation = self.router.navigate(&path, &nav).await;
                match navigation.outcome {
                    Outcome::Render(page) => {
                        println!("Rendering {:?}", page.kind);
                        for (name, value) in &page.params {
                            println!("  {} = {}", name, value);
                        }
                    }
                    Outcome::Redirect(target) => println!("Redirected to {}", target),
                }
                tracing::debug!(trace = ?navigation.trace, "Guard states");
            }

            ShellCommand::Sections => {
                for section in Router::sections(self.session.role().as_ref()) {
                    println!("{:<10} {}", section.label, section.path);
                }
            }

            ShellCommand::Raw {
                method,
                endpoint,
                body,
            } => {
                let method: Method = method.parse().map_err(anyhow::Error::msg)?;
                let body = body
                    .map(|b| serde_json::from_str::<Value>(&b))
                    .transpose()
                    .context("Body is not valid JSON")?;
                match client.request(&endpoint, method, body).await? {
                    Some(value) => self.print(&value)?,
                    None => println!("(no content)"),
                }
            }

            ShellCommand::Customers { action } => {
                if !self.enter("/customers").await {
                    return Ok(());
                }
                match action {
                    CustomerAction::List {
                        search,
                        active,
                        page,
                    } => {
                        let mut params = ListParams::default().page(page);
                        params.search = search;
                        params.active = active;
                        let page = api::customers::list(client, &params).await?;
                        self.print(&page.content)?;
                    }
                    CustomerAction::Show { id } => {
                        self.print(&api::customers::get(client, id).await?)?;
                    }
                    CustomerAction::Activate { id } => {
                        api::customers::set_active(client, id, true).await?;
                        println!("Customer {} activated", id);
                    }
                    CustomerAction::Deactivate { id } => {
                        api::customers::set_active(client, id, false).await?;
                        println!("Customer {} deactivated", id);
                    }
                }
            }

            ShellCommand::Leads { action } => {
                if !self.enter("/leads").await {
                    return Ok(());
                }
                match action {
                    LeadAction::List { search, page } => {
                        let mut params = ListParams::default().page(page);
                        params.search = search;
                        self.print(&api::leads::list(client, &params).await?.content)?;
                    }
                    LeadAction::Show { id } => self.print(&api::leads::get(client, id).await?)?,
                    LeadAction::Delete { id } => {
                        api::leads::soft_delete(client, id).await?;
                        println!("Lead {} deleted", id);
                    }
                }
            }

            ShellCommand::Products { action } => {
                if !self.enter("/products").await {
                    return Ok(());
                }
                match action {
                    ProductAction::List { search, page } => {
                        let mut params = ListParams::default().page(page);
                        params.search = search;
                        self.print(&api::products::list(client, &params).await?.content)?;
                    }
                    ProductAction::Show { id } => {
                        self.print(&api::products::get(client, id).await?)?
                    }
                    ProductAction::Active => self.print(&api::products::active(client).await?)?,
                }
            }

            ShellCommand::Users { action } => {
                if !self.enter("/users").await {
                    return Ok(());
                }
                match action {
                    UserAction::List { search, page } => {
                        let mut params = ListParams::default().page(page);
                        params.search = search;
                        self.print(&api::users::list(client, &params).await?.content)?;
                    }
                    UserAction::Show { id } => self.print(&api::users::get(client, id).await?)?,
                    UserAction::Deactivate { id } => {
                        api::users::deactivate(client, id).await?;
                        println!("User {} deactivated", id);
                    }
                    UserAction::Names => self.print(&api::users::names(client).await?)?,
                }
            }

            ShellCommand::Tasks { action } => match action {
                TaskAction::Board { customer } => {
                    if !self.enter(&format!("/viewCustomer/{}", customer)).await {
                        return Ok(());
                    }
                    let board = api::tasks::active_board(client, customer).await?;
                    self.print_board(&board)?;
                }
                TaskAction::Move {
                    customer,
                    from_status,
                    from_index,
                    to_status,
                    to_index,
                } => {
                    if !self.enter(&format!("/viewCustomer/{}", customer)).await {
                        return Ok(());
                    }
                    let mut board = api::tasks::active_board(client, customer).await?;
                    let result = api::tasks::move_task(
                        client,
                        &mut board,
                        customer,
                        (from_status, from_index),
                        (to_status, to_index),
                    )
                    .await;
                    self.print_board(&board)?;
                    result?;
                }
                TaskAction::Delete { id } => {
                    if !self.enter("/customers").await {
                        return Ok(());
                    }
                    api::tasks::soft_delete(client, id).await?;
                    println!("Task {} deleted", id);
                }
            },

            ShellCommand::Reminders { action } => {
                if !self.enter("/dashboard").await {
                    return Ok(());
                }
                match action {
                    ReminderAction::List => self.print(&api::reminders::list(client).await?)?,
                    ReminderAction::Delete { id } => {
                        api::reminders::delete(client, id).await?;
                        println!("Reminder {} deleted", id);
                    }
                }
            }

            ShellCommand::Dashboard => {
                if !self.enter("/dashboard").await {
                    return Ok(());
                }
                let stats = api::dashboard::stats(client).await?;
                if self.format == "json" {
                    self.print(&stats)?;
                } else {
                    println!(
                        "Leads:     {} total, {} converted ({}%)",
                        stats.total_leads,
                        stats.converted_leads,
                        stats.lead_conversion_percent()
                    );
                    println!("Tasks:     {} total, {} pending", stats.total_tasks, stats.pending_tasks());
                    println!(
                        "Products:  {} active, {} inactive",
                        stats.active_products,
                        stats.inactive_products()
                    );
                    println!("Orders:    {} total, {} active", stats.total_orders, stats.active_orders);
                    println!("Customers: +{} / -{}", stats.added_customers, stats.removed_customers);
                }
            }

            ShellCommand::Analyst { start, end, top } => {
                if !self.enter("/analyst").await {
                    return Ok(());
                }
                let mut query = api::dashboard::AnalystQuery::for_day(start);
                query.end_date = end.unwrap_or(start);
                query.top_product_limit = top;
                let report = api::dashboard::analyst_report(client, &query).await?;
                println!("{}", serde_json::to_string_pretty(&report)?);
            }

            ShellCommand::Exit => {}
        }

        Ok(())
    }

    fn print<T: Serialize + ?Sized>(&self, data: &T) -> anyhow::Result<()> {
        let value = serde_json::to_value(data)?;
        if self.format == "json" {
            println!("{}", serde_json::to_string_pretty(&value)?);
        } else {
            print!("{}", render_table(&value));
        }
        Ok(())
    }

    fn print_board(&self, board: &api::tasks::TaskBoard) -> anyhow::Result<()> {
        if self.format == "json" {
            return self.print(board);
        }
        for status in api::tasks::TaskStatus::ALL {
            println!("{}:", status);
            for (i, task) in board.column(status).iter().enumerate() {
                println!("  [{}] #{} {}", i, task.id, task.title);
            }
        }
        Ok(())
    }
}

/// Split a shell line on whitespace, honouring single and double quotes
fn split_args(line: &str) -> Result<Vec<String>, String> {
    let mut args = Vec::new();
    let mut current = String::new();
    let mut quote: Option<char> = None;
    let mut in_arg = false;

    for c in line.chars() {
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => current.push(c),
            None if c == '"' || c == '\'' => {
                quote = Some(c);
                in_arg = true;
            }
            None if c.is_whitespace() => {
                if in_arg {
                    args.push(std::mem::take(&mut current));
                    in_arg = false;
                }
            }
            None => {
                current.push(c);
                in_arg = true;
            }
        }
    }

    if quote.is_some() {
        return Err("Unterminated quote".to_string());
    }
    if in_arg {
        args.push(current);
    }
    Ok(args)
}

fn cell(value: &Value) -> String {
    match value {
        Value::Null => "-".to_string(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Objects as `key: value` lines, arrays of objects as aligned columns
fn render_table(value: &Value) -> String {
    match value {
        Value::Array(rows) if rows.is_empty() => "No results\n".to_string(),
        Value::Array(rows) => {
            let Some(Value::Object(first)) = rows.first() else {
                return rows.iter().map(|v| format!("{}\n", cell(v))).collect();
            };
            let columns: Vec<&String> = first.keys().collect();
            let grid: Vec<Vec<String>> = rows
                .iter()
                .map(|row| columns.iter().map(|c| cell(&row[c.as_str()])).collect())
                .collect();

            let widths: Vec<usize> = columns
                .iter()
                .enumerate()
                .map(|(i, c)| {
                    grid.iter()
                        .map(|r| r[i].chars().count())
                        .chain(std::iter::once(c.chars().count()))
                        .max()
                        .unwrap_or(0)
                })
                .collect();

            let line = |cells: Vec<String>| -> String {
                cells
                    .iter()
                    .zip(&widths)
                    .map(|(c, w)| format!("{:<width$}", c, width = w))
                    .collect::<Vec<_>>()
                    .join(" | ")
                    .trim_end()
                    .to_string()
            };

            let mut out = line(columns.iter().map(|c| c.to_string()).collect());
            out.push('\n');
            out.push_str(&"-".repeat(widths.iter().sum::<usize>() + 3 * widths.len().saturating_sub(1)));
            out.push('\n');
            for row in grid {
                out.push_str(&line(row));
                out.push('\n');
            }
            out
        }
        Value::Object(map) => map
            .iter()
            .map(|(k, v)| format!("{}: {}\n", k, cell(v)))
            .collect(),
        other => format!("{}\n", cell(other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_split_args_quotes() {
        assert_eq!(
            split_args(r#"raw POST customers '{"name": "Acme Ltd"}'"#).unwrap(),
            vec!["raw", "POST", "customers", r#"{"name": "Acme Ltd"}"#]
        );
        assert_eq!(split_args("  whoami  ").unwrap(), vec!["whoami"]);
        assert_eq!(split_args(r#"login a@b.c """#).unwrap(), vec!["login", "a@b.c", ""]);
        assert!(split_args("raw 'unterminated").is_err());
    }

    #[test]
    fn test_shell_line_parses() {
        let line = ShellLine::try_parse_from(["tasks", "move", "7", "PENDING", "0", "IN_PROGRESS"]).unwrap();
        match line.command {
            ShellCommand::Tasks {
                action: TaskAction::Move { to_status, to_index, .. },
            } => {
                assert_eq!(to_status, api::tasks::TaskStatus::InProgress);
                assert_eq!(to_index, 0);
            }
            _ => panic!("wrong command"),
        }

        assert!(ShellLine::try_parse_from(["customers", "show", "abc"]).is_err());
        assert!(matches!(
            ShellLine::try_parse_from(["quit"]).unwrap().command,
            ShellCommand::Exit
        ));
    }

    #[test]
    fn test_render_table() {
        let rows = json!([
            {"id": 1, "name": "Acme", "email": null},
            {"id": 22, "name": "Globex Corp", "email": "g@x.io"}
        ]);
        let table = render_table(&rows);
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[0].starts_with("email"));
        assert!(lines[2].contains("Acme"));
        assert!(lines[2].starts_with("-"));

        assert_eq!(render_table(&json!([])), "No results\n");
        assert_eq!(render_table(&json!({"a": 1})), "a: 1\n");
    }
}
