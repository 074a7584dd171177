//! CLI commands

use anyhow::{Context as _, Result, bail};
use bytes::Bytes;
use chrono::{Local, Utc};
use clap::Subcommand;
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use taskdash_core::ml::{BatchCompletionTimeRequest, CompletionTimeRequest, PriorityRequest};
use taskdash_core::{
    RegisterRequest, Task, TaskCreate, TaskId, TaskStats, TaskStatus, TaskUpdate, User,
    UserUpdate, days_until_due, priority_label_to_value, require_due_instant,
};
use taskdash_http::{ApiClient, ConsentState, CookieConsent, FileCookieJar, ListTasksQuery};
use tracing::{debug, info};

use crate::config::DashboardConfig;
use crate::output;

#[derive(Subcommand)]
pub enum Commands {
    /// Sign in and store the session
    Login {
        username: String,

        /// Password (prompted on stdin when omitted)
        #[arg(long, env = "TASKDASH_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },

    /// Create an account
    Register {
        username: String,

        #[arg(long)]
        email: String,

        /// Password (prompted on stdin when omitted)
        #[arg(long, env = "TASKDASH_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },

    /// Sign out and forget the stored session
    Logout,

    /// Show the signed-in user
    Whoami,

    /// Revoke every session of the signed-in user
    RevokeAll,

    /// Profile, password and linked accounts
    Account {
        #[command(subcommand)]
        command: AccountCommands,
    },

    /// Sign in through an OAuth provider
    Oauth {
        #[command(subcommand)]
        command: OAuthCommands,
    },

    /// Task operations
    Tasks {
        #[command(subcommand)]
        command: TaskCommands,
    },

    /// ML predictions
    Ml {
        #[command(subcommand)]
        command: MlCommands,
    },

    /// Cookie consent
    Consent {
        #[command(subcommand)]
        command: ConsentCommands,
    },
}

#[derive(Subcommand)]
pub enum OAuthCommands {
    /// List configured providers
    Providers,

    /// Print the URL that starts the flow for a provider
    Url { provider: String },

    /// Finish sign-in with the URL the provider redirected to
    Callback { url: String },
}

#[derive(Subcommand)]
pub enum AccountCommands {
    /// Show the profile
    Show,

    /// Change profile fields; unchanged values are not sent
    Update {
        #[arg(long)]
        username: Option<String>,

        #[arg(long)]
        email: Option<String>,

        /// Full name (pass an empty string to clear it)
        #[arg(long)]
        full_name: Option<String>,
    },

    /// Change the password
    Password {
        #[arg(long, env = "TASKDASH_PASSWORD", hide_env_values = true)]
        current: Option<String>,

        #[arg(long, env = "TASKDASH_NEW_PASSWORD", hide_env_values = true)]
        new: Option<String>,
    },

    /// Set a password on an account created through OAuth
    SetPassword {
        #[arg(long, env = "TASKDASH_NEW_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },

    /// List linked OAuth accounts
    Linked,

    /// Print the URL that links a provider to this account
    Link { provider: String },

    /// Detach the linked OAuth account
    Unlink,
}

#[derive(Subcommand)]
pub enum TaskCommands {
    /// List tasks
    List {
        #[arg(long)]
        status: Option<TaskStatus>,

        #[arg(long)]
        skip: Option<u32>,

        #[arg(long)]
        limit: Option<u32>,

        /// Print raw JSON
        #[arg(long)]
        json: bool,
    },

    /// Show one task
    Show {
        id: TaskId,

        /// Print raw JSON
        #[arg(long)]
        json: bool,
    },

    /// Create a task
    Create {
        title: String,

        #[arg(long)]
        description: Option<String>,

        /// low, medium or high
        #[arg(long, default_value = "medium")]
        priority: String,

        /// Due date, e.g. 2026-03-01 or 2026-03-01T17:00
        #[arg(long)]
        due: Option<String>,

        #[arg(long)]
        status: Option<TaskStatus>,
    },

    /// Change fields of a task
    Update {
        id: TaskId,

        #[arg(long)]
        title: Option<String>,

        #[arg(long)]
        description: Option<String>,

        /// low, medium or high
        #[arg(long)]
        priority: Option<String>,

        #[arg(long)]
        due: Option<String>,

        #[arg(long)]
        status: Option<TaskStatus>,
    },

    /// Delete a task
    Delete { id: TaskId },

    /// Move a task to its next status
    Advance { id: TaskId },

    /// Give a task a new due date, resending its other fields
    Reschedule {
        id: TaskId,

        #[arg(long)]
        due: String,
    },

    /// Export all tasks as CSV
    Export {
        /// Output file (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Import tasks from a CSV file
    Import { file: PathBuf },

    /// Summary counts
    Stats,
}

#[derive(Subcommand)]
pub enum MlCommands {
    /// Model-serving health
    Health,

    /// Estimate completion time in hours
    CompletionTime {
        /// Take description length, priority, due date and status from a stored task
        #[arg(long, conflicts_with_all = ["description_length", "priority", "due", "status"])]
        task: Option<TaskId>,

        #[arg(long, default_value_t = 100)]
        description_length: u32,

        /// low, medium or high
        #[arg(long, default_value = "medium")]
        priority: String,

        #[arg(long, default_value_t = 1)]
        experience: u32,

        #[arg(long)]
        complex: bool,

        #[arg(long)]
        due: Option<String>,

        #[arg(long)]
        status: Option<TaskStatus>,
    },

    /// Suggest a priority for a task description
    Priority {
        #[arg(required_unless_present = "task")]
        text: Option<String>,

        /// Ask about a stored task instead of free text
        #[arg(long, conflicts_with_all = ["text", "due", "status"])]
        task: Option<TaskId>,

        #[arg(long)]
        due: Option<String>,

        #[arg(long)]
        status: Option<TaskStatus>,
    },

    /// Batch completion-time estimate from a JSON file (`{"tasks": [...]}`)
    Batch { file: PathBuf },
}

#[derive(Subcommand)]
pub enum ConsentCommands {
    /// Show the stored consent
    Status,

    /// Accept cookies (remembered for a year)
    Accept,

    /// Decline cookies (not remembered)
    Decline,
}

/// Everything a command needs
struct Context {
    client: ApiClient,
    cookies: Arc<FileCookieJar>,
}

impl Context {
    fn new(config: &DashboardConfig) -> Result<Self> {
        let cookie_path = config.cookie_path();
        let cookies = Arc::new(
            FileCookieJar::open(&cookie_path)
                .with_context(|| format!("failed to open cookie jar {}", cookie_path.display()))?,
        );

        let mut builder = ApiClient::builder()
            .base_url(&config.api.base_url)
            .cookie_store(cookies.clone());
        if let Some(timeout) = config.timeout() {
            builder = builder.timeout(timeout);
        }
        if let Some(agent) = &config.api.user_agent {
            builder = builder.user_agent(agent);
        }

        debug!(cookie_jar = %cookie_path.display(), "client ready");
        Ok(Self {
            client: builder.build()?,
            cookies,
        })
    }
}

impl Commands {
    pub async fn execute(self, config: &DashboardConfig) -> Result<()> {
        let ctx = Context::new(config)?;

        match self {
            Self::Login { username, password } => {
                let password = password_or_prompt(password)?;
                ctx.client.login(&username, &password).await?;
                println!("Signed in as {username}");
                Ok(())
            }
            Self::Register {
                username,
                email,
                password,
            } => {
                let password = password_or_prompt(password)?;
                let user = ctx
                    .client
                    .register(&RegisterRequest {
                        username,
                        email,
                        password,
                    })
                    .await?;
                println!("Registered {} <{}>; sign in with `taskdash login`", user.username, user.email);
                Ok(())
            }
            Self::Logout => {
                ctx.client.logout().await;
                println!("Signed out");
                Ok(())
            }
            Self::Whoami => {
                let user = ctx.client.me().await?;
                println!("{}", user_line(&user));
                Ok(())
            }
            Self::RevokeAll => {
                ctx.client.revoke_all_sessions().await?;
                println!("All sessions revoked");
                Ok(())
            }
            Self::Account { command } => command.execute(&ctx).await,
            Self::Oauth { command } => command.execute(&ctx).await,
            Self::Tasks { command } => command.execute(&ctx).await,
            Self::Ml { command } => command.execute(&ctx).await,
            Self::Consent { command } => {
                command.execute(&ctx);
                Ok(())
            }
        }
    }
}

impl OAuthCommands {
    async fn execute(self, ctx: &Context) -> Result<()> {
        match self {
            Self::Providers => {
                let providers = ctx.client.oauth_providers().await?;
                if providers.providers.is_empty() {
                    println!("No OAuth providers configured");
                }
                for provider in providers.providers {
                    println!("{provider}");
                }
            }
            Self::Url { provider } => println!("{}", ctx.client.oauth_authorize_url(&provider)),
            Self::Callback { url } => {
                ctx.client.complete_oauth(&url)?;
                println!("Signed in");
            }
        }
        Ok(())
    }
}

impl AccountCommands {
    async fn execute(self, ctx: &Context) -> Result<()> {
        let client = &ctx.client;

        match self {
            Self::Show => {
                let user = client.me().await?;
                println!("{}", user_line(&user));
                if let Some(provider) = &user.oauth_provider {
                    println!("Connected via {provider}");
                }
                if !user.has_password {
                    println!("No password set; use `taskdash account set-password`");
                }
            }
            Self::Update {
                username,
                email,
                full_name,
            } => {
                let current = client.me().await?;
                let update = UserUpdate::changes(&current, username, email, full_name);
                if update.is_empty() {
                    println!("No changes to save");
                    return Ok(());
                }
                let user = client.update_profile(&update).await?;
                println!("Updated {}", user_line(&user));
            }
            Self::Password { current, new } => {
                let current = password_or_prompt(current)?;
                let new = new_password(new)?;
                client
                    .update_profile(&UserUpdate::password(current, new))
                    .await?;
                println!("Password changed");
            }
            Self::SetPassword { password } => {
                let password = new_password(password)?;
                client.set_password(&password).await?;
                println!("Password set; you can now sign in with `taskdash login`");
            }
            Self::Linked => {
                let accounts = client.linked_accounts().await?;
                if accounts.is_empty() {
                    println!("No linked accounts");
                }
                for account in accounts {
                    match account.email {
                        Some(email) => println!("{} ({email})", account.provider),
                        None => println!("{}", account.provider),
                    }
                }
            }
            Self::Link { provider } => println!("{}", client.link_oauth_url(&provider).await?),
            Self::Unlink => {
                client.unlink_oauth().await?;
                println!("OAuth account unlinked");
            }
        }
        Ok(())
    }
}

impl TaskCommands {
    async fn execute(self, ctx: &Context) -> Result<()> {
        let client = &ctx.client;
        let now = Utc::now();

        match self {
            Self::List {
                status,
                skip,
                limit,
                json,
            } => {
                let tasks = client
                    .list_tasks(&ListTasksQuery {
                        skip,
                        limit,
                        status,
                    })
                    .await?;
                if json {
                    println!("{}", serde_json::to_string_pretty(&tasks)?);
                } else if tasks.is_empty() {
                    println!("No tasks");
                } else {
                    for task in &tasks {
                        println!("{}", output::task_line(task, now));
                    }
                }
            }
            Self::Show { id, json } => {
                let task = client.get_task(id).await?;
                if json {
                    println!("{}", serde_json::to_string_pretty(&task)?);
                } else {
                    println!("{}", output::task_detail(&task, now));
                }
            }
            Self::Create {
                title,
                description,
                priority,
                due,
                status,
            } => {
                let task = client
                    .create_task(&TaskCreate {
                        title,
                        description,
                        priority: priority_label_to_value(&priority),
                        due_date: checked_due(due)?,
                        status,
                    })
                    .await?;
                println!("Created {}", output::task_line(&task, now));
            }
            Self::Update {
                id,
                title,
                description,
                priority,
                due,
                status,
            } => {
                let update = TaskUpdate {
                    title,
                    description,
                    priority: priority.as_deref().map(priority_label_to_value),
                    due_date: checked_due(due)?,
                    status,
                };
                if update.is_empty() {
                    bail!("nothing to update; pass at least one field");
                }
                let task = client.update_task(id, &update).await?;
                println!("Updated {}", output::task_line(&task, now));
            }
            Self::Delete { id } => {
                client.delete_task(id).await?;
                println!("Deleted task #{id}");
            }
            Self::Advance { id } => {
                let task = client.get_task(id).await?;
                let Some(next) = task.status.next() else {
                    println!("Task #{id} is already {}", task.status.label());
                    return Ok(());
                };
                let task = client.update_task(id, &TaskUpdate::status(next)).await?;
                println!("{}", output::task_line(&task, now));
            }
            Self::Reschedule { id, due } => {
                let task = client.get_task(id).await?;
                let update = TaskUpdate {
                    due_date: checked_due(Some(due))?,
                    ..task.retask()
                };
                let task = client.update_task(id, &update).await?;
                println!("Rescheduled {}", output::task_line(&task, now));
            }
            Self::Export { output } => {
                let csv = client.export_tasks_csv().await?;
                match output {
                    Some(path) => {
                        std::fs::write(&path, &csv)
                            .with_context(|| format!("failed to write {}", path.display()))?;
                        info!(path = %path.display(), bytes = csv.len(), "exported tasks");
                        println!("Exported tasks to {}", path.display());
                    }
                    None => std::io::stdout().write_all(&csv)?,
                }
            }
            Self::Import { file } => {
                let contents = std::fs::read(&file)
                    .with_context(|| format!("failed to read {}", file.display()))?;
                let summary = client
                    .import_tasks_csv(&upload_name(&file), Bytes::from(contents))
                    .await?;
                println!("Imported {} tasks", summary.imported);
            }
            Self::Stats => {
                let tasks = client.list_tasks(&ListTasksQuery::default()).await?;
                println!("{}", output::stats_block(&TaskStats::from_tasks(&tasks, now)));
            }
        }
        Ok(())
    }
}

impl MlCommands {
    async fn execute(self, ctx: &Context) -> Result<()> {
        let client = &ctx.client;

        match self {
            Self::Health => {
                let health = client.ml_health().await?;
                let models = if health.models_loaded {
                    "models loaded"
                } else {
                    "models not loaded"
                };
                println!("{} ({models})", health.status);
            }
            Self::CompletionTime {
                task,
                description_length,
                priority,
                experience,
                complex,
                due,
                status,
            } => {
                let request = match stored_task(client, task).await? {
                    Some(task) => CompletionTimeRequest::for_task(
                        &task,
                        experience,
                        complex,
                        Local::now().date_naive(),
                    ),
                    None => CompletionTimeRequest {
                        description_length,
                        priority: priority_label_to_value(&priority),
                        user_experience: experience,
                        is_complex: complex,
                        days_until_due: due_in_days(due)?,
                        status,
                    },
                };
                debug!(?request, "predicting completion time");
                let prediction = client.predict_completion_time(&request).await?;
                println!("Estimated {:.1} hours", prediction.predicted_hours);
            }
            Self::Priority {
                text,
                task,
                due,
                status,
            } => {
                let request = match stored_task(client, task).await? {
                    Some(task) => PriorityRequest::for_task(&task, Local::now().date_naive()),
                    None => PriorityRequest {
                        text: text.context("pass the text to rate or --task <id>")?,
                        days_until_due: due_in_days(due)?,
                        status,
                    },
                };
                let prediction = client.predict_priority(&request).await?;
                println!(
                    "Suggested priority: {} ({:.0}% confidence)",
                    prediction.priority().badge().label,
                    prediction.suggested_confidence() * 100.0
                );
            }
            Self::Batch { file } => {
                let contents = std::fs::read_to_string(&file)
                    .with_context(|| format!("failed to read {}", file.display()))?;
                let request: BatchCompletionTimeRequest = serde_json::from_str(&contents)
                    .with_context(|| format!("{} is not a batch request", file.display()))?;
                let prediction = client.predict_batch(&request).await?;
                for (index, hours) in prediction.predictions.iter().enumerate() {
                    println!("task {}: {hours:.1} hours", index + 1);
                }
                println!("total: {:.1} hours", prediction.total_predicted_hours);
            }
        }
        Ok(())
    }
}

impl ConsentCommands {
    fn execute(self, ctx: &Context) {
        let consent = CookieConsent::new(ctx.cookies.clone());
        match self {
            Self::Status => match consent.state() {
                ConsentState::Accepted => println!("Cookies accepted"),
                ConsentState::Declined => println!("Cookies declined"),
                ConsentState::Unset => println!("Not answered yet"),
            },
            Self::Accept => {
                consent.record(true);
                println!("Cookies accepted");
            }
            Self::Decline => {
                consent.record(false);
                println!("Cookies declined for this run; you will be asked again");
            }
        }
    }
}

fn password_or_prompt(password: Option<String>) -> Result<String> {
    if let Some(password) = password {
        return Ok(password);
    }

    eprint!("Password: ");
    std::io::stderr().flush()?;
    let mut line = String::new();
    std::io::stdin().lock().read_line(&mut line)?;
    let password = line.trim_end_matches(['\r', '\n']).to_string();
    if password.is_empty() {
        bail!("a password is required");
    }
    Ok(password)
}

/// Prompt for a new password twice; both entries must match
fn new_password(password: Option<String>) -> Result<String> {
    if let Some(password) = password {
        return checked_new_password(&password, &password);
    }

    eprintln!("New password");
    let first = password_or_prompt(None)?;
    eprintln!("Confirm new password");
    let second = password_or_prompt(None)?;
    checked_new_password(&first, &second)
}

const MIN_PASSWORD_LEN: usize = 6;

fn checked_new_password(password: &str, confirmation: &str) -> Result<String> {
    if password != confirmation {
        bail!("passwords do not match");
    }
    if password.chars().count() < MIN_PASSWORD_LEN {
        bail!("password must be at least {MIN_PASSWORD_LEN} characters");
    }
    Ok(password.to_string())
}

fn user_line(user: &User) -> String {
    match user.full_name.as_deref().filter(|name| !name.is_empty()) {
        Some(name) => format!("{name} ({}) <{}> (id {})", user.username, user.email, user.id),
        None => format!("{} <{}> (id {})", user.username, user.email, user.id),
    }
}

async fn stored_task(client: &ApiClient, id: Option<TaskId>) -> Result<Option<Task>> {
    match id {
        Some(id) => Ok(Some(
            client
                .get_task(id)
                .await
                .with_context(|| format!("failed to load task #{id}"))?,
        )),
        None => Ok(None),
    }
}

/// Reject due dates the dashboard could not show
fn checked_due(due: Option<String>) -> Result<Option<String>> {
    if let Some(due) = &due {
        require_due_instant(due)?;
    }
    Ok(due)
}

fn due_in_days(due: Option<String>) -> Result<Option<u32>> {
    Ok(days_until_due(checked_due(due)?.as_deref()))
}

fn upload_name(path: &Path) -> String {
    path.file_name()
        .map_or_else(|| "tasks.csv".to_string(), |name| name.to_string_lossy().into_owned())
}
