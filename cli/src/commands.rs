//! Subcommand definitions and their execution against a [`Client`].

use std::io::{self, BufRead, Write};

use anyhow::{Context, Result, bail};
use clap::{Args, Subcommand};
use serde::Serialize;
use serde_json::json;
use studioflow_client::Client;
use studioflow_types::{
    ApprovalAction, NewPost, PostFilter, PostId, PostPatch, SignupRequest,
    VaultContents, VaultKeySet,
};

#[derive(Subcommand)]
pub enum Command {
    /// Log in and store the session token
    Login {
        /// Email address
        #[arg(long, short)]
        username: String,
        /// Password (read from stdin when omitted)
        #[arg(long)]
        password: Option<String>,
    },
    /// Create an account
    Signup {
        #[arg(long)]
        email: String,
        #[arg(long)]
        full_name: String,
        /// Password (read from stdin when omitted)
        #[arg(long)]
        password: Option<String>,
        /// e.g. "Professional", "Witty"
        #[arg(long)]
        brand_voice: Option<String>,
    },
    /// End the session
    Logout,
    /// Show the logged-in profile
    Whoami,
    /// Manage posts
    Posts {
        #[command(subcommand)]
        command: PostsCommand,
    },
    /// Show scheduled content
    Schedule,
    /// Manage provider keys and the knowledge vault
    Vault {
        #[command(subcommand)]
        command: VaultCommand,
    },
    /// Drive the drafting agent
    Agent {
        #[command(subcommand)]
        command: AgentCommand,
    },
    /// Print the authorization URL for linking a social account
    SocialLink {
        /// e.g. twitter, linkedin
        platform: String,
    },
    /// List linked social accounts
    SocialAccounts,
}

#[derive(Subcommand)]
pub enum PostsCommand {
    List {
        /// Only posts with this status (e.g. pending_approval)
        #[arg(long)]
        status: Option<String>,
    },
    Get {
        id: PostId,
    },
    Create {
        content: String,
        #[arg(long, default_value = "twitter")]
        platform: String,
        /// ISO-8601 timestamp
        #[arg(long)]
        schedule: Option<String>,
    },
    Update {
        id: PostId,
        #[command(flatten)]
        patch: PatchArgs,
    },
    Delete {
        id: PostId,
    },
}

#[derive(Args)]
pub struct PatchArgs {
    #[arg(long)]
    content: Option<String>,
    #[arg(long)]
    status: Option<String>,
    #[arg(long)]
    schedule: Option<String>,
}

#[derive(Subcommand)]
pub enum VaultCommand {
    /// List stored keys or knowledge entries
    Keys,
    /// Store provider keys, given as NAME=VALUE
    Set {
        #[arg(required = true, value_parser = parse_key_value)]
        keys: Vec<(String, String)>,
    },
    /// Add a knowledge snippet
    Add { content: String },
    /// Semantic search over stored knowledge
    Search {
        query: String,
        #[arg(long)]
        limit: Option<u32>,
    },
}

#[derive(Subcommand)]
pub enum AgentCommand {
    /// Start a drafting workflow
    Run {
        input: String,
        /// Model provider (default: gemini)
        #[arg(long)]
        provider: Option<String>,
    },
    Status {
        thread_id: String,
    },
    /// Approve (or with --reject, reject) a paused draft
    Approve {
        thread_id: String,
        #[arg(long)]
        reject: bool,
    },
    /// Ask the brand assistant a question
    Chat { message: String },
}

fn parse_key_value(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((name, value)) if !name.trim().is_empty() => {
            Ok((name.trim().to_string(), value.to_string()))
        }
        _ => Err(format!("expected NAME=VALUE, got '{raw}'")),
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    let rendered = serde_json::to_string_pretty(value).context("failed to render output")?;
    println!("{rendered}");
    Ok(())
}

fn read_password(provided: Option<String>) -> Result<String> {
    if let Some(password) = provided {
        return Ok(password);
    }
    eprint!("Password: ");
    io::stderr().flush().ok();
    let mut line = String::new();
    io::stdin()
        .lock()
        .read_line(&mut line)
        .context("failed to read password from stdin")?;
    let password = line.trim_end_matches(['\r', '\n']).to_string();
    if password.is_empty() {
        bail!("password must not be empty");
    }
    Ok(password)
}

pub async fn execute(client: &Client, command: Command) -> Result<()> {
    match command {
        Command::Login { username, password } => {
            let password = read_password(password)?;
            client.auth().login(&username, &password).await?;
            print_json(&json!({ "status": "logged_in" }))
        }
        Command::Signup {
            email,
            full_name,
            password,
            brand_voice,
        } => {
            let password = read_password(password)?;
            let mut request = SignupRequest::new(email, password, full_name);
            if let Some(style) = brand_voice {
                request = request.with_brand_voice_style(style);
            }
            print_json(&client.auth().signup(&request).await?)
        }
        Command::Logout => {
            client.auth().logout().await;
            print_json(&json!({ "status": "logged_out" }))
        }
        Command::Whoami => print_json(&client.auth().current_user().await?),
        Command::Posts { command } => posts(client, command).await,
        Command::Schedule => print_json(&client.calendar().schedule().await?),
        Command::Vault { command } => vault(client, command).await,
        Command::Agent { command } => agent(client, command).await,
        Command::SocialLink { platform } => {
            print_json(&client.auth().social_link(&platform).await?)
        }
        Command::SocialAccounts => {
            let accounts = client.auth().linked_accounts().await?;
            // Provider tokens stay out of terminal scrollback.
            let summary: Vec<_> = accounts
                .iter()
                .map(|a| json!({ "id": a.id, "platform": a.platform, "profile_name": a.profile_name }))
                .collect();
            print_json(&summary)
        }
    }
}

async fn posts(client: &Client, command: PostsCommand) -> Result<()> {
    let posts = client.posts();
    match command {
        PostsCommand::List { status } => {
            let filter = status.map_or_else(PostFilter::all, PostFilter::with_status);
            print_json(&posts.list(&filter).await?)
        }
        PostsCommand::Get { id } => print_json(&posts.get(id).await?),
        PostsCommand::Create {
            content,
            platform,
            schedule,
        } => {
            let mut post = NewPost::new(content).on_platform(platform);
            if let Some(when) = schedule {
                post = post.scheduled_for(when);
            }
            print_json(&posts.create(&post).await?)
        }
        PostsCommand::Update { id, patch } => {
            let patch = PostPatch {
                content: patch.content,
                status: patch.status,
                scheduled_for: patch.schedule,
            };
            if patch.is_empty() {
                bail!("nothing to update; pass --content, --status or --schedule");
            }
            print_json(&posts.update(id, &patch).await?)
        }
        PostsCommand::Delete { id } => {
            posts.delete(id).await?;
            print_json(&json!({ "deleted": id }))
        }
    }
}

async fn vault(client: &Client, command: VaultCommand) -> Result<()> {
    let vault = client.vault();
    match command {
        VaultCommand::Keys => match vault.keys().await? {
            // Values stay out of terminal scrollback.
            VaultContents::Keys(keys) => print_json(&keys.names().collect::<Vec<_>>()),
            entries @ VaultContents::Entries(_) => print_json(&entries),
        },
        VaultCommand::Set { keys } => {
            let mut set = VaultKeySet::new();
            for (name, value) in keys {
                set.insert(name, value);
            }
            print_json(&vault.update_keys(&set).await?)
        }
        VaultCommand::Add { content } => print_json(&vault.add(&content).await?),
        VaultCommand::Search { query, limit } => print_json(&vault.search(&query, limit).await?),
    }
}

async fn agent(client: &Client, command: AgentCommand) -> Result<()> {
    let agent = client.agent();
    match command {
        AgentCommand::Run { input, provider } => {
            print_json(&agent.run(&input, provider.as_deref()).await?)
        }
        AgentCommand::Status { thread_id } => print_json(&agent.status(&thread_id).await?),
        AgentCommand::Approve { thread_id, reject } => {
            let action = if reject {
                ApprovalAction::Reject
            } else {
                ApprovalAction::Approve
            };
            print_json(&agent.approve(&thread_id, action).await?)
        }
        AgentCommand::Chat { message } => print_json(&agent.chat(&message, &[]).await?),
    }
}
