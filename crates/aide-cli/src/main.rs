//! aide - conversational task refinement in the terminal
//!
//! A thin line-based host over the aide-chat coordinator: free text starts a
//! refinement conversation, numbered input picks a suggested answer, and
//! slash commands drive the proposal (`/toggle N`, `/confirm`, `/cancel`).

mod config;

use std::sync::Arc;

use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};

use aide_api::{RefineClient, TaskClient};
use aide_chat::{
    ChatConfig, ChatMessage, Completion, ConversationCoordinator, HttpCompletion, HttpTaskStore,
    MemoryTaskStore, MessageKind, Role, TaskStore,
};

/// aide - conversational task refinement
#[derive(Parser, Debug)]
#[command(name = "aide")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Base URL of the completion collaborator
    #[arg(long)]
    api_url: Option<String>,

    /// Base URL of the task persistence collaborator (defaults to --api-url)
    #[arg(long)]
    tasks_url: Option<String>,

    /// Organization created records belong to
    #[arg(short, long)]
    organization: Option<String>,

    /// Optional project for created subtasks
    #[arg(short, long)]
    project: Option<String>,

    /// Keep created tasks in memory instead of persisting them
    #[arg(long)]
    dry_run: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Initialize config file
    #[arg(long)]
    init_config: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    if args.verbose {
        tracing_subscriber::fmt()
            .with_env_filter("aide=debug")
            .init();
    }

    if args.init_config {
        let path = config::Config::config_path();
        config::Config::default().save()?;
        println!("Config file created at: {}", path.display());
        println!("\nExample config:\n{}", config::example_config());
        return Ok(());
    }

    let cfg = config::Config::load();

    // CLI args take precedence over the config file.
    let api_url = args
        .api_url
        .or(cfg.api_url.clone())
        .unwrap_or_else(|| "http://localhost:3000".to_string());
    let tasks_url = args
        .tasks_url
        .or(cfg.tasks_url.clone())
        .unwrap_or_else(|| api_url.clone());
    let organization = args
        .organization
        .or(cfg.organization_id.clone())
        .unwrap_or_else(|| "default".to_string());
    let api_key = std::env::var("AIDE_API_KEY").ok().or(cfg.api_key.clone());

    let mut refine = RefineClient::new(&api_url);
    if let Some(ref key) = api_key {
        refine = refine.with_api_key(key);
    }
    let completion: Arc<dyn Completion> = Arc::new(HttpCompletion::new(refine));

    let store: Arc<dyn TaskStore> = if args.dry_run {
        Arc::new(MemoryTaskStore::new())
    } else {
        let mut tasks = TaskClient::new(&tasks_url);
        if let Some(ref key) = api_key {
            tasks = tasks.with_api_key(key);
        }
        Arc::new(HttpTaskStore::new(tasks))
    };

    let mut chat_config = ChatConfig::new(organization);
    chat_config.project_id = args.project.or(cfg.project_id.clone());

    let mut coordinator = ConversationCoordinator::new(chat_config, completion, store);

    println!("aide - describe a task to get started.");
    println!("Commands: /toggle N, /confirm, /cancel, /quit\n");

    let mut rendered = 0;
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    print!("> ");
    flush();

    while let Some(line) = lines.next_line().await? {
        let input = line.trim().to_string();

        match input.as_str() {
            "" => {}
            "/quit" | "/exit" => break,
            "/cancel" => coordinator.cancel(),
            "/confirm" => {
                if let Some(outcome) = coordinator.confirm_selection().await? {
                    tracing::debug!(task_id = %outcome.task_id, "plan applied");
                } else {
                    println!("(nothing to confirm - select at least one subtask first)");
                }
            }
            _ => {
                if let Some(rest) = input.strip_prefix("/toggle ") {
                    match rest.trim().parse::<usize>() {
                        Ok(n) if n >= 1 => {
                            coordinator.toggle_subtask(n - 1);
                            render_proposal(&coordinator);
                        }
                        _ => println!("(usage: /toggle N)"),
                    }
                } else if let Ok(n) = input.parse::<usize>() {
                    pick_option(&mut coordinator, n).await?;
                } else {
                    coordinator.submit_free_text(&input).await?;
                }
            }
        }

        rendered = render_new(&coordinator, rendered);
        print!("> ");
        flush();
    }

    Ok(())
}

/// Select option `n` (1-based) on the most recent unresolved question.
async fn pick_option(coordinator: &mut ConversationCoordinator, n: usize) -> anyhow::Result<()> {
    let target = coordinator
        .messages()
        .iter()
        .rev()
        .find(|m| m.kind == MessageKind::Options && !m.is_resolved())
        .map(|m| m.id);

    match target {
        Some(id) if n >= 1 => coordinator.select_option(id, n - 1).await?,
        _ => println!("(no open question - type your message instead)"),
    }
    Ok(())
}

/// Print messages appended since the last render; returns the new watermark.
fn render_new(coordinator: &ConversationCoordinator, rendered: usize) -> usize {
    let messages = coordinator.messages();
    for message in &messages[rendered..] {
        render_message(coordinator, message);
    }
    messages.len()
}

fn render_message(coordinator: &ConversationCoordinator, message: &ChatMessage) {
    match message.role {
        Role::User => println!("you: {}", message.text),
        Role::Assistant => {
            println!("aide: {}", message.text);
            match message.kind {
                MessageKind::Options => {
                    for (i, option) in message.options.iter().enumerate() {
                        println!("  {}. {} - {}", i + 1, option.label, option.description);
                    }
                }
                MessageKind::SubtaskSelect => render_proposal(coordinator),
                MessageKind::Text => {}
            }
        }
    }
}

fn render_proposal(coordinator: &ConversationCoordinator) {
    let Some(proposal) = coordinator.proposal() else {
        return;
    };
    println!(
        "  {} ({}, ~{} min)",
        proposal.title, proposal.priority, proposal.estimated_minutes
    );
    for (i, subtask) in proposal.subtasks.iter().enumerate() {
        let mark = if coordinator.selection().contains(&i) { "x" } else { " " };
        let auto = if subtask.can_automate { " (automatable)" } else { "" };
        println!("  [{}] {}. {}{}", mark, i + 1, subtask.title, auto);
    }
}

fn flush() {
    use std::io::Write;
    let _ = std::io::stdout().flush();
}
