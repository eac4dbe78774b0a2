//! council - stream a deliberation session from the backend and print it.
//!
//! Nodes are printed as they arrive; the final grouped or chronological view
//! is printed once the stream ends.

mod render;

use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use council_stream::prelude::*;
use council_stream::{DEFAULT_MAX_ITERATIONS, init_observability};
use tracing::info;

#[derive(Debug, Parser)]
#[command(
    name = "council",
    version,
    about = "Stream a multi-model council session and print its progress."
)]
struct Cli {
    /// Backend base URL (defaults to http://localhost:8000)
    #[arg(long, env = "COUNCIL_API_URL", global = true)]
    base_url: Option<String>,

    /// Bearer token sent with the request
    #[arg(long, env = "COUNCIL_API_TOKEN", global = true, hide_env_values = true)]
    token: Option<String>,

    /// Print each node as a JSON line instead of text
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Start a council run
    Run {
        #[command(flatten)]
        council: CouncilArgs,

        /// Deliberation method; selects the proposal/verdict flow
        #[arg(long)]
        method: Option<String>,

        /// Critic role (repeatable)
        #[arg(long = "role")]
        roles: Vec<String>,

        /// Refinement cap for the proposal/verdict flow
        #[arg(long, default_value_t = DEFAULT_MAX_ITERATIONS)]
        max_iterations: u32,
    },

    /// Send a chat message, optionally continuing a conversation
    Chat {
        #[command(flatten)]
        council: CouncilArgs,

        /// Conversation to continue
        #[arg(long)]
        conversation: Option<String>,
    },
}

#[derive(Debug, Args)]
struct CouncilArgs {
    /// Prompt text
    #[arg(long, short = 'p')]
    prompt: String,

    /// Council member model (repeatable)
    #[arg(long = "member", short = 'm', required = true)]
    members: Vec<String>,

    /// Chairman model
    #[arg(long, short = 'c')]
    chairman: String,

    /// Previously uploaded attachment id (repeatable)
    #[arg(long = "attachment")]
    attachments: Vec<String>,
}

impl Command {
    fn into_request(self) -> StreamRequest {
        match self {
            Self::Run {
                council,
                method,
                roles,
                max_iterations,
            } => {
                let mut req = CouncilRequest::new(council.prompt, council.members, council.chairman)
                    .max_iterations(max_iterations);
                req.method = method;
                req.roles = roles;
                req.attachment_ids = council.attachments;
                req.into()
            }
            Self::Chat {
                council,
                conversation,
            } => {
                let mut req =
                    SuperChatRequest::new(council.prompt, council.members, council.chairman);
                req.conversation_id = conversation;
                req.attachment_ids = council.attachments;
                req.into()
            }
        }
    }
}

fn main() -> ExitCode {
    let _ = dotenvy::dotenv();
    init_observability();

    match try_main() {
        Ok(SessionStatus::Done) => ExitCode::SUCCESS,
        Ok(_) => ExitCode::FAILURE,
        Err(err) => {
            eprintln!("Error: {err}");
            ExitCode::FAILURE
        }
    }
}

#[tokio::main]
async fn try_main() -> Result<SessionStatus, Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = ClientConfig::from_env()?;
    if let Some(base_url) = cli.base_url {
        config = config.base_url(base_url);
    }
    if let Some(token) = cli.token {
        config = config.token(token);
    }
    let client = CouncilClient::from_config(config)?;

    let request = cli.command.into_request();
    info!(path = request.path(), "starting session");
    let mut session = client.stream(request).await;

    while let Some(event) = session.next_event().await {
        match event {
            Event::Node(node) if cli.json => println!("{}", serde_json::to_string(&node)?),
            Event::Node(node) => {
                println!("{}", render::node_header(&node));
                if let Some(content) = node.content.as_deref().filter(|c| !c.is_empty()) {
                    println!("{content}\n");
                }
            }
            Event::Error { message } => eprintln!("stream error: {message}"),
        }
    }

    let state = session.finish().await;
    if !cli.json {
        println!("\n{}", render::session_summary(&state));
    }
    Ok(state.status())
}
