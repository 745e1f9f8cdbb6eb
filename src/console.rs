//! Line-oriented terminal front end
//!
//! Turns input lines into commands and session output into plain text. It
//! only reads conversation state from [`SessionEvent`]s; all changes go
//! through the session handle.

use crate::api::{Backend, ConnectionTest, QueryClient};
use crate::conversation::{ConversationTurn, Role};
use crate::datasources::{DataSourcePanel, PanelState};
use crate::runtime::{SessionClosed, SessionEvent, SessionHandle};
use std::fmt::Write as _;
use std::io::{self, Write as _};
use thiserror::Error;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::sync::broadcast::{self, error::RecvError};

pub const GREETING: &str = "Hello! I'm your AI assistant. Ask me questions about your data and I'll generate SQL queries and provide insights.";

/// What a line of input asks for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Chat(String),
    ListSources,
    TestSource(String),
    Help,
    Quit,
    /// Slash command that needs something it did not get
    Invalid(String),
}

impl Command {
    pub fn parse(line: &str) -> Self {
        let line = line.trim();
        let Some(rest) = line.strip_prefix('/') else {
            return Command::Chat(line.to_string());
        };

        let mut parts = rest.split_whitespace();
        match (parts.next(), parts.next()) {
            (Some("sources"), None) => Command::ListSources,
            (Some("test"), Some(id)) => Command::TestSource(id.to_string()),
            (Some("test"), None) => Command::Invalid("usage: /test <id>".to_string()),
            (Some("help"), _) => Command::Help,
            (Some("quit" | "exit"), _) => Command::Quit,
            _ => Command::Invalid(format!("unknown command: {line} (try /help)")),
        }
    }
}

pub const HELP: &str = "Type a question to ask about your data.
  /sources     list data sources
  /test <id>   test a data source connection
  /quit        exit";

#[derive(Debug, Error)]
pub enum ConsoleError {
    #[error("Terminal I/O failed: {0}")]
    Io(#[from] io::Error),
    #[error(transparent)]
    Session(#[from] SessionClosed),
}

/// Drive a session from line input until the user quits or input ends
///
/// When input ends the session handle is dropped, and the loop keeps printing
/// until the runtime has answered what it accepted and closed the stream.
pub async fn run<R, W, B>(
    input: R,
    out: &mut W,
    client: &QueryClient<B>,
    session: SessionHandle,
    mut events: broadcast::Receiver<SessionEvent>,
) -> Result<(), ConsoleError>
where
    R: AsyncBufRead + Unpin,
    W: io::Write,
    B: Backend,
{
    let mut lines = input.lines();
    let mut session = Some(session);
    let mut panel = DataSourcePanel::new();

    loop {
        tokio::select! {
            line = lines.next_line(), if session.is_some() => {
                let Some(line) = line? else {
                    tracing::debug!("Input closed, waiting for the session to finish");
                    session = None;
                    continue;
                };
                let Some(handle) = &session else { continue };
                if !dispatch(Command::parse(&line), handle, client, &mut panel, out).await? {
                    break;
                }
            }
            event = events.recv() => match event {
                Ok(event) => {
                    if let Some(text) = render_event(&event) {
                        writeln!(out, "{text}")?;
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "Session output lagged");
                }
                Err(RecvError::Closed) => break,
            },
        }
    }

    Ok(())
}

/// Run one command; `false` when the user asked to quit
async fn dispatch<B, W>(
    command: Command,
    session: &SessionHandle,
    client: &QueryClient<B>,
    panel: &mut DataSourcePanel,
    out: &mut W,
) -> Result<bool, ConsoleError>
where
    B: Backend,
    W: io::Write,
{
    match command {
        // Blank lines still go through the conversation so the rejection is
        // reported the same way as any other
        Command::Chat(text) => session.submit(text).await?,
        Command::ListSources => {
            panel.load(client).await;
            writeln!(out, "{}", render_panel(panel))?;
        }
        Command::TestSource(id) => {
            if panel.sources().is_empty() {
                panel.load(client).await;
            }
            match panel.test(client, &id).await {
                Some(result) => writeln!(out, "{}", render_connection_test(&id, &result))?,
                // An unknown id means nothing when the list never loaded
                None if matches!(panel.state(), PanelState::Failed(_)) => {
                    writeln!(out, "{}", render_panel(panel))?;
                }
                None => writeln!(out, "! no data source with id {id}")?,
            }
        }
        Command::Help => writeln!(out, "{HELP}")?,
        Command::Quit => return Ok(false),
        Command::Invalid(message) => writeln!(out, "! {message}")?,
    }
    Ok(true)
}

/// Text for one session event; `None` for events with nothing to show
pub fn render_event(event: &SessionEvent) -> Option<String> {
    match event {
        SessionEvent::Init { turns } => {
            let text: Vec<String> = turns.iter().map(render_turn).collect();
            Some(text.join("\n")).filter(|t| !t.is_empty())
        }
        SessionEvent::TurnAppended { turn } if turn.role == Role::Assistant => {
            Some(render_turn(turn))
        }
        // User input is already on screen
        SessionEvent::TurnAppended { .. } => None,
        SessionEvent::StateChange { awaiting: true } => Some("Thinking...".to_string()),
        SessionEvent::StateChange { awaiting: false } => None,
        SessionEvent::Rejected { reason } => Some(format!("! {reason}")),
    }
}

pub fn render_turn(turn: &ConversationTurn) -> String {
    let mut out = String::new();
    let who = match turn.role {
        Role::User => "you",
        Role::Assistant => "assistant",
    };
    let _ = write!(out, "[{}] {who}:", turn.created_at.format("%H:%M:%S"));
    if !turn.text.is_empty() {
        let _ = write!(out, " {}", turn.text);
    }
    if let Some(error) = &turn.error_message {
        let _ = write!(out, "\n  error: {error}");
    }
    if let Some(sql) = &turn.generated_query {
        let _ = write!(out, "\n  sql: {sql}");
    }

    let columns = turn.columns();
    if !columns.is_empty() {
        let _ = write!(out, "\n  {}", columns.join(" | "));
        for row in turn.table() {
            let _ = write!(out, "\n  {}", row.join(" | "));
        }
    }
    out
}

pub fn render_panel(panel: &DataSourcePanel) -> String {
    match panel.state() {
        PanelState::Loading => "Loading data sources...".to_string(),
        PanelState::Failed(message) => format!("! {message}"),
        PanelState::Loaded(sources) if sources.is_empty() => {
            "No data sources configured yet.".to_string()
        }
        PanelState::Loaded(sources) => sources
            .iter()
            .map(|s| {
                format!(
                    "{} {} ({}) {} {}:{}/{} [{}]",
                    s.status.badge().marker(),
                    s.id,
                    s.kind,
                    s.name,
                    s.host,
                    s.port,
                    s.database,
                    s.status
                )
            })
            .collect::<Vec<_>>()
            .join("\n"),
    }
}

pub fn render_connection_test(id: &str, result: &ConnectionTest) -> String {
    let verdict = if result.success { "ok" } else { "failed" };
    format!("{id}: {verdict} - {}", result.message)
}
