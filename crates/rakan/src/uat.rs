// SPDX-FileCopyrightText: 2026 Rakan Tani Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `rakan uat` command implementation.
//!
//! Opens the access packet, connects as the farmer, and runs an
//! interactive shell. Readline runs on its own thread; the main task
//! multiplexes typed lines with session updates so replies print as
//! soon as they arrive.

use std::sync::Arc;

use clap::Args;
use colored::Colorize;
use rakan_config::RakanConfig;
use rakan_core::{ConnectionState, Notice, RakanError, Transport};
use rakan_identity::{IdentityContext, link_params, parse_session_id};
use rakan_mqtt::{ClientSettings, MqttTransport};
use rakan_router::{SessionSettings, UatSession, Verdict, sent_at};
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::{establish, packet_key};

#[derive(Args, Debug)]
#[group(required = true, multiple = false)]
pub struct UatArgs {
    /// Access link carrying `packet` (and optionally `sessionId`).
    #[arg(long)]
    pub link: Option<String>,
    /// Sealed access packet, as found in the link.
    #[arg(long)]
    pub packet: Option<String>,
}

/// One line of shell input.
#[derive(Debug, Clone, PartialEq)]
pub enum ShellCommand {
    Send(String),
    Schedule,
    Day(i64),
    Feedback {
        /// Zero-based reply index.
        index: usize,
        verdict: Verdict,
        text: String,
        ideal: String,
    },
    Help,
    Quit,
    Invalid(String),
}

const HELP: &str = "\
  <text>                     send a message
  /schedule                  show the farmer schedule
  /day <hlt>                 move the current day
  /good <n> [text]           rate reply n as helpful
  /bad <n> [text] [| ideal]  rate reply n as unhelpful
  /quit                      exit";

fn parse_feedback(rest: &str, verdict: Verdict) -> ShellCommand {
    let (number, text) = rest.split_once(' ').unwrap_or((rest, ""));
    let Some(index) = number.parse::<usize>().ok().and_then(|n| n.checked_sub(1)) else {
        return ShellCommand::Invalid(format!("expected a reply number, got {number:?}"));
    };
    let (text, ideal) = match verdict {
        Verdict::Good => (text, ""),
        Verdict::Bad => text.split_once('|').unwrap_or((text, "")),
    };
    ShellCommand::Feedback {
        index,
        verdict,
        text: text.trim().to_string(),
        ideal: ideal.trim().to_string(),
    }
}

/// Parses one shell line. Reply numbers are one-based on screen.
pub fn parse_command(line: &str) -> ShellCommand {
    let line = line.trim();
    let Some(command) = line.strip_prefix('/') else {
        return ShellCommand::Send(line.to_string());
    };
    let (name, rest) = command.split_once(' ').unwrap_or((command, ""));
    let rest = rest.trim();
    match name {
        "schedule" => ShellCommand::Schedule,
        "day" => match rest.parse::<i64>() {
            Ok(hlt) => ShellCommand::Day(hlt),
            Err(_) => ShellCommand::Invalid(format!("expected a day number, got {rest:?}")),
        },
        "good" => parse_feedback(rest, Verdict::Good),
        "bad" => parse_feedback(rest, Verdict::Bad),
        "help" => ShellCommand::Help,
        "quit" | "exit" => ShellCommand::Quit,
        other => ShellCommand::Invalid(format!("unknown command /{other}")),
    }
}

/// Tracks how much of the conversation has been printed.
#[derive(Debug, Default)]
struct Screen {
    queries: usize,
    replies: usize,
}

impl Screen {
    fn show_notices(&self, notices: &[Notice]) {
        for notice in notices {
            if notice.is_error() {
                eprintln!("{}", notice.text().red());
            } else {
                println!("{}", notice.text().dimmed());
            }
        }
    }

    fn show_new_messages(&mut self, session: &UatSession) {
        let conversation = session.conversation();
        for query in &conversation.client_messages()[self.queries..] {
            println!("{} {}", stamp(&query.timestamp), query.m.cyan());
        }
        self.queries = conversation.client_messages().len();

        for (offset, reply) in conversation.assistant_messages()[self.replies..].iter().enumerate() {
            let number = self.replies + offset + 1;
            println!(
                "{} {} {}",
                stamp(&reply.timestamp),
                format!("[{number}]").yellow(),
                reply.m
            );
        }
        self.replies = conversation.assistant_messages().len();
    }

    /// Marks locally sent messages as already shown.
    fn mark_sent(&mut self, session: &UatSession) {
        self.queries = session.conversation().client_messages().len();
    }
}

const ACCESS_EXPIRED: &str = "Access expired. Please request a new link.";

/// What the shell shows when the broker connection changes state.
fn connection_notice(state: ConnectionState) -> Option<Notice> {
    match state {
        ConnectionState::Disconnected => Some(Notice::error("Connection lost. Reconnecting...")),
        ConnectionState::Connecting => None,
        ConnectionState::Connected => Some(Notice::success("Connection restored.")),
        ConnectionState::Failed => Some(Notice::error(ACCESS_EXPIRED)),
    }
}

fn stamp(timestamp: &str) -> String {
    sent_at(timestamp)
        .map(|t| t.format("%H:%M").to_string())
        .unwrap_or_else(|| "--:--".into())
        .dimmed()
        .to_string()
}

/// Opens the packet from `args` into a fresh identity.
fn identity_from_args(config: &RakanConfig, args: &UatArgs) -> Result<IdentityContext, RakanError> {
    let (packet, session_id) = match (&args.link, &args.packet) {
        (Some(link), _) => {
            let params = link_params(link);
            (params.packet, params.session_id)
        }
        (None, packet) => (packet.clone(), None),
    };
    let packet = packet.ok_or_else(|| RakanError::Decode("link carries no packet".into()))?;

    let mut identity = match session_id.as_deref().and_then(parse_session_id) {
        Some(id) => IdentityContext::with_id(id),
        None => IdentityContext::new(),
    };
    if !identity.apply_packet(&packet, &packet_key(config)?) {
        return Err(RakanError::Crypto("access packet could not be opened".into()));
    }
    Ok(identity)
}

fn spawn_reader(tx: mpsc::UnboundedSender<String>) -> Result<(), RakanError> {
    let mut rl = DefaultEditor::new()
        .map_err(|e| RakanError::Internal(format!("failed to initialize readline: {e}")))?;
    let prompt = format!("{}> ", "rakan".green());
    std::thread::spawn(move || {
        loop {
            match rl.readline(&prompt) {
                Ok(line) => {
                    if line.trim().is_empty() {
                        continue;
                    }
                    let _ = rl.add_history_entry(&line);
                    if tx.send(line).is_err() {
                        break;
                    }
                }
                Err(ReadlineError::Interrupted | ReadlineError::Eof) => break,
                Err(e) => {
                    eprintln!("{}: {e}", "error".red());
                    break;
                }
            }
        }
    });
    Ok(())
}

async fn handle_command(
    session: &mut UatSession,
    screen: &mut Screen,
    command: ShellCommand,
) -> Result<bool, RakanError> {
    match command {
        ShellCommand::Quit => return Ok(false),
        ShellCommand::Help => println!("{HELP}"),
        ShellCommand::Invalid(reason) => eprintln!("{}", reason.yellow()),
        ShellCommand::Send(text) => {
            session.send_message(&text).await?;
            screen.mark_sent(session);
        }
        ShellCommand::Schedule => match session.schedule().chart() {
            Some(chart) => print!("{chart}"),
            None => println!("{}", format!("schedule {}", session.schedule().status()).dimmed()),
        },
        ShellCommand::Day(hlt) => session.update_day(hlt).await?,
        ShellCommand::Feedback {
            index,
            verdict,
            text,
            ideal,
        } => {
            let Some(form) = session.feedback_form_mut(index) else {
                eprintln!("{}", format!("no reply number {}", index + 1).yellow());
                return Ok(true);
            };
            match verdict {
                Verdict::Good => {
                    form.toggle_good();
                    form.set_good_text(text);
                }
                Verdict::Bad => {
                    form.toggle_bad();
                    form.set_bad_text(text);
                    form.set_ideal_text(ideal);
                }
            }
            session.submit_feedback(index, verdict).await?;
        }
    }
    Ok(true)
}

/// Runs the `rakan uat` command.
pub async fn run_uat(config: &RakanConfig, args: UatArgs) -> Result<(), RakanError> {
    let identity = identity_from_args(config, &args)?;
    let settings = ClientSettings::uat(&config.broker, identity.id(), identity.jwt())?;
    let transport = Arc::new(MqttTransport::new(settings)?);

    match establish(transport.as_ref()).await? {
        ConnectionState::Connected => {}
        ConnectionState::Failed => {
            eprintln!("{}", ACCESS_EXPIRED.red());
            return Err(RakanError::Transport {
                message: "broker refused the session token".into(),
                source: None,
            });
        }
        state => {
            return Err(RakanError::Transport {
                message: format!("broker did not answer (state: {state})"),
                source: None,
            });
        }
    }

    let shared: Arc<dyn Transport> = transport.clone();
    let mut session = UatSession::new(
        shared,
        &identity,
        SessionSettings {
            phone_number_id: config.chat.phone_number_id.clone(),
            history_limit: config.chat.history_limit,
            subscribe_timeout: std::time::Duration::from_millis(config.broker.subscribe_timeout_ms),
        },
    );
    session.start().await?;
    info!(session = %session.session_id(), farmer_id = session.farmer_id(), "uat session started");

    println!("{}", "rakan uat".bold().green());
    println!("Type {} for commands, {} to exit.\n", "/help".yellow(), "/quit".yellow());

    let (tx, mut lines) = mpsc::unbounded_channel();
    spawn_reader(tx)?;
    let mut screen = Screen::default();
    let mut connection = transport.connection();

    loop {
        tokio::select! {
            line = lines.recv() => {
                let Some(line) = line else { break };
                match handle_command(&mut session, &mut screen, parse_command(&line)).await {
                    Ok(true) => {}
                    Ok(false) => break,
                    Err(e) => eprintln!("{}: {e}", "error".red()),
                }
            }
            update = session.next_update() => {
                let Some(notices) = update else { break };
                screen.show_notices(&notices);
                screen.show_new_messages(&session);
            }
            changed = connection.changed() => {
                if changed.is_err() {
                    break;
                }
                let state = *connection.borrow_and_update();
                screen.show_notices(connection_notice(state).as_slice());
                if session.access_expired() {
                    warn!("connection refused after loss");
                    break;
                }
            }
        }
    }

    transport.disconnect().await;
    Ok(())
}
