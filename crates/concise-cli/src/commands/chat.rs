//! Interactive chat REPL.

use super::Settings;
use crate::render;
use anyhow::Result;
use colored::Colorize;
use concise_application::{ChatController, Lane, SendOutcome};
use concise_core::conversation::Conversation;
use rustyline::completion::{Completer, Pair};
use rustyline::error::ReadlineError;
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::validate::Validator;
use rustyline::{Context, Editor, Helper};
use std::borrow::Cow::{self, Borrowed, Owned};
use std::path::PathBuf;
use std::sync::Arc;

const COMMANDS: &[&str] = &[
    "/new", "/list", "/select", "/branch", "/b", "/close", "/expand", "/delete", "/attach",
    "/outline", "/help", "/quit",
];

const HELP: &str = "\
Type a message to talk to the main conversation.
  /b <text>          send to the open branch
  /branch <n>        branch off message n of the main conversation
  /close             close the open branch
  /expand <n>        toggle the full answer of message n (b<n> for the branch)
  /attach <path>     attach a file to the next message
  /new               start a new conversation
  /list              list conversations
  /select <n>        switch to conversation n
  /delete [branch]   delete the current conversation (or the open branch)
  /outline           show conversations and their branches
  /help              show this help
  /quit              exit";

/// rustyline helper providing slash-command completion, highlighting and hints.
#[derive(Clone)]
struct CliHelper {
    commands: Vec<String>,
}

impl CliHelper {
    fn new() -> Self {
        Self {
            commands: COMMANDS.iter().map(|command| command.to_string()).collect(),
        }
    }
}

impl Helper for CliHelper {}

impl Completer for CliHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let line = &line[..pos];

        if line.starts_with('/') && !line.contains(' ') {
            let candidates: Vec<Pair> = self
                .commands
                .iter()
                .filter(|cmd| cmd.starts_with(line))
                .map(|cmd| Pair {
                    display: cmd.clone(),
                    replacement: cmd.clone(),
                })
                .collect();
            Ok((0, candidates))
        } else {
            Ok((0, vec![]))
        }
    }
}

impl Highlighter for CliHelper {
    fn highlight<'l>(&self, line: &'l str, _pos: usize) -> Cow<'l, str> {
        if line.starts_with('/') {
            Owned(line.bright_cyan().to_string())
        } else {
            Borrowed(line)
        }
    }

    fn highlight_char(&self, _line: &str, _pos: usize, _forced: bool) -> bool {
        true
    }
}

impl Hinter for CliHelper {
    type Hint = String;

    fn hint(&self, line: &str, pos: usize, _ctx: &Context<'_>) -> Option<String> {
        let line = &line[..pos];

        if line.starts_with('/') && !line.contains(' ') {
            self.commands
                .iter()
                .find(|cmd| cmd.starts_with(line) && cmd.len() > line.len())
                .map(|cmd| cmd[line.len()..].to_string())
        } else {
            None
        }
    }
}

impl Validator for CliHelper {}

/// A parsed line of REPL input.
#[derive(Debug, PartialEq, Eq)]
enum Input<'a> {
    Send(Lane, &'a str),
    New,
    List,
    Select(usize),
    Branch(usize),
    Close,
    Expand(Lane, usize),
    Delete { branch: bool },
    Attach(&'a str),
    Outline,
    Help,
    Quit,
    Invalid(String),
}

fn parse(line: &str) -> Input<'_> {
    let line = line.trim();
    if !line.starts_with('/') {
        return Input::Send(Lane::Main, line);
    }

    let (command, argument) = match line.split_once(char::is_whitespace) {
        Some((command, argument)) => (command, argument.trim()),
        None => (line, ""),
    };
    let number = |usage: &str, make: fn(usize) -> Input<'static>| match argument.parse() {
        Ok(n) if n > 0 => make(n),
        _ => Input::Invalid(format!("Usage: {usage}")),
    };

    match command {
        "/b" => Input::Send(Lane::Branch, argument),
        "/new" => Input::New,
        "/list" => Input::List,
        "/select" => number("/select <n>", Input::Select),
        "/branch" => number("/branch <n>", Input::Branch),
        "/close" => Input::Close,
        "/expand" => match argument.strip_prefix('b') {
            Some(rest) => match rest.parse() {
                Ok(n) if n > 0 => Input::Expand(Lane::Branch, n),
                _ => Input::Invalid("Usage: /expand <n> | /expand b<n>".to_string()),
            },
            None => number("/expand <n>", |n| Input::Expand(Lane::Main, n)),
        },
        "/delete" => match argument {
            "" => Input::Delete { branch: false },
            "branch" => Input::Delete { branch: true },
            _ => Input::Invalid("Usage: /delete [branch]".to_string()),
        },
        "/attach" if !argument.is_empty() => Input::Attach(argument),
        "/attach" => Input::Invalid("Usage: /attach <path>".to_string()),
        "/outline" => Input::Outline,
        "/help" => Input::Help,
        "/quit" | "/exit" => Input::Quit,
        other => Input::Invalid(format!("Unknown command: {other}. Type /help.")),
    }
}

/// Message id at a 1-based position.
fn message_id(conversation: Option<&Arc<Conversation>>, number: usize) -> Option<String> {
    conversation
        .and_then(|conversation| conversation.messages.get(number - 1))
        .map(|message| message.id.clone())
}

struct Session {
    controller: ChatController,
    pending_attachments: Vec<PathBuf>,
}

impl Session {
    async fn send(&mut self, lane: Lane, text: &str) {
        let attachments = std::mem::take(&mut self.pending_attachments);
        println!("{}", "thinking...".bright_black());

        let outcome = self.controller.send_message(lane, text, &attachments).await;
        render::notices(&outcome.notices);
        if outcome.is_rejected() {
            // Keep the queued files for the next message
            self.pending_attachments = attachments;
            return;
        }
        self.show_reply(&outcome).await;
    }

    async fn show_reply(&self, outcome: &SendOutcome) {
        let (Some(conversation_id), Some(reply_id)) =
            (&outcome.conversation_id, &outcome.reply_message_id)
        else {
            return;
        };
        let snapshot = self.controller.snapshot().await;
        let Some(conversation) = snapshot
            .conversations
            .iter()
            .find(|conversation| &conversation.id == conversation_id)
        else {
            return;
        };
        if let Some(position) = conversation
            .messages
            .iter()
            .position(|message| &message.id == reply_id)
        {
            render::message(
                position + 1,
                &conversation.messages[position],
                conversation.is_branch(),
            );
        }
    }

    /// Handles one line; returns false when the session should end.
    async fn handle(&mut self, input: Input<'_>) -> bool {
        match input {
            Input::Send(lane, text) => self.send(lane, text).await,
            Input::New => {
                self.controller.new_conversation().await;
                println!("{}", "Started a new conversation.".bright_green());
            }
            Input::List => render::conversation_list(&self.controller.snapshot().await),
            Input::Select(number) => {
                let snapshot = self.controller.snapshot().await;
                let target = snapshot
                    .conversations
                    .iter()
                    .filter(|conversation| !conversation.is_branch())
                    .nth(number - 1);
                match target {
                    Some(conversation) => {
                        if let Err(notice) =
                            self.controller.select_conversation(&conversation.id).await
                        {
                            render::notices(&[notice]);
                        } else {
                            render::conversation(conversation);
                        }
                    }
                    None => println!("{}", format!("No conversation {number}.").red()),
                }
            }
            Input::Branch(number) => {
                let snapshot = self.controller.snapshot().await;
                let Some(message_id) = message_id(snapshot.current.as_ref(), number) else {
                    println!("{}", format!("No message {number}.").red());
                    return true;
                };
                match self.controller.branch_from(&message_id).await {
                    Ok(_) => {
                        let snapshot = self.controller.snapshot().await;
                        if let Some(branch) = &snapshot.branch {
                            println!(
                                "{}",
                                format!("Opened {}. Use /b <text> to talk in it.", branch.title)
                                    .bright_cyan()
                            );
                        }
                    }
                    Err(notice) => render::notices(&[notice]),
                }
            }
            Input::Close => match self.controller.close_branch().await {
                Some(_) => println!("{}", "Branch closed.".bright_green()),
                None => println!("{}", "No branch is open.".bright_black()),
            },
            Input::Expand(lane, number) => {
                let snapshot = self.controller.snapshot().await;
                let conversation = match lane {
                    Lane::Main => snapshot.current.as_ref(),
                    Lane::Branch => snapshot.branch.as_ref(),
                };
                let toggled = match message_id(conversation, number) {
                    Some(id) => self.controller.toggle_expansion(lane, &id).await,
                    None => false,
                };
                if !toggled {
                    println!("{}", format!("No message {number}.").red());
                    return true;
                }
                let snapshot = self.controller.snapshot().await;
                let conversation = match lane {
                    Lane::Main => snapshot.current,
                    Lane::Branch => snapshot.branch,
                };
                if let Some(message) =
                    conversation.and_then(|conversation| conversation.messages.get(number - 1).cloned())
                {
                    render::message(number, &message, lane == Lane::Branch);
                }
            }
            Input::Delete { branch } => {
                let snapshot = self.controller.snapshot().await;
                let target = if branch { snapshot.branch } else { snapshot.current };
                let Some(target) = target else {
                    println!("{}", "Nothing to delete.".bright_black());
                    return true;
                };
                match self.controller.delete_conversation(&target.id).await {
                    Ok(removed) => println!(
                        "{}",
                        format!("Deleted {} conversation(s).", removed.len()).bright_green()
                    ),
                    Err(notice) => render::notices(&[notice]),
                }
            }
            Input::Attach(path) => {
                let path = PathBuf::from(path);
                if path.is_file() {
                    println!(
                        "{}",
                        format!("Will attach {} to the next message.", path.display())
                            .bright_black()
                    );
                    self.pending_attachments.push(path);
                } else {
                    println!("{}", format!("No such file: {}", path.display()).red());
                }
            }
            Input::Outline => render::outline(&self.controller.outline().await),
            Input::Help => println!("{}", HELP.bright_black()),
            Input::Quit => return false,
            Input::Invalid(message) => println!("{}", message.yellow()),
        }
        true
    }
}

pub async fn run(settings: &Settings) -> Result<()> {
    let mut session = Session {
        controller: settings.controller(),
        pending_attachments: Vec::new(),
    };

    let mut rl = Editor::new()?;
    rl.set_helper(Some(CliHelper::new()));

    println!("{}", "=== Concise ===".bright_magenta().bold());
    println!(
        "{}",
        "Type a message to start, /help for commands, /quit to exit.".bright_black()
    );
    println!();

    loop {
        let prompt = if session.controller.snapshot().await.branch.is_some() {
            "main|branch >> "
        } else {
            ">> "
        };

        match rl.readline(prompt) {
            Ok(line) => {
                if line.trim().is_empty() {
                    continue;
                }
                let _ = rl.add_history_entry(line.as_str());

                if !session.handle(parse(&line)).await {
                    println!("{}", "Goodbye!".bright_green());
                    break;
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("{}", "CTRL-C detected. Type /quit to exit.".yellow());
            }
            Err(ReadlineError::Eof) => {
                println!("{}", "CTRL-D detected. Exiting...".bright_green());
                break;
            }
            Err(err) => {
                eprintln!("{}", format!("Error: {err:?}").red());
                break;
            }
        }
    }

    Ok(())
}
