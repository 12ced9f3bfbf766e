//! Line-oriented chat loop.
//!
//! Lines starting with `/` are commands; anything else is sent to the
//! contact currently selected.

use std::io::{BufRead, Write};

use anyhow::Result;

use detective_engine::{Session, ToastCenter};
use detective_types::{ContactId, Outcome, Sender};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplCommand {
    /// `/contact <id>`: switch the active chat.
    Switch(ContactId),
    /// `/contacts`: list visible contacts with unread counts.
    Contacts,
    /// `/history`: replay the active chat.
    History,
    Reset,
    Help,
    Quit,
    Say(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    MissingContact,
    Unknown(String),
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParseError::MissingContact => f.write_str("usage: /contact <id>"),
            ParseError::Unknown(cmd) => write!(f, "unknown command /{cmd} (try /help)"),
        }
    }
}

/// `Ok(None)` for a blank line.
pub fn parse_line(line: &str) -> Result<Option<ReplCommand>, ParseError> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    let Some(rest) = line.strip_prefix('/') else {
        return Ok(Some(ReplCommand::Say(line.to_owned())));
    };

    let mut parts = rest.split_whitespace();
    let name = parts.next().unwrap_or_default().to_ascii_lowercase();
    let command = match name.as_str() {
        "contact" | "c" => {
            let id = parts.next().ok_or(ParseError::MissingContact)?;
            ReplCommand::Switch(ContactId::new(id))
        }
        "contacts" | "ls" => ReplCommand::Contacts,
        "history" => ReplCommand::History,
        "reset" => ReplCommand::Reset,
        "help" | "?" => ReplCommand::Help,
        "quit" | "q" | "exit" => ReplCommand::Quit,
        _ => return Err(ParseError::Unknown(name)),
    };
    Ok(Some(command))
}

#[must_use]
pub fn render_outcome(outcome: &Outcome) -> String {
    match outcome {
        Outcome::Success(solved) => {
            let mut out = solved.text.clone();
            if let Some(evidence) = &solved.evidence_text {
                out.push_str("\n  [prova] ");
                out.push_str(evidence);
            }
            if let Some(media) = &solved.media_id {
                out.push_str("\n  [allegato] ");
                out.push_str(media);
            }
            out
        }
        other => other.text().to_owned(),
    }
}

const HELP: &str = "\
/contact <id>  switch chat
/contacts      list contacts
/history       show the current chat
/reset         start over
/quit          leave
T<n>: <answer> answer the puzzle for turn n";

pub struct Repl<'a> {
    session: &'a mut Session,
    toasts: &'a ToastCenter,
    active: Option<ContactId>,
}

impl<'a> Repl<'a> {
    pub fn new(session: &'a mut Session, toasts: &'a ToastCenter) -> Self {
        let active = session.visible_contacts().first().map(|c| c.id.clone());
        Self {
            session,
            toasts,
            active,
        }
    }

    pub fn run<R: BufRead, W: Write>(&mut self, input: R, out: &mut W) -> Result<()> {
        self.prompt(out)?;
        for line in input.lines() {
            let line = line?;
            let keep_going = match parse_line(&line) {
                Ok(Some(command)) => self.execute(command, out)?,
                Ok(None) => true,
                Err(e) => {
                    writeln!(out, "{e}")?;
                    true
                }
            };
            self.flush_toasts(out)?;
            if !keep_going {
                break;
            }
            self.prompt(out)?;
        }
        out.flush()?;
        Ok(())
    }

    /// Returns `false` when the loop should stop.
    fn execute<W: Write>(&mut self, command: ReplCommand, out: &mut W) -> Result<bool> {
        match command {
            ReplCommand::Quit => return Ok(false),
            ReplCommand::Help => writeln!(out, "{HELP}")?,
            ReplCommand::Contacts => {
                for (id, unread) in self.session.unread_counts() {
                    let name = self
                        .session
                        .resolver()
                        .content()
                        .contact(&id)
                        .map_or(id.as_str(), |c| c.name.as_str());
                    let marker = if Some(&id) == self.active.as_ref() { "*" } else { " " };
                    writeln!(out, "{marker} {:<8} {name} ({unread})", id.as_str())?;
                }
            }
            ReplCommand::Switch(id) => {
                if self.session.resolver().content().has_contact(&id) {
                    tracing::debug!(contact = %id, "Switched chat");
                    writeln!(out, "-> {id}")?;
                    self.active = Some(id);
                    self.print_history(out)?;
                } else {
                    writeln!(out, "{}", Outcome::ContactNotFound.text())?;
                }
            }
            ReplCommand::History => self.print_history(out)?,
            ReplCommand::Reset => {
                self.session.reset();
                writeln!(out, "Partita azzerata.")?;
            }
            ReplCommand::Say(text) => {
                let Some(contact) = self.active.clone() else {
                    writeln!(out, "{}", Outcome::ContactNotFound.text())?;
                    return Ok(true);
                };
                let outcome = self.session.submit(&contact, &text);
                writeln!(out, "{contact}: {}", render_outcome(&outcome))?;
                if self.session.store().save_failures() > 0 {
                    tracing::warn!(
                        failures = self.session.store().save_failures(),
                        "Progress is not being saved"
                    );
                }
            }
        }
        Ok(true)
    }

    fn print_history<W: Write>(&mut self, out: &mut W) -> Result<()> {
        let Some(contact) = self.active.clone() else {
            return Ok(());
        };
        for message in self.session.open_chat(&contact) {
            let who = match message.sender {
                Sender::User => "tu",
                Sender::Contact => contact.as_str(),
            };
            writeln!(out, "  {who}: {}", message.content)?;
        }
        Ok(())
    }

    fn flush_toasts<W: Write>(&self, out: &mut W) -> Result<()> {
        for toast in self.toasts.visible() {
            match &toast.contact_id {
                Some(contact) => writeln!(out, "[!] {contact}: {}", toast.text)?,
                None => writeln!(out, "[!] {}", toast.text)?,
            }
            self.toasts.dismiss(toast.id);
        }
        Ok(())
    }

    fn prompt<W: Write>(&self, out: &mut W) -> Result<()> {
        match &self.active {
            Some(contact) => write!(out, "[{contact}] > ")?,
            None => write!(out, "> ")?,
        }
        out.flush()?;
        Ok(())
    }
}
