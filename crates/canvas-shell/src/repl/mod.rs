//! REPL (Read-Eval-Print Loop) for driving a Canvas server.
//!
//! Each line is matched against the [`Registry`], run against the server, and
//! followed by a prompt refresh, whether or not the command succeeded. The
//! next line is not read until both have settled.

pub mod prompt;
pub mod registry;
pub mod render;
pub mod session;

use std::io::{self, Write};

use anyhow::Result;
use canvas_client::CanvasClient;
use console::{style, Style, Term};
use rustyline::error::ReadlineError;
use rustyline::history::DefaultHistory;
use rustyline::{Config, Editor};
use serde_json::Value;
use tokio::sync::watch;

use prompt::{PromptSync, RefreshOutcome};
use registry::{expand_route, Args, CommandSpec, Effect, Registry};
use session::SessionState;

/// Control flow for the REPL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlFlow {
    Continue,
    Clear,
    Exit,
}

/// REPL state.
pub struct Repl {
    client: CanvasClient,
    registry: Registry,
    prompt: PromptSync,
    state: watch::Receiver<SessionState>,
}

impl Repl {
    /// Create a new REPL instance around one shared client.
    pub fn new(client: CanvasClient, registry: Registry) -> Self {
        let prompt = PromptSync::new(client.clone());
        let state = prompt.subscribe();
        Self {
            client,
            registry,
            prompt,
            state,
        }
    }

    /// Run the REPL loop until `exit` or end of input.
    pub async fn run(&self) -> Result<()> {
        let config = Config::builder()
            .history_ignore_space(true)
            .auto_add_history(true)
            .build();
        let mut editor: Editor<(), DefaultHistory> = Editor::with_config(config)?;
        let term = Term::stdout();
        let mut out = io::stdout();

        self.startup(&mut out).await?;

        loop {
            let prompt = self.state.borrow().styled_prompt();

            match editor.readline(&prompt) {
                Ok(line) => match self.eval(&line, &mut out).await? {
                    ControlFlow::Continue => {}
                    ControlFlow::Clear => term.clear_screen()?,
                    ControlFlow::Exit => break,
                },
                Err(ReadlineError::Interrupted) => {
                    // Ctrl+C - keep the session open
                    writeln!(out)?;
                    render::dim(&mut out, "(Interrupted - type exit to quit)")?;
                }
                Err(ReadlineError::Eof) => {
                    writeln!(out)?;
                    break;
                }
                Err(e) => {
                    render::error(&mut out, format!("Input error: {}", e))?;
                    break;
                }
            }
        }

        render::dim(&mut out, "Goodbye!")?;
        Ok(())
    }

    /// Greet the operator, probe the server, and load the initial prompt.
    pub async fn startup<W: Write>(&self, out: &mut W) -> io::Result<()> {
        let dim = Style::new().dim();
        writeln!(out)?;
        writeln!(out, "{}", style("Canvas Shell").bold().cyan())?;
        writeln!(out, "{}", dim.apply_to("─".repeat(40)))?;
        writeln!(
            out,
            "{}",
            dim.apply_to(format!("Server: {}", self.client.base_url()))
        )?;
        writeln!(
            out,
            "{}",
            dim.apply_to("Type help for commands, exit or Ctrl+D to leave.")
        )?;
        writeln!(out)?;

        if !self.client.health().is_reachable().await {
            render::warning(
                out,
                format!("Canvas server at {} is not reachable", self.client.base_url()),
            )?;
        }

        self.sync_prompt(out).await
    }

    /// Evaluate one input line.
    pub async fn eval<W: Write>(&self, line: &str, out: &mut W) -> io::Result<ControlFlow> {
        let tokens = match shell_words::split(line) {
            Ok(tokens) => tokens,
            Err(e) => {
                render::error(out, format!("Invalid input: {}", e))?;
                return Ok(ControlFlow::Continue);
            }
        };

        if tokens.is_empty() {
            return Ok(ControlFlow::Continue);
        }

        if let [only] = tokens.as_slice() {
            match only.as_str() {
                "exit" | "quit" => return Ok(ControlFlow::Exit),
                "clear" => return Ok(ControlFlow::Clear),
                "help" => {
                    self.print_help(out)?;
                    return Ok(ControlFlow::Continue);
                }
                _ => {}
            }
        }

        let Some((command, rest)) = self.registry.resolve(&tokens) else {
            render::error(out, format!("Unknown command: {}", line.trim()))?;
            render::dim(out, "Type help for available commands")?;
            return Ok(ControlFlow::Continue);
        };

        let args = match command.bind(rest) {
            Ok(args) => args,
            Err(usage) => {
                render::error(out, format!("Usage: {}", usage))?;
                return Ok(ControlFlow::Continue);
            }
        };

        self.dispatch(command, &args, out).await?;
        self.sync_prompt(out).await?;

        Ok(ControlFlow::Continue)
    }

    /// Run a matched command.
    async fn dispatch<W: Write>(
        &self,
        command: &CommandSpec,
        args: &Args,
        out: &mut W,
    ) -> io::Result<()> {
        tracing::debug!(command = command.name, "dispatch");
        match command.effect {
            Effect::Fetch { route } => self.fetch_and_render(&expand_route(route, args), out).await,
            Effect::Send {
                route,
                body,
                moves_context,
            } => {
                let moves_to = moves_context.and_then(|param| args.get(param));
                self.send_and_render(&expand_route(route, args), &body(args), moves_to, out)
                    .await
            }
        }
    }

    /// GET a route and render the payload or error.
    async fn fetch_and_render<W: Write>(&self, route: &str, out: &mut W) -> io::Result<()> {
        match self.client.get::<Value>(route).await {
            Ok(payload) => render::payload(out, &payload),
            Err(e) => render::error(out, e),
        }
    }

    /// POST a body and render the payload or error.
    ///
    /// With `moves_to`, the prompt switches to that path before the request
    /// is sent, regardless of how the request turns out.
    async fn send_and_render<W: Write>(
        &self,
        route: &str,
        body: &Value,
        moves_to: Option<&str>,
        out: &mut W,
    ) -> io::Result<()> {
        if let Some(path) = moves_to {
            self.prompt.assume(path);
        }
        match self.client.post::<Value, _>(route, body).await {
            Ok(payload) => render::payload(out, &payload),
            Err(e) => render::error(out, e),
        }
    }

    /// Refresh the prompt and report why if the server could not be asked.
    async fn sync_prompt<W: Write>(&self, out: &mut W) -> io::Result<()> {
        match self.prompt.refresh().await {
            RefreshOutcome::Unreachable(e) => {
                render::dim(out, format!("Context refresh failed: {}", e))
            }
            RefreshOutcome::Synced(path) => {
                tracing::trace!(%path, "prompt refreshed");
                Ok(())
            }
            RefreshOutcome::Superseded => Ok(()),
        }
    }

    fn print_help<W: Write>(&self, out: &mut W) -> io::Result<()> {
        let dim = Style::new().dim();
        writeln!(out)?;
        writeln!(out, "{}", style("Available Commands").bold())?;
        writeln!(out, "{}", dim.apply_to("─".repeat(40)))?;
        for command in self.registry.commands() {
            writeln!(
                out,
                "  {:<28} - {}",
                style(command.usage()).cyan(),
                command.description
            )?;
        }
        writeln!(out, "  {:<28} - Show this help", style("help").cyan())?;
        writeln!(out, "  {:<28} - Clear the screen", style("clear").cyan())?;
        writeln!(out, "  {:<28} - Exit the shell", style("exit, quit").cyan())?;
        writeln!(out)?;
        Ok(())
    }
}
