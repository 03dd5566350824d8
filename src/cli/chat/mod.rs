pub mod conversation_state;
pub mod prompt;
pub mod render;

use std::io::Write;
use std::process::ExitCode;

use color_print::cformat;
use conversation_state::ConversationTurn;
use crossterm::cursor::MoveToColumn;
use crossterm::terminal::{Clear, ClearType};
use crossterm::QueueableCommand;
use eyre::Result;
use prompt::generate_prompt;
use rustyline::error::ReadlineError;
use tracing::{debug, info};

use crate::backend_client::BackendClient;

const WELCOME_TEXT: &str = "
SafeSpace AI Therapist (Demo)

Type your message and press Enter to ask.
Tip: to trigger the demo call, include CALL_DEMO_NOW in your message (if enabled).

/help         Show the help dialogue
/quit         Quit the application
";

const HELP_TEXT: &str = "
SafeSpace CLI

/clear        Clear the message, response and error
/health       Ping the backend health endpoint
/help         Show this help dialogue
/quit         Quit the application
";

pub struct ChatContext {
    output: Box<dyn Write>,
    input: Option<String>,
    interactive: bool,
    turn: ConversationTurn,
    client: BackendClient,
}

impl ChatContext {
    pub fn new(
        output: Box<dyn Write>,
        input: Option<String>,
        interactive: bool,
        client: BackendClient,
    ) -> Self {
        Self {
            output,
            input,
            interactive,
            turn: ConversationTurn::new(),
            client,
        }
    }

    pub fn turn(&self) -> &ConversationTurn {
        &self.turn
    }

    /// One-shot mode when an input was given, otherwise the read-eval loop.
    pub async fn run(&mut self) -> Result<ExitCode> {
        if let Some(input) = self.input.take() {
            if input.trim().is_empty() {
                eprintln!("Nothing to send: the message is empty.");
                return Ok(ExitCode::FAILURE);
            }
            self.send(&input).await?;
            if self.turn.show_error() {
                return Ok(ExitCode::FAILURE);
            }
            return Ok(ExitCode::SUCCESS);
        }

        self.print_welcome()?;
        self.run_interactive().await?;

        Ok(ExitCode::SUCCESS)
    }

    fn print_welcome(&mut self) -> Result<()> {
        writeln!(self.output, "{}", WELCOME_TEXT)?;
        writeln!(
            self.output,
            "{}",
            cformat!("<dim>Backend: {}</dim>\n", self.client.base_url())
        )?;
        Ok(())
    }

    async fn run_interactive(&mut self) -> Result<()> {
        let mut rl = prompt::rl()?;

        loop {
            let prompt_text = generate_prompt(self.turn.send_label());

            match rl.readline(&prompt_text) {
                Ok(line) => {
                    if line.trim().is_empty() {
                        continue;
                    }

                    rl.add_history_entry(line.as_str());

                    if line.trim() == "/quit" {
                        break;
                    }

                    if let Err(e) = self.handle_input(&line).await {
                        writeln!(self.output, "Error: {}", e)?;
                    }
                }
                Err(ReadlineError::Interrupted | ReadlineError::Eof) => break,
                Err(e) => {
                    writeln!(self.output, "Error: {}", e)?;
                    break;
                }
            }
        }

        info!("Leaving chat");
        Ok(())
    }

    pub async fn handle_input(&mut self, input: &str) -> Result<()> {
        match input.trim() {
            "/help" => {
                writeln!(self.output, "{}", HELP_TEXT)?;
            }
            "/clear" => self.clear()?,
            "/health" => self.check_health().await?,
            _ => self.send(input).await?,
        }

        Ok(())
    }

    /// The Ask action: send `message` and render whatever comes back.
    ///
    /// Backend failures end up in the turn's error text, they are not
    /// returned from here.
    pub async fn send(&mut self, message: &str) -> Result<()> {
        self.turn.set_message(message);
        let Some(ticket) = self.turn.begin_send() else {
            debug!("Send ignored, nothing to send or a request is in flight");
            return Ok(());
        };

        // A failed status write must not leave the turn loading.
        let status = self.begin_status();
        let result = self.client.ask(ticket.message()).await;
        self.turn.complete(&ticket, result);
        status?;
        self.end_status()?;

        render::render_turn(&mut *self.output, &self.turn)?;
        Ok(())
    }

    /// The Clear action.
    pub fn clear(&mut self) -> Result<()> {
        if !self.turn.can_clear() {
            writeln!(self.output, "Cannot clear while a request is in flight.")?;
            return Ok(());
        }

        self.turn.clear();
        writeln!(self.output, "Cleared.")?;
        Ok(())
    }

    async fn check_health(&mut self) -> Result<()> {
        match self.client.health().await {
            Ok(status) => writeln!(
                self.output,
                "{}",
                cformat!("<green>Backend is up:</green> {}", status)
            )?,
            Err(e) => writeln!(
                self.output,
                "{}",
                cformat!("<red>⚠️ Health check failed: {}</red>", e)
            )?,
        }
        Ok(())
    }

    /// The status line is only drawn on a terminal, so piped output holds
    /// nothing but the result.
    fn begin_status(&mut self) -> std::io::Result<()> {
        if self.interactive {
            render::render_status(&mut *self.output, &self.turn)?;
        }
        Ok(())
    }

    fn end_status(&mut self) -> Result<()> {
        if self.interactive {
            self.output
                .queue(MoveToColumn(0))?
                .queue(Clear(ClearType::CurrentLine))?;
        }
        Ok(())
    }
}
