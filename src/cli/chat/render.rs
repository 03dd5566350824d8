use std::io::{Result, Write};

use color_print::cformat;

use super::conversation_state::ConversationTurn;

const RULE_WIDTH: usize = 40;

/// Write the error banner and/or the result block for `turn`.
///
/// Nothing is written for a turn that has neither.
pub fn render_turn(output: &mut dyn Write, turn: &ConversationTurn) -> Result<()> {
    if turn.show_error() {
        writeln!(output, "{}", cformat!("<red>⚠️ {}</red>", turn.error_text()))?;
    }

    if turn.show_result() {
        let mut tool_line = cformat!("<bold>Tool Called:</bold> {}", turn.display_tool());
        if let Some(demo_mode) = turn.demo_mode() {
            tool_line.push_str(&cformat!("<dim> | demo_mode: {}</dim>", demo_mode));
        }
        writeln!(output, "{}", tool_line)?;
        writeln!(output, "{}", cformat!("<dim>{}</dim>", "─".repeat(RULE_WIDTH)))?;
        writeln!(output, "{}", turn.response_text())?;
    }

    output.flush()
}

/// Status line shown while a request is in flight. No trailing newline.
pub fn render_status(output: &mut dyn Write, turn: &ConversationTurn) -> Result<()> {
    write!(output, "{}", cformat!("<dim>{}</dim>", turn.send_label()))?;
    output.flush()
}
