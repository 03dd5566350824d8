use rustyline::{Config, Editor, Result};

/// Prompt text for the input line, labelled like the send control.
pub fn generate_prompt(label: &str) -> String {
    format!("{}> ", label)
}

pub fn rl() -> Result<Editor<()>> {
    let config = Config::builder()
        .history_ignore_space(true)
        .completion_type(rustyline::CompletionType::List)
        .build();
    Editor::with_config(config)
}
