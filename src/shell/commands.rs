//! Slash command parsing and definitions

use crossterm::style::Stylize;

/// Available slash commands
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlashCommand {
    Help,
    Quit,
    Clear,
    Transcript,
    Save,
    Settings,
    Backend(Option<String>),
    Url(Option<String>),
    Key(Option<String>),
    Model(Option<String>),
    Format(Option<String>),
    Headers(Option<String>),
}

/// What one line of user input asks the shell to do
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputAction {
    /// Blank line: nothing to dispatch, worth a hint
    Empty,
    Command(SlashCommand),
    /// Starts with '/' but matches no known command
    UnknownCommand,
    Prompt(String),
}

/// Classify one input line: empty, slash command, or prompt text.
pub fn classify_input(input: &str) -> InputAction {
    let input = input.trim();
    if input.is_empty() {
        return InputAction::Empty;
    }
    if input.starts_with('/') {
        return match parse_command(input) {
            Some(cmd) => InputAction::Command(cmd),
            None => InputAction::UnknownCommand,
        };
    }
    InputAction::Prompt(input.to_string())
}

/// Parse a slash command from user input.
/// Returns None if the input is not a slash command.
pub fn parse_command(input: &str) -> Option<SlashCommand> {
    let input = input.trim();
    if !input.starts_with('/') {
        return None;
    }

    // The argument is the rest of the line: header blocks contain spaces
    let (cmd, arg) = match input.split_once(' ') {
        Some((cmd, rest)) => (cmd.to_lowercase(), Some(rest.trim().to_string())),
        None => (input.to_lowercase(), None),
    };
    let arg = arg.filter(|a| !a.is_empty());

    match cmd.as_str() {
        "/help" | "/h" | "/?" => Some(SlashCommand::Help),
        "/quit" | "/q" | "/exit" => Some(SlashCommand::Quit),
        "/clear" | "/cls" => Some(SlashCommand::Clear),
        "/transcript" | "/log" => Some(SlashCommand::Transcript),
        "/save" => Some(SlashCommand::Save),
        "/settings" | "/show" => Some(SlashCommand::Settings),
        "/backend" => Some(SlashCommand::Backend(arg)),
        "/url" => Some(SlashCommand::Url(arg)),
        "/key" => Some(SlashCommand::Key(arg)),
        "/model" => Some(SlashCommand::Model(arg)),
        "/format" => Some(SlashCommand::Format(arg)),
        "/headers" => Some(SlashCommand::Headers(arg)),
        _ => None,
    }
}

/// Render help text for all slash commands
pub fn render_help(renderer: &super::renderer::TerminalRenderer) {
    let cmd_color = renderer.command_color();
    let dim_color = renderer.dim_color();

    println!();
    renderer.render_system("Available commands:");
    println!();

    let commands = [
        ("/help", "Show this help message"),
        ("/quit", "Exit the shell"),
        ("/clear", "Clear the transcript"),
        ("/transcript", "Replay the transcript"),
        ("/settings", "Show current settings"),
        ("/save", "Persist settings to disk"),
        ("/backend [kind]", "Show or set the backend (ollama, siliconflow, custom)"),
        ("/url [value]", "Show or set the endpoint URL"),
        ("/key [value]", "Show or set the API key"),
        ("/model [name]", "Show or set the model"),
        ("/format [shape]", "Show or set the custom wire shape (openai, ollama)"),
        ("/headers [json]", "Show or set custom headers for the custom backend"),
    ];

    for (cmd, desc) in &commands {
        println!("  {:<20} {}", cmd.with(cmd_color), desc.with(dim_color));
    }
    println!();
    renderer.render_info(
        "Anything else is sent as a prompt. Ctrl+C cancels an in-flight generation; at the prompt it exits.",
    );
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bare_commands() {
        assert_eq!(parse_command("/quit"), Some(SlashCommand::Quit));
        assert_eq!(parse_command("/HELP"), Some(SlashCommand::Help));
        assert_eq!(parse_command("/model"), Some(SlashCommand::Model(None)));
    }

    #[test]
    fn test_parse_command_with_argument() {
        assert_eq!(
            parse_command("/backend siliconflow"),
            Some(SlashCommand::Backend(Some("siliconflow".to_string())))
        );
        assert_eq!(
            parse_command("/url http://localhost:11434/api/generate"),
            Some(SlashCommand::Url(Some(
                "http://localhost:11434/api/generate".to_string()
            )))
        );
    }

    #[test]
    fn test_headers_argument_keeps_spaces() {
        let cmd = parse_command(r#"/headers {"Authorization": "Bearer x"}"#);
        assert_eq!(
            cmd,
            Some(SlashCommand::Headers(Some(
                r#"{"Authorization": "Bearer x"}"#.to_string()
            )))
        );
    }

    #[test]
    fn test_non_commands_pass_through() {
        assert_eq!(parse_command("write a short story"), None);
        assert_eq!(parse_command("/unknown"), None);
    }

    #[test]
    fn test_classify_empty_input() {
        assert_eq!(classify_input(""), InputAction::Empty);
        assert_eq!(classify_input("   "), InputAction::Empty);
    }

    #[test]
    fn test_classify_commands_and_prompts() {
        assert_eq!(
            classify_input("/quit"),
            InputAction::Command(SlashCommand::Quit)
        );
        assert_eq!(classify_input("/nope"), InputAction::UnknownCommand);
        assert_eq!(
            classify_input("  write a short story  "),
            InputAction::Prompt("write a short story".to_string())
        );
    }
}
