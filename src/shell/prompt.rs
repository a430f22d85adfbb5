//! Input prompt handling

use crossterm::style::{Color, Stylize};
use std::io::{self, BufRead, Write};

/// Display the styled prompt and read a line of input.
/// Returns None on EOF (Ctrl+D).
pub fn read_prompt_line(prompt_color: Color) -> Option<String> {
    print!("{} ", ">".with(prompt_color));
    io::stdout().flush().ok()?;

    let stdin = io::stdin();
    let mut line = String::new();

    match stdin.lock().read_line(&mut line) {
        Ok(0) => None, // EOF
        Ok(_) => Some(line.trim().to_string()),
        Err(_) => None,
    }
}
