//! Line based component picker for the terminal

use colored::Colorize;
use std::io::{self, BufRead, Write};

use rw_shad_core::add::{Choice, ComponentPicker};
use rw_shad_core::{Result, ShadError};

/// Lists the choices on stderr and reads the selection from stdin
pub struct TerminalPicker;

impl ComponentPicker for TerminalPicker {
    fn pick(&self, choices: &[Choice]) -> Result<Vec<String>> {
        let stdin = io::stdin();
        let mut stderr = io::stderr();

        let width = choices.len().to_string().len();
        for (i, choice) in choices.iter().enumerate() {
            let _ = writeln!(stderr, "  {:>width$}  {}", i + 1, choice.label);
        }

        loop {
            let _ = write!(
                stderr,
                "\nSelect the components you want to add ({}): ",
                "numbers or names, separated by spaces".green()
            );
            let _ = stderr.flush();

            let mut line = String::new();
            let read = stdin
                .lock()
                .read_line(&mut line)
                .map_err(|e| ShadError::Selection(format!("Failed to read selection: {e}")))?;

            // EOF, nothing more will come
            if read == 0 {
                return Ok(Vec::new());
            }

            match parse_selection(&line, choices) {
                Ok(names) if !names.is_empty() => return Ok(names),
                Ok(_) => {
                    let _ = writeln!(stderr, "{}", "You must choose at least one component.".yellow());
                }
                Err(message) => {
                    let _ = writeln!(stderr, "{}", message.yellow());
                }
            }
        }
    }
}

/// Resolve a line of 1-based numbers and/or names against `choices`
fn parse_selection(input: &str, choices: &[Choice]) -> std::result::Result<Vec<String>, String> {
    let mut picked: Vec<String> = Vec::new();

    for token in input.split(|c: char| c == ',' || c.is_whitespace()) {
        if token.is_empty() {
            continue;
        }

        let choice = match token.parse::<usize>() {
            Ok(n) => n.checked_sub(1).and_then(|i| choices.get(i)),
            Err(_) => choices
                .iter()
                .find(|c| c.name == token || c.label.eq_ignore_ascii_case(token)),
        }
        .ok_or_else(|| format!("Unknown choice: {token}"))?;

        if !picked.contains(&choice.name) {
            picked.push(choice.name.clone());
        }
    }

    Ok(picked)
}
