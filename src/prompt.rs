//! Yes/no confirmation on the terminal.

use std::io::{BufRead, Write};

use anyhow::Result;

/// Ask `question` until the user answers y/yes/n/no.
///
/// `assume_yes` skips the prompt. End of input counts as "no".
pub fn confirm(question: &str, assume_yes: bool) -> Result<bool> {
    if assume_yes {
        return Ok(true);
    }
    let stdin = std::io::stdin();
    let mut input = stdin.lock();
    ask(question, &mut input, &mut std::io::stdout())
}

fn ask<R: BufRead, W: Write>(question: &str, input: &mut R, out: &mut W) -> Result<bool> {
    loop {
        write!(out, "{} [y/n] ", question)?;
        out.flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            writeln!(out)?;
            return Ok(false);
        }
        match line.trim().to_ascii_lowercase().as_str() {
            "y" | "yes" => return Ok(true),
            "n" | "no" => return Ok(false),
            _ => writeln!(out, "Please enter one of [y/n].")?,
        }
    }
}
