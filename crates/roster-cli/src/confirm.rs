//! Interactive y/N confirmation for destructive commands.

use std::io::{self, BufRead, Write};

use anyhow::Result;

/// Ask `question` on stdout and read the answer from stdin.
///
/// Returns `true` immediately when `assume_yes` is set (the `--yes` flag).
pub fn confirm(question: &str, assume_yes: bool) -> Result<bool> {
    if assume_yes {
        return Ok(true);
    }
    let stdin = io::stdin();
    confirm_with(question, &mut stdin.lock(), &mut io::stdout())
}

/// Only `y` or `yes` (any case) counts as agreement; EOF is a no.
fn confirm_with(question: &str, input: &mut impl BufRead, output: &mut impl Write) -> Result<bool> {
    write!(output, "{question} [y/N] ")?;
    output.flush()?;

    let mut answer = String::new();
    if input.read_line(&mut answer)? == 0 {
        writeln!(output)?;
        return Ok(false);
    }
    Ok(matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ask(answer: &str) -> bool {
        let mut out = Vec::new();
        confirm_with("Delete?", &mut answer.as_bytes(), &mut out).unwrap()
    }

    #[test]
    fn accepts_y_and_yes() {
        assert!(ask("y\n"));
        assert!(ask("YES\n"));
        assert!(ask("  Yes  \n"));
    }

    #[test]
    fn anything_else_is_no() {
        assert!(!ask("n\n"));
        assert!(!ask("\n"));
        assert!(!ask("sure\n"));
        assert!(!ask(""));
    }

    #[test]
    fn assume_yes_skips_prompt() {
        assert!(confirm("Reset?", true).unwrap());
    }
}
