//! Line-oriented prompts over any reader/writer pair.
//!
//! Generic so the menus can be driven from a byte buffer in tests.

use std::fmt::Display;
use std::io::{self, BufRead, StdinLock, Stdout, Write};

use thiserror::Error;

use kasir_core::Money;

/// Standard input reached end of file.
#[derive(Debug, Error)]
#[error("input closed")]
pub struct InputClosed;

pub struct Console<R, W> {
    input: R,
    output: W,
}

impl Console<StdinLock<'static>, Stdout> {
    pub fn stdio() -> Self {
        Console::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> Console<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Console { input, output }
    }

    #[cfg(test)]
    pub fn output(&self) -> &W {
        &self.output
    }

    /// Prints one line.
    pub fn say(&mut self, text: impl Display) -> anyhow::Result<()> {
        writeln!(self.output, "{}", text)?;
        Ok(())
    }

    /// Prints a label and reads one trimmed line.
    pub fn prompt(&mut self, label: &str) -> anyhow::Result<String> {
        write!(self.output, "{}", label)?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            writeln!(self.output)?;
            return Err(InputClosed.into());
        }
        Ok(line.trim().to_string())
    }

    /// Asks until the answer is a whole number.
    pub fn prompt_number(&mut self, label: &str) -> anyhow::Result<i64> {
        loop {
            let answer = self.prompt(label)?;
            match answer.parse() {
                Ok(n) => return Ok(n),
                Err(_) => self.say("Please enter a whole number.")?,
            }
        }
    }

    /// Like `prompt_number`, but an empty answer gives `None`.
    pub fn prompt_optional_number(&mut self, label: &str) -> anyhow::Result<Option<i64>> {
        loop {
            let answer = self.prompt(label)?;
            if answer.is_empty() {
                return Ok(None);
            }
            match answer.parse() {
                Ok(n) => return Ok(Some(n)),
                Err(_) => self.say("Please enter a whole number, or leave empty.")?,
            }
        }
    }

    /// Asks until the answer is a rupiah amount such as `50.000`.
    pub fn prompt_money(&mut self, label: &str) -> anyhow::Result<Money> {
        loop {
            let answer = self.prompt(label)?;
            match Money::parse_input(&answer) {
                Ok(amount) => return Ok(amount),
                Err(e) => self.say(format!("{}", e))?,
            }
        }
    }

    /// Like `prompt_money`, but an empty answer gives `None`.
    pub fn prompt_optional_money(&mut self, label: &str) -> anyhow::Result<Option<Money>> {
        loop {
            let answer = self.prompt(label)?;
            if answer.is_empty() {
                return Ok(None);
            }
            match Money::parse_input(&answer) {
                Ok(amount) => return Ok(Some(amount)),
                Err(e) => self.say(format!("{}", e))?,
            }
        }
    }

    /// `y` or `yes` (any case) is true; anything else is false.
    pub fn confirm(&mut self, label: &str) -> anyhow::Result<bool> {
        let answer = self.prompt(&format!("{} (y/n): ", label))?;
        Ok(matches!(answer.to_lowercase().as_str(), "y" | "yes"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn console(input: &str) -> Console<Cursor<Vec<u8>>, Vec<u8>> {
        Console::new(Cursor::new(input.as_bytes().to_vec()), Vec::new())
    }

    #[test]
    fn test_prompt_and_eof() {
        let mut c = console("  budi  \n");
        assert_eq!(c.prompt("Username: ").unwrap(), "budi");

        let err = c.prompt("Password: ").unwrap_err();
        assert!(err.downcast_ref::<InputClosed>().is_some());
    }

    #[test]
    fn test_number_retries() {
        let mut c = console("abc\n12\n\n");
        assert_eq!(c.prompt_number("Qty: ").unwrap(), 12);
        assert_eq!(c.prompt_optional_number("Warehouse: ").unwrap(), None);

        let out = String::from_utf8(c.output().clone()).unwrap();
        assert!(out.contains("Please enter a whole number."));
    }

    #[test]
    fn test_money_and_confirm() {
        let mut c = console("50.000\nY\nno\n");
        assert_eq!(c.prompt_money("Pay: ").unwrap(), Money::from_rupiah(50_000));
        assert!(c.confirm("Save").unwrap());
        assert!(!c.confirm("Save").unwrap());
    }
}
