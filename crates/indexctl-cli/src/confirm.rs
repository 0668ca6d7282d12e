use indexctl_store::sync::Confirmer;
use std::io::{self, BufRead, Write};

/// Asks the operator on the terminal; anything but `y`/`yes` declines.
pub struct StdinConfirmer;

impl Confirmer for StdinConfirmer {
    fn confirm(&self, question: &str) -> bool {
        print!("{} [y/N] ", question);
        if io::stdout().flush().is_err() {
            return false;
        }
        let mut answer = String::new();
        if io::stdin().lock().read_line(&mut answer).is_err() {
            return false;
        }
        let answer = answer.trim();
        answer.eq_ignore_ascii_case("y") || answer.eq_ignore_ascii_case("yes")
    }
}
