// src/prompt.rs

//! Interactive questions asked when the command line leaves something open.

use crate::cancellation::CancellationToken;
use crate::errors::{io_error_with_path, Result};
use std::cell::RefCell;
use std::io::{BufRead, Stderr, StdinLock, Write};

/// Source of answers for the questions the sync driver may need to ask.
pub trait Prompter {
    /// Lets the user pick one of `branches`. `None` means the user quit.
    fn select_branch(&self, branches: &[String], default: &str) -> Result<Option<String>>;

    /// Asks for a repository reference. `None` means no answer was given.
    fn ask_repository(&self) -> Result<Option<String>>;
}

/// Puts `default` first and sorts the remaining branches.
///
/// ```
/// use gitpull::prompt::order_branches;
///
/// let branches = vec!["zeta".to_string(), "main".to_string(), "alpha".to_string()];
/// assert_eq!(order_branches(&branches, "main"), vec!["main", "alpha", "zeta"]);
/// ```
pub fn order_branches(branches: &[String], default: &str) -> Vec<String> {
    let mut others: Vec<String> = branches
        .iter()
        .filter(|b| b.as_str() != default)
        .cloned()
        .collect();
    others.sort();
    others.dedup();

    let mut ordered = Vec::with_capacity(others.len() + 1);
    if branches.iter().any(|b| b == default) {
        ordered.push(default.to_string());
    }
    ordered.extend(others);
    ordered
}

/// A [`Prompter`] reading answers line by line from `input` and writing questions to `output`.
///
/// Branch menu answers: Enter picks the first entry, a number picks by
/// position, an exact branch name picks that branch, and `q` or end of input
/// quits. Anything else re-asks.
///
/// With a cancellation token attached, an answer typed after Ctrl+C yields
/// [`Error::Interrupted`](crate::errors::Error::Interrupted) instead of being used.
pub struct TerminalPrompter<R: BufRead, W: Write> {
    input: RefCell<R>,
    output: RefCell<W>,
    token: Option<CancellationToken>,
}

impl TerminalPrompter<StdinLock<'static>, Stderr> {
    /// Reads from standard input and asks on standard error.
    pub fn stdio() -> Self {
        Self::new(std::io::stdin().lock(), std::io::stderr())
    }
}

impl<R: BufRead, W: Write> TerminalPrompter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self {
            input: RefCell::new(input),
            output: RefCell::new(output),
            token: None,
        }
    }

    /// Stops at the next answer once `token` is cancelled.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.token = Some(token);
        self
    }

    /// Consumes the prompter, returning the output it wrote to.
    pub fn into_output(self) -> W {
        self.output.into_inner()
    }

    fn say(&self, text: &str) -> Result<()> {
        let mut out = self.output.borrow_mut();
        out.write_all(text.as_bytes())
            .and_then(|_| out.flush())
            .map_err(|e| io_error_with_path(e, "<terminal>"))
    }

    /// One line without its line ending, or `None` at end of input.
    fn read_line(&self) -> Result<Option<String>> {
        let mut line = String::new();
        let read = self
            .input
            .borrow_mut()
            .read_line(&mut line)
            .map_err(|e| io_error_with_path(e, "<stdin>"))?;
        if let Some(token) = &self.token {
            token.check()?;
        }
        if read == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }
}

impl<R: BufRead, W: Write> Prompter for TerminalPrompter<R, W> {
    fn select_branch(&self, branches: &[String], default: &str) -> Result<Option<String>> {
        let ordered = order_branches(branches, default);
        if ordered.is_empty() {
            return Ok(None);
        }

        let mut menu = String::from("Available branches:\n");
        for (i, branch) in ordered.iter().enumerate() {
            if branch == default {
                menu.push_str(&format!("  {}) {} (default)\n", i + 1, branch));
            } else {
                menu.push_str(&format!("  {}) {}\n", i + 1, branch));
            }
        }
        self.say(&menu)?;

        loop {
            self.say(&format!("Select a branch [1-{}, q to quit] (1): ", ordered.len()))?;
            let Some(answer) = self.read_line()? else {
                self.say("\n")?;
                return Ok(None);
            };

            if answer.is_empty() {
                return Ok(Some(ordered[0].clone()));
            }
            if answer.eq_ignore_ascii_case("q") {
                return Ok(None);
            }
            if let Ok(n) = answer.parse::<usize>() {
                if (1..=ordered.len()).contains(&n) {
                    return Ok(Some(ordered[n - 1].clone()));
                }
            } else if let Some(branch) = ordered.iter().find(|b| **b == answer) {
                return Ok(Some(branch.clone()));
            }
            self.say(&format!("Invalid selection: {}\n", answer))?;
        }
    }

    fn ask_repository(&self) -> Result<Option<String>> {
        self.say("Repository to pull (owner/name or GitHub URL): ")?;
        Ok(self.read_line()?.filter(|answer| !answer.is_empty()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::Error;
    use std::io::Cursor;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn prompter(input: &str) -> TerminalPrompter<Cursor<Vec<u8>>, Vec<u8>> {
        TerminalPrompter::new(Cursor::new(input.as_bytes().to_vec()), Vec::new())
    }

    #[test]
    fn test_order_branches_without_default_in_list() {
        let ordered = order_branches(&strings(&["b", "a"]), "main");
        assert_eq!(ordered, strings(&["a", "b"]));
    }

    #[test]
    fn test_enter_selects_default() {
        let p = prompter("\n");
        let picked = p
            .select_branch(&strings(&["dev", "main", "feature/x"]), "main")
            .unwrap();
        assert_eq!(picked.as_deref(), Some("main"));

        let menu = String::from_utf8(p.into_output()).unwrap();
        assert!(menu.contains("1) main (default)"));
        assert!(menu.contains("2) dev"));
        assert!(menu.contains("3) feature/x"));
    }

    #[test]
    fn test_number_and_name_selection() {
        let branches = strings(&["main", "dev", "release"]);
        assert_eq!(
            prompter("3\n").select_branch(&branches, "main").unwrap().as_deref(),
            Some("release")
        );
        assert_eq!(
            prompter("dev\n").select_branch(&branches, "main").unwrap().as_deref(),
            Some("dev")
        );
    }

    #[test]
    fn test_invalid_answer_asks_again() {
        let p = prompter("7\nnope\n2\n");
        let picked = p.select_branch(&strings(&["main", "dev"]), "main").unwrap();
        assert_eq!(picked.as_deref(), Some("dev"));

        let output = String::from_utf8(p.into_output()).unwrap();
        assert!(output.contains("Invalid selection: 7"));
        assert!(output.contains("Invalid selection: nope"));
    }

    #[test]
    fn test_quit_and_end_of_input() {
        let branches = strings(&["main", "dev"]);
        assert_eq!(prompter("q\n").select_branch(&branches, "main").unwrap(), None);
        assert_eq!(prompter("").select_branch(&branches, "main").unwrap(), None);
    }

    #[test]
    fn test_answers_after_ctrl_c_are_interrupted() {
        let token = CancellationToken::new();
        token.cancel();
        let branches = strings(&["main", "dev"]);

        let menu = prompter("1\n").with_cancellation(token.clone());
        assert!(matches!(
            menu.select_branch(&branches, "main"),
            Err(Error::Interrupted)
        ));

        let question = prompter("octo/demo\n").with_cancellation(token.clone());
        assert!(matches!(question.ask_repository(), Err(Error::Interrupted)));

        let at_eof = prompter("").with_cancellation(token);
        assert!(matches!(at_eof.ask_repository(), Err(Error::Interrupted)));
    }

    #[test]
    fn test_ask_repository() {
        assert_eq!(
            prompter("  octo/demo \n").ask_repository().unwrap().as_deref(),
            Some("octo/demo")
        );
        assert_eq!(prompter("\n").ask_repository().unwrap(), None);
        assert_eq!(prompter("").ask_repository().unwrap(), None);
    }
}
