//! Interactive read-eval-print loop.

use std::io::{self, Write};
use std::path::PathBuf;

use colored::Colorize;

const HISTORY_FILE: &str = ".kestrel_history";

pub struct Repl {
    history: Vec<String>,
    history_file: PathBuf,
}

impl Repl {
    pub fn new() -> Self {
        let history_file = Self::history_path();
        let mut repl = Self {
            history: Vec::new(),
            history_file,
        };
        repl.load_history();
        repl
    }

    fn history_path() -> PathBuf {
        if let Some(home) = dirs::home_dir() {
            home.join(HISTORY_FILE)
        } else {
            PathBuf::from(HISTORY_FILE)
        }
    }

    fn load_history(&mut self) {
        if let Ok(content) = std::fs::read_to_string(&self.history_file) {
            for line in content.lines() {
                if !line.trim().is_empty() {
                    self.history.push(line.to_string());
                }
            }
        }
    }

    fn save_history(&self) {
        let content = self.history.join("\n");
        let _ = std::fs::write(&self.history_file, content);
    }

    /// Read lines until EOF or an exit command; each line is compiled and
    /// run as a complete program, and errors do not end the session.
    pub fn run(&mut self) {
        println!("Kestrel {}", env!("CARGO_PKG_VERSION"));
        println!("Type exit to quit.\n");

        let stdin = io::stdin();

        loop {
            print!("> ");
            if io::stdout().flush().is_err() {
                break;
            }

            let mut line = String::new();
            match stdin.read_line(&mut line) {
                Ok(0) => break,
                Ok(_) => {
                    let line = line.trim_end();
                    if line.is_empty() {
                        continue;
                    }
                    if line == "exit" || line == "quit" {
                        break;
                    }

                    self.history.push(line.to_string());

                    if let Err(e) = crate::run(line) {
                        eprintln!("{} {}", "error:".red().bold(), e);
                    }
                }
                Err(_) => break,
            }
        }

        self.save_history();
    }
}

impl Default for Repl {
    fn default() -> Self {
        Self::new()
    }
}
