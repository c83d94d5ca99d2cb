// repl.rs

use std::io;

use anyhow::Result;
use rustyline::error::ReadlineError;
use rustyline::history::DefaultHistory;
use rustyline::{CompletionType, Config as EditorConfig, Editor};
use tracing::{info, warn};

use crate::completion::ShellCompleter;
use crate::config::Config;
use crate::paths::base_name;
use crate::shell::{Prompt, Shell, Status, COMMANDS};

type LineEditor = Editor<ShellCompleter, DefaultHistory>;

/// Confirmations read through the same line editor as commands.
struct EditorPrompt<'a>(&'a mut LineEditor);

impl Prompt for EditorPrompt<'_> {
    fn ask(&mut self, question: &str) -> Option<String> {
        match self.0.readline(question) {
            Ok(answer) => Some(answer),
            Err(e) => {
                warn!(error = %e, "no answer to confirmation");
                None
            }
        }
    }
}

pub fn start_repl(config: &Config) -> Result<()> {
    let editor_config = EditorConfig::builder().completion_type(CompletionType::List).build();
    let mut rl: LineEditor = Editor::with_config(editor_config)?;
    let cwd = std::env::current_dir()?;
    let mut shell = Shell::open(&config.data_dir, cwd.clone(), io::stdout())?;
    rl.set_helper(Some(ShellCompleter::new(cwd)));
    for (_, text) in shell.history().list(None) {
        let _ = rl.add_history_entry(text);
    }

    println!("Welcome to minishell");
    println!("Available commands: {}", COMMANDS.join(", "));
    println!("Quote file names that contain spaces, e.g. cp \"my file.txt\" backup/");
    println!("{}", "-".repeat(60));
    info!("session started");

    loop {
        let prompt = format!("{}$ ", base_name(shell.cwd()));
        match rl.readline(&prompt) {
            Ok(line) => {
                if !line.trim().is_empty() {
                    let _ = rl.add_history_entry(line.as_str());
                }
                let status = shell.execute_line(&line, &mut EditorPrompt(&mut rl));
                if let Some(helper) = rl.helper() {
                    helper.set_cwd(shell.cwd());
                }
                if status == Status::Exit {
                    break;
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("Interrupted");
                info!("interrupted at prompt");
            }
            Err(ReadlineError::Eof) => {
                info!("end of input");
                break;
            }
            Err(err) => return Err(err.into()),
        }
    }

    println!("Goodbye!");
    info!("session finished");
    Ok(())
}
