//! Reading answers from the interactive terminal.

use std::collections::VecDeque;

use anyhow::Result;
use anyhow::bail;
use dialoguer::Input;

/// Reads one line of input after showing a prompt label.
pub trait LineReader {
    fn read_line(&mut self, prompt: &str) -> Result<String>;
}

/// Reads from the user's terminal.
pub struct TerminalReader;

impl LineReader for TerminalReader {
    fn read_line(&mut self, prompt: &str) -> Result<String> {
        let line: String = Input::new()
            .with_prompt(prompt)
            .allow_empty(true)
            .interact_text()?;
        Ok(line)
    }
}

/// Replays canned answers and records the prompts it was shown.
#[derive(Default)]
pub struct ScriptedReader {
    answers: VecDeque<String>,
    pub prompts: Vec<String>,
}

impl ScriptedReader {
    pub fn new<I, S>(answers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            answers: answers.into_iter().map(Into::into).collect(),
            prompts: vec![],
        }
    }
}

impl LineReader for ScriptedReader {
    fn read_line(&mut self, prompt: &str) -> Result<String> {
        self.prompts.push(prompt.to_string());
        match self.answers.pop_front() {
            Some(answer) => Ok(answer),
            None => bail!("No answer scripted for prompt: {}", prompt),
        }
    }
}
