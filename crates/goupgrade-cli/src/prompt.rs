use std::io::{self, BufRead, IsTerminal, Stderr, Write};

use anyhow::{anyhow, Context, Result};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::style::{Print, StyledContent, Stylize};
use crossterm::{terminal, QueueableCommand};

use crate::render::OutputStyle;

/// Single-choice question. Returns the index of the chosen item.
pub(crate) trait Prompter {
    fn select(&mut self, label: &str, items: &[String], default: usize) -> Result<usize>;
}

/// Where answers come from. `Ok(false)` means the input ended.
pub(crate) trait AnswerInput {
    fn read_answer(&mut self, answer: &mut String) -> Result<bool>;
}

/// Line-buffered answers, for piped stdin.
pub(crate) struct LineInput<R>(pub(crate) R);

impl<R: BufRead> AnswerInput for LineInput<R> {
    fn read_answer(&mut self, answer: &mut String) -> Result<bool> {
        let read = self.0.read_line(answer).context("failed to read answer")?;
        Ok(read > 0)
    }
}

/// Key-by-key answers from an interactive terminal. Raw mode turns Ctrl-C
/// into a key press, so an interrupt fails the prompt instead of killing the
/// process.
pub(crate) struct KeyInput;

impl AnswerInput for KeyInput {
    fn read_answer(&mut self, answer: &mut String) -> Result<bool> {
        terminal::enable_raw_mode().context("failed to switch terminal to raw mode")?;
        let result = read_keys(answer);
        let restored = terminal::disable_raw_mode().context("failed to restore terminal mode");
        let ended = result?;
        restored?;
        Ok(ended)
    }
}

#[derive(Debug, PartialEq, Eq)]
enum KeyAction {
    Echo(char),
    Erase,
    Submit,
    EndOfInput,
    Interrupt,
    Ignore,
}

fn edit_answer(answer: &mut String, key: KeyEvent) -> KeyAction {
    let control = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
        KeyCode::Char('c') if control => KeyAction::Interrupt,
        KeyCode::Char('d') if control && answer.is_empty() => KeyAction::EndOfInput,
        KeyCode::Char(_) if control => KeyAction::Ignore,
        KeyCode::Char(ch) => {
            answer.push(ch);
            KeyAction::Echo(ch)
        }
        KeyCode::Backspace => match answer.pop() {
            Some(_) => KeyAction::Erase,
            None => KeyAction::Ignore,
        },
        KeyCode::Enter => KeyAction::Submit,
        _ => KeyAction::Ignore,
    }
}

fn read_keys(answer: &mut String) -> Result<bool> {
    let mut echo = io::stderr();
    loop {
        let key = match event::read().context("failed to read key")? {
            Event::Key(key) if key.kind != KeyEventKind::Release => key,
            _ => continue,
        };
        match edit_answer(answer, key) {
            KeyAction::Echo(ch) => {
                echo.queue(Print(ch))?;
            }
            KeyAction::Erase => {
                echo.queue(Print("\u{8} \u{8}"))?;
            }
            KeyAction::Submit => {
                echo.queue(Print("\r\n"))?.flush()?;
                return Ok(true);
            }
            KeyAction::EndOfInput => {
                echo.queue(Print("\r\n"))?.flush()?;
                return Ok(false);
            }
            KeyAction::Interrupt => {
                echo.queue(Print("^C\r\n"))?.flush()?;
                return Err(anyhow!("prompt interrupted"));
            }
            KeyAction::Ignore => {}
        }
        echo.flush()?;
    }
}

pub(crate) struct StreamPrompter<W> {
    input: Box<dyn AnswerInput>,
    output: W,
    style: OutputStyle,
}

impl StreamPrompter<Stderr> {
    pub(crate) fn terminal(style: OutputStyle) -> Self {
        let stdin = io::stdin();
        let input: Box<dyn AnswerInput> = if stdin.is_terminal() {
            Box::new(KeyInput)
        } else {
            Box::new(LineInput(stdin.lock()))
        };
        Self::new(input, io::stderr(), style)
    }
}

impl<W: Write> StreamPrompter<W> {
    pub(crate) fn new(input: Box<dyn AnswerInput>, output: W, style: OutputStyle) -> Self {
        Self {
            input,
            output,
            style,
        }
    }

    fn paint(&mut self, content: StyledContent<&str>) -> io::Result<()> {
        match self.style {
            OutputStyle::Rich => self.output.queue(Print(content))?,
            OutputStyle::Plain => self.output.queue(Print(*content.content()))?,
        };
        Ok(())
    }

    fn ask(&mut self, label: &str, items: &[String], default: usize) -> io::Result<()> {
        self.paint("? ".green().bold())?;
        self.paint(label.bold())?;
        self.output.queue(Print("\n"))?;
        for (index, item) in items.iter().enumerate() {
            let line = format!("  {}) {}", index + 1, item);
            if index == default {
                self.paint(line.as_str().cyan())?;
                self.paint(" (default)".dim())?;
            } else {
                self.output.queue(Print(line))?;
            }
            self.output.queue(Print("\n"))?;
        }
        self.paint("  > ".dim())?;
        self.output.flush()
    }

    fn complain(&mut self, answer: &str, count: usize) -> io::Result<()> {
        let message = format!("  invalid choice '{answer}', enter a number between 1 and {count}\n");
        self.paint(message.as_str().red())?;
        self.output.flush()
    }
}

impl<W: Write> Prompter for StreamPrompter<W> {
    fn select(&mut self, label: &str, items: &[String], default: usize) -> Result<usize> {
        if items.is_empty() {
            return Err(anyhow!("nothing to choose from for '{label}'"));
        }
        let default = default.min(items.len() - 1);
        let mut answer = String::with_capacity(16);

        loop {
            self.ask(label, items, default)
                .context("failed to draw prompt")?;

            answer.clear();
            if !self.input.read_answer(&mut answer)? {
                return Err(anyhow!("prompt cancelled"));
            }

            match parse_answer(answer.trim(), items, default) {
                Some(index) => return Ok(index),
                None => self
                    .complain(answer.trim(), items.len())
                    .context("failed to draw prompt")?,
            }
        }
    }
}

fn parse_answer(answer: &str, items: &[String], default: usize) -> Option<usize> {
    if answer.is_empty() {
        return Some(default);
    }
    if let Ok(number) = answer.parse::<usize>() {
        if (1..=items.len()).contains(&number) {
            return Some(number - 1);
        }
    }
    items.iter().position(|item| item == answer)
}
