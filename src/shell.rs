//! The interactive prompt loop.
//!
//! The shell is a Larch application: each typed line is a message, the
//! model remembers which question is pending (a command, a new item, an
//! item number, replacement text) and the view is the output produced so
//! far plus the next prompt.

use std::io::{BufRead, Write};

use chrono::{DateTime, Local};
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use tracing::{debug, info};

use crate::action::{normalize_action, Action};
use crate::error::{Result, TodoError};
use crate::larch::LarchMinimal;
use crate::list::{parse_item_number, TodoList};
use crate::store::TodoStore;

const COMMAND_PROMPT: &str = "Type add, show, edit, complete or quit: ";
const ADD_PROMPT: &str = "Enter a todo (blank line to finish): ";
const EDIT_PICK_PROMPT: &str = "Number of the todo to edit (blank line to finish): ";
const COMPLETE_PROMPT: &str = "Number of the todo to complete: ";

pub struct ShellFlags {
    pub store: TodoStore,
    pub now: DateTime<Local>,
}

/// What the next typed line answers.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum Mode {
    Command,
    Adding,
    EditPick,
    EditText { number: usize, repeat: bool },
    CompletePick,
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub enum Msg {
    Line(String),
    Run(Action),
    Eof,
}

#[derive(Debug)]
pub struct Session {
    store: TodoStore,
    list: TodoList,
    mode: Mode,
    output: Vec<String>,
    finished: bool,
}

impl Session {
    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn list(&self) -> &TodoList {
        &self.list
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn clear_output(&mut self) {
        self.output.clear();
    }

    fn say(&mut self, line: impl Into<String>) {
        self.output.push(line.into());
    }

    fn reload(&mut self) -> Result<()> {
        self.list = self.store.load()?;
        Ok(())
    }

    // User mistakes become a message; anything else propagates.
    fn attempt<T>(&mut self, res: Result<T>) -> Result<Option<T>> {
        match res {
            Ok(v) => Ok(Some(v)),
            Err(e) if e.is_recoverable() => {
                let msg = match e {
                    TodoError::InvalidNumber(_) => "Your command is not valid.",
                    TodoError::NoSuchItem { .. } => "There is no item with that number.",
                    _ => "A todo cannot be empty.",
                };
                self.say(msg);
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    // Every write starts from the file as it is now, not from `self.list`.
    fn mutate<T, F>(&mut self, f: F) -> Result<Option<T>>
    where
        F: FnOnce(&mut TodoList) -> Result<T>,
    {
        let res = self.store.update(f);
        match self.attempt(res)? {
            Some((list, out)) => {
                self.list = list;
                Ok(Some(out))
            }
            None => {
                self.reload()?;
                Ok(None)
            }
        }
    }

    // Parses `input` and checks it names an existing item.
    fn existing_number(&mut self, input: &str) -> Result<Option<usize>> {
        let res = parse_item_number(input).and_then(|n| match self.list.get(n) {
            Some(_) => Ok(n),
            None => Err(TodoError::NoSuchItem {
                number: n,
                len: self.list.len(),
            }),
        });
        self.attempt(res)
    }

    fn add(&mut self, text: &str) -> Result<()> {
        if let Some(item) = self.mutate(|list| list.add(text).map(str::to_string))? {
            info!(item = %item, "added todo");
        }
        Ok(())
    }

    fn edit(&mut self, number: usize, text: &str) -> Result<()> {
        if let Some(old) = self.mutate(|list| list.edit(number, text))? {
            info!(number, old = %old, "edited todo");
        }
        Ok(())
    }

    fn complete(&mut self, input: &str) -> Result<()> {
        let number = match self.attempt(parse_item_number(input))? {
            Some(n) => n,
            None => return Ok(()),
        };
        if let Some(item) = self.mutate(|list| list.complete(number))? {
            info!(item = %item, "completed todo");
            self.say(format!("Todo \"{}\" was removed from the list.", item));
        }
        Ok(())
    }

    fn show(&mut self) {
        if self.list.is_empty() {
            self.say("Your list is empty.");
            return;
        }
        let lines: Vec<String> = self
            .list
            .iter()
            .enumerate()
            .map(|(i, item)| format!("{}-{}", i + 1, item))
            .collect();
        self.output.extend(lines);
    }

    fn start_edit(&mut self, number: usize, repeat: bool) {
        if let Some(item) = self.list.get(number) {
            let line = format!("Editing {}-{}", number, item);
            self.say(line);
        }
        self.mode = Mode::EditText { number, repeat };
    }

    fn run(&mut self, action: Action) -> Result<()> {
        self.reload()?;
        match action {
            Action::Add(Some(text)) => self.add(&text)?,
            Action::Add(None) => self.mode = Mode::Adding,
            Action::Edit(Some(arg)) => {
                if let Some(n) = self.existing_number(&arg)? {
                    self.start_edit(n, false);
                }
            }
            Action::Edit(None) => self.mode = Mode::EditPick,
            Action::Show => self.show(),
            Action::Complete(Some(arg)) => self.complete(&arg)?,
            Action::Complete(None) => self.mode = Mode::CompletePick,
            Action::Quit => {
                self.say("Bye!");
                self.finished = true;
            }
            Action::Unknown(_) => self.say("Command is not valid."),
        }
        Ok(())
    }

    fn answer(&mut self, line: String) -> Result<Option<Msg>> {
        let blank = line.trim().is_empty();
        match self.mode {
            Mode::Command if blank => {}
            Mode::Command => return Ok(Some(Msg::Run(normalize_action(&line)))),
            Mode::Adding if blank => self.mode = Mode::Command,
            Mode::Adding => self.add(&line)?,
            Mode::EditPick if blank => self.mode = Mode::Command,
            Mode::EditPick => {
                self.reload()?;
                if let Some(n) = self.existing_number(&line)? {
                    self.start_edit(n, true);
                }
            }
            Mode::EditText { number, repeat } => {
                if blank {
                    self.say(format!("Todo {} unchanged.", number));
                } else {
                    self.edit(number, &line)?;
                }
                self.mode = if repeat { Mode::EditPick } else { Mode::Command };
            }
            Mode::CompletePick => {
                if !blank {
                    self.complete(&line)?;
                }
                self.mode = Mode::Command;
            }
        }
        Ok(None)
    }
}

/// What the driver shows: pending output, then the prompt (none once the
/// session is over).
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct View {
    pub lines: Vec<String>,
    pub prompt: Option<String>,
}

pub struct TodoShell;

impl LarchMinimal for TodoShell {
    type Flags = ShellFlags;
    type Model = Session;
    type Msg = Msg;
    type View = View;

    fn init(flags: Self::Flags) -> Self::Model {
        Session {
            store: flags.store,
            list: TodoList::new(),
            mode: Mode::Command,
            output: vec![format!("It is {}", flags.now.format("%b %d, %Y %H:%M:%S"))],
            finished: false,
        }
    }

    fn update(msg: Self::Msg, mut model: Self::Model) -> Result<(Self::Model, Option<Self::Msg>)> {
        let follow_up = match msg {
            Msg::Eof => {
                model.finished = true;
                None
            }
            Msg::Run(action) => {
                model.run(action)?;
                None
            }
            Msg::Line(line) => model.answer(line)?,
        };
        Ok((model, follow_up))
    }

    fn view(model: &Self::Model) -> Self::View {
        let prompt = if model.finished {
            None
        } else {
            Some(match model.mode {
                Mode::Command => COMMAND_PROMPT.to_string(),
                Mode::Adding => ADD_PROMPT.to_string(),
                Mode::EditPick => EDIT_PICK_PROMPT.to_string(),
                Mode::EditText { number, .. } => format!("New text for todo {}: ", number),
                Mode::CompletePick => COMPLETE_PROMPT.to_string(),
            })
        };
        View {
            lines: model.output.clone(),
            prompt,
        }
    }
}

/// Where typed lines come from.
pub trait LineSource {
    /// Shows `prompt` and returns the next line, or `None` at end of input.
    fn read_line(&mut self, prompt: &str) -> Result<Option<String>>;
}

/// Interactive terminal input with line editing and history.
pub struct Terminal {
    editor: DefaultEditor,
}

impl Terminal {
    pub fn new() -> Result<Terminal> {
        Ok(Terminal {
            editor: DefaultEditor::new()?,
        })
    }
}

impl LineSource for Terminal {
    fn read_line(&mut self, prompt: &str) -> Result<Option<String>> {
        match self.editor.readline(prompt) {
            Ok(line) => {
                if !line.trim().is_empty() {
                    if let Err(e) = self.editor.add_history_entry(line.as_str()) {
                        debug!(error = %e, "history entry not recorded");
                    }
                }
                Ok(Some(line))
            }
            Err(ReadlineError::Eof) | Err(ReadlineError::Interrupted) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

/// Plain buffered input for pipes and tests; prompts go to `echo`.
pub struct Piped<R, W> {
    reader: R,
    echo: W,
}

impl<R: BufRead, W: Write> Piped<R, W> {
    pub fn new(reader: R, echo: W) -> Piped<R, W> {
        Piped { reader, echo }
    }
}

impl<R: BufRead, W: Write> LineSource for Piped<R, W> {
    fn read_line(&mut self, prompt: &str) -> Result<Option<String>> {
        write!(self.echo, "{}", prompt)
            .and_then(|_| self.echo.flush())
            .map_err(|e| TodoError::io("write", "stdout", e))?;
        let mut line = String::new();
        let read = self
            .reader
            .read_line(&mut line)
            .map_err(|e| TodoError::io("read", "stdin", e))?;
        if read == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
    }
}

/// Runs the prompt loop until `quit` or end of input.
pub fn run_shell<S, W>(flags: ShellFlags, source: &mut S, out: &mut W) -> Result<()>
where
    S: LineSource,
    W: Write,
{
    let mut model = TodoShell::init(flags);
    loop {
        let view = TodoShell::view(&model);
        for line in &view.lines {
            writeln!(out, "{}", line).map_err(|e| TodoError::io("write", "stdout", e))?;
        }
        model.clear_output();

        let prompt = match view.prompt {
            Some(prompt) => prompt,
            None => break,
        };
        let msg = match source.read_line(&prompt)? {
            Some(line) => Msg::Line(line),
            None => Msg::Eof,
        };
        model = TodoShell::dispatch(msg, model)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::fs;
    use tempfile::TempDir;

    fn session(dir: &TempDir, contents: &str) -> Session {
        let store = TodoStore::new(dir.path().join("todo.txt"));
        fs::write(store.path(), contents).unwrap();
        TodoShell::init(ShellFlags {
            store,
            now: Local.with_ymd_and_hms(2024, 4, 20, 9, 30, 0).unwrap(),
        })
    }

    fn feed(mut model: Session, lines: &[&str]) -> Session {
        for line in lines {
            model = TodoShell::dispatch(Msg::Line(line.to_string()), model).unwrap();
        }
        model
    }

    fn file(dir: &TempDir) -> String {
        fs::read_to_string(dir.path().join("todo.txt")).unwrap()
    }

    #[test]
    fn greets_with_the_time() {
        let dir = TempDir::new().unwrap();
        let model = session(&dir, "");
        let view = TodoShell::view(&model);
        assert_eq!(view.lines, vec!["It is Apr 20, 2024 09:30:00".to_string()]);
        assert_eq!(view.prompt.as_deref(), Some(COMMAND_PROMPT));
    }

    #[test]
    fn add_with_text_appends_one() {
        let dir = TempDir::new().unwrap();
        let model = feed(session(&dir, "Buy milk\n"), &["n call the bank"]);
        assert_eq!(file(&dir), "Buy milk\nCall the bank\n");
        assert_eq!(model.mode(), Mode::Command);
    }

    #[test]
    fn bare_add_prompts_until_blank() {
        let dir = TempDir::new().unwrap();
        let model = feed(session(&dir, ""), &["a", "one", "two"]);
        assert_eq!(model.mode(), Mode::Adding);
        let model = feed(model, &[""]);
        assert_eq!(model.mode(), Mode::Command);
        assert_eq!(file(&dir), "One\nTwo\n");
    }

    #[test]
    fn show_numbers_items() {
        let dir = TempDir::new().unwrap();
        let mut model = session(&dir, "Buy milk\nPay rent\n");
        model.clear_output();
        let model = feed(model, &["d"]);
        assert_eq!(TodoShell::view(&model).lines, vec!["1-Buy milk", "2-Pay rent"]);
    }

    #[test]
    fn show_empty_list() {
        let dir = TempDir::new().unwrap();
        let mut model = session(&dir, "");
        model.clear_output();
        let model = feed(model, &["show"]);
        assert_eq!(TodoShell::view(&model).lines, vec!["Your list is empty."]);
    }

    #[test]
    fn edit_with_number_replaces_item() {
        let dir = TempDir::new().unwrap();
        let model = feed(session(&dir, "Buy milk\nPay rent\n"), &["e 2"]);
        assert_eq!(
            model.mode(),
            Mode::EditText {
                number: 2,
                repeat: false
            }
        );
        assert_eq!(
            TodoShell::view(&model).prompt.as_deref(),
            Some("New text for todo 2: ")
        );
        let model = feed(model, &["pay the rent"]);
        assert_eq!(model.mode(), Mode::Command);
        assert_eq!(file(&dir), "Buy milk\nPay the rent\n");
    }

    #[test]
    fn bare_edit_loops_until_blank() {
        let dir = TempDir::new().unwrap();
        let model = feed(
            session(&dir, "a\nb\n"),
            &["edit", "1", "first", "2", "", ""],
        );
        assert_eq!(model.mode(), Mode::Command);
        assert_eq!(file(&dir), "First\nb\n");
        assert!(TodoShell::view(&model)
            .lines
            .contains(&"Todo 2 unchanged.".to_string()));
    }

    #[test]
    fn complete_with_number_removes() {
        let dir = TempDir::new().unwrap();
        let mut model = session(&dir, "Buy milk\nPay rent\n");
        model.clear_output();
        let model = feed(model, &["c 1"]);
        assert_eq!(file(&dir), "Pay rent\n");
        assert_eq!(
            TodoShell::view(&model).lines,
            vec!["Todo \"Buy milk\" was removed from the list."]
        );
    }

    #[test]
    fn bare_complete_asks_once() {
        let dir = TempDir::new().unwrap();
        let model = feed(session(&dir, "Buy milk\nPay rent\n"), &["complete"]);
        assert_eq!(model.mode(), Mode::CompletePick);
        let model = feed(model, &["2"]);
        assert_eq!(model.mode(), Mode::Command);
        assert_eq!(file(&dir), "Buy milk\n");
    }

    #[test]
    fn bad_numbers_are_reported_and_survived() {
        let dir = TempDir::new().unwrap();
        let mut model = session(&dir, "Buy milk\n");
        model.clear_output();
        let model = feed(model, &["c two", "c 9", "e 0"]);
        assert_eq!(
            TodoShell::view(&model).lines,
            vec![
                "Your command is not valid.",
                "There is no item with that number.",
                "Your command is not valid.",
            ]
        );
        assert_eq!(model.mode(), Mode::Command);
        assert_eq!(file(&dir), "Buy milk\n");
    }

    #[test]
    fn unknown_command() {
        let dir = TempDir::new().unwrap();
        let mut model = session(&dir, "");
        model.clear_output();
        let model = feed(model, &["delete 3"]);
        assert_eq!(TodoShell::view(&model).lines, vec!["Command is not valid."]);
    }

    #[test]
    fn sees_changes_made_by_others() {
        let dir = TempDir::new().unwrap();
        let model = feed(session(&dir, "Buy milk\n"), &["show"]);
        fs::write(dir.path().join("todo.txt"), "Buy milk\nWater plants\n").unwrap();
        let mut model = model;
        model.clear_output();
        let model = feed(model, &["s"]);
        assert_eq!(model.list().len(), 2);
    }

    #[test]
    fn adding_keeps_items_written_meanwhile() {
        let dir = TempDir::new().unwrap();
        let model = feed(session(&dir, "Buy milk\n"), &["a"]);
        fs::write(dir.path().join("todo.txt"), "Buy milk\nFrom web\n").unwrap();
        let model = feed(model, &["one"]);
        assert_eq!(file(&dir), "Buy milk\nFrom web\nOne\n");
        assert_eq!(model.list().len(), 3);
    }

    #[test]
    fn editing_keeps_items_written_meanwhile() {
        let dir = TempDir::new().unwrap();
        let model = feed(session(&dir, "Buy milk\nPay rent\n"), &["e 2"]);
        fs::write(dir.path().join("todo.txt"), "Buy milk\nPay rent\nFrom web\n").unwrap();
        let model = feed(model, &["pay the rent"]);
        assert_eq!(file(&dir), "Buy milk\nPay the rent\nFrom web\n");
        assert_eq!(model.mode(), Mode::Command);
    }

    #[test]
    fn editing_an_item_removed_meanwhile_is_reported() {
        let dir = TempDir::new().unwrap();
        let mut model = feed(session(&dir, "Buy milk\nPay rent\n"), &["e 2"]);
        fs::write(dir.path().join("todo.txt"), "Buy milk\n").unwrap();
        model.clear_output();
        let model = feed(model, &["pay the rent"]);
        assert_eq!(
            TodoShell::view(&model).lines,
            vec!["There is no item with that number."]
        );
        assert_eq!(file(&dir), "Buy milk\n");
    }

    #[test]
    fn completing_uses_current_file() {
        let dir = TempDir::new().unwrap();
        let model = feed(session(&dir, "Buy milk\nPay rent\n"), &["c"]);
        fs::write(dir.path().join("todo.txt"), "From web\nBuy milk\nPay rent\n").unwrap();
        let mut model = model;
        model.clear_output();
        let model = feed(model, &["1"]);
        assert_eq!(file(&dir), "Buy milk\nPay rent\n");
        assert_eq!(
            TodoShell::view(&model).lines,
            vec!["Todo \"From web\" was removed from the list."]
        );
    }

    #[test]
    fn quit_ends_session() {
        let dir = TempDir::new().unwrap();
        let model = feed(session(&dir, ""), &["exit"]);
        assert!(model.is_finished());
        assert_eq!(TodoShell::view(&model).prompt, None);
    }

    #[test]
    fn run_shell_over_piped_input() {
        let dir = TempDir::new().unwrap();
        let store = TodoStore::new(dir.path().join("todo.txt"));
        let input = b"add buy milk\nadd\nwalk dog\n\nshow\nq\nshow\n";
        let mut source = Piped::new(&input[..], std::io::sink());
        let mut out = Vec::new();
        run_shell(
            ShellFlags {
                store,
                now: Local::now(),
            },
            &mut source,
            &mut out,
        )
        .unwrap();
        let out = String::from_utf8(out).unwrap();
        assert!(out.contains("1-Buy milk\n2-Walk dog\nBye!\n"));
        assert_eq!(file(&dir), "Buy milk\nWalk dog\n");
    }

    #[test]
    fn run_shell_stops_at_end_of_input() {
        let dir = TempDir::new().unwrap();
        let store = TodoStore::new(dir.path().join("todo.txt"));
        let mut source = Piped::new(&b"a first"[..], Vec::new());
        let mut out = Vec::new();
        run_shell(
            ShellFlags {
                store,
                now: Local::now(),
            },
            &mut source,
            &mut out,
        )
        .unwrap();
        assert_eq!(file(&dir), "First\n");
        assert!(String::from_utf8(source.echo).unwrap().starts_with(COMMAND_PROMPT));
    }
}
