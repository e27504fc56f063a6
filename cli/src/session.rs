//! Workbook commands understood by the REPL.

use reckon::{
    Document, EngineOptions, EvaluationState, ExpressionId, GroupId, Propagation,
    WorkbookError, render_error,
};
use reckon_core::graph::ExpressionStore;
use tracing::debug;

#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error("nothing at \"{0}\"")]
    UnknownPath(String),
    #[error("usage: {0}")]
    Usage(&'static str),
    #[error(transparent)]
    Workbook(#[from] WorkbookError),
}

/// One line of REPL input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Help,
    Group(String),
    Let { path: String, text: String },
    Show(Option<String>),
    Demand(String),
    Move { path: String, into: String },
    Rename { path: String, name: String },
    Remove(String),
    Deps(String),
    Eval(String),
}

impl Command {
    pub fn parse(line: &str) -> Result<Command, CommandError> {
        let line = line.trim();
        let (head, rest) = line
            .split_once(char::is_whitespace)
            .map(|(h, r)| (h, r.trim()))
            .unwrap_or((line, ""));
        let words: Vec<&str> = rest.split_whitespace().collect();
        let command = match head {
            "help" | "?" => Command::Help,
            "group" => match words.as_slice() {
                [path] => Command::Group(absolute(path)),
                _ => return Err(CommandError::Usage("group <path>")),
            },
            "let" => {
                let Some((path, text)) = rest.split_once('=') else {
                    return Err(CommandError::Usage("let <path> = <expression>"));
                };
                Command::Let {
                    path: absolute(path.trim()),
                    text: text.trim().to_string(),
                }
            }
            "show" | "ls" => match words.as_slice() {
                [] => Command::Show(None),
                [path] => Command::Show(Some(absolute(path))),
                _ => return Err(CommandError::Usage("show [path]")),
            },
            "demand" | "reroll" => match words.as_slice() {
                [path] => Command::Demand(absolute(path)),
                _ => return Err(CommandError::Usage("demand <path>")),
            },
            "mv" => match words.as_slice() {
                [path, into] => Command::Move {
                    path: absolute(path),
                    into: absolute(into),
                },
                _ => return Err(CommandError::Usage("mv <path> <group>")),
            },
            "rename" => match words.as_slice() {
                [path, name] => Command::Rename {
                    path: absolute(path),
                    name: name.to_string(),
                },
                _ => return Err(CommandError::Usage("rename <path> <name>")),
            },
            "rm" => match words.as_slice() {
                [path] => Command::Remove(absolute(path)),
                _ => return Err(CommandError::Usage("rm <path>")),
            },
            "deps" => match words.as_slice() {
                [path] => Command::Deps(absolute(path)),
                _ => return Err(CommandError::Usage("deps <path>")),
            },
            _ => Command::Eval(line.to_string()),
        };
        Ok(command)
    }
}

fn absolute(path: &str) -> String {
    if path.starts_with('/') {
        path.to_string()
    } else {
        format!("/{}", path)
    }
}

const HELP: &str = "\
commands:
  group <path>               create a group and its parents
  let <path> = <expression>  create or edit an expression
  show [path]                list a group, or show one expression
  demand <path>              evaluate again, re-rolling dice
  mv <path> <group>          move an expression or group
  rename <path> <name>       rename an expression or group
  rm <path>                  delete an expression or group
  deps <path>                list direct dependents
anything else is evaluated at the root";

enum Target {
    Expression(ExpressionId),
    Group(GroupId),
}

/// A workbook being edited from the command line.
pub struct Session {
    doc: Document,
    debug_tokens: bool,
}

impl Session {
    pub fn new(options: EngineOptions, debug_tokens: bool) -> Self {
        Self {
            doc: Document::new(options),
            debug_tokens,
        }
    }

    #[cfg(test)]
    pub fn document(&self) -> &Document {
        &self.doc
    }

    /// Run one line of input and print what it did.
    pub fn run_line(&mut self, line: &str) {
        if line.trim().is_empty() {
            return;
        }
        let outcome = Command::parse(line).and_then(|command| self.run(command));
        if let Err(err) = outcome {
            eprintln!("error: {}", err);
        }
    }

    pub fn run(&mut self, command: Command) -> Result<(), CommandError> {
        debug!(?command, "Running command");
        match command {
            Command::Help => println!("{}", HELP),
            Command::Group(path) => {
                self.ensure_group(&path)?;
            }
            Command::Let { path, text } => self.assign(&path, &text)?,
            Command::Show(None) => self.show_group(self.doc.root(), ""),
            Command::Show(Some(path)) => match self.target(&path)? {
                Target::Expression(id) => self.show_expression(id),
                Target::Group(id) => self.show_group(id, &path),
            },
            Command::Demand(path) => {
                let id = self.expression_at(&path)?;
                let edit = self.doc.demand(id)?;
                self.show_expression(id);
                if let Some(propagation) = &edit.propagation {
                    self.report(propagation);
                }
            }
            Command::Move { path, into } => {
                let into = self
                    .doc
                    .workbook()
                    .find_group(&into)
                    .ok_or(CommandError::UnknownPath(into))?;
                let rewritten = match self.target(&path)? {
                    Target::Expression(id) => self.doc.move_expression(id, into)?,
                    Target::Group(id) => self.doc.move_group(id, into)?,
                };
                self.list("rewrote", &rewritten);
            }
            Command::Rename { path, name } => {
                let rewritten = match self.target(&path)? {
                    Target::Expression(id) => self.doc.rename_expression(id, &name)?,
                    Target::Group(id) => self.doc.rename_group(id, &name)?,
                };
                self.list("rewrote", &rewritten);
            }
            Command::Remove(path) => {
                let stale = match self.target(&path)? {
                    Target::Expression(id) => self.doc.delete_expression(id)?,
                    Target::Group(id) => self.doc.delete_group(id)?,
                };
                self.list("out of date", &stale);
            }
            Command::Deps(path) => {
                let id = self.expression_at(&path)?;
                let dependents = self.doc.workbook().direct_dependents(id);
                self.list("used by", &dependents);
            }
            Command::Eval(text) => self.evaluate(&text),
        }
        Ok(())
    }

    fn evaluate(&mut self, text: &str) {
        if self.debug_tokens {
            match self.doc.tokenize("", text) {
                Ok(tokens) => {
                    println!("=== Tokens ===");
                    for token in &tokens {
                        println!("{:>3}..{:<3} {:?}", token.span.start, token.span.end, token.kind);
                    }
                    println!();
                }
                Err(e) => render_error(&e, text),
            }
        }
        match self.doc.evaluate_in("", text) {
            Ok(evaluation) if evaluation.is_static => println!("{}", evaluation.value),
            Ok(evaluation) => println!("{} (dynamic)", evaluation.value),
            Err(e) => render_error(&e, text),
        }
    }

    fn assign(&mut self, path: &str, text: &str) -> Result<(), CommandError> {
        let edit = match self.doc.find(path) {
            Some(id) => self.doc.edit(id, text)?,
            None => {
                let (parent, name) = path.rsplit_once('/').unwrap_or(("", path));
                let group = self.ensure_group(parent)?;
                let (_, edit) = self.doc.add_expression(group, name, text)?;
                edit
            }
        };
        match &edit.propagation {
            Some(propagation) => {
                println!("{} = {}", path, edit.result.value);
                self.report(propagation);
            }
            None => eprintln!("rejected: {}", edit.result.error_text),
        }
        Ok(())
    }

    /// Find or create the group at `path`, creating missing parents.
    fn ensure_group(&mut self, path: &str) -> Result<GroupId, CommandError> {
        let mut group = self.doc.root();
        for name in path.split('/').filter(|s| !s.is_empty()) {
            let existing = self
                .doc
                .workbook()
                .children(group)
                .0
                .into_iter()
                .find(|id| self.doc.workbook().group(*id).is_some_and(|g| g.name == name));
            group = match existing {
                Some(id) => id,
                None => self.doc.add_group(group, name)?,
            };
        }
        Ok(group)
    }

    fn target(&self, path: &str) -> Result<Target, CommandError> {
        if let Some(id) = self.doc.find(path) {
            return Ok(Target::Expression(id));
        }
        self.doc
            .workbook()
            .find_group(path)
            .map(Target::Group)
            .ok_or_else(|| CommandError::UnknownPath(path.to_string()))
    }

    fn expression_at(&self, path: &str) -> Result<ExpressionId, CommandError> {
        self.doc
            .find(path)
            .ok_or_else(|| CommandError::UnknownPath(path.to_string()))
    }

    fn show_group(&self, id: GroupId, path: &str) {
        let workbook = self.doc.workbook();
        let (groups, expressions) = workbook.children(id);
        if groups.is_empty() && expressions.is_empty() {
            println!("{} is empty", if path.is_empty() { "/" } else { path });
        }
        for group in groups {
            println!("{}/", workbook.group_path(group));
        }
        for expression in expressions {
            self.show_expression(expression);
        }
    }

    fn show_expression(&self, id: ExpressionId) {
        let workbook = self.doc.workbook();
        let Some(expression) = workbook.expression(id) else {
            return;
        };
        let path = workbook.expression_path(id).unwrap_or_default();
        let marker = match expression.state() {
            EvaluationState::Ready => "",
            EvaluationState::Error => " (error)",
            EvaluationState::OutOfDate => " (out of date)",
        };
        println!(
            "{} = {}  => {}{}",
            path,
            expression.text,
            expression.result_text(),
            marker
        );
    }

    fn report(&self, propagation: &Propagation) {
        self.list("recomputed", &propagation.recomputed);
        self.list("out of date", &propagation.stale);
        self.list("failed", &propagation.failed);
    }

    fn list(&self, label: &str, ids: &[ExpressionId]) {
        if ids.is_empty() {
            return;
        }
        let paths: Vec<String> = ids
            .iter()
            .filter_map(|id| self.doc.workbook().expression_path(*id))
            .collect();
        println!("  {}: {}", label, paths.join(", "));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use reckon::Value;

    fn session() -> Session {
        Session::new(
            EngineOptions {
                seed: Some(1),
                ..Default::default()
            },
            false,
        )
    }

    #[test]
    fn test_parse_commands() {
        assert_eq!(
            Command::parse("let stats/str = 14 + 2").unwrap(),
            Command::Let {
                path: "/stats/str".into(),
                text: "14 + 2".into()
            }
        );
        assert_eq!(
            Command::parse("mv /a/b c").unwrap(),
            Command::Move {
                path: "/a/b".into(),
                into: "/c".into()
            }
        );
        assert_eq!(Command::parse("show").unwrap(), Command::Show(None));
        assert_eq!(
            Command::parse("1 + 2").unwrap(),
            Command::Eval("1 + 2".into())
        );
        assert!(matches!(
            Command::parse("rm"),
            Err(CommandError::Usage(_))
        ));
    }

    #[test]
    fn test_let_creates_groups_and_edits() {
        let mut session = session();
        session
            .run(Command::parse("let stats/str = 14").unwrap())
            .unwrap();
        session
            .run(Command::parse("let stats/bonus = (@(..str) - 10) / 2").unwrap())
            .unwrap();
        session
            .run(Command::parse("let stats/str = 18").unwrap())
            .unwrap();

        let doc = session.document();
        let bonus = doc.find("/stats/bonus").unwrap();
        assert_eq!(doc.expression(bonus).unwrap().result.value, Value::Double(4.0));
    }

    #[test]
    fn test_rename_and_remove_by_path() {
        let mut session = session();
        session.run(Command::parse("let g/x = 2").unwrap()).unwrap();
        session.run(Command::parse("let y = @(g/x) * 2").unwrap()).unwrap();
        session.run(Command::parse("rename g h").unwrap()).unwrap();

        let doc = session.document();
        let y = doc.find("/y").unwrap();
        assert_eq!(doc.expression(y).unwrap().text, "@(h/x) * 2");

        session.run(Command::parse("rm h").unwrap()).unwrap();
        let doc = session.document();
        assert_eq!(
            doc.expression(y).unwrap().state(),
            EvaluationState::OutOfDate
        );
        assert!(matches!(
            session.run(Command::parse("deps h/x").unwrap()),
            Err(CommandError::UnknownPath(_))
        ));
    }
}
