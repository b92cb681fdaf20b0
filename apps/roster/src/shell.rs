use std::io::{self, BufRead, Write};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use products_hr::{Employee, EmployeeStore, FieldUpdate, HrError};
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::RosterConfig;
use crate::render::{self, NO_MATCHES};

#[derive(Parser, Debug)]
#[command(name = "roster", no_binary_name = true)]
struct ShellLine {
    #[command(subcommand)]
    command: ShellCommand,
}

#[derive(Subcommand, Debug)]
enum ShellCommand {
    /// Hire an employee; the id is generated and the record starts active.
    Add {
        name: String,
        department: String,
        #[arg(allow_negative_numbers = true)]
        salary: f64,
        #[arg(allow_negative_numbers = true)]
        rating: f64,
        #[arg(allow_negative_numbers = true)]
        experience: i64,
    },
    /// Change one field: name, department, salary, rating, experience or active.
    Update {
        id: u32,
        field: String,
        #[arg(allow_hyphen_values = true)]
        value: String,
    },
    /// Remove an employee by id.
    Remove { id: u32 },
    /// Show the whole roster.
    #[command(alias = "ls")]
    List,
    /// Match name, department or id.
    Search {
        #[arg(required = true)]
        query: Vec<String>,
    },
    /// Employees in a department (exact, case-insensitive).
    Dept {
        #[arg(required = true)]
        department: Vec<String>,
    },
    /// Employees whose name contains the text.
    Name {
        #[arg(required = true)]
        fragment: Vec<String>,
    },
    /// Employees rated at least MIN.
    Rating {
        #[arg(allow_negative_numbers = true)]
        min: f64,
    },
    /// Employees paid between MIN and MAX inclusive.
    SalaryRange {
        #[arg(allow_negative_numbers = true)]
        min: f64,
        #[arg(allow_negative_numbers = true)]
        max: f64,
    },
    /// Order the roster by a key, highest first.
    Sort {
        #[arg(value_enum)]
        key: SortKey,
    },
    /// Raise everyone at or above a rating.
    Raise {
        #[arg(long, allow_negative_numbers = true)]
        min_rating: Option<f64>,
        #[arg(long, allow_negative_numbers = true)]
        amount: Option<f64>,
    },
    /// Highest paid employees.
    Top { n: Option<usize> },
    /// Average salary of a department.
    Avg {
        #[arg(required = true)]
        department: Vec<String>,
    },
    /// Known departments.
    Departments,
    /// Leave the shell.
    #[command(alias = "exit")]
    Quit,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum SortKey {
    Salary,
    Rating,
    Experience,
}

#[derive(Debug, Error)]
enum CommandError {
    #[error(transparent)]
    Roster(#[from] HrError),
    #[error("{0}")]
    Rejected(&'static str),
    #[error(transparent)]
    Io(#[from] io::Error),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

pub struct Shell<W> {
    store: EmployeeStore<u32>,
    config: RosterConfig,
    next_id: u32,
    out: W,
}

impl<W: Write> Shell<W> {
    pub fn new(store: EmployeeStore<u32>, config: RosterConfig, out: W) -> Self {
        let next_id = config.first_id;
        Self {
            store,
            config,
            next_id,
            out,
        }
    }

    pub fn run(&mut self, input: impl BufRead) -> Result<()> {
        for line in input.lines() {
            let line = line.context("failed to read command")?;
            if self.handle_line(&line)? == Flow::Quit {
                break;
            }
        }
        self.out.flush().context("failed to flush output")?;
        Ok(())
    }

    /// Execute one input line. Roster errors are printed and the shell keeps going.
    pub fn handle_line(&mut self, line: &str) -> Result<Flow> {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            return Ok(Flow::Continue);
        }
        let tokens = match tokenize(trimmed) {
            Ok(tokens) => tokens,
            Err(message) => {
                writeln!(self.out, "error: {message}")?;
                return Ok(Flow::Continue);
            }
        };
        let command = match ShellLine::try_parse_from(tokens) {
            Ok(parsed) => parsed.command,
            Err(err) => {
                write!(self.out, "{}", err.render())?;
                return Ok(Flow::Continue);
            }
        };
        match self.execute(command) {
            Ok(flow) => Ok(flow),
            Err(CommandError::Io(err)) => Err(err.into()),
            Err(err) => {
                warn!(error = %err, "command rejected");
                writeln!(self.out, "error: {err}")?;
                Ok(Flow::Continue)
            }
        }
    }

    #[cfg(test)]
    fn into_parts(self) -> (EmployeeStore<u32>, W) {
        (self.store, self.out)
    }

    fn execute(&mut self, command: ShellCommand) -> Result<Flow, CommandError> {
        debug!(?command, "executing");
        match command {
            ShellCommand::Add {
                name,
                department,
                salary,
                rating,
                experience,
            } => {
                let id = self
                    .allocate_id()
                    .ok_or(CommandError::Rejected("no free employee ids left"))?;
                let employee =
                    Employee::new(id, name, department, salary, rating, experience, true)?;
                writeln!(self.out, "Added {employee}")?;
                self.store.add(employee);
                self.next_id = id.saturating_add(1);
            }
            ShellCommand::Update { id, field, value } => {
                if !self.store.contains(&id) {
                    return Err(HrError::not_found(&id).into());
                }
                let update = FieldUpdate::parse(&field, &value)?;
                self.store.update(&id, update)?;
                if let Some(employee) = self.store.get(&id) {
                    writeln!(self.out, "Updated {employee}")?;
                }
            }
            ShellCommand::Remove { id } => {
                let removed = self.store.remove(&id)?;
                writeln!(self.out, "Removed {removed}")?;
            }
            ShellCommand::List => {
                let mut all = self.store.get_all();
                all.sort_by_key(|employee| *employee.id());
                render::write_rows(&mut self.out, &all, "No employees on the roster")?;
            }
            ShellCommand::Search { query } => {
                let query = query.join(" ");
                if query.trim().is_empty() {
                    return Err(CommandError::Rejected("search query cannot be empty"));
                }
                let hits = self.store.search(&query);
                render::write_rows(&mut self.out, &hits, NO_MATCHES)?;
            }
            ShellCommand::Dept { department } => {
                let hits = self.store.search_by_department(&department.join(" "));
                render::write_rows(&mut self.out, &hits, NO_MATCHES)?;
            }
            ShellCommand::Name { fragment } => {
                let hits = self.store.search_by_name(&fragment.join(" "));
                render::write_rows(&mut self.out, &hits, NO_MATCHES)?;
            }
            ShellCommand::Rating { min } => {
                let hits = self.store.filter_by_performance(min);
                render::write_rows(&mut self.out, &hits, NO_MATCHES)?;
            }
            ShellCommand::SalaryRange { min, max } => {
                let hits = self.store.filter_by_salary_range(min, max);
                render::write_rows(&mut self.out, &hits, NO_MATCHES)?;
            }
            ShellCommand::Sort { key } => {
                let sorted = match key {
                    SortKey::Salary => self.store.sort_by_salary(),
                    SortKey::Rating => self.store.sort_by_performance(),
                    SortKey::Experience => self.store.sort_by_experience(),
                };
                render::write_rows(&mut self.out, &sorted, "No employees on the roster")?;
            }
            ShellCommand::Raise { min_rating, amount } => {
                let min_rating = min_rating.unwrap_or(self.config.raise_min_rating);
                let amount = amount.unwrap_or(self.config.raise_amount);
                let count = self.store.give_raise(min_rating, amount)?;
                writeln!(self.out, "{}", render::raise_line(amount, count, min_rating))?;
            }
            ShellCommand::Top { n } => {
                let top = self.store.top_paid(n.unwrap_or(self.config.top_paid));
                render::write_rows(&mut self.out, &top, "No employees on the roster")?;
            }
            ShellCommand::Avg { department } => {
                let department = department.join(" ");
                let average = self.store.average_salary(&department);
                writeln!(self.out, "{}", render::average_line(&department, average))?;
            }
            ShellCommand::Departments => {
                for department in known_departments(&self.store, &self.config) {
                    writeln!(self.out, "{department}")?;
                }
            }
            ShellCommand::Quit => return Ok(Flow::Quit),
        }
        Ok(Flow::Continue)
    }

    /// First id at or after `next_id` that no employee holds.
    fn allocate_id(&self) -> Option<u32> {
        (self.next_id..=u32::MAX).find(|id| !self.store.contains(id))
    }
}

/// Configured departments followed by any others in use, case-insensitively unique.
pub fn known_departments(store: &EmployeeStore<u32>, config: &RosterConfig) -> Vec<String> {
    let mut names = config.departments.clone();
    for department in store.departments() {
        if !names
            .iter()
            .any(|known| known.to_lowercase() == department.to_lowercase())
        {
            names.push(department);
        }
    }
    names
}

/// Split a line on whitespace, keeping single- or double-quoted runs together.
fn tokenize(line: &str) -> Result<Vec<String>, &'static str> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_token = false;
    let mut quote: Option<char> = None;

    for ch in line.chars() {
        match quote {
            Some(open) if ch == open => quote = None,
            Some(_) => current.push(ch),
            None if ch == '"' || ch == '\'' => {
                quote = Some(ch);
                in_token = true;
            }
            None if ch.is_whitespace() => {
                if in_token {
                    tokens.push(std::mem::take(&mut current));
                    in_token = false;
                }
            }
            None => {
                current.push(ch);
                in_token = true;
            }
        }
    }

    if quote.is_some() {
        return Err("unterminated quote");
    }
    if in_token {
        tokens.push(current);
    }
    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shell() -> Shell<Vec<u8>> {
        let store = [
            Employee::new(1, "John Doe", "IT", 50000.0, 4.5, 5, true),
            Employee::new(2, "Jane Smith", "HR", 60000.0, 4.0, 3, true),
        ]
        .into_iter()
        .map(Result::unwrap)
        .collect();
        Shell::new(store, RosterConfig::default(), Vec::new())
    }

    fn run(shell: &mut Shell<Vec<u8>>, lines: &[&str]) -> String {
        for line in lines {
            shell.handle_line(line).unwrap();
        }
        String::from_utf8(std::mem::take(&mut shell.out)).unwrap()
    }

    #[test]
    fn command_grammar_is_consistent() {
        use clap::CommandFactory;
        ShellLine::command().debug_assert();
    }

    #[test]
    fn tokenizer_respects_quotes() {
        assert_eq!(
            tokenize(r#"add "Mary Ann" 'Quality Assurance' 1 2 3"#).unwrap(),
            vec!["add", "Mary Ann", "Quality Assurance", "1", "2", "3"]
        );
        assert_eq!(tokenize(r#"update 1 name """#).unwrap(), vec!["update", "1", "name", ""]);
        assert!(tokenize(r#"add "oops"#).is_err());
    }

    #[test]
    fn add_generates_ids_from_config() {
        let mut shell = shell();
        let out = run(
            &mut shell,
            &[r#"add "Bob Stone" Finance 70000 3.5 2"#, "add Eve Ops 1 1 1"],
        );
        assert!(out.contains("Added 1000 | Bob Stone | Finance | $70000.00"), "{out}");
        assert!(out.contains("Added 1001 | Eve | Ops"), "{out}");
        let (store, _) = shell.into_parts();
        assert_eq!(store.len(), 4);
    }

    #[test]
    fn invalid_add_reports_and_keeps_id() {
        let mut shell = shell();
        let out = run(&mut shell, &["add Test IT -100 3 1", "add Test IT 100 3 1"]);
        assert!(out.contains("error: invalid salary: cannot be negative"), "{out}");
        assert!(out.contains("Added 1000 | Test"), "{out}");
    }

    #[test]
    fn update_and_remove_follow_store_rules() {
        let mut shell = shell();
        let out = run(
            &mut shell,
            &[
                "update 1 salary 55000",
                "update 1 rating 5.1",
                "update 1 bonus 3",
                "update 99 salary 10000",
                "update 98 bonus 3",
                "update 97 salary abc",
                "remove 99",
                "remove 2",
            ],
        );
        assert!(out.contains("Updated 1 | John Doe | IT | $55000.00"), "{out}");
        assert!(out.contains("error: invalid rating: must be between 0 and 5"), "{out}");
        assert!(out.contains("error: invalid field: bonus"), "{out}");
        assert!(out.contains("error: employee with id 99 not found"), "{out}");
        assert!(out.contains("error: employee with id 98 not found"), "{out}");
        assert!(out.contains("error: employee with id 97 not found"), "{out}");
        assert_eq!(out.matches("invalid field").count(), 1, "{out}");
        assert!(!out.contains("invalid type"), "{out}");
        assert!(out.contains("Removed 2 | Jane Smith"), "{out}");

        let (store, _) = shell.into_parts();
        assert_eq!(store.get(&1).unwrap().salary(), 55000.0);
        assert_eq!(store.get(&1).unwrap().performance_rating(), 4.5);
        assert!(!store.contains(&2));
    }

    #[test]
    fn reports_render_aggregates() {
        let mut shell = shell();
        let out = run(&mut shell, &["avg hr", "top 1", "raise", "avg IT"]);
        assert!(out.contains("Average Salary in hr Department: $60000.00"), "{out}");
        assert!(out.contains("2 | Jane Smith"), "{out}");
        assert!(
            out.contains("Raise of $1000.00 applied to 1 employee with rating >= 4.5"),
            "{out}"
        );
        assert!(out.contains("Average Salary in IT Department: $51000.00"), "{out}");
    }

    #[test]
    fn add_never_overwrites_when_ids_run_out() {
        let keeper = Employee::new(u32::MAX, "Keeper", "IT", 1.0, 1.0, 1, true).unwrap();
        let config = RosterConfig {
            first_id: u32::MAX,
            ..RosterConfig::default()
        };
        let mut shell = Shell::new([keeper].into_iter().collect(), config, Vec::new());
        let out = run(&mut shell, &["add Newbie HR 5 1 1"]);
        assert!(out.contains("error: no free employee ids left"), "{out}");
        assert!(!out.contains("Added"), "{out}");

        let (store, _) = shell.into_parts();
        assert_eq!(store.len(), 1);
        assert_eq!(store.get(&u32::MAX).unwrap().name(), "Keeper");
    }

    #[test]
    fn add_takes_the_last_id_once() {
        let config = RosterConfig {
            first_id: u32::MAX,
            ..RosterConfig::default()
        };
        let mut shell = Shell::new(EmployeeStore::new(), config, Vec::new());
        let out = run(&mut shell, &["add First HR 5 1 1", "add Second HR 5 1 1"]);
        assert!(out.contains(&format!("Added {} | First", u32::MAX)), "{out}");
        assert!(out.contains("error: no free employee ids left"), "{out}");

        let (store, _) = shell.into_parts();
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn blank_search_is_rejected() {
        let mut shell = shell();
        let out = run(&mut shell, &["search \"\"", "search '   '"]);
        assert_eq!(out.matches("error: search query cannot be empty").count(), 2, "{out}");
        assert!(!out.contains(NO_MATCHES), "{out}");
    }

    #[test]
    fn searches_report_empty_results() {
        let mut shell = shell();
        let out = run(&mut shell, &["search legal", "dept \"Quality Assurance\"", "name jane"]);
        assert_eq!(out.matches(NO_MATCHES).count(), 2, "{out}");
        assert!(out.contains("2 | Jane Smith"), "{out}");
    }

    #[test]
    fn sort_and_filters_print_rows() {
        let mut shell = shell();
        let out = run(&mut shell, &["sort salary"]);
        let first = out.lines().next().unwrap();
        assert!(first.starts_with("2 |"), "{out}");

        let out = run(&mut shell, &["rating 4.5", "salary-range 55000 65000"]);
        assert_eq!(out.lines().count(), 2, "{out}");
    }

    #[test]
    fn parse_errors_do_not_stop_the_shell() {
        let mut shell = shell();
        let out = run(&mut shell, &["frobnicate", "remove abc", "list"]);
        assert!(out.contains("error"), "{out}");
        assert!(out.contains("1 | John Doe"), "{out}");
    }

    #[test]
    fn run_stops_at_quit() {
        let mut shell = shell();
        let script = "# comment\nremove 1\nquit\nremove 2\n";
        shell.run(script.as_bytes()).unwrap();
        let (store, _) = shell.into_parts();
        assert_eq!(store.len(), 1);
        assert!(store.contains(&2));
    }

    #[test]
    fn departments_merge_config_and_roster() {
        let shell = shell();
        let names = known_departments(&shell.store, &shell.config);
        assert_eq!(names.len(), 8);
        assert!(names.iter().any(|name| name == "HR"));
    }
}
