use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Result, TodoError};

/// An ordered list of one-line to-do items.
#[derive(Debug, Default, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct TodoList {
    items: Vec<String>,
}

impl TodoList {
    pub fn new() -> TodoList {
        TodoList { items: vec![] }
    }

    /// Builds a list from raw lines, dropping blank ones.
    pub fn from_lines<I, S>(lines: I) -> TodoList
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        TodoList {
            items: lines
                .into_iter()
                .map(|l| l.as_ref().trim_end_matches(['\r', '\n']).to_string())
                .filter(|l| !l.trim().is_empty())
                .collect(),
        }
    }

    pub fn items(&self) -> &[String] {
        &self.items
    }

    pub fn iter(&self) -> impl Iterator<Item = &String> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Item at a 1-based number.
    pub fn get(&self, number: usize) -> Option<&str> {
        number
            .checked_sub(1)
            .and_then(|i| self.items.get(i))
            .map(String::as_str)
    }

    /// Appends one item and returns its stored form.
    pub fn add(&mut self, text: &str) -> Result<&str> {
        let item = normalize_item(text)?;
        self.items.push(item);
        Ok(self.items[self.items.len() - 1].as_str())
    }

    /// Replaces item `number`, returning the previous text.
    pub fn edit(&mut self, number: usize, text: &str) -> Result<String> {
        let index = self.index_of(number)?;
        let item = normalize_item(text)?;
        Ok(std::mem::replace(&mut self.items[index], item))
    }

    /// Removes item `number` and returns it.
    pub fn complete(&mut self, number: usize) -> Result<String> {
        let index = self.index_of(number)?;
        Ok(self.items.remove(index))
    }

    fn index_of(&self, number: usize) -> Result<usize> {
        if number == 0 || number > self.items.len() {
            return Err(TodoError::NoSuchItem {
                number,
                len: self.items.len(),
            });
        }
        Ok(number - 1)
    }
}

impl fmt::Display for TodoList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, item) in self.items.iter().enumerate() {
            writeln!(f, "{}-{}", i + 1, item)?;
        }
        Ok(())
    }
}

/// Parses a typed 1-based item number.
pub fn parse_item_number(input: &str) -> Result<usize> {
    match input.trim().parse::<usize>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(TodoError::InvalidNumber(input.trim().to_string())),
    }
}

/// Upper-cases the first character and leaves the rest alone.
pub fn cap_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

// One line, trimmed, capitalized.
fn normalize_item(text: &str) -> Result<String> {
    let single_line = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if single_line.is_empty() {
        return Err(TodoError::EmptyItem);
    }
    Ok(cap_first(&single_line))
}
