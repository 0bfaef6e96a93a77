//! Shared application state for the web server.

use std::sync::Arc;

use minijinja::{context, Environment};
use tokio::sync::Mutex;

use crate::error::Result;
use crate::list::TodoList;
use crate::store::TodoStore;

const INDEX_TEMPLATE: &str = "index.html";

/// Shared state accessible from all request handlers.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<TodoStore>,
    /// Held across each read-modify-write of the data file.
    pub write_lock: Arc<Mutex<()>>,
    templates: Arc<Environment<'static>>,
}

impl AppState {
    pub fn new(store: TodoStore) -> Result<Self> {
        let mut templates = Environment::new();
        templates.add_template(INDEX_TEMPLATE, include_str!("index.html"))?;
        Ok(Self {
            store: Arc::new(store),
            write_lock: Arc::new(Mutex::new(())),
            templates: Arc::new(templates),
        })
    }

    /// Renders the page for `list`. `.html` templates auto-escape.
    pub fn render_index(&self, list: &TodoList) -> Result<String> {
        let template = self.templates.get_template(INDEX_TEMPLATE)?;
        Ok(template.render(context! { items => list.items() })?)
    }
}
