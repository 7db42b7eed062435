//! Template environment used for SQL files and pipeline definitions

use crate::error::JinjaResult;
use crate::functions::{make_env_var_fn, make_log_fn};
use minijinja::{Environment, Value};
use serde::Serialize;
use std::collections::BTreeMap;

/// Jinja environment with a fixed variable context
///
/// The context is the project's template data; callers layer fixed
/// variables over it with [`TemplateEnvironment::with_var`]. Fixed
/// variables win over template data of the same name.
pub struct TemplateEnvironment<'a> {
    env: Environment<'a>,
    context: BTreeMap<String, Value>,
}

impl<'a> TemplateEnvironment<'a> {
    /// Create an environment whose context is the given template data
    pub fn new(template_data: &BTreeMap<String, serde_yaml::Value>) -> Self {
        let mut env = Environment::new();
        env.set_keep_trailing_newline(true);
        env.add_function("env_var", make_env_var_fn());
        env.add_function("log", make_log_fn());

        let context = template_data
            .iter()
            .map(|(k, v)| (k.clone(), Value::from_serialize(v)))
            .collect();

        Self { env, context }
    }

    /// Add or replace a context variable
    pub fn with_var(mut self, name: &str, value: impl Serialize) -> Self {
        self.context
            .insert(name.to_string(), Value::from_serialize(&value));
        self
    }

    /// Names currently bound in the context
    pub fn variable_names(&self) -> Vec<&str> {
        self.context.keys().map(String::as_str).collect()
    }

    /// Render a template string against the context
    pub fn render(&self, template: &str) -> JinjaResult<String> {
        Ok(self.env.render_str(template, &self.context)?)
    }
}

impl Default for TemplateEnvironment<'_> {
    fn default() -> Self {
        Self::new(&BTreeMap::new())
    }
}

#[cfg(test)]
#[path = "environment_test.rs"]
mod tests;
