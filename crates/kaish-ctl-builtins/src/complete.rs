//! `complete [options] name…` builtin: registers a
//! completion specification per command name, later driving
//! [`kaish_ctl_edit::complete::CompletionEngine`] when that command is
//! completed at the line-editing layer.

use std::collections::BTreeMap;

use kaish_ctl_edit::complete::{Category, FilterChain};
use kaish_ctl_types::ExitCode;

use crate::error::BuiltinError;

const NAME: &str = "complete";

/// A registered completion spec for one command name: which candidate sources to draw from,
/// accept/reject filters, and surrounding prefix/suffix/termination
/// behavior.
#[derive(Debug, Clone, Default)]
pub struct CompleteSpec {
    pub actions: Vec<Category>,
    pub filters: FilterChain,
    pub prefix: Option<String>,
    pub suffix: Option<String>,
    pub no_terminate: bool,
    pub description: Option<String>,
    pub as_option: bool,
}

/// Name → spec registry, owned by the shell for the lifetime of the
/// session.
#[derive(Debug, Clone, Default)]
pub struct CompleteRegistry(BTreeMap<String, CompleteSpec>);

impl CompleteRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&CompleteSpec> {
        self.0.get(name)
    }

    pub fn remove(&mut self, name: &str) -> Option<CompleteSpec> {
        self.0.remove(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &CompleteSpec)> {
        self.0.iter()
    }
}

fn category_for(flag: char) -> Option<Category> {
    match flag {
        'a' => Some(Category::Alias),
        'b' => Some(Category::Command),
        'c' => Some(Category::Command),
        'd' => Some(Category::File),
        'f' => Some(Category::File),
        'g' => Some(Category::Group),
        'h' => Some(Category::Host),
        'j' => Some(Category::Job),
        'k' => Some(Category::Binding),
        'u' => Some(Category::User),
        'v' => Some(Category::Variable),
        _ => None,
    }
}

fn category_for_action_name(name: &str) -> Option<Category> {
    match name {
        "alias" => Some(Category::Alias),
        "builtin" | "command" | "function" => Some(Category::Command),
        "directory" | "file" => Some(Category::File),
        "group" => Some(Category::Group),
        "hostname" => Some(Category::Host),
        "job" | "running" | "stopped" => Some(Category::Job),
        "binding" | "keybind" => Some(Category::Binding),
        "signal" => Some(Category::Signal),
        "user" => Some(Category::User),
        "variable" | "arrayvar" | "export" => Some(Category::Variable),
        "word" | "option" => Some(Category::Option),
        _ => None,
    }
}

/// Runs `complete`. With no arguments (or `-p`), prints every registered
/// spec; otherwise parses the full completion flag surface (category,
/// accept/reject filters, prefix/suffix, description, option-word flag)
/// and registers it for each trailing command name.
pub fn complete(args: &[String], registry: &mut CompleteRegistry) -> Result<(Vec<String>, i32), BuiltinError> {
    if args.is_empty() || args.first().map(String::as_str) == Some("-p") {
        let lines = registry
            .iter()
            .map(|(name, spec)| format!("complete {} {name}", render_spec(spec)))
            .collect();
        return Ok((lines, ExitCode::SUCCESS));
    }

    if args.first().map(String::as_str) == Some("-r") {
        for name in &args[1..] {
            registry.remove(name);
        }
        return Ok((Vec::new(), ExitCode::SUCCESS));
    }

    let mut spec = CompleteSpec::default();
    let mut names = Vec::new();
    let mut idx = 0;

    while idx < args.len() {
        let arg = args[idx].as_str();
        match arg {
            "-A" => {
                idx += 1;
                let val = args.get(idx).ok_or_else(|| BuiltinError::usage(NAME, "-A requires an action name"))?;
                let cat = category_for_action_name(val)
                    .ok_or_else(|| BuiltinError::usage(NAME, format!("{val}: unknown action")))?;
                spec.actions.push(cat);
            }
            "-R" => {
                idx += 1;
                let val = args.get(idx).ok_or_else(|| BuiltinError::usage(NAME, "-R requires a pattern"))?;
                spec.filters = std::mem::take(&mut spec.filters).reject(val.clone());
            }
            "-P" => {
                idx += 1;
                spec.prefix = Some(
                    args.get(idx)
                        .ok_or_else(|| BuiltinError::usage(NAME, "-P requires a prefix"))?
                        .clone(),
                );
            }
            "-S" => {
                idx += 1;
                spec.suffix = Some(
                    args.get(idx)
                        .ok_or_else(|| BuiltinError::usage(NAME, "-S requires a suffix"))?
                        .clone(),
                );
            }
            "-D" => {
                idx += 1;
                spec.description = Some(
                    args.get(idx)
                        .ok_or_else(|| BuiltinError::usage(NAME, "-D requires a description"))?
                        .clone(),
                );
            }
            "-T" => spec.no_terminate = true,
            "-O" => spec.as_option = true,
            s if s.starts_with('-') && s.len() > 1 => {
                for c in s.chars().skip(1) {
                    if let Some(cat) = category_for(c) {
                        spec.actions.push(cat);
                    } else {
                        return Err(BuiltinError::usage(NAME, format!("invalid option: -{c}")));
                    }
                }
            }
            name => names.push(name.to_string()),
        }
        idx += 1;
    }

    if spec.actions.is_empty() {
        return Err(BuiltinError::usage(NAME, "at least one action is required"));
    }
    if names.is_empty() {
        return Err(BuiltinError::usage(NAME, "missing command name"));
    }

    for name in names {
        registry_insert(registry, name, spec.clone());
    }

    Ok((Vec::new(), ExitCode::SUCCESS))
}

fn registry_insert(registry: &mut CompleteRegistry, name: String, spec: CompleteSpec) {
    registry.0.insert(name, spec);
}

fn render_spec(spec: &CompleteSpec) -> String {
    let mut parts = Vec::new();
    for action in &spec.actions {
        parts.push(format!("-A {action:?}"));
    }
    if let Some(p) = &spec.prefix {
        parts.push(format!("-P '{p}'"));
    }
    if let Some(s) = &spec.suffix {
        parts.push(format!("-S '{s}'"));
    }
    if spec.no_terminate {
        parts.push("-T".to_string());
    }
    parts.join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registers_and_prints_a_spec() {
        let mut reg = CompleteRegistry::new();
        complete(&["-f".to_string(), "cat".to_string()], &mut reg).unwrap();
        assert!(reg.get("cat").is_some());
        let (lines, _) = complete(&[], &mut reg).unwrap();
        assert_eq!(lines.len(), 1);
    }

    #[test]
    fn dash_r_removes_a_spec() {
        let mut reg = CompleteRegistry::new();
        complete(&["-f".to_string(), "cat".to_string()], &mut reg).unwrap();
        complete(&["-r".to_string(), "cat".to_string()], &mut reg).unwrap();
        assert!(reg.get("cat").is_none());
    }

    #[test]
    fn missing_action_is_usage_error() {
        let mut reg = CompleteRegistry::new();
        let err = complete(&["cat".to_string()], &mut reg).unwrap_err();
        assert_eq!(err.kind, crate::error::BuiltinErrorKind::Usage);
    }

    #[test]
    fn unknown_action_name_is_usage_error() {
        let mut reg = CompleteRegistry::new();
        let err = complete(&["-A".to_string(), "bogus".to_string(), "cat".to_string()], &mut reg).unwrap_err();
        assert_eq!(err.kind, crate::error::BuiltinErrorKind::Usage);
    }
}
