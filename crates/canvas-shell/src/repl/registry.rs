//! The table of shell commands and the routes they map to.

use serde_json::{json, Value};

/// One positional parameter of a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParamSpec {
    pub name: &'static str,
    pub required: bool,
}

impl ParamSpec {
    pub const fn required(name: &'static str) -> Self {
        Self {
            name,
            required: true,
        }
    }

    pub const fn optional(name: &'static str) -> Self {
        Self {
            name,
            required: false,
        }
    }
}

/// Builds a request body from bound arguments.
pub type BodyBuilder = fn(&Args) -> Value;

/// What running a command does.
#[derive(Debug, Clone, Copy)]
pub enum Effect {
    /// GET the route and render the payload.
    Fetch { route: &'static str },
    /// POST a body to the route and render the payload.
    Send {
        route: &'static str,
        body: BodyBuilder,
        /// Parameter whose value becomes the prompt before the POST lands.
        moves_context: Option<&'static str>,
    },
}

/// A registered command.
#[derive(Debug, Clone)]
pub struct CommandSpec {
    /// Command words, space separated.
    pub name: &'static str,
    pub params: Vec<ParamSpec>,
    pub description: &'static str,
    pub effect: Effect,
}

/// Arguments bound to a command's parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Args {
    values: Vec<(&'static str, String)>,
}

impl Args {
    /// Value of a parameter, if it was given.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.values
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, v)| v.as_str())
    }
}

impl CommandSpec {
    fn words(&self) -> impl Iterator<Item = &'static str> {
        self.name.split_whitespace()
    }

    /// Usage line, e.g. `context list [abstraction]`.
    pub fn usage(&self) -> String {
        let mut usage = self.name.to_string();
        for param in &self.params {
            if param.required {
                usage.push_str(&format!(" <{}>", param.name));
            } else {
                usage.push_str(&format!(" [{}]", param.name));
            }
        }
        usage
    }

    /// Bind positional tokens to parameters.
    ///
    /// Fails with the usage line when a required argument is missing or there
    /// are more tokens than parameters.
    pub fn bind(&self, tokens: &[String]) -> Result<Args, String> {
        let required = self.params.iter().filter(|p| p.required).count();
        if tokens.len() < required || tokens.len() > self.params.len() {
            return Err(self.usage());
        }
        let values = self
            .params
            .iter()
            .zip(tokens)
            .map(|(param, value)| (param.name, value.clone()))
            .collect();
        Ok(Args { values })
    }
}

/// Substitute `{name}` placeholders in a route.
///
/// Values are percent-encoded as path segments. A placeholder without a
/// value drops its whole `/{name}` segment.
pub fn expand_route(route: &str, args: &Args) -> String {
    let mut out = String::with_capacity(route.len());
    for segment in route.split('/').filter(|s| !s.is_empty()) {
        let value = match segment
            .strip_prefix('{')
            .and_then(|s| s.strip_suffix('}'))
        {
            Some(name) => match args.get(name) {
                Some(value) => urlencoding::encode(value).into_owned(),
                None => continue,
            },
            None => segment.to_string(),
        };
        out.push('/');
        out.push_str(&value);
    }
    out
}

fn context_url_body(args: &Args) -> Value {
    json!({ "url": args.get("path").unwrap_or_default() })
}

/// All commands the shell knows, fixed at startup.
#[derive(Debug, Clone)]
pub struct Registry {
    commands: Vec<CommandSpec>,
}

impl Registry {
    /// The built-in Canvas commands.
    pub fn builtin() -> Self {
        let fetch =
            |name: &'static str, route: &'static str, description: &'static str| CommandSpec {
                name,
                params: Vec::new(),
                description,
                effect: Effect::Fetch { route },
            };

        Self {
            commands: vec![
                fetch("context", "/context", "Show the current context"),
                fetch("context url", "/context/url", "Show the current context URL"),
                fetch("context path", "/context/path", "Show the current context path"),
                fetch("context paths", "/context/paths", "List all context paths"),
                fetch("context tree", "/context/tree", "Show the context tree"),
                CommandSpec {
                    name: "context list",
                    params: vec![ParamSpec::optional("abstraction")],
                    description: "List documents in the current context",
                    effect: Effect::Fetch {
                        route: "/context/documents/{abstraction}",
                    },
                },
                fetch("context bitmaps", "/context/bitmaps", "Show the context bitmaps"),
                CommandSpec {
                    name: "context set",
                    params: vec![ParamSpec::required("path")],
                    description: "Switch the current context",
                    effect: Effect::Send {
                        route: "/context/url",
                        body: context_url_body,
                        moves_context: Some("path"),
                    },
                },
                fetch("documents", "/documents", "List all documents"),
                fetch("documents notes", "/documents/notes", "List all notes"),
                fetch("list", "/contexts", "List all contexts"),
            ],
        }
    }

    /// Registered commands in table order.
    pub fn commands(&self) -> &[CommandSpec] {
        &self.commands
    }

    /// Find the command with the longest name matching the start of `tokens`.
    ///
    /// Returns the command and the remaining tokens. A command without
    /// parameters only matches when nothing follows its name.
    pub fn resolve<'a>(&self, tokens: &'a [String]) -> Option<(&CommandSpec, &'a [String])> {
        self.commands
            .iter()
            .filter_map(|command| {
                let len = command.words().count();
                let matches = tokens.len() >= len
                    && command
                        .words()
                        .zip(tokens)
                        .all(|(word, token)| token.as_str() == word);
                if !matches {
                    return None;
                }
                let rest = &tokens[len..];
                if !rest.is_empty() && command.params.is_empty() {
                    return None;
                }
                Some((command, rest, len))
            })
            .max_by_key(|(_, _, len)| *len)
            .map(|(command, rest, _)| (command, rest))
    }
}
