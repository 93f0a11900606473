//! The route table: which `(path template, verb)` pair each method name calls.
//!
//! Tables are declared once per adapter and are immutable once built. All
//! validation happens in [`RouteTableBuilder::build`]; it either returns a
//! complete table or the first problem found, in declaration order.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

use serde::de::{Deserialize, Deserializer, MapAccess, Visitor};
use serde_json::Value;

use crate::{ConfigurationError, HttpVerb, MethodName, PathTemplate};

/// One `(path template, verb) -> method name` binding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteEntry {
    template: PathTemplate,
    verb: HttpVerb,
    method: MethodName,
}

impl RouteEntry {
    pub fn template(&self) -> &PathTemplate {
        &self.template
    }

    pub fn verb(&self) -> HttpVerb {
        self.verb
    }

    pub fn method(&self) -> &MethodName {
        &self.method
    }
}

impl std::fmt::Display for RouteEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {} -> {}", self.verb, self.template, self.method)
    }
}

/// An immutable set of routes keyed by method name.
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    entries: Vec<Arc<RouteEntry>>,
    by_method: HashMap<MethodName, usize>,
}

impl RouteTable {
    pub fn builder() -> RouteTableBuilder {
        RouteTableBuilder::default()
    }

    /// Builds a table from the declarative JSON form
    /// `{ "<template>": { "<VERB>": "<methodName>", ... }, ... }`.
    ///
    /// A [`Value`] has already merged repeated keys; use
    /// [`RouteTable::from_json_str`] to have those reported.
    pub fn from_json(table: &Value) -> Result<Self, ConfigurationError> {
        let routes = table
            .as_object()
            .ok_or_else(|| malformed("expected an object keyed by path template"))?;

        let mut declarations = Vec::with_capacity(routes.len());
        for (template, bindings) in routes {
            let bindings = bindings.as_object().ok_or_else(|| {
                malformed(format!("route '{template}' must map verbs to method names"))
            })?;
            declarations.push((
                template.clone(),
                bindings
                    .iter()
                    .map(|(verb, method)| (verb.clone(), method.clone()))
                    .collect(),
            ));
        }
        Self::from_declarations(declarations)
    }

    /// Same as [`RouteTable::from_json`], reading the keys of `json` in
    /// document order. A repeated template key is
    /// [`ConfigurationError::DuplicateTemplate`]; a repeated verb key is
    /// [`ConfigurationError::DuplicateRoute`].
    pub fn from_json_str(json: &str) -> Result<Self, ConfigurationError> {
        let Declarations(declarations) =
            serde_json::from_str(json).map_err(|e| malformed(e.to_string()))?;
        Self::from_declarations(declarations)
    }

    fn from_declarations(
        declarations: Vec<(String, Vec<(String, Value)>)>,
    ) -> Result<Self, ConfigurationError> {
        let mut templates = HashSet::new();
        let mut builder = Self::builder();
        for (template, bindings) in declarations {
            if !templates.insert(template.clone()) {
                return Err(ConfigurationError::DuplicateTemplate { template });
            }
            let mut parsed = Vec::with_capacity(bindings.len());
            for (verb, method) in bindings {
                let verb = verb
                    .parse::<HttpVerb>()
                    .map_err(|_| ConfigurationError::UnknownVerb {
                        template: template.clone(),
                        verb: verb.clone(),
                    })?;
                let method = method.as_str().ok_or_else(|| {
                    malformed(format!("method name for {verb} {template} must be a string"))
                })?;
                parsed.push((verb, method.to_string()));
            }
            builder = builder.route(template, parsed);
        }
        builder.build()
    }

    /// Combines two tables, applying the same uniqueness rules as the builder.
    pub fn merge(mut self, other: &RouteTable) -> Result<Self, ConfigurationError> {
        for entry in &other.entries {
            if self.find(entry.template.as_str(), entry.verb).is_some() {
                return Err(ConfigurationError::DuplicateRoute {
                    template: entry.template.to_string(),
                    verb: entry.verb,
                });
            }
            if let Some(existing) = self.get(entry.method.as_str()) {
                return Err(ConfigurationError::DuplicateMethod {
                    method: entry.method.clone(),
                    existing_template: existing.template.to_string(),
                    existing_verb: existing.verb,
                    template: entry.template.to_string(),
                    verb: entry.verb,
                });
            }
            self.by_method
                .insert(entry.method.clone(), self.entries.len());
            self.entries.push(Arc::clone(entry));
        }
        Ok(self)
    }

    /// Looks up the route bound to `method`.
    pub fn get(&self, method: &str) -> Option<&Arc<RouteEntry>> {
        self.by_method.get(method).map(|&i| &self.entries[i])
    }

    /// Looks up the route declared for `(template, verb)`.
    pub fn find(&self, template: &str, verb: HttpVerb) -> Option<&Arc<RouteEntry>> {
        self.entries
            .iter()
            .find(|e| e.verb == verb && e.template.as_str() == template)
    }

    /// Routes in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<RouteEntry>> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Collects route declarations; nothing is validated until [`build`](Self::build).
#[derive(Debug, Clone, Default)]
pub struct RouteTableBuilder {
    declarations: Vec<(String, Vec<(HttpVerb, String)>)>,
}

impl RouteTableBuilder {
    /// Declares the methods bound to one path template.
    #[must_use]
    pub fn route<I, S>(mut self, template: impl Into<String>, bindings: I) -> Self
    where
        I: IntoIterator<Item = (HttpVerb, S)>,
        S: Into<String>,
    {
        self.declarations.push((
            template.into(),
            bindings.into_iter().map(|(v, m)| (v, m.into())).collect(),
        ));
        self
    }

    /// Validates every declaration and builds the table.
    pub fn build(self) -> Result<RouteTable, ConfigurationError> {
        let mut entries: Vec<Arc<RouteEntry>> = Vec::new();
        let mut by_method: HashMap<MethodName, usize> = HashMap::new();

        for (raw_template, bindings) in self.declarations {
            let template = PathTemplate::parse(&raw_template)?;
            if bindings.is_empty() {
                return Err(ConfigurationError::MalformedTable {
                    message: format!("route '{raw_template}' binds no verbs"),
                });
            }

            for (verb, name) in bindings {
                let method =
                    MethodName::new(name).ok_or_else(|| ConfigurationError::EmptyMethodName {
                        template: raw_template.clone(),
                        verb,
                    })?;

                if entries
                    .iter()
                    .any(|e| e.verb == verb && e.template == template)
                {
                    return Err(ConfigurationError::DuplicateRoute {
                        template: raw_template.clone(),
                        verb,
                    });
                }

                if let Some(&existing) = by_method.get(&method) {
                    let existing = &entries[existing];
                    return Err(ConfigurationError::DuplicateMethod {
                        method,
                        existing_template: existing.template.to_string(),
                        existing_verb: existing.verb,
                        template: raw_template.clone(),
                        verb,
                    });
                }

                by_method.insert(method.clone(), entries.len());
                entries.push(Arc::new(RouteEntry {
                    template: template.clone(),
                    verb,
                    method,
                }));
            }
        }

        Ok(RouteTable { entries, by_method })
    }
}

fn malformed(message: impl Into<String>) -> ConfigurationError {
    ConfigurationError::MalformedTable {
        message: message.into(),
    }
}

// ---------------------------------------------------------------------------
// Order-preserving JSON reading
// ---------------------------------------------------------------------------

/// Route declarations in document order, repeated keys included.
struct Declarations(Vec<(String, Vec<(String, Value)>)>);

/// One route's verb bindings in document order, repeated keys included.
struct Bindings(Vec<(String, Value)>);

impl<'de> Deserialize<'de> for Declarations {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct TableVisitor;

        impl<'de> Visitor<'de> for TableVisitor {
            type Value = Declarations;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("an object keyed by path template")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Declarations, A::Error> {
                let mut routes = Vec::new();
                while let Some((template, bindings)) = map.next_entry::<String, Bindings>()? {
                    routes.push((template, bindings.0));
                }
                Ok(Declarations(routes))
            }
        }

        deserializer.deserialize_map(TableVisitor)
    }
}

impl<'de> Deserialize<'de> for Bindings {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct BindingsVisitor;

        impl<'de> Visitor<'de> for BindingsVisitor {
            type Value = Bindings;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("an object mapping verbs to method names")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Bindings, A::Error> {
                let mut bindings = Vec::new();
                while let Some(entry) = map.next_entry::<String, Value>()? {
                    bindings.push(entry);
                }
                Ok(Bindings(bindings))
            }
        }

        deserializer.deserialize_map(BindingsVisitor)
    }
}
