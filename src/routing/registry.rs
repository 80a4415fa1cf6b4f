//! Route registry.
//!
//! # Responsibilities
//! - Group parsed definitions by (method, pattern)
//! - Merge state-tagged files into one route with named variants
//! - Reject duplicate and ambiguous routes before any request is served
//! - Expose per-method lookup for the matcher and a serialisable snapshot
//!
//! # Design Decisions
//! - Immutable after `build`; reloads build a fresh registry
//! - Every route must have an untagged default variant
//! - All errors are returned together, not just the first

use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::definition::{ParsedDefinition, Variant};
use crate::routing::pattern::RoutePattern;
use crate::routing::{HttpMethod, RouteKey};

/// Errors that make a set of definitions unusable.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("duplicate {variant} variant for {method} {pattern}: `{first}` and `{second}`")]
    DuplicateRoute {
        method: HttpMethod,
        pattern: String,
        variant: String,
        first: String,
        second: String,
    },

    #[error("ambiguous routes for {method}: `{first}` and `{second}` match the same paths")]
    AmbiguousRoute {
        method: HttpMethod,
        first: String,
        second: String,
    },

    #[error("{method} {pattern} has no default variant (only state-tagged files: {})", sources.join(", "))]
    MissingDefaultVariant {
        method: HttpMethod,
        pattern: String,
        sources: Vec<String>,
    },
}

/// A registered endpoint with its default and state variants.
#[derive(Debug, Clone)]
pub struct RouteDefinition {
    pub key: RouteKey,
    /// Parameter names in pattern order.
    pub params: Vec<String>,
    pub default: Arc<Variant>,
    /// `None` when no file for this route carries a state tag.
    pub states: Option<BTreeMap<String, Arc<Variant>>>,
    /// Files that contributed to this route.
    pub sources: Vec<String>,
}

impl RouteDefinition {
    pub fn method(&self) -> HttpMethod {
        self.key.method
    }

    pub fn pattern(&self) -> &RoutePattern {
        &self.key.pattern
    }

    /// Variant registered under `tag`, if any.
    pub fn state(&self, tag: &str) -> Option<&Arc<Variant>> {
        self.states.as_ref().and_then(|states| states.get(tag))
    }
}

#[derive(Default)]
struct Group {
    default: Option<(Arc<Variant>, String)>,
    states: BTreeMap<String, (Arc<Variant>, String)>,
    sources: Vec<String>,
}

/// Compiled routing table, grouped by method.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    routes: BTreeMap<HttpMethod, Vec<Arc<RouteDefinition>>>,
}

impl Registry {
    /// Build the registry from parser output.
    pub fn build(definitions: Vec<ParsedDefinition>) -> Result<Self, Vec<RegistryError>> {
        let mut errors = Vec::new();
        let mut groups: BTreeMap<RouteKey, Group> = BTreeMap::new();

        for definition in definitions {
            let ParsedDefinition { key, tag, variant, source } = definition;
            let method = key.method;
            let pattern = key.pattern.to_string();
            let group = groups.entry(key).or_default();
            if !group.sources.contains(&source) {
                group.sources.push(source.clone());
            }

            let duplicate = |variant: String, first: &str, second: String| RegistryError::DuplicateRoute {
                method,
                pattern: pattern.clone(),
                variant,
                first: first.to_string(),
                second,
            };

            match tag {
                None => match &group.default {
                    Some((_, first)) => errors.push(duplicate("default".to_string(), first, source)),
                    None => group.default = Some((Arc::new(variant), source)),
                },
                Some(tag) => match group.states.entry(tag) {
                    Entry::Occupied(entry) => {
                        let label = format!("state `{}`", entry.key());
                        errors.push(duplicate(label, &entry.get().1, source));
                    }
                    Entry::Vacant(entry) => {
                        entry.insert((Arc::new(variant), source));
                    }
                },
            }
        }

        let mut routes: BTreeMap<HttpMethod, Vec<Arc<RouteDefinition>>> = BTreeMap::new();
        for (key, group) in groups {
            let Some((default, _)) = group.default else {
                errors.push(RegistryError::MissingDefaultVariant {
                    method: key.method,
                    pattern: key.pattern.to_string(),
                    sources: group.sources,
                });
                continue;
            };

            let states = (!group.states.is_empty()).then(|| {
                group
                    .states
                    .into_iter()
                    .map(|(tag, (variant, _))| (tag, variant))
                    .collect()
            });

            routes.entry(key.method).or_default().push(Arc::new(RouteDefinition {
                params: key.pattern.params(),
                key,
                default,
                states,
                sources: group.sources,
            }));
        }

        errors.extend(find_ambiguities(&routes));

        if errors.is_empty() {
            Ok(Self { routes })
        } else {
            Err(errors)
        }
    }

    /// Routes registered for `method`, in pattern order.
    pub fn lookup(&self, method: HttpMethod) -> &[Arc<RouteDefinition>] {
        self.routes.get(&method).map(Vec::as_slice).unwrap_or_default()
    }

    /// Route registered for exactly this method and pattern.
    pub fn get(&self, method: HttpMethod, pattern: &RoutePattern) -> Option<&Arc<RouteDefinition>> {
        self.lookup(method).iter().find(|r| r.pattern() == pattern)
    }

    /// Whether any method registers `pattern`.
    pub fn has_pattern(&self, pattern: &RoutePattern) -> bool {
        self.iter().any(|r| r.pattern() == pattern)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<RouteDefinition>> {
        self.routes.values().flatten()
    }

    pub fn len(&self) -> usize {
        self.routes.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Serialisable view keyed by method, then pattern.
    pub fn snapshot(&self) -> RoutesSnapshot {
        self.routes
            .iter()
            .map(|(method, routes)| {
                let by_pattern = routes
                    .iter()
                    .map(|route| (route.pattern().to_string(), RouteView::from(route.as_ref())))
                    .collect();
                (*method, by_pattern)
            })
            .collect()
    }
}

fn find_ambiguities(routes: &BTreeMap<HttpMethod, Vec<Arc<RouteDefinition>>>) -> Vec<RegistryError> {
    let mut errors = Vec::new();
    for (method, routes) in routes {
        let mut seen = HashMap::new();
        for route in routes {
            if let Some(first) = seen.insert(route.pattern().shape(), route.pattern()) {
                errors.push(RegistryError::AmbiguousRoute {
                    method: *method,
                    first: first.to_string(),
                    second: route.pattern().to_string(),
                });
            }
        }
    }
    errors
}

/// Routes snapshot: method → pattern → route view.
pub type RoutesSnapshot = BTreeMap<HttpMethod, BTreeMap<String, RouteView>>;

/// Serialisable view of one variant.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VariantView {
    pub status_code: u16,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub header: BTreeMap<String, String>,
    pub file_content: String,
    pub is_extended: bool,
    pub body: Option<Value>,
}

impl From<&Variant> for VariantView {
    fn from(variant: &Variant) -> Self {
        Self {
            status_code: variant.status_code,
            header: variant.headers.clone(),
            file_content: variant.content.clone(),
            is_extended: variant.is_extended(),
            body: variant.body().cloned(),
        }
    }
}

/// Serialisable view of one route: its default variant plus its states.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouteView {
    #[serde(flatten)]
    pub default: VariantView,
    pub params: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub states: Option<BTreeMap<String, VariantView>>,
}

impl From<&RouteDefinition> for RouteView {
    fn from(route: &RouteDefinition) -> Self {
        Self {
            default: VariantView::from(route.default.as_ref()),
            params: route.params.clone(),
            states: route.states.as_ref().map(|states| {
                states
                    .iter()
                    .map(|(tag, variant)| (tag.clone(), VariantView::from(variant.as_ref())))
                    .collect()
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definition::parse_definition;

    fn parsed(files: &[(&str, &str)]) -> Vec<ParsedDefinition> {
        files
            .iter()
            .flat_map(|(path, content)| parse_definition(path, content).unwrap())
            .collect()
    }

    #[test]
    fn test_merges_states_into_route() {
        let registry = Registry::build(parsed(&[
            ("users/[userid].DELETE.json", r#"{"__body": {"deleted": true}}"#),
            ("users/[userid].DELETE.404.{ERR}.json", r#"{"__body": {"error": "missing"}, "__header": {"x-err": "1"}}"#),
            ("users/[userid].DELETE.401.{INV_CRED|INV_TOKEN}.json", r#"{"error": "auth"}"#),
        ]))
        .unwrap();

        let pattern = RoutePattern::parse("/users/[userid]").unwrap();
        let route = registry.get(HttpMethod::Delete, &pattern).unwrap();
        let states = route.states.as_ref().unwrap();
        assert_eq!(states.keys().collect::<Vec<_>>(), vec!["ERR", "INV_CRED", "INV_TOKEN"]);
        assert_eq!(route.state("ERR").unwrap().status_code, 404);
        assert!(route.state("ERR").unwrap().is_extended());
        assert_eq!(route.state("INV_TOKEN").unwrap().status_code, 401);
        assert_eq!(route.params, vec!["userid"]);
        assert_eq!(route.sources.len(), 3);
        assert!(registry.get(HttpMethod::Get, &pattern).is_none());
    }

    #[test]
    fn test_route_without_tags_has_no_states() {
        let registry = Registry::build(parsed(&[("users/*.json", "[]")])).unwrap();
        let route = &registry.lookup(HttpMethod::Get)[0];
        assert!(route.states.is_none());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_duplicate_default() {
        let errors = Registry::build(parsed(&[("plants.json", "[]"), ("plants.GET.json", "[]")])).unwrap_err();
        assert_eq!(
            errors,
            vec![RegistryError::DuplicateRoute {
                method: HttpMethod::Get,
                pattern: "/plants".into(),
                variant: "default".into(),
                first: "plants.json".into(),
                second: "plants.GET.json".into(),
            }]
        );
    }

    #[test]
    fn test_duplicate_state_tag() {
        let errors = Registry::build(parsed(&[
            ("plants.json", "[]"),
            ("plants.404.{ERR}.json", "[]"),
            ("plants.500.{ERR}.json", "[]"),
        ]))
        .unwrap_err();
        assert!(matches!(&errors[0], RegistryError::DuplicateRoute { variant, .. } if variant == "state `ERR`"));
    }

    #[test]
    fn test_missing_default_variant() {
        let errors = Registry::build(parsed(&[("plants.404.{ERR}.json", "[]")])).unwrap_err();
        assert!(matches!(&errors[0], RegistryError::MissingDefaultVariant { pattern, .. } if pattern == "/plants"));
    }

    #[test]
    fn test_ambiguous_param_names() {
        let errors = Registry::build(parsed(&[("users/[id].json", "{}"), ("users/[userid].json", "{}")])).unwrap_err();
        assert!(matches!(&errors[0], RegistryError::AmbiguousRoute { method: HttpMethod::Get, .. }));

        // Same shapes under different methods are fine.
        assert!(Registry::build(parsed(&[("users/[id].json", "{}"), ("users/[userid].PUT.json", "{}")])).is_ok());
    }

    #[test]
    fn test_snapshot_shape() {
        let registry = Registry::build(parsed(&[
            ("users/*.json", "[]"),
            ("users/[userid].DELETE.json", "{}"),
            ("users/[userid].DELETE.404.{ERR}.json", r#"{"__body": null, "__header": {"a": "b"}}"#),
        ]))
        .unwrap();
        let json = serde_json::to_value(registry.snapshot()).unwrap();
        assert!(json["GET"]["/users/*"].get("states").is_none());
        assert_eq!(json["GET"]["/users/*"]["statusCode"], 200);
        assert_eq!(json["DELETE"]["/users/[userid]"]["states"]["ERR"]["statusCode"], 404);
        assert_eq!(json["DELETE"]["/users/[userid]"]["states"]["ERR"]["isExtended"], true);
        assert_eq!(json["DELETE"]["/users/[userid]"]["states"]["ERR"]["header"]["a"], "b");
    }
}
