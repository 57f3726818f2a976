//! Parsed configuration snapshots.
//!
//! A document is built once from the collector's JSON and never mutated
//! afterwards. Parsing is lenient: a document that lacks the expected
//! top-level structure degrades to an empty one instead of failing, so a
//! single malformed case cannot abort a comparison.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::component::Component;
use crate::value::Value;

/// One namelist group: key name → value.
pub type Group = BTreeMap<String, Value>;

/// A flat parameter map (MOM_input / MOM_override).
pub type ParamMap = BTreeMap<String, Value>;

/// Reserved top-level key holding the ocean override parameters.
pub const OCEAN_OVERRIDE_KEY: &str = "MOM_override";
/// Reserved top-level key holding the ocean base parameters.
pub const OCEAN_BASE_KEY: &str = "MOM_input";
/// Reserved top-level key holding the ocean's Fortran namelist.
pub const OCEAN_NESTED_KEY: &str = "input_nml";

const OCEAN_OVERRIDE_ALIAS: &str = "override";
const OCEAN_BASE_ALIAS: &str = "base";
const OCEAN_NESTED_ALIAS: &str = "nested";

/// Standard form: named groups of key/value settings.
///
/// Stored in `BTreeMap`s, so iteration is always in byte-wise lexicographic
/// order regardless of the order the source listed things in.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct StandardDocument {
    pub groups: BTreeMap<String, Group>,
}

impl StandardDocument {
    /// Create an empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from a JSON object of objects. Non-object groups are skipped;
    /// a non-object top level yields an empty document.
    pub fn from_json(json: serde_json::Value) -> Self {
        let serde_json::Value::Object(top) = json else {
            return Self::default();
        };
        let groups = top
            .into_iter()
            .filter_map(|(name, body)| match body {
                serde_json::Value::Object(entries) => Some((
                    name,
                    entries
                        .into_iter()
                        .map(|(k, v)| (k, Value::from(v)))
                        .collect::<Group>(),
                )),
                _ => None,
            })
            .collect();
        Self { groups }
    }

    /// Returns `true` if no group holds any key.
    pub fn is_empty(&self) -> bool {
        self.groups.values().all(BTreeMap::is_empty)
    }

    /// Look up a group by name.
    pub fn group(&self, name: &str) -> Option<&Group> {
        self.groups.get(name)
    }

    /// Look up a single value.
    pub fn get(&self, group: &str, key: &str) -> Option<&Value> {
        self.groups.get(group).and_then(|g| g.get(key))
    }

    /// Set a value, creating the group if needed.
    pub fn insert(&mut self, group: impl Into<String>, key: impl Into<String>, value: Value) {
        self.groups
            .entry(group.into())
            .or_default()
            .insert(key.into(), value);
    }

    /// Total number of keys across all groups.
    pub fn key_count(&self) -> usize {
        self.groups.values().map(BTreeMap::len).sum()
    }
}

/// Ocean composite form: override and base parameter files plus a nested
/// Fortran namelist.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct OceanDocument {
    /// Parameters that shadow `base` for matching keys.
    #[serde(rename = "MOM_override")]
    pub overrides: ParamMap,
    /// Baseline parameters.
    #[serde(rename = "MOM_input")]
    pub base: ParamMap,
    /// Independent namelist bundled with the ocean component.
    #[serde(rename = "input_nml")]
    pub nested: StandardDocument,
}

impl OceanDocument {
    /// Assemble a document from its three sources.
    pub fn from_sources(overrides: ParamMap, base: ParamMap, nested: StandardDocument) -> Self {
        Self {
            overrides,
            base,
            nested,
        }
    }

    /// Build from the collector's JSON shape. Missing or non-object sections
    /// are treated as empty.
    pub fn from_json(json: serde_json::Value) -> Self {
        let serde_json::Value::Object(mut top) = json else {
            return Self::default();
        };
        let mut take = |primary: &str, alias: &str| {
            top.remove(primary)
                .or_else(|| top.remove(alias))
                .unwrap_or(serde_json::Value::Null)
        };
        let overrides = param_map_from_json(take(OCEAN_OVERRIDE_KEY, OCEAN_OVERRIDE_ALIAS));
        let base = param_map_from_json(take(OCEAN_BASE_KEY, OCEAN_BASE_ALIAS));
        let nested = StandardDocument::from_json(take(OCEAN_NESTED_KEY, OCEAN_NESTED_ALIAS));
        Self {
            overrides,
            base,
            nested,
        }
    }

    /// Returns `true` if all three sections are empty.
    pub fn is_empty(&self) -> bool {
        self.overrides.is_empty() && self.base.is_empty() && self.nested.is_empty()
    }
}

fn param_map_from_json(json: serde_json::Value) -> ParamMap {
    match json {
        serde_json::Value::Object(entries) => entries
            .into_iter()
            .map(|(k, v)| (k, Value::from(v)))
            .collect(),
        _ => ParamMap::new(),
    }
}

/// One (case, component) configuration snapshot.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ConfigDocument {
    /// `atm`, `lnd` and `ice` documents.
    Standard(StandardDocument),
    /// `ocn` documents.
    Ocean(OceanDocument),
}

impl ConfigDocument {
    /// Interpret parsed JSON in the form expected for `component`.
    pub fn from_json(component: Component, json: serde_json::Value) -> Self {
        if component.is_composite() {
            Self::Ocean(OceanDocument::from_json(json))
        } else {
            Self::Standard(StandardDocument::from_json(json))
        }
    }

    /// Parse raw JSON bytes in the form expected for `component`.
    ///
    /// Only invalid JSON is an error; structurally unexpected JSON degrades
    /// to an empty document.
    pub fn from_slice(component: Component, bytes: &[u8]) -> Result<Self, serde_json::Error> {
        let json: serde_json::Value = serde_json::from_slice(bytes)?;
        Ok(Self::from_json(component, json))
    }

    /// An empty document of the right form for `component`.
    pub fn empty(component: Component) -> Self {
        if component.is_composite() {
            Self::Ocean(OceanDocument::default())
        } else {
            Self::Standard(StandardDocument::default())
        }
    }

    /// The standard form, if this is one.
    pub fn as_standard(&self) -> Option<&StandardDocument> {
        match self {
            Self::Standard(doc) => Some(doc),
            Self::Ocean(_) => None,
        }
    }

    /// The ocean composite form, if this is one.
    pub fn as_ocean(&self) -> Option<&OceanDocument> {
        match self {
            Self::Ocean(doc) => Some(doc),
            Self::Standard(_) => None,
        }
    }

    /// Returns `true` if the document carries no settings at all.
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Standard(doc) => doc.is_empty(),
            Self::Ocean(doc) => doc.is_empty(),
        }
    }
}

impl From<StandardDocument> for ConfigDocument {
    fn from(doc: StandardDocument) -> Self {
        Self::Standard(doc)
    }
}

impl From<OceanDocument> for ConfigDocument {
    fn from(doc: OceanDocument) -> Self {
        Self::Ocean(doc)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn standard_from_json() {
        let doc = StandardDocument::from_json(json!({
            "cam_inparm": {"dtime": 1800, "iradsw": 2},
            "phys_ctl_nl": {"deep_scheme": "ZM"}
        }));
        assert_eq!(doc.groups.len(), 2);
        assert_eq!(doc.get("cam_inparm", "dtime"), Some(&Value::Int(1800)));
        assert_eq!(doc.key_count(), 3);
    }

    #[test]
    fn standard_groups_are_sorted() {
        let doc = StandardDocument::from_json(json!({
            "zeta": {"b": 1, "a": 2},
            "Alpha": {},
            "alpha": {}
        }));
        let names: Vec<&str> = doc.groups.keys().map(String::as_str).collect();
        // Case-sensitive byte order: uppercase sorts first.
        assert_eq!(names, vec!["Alpha", "alpha", "zeta"]);
        let keys: Vec<&str> = doc.groups["zeta"].keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["a", "b"]);
    }

    #[test]
    fn malformed_standard_degrades_to_empty() {
        assert!(StandardDocument::from_json(json!([1, 2, 3])).is_empty());
        assert!(StandardDocument::from_json(json!("atm_in")).is_empty());

        let doc = StandardDocument::from_json(json!({"ok": {"x": 1}, "bad": 7}));
        assert_eq!(doc.groups.len(), 1);
        assert!(doc.group("bad").is_none());
    }

    #[test]
    fn ocean_from_json_reserved_keys() {
        let doc = OceanDocument::from_json(json!({
            "MOM_override": {"KD": 1e-4},
            "MOM_input": {"KD": 1e-5, "KV": 1e-6},
            "input_nml": {"mom_input_nml": {"output_directory": "./"}}
        }));
        assert_eq!(doc.overrides.len(), 1);
        assert_eq!(doc.base.len(), 2);
        assert_eq!(doc.nested.key_count(), 1);
        assert_eq!(doc.overrides.get("KD"), Some(&Value::Float(1e-4)));
        assert_eq!(doc.base.get("KV"), Some(&Value::Float(1e-6)));
    }

    #[test]
    fn ocean_accepts_aliases() {
        let doc = OceanDocument::from_json(json!({
            "override": {"A": 1},
            "base": {"B": 2},
            "nested": {"g": {"c": 3}}
        }));
        assert_eq!(doc.overrides.get("A"), Some(&Value::Int(1)));
        assert_eq!(doc.base.get("B"), Some(&Value::Int(2)));
        assert_eq!(doc.nested.get("g", "c"), Some(&Value::Int(3)));
    }

    #[test]
    fn malformed_ocean_sections_are_empty() {
        let doc = OceanDocument::from_json(json!({"MOM_override": [1], "MOM_input": null}));
        assert!(doc.is_empty());
        assert!(OceanDocument::from_json(json!(42)).is_empty());
    }

    #[test]
    fn config_document_picks_form_by_component() {
        let json = json!({"g": {"k": 1}});
        assert!(ConfigDocument::from_json(Component::Atm, json.clone())
            .as_standard()
            .is_some());
        let ocn = ConfigDocument::from_json(Component::Ocn, json);
        assert!(ocn.as_ocean().is_some());
        assert!(ocn.is_empty());
    }

    #[test]
    fn from_slice_rejects_invalid_json() {
        assert!(ConfigDocument::from_slice(Component::Lnd, b"{not json").is_err());
        let doc = ConfigDocument::from_slice(Component::Lnd, b"{\"clm_inparm\": {\"hist_nhtfrq\": [0, -24]}}")
            .unwrap();
        assert_eq!(doc.as_standard().unwrap().key_count(), 1);
    }

    #[test]
    fn ocean_serializes_with_reserved_keys() {
        let mut nested = StandardDocument::new();
        nested.insert("ocean_nml", "dt", Value::Int(3600));
        let mut base = ParamMap::new();
        base.insert("KV".into(), Value::Float(1e-6));
        let doc = OceanDocument::from_sources(ParamMap::new(), base, nested);

        let json = serde_json::to_value(ConfigDocument::from(doc.clone())).unwrap();
        assert_eq!(
            json,
            json!({
                "MOM_override": {},
                "MOM_input": {"KV": 1e-6},
                "input_nml": {"ocean_nml": {"dt": 3600}}
            })
        );
        assert_eq!(OceanDocument::from_json(json), doc);
    }
}
