//! Schema loader
//!
//! Builds record types from JSON declarations and keeps them in a registry
//! keyed by name:
//! - Field predicates and record validators are registered by id first, and
//!   declarations refer to them by id
//! - Declarations may reference each other in any order within a batch
//! - A batch is all-or-nothing: on any error nothing is registered
//! - Registered names are immutable; loading a name twice fails

use std::collections::{BTreeMap, HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value as JsonValue;
use tracing::{debug, info};

use super::types::{DescriptorDecl, KindDecl, OptionsDecl, RecordDecl};
use crate::descriptor::{ConfigError, Descriptor, FieldOptions, Validator};
use crate::error::{Error, Result};
use crate::record::{RecordType, RecordValidator};

/// Registry of named record types.
#[derive(Debug, Default)]
pub struct SchemaLoader {
    types: BTreeMap<String, RecordType>,
    field_validators: HashMap<String, Validator>,
    record_validators: HashMap<String, RecordValidator>,
}

impl SchemaLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a record type built in code.
    pub fn register(&mut self, record_type: RecordType) -> Result<()> {
        if self.types.contains_key(record_type.name()) {
            return Err(ConfigError::DuplicateRecordType(record_type.name().to_string()).into());
        }
        self.types.insert(record_type.name().to_string(), record_type);
        Ok(())
    }

    /// Makes a field predicate available to declarations under its name.
    pub fn register_field_validator(&mut self, validator: Validator) {
        self.field_validators.insert(validator.name().to_string(), validator);
    }

    /// Makes a record validator available to declarations under its name.
    pub fn register_record_validator(&mut self, validator: RecordValidator) {
        self.record_validators.insert(validator.name().to_string(), validator);
    }

    pub fn get(&self, name: &str) -> Option<&RecordType> {
        self.types.get(name)
    }

    /// Registered names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.types.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Loads one declaration or an array of declarations from JSON text.
    pub fn load_str(&mut self, json: &str) -> Result<Vec<RecordType>> {
        let decls = parse_declarations("<string>", json)?;
        self.load_declarations(&decls)
    }

    /// Loads the declarations in one file.
    pub fn load_file(&mut self, path: &Path) -> Result<Vec<RecordType>> {
        let decls = read_declarations(path)?;
        let loaded = self.load_declarations(&decls)?;
        info!(path = %path.display(), count = loaded.len(), "loaded schema file");
        Ok(loaded)
    }

    /// Loads every `*.json` file in `dir` as a single batch.
    ///
    /// Files are read in path order. Declarations may reference types from
    /// other files of the same directory.
    pub fn load_dir(&mut self, dir: &Path) -> Result<Vec<RecordType>> {
        let entries = fs::read_dir(dir).map_err(|e| Error::io(dir, e))?;

        let mut paths: Vec<PathBuf> = Vec::new();
        for entry in entries {
            let path = entry.map_err(|e| Error::io(dir, e))?.path();
            if path.is_file() && path.extension().is_some_and(|ext| ext == "json") {
                paths.push(path);
            }
        }
        paths.sort();

        let mut decls = Vec::new();
        for path in &paths {
            decls.extend(read_declarations(path)?);
        }
        let loaded = self.load_declarations(&decls)?;
        info!(
            dir = %dir.display(),
            files = paths.len(),
            count = loaded.len(),
            "loaded schema directory"
        );
        Ok(loaded)
    }

    /// Builds and registers a batch of declarations.
    ///
    /// Returns the new record types in declaration order.
    pub fn load_declarations(&mut self, decls: &[RecordDecl]) -> Result<Vec<RecordType>> {
        let mut pending: HashMap<&str, &RecordDecl> = HashMap::new();
        for decl in decls {
            let taken = self.types.contains_key(&decl.name)
                || pending.insert(decl.name.as_str(), decl).is_some();
            if taken {
                return Err(ConfigError::DuplicateRecordType(decl.name.clone()).into());
            }
        }

        let mut resolver = Resolver {
            loader: &*self,
            pending,
            built: HashMap::new(),
            visiting: HashSet::new(),
        };
        let mut loaded = Vec::with_capacity(decls.len());
        for decl in decls {
            loaded.push(resolver.resolve(&decl.name)?);
        }

        for record_type in &loaded {
            debug!(record = %record_type.name(), "registered record type");
            self.types.insert(record_type.name().to_string(), record_type.clone());
        }
        Ok(loaded)
    }
}

fn read_declarations(path: &Path) -> Result<Vec<RecordDecl>> {
    let content = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
    parse_declarations(&path.display().to_string(), &content)
}

fn parse_declarations(origin: &str, json: &str) -> Result<Vec<RecordDecl>> {
    let malformed = |e: serde_json::Error| ConfigError::MalformedDeclaration {
        origin: origin.to_string(),
        reason: e.to_string(),
    };

    let plain: JsonValue = serde_json::from_str(json).map_err(malformed)?;
    let decls = if plain.is_array() {
        serde_json::from_value(plain).map_err(malformed)?
    } else {
        vec![serde_json::from_value(plain).map_err(malformed)?]
    };
    Ok(decls)
}

/// Builds one batch, resolving references depth-first.
struct Resolver<'a> {
    loader: &'a SchemaLoader,
    pending: HashMap<&'a str, &'a RecordDecl>,
    built: HashMap<String, RecordType>,
    visiting: HashSet<String>,
}

impl<'a> Resolver<'a> {
    fn resolve(&mut self, name: &str) -> std::result::Result<RecordType, ConfigError> {
        if let Some(record_type) = self.loader.types.get(name).or_else(|| self.built.get(name)) {
            return Ok(record_type.clone());
        }
        let decl: &'a RecordDecl = self
            .pending
            .get(name)
            .copied()
            .ok_or_else(|| ConfigError::UnknownRecordType(name.to_string()))?;

        if !self.visiting.insert(name.to_string()) {
            return Err(ConfigError::CyclicReference(name.to_string()));
        }
        let record_type = self.build(decl)?;
        self.visiting.remove(name);

        self.built.insert(name.to_string(), record_type.clone());
        Ok(record_type)
    }

    fn build(&mut self, decl: &RecordDecl) -> std::result::Result<RecordType, ConfigError> {
        let mut builder = RecordType::builder(decl.name.as_str());
        if let Some(text) = &decl.description {
            builder = builder.description(text.as_str());
        }
        if let Some(parent) = &decl.extends {
            builder = builder.extends(&self.resolve(parent)?);
        }
        for field in &decl.fields {
            let descriptor = self.descriptor(&field.kind, &field.options)?;
            builder = builder.field(field.name.as_str(), descriptor);
        }
        for id in &decl.validate {
            let validator = self
                .loader
                .record_validators
                .get(id)
                .ok_or_else(|| ConfigError::UnknownValidator(id.clone()))?;
            builder = builder.validate_with(validator.clone());
        }
        builder.build()
    }

    fn nested(&mut self, decl: &DescriptorDecl) -> std::result::Result<Descriptor, ConfigError> {
        self.descriptor(&decl.kind, &decl.options)
    }

    fn descriptor(
        &mut self,
        kind: &KindDecl,
        options: &OptionsDecl,
    ) -> std::result::Result<Descriptor, ConfigError> {
        let options = self.options(options)?;
        match kind {
            KindDecl::String => Descriptor::string(options),
            KindDecl::Integer => Descriptor::integer(options),
            KindDecl::Float => Descriptor::float(options),
            KindDecl::Decimal => Descriptor::decimal(options),
            KindDecl::Boolean => Descriptor::boolean(options),
            KindDecl::Array(element) => Descriptor::array(self.nested(element)?, options),
            KindDecl::Map { key, value } => {
                let key = self.nested(key)?;
                let value = self.nested(value)?;
                Descriptor::map(key, value, options)
            }
            KindDecl::Tuple(elements) => {
                let mut descriptors = Vec::with_capacity(elements.len());
                for element in elements {
                    descriptors.push(self.nested(element)?);
                }
                Descriptor::tuple(descriptors, options)
            }
            KindDecl::Enum { element, values } => {
                let element = self.nested(element)?;
                let mut permitted = Vec::with_capacity(values.len());
                for plain in values {
                    let value = element
                        .deserialize("", plain)
                        .map_err(|e| ConfigError::InvalidEnumValue {
                            value: plain.to_string(),
                            reason: e.to_string(),
                        })?;
                    permitted.push(value);
                }
                Descriptor::enumeration(element, permitted, options)
            }
            KindDecl::Structure(name) => Descriptor::structure(&self.resolve(name)?, options),
            KindDecl::Polymorphic(candidates) => {
                let mut resolved = Vec::with_capacity(candidates.len());
                for (id, name) in candidates {
                    resolved.push((id.clone(), self.resolve(name)?));
                }
                Descriptor::polymorphic(resolved, options)
            }
        }
    }

    fn options(&self, decl: &OptionsDecl) -> std::result::Result<FieldOptions, ConfigError> {
        let mut options = FieldOptions::new();
        if decl.nullable {
            options = options.nullable();
        }
        if decl.positive {
            options = options.positive();
        }
        if decl.negative {
            options = options.negative();
        }
        if decl.nonpositive {
            options = options.nonpositive();
        }
        if decl.nonnegative {
            options = options.nonnegative();
        }
        if decl.nonempty {
            options = options.nonempty();
        }
        if let Some(pattern) = &decl.pattern {
            options = options.matching(pattern.as_str());
        }
        for id in &decl.validate {
            let validator = self
                .loader
                .field_validators
                .get(id)
                .ok_or_else(|| ConfigError::UnknownValidator(id.clone()))?;
            options = options.validate_with(validator.clone());
        }
        Ok(options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::DescriptorKind;
    use crate::value::Value;
    use tempfile::TempDir;

    fn hobby_json() -> &'static str {
        r#"{
            "name": "Hobby",
            "fields": [
                { "name": "desc", "type": "string" },
                { "name": "difficulty", "type": "integer", "options": { "positive": true } }
            ]
        }"#
    }

    #[test]
    fn test_load_single_declaration() {
        let mut loader = SchemaLoader::new();
        let loaded = loader.load_str(hobby_json()).unwrap();

        assert_eq!(loaded.len(), 1);
        assert_eq!(loader.len(), 1);
        let hobby = loader.get("Hobby").unwrap();
        assert!(hobby.same_type(&loaded[0]));
        assert_eq!(hobby.fields().len(), 2);
    }

    #[test]
    fn test_forward_reference_in_batch() {
        let mut loader = SchemaLoader::new();
        loader
            .load_str(
                r#"[
                    { "name": "Person", "fields": [
                        { "name": "hobby", "type": { "structure": "Hobby" } }
                    ] },
                    { "name": "Hobby", "fields": [ { "name": "desc", "type": "string" } ] }
                ]"#,
            )
            .unwrap();

        let person = loader.get("Person").unwrap();
        let hobby = loader.get("Hobby").unwrap();
        match person.field("hobby").unwrap().descriptor().kind() {
            DescriptorKind::Structure(target) => assert!(target.same_type(hobby)),
            other => panic!("expected structure, got {:?}", other),
        }
    }

    #[test]
    fn test_cycle_rejected_and_nothing_registered() {
        let mut loader = SchemaLoader::new();
        let err = loader
            .load_str(
                r#"[
                    { "name": "A", "fields": [ { "name": "b", "type": { "structure": "B" } } ] },
                    { "name": "B", "fields": [ { "name": "a", "type": { "structure": "A" } } ] }
                ]"#,
            )
            .unwrap_err();

        assert!(matches!(err, Error::Config(ConfigError::CyclicReference(_))));
        assert!(loader.is_empty());
    }

    #[test]
    fn test_description_and_candidate_order_kept() {
        let mut loader = SchemaLoader::new();
        loader
            .load_str(
                r#"[
                    { "name": "Zebra", "description": "striped", "fields": [] },
                    { "name": "Ant", "fields": [] },
                    { "name": "Zoo", "fields": [
                        { "name": "pet", "type": { "polymorphic": { "z": "Zebra", "a": "Ant" } } }
                    ] }
                ]"#,
            )
            .unwrap();

        assert_eq!(loader.get("Zebra").unwrap().description(), Some("striped"));
        assert_eq!(loader.get("Ant").unwrap().description(), None);

        let zoo = loader.get("Zoo").unwrap();
        match zoo.field("pet").unwrap().descriptor().kind() {
            DescriptorKind::Polymorphic(candidates) => {
                let ids: Vec<&str> = candidates.iter().map(|(id, _)| id.as_str()).collect();
                assert_eq!(ids, ["z", "a"]);
            }
            other => panic!("unexpected kind {:?}", other),
        }
    }

    #[test]
    fn test_unknown_reference_rejected() {
        let mut loader = SchemaLoader::new();
        let err = loader
            .load_str(
                r#"{ "name": "A", "fields": [
                    { "name": "b", "type": { "structure": "Nope" } }
                ] }"#,
            )
            .unwrap_err();
        assert!(matches!(err, Error::Config(ConfigError::UnknownRecordType(ref n)) if n == "Nope"));
    }

    #[test]
    fn test_reregistration_rejected() {
        let mut loader = SchemaLoader::new();
        loader.load_str(hobby_json()).unwrap();
        let err = loader.load_str(hobby_json()).unwrap_err();
        assert!(matches!(err, Error::Config(ConfigError::DuplicateRecordType(_))));
        assert_eq!(loader.len(), 1);
    }

    #[test]
    fn test_registered_validators_by_id() {
        let mut loader = SchemaLoader::new();
        loader.register_field_validator(Validator::new("even", |_, value: &Value| {
            match value.as_i64() {
                Some(n) if n % 2 == 0 => Ok(()),
                _ => Err("must be even".to_string()),
            }
        }));
        loader.register_record_validator(RecordValidator::new("named", |record| {
            if record.get_str("name").is_some_and(|s| !s.is_empty()) {
                Ok(())
            } else {
                Err("name missing".to_string())
            }
        }));
        loader
            .load_str(
                r#"{ "name": "Team", "validate": ["named"], "fields": [
                    { "name": "name", "type": "string" },
                    { "name": "size", "type": "integer", "options": { "validate": ["even"] } }
                ] }"#,
            )
            .unwrap();

        let team = loader.get("Team").unwrap();
        assert!(team.new([("name", Value::from("a")), ("size", Value::from(4))]).is_ok());
        assert!(team.new([("name", Value::from("a")), ("size", Value::from(3))]).is_err());
        assert!(team.new([("name", Value::from("")), ("size", Value::from(2))]).is_err());
    }

    #[test]
    fn test_unknown_validator_id_rejected() {
        let mut loader = SchemaLoader::new();
        let err = loader
            .load_str(
                r#"{ "name": "A", "fields": [
                    { "name": "x", "type": "integer", "options": { "validate": ["odd"] } }
                ] }"#,
            )
            .unwrap_err();
        assert!(matches!(err, Error::Config(ConfigError::UnknownValidator(ref id)) if id == "odd"));
    }

    #[test]
    fn test_enum_values_checked_against_element() {
        let mut loader = SchemaLoader::new();
        let err = loader
            .load_str(
                r#"{ "name": "A", "fields": [ { "name": "level", "type": { "enum": {
                    "element": { "type": "integer" }, "values": [1, "two"]
                } } } ] }"#,
            )
            .unwrap_err();
        assert!(matches!(err, Error::Config(ConfigError::InvalidEnumValue { .. })));
    }

    #[test]
    fn test_malformed_json_reported() {
        let mut loader = SchemaLoader::new();
        let err = loader.load_str("{ not json").unwrap_err();
        assert!(matches!(err, Error::Config(ConfigError::MalformedDeclaration { .. })));
    }

    #[test]
    fn test_load_dir_spans_files() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("person.json"),
            r#"{ "name": "Person", "fields": [
                { "name": "hobbies", "type": { "array": { "type": { "structure": "Hobby" } } } }
            ] }"#,
        )
        .unwrap();
        fs::write(dir.path().join("hobby.json"), hobby_json()).unwrap();
        fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let mut loader = SchemaLoader::new();
        let loaded = loader.load_dir(dir.path()).unwrap();

        assert_eq!(loaded.len(), 2);
        assert_eq!(loader.names().collect::<Vec<_>>(), vec!["Hobby", "Person"]);
    }

    #[test]
    fn test_missing_dir_is_io_error() {
        let dir = TempDir::new().unwrap();
        let mut loader = SchemaLoader::new();
        let err = loader.load_dir(&dir.path().join("absent")).unwrap_err();
        assert!(matches!(err, Error::Io { .. }));
    }
}
