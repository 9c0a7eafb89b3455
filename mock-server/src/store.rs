//! In-memory model of databases, collections, documents, graphs and
//! cursors. Everything here is synchronous; the router wraps one [`Store`]
//! in a lock.

use std::collections::{BTreeMap, BTreeSet, HashMap, VecDeque};

use axum::http::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use uuid::Uuid;

use crate::error::{codes, ArangoError};

pub const SYSTEM_DATABASE: &str = "_system";
const MAX_NAME_LEN: usize = 256;
const MAX_KEY_LEN: usize = 254;
const DEFAULT_BATCH_SIZE: usize = 1000;

pub const DOCUMENT_COLLECTION: u8 = 2;
pub const EDGE_COLLECTION: u8 = 3;

/// Collection and database names: a leading letter (or `_` for system
/// names), then letters, digits, `_` and `-`.
pub fn is_valid_name(name: &str, allow_system: bool) -> bool {
    let mut chars = name.chars();
    let leading_ok = match chars.next() {
        Some(c) if c.is_ascii_alphabetic() => true,
        Some('_') => allow_system,
        _ => false,
    };
    leading_ok
        && name.len() <= MAX_NAME_LEN
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

fn is_valid_key(key: &str) -> bool {
    !key.is_empty()
        && key.len() <= MAX_KEY_LEN
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "_-:.@()+,=;$!*'%".contains(c))
}

/// `_key`, `_id` and `_rev` of a stored document.
pub fn document_meta(doc: &Value) -> Value {
    json!({
        "_key": doc["_key"],
        "_id": doc["_id"],
        "_rev": doc["_rev"],
    })
}

pub fn revision(doc: &Value) -> &str {
    doc["_rev"].as_str().unwrap_or_default()
}

fn is_system_attribute(name: &str) -> bool {
    matches!(name, "_key" | "_id" | "_rev" | "_oldRev")
}

/// Applies `patch` to `target`. Nulls remove attributes unless `keep_null`;
/// nested objects merge unless `merge_objects` is off.
fn merge_patch(target: &mut Map<String, Value>, patch: Map<String, Value>, keep_null: bool, merge_objects: bool) {
    for (name, value) in patch {
        if is_system_attribute(&name) {
            continue;
        }
        match value {
            Value::Null if !keep_null => {
                target.remove(&name);
            }
            Value::Object(nested) if merge_objects => match target.get_mut(&name) {
                Some(Value::Object(existing)) => merge_patch(existing, nested, keep_null, merge_objects),
                _ => {
                    target.insert(name, Value::Object(nested));
                }
            },
            value => {
                target.insert(name, value);
            }
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct WriteOptions {
    pub overwrite: bool,
    pub keep_null: bool,
    pub merge_objects: bool,
    pub ignore_revs: bool,
}

#[derive(Debug)]
pub struct Collection {
    pub id: String,
    pub name: String,
    pub collection_type: u8,
    pub is_system: bool,
    pub wait_for_sync: bool,
    allow_user_keys: bool,
    globally_unique_id: String,
    last_key: u64,
    last_rev: u64,
    documents: BTreeMap<String, Value>,
}

impl Collection {
    fn new(id: u64, name: &str, collection_type: u8, is_system: bool) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            collection_type,
            is_system,
            wait_for_sync: false,
            allow_user_keys: true,
            globally_unique_id: format!("h{}", Uuid::new_v4().simple()),
            last_key: 0,
            last_rev: 0,
            documents: BTreeMap::new(),
        }
    }

    /// The short description listed by `GET _api/collection`.
    pub fn info(&self) -> Value {
        json!({
            "id": self.id,
            "name": self.name,
            "status": 3,
            "type": self.collection_type,
            "isSystem": self.is_system,
            "globallyUniqueId": self.globally_unique_id,
        })
    }

    /// Description plus properties.
    pub fn details(&self) -> Value {
        let mut details = self.info();
        if let Value::Object(map) = &mut details {
            map.insert("waitForSync".to_string(), json!(self.wait_for_sync));
            map.insert("statusString".to_string(), json!("loaded"));
            map.insert(
                "keyOptions".to_string(),
                json!({
                    "type": "traditional",
                    "allowUserKeys": self.allow_user_keys,
                    "lastValue": self.last_key,
                }),
            );
        }
        details
    }

    pub fn count(&self) -> usize {
        self.documents.len()
    }

    pub fn documents(&self) -> impl Iterator<Item = &Value> {
        self.documents.values()
    }

    pub fn truncate(&mut self) {
        self.documents.clear();
    }

    fn next_rev(&mut self) -> String {
        self.last_rev += 1;
        format!("_r{}", self.last_rev)
    }

    fn next_key(&mut self) -> String {
        loop {
            self.last_key += 1;
            let key = self.last_key.to_string();
            if !self.documents.contains_key(&key) {
                return key;
            }
        }
    }

    fn check_edge(&self, doc: &Map<String, Value>) -> Result<(), ArangoError> {
        if self.collection_type != EDGE_COLLECTION {
            return Ok(());
        }
        let valid = |name: &str| doc.get(name).and_then(Value::as_str).is_some_and(|v| v.contains('/'));
        if valid("_from") && valid("_to") {
            Ok(())
        } else {
            Err(ArangoError::new(
                StatusCode::BAD_REQUEST,
                codes::EDGE_ATTRIBUTE_MISSING,
                "edge attribute missing or invalid",
            ))
        }
    }

    fn stamp(&mut self, key: &str, mut doc: Map<String, Value>) -> Value {
        doc.remove("_oldRev");
        doc.insert("_key".to_string(), json!(key));
        doc.insert("_id".to_string(), json!(format!("{}/{key}", self.name)));
        doc.insert("_rev".to_string(), json!(self.next_rev()));
        Value::Object(doc)
    }

    /// Stores a new document. Returns it together with the document it
    /// replaced when `overwrite` was set.
    pub fn insert(&mut self, doc: Value, options: WriteOptions) -> Result<(Value, Option<Value>), ArangoError> {
        let Value::Object(doc) = doc else {
            return Err(ArangoError::new(
                StatusCode::BAD_REQUEST,
                codes::DOCUMENT_TYPE_INVALID,
                "invalid document type",
            ));
        };
        self.check_edge(&doc)?;

        let key = match doc.get("_key") {
            None => self.next_key(),
            Some(Value::String(key)) if self.allow_user_keys && is_valid_key(key) => key.clone(),
            Some(_) => {
                return Err(ArangoError::new(
                    StatusCode::BAD_REQUEST,
                    codes::DOCUMENT_KEY_BAD,
                    "illegal document key",
                ))
            }
        };
        if self.documents.contains_key(&key) && !options.overwrite {
            return Err(ArangoError::new(
                StatusCode::CONFLICT,
                codes::UNIQUE_CONSTRAINT_VIOLATED,
                format!(
                    "unique constraint violated - in index primary of type primary over '_key'; \
                     conflicting key: {key}"
                ),
            ));
        }

        let stored = self.stamp(&key, doc);
        let old = self.documents.insert(key, stored.clone());
        Ok((stored, old))
    }

    pub fn get(&self, key: &str) -> Result<&Value, ArangoError> {
        self.documents.get(key).ok_or_else(ArangoError::document_not_found)
    }

    fn check_rev(current: &Value, body: &Map<String, Value>, ignore_revs: bool) -> Result<(), ArangoError> {
        match body.get("_rev").and_then(Value::as_str) {
            Some(rev) if !ignore_revs && rev != revision(current) => Err(ArangoError::conflict()),
            _ => Ok(()),
        }
    }

    /// Merges `patch` into a stored document. Returns `(old, new)`.
    pub fn update(&mut self, key: &str, patch: Value, options: WriteOptions) -> Result<(Value, Value), ArangoError> {
        let Value::Object(patch) = patch else {
            return Err(ArangoError::new(
                StatusCode::BAD_REQUEST,
                codes::DOCUMENT_TYPE_INVALID,
                "invalid document type",
            ));
        };
        let old = self.get(key)?.clone();
        Self::check_rev(&old, &patch, options.ignore_revs)?;

        let mut merged = old.as_object().cloned().unwrap_or_default();
        merge_patch(&mut merged, patch, options.keep_null, options.merge_objects);
        self.check_edge(&merged)?;
        let new = self.stamp(key, merged);
        self.documents.insert(key.to_string(), new.clone());
        Ok((old, new))
    }

    /// Replaces a stored document, keeping its key. Returns `(old, new)`.
    pub fn replace(&mut self, key: &str, doc: Value, options: WriteOptions) -> Result<(Value, Value), ArangoError> {
        let Value::Object(doc) = doc else {
            return Err(ArangoError::new(
                StatusCode::BAD_REQUEST,
                codes::DOCUMENT_TYPE_INVALID,
                "invalid document type",
            ));
        };
        let old = self.get(key)?.clone();
        Self::check_rev(&old, &doc, options.ignore_revs)?;
        self.check_edge(&doc)?;

        let new = self.stamp(key, doc);
        self.documents.insert(key.to_string(), new.clone());
        Ok((old, new))
    }

    pub fn remove(&mut self, key: &str) -> Result<Value, ArangoError> {
        self.documents.remove(key).ok_or_else(ArangoError::document_not_found)
    }

    fn rename(&mut self, name: &str) {
        self.name = name.to_string();
        for (key, doc) in &mut self.documents {
            doc["_id"] = json!(format!("{name}/{key}"));
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgeDefinition {
    pub collection: String,
    pub from: Vec<String>,
    pub to: Vec<String>,
}

#[derive(Debug)]
pub struct Graph {
    pub name: String,
    pub edge_definitions: Vec<EdgeDefinition>,
    pub orphan_collections: Vec<String>,
    rev: String,
}

impl Graph {
    pub fn vertex_collections(&self) -> BTreeSet<&str> {
        self.edge_definitions
            .iter()
            .flat_map(|def| def.from.iter().chain(&def.to))
            .chain(&self.orphan_collections)
            .map(String::as_str)
            .collect()
    }

    /// Vertex and edge collections together.
    pub fn collections(&self) -> BTreeSet<&str> {
        let mut all = self.vertex_collections();
        all.extend(self.edge_definitions.iter().map(|def| def.collection.as_str()));
        all
    }

    pub fn to_json(&self) -> Value {
        json!({
            "name": self.name,
            "edgeDefinitions": self.edge_definitions,
            "orphanCollections": self.orphan_collections,
            "_key": self.name,
            "_id": format!("_graphs/{}", self.name),
            "_rev": self.rev,
        })
    }
}

#[derive(Debug)]
pub struct Database {
    pub id: String,
    pub name: String,
    last_id: u64,
    collections: BTreeMap<String, Collection>,
    graphs: BTreeMap<String, Graph>,
}

impl Database {
    fn new(id: u64, name: &str) -> Self {
        let mut database = Self {
            id: id.to_string(),
            name: name.to_string(),
            last_id: 0,
            collections: BTreeMap::new(),
            graphs: BTreeMap::new(),
        };
        database.insert_collection("_graphs", DOCUMENT_COLLECTION, true);
        database
    }

    fn next_id(&mut self) -> u64 {
        self.last_id += 1;
        self.last_id
    }

    fn insert_collection(&mut self, name: &str, collection_type: u8, is_system: bool) -> &mut Collection {
        let id = self.next_id();
        self.collections
            .entry(name.to_string())
            .or_insert_with(|| Collection::new(id, name, collection_type, is_system))
    }

    pub fn collections(&self) -> impl Iterator<Item = &Collection> {
        self.collections.values()
    }

    pub fn create_collection(
        &mut self,
        name: &str,
        collection_type: u8,
        is_system: bool,
    ) -> Result<&mut Collection, ArangoError> {
        if !is_valid_name(name, is_system) {
            return Err(ArangoError::illegal_name());
        }
        if self.collections.contains_key(name) {
            return Err(ArangoError::duplicate_name(name));
        }
        Ok(self.insert_collection(name, collection_type, is_system))
    }

    pub fn collection(&self, name: &str) -> Result<&Collection, ArangoError> {
        self.collections
            .get(name)
            .ok_or_else(|| ArangoError::collection_not_found(name))
    }

    pub fn collection_mut(&mut self, name: &str) -> Result<&mut Collection, ArangoError> {
        self.collections
            .get_mut(name)
            .ok_or_else(|| ArangoError::collection_not_found(name))
    }

    pub fn drop_collection(&mut self, name: &str) -> Result<Collection, ArangoError> {
        self.collections
            .remove(name)
            .ok_or_else(|| ArangoError::collection_not_found(name))
    }

    pub fn rename_collection(&mut self, name: &str, new_name: &str) -> Result<&Collection, ArangoError> {
        let is_system = self.collection(name)?.is_system;
        if !is_valid_name(new_name, is_system) {
            return Err(ArangoError::illegal_name());
        }
        if self.collections.contains_key(new_name) {
            return Err(ArangoError::duplicate_name(new_name));
        }
        let mut collection = self.drop_collection(name)?;
        collection.rename(new_name);
        Ok(self.collections.entry(new_name.to_string()).or_insert(collection))
    }

    /// Creates a graph and any of its collections that do not exist yet.
    pub fn create_graph(
        &mut self,
        name: &str,
        edge_definitions: Vec<EdgeDefinition>,
        orphan_collections: Vec<String>,
    ) -> Result<&Graph, ArangoError> {
        if !is_valid_name(name, false) {
            return Err(ArangoError::illegal_name());
        }
        if self.graphs.contains_key(name) {
            return Err(ArangoError::new(
                StatusCode::CONFLICT,
                codes::GRAPH_DUPLICATE,
                format!("graph already exists: {name}"),
            ));
        }
        let graph = Graph {
            name: name.to_string(),
            edge_definitions,
            orphan_collections,
            rev: format!("_g{}", self.next_id()),
        };
        for collection in graph.vertex_collections() {
            self.ensure_collection(collection, DOCUMENT_COLLECTION)?;
        }
        for definition in &graph.edge_definitions {
            self.ensure_collection(&definition.collection, EDGE_COLLECTION)?;
        }
        Ok(self.graphs.entry(name.to_string()).or_insert(graph))
    }

    fn ensure_collection(&mut self, name: &str, collection_type: u8) -> Result<(), ArangoError> {
        if !self.collections.contains_key(name) {
            self.create_collection(name, collection_type, false)?;
        }
        Ok(())
    }

    pub fn graph(&self, name: &str) -> Result<&Graph, ArangoError> {
        self.graphs.get(name).ok_or_else(|| ArangoError::graph_not_found(name))
    }

    /// Removes a graph. With `drop_collections`, also drops its collections
    /// that no remaining graph uses.
    pub fn drop_graph(&mut self, name: &str, drop_collections: bool) -> Result<(), ArangoError> {
        let graph = self.graphs.remove(name).ok_or_else(|| ArangoError::graph_not_found(name))?;
        if drop_collections {
            let still_used: BTreeSet<&str> = self.graphs.values().flat_map(Graph::collections).collect();
            let orphaned: Vec<String> = graph
                .collections()
                .into_iter()
                .filter(|c| !still_used.contains(c))
                .map(str::to_string)
                .collect();
            for collection in orphaned {
                self.collections.remove(&collection);
            }
        }
        Ok(())
    }

    pub fn insert_vertex(&mut self, graph: &str, collection: &str, vertex: Value) -> Result<Value, ArangoError> {
        if !self.graph(graph)?.vertex_collections().contains(collection) {
            return Err(ArangoError::new(
                StatusCode::NOT_FOUND,
                codes::VERTEX_COLLECTION_NOT_USED,
                format!("vertex collection not used in graph: {collection}"),
            ));
        }
        let (stored, _) = self.collection_mut(collection)?.insert(vertex, WriteOptions::default())?;
        Ok(stored)
    }
}

/// The two query shapes the cursor endpoint understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Query<'a> {
    /// `FOR v IN @@coll RETURN v`
    All { bind: &'a str },
    /// `RETURN COUNT(@@coll)`
    Count { bind: &'a str },
}

impl<'a> Query<'a> {
    fn parse(text: &'a str) -> Option<Self> {
        let tokens: Vec<&str> = text.split_whitespace().collect();
        match *tokens.as_slice() {
            [for_kw, var, in_kw, source, return_kw, ret]
                if for_kw.eq_ignore_ascii_case("FOR")
                    && in_kw.eq_ignore_ascii_case("IN")
                    && return_kw.eq_ignore_ascii_case("RETURN")
                    && var == ret =>
            {
                source.strip_prefix('@').filter(|b| b.starts_with('@')).map(|bind| Query::All { bind })
            }
            [return_kw, expr] if return_kw.eq_ignore_ascii_case("RETURN") => {
                let inner = expr.strip_suffix(')')?;
                let bind = inner
                    .strip_prefix("COUNT(@")
                    .or_else(|| inner.strip_prefix("count(@"))?;
                bind.starts_with('@').then_some(Query::Count { bind })
            }
            _ => None,
        }
    }

    fn bind(&self) -> &'a str {
        match *self {
            Query::All { bind } | Query::Count { bind } => bind,
        }
    }
}

#[derive(Debug)]
struct Cursor {
    database: String,
    pending: VecDeque<Value>,
    batch_size: usize,
    count: Option<usize>,
}

impl Cursor {
    fn next_batch(&mut self) -> Vec<Value> {
        let take = self.batch_size.min(self.pending.len());
        self.pending.drain(..take).collect()
    }
}

/// A new cursor request.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CursorRequest {
    pub query: String,
    pub bind_vars: Map<String, Value>,
    pub batch_size: Option<usize>,
    pub count: Option<bool>,
}

#[derive(Debug)]
pub struct Store {
    last_id: u64,
    databases: BTreeMap<String, Database>,
    cursors: HashMap<String, Cursor>,
}

impl Default for Store {
    fn default() -> Self {
        Self::new()
    }
}

impl Store {
    pub fn new() -> Self {
        let mut store = Self {
            last_id: 0,
            databases: BTreeMap::new(),
            cursors: HashMap::new(),
        };
        let id = store.next_id();
        store
            .databases
            .insert(SYSTEM_DATABASE.to_string(), Database::new(id, SYSTEM_DATABASE));
        store
    }

    fn next_id(&mut self) -> u64 {
        self.last_id += 1;
        self.last_id
    }

    pub fn database(&self, name: &str) -> Result<&Database, ArangoError> {
        self.databases.get(name).ok_or_else(|| ArangoError::database_not_found(name))
    }

    pub fn database_mut(&mut self, name: &str) -> Result<&mut Database, ArangoError> {
        self.databases
            .get_mut(name)
            .ok_or_else(|| ArangoError::database_not_found(name))
    }

    pub fn database_names(&self) -> Vec<String> {
        self.databases.keys().cloned().collect()
    }

    pub fn create_database(&mut self, name: &str) -> Result<(), ArangoError> {
        if !is_valid_name(name, false) {
            return Err(ArangoError::new(
                StatusCode::BAD_REQUEST,
                codes::DATABASE_NAME_INVALID,
                "database name invalid",
            ));
        }
        if self.databases.contains_key(name) {
            return Err(ArangoError::duplicate_name(name));
        }
        let id = self.next_id();
        self.databases.insert(name.to_string(), Database::new(id, name));
        Ok(())
    }

    pub fn drop_database(&mut self, name: &str) -> Result<(), ArangoError> {
        if name == SYSTEM_DATABASE {
            return Err(ArangoError::use_system_database());
        }
        self.databases
            .remove(name)
            .ok_or_else(|| ArangoError::database_not_found(name))?;
        self.cursors.retain(|_, cursor| cursor.database != name);
        Ok(())
    }

    /// Runs a query and returns the first batch. Results beyond it are kept
    /// under a cursor id until fetched or deleted.
    pub fn create_cursor(&mut self, database: &str, request: CursorRequest) -> Result<Value, ArangoError> {
        let batch_size = request.batch_size.unwrap_or(DEFAULT_BATCH_SIZE);
        if batch_size == 0 {
            return Err(ArangoError::bad_parameter("batchSize must be positive"));
        }
        let query = Query::parse(&request.query).ok_or_else(|| {
            ArangoError::new(
                StatusCode::BAD_REQUEST,
                codes::QUERY_PARSE,
                format!("syntax error, unsupported query: {}", request.query),
            )
        })?;
        let collection_name = request
            .bind_vars
            .get(query.bind())
            .and_then(Value::as_str)
            .ok_or_else(|| {
                ArangoError::new(
                    StatusCode::BAD_REQUEST,
                    codes::QUERY_BIND_PARAMETER_MISSING,
                    format!("no value specified for declared bind parameter '{}'", query.bind()),
                )
            })?;
        let collection = self.database(database)?.collection(collection_name)?;
        let results: VecDeque<Value> = match query {
            Query::All { .. } => collection.documents().cloned().collect(),
            Query::Count { .. } => VecDeque::from([json!(collection.count())]),
        };

        let mut cursor = Cursor {
            database: database.to_string(),
            count: request.count.unwrap_or(false).then_some(results.len()),
            pending: results,
            batch_size,
        };
        let batch = cursor.next_batch();
        if cursor.pending.is_empty() {
            return Ok(cursor_answer(batch, None, &cursor));
        }
        let id = self.next_id().to_string();
        let answer = cursor_answer(batch, Some(&id), &cursor);
        self.cursors.insert(id, cursor);
        Ok(answer)
    }

    pub fn next_batch(&mut self, database: &str, id: &str) -> Result<Value, ArangoError> {
        let cursor = self
            .cursors
            .get_mut(id)
            .filter(|cursor| cursor.database == database)
            .ok_or_else(ArangoError::cursor_not_found)?;
        let batch = cursor.next_batch();
        if cursor.pending.is_empty() {
            let cursor = self.cursors.remove(id).ok_or_else(ArangoError::cursor_not_found)?;
            return Ok(cursor_answer(batch, None, &cursor));
        }
        Ok(cursor_answer(batch, Some(id), cursor))
    }

    pub fn delete_cursor(&mut self, database: &str, id: &str) -> Result<(), ArangoError> {
        match self.cursors.get(id) {
            Some(cursor) if cursor.database == database => {
                self.cursors.remove(id);
                Ok(())
            }
            _ => Err(ArangoError::cursor_not_found()),
        }
    }
}

fn cursor_answer(batch: Vec<Value>, id: Option<&str>, cursor: &Cursor) -> Value {
    let mut answer = json!({
        "result": batch,
        "hasMore": id.is_some(),
        "cached": false,
    });
    if let Value::Object(map) = &mut answer {
        if let Some(id) = id {
            map.insert("id".to_string(), json!(id));
        }
        if let Some(count) = cursor.count {
            map.insert("count".to_string(), json!(count));
        }
    }
    answer
}
