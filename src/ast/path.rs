//! Reference paths and concrete data paths.
//!
//! A [`RefPath`] is the pattern form used in configuration (`$.assets.*.value`),
//! a [`DataPath`] addresses one concrete location in user data (`assets.0.value`).

use serde_json::{Map, Value as Json};
use std::fmt;

/// One token of a reference path.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathToken {
    Key(String),
    /// `*`: every element of an array.
    Wildcard,
    /// `^`: the token at the same position in the path being evaluated.
    Relative,
}

impl PathToken {
    fn parse(token: &str) -> Self {
        match token {
            "*" => PathToken::Wildcard,
            "^" => PathToken::Relative,
            key => PathToken::Key(key.to_string()),
        }
    }

    fn matches(&self, key: &DataKey) -> bool {
        match (self, key) {
            (PathToken::Key(expected), DataKey::Field(field)) => expected == field,
            (PathToken::Key(expected), DataKey::Index(index)) => *expected == index.to_string(),
            (PathToken::Wildcard, DataKey::Index(_)) => true,
            (PathToken::Wildcard, DataKey::Field(field)) => {
                !field.is_empty() && field.bytes().all(|b| b.is_ascii_digit())
            }
            (PathToken::Relative, _) => false,
        }
    }
}

impl fmt::Display for PathToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathToken::Key(key) => write!(f, "{}", key),
            PathToken::Wildcard => write!(f, "*"),
            PathToken::Relative => write!(f, "^"),
        }
    }
}

/// A `$.`-rooted reference path, possibly containing `*` and `^` tokens.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct RefPath {
    tokens: Vec<PathToken>,
}

impl RefPath {
    pub fn new(tokens: Vec<PathToken>) -> Self {
        Self { tokens }
    }

    /// Parses `$.a.*.b`. The `$.` prefix is optional.
    pub fn parse(path: &str) -> Self {
        let body = path
            .strip_prefix("$.")
            .or_else(|| path.strip_prefix('$'))
            .unwrap_or(path);
        let tokens = if body.is_empty() {
            Vec::new()
        } else {
            body.split('.').map(PathToken::parse).collect()
        };
        Self { tokens }
    }

    /// Pattern for a concrete data path: indexes become `*`, then a single
    /// trailing `*` is dropped so that array paths address their owning node.
    pub fn from_data_path(path: &DataPath) -> Self {
        let tokens = path
            .keys()
            .iter()
            .map(|key| match key {
                DataKey::Field(field) => PathToken::Key(field.clone()),
                DataKey::Index(_) => PathToken::Wildcard,
            })
            .collect();
        Self { tokens }.without_trailing_wildcard()
    }

    pub fn tokens(&self) -> &[PathToken] {
        &self.tokens
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn child(&self, token: PathToken) -> Self {
        let mut tokens = self.tokens.clone();
        tokens.push(token);
        Self { tokens }
    }

    pub fn parent(&self) -> Option<Self> {
        let (_, rest) = self.tokens.split_last()?;
        Some(Self {
            tokens: rest.to_vec(),
        })
    }

    pub fn has_wildcard(&self) -> bool {
        self.tokens.contains(&PathToken::Wildcard)
    }

    pub fn has_relative(&self) -> bool {
        self.tokens.contains(&PathToken::Relative)
    }

    pub fn ends_with_wildcard(&self) -> bool {
        self.tokens.last() == Some(&PathToken::Wildcard)
    }

    /// True when `prefix` is a leading run of this path's tokens.
    pub fn starts_with(&self, prefix: &RefPath) -> bool {
        self.tokens.starts_with(&prefix.tokens)
    }

    pub fn with_trailing_wildcard(&self) -> Self {
        self.child(PathToken::Wildcard)
    }

    pub fn without_trailing_wildcard(&self) -> Self {
        let mut tokens = self.tokens.clone();
        if tokens.last() == Some(&PathToken::Wildcard) {
            tokens.pop();
        }
        Self { tokens }
    }

    /// Treats every `^` as `*`, giving the static shape of a relative reference.
    pub fn normalize_relative(&self) -> Self {
        let tokens = self
            .tokens
            .iter()
            .map(|token| match token {
                PathToken::Relative => PathToken::Wildcard,
                other => other.clone(),
            })
            .collect();
        Self { tokens }
    }

    /// Replaces each `^` with the key found at the same position of `target`.
    /// Positions beyond the target stay relative and will never match data.
    pub fn with_relative_from(&self, target: &DataPath) -> Self {
        let tokens = self
            .tokens
            .iter()
            .enumerate()
            .map(|(position, token)| match (token, target.keys().get(position)) {
                (PathToken::Relative, Some(key)) => PathToken::Key(key.to_string()),
                (other, _) => other.clone(),
            })
            .collect();
        Self { tokens }
    }

    /// Converts a fully static reference into a data path.
    pub fn to_data_path(&self) -> Option<DataPath> {
        self.tokens
            .iter()
            .map(|token| match token {
                PathToken::Key(key) => Some(DataKey::Field(key.clone())),
                PathToken::Wildcard | PathToken::Relative => None,
            })
            .collect::<Option<Vec<_>>>()
            .map(DataPath::new)
    }

    /// True when `path` has the same length and every token matches.
    pub fn matches(&self, path: &DataPath) -> bool {
        self.tokens.len() == path.len()
            && self
                .tokens
                .iter()
                .zip(path.keys())
                .all(|(token, key)| token.matches(key))
    }

    /// Every concrete path in `data` this pattern matches, in document order.
    pub fn data_paths(&self, data: &Json) -> Vec<DataPath> {
        let mut found = Vec::new();
        let mut prefix = Vec::new();
        collect_matches(&self.tokens, data, &mut prefix, &mut found);
        found
    }

    /// Concrete paths for a node pattern: the prefix up to the last `*` is
    /// expanded against `data`, the static remainder is appended as-is.
    /// A trailing `*` is dropped first, so repeatable nodes expand to the
    /// array itself.
    pub fn expand(&self, data: &Json) -> Vec<DataPath> {
        let target = self.without_trailing_wildcard();
        let Some(last_wildcard) = target
            .tokens
            .iter()
            .rposition(|token| *token == PathToken::Wildcard)
        else {
            return target.to_data_path().into_iter().collect();
        };

        let head = RefPath::new(target.tokens[..=last_wildcard].to_vec());
        let tail: Vec<DataKey> = target.tokens[last_wildcard + 1..]
            .iter()
            .filter_map(|token| match token {
                PathToken::Key(key) => Some(DataKey::Field(key.clone())),
                _ => None,
            })
            .collect();

        head.data_paths(data)
            .into_iter()
            .map(|path| path.join(&tail))
            .collect()
    }
}

fn collect_matches(
    tokens: &[PathToken],
    value: &Json,
    prefix: &mut Vec<DataKey>,
    found: &mut Vec<DataPath>,
) {
    let Some((head, rest)) = tokens.split_first() else {
        found.push(DataPath::new(prefix.clone()));
        return;
    };

    match (head, value) {
        (PathToken::Key(key), Json::Object(map)) => {
            if let Some(next) = map.get(key) {
                prefix.push(DataKey::Field(key.clone()));
                collect_matches(rest, next, prefix, found);
                prefix.pop();
            }
        }
        (PathToken::Key(key), Json::Array(items)) => {
            if let Some((index, next)) = key
                .parse::<usize>()
                .ok()
                .and_then(|index| items.get(index).map(|next| (index, next)))
            {
                prefix.push(DataKey::Index(index));
                collect_matches(rest, next, prefix, found);
                prefix.pop();
            }
        }
        (PathToken::Wildcard, Json::Array(items)) => {
            for (index, next) in items.iter().enumerate() {
                prefix.push(DataKey::Index(index));
                collect_matches(rest, next, prefix, found);
                prefix.pop();
            }
        }
        _ => {}
    }
}

impl fmt::Display for RefPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "$")?;
        for token in &self.tokens {
            write!(f, ".{}", token)?;
        }
        Ok(())
    }
}

impl From<&str> for RefPath {
    fn from(path: &str) -> Self {
        RefPath::parse(path)
    }
}

/// One step into user data.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DataKey {
    Field(String),
    Index(usize),
}

impl fmt::Display for DataKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataKey::Field(field) => write!(f, "{}", field),
            DataKey::Index(index) => write!(f, "{}", index),
        }
    }
}

/// A concrete location in user data, displayed as `a.0.b`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct DataPath(Vec<DataKey>);

impl DataPath {
    pub fn new(keys: Vec<DataKey>) -> Self {
        Self(keys)
    }

    pub fn field(name: &str) -> Self {
        Self(vec![DataKey::Field(name.to_string())])
    }

    /// Parses `a.0.b`; all-digit segments become indexes.
    pub fn parse(path: &str) -> Self {
        let keys = path
            .split('.')
            .filter(|segment| !segment.is_empty())
            .map(|segment| match segment.parse::<usize>() {
                Ok(index) => DataKey::Index(index),
                Err(_) => DataKey::Field(segment.to_string()),
            })
            .collect();
        Self(keys)
    }

    pub fn keys(&self) -> &[DataKey] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn last(&self) -> Option<&DataKey> {
        self.0.last()
    }

    pub fn first(&self) -> Option<&DataKey> {
        self.0.first()
    }

    pub fn child(&self, key: DataKey) -> Self {
        let mut keys = self.0.clone();
        keys.push(key);
        Self(keys)
    }

    pub fn join(&self, tail: &[DataKey]) -> Self {
        let mut keys = self.0.clone();
        keys.extend_from_slice(tail);
        Self(keys)
    }

    pub fn parent(&self) -> Option<Self> {
        let (_, rest) = self.0.split_last()?;
        Some(Self(rest.to_vec()))
    }

    /// The first `len` keys of this path.
    pub fn prefix(&self, len: usize) -> Self {
        Self(self.0[..len.min(self.0.len())].to_vec())
    }

    pub fn get<'a>(&self, data: &'a Json) -> Option<&'a Json> {
        self.0
            .iter()
            .try_fold(data, |current, key| child(current, key))
    }

    /// Writes `value`, creating intermediate objects or arrays as needed.
    pub fn insert(&self, root: &mut Json, value: Json) {
        let Some((last, parents)) = self.0.split_last() else {
            *root = value;
            return;
        };
        let mut current = root;
        for key in parents {
            current = child_slot(current, key);
        }
        *child_slot(current, last) = value;
    }

    /// Removes the value: object members are deleted, array elements are
    /// nulled so sibling indexes stay stable.
    pub fn remove(&self, root: &mut Json) -> Option<Json> {
        let (last, parents) = self.0.split_last()?;
        let mut current = root;
        for key in parents {
            current = child_mut(current, key)?;
        }
        match (current, last) {
            (Json::Object(map), key) => map.shift_remove(&key.to_string()),
            (Json::Array(items), key) => array_index(key)
                .and_then(|index| items.get_mut(index))
                .map(|slot| std::mem::replace(slot, Json::Null)),
            _ => None,
        }
    }
}

fn array_index(key: &DataKey) -> Option<usize> {
    match key {
        DataKey::Index(index) => Some(*index),
        DataKey::Field(field) => field.parse().ok(),
    }
}

fn child<'a>(value: &'a Json, key: &DataKey) -> Option<&'a Json> {
    match value {
        Json::Object(map) => map.get(&key.to_string()),
        Json::Array(items) => array_index(key).and_then(|index| items.get(index)),
        _ => None,
    }
}

fn child_mut<'a>(value: &'a mut Json, key: &DataKey) -> Option<&'a mut Json> {
    match value {
        Json::Object(map) => map.get_mut(&key.to_string()),
        Json::Array(items) => array_index(key).and_then(move |index| items.get_mut(index)),
        _ => None,
    }
}

fn child_slot<'a>(container: &'a mut Json, key: &DataKey) -> &'a mut Json {
    let compatible = matches!(
        (&*container, key),
        (Json::Object(_), _) | (Json::Array(_), DataKey::Index(_))
    );
    if !compatible {
        *container = match key {
            DataKey::Index(_) => Json::Array(Vec::new()),
            DataKey::Field(_) => Json::Object(Map::new()),
        };
    }
    match container {
        Json::Array(items) => {
            let index = array_index(key).unwrap_or(items.len());
            if items.len() <= index {
                items.resize(index + 1, Json::Null);
            }
            &mut items[index]
        }
        Json::Object(map) => map.entry(key.to_string()).or_insert(Json::Null),
        other => other,
    }
}

impl fmt::Display for DataPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (position, key) in self.0.iter().enumerate() {
            if position > 0 {
                write!(f, ".")?;
            }
            write!(f, "{}", key)?;
        }
        Ok(())
    }
}

impl From<&str> for DataPath {
    fn from(path: &str) -> Self {
        DataPath::parse(path)
    }
}

/// Visits every leaf under `value` with its full path. Scalars and empty
/// containers are leaves.
pub fn walk_leaves<'a, F>(value: &'a Json, base: &DataPath, visit: &mut F)
where
    F: FnMut(&DataPath, &'a Json),
{
    match value {
        Json::Object(map) if !map.is_empty() => {
            for (key, next) in map {
                walk_leaves(next, &base.child(DataKey::Field(key.clone())), visit);
            }
        }
        Json::Array(items) if !items.is_empty() => {
            for (index, next) in items.iter().enumerate() {
                walk_leaves(next, &base.child(DataKey::Index(index)), visit);
            }
        }
        leaf => visit(base, leaf),
    }
}
