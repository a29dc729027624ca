//! Depth-first traversal and dotted-path lookup over documents.

use crate::document::Document;
use crate::value::Value;

impl Document {
    /// Walk the tree depth-first, calling `visit(owner, key, value)` for
    /// every leaf attribute.
    ///
    /// - A key holding a document is not visited itself; its contents are.
    /// - A key holding a list first has any document elements walked, then
    ///   is visited once with the whole list.
    /// - Any other key (scalar or null) is visited once.
    ///
    /// Visit order follows the natural key order and is not guaranteed.
    pub fn traverse<F>(&self, visit: &mut F)
    where
        F: FnMut(&Document, &str, &Value),
    {
        for (key, value) in self {
            match value {
                Value::Document(child) => child.traverse(visit),
                Value::List(items) => {
                    for item in items {
                        if let Value::Document(child) = item {
                            child.traverse(visit);
                        }
                    }
                    visit(self, key.as_str(), value);
                }
                _ => visit(self, key.as_str(), value),
            }
        }
    }

    /// Follow `keys` through nested documents.
    ///
    /// An empty path finds nothing. Every component but the last must name
    /// a document; lists are never indexed, so a path running into a list
    /// or a scalar is not found.
    pub fn get_path(&self, keys: &[&str]) -> Option<&Value> {
        match keys {
            [] => None,
            [last] => self.get(last),
            [first, rest @ ..] => self.get(first)?.as_document()?.get_path(rest),
        }
    }

    /// Mutable counterpart of [`Document::get_path`].
    pub fn get_path_mut(&mut self, keys: &[&str]) -> Option<&mut Value> {
        match keys {
            [] => None,
            [last] => self.get_mut(last),
            [first, rest @ ..] => self
                .get_mut(first)?
                .as_document_mut()?
                .get_path_mut(rest),
        }
    }
}
