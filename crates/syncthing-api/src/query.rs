// Query-string builder
//
// Parameters are rendered eagerly in insertion order. Absent values and
// empty lists never reach the wire; list elements are encoded one by one
// and joined with a literal comma, which is what the daemon splits on.

use std::fmt;

/// Ordered set of already-encoded `key=value` pairs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
    pairs: Vec<(String, String)>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a scalar parameter. The value is percent-encoded.
    pub fn param(mut self, key: impl Into<String>, value: impl fmt::Display) -> Self {
        let encoded = urlencoding::encode(&value.to_string()).into_owned();
        self.pairs.push((key.into(), encoded));
        self
    }

    /// Add a scalar parameter only when `value` is `Some`.
    pub fn opt<V: fmt::Display>(self, key: impl Into<String>, value: Option<V>) -> Self {
        match value {
            Some(v) => self.param(key, v),
            None => self,
        }
    }

    /// Add a sequence parameter, omitted entirely when the sequence is empty.
    pub fn list<I, V>(mut self, key: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: AsRef<str>,
    {
        let encoded: Vec<String> = values
            .into_iter()
            .map(|v| urlencoding::encode(v.as_ref()).into_owned())
            .collect();
        if !encoded.is_empty() {
            self.pairs.push((key.into(), encoded.join(",")));
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Look up the encoded value of the first parameter named `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (key, value)) in self.pairs.iter().enumerate() {
            if i > 0 {
                f.write_str("&")?;
            }
            write!(f, "{key}={value}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn omits_absent_and_empty_values() {
        let query = Query::new()
            .opt("folder", None::<&str>)
            .opt("device", Some("abc"))
            .list("events", Vec::<String>::new());
        assert_eq!(query.to_string(), "device=abc");
    }

    #[test]
    fn joins_lists_with_literal_commas() {
        let query = Query::new().list("events", ["ItemStarted", "ItemFinished"]);
        assert_eq!(query.to_string(), "events=ItemStarted,ItemFinished");
    }

    #[test]
    fn encodes_each_element_separately() {
        let query = Query::new()
            .list("enable", ["model,db", "a b"])
            .param("current", "/var/sync thing/");
        assert_eq!(
            query.to_string(),
            "enable=model%2Cdb,a%20b&current=%2Fvar%2Fsync%20thing%2F"
        );
    }

    #[test]
    fn preserves_insertion_order() {
        let query = Query::new().param("since", 11).param("limit", 1).param("timeout", 0);
        assert_eq!(query.to_string(), "since=11&limit=1&timeout=0");
        assert_eq!(query.get("limit"), Some("1"));
        assert!(query.get("events").is_none());
    }

    #[test]
    fn empty_query_renders_nothing() {
        let query = Query::new().opt("folder", None::<u64>);
        assert!(query.is_empty());
        assert_eq!(query.to_string(), "");
    }
}
