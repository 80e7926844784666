use url::form_urlencoded;

/// Typed query parameters that can be projected into a URL query string.
///
/// Implementations push fields in declaration order through the
/// [`QueryPairs`] helpers, which drop unset and zero values.
pub trait QueryParams {
    fn project(&self, pairs: &mut QueryPairs);
}

/// Ordered `name=value` pairs collected from a [`QueryParams`] value.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct QueryPairs {
    pairs: Vec<(String, String)>,
}

impl QueryPairs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pushes an integer; `None` and `0` are treated as unset.
    ///
    /// Negative values are passed through unchanged.
    pub fn int(&mut self, name: &str, value: Option<i32>) {
        if let Some(value) = value.filter(|value| *value != 0) {
            self.pairs.push((name.to_owned(), value.to_string()));
        }
    }

    /// Pushes a string; `None` and `""` are treated as unset.
    pub fn text(&mut self, name: &str, value: Option<&str>) {
        if let Some(value) = value.filter(|value| !value.is_empty()) {
            self.pairs.push((name.to_owned(), value.to_owned()));
        }
    }

    /// Pushes a comma-joined list; an empty list is treated as unset.
    pub fn list(&mut self, name: &str, values: &[String]) {
        let joined = values
            .iter()
            .map(String::as_str)
            .filter(|value| !value.is_empty())
            .collect::<Vec<_>>()
            .join(",");
        self.text(name, Some(joined.as_str()));
    }

    fn contains(&self, name: &str) -> bool {
        self.pairs.iter().any(|(key, _)| key == name)
    }

    fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs
            .iter()
            .map(|(key, value)| (key.as_str(), value.as_str()))
    }

    /// Encodes the pairs as `application/x-www-form-urlencoded`.
    pub fn encode(&self) -> String {
        form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.iter())
            .finish()
    }
}

impl QueryParams for () {
    fn project(&self, _pairs: &mut QueryPairs) {}
}

impl<Q: QueryParams + ?Sized> QueryParams for &Q {
    fn project(&self, pairs: &mut QueryPairs) {
        (**self).project(pairs);
    }
}

/// Raw `(name, value)` pairs, as passed on the command line.
impl<K: AsRef<str>, V: AsRef<str>> QueryParams for [(K, V)] {
    fn project(&self, pairs: &mut QueryPairs) {
        for (name, value) in self {
            pairs.text(name.as_ref(), Some(value.as_ref()));
        }
    }
}

/// Projects `params` into an encoded query string without a leading `?`.
pub fn encode_query<Q: QueryParams + ?Sized>(params: &Q) -> String {
    encode_with_preset(&[], params)
}

/// Projects `params` after the fixed `preset` pairs.
///
/// Caller fields that share a name with a preset key are dropped, so a preset
/// always defines its variant.
pub fn encode_with_preset<Q: QueryParams + ?Sized>(
    preset: &[(&str, &str)],
    params: &Q,
) -> String {
    let mut merged = QueryPairs::new();
    for (name, value) in preset {
        merged.text(name, Some(*value));
    }

    let mut projected = QueryPairs::new();
    params.project(&mut projected);
    for (name, value) in projected.pairs {
        if !merged.contains(&name) {
            merged.pairs.push((name, value));
        }
    }

    merged.encode()
}

#[cfg(test)]
mod tests {
    use super::{QueryPairs, QueryParams, encode_query, encode_with_preset};

    struct Sample {
        page: Option<i32>,
        tag: Option<String>,
        tags: Vec<String>,
    }

    impl QueryParams for Sample {
        fn project(&self, pairs: &mut QueryPairs) {
            pairs.int("page", self.page);
            pairs.text("tag", self.tag.as_deref());
            pairs.list("tags", &self.tags);
        }
    }

    #[test]
    fn zero_values_are_omitted() {
        let params = Sample {
            page: Some(0),
            tag: Some(String::new()),
            tags: Vec::new(),
        };
        assert_eq!(encode_query(&params), "");
    }

    #[test]
    fn set_values_are_percent_encoded_in_declaration_order() {
        let params = Sample {
            page: Some(-2),
            tag: Some("c++ & rust".to_owned()),
            tags: vec!["go".to_owned(), "web dev".to_owned()],
        };
        assert_eq!(
            encode_query(&params),
            "page=-2&tag=c%2B%2B+%26+rust&tags=go%2Cweb+dev"
        );
    }

    #[test]
    fn preset_wins_over_caller_field_with_same_name() {
        let raw = [("state", "all"), ("page", "3")];
        assert_eq!(
            encode_with_preset(&[("state", "fresh")], &raw[..]),
            "state=fresh&page=3"
        );
    }

    #[test]
    fn unit_projects_nothing() {
        assert_eq!(encode_query(&()), "");
    }
}
