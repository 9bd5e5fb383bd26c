use std::collections::BTreeMap;

/// One harvested article: field tag to one or more values, in tag order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Record {
    fields: BTreeMap<String, Vec<String>>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a value, keeping earlier values of the same field.
    pub fn push(&mut self, field: impl Into<String>, value: impl Into<String>) {
        self.fields.entry(field.into()).or_default().push(value.into());
    }

    /// Joins `fragment` onto the most recent value of `field` with a single space.
    /// Returns `false` when the field has no value yet.
    pub fn extend_last(&mut self, field: &str, fragment: &str) -> bool {
        match self.fields.get_mut(field).and_then(|values| values.last_mut()) {
            Some(last) => {
                if !last.is_empty() && !fragment.is_empty() {
                    last.push(' ');
                }
                last.push_str(fragment);
                true
            }
            None => false,
        }
    }

    pub fn first(&self, field: &str) -> Option<&str> {
        self.fields
            .get(field)
            .and_then(|values| values.first())
            .map(String::as_str)
    }

    pub fn values(&self, field: &str) -> &[String] {
        self.fields.get(field).map(Vec::as_slice).unwrap_or(&[])
    }

    /// First value of `field` when it is present, non-blank and not `false`.
    pub fn present(&self, field: &str) -> Option<&str> {
        self.first(field)
            .map(str::trim)
            .filter(|value| !value.is_empty() && !value.eq_ignore_ascii_case("false"))
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.fields
            .iter()
            .map(|(field, values)| (field.as_str(), values.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Record {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut record = Record::new();
        for (field, value) in iter {
            record.push(field, value);
        }
        record
    }
}
