/// Catalog-level metadata (`Language`, `Plural-Forms`, `Content-Type`, ...).
///
/// Kept as an ordered list so generated files preserve the order the headers
/// were read or declared in. Lookups are case-insensitive.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Headers {
    pairs: Vec<(String, String)>,
}

pub const CONTENT_TYPE: &str = "Content-Type";
pub const CONTENT_TRANSFER_ENCODING: &str = "Content-Transfer-Encoding";
pub const LANGUAGE: &str = "Language";
pub const PLURAL_FORMS: &str = "Plural-Forms";
pub const X_DOMAIN: &str = "X-Domain";

const DEFAULT_PLURAL_COUNT: usize = 2;

impl Headers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Set a header, replacing an existing value in place.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self
            .pairs
            .iter_mut()
            .find(|(key, _)| key.eq_ignore_ascii_case(&name))
        {
            Some(pair) => pair.1 = value,
            None => self.pairs.push((name, value)),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Parse the `Key: Value` lines stored in a header entry.
    ///
    /// Blank lines are skipped. A non-blank line without a colon is returned
    /// as `Err` so callers can report a corrupt header.
    pub fn parse(text: &str) -> Result<Self, String> {
        let mut headers = Self::new();
        for line in text.lines() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let Some((name, value)) = line.split_once(':') else {
                return Err(format!("malformed header line \"{}\"", line));
            };
            let name = name.trim();
            if name.is_empty() {
                return Err(format!("malformed header line \"{}\"", line));
            }
            headers.set(name, value.trim());
        }
        Ok(headers)
    }

    /// Render as the `msgstr` of a header entry: one `Key: Value\n` per header.
    pub fn to_header_text(&self) -> String {
        self.pairs
            .iter()
            .map(|(k, v)| format!("{}: {}\n", k, v))
            .collect()
    }

    /// Number of plural forms declared by `Plural-Forms` (`nplurals=N`).
    pub fn plural_count(&self) -> usize {
        self.get(PLURAL_FORMS)
            .and_then(|value| {
                value.split(';').find_map(|part| {
                    let (key, n) = part.split_once('=')?;
                    (key.trim() == "nplurals")
                        .then(|| n.trim().parse::<usize>().ok())
                        .flatten()
                })
            })
            .filter(|n| *n > 0)
            .unwrap_or(DEFAULT_PLURAL_COUNT)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Headers {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut headers = Self::new();
        for (k, v) in iter {
            headers.set(k, v);
        }
        headers
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_get_is_case_insensitive() {
        let mut headers = Headers::new();
        headers.set("Content-Type", "text/plain; charset=UTF-8");
        assert_eq!(headers.get("content-type"), Some("text/plain; charset=UTF-8"));
    }

    #[test]
    fn test_set_replaces_in_place() {
        let mut headers: Headers = [("Language", "fr"), ("X-Domain", "messages")]
            .into_iter()
            .collect();
        headers.set("language", "de");

        let pairs: Vec<_> = headers.iter().collect();
        assert_eq!(pairs, vec![("Language", "de"), ("X-Domain", "messages")]);
    }

    #[test]
    fn test_parse_header_text() {
        let headers =
            Headers::parse("Language: fr\nPlural-Forms: nplurals=2; plural=(n > 1);\n").unwrap();
        assert_eq!(headers.get(LANGUAGE), Some("fr"));
        assert_eq!(headers.plural_count(), 2);
        assert_eq!(
            headers.to_header_text(),
            "Language: fr\nPlural-Forms: nplurals=2; plural=(n > 1);\n"
        );
    }

    #[test]
    fn test_parse_rejects_line_without_colon() {
        let err = Headers::parse("Language fr\n").unwrap_err();
        assert!(err.contains("malformed header line"));
    }

    #[test]
    fn test_plural_count() {
        let mut headers = Headers::new();
        assert_eq!(headers.plural_count(), 2);

        headers.set(PLURAL_FORMS, "nplurals=3; plural=(n%10==1 && n%100!=11 ? 0 : 2);");
        assert_eq!(headers.plural_count(), 3);

        headers.set(PLURAL_FORMS, "nplurals=1; plural=0;");
        assert_eq!(headers.plural_count(), 1);
    }
}
