//! Flat JSON catalogs for client-side runtimes.
//!
//! ```json
//! {
//!   "domain": "messages",
//!   "plural-forms": "nplurals=2; plural=(n != 1);",
//!   "messages": {
//!     "": { "Hello": "Bonjour", "file": ["fichier", "fichiers"] },
//!     "menu": { "File": "Fichier" }
//!   }
//! }
//! ```
//!
//! Only translated, live entries are written. The empty context key holds
//! entries without a `msgctxt`.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{Generator, Loader, non_empty};
use crate::core::{
    data::{
        Catalog, Entry,
        headers::{LANGUAGE, PLURAL_FORMS, X_DOMAIN},
    },
    error::ParseError,
};

#[derive(Debug, Clone, Copy, Default)]
pub struct JsonFormat;

impl Loader for JsonFormat {
    fn load(&self, bytes: &[u8]) -> Result<Catalog> {
        Ok(parse(bytes)?)
    }
}

impl Generator for JsonFormat {
    fn generate(&self, catalog: &Catalog) -> Result<Vec<u8>> {
        let document = JsonCatalog::from_catalog(catalog);
        let content =
            serde_json::to_string_pretty(&document).context("Failed to serialize JSON")?;
        Ok(format!("{}\n", content).into_bytes())
    }
}

/// The catalog document shared by the JSON and PHP array formats.
#[derive(Debug, Default, Serialize, Deserialize)]
pub(super) struct JsonCatalog {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    domain: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    language: Option<String>,
    #[serde(
        rename = "plural-forms",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    plural_forms: Option<String>,
    #[serde(default)]
    messages: Map<String, Value>,
}

/// A translation is a plain string or the list of plural forms.
#[derive(Debug, Serialize, Deserialize)]
#[serde(untagged)]
enum Translation {
    Single(String),
    Plural(Vec<String>),
}

impl JsonCatalog {
    pub(super) fn from_catalog(catalog: &Catalog) -> Self {
        let headers = catalog.headers();
        let mut messages = Map::new();

        for entry in catalog.iter().filter(|e| !e.obsolete && e.is_translated()) {
            let translation = if entry.plural.is_some() {
                Translation::Plural(entry.translations.clone())
            } else {
                Translation::Single(entry.translations[0].clone())
            };
            let Ok(value) = serde_json::to_value(translation) else {
                continue;
            };

            let context = entry.context.clone().unwrap_or_default();
            if let Value::Object(group) = messages
                .entry(context)
                .or_insert_with(|| Value::Object(Map::new()))
            {
                group.insert(entry.msgid.clone(), value);
            }
        }

        Self {
            domain: headers
                .get(X_DOMAIN)
                .or(catalog.domain())
                .map(str::to_string),
            language: headers.get(LANGUAGE).map(str::to_string),
            plural_forms: headers.get(PLURAL_FORMS).map(str::to_string),
            messages,
        }
    }
}

pub fn parse(bytes: &[u8]) -> Result<Catalog, ParseError> {
    let document: JsonCatalog = serde_json::from_slice(bytes)
        .map_err(|e| ParseError::at(e.line(), format!("invalid JSON catalog: {}", e)))?;
    document.into_catalog()
}

impl JsonCatalog {
    pub(super) fn into_catalog(self) -> Result<Catalog, ParseError> {
        let domain = self.domain.as_deref().and_then(non_empty);
        let mut catalog = Catalog::new(domain);
        if let Some(domain) = domain {
            catalog.headers_mut().set(X_DOMAIN, domain);
        }
        if let Some(language) = self.language.as_deref().and_then(non_empty) {
            catalog.headers_mut().set(LANGUAGE, language);
        }
        if let Some(plural_forms) = self.plural_forms.as_deref().and_then(non_empty) {
            catalog.headers_mut().set(PLURAL_FORMS, plural_forms);
        }

        for (context, group) in self.messages {
            let Value::Object(group) = group else {
                return Err(ParseError::new(format!(
                    "messages for context \"{}\" must be an object",
                    context
                )));
            };
            for (msgid, value) in group {
                let translation: Translation = serde_json::from_value(value).map_err(|_| {
                    ParseError::new(format!(
                        "translation of \"{}\" must be a string or an array of strings",
                        msgid
                    ))
                })?;
                let translations = match translation {
                    Translation::Single(text) => vec![text],
                    Translation::Plural(forms) => forms,
                };
                catalog.insert(Entry {
                    context: non_empty(&context).map(str::to_string),
                    msgid,
                    translations,
                    ..Default::default()
                });
            }
        }

        Ok(catalog)
    }
}

#[cfg(test)]
mod tests {
    use insta::assert_snapshot;
    use pretty_assertions::assert_eq;

    use super::*;

    fn sample() -> Catalog {
        let mut catalog = Catalog::for_domain("messages");
        catalog
            .headers_mut()
            .set(PLURAL_FORMS, "nplurals=2; plural=(n > 1);");

        let mut hello = Entry::new("Hello");
        hello.translations = vec!["Bonjour".to_string()];
        catalog.insert(hello);

        catalog.insert(Entry::new("Untranslated"));

        let mut file = Entry::with_context("menu", "file");
        file.plural = Some("files".to_string());
        file.translations = vec!["fichier".to_string(), "fichiers".to_string()];
        catalog.insert(file);

        catalog
    }

    #[test]
    fn test_generate() {
        let bytes = JsonFormat.generate(&sample()).unwrap();
        assert_snapshot!(String::from_utf8(bytes).unwrap(), @r#"
        {
          "domain": "messages",
          "plural-forms": "nplurals=2; plural=(n > 1);",
          "messages": {
            "": {
              "Hello": "Bonjour"
            },
            "menu": {
              "file": [
                "fichier",
                "fichiers"
              ]
            }
          }
        }
        "#);
    }

    #[test]
    fn test_load_generated_output() {
        let bytes = JsonFormat.generate(&sample()).unwrap();
        let catalog = JsonFormat.load(&bytes).unwrap();

        assert_eq!(catalog.domain(), Some("messages"));
        assert_eq!(catalog.len(), 2);
        assert_eq!(
            catalog.find(None, "Hello").and_then(Entry::translation),
            Some("Bonjour")
        );
        assert_eq!(
            catalog.find(Some("menu"), "file").map(|e| e.translations.len()),
            Some(2)
        );
        assert_eq!(catalog.headers().plural_count(), 2);
    }

    #[test]
    fn test_parse_rejects_syntax_errors() {
        let err = parse(b"{\n  \"messages\": {\n}").unwrap_err();
        assert!(err.message.starts_with("invalid JSON catalog"));
        assert!(err.line.is_some());
    }

    #[test]
    fn test_parse_rejects_wrong_shapes() {
        assert!(parse(br#"{"messages": {"": "Bonjour"}}"#).is_err());
        assert!(parse(br#"{"messages": {"": {"Hello": 3}}}"#).is_err());
        assert!(parse(br#"[1, 2]"#).is_err());
    }

    #[test]
    fn test_parse_minimal_document() {
        let catalog = parse(br#"{"messages": {"": {"Hi": "Salut"}}}"#).unwrap();
        assert_eq!(catalog.domain(), None);
        assert_eq!(
            catalog.find(None, "Hi").and_then(Entry::translation),
            Some("Salut")
        );
    }
}
