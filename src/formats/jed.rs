//! Jed locale data (`.jed.json`).
//!
//! ```json
//! {
//!   "messages": {
//!     "": { "domain": "messages", "lang": "fr", "plural_forms": "nplurals=2; plural=(n > 1);" },
//!     "Hello": ["Bonjour"],
//!     "menu\u0004File": ["Fichier"]
//!   }
//! }
//! ```
//!
//! The loader also accepts the Jed 0.x shape: a `locale_data` wrapper and
//! translation arrays starting with a `null` placeholder.

use anyhow::{Context, Result};
use serde_json::{Map, Value, json};

use super::{Generator, Loader, non_empty};
use crate::core::{
    data::{
        Catalog, Entry,
        headers::{LANGUAGE, PLURAL_FORMS, X_DOMAIN},
    },
    error::ParseError,
};

const CONTEXT_SEPARATOR: char = '\u{04}';
const FALLBACK_DOMAIN: &str = "messages";

#[derive(Debug, Clone, Copy, Default)]
pub struct JedFormat;

impl Loader for JedFormat {
    fn load(&self, bytes: &[u8]) -> Result<Catalog> {
        Ok(parse(bytes)?)
    }
}

impl Generator for JedFormat {
    fn generate(&self, catalog: &Catalog) -> Result<Vec<u8>> {
        let content = serde_json::to_string_pretty(&to_value(catalog))
            .context("Failed to serialize Jed locale data")?;
        Ok(format!("{}\n", content).into_bytes())
    }
}

fn to_value(catalog: &Catalog) -> Value {
    let headers = catalog.headers();
    let domain = headers
        .get(X_DOMAIN)
        .or(catalog.domain())
        .unwrap_or(FALLBACK_DOMAIN);

    let mut meta = Map::new();
    meta.insert("domain".to_string(), json!(domain));
    meta.insert("lang".to_string(), json!(headers.get(LANGUAGE).unwrap_or("")));
    meta.insert(
        "plural_forms".to_string(),
        json!(
            headers
                .get(PLURAL_FORMS)
                .unwrap_or("nplurals=2; plural=(n != 1);")
        ),
    );

    let mut messages = Map::new();
    messages.insert(String::new(), Value::Object(meta));
    for entry in catalog.iter().filter(|e| !e.obsolete && e.is_translated()) {
        let key = match &entry.context {
            Some(context) => format!("{}{}{}", context, CONTEXT_SEPARATOR, entry.msgid),
            None => entry.msgid.clone(),
        };
        messages.insert(key, json!(entry.translations));
    }

    let mut root = Map::new();
    root.insert(domain.to_string(), Value::Object(messages));
    Value::Object(root)
}

pub fn parse(bytes: &[u8]) -> Result<Catalog, ParseError> {
    let value: Value = serde_json::from_slice(bytes)
        .map_err(|e| ParseError::at(e.line(), format!("invalid Jed locale data: {}", e)))?;

    let root = match value {
        Value::Object(mut root) => match root.remove("locale_data") {
            Some(Value::Object(locale_data)) => locale_data,
            Some(_) => return Err(ParseError::new("\"locale_data\" must be an object")),
            None => root,
        },
        _ => return Err(ParseError::new("root of Jed locale data must be an object")),
    };

    // One catalog per file; with several domains, the first one is used.
    let Some((domain, messages)) = root.into_iter().next() else {
        return Err(ParseError::new("Jed locale data contains no domain"));
    };
    let Value::Object(messages) = messages else {
        return Err(ParseError::new(format!(
            "domain \"{}\" must be an object",
            domain
        )));
    };

    let mut catalog = Catalog::new(non_empty(&domain));
    for (key, value) in messages {
        if key.is_empty() {
            read_meta(&mut catalog, &value)?;
            continue;
        }

        let Value::Array(items) = value else {
            return Err(ParseError::new(format!(
                "translation of \"{}\" must be an array",
                key
            )));
        };
        let mut translations = Vec::with_capacity(items.len());
        for (i, item) in items.into_iter().enumerate() {
            match item {
                Value::String(text) => translations.push(text),
                Value::Null if i == 0 => {}
                _ => {
                    return Err(ParseError::new(format!(
                        "translation of \"{}\" must contain only strings",
                        key
                    )));
                }
            }
        }

        let (context, msgid) = match key.split_once(CONTEXT_SEPARATOR) {
            Some((context, msgid)) => (Some(context.to_string()), msgid.to_string()),
            None => (None, key),
        };
        catalog.insert(Entry {
            context,
            msgid,
            translations,
            ..Default::default()
        });
    }

    Ok(catalog)
}

fn read_meta(catalog: &mut Catalog, value: &Value) -> Result<(), ParseError> {
    let Value::Object(meta) = value else {
        return Err(ParseError::new("metadata entry must be an object"));
    };
    let field = |name: &str| meta.get(name).and_then(Value::as_str).and_then(non_empty);

    if let Some(domain) = field("domain") {
        catalog.set_domain(Some(domain.to_string()));
        catalog.headers_mut().set(X_DOMAIN, domain);
    }
    if let Some(lang) = field("lang") {
        catalog.headers_mut().set(LANGUAGE, lang);
    }
    if let Some(plural_forms) = field("plural_forms").or(field("plural-forms")) {
        catalog.headers_mut().set(PLURAL_FORMS, plural_forms);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use insta::assert_snapshot;
    use pretty_assertions::assert_eq;

    use super::*;

    fn sample() -> Catalog {
        let mut catalog = Catalog::for_domain("admin");
        catalog.headers_mut().set(LANGUAGE, "fr");

        let mut hello = Entry::new("Hello");
        hello.translations = vec!["Bonjour".to_string()];
        catalog.insert(hello);

        let mut file = Entry::with_context("menu", "File");
        file.translations = vec!["Fichier".to_string()];
        catalog.insert(file);

        let mut gone = Entry::new("Gone");
        gone.translations = vec!["Parti".to_string()];
        gone.obsolete = true;
        catalog.insert(gone);

        catalog
    }

    #[test]
    fn test_generate() {
        let bytes = JedFormat.generate(&sample()).unwrap();
        assert_snapshot!(String::from_utf8(bytes).unwrap(), @r#"
        {
          "admin": {
            "": {
              "domain": "admin",
              "lang": "fr",
              "plural_forms": "nplurals=2; plural=(n != 1);"
            },
            "Hello": [
              "Bonjour"
            ],
            "menu\u0004File": [
              "Fichier"
            ]
          }
        }
        "#);
    }

    #[test]
    fn test_load_generated_output() {
        let bytes = JedFormat.generate(&sample()).unwrap();
        let catalog = JedFormat.load(&bytes).unwrap();

        assert_eq!(catalog.domain(), Some("admin"));
        assert_eq!(catalog.headers().get(LANGUAGE), Some("fr"));
        assert_eq!(
            catalog.find(Some("menu"), "File").and_then(Entry::translation),
            Some("Fichier")
        );
        assert!(catalog.find(None, "Gone").is_none());
    }

    #[test]
    fn test_parse_legacy_locale_data() {
        let bytes = br#"{
            "domain": "messages",
            "locale_data": {
                "messages": {
                    "": { "domain": "messages", "lang": "de" },
                    "Hello": [null, "Hallo"]
                }
            }
        }"#;
        let catalog = parse(bytes).unwrap();
        assert_eq!(
            catalog.find(None, "Hello").map(|e| e.translations.clone()),
            Some(vec!["Hallo".to_string()])
        );
        assert_eq!(catalog.headers().get(LANGUAGE), Some("de"));
    }

    #[test]
    fn test_parse_rejects_malformed_data() {
        assert!(parse(b"not json").is_err());
        assert!(parse(b"{}").is_err());
        assert!(parse(br#"{"messages": {"Hello": "Bonjour"}}"#).is_err());
        assert!(parse(br#"{"messages": {"Hello": ["a", 1]}}"#).is_err());
    }
}
