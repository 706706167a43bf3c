//! Format registry: file-name suffix → scanner / loader / generator.
//!
//! Resolution compares the lower-cased file name against every registered
//! suffix and keeps the longest match (first registered wins a tie), so
//! `messages.blade.php` resolves to `.blade.php` rather than `.php`. The
//! winning binding must then provide the requested capability; if it does
//! not, the lookup fails with [`ResolveError::Unsupported`] instead of
//! falling back to a shorter suffix.

use std::{path::Path, sync::OnceLock};

use crate::{
    core::error::{PluginKind, ResolveError},
    formats::{
        CatalogFormat, JedFormat, JsonFormat, MoFormat, PhpArrayFormat, PoFormat,
        scanners::{
            BladeExtractor, CodeExtractor, JsExtractor, PhpExtractor, ScanOptions, TwigExtractor,
        },
    },
};

/// Constructor for a source scanner, run at most once per registry.
pub type ExtractorFactory = fn(&ScanOptions) -> CodeExtractor;

/// Capabilities bound to one suffix.
#[derive(Debug)]
pub struct FormatBinding {
    suffix: String,
    scanner: Option<ExtractorFactory>,
    extractor: OnceLock<CodeExtractor>,
    catalog: Option<CatalogFormat>,
}

impl FormatBinding {
    pub fn new(suffix: &str) -> Self {
        Self {
            suffix: suffix.to_ascii_lowercase(),
            scanner: None,
            extractor: OnceLock::new(),
            catalog: None,
        }
    }

    pub fn with_scanner(mut self, factory: ExtractorFactory) -> Self {
        self.scanner = Some(factory);
        self
    }

    /// Bind a catalog format as both loader and generator.
    pub fn with_catalog(mut self, format: impl Into<CatalogFormat>) -> Self {
        self.catalog = Some(format.into());
        self
    }

    pub fn suffix(&self) -> &str {
        &self.suffix
    }

    pub fn supports(&self, kind: PluginKind) -> bool {
        match kind {
            PluginKind::Scanner => self.scanner.is_some(),
            PluginKind::Loader | PluginKind::Generator => self.catalog.is_some(),
        }
    }
}

/// Read-only lookup table owned by one run.
///
/// Extractors are built lazily on first use and reused for every later file
/// with the same suffix.
#[derive(Debug)]
pub struct Registry {
    bindings: Vec<FormatBinding>,
    scan_options: ScanOptions,
}

impl Registry {
    pub fn new(scan_options: ScanOptions) -> Self {
        Self {
            bindings: Vec::new(),
            scan_options,
        }
    }

    /// Registry with every built-in format.
    pub fn with_defaults(scan_options: ScanOptions) -> Self {
        fn php(options: &ScanOptions) -> CodeExtractor {
            PhpExtractor::new(options).into()
        }
        fn blade(options: &ScanOptions) -> CodeExtractor {
            BladeExtractor::new(options).into()
        }
        fn twig(options: &ScanOptions) -> CodeExtractor {
            TwigExtractor::new(options).into()
        }
        fn js(options: &ScanOptions) -> CodeExtractor {
            JsExtractor::new(options).into()
        }

        let mut registry = Self::new(scan_options);
        // PHP files are both source code and array catalogs.
        for suffix in [".php", ".phtml"] {
            registry.register(
                FormatBinding::new(suffix)
                    .with_scanner(php)
                    .with_catalog(PhpArrayFormat),
            );
        }
        registry.register(FormatBinding::new(".blade.php").with_scanner(blade));
        registry.register(FormatBinding::new(".twig").with_scanner(twig));
        for suffix in [".js", ".jsx", ".mjs", ".ts", ".tsx"] {
            registry.register(FormatBinding::new(suffix).with_scanner(js));
        }
        registry.register(FormatBinding::new(".po").with_catalog(PoFormat));
        registry.register(FormatBinding::new(".pot").with_catalog(PoFormat));
        registry.register(FormatBinding::new(".mo").with_catalog(MoFormat));
        registry.register(FormatBinding::new(".json").with_catalog(JsonFormat));
        registry.register(FormatBinding::new(".jed.json").with_catalog(JedFormat));
        registry
    }

    pub fn register(&mut self, binding: FormatBinding) {
        self.bindings.push(binding);
    }

    pub fn bindings(&self) -> &[FormatBinding] {
        &self.bindings
    }

    /// Scanner for `file`, with the index of its binding.
    ///
    /// The index identifies the scanner instance: files sharing an index are
    /// fed to the same [`Scanner`](crate::formats::scanners::Scanner).
    pub fn resolve_scanner(&self, file: &Path) -> Result<(usize, &CodeExtractor), ResolveError> {
        let (index, binding) = self.resolve(PluginKind::Scanner, file)?;
        let factory = binding
            .scanner
            .ok_or_else(|| unsupported(PluginKind::Scanner, binding, file))?;
        let extractor = binding
            .extractor
            .get_or_init(|| factory(&self.scan_options));
        Ok((index, extractor))
    }

    pub fn resolve_loader(&self, file: &Path) -> Result<CatalogFormat, ResolveError> {
        self.resolve_catalog(PluginKind::Loader, file)
    }

    pub fn resolve_generator(&self, file: &Path) -> Result<CatalogFormat, ResolveError> {
        self.resolve_catalog(PluginKind::Generator, file)
    }

    fn resolve_catalog(
        &self,
        kind: PluginKind,
        file: &Path,
    ) -> Result<CatalogFormat, ResolveError> {
        let (_, binding) = self.resolve(kind, file)?;
        binding
            .catalog
            .ok_or_else(|| unsupported(kind, binding, file))
    }

    /// Longest matching suffix over all bindings, then a capability check.
    fn resolve(
        &self,
        kind: PluginKind,
        file: &Path,
    ) -> Result<(usize, &FormatBinding), ResolveError> {
        let name = file
            .file_name()
            .map(|n| n.to_string_lossy().to_lowercase())
            .unwrap_or_default();

        let mut best: Option<(usize, &FormatBinding)> = None;
        for (index, binding) in self.bindings.iter().enumerate() {
            if !name.ends_with(&binding.suffix) {
                continue;
            }
            if best.is_none_or(|(_, b)| binding.suffix.len() > b.suffix.len()) {
                best = Some((index, binding));
            }
        }

        let (index, binding) = best.ok_or_else(|| ResolveError::NotFound {
            kind,
            file: file.display().to_string(),
        })?;
        if !binding.supports(kind) {
            return Err(unsupported(kind, binding, file));
        }
        Ok((index, binding))
    }
}

fn unsupported(kind: PluginKind, binding: &FormatBinding, file: &Path) -> ResolveError {
    ResolveError::Unsupported {
        kind,
        suffix: binding.suffix.clone(),
        file: file.display().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::formats::scanners::Extractor;

    fn registry() -> Registry {
        Registry::with_defaults(ScanOptions::default())
    }

    #[test]
    fn test_longest_suffix_wins() {
        let registry = registry();
        let (blade, extractor) = registry
            .resolve_scanner(Path::new("views/messages.blade.php"))
            .unwrap();
        let (php, _) = registry.resolve_scanner(Path::new("src/App.php")).unwrap();

        assert_ne!(blade, php);
        assert_eq!(registry.bindings()[blade].suffix(), ".blade.php");
        assert!(matches!(extractor, CodeExtractor::BladeExtractor(_)));
    }

    #[test]
    fn test_jed_json_wins_over_json() {
        let registry = registry();
        assert!(matches!(
            registry.resolve_loader(Path::new("locale/fr.jed.json")),
            Ok(CatalogFormat::JedFormat(_))
        ));
        assert!(matches!(
            registry.resolve_generator(Path::new("locale/fr.json")),
            Ok(CatalogFormat::JsonFormat(_))
        ));
    }

    #[test]
    fn test_matching_is_case_insensitive() {
        let registry = registry();
        assert!(matches!(
            registry.resolve_loader(Path::new("LOCALE/FR.PO")),
            Ok(CatalogFormat::PoFormat(_))
        ));
    }

    #[test]
    fn test_not_found() {
        let err = registry()
            .resolve_scanner(Path::new("README.md"))
            .unwrap_err();
        assert_eq!(
            err,
            ResolveError::NotFound {
                kind: PluginKind::Scanner,
                file: "README.md".to_string(),
            }
        );
    }

    #[test]
    fn test_unsupported_kind_for_suffix() {
        let registry = registry();

        let err = registry
            .resolve_generator(Path::new("public/app.js"))
            .unwrap_err();
        assert_eq!(
            err,
            ResolveError::Unsupported {
                kind: PluginKind::Generator,
                suffix: ".js".to_string(),
                file: "public/app.js".to_string(),
            }
        );

        let err = registry
            .resolve_scanner(Path::new("locale/fr.po"))
            .unwrap_err();
        assert!(matches!(err, ResolveError::Unsupported { .. }));
    }

    #[test]
    fn test_php_is_scanned_and_used_as_catalog() {
        let registry = registry();
        let (_, extractor) = registry.resolve_scanner(Path::new("src/App.php")).unwrap();
        assert!(matches!(extractor, CodeExtractor::PhpExtractor(_)));
        assert!(matches!(
            registry.resolve_loader(Path::new("locale/fr.php")),
            Ok(CatalogFormat::PhpArrayFormat(_))
        ));
        assert!(matches!(
            registry.resolve_generator(Path::new("locale/fr.phtml")),
            Ok(CatalogFormat::PhpArrayFormat(_))
        ));

        // Blade templates are source only
        assert!(matches!(
            registry.resolve_generator(Path::new("lang/fr.blade.php")),
            Err(ResolveError::Unsupported { .. })
        ));
    }

    #[test]
    fn test_equal_length_suffixes_first_registered_wins() {
        let mut registry = Registry::new(ScanOptions::default());
        registry.register(FormatBinding::new(".po").with_catalog(PoFormat));
        registry.register(FormatBinding::new(".PO").with_catalog(MoFormat));

        assert!(matches!(
            registry.resolve_loader(Path::new("fr.po")),
            Ok(CatalogFormat::PoFormat(_))
        ));
    }

    #[test]
    fn test_extractor_is_built_once() {
        let registry = registry();
        let (_, first) = registry.resolve_scanner(Path::new("a.js")).unwrap();
        let (_, second) = registry.resolve_scanner(Path::new("b.js")).unwrap();

        assert!(std::ptr::eq(first, second));
        assert_eq!(first.extract("__('x')").len(), 1);
    }
}
