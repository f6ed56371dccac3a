use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use log::warn;
use serde_json::Value;

use crate::{
    core::{ResolveError, ResolveResult},
    hierarchy::{HierarchicalResolver, LayerSet, MergedMapping, SourceDomain},
};

/// Translation dictionary for one language, resolved from the `i18n/<lang>.yml` tiers
pub struct Dictionary {
    resolver: Arc<HierarchicalResolver>,
    root: PathBuf,
    bundle: Option<String>,
    project: Option<String>,
    language: String,
}

impl Dictionary {
    pub fn new(
        resolver: Arc<HierarchicalResolver>,
        root: impl AsRef<Path>,
        bundle: Option<&str>,
        project: Option<&str>,
        language: impl Into<String>,
    ) -> Self {
        Self {
            resolver,
            root: root.as_ref().to_path_buf(),
            bundle: bundle.map(str::to_string),
            project: project.map(str::to_string),
            language: language.into(),
        }
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    pub fn set_language(&mut self, language: impl Into<String>) -> &mut Self {
        self.language = language.into();
        self
    }

    pub fn layers(&self) -> LayerSet {
        LayerSet::new(
            SourceDomain::Dictionary(self.language.clone()),
            &self.root,
            self.bundle.as_deref(),
            self.project.as_deref(),
        )
    }

    pub fn entries(&self) -> ResolveResult<Arc<MergedMapping>> {
        self.resolver.resolve(&self.layers())
    }

    /// Message for `key` with `%s` placeholders filled from `args`.
    ///
    /// Keys are matched verbatim first (`user.welcome: ...`), then as a
    /// dotted path into nested entries. A missing key is logged and the key
    /// itself is returned.
    pub fn translate(&self, key: &str, args: &[&str]) -> ResolveResult<String> {
        let entries = self.entries()?;
        let message = entries.as_map().get(key).or_else(|| entries.get(key));
        let template = match message {
            Some(Value::String(message)) => message.clone(),
            Some(other) => other.to_string(),
            None => {
                warn!("No '{}' translation for key '{}'", self.language, key);
                return Ok(key.to_string());
            }
        };
        format_message(&template, args)
    }

    pub fn invalidate(&self) -> ResolveResult<bool> {
        self.resolver.invalidate(&self.layers())
    }
}

/// Substitute `%s` with successive `args` and `%%` with `%`.
///
/// Other `%` sequences are kept as written. Running out of arguments is an error.
pub fn format_message(template: &str, args: &[&str]) -> ResolveResult<String> {
    let mut out = String::with_capacity(template.len());
    let mut args = args.iter();
    let mut chars = template.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '%' {
            out.push(c);
            continue;
        }
        match chars.peek() {
            Some('%') => {
                chars.next();
                out.push('%');
            }
            Some('s') => {
                chars.next();
                let arg = args.next().ok_or_else(|| {
                    ResolveError::Validation(format!("too few arguments for message '{template}'"))
                })?;
                out.push_str(arg);
            }
            _ => out.push('%'),
        }
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;
    use crate::{
        cache::{FileCache, MemoryCache},
        config::Scope,
        source::YamlLoader,
    };

    #[test]
    fn test_format_message() {
        assert_eq!(format_message("Hello %s", &["Ana"]).unwrap(), "Hello Ana");
        assert_eq!(
            format_message("%s of %s done (100%%)", &["3", "4"]).unwrap(),
            "3 of 4 done (100%)"
        );
        assert_eq!(format_message("50%d off", &[]).unwrap(), "50%d off");
        assert_eq!(format_message("plain", &["unused"]).unwrap(), "plain");
        assert!(matches!(
            format_message("%s and %s", &["one"]),
            Err(ResolveError::Validation(_))
        ));
    }

    #[test]
    fn test_translate_with_language_switch() {
        let _ = env_logger::builder().is_test(true).try_init();
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("i18n")).unwrap();
        fs::write(root.join("i18n/en.yml"), "welcome: Welcome %s\nbye: Bye\n").unwrap();
        fs::write(root.join("i18n/es.yml"), "welcome: Bienvenido %s\n").unwrap();
        fs::create_dir_all(root.join("Bundle/Shop/i18n")).unwrap();
        fs::write(root.join("Bundle/Shop/i18n/en.yml"), "bye: See you\n").unwrap();

        let resolver = Arc::new(HierarchicalResolver::new(
            Scope::Dev,
            Arc::new(YamlLoader::new()),
            Arc::new(MemoryCache::new()),
            Arc::new(FileCache::new(root)),
        ));
        let mut dictionary = Dictionary::new(resolver, root, Some("Shop"), None, "en");

        assert_eq!(dictionary.translate("welcome", &["Ana"]).unwrap(), "Welcome Ana");
        assert_eq!(dictionary.translate("bye", &[]).unwrap(), "See you");
        assert_eq!(dictionary.translate("unknown.key", &[]).unwrap(), "unknown.key");

        dictionary.set_language("es");
        assert_eq!(dictionary.language(), "es");
        assert_eq!(dictionary.translate("welcome", &["Ana"]).unwrap(), "Bienvenido Ana");
        assert_eq!(dictionary.translate("bye", &[]).unwrap(), "bye");

        dictionary.set_language("fr");
        assert!(matches!(
            dictionary.translate("welcome", &[]),
            Err(ResolveError::MissingGlobalSource(_))
        ));
    }

    #[test]
    fn test_translate_flat_dotted_keys() {
        let _ = env_logger::builder().is_test(true).try_init();
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("i18n")).unwrap();
        fs::write(
            root.join("i18n/en.yml"),
            "\"user.welcome\": Welcome %s\nform:\n  submit: Send\n",
        )
        .unwrap();

        let resolver = Arc::new(HierarchicalResolver::new(
            Scope::Dev,
            Arc::new(YamlLoader::new()),
            Arc::new(MemoryCache::new()),
            Arc::new(FileCache::new(root)),
        ));
        let dictionary = Dictionary::new(resolver, root, None, None, "en");

        assert_eq!(
            dictionary.translate("user.welcome", &["Ana"]).unwrap(),
            "Welcome Ana"
        );
        assert_eq!(dictionary.translate("form.submit", &[]).unwrap(), "Send");
        assert_eq!(dictionary.translate("user.missing", &[]).unwrap(), "user.missing");
    }
}
