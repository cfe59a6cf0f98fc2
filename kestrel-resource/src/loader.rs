//! Loader registry (spec §6 "Loader registry", §4.3 "Loader flow"): matches
//! a path or an explicit hint to the factory that knows how to turn bytes
//! from the VFS into a populated asset.

use std::io::Read;
use std::path::Path;

use kestrel_core::EngineResult;

/// Options threaded through to a loader's [`LoaderType::instantiate`] call;
/// a flat string map keeps this open-ended without every asset kind having
/// to agree on a shared options struct. Concrete decode formats (image,
/// audio) are out of scope here (spec §1 Non-goals) - this is only the
/// matching/dispatch shape.
#[derive(Clone, Debug, Default)]
pub struct LoadOptions {
    entries: Vec<(String, String)>,
}

impl LoadOptions {
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.entries.push((key.into(), value.into()));
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// A factory for one asset kind `T`. `supports` matches by path
/// (extension, typically); `hints` lists the names a caller can pass
/// explicitly to bypass path sniffing.
pub trait LoaderType<T> {
    fn name(&self) -> &'static str;

    fn supports(&self, path: &Path) -> bool;

    fn hints(&self) -> &'static [&'static str] {
        &[]
    }

    fn instantiate(
        &self,
        path: &Path,
        stream: &mut dyn Read,
        options: &LoadOptions,
    ) -> EngineResult<T>;
}

/// The set of loaders registered for one asset kind.
pub struct LoaderRegistry<T> {
    loaders: Vec<Box<dyn LoaderType<T>>>,
}

impl<T> Default for LoaderRegistry<T> {
    fn default() -> Self {
        Self { loaders: Vec::new() }
    }
}

impl<T> LoaderRegistry<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, loader: Box<dyn LoaderType<T>>) {
        self.loaders.push(loader);
    }

    /// The first loader whose name matches `hint`, or failing that the
    /// first whose `supports(path)` returns true — per spec §4.3's "first
    /// registered loader type whose supports(path) returns true - or the
    /// one whose name matches hint".
    pub fn resolve(&self, path: &Path, hint: Option<&str>) -> Option<&dyn LoaderType<T>> {
        if let Some(hint) = hint {
            if let Some(l) = self
                .loaders
                .iter()
                .find(|l| l.name() == hint || l.hints().contains(&hint))
            {
                return Some(l.as_ref());
            }
        }
        self.loaders
            .iter()
            .find(|l| l.supports(path))
            .map(|l| l.as_ref())
    }

    pub fn is_empty(&self) -> bool {
        self.loaders.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read as _;

    struct UppercaseLoader;

    impl LoaderType<String> for UppercaseLoader {
        fn name(&self) -> &'static str {
            "uppercase"
        }

        fn supports(&self, path: &Path) -> bool {
            path.extension().is_some_and(|e| e == "txt")
        }

        fn hints(&self) -> &'static [&'static str] {
            &["text"]
        }

        fn instantiate(
            &self,
            _path: &Path,
            stream: &mut dyn Read,
            _options: &LoadOptions,
        ) -> EngineResult<String> {
            let mut s = String::new();
            stream.read_to_string(&mut s).unwrap();
            Ok(s.to_uppercase())
        }
    }

    #[test]
    fn resolves_by_extension() {
        let mut registry: LoaderRegistry<String> = LoaderRegistry::new();
        registry.register(Box::new(UppercaseLoader));
        let loader = registry.resolve(Path::new("a.txt"), None);
        assert!(loader.is_some());
    }

    #[test]
    fn resolves_by_hint_even_without_matching_extension() {
        let mut registry: LoaderRegistry<String> = LoaderRegistry::new();
        registry.register(Box::new(UppercaseLoader));
        let loader = registry.resolve(Path::new("a.bin"), Some("text"));
        assert!(loader.is_some());
    }

    #[test]
    fn no_match_returns_none() {
        let registry: LoaderRegistry<String> = LoaderRegistry::new();
        assert!(registry.resolve(Path::new("a.txt"), None).is_none());
    }
}
