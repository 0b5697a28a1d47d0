use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock};
use std::time::SystemTime;

use proc_macro2::Span;
use toml_edit::{Document, Item, Table};

const FACADE_NAMES: [&str; 2] = ["vc_data", "vc"];
const MEMBER_PREFIX: &str = "vc_";

/// The parsed `Cargo.toml` of the crate a macro expands in.
///
/// Used by derives to find how the calling crate names a workspace member.
///
/// ```rust
/// # use vc_macro_utils::Manifest;
/// let path: syn::Path = Manifest::shared(|m| m.get_crate_path("vc_serial"));
/// ```
///
/// # Resolution rules
///
/// `dependencies` are searched first, then `dev-dependencies`. In each:
///
/// 1. A direct dependency on `name` gives `::name`.
/// 2. For a `vc_` member, a dependency on the facade `vc_data` (or its alias
///    `vc`) gives `::vc_data::short_name`, so `vc_serial` becomes
///    `::vc_data::serial`.
///
/// When neither table matches, or the manifest cannot be read, the result
/// is `::name`. A crate naming itself this way needs
/// `extern crate self as name;` at its root.
#[derive(Debug)]
pub struct Manifest {
    document: Option<Document<Box<str>>>,
    modified: Option<SystemTime>,
}

impl Manifest {
    fn load(path: &Path, modified: Option<SystemTime>) -> Option<Self> {
        let text = std::fs::read_to_string(path).ok()?;
        let document = Document::parse(text.into_boxed_str()).ok()?;
        Some(Self {
            document: Some(document),
            modified,
        })
    }

    fn find_in_deps(deps: &Table, name: &str) -> Option<syn::Path> {
        if deps.contains_key(name) {
            return syn::parse_str(&format!("::{name}")).ok();
        }

        let module = name.strip_prefix(MEMBER_PREFIX)?;
        let facade = FACADE_NAMES.into_iter().find(|facade| deps.contains_key(*facade))?;
        syn::parse_str(&format!("::{facade}::{module}")).ok()
    }

    fn absolute(name: &str) -> syn::Path {
        let ident = syn::Ident::new(name, Span::call_site());
        syn::Path {
            leading_colon: Some(Default::default()),
            segments: [syn::PathSegment::from(ident)].into_iter().collect(),
        }
    }

    /// Returns the path under which the calling crate reaches `name`.
    pub fn get_crate_path(&self, name: &str) -> syn::Path {
        ["dependencies", "dev-dependencies"]
            .into_iter()
            .filter_map(|table| match self.document.as_ref()?.get(table) {
                Some(Item::Table(deps)) => Self::find_in_deps(deps, name),
                _ => None,
            })
            .next()
            .unwrap_or_else(|| Self::absolute(name))
    }

    /// Runs `func` on the caller's manifest.
    ///
    /// Manifests are cached per path and reparsed when the file changes.
    /// Without a readable manifest, `func` sees an empty one.
    pub fn shared<R>(func: impl FnOnce(&Self) -> R) -> R {
        static MANIFESTS: RwLock<BTreeMap<PathBuf, Manifest>> = RwLock::new(BTreeMap::new());

        let Some(dir) = std::env::var_os("CARGO_MANIFEST_DIR") else {
            return func(&Self::empty());
        };
        let path = PathBuf::from(dir).join("Cargo.toml");
        let modified = std::fs::metadata(&path).and_then(|m| m.modified()).ok();

        {
            let manifests = MANIFESTS.read().unwrap_or_else(PoisonError::into_inner);
            if let Some(manifest) = manifests.get(&path)
                && manifest.modified == modified
            {
                return func(manifest);
            }
        }

        let Some(manifest) = Self::load(&path, modified) else {
            return func(&Self::empty());
        };
        let result = func(&manifest);
        MANIFESTS
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(path, manifest);
        result
    }

    const fn empty() -> Self {
        Self {
            document: None,
            modified: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use toml_edit::Document;

    use super::Manifest;

    fn resolve(manifest: &str, name: &str) -> String {
        let manifest = Manifest {
            document: Some(Document::parse(manifest.to_owned().into_boxed_str()).unwrap()),
            modified: None,
        };
        let path = manifest.get_crate_path(name);
        let segments: Vec<_> = path.segments.iter().map(|s| s.ident.to_string()).collect();
        format!("::{}", segments.join("::"))
    }

    #[test]
    fn direct_dependency_wins() {
        let manifest = "[dependencies]\nvc_serial = \"0.1\"\nvc_data = \"0.1\"\n";
        assert_eq!(resolve(manifest, "vc_serial"), "::vc_serial");
    }

    #[test]
    fn member_through_facade() {
        assert_eq!(resolve("[dependencies]\nvc_data = \"0.1\"\n", "vc_serial"), "::vc_data::serial");
        assert_eq!(resolve("[dependencies]\nvc = \"0.1\"\n", "vc_serial"), "::vc::serial");
    }

    #[test]
    fn dev_dependencies_and_fallback() {
        let manifest = "[dependencies]\nserde = \"1\"\n[dev-dependencies]\nvc_data = \"0.1\"\n";
        assert_eq!(resolve(manifest, "vc_serial"), "::vc_data::serial");
        assert_eq!(resolve("[dependencies]\nserde = \"1\"\n", "vc_serial"), "::vc_serial");
    }
}
