use std::{
    fmt,
    path::{Component, Path, PathBuf},
};

use crate::core::{ResolveError, ResolveResult};

/// Directory that holds packages, both at the project root and inside projects
pub const DIR_BUNDLE: &str = "Bundle";

/// Override tiers, ordered from least to most specific
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Tier {
    Global,
    Package,
    Project,
    ProjectPackage,
}

impl Tier {
    pub const ALL: [Tier; 4] = [
        Tier::Global,
        Tier::Package,
        Tier::Project,
        Tier::ProjectPackage,
    ];

    fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Tier::Global => "global",
            Tier::Package => "package",
            Tier::Project => "project",
            Tier::ProjectPackage => "project-package",
        };
        write!(f, "{name}")
    }
}

/// The kind of data resolved through the hierarchy.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum SourceDomain {
    Routes,
    Config,
    Dictionary(String),
}

impl SourceDomain {
    /// Prefix shared by every cache key of this domain
    pub fn namespace(&self) -> String {
        match self {
            SourceDomain::Routes => "routes".to_string(),
            SourceDomain::Config => "config".to_string(),
            SourceDomain::Dictionary(lang) => format!("i18n-{lang}"),
        }
    }

    /// Source file location relative to a tier directory
    pub fn relative_file(&self) -> PathBuf {
        match self {
            SourceDomain::Routes => Path::new("Config").join("Routing.yml"),
            SourceDomain::Config => Path::new("Config").join("Config.yml"),
            SourceDomain::Dictionary(lang) => Path::new("i18n").join(format!("{lang}.yml")),
        }
    }

    /// Whether builds also merge files found by walking the package directory
    pub fn discovers_packages(&self) -> bool {
        matches!(self, SourceDomain::Routes)
    }
}

/// One tier of the override hierarchy
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OverrideLayer {
    pub tier: Tier,
    /// Source file, `None` when the identifiers this tier needs are absent
    pub source: Option<PathBuf>,
    /// Key in the process cache
    pub cache_key: String,
    /// Logical path in the persistent cache
    pub cache_path: String,
}

impl OverrideLayer {
    pub fn is_present(&self) -> bool {
        self.source.as_deref().is_some_and(Path::is_file)
    }
}

/// The four candidate layers for one domain of one project
#[derive(Clone, Debug)]
pub struct LayerSet {
    domain: SourceDomain,
    root: PathBuf,
    layers: [OverrideLayer; 4],
    has_project_context: bool,
}

impl LayerSet {
    /// Build the standard layout under `root`:
    ///
    /// ```text
    /// global          <root>/<file>
    /// package         <root>/Bundle/<bundle>/<file>
    /// project         <root>/Bundle/<project>/<file>
    /// project-package <root>/Bundle/<project>/Bundle/<bundle>/<file>
    /// ```
    pub fn new(
        domain: SourceDomain,
        root: impl Into<PathBuf>,
        bundle: Option<&str>,
        project: Option<&str>,
    ) -> Self {
        let root = root.into();
        let file = domain.relative_file();
        let namespace = domain.namespace();

        let tier_dir = |tier: Tier| -> Option<PathBuf> {
            match tier {
                Tier::Global => Some(PathBuf::new()),
                Tier::Package => bundle.map(|b| Path::new(DIR_BUNDLE).join(b)),
                Tier::Project => project.map(|p| Path::new(DIR_BUNDLE).join(p)),
                Tier::ProjectPackage => match (project, bundle) {
                    (Some(p), Some(b)) => {
                        Some(Path::new(DIR_BUNDLE).join(p).join(DIR_BUNDLE).join(b))
                    }
                    _ => None,
                },
            }
        };

        let layers = Tier::ALL.map(|tier| {
            let dir = tier_dir(tier);
            let stem = dir
                .clone()
                .unwrap_or_else(|| PathBuf::from(format!("_{tier}")))
                .join(file.with_extension(""));
            OverrideLayer {
                tier,
                source: dir.map(|d| root.join(d).join(&file)),
                cache_key: format!("{namespace}/{}", path_key(&root.join(&stem))),
                cache_path: format!("{namespace}/{}", path_key(&stem)),
            }
        });

        Self {
            domain,
            root,
            layers,
            has_project_context: project.is_some(),
        }
    }

    /// Build from explicit layers, for layouts other than the standard one
    pub fn from_layers(
        domain: SourceDomain,
        root: impl Into<PathBuf>,
        layers: [OverrideLayer; 4],
        has_project_context: bool,
    ) -> Self {
        Self {
            domain,
            root: root.into(),
            layers,
            has_project_context,
        }
    }

    pub fn domain(&self) -> &SourceDomain {
        &self.domain
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn has_project_context(&self) -> bool {
        self.has_project_context
    }

    pub fn layer(&self, tier: Tier) -> &OverrideLayer {
        &self.layers[tier.index()]
    }

    /// Tiers that may override Global for this context, least specific first
    fn candidate_tiers(&self) -> &'static [Tier] {
        if self.has_project_context {
            &[Tier::Project, Tier::ProjectPackage]
        } else {
            &[Tier::Package]
        }
    }

    /// Global followed by every present candidate tier, in specificity order.
    ///
    /// Fails with `MissingGlobalSource` regardless of the other tiers.
    pub fn contributing(&self) -> ResolveResult<Vec<&OverrideLayer>> {
        let global = self.layer(Tier::Global);
        if !global.is_present() {
            return Err(ResolveError::MissingGlobalSource(
                global.source.clone().unwrap_or_else(|| self.root.clone()),
            ));
        }

        let mut layers = vec![global];
        layers.extend(
            self.candidate_tiers()
                .iter()
                .map(|tier| self.layer(*tier))
                .filter(|layer| layer.is_present()),
        );
        Ok(layers)
    }

    /// The most specific present tier; its cache entries hold the merged snapshot.
    pub fn select(&self) -> ResolveResult<&OverrideLayer> {
        let layers = self.contributing()?;
        layers
            .last()
            .copied()
            .ok_or_else(|| crate::internal_error!("no contributing layer"))
    }
}

/// Portable `/`-joined key built from the normal components of a path
fn path_key(path: &Path) -> String {
    path.components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}
