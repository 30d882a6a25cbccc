//! Module dependency manifest for the workspace.
//!
//! Static descriptors of each module's declared dependencies, resolved the
//! way a host build tool would: internal dependencies must name a module in
//! the registry, and no module may declare the same dependency twice. The
//! frontend module links the runtime module privately, exactly once.

use std::fmt;

use thiserror::Error;

/// A module's declared build dependencies.
///
/// Public dependencies surface in the module's own API; private ones are
/// implementation detail.
#[derive(Debug, Clone, Copy)]
pub struct ModuleDescriptor {
    pub name: &'static str,
    pub public_dependencies: &'static [&'static str],
    pub private_dependencies: &'static [&'static str],
}

/// Runtime device-access module
pub const RUNTIME_MODULE: &str = "hidscope-transport";
/// Report machinery module
pub const REPORT_MODULE: &str = "hidscope-report";
/// Frontend (CLI) module
pub const FRONTEND_MODULE: &str = "hidscope";

/// All modules in the workspace with their declared dependencies
pub const MODULES: &[ModuleDescriptor] = &[
    ModuleDescriptor {
        name: RUNTIME_MODULE,
        public_dependencies: &["hidapi", "tokio", "serde"],
        private_dependencies: &["thiserror", "tracing"],
    },
    ModuleDescriptor {
        name: REPORT_MODULE,
        public_dependencies: &["serde"],
        private_dependencies: &["thiserror", "tracing"],
    },
    ModuleDescriptor {
        name: FRONTEND_MODULE,
        public_dependencies: &[],
        private_dependencies: &[
            RUNTIME_MODULE,
            REPORT_MODULE,
            "clap",
            "tokio",
            "serde_json",
            "anyhow",
            "thiserror",
            "tracing",
            "tracing-subscriber",
            "ctrlc",
        ],
    },
];

/// Find a module descriptor by name.
pub fn find_module(name: &str) -> Option<&'static ModuleDescriptor> {
    MODULES.iter().find(|m| m.name == name)
}

/// Errors found while resolving the module graph
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ManifestError {
    #[error("module '{module}' depends on unknown module '{dependency}'")]
    UnknownModule {
        module: &'static str,
        dependency: &'static str,
    },

    #[error("module '{module}' declares '{dependency}' more than once")]
    DuplicateDependency {
        module: &'static str,
        dependency: &'static str,
    },
}

/// Resolve the module graph.
pub fn validate() -> Result<(), ManifestError> {
    for module in MODULES {
        let mut seen: Vec<&'static str> = Vec::new();
        for dependency in module
            .public_dependencies
            .iter()
            .chain(module.private_dependencies)
            .copied()
        {
            if seen.contains(&dependency) {
                return Err(ManifestError::DuplicateDependency {
                    module: module.name,
                    dependency,
                });
            }
            seen.push(dependency);

            if dependency.starts_with("hidscope") && find_module(dependency).is_none() {
                return Err(ManifestError::UnknownModule {
                    module: module.name,
                    dependency,
                });
            }
        }
    }
    Ok(())
}

impl fmt::Display for ModuleDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} (public: {}; private: {})",
            self.name,
            join_or_none(self.public_dependencies),
            join_or_none(self.private_dependencies),
        )
    }
}

fn join_or_none(deps: &[&str]) -> String {
    if deps.is_empty() {
        "none".to_string()
    } else {
        deps.join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn module_graph_resolves() {
        assert_eq!(validate(), Ok(()));
    }

    #[test]
    fn frontend_links_runtime_module_exactly_once() {
        let frontend = find_module(FRONTEND_MODULE).unwrap();
        let count = frontend
            .private_dependencies
            .iter()
            .filter(|d| **d == RUNTIME_MODULE)
            .count();
        assert_eq!(count, 1);
        assert!(!frontend.public_dependencies.contains(&RUNTIME_MODULE));
    }

    #[test]
    fn all_modules_are_findable() {
        for module in MODULES {
            assert!(find_module(module.name).is_some());
        }
        assert!(find_module("hidscope-editor").is_none());
    }

    #[test]
    fn no_module_depends_on_itself() {
        for module in MODULES {
            let depends_on_self = module
                .public_dependencies
                .iter()
                .chain(module.private_dependencies)
                .any(|d| *d == module.name);
            assert!(!depends_on_self, "{} depends on itself", module.name);
        }
    }
}
