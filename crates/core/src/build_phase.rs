// Copyright 2025 AOT Benchmarker Contributors
// SPDX-License-Identifier: Apache-2.0

//! Build phase flags and deterministic variant naming.
//!
//! A build phase is declared in the benchmark description as a list of flag
//! names (`params: [frameworkComposite, useAvx2]`). The names are mapped onto
//! [`BuildFlags`] through a fixed lookup table; from those flags we derive the
//! variant name that labels the compiled artifact and keys the on-disk cache.
//!
//! ```text
//! flags                                  variant
//! ------------------------------------   ---------------------------------
//! (none)                                 vanilla
//! frameworkComposite                     framework
//! frameworkComposite bundleAspNet        framework-aspnet-bundle
//! frameworkComposite aspnetComposite     framework-aspnet-separated
//! aspnetComposite                        framework-aspnet
//! useAvx2                                framework-avx2-noncomposite
//! frameworkComposite useAvx2 + "web.txt" framework-avx2-web-partial
//! ```
//!
//! AVX2-only builds compile each assembly on its own, so they carry a
//! `-noncomposite` marker that keeps them apart from the AVX2 framework
//! composite. This breaks compatibility with output directories named by
//! earlier tooling: an AVX2-only build lands in
//! `<os>-output-framework-avx2-noncomposite`, not
//! `<os>-output-framework-avx2`, and older directories are not reused.

use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// Variant name for configurations that use their assemblies as provided.
pub const VANILLA: &str = "vanilla";

/// One recognized build flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BuildFlag {
    /// Compile the framework assemblies into one composite image
    FrameworkComposite,
    /// Compile the web framework assemblies into a composite image
    AspNetComposite,
    /// Put the web framework assemblies into the framework composite image
    BundleAspNet,
    /// Target the AVX2 instruction set
    UseAvx2,
}

/// Flag names accepted in `buildPhase.params`, lowercased.
const BUILD_FLAG_NAMES: &[(&str, BuildFlag)] = &[
    ("frameworkcomposite", BuildFlag::FrameworkComposite),
    ("aspnetcomposite", BuildFlag::AspNetComposite),
    ("bundleaspnet", BuildFlag::BundleAspNet),
    ("useavx2", BuildFlag::UseAvx2),
];

impl BuildFlag {
    /// Look up a flag by its case-insensitive name.
    pub fn lookup(name: &str) -> Option<Self> {
        let key = name.trim().to_lowercase();
        BUILD_FLAG_NAMES
            .iter()
            .find(|(flag_name, _)| *flag_name == key)
            .map(|(_, flag)| *flag)
    }
}

/// Boolean build flags of a configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildFlags {
    /// Framework composite requested
    pub framework_composite: bool,
    /// Separate web framework composite requested
    pub aspnet_composite: bool,
    /// Bundle web framework into the framework composite
    pub bundle_aspnet: bool,
    /// Compile for AVX2
    pub use_avx2: bool,
}

impl BuildFlags {
    /// Build the flag set from a list of flag names.
    ///
    /// Unknown names are returned as the error value so the caller can
    /// report them all together.
    pub fn from_names<S: AsRef<str>>(names: &[S]) -> std::result::Result<Self, Vec<String>> {
        let mut flags = Self::default();
        let mut unknown = Vec::new();

        for name in names {
            match BuildFlag::lookup(name.as_ref()) {
                Some(flag) => flags.set(flag),
                None => unknown.push(name.as_ref().to_string()),
            }
        }

        if unknown.is_empty() {
            Ok(flags)
        } else {
            Err(unknown)
        }
    }

    /// Turn on a single flag.
    pub fn set(&mut self, flag: BuildFlag) {
        match flag {
            BuildFlag::FrameworkComposite => self.framework_composite = true,
            BuildFlag::AspNetComposite => self.aspnet_composite = true,
            BuildFlag::BundleAspNet => self.bundle_aspnet = true,
            BuildFlag::UseAvx2 => self.use_avx2 = true,
        }
    }

    /// Whether any composite image is requested.
    pub fn is_composite(&self) -> bool {
        self.framework_composite || self.aspnet_composite
    }

    /// Whether the provided assemblies must be recompiled at all.
    pub fn needs_recompilation(&self) -> bool {
        self.is_composite() || self.use_avx2
    }

    /// Rule violations between flags, as human readable messages.
    pub fn conflicts(&self) -> Vec<String> {
        let mut problems = Vec::new();
        if self.bundle_aspnet && self.aspnet_composite {
            problems.push(
                "BuildPhase: Can't use 'BundleAspNet' and 'AspNetComposite' at the same time."
                    .to_string(),
            );
        }
        if self.bundle_aspnet && !self.framework_composite {
            problems.push(
                "BuildPhase: Can't use 'BundleAspNet' if 'FrameworkComposite' is not present."
                    .to_string(),
            );
        }
        problems
    }
}

/// Compute the variant name for a flag set and optional subset file.
pub fn variant_name(flags: &BuildFlags, subset: Option<&Path>) -> String {
    if !flags.needs_recompilation() {
        return VANILLA.to_string();
    }

    let mut name = String::from("framework");

    if flags.use_avx2 {
        name.push_str("-avx2");
    }
    if flags.framework_composite && flags.bundle_aspnet {
        name.push_str("-aspnet-bundle");
    }
    if flags.aspnet_composite && !flags.bundle_aspnet {
        if flags.framework_composite {
            name.push_str("-aspnet-separated");
        } else {
            name.push_str("-aspnet");
        }
    }
    if !flags.is_composite() {
        name.push_str("-noncomposite");
    }
    if let Some(stem) = subset.and_then(|path| path.file_stem()) {
        name.push('-');
        name.push_str(&stem.to_string_lossy());
        name.push_str("-partial");
    }

    name
}

/// Resolved build phase of a configuration. Immutable once constructed.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildPhaseSpec {
    flags: BuildFlags,
    #[serde(skip_serializing_if = "Option::is_none")]
    assemblies_subset: Option<PathBuf>,
    #[serde(skip)]
    variant: OnceCell<String>,
}

impl BuildPhaseSpec {
    /// Create a build phase from its flags and optional subset list file.
    pub fn new(flags: BuildFlags, assemblies_subset: Option<PathBuf>) -> Self {
        Self {
            flags,
            assemblies_subset,
            variant: OnceCell::new(),
        }
    }

    /// The build flags.
    pub fn flags(&self) -> &BuildFlags {
        &self.flags
    }

    /// Path of the partial-subset list file, if any.
    pub fn assemblies_subset(&self) -> Option<&Path> {
        self.assemblies_subset.as_deref()
    }

    /// Whether only a subset of the assemblies goes into the composite.
    pub fn is_partial_subset(&self) -> bool {
        self.assemblies_subset.is_some()
    }

    /// Whether the assemblies must be recompiled.
    pub fn needs_recompilation(&self) -> bool {
        self.flags.needs_recompilation()
    }

    /// Deterministic variant name, computed once.
    pub fn variant_name(&self) -> &str {
        self.variant
            .get_or_init(|| variant_name(&self.flags, self.assemblies_subset.as_deref()))
    }
}

impl PartialEq for BuildPhaseSpec {
    fn eq(&self, other: &Self) -> bool {
        self.flags == other.flags && self.assemblies_subset == other.assemblies_subset
    }
}

impl Eq for BuildPhaseSpec {}

impl fmt::Display for BuildPhaseSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Build Phase Parameters:")?;
        writeln!(f, "  Framework Composite: {}", self.flags.framework_composite)?;
        writeln!(f, "  Include ASP.NET: {}", self.flags.bundle_aspnet)?;
        writeln!(f, "  ASP.NET Separate Composite: {}", self.flags.aspnet_composite)?;
        writeln!(f, "  Build With AVX2 Enabled: {}", self.flags.use_avx2)?;
        match &self.assemblies_subset {
            Some(path) => write!(f, "  Assemblies to Build: Listed in File {}", path.display()),
            None => write!(f, "  Assemblies to Build: All Assemblies"),
        }
    }
}
