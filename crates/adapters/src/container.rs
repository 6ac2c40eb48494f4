// Copyright 2025 AOT Benchmarker Contributors
// SPDX-License-Identifier: Apache-2.0

//! Builder that compiles inside a container.
//!
//! One builder image is created per variant from `<resources>/Dockerfile`,
//! with the build flags passed as build arguments. The image is then run
//! with the resources root mounted at `/mount`; its `BuildComposites.sh`
//! loads `<variant>.engine.env` and runs the build engine, which writes to
//! `<os code>-output-<variant>`.
//!
//! Only the resources root is mounted, so the runtime and compiler
//! directories of a containerized build must live under it.

use aotbench_core::layout::CONTAINER_MOUNT;
use async_trait::async_trait;
use std::collections::HashSet;
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::builder::{ArtifactBuilder, BuildRequest};
use crate::engine::{
    EngineEnvironment, ASPNET_COMPOSITE, BUNDLE_ASPNET, COMPOSITES_TYPE, FRAMEWORK_COMPOSITE,
    PARTIAL_COMPOSITES, TARGET_OS, USE_AVX2,
};
use crate::error::{AdapterError, Result};
use crate::native::engine_environment;
use crate::process::{CommandRunner, CommandSpec};

/// Script run inside the builder container.
pub const BUILD_SCRIPT: &str = "./BuildComposites.sh";

/// Engine settings file of a variant, relative to the resources root.
pub fn engine_env_file(variant: &str) -> String {
    format!("{variant}.engine.env")
}

fn container_path(path: &Path, mount: &Path) -> Result<PathBuf> {
    let relative = path
        .strip_prefix(mount)
        .map_err(|_| AdapterError::OutsideMount {
            path: path.to_path_buf(),
            mount: mount.to_path_buf(),
        })?;
    Ok(Path::new(CONTAINER_MOUNT).join(relative))
}

/// Engine settings for a request, with every path rewritten to its
/// location inside the container.
pub fn container_environment(request: &BuildRequest) -> Result<EngineEnvironment> {
    let mount = request.resources.as_path();
    let mut env = engine_environment(request);
    env.compiler = container_path(&env.compiler, mount)?;
    env.framework = container_path(&env.framework, mount)?;
    env.output = container_path(&env.output, mount)?;
    env.aspnet = env
        .aspnet
        .map(|dir| container_path(&dir, mount))
        .transpose()?;
    env.partial_composites = env
        .partial_composites
        .map(|file| container_path(&file, mount))
        .transpose()?;
    Ok(env)
}

/// Write the engine settings file for `request` under the resources root.
pub fn write_engine_env(request: &BuildRequest) -> Result<PathBuf> {
    let env = container_environment(request)?;
    let mut contents = String::new();
    for (name, value) in env.to_vars() {
        let _ = writeln!(contents, "{name}={value}");
    }
    let path = request.resources.join(engine_env_file(&request.variant));
    fs::write(&path, contents)?;
    debug!(path = %path.display(), "Wrote engine settings");
    Ok(path)
}

/// Image names already present, as seen by this builder.
#[derive(Debug, Clone, Default)]
pub struct ImageCache {
    listed: bool,
    images: HashSet<String>,
}

impl ImageCache {
    /// Whether `image` is known to exist.
    pub fn contains(&self, image: &str) -> bool {
        self.images.contains(&image.to_lowercase())
    }

    /// Remember an image.
    pub fn insert(&mut self, image: &str) {
        self.images.insert(image.to_lowercase());
    }

    /// Record the repositories from `docker image ls --all` output.
    pub fn absorb_listing<S: AsRef<str>>(&mut self, lines: &[S]) {
        for line in lines.iter().skip(1) {
            if let Some(repository) = line.as_ref().split_whitespace().next() {
                self.insert(repository);
            }
        }
        self.listed = true;
    }
}

/// Builds variants with `docker`.
#[derive(Debug)]
pub struct ContainerBuilder<R> {
    runner: R,
    docker: String,
    images: ImageCache,
}

/// Image name of a variant's builder.
pub fn image_name(variant: &str) -> String {
    format!("{}-builder", variant.to_lowercase())
}

/// `--build-arg` values for a request, in a fixed order.
pub fn build_args(request: &BuildRequest) -> Vec<String> {
    let flags = &request.flags;
    let subset = request
        .subset
        .as_deref()
        .and_then(|path| path.file_name())
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();

    [
        (FRAMEWORK_COMPOSITE, flags.framework_composite.to_string()),
        (ASPNET_COMPOSITE, flags.aspnet_composite.to_string()),
        (BUNDLE_ASPNET, flags.bundle_aspnet.to_string()),
        (USE_AVX2, flags.use_avx2.to_string()),
        (COMPOSITES_TYPE, request.variant.clone()),
        (PARTIAL_COMPOSITES, subset),
        (TARGET_OS, request.os.to_string()),
    ]
    .into_iter()
    .map(|(name, value)| format!("{name}_ARG={value}"))
    .collect()
}

impl<R: CommandRunner> ContainerBuilder<R> {
    /// A builder invoking `docker` through `runner`.
    pub fn new(runner: R, docker: impl Into<String>) -> Self {
        Self {
            runner,
            docker: docker.into(),
            images: ImageCache::default(),
        }
    }

    async fn image_exists(&mut self, image: &str) -> Result<bool> {
        if !self.images.contains(image) && !self.images.listed {
            let listing = self
                .runner
                .run(&CommandSpec::new(&self.docker).args(["image", "ls", "--all"]))
                .await?;
            self.images.absorb_listing(&listing);
        }
        Ok(self.images.contains(image))
    }

    async fn ensure_image(&mut self, request: &BuildRequest) -> Result<String> {
        let image = image_name(&request.variant);
        if self.image_exists(&image).await? {
            info!(image = %image, "Builder image found ready to use, skipping image build");
            return Ok(image);
        }

        let resources = request.resources.display().to_string();
        let mut command = CommandSpec::new(&self.docker)
            .arg("build")
            .arg("--file")
            .arg(request.resources.join("Dockerfile").display().to_string());
        for arg in build_args(request) {
            command = command.arg("--build-arg").arg(arg);
        }
        command = command.arg("--tag").arg(&image).arg(resources);

        self.runner.run(&command).await?;
        self.images.insert(&image);
        Ok(image)
    }
}

#[async_trait]
impl<R: CommandRunner> ArtifactBuilder for ContainerBuilder<R> {
    fn name(&self) -> &'static str {
        "container"
    }

    async fn build(&mut self, request: &BuildRequest) -> Result<()> {
        info!(
            configuration = %request.configuration,
            variant = %request.variant,
            "Building in container"
        );
        write_engine_env(request)?;
        let image = self.ensure_image(request).await?;

        let run = CommandSpec::new(&self.docker)
            .args(["run", "--rm", "-v"])
            .arg(format!("{}:{}", request.resources.display(), CONTAINER_MOUNT))
            .arg("-w")
            .arg(CONTAINER_MOUNT)
            .arg(image)
            .arg(BUILD_SCRIPT);
        self.runner.run(&run).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::MockCommandRunner;
    use aotbench_core::{BuildFlags, RuntimeMaterials, TargetOs};
    use mockall::Sequence;
    use std::path::PathBuf;

    fn request_in(resources: &Path, subset: Option<&str>) -> BuildRequest {
        BuildRequest {
            configuration: "cfg-fx".to_string(),
            os: TargetOs::Linux,
            flags: BuildFlags {
                framework_composite: true,
                ..Default::default()
            },
            variant: "framework".to_string(),
            runtime: RuntimeMaterials {
                name: "net8".to_string(),
                framework: resources.join("runtimes/net8/fx"),
                aspnet: None,
            },
            compiler: resources.join("crossgen2"),
            subset: subset.map(|name| resources.join(name)),
            resources: resources.to_path_buf(),
            output: resources.join("lin-output-framework"),
        }
    }

    fn request(subset: Option<&str>) -> BuildRequest {
        request_in(Path::new("/res"), subset)
    }

    #[test]
    fn test_build_args() {
        let args = build_args(&request(Some("web.txt")));
        assert_eq!(
            args,
            vec![
                "FRAMEWORK_COMPOSITE_ARG=true",
                "ASPNET_COMPOSITE_ARG=false",
                "BUNDLE_ASPNET_ARG=false",
                "USE_AVX2_ARG=false",
                "COMPOSITES_TYPE_ARG=framework",
                "PARTIAL_COMPOSITES_ARG=web.txt",
                "TARGET_OS_ARG=linux",
            ]
        );
    }

    #[test]
    fn test_container_environment_uses_mount_paths() {
        let env = container_environment(&request(Some("web.txt"))).unwrap();
        assert_eq!(env.framework, PathBuf::from("/mount/runtimes/net8/fx"));
        assert_eq!(env.compiler, PathBuf::from("/mount/crossgen2"));
        assert_eq!(env.output, PathBuf::from("/mount/lin-output-framework"));
        assert_eq!(env.partial_composites, Some(PathBuf::from("/mount/web.txt")));

        let mut outside = request(None);
        outside.compiler = PathBuf::from("/opt/crossgen2");
        assert!(matches!(
            container_environment(&outside),
            Err(AdapterError::OutsideMount { .. })
        ));
    }

    #[test]
    fn test_listing_skips_header() {
        let mut cache = ImageCache::default();
        cache.absorb_listing(&[
            "REPOSITORY          TAG       IMAGE ID       CREATED        SIZE",
            "framework-builder   latest    0123456789ab   2 days ago     1.2GB",
        ]);
        assert!(cache.contains("framework-builder"));
        assert!(!cache.contains("REPOSITORY"));
    }

    #[tokio::test]
    async fn test_builds_image_then_runs() {
        let root = tempfile::tempdir().unwrap();
        let resources = root.path().to_path_buf();
        let expected_run = format!(
            "docker run --rm -v {}:/mount -w /mount framework-builder ./BuildComposites.sh",
            resources.display()
        );
        let context = resources.display().to_string();
        let mut seq = Sequence::new();
        let mut runner = MockCommandRunner::new();
        runner
            .expect_run()
            .withf(|c| c.args[..2] == ["image", "ls"])
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(vec!["REPOSITORY TAG IMAGE ID CREATED SIZE".to_string()]));
        runner
            .expect_run()
            .withf(move |c| {
                c.args[0] == "build"
                    && c.args.contains(&"--tag".to_string())
                    && c.args.contains(&"framework-builder".to_string())
                    && c.args.last() == Some(&context)
            })
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(Vec::new()));
        runner
            .expect_run()
            .withf(move |c| c.to_string() == expected_run)
            .times(2)
            .in_sequence(&mut seq)
            .returning(|_| Ok(Vec::new()));

        let mut builder = ContainerBuilder::new(runner, "docker");
        let request = request_in(&resources, None);
        builder.build(&request).await.unwrap();
        // Second build of the same variant reuses the image.
        builder.build(&request).await.unwrap();

        let settings = fs::read_to_string(resources.join("framework.engine.env")).unwrap();
        assert!(settings.contains("COMPOSITES_TYPE=framework\n"));
        assert!(settings.contains("FRAMEWORK_PATH=/mount/runtimes/net8/fx\n"));
    }

    #[tokio::test]
    async fn test_existing_image_is_not_rebuilt() {
        let mut runner = MockCommandRunner::new();
        runner
            .expect_run()
            .withf(|c| c.args[0] == "image")
            .times(1)
            .returning(|_| {
                Ok(vec![
                    "REPOSITORY TAG IMAGE ID CREATED SIZE".to_string(),
                    "framework-builder latest abc 1 hour ago 1GB".to_string(),
                ])
            });
        runner
            .expect_run()
            .withf(|c| c.args[0] == "run")
            .times(1)
            .returning(|_| Ok(Vec::new()));

        let root = tempfile::tempdir().unwrap();
        let mut builder = ContainerBuilder::new(runner, "docker");
        builder.build(&request_in(root.path(), None)).await.unwrap();
    }
}
