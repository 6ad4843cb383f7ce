use std::collections::BTreeSet;

use anyhow::Context;
use serde::Deserialize;

/// Dependencies the domain crate must never pull in: it stays free of UI,
/// runtime and browser bindings so both player targets share it unchanged.
const DOMAIN_FORBIDDEN: &[&str] = &[
    "dioxus",
    "dioxus-desktop",
    "tokio",
    "wasm-bindgen",
    "wasm-bindgen-futures",
    "web-sys",
    "js-sys",
    "gloo-timers",
    "anyhow",
];

/// Internal crates and the workspace crates they are allowed to depend on.
const LAYERING: &[(&str, &[&str])] = &[
    ("waymark-domain", &[]),
    ("waymark-player", &["waymark-domain"]),
    ("xtask", &[]),
];

fn main() -> anyhow::Result<()> {
    let mut args = std::env::args().skip(1);
    match args.next().as_deref() {
        Some("arch-check") => arch_check(),
        Some(cmd) => anyhow::bail!("Unknown xtask command: {cmd}"),
        None => anyhow::bail!("Usage: cargo xtask <command>\n\nCommands:\n  arch-check"),
    }
}

#[derive(Debug, Deserialize)]
struct Metadata {
    packages: Vec<Package>,
}

#[derive(Debug, Deserialize)]
struct Package {
    name: String,
    dependencies: Vec<Dependency>,
}

#[derive(Debug, Deserialize)]
struct Dependency {
    name: String,
    #[serde(default)]
    kind: Option<String>,
}

impl Dependency {
    fn is_normal(&self) -> bool {
        self.kind.is_none()
    }
}

fn arch_check() -> anyhow::Result<()> {
    let output = std::process::Command::new("cargo")
        .args(["metadata", "--format-version", "1", "--no-deps"])
        .output()
        .context("running cargo metadata")?;

    if !output.status.success() {
        anyhow::bail!("cargo metadata failed")
    }

    let metadata: Metadata =
        serde_json::from_slice(&output.stdout).context("parsing cargo metadata output")?;

    let violations = check(&metadata);
    if violations.is_empty() {
        println!("arch-check passed ({} crates)", metadata.packages.len());
        return Ok(());
    }

    for violation in &violations {
        eprintln!("arch-check: {violation}");
    }
    anyhow::bail!("{} architecture violation(s)", violations.len())
}

fn check(metadata: &Metadata) -> Vec<String> {
    let internal: BTreeSet<&str> = LAYERING.iter().map(|(name, _)| *name).collect();
    let mut violations = Vec::new();

    for package in &metadata.packages {
        let Some((_, allowed)) = LAYERING.iter().find(|(name, _)| *name == package.name) else {
            violations.push(format!("unknown workspace crate `{}`", package.name));
            continue;
        };

        for dep in package.dependencies.iter().filter(|d| d.is_normal()) {
            if internal.contains(dep.name.as_str()) && !allowed.contains(&dep.name.as_str()) {
                violations.push(format!(
                    "`{}` must not depend on `{}`",
                    package.name, dep.name
                ));
            }
            if package.name == "waymark-domain" && DOMAIN_FORBIDDEN.contains(&dep.name.as_str()) {
                violations.push(format!(
                    "`waymark-domain` must stay platform-free but depends on `{}`",
                    dep.name
                ));
            }
        }
    }

    violations
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metadata(json: &str) -> Metadata {
        serde_json::from_str(json).expect("valid metadata")
    }

    #[test]
    fn clean_workspace_passes() {
        let meta = metadata(
            r#"{"packages":[
                {"name":"waymark-domain","dependencies":[{"name":"serde","kind":null}]},
                {"name":"waymark-player","dependencies":[
                    {"name":"waymark-domain","kind":null},
                    {"name":"dioxus","kind":null}
                ]},
                {"name":"xtask","dependencies":[{"name":"anyhow","kind":null}]}
            ]}"#,
        );
        assert!(check(&meta).is_empty());
    }

    #[test]
    fn domain_on_ui_stack_is_flagged() {
        let meta = metadata(
            r#"{"packages":[
                {"name":"waymark-domain","dependencies":[
                    {"name":"dioxus","kind":null},
                    {"name":"tokio","kind":"dev"}
                ]}
            ]}"#,
        );
        let violations = check(&meta);
        assert_eq!(violations.len(), 1);
        assert!(violations[0].contains("dioxus"));
    }

    #[test]
    fn reversed_layering_is_flagged() {
        let meta = metadata(
            r#"{"packages":[
                {"name":"waymark-domain","dependencies":[{"name":"waymark-player"}]}
            ]}"#,
        );
        let violations = check(&meta);
        assert_eq!(violations.len(), 1);
        assert!(violations[0].contains("waymark-player"));
    }
}
