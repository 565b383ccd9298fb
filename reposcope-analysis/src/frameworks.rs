//! Framework detection
//!
//! Two passes over a listing: declared dependencies in manifest files are
//! looked up in a curated dependency table, then a bounded sample of source
//! files is scanned for import signatures. Both are heuristics; a manifest
//! that fails to parse or a file that cannot be read simply contributes
//! nothing.

use crate::skip::{CancellationSignal, Cancelled};
use regex::Regex;
use reposcope_core::{
    AnalysisConfig, FileEntry, FrameworkMatch, FrameworkSource, RepositorySource,
};
use std::collections::HashMap;
use std::sync::LazyLock;
use tracing::debug;

/// Dependency declaration files understood by the manifest pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManifestKind {
    PackageJson,
    Requirements,
    Pyproject,
    Pipfile,
    Gemfile,
    MavenPom,
    Gradle,
    ComposerJson,
    GoMod,
    CargoToml,
    CsProj,
    Pubspec,
}

impl ManifestKind {
    pub fn from_file_name(name: &str) -> Option<Self> {
        let kind = match name {
            "package.json" => Self::PackageJson,
            "Pipfile" => Self::Pipfile,
            "Gemfile" => Self::Gemfile,
            "pom.xml" => Self::MavenPom,
            "build.gradle" | "build.gradle.kts" => Self::Gradle,
            "composer.json" => Self::ComposerJson,
            "go.mod" => Self::GoMod,
            "Cargo.toml" => Self::CargoToml,
            "pubspec.yaml" => Self::Pubspec,
            "pyproject.toml" => Self::Pyproject,
            _ if name.starts_with("requirements") && name.ends_with(".txt") => Self::Requirements,
            _ if name.ends_with(".csproj") => Self::CsProj,
            _ => return None,
        };
        Some(kind)
    }

    /// Declared dependency names, lowercased. `None` when the file is malformed.
    pub fn dependencies(&self, content: &str) -> Option<Vec<String>> {
        let names = match self {
            Self::PackageJson => json_object_keys(
                content,
                &["dependencies", "devDependencies", "peerDependencies"],
            )?,
            Self::ComposerJson => json_object_keys(content, &["require", "require-dev"])?,
            Self::Requirements => requirements_names(content),
            Self::Pyproject => pyproject_names(content)?,
            Self::Pipfile => toml_table_keys(content, &[&["packages"], &["dev-packages"]])?,
            Self::CargoToml => toml_table_keys(
                content,
                &[
                    &["dependencies"],
                    &["dev-dependencies"],
                    &["build-dependencies"],
                    &["workspace", "dependencies"],
                ],
            )?,
            Self::Gemfile => capture_all(&GEM_LINE, content),
            Self::MavenPom => capture_all(&MAVEN_ARTIFACT, content),
            Self::Gradle => gradle_names(content),
            Self::GoMod => go_module_names(content),
            Self::CsProj => capture_all(&CSPROJ_REFERENCE, content),
            Self::Pubspec => pubspec_names(content)?,
        };
        Some(names.into_iter().map(|name| name.to_lowercase()).collect())
    }
}

static GEM_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?m)^\s*gem\s+['"]([^'"]+)['"]"#).expect("gem pattern is valid")
});

static MAVEN_ARTIFACT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"<(?:artifactId|groupId)>\s*([^<\s]+)\s*</(?:artifactId|groupId)>")
        .expect("maven pattern is valid")
});

static GRADLE_COORDINATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"['"]([\w.\-]+):([\w.\-]+)(?::[^'"]*)?['"]"#).expect("gradle pattern is valid")
});

static GRADLE_PLUGIN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"id\s*\(?\s*['"]([\w.\-]+)['"]"#).expect("gradle plugin pattern is valid")
});

static CSPROJ_REFERENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?:PackageReference\s+Include|Sdk)\s*=\s*"([^"]+)""#)
        .expect("csproj pattern is valid")
});

fn capture_all(pattern: &Regex, content: &str) -> Vec<String> {
    pattern
        .captures_iter(content)
        .filter_map(|caps| caps.get(1).map(|m| m.as_str().to_string()))
        .collect()
}

fn json_object_keys(content: &str, sections: &[&str]) -> Option<Vec<String>> {
    let value: serde_json::Value = serde_json::from_str(content).ok()?;
    let mut names = Vec::new();
    for section in sections {
        if let Some(object) = value.get(section).and_then(|v| v.as_object()) {
            names.extend(object.keys().cloned());
        }
    }
    Some(names)
}

fn toml_table_keys(content: &str, paths: &[&[&str]]) -> Option<Vec<String>> {
    let value: toml::Value = toml::from_str(content).ok()?;
    let mut names = Vec::new();
    for path in paths {
        let mut node = Some(&value);
        for key in path.iter() {
            node = node.and_then(|n| n.get(*key));
        }
        if let Some(table) = node.and_then(|n| n.as_table()) {
            names.extend(table.keys().cloned());
        }
    }
    Some(names)
}

/// Package name of a PEP 508 requirement (`Flask[async]>=2.0 ; python_version>"3"`)
fn requirement_name(line: &str) -> Option<&str> {
    let line = line.split('#').next().unwrap_or("").trim();
    if line.is_empty() || line.starts_with('-') {
        return None;
    }
    let end = line
        .find(|c: char| !(c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.'))
        .unwrap_or(line.len());
    let name = &line[..end];
    (!name.is_empty()).then_some(name)
}

fn requirements_names(content: &str) -> Vec<String> {
    content
        .lines()
        .filter_map(requirement_name)
        .map(str::to_string)
        .collect()
}

fn pyproject_names(content: &str) -> Option<Vec<String>> {
    let value: toml::Value = toml::from_str(content).ok()?;
    let mut names = Vec::new();

    if let Some(project) = value.get("project") {
        let pep508 = project
            .get("dependencies")
            .and_then(|d| d.as_array())
            .into_iter()
            .flatten();
        let optional = project
            .get("optional-dependencies")
            .and_then(|d| d.as_table())
            .into_iter()
            .flat_map(|table| table.values())
            .filter_map(|group| group.as_array())
            .flatten();
        names.extend(
            pep508
                .chain(optional)
                .filter_map(|item| item.as_str())
                .filter_map(requirement_name)
                .map(str::to_string),
        );
    }

    if let Some(poetry) = value.get("tool").and_then(|t| t.get("poetry")) {
        for section in ["dependencies", "dev-dependencies"] {
            if let Some(table) = poetry.get(section).and_then(|d| d.as_table()) {
                names.extend(table.keys().cloned());
            }
        }
        if let Some(groups) = poetry.get("group").and_then(|g| g.as_table()) {
            for group in groups.values() {
                if let Some(table) = group.get("dependencies").and_then(|d| d.as_table()) {
                    names.extend(table.keys().cloned());
                }
            }
        }
    }

    Some(names)
}

fn gradle_names(content: &str) -> Vec<String> {
    let mut names = Vec::new();
    for caps in GRADLE_COORDINATE.captures_iter(content) {
        for idx in 1..=2 {
            if let Some(m) = caps.get(idx) {
                names.push(m.as_str().to_string());
            }
        }
    }
    names.extend(capture_all(&GRADLE_PLUGIN, content));
    names
}

fn go_module_names(content: &str) -> Vec<String> {
    let mut names = Vec::new();
    let mut in_block = false;
    for line in content.lines() {
        let line = line.split("//").next().unwrap_or("").trim();
        if in_block {
            if line.starts_with(')') {
                in_block = false;
            } else if let Some(module) = line.split_whitespace().next() {
                names.push(module.to_string());
            }
        } else if line.starts_with("require (") || line == "require(" {
            in_block = true;
        } else if let Some(rest) = line.strip_prefix("require ") {
            if let Some(module) = rest.split_whitespace().next() {
                names.push(module.to_string());
            }
        }
    }
    names
}

fn pubspec_names(content: &str) -> Option<Vec<String>> {
    let value: serde_yaml::Value = serde_yaml::from_str(content).ok()?;
    let mut names = Vec::new();
    for section in ["dependencies", "dev_dependencies"] {
        if let Some(mapping) = value.get(section).and_then(|v| v.as_mapping()) {
            names.extend(mapping.keys().filter_map(|k| k.as_str()).map(str::to_string));
        }
    }
    Some(names)
}

/// Lowercase dependency name to the framework it implies
const DEPENDENCY_TABLE: &[(&str, &str)] = &[
    // JavaScript / TypeScript
    ("react", "React"),
    ("react-dom", "React"),
    ("react-native", "React Native"),
    ("next", "Next.js"),
    ("vue", "Vue"),
    ("nuxt", "Nuxt"),
    ("@angular/core", "Angular"),
    ("svelte", "Svelte"),
    ("@sveltejs/kit", "SvelteKit"),
    ("express", "Express"),
    ("koa", "Koa"),
    ("fastify", "Fastify"),
    ("@nestjs/core", "NestJS"),
    ("electron", "Electron"),
    ("jquery", "jQuery"),
    ("redux", "Redux"),
    ("@reduxjs/toolkit", "Redux"),
    ("tailwindcss", "Tailwind CSS"),
    ("bootstrap", "Bootstrap"),
    ("three", "Three.js"),
    ("d3", "D3"),
    ("socket.io", "Socket.IO"),
    ("mongoose", "Mongoose"),
    ("prisma", "Prisma"),
    ("@prisma/client", "Prisma"),
    ("typeorm", "TypeORM"),
    ("graphql", "GraphQL"),
    ("jest", "Jest"),
    ("vitest", "Vitest"),
    ("mocha", "Mocha"),
    ("webpack", "Webpack"),
    ("vite", "Vite"),
    ("gatsby", "Gatsby"),
    // Python
    ("flask", "Flask"),
    ("django", "Django"),
    ("djangorestframework", "Django REST Framework"),
    ("fastapi", "FastAPI"),
    ("tornado", "Tornado"),
    ("aiohttp", "aiohttp"),
    ("streamlit", "Streamlit"),
    ("sqlalchemy", "SQLAlchemy"),
    ("celery", "Celery"),
    ("pandas", "pandas"),
    ("numpy", "NumPy"),
    ("scipy", "SciPy"),
    ("matplotlib", "Matplotlib"),
    ("scikit-learn", "scikit-learn"),
    ("tensorflow", "TensorFlow"),
    ("torch", "PyTorch"),
    ("keras", "Keras"),
    ("transformers", "Hugging Face Transformers"),
    ("langchain", "LangChain"),
    ("openai", "OpenAI SDK"),
    ("pygithub", "PyGithub"),
    ("pytest", "pytest"),
    ("scrapy", "Scrapy"),
    ("beautifulsoup4", "Beautiful Soup"),
    ("pygame", "Pygame"),
    ("pyqt5", "PyQt"),
    ("pyqt6", "PyQt"),
    // Ruby
    ("rails", "Ruby on Rails"),
    ("sinatra", "Sinatra"),
    ("rspec", "RSpec"),
    ("sidekiq", "Sidekiq"),
    // Java / Kotlin
    ("spring-boot-starter", "Spring Boot"),
    ("spring-boot-starter-web", "Spring Boot"),
    ("spring-boot-starter-webflux", "Spring Boot"),
    ("org.springframework.boot", "Spring Boot"),
    ("spring-core", "Spring"),
    ("org.springframework", "Spring"),
    ("hibernate-core", "Hibernate"),
    ("junit", "JUnit"),
    ("junit-jupiter", "JUnit"),
    ("org.junit.jupiter", "JUnit"),
    ("ktor-server-core", "Ktor"),
    ("io.ktor", "Ktor"),
    ("com.android.application", "Android"),
    ("quarkus-core", "Quarkus"),
    ("io.quarkus", "Quarkus"),
    // PHP
    ("laravel/framework", "Laravel"),
    ("symfony/symfony", "Symfony"),
    ("symfony/framework-bundle", "Symfony"),
    ("slim/slim", "Slim"),
    ("phpunit/phpunit", "PHPUnit"),
    // Go
    ("github.com/gin-gonic/gin", "Gin"),
    ("github.com/labstack/echo/v4", "Echo"),
    ("github.com/gofiber/fiber/v2", "Fiber"),
    ("github.com/gorilla/mux", "Gorilla Mux"),
    ("gorm.io/gorm", "GORM"),
    ("github.com/spf13/cobra", "Cobra"),
    ("google.golang.org/grpc", "gRPC"),
    // Rust
    ("actix-web", "Actix Web"),
    ("axum", "Axum"),
    ("rocket", "Rocket"),
    ("warp", "Warp"),
    ("tokio", "Tokio"),
    ("serde", "Serde"),
    ("clap", "Clap"),
    ("bevy", "Bevy"),
    ("tauri", "Tauri"),
    ("diesel", "Diesel"),
    ("sqlx", "SQLx"),
    // .NET
    ("microsoft.net.sdk.web", "ASP.NET Core"),
    ("microsoft.aspnetcore.app", "ASP.NET Core"),
    ("microsoft.entityframeworkcore", "Entity Framework Core"),
    ("xunit", "xUnit"),
    ("nunit", "NUnit"),
    ("newtonsoft.json", "Json.NET"),
    // Dart
    ("flutter", "Flutter"),
    ("provider", "Provider"),
    ("flutter_bloc", "Bloc"),
];

static FRAMEWORKS_BY_DEPENDENCY: LazyLock<HashMap<&'static str, &'static str>> =
    LazyLock::new(|| DEPENDENCY_TABLE.iter().copied().collect());

/// Framework implied by a (lowercase) dependency name, if it is a known one
pub fn framework_for_dependency(dependency: &str) -> Option<&'static str> {
    FRAMEWORKS_BY_DEPENDENCY.get(dependency).copied()
}

/// Literal import signatures. The first hit for a framework ends its search.
struct ContentSignature {
    framework: &'static str,
    extensions: &'static [&'static str],
    patterns: &'static [&'static str],
}

const JS_EXTENSIONS: &[&str] = &["js", "jsx", "ts", "tsx", "mjs", "cjs", "vue", "svelte"];

const CONTENT_SIGNATURES: &[ContentSignature] = &[
    ContentSignature {
        framework: "Flask",
        extensions: &["py"],
        patterns: &["from flask import", "import flask"],
    },
    ContentSignature {
        framework: "Django",
        extensions: &["py"],
        patterns: &["from django", "import django"],
    },
    ContentSignature {
        framework: "FastAPI",
        extensions: &["py"],
        patterns: &["from fastapi import", "import fastapi"],
    },
    ContentSignature {
        framework: "Streamlit",
        extensions: &["py"],
        patterns: &["import streamlit"],
    },
    ContentSignature {
        framework: "pandas",
        extensions: &["py", "ipynb"],
        patterns: &["import pandas", "from pandas import"],
    },
    ContentSignature {
        framework: "NumPy",
        extensions: &["py", "ipynb"],
        patterns: &["import numpy", "from numpy import"],
    },
    ContentSignature {
        framework: "TensorFlow",
        extensions: &["py", "ipynb"],
        patterns: &["import tensorflow", "from tensorflow"],
    },
    ContentSignature {
        framework: "PyTorch",
        extensions: &["py", "ipynb"],
        patterns: &["import torch", "from torch"],
    },
    ContentSignature {
        framework: "React",
        extensions: JS_EXTENSIONS,
        patterns: &["from 'react'", "from \"react\"", "require('react')", "require(\"react\")"],
    },
    ContentSignature {
        framework: "Vue",
        extensions: JS_EXTENSIONS,
        patterns: &["from 'vue'", "from \"vue\""],
    },
    ContentSignature {
        framework: "Angular",
        extensions: &["ts"],
        patterns: &["from '@angular/core'", "from \"@angular/core\""],
    },
    ContentSignature {
        framework: "Express",
        extensions: JS_EXTENSIONS,
        patterns: &[
            "require('express')",
            "require(\"express\")",
            "from 'express'",
            "from \"express\"",
        ],
    },
    ContentSignature {
        framework: "jQuery",
        extensions: &["js", "html"],
        patterns: &["$(document).ready", "jQuery("],
    },
    ContentSignature {
        framework: "Spring Boot",
        extensions: &["java", "kt"],
        patterns: &["org.springframework.boot", "@SpringBootApplication"],
    },
    ContentSignature {
        framework: "Ruby on Rails",
        extensions: &["rb"],
        patterns: &["Rails.application", "< ApplicationController", "ActiveRecord::"],
    },
    ContentSignature {
        framework: "Sinatra",
        extensions: &["rb"],
        patterns: &["require 'sinatra'", "require \"sinatra\""],
    },
    ContentSignature {
        framework: "Laravel",
        extensions: &["php"],
        patterns: &["use Illuminate\\"],
    },
    ContentSignature {
        framework: "Gin",
        extensions: &["go"],
        patterns: &["\"github.com/gin-gonic/gin\""],
    },
    ContentSignature {
        framework: "Actix Web",
        extensions: &["rs"],
        patterns: &["use actix_web"],
    },
    ContentSignature {
        framework: "Tokio",
        extensions: &["rs"],
        patterns: &["#[tokio::main]"],
    },
    ContentSignature {
        framework: "ASP.NET Core",
        extensions: &["cs"],
        patterns: &["using Microsoft.AspNetCore"],
    },
    ContentSignature {
        framework: "Flutter",
        extensions: &["dart"],
        patterns: &["package:flutter/"],
    },
];

fn scan_extensions() -> impl Iterator<Item = &'static str> {
    CONTENT_SIGNATURES
        .iter()
        .flat_map(|signature| signature.extensions.iter().copied())
}

/// Cut `text` to at most `max_bytes` without splitting a character
fn truncate_on_char_boundary(text: &str, max_bytes: usize) -> &str {
    if text.len() <= max_bytes {
        return text;
    }
    let mut end = max_bytes;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[..end]
}

/// Manifest and content-signature framework detection
#[derive(Debug, Clone)]
pub struct FrameworkDetector {
    max_scan_files: usize,
    max_scan_bytes: usize,
    max_file_bytes: u64,
}

impl Default for FrameworkDetector {
    fn default() -> Self {
        Self::new(&AnalysisConfig::default())
    }
}

impl FrameworkDetector {
    pub fn new(config: &AnalysisConfig) -> Self {
        Self {
            max_scan_files: config.max_scan_files,
            max_scan_bytes: config.max_scan_bytes,
            max_file_bytes: config.max_scan_file_bytes,
        }
    }

    /// Known size over the read limit; unknown sizes are read
    fn too_large(&self, entry: &FileEntry) -> bool {
        let oversized = entry.size.is_some_and(|size| size > self.max_file_bytes);
        if oversized {
            debug!(path = %entry.path, size = ?entry.size, "File too large to scan");
        }
        oversized
    }

    /// Run both passes. Manifest detections come first; a name found by
    /// both passes keeps its manifest source.
    pub async fn detect(
        &self,
        entries: &[FileEntry],
        source: &dyn RepositorySource,
        signal: &CancellationSignal,
    ) -> Result<FrameworkMatch, Cancelled> {
        let mut matched = FrameworkMatch::new();
        self.manifest_pass(entries, source, signal, &mut matched)
            .await?;
        self.content_pass(entries, source, signal, &mut matched)
            .await?;
        debug!(frameworks = ?matched.names(), "Framework detection finished");
        Ok(matched)
    }

    async fn manifest_pass(
        &self,
        entries: &[FileEntry],
        source: &dyn RepositorySource,
        signal: &CancellationSignal,
        matched: &mut FrameworkMatch,
    ) -> Result<(), Cancelled> {
        for entry in entries.iter().filter(|entry| !entry.is_dir) {
            let Some(kind) = ManifestKind::from_file_name(entry.file_name()) else {
                continue;
            };
            if self.too_large(entry) {
                continue;
            }
            signal.checkpoint()?;

            let content = match source.read_file(&entry.path).await {
                Ok(content) => content,
                Err(e) => {
                    debug!(path = %entry.path, error = %e, "Manifest unreadable");
                    continue;
                }
            };
            let Some(dependencies) = kind.dependencies(&content) else {
                debug!(path = %entry.path, ?kind, "Manifest could not be parsed");
                continue;
            };

            for dependency in dependencies {
                if let Some(framework) = framework_for_dependency(&dependency) {
                    matched.insert(
                        framework,
                        FrameworkSource::Manifest {
                            file: entry.path.clone(),
                        },
                    );
                }
            }
        }
        Ok(())
    }

    async fn content_pass(
        &self,
        entries: &[FileEntry],
        source: &dyn RepositorySource,
        signal: &CancellationSignal,
        matched: &mut FrameworkMatch,
    ) -> Result<(), Cancelled> {
        let scannable: Vec<&'static str> = scan_extensions().collect();
        let candidates = entries
            .iter()
            .filter(|entry| !entry.is_dir && !crate::classifier::is_ignored(&entry.path))
            .filter_map(|entry| entry.extension().map(|ext| (entry, ext)))
            .filter(|(_, ext)| scannable.iter().any(|known| *known == ext.as_str()))
            .filter(|(entry, _)| !self.too_large(entry))
            .take(self.max_scan_files);

        for (entry, ext) in candidates {
            let pending: Vec<&ContentSignature> = CONTENT_SIGNATURES
                .iter()
                .filter(|sig| sig.extensions.iter().any(|known| *known == ext.as_str()))
                .filter(|sig| !matched.contains(sig.framework))
                .collect();
            if pending.is_empty() {
                continue;
            }
            signal.checkpoint()?;

            let content = match source.read_file(&entry.path).await {
                Ok(content) => content,
                Err(e) => {
                    debug!(path = %entry.path, error = %e, "Source file unreadable");
                    continue;
                }
            };
            let head = truncate_on_char_boundary(&content, self.max_scan_bytes);

            for signature in pending {
                if signature.patterns.iter().any(|pattern| head.contains(pattern)) {
                    matched.insert(
                        signature.framework,
                        FrameworkSource::Content {
                            file: entry.path.clone(),
                        },
                    );
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manifest_kind_from_file_name() {
        assert_eq!(
            ManifestKind::from_file_name("package.json"),
            Some(ManifestKind::PackageJson)
        );
        assert_eq!(
            ManifestKind::from_file_name("requirements-dev.txt"),
            Some(ManifestKind::Requirements)
        );
        assert_eq!(
            ManifestKind::from_file_name("Api.csproj"),
            Some(ManifestKind::CsProj)
        );
        assert_eq!(ManifestKind::from_file_name("notes.txt"), None);
        assert_eq!(ManifestKind::from_file_name("cargo.toml"), None);
    }

    #[test]
    fn test_requirements_parsing() {
        let content = "# web\nFlask==2.3.0\nrequests>=2 ; python_version > '3.8'\n\n-r base.txt\nuvicorn[standard]~=0.23\n";
        assert_eq!(
            ManifestKind::Requirements.dependencies(content).unwrap(),
            vec!["flask", "requests", "uvicorn"]
        );
    }

    #[test]
    fn test_package_json_parsing_and_malformed() {
        let content = r#"{"dependencies": {"react": "^18"}, "devDependencies": {"jest": "29"}}"#;
        assert_eq!(
            ManifestKind::PackageJson.dependencies(content).unwrap(),
            vec!["react", "jest"]
        );
        assert!(ManifestKind::PackageJson
            .dependencies("{ not json")
            .is_none());
    }

    #[test]
    fn test_pyproject_pep621_and_poetry() {
        let content = r#"
[project]
dependencies = ["Django>=4.2", "celery"]

[project.optional-dependencies]
test = ["pytest"]

[tool.poetry.dependencies]
python = "^3.11"
fastapi = "*"
"#;
        let names = ManifestKind::Pyproject.dependencies(content).unwrap();
        for expected in ["django", "celery", "pytest", "fastapi"] {
            assert!(names.contains(&expected.to_string()), "missing {}", expected);
        }
    }

    #[test]
    fn test_text_manifests() {
        let gemfile = "source 'https://rubygems.org'\ngem 'rails', '~> 7.0'\n  gem \"sidekiq\"\n";
        assert_eq!(
            ManifestKind::Gemfile.dependencies(gemfile).unwrap(),
            vec!["rails", "sidekiq"]
        );

        let go_mod = "module example.com/app\n\ngo 1.21\n\nrequire (\n\tgithub.com/gin-gonic/gin v1.9.1 // indirect\n\tgorm.io/gorm v1.25.0\n)\nrequire github.com/spf13/cobra v1.8.0\n";
        assert_eq!(
            ManifestKind::GoMod.dependencies(go_mod).unwrap(),
            vec!["github.com/gin-gonic/gin", "gorm.io/gorm", "github.com/spf13/cobra"]
        );

        let gradle = "plugins { id 'org.springframework.boot' version '3.1.0' }\ndependencies {\n implementation 'org.springframework.boot:spring-boot-starter-web'\n}\n";
        let names = ManifestKind::Gradle.dependencies(gradle).unwrap();
        assert!(names.contains(&"spring-boot-starter-web".to_string()));
        assert!(names.contains(&"org.springframework.boot".to_string()));

        let csproj = r#"<Project Sdk="Microsoft.NET.Sdk.Web"><ItemGroup><PackageReference Include="Newtonsoft.Json" Version="13.0.1" /></ItemGroup></Project>"#;
        assert_eq!(
            ManifestKind::CsProj.dependencies(csproj).unwrap(),
            vec!["microsoft.net.sdk.web", "newtonsoft.json"]
        );
    }

    #[test]
    fn test_pubspec_and_cargo() {
        let pubspec = "name: app\ndependencies:\n  flutter:\n    sdk: flutter\n  provider: ^6.0.0\n";
        assert_eq!(
            ManifestKind::Pubspec.dependencies(pubspec).unwrap(),
            vec!["flutter", "provider"]
        );

        let cargo = "[package]\nname = \"x\"\n\n[dependencies]\naxum = \"0.7\"\n\n[dev-dependencies]\ntempfile = \"3\"\n";
        let names = ManifestKind::CargoToml.dependencies(cargo).unwrap();
        assert_eq!(names, vec!["axum", "tempfile"]);
        assert!(ManifestKind::CargoToml.dependencies("[dependencies").is_none());
    }

    #[test]
    fn test_unknown_dependencies_are_ignored() {
        assert_eq!(framework_for_dependency("flask"), Some("Flask"));
        assert_eq!(framework_for_dependency("unknown-pkg-xyz"), None);
    }

    #[test]
    fn test_truncate_on_char_boundary() {
        assert_eq!(truncate_on_char_boundary("héllo", 2), "h");
        assert_eq!(truncate_on_char_boundary("héllo", 3), "hé");
        assert_eq!(truncate_on_char_boundary("abc", 10), "abc");
    }
}
