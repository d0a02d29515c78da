mod db;

use std::process::ExitCode;

use anyhow::Context;
use camino::{Utf8Path, Utf8PathBuf};
use clap::Parser;
use db::{Document, bind_tag_helpers};
use razor_errors::Renderer;
use razor_inputs::File;
use razor_parse::{CSharpLanguageVersion, FileKind, RazorParserOptions};
use razor_tag_helpers::{TagHelperDescriptor, descriptors_from_json};
use salsa::DatabaseImpl;

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[derive(Parser)]
enum Options {
    /// Parse one document, print its diagnostics and optionally its tree.
    Parse {
        path: Utf8PathBuf,
        /// Parse as a component regardless of the extension.
        #[arg(long)]
        component: bool,
        #[arg(long, value_name = "VERSION")]
        csharp_version: Option<CSharpLanguageVersion>,
        /// JSON array of tag helper descriptors to bind.
        #[arg(long, value_name = "FILE")]
        descriptors: Option<Utf8PathBuf>,
        /// Print the syntax tree to stdout.
        #[arg(long)]
        tree: bool,
    },
    /// Parse several documents and print their diagnostics.
    Check {
        #[arg(required = true)]
        paths: Vec<Utf8PathBuf>,
        #[arg(long, value_name = "FILE")]
        descriptors: Option<Utf8PathBuf>,
    },
}

fn main() -> anyhow::Result<ExitCode> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let db = DatabaseImpl::default();
    let renderer = Renderer::styled();

    let errors = match Options::parse() {
        Options::Parse { path, component, csharp_version, descriptors, tree } => {
            let descriptors = load_descriptors(descriptors.as_deref())?;
            let file = read_file(&db, path)?;
            let kind = if component { FileKind::Component } else { file.kind(&db) };
            let options = RazorParserOptions::new(kind).with_language_version(csharp_version.unwrap_or_default());
            let document = Document::new(&db, file, options, descriptors);

            if tree {
                print!("{}", bind_tag_helpers(&db, document).debug_dump());
            }
            report(&db, &renderer, document)
        }
        Options::Check { paths, descriptors } => {
            let descriptors = load_descriptors(descriptors.as_deref())?;
            let mut errors = 0;
            for path in paths {
                let file = read_file(&db, path)?;
                let options = RazorParserOptions::new(file.kind(&db));
                errors += report(&db, &renderer, Document::new(&db, file, options, descriptors.clone()));
            }
            errors
        }
    };

    if errors > 0 {
        log::info!("{errors} error(s)");
        return Ok(ExitCode::FAILURE);
    }
    Ok(ExitCode::SUCCESS)
}

fn read_file(db: &DatabaseImpl, path: Utf8PathBuf) -> anyhow::Result<File> {
    let text = std::fs::read_to_string(&path).with_context(|| format!("failed to read `{path}`"))?;
    Ok(File::new(db, path, text))
}

fn load_descriptors(path: Option<&Utf8Path>) -> anyhow::Result<Vec<TagHelperDescriptor>> {
    let Some(path) = path else { return Ok(Vec::new()) };
    let json = std::fs::read_to_string(path).with_context(|| format!("failed to read `{path}`"))?;
    let descriptors = descriptors_from_json(&json).with_context(|| format!("invalid descriptors in `{path}`"))?;
    log::debug!("loaded {} tag helper descriptor(s) from `{path}`", descriptors.len());
    Ok(descriptors)
}

/// Renders every diagnostic of `document` to stderr and returns the number of errors.
fn report(db: &DatabaseImpl, renderer: &Renderer, document: Document) -> usize {
    let file = document.file(db);
    let path = file.path(db).as_str();
    let text = file.text(db);

    let diagnostics = bind_tag_helpers(db, document).diagnostics();
    for diagnostic in &diagnostics {
        eprintln!("{}", diagnostic.render(renderer, path, text));
    }
    diagnostics.iter().filter(|it| it.is_error()).count()
}
