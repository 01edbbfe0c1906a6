//! Handlers for `catalog`, `list-tags`, `latest-tags`, and `scan`.
//!
//! Each returns `true` on success, `false` on a reported error — the caller
//! maps that to a process exit code.

use crate::commands::args::RegistryArgs;
use crate::format::{render_images, render_list, ColorChoice, OutputFormat};
use regxplore_core::client::build_driver;
use regxplore_core::pagination::{Cursor, PageRequest};
use regxplore_core::{resolver, Driver, RegistryClient};
use tokio_util::sync::CancellationToken;

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;

pub async fn handle_catalog(args: &RegistryArgs, format: OutputFormat, color: ColorChoice) -> bool {
    let options = args.options();
    let driver = match build_driver(args.credential(), &args.host, options.clone()) {
        Ok(d) => d,
        Err(e) => return fail(&e),
    };
    let client = RegistryClient::from_driver(driver, options);

    match client.get_all_repositories().await {
        Ok(repos) => {
            println!("{}", render_list(&repos, format, color));
            true
        }
        Err(e) => fail(&e),
    }
}

pub async fn handle_list_tags(
    args: &RegistryArgs,
    repo: &str,
    format: OutputFormat,
    color: ColorChoice,
) -> bool {
    let options = args.options();
    let driver = match build_driver(args.credential(), &args.host, options) {
        Ok(d) => d,
        Err(e) => return fail(&e),
    };

    let mut tags = Vec::new();
    let mut page = PageRequest {
        cursor: Cursor::Opaque(String::new()),
        size: driver.max_page_size(),
    };
    loop {
        match driver.list(repo, page).await {
            Ok((batch, next)) => {
                if batch.is_empty() {
                    break;
                }
                tags.extend(batch);
                match next {
                    Some(p) => page = p,
                    None => break,
                }
            }
            Err(e) => return fail(&e),
        }
    }

    println!("{}", render_list(&tags, format, color));
    true
}

pub async fn handle_latest_tags(
    args: &RegistryArgs,
    repo: &str,
    depth: usize,
    format: OutputFormat,
    color: ColorChoice,
) -> bool {
    let options = args.options();
    let driver = match build_driver(args.credential(), &args.host, options) {
        Ok(d) => d,
        Err(e) => return fail(&e),
    };

    match resolver::get_latest_tags(driver, repo, depth, CancellationToken::new()).await {
        Ok(tags) => {
            println!("{}", render_list(&tags, format, color));
            true
        }
        Err(e) => fail(&e),
    }
}

/// Resolves the newest tag for each of `repos` (or, if empty, every
/// repository in the catalog) and prints `repository:tag` pairs.
pub async fn handle_scan(
    args: &RegistryArgs,
    repos: &[String],
    format: OutputFormat,
    color: ColorChoice,
) -> bool {
    let options = args.options();
    let driver = match build_driver(args.credential(), &args.host, options.clone()) {
        Ok(d) => d,
        Err(e) => return fail(&e),
    };
    let client = RegistryClient::from_driver(driver, options);

    let repos: Vec<String> = if repos.is_empty() {
        match client.get_all_repositories().await {
            Ok(r) => r,
            Err(e) => return fail(&e),
        }
    } else {
        repos.to_vec()
    };

    match client.get_images_to_scan(&repos).await {
        Ok(images) => {
            println!("{}", render_images(&images, format, color));
            true
        }
        Err(e) => fail(&e),
    }
}

fn fail(e: &impl std::fmt::Display) -> bool {
    eprintln!("error: {e}");
    false
}
