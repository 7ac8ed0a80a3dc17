#![forbid(unsafe_code)]

//! Opening external links and the resume document.

use std::io;
use std::path::{Path, PathBuf};

use url::Url;

/// Opens an address outside the terminal.
pub trait LinkOpener {
    /// # Errors
    ///
    /// The platform could not hand the address to a browser.
    fn open(&mut self, target: &str) -> io::Result<()>;
}

/// The user's default browser.
#[derive(Debug, Default)]
pub struct SystemBrowser;

impl LinkOpener for SystemBrowser {
    fn open(&mut self, target: &str) -> io::Result<()> {
        tracing::info!(target, "opening link");
        webbrowser::open(target)
    }
}

/// Turn a resume reference into something a browser can open.
///
/// Absolute URLs pass through. Anything else is a file path, relative to
/// `base` when given (the content file's directory).
#[must_use]
pub fn resolve_resume(reference: &str, base: Option<&Path>) -> String {
    if let Ok(url) = Url::parse(reference)
        && url.scheme().len() > 1
    {
        return url.into();
    }
    let path = match base {
        Some(dir) => dir.join(reference),
        None => PathBuf::from(reference),
    };
    let absolute = std::path::absolute(&path).unwrap_or(path);
    Url::from_file_path(&absolute)
        .map(String::from)
        .unwrap_or_else(|()| absolute.display().to_string())
}
