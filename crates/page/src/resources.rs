//! URL resolution and stylesheet imports through the backend.

use css::{ColorResolver, ImportedSheet, StylesheetImporter};
use url::Url;

use crate::backend::Backend;

/// Resolve `href` against `base`. Relative references without a usable base,
/// and anything the URL parser rejects, are returned trimmed but unchanged.
pub fn resolve_url(base: Option<&str>, href: &str) -> String {
    let href = href.trim();
    if let Ok(absolute) = Url::parse(href) {
        return absolute.into();
    }
    base.and_then(|base| Url::parse(base).ok())
        .and_then(|base| base.join(href).ok())
        .map_or_else(|| href.to_owned(), Into::into)
}

/// Fetches `@import`ed and linked stylesheets from the backend.
///
/// Failures are logged, reported through [`Backend::on_error`] and treated as
/// an empty sheet.
pub(crate) struct BackendImporter<'doc> {
    pub backend: &'doc mut dyn Backend,
}

impl BackendImporter<'_> {
    pub fn fetch(&mut self, url: &str, base_url: Option<&str>) -> Option<ImportedSheet> {
        let resolved = resolve_url(base_url, url);
        match self.backend.import_css(&resolved, base_url) {
            Ok(mut sheet) => {
                if sheet.base_url.is_none() {
                    sheet.base_url = Some(resolved);
                }
                log::debug!("imported stylesheet {url} ({} bytes)", sheet.text.len());
                Some(sheet)
            }
            Err(err) => {
                let message = format!("failed to import stylesheet {resolved}: {err:#}");
                log::warn!("{message}");
                self.backend.on_error(&message);
                None
            }
        }
    }
}

impl StylesheetImporter for BackendImporter<'_> {
    fn import(&mut self, url: &str, base_url: Option<&str>) -> Option<ImportedSheet> {
        self.fetch(url, base_url)
    }
}

/// Named colors the CSS parser does not know, answered by the backend.
pub(crate) struct BackendColors<'doc>(pub &'doc dyn Backend);

impl ColorResolver for BackendColors<'_> {
    fn resolve_color(&self, name: &str) -> Option<String> {
        self.0.resolve_color(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relative_references_join_the_base() {
        assert_eq!(
            resolve_url(Some("http://example.com/docs/index.html"), "../img/a.png"),
            "http://example.com/img/a.png"
        );
        assert_eq!(
            resolve_url(Some("http://example.com/a/"), "http://other.org/x.css"),
            "http://other.org/x.css"
        );
    }

    #[test]
    fn without_base_the_reference_is_kept() {
        assert_eq!(resolve_url(None, " style.css "), "style.css");
        assert_eq!(resolve_url(Some("not a url"), "style.css"), "style.css");
    }
}
