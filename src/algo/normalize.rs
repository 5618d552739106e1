use std::sync::LazyLock;

use regex::Regex;
use url::Url;

static NON_WORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\p{L}\p{N}\s]+").expect("static pattern"));
static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").expect("static pattern"));

/// Derive the clustering document for a tab from its title and URL.
///
/// - Lowercase the title
/// - Strip a trailing site name (`"Foo - GitHub"` on github.com → `"foo"`)
/// - Replace punctuation and separators with spaces
/// - Collapse whitespace and trim
///
/// A URL that does not parse (or has no host) leaves the title unstripped.
pub fn clean_title(title: &str, url: &str) -> String {
    let lower = title.to_lowercase();
    let stripped = match site_token(url) {
        Some(site) => strip_site_suffix(&lower, &site),
        None => lower.as_str(),
    };
    collapse(stripped)
}

/// The first label of the URL's host with any `www.` prefix removed,
/// e.g. `https://www.rust-lang.org/learn` → `rust-lang`.
pub fn site_token(url: &str) -> Option<String> {
    let parsed = Url::parse(url.trim()).ok()?;
    let host = parsed.host_str()?.to_lowercase();
    let host = host.strip_prefix("www.").unwrap_or(&host);
    let token = host.split('.').next().unwrap_or_default();
    if token.is_empty() {
        None
    } else {
        Some(token.to_string())
    }
}

/// Remove `site` from the end of `title` when at least one separator
/// (whitespace, `-`, `–`, `—`, `|`) precedes it. Both inputs are lowercase.
fn strip_site_suffix<'a>(title: &'a str, site: &str) -> &'a str {
    let Some(rest) = title.trim_end().strip_suffix(site) else {
        return title;
    };
    let stripped = rest.trim_end_matches(is_title_separator);
    if stripped.len() == rest.len() {
        title
    } else {
        stripped
    }
}

fn is_title_separator(c: char) -> bool {
    c.is_whitespace() || matches!(c, '-' | '–' | '—' | '|')
}

fn collapse(text: &str) -> String {
    let words_only = NON_WORD.replace_all(text, " ");
    WHITESPACE.replace_all(&words_only, " ").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_trailing_site_name() {
        let doc = clean_title(
            "rust-lang/rust: Empowering everyone - GitHub",
            "https://github.com/rust-lang/rust",
        );
        assert_eq!(doc, "rust lang rust empowering everyone");
    }

    #[test]
    fn strips_site_after_pipe_and_dash_variants() {
        assert_eq!(
            clean_title("Weekly forecast | Weather", "https://weather.com/forecast"),
            "weekly forecast"
        );
        assert_eq!(
            clean_title("Breaking story — BBC", "https://www.bbc.co.uk/news"),
            "breaking story"
        );
        assert_eq!(
            clean_title("Open issues – GitLab  ", "https://gitlab.com/issues"),
            "open issues"
        );
    }

    #[test]
    fn site_name_alone_is_kept() {
        // No separator in front of the token, so nothing is stripped.
        assert_eq!(clean_title("YouTube", "https://www.youtube.com/"), "youtube");
        assert_eq!(clean_title("Mygithub", "https://github.com"), "mygithub");
    }

    #[test]
    fn site_name_in_middle_is_kept() {
        assert_eq!(
            clean_title("GitHub Actions docs", "https://docs.github.com"),
            "github actions docs"
        );
    }

    #[test]
    fn unparsable_url_falls_back_to_title() {
        assert_eq!(
            clean_title("Notes: draft #3 - Notes", "not a url"),
            "notes draft 3 notes"
        );
    }

    #[test]
    fn keeps_unicode_letters() {
        assert_eq!(
            clean_title("Café — Überblick · 東京", "https://example.org"),
            "café überblick 東京"
        );
    }

    #[test]
    fn empty_title() {
        assert_eq!(clean_title("", "https://example.com"), "");
        assert_eq!(clean_title("   ", "https://example.com"), "");
    }

    #[test]
    fn site_token_strips_www() {
        assert_eq!(site_token("https://www.rust-lang.org/learn").as_deref(), Some("rust-lang"));
        assert_eq!(site_token("https://doc.rust-lang.org").as_deref(), Some("doc"));
        assert_eq!(site_token("about:blank"), None);
        assert_eq!(site_token(""), None);
    }

    #[test]
    fn deterministic() {
        let a = clean_title("Some | Title – Here", "https://here.io");
        let b = clean_title("Some | Title – Here", "https://here.io");
        assert_eq!(a, b);
        assert_eq!(a, "some title");
    }
}
