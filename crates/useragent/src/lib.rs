//! User-agent family classification
//!
//! Reduces a raw `User-Agent` header to a coarse family label suitable for
//! a metric label value ("Chrome", "Safari", "curl", ...). Anything the
//! bundled rule table does not recognize - including empty input - maps to
//! `"Other"`, keeping the label cardinality bounded.
//!
//! The table is compiled once into a process-wide singleton; classification
//! itself is pure and safe to call from any number of threads.

use once_cell::sync::Lazy;
use regex::Regex;

/// Family label returned for unrecognized or empty input
pub const OTHER: &str = "Other";

/// One classification rule: first matching pattern wins
struct Rule {
    pattern: Regex,
    family: &'static str,
}

/// Bundled rule table, ordered most-specific first
///
/// Ordering matters: Edge, Opera, Samsung Internet and Headless Chrome
/// all carry a `Chrome/` token, and almost every browser carries
/// `Safari/`, so the generic entries sit at the bottom.
static RULES: Lazy<Vec<Rule>> = Lazy::new(|| {
    fn rule(pattern: &str, family: &'static str) -> Rule {
        Rule {
            // The table is part of the crate; a pattern that does not
            // compile is a build defect, caught by the table test.
            pattern: Regex::new(pattern).expect("invalid bundled user-agent pattern"),
            family,
        }
    }

    vec![
        // Command-line and library clients
        rule(r"^curl/", "curl"),
        rule(r"^Wget/", "wget"),
        rule(r"Python-urllib", "Python-urllib"),
        rule(r"^python-requests/", "python-requests"),
        rule(r"^Go-http-client/", "Go-http-client"),
        rule(r"^okhttp/", "okhttp"),
        rule(r"Apache-HttpClient/", "Apache-HttpClient"),
        rule(r"^Java/", "Java"),
        rule(r"PostmanRuntime/", "Postman"),
        // Monitoring agents
        rule(r"^Prometheus/", "Prometheus"),
        rule(r"^Grafana/", "Grafana"),
        // Crawlers
        rule(r"Googlebot", "Googlebot"),
        rule(r"bingbot", "bingbot"),
        rule(r"YandexBot", "YandexBot"),
        // Browsers that embed a Chrome token
        rule(r"HeadlessChrome/", "Headless Chrome"),
        rule(r"Edg(e|A|iOS)?/", "Edge"),
        rule(r"(OPR|Opera)/", "Opera"),
        rule(r"SamsungBrowser/", "Samsung Internet"),
        rule(r"CriOS/", "Chrome Mobile"),
        rule(r"Chrome/\S+ Mobile", "Chrome Mobile"),
        rule(r"Chrome/", "Chrome"),
        // Firefox
        rule(r"(Firefox|FxiOS)/", "Firefox"),
        // Internet Explorer
        rule(r"MSIE |Trident/", "IE"),
        // Safari last among browsers: everything claims Safari/
        rule(r"(iPhone|iPad|iPod).+Safari/", "Mobile Safari"),
        rule(r"Version/\S+ .*Safari/", "Safari"),
        rule(r"Android", "Android"),
    ]
});

/// Classify a user-agent string into a coarse family label
///
/// Returns [`OTHER`] for empty or unrecognized input. The exact family
/// strings are a stable contract; dashboards group by them.
pub fn family(user_agent: &str) -> &'static str {
    if user_agent.is_empty() {
        return OTHER;
    }

    for rule in RULES.iter() {
        if rule.pattern.is_match(user_agent) {
            return rule.family;
        }
    }

    OTHER
}
