use regex::Regex;

/// Links into the media server for a single title
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlexLinks {
    pub browser: Option<String>,
    pub mobile: Option<String>,
}

const DETAILS_PATTERN: &str = r"/server/([^/]+)/details\?key=([^&]+)";

/// Derives the browser link and an app deep link from the web url reported
/// by the request source. The deep link is only produced when the url
/// points at a details page of a known server.
pub fn plex_links(web_url: Option<&str>) -> PlexLinks {
    let web_url = match web_url.map(str::trim) {
        Some(url) if !url.is_empty() => url,
        _ => return PlexLinks::default(),
    };
    let mobile = Regex::new(DETAILS_PATTERN)
        .ok()
        .and_then(|re| re.captures(web_url))
        .and_then(|caps| match (caps.get(1), caps.get(2)) {
            (Some(server), Some(key)) => Some(format!(
                "plex://server/{}/details?key={}",
                server.as_str(),
                key.as_str()
            )),
            _ => None,
        });

    PlexLinks {
        browser: Some(web_url.to_string()),
        mobile,
    }
}
