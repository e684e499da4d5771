use anyhow::{Context, Result};
use reqwest::Url;
use tracing::debug;

use super::{HttpClient, fetch_bytes};

/// Collects every `href` in `html` whose target ends with `suffix`, resolved
/// against `base`. The attribute name is matched case-insensitively and may
/// have whitespace around `=`. Duplicates are dropped; document order is kept.
pub fn archive_links(html: &str, base: &Url, suffix: &str) -> Vec<Url> {
    let mut links: Vec<Url> = Vec::new();
    let lower = html.to_ascii_lowercase();
    let bytes = html.as_bytes();
    let skip_whitespace = |mut i: usize| {
        while bytes.get(i).is_some_and(u8::is_ascii_whitespace) {
            i += 1;
        }
        i
    };
    let mut from = 0;

    while let Some(pos) = lower[from..].find("href") {
        from += pos + "href".len();

        let mut i = skip_whitespace(from);
        if bytes.get(i) != Some(&b'=') {
            continue;
        }
        i = skip_whitespace(i + 1);

        let Some(&quote) = bytes.get(i).filter(|b| **b == b'"' || **b == b'\'') else {
            continue;
        };
        let start = i + 1;
        let Some(len) = html[start..].find(char::from(quote)) else {
            break;
        };
        let target = &html[start..start + len];
        from = start + len;

        if !target.ends_with(suffix) {
            continue;
        }
        if let Ok(url) = base.join(target) {
            if !links.contains(&url) {
                links.push(url);
            }
        }
    }

    links
}

/// Fetches the listing page at `base_url` and returns the archive links on it.
pub async fn list_archives<C: HttpClient + ?Sized>(
    client: &C,
    base_url: &str,
    suffix: &str,
) -> Result<Vec<Url>> {
    let base = Url::parse(base_url).with_context(|| format!("invalid base URL '{base_url}'"))?;
    let page = fetch_bytes(client, base_url)
        .await
        .with_context(|| format!("failed to fetch listing {base_url}"))?;

    let links = archive_links(&String::from_utf8_lossy(&page), &base, suffix);
    debug!(count = links.len(), suffix, "Archive links found");
    Ok(links)
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: &str = "http://climate.example.org/WMO_Region_4/CAN_Canada/";

    #[test]
    fn test_extracts_matching_links() {
        let html = r#"
            <html><body>
            <a href="CAN_ON_Toronto.716240_CWEC2016.zip">Toronto</a>
            <a href='CAN_BC_Vancouver.718920_CWEC2016.zip'>Vancouver</a>
            <a href="CAN_ON_Toronto.716240_CWEC2016.zip">dup</a>
            <a href="readme.txt">readme</a>
            <a href="/abs/CAN_NU_Iqaluit.719090_CWEC2016.zip">abs</a>
            </body></html>
        "#;
        let base = Url::parse(BASE).unwrap();
        let links = archive_links(html, &base, "CWEC2016.zip");

        let urls: Vec<_> = links.iter().map(Url::as_str).collect();
        assert_eq!(
            urls,
            vec![
                "http://climate.example.org/WMO_Region_4/CAN_Canada/CAN_ON_Toronto.716240_CWEC2016.zip",
                "http://climate.example.org/WMO_Region_4/CAN_Canada/CAN_BC_Vancouver.718920_CWEC2016.zip",
                "http://climate.example.org/abs/CAN_NU_Iqaluit.719090_CWEC2016.zip",
            ]
        );
    }

    #[test]
    fn test_ignores_unquoted_and_unterminated_hrefs() {
        let base = Url::parse(BASE).unwrap();
        assert!(archive_links("<a href=x.zip>", &base, ".zip").is_empty());
        assert!(archive_links("<a href=\"x.zip", &base, ".zip").is_empty());
    }

    #[test]
    fn test_matches_attribute_case_and_spacing() {
        let base = Url::parse(BASE).unwrap();
        let html = r#"<A HREF="CAN_QC_Montreal_CWEC2016.zip">M</A>
            <a href = 'CAN_NS_Halifax_CWEC2016.zip'>H</a>
            <a hreflang="fr" Href=
                "CAN_MB_Winnipeg_CWEC2016.zip">W</a>"#;

        let names: Vec<_> = archive_links(html, &base, "CWEC2016.zip")
            .iter()
            .filter_map(|u| u.path_segments()?.next_back().map(str::to_string))
            .collect();
        assert_eq!(
            names,
            vec![
                "CAN_QC_Montreal_CWEC2016.zip",
                "CAN_NS_Halifax_CWEC2016.zip",
                "CAN_MB_Winnipeg_CWEC2016.zip",
            ]
        );
    }
}
