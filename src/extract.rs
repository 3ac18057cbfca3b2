use std::io::Write as _;
use std::sync::LazyLock;

use anyhow::Context as _;
use regex::Regex;

use crate::cli::{ExtractArgs, PageKind};
use crate::formats::CharacterExtraction;
use crate::unescape::{unescape, unescape_str};

static SYSTEM_LOGO_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?s)<div class=['"]system-logo-container[^>]*>.*?<img[^>]*title=['"]([^'"]+)['"][^>]*>"#,
    )
    .expect("system logo pattern compiles")
});

static SHEET_ATTRS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"dynamic_sheet_attrs = (.*?);\r?\n").expect("sheet attrs pattern compiles")
});

static SHEET_SLUG_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"class="dst_slug">(.*?)</"#).expect("sheet slug pattern compiles")
});

/// Game system label from the campaign root page, entity-decoded.
pub fn extract_platform_label(html: &str) -> Option<String> {
    let caps = SYSTEM_LOGO_RE.captures(html)?;
    Some(unescape_str(caps.get(1)?.as_str()))
}

/// Scans a character page for the embedded attribute payload and the sheet
/// type slug. The two searches are independent; `None` means neither marker
/// was present. An empty capture still counts as found.
pub fn extract_character(html: &str) -> Option<CharacterExtraction> {
    let extraction = CharacterExtraction {
        dynamic_sheet_attrs: first_capture(&SHEET_ATTRS_RE, html),
        dst_slug: first_capture(&SHEET_SLUG_RE, html),
    };

    if extraction.dynamic_sheet_attrs.is_none() && extraction.dst_slug.is_none() {
        return None;
    }
    Some(extraction)
}

fn first_capture(re: &Regex, html: &str) -> Option<String> {
    re.captures(html)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_owned())
}

/// Decodes the raw attribute payload: one entity pass over the page text (the
/// page escapes its JSON exactly once), then JSON, then every string leaf so
/// entity text inside values is decoded too.
pub fn parse_sheet_attrs(payload: &str) -> anyhow::Result<serde_json::Value> {
    let text = html_escape::decode_html_entities(payload);
    let value: serde_json::Value =
        serde_json::from_str(&text).context("parse dynamic sheet attributes")?;
    Ok(unescape(value))
}

pub fn run(args: ExtractArgs) -> anyhow::Result<()> {
    let html = std::fs::read_to_string(&args.input)
        .with_context(|| format!("read html page: {}", args.input.display()))?;

    let output = match args.page {
        PageKind::Campaign => {
            let platform = extract_platform_label(&html);
            if platform.is_none() {
                tracing::warn!(input = %args.input.display(), "no system logo marker found");
            }
            serde_json::json!({ "platform": platform })
        }
        PageKind::Character => match extract_character(&html) {
            Some(extraction) => {
                let attributes = extraction
                    .dynamic_sheet_attrs
                    .as_deref()
                    .map(parse_sheet_attrs)
                    .transpose()
                    .context("decode attribute payload")?;
                serde_json::json!({
                    "sheetType": extraction.dst_slug,
                    "attributes": attributes,
                })
            }
            None => {
                tracing::warn!(input = %args.input.display(), "no character sheet markers found");
                serde_json::Value::Null
            }
        },
    };

    let mut stdout = std::io::stdout().lock();
    serde_json::to_writer_pretty(&mut stdout, &output).context("write extraction json")?;
    stdout.write_all(b"\n").context("write newline")?;
    stdout.flush().context("flush stdout")?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const CAMPAIGN_PAGE: &str = r#"<!doctype html>
<html>
  <body>
    <div class="system-logo-container pull-right">
      <a href="/systems/pathfinder">
        <img src="/logo.png" alt="logo" title="Pathfinder &amp; Friends" />
      </a>
    </div>
    <div class='system-logo-container'><img title='Second System'></div>
  </body>
</html>
"#;

    #[test]
    fn platform_label_is_first_match_and_decoded() {
        assert_eq!(
            extract_platform_label(CAMPAIGN_PAGE).as_deref(),
            Some("Pathfinder & Friends")
        );
    }

    #[test]
    fn platform_label_accepts_single_quotes() {
        let html = "<div class='system-logo-container'>\n<img src='x' title='D&amp;D 5E'>";
        assert_eq!(extract_platform_label(html).as_deref(), Some("D&D 5E"));
    }

    #[test]
    fn platform_label_absent_without_marker() {
        assert_eq!(extract_platform_label("<img title=\"Orphan\">"), None);
        assert_eq!(extract_platform_label(""), None);
    }

    #[test]
    fn character_page_with_both_markers() {
        let html = concat!(
            "<script>\n",
            "var dynamic_sheet_attrs = {&quot;hp&quot;:&quot;10&quot;};\n",
            "</script>\n",
            "<span class=\"dst_slug\">dnd5e</span>\n",
        );
        assert_eq!(
            extract_character(html),
            Some(CharacterExtraction {
                dynamic_sheet_attrs: Some("{&quot;hp&quot;:&quot;10&quot;}".to_owned()),
                dst_slug: Some("dnd5e".to_owned()),
            })
        );
    }

    #[test]
    fn markers_are_order_insensitive_and_partial() {
        let slug_first = "<b class=\"dst_slug\">pf2e</b>\nx = 1;\n";
        assert_eq!(
            extract_character(slug_first),
            Some(CharacterExtraction {
                dynamic_sheet_attrs: None,
                dst_slug: Some("pf2e".to_owned()),
            })
        );

        let attrs_only = "dynamic_sheet_attrs = {};\n";
        assert_eq!(
            extract_character(attrs_only),
            Some(CharacterExtraction {
                dynamic_sheet_attrs: Some("{}".to_owned()),
                dst_slug: None,
            })
        );
    }

    #[test]
    fn empty_slug_counts_as_found() {
        let html = "<span class=\"dst_slug\"></span>";
        assert_eq!(
            extract_character(html),
            Some(CharacterExtraction {
                dynamic_sheet_attrs: None,
                dst_slug: Some(String::new()),
            })
        );
    }

    #[test]
    fn page_without_markers_is_absent() {
        assert_eq!(extract_character("<html><body>blank sheet</body></html>"), None);
    }

    #[test]
    fn payload_requires_statement_terminator_before_newline() {
        assert_eq!(extract_character("dynamic_sheet_attrs = {}"), None);
        assert_eq!(
            extract_character("dynamic_sheet_attrs = {\"a\":1};\r\n")
                .and_then(|e| e.dynamic_sheet_attrs),
            Some("{\"a\":1}".to_owned())
        );
    }

    #[test]
    fn parse_sheet_attrs_decodes_entities_before_json() -> anyhow::Result<()> {
        let value = parse_sheet_attrs("{&quot;name&quot;:&quot;Vex &amp;amp; Co&quot;,&quot;hp&quot;:10}")?;
        assert_eq!(value, serde_json::json!({ "name": "Vex & Co", "hp": 10 }));
        Ok(())
    }

    #[test]
    fn parse_sheet_attrs_keeps_escaped_entity_text_inside_values() -> anyhow::Result<()> {
        let value = parse_sheet_attrs(
            "{&quot;note&quot;:&quot;&amp;quot;&quot;,&quot;hp&quot;:5}",
        )?;
        assert_eq!(value, serde_json::json!({ "note": "\"", "hp": 5 }));
        Ok(())
    }

    #[test]
    fn parse_sheet_attrs_rejects_garbage() {
        assert!(parse_sheet_attrs("not json at all").is_err());
    }
}
