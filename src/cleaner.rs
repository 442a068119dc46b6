//! Vendor export marker cleanup
//!
//! Research-assistant export pipelines inject private-use-area marker blocks
//! into markup text: citation markers, entity markers, and image-group
//! markers shaped as `U+E200 tag U+E202 payload U+E201`. This pre-pass
//! rewrites or removes those blocks according to configurable policies and
//! reports per-category counts. It is textually scoped: nothing outside a
//! recognized marker span is touched, and with the default (off) mode the
//! whole pass is a no-op regardless of content.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use unicode_segmentation::UnicodeSegmentation;

use crate::error::{Error, Result};

const MARKER_START: char = '\u{e200}';
const MARKER_END: char = '\u{e201}';
const MARKER_SEPARATOR: char = '\u{e202}';

/// Longest fallback payload kept when a marker cannot be parsed.
const MAX_FALLBACK_GRAPHEMES: usize = 240;

static MARKER_BLOCK_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)\u{e200}([a-zA-Z_][a-zA-Z0-9_]*)\u{e202}(.*?)\u{e201}").unwrap()
});
static STRAY_PUA_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[\u{e200}-\u{e20f}]").unwrap());

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CleanerMode {
    /// Never touch the text; `detect` reports false unconditionally.
    #[default]
    Off,
    /// Clean only when at least one marker is present.
    Auto,
    /// Always run the rewrite pass.
    On,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CiteMode {
    /// Replace with `[^n]` references and append a Citations section.
    #[default]
    Footnote,
    /// Replace with an inline `(sources: …)` annotation.
    Inline,
    /// Delete citation markers outright.
    Strip,
}

#[derive(Debug, Clone, Default)]
pub struct CleanerConfig {
    pub mode: CleanerMode,
    pub cite_mode: CiteMode,
    /// Drop unrecognized marker blocks instead of keeping an inert comment.
    pub drop_unknown_markers: bool,
    /// Drop image-group markers instead of keeping an inert comment.
    pub drop_image_groups: bool,
}

/// Per-category counts for one cleaning run. Observability only; callers
/// never branch on it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CleanReport {
    pub detected: bool,
    pub applied: bool,
    pub modified: bool,
    pub cite_markers: usize,
    pub entity_markers: usize,
    pub image_group_markers: usize,
    pub unknown_markers: usize,
    pub replaced: usize,
    pub removed: usize,
    pub fallback_used: usize,
    pub failed: usize,
    pub footnotes_emitted: usize,
    pub stray_markers_removed: usize,
}

impl CleanReport {
    pub fn summary(&self) -> String {
        format!(
            "detected={} applied={} modified={} cite={} entity={} image_group={} unknown={} \
             replaced={} removed={} fallback={} failed={} footnotes={} stray_removed={}",
            self.detected,
            self.applied,
            self.modified,
            self.cite_markers,
            self.entity_markers,
            self.image_group_markers,
            self.unknown_markers,
            self.replaced,
            self.removed,
            self.fallback_used,
            self.failed,
            self.footnotes_emitted,
            self.stray_markers_removed
        )
    }
}

pub struct Cleaner {
    config: CleanerConfig,
}

impl Cleaner {
    pub fn new(config: CleanerConfig) -> Self {
        Cleaner { config }
    }

    /// True iff cleaning is active and at least one marker block is present.
    /// With mode off this is false for every input, so downstream behavior
    /// is identical to having no cleaner at all.
    pub fn detect(&self, text: &str) -> bool {
        if self.config.mode == CleanerMode::Off {
            return false;
        }
        MARKER_BLOCK_RE.is_match(text)
    }

    /// Rewrite marker blocks according to the configured policies.
    pub fn clean(&self, text: &str) -> (String, CleanReport) {
        let mut report = CleanReport::default();
        report.detected = MARKER_BLOCK_RE.is_match(text);

        match self.config.mode {
            CleanerMode::Off => return (text.to_string(), CleanReport::default()),
            CleanerMode::Auto if !report.detected => return (text.to_string(), report),
            _ => {}
        }

        report.applied = true;

        // Footnote numbering is per source id, in first-appearance order.
        let mut footnotes: Vec<String> = Vec::new();
        let mut cleaned = String::with_capacity(text.len());
        let mut last_end = 0;

        for caps in MARKER_BLOCK_RE.captures_iter(text) {
            let whole = caps.get(0).unwrap();
            cleaned.push_str(&text[last_end..whole.start()]);
            last_end = whole.end();

            let tag = caps[1].trim().to_ascii_lowercase();
            let payload = &caps[2];

            let replacement = match tag.as_str() {
                "cite" => {
                    report.cite_markers += 1;
                    self.handle_cite(payload, &mut footnotes, &mut report)
                }
                "entity" => {
                    report.entity_markers += 1;
                    handle_entity(payload, &mut report)
                }
                "image_group" => {
                    report.image_group_markers += 1;
                    self.handle_image_group(payload, &mut report)
                }
                _ => {
                    report.unknown_markers += 1;
                    self.handle_unknown(&tag, payload, &mut report)
                }
            };
            cleaned.push_str(&replacement);
        }
        cleaned.push_str(&text[last_end..]);

        if self.config.cite_mode == CiteMode::Footnote && !footnotes.is_empty() {
            report.footnotes_emitted = footnotes.len();
            cleaned = append_citations(&cleaned, &footnotes);
        }

        let stray = STRAY_PUA_RE.find_iter(&cleaned).count();
        if stray > 0 {
            report.stray_markers_removed = stray;
            cleaned = STRAY_PUA_RE.replace_all(&cleaned, "").into_owned();
        }

        report.modified = cleaned != text;
        log::debug!("cleaner: {}", report.summary());
        (cleaned, report)
    }

    fn handle_cite(
        &self,
        payload: &str,
        footnotes: &mut Vec<String>,
        report: &mut CleanReport,
    ) -> String {
        let ids: Vec<&str> = payload
            .split(MARKER_SEPARATOR)
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .collect();

        match self.config.cite_mode {
            CiteMode::Strip => {
                report.removed += 1;
                String::new()
            }
            CiteMode::Inline => {
                if ids.is_empty() {
                    report.removed += 1;
                    return String::new();
                }
                report.replaced += 1;
                format!(" (sources: {})", ids.join(", "))
            }
            CiteMode::Footnote => {
                report.replaced += 1;
                let mut refs = String::new();
                for id in ids {
                    let number = match footnotes.iter().position(|known| known == id) {
                        Some(idx) => idx + 1,
                        None => {
                            footnotes.push(id.to_string());
                            footnotes.len()
                        }
                    };
                    refs.push_str(&format!("[^{number}]"));
                }
                refs
            }
        }
    }

    fn handle_image_group(&self, payload: &str, report: &mut CleanReport) -> String {
        if self.config.drop_image_groups {
            report.removed += 1;
            return String::new();
        }

        match serde_json::from_str::<serde_json::Value>(payload) {
            Ok(value) => {
                let queries = value
                    .get("query")
                    .or_else(|| value.get("queries"))
                    .and_then(|q| q.as_array())
                    .map(|items| {
                        items
                            .iter()
                            .map(|item| {
                                item.as_str()
                                    .map(str::to_string)
                                    .unwrap_or_else(|| item.to_string())
                            })
                            .collect::<Vec<_>>()
                    })
                    .unwrap_or_default();
                report.replaced += 1;
                if queries.is_empty() {
                    "\n<!-- image_group -->\n".to_string()
                } else {
                    format!("\n<!-- image_group: {} -->\n", queries.join(", "))
                }
            }
            Err(_) => {
                report.fallback_used += 1;
                "\n<!-- image_group removed -->\n".to_string()
            }
        }
    }

    fn handle_unknown(&self, tag: &str, payload: &str, report: &mut CleanReport) -> String {
        if self.config.drop_unknown_markers {
            report.removed += 1;
            return String::new();
        }
        report.replaced += 1;
        format!("<!-- {tag}: {} -->", sanitize_payload(payload))
    }
}

/// Substitute an entity marker with its display name. The payload is a small
/// JSON-like array whose second element is preferred; parse failures fall
/// back to a sanitized form of the raw payload and are counted, never raised.
fn handle_entity(payload: &str, report: &mut CleanReport) -> String {
    if let Ok(serde_json::Value::Array(items)) = serde_json::from_str(payload) {
        if items.len() >= 2 {
            report.replaced += 1;
            return match &items[1] {
                serde_json::Value::String(name) => name.clone(),
                other => other.to_string(),
            };
        }
    }
    report.fallback_used += 1;
    sanitize_payload(payload)
}

/// Whitespace-collapse and grapheme-truncate a raw payload for inert output.
fn sanitize_payload(payload: &str) -> String {
    let compact = payload.split_whitespace().collect::<Vec<_>>().join(" ");
    let graphemes: Vec<&str> = compact.graphemes(true).collect();
    if graphemes.len() > MAX_FALLBACK_GRAPHEMES {
        format!("{}...", graphemes[..MAX_FALLBACK_GRAPHEMES].concat())
    } else {
        compact
    }
}

fn append_citations(text: &str, footnotes: &[String]) -> String {
    let mut lines = vec!["## Citations".to_string()];
    for (idx, source) in footnotes.iter().enumerate() {
        lines.push(format!("[^{}]: {source}", idx + 1));
    }
    let block = lines.join("\n");

    let stripped = text.trim_end();
    if stripped.is_empty() {
        format!("{block}\n")
    } else {
        format!("{stripped}\n\n{block}\n")
    }
}

/// Validate a configuration coming from an external surface (CLI flags,
/// config files deserialize into strings there).
pub fn parse_mode(value: &str) -> Result<CleanerMode> {
    match value {
        "off" => Ok(CleanerMode::Off),
        "auto" => Ok(CleanerMode::Auto),
        "on" => Ok(CleanerMode::On),
        other => Err(Error::InvalidConfig(format!(
            "cleaner mode must be one of: off, auto, on (got {other:?})"
        ))),
    }
}

pub fn parse_cite_mode(value: &str) -> Result<CiteMode> {
    match value {
        "footnote" => Ok(CiteMode::Footnote),
        "inline" => Ok(CiteMode::Inline),
        "strip" => Ok(CiteMode::Strip),
        other => Err(Error::InvalidConfig(format!(
            "cite mode must be one of: footnote, inline, strip (got {other:?})"
        ))),
    }
}

/// Clean text with a one-off cleaner instance.
pub fn clean_markup(text: &str, config: &CleanerConfig) -> (String, CleanReport) {
    Cleaner::new(config.clone()).clean(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn marker(tag: &str, payload: &str) -> String {
        format!("{MARKER_START}{tag}{MARKER_SEPARATOR}{payload}{MARKER_END}")
    }

    fn on_config() -> CleanerConfig {
        CleanerConfig {
            mode: CleanerMode::On,
            ..Default::default()
        }
    }

    #[test]
    fn test_off_mode_is_a_no_op() {
        let text = format!("before {} after", marker("cite", "turn5search0"));
        let cleaner = Cleaner::new(CleanerConfig::default());

        assert!(!cleaner.detect(&text));
        let (cleaned, report) = cleaner.clean(&text);
        assert_eq!(cleaned, text);
        assert!(!report.applied);
    }

    #[test]
    fn test_auto_mode_skips_clean_text() {
        let cleaner = Cleaner::new(CleanerConfig {
            mode: CleanerMode::Auto,
            ..Default::default()
        });
        let (cleaned, report) = cleaner.clean("no markers here");
        assert_eq!(cleaned, "no markers here");
        assert!(!report.applied);
        assert!(!report.detected);
    }

    #[test]
    fn test_cite_footnote_mode_appends_citations() {
        let text = format!(
            "Revenue grew.{} Margins fell.{}",
            marker("cite", &format!("turn5search0{MARKER_SEPARATOR}turn1search8")),
            marker("cite", "turn5search0")
        );
        let (cleaned, report) = clean_markup(&text, &on_config());

        assert!(cleaned.contains("Revenue grew.[^1][^2]"));
        // Repeated source ids reuse their footnote number.
        assert!(cleaned.contains("Margins fell.[^1]"));
        assert!(cleaned.contains("## Citations"));
        assert!(cleaned.contains("[^1]: turn5search0"));
        assert!(cleaned.contains("[^2]: turn1search8"));
        assert_eq!(report.footnotes_emitted, 2);
        assert_eq!(report.cite_markers, 2);
    }

    #[test]
    fn test_cite_strip_mode_removes_everything() {
        let text = format!("Revenue grew.{}", marker("cite", "turn5search0"));
        let config = CleanerConfig {
            mode: CleanerMode::On,
            cite_mode: CiteMode::Strip,
            ..Default::default()
        };
        let (cleaned, report) = clean_markup(&text, &config);

        assert_eq!(cleaned, "Revenue grew.");
        assert!(!cleaned.contains("Citations"));
        assert_eq!(report.removed, 1);
    }

    #[test]
    fn test_cite_inline_mode() {
        let text = format!("Revenue grew.{}", marker("cite", "turn5search0"));
        let config = CleanerConfig {
            mode: CleanerMode::On,
            cite_mode: CiteMode::Inline,
            ..Default::default()
        };
        let (cleaned, _) = clean_markup(&text, &config);
        assert_eq!(cleaned, "Revenue grew. (sources: turn5search0)");
    }

    #[test]
    fn test_entity_second_element_substituted() {
        let text = format!("Retailer {} expanded.", marker("entity", r#"["company", "신세계", "x"]"#));
        let (cleaned, report) = clean_markup(&text, &on_config());
        assert_eq!(cleaned, "Retailer 신세계 expanded.");
        assert_eq!(report.entity_markers, 1);
        assert_eq!(report.replaced, 1);
        assert_eq!(report.failed, 0);
    }

    #[test]
    fn test_malformed_entity_falls_back() {
        let text = format!("x {} y", marker("entity", "[broken"));
        let (cleaned, report) = clean_markup(&text, &on_config());

        assert_eq!(cleaned, "x [broken y");
        assert_eq!(report.failed, 0);
        assert_eq!(report.fallback_used, 1);
    }

    #[test]
    fn test_oversized_entity_payload_truncated() {
        let payload = "a".repeat(500);
        let text = marker("entity", &payload);
        let (cleaned, report) = clean_markup(&text, &on_config());
        assert!(cleaned.ends_with("..."));
        assert_eq!(cleaned.chars().count(), 240 + 3);
        assert_eq!(report.fallback_used, 1);
    }

    #[test]
    fn test_image_group_kept_as_comment_by_default() {
        let text = marker("image_group", r#"{"query": ["revenue chart", "margin trend"]}"#);
        let (cleaned, _) = clean_markup(&text, &on_config());
        assert_eq!(cleaned, "\n<!-- image_group: revenue chart, margin trend -->\n");
    }

    #[test]
    fn test_unknown_marker_policies() {
        let text = format!("a {} b", marker("widget", "payload text"));

        let (kept, report) = clean_markup(&text, &on_config());
        assert_eq!(kept, "a <!-- widget: payload text --> b");
        assert_eq!(report.unknown_markers, 1);

        let config = CleanerConfig {
            mode: CleanerMode::On,
            drop_unknown_markers: true,
            ..Default::default()
        };
        let (dropped, report) = clean_markup(&text, &config);
        assert_eq!(dropped, "a  b");
        assert_eq!(report.removed, 1);
    }

    #[test]
    fn test_config_parsing() {
        assert_eq!(parse_mode("auto").unwrap(), CleanerMode::Auto);
        assert!(parse_mode("sometimes").is_err());
        assert_eq!(parse_cite_mode("strip").unwrap(), CiteMode::Strip);
        assert!(parse_cite_mode("bibliography").is_err());
    }

    #[test]
    fn test_stray_pua_swept() {
        let text = format!("left{MARKER_SEPARATOR}right");
        let (cleaned, report) = clean_markup(&text, &on_config());
        assert_eq!(cleaned, "leftright");
        assert_eq!(report.stray_markers_removed, 1);
    }

    #[test]
    fn test_text_outside_markers_untouched() {
        let text = format!(
            "**bold** | table | $x$ {}",
            marker("cite", "turn1search0")
        );
        let config = CleanerConfig {
            mode: CleanerMode::On,
            cite_mode: CiteMode::Strip,
            ..Default::default()
        };
        let (cleaned, _) = clean_markup(&text, &config);
        assert_eq!(cleaned, "**bold** | table | $x$ ");
    }
}
