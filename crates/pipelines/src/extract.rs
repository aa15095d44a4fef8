//! Structured data extraction from HTML: tables, lists, selector-driven
//! field maps, and embedded JSON-LD.
//!
//! Every string that leaves this module has passed
//! [`research_core::text::sanitize`], so downstream JSON is single-line and
//! free of control characters.

use std::collections::BTreeMap;

use scraper::{ElementRef, Html, Selector};
use serde_json::Value;

use research_core::text::sanitize;
use research_core::{ResearchError, Result};

const AUTO_TABLE_LIMIT: usize = 3;
const AUTO_LIST_LIMIT: usize = 3;

/// Requested extraction mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractKind {
    Table,
    List,
    Fields,
    JsonLd,
    Auto,
}

impl ExtractKind {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "table" => Some(Self::Table),
            "list" => Some(Self::List),
            "fields" => Some(Self::Fields),
            "json-ld" | "jsonld" => Some(Self::JsonLd),
            "auto" => Some(Self::Auto),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Table => "table",
            Self::List => "list",
            Self::Fields => "fields",
            Self::JsonLd => "json-ld",
            Self::Auto => "auto",
        }
    }
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct TableData {
    pub caption: Option<String>,
    pub headers: Vec<String>,
    /// One map per row, keyed by header; rows whose cell count differs from
    /// the header count are dropped.
    pub rows: Vec<BTreeMap<String, String>>,
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct ListData {
    /// Nearest preceding heading, when one exists.
    pub title: Option<String>,
    pub items: Vec<String>,
    pub nested: bool,
}

/// Union of extraction outputs, tagged by mode.
#[derive(Debug, Clone, serde::Serialize)]
#[serde(tag = "kind", content = "payload", rename_all = "kebab-case")]
pub enum ExtractionResult {
    Table(Vec<TableData>),
    List(Vec<ListData>),
    Fields(BTreeMap<String, Value>),
    JsonLd(Vec<Value>),
    Auto {
        json_ld: Vec<Value>,
        tables: Vec<TableData>,
        lists: Vec<ListData>,
    },
}

#[derive(Default)]
pub struct Extractor;

impl Extractor {
    pub fn new() -> Self {
        Self
    }

    /// Run one extraction mode over `html`.
    pub fn extract(
        &self,
        html: &str,
        kind: ExtractKind,
        selectors: Option<&BTreeMap<String, String>>,
        max_items: usize,
    ) -> Result<ExtractionResult> {
        let doc = Html::parse_document(html);
        match kind {
            ExtractKind::Table => Ok(ExtractionResult::Table(extract_tables(&doc, max_items))),
            ExtractKind::List => Ok(ExtractionResult::List(extract_lists(&doc, max_items))),
            ExtractKind::JsonLd => Ok(ExtractionResult::JsonLd(extract_json_ld(&doc))),
            ExtractKind::Fields => {
                let Some(selectors) = selectors.filter(|s| !s.is_empty()) else {
                    return Err(ResearchError::InputInvalid(
                        "extract_type 'fields' requires a non-empty 'selectors' map".into(),
                    ));
                };
                Ok(ExtractionResult::Fields(extract_fields(&doc, selectors)))
            }
            ExtractKind::Auto => {
                // JSON-LD is the highest-signal source, then tables, then
                // lists; the union is returned.
                Ok(ExtractionResult::Auto {
                    json_ld: extract_json_ld(&doc),
                    tables: extract_tables(&doc, AUTO_TABLE_LIMIT),
                    lists: extract_lists(&doc, AUTO_LIST_LIMIT),
                })
            }
        }
    }
}

fn extract_tables(doc: &Html, max_items: usize) -> Vec<TableData> {
    let table_sel = Selector::parse("table").expect("static selector");
    let caption_sel = Selector::parse("caption").expect("static selector");
    let thead_th_sel = Selector::parse("thead th").expect("static selector");
    let tr_sel = Selector::parse("tr").expect("static selector");
    let th_sel = Selector::parse("th").expect("static selector");
    let cell_sel = Selector::parse("td, th").expect("static selector");

    let mut tables = Vec::new();
    for table in doc.select(&table_sel).take(max_items.max(1)) {
        let caption = table
            .select(&caption_sel)
            .next()
            .map(|c| sanitize(&c.text().collect::<String>()))
            .filter(|c| !c.is_empty());

        let mut headers: Vec<String> = table
            .select(&thead_th_sel)
            .map(|th| sanitize(&th.text().collect::<String>()))
            .collect();

        let all_rows: Vec<ElementRef> = table.select(&tr_sel).collect();
        let mut body_rows = all_rows.as_slice();

        if headers.is_empty() {
            // No <thead>: use the first row's <th> cells as headers.
            if let Some((first, rest)) = all_rows.split_first() {
                let first_row_ths: Vec<String> = first
                    .select(&th_sel)
                    .map(|th| sanitize(&th.text().collect::<String>()))
                    .collect();
                if !first_row_ths.is_empty() {
                    headers = first_row_ths;
                    body_rows = rest;
                }
            }
        } else {
            // Skip header rows living inside <thead>.
            let header_row_count = all_rows
                .iter()
                .take_while(|row| row.select(&th_sel).next().is_some())
                .count();
            body_rows = &all_rows[header_row_count.min(all_rows.len())..];
        }

        if headers.is_empty() {
            continue;
        }

        let mut rows = Vec::new();
        for row in body_rows {
            let cells: Vec<String> = row
                .select(&cell_sel)
                .map(|cell| sanitize(&cell.text().collect::<String>()))
                .collect();
            if cells.len() != headers.len() {
                continue;
            }
            let map: BTreeMap<String, String> =
                headers.iter().cloned().zip(cells).collect();
            rows.push(map);
        }

        tables.push(TableData {
            caption,
            headers,
            rows,
        });
    }
    tables
}

fn extract_lists(doc: &Html, max_items: usize) -> Vec<ListData> {
    let list_sel = Selector::parse("ul, ol, dl").expect("static selector");

    let mut lists = Vec::new();
    for list in doc.select(&list_sel).take(max_items.max(1)) {
        let tag = list.value().name();
        let (items, nested) = if tag == "dl" {
            (definition_items(list), false)
        } else {
            bullet_items(list)
        };
        if items.is_empty() {
            continue;
        }
        lists.push(ListData {
            title: preceding_heading(list),
            items,
            nested,
        });
    }
    lists
}

/// Direct-child `<li>` texts; reports whether any item nests another list.
fn bullet_items(list: ElementRef<'_>) -> (Vec<String>, bool) {
    let inner_list_sel = Selector::parse("ul, ol").expect("static selector");
    let mut items = Vec::new();
    let mut nested = false;
    for child in list.children() {
        let Some(li) = ElementRef::wrap(child) else {
            continue;
        };
        if li.value().name() != "li" {
            continue;
        }
        if li.select(&inner_list_sel).next().is_some() {
            nested = true;
        }
        let text = sanitize(&li.text().collect::<String>());
        if !text.is_empty() {
            items.push(text);
        }
    }
    (items, nested)
}

/// `<dl>` pairs rendered as `"{dt}: {dd}"`.
fn definition_items(list: ElementRef<'_>) -> Vec<String> {
    let mut items = Vec::new();
    let mut current_term: Option<String> = None;
    for child in list.children() {
        let Some(el) = ElementRef::wrap(child) else {
            continue;
        };
        match el.value().name() {
            "dt" => current_term = Some(sanitize(&el.text().collect::<String>())),
            "dd" => {
                let definition = sanitize(&el.text().collect::<String>());
                match current_term.take() {
                    Some(term) if !term.is_empty() => items.push(format!("{term}: {definition}")),
                    _ => items.push(definition),
                }
            }
            _ => {}
        }
    }
    items.retain(|i| !i.is_empty());
    items
}

/// Nearest heading before the element: previous siblings first, then the
/// parent's previous siblings.
fn preceding_heading(el: ElementRef<'_>) -> Option<String> {
    fn heading_text(node: ego_tree::NodeRef<'_, scraper::Node>) -> Option<String> {
        let el = ElementRef::wrap(node)?;
        if matches!(el.value().name(), "h1" | "h2" | "h3" | "h4" | "h5" | "h6") {
            let text = sanitize(&el.text().collect::<String>());
            if !text.is_empty() {
                return Some(text);
            }
        }
        None
    }

    for sibling in el.prev_siblings() {
        if let Some(text) = heading_text(sibling) {
            return Some(text);
        }
    }
    let parent = el.parent()?;
    for sibling in parent.prev_siblings() {
        if let Some(text) = heading_text(sibling) {
            return Some(text);
        }
    }
    None
}

fn extract_fields(doc: &Html, selectors: &BTreeMap<String, String>) -> BTreeMap<String, Value> {
    let mut out = BTreeMap::new();
    for (name, css) in selectors {
        let Ok(selector) = Selector::parse(css) else {
            out.insert(name.clone(), Value::Null);
            continue;
        };
        let matches: Vec<String> = doc
            .select(&selector)
            .map(|el| sanitize(&el.text().collect::<String>()))
            .filter(|t| !t.is_empty())
            .collect();
        let value = match matches.len() {
            0 => Value::Null,
            1 => Value::String(matches.into_iter().next().unwrap_or_default()),
            _ => Value::Array(matches.into_iter().map(Value::String).collect()),
        };
        out.insert(name.clone(), value);
    }
    out
}

fn extract_json_ld(doc: &Html) -> Vec<Value> {
    let script_sel =
        Selector::parse(r#"script[type="application/ld+json"]"#).expect("static selector");
    doc.select(&script_sel)
        .filter_map(|script| {
            let raw: String = script.text().collect();
            // Malformed blocks are skipped, not fatal.
            serde_json::from_str(&raw).ok()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const TABLE_HTML: &str = r#"
        <html><body>
          <table>
            <caption>Browsers</caption>
            <thead><tr><th>Name</th><th>Engine</th></tr></thead>
            <tbody>
              <tr><td>Firefox</td><td>Gecko</td></tr>
              <tr><td>Chrome</td><td>Blink</td></tr>
              <tr><td>OnlyOneCell</td></tr>
            </tbody>
          </table>
        </body></html>
    "#;

    #[test]
    fn tables_extract_headers_rows_and_caption() {
        let extractor = Extractor::new();
        let result = extractor
            .extract(TABLE_HTML, ExtractKind::Table, None, 100)
            .unwrap();
        let ExtractionResult::Table(tables) = result else {
            panic!("expected tables");
        };
        assert_eq!(tables.len(), 1);
        let table = &tables[0];
        assert_eq!(table.caption.as_deref(), Some("Browsers"));
        assert_eq!(table.headers, vec!["Name", "Engine"]);
        // The short row is dropped.
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[0]["Name"], "Firefox");
        assert_eq!(table.rows[1]["Engine"], "Blink");
    }

    #[test]
    fn first_row_th_headers_work_without_thead() {
        let html = r#"<table>
            <tr><th>K</th><th>V</th></tr>
            <tr><td>a</td><td>1</td></tr>
        </table>"#;
        let extractor = Extractor::new();
        let ExtractionResult::Table(tables) =
            extractor.extract(html, ExtractKind::Table, None, 10).unwrap()
        else {
            panic!("expected tables");
        };
        assert_eq!(tables[0].headers, vec!["K", "V"]);
        assert_eq!(tables[0].rows.len(), 1);
    }

    #[test]
    fn cells_are_sanitized() {
        let html = "<table><thead><tr><th>A</th></tr></thead><tr><td>x\u{0}\n  y</td></tr></table>";
        let extractor = Extractor::new();
        let ExtractionResult::Table(tables) =
            extractor.extract(html, ExtractKind::Table, None, 10).unwrap()
        else {
            panic!("expected tables");
        };
        assert_eq!(tables[0].rows[0]["A"], "x y");
    }

    #[test]
    fn lists_pick_up_titles_and_nesting() {
        let html = r#"
            <h2>Ingredients</h2>
            <ul>
              <li>flour</li>
              <li>sugar<ul><li>brown</li></ul></li>
            </ul>
            <dl><dt>TTL</dt><dd>time to live</dd></dl>
        "#;
        let extractor = Extractor::new();
        let ExtractionResult::List(lists) =
            extractor.extract(html, ExtractKind::List, None, 10).unwrap()
        else {
            panic!("expected lists");
        };
        // Outer ul, nested ul, and the dl.
        let outer = &lists[0];
        assert_eq!(outer.title.as_deref(), Some("Ingredients"));
        assert!(outer.nested);
        assert_eq!(outer.items[0], "flour");
        let dl = lists.iter().find(|l| l.items[0].starts_with("TTL")).unwrap();
        assert_eq!(dl.items[0], "TTL: time to live");
    }

    #[test]
    fn fields_mode_maps_selector_cardinality() {
        let html = r#"
            <h1 id="title">Hello</h1>
            <p class="tag">one</p><p class="tag">two</p>
        "#;
        let mut selectors = BTreeMap::new();
        selectors.insert("title".to_string(), "#title".to_string());
        selectors.insert("tags".to_string(), ".tag".to_string());
        selectors.insert("missing".to_string(), ".nope".to_string());

        let extractor = Extractor::new();
        let ExtractionResult::Fields(fields) = extractor
            .extract(html, ExtractKind::Fields, Some(&selectors), 10)
            .unwrap()
        else {
            panic!("expected fields");
        };
        assert_eq!(fields["title"], Value::String("Hello".into()));
        assert_eq!(
            fields["tags"],
            Value::Array(vec![Value::String("one".into()), Value::String("two".into())])
        );
        assert_eq!(fields["missing"], Value::Null);
    }

    #[test]
    fn fields_mode_requires_selectors() {
        let extractor = Extractor::new();
        assert!(extractor
            .extract("<p>x</p>", ExtractKind::Fields, None, 10)
            .is_err());
    }

    #[test]
    fn json_ld_skips_malformed_blocks() {
        let html = r#"
            <script type="application/ld+json">{"@type":"Article","name":"A"}</script>
            <script type="application/ld+json">{not json</script>
        "#;
        let extractor = Extractor::new();
        let ExtractionResult::JsonLd(docs) =
            extractor.extract(html, ExtractKind::JsonLd, None, 10).unwrap()
        else {
            panic!("expected json-ld");
        };
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0]["@type"], "Article");
    }

    #[test]
    fn auto_mode_unions_sources() {
        let html = r#"
            <script type="application/ld+json">{"@type":"Thing"}</script>
            <table><thead><tr><th>H</th></tr></thead><tr><td>v</td></tr></table>
            <ul><li>item</li></ul>
        "#;
        let extractor = Extractor::new();
        let ExtractionResult::Auto {
            json_ld,
            tables,
            lists,
        } = extractor.extract(html, ExtractKind::Auto, None, 10).unwrap()
        else {
            panic!("expected auto");
        };
        assert_eq!(json_ld.len(), 1);
        assert_eq!(tables.len(), 1);
        assert_eq!(lists.len(), 1);
    }
}
