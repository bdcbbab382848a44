//! Tuition fee tables: a small spreadsheet per program.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::lenient;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct FeeTable {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Program abbreviation the table belongs to.
    #[serde(default, deserialize_with = "lenient::string")]
    pub program: String,
    /// Grouping shown as a tab, e.g. "undergraduate".
    #[serde(rename = "type", default, deserialize_with = "lenient::string")]
    pub kind: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub title: String,
    #[serde(default, deserialize_with = "lenient::string_list")]
    pub headers: Vec<String>,
    #[serde(default, deserialize_with = "lenient::string_rows")]
    pub rows: Vec<Vec<String>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl FeeTable {
    /// Cell lookup by row index and header name.
    pub fn cell(&self, row: usize, header: &str) -> Option<&str> {
        let col = self.headers.iter().position(|h| h == header)?;
        self.rows.get(row)?.get(col).map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_cell_lookup() {
        let table = FeeTable {
            program: "BBA".to_string(),
            title: "BBA fees".to_string(),
            headers: vec!["Item".to_string(), "Amount".to_string()],
            rows: vec![vec!["Admission".to_string(), "15000".to_string()]],
            ..Default::default()
        };
        assert_eq!(table.cell(0, "Amount"), Some("15000"));
        assert_eq!(table.cell(0, "Discount"), None);
        assert_eq!(table.cell(3, "Item"), None);
    }

    #[test]
    fn test_numeric_cells_read_as_text() {
        let table: FeeTable = serde_json::from_value(json!({
            "program": "BBA",
            "title": "BBA fees",
            "headers": ["Item", "Amount"],
            "rows": [["Admission", 15000], ["Tuition", 4500.5]]
        }))
        .unwrap();
        assert_eq!(table.cell(0, "Amount"), Some("15000"));
        assert_eq!(table.cell(1, "Amount"), Some("4500.5"));
    }
}
