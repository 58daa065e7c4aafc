use std::fmt;

use insight_model::{CellValue, InferredTable};
use regex::Regex;
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

/// Semantic role of a column, used to decide what can be charted and how.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnRole {
    Id,
    Date,
    Metric,
    Category,
    Text,
}

impl ColumnRole {
    pub fn as_str(self) -> &'static str {
        match self {
            ColumnRole::Id => "id",
            ColumnRole::Date => "date",
            ColumnRole::Metric => "metric",
            ColumnRole::Category => "category",
            ColumnRole::Text => "text",
        }
    }
}

impl fmt::Display for ColumnRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Thresholds and patterns for [`infer_column_roles_with`].
///
/// Deserializes from plain strings/numbers; patterns are compiled (and validated) at load.
#[derive(Clone, Debug, Deserialize)]
#[serde(try_from = "RawRoleOptions")]
pub struct RoleOptions {
    /// Strings matching this are counted as dates. Unanchored, so `2024-01-31 09:00` matches.
    pub date_pattern: Regex,
    /// Header names matching this are forced to [`ColumnRole::Id`].
    pub id_pattern: Regex,
    pub date_ratio: f64,
    pub metric_ratio: f64,
    pub category_ratio: f64,
}

pub const DEFAULT_DATE_PATTERN: &str = r"\d{4}-\d{2}-\d{2}";
pub const DEFAULT_ID_PATTERN: &str = r"(?i)^(id|.*_id|customerid)$";

impl RoleOptions {
    pub fn new(date_pattern: &str, id_pattern: &str) -> Result<Self, regex::Error> {
        Ok(Self {
            date_pattern: Regex::new(date_pattern)?,
            id_pattern: Regex::new(id_pattern)?,
            date_ratio: 0.5,
            metric_ratio: 0.7,
            category_ratio: 0.7,
        })
    }
}

impl Default for RoleOptions {
    fn default() -> Self {
        Self {
            date_pattern: Regex::new(DEFAULT_DATE_PATTERN).expect("default date pattern is valid"),
            id_pattern: Regex::new(DEFAULT_ID_PATTERN).expect("default id pattern is valid"),
            date_ratio: 0.5,
            metric_ratio: 0.7,
            category_ratio: 0.7,
        }
    }
}

#[derive(Deserialize)]
#[serde(default)]
struct RawRoleOptions {
    date_pattern: String,
    id_pattern: String,
    date_ratio: f64,
    metric_ratio: f64,
    category_ratio: f64,
}

impl Default for RawRoleOptions {
    fn default() -> Self {
        Self {
            date_pattern: DEFAULT_DATE_PATTERN.to_string(),
            id_pattern: DEFAULT_ID_PATTERN.to_string(),
            date_ratio: 0.5,
            metric_ratio: 0.7,
            category_ratio: 0.7,
        }
    }
}

impl TryFrom<RawRoleOptions> for RoleOptions {
    type Error = regex::Error;

    fn try_from(raw: RawRoleOptions) -> Result<Self, Self::Error> {
        Ok(Self {
            date_ratio: raw.date_ratio,
            metric_ratio: raw.metric_ratio,
            category_ratio: raw.category_ratio,
            ..RoleOptions::new(&raw.date_pattern, &raw.id_pattern)?
        })
    }
}

/// Column roles in header order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ColumnRoles {
    entries: Vec<(String, ColumnRole)>,
}

impl ColumnRoles {
    pub fn get(&self, header: &str) -> Option<ColumnRole> {
        self.entries
            .iter()
            .find(|(name, _)| name == header)
            .map(|(_, role)| *role)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, ColumnRole)> + '_ {
        self.entries.iter().map(|(name, role)| (name.as_str(), *role))
    }

    /// Headers with the given role, in header order.
    pub fn columns_with(&self, role: ColumnRole) -> impl Iterator<Item = &str> + '_ {
        self.iter()
            .filter(move |(_, r)| *r == role)
            .map(|(name, _)| name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Serialize for ColumnRoles {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, role) in &self.entries {
            map.serialize_entry(name, role)?;
        }
        map.end()
    }
}

pub fn infer_column_roles(table: &InferredTable) -> ColumnRoles {
    infer_column_roles_with(table, &RoleOptions::default())
}

/// Label every column of `table` as id, date, metric, category, or text.
///
/// Value rules run in order (date, metric, category) over the column's non-empty cells;
/// a header matching the id pattern overrides whatever the values say.
pub fn infer_column_roles_with(table: &InferredTable, options: &RoleOptions) -> ColumnRoles {
    let entries = table
        .headers
        .iter()
        .enumerate()
        .map(|(idx, header)| {
            let role = if options.id_pattern.is_match(header) {
                ColumnRole::Id
            } else {
                classify_values(table.column(idx), options)
            };
            (header.clone(), role)
        })
        .collect();
    ColumnRoles { entries }
}

fn classify_values<'a>(
    values: impl Iterator<Item = &'a CellValue>,
    options: &RoleOptions,
) -> ColumnRole {
    let mut total = 0usize;
    let mut dates = 0usize;
    let mut numbers = 0usize;
    let mut strings = 0usize;

    for value in values.filter(|v| !v.is_empty()) {
        total += 1;
        match value {
            CellValue::Date(_) => {
                dates += 1;
                strings += 1;
            }
            CellValue::String(s) => {
                strings += 1;
                if options.date_pattern.is_match(s) {
                    dates += 1;
                }
            }
            CellValue::Number(_) => numbers += 1,
            CellValue::Boolean(_) | CellValue::Empty => {}
        }
    }

    if total == 0 {
        return ColumnRole::Text;
    }

    let n = total as f64;
    if dates as f64 >= options.date_ratio * n {
        ColumnRole::Date
    } else if numbers as f64 >= options.metric_ratio * n {
        ColumnRole::Metric
    } else if strings as f64 >= options.category_ratio * n {
        ColumnRole::Category
    } else {
        ColumnRole::Text
    }
}
