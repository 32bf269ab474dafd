// 📥 Ingestion - Raw files/records → cleaned Dataset
//
// Owns everything the detectors refuse to do: column auto-mapping from header
// names, date/amount parsing, and excluding rows that fail to parse.

use crate::dataset::{Dataset, Transaction};
use crate::error::{AnalysisError, Result};
use crate::format::CURRENCY_SYMBOLS;
use anyhow::Context as AnyhowContext;
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde_json::Value;
use std::collections::HashSet;
use std::io::Read;
use std::path::Path;

/// Column that, when present, supplies transaction ids
pub const ID_COLUMN: &str = "transaction_id";

const DATE_PATTERNS: &[&str] = &["date"];
const AMOUNT_PATTERNS: &[&str] = &["amount", "amt", "sum", "total"];
const VENDOR_PATTERNS: &[&str] = &["vendor", "payee", "merchant", "supplier"];

// ============================================================================
// RAW TABLE
// ============================================================================

/// Untyped grid of cells as read from a file or request body
#[derive(Debug, Clone, PartialEq)]
pub struct RawTable {
    pub source: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl RawTable {
    pub fn from_csv_path(path: &Path) -> anyhow::Result<Self> {
        let file = std::fs::File::open(path)
            .with_context(|| format!("Failed to open CSV file: {:?}", path))?;

        let mut table = Self::from_reader(file)
            .with_context(|| format!("Failed to read CSV file: {:?}", path))?;
        table.source = path.display().to_string();

        log::info!("Loaded {} rows from {}", table.rows.len(), table.source);
        Ok(table)
    }

    pub fn from_reader<R: Read>(reader: R) -> anyhow::Result<Self> {
        let mut rdr = csv::ReaderBuilder::new()
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers: Vec<String> = rdr
            .headers()
            .context("Failed to read CSV headers")?
            .iter()
            .map(|h| h.to_string())
            .collect();

        let mut rows = Vec::new();
        for result in rdr.records() {
            let record = result.context("Failed to read CSV record")?;
            rows.push(record.iter().map(|c| c.to_string()).collect());
        }

        Ok(RawTable {
            source: "<csv>".to_string(),
            headers,
            rows,
        })
    }

    /// Records with arbitrary field names, e.g. a JSON request body.
    ///
    /// Headers are the union of keys in first-seen order; missing/null → "".
    pub fn from_json_records(records: &[Value]) -> Result<Self> {
        let mut headers: Vec<String> = Vec::new();

        for (i, record) in records.iter().enumerate() {
            let object = record.as_object().ok_or_else(|| {
                AnalysisError::InvalidInput(format!("record {} is not an object", i + 1))
            })?;
            for key in object.keys() {
                if !headers.iter().any(|h| h == key) {
                    headers.push(key.clone());
                }
            }
        }

        let rows = records
            .iter()
            .filter_map(|record| record.as_object())
            .map(|object| {
                headers
                    .iter()
                    .map(|h| object.get(h).map(cell_text).unwrap_or_default())
                    .collect()
            })
            .collect();

        Ok(RawTable {
            source: "<request>".to_string(),
            headers,
            rows,
        })
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    fn cell(&self, row: &[String], column: usize) -> String {
        row.get(column).cloned().unwrap_or_default()
    }

    /// Parse every row with `mapping`, dropping rows whose date or amount fail.
    pub fn to_dataset(&self, mapping: &ColumnMapping) -> Result<IngestOutcome> {
        mapping.check_bounds(self.headers.len())?;

        let id_column = self.column_index(ID_COLUMN);
        let mut transactions = Vec::with_capacity(self.rows.len());
        let mut seen_ids = HashSet::with_capacity(self.rows.len());
        let mut excluded_bad_date = 0;
        let mut excluded_bad_amount = 0;
        let mut renamed_ids = 0;

        for (i, row) in self.rows.iter().enumerate() {
            let Some(date) = parse_date(&self.cell(row, mapping.date)) else {
                excluded_bad_date += 1;
                continue;
            };
            let Some(amount) = parse_amount(&self.cell(row, mapping.amount)) else {
                excluded_bad_amount += 1;
                continue;
            };

            let vendor = mapping
                .vendor
                .map(|c| self.cell(row, c))
                .unwrap_or_default();

            let id = id_column
                .map(|c| self.cell(row, c))
                .filter(|id| !id.is_empty())
                .unwrap_or_else(|| Transaction::synthetic_id(i + 1));
            let (id, renamed) = unique_id(id, &mut seen_ids);
            if renamed {
                renamed_ids += 1;
            }

            transactions.push(Transaction::new(id, date, amount, vendor));
        }

        if excluded_bad_date + excluded_bad_amount > 0 {
            log::warn!(
                "Excluded {} rows with unparseable dates and {} with unparseable amounts",
                excluded_bad_date,
                excluded_bad_amount
            );
        }

        if renamed_ids > 0 {
            log::warn!("Renamed {} repeated transaction ids", renamed_ids);
        }

        if transactions.is_empty() {
            return Err(AnalysisError::InvalidInput(
                "No valid data after parsing".to_string(),
            ));
        }

        Ok(IngestOutcome {
            dataset: Dataset::new(transactions)?,
            excluded_bad_date,
            excluded_bad_amount,
            renamed_ids,
        })
    }
}

/// Repeated source ids get a `#2`, `#3`, ... suffix; the rows themselves are kept
fn unique_id(id: String, seen: &mut HashSet<String>) -> (String, bool) {
    if seen.insert(id.clone()) {
        return (id, false);
    }

    let mut occurrence = 2;
    loop {
        let candidate = format!("{}#{}", id, occurrence);
        if seen.insert(candidate.clone()) {
            return (candidate, true);
        }
        occurrence += 1;
    }
}

fn cell_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.trim().to_string(),
        other => other.to_string(),
    }
}

// ============================================================================
// COLUMN MAPPING
// ============================================================================

/// Best-effort guess from header names; None where nothing matched
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AutoMapping {
    pub date: Option<usize>,
    pub amount: Option<usize>,
    pub vendor: Option<usize>,
}

/// Each header claims at most one slot, checked in date → amount → vendor order.
pub fn detect_columns<S: AsRef<str>>(headers: &[S]) -> AutoMapping {
    let mut mapping = AutoMapping::default();

    for (i, header) in headers.iter().enumerate() {
        let lower = header.as_ref().to_lowercase();
        let matches = |patterns: &[&str]| patterns.iter().any(|p| lower.contains(p));

        if matches(DATE_PATTERNS) && mapping.date.is_none() {
            mapping.date = Some(i);
        } else if matches(AMOUNT_PATTERNS) && mapping.amount.is_none() {
            mapping.amount = Some(i);
        } else if matches(VENDOR_PATTERNS) && mapping.vendor.is_none() {
            mapping.vendor = Some(i);
        }
    }

    mapping
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnMapping {
    pub date: usize,
    pub amount: usize,
    pub vendor: Option<usize>,
}

impl ColumnMapping {
    /// Fill unmatched slots with positional fallbacks (0, 1, 2) so the
    /// operator always starts from a complete mapping.
    pub fn for_dashboard(auto: AutoMapping, column_count: usize) -> Self {
        let fallback = |position: usize| if position < column_count { position } else { 0 };

        ColumnMapping {
            date: auto.date.unwrap_or(0),
            amount: auto.amount.unwrap_or_else(|| fallback(1)),
            vendor: Some(auto.vendor.unwrap_or_else(|| fallback(2))),
        }
    }

    /// Date and amount must be recognizable; vendor may be absent
    pub fn strict(auto: AutoMapping) -> Result<Self> {
        match (auto.date, auto.amount) {
            (Some(date), Some(amount)) => Ok(ColumnMapping {
                date,
                amount,
                vendor: auto.vendor,
            }),
            _ => Err(AnalysisError::InvalidInput(
                "missing required fields: could not find a date and an amount column".to_string(),
            )),
        }
    }

    /// Replace slots with columns the operator named explicitly
    pub fn with_overrides<S: AsRef<str>>(
        mut self,
        headers: &[S],
        date: Option<&str>,
        amount: Option<&str>,
        vendor: Option<&str>,
    ) -> Result<Self> {
        let find = |name: &str| {
            headers
                .iter()
                .position(|h| h.as_ref() == name)
                .ok_or_else(|| AnalysisError::InvalidInput(format!("unknown column: {}", name)))
        };

        if let Some(name) = date {
            self.date = find(name)?;
        }
        if let Some(name) = amount {
            self.amount = find(name)?;
        }
        if let Some(name) = vendor {
            self.vendor = Some(find(name)?);
        }

        Ok(self)
    }

    fn check_bounds(&self, column_count: usize) -> Result<()> {
        let columns = [Some(self.date), Some(self.amount), self.vendor];
        if column_count == 0 || columns.iter().flatten().any(|c| *c >= column_count) {
            return Err(AnalysisError::InvalidInput(format!(
                "column mapping does not fit a table with {} columns",
                column_count
            )));
        }
        Ok(())
    }
}

// ============================================================================
// INGEST OUTCOME
// ============================================================================

#[derive(Debug, Clone)]
pub struct IngestOutcome {
    pub dataset: Dataset,
    pub excluded_bad_date: usize,
    pub excluded_bad_amount: usize,
    /// Rows whose source id was already taken
    pub renamed_ids: usize,
}

impl IngestOutcome {
    pub fn excluded(&self) -> usize {
        self.excluded_bad_date + self.excluded_bad_amount
    }

    /// Operator-facing messages about dropped rows
    pub fn warnings(&self, mapping: &ColumnMapping, headers: &[String]) -> Vec<String> {
        let name = |c: usize| headers.get(c).map(String::as_str).unwrap_or("?");
        let mut warnings = Vec::new();

        if self.excluded_bad_date > 0 {
            warnings.push(format!(
                "{} values in {} could not be parsed as dates",
                self.excluded_bad_date,
                name(mapping.date)
            ));
        }
        if self.excluded_bad_amount > 0 {
            warnings.push(format!(
                "{} non-numeric values found in {}",
                self.excluded_bad_amount,
                name(mapping.amount)
            ));
        }
        if self.renamed_ids > 0 {
            warnings.push(format!(
                "{} repeated values in {} were made unique",
                self.renamed_ids, ID_COLUMN
            ));
        }

        warnings
    }
}

// ============================================================================
// VALUE PARSING
// ============================================================================

/// Parse a calendar date; datetimes are truncated to their date
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }

    for format in ["%Y-%m-%d", "%m/%d/%Y", "%Y/%m/%d", "%d.%m.%Y"] {
        if let Ok(date) = NaiveDate::parse_from_str(s, format) {
            return Some(date);
        }
    }

    for format in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S%.f"] {
        if let Ok(datetime) = NaiveDateTime::parse_from_str(s, format) {
            return Some(datetime.date());
        }
    }

    DateTime::parse_from_rfc3339(s).ok().map(|dt| dt.date_naive())
}

/// Parse an amount.
///
/// Tolerates one currency symbol before or after the number and `,` between
/// three-digit groups of the integer part. Anything else (`1,5`, `1.234,56`,
/// `12$34`) is unparseable, as are NaN and inf.
pub fn parse_amount(raw: &str) -> Option<f64> {
    let s = raw.trim();
    let (mut negative, body) = match s.strip_prefix('-') {
        Some(rest) => (true, rest.trim_start()),
        None => (false, s),
    };

    let body = strip_currency_symbol(body).trim();
    let body = match body.strip_prefix('-') {
        Some(rest) if !negative => {
            negative = true;
            rest
        }
        _ => body,
    };

    if body.is_empty() || body.starts_with(['+', '-']) {
        return None;
    }

    let digits = if body.contains(',') {
        ungroup_thousands(body)?
    } else {
        body.to_string()
    };

    let value = digits.parse::<f64>().ok().filter(|v| v.is_finite())?;
    Some(if negative { -value } else { value })
}

fn strip_currency_symbol(s: &str) -> &str {
    for symbol in CURRENCY_SYMBOLS {
        if let Some(rest) = s.strip_prefix(symbol) {
            return rest;
        }
        if let Some(rest) = s.strip_suffix(symbol) {
            return rest;
        }
    }
    s
}

/// `1,234,567.89` → `1234567.89`; None unless every group after the first has 3 digits
fn ungroup_thousands(s: &str) -> Option<String> {
    let (integer, fraction) = match s.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (s, None),
    };

    let mut groups = integer.split(',');
    let first = groups.next()?;
    let all_digits = |g: &str| g.bytes().all(|b| b.is_ascii_digit());
    if first.is_empty() || first.len() > 3 || !all_digits(first) {
        return None;
    }

    let mut out = first.to_string();
    for group in groups {
        if group.len() != 3 || !all_digits(group) {
            return None;
        }
        out.push_str(group);
    }

    if let Some(fraction) = fraction {
        if fraction.is_empty() || !all_digits(fraction) {
            return None;
        }
        out.push('.');
        out.push_str(fraction);
    }

    Some(out)
}

// ============================================================================
// TESTS
// ============================================================================
