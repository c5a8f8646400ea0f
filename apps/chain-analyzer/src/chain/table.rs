//! Tabular section of the export: wide call/put layout to long records.
//!
//! The vendor table is wide: a block of call columns, a shared `Strike`
//! column, then a block of put columns with mirrored names (optionally
//! suffixed `.1` to disambiguate duplicates). The split is driven by locating
//! the `Strike` pivot and mapping each block onto [`Column`].

use std::collections::BTreeMap;

use csv::{ReaderBuilder, Trim};

use super::ChainError;
use super::types::OptionType;

/// Leading token of the table header row.
pub const HEADER_TOKEN: &str = "Expiration Date";

/// Name of the pivot column shared by both sides.
pub const STRIKE_COLUMN: &str = "Strike";

/// Canonical per-side columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Column {
    /// Contract symbol (`Calls` / `Puts`).
    Symbol,
    /// Last sale price.
    Last,
    /// Net change.
    Net,
    /// Bid price.
    Bid,
    /// Ask price.
    Ask,
    /// Volume.
    Vol,
    /// Open interest.
    Oi,
    /// Implied volatility.
    Iv,
    /// Delta.
    Delta,
    /// Gamma.
    Gamma,
    /// Expiration date.
    ExpirationDate,
}

impl Column {
    /// Columns every side must provide.
    pub const REQUIRED: [Self; 10] = [
        Self::Symbol,
        Self::Last,
        Self::Net,
        Self::Bid,
        Self::Ask,
        Self::Vol,
        Self::Oi,
        Self::Iv,
        Self::Delta,
        Self::Gamma,
    ];

    /// Map a vendor header (already normalized) onto a canonical column.
    #[must_use]
    pub fn from_vendor(name: &str, side: OptionType) -> Option<Self> {
        match name {
            "Calls" if side == OptionType::Call => Some(Self::Symbol),
            "Puts" if side == OptionType::Put => Some(Self::Symbol),
            "Last Sale" | "Last" => Some(Self::Last),
            "Net" => Some(Self::Net),
            "Bid" => Some(Self::Bid),
            "Ask" => Some(Self::Ask),
            "Volume" | "Vol" => Some(Self::Vol),
            "Open Interest" | "OI" => Some(Self::Oi),
            "IV" => Some(Self::Iv),
            "Delta" => Some(Self::Delta),
            "Gamma" => Some(Self::Gamma),
            HEADER_TOKEN => Some(Self::ExpirationDate),
            _ => None,
        }
    }

    /// Canonical column name.
    #[must_use]
    pub const fn canonical_name(self) -> &'static str {
        match self {
            Self::Symbol => "Symbol",
            Self::Last => "Last",
            Self::Net => "Net",
            Self::Bid => "Bid",
            Self::Ask => "Ask",
            Self::Vol => "Vol",
            Self::Oi => "OI",
            Self::Iv => "IV",
            Self::Delta => "Delta",
            Self::Gamma => "Gamma",
            Self::ExpirationDate => HEADER_TOKEN,
        }
    }
}

/// Delimited table read from the header row onward.
#[derive(Debug, Clone, Default)]
pub struct RawTable {
    /// Header names, whitespace-stripped.
    pub headers: Vec<String>,
    /// Data rows (fully empty rows removed).
    pub rows: Vec<Vec<String>>,
}

/// Column positions for one side of the table.
#[derive(Debug, Clone)]
pub struct SideSchema {
    /// Side these columns describe.
    pub option_type: OptionType,
    columns: BTreeMap<Column, usize>,
    extras: Vec<(String, usize)>,
}

impl SideSchema {
    fn build(option_type: OptionType, headers: &[String], range: std::ops::Range<usize>) -> Self {
        let mut columns = BTreeMap::new();
        let mut extras = Vec::new();
        for idx in range {
            let name = normalize_header(&headers[idx]);
            match Column::from_vendor(&name, option_type) {
                Some(col) => {
                    columns.entry(col).or_insert(idx);
                }
                None => extras.push((name, idx)),
            }
        }
        Self {
            option_type,
            columns,
            extras,
        }
    }

    /// Index of a canonical column.
    #[must_use]
    pub fn index(&self, column: Column) -> Option<usize> {
        self.columns.get(&column).copied()
    }

    /// Unrecognized columns on this side, by name.
    #[must_use]
    pub fn extras(&self) -> &[(String, usize)] {
        &self.extras
    }

    fn require(&self, column: Column) -> Result<(), ChainError> {
        if self.columns.contains_key(&column) {
            Ok(())
        } else {
            Err(ChainError::MissingColumn {
                side: self.option_type,
                column: column.canonical_name(),
            })
        }
    }
}

/// Located pivot plus both side schemas.
#[derive(Debug, Clone)]
pub struct TableSchema {
    /// Index of the shared `Strike` column.
    pub strike_index: usize,
    /// Index of the shared `Expiration Date` column.
    pub expiration_index: usize,
    /// Call-side columns (left of the pivot).
    pub calls: SideSchema,
    /// Put-side columns (right of the pivot).
    pub puts: SideSchema,
}

impl TableSchema {
    /// Locate the pivot and map both blocks onto the canonical schema.
    ///
    /// # Errors
    ///
    /// Returns `StrikeColumnMissing` when no `Strike` header exists and
    /// `MissingColumn` when either side lacks a required column.
    pub fn locate(headers: &[String]) -> Result<Self, ChainError> {
        let strike_index = headers
            .iter()
            .position(|h| normalize_header(h) == STRIKE_COLUMN)
            .ok_or(ChainError::StrikeColumnMissing)?;

        let expiration_index = headers
            .iter()
            .position(|h| normalize_header(h) == HEADER_TOKEN)
            .ok_or(ChainError::MissingColumn {
                side: OptionType::Call,
                column: HEADER_TOKEN,
            })?;

        let calls = SideSchema::build(OptionType::Call, headers, 0..strike_index);
        let puts = SideSchema::build(OptionType::Put, headers, strike_index + 1..headers.len());

        for side in [&calls, &puts] {
            for column in Column::REQUIRED {
                side.require(column)?;
            }
        }

        Ok(Self {
            strike_index,
            expiration_index,
            calls,
            puts,
        })
    }

    /// Reshape wide rows into one [`RawContract`] per side per row.
    #[must_use]
    pub fn split(&self, rows: &[Vec<String>]) -> Vec<RawContract> {
        let mut out = Vec::with_capacity(rows.len() * 2);
        for row in rows {
            let strike = coerce_number(cell(row, Some(self.strike_index)));
            for side in [&self.calls, &self.puts] {
                let expiration = side
                    .index(Column::ExpirationDate)
                    .map_or_else(|| cell(row, Some(self.expiration_index)), |i| cell(row, Some(i)));
                let value = |col: Column| coerce_number(cell(row, side.index(col)));
                out.push(RawContract {
                    option_type: side.option_type,
                    symbol: cell(row, side.index(Column::Symbol)).to_string(),
                    strike,
                    expiration: expiration.to_string(),
                    last: value(Column::Last),
                    net: value(Column::Net),
                    bid: value(Column::Bid),
                    ask: value(Column::Ask),
                    volume: value(Column::Vol),
                    open_interest: value(Column::Oi),
                    implied_volatility: value(Column::Iv),
                    delta: value(Column::Delta),
                    gamma: value(Column::Gamma),
                    extra: side
                        .extras()
                        .iter()
                        .map(|(name, idx)| (name.clone(), cell(row, Some(*idx)).to_string()))
                        .collect(),
                });
            }
        }
        out
    }

    /// Every parseable value in the `Strike` column, in row order.
    #[must_use]
    pub fn strikes(&self, rows: &[Vec<String>]) -> Vec<f64> {
        rows.iter()
            .filter_map(|row| parse_number(cell(row, Some(self.strike_index))))
            .collect()
    }
}

/// One side of one table row after renaming and numeric coercion.
#[derive(Debug, Clone, PartialEq)]
pub struct RawContract {
    /// Side tag.
    pub option_type: OptionType,
    /// Vendor symbol.
    pub symbol: String,
    /// Strike price.
    pub strike: f64,
    /// Unparsed expiration text.
    pub expiration: String,
    /// Last sale.
    pub last: f64,
    /// Net change.
    pub net: f64,
    /// Bid.
    pub bid: f64,
    /// Ask.
    pub ask: f64,
    /// Volume.
    pub volume: f64,
    /// Open interest.
    pub open_interest: f64,
    /// Implied volatility.
    pub implied_volatility: f64,
    /// Delta.
    pub delta: f64,
    /// Gamma.
    pub gamma: f64,
    /// Passthrough columns.
    pub extra: BTreeMap<String, String>,
}

/// Index of the first line whose leading token is `Expiration Date`.
#[must_use]
pub fn find_header_row(lines: &[&str]) -> Option<usize> {
    lines
        .iter()
        .position(|line| line.trim().starts_with(HEADER_TOKEN))
}

/// Read the delimited table starting at the header row.
///
/// # Errors
///
/// Returns a `Csv` error when the text cannot be tokenized.
pub fn read_table(text: &str) -> Result<RawTable, ChainError> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(text.as_bytes());

    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        if record.iter().all(|field| field.trim().is_empty()) {
            continue;
        }
        rows.push(record.iter().map(str::to_string).collect());
    }

    Ok(RawTable { headers, rows })
}

/// Trim a header and drop a trailing `.N` duplicate suffix.
#[must_use]
pub fn normalize_header(raw: &str) -> String {
    let trimmed = raw.trim();
    if let Some((stem, suffix)) = trimmed.rsplit_once('.') {
        if !suffix.is_empty() && suffix.chars().all(|c| c.is_ascii_digit()) {
            return stem.trim().to_string();
        }
    }
    trimmed.to_string()
}

/// Parse a numeric cell with thousands separators; `None` if not a number.
#[must_use]
pub fn parse_number(raw: &str) -> Option<f64> {
    let cleaned: String = raw.trim().chars().filter(|c| *c != ',').collect();
    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Parse a numeric cell, coercing anything unparseable to 0.
#[must_use]
pub fn coerce_number(raw: &str) -> f64 {
    parse_number(raw).unwrap_or(0.0)
}

fn cell(row: &[String], index: Option<usize>) -> &str {
    index.and_then(|i| row.get(i)).map_or("", String::as_str)
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "Expiration Date,Calls,Last Sale,Net,Bid,Ask,Volume,IV,Delta,Gamma,Open Interest,Strike,Puts,Last Sale,Net,Bid,Ask,Volume,IV,Delta,Gamma,Open Interest";

    fn headers(line: &str) -> Vec<String> {
        line.split(',').map(str::to_string).collect()
    }

    #[test]
    fn test_find_header_row() {
        let lines = ["SPX,Last: 1", "", "  Expiration Date,Calls", "x"];
        assert_eq!(find_header_row(&lines), Some(2));
        assert_eq!(find_header_row(&["a", "b"]), None);
    }

    #[test]
    fn test_normalize_header() {
        assert_eq!(normalize_header(" Bid.1 "), "Bid");
        assert_eq!(normalize_header("Open Interest"), "Open Interest");
        assert_eq!(normalize_header("Last Sale.12"), "Last Sale");
        assert_eq!(normalize_header("v1.x"), "v1.x");
    }

    #[test]
    fn test_numbers() {
        assert_eq!(parse_number("1,234.5"), Some(1234.5));
        assert_eq!(parse_number(" 42 "), Some(42.0));
        assert_eq!(parse_number("--"), None);
        assert_eq!(coerce_number("n/a"), 0.0);
        assert_eq!(coerce_number(""), 0.0);
    }

    #[test]
    fn test_locate_schema() {
        let schema = TableSchema::locate(&headers(HEADER)).unwrap();
        assert_eq!(schema.strike_index, 11);
        assert_eq!(schema.expiration_index, 0);
        assert_eq!(schema.calls.index(Column::Oi), Some(10));
        assert_eq!(schema.puts.index(Column::Oi), Some(21));
        assert_eq!(schema.puts.index(Column::Symbol), Some(12));
    }

    #[test]
    fn test_locate_with_suffixed_duplicates() {
        let line = HEADER.replacen("Open Interest,Strike,Puts,Last Sale", "Open Interest,Strike,Puts,Last Sale.1", 1);
        let schema = TableSchema::locate(&headers(&line)).unwrap();
        assert_eq!(schema.puts.index(Column::Last), Some(13));
    }

    #[test]
    fn test_missing_strike() {
        let line = HEADER.replace("Strike", "Exercise");
        let err = TableSchema::locate(&headers(&line)).unwrap_err();
        assert!(matches!(err, ChainError::StrikeColumnMissing));
    }

    #[test]
    fn test_missing_put_column() {
        let line = HEADER.trim_end_matches(",Open Interest");
        let err = TableSchema::locate(&headers(line)).unwrap_err();
        assert!(matches!(
            err,
            ChainError::MissingColumn {
                side: OptionType::Put,
                column: "OI"
            }
        ));
    }

    #[test]
    fn test_unknown_columns_pass_through() {
        let line = format!("{HEADER},Theta");
        let schema = TableSchema::locate(&headers(&line)).unwrap();
        assert_eq!(schema.puts.extras(), &[("Theta".to_string(), 22)]);

        let row: Vec<String> = "Fri Oct 17 2025,C1,1,0,1,1,5,0.2,0.5,0.01,10,100,P1,1,0,1,1,6,0.2,-0.5,0.01,20,-0.03"
            .split(',')
            .map(str::to_string)
            .collect();
        let contracts = schema.split(&[row]);
        assert_eq!(contracts.len(), 2);
        assert!(contracts[0].extra.is_empty());
        assert_eq!(contracts[1].extra.get("Theta").map(String::as_str), Some("-0.03"));
    }

    #[test]
    fn test_split_tags_sides() {
        let schema = TableSchema::locate(&headers(HEADER)).unwrap();
        let row: Vec<String> = "Fri Oct 17 2025,SPXW C,12.5,1,12,13,150,0.18,0.52,0.004,1200,5800,SPXW P,9.5,-1,9,10,300,0.21,-0.48,0.005,2400"
            .split(',')
            .map(str::to_string)
            .collect();
        let contracts = schema.split(&[row]);

        let call = &contracts[0];
        assert_eq!(call.option_type, OptionType::Call);
        assert_eq!(call.symbol, "SPXW C");
        assert_eq!(call.strike, 5800.0);
        assert_eq!(call.open_interest, 1200.0);
        assert_eq!(call.expiration, "Fri Oct 17 2025");

        let put = &contracts[1];
        assert_eq!(put.option_type, OptionType::Put);
        assert_eq!(put.volume, 300.0);
        assert_eq!(put.open_interest, 2400.0);
        assert_eq!(put.delta, -0.48);
        assert_eq!(put.expiration, "Fri Oct 17 2025");
    }

    #[test]
    fn test_read_table_quoted_thousands() {
        let text = format!(
            "{HEADER}\n\"Fri Oct 17 2025\",C,1,0,1,1,\"1,500\",0.2,0.5,0.01,\"12,000\",\"5,800\",P,1,0,1,1,5,0.2,-0.5,0.01,7\n,,,\n"
        );
        let table = read_table(&text).unwrap();
        assert_eq!(table.rows.len(), 1);
        let schema = TableSchema::locate(&table.headers).unwrap();
        let contracts = schema.split(&table.rows);
        assert_eq!(contracts[0].volume, 1500.0);
        assert_eq!(contracts[0].open_interest, 12000.0);
        assert_eq!(contracts[0].strike, 5800.0);
        assert_eq!(schema.strikes(&table.rows), vec![5800.0]);
    }
}
