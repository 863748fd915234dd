//! Reader for the upstream postal code file.
//!
//! The file has no header and at least nine columns per row; only the zip
//! code, prefecture and the two detail columns are kept. Rows come back in
//! file order, which the merger depends on.

use crate::address::RawRow;
use crate::config::{
    SourceEncoding, SOURCE_DETAIL_1_COLUMN, SOURCE_DETAIL_2_COLUMN, SOURCE_PREFECTURE_COLUMN,
    SOURCE_ZIP_CODE_COLUMN,
};
use crate::error::{EngineError, Result};
use encoding_rs::{SHIFT_JIS, UTF_8};
use std::fs;
use std::path::Path;

/// Read and decode the upstream file at `path`.
pub fn read_source(path: &Path, encoding: SourceEncoding) -> Result<Vec<RawRow>> {
    let bytes = fs::read(path)?;
    let decoder = match encoding {
        SourceEncoding::ShiftJis => SHIFT_JIS,
        SourceEncoding::Utf8 => UTF_8,
    };
    let (text, _, had_errors) = decoder.decode(&bytes);
    if had_errors {
        tracing::warn!(
            "Source {:?} contains bytes invalid in {}; replaced with U+FFFD",
            path,
            encoding
        );
    }
    let rows = parse_source(&text)?;
    tracing::info!("Read {} source rows from {:?}", rows.len(), path);
    Ok(rows)
}

/// Parse already-decoded upstream CSV text.
pub fn parse_source(text: &str) -> Result<Vec<RawRow>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(text.as_bytes());

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        let line = record.position().map(|p| p.line()).unwrap_or_default();
        let field = |column: usize| {
            record.get(column).ok_or_else(|| EngineError::MalformedRow {
                line,
                reason: format!(
                    "expected at least {} columns, found {}",
                    SOURCE_DETAIL_2_COLUMN + 1,
                    record.len()
                ),
            })
        };
        rows.push(RawRow::new(
            field(SOURCE_ZIP_CODE_COLUMN)?,
            field(SOURCE_PREFECTURE_COLUMN)?,
            field(SOURCE_DETAIL_1_COLUMN)?,
            field(SOURCE_DETAIL_2_COLUMN)?,
        ));
    }
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const SAMPLE: &str = "\
01101,\"060  \",\"0600000\",\"ﾎｯｶｲﾄﾞｳ\",\"ｻｯﾎﾟﾛｼﾁｭｳｵｳｸ\",\"ｲｶﾆｹｲｻｲｶﾞﾅｲﾊﾞｱｲ\",\"北海道\",\"札幌市中央区\",\"以下に掲載がない場合\",0,0,0,0,0,0
26105,\"605  \",\"6050874\",\"ｷｮｳﾄﾌ\",\"ｷｮｳﾄｼﾋｶﾞｼﾔﾏｸ\",\"ﾕﾐﾔﾁｮｳ\",\"京都府\",\"京都市東山区\",\"弓矢町（東大路通松原上る、\",0,0,0,0,0,0
26105,\"605  \",\"6050874\",\"ｷｮｳﾄﾌ\",\"ｷｮｳﾄｼﾋｶﾞｼﾔﾏｸ\",\"ﾕﾐﾔﾁｮｳ\",\"京都府\",\"京都市東山区\",\"松原通東大路西入）\",0,0,0,0,0,0
";

    #[test]
    fn test_parse_keeps_order_and_columns() {
        let rows = parse_source(SAMPLE).unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(
            rows[0],
            RawRow::new("0600000", "北海道", "札幌市中央区", "以下に掲載がない場合")
        );
        assert_eq!(rows[2].detail_address2, "松原通東大路西入）");
    }

    #[test]
    fn test_short_row_is_malformed() {
        let err = parse_source("01101,\"060  \",\"0600000\"\n").unwrap_err();
        match err {
            EngineError::MalformedRow { line, .. } => assert_eq!(line, 1),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_read_shift_jis() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("KEN_ALL.CSV");
        let (encoded, _, _) = SHIFT_JIS.encode(SAMPLE);
        fs::write(&path, &encoded).unwrap();

        let rows = read_source(&path, SourceEncoding::ShiftJis).unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[1].detail_address2, "弓矢町（東大路通松原上る、");
    }

    #[test]
    fn test_read_utf8() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("KEN_ALL.CSV");
        fs::write(&path, SAMPLE).unwrap();
        let rows = read_source(&path, SourceEncoding::Utf8).unwrap();
        assert_eq!(rows[0].prefecture, "北海道");
    }

    #[test]
    fn test_missing_source_is_io_error() {
        let dir = TempDir::new().unwrap();
        let err = read_source(&dir.path().join("absent.csv"), SourceEncoding::Utf8).unwrap_err();
        assert!(matches!(err, EngineError::Io(_)));
    }
}
