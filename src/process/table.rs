use anyhow::{anyhow, Context, Result};
use csv::{ReaderBuilder, StringRecord, WriterBuilder};
use std::{
    fs::File,
    io::{Read, Write},
    path::Path,
};

/// A whole CSV file held in memory: the header row plus every data row.
///
/// Rows keep every source column so stages can add to them without
/// knowing the full upstream schema.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CsvTable {
    pub headers: StringRecord,
    pub rows: Vec<StringRecord>,
}

impl CsvTable {
    pub fn new(headers: StringRecord) -> Self {
        Self {
            headers,
            rows: Vec::new(),
        }
    }

    pub fn read(path: &Path) -> Result<Self> {
        let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
        Self::from_reader(file).with_context(|| format!("parsing {}", path.display()))
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut rdr = ReaderBuilder::new().has_headers(true).from_reader(reader);
        let headers = rdr.headers().context("reading CSV header")?.clone();
        let rows = rdr
            .records()
            .collect::<std::result::Result<Vec<_>, _>>()
            .context("reading CSV record")?;
        Ok(Self { headers, rows })
    }

    pub fn write(&self, path: &Path) -> Result<()> {
        let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
        self.to_writer(file)
            .with_context(|| format!("writing {}", path.display()))
    }

    pub fn to_writer<W: Write>(&self, writer: W) -> Result<()> {
        let mut wtr = WriterBuilder::new().from_writer(writer);
        wtr.write_record(&self.headers)?;
        for row in &self.rows {
            wtr.write_record(row)?;
        }
        wtr.flush()?;
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Index of the first column named `name`.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// Like [`position`](Self::position) but an absent column is an error.
    pub fn column(&self, name: &str) -> Result<usize> {
        self.position(name).ok_or_else(|| {
            anyhow!(
                "column `{}` not in header [{}]",
                name,
                self.headers.iter().collect::<Vec<_>>().join(", ")
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_read_write_keeps_quoting() {
        let src = "service_request_id,address,status\n\
                   1,\"1234 Market St, Unit 2\",Open\n\
                   2,,Closed\n";
        let table = CsvTable::from_reader(src.as_bytes()).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.column("address").unwrap(), 1);
        assert_eq!(&table.rows[0][1], "1234 Market St, Unit 2");
        assert_eq!(&table.rows[1][1], "");

        let tmp = tempdir().unwrap();
        let path = tmp.path().join("out.csv");
        table.write(&path).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), src);
    }

    #[test]
    fn test_missing_column_is_error() {
        let table = CsvTable::from_reader("a,b\n1,2\n".as_bytes()).unwrap();
        let err = table.column("opa_account_num").unwrap_err();
        assert!(err.to_string().contains("opa_account_num"));
    }

    #[test]
    fn test_header_only() {
        let table = CsvTable::from_reader("a,b\n".as_bytes()).unwrap();
        assert!(table.is_empty());
        assert_eq!(table.headers.len(), 2);
    }
}
