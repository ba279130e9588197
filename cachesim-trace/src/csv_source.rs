//  Copyright 2024 cachesim Project Authors
//
//  Licensed under the Apache License, Version 2.0 (the "License");
//  you may not use this file except in compliance with the License.
//  You may obtain a copy of the License at
//
//  http://www.apache.org/licenses/LICENSE-2.0
//
//  Unless required by applicable law or agreed to in writing, software
//  distributed under the License is distributed on an "AS IS" BASIS,
//  WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
//  See the License for the specific language governing permissions and
//  limitations under the License.

use std::{
    fs::File,
    path::{Path, PathBuf},
};

use cachesim_common::{
    error::{Error, Result},
    request::{Request, Timestamp},
};
use csv::{Reader, ReaderBuilder, StringRecord, Trim};

/// Replays the rows of a csv file, `time, hash, size, maxage[, fetched]`, as requests.
///
/// Exactly `count` requests are issued. The file is reopened when its rows run out, and the timestamps of every
/// replayed pass are shifted by the time span of the file so the replay never goes back in time.
///
/// The optional `fetched` column is validated and ignored: the engine fetches on every miss.
#[derive(Debug)]
pub struct CsvSource {
    path: PathBuf,
    has_headers: bool,
    count: usize,

    reader: Option<Reader<File>>,
    record: StringRecord,
    issued: usize,
    failed: bool,

    /// Rows of the current pass.
    rows: usize,
    /// First and last raw timestamps of the first pass.
    first: Option<Timestamp>,
    last: Timestamp,
    /// Shift applied to the current pass.
    offset: Timestamp,
    passes: usize,
}

impl CsvSource {
    /// Issue `count` requests read from the csv file at `path`.
    ///
    /// Fails if the file cannot be opened.
    pub fn new(path: impl AsRef<Path>, count: usize) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        File::open(&path)?;
        Ok(Self {
            path,
            has_headers: false,
            count,
            reader: None,
            record: StringRecord::new(),
            issued: 0,
            failed: false,
            rows: 0,
            first: None,
            last: 0.0,
            offset: 0.0,
            passes: 0,
        })
    }

    /// Skip the first row of every pass.
    ///
    /// The default value is `false`.
    pub fn with_headers(mut self, has_headers: bool) -> Self {
        self.has_headers = has_headers;
        self
    }

    /// Completed passes over the file.
    pub fn passes(&self) -> usize {
        self.passes
    }

    fn open(&self) -> Result<Reader<File>> {
        let reader = ReaderBuilder::new()
            .has_headers(self.has_headers)
            .flexible(true)
            .trim(Trim::All)
            .from_path(&self.path)?;
        Ok(reader)
    }

    /// Read the next row into `self.record`, wrapping around at the end of the file.
    fn advance(&mut self) -> Result<()> {
        loop {
            let reader = match self.reader.take() {
                Some(reader) => reader,
                None => self.open()?,
            };
            let reader = self.reader.insert(reader);
            if reader.read_record(&mut self.record)? {
                self.rows += 1;
                return Ok(());
            }

            if self.rows == 0 {
                return Err(Error::trace_integrity(format!(
                    "{} contains no request rows",
                    self.path.display()
                )));
            }

            let span = self.last - self.first.unwrap_or(self.last);
            self.offset += span;
            self.passes += 1;
            self.rows = 0;
            self.reader = None;
            tracing::warn!(
                path = %self.path.display(),
                passes = self.passes,
                offset = self.offset,
                "csv trace exhausted, replaying from the start"
            );
        }
    }

    fn parse(&mut self) -> Result<Request<String>> {
        let line = self.record.position().map(|p| p.line()).unwrap_or_default();
        let malformed = |msg: String| Error::trace_integrity(format!("{} line {line}: {msg}", self.path.display()));

        if self.record.len() < 4 {
            return Err(malformed(format!(
                "expected `time, hash, size, maxage[, fetched]`, got {} fields",
                self.record.len()
            )));
        }
        let field = |i: usize| self.record.get(i).unwrap_or_default();

        let time = field(0)
            .parse::<Timestamp>()
            .map_err(|e| malformed(format!("invalid time {:?}: {e}", field(0))))?;
        if !time.is_finite() {
            return Err(malformed(format!("time must be finite, given: {time}")));
        }
        let key = field(1).to_string();
        let size = field(2)
            .parse::<usize>()
            .map_err(|e| malformed(format!("invalid size {:?}: {e}", field(2))))?;
        let max_age = field(3)
            .parse::<i64>()
            .map_err(|e| malformed(format!("invalid maxage {:?}: {e}", field(3))))?;
        match field(4) {
            "" | "true" | "false" | "1" | "0" => {}
            other => return Err(malformed(format!("invalid fetched flag {other:?}"))),
        }

        if self.passes == 0 {
            self.first.get_or_insert(time);
            self.last = time;
        }

        Ok(Request::new(time + self.offset, key, size, max_age))
    }
}

impl Iterator for CsvSource {
    type Item = Result<Request<String>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.issued == self.count {
            return None;
        }
        let res = self.advance().and_then(|_| self.parse());
        match res {
            Ok(_) => self.issued += 1,
            Err(_) => self.failed = true,
        }
        Some(res)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use itertools::Itertools;
    use tempfile::NamedTempFile;

    use super::*;

    fn csv(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test_log::test]
    fn test_read() {
        let file = csv("1.0,a,10,60\n2.0,b,20,0,true\n3.5, c ,30,-1,\n");
        let requests = CsvSource::new(file.path(), 3)
            .unwrap()
            .collect::<Result<Vec<_>>>()
            .unwrap();

        assert_eq!(requests.iter().map(|r| r.key().as_str()).collect_vec(), vec!["a", "b", "c"]);
        assert_eq!(requests.iter().map(|r| r.issued_at()).collect_vec(), vec![1.0, 2.0, 3.5]);

        let fetched = requests.into_iter().map(|r| r.fetch()).collect_vec();
        assert_eq!(fetched.iter().map(|f| f.size()).collect_vec(), vec![10, 20, 30]);
        assert_eq!(fetched.iter().map(|f| f.max_age()).collect_vec(), vec![60, 0, -1]);
        assert!(fetched[0].is_cacheable());
        assert!(!fetched[1].is_cacheable());
    }

    #[test_log::test]
    fn test_headers() {
        let file = csv("time,hash,size,maxage\n1,a,10,60\n");
        let keys = CsvSource::new(file.path(), 2)
            .unwrap()
            .with_headers(true)
            .map(|r| r.unwrap().key().clone())
            .collect_vec();
        assert_eq!(keys, vec!["a", "a"]);
    }

    #[test_log::test]
    fn test_cyclic_replay_stays_monotonic() {
        let file = csv("10,a,1,60\n12,b,1,60\n15,c,1,60\n");
        let mut source = CsvSource::new(file.path(), 8).unwrap();
        let requests = source.by_ref().collect::<Result<Vec<_>>>().unwrap();

        assert_eq!(
            requests.iter().map(|r| r.key().as_str()).collect_vec(),
            vec!["a", "b", "c", "a", "b", "c", "a", "b"]
        );
        assert_eq!(
            requests.iter().map(|r| r.issued_at()).collect_vec(),
            vec![10.0, 12.0, 15.0, 15.0, 17.0, 20.0, 20.0, 22.0]
        );
        assert_eq!(source.passes(), 2);
    }

    #[test_log::test]
    fn test_empty_file() {
        let file = csv("");
        let mut source = CsvSource::new(file.path(), 3).unwrap();
        assert!(matches!(source.next(), Some(Err(Error::TraceIntegrity(_)))));
        assert!(source.next().is_none());

        let file = csv("time,hash,size,maxage\n");
        let mut source = CsvSource::new(file.path(), 3).unwrap().with_headers(true);
        assert!(matches!(source.next(), Some(Err(Error::TraceIntegrity(_)))));
    }

    #[test_log::test]
    fn test_malformed() {
        let cases = ["1,a,10\n", "x,a,10,60\n", "NaN,a,10,60\n", "1,a,-10,60\n", "1,a,10,60,maybe\n"];
        for content in cases {
            let file = csv(content);
            let mut source = CsvSource::new(file.path(), 1).unwrap();
            match source.next() {
                Some(Err(Error::TraceIntegrity(msg))) => assert!(msg.contains("line 1"), "{msg}"),
                other => panic!("{content:?} should be rejected, got: {other:?}"),
            }
        }
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(CsvSource::new("/nonexistent/trace.csv", 1), Err(Error::Io(_))));
    }
}
