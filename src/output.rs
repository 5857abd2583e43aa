use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use workerbridge::host::{OutputRecord, OutputSink};

/// Prints records as JSON lines on stdout and writes binary slots to disk.
///
/// Progress records go to stderr so stdout only carries final records.
pub struct JsonLinesSink {
    output_dir: Option<PathBuf>,
    failure: Option<io::Error>,
}

impl JsonLinesSink {
    pub fn new(output_dir: Option<PathBuf>) -> Self {
        Self {
            output_dir,
            failure: None,
        }
    }

    /// First write failure seen during the run, if any
    pub fn finish(self) -> io::Result<()> {
        match self.failure {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    fn write_item(&self, record: &OutputRecord) -> io::Result<()> {
        if let Some(ref dir) = self.output_dir {
            write_binary(dir, record)?;
        }

        let mut stdout = io::stdout().lock();
        serde_json::to_writer(&mut stdout, &record.to_json())?;
        stdout.write_all(b"\n")?;
        stdout.flush()
    }

    fn remember(&mut self, result: io::Result<()>) {
        if let Err(e) = result {
            warn!(error = %e, "Failed to write record");
            self.failure.get_or_insert(e);
        }
    }
}

impl OutputSink for JsonLinesSink {
    fn emit_item(&mut self, record: OutputRecord) {
        let result = self.write_item(&record);
        self.remember(result);
    }

    fn emit_progress(&mut self, record: OutputRecord) {
        let mut stderr = io::stderr().lock();
        let result = serde_json::to_writer(&mut stderr, &record.to_json())
            .map_err(io::Error::from)
            .and_then(|_| stderr.write_all(b"\n"));
        drop(stderr);
        self.remember(result);
    }
}

/// `<dir>/item<N>/<slot>-<fileName>`
fn slot_path(dir: &Path, paired_item: usize, slot: &str, file_name: &str) -> PathBuf {
    // Remote names never escape the item directory
    let file_name = Path::new(file_name)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("file");

    dir.join(format!("item{}", paired_item))
        .join(format!("{}-{}", slot, file_name))
}

fn write_binary(dir: &Path, record: &OutputRecord) -> io::Result<()> {
    for (slot, data) in &record.binary {
        let path = slot_path(dir, record.paired_item, slot, &data.file_name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&path, &data.bytes)?;
        debug!(path = %path.display(), size = data.size(), "Binary slot written");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Map;
    use tempfile::TempDir;
    use workerbridge::host::BinaryData;

    #[test]
    fn test_slot_path_strips_directories() {
        let dir = Path::new("/tmp/out");
        assert_eq!(
            slot_path(dir, 2, "data0", "../../etc/passwd"),
            PathBuf::from("/tmp/out/item2/data0-passwd")
        );
        assert_eq!(
            slot_path(dir, 0, "data", "report.pdf"),
            PathBuf::from("/tmp/out/item0/data-report.pdf")
        );
    }

    #[test]
    fn test_binary_slots_written() {
        let temp_dir = TempDir::new().unwrap();
        let mut record = OutputRecord::new(1, Map::new());
        record.binary.push((
            "data".to_string(),
            BinaryData::new(&b"hello"[..], "a.txt", "text/plain"),
        ));

        write_binary(temp_dir.path(), &record).unwrap();

        let written = std::fs::read(temp_dir.path().join("item1").join("data-a.txt")).unwrap();
        assert_eq!(written, b"hello");
    }
}
