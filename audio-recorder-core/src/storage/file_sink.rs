use std::fs::{self, File, OpenOptions};
use std::io::{self, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use crate::traits::sink::Sink;

/// Random-access file sink.
///
/// The file is opened for read/write without truncation; encoders reset
/// its length themselves.
#[derive(Debug)]
pub struct FileSink {
    path: PathBuf,
    file: Option<File>,
}

impl FileSink {
    /// Open (or create) `path`, creating missing parent directories.
    pub fn open(path: impl Into<PathBuf>) -> io::Result<Self> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&path)?;

        Ok(Self {
            path,
            file: Some(file),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn file(&mut self) -> io::Result<&mut File> {
        self.file
            .as_mut()
            .ok_or_else(|| io::Error::other(format!("{} is closed", self.path.display())))
    }
}

impl Sink for FileSink {
    fn set_length(&mut self, length: u64) -> io::Result<()> {
        self.file()?.set_len(length)
    }

    fn seek(&mut self, position: u64) -> io::Result<()> {
        self.file()?.seek(SeekFrom::Start(position)).map(|_| ())
    }

    fn write_bytes(&mut self, data: &[u8]) -> io::Result<()> {
        self.file()?.write_all(data)
    }

    fn close(&mut self) -> io::Result<()> {
        if let Some(mut file) = self.file.take() {
            file.flush()?;
            file.sync_all()?;
        }
        Ok(())
    }
}
