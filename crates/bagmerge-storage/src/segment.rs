use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use bagmerge_types::{BagMessage, Timestamp};
use tracing::debug;

use crate::error::{StorageError, StorageResult};
use crate::metadata::FileInformation;

/// Magic bytes at the start of every segment file.
pub const SEGMENT_MAGIC: &[u8; 4] = b"BAGS";

/// Segment frame layout version.
pub const SEGMENT_VERSION: u32 = 1;

/// File header: 4 bytes magic + 4 bytes version.
pub const FILE_HEADER_SIZE: usize = 8;

/// Frame header: 4 bytes length + 4 bytes CRC.
pub const FRAME_HEADER_SIZE: usize = 8;

/// Segment file extension.
pub const SEGMENT_EXTENSION: &str = "bagseg";

/// Encode one message as a frame.
///
/// On-disk format:
/// ```text
/// [4 bytes: payload length (little-endian u32)]
/// [4 bytes: CRC32 of payload (little-endian u32)]
/// [N bytes: payload (bincode-serialized BagMessage)]
/// ```
pub fn encode_frame(message: &BagMessage) -> StorageResult<Vec<u8>> {
    let payload =
        bincode::serialize(message).map_err(|e| StorageError::Serialization(e.to_string()))?;
    let length = u32::try_from(payload.len()).map_err(|_| {
        StorageError::Serialization(format!("frame too large: {} bytes", payload.len()))
    })?;

    let mut frame = Vec::with_capacity(FRAME_HEADER_SIZE + payload.len());
    frame.extend_from_slice(&length.to_le_bytes());
    frame.extend_from_slice(&crc32fast::hash(&payload).to_le_bytes());
    frame.extend_from_slice(&payload);
    Ok(frame)
}

/// Append-only writer for a single segment file.
pub(crate) struct SegmentWriter {
    path: PathBuf,
    name: String,
    writer: BufWriter<File>,
    bytes: u64,
    message_count: u64,
    first: Option<Timestamp>,
    last: Option<Timestamp>,
}

impl SegmentWriter {
    /// Create a new segment file and write its header.
    pub(crate) fn create(dir: &Path, name: String) -> StorageResult<Self> {
        let path = dir.join(&name);
        let mut writer = BufWriter::new(File::create(&path)?);
        writer.write_all(SEGMENT_MAGIC)?;
        writer.write_all(&SEGMENT_VERSION.to_le_bytes())?;
        debug!(path = %path.display(), "segment opened");
        Ok(Self {
            path,
            name,
            writer,
            bytes: FILE_HEADER_SIZE as u64,
            message_count: 0,
            first: None,
            last: None,
        })
    }

    pub(crate) fn append(&mut self, message: &BagMessage) -> StorageResult<()> {
        let frame = encode_frame(message)?;
        self.writer.write_all(&frame)?;
        self.bytes += frame.len() as u64;
        self.message_count += 1;
        self.first.get_or_insert(message.timestamp);
        self.last = Some(message.timestamp);
        Ok(())
    }

    /// Bytes written so far, header included.
    pub(crate) fn bytes(&self) -> u64 {
        self.bytes
    }

    pub(crate) fn message_count(&self) -> u64 {
        self.message_count
    }

    pub(crate) fn first_timestamp(&self) -> Option<Timestamp> {
        self.first
    }

    /// Flush to disk and summarize the segment.
    pub(crate) fn finish(mut self) -> StorageResult<FileInformation> {
        self.writer.flush()?;
        self.writer.get_ref().sync_all()?;
        let starting_time = self.first.unwrap_or_default();
        let duration_ns = self
            .last
            .map(|last| last.nanos_since(starting_time))
            .unwrap_or(0);
        debug!(
            path = %self.path.display(),
            messages = self.message_count,
            bytes = self.bytes,
            "segment closed"
        );
        Ok(FileInformation {
            path: self.name,
            starting_time,
            duration_ns,
            message_count: self.message_count,
        })
    }
}

/// Sequential frame reader for a single segment file.
pub(crate) struct SegmentReader {
    path: PathBuf,
    reader: BufReader<File>,
    file_len: u64,
    offset: u64,
}

impl SegmentReader {
    /// Open a segment and validate its header.
    pub(crate) fn open(path: &Path) -> StorageResult<Self> {
        if !path.is_file() {
            return Err(StorageError::NotFound(path.to_path_buf()));
        }
        let file = File::open(path)?;
        let file_len = file.metadata()?.len();
        let mut reader = BufReader::new(file);

        let mut header = [0u8; FILE_HEADER_SIZE];
        if read_full(&mut reader, &mut header)? < FILE_HEADER_SIZE {
            return Err(StorageError::TruncatedFrame {
                path: path.to_path_buf(),
                offset: 0,
            });
        }
        if &header[0..4] != SEGMENT_MAGIC {
            return Err(StorageError::InvalidMagic {
                path: path.to_path_buf(),
                expected: String::from_utf8_lossy(SEGMENT_MAGIC).into(),
                actual: String::from_utf8_lossy(&header[0..4]).into(),
            });
        }
        let version = u32::from_le_bytes([header[4], header[5], header[6], header[7]]);
        if version != SEGMENT_VERSION {
            return Err(StorageError::UnsupportedVersion(version));
        }

        Ok(Self {
            path: path.to_path_buf(),
            reader,
            file_len,
            offset: FILE_HEADER_SIZE as u64,
        })
    }

    /// Read the next frame, or `None` at a clean end of file.
    ///
    /// A failed read rewinds to the start of the offending frame, so every
    /// later call reports the same failure instead of skipping past it.
    pub(crate) fn next_message(&mut self) -> StorageResult<Option<BagMessage>> {
        match self.read_frame() {
            Ok(message) => Ok(message),
            Err(e) => {
                self.reader.seek(SeekFrom::Start(self.offset))?;
                Err(e)
            }
        }
    }

    fn read_frame(&mut self) -> StorageResult<Option<BagMessage>> {
        let mut header = [0u8; FRAME_HEADER_SIZE];
        match read_full(&mut self.reader, &mut header)? {
            0 => return Ok(None),
            FRAME_HEADER_SIZE => {}
            _ => return Err(self.truncated()),
        }

        let length = u32::from_le_bytes([header[0], header[1], header[2], header[3]]);
        let expected = u32::from_le_bytes([header[4], header[5], header[6], header[7]]);

        let end = self.offset + FRAME_HEADER_SIZE as u64 + u64::from(length);
        if length == 0 || end > self.file_len {
            return Err(self.truncated());
        }

        let mut payload = vec![0u8; length as usize];
        if read_full(&mut self.reader, &mut payload)? < payload.len() {
            return Err(self.truncated());
        }

        let actual = crc32fast::hash(&payload);
        if actual != expected {
            return Err(StorageError::CrcMismatch {
                path: self.path.clone(),
                offset: self.offset,
                expected,
                actual,
            });
        }

        let message = bincode::deserialize::<BagMessage>(&payload)
            .map_err(|e| StorageError::Serialization(e.to_string()))?;
        self.offset = end;
        Ok(Some(message))
    }

    fn truncated(&self) -> StorageError {
        StorageError::TruncatedFrame {
            path: self.path.clone(),
            offset: self.offset,
        }
    }
}

/// Fill `buf` as far as the reader allows. Returns the number of bytes read,
/// which is short of `buf.len()` only at end of file.
fn read_full(reader: &mut impl Read, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}
