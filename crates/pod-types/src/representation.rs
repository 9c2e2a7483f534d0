use std::fmt;
use std::io::Cursor;

use bytes::Bytes;
use tokio::io::{AsyncRead, AsyncReadExt};

use crate::metadata::RepresentationMetadata;

/// A single-use byte stream carrying a representation body.
///
/// Reading the stream consumes it. A component that needs the bytes and
/// still has to forward the representation must build a fresh stream from
/// the bytes it read. Dropping the stream releases the underlying handle.
pub struct DataStream {
    reader: Box<dyn AsyncRead + Send + Unpin>,
}

impl DataStream {
    /// Wrap any async reader.
    pub fn new(reader: impl AsyncRead + Send + Unpin + 'static) -> Self {
        Self {
            reader: Box::new(reader),
        }
    }

    /// A readable stream over in-memory bytes.
    pub fn from_bytes(data: impl Into<Bytes>) -> Self {
        Self::new(Cursor::new(data.into()))
    }

    pub fn empty() -> Self {
        Self::from_bytes(Bytes::new())
    }

    /// Read the whole stream into memory.
    pub async fn read_to_bytes(mut self) -> std::io::Result<Bytes> {
        let mut buf = Vec::new();
        self.reader.read_to_end(&mut buf).await?;
        Ok(Bytes::from(buf))
    }

    /// Read the whole stream as UTF-8 text.
    pub async fn read_to_string(self) -> std::io::Result<String> {
        let bytes = self.read_to_bytes().await?;
        String::from_utf8(bytes.to_vec())
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))
    }
}

impl fmt::Debug for DataStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DataStream").finish_non_exhaustive()
    }
}

impl From<Bytes> for DataStream {
    fn from(data: Bytes) -> Self {
        Self::from_bytes(data)
    }
}

/// A body together with the metadata describing it.
#[derive(Debug)]
pub struct Representation {
    pub data: DataStream,
    pub metadata: RepresentationMetadata,
    /// `false` when the body is RDF data that could be parsed as quads.
    pub binary: bool,
}

impl Representation {
    pub fn new(data: DataStream, metadata: RepresentationMetadata) -> Self {
        Self {
            data,
            metadata,
            binary: true,
        }
    }

    /// A representation over in-memory bytes.
    pub fn from_bytes(data: impl Into<Bytes>, metadata: RepresentationMetadata) -> Self {
        Self::new(DataStream::from_bytes(data), metadata)
    }

    /// A body-less representation, e.g. for container creation.
    pub fn metadata_only(metadata: RepresentationMetadata) -> Self {
        Self::new(DataStream::empty(), metadata)
    }

    /// Split into body and metadata.
    pub fn into_parts(self) -> (DataStream, RepresentationMetadata) {
        (self.data, self.metadata)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn read_consumes_stream() {
        let stream = DataStream::from_bytes(Bytes::from_static(b"hello"));
        let bytes = stream.read_to_bytes().await.unwrap();
        assert_eq!(&bytes[..], b"hello");
    }

    #[tokio::test]
    async fn rewrap_is_readable_again() {
        let repr = Representation::from_bytes("<> a <#Note>.", RepresentationMetadata::new());
        let (data, metadata) = repr.into_parts();
        let text = data.read_to_string().await.unwrap();

        let again = Representation::from_bytes(text.clone(), metadata);
        assert_eq!(again.data.read_to_string().await.unwrap(), text);
    }

    #[tokio::test]
    async fn invalid_utf8_is_an_error() {
        let stream = DataStream::from_bytes(vec![0xff, 0xfe]);
        let err = stream.read_to_string().await.unwrap_err();
        assert_eq!(err.kind(), std::io::ErrorKind::InvalidData);
    }

    #[tokio::test]
    async fn empty_stream() {
        let repr = Representation::metadata_only(RepresentationMetadata::new());
        assert!(repr.binary);
        assert!(repr.data.read_to_bytes().await.unwrap().is_empty());
    }
}
