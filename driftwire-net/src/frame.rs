//! Frame codec: 8-byte header (`id`, `size`) followed by a payload.
//!
//! Layout is native byte order on the wire — both ends of the reference
//! deployment share a platform, so no endianness conversion happens here.
//! `append`/`extract_tail` are generic over [`bytemuck::Pod`], the safe
//! substitute for "standard-layout type": `Pod` statically guarantees the
//! type has no padding, no pointers, and a fixed byte representation.

use bytemuck::Pod;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::error::NetError;

/// Size in bytes of the `id` + `size` header.
pub const HEADER_LEN: usize = 8;

/// A single length-prefixed message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    id: u32,
    payload: Vec<u8>,
}

impl Frame {
    /// Builds a frame with the given id and payload.
    #[must_use]
    pub fn new(id: u32, payload: Vec<u8>) -> Self {
        Self { id, payload }
    }

    /// Builds a frame with an empty payload.
    #[must_use]
    pub fn empty(id: u32) -> Self {
        Self::new(id, Vec::new())
    }

    #[must_use]
    pub const fn id(&self) -> u32 {
        self.id
    }

    #[must_use]
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    pub fn into_payload(self) -> Vec<u8> {
        self.payload
    }

    /// Total wire size: header plus payload length.
    #[must_use]
    pub fn size(&self) -> u32 {
        HEADER_LEN as u32 + self.payload.len() as u32
    }

    /// Appends the raw bytes of `value` to the payload.
    pub fn append<T: Pod>(&mut self, value: T) {
        self.payload.extend_from_slice(bytemuck::bytes_of(&value));
    }

    /// Removes and decodes the last `size_of::<T>()` bytes of the payload.
    ///
    /// # Errors
    ///
    /// Returns [`NetError::FrameUnderflow`] if the payload is shorter than
    /// `size_of::<T>()`.
    pub fn extract_tail<T: Pod>(&mut self) -> Result<T, NetError> {
        let needed = std::mem::size_of::<T>();
        if self.payload.len() < needed {
            return Err(NetError::FrameUnderflow { needed, have: self.payload.len() });
        }
        let split_at = self.payload.len() - needed;
        let tail = self.payload.split_off(split_at);
        Ok(*bytemuck::from_bytes(&tail))
    }

    fn encode_header(&self) -> [u8; HEADER_LEN] {
        let mut buf = [0u8; HEADER_LEN];
        buf[0..4].copy_from_slice(&self.id.to_ne_bytes());
        buf[4..8].copy_from_slice(&self.size().to_ne_bytes());
        buf
    }
}

/// Reads one frame from `reader`, enforcing `max_frame_size` on the
/// declared wire size.
///
/// # Errors
///
/// Returns [`NetError::ReadFailed`] on I/O error, or [`NetError::InvalidFrame`]
/// if the header declares `size < HEADER_LEN` or `size > max_frame_size`.
pub async fn read_frame<R>(reader: &mut R, connection_id: u32, max_frame_size: u32) -> Result<Frame, NetError>
where
    R: AsyncRead + Unpin,
{
    let mut header = [0u8; HEADER_LEN];
    reader
        .read_exact(&mut header)
        .await
        .map_err(|source| NetError::ReadFailed { connection_id, source })?;

    let id = u32::from_ne_bytes(header[0..4].try_into().unwrap());
    let size = u32::from_ne_bytes(header[4..8].try_into().unwrap());

    if size < HEADER_LEN as u32 {
        return Err(NetError::InvalidFrame { size, reason: "declared size smaller than header" });
    }
    if size > max_frame_size {
        return Err(NetError::InvalidFrame { size, reason: "declared size exceeds configured maximum" });
    }

    let payload_len = (size - HEADER_LEN as u32) as usize;
    if payload_len == 0 {
        return Ok(Frame::new(id, Vec::new()));
    }

    let mut payload = vec![0u8; payload_len];
    reader
        .read_exact(&mut payload)
        .await
        .map_err(|source| NetError::ReadFailed { connection_id, source })?;

    Ok(Frame::new(id, payload))
}

/// Writes one frame's header followed by its payload to `writer`.
///
/// # Errors
///
/// Returns [`NetError::WriteFailed`] if either write fails.
pub async fn write_frame<W>(writer: &mut W, frame: &Frame, connection_id: u32) -> Result<(), NetError>
where
    W: AsyncWrite + Unpin,
{
    writer
        .write_all(&frame.encode_header())
        .await
        .map_err(|source| NetError::WriteFailed { connection_id, source })?;
    if !frame.payload.is_empty() {
        writer
            .write_all(&frame.payload)
            .await
            .map_err(|source| NetError::WriteFailed { connection_id, source })?;
    }
    Ok(())
}
