//! Length-delimited packet framing over any async byte stream.
//!
//! A frame is a 4-byte big-endian length followed by a bincode-encoded
//! [`Packet`]. Decoding failures surface as `InvalidData` so the caller can
//! decide between skipping a frame and dropping the connection.

use crate::Packet;
use bincode::{deserialize, serialize};
use std::io;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

/// Largest frame accepted in either direction. A four-player state snapshot
/// is a few hundred bytes.
pub const MAX_FRAME_SIZE: u32 = 64 * 1024;

pub fn encode_frame(packet: &Packet) -> io::Result<Vec<u8>> {
    let payload = serialize(packet).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    if payload.len() > MAX_FRAME_SIZE as usize {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("frame too large: {} bytes", payload.len()),
        ));
    }

    let mut frame = Vec::with_capacity(4 + payload.len());
    frame.extend_from_slice(&(payload.len() as u32).to_be_bytes());
    frame.extend_from_slice(&payload);
    Ok(frame)
}

pub async fn write_packet<W>(writer: &mut W, packet: &Packet) -> io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    let frame = encode_frame(packet)?;
    writer.write_all(&frame).await?;
    writer.flush().await
}

/// Reads one frame. A clean close before the length prefix yields
/// `UnexpectedEof`.
pub async fn read_frame<R>(reader: &mut R) -> io::Result<Vec<u8>>
where
    R: AsyncRead + Unpin,
{
    let len = reader.read_u32().await?;
    if len > MAX_FRAME_SIZE {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("frame too large: {len} bytes (max {MAX_FRAME_SIZE})"),
        ));
    }

    let mut buf = vec![0u8; len as usize];
    reader.read_exact(&mut buf).await?;
    Ok(buf)
}

pub fn decode_packet(frame: &[u8]) -> io::Result<Packet> {
    deserialize(frame).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
}

pub async fn read_packet<R>(reader: &mut R) -> io::Result<Packet>
where
    R: AsyncRead + Unpin,
{
    let frame = read_frame(reader).await?;
    decode_packet(&frame)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Direction, InputAction};
    use tokio_test::io::Builder;

    fn sample_packet() -> Packet {
        Packet::Input {
            room_code: "1234".into(),
            player_id: "player_abc".into(),
            direction: Direction::Left,
            action: InputAction::Release,
        }
    }

    #[tokio::test]
    async fn test_write_packet_emits_length_prefixed_frame() {
        let packet = sample_packet();
        let payload = bincode::serialize(&packet).unwrap();
        let mut expected = (payload.len() as u32).to_be_bytes().to_vec();
        expected.extend_from_slice(&payload);

        let mut writer = Builder::new().write(&expected).build();
        write_packet(&mut writer, &packet).await.unwrap();
    }

    #[tokio::test]
    async fn test_read_packets_in_sequence() {
        let first = encode_frame(&sample_packet()).unwrap();
        let second = encode_frame(&Packet::Disconnect).unwrap();

        let mut reader = Builder::new().read(&first).read(&second).build();
        assert_eq!(read_packet(&mut reader).await.unwrap(), sample_packet());
        assert_eq!(read_packet(&mut reader).await.unwrap(), Packet::Disconnect);

        let err = read_packet(&mut reader).await.unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
    }

    #[tokio::test]
    async fn test_rejects_oversized_length_prefix() {
        let prefix = (MAX_FRAME_SIZE + 1).to_be_bytes();
        let mut reader = Builder::new().read(&prefix).build();
        let err = read_frame(&mut reader).await.unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    }

    #[tokio::test]
    async fn test_truncated_payload_is_eof() {
        let frame = encode_frame(&sample_packet()).unwrap();
        let truncated = &frame[..frame.len() - 3];
        let mut reader = Builder::new().read(truncated).build();
        let err = read_frame(&mut reader).await.unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
    }

    #[test]
    fn test_corrupted_payload_is_invalid_data() {
        let err = decode_packet(&[0xFF, 0xFF, 0xFF, 0xFF, 0x01]).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    }
}
