//! Joint-mode container: a single self-describing stream of
//! `[file header][lace][block header][lace][block header]...`, binding
//! the RS(255,223) codec, the interlacer and CRC32C together.
//!
//! File header: the 5 data bytes `'X','P',MAJOR,MINOR,'0'+ifactor`,
//! zero-padded to 223 bytes and RS-encoded, of which only the 5 data bytes
//! and the 32 parity bytes are actually written (37 bytes total) — the 218
//! zero padding bytes are reconstructed by the reader rather than stored.
//! Block header (8 bytes): `'X'`, a 24-bit big-endian original-byte count,
//! then a 32-bit big-endian CRC32C of those original bytes.

use std::io::{self, Read, Write};

use log::warn;
use rayon::prelude::*;
use xpar_error::Error;

use crate::crc32c;
use crate::interlace;
use crate::rs255::{self, K, N};

pub const FILE_HEADER_LEN: usize = 5 + rs255::T;
pub const BLOCK_HEADER_LEN: usize = 8;

const FORMAT_MAJOR: u8 = 1;
const FORMAT_MINOR: u8 = 0;

/// Codewords per lace for a given interlacing factor.
pub fn lace_codewords(ifactor: u8) -> usize {
    interlace::lace_codewords(ifactor)
}

/// Read exactly `buf.len()` bytes unless the source hits EOF first;
/// returns the number of bytes actually filled. A plain `Read::read` can
/// return short of a full buffer without being at EOF (pipes, sockets), so
/// this loops until either the buffer is full or a `read` call returns 0.
fn read_fill(r: &mut impl Read, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        let n = r.read(&mut buf[filled..])?;
        if n == 0 {
            break;
        }
        filled += n;
    }
    Ok(filled)
}

fn encode_file_header(ifactor: u8) -> [u8; FILE_HEADER_LEN] {
    let mut block = [0u8; K];
    block[0] = b'X';
    block[1] = b'P';
    block[2] = FORMAT_MAJOR;
    block[3] = FORMAT_MINOR;
    block[4] = b'0' + ifactor;
    let codeword = rs255::encode(&block);

    let mut out = [0u8; FILE_HEADER_LEN];
    out[..5].copy_from_slice(&codeword[..5]);
    out[5..].copy_from_slice(&codeword[K..]);
    out
}

struct FileHeader {
    ifactor: u8,
}

fn decode_file_header(bytes: &[u8; FILE_HEADER_LEN]) -> Result<FileHeader, Error> {
    let mut codeword = [0u8; N];
    codeword[..5].copy_from_slice(&bytes[..5]);
    codeword[5..K].fill(0);
    codeword[K..].copy_from_slice(&bytes[5..]);

    rs255::decode(&mut codeword).map_err(|()| Error::TruncatedHeader)?;

    if codeword[0] != b'X' || codeword[1] != b'P' {
        return Err(Error::BadMagic);
    }
    let ifactor = codeword[4].wrapping_sub(b'0');
    if !(1..=3).contains(&ifactor) {
        return Err(Error::BadMagic);
    }
    Ok(FileHeader { ifactor })
}

fn encode_block_header(n: u32, crc: u32) -> [u8; BLOCK_HEADER_LEN] {
    let mut out = [0u8; BLOCK_HEADER_LEN];
    out[0] = b'X';
    out[1..4].copy_from_slice(&n.to_be_bytes()[1..4]);
    out[4..8].copy_from_slice(&crc.to_be_bytes());
    out
}

struct BlockHeader {
    n: u32,
    crc: u32,
}

fn decode_block_header(bytes: &[u8; BLOCK_HEADER_LEN]) -> Result<BlockHeader, Error> {
    if bytes[0] != b'X' {
        return Err(Error::BadBlockHeader);
    }
    let n = u32::from_be_bytes([0, bytes[1], bytes[2], bytes[3]]);
    let crc = u32::from_be_bytes(bytes[4..8].try_into().unwrap());
    Ok(BlockHeader { n, crc })
}

/// Encode a whole byte stream from `reader` to `writer` in joint mode.
pub fn encode<R: Read, W: Write>(reader: &mut R, writer: &mut W, ifactor: u8) -> Result<(), Error> {
    assert!((1..=3).contains(&ifactor));
    writer.write_all(&encode_file_header(ifactor))?;

    let ibs = lace_codewords(ifactor);
    let lace_data_len = ibs * K;
    let lace_encoded_len = ibs * N;

    let mut input = vec![0u8; lace_data_len];
    loop {
        let n = read_fill(reader, &mut input)?;
        if n == 0 {
            break;
        }
        let original = input[..n].to_vec();
        input[n..].fill(0);

        let mut out = vec![0u8; lace_encoded_len];
        out.par_chunks_mut(N).enumerate().for_each(|(i, chunk)| {
            let block: &[u8; K] = input[i * K..(i + 1) * K].try_into().unwrap();
            chunk.copy_from_slice(&rs255::encode(block));
        });
        interlace::apply(&mut out, ifactor);
        writer.write_all(&out)?;

        let crc = crc32c::crc32c(&original);
        writer.write_all(&encode_block_header(n as u32, crc))?;

        if n < lace_data_len {
            break;
        }
    }
    Ok(())
}

#[derive(Debug, Default, Clone, Copy)]
pub struct DecodeReport {
    pub laces: usize,
    pub corrections: usize,
}

/// Decode a joint-mode stream from `reader` to `writer`.
///
/// `force`: on a CRC mismatch or unrecoverable codeword, log and keep
/// going with best-effort bytes instead of aborting. `ifactor_override`:
/// used only if the file header itself cannot be RS-recovered.
pub fn decode<R: Read, W: Write>(
    reader: &mut R,
    writer: &mut W,
    force: bool,
    ifactor_override: Option<u8>,
) -> Result<DecodeReport, Error> {
    let mut header_bytes = [0u8; FILE_HEADER_LEN];
    let got = read_fill(reader, &mut header_bytes)?;
    if got < FILE_HEADER_LEN {
        return Err(Error::TruncatedHeader);
    }

    let ifactor = match decode_file_header(&header_bytes) {
        Ok(h) => h.ifactor,
        Err(e) => match (force, ifactor_override) {
            (true, Some(f)) => {
                warn!("file header unrecoverable ({e}), using overridden ifactor {f}");
                f
            }
            _ => return Err(e),
        },
    };

    let ibs = lace_codewords(ifactor);
    let lace_encoded_len = ibs * N;

    let mut report = DecodeReport::default();
    let mut encoded = vec![0u8; lace_encoded_len];
    let mut block_header_bytes = [0u8; BLOCK_HEADER_LEN];

    loop {
        let got = read_fill(reader, &mut encoded)?;
        if got == 0 {
            break;
        }
        if got < lace_encoded_len {
            if !force {
                return Err(Error::TruncatedHeader);
            }
            warn!("short lace read ({got}/{lace_encoded_len}), zero-padding under --force");
            encoded[got..].fill(0);
        }

        let got_bh = read_fill(reader, &mut block_header_bytes)?;
        let mut header_is_synthetic = false;
        let bh = if got_bh < BLOCK_HEADER_LEN {
            if !force {
                return Err(Error::BadBlockHeader);
            }
            warn!("truncated block header, assuming full lace under --force");
            header_is_synthetic = true;
            BlockHeader { n: (ibs * K) as u32, crc: 0 }
        } else {
            match decode_block_header(&block_header_bytes) {
                Ok(bh) => bh,
                Err(e) => {
                    if !force {
                        return Err(e);
                    }
                    warn!("bad block header ({e}), assuming full lace under --force");
                    header_is_synthetic = true;
                    BlockHeader { n: (ibs * K) as u32, crc: 0 }
                }
            }
        };

        interlace::apply(&mut encoded, ifactor);

        let decoded: Vec<(Result<usize, ()>, [u8; K])> = (0..ibs)
            .into_par_iter()
            .map(|i| {
                let mut codeword: [u8; N] = encoded[i * N..(i + 1) * N].try_into().unwrap();
                let result = rs255::decode(&mut codeword);
                let mut block = [0u8; K];
                block.copy_from_slice(&codeword[..K]);
                (result, block)
            })
            .collect();

        let mut lace_data = vec![0u8; ibs * K];
        for (i, (result, block)) in decoded.into_iter().enumerate() {
            match result {
                Ok(corrections) => report.corrections += corrections,
                Err(()) => {
                    if !force {
                        return Err(Error::DecodeUnrecoverable { codeword_index: i });
                    }
                    warn!("codeword {i} in lace {} unrecoverable, using best-effort bytes", report.laces);
                }
            }
            lace_data[i * K..(i + 1) * K].copy_from_slice(&block);
        }

        let take = (ibs * K).min(bh.n as usize);
        let out_slice = &lace_data[..take];
        if !header_is_synthetic {
            let actual_crc = crc32c::crc32c(out_slice);
            if actual_crc != bh.crc {
                if !force {
                    return Err(Error::CrcMismatch { expected: bh.crc, actual: actual_crc });
                }
                warn!("CRC mismatch in lace {} (expected {:08x}, got {:08x})", report.laces, bh.crc, actual_crc);
            }
        }

        writer.write_all(out_slice)?;
        report.laces += 1;

        if got < lace_encoded_len {
            break;
        }
    }

    Ok(report)
}
