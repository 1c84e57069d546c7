//! Systematic matrix Reed-Solomon erasure coding: split a file into `D`
//! data shards and `P` parity shards such that any `D` of the `D+P` shards
//! reconstruct the original.
//!
//! The encoder matrix is `E = V[total x D] * inverse(V[D x D])`, a
//! Vandermonde construction whose top `D` rows are always the identity —
//! only the bottom `P` rows (the parity coefficients) are kept, since the
//! top rows contribute nothing but the data shards themselves.

use rayon::prelude::*;

use crate::crc32c;
use crate::matrix::Matrix;

use xpar_error::Error;

pub const HEADER_LEN: usize = 19;
const MAGIC: &[u8; 4] = b"XPAS";

pub const MAX_DATA_SHARDS: usize = 127;
pub const MAX_PARITY_SHARDS: usize = 63;

/// Parity coefficients: `rows[j][k]` is the weight of data shard `k` in
/// parity shard `j`. Built once per `(d, p)` pair.
pub struct EncoderMatrix {
    pub d: usize,
    pub p: usize,
    rows: Matrix,
}

impl EncoderMatrix {
    pub fn build(d: usize, p: usize) -> Self {
        let total = d + p;
        let v_total = Matrix::vandermonde(total, d);
        let v_top = v_total.submatrix(0, 0, d, d);
        let v_top_inv = v_top.inverse().expect("vandermonde submatrix is always invertible");
        let e = v_total.mul(&v_top_inv);
        let parity_rows = e.submatrix(d, 0, p, d);
        EncoderMatrix { d, p, rows: parity_rows }
    }

    fn parity_row(&self, j: usize) -> &[u8] {
        self.rows.row(j)
    }
}

/// Parsed shard header.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ShardHeader {
    pub crc: u32,
    pub d: u8,
    pub p: u8,
    pub index: u8,
    pub total_size: u64,
}

impl ShardHeader {
    fn encode(&self) -> [u8; HEADER_LEN] {
        let mut out = [0u8; HEADER_LEN];
        out[0..4].copy_from_slice(MAGIC);
        out[4..8].copy_from_slice(&self.crc.to_be_bytes());
        out[8] = self.d;
        out[9] = self.p;
        out[10] = self.index;
        out[11..19].copy_from_slice(&self.total_size.to_be_bytes());
        out
    }

    fn parse(bytes: &[u8]) -> Option<ShardHeader> {
        if bytes.len() < HEADER_LEN || &bytes[0..4] != MAGIC {
            return None;
        }
        Some(ShardHeader {
            crc: u32::from_be_bytes(bytes[4..8].try_into().ok()?),
            d: bytes[8],
            p: bytes[9],
            index: bytes[10],
            total_size: u64::from_be_bytes(bytes[11..19].try_into().ok()?),
        })
    }
}

fn shard_size_for(total_size: u64, d: usize) -> usize {
    ((total_size as usize) + d - 1) / d.max(1)
}

/// Encode `data` into `d + p` shards, each `HEADER_LEN + shard_size` bytes,
/// header first. The last data shard is zero-padded if `data.len()` does
/// not divide evenly by `d`.
pub fn encode(data: &[u8], d: usize, p: usize) -> Result<Vec<Vec<u8>>, Error> {
    assert!((1..=MAX_DATA_SHARDS).contains(&d));
    assert!((1..=MAX_PARITY_SHARDS).contains(&p));

    let shard_size = shard_size_for(data.len() as u64, d);
    let mut payloads: Vec<Vec<u8>> = (0..d)
        .map(|i| {
            let start = i * shard_size;
            let end = (start + shard_size).min(data.len());
            let mut buf = vec![0u8; shard_size];
            if start < data.len() {
                buf[..end - start].copy_from_slice(&data[start..end]);
            }
            buf
        })
        .collect();

    let enc = EncoderMatrix::build(d, p);
    let parity_shards: Vec<Vec<u8>> = (0..p)
        .into_par_iter()
        .map(|j| {
            let row = enc.parity_row(j);
            let mut parity = vec![0u8; shard_size];
            for (k, &coeff) in row.iter().enumerate() {
                crate::gf256::mul_acc_slice(&mut parity, &payloads[k], coeff);
            }
            parity
        })
        .collect();
    payloads.extend(parity_shards);

    let total_size = data.len() as u64;
    let out = payloads
        .into_iter()
        .enumerate()
        .map(|(index, payload)| {
            let crc = crc32c::crc32c(&payload);
            let header = ShardHeader {
                crc,
                d: d as u8,
                p: p as u8,
                index: index as u8,
                total_size,
            };
            let mut bytes = header.encode().to_vec();
            bytes.extend_from_slice(&payload);
            bytes
        })
        .collect();
    Ok(out)
}

struct ValidShard {
    header: ShardHeader,
    payload: Vec<u8>,
}

fn parse_valid(raw: &[u8]) -> Option<ValidShard> {
    let header = ShardHeader::parse(raw)?;
    let payload = raw.get(HEADER_LEN..)?.to_vec();
    if crc32c::crc32c(&payload) != header.crc {
        return None;
    }
    Some(ValidShard { header, payload })
}

/// Majority value of `field`, tie-broken by sorting the candidate values
/// and taking the first after the most frequent count.
fn consensus<T: Ord + Copy>(values: &[T]) -> T {
    let mut sorted = values.to_vec();
    sorted.sort();
    let mut best = sorted[0];
    let mut best_count = 0usize;
    let mut i = 0;
    while i < sorted.len() {
        let mut j = i;
        while j < sorted.len() && sorted[j] == sorted[i] {
            j += 1;
        }
        let count = j - i;
        if count > best_count {
            best_count = count;
            best = sorted[i];
        }
        i = j;
    }
    best
}

/// Reconstruct the original byte stream from a set of raw shard buffers
/// (each including its 19-byte header). Order is irrelevant.
///
/// `strict_consensus`: when true, any valid shard that disagrees with the
/// majority on `d`, `p`, `total_size` or payload length is a fatal
/// [`Error::ConsensusDisagreement`] instead of being silently dropped.
pub fn decode(raw_shards: &[Vec<u8>], strict_consensus: bool) -> Result<Vec<u8>, Error> {
    let valid: Vec<ValidShard> = raw_shards.iter().filter_map(|s| parse_valid(s)).collect();
    if valid.is_empty() {
        return Err(Error::InsufficientShards { available: 0, required: 1 });
    }

    let ds: Vec<u8> = valid.iter().map(|v| v.header.d).collect();
    let ps: Vec<u8> = valid.iter().map(|v| v.header.p).collect();
    let sizes: Vec<u64> = valid.iter().map(|v| v.header.total_size).collect();
    let shard_sizes: Vec<usize> = valid.iter().map(|v| v.payload.len()).collect();

    let d_consensus = consensus(&ds);
    let p_consensus = consensus(&ps);
    let size_consensus = consensus(&sizes);
    let shard_size_consensus = consensus(&shard_sizes);

    if strict_consensus {
        if let Some(outlier) = valid.iter().find(|v| {
            v.header.d != d_consensus
                || v.header.p != p_consensus
                || v.header.total_size != size_consensus
                || v.payload.len() != shard_size_consensus
        }) {
            let field = if outlier.header.d != d_consensus {
                "d"
            } else if outlier.header.p != p_consensus {
                "p"
            } else if outlier.header.total_size != size_consensus {
                "total_size"
            } else {
                "shard_size"
            };
            return Err(Error::ConsensusDisagreement { field });
        }
    }

    let mut agreeing: Vec<&ValidShard> = valid
        .iter()
        .filter(|v| {
            v.header.d == d_consensus
                && v.header.p == p_consensus
                && v.header.total_size == size_consensus
                && v.payload.len() == shard_size_consensus
        })
        .collect();

    let d = d_consensus as usize;
    let p = p_consensus as usize;

    agreeing.sort_by_key(|v| v.header.index);
    for pair in agreeing.windows(2) {
        if pair[0].header.index == pair[1].header.index {
            return Err(Error::DuplicateShardIndex { index: pair[0].header.index });
        }
    }

    if agreeing.len() < d {
        return Err(Error::InsufficientShards { available: agreeing.len(), required: d });
    }

    let total_size = size_consensus;
    let shard_size = shard_size_consensus;

    // No loss: indices 0..D-1 are all present.
    if agreeing.len() >= d && (0..d as u8).all(|i| agreeing.iter().any(|v| v.header.index == i)) {
        let mut out = Vec::with_capacity(d * shard_size);
        for i in 0..d as u8 {
            let shard = agreeing.iter().find(|v| v.header.index == i).unwrap();
            out.extend_from_slice(&shard.payload);
        }
        out.truncate(total_size as usize);
        return Ok(out);
    }

    // Reconstruct missing data shards via submatrix inversion.
    let present: Vec<&ValidShard> = agreeing.into_iter().take(d).collect();
    let enc = EncoderMatrix::build(d, p);
    let full = build_full_matrix(&enc);

    let present_rows: Vec<Vec<u8>> = present.iter().map(|v| full.row(v.header.index as usize).to_vec()).collect();
    let m = Matrix::from_rows(present_rows);
    let m_inv = m.inverse().ok_or(Error::SingularMatrix)?;

    let present_payloads = Matrix::from_rows(
        present
            .iter()
            .map(|v| v.payload.clone())
            .collect(),
    );
    let recovered = m_inv.mul(&present_payloads);

    let mut out = Vec::with_capacity(d * shard_size);
    for i in 0..d {
        out.extend_from_slice(recovered.row(i));
    }
    out.truncate(total_size as usize);
    Ok(out)
}

/// The full `(d+p) x d` systematic matrix (identity on top, parity rows on
/// bottom), reconstructed from the stored parity-only [`EncoderMatrix`].
fn build_full_matrix(enc: &EncoderMatrix) -> Matrix {
    let identity = Matrix::eye(enc.d);
    let parity = Matrix::from_rows((0..enc.p).map(|j| enc.parity_row(j).to_vec()).collect());
    identity.concat_rows(&parity)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrip_no_loss() {
        let data = b"the quick brown fox jumps over the lazy dog, 1000 times over".repeat(20);
        let shards = encode(&data, 4, 2).unwrap();
        let recovered = decode(&shards, false).unwrap();
        assert_eq!(recovered, data);
    }

    #[test]
    fn roundtrip_with_two_shards_missing() {
        let data: Vec<u8> = (0..1000u32).map(|x| (x % 251) as u8).collect();
        let mut shards = encode(&data, 4, 2).unwrap();
        shards.remove(5);
        shards.remove(1);
        let recovered = decode(&shards, false).unwrap();
        assert_eq!(recovered, data);
    }

    #[test]
    fn too_many_missing_shards_fails() {
        let data = vec![1u8; 500];
        let mut shards = encode(&data, 4, 2).unwrap();
        shards.truncate(3);
        assert!(decode(&shards, false).is_err());
    }

    #[test]
    fn duplicate_index_is_fatal() {
        let data = vec![7u8; 200];
        let mut shards = encode(&data, 4, 2).unwrap();
        let dup = shards[0].clone();
        shards.push(dup);
        assert!(matches!(decode(&shards, false), Err(Error::DuplicateShardIndex { .. })));
    }

    #[test]
    fn outlier_header_is_dropped_by_consensus() {
        let data = vec![3u8; 400];
        let shards = encode(&data, 4, 2).unwrap();
        let mut tampered = shards.clone();
        // Corrupt one shard's D field and recompute its CRC so it still
        // parses, but disagrees with the majority.
        tampered[0][8] = 5;
        let payload = tampered[0][HEADER_LEN..].to_vec();
        let crc = crc32c::crc32c(&payload);
        tampered[0][4..8].copy_from_slice(&crc.to_be_bytes());

        let recovered = decode(&tampered, false).unwrap();
        assert_eq!(recovered, data);
    }

    #[test]
    fn outlier_header_is_fatal_under_strict_consensus() {
        let data = vec![3u8; 400];
        let shards = encode(&data, 4, 2).unwrap();
        let mut tampered = shards.clone();
        tampered[0][8] = 5;
        let payload = tampered[0][HEADER_LEN..].to_vec();
        let crc = crc32c::crc32c(&payload);
        tampered[0][4..8].copy_from_slice(&crc.to_be_bytes());

        assert!(matches!(decode(&tampered, true), Err(Error::ConsensusDisagreement { .. })));
    }
}
